//! Seeded hash functions used by [`HashTable`](super::HashTable).

/// Hashes a key of type `K` together with a per-table seed.
///
/// Implementations must be deterministic for a given `(key, seed)` pair: a table relies on it
/// to find the bucket an entry was linked into.
///
/// Two keys that compare equal under [`KeyHasher::key_eq`] must hash identically.
pub trait KeyHasher<K: ?Sized> {
    fn hash(&self, key: &K, seed: u64) -> u64;

    fn key_eq(&self, a: &K, b: &K) -> bool;
}

/// FNV-1a over the key bytes, with the seed folded into the offset basis and a final
/// avalanche so that the low bits used for bucket selection depend on every input byte.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeededFnv;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

impl SeededFnv {
    /// Hashes raw bytes.
    pub fn hash_bytes(bytes: &[u8], seed: u64) -> u64 {
        let mut hash = FNV_OFFSET_BASIS ^ seed.wrapping_mul(FNV_PRIME);
        for &byte in bytes {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        mix64(hash)
    }
}

impl<K> KeyHasher<K> for SeededFnv
where
    K: AsRef<[u8]> + ?Sized,
{
    #[inline]
    fn hash(&self, key: &K, seed: u64) -> u64 {
        Self::hash_bytes(key.as_ref(), seed)
    }

    #[inline]
    fn key_eq(&self, a: &K, b: &K) -> bool {
        a.as_ref() == b.as_ref()
    }
}

/// Like [`SeededFnv`] but folds ASCII letters to lower case first, for keys compared
/// case-insensitively.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AsciiCaseInsensitive;

impl<K> KeyHasher<K> for AsciiCaseInsensitive
where
    K: AsRef<[u8]> + ?Sized,
{
    fn hash(&self, key: &K, seed: u64) -> u64 {
        let mut hash = FNV_OFFSET_BASIS ^ seed.wrapping_mul(FNV_PRIME);
        for &byte in key.as_ref() {
            hash ^= u64::from(byte.to_ascii_lowercase());
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        mix64(hash)
    }

    fn key_eq(&self, a: &K, b: &K) -> bool {
        a.as_ref().eq_ignore_ascii_case(b.as_ref())
    }
}

// splitmix64 finalizer
#[inline]
fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}
