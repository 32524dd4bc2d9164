use std::fmt;
use std::mem;

use tracing::trace;

use super::hasher::{KeyHasher, SeededFnv};

/// Largest bucket exponent a table will use, 2^16 buckets.
pub const MAX_EXPONENT: u8 = 16;

/// An entry stored in a [`HashTable`], exposing the key it is filed under.
pub trait TableEntry {
    type Key: ?Sized;

    fn key(&self) -> &Self::Key;
}

/// A seeded, chained multimap.
///
/// Entries are linked into bucket `hash(key, seed) & (bucket_count - 1)`. Several entries may
/// share a key; lookups return all of them in insertion order. The table doubles its bucket
/// count once it holds more entries than buckets.
pub struct HashTable<E, H = SeededFnv> {
    buckets: Vec<Vec<E>>,
    hasher: H,
    seed: u64,
    exponent: u8,
    len: usize,
}

impl<E, H> HashTable<E, H>
where
    E: TableEntry,
    H: KeyHasher<E::Key>,
{
    /// Creates a table of `2^exponent` buckets.
    ///
    /// `exponent` is capped at [`MAX_EXPONENT`].
    pub fn new(hasher: H, seed: u64, exponent: u8) -> Self {
        let exponent = exponent.min(MAX_EXPONENT);
        Self { buckets: empty_buckets(1 << exponent), hasher, seed, exponent, len: 0 }
    }

    /// Creates a table with a randomly drawn seed, so that keys chosen by a peer cannot be
    /// crafted to collide.
    pub fn with_random_seed(exponent: u8) -> Self
    where
        H: Default,
    {
        Self::new(H::default(), rand::random(), exponent)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn exponent(&self) -> u8 {
        self.exponent
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Bucket index `key` maps to under the current seed and size.
    #[inline]
    pub fn bucket_of(&self, key: &E::Key) -> usize {
        self.index(self.hasher.hash(key, self.seed))
    }

    /// Links `entry` into the bucket its key hashes to. Existing entries with the same key are
    /// kept.
    pub fn put(&mut self, entry: E) {
        if self.len >= self.buckets.len() && self.exponent < MAX_EXPONENT {
            self.grow();
        }

        let bucket = self.bucket_of(entry.key());
        self.buckets[bucket].push(entry);
        self.len += 1;
    }

    /// First entry filed under `key`.
    pub fn get(&self, key: &E::Key) -> Option<&E> {
        self.buckets[self.bucket_of(key)].iter().find(|entry| self.hasher.key_eq(entry.key(), key))
    }

    /// Every entry filed under `key`, in insertion order.
    pub fn get_all<'a>(&'a self, key: &'a E::Key) -> impl Iterator<Item = &'a E> + 'a {
        let bucket = &self.buckets[self.bucket_of(key)];
        bucket.iter().filter(move |entry| self.hasher.key_eq(entry.key(), key))
    }

    pub fn contains_key(&self, key: &E::Key) -> bool {
        self.get(key).is_some()
    }

    /// Unlinks and returns every entry filed under `key`.
    pub fn remove_all(&mut self, key: &E::Key) -> Vec<E> {
        let index = self.bucket_of(key);
        let bucket = mem::take(&mut self.buckets[index]);

        let (removed, kept): (Vec<E>, Vec<E>) = bucket.into_iter().partition(|entry| self.hasher.key_eq(entry.key(), key));

        self.buckets[index] = kept;
        self.len -= removed.len();
        removed
    }

    /// Keeps only the entries for which `f` returns `true`.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&E) -> bool,
    {
        let mut len = 0;
        for bucket in &mut self.buckets {
            bucket.retain(&mut f);
            len += bucket.len();
        }
        self.len = len;
    }

    /// Iterates all entries, bucket by bucket.
    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.buckets.iter().flatten()
    }

    /// Drops every entry, keeping the bucket array.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.len = 0;
    }

    #[inline]
    fn index(&self, hash: u64) -> usize {
        // bucket count is a power of two
        (hash as usize) & (self.buckets.len() - 1)
    }

    fn grow(&mut self) {
        self.exponent += 1;
        let old = mem::replace(&mut self.buckets, empty_buckets(1 << self.exponent));
        trace!(exponent = self.exponent, entries = self.len, "hash table grown");

        for entry in old.into_iter().flatten() {
            let bucket = self.bucket_of(entry.key());
            self.buckets[bucket].push(entry);
        }
    }
}

fn empty_buckets<E>(count: usize) -> Vec<Vec<E>> {
    let mut buckets = Vec::with_capacity(count);
    buckets.resize_with(count, Vec::new);
    buckets
}

impl<E, H> fmt::Debug for HashTable<E, H>
where
    E: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashTable")
            .field("len", &self.len)
            .field("exponent", &self.exponent)
            .field("entries", &self.buckets.iter().flatten().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
