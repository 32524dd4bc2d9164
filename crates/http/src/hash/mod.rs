//! Seeded chained hash table.
//!
//! [`HashTable`] is a small multimap tuned for short-lived, per-message indexes such as request
//! headers. The hash function is a type parameter implementing [`KeyHasher`], so each use site
//! picks its own hashing at compile time, and every table carries a seed that is mixed into
//! each hash. [`HashTable::with_random_seed`] draws that seed at random, which keeps a peer
//! from choosing header names that all fall into one bucket.
//!
//! # Example
//!
//! ```
//! use micro_http_core::hash::{HashTable, SeededFnv, TableEntry};
//!
//! struct Field(&'static str, u32);
//!
//! impl TableEntry for Field {
//!     type Key = str;
//!
//!     fn key(&self) -> &str {
//!         self.0
//!     }
//! }
//!
//! let mut table = HashTable::new(SeededFnv, 42, 4);
//! table.put(Field("accept", 1));
//! table.put(Field("accept", 2));
//!
//! let values: Vec<u32> = table.get_all("accept").map(|f| f.1).collect();
//! assert_eq!(values, vec![1, 2]);
//! ```

mod hasher;
mod table;

pub use hasher::AsciiCaseInsensitive;
pub use hasher::KeyHasher;
pub use hasher::SeededFnv;
pub use table::HashTable;
pub use table::TableEntry;
pub use table::MAX_EXPONENT;
