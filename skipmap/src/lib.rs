//! A lock-free concurrent ordered map backed by a probabilistic skip list
//!
//! `skipmap` stores values under 64-bit hashed keys and keeps them sorted by
//! hash while allowing any number of threads to read and write without
//! locks. It provides the operations of a concurrent hash map — load, store,
//! delete, swap, compare-and-swap, compare-and-delete, load-or-store — plus
//! in-order iteration over the hashed key space.
//!
//! # Architecture
//!
//! ```text
//! SkipMap<K, V>             hashes user keys (HashKey)
//!      │
//!      ▼
//! SkipList<V>               find / insert / delete protocol across levels
//!      │
//!      ▼
//! Node { hash, val, tower } towers of atomic next-pointers, one per level;
//!                           deletion flags ride in the pointers' tag bits
//! ```
//!
//! Writers publish every structural change with a single compare-and-swap,
//! readers never write except to lazily unlink already-deleted nodes, and
//! memory is reclaimed through `crossbeam`'s epoch scheme so a traversing
//! thread can never touch freed memory.
//!
//! # Example
//!
//! ```
//! use skipmap::SkipMap;
//!
//! let map: SkipMap<&str, u32> = SkipMap::new(16);
//! map.store(&"a", 1);
//! map.store(&"b", 2);
//! assert_eq!(map.load(&"a"), Some(1));
//! assert_eq!(map.delete(&"b"), Some(2));
//! assert_eq!(map.len(), 1);
//! ```

mod height;
mod list;
pub mod map;
mod node;
mod tag;
mod tower;

pub use map::SkipMap;
pub use skipmap_core::{Error, HashKey, Result};

/// Maximum tower height any list may be configured with.
pub const CAP_LEVEL: usize = 64;

/// Tower height used by [`SkipMap::default`].
pub const DEFAULT_MAX_LEVEL: usize = 16;
