//! Core types for the skipmap project
//!
//! This crate contains the pieces shared by everything above the skip list
//! engine:
//!
//! - Error handling with [`Error`] and [`Result`]
//! - The [`HashKey`] trait that maps user keys into the engine's `u64` key
//!   space, and the deterministic byte hash behind it
//!
//! # Example
//!
//! ```
//! use skipmap_core::HashKey;
//!
//! // Integers are their own hash, so they sort in numeric order.
//! assert_eq!(42u64.hash64(), 42);
//!
//! // Strings go through a deterministic 64-bit hash.
//! assert_eq!("user:123".hash64(), "user:123".hash64());
//! ```

pub mod error;
pub mod hash;

pub use error::{Error, Result};
pub use hash::{hash_bytes, HashKey};
