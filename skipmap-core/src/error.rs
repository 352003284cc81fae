//! Error types for the skipmap project
//!
//! Construction is the only fallible surface. Map operations report
//! negative outcomes through their return values and never error.

use thiserror::Error;

/// The error type for skipmap construction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The requested maximum tower height is outside `1..=64`
    #[error("max level must be between 1 and 64, got {0}")]
    InvalidMaxLevel(usize),

    /// The level probability is outside the open interval `(0, 1)`
    #[error("level probability must be in (0, 1), got {0}")]
    InvalidProbability(f64),
}

/// A specialized Result type for skipmap construction
pub type Result<T> = std::result::Result<T, Error>;
