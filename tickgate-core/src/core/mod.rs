//! Core value types shared across the pipeline
//!
//! Everything here is `Copy`, allocation-free and safe to pass through
//! the hot path by value.

pub mod errors;
pub mod types;

pub use errors::{ConfigError, LoadError};
pub use types::{fixed_point, pad_symbol, Side, SymbolKey, MAX_SYMBOLS};
