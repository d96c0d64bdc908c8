//! fsgate Shared Types and Utilities
//!
//! This crate contains types, errors, and utilities shared across the fsgate platform.

pub mod accounts;
pub mod error;
pub mod types;

pub use accounts::*;
pub use error::*;
pub use types::*;
