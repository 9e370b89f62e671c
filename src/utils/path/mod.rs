//! Path utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - [`fs`]: Filesystem path normalization (`normalize_path`, `resolve_in`, `unsafe_target`)

pub mod fs;

pub use fs::{normalize_path, resolve_in, unsafe_target};
