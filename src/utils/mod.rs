//! Small shared helpers.

pub mod mime;
pub mod mtime;
pub mod path;
mod plural;

pub use plural::plural_count;
