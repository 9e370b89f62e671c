//! Configuration section definitions.
//!
//! Each module corresponds to a section in `czpack.toml`:
//!
//! | Module     | TOML Section   | Purpose                                |
//! |------------|----------------|----------------------------------------|
//! | `build`    | `[build]`      | Entries, output dir, bundle filenames  |
//! | `data`     | `[data]`       | Data file directory and extension      |
//! | `template` | `[template]`   | HTML template and manifest parameter   |
//! | `copy`     | `[[copy]]`     | Static asset directories to mirror     |
//! | `define`   | `[define]`     | Constants substituted into bundles     |
//! | `serve`    | `[serve]`      | Development server                     |

pub mod build;
mod copy;
mod data;
mod define;
mod serve;
mod template;

pub use build::BuildConfig;
pub use copy::{CopyPattern, default_copy_patterns, validate_copy_targets};
pub use data::DataConfig;
pub use define::DefineConfig;
pub use serve::ServeConfig;
pub use template::TemplateConfig;
