//! `[data]` section configuration.
//!
//! Where the data files live, which extension marks them, and where they
//! are mirrored in the output.
//!
//! # Example
//!
//! ```toml
//! [data]
//! dir = "../czml_files"   # scanned (non-recursively) for the manifest
//! extension = "czml"      # exact, case-sensitive match on the last segment
//! copy_to = "czml"        # output/czml/
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::utils::path::unsafe_target;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory scanned for data files.
    pub dir: PathBuf,

    /// Target extension, without the leading dot.
    pub extension: String,

    /// Output subdirectory the data directory is copied into.
    pub copy_to: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: "../czml_files".into(),
            extension: "czml".into(),
            copy_to: "czml".into(),
        }
    }
}

pub struct DataFields {
    pub extension: FieldPath,
    pub copy_to: FieldPath,
}

impl DataConfig {
    pub const FIELDS: DataFields = DataFields {
        extension: FieldPath::new("data.extension"),
        copy_to: FieldPath::new("data.copy_to"),
    };

    pub fn normalize(&mut self, root: &Path) {
        self.dir = crate::utils::path::resolve_in(root, &self.dir);
    }

    /// URL prefix (forward slashes) under which data files are served.
    pub fn url_prefix(&self) -> String {
        self.copy_to
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .collect::<Vec<_>>()
            .join("/")
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.extension.is_empty() {
            diag.error(Self::FIELDS.extension, "extension must not be empty");
        } else if self.extension.contains('.') {
            // Only the last dot-segment is ever compared, a dotted extension can never match
            diag.error_with_hint(
                Self::FIELDS.extension,
                format!("'{}' contains a dot and would never match", self.extension),
                format!(
                    "use extension = \"{}\"",
                    self.extension.rsplit('.').next().unwrap_or_default()
                ),
            );
        }

        if let Some(reason) = unsafe_target(&self.copy_to) {
            diag.error_with_hint(
                Self::FIELDS.copy_to,
                format!("'{}': {reason}", self.copy_to.display()),
                "use a subdirectory of the output, e.g. copy_to = \"czml\"",
            );
        }
    }
}
