//! `[template]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [template]
//! path = "src/index.html"   # template source (relative to project root)
//! output = "index.html"     # rendered file (relative to output dir)
//! param = "czml"            # name the manifest is exposed under
//! inject = true             # insert <script> tags for every bundle
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::utils::path::unsafe_target;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub path: PathBuf,
    pub output: PathBuf,
    pub param: String,
    pub inject: bool,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            path: "src/index.html".into(),
            output: "index.html".into(),
            param: "czml".into(),
            inject: true,
        }
    }
}

pub struct TemplateFields {
    pub path: FieldPath,
    pub output: FieldPath,
    pub param: FieldPath,
}

impl TemplateConfig {
    pub const FIELDS: TemplateFields = TemplateFields {
        path: FieldPath::new("template.path"),
        output: FieldPath::new("template.output"),
        param: FieldPath::new("template.param"),
    };

    pub fn normalize(&mut self, root: &Path) {
        self.path = crate::utils::path::resolve_in(root, &self.path);
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let param_ok = !self.param.is_empty()
            && self
                .param
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !param_ok {
            diag.error_with_hint(
                Self::FIELDS.param,
                format!("invalid parameter name '{}'", self.param),
                "use letters, digits or '_'",
            );
        }

        if let Some(reason) = unsafe_target(&self.output) {
            diag.error(
                Self::FIELDS.output,
                format!("'{}': {reason}", self.output.display()),
            );
        }
    }
}
