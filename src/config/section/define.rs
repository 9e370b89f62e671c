//! `[define]` section configuration.
//!
//! Global constants substituted into every bundle. Values are emitted as
//! JSON string literals.
//!
//! ```toml
//! [define]
//! CESIUM_BASE_URL = ""      # becomes "" wherever the identifier appears
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

const FIELD: FieldPath = FieldPath::new("define");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefineConfig(pub BTreeMap<String, String>);

impl Default for DefineConfig {
    fn default() -> Self {
        Self(BTreeMap::from([(
            "CESIUM_BASE_URL".to_string(),
            String::new(),
        )]))
    }
}

impl DefineConfig {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for key in self.0.keys() {
            if !is_js_identifier(key) {
                diag.error(FIELD, format!("'{key}' is not a valid identifier"));
            }
        }
    }
}

/// ASCII subset of JavaScript identifier syntax.
pub fn is_js_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
