//! Entry emission with global constant substitution.
//!
//! Each `[build.entry]` source is copied to the output directory under the
//! `[build] filename` pattern. Identifiers listed in `[define]` are replaced
//! by JSON string literals on the way:
//!
//! ```text
//! buildModuleUrl.setBaseUrl(CESIUM_BASE_URL);   // source
//! buildModuleUrl.setBaseUrl("");                // emitted
//! ```
//!
//! Property accesses (`window.CESIUM_BASE_URL`) are left alone.
//! Imports are not resolved.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::config::{DefineConfig, ProjectConfig};

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*").expect("valid regex"));

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("cannot read entry `{name}` from `{}`", path.display())]
    Read {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write bundle `{}`", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One emitted bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleOutput {
    pub name: String,
    pub source: PathBuf,
    pub output: PathBuf,
    /// File name relative to the output directory.
    pub file_name: String,
}

/// Compiled `[define]` table: identifier -> JSON literal.
pub struct Defines {
    literals: FxHashMap<String, String>,
}

impl Defines {
    pub fn new(define: &DefineConfig) -> Self {
        let literals = define
            .iter()
            .map(|(key, value)| {
                // Serializing a &str into JSON cannot fail
                let literal = serde_json::to_string(value).unwrap_or_else(|_| "\"\"".into());
                (key.to_string(), literal)
            })
            .collect();
        Self { literals }
    }

    /// Replace defined identifiers that appear as standalone tokens.
    pub fn apply(&self, source: &str) -> String {
        if self.literals.is_empty() {
            return source.to_string();
        }

        let mut out = String::with_capacity(source.len());
        let mut last = 0;
        for m in IDENTIFIER.find_iter(source) {
            if let Some(literal) = self.literals.get(m.as_str())
                && !is_member_access(source, m.start())
            {
                out.push_str(&source[last..m.start()]);
                out.push_str(literal);
                last = m.end();
            }
        }
        out.push_str(&source[last..]);
        out
    }
}

/// True when the token at `start` follows `.` or continues a number.
fn is_member_access(source: &str, start: usize) -> bool {
    source[..start]
        .chars()
        .next_back()
        .is_some_and(|c| c == '.' || c.is_ascii_digit())
}

/// Emit every configured entry into the output directory.
///
/// Entries are processed in name order.
pub fn emit_bundles(config: &ProjectConfig) -> Result<Vec<BundleOutput>, BundleError> {
    let defines = Defines::new(&config.define);
    let output_dir = &config.build.output;

    config
        .build
        .entry
        .iter()
        .map(|(name, source)| {
            let file_name = config.build.bundle_name(name);
            let output = output_dir.join(&file_name);
            emit_one(name, source, &output, &defines)?;
            crate::debug!("bundle"; "{} -> {}", name, file_name);
            Ok(BundleOutput {
                name: name.clone(),
                source: source.clone(),
                output,
                file_name,
            })
        })
        .collect()
}

fn emit_one(name: &str, source: &Path, output: &Path, defines: &Defines) -> Result<(), BundleError> {
    let code = fs::read_to_string(source).map_err(|e| BundleError::Read {
        name: name.to_string(),
        path: source.to_path_buf(),
        source: e,
    })?;

    let write_err = |e| BundleError::Write {
        path: output.to_path_buf(),
        source: e,
    };
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(output, defines.apply(&code)).map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn defines(pairs: &[(&str, &str)]) -> Defines {
        let map: BTreeMap<_, _> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Defines::new(&DefineConfig(map))
    }

    #[test]
    fn test_define_replaces_tokens() {
        let d = defines(&[("CESIUM_BASE_URL", "")]);
        assert_eq!(
            d.apply("setBaseUrl(CESIUM_BASE_URL);"),
            "setBaseUrl(\"\");"
        );
    }

    #[test]
    fn test_define_skips_member_and_partial() {
        let d = defines(&[("BASE", "/x")]);
        assert_eq!(d.apply("window.BASE"), "window.BASE");
        assert_eq!(d.apply("BASE_URL + MY_BASE"), "BASE_URL + MY_BASE");
        assert_eq!(d.apply("BASE+BASE"), "\"/x\"+\"/x\"");
    }

    #[test]
    fn test_define_value_is_json_escaped() {
        let d = defines(&[("TITLE", "say \"hi\"")]);
        assert_eq!(d.apply("TITLE"), r#""say \"hi\"""#);
    }

    #[test]
    fn test_no_defines_is_identity() {
        let d = defines(&[]);
        assert_eq!(d.apply("a.b(c)"), "a.b(c)");
    }

    #[test]
    fn test_emit_bundles() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path());
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(
            dir.path().join("src/index.js"),
            "window.CESIUM_BASE_URL = CESIUM_BASE_URL;",
        )
        .unwrap();

        let outputs = emit_bundles(&config).unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].name, "app");
        assert_eq!(outputs[0].file_name, "app.js");

        let emitted = fs::read_to_string(config.build.output.join("app.js")).unwrap();
        assert_eq!(emitted, "window.CESIUM_BASE_URL = \"\";");
    }

    #[test]
    fn test_emit_missing_entry() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path());

        let err = emit_bundles(&config).unwrap_err();
        assert!(matches!(err, BundleError::Read { ref name, .. } if name == "app"));
    }
}
