//! Project initialization.
//!
//! Writes a starter project that builds out of the box:
//!
//! ```text
//! czpack.toml
//! czml_files/
//! src/index.html
//! src/index.js
//! ```
//!
//! Existing files are left untouched.

use crate::{
    config::{CONFIG_FILE, ProjectConfig},
    log,
    utils::plural_count,
};
use anyhow::{Context, Result};
use std::{fs, path::Path};

const CONFIG_TEMPLATE: &str = r#"# czpack configuration

[build]
output = "dist"
filename = "[name].js"

[build.entry]
app = "src/index.js"

[data]
dir = "czml_files"
extension = "czml"
copy_to = "czml"

[template]
path = "src/index.html"
output = "index.html"
param = "czml"
inject = true

[[copy]]
from = "node_modules/cesium/Build/Cesium/Workers"
to = "Workers"

[[copy]]
from = "node_modules/cesium/Source/Assets"
to = "Assets"

[[copy]]
from = "node_modules/cesium/Source/Widgets"
to = "Widgets"

[define]
CESIUM_BASE_URL = ""

[serve]
interface = "127.0.0.1"
port = 8080
watch = true
"#;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>CZML viewer</title>
  <link rel="stylesheet" href="Widgets/widgets.css">
  <style>html, body, #viewer { width: 100%; height: 100%; margin: 0; }</style>
</head>
<body>
  <select id="scenes">
    <!-- @each czml -->
    <option value="__ITEM_URL__">__ITEM__</option>
    <!-- @end -->
  </select>
  <div id="viewer"></div>
  <script>window.CZML_FILES = __CZML__;</script>
</body>
</html>
"#;

const INDEX_JS: &str = r#"// Entry point. CESIUM_BASE_URL is substituted at build time.
window.CESIUM_BASE_URL = CESIUM_BASE_URL;
"#;

const DATA_DIR: &str = "czml_files";

/// Create the starter project at the config root.
pub fn new_project(config: &ProjectConfig) -> Result<()> {
    let root = config.get_root();
    fs::create_dir_all(root.join("src"))
        .with_context(|| format!("Failed to create '{}'", root.display()))?;
    fs::create_dir_all(root.join(DATA_DIR))
        .with_context(|| format!("Failed to create '{}'", root.join(DATA_DIR).display()))?;

    let config_name = config
        .config_path
        .file_name()
        .map_or_else(|| CONFIG_FILE.into(), |n| n.to_string_lossy());
    let files = [
        (&*config_name, CONFIG_TEMPLATE),
        ("src/index.html", INDEX_HTML),
        ("src/index.js", INDEX_JS),
        (".gitignore", "/dist\n/node_modules\n"),
    ];
    let mut written = 0;
    for (rel, content) in files {
        if write_if_absent(&root.join(rel), content)? {
            written += 1;
        } else {
            log!("init"; "{} exists, skipped", rel);
        }
    }

    log!(
        "init";
        "project ready at {} ({} written)",
        root.display(),
        plural_count(written, "file")
    );
    Ok(())
}

/// Returns `false` when the file already exists.
fn write_if_absent(path: &Path, content: &str) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    fs::write(path, content).with_context(|| format!("Failed to write '{}'", path.display()))?;
    Ok(true)
}
