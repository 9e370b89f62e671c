//! `czpack manifest`: print the data file manifest as JSON.

use crate::{config::ProjectConfig, manifest::scan_manifest};
use anyhow::Result;
use std::io::Write;

/// Scan the data directory and write the manifest to stdout.
pub fn print_manifest(config: &ProjectConfig, pretty: bool) -> Result<()> {
    let manifest = scan_manifest(&config.data.dir, &config.data.extension)?;
    let json = if pretty {
        serde_json::to_string_pretty(&manifest)?
    } else {
        serde_json::to_string(&manifest)?
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}")?;
    Ok(())
}
