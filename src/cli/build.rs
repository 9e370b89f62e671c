//! Bundle building orchestration.
//!
//! Build pipeline phases, strictly in order:
//! - **Clean** - Remove the output directory (`--clean` only)
//! - **Scan** - Data file manifest (aborts the build on error)
//! - **Bundle** - Emit entries with `[define]` substitution
//! - **Render** - HTML template with the manifest and bundle tags
//! - **Copy** - Mirror static directories and the data directory

use crate::{
    bundle::{BundleOutput, emit_bundles},
    config::ProjectConfig,
    copy::{CopyStats, copy_patterns},
    log,
    manifest::{Manifest, scan_manifest},
    template::{IndexVars, Template},
    utils::plural_count,
};
use anyhow::{Context, Result};
use std::{fs, path::PathBuf, time::Instant};

/// Result of one build.
#[derive(Debug)]
pub struct BuildReport {
    pub manifest: Manifest,
    pub bundles: Vec<BundleOutput>,
    pub page: PathBuf,
    pub copy: CopyStats,
}

impl BuildReport {
    /// One-line summary for the log.
    pub fn summary(&self) -> String {
        format!(
            "{}, {}, {} copied ({} fresh)",
            plural_count(self.manifest.len(), "data file"),
            plural_count(self.bundles.len(), "bundle"),
            plural_count(self.copy.copied, "file"),
            self.copy.skipped
        )
    }
}

/// Run the full pipeline once.
pub fn build_project(config: &ProjectConfig) -> Result<BuildReport> {
    let output_dir = &config.build.output;

    if config.build.clean && output_dir.exists() {
        fs::remove_dir_all(output_dir).with_context(|| {
            format!("Failed to clean output directory '{}'", output_dir.display())
        })?;
    }
    fs::create_dir_all(output_dir).with_context(|| {
        format!("Failed to create output directory '{}'", output_dir.display())
    })?;

    let manifest = scan_manifest(&config.data.dir, &config.data.extension)?;
    crate::debug!("scan"; "{:?}", manifest.names());

    let bundles = emit_bundles(config)?;
    let page = render_page(config, &manifest, &bundles)?;
    let copy = copy_patterns(&config.copy_patterns(), output_dir, config.build.clean)?;

    Ok(BuildReport {
        manifest,
        bundles,
        page,
        copy,
    })
}

/// Build and log the summary.
pub fn build_and_log(config: &ProjectConfig) -> Result<BuildReport> {
    let start = Instant::now();
    let report = build_project(config)?;
    crate::debug!("render"; "{}", config.root_relative(&report.page).display());
    log!("build"; "{} in {}ms", report.summary(), start.elapsed().as_millis());
    Ok(report)
}

/// Render the HTML template into the output directory.
fn render_page(
    config: &ProjectConfig,
    manifest: &Manifest,
    bundles: &[BundleOutput],
) -> Result<PathBuf> {
    let template = Template::load(&config.template.path)?;
    let scripts: Vec<String> = bundles.iter().map(|b| b.file_name.clone()).collect();
    let data_prefix = config.data.url_prefix();

    let vars = IndexVars {
        param: &config.template.param,
        manifest,
        data_prefix: &data_prefix,
        scripts: &scripts,
        inject: config.template.inject,
    };
    let html = template.render(&vars).with_context(|| {
        format!(
            "Failed to render '{}'",
            config.root_relative(&config.template.path).display()
        )
    })?;

    let page = config.template_output();
    if let Some(parent) = page.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&page, html).with_context(|| format!("Failed to write '{}'", page.display()))?;
    Ok(page)
}
