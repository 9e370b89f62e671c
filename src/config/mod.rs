//! Project configuration management for `czpack.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [build] [data] [template] [[copy]] [define] [serve]
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! ├── util.rs        # config file discovery
//! └── mod.rs         # ProjectConfig (this file)
//! ```
//!
//! Every section is optional. An empty `czpack.toml` describes the default
//! layout: `src/index.js` bundled into `dist/app.js`, `src/index.html`
//! rendered with the `.czml` files found in `../czml_files`, and the
//! rendering library's runtime directories copied next to it.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{
    BuildConfig, CopyPattern, DataConfig, DefineConfig, ServeConfig, TemplateConfig,
    default_copy_patterns,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{BuildArgs, Cli, Commands},
    log,
};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default config file name.
pub const CONFIG_FILE: &str = "czpack.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing czpack.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Entries and output
    #[serde(default)]
    pub build: BuildConfig,

    /// Data file directory
    #[serde(default)]
    pub data: DataConfig,

    /// HTML template
    #[serde(default)]
    pub template: TemplateConfig,

    /// Static directories mirrored into the output
    #[serde(default = "default_copy_patterns")]
    pub copy: Vec<CopyPattern>,

    /// Constants substituted into bundles
    #[serde(default)]
    pub define: DefineConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            root: PathBuf::new(),
            build: BuildConfig::default(),
            data: DataConfig::default(),
            template: TemplateConfig::default(),
            copy: default_copy_patterns(),
            define: DefineConfig::default(),
            serve: ServeConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Load configuration from CLI arguments.
    ///
    /// For non-Init commands, searches upward from cwd to find the config
    /// file. The project root is the config file's parent directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let (config_path, exists) = Self::resolve_config_path(cli)?;

        if !cli.is_init() && !exists {
            bail!(ConfigError::Validation(format!(
                "config file '{}' not found, run 'czpack init' to create a new project",
                cli.config.display()
            )));
        }

        let mut config = if exists && !cli.is_init() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };

        config.config_path = config_path;
        config.finalize(cli);

        if !cli.is_init() {
            config.validate()?;
        }

        Ok(config)
    }

    /// Resolve config file path based on command.
    fn resolve_config_path(cli: &Cli) -> Result<(PathBuf, bool)> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        match &cli.command {
            Commands::Init { name } => {
                let dir = name.as_ref().map_or_else(|| cwd.clone(), |n| cwd.join(n));
                let path = dir.join(&cli.config);
                let exists = path.exists();
                Ok((path, exists))
            }
            _ => match find_config_file(&cli.config) {
                Some(path) => Ok((path, true)),
                None => Ok((cwd.join(&cli.config), false)),
            },
        }
    }

    /// Finalize configuration after loading.
    fn finalize(&mut self, cli: &Cli) {
        let root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        if let Some(output) = &cli.output {
            self.build.output = output.clone();
        }
        self.normalize_paths(&root);
        self.apply_command_options(cli);
    }

    /// Parse configuration from TOML string
    #[cfg(test)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
            if !Self::prompt_continue()? {
                bail!("Aborted due to unknown config fields");
            }
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        eprintln!();
        log!("warning"; "unknown fields in {}:", display_path);
        log!("warning"; "ignoring:");
        for field in fields {
            eprintln!("- {}", field);
        }
        eprintln!();
    }

    /// Prompt user to continue. Returns true only if user explicitly confirms.
    fn prompt_continue() -> Result<bool> {
        use std::io::{self, Write};

        eprint!("Continue? [y/N] ");
        io::stderr().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        let input = input.trim().to_lowercase();
        Ok(input == "y" || input == "yes")
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Get path relative to the project root, for display.
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    /// Absolute path of the rendered template.
    pub fn template_output(&self) -> PathBuf {
        self.build.output.join(&self.template.output)
    }

    /// Every copy pattern, with the data directory appended last.
    pub fn copy_patterns(&self) -> Vec<CopyPattern> {
        let mut patterns = self.copy.clone();
        patterns.push(CopyPattern::new(&self.data.dir, &self.data.copy_to));
        patterns
    }

    /// Sources that should trigger a rebuild in watch mode.
    pub fn watch_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.config_path.clone(), self.template.path.clone()];
        paths.extend(self.build.entry.values().cloned());
        paths.push(self.data.dir.clone());
        paths
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Build { build_args } => self.apply_build_args(build_args),
            Commands::Serve {
                build_args,
                interface,
                port,
                watch,
            } => {
                self.apply_build_args(build_args);
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
                Self::update_option(&mut self.serve.watch, watch.as_ref());
            }
            Commands::Init { .. } | Commands::Manifest { .. } => {}
        }
    }

    fn apply_build_args(&mut self, args: &BuildArgs) {
        crate::logger::set_verbose(args.verbose);
        self.build.clean = args.clean;
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Resolve every configured path against the project root.
    pub fn normalize_paths(&mut self, root: &Path) {
        let root = crate::utils::path::normalize_path(root);
        self.config_path = crate::utils::path::normalize_path(&self.config_path);

        self.build.normalize(&root);
        self.data.normalize(&root);
        self.template.normalize(&root);
        for pattern in &mut self.copy {
            pattern.normalize(&root);
        }
        self.root = root;
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.build.validate(&mut diag);
        self.data.validate(&mut diag);
        self.template.validate(&mut diag);
        self.define.validate(&mut diag);
        section::validate_copy_targets(&self.copy, &self.data, &mut diag);

        if !self.template.path.exists() {
            diag.warn(
                TemplateConfig::FIELDS.path,
                format!(
                    "template '{}' not found",
                    self.root_relative(&self.template.path).display()
                ),
            );
        }

        diag.print_warnings();
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> ProjectConfig {
    let (parsed, ignored) = ProjectConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Default config rooted at `root`, with every path resolved.
#[cfg(test)]
pub fn test_config_at(root: &Path) -> ProjectConfig {
    let mut config = ProjectConfig {
        config_path: root.join(CONFIG_FILE),
        ..ProjectConfig::default()
    };
    config.normalize_paths(root);
    config
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_str_invalid_toml() {
        let result = ProjectConfig::from_str("[build\noutput = \"dist\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_str_empty_is_default_layout() {
        let config = ProjectConfig::from_str("").unwrap();
        assert_eq!(config.build.output, PathBuf::from("dist"));
        assert_eq!(config.data.extension, "czml");
        assert_eq!(config.copy, default_copy_patterns());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[data]\nextension = \"czml\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = ProjectConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.data.extension, "czml");
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_no_unknown_fields() {
        let content = "[data]\ndir = \"scenes\"\n[serve]\nport = 3000";
        let (_, ignored) = ProjectConfig::parse_with_ignored(content).unwrap();
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_normalize_paths() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path());
        let root = crate::utils::path::normalize_path(dir.path());

        assert_eq!(config.root, root);
        assert_eq!(config.build.output, root.join("dist"));
        assert_eq!(config.template.path, root.join("src/index.html"));
        assert_eq!(config.build.entry["app"], root.join("src/index.js"));
        assert!(config.copy.iter().all(|p| p.from.starts_with(&root)));
        // Copy destinations stay relative to output
        assert_eq!(config.copy[0].to, PathBuf::from("Workers"));
    }

    #[test]
    fn test_copy_patterns_include_data() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path());
        let patterns = config.copy_patterns();

        let last = patterns.last().unwrap();
        assert_eq!(last.to, PathBuf::from("czml"));
        assert_eq!(last.from, config.data.dir);
        assert_eq!(patterns.len(), config.copy.len() + 1);
    }

    #[test]
    fn test_validate_default_config() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path());
        // Missing template only warns
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_collects_errors() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config_at(dir.path());
        config.data.extension = String::new();
        config.build.filename = "bundle.js".into();

        let err = config.validate().unwrap_err();
        let Some(ConfigError::Diagnostics(diag)) = err.downcast_ref::<ConfigError>() else {
            panic!("expected diagnostics, got {err}");
        };
        assert_eq!(diag.len(), 2);
    }

    #[test]
    fn test_validate_rejects_targets_outside_output() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config_at(dir.path());
        config.data.copy_to = "../outside".into();
        config.template.output = "../../index.html".into();

        let err = config.validate().unwrap_err();
        let Some(ConfigError::Diagnostics(diag)) = err.downcast_ref::<ConfigError>() else {
            panic!("expected diagnostics, got {err}");
        };
        let fields: Vec<_> = diag.errors().iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            [DataConfig::FIELDS.copy_to, TemplateConfig::FIELDS.output]
        );
    }

    #[test]
    fn test_root_relative() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path());
        assert_eq!(
            config.root_relative(&config.template.path),
            PathBuf::from("src/index.html")
        );
    }
}
