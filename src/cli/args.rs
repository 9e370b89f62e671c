//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// czpack: static bundle builder for CZML map viewers
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Output directory path (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Config file path (default: czpack.toml)
    #[arg(short = 'C', long, global = true, default_value = "czpack.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create a new project with a starter template
    #[command(visible_alias = "i")]
    Init {
        /// Project directory name/path (relative to current directory)
        #[arg(value_hint = clap::ValueHint::DirPath)]
        name: Option<PathBuf>,
    },

    /// Build the bundle once
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Build, serve the output directory and rebuild on changes
    #[command(visible_alias = "s")]
    Serve {
        #[command(flatten)]
        build_args: BuildArgs,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable file watching for auto-rebuild
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,
    },

    /// Print the data file manifest as JSON
    #[command(visible_alias = "m")]
    Manifest {
        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },
}

/// Shared build arguments for Build and Serve commands
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Clean output directory completely before building
    #[arg(short, long)]
    pub clean: bool,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

impl Cli {
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Commands::Init { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build() {
        let cli = Cli::try_parse_from(["czpack", "build", "--clean", "-o", "public"]).unwrap();
        assert_eq!(cli.output, Some(PathBuf::from("public")));
        assert_eq!(cli.config, PathBuf::from("czpack.toml"));
        let Commands::Build { build_args } = cli.command else {
            panic!("expected build");
        };
        assert!(build_args.clean);
        assert!(!build_args.verbose);
    }

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::try_parse_from(["czpack", "serve", "-p", "9000", "--watch", "false"]).unwrap();
        let Commands::Serve { port, watch, .. } = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(port, Some(9000));
        assert_eq!(watch, Some(false));
    }

    #[test]
    fn test_parse_watch_without_value() {
        let cli = Cli::try_parse_from(["czpack", "s", "-w"]).unwrap();
        let Commands::Serve { watch, .. } = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(watch, Some(true));
    }

    #[test]
    fn test_parse_init_and_manifest() {
        let cli = Cli::try_parse_from(["czpack", "init", "viewer"]).unwrap();
        assert!(cli.is_init());

        let cli = Cli::try_parse_from(["czpack", "manifest", "--pretty"]).unwrap();
        assert!(matches!(cli.command, Commands::Manifest { pretty: true }));
    }
}
