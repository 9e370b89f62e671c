//! czpack - static bundle builder for CZML map viewers.

mod bundle;
mod cli;
mod config;
mod copy;
mod logger;
mod manifest;
mod template;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::ProjectConfig;

fn main() -> Result<()> {
    // before any blocking operation, including the unknown-field prompt
    cli::serve::setup_shutdown_handler()?;

    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {}
    }

    let config = ProjectConfig::load(cli)?;

    match &cli.command {
        Commands::Init { .. } => cli::init::new_project(&config),
        Commands::Build { .. } => cli::build::build_and_log(&config).map(|_| ()),
        Commands::Serve { .. } => cli::serve::serve_project(cli, &config),
        Commands::Manifest { pretty } => cli::manifest::print_manifest(&config, *pretty),
    }
}
