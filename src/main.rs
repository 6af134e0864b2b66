//! socialcard - Social preview cards for static site pages.

#![allow(dead_code)]

mod card;
mod cli;
mod config;
mod logger;
mod page;
mod utils;

use anyhow::Result;
use card::text::SvgTextRasterizer;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SiteConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    match &cli.command {
        Commands::Build { .. } => {
            let config = SiteConfig::load(&cli)?;
            let rasterizer = SvgTextRasterizer::new();
            cli::build::run(&config, &rasterizer).map(|_| ())
        }
        Commands::Render { args } => {
            let config = SiteConfig::load_or_default(&cli)?;
            let rasterizer = SvgTextRasterizer::new();
            cli::render::run(args, &config, &rasterizer)
        }
    }
}
