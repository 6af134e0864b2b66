//! Site configuration management for `socialcard.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section    # Raw [site] and [card] sections
//! ├── options    # PluginOptions: defaults + validation
//! ├── types/     # ConfigError, diagnostics, field paths
//! └── mod.rs     # SiteConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section  | Purpose                                          |
//! |----------|--------------------------------------------------|
//! | `[site]` | Content directory, public root, page manifest    |
//! | `[card]` | Localized text, colors, fonts, output file name  |

mod options;
mod section;
pub mod types;
mod util;

pub use options::{
    CUSTOM_FONT_TOKEN, DEFAULT_LANGUAGE, Localized, PluginOptions, validate_font_size,
    validate_localized,
};
pub use section::{CardSection, SiteSection};
pub use types::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath};

#[cfg(test)]
pub use options::test_options;

use crate::{
    cli::{BuildArgs, Cli, Commands},
    log,
    utils::path::normalize_path,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use util::find_config_file;

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing socialcard.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub site: SiteSection,

    #[serde(default)]
    pub card: CardSection,
}

impl SiteConfig {
    /// Load configuration for the given CLI invocation.
    ///
    /// Searches upward from cwd to find the config file. The project root
    /// is the config file's parent directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let config_path = find_config_file(&cli.config, &cwd)
            .ok_or_else(|| ConfigError::NotFound(cli.config.clone()))?;

        let mut config = Self::from_path(&config_path)?;
        config.config_path = normalize_path(&config_path);
        let root = config
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(cwd);

        config.apply_command_options(cli);
        config.normalize_paths(&root);
        Ok(config)
    }

    /// Like [`load`](Self::load), but falls back to defaults rooted at the
    /// current directory when no config file exists.
    pub fn load_or_default(cli: &Cli) -> Result<Self> {
        match Self::load(cli) {
            Err(e) if matches!(e.downcast_ref::<ConfigError>(), Some(ConfigError::NotFound(_))) => {
                let cwd =
                    std::env::current_dir().context("Failed to get current working directory")?;
                let mut config = Self::default();
                config.apply_command_options(cli);
                config.normalize_paths(&cwd);
                Ok(config)
            }
            other => other,
        }
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
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

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Resolve and validate the `[card]` section.
    pub fn options(&self) -> Result<PluginOptions, ConfigError> {
        PluginOptions::resolve(&self.card)
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Build { build_args } => self.apply_build_args(build_args),
            Commands::Render { args } => crate::logger::set_verbose(args.verbose),
        }
    }

    fn apply_build_args(&mut self, args: &BuildArgs) {
        crate::logger::set_verbose(args.verbose);

        Self::update_option(&mut self.site.content, args.content.as_ref());
        Self::update_option(&mut self.site.public, args.public.as_ref());
        if args.manifest.is_some() {
            self.site.manifest.clone_from(&args.manifest);
        }
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

    /// Normalize all paths relative to root directory.
    fn normalize_paths(&mut self, root: &Path) {
        let root = normalize_path(root);

        self.site.content = normalize_path(&root.join(&self.site.content));
        self.site.public = normalize_path(&root.join(&self.site.public));
        if let Some(manifest) = self.site.manifest.take() {
            self.site.manifest = Some(normalize_path(&root.join(manifest)));
        }
        if let Some(font_file) = self.card.font_file.take() {
            self.card.font_file = Some(normalize_path(&root.join(font_file)));
        }

        self.root = root;
    }
}

// ============================================================================
// tests
// ============================================================================
