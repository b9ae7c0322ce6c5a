//! Site configuration.
//!
//! Two layers of configuration feed a run:
//!
//! - [`SiteConfig`]: optional `mdtree.toml` in the source root, merged on top
//!   of stock defaults. Controls markdown rendering and the dev server.
//! - [`GeneratorConfig`]: the resolved source and output directories handed
//!   to [`crate::generate::Generator::new`]. The CLI builds it from flags,
//!   falling back to `SiteConfig::output`.
//!
//! ## Config File
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! output = "public"            # Output directory, relative to the working directory
//!
//! [markdown]
//! auto_heading_ids = true      # Give every heading an id anchor
//! highlight = true             # Highlight fenced code blocks
//! theme = "base16-ocean.dark"  # Highlight theme (see `mdtree gen-config`)
//!
//! [server]
//! port = 8080
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file looked up in the source root.
pub const CONFIG_FILE: &str = "mdtree.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `mdtree.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Output directory used when `--output` is not given.
    pub output: String,
    /// Markdown rendering settings.
    pub markdown: MarkdownConfig,
    /// Static file server settings.
    pub server: ServerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            output: "public".to_string(),
            markdown: MarkdownConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.trim().is_empty() {
            return Err(ConfigError::Validation("output must not be empty".into()));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Validation("server.port must be non-zero".into()));
        }
        if self.markdown.highlight && self.markdown.theme.trim().is_empty() {
            return Err(ConfigError::Validation(
                "markdown.theme must be set when markdown.highlight is on".into(),
            ));
        }
        Ok(())
    }
}

/// Markdown rendering settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownConfig {
    /// Generate `id` anchors for headings that lack an explicit `{#id}`.
    pub auto_heading_ids: bool,
    /// Highlight fenced code blocks.
    pub highlight: bool,
    /// syntect theme name used for highlighting.
    pub theme: String,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            auto_heading_ids: true,
            highlight: true,
            theme: "base16-ocean.dark".to_string(),
        }
    }
}

/// Static file server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// Source and output directories of a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Root of the markdown tree. Defaults to the current working directory.
    pub root_path: PathBuf,
    /// Root of the generated site. Defaults to `public`.
    pub output_path: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            root_path: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            output_path: PathBuf::from("public"),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `mdtree.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no config file.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `mdtree.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `mdtree.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# mdtree configuration
# ====================
# Place this file in the root of your markdown tree as `mdtree.toml`.
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Output directory for the generated site, relative to the working directory.
# The --output flag takes precedence.
output = "public"

# ---------------------------------------------------------------------------
# Markdown rendering
# ---------------------------------------------------------------------------
[markdown]
# Give every heading an id anchor derived from its text ("# Hello World" ->
# id="hello-world"). Explicit anchors ("# Title {#anchor}") always win.
auto_heading_ids = true

# Highlight fenced code blocks with inline styles.
highlight = true

# Highlight theme. Bundled themes:
#   base16-ocean.dark, base16-eighties.dark, base16-mocha.dark,
#   base16-ocean.light, InspiredGitHub, Solarized (dark), Solarized (light)
theme = "base16-ocean.dark"

# ---------------------------------------------------------------------------
# Static file server (`mdtree serve`)
# ---------------------------------------------------------------------------
[server]
port = 8080
"##
}
