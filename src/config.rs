use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use eyre::{Context, Result, eyre};
use serde::Deserialize;

use crate::export::{ExportTarget, OutputFormat};
use crate::filter::FilterOptions;
use crate::raster::Sizing;
use crate::render::RenderOptions;
use crate::theme::ThemeName;

const OUTPUT_PREFIX: &str = "claude-conversation";

/// Configuration required to run an export.
/// This decouples the logic from how the arguments were parsed (CLI/Config file).
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    pub input: PathBuf,
    pub target: ExportTarget,
    pub render: RenderOptions,
    pub filter: FilterOptions,
    pub theme: ThemeName,
    pub chrome_path: Option<PathBuf>,
    pub quiet: bool,
}

/// Persistent preferences from `config.toml`. Every key is optional.
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub output_dir: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub theme: Option<ThemeName>,
    pub width: Option<u32>,
    pub scale: Option<f64>,
    pub include_thinking: Option<bool>,
    pub include_tools: Option<bool>,
    pub chrome_path: Option<PathBuf>,
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("convo-print/config.toml"))
}

pub fn load_file_config(explicit_path: Option<&Path>) -> Result<FileConfig> {
    let path = if let Some(p) = explicit_path {
        if !p.exists() {
            return Err(eyre!("Config file not found: {}", p.display()));
        }
        Some(p.to_path_buf())
    } else {
        default_config_path().filter(|p| p.exists())
    };

    match path {
        None => Ok(FileConfig::default()),
        Some(p) => {
            let content = fs::read_to_string(&p)
                .wrap_err_with(|| format!("Failed to read config: {}", p.display()))?;
            toml::from_str(&content)
                .wrap_err_with(|| format!("Failed to parse config: {}", p.display()))
        }
    }
}

/// The desktop, or `~/Desktop` where the platform has no notion of one.
pub fn default_output_dir() -> Option<PathBuf> {
    dirs::desktop_dir().or_else(|| dirs::home_dir().map(|h| h.join("Desktop")))
}

/// `claude-conversation-2025-01-31T09-15-00.png`
pub fn default_file_name(now: DateTime<Utc>, format: OutputFormat) -> String {
    format!(
        "{OUTPUT_PREFIX}-{}.{}",
        now.format("%Y-%m-%dT%H-%M-%S"),
        format.extension()
    )
}

/// Format precedence: explicit flag, output extension, config file, PNG.
pub fn resolve_format(
    flag: Option<OutputFormat>,
    output: Option<&Path>,
    file: Option<OutputFormat>,
) -> OutputFormat {
    flag.or_else(|| output.and_then(OutputFormat::from_extension))
        .or(file)
        .unwrap_or_default()
}

pub fn validate_sizing(sizing: &Sizing) -> Result<()> {
    if sizing.width == 0 {
        return Err(eyre!("Width must be positive"));
    }
    if !(sizing.scale.is_finite() && sizing.scale > 0.0) {
        return Err(eyre!("Scale must be a positive number, got {}", sizing.scale));
    }
    Ok(())
}
