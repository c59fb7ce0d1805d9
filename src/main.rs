use chrono::Utc;
use clap::Parser;
use convo_print::config::{self, ExportConfig};
use convo_print::export::{ExportTarget, OutputFormat};
use convo_print::filter::FilterOptions;
use convo_print::pipeline;
use convo_print::raster::Sizing;
use convo_print::render::RenderOptions;
use convo_print::theme::ThemeName;
use eyre::{Result, eyre};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Render a Claude conversation transcript (JSONL) as a terminal-styled PNG, SVG, PDF or HTML.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Conversation transcript (.jsonl).
    #[arg(value_name = "JSONL_FILE")]
    input: PathBuf,

    /// Output path.
    /// Defaults to ~/Desktop/claude-conversation-<timestamp>.<format>.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Output format. Inferred from --output when omitted, otherwise png.
    #[arg(short, long, value_enum, value_name = "FMT")]
    format: Option<OutputFormat>,

    /// Include assistant thinking blocks.
    #[arg(long)]
    include_thinking: bool,

    /// Show full tool inputs instead of just the tool name.
    #[arg(long)]
    include_tools: bool,

    /// Use the light theme instead of dark.
    #[arg(long, conflicts_with = "theme")]
    light_theme: bool,

    /// Theme by name.
    #[arg(long, value_enum, value_name = "NAME")]
    theme: Option<ThemeName>,

    /// Start from the first message containing this text (case-insensitive).
    #[arg(long, value_name = "TEXT")]
    from: Option<String>,

    /// Stop before the first message containing this text (case-insensitive).
    #[arg(long, value_name = "TEXT")]
    until: Option<String>,

    /// Only include the last N exchanges.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    last: Option<u64>,

    /// Image width in pixels. Default: 1200.
    #[arg(long, value_name = "PX", value_parser = clap::value_parser!(u32).range(1..))]
    width: Option<u32>,

    /// Pixel scale factor for raster output. Default: 2.
    #[arg(long, value_name = "N")]
    scale: Option<f64>,

    /// Path to a specific configuration file.
    /// Defaults to $XDG_CONFIG_HOME/convo-print/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Chrome/Chromium executable used for PNG, SVG and PDF output.
    /// Auto-detected if omitted.
    #[arg(long, value_name = "PATH")]
    chrome: Option<PathBuf>,

    /// Suppress progress output.
    #[arg(short, long)]
    quiet: bool,

    /// Print debug diagnostics (skipped lines, browser steps).
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    // RUST_LOG=convo_print=trace
    let default = if verbose {
        "warn,convo_print=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // 1. Load config file (CLI path > default path)
    let file_cfg = config::load_file_config(cli.config.as_deref())?;

    // 2. Resolve format (CLI > output extension > Config > png)
    let format = config::resolve_format(cli.format, cli.output.as_deref(), file_cfg.format);

    // 3. Resolve output (CLI > Config dir > Desktop)
    let output = match cli.output {
        Some(path) => path,
        None => file_cfg
            .output_dir
            .or_else(config::default_output_dir)
            .ok_or_else(|| eyre!("Could not determine an output directory.\nUse --output to specify one."))?
            .join(config::default_file_name(Utc::now(), format)),
    };

    // 4. Resolve sizing and presentation (CLI > Config > Default)
    let defaults = Sizing::default();
    let sizing = Sizing {
        width: cli.width.or(file_cfg.width).unwrap_or(defaults.width),
        height: defaults.height,
        scale: cli.scale.or(file_cfg.scale).unwrap_or(defaults.scale),
    };
    config::validate_sizing(&sizing)?;

    let theme = if cli.light_theme {
        ThemeName::Light
    } else {
        cli.theme.or(file_cfg.theme).unwrap_or_default()
    };

    // 5. Build the Export Config
    let config = ExportConfig {
        input: cli.input,
        target: ExportTarget {
            output,
            format,
            sizing,
        },
        render: RenderOptions {
            include_thinking: cli.include_thinking || file_cfg.include_thinking.unwrap_or(false),
            include_tools: cli.include_tools || file_cfg.include_tools.unwrap_or(false),
        },
        filter: FilterOptions {
            from: cli.from,
            until: cli.until,
            last: cli.last.map(|n| usize::try_from(n).unwrap_or(usize::MAX)),
        },
        theme,
        chrome_path: cli.chrome.or(file_cfg.chrome_path),
        quiet: cli.quiet,
    };
    tracing::debug!(?config, "resolved configuration");

    // 6. Run the pipeline
    #[cfg(feature = "chrome")]
    let rasterizer = convo_print::chrome::ChromeRasterizer::new(config.chrome_path.clone());
    #[cfg(not(feature = "chrome"))]
    let rasterizer = convo_print::raster::Unavailable;

    pipeline::run(&config, &rasterizer)
}
