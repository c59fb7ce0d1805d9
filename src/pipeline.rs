use std::time::Duration;

use eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::ExportConfig;
use crate::raster::Rasterizer;
use crate::{document, export, filter, render, transcript};

/// Parse, filter, render and export, reporting progress on stderr unless quiet.
pub fn run<R: Rasterizer>(config: &ExportConfig, rasterizer: &R) -> Result<()> {
    let html = build_document(config)?;

    let spinner = if config.quiet || !config.target.format.needs_rasterizer() {
        ProgressBar::hidden()
    } else {
        let s = ProgressBar::new_spinner();
        s.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        s.set_message(format!("Generating {}...", config.target.format.label()));
        s.enable_steady_tick(Duration::from_millis(80));
        s
    };

    let result = export::export(&html, &config.target, rasterizer);
    spinner.finish_and_clear();
    result?;

    if !config.quiet {
        eprintln!(
            "{} saved to: {}",
            config.target.format.label(),
            config.target.output.display()
        );
    }
    Ok(())
}

/// Everything up to (not including) rasterization: the complete HTML document.
pub fn build_document(config: &ExportConfig) -> Result<String> {
    if !config.quiet {
        eprintln!("Reading conversation...");
    }
    let parsed = transcript::parse_file(&config.input)?;
    tracing::debug!(
        lines = parsed.stats.lines,
        malformed = parsed.stats.skipped_malformed,
        other = parsed.stats.skipped_role,
        "parsed transcript"
    );
    if !config.quiet {
        eprintln!("Found {} messages", parsed.records.len());
    }

    let selected = filter::apply(&parsed.records, &config.filter);
    if !config.quiet {
        eprintln!("Exporting {} messages", selected.len());
    }

    let messages = render::render_records(selected, config.render);
    Ok(document::build(&messages, config.theme.theme()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{ExportTarget, OutputFormat};
    use crate::filter::FilterOptions;
    use crate::raster::{Sizing, Unavailable};
    use crate::render::RenderOptions;
    use crate::theme::ThemeName;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;

    const TRANSCRIPT: &str = r#"{"type":"user","message":{"content":"first question"}}
{"type":"assistant","message":{"content":[{"type":"thinking","thinking":"pondering"},{"type":"text","text":"first answer"}]}}
this line is not json
{"type":"user","message":{"content":"second question"}}
{"type":"assistant","message":{"content":[{"type":"tool_use","name":"Grep","input":{"pattern":"x"}}]}}
{"type":"user","message":{"content":"third question"}}
{"type":"assistant","message":{"content":[{"type":"text","text":"third answer"}]}}
"#;

    fn config(dir: &Path, format: OutputFormat) -> ExportConfig {
        let input = dir.join("chat.jsonl");
        fs::write(&input, TRANSCRIPT).unwrap();
        ExportConfig {
            input,
            target: ExportTarget {
                output: dir.join(format!("out.{}", format.extension())),
                format,
                sizing: Sizing::default(),
            },
            render: RenderOptions::default(),
            filter: FilterOptions::default(),
            theme: ThemeName::Dark,
            chrome_path: None,
            quiet: true,
        }
    }

    #[test]
    fn html_output_equals_generated_document() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), OutputFormat::Html);

        run(&config, &Unavailable).unwrap();

        let written = fs::read_to_string(&config.target.output).unwrap();
        assert_eq!(written, build_document(&config).unwrap());
        assert!(written.contains("first question"));
        assert!(!written.contains("pondering"));
        assert!(written.contains(r#"Used <span class="tool-name">Grep</span>"#));
    }

    #[test]
    fn last_one_keeps_only_final_exchange() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), OutputFormat::Html);
        config.filter.last = Some(1);

        let html = build_document(&config).unwrap();
        assert!(!html.contains("first question"));
        assert!(!html.contains("second question"));
        assert!(html.contains("third question"));
        assert!(html.contains("third answer"));
        assert_eq!(html.matches(r#"<div class="message "#).count(), 2);
    }

    #[test]
    fn light_theme_and_details_flow_through() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), OutputFormat::Html);
        config.theme = ThemeName::Light;
        config.render = RenderOptions {
            include_thinking: true,
            include_tools: true,
        };

        let html = build_document(&config).unwrap();
        assert!(html.contains("--bg: #ffffff;"));
        assert!(html.contains("pondering"));
        assert!(html.contains("&quot;pattern&quot;: &quot;x&quot;"));
    }

    #[test]
    fn unavailable_rasterizer_leaves_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), OutputFormat::Png);

        let err = run(&config, &Unavailable).unwrap_err();

        assert!(format!("{err:#}").contains("HTML saved to"));
        assert!(dir.path().join("out.html").exists());
        assert!(!config.target.output.exists());
    }

    #[test]
    fn same_input_same_document() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), OutputFormat::Html);
        assert_eq!(build_document(&config).unwrap(), build_document(&config).unwrap());
    }
}
