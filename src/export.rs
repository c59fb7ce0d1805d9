use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::ValueEnum;
use eyre::{Context, Result, eyre};
use serde::Deserialize;
use tempfile::NamedTempFile;
use url::Url;

use crate::raster::{Capture, CaptureMode, Rasterizer, Sizing};

/// Output encodings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// The styled HTML document itself.
    Html,
    /// Full-page screenshot.
    #[default]
    Png,
    /// Screenshot wrapped in an SVG document.
    Svg,
    /// Paginated A4 document.
    Pdf,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Pdf => "pdf",
        }
    }

    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "html" | "htm" => Some(Self::Html),
            "png" => Some(Self::Png),
            "svg" => Some(Self::Svg),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Html => "HTML",
            Self::Png => "PNG",
            Self::Svg => "SVG",
            Self::Pdf => "PDF",
        }
    }

    pub fn needs_rasterizer(self) -> bool {
        self.capture_mode().is_some()
    }

    /// What to ask the rasterizer for. `None` for formats written without one.
    fn capture_mode(self) -> Option<CaptureMode> {
        match self {
            Self::Html => None,
            Self::Png | Self::Svg => Some(CaptureMode::Png),
            Self::Pdf => Some(CaptureMode::Pdf),
        }
    }
}

/// Where and how to write the export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportTarget {
    pub output: PathBuf,
    pub format: OutputFormat,
    pub sizing: Sizing,
}

/// Where the HTML is left when rasterizing fails.
pub fn fallback_path(output: &Path) -> PathBuf {
    let candidate = output.with_extension("html");
    if candidate == output {
        output.with_extension("fallback.html")
    } else {
        candidate
    }
}

/// Write `document` to `target.output` in the requested encoding.
///
/// Non-HTML formats go through a sidecar HTML file next to the output, which is
/// removed afterwards. If the rasterizer fails, the sidecar is moved to
/// [`fallback_path`] instead and the returned error names it.
pub fn export<R: Rasterizer>(document: &str, target: &ExportTarget, rasterizer: &R) -> Result<()> {
    if let Some(parent) = target.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .wrap_err_with(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    let Some(mode) = target.format.capture_mode() else {
        fs::write(&target.output, document)
            .wrap_err_with(|| format!("Failed to write: {}", target.output.display()))?;
        return Ok(());
    };

    let sidecar = write_sidecar(document, &target.output)?;
    tracing::debug!(sidecar = %sidecar.path().display(), "wrote sidecar document");

    match rasterize(sidecar.path(), mode, target, rasterizer) {
        Ok(bytes) => {
            fs::write(&target.output, bytes)
                .wrap_err_with(|| format!("Failed to write: {}", target.output.display()))?;
            Ok(())
        }
        Err(e) => {
            let fallback = fallback_path(&target.output);
            match sidecar.persist(&fallback) {
                Ok(_) => Err(e.wrap_err(format!(
                    "Export failed. HTML saved to: {}",
                    fallback.display()
                ))),
                Err(persist) => {
                    tracing::warn!(error = %persist.error, "could not keep fallback HTML");
                    Err(e.wrap_err("Export failed"))
                }
            }
        }
    }
}

fn write_sidecar(document: &str, output: &Path) -> Result<NamedTempFile> {
    let dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "conversation".to_string());

    let mut file = tempfile::Builder::new()
        .prefix(&format!("{stem}."))
        .suffix(".tmp.html")
        .tempfile_in(dir)
        .wrap_err_with(|| format!("Failed to create sidecar in {}", dir.display()))?;
    file.write_all(document.as_bytes())
        .and_then(|_| file.flush())
        .wrap_err("Failed to write sidecar document")?;
    Ok(file)
}

fn rasterize<R: Rasterizer>(
    sidecar: &Path,
    mode: CaptureMode,
    target: &ExportTarget,
    rasterizer: &R,
) -> Result<Vec<u8>> {
    let absolute = sidecar
        .canonicalize()
        .wrap_err_with(|| format!("Failed to resolve: {}", sidecar.display()))?;
    let url = Url::from_file_path(&absolute)
        .map_err(|_| eyre!("Not a valid file URL: {}", absolute.display()))?;

    let mut session = rasterizer.load(&url, &target.sizing)?;
    let captured = rasterizer.capture(&mut session, mode, &target.sizing);
    if let Err(e) = rasterizer.close(session) {
        tracing::warn!(error = %e, "failed to close rasterizer session");
    }
    let capture = captured?;

    match target.format {
        OutputFormat::Svg => {
            ensure_kind(&capture.data, "image/png")?;
            Ok(svg_wrapper(&capture, target.sizing.scale).into_bytes())
        }
        OutputFormat::Png => {
            ensure_kind(&capture.data, "image/png")?;
            Ok(capture.data)
        }
        OutputFormat::Pdf => {
            ensure_kind(&capture.data, "application/pdf")?;
            Ok(capture.data)
        }
        OutputFormat::Html => Ok(capture.data),
    }
}

fn ensure_kind(data: &[u8], expected: &str) -> Result<()> {
    match infer::get(data) {
        Some(kind) if kind.mime_type() == expected => Ok(()),
        Some(kind) => Err(eyre!(
            "Rasterizer returned {} instead of {expected}",
            kind.mime_type()
        )),
        None => Err(eyre!(
            "Rasterizer returned unrecognized data instead of {expected}"
        )),
    }
}

/// Embed a PNG capture in a minimal SVG sized to the scaled page.
pub fn svg_wrapper(capture: &Capture, scale: f64) -> String {
    let width = f64::from(capture.page_width) * scale;
    let height = f64::from(capture.page_height) * scale;
    let encoded = STANDARD.encode(&capture.data);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"
     width="{width}" height="{height}"
     viewBox="0 0 {width} {height}">
  <image width="100%" height="100%" xlink:href="data:image/png;base64,{encoded}"/>
</svg>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDRfake";
    const PDF: &[u8] = b"%PDF-1.7\nfake";

    /// In-memory engine: records what it was asked to load and returns canned bytes.
    #[derive(Default)]
    struct FakeRasterizer {
        fail_capture: bool,
        png: Option<Vec<u8>>,
        loaded: RefCell<Vec<String>>,
        closed: RefCell<usize>,
    }

    impl Rasterizer for FakeRasterizer {
        type Session = PathBuf;

        fn load(&self, document: &Url, _sizing: &Sizing) -> Result<PathBuf> {
            let path = document.to_file_path().unwrap();
            self.loaded
                .borrow_mut()
                .push(fs::read_to_string(&path).unwrap());
            Ok(path)
        }

        fn capture(
            &self,
            session: &mut PathBuf,
            mode: CaptureMode,
            _sizing: &Sizing,
        ) -> Result<Capture> {
            assert!(session.exists(), "sidecar must exist while capturing");
            if self.fail_capture {
                return Err(eyre!("browser crashed"));
            }
            let data = match mode {
                CaptureMode::Png => self.png.clone().unwrap_or_else(|| PNG.to_vec()),
                CaptureMode::Pdf => PDF.to_vec(),
            };
            Ok(Capture {
                data,
                page_width: 600,
                page_height: 450,
            })
        }

        fn close(&self, _session: PathBuf) -> Result<()> {
            *self.closed.borrow_mut() += 1;
            Ok(())
        }
    }

    fn target(dir: &Path, name: &str, format: OutputFormat) -> ExportTarget {
        ExportTarget {
            output: dir.join(name),
            format,
            sizing: Sizing::default(),
        }
    }

    fn leftover_sidecars(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp.html"))
            .collect()
    }

    #[test]
    fn html_is_written_verbatim_without_rasterizer() {
        let dir = tempfile::tempdir().unwrap();
        let target = target(dir.path(), "out.html", OutputFormat::Html);
        let rasterizer = FakeRasterizer::default();

        export("<html>doc</html>", &target, &rasterizer).unwrap();

        assert_eq!(fs::read_to_string(&target.output).unwrap(), "<html>doc</html>");
        assert!(rasterizer.loaded.borrow().is_empty());
    }

    #[test]
    fn png_goes_through_sidecar_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let target = target(dir.path(), "shot.png", OutputFormat::Png);
        let rasterizer = FakeRasterizer::default();

        export("<html>doc</html>", &target, &rasterizer).unwrap();

        assert_eq!(fs::read(&target.output).unwrap(), PNG);
        assert_eq!(*rasterizer.loaded.borrow(), vec!["<html>doc</html>".to_string()]);
        assert_eq!(*rasterizer.closed.borrow(), 1);
        assert!(leftover_sidecars(dir.path()).is_empty());
    }

    #[test]
    fn svg_embeds_scaled_png() {
        let dir = tempfile::tempdir().unwrap();
        let target = target(dir.path(), "shot.svg", OutputFormat::Svg);

        export("<html></html>", &target, &FakeRasterizer::default()).unwrap();

        let svg = fs::read_to_string(&target.output).unwrap();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains(r#"width="1200" height="900""#));
        assert!(svg.contains(r#"viewBox="0 0 1200 900""#));
        assert!(svg.contains(&format!("data:image/png;base64,{}", STANDARD.encode(PNG))));
    }

    #[test]
    fn pdf_bytes_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let target = target(dir.path(), "doc.pdf", OutputFormat::Pdf);

        export("<html></html>", &target, &FakeRasterizer::default()).unwrap();

        assert_eq!(fs::read(&target.output).unwrap(), PDF);
    }

    #[test]
    fn failed_capture_keeps_fallback_html() {
        let dir = tempfile::tempdir().unwrap();
        let target = target(dir.path(), "shot.png", OutputFormat::Png);
        let rasterizer = FakeRasterizer {
            fail_capture: true,
            ..Default::default()
        };

        let err = export("<html>doc</html>", &target, &rasterizer).unwrap_err();

        let fallback = dir.path().join("shot.html");
        assert!(format!("{err:#}").contains(&fallback.display().to_string()));
        assert!(format!("{err:#}").contains("browser crashed"));
        assert_eq!(fs::read_to_string(&fallback).unwrap(), "<html>doc</html>");
        assert!(!target.output.exists());
        assert!(leftover_sidecars(dir.path()).is_empty());
        assert_eq!(*rasterizer.closed.borrow(), 1);
    }

    #[test]
    fn wrong_capture_kind_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let target = target(dir.path(), "shot.png", OutputFormat::Png);
        let rasterizer = FakeRasterizer {
            png: Some(PDF.to_vec()),
            ..Default::default()
        };

        let err = export("<html></html>", &target, &rasterizer).unwrap_err();
        assert!(format!("{err:#}").contains("application/pdf instead of image/png"));
    }

    #[test]
    fn missing_output_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let target = target(&dir.path().join("nested/deeper"), "out.html", OutputFormat::Html);

        export("x", &target, &FakeRasterizer::default()).unwrap();
        assert!(target.output.exists());
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(OutputFormat::from_extension(Path::new("a/b.PNG")), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::from_extension(Path::new("b.htm")), Some(OutputFormat::Html));
        assert_eq!(OutputFormat::from_extension(Path::new("b.txt")), None);
        assert_eq!(OutputFormat::from_extension(Path::new("noext")), None);
    }

    #[test]
    fn fallback_never_overwrites_output() {
        assert_eq!(fallback_path(Path::new("x/shot.png")), PathBuf::from("x/shot.html"));
        assert_eq!(
            fallback_path(Path::new("x/shot.html")),
            PathBuf::from("x/shot.fallback.html")
        );
    }
}
