use std::path::PathBuf;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use eyre::{Context, Result, eyre};
use headless_chrome::protocol::cdp::Page::{self, CaptureScreenshotFormatOption, Viewport};
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions, Tab};
use url::Url;

use crate::raster::{Capture, CaptureMode, Rasterizer, Sizing};

const A4_WIDTH_IN: f64 = 8.27;
const A4_HEIGHT_IN: f64 = 11.69;
const MARGIN_IN: f64 = 1.0 / 2.54;

/// Rasterizer backed by a headless Chrome/Chromium launched per export.
#[derive(Debug, Default, Clone)]
pub struct ChromeRasterizer {
    /// Explicit browser executable. Auto-detected (including `$CHROME`) when `None`.
    pub executable: Option<PathBuf>,
}

pub struct ChromeSession {
    // Dropping the browser kills the process, so it lives as long as the tab.
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeRasterizer {
    pub fn new(executable: Option<PathBuf>) -> Self {
        Self { executable }
    }
}

fn page_size(tab: &Tab) -> Result<(u32, u32)> {
    let remote = tab
        .evaluate(
            "JSON.stringify([document.body.scrollWidth, document.body.scrollHeight])",
            false,
        )
        .map_err(|e| eyre!("Failed to measure page: {e:#}"))?;
    let raw = remote
        .value
        .as_ref()
        .and_then(|v| v.as_str())
        .ok_or_else(|| eyre!("Page measurement returned no value"))?;
    let [width, height]: [u32; 2] = serde_json::from_str(raw)
        .map_err(|e| eyre!("Unexpected page measurement {raw:?}: {e}"))?;
    Ok((width, height))
}

/// Full-page PNG of the first `width × height` CSS pixels at `scale`.
///
/// `Tab::capture_screenshot` never sets `captureBeyondViewport`, so a clip
/// taller than the window would come back cut off or blank.
fn full_page_png(tab: &Tab, width: u32, height: u32, scale: f64) -> Result<Vec<u8>> {
    let shot = tab
        .call_method(Page::CaptureScreenshot {
            format: Some(CaptureScreenshotFormatOption::Png),
            quality: None,
            clip: Some(Viewport {
                x: 0.0,
                y: 0.0,
                width: f64::from(width),
                height: f64::from(height),
                scale,
            }),
            from_surface: Some(true),
            capture_beyond_viewport: Some(true),
            optimize_for_speed: None,
        })
        .map_err(|e| eyre!("Screenshot failed: {e:#}"))?;
    STANDARD
        .decode(shot.data)
        .wrap_err("Screenshot data was not valid base64")
}

impl Rasterizer for ChromeRasterizer {
    type Session = ChromeSession;

    fn load(&self, document: &Url, sizing: &Sizing) -> Result<ChromeSession> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((sizing.width, sizing.height)))
            .path(self.executable.clone())
            .build()
            .map_err(|e| eyre!("Invalid browser launch options: {e}"))?;

        tracing::debug!(executable = ?self.executable, "launching headless chrome");
        let browser = Browser::new(options).map_err(|e| {
            eyre!("Failed to launch headless Chrome: {e:#}\nInstall Chrome or Chromium, or pass --chrome <PATH>.")
        })?;
        let tab = browser
            .new_tab()
            .map_err(|e| eyre!("Failed to open browser tab: {e:#}"))?;

        tracing::debug!(url = %document, "navigating");
        tab.navigate_to(document.as_str())
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| eyre!("Failed to load {document}: {e:#}"))?;

        tab.evaluate("document.fonts.ready.then(() => true)", true)
            .map_err(|e| eyre!("Failed waiting for fonts: {e:#}"))?;

        Ok(ChromeSession {
            _browser: browser,
            tab,
        })
    }

    fn capture(
        &self,
        session: &mut ChromeSession,
        mode: CaptureMode,
        sizing: &Sizing,
    ) -> Result<Capture> {
        let (page_width, page_height) = page_size(&session.tab)?;
        tracing::debug!(page_width, page_height, ?mode, "capturing");

        let data = match mode {
            CaptureMode::Png => full_page_png(&session.tab, page_width, page_height, sizing.scale)?,
            CaptureMode::Pdf => session
                .tab
                .print_to_pdf(Some(PrintToPdfOptions {
                    print_background: Some(true),
                    paper_width: Some(A4_WIDTH_IN),
                    paper_height: Some(A4_HEIGHT_IN),
                    margin_top: Some(MARGIN_IN),
                    margin_bottom: Some(MARGIN_IN),
                    margin_left: Some(MARGIN_IN),
                    margin_right: Some(MARGIN_IN),
                    ..Default::default()
                }))
                .map_err(|e| eyre!("PDF generation failed: {e:#}"))?,
        };

        Ok(Capture {
            data,
            page_width,
            page_height,
        })
    }

    fn close(&self, session: ChromeSession) -> Result<()> {
        drop(session);
        Ok(())
    }
}
