//! Boundary to the engine that turns an HTML document into pixels or pages.
//!
//! The pipeline only talks to [`Rasterizer`]; the headless Chrome backend lives in
//! `chrome.rs` behind the `chrome` feature.
use eyre::{Result, eyre};
use url::Url;

/// Viewport and pixel density used for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sizing {
    /// Viewport width in CSS pixels.
    pub width: u32,
    /// Initial viewport height in CSS pixels. Full-page captures grow past it.
    pub height: u32,
    /// Device pixels per CSS pixel.
    pub scale: f64,
}

impl Default for Sizing {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            scale: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Full-page PNG screenshot at `Sizing::scale`.
    Png,
    /// A4 PDF, 1cm margins, backgrounds printed.
    Pdf,
}

/// Bytes produced by a capture plus the rendered page size in CSS pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    pub data: Vec<u8>,
    pub page_width: u32,
    pub page_height: u32,
}

pub trait Rasterizer {
    type Session;

    /// Open `document` in a fresh rendering surface and wait until fonts are ready.
    fn load(&self, document: &Url, sizing: &Sizing) -> Result<Self::Session>;

    fn capture(
        &self,
        session: &mut Self::Session,
        mode: CaptureMode,
        sizing: &Sizing,
    ) -> Result<Capture>;

    fn close(&self, session: Self::Session) -> Result<()>;
}

/// Stand-in used when the crate is built without a browser backend.
#[derive(Debug, Default)]
pub struct Unavailable;

impl Rasterizer for Unavailable {
    type Session = ();

    fn load(&self, _document: &Url, _sizing: &Sizing) -> Result<()> {
        Err(eyre!(
            "No rasterizer available: this build has no browser support (rebuild with the `chrome` feature or use --format html)"
        ))
    }

    fn capture(&self, _session: &mut (), _mode: CaptureMode, _sizing: &Sizing) -> Result<Capture> {
        Err(eyre!("No rasterizer available"))
    }

    fn close(&self, _session: ()) -> Result<()> {
        Ok(())
    }
}
