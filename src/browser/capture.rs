//! Screenshot serialization
//!
//! Low-level PNG capture of either the full viewport/page or a single
//! element subtree. Region resolution policy (crop vs selector vs full)
//! lives in the capture step; this module only serializes.

use crate::browser::PageHandle;
use crate::error::{CaptureError, Result};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use tracing::{debug, instrument};

/// Page capture functionality
pub struct PageCapture;

impl PageCapture {
    /// Take a PNG screenshot of the viewport, or of the entire scrollable
    /// surface when `full_page` is set.
    #[instrument(skip(page))]
    pub async fn screenshot(page: &PageHandle, full_page: bool) -> Result<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .from_surface(true)
            .capture_beyond_viewport(full_page)
            .build();

        let data = page
            .page
            .screenshot(params)
            .await
            .map_err(|e| CaptureError::ScreenshotFailed(e.to_string()))?;

        debug!("Screenshot captured: {} bytes", data.len());
        Ok(data)
    }

    /// Take a PNG screenshot of the first element matching `selector`.
    ///
    /// Errors when the element cannot be located; the caller decides
    /// whether to fall back to a full capture.
    #[instrument(skip(page))]
    pub async fn element_screenshot(page: &PageHandle, selector: &str) -> Result<Vec<u8>> {
        let element = page
            .page
            .find_element(selector)
            .await
            .map_err(|e| CaptureError::ScreenshotFailed(format!("Element not found: {e}")))?;

        let data = element
            .screenshot(CaptureScreenshotFormat::Png)
            .await
            .map_err(|e| CaptureError::ScreenshotFailed(e.to_string()))?;

        debug!("Element screenshot captured: {} bytes", data.len());
        Ok(data)
    }
}
