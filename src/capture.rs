//! Capture step
//!
//! One [`CaptureTarget`] produces one PNG at `<output_dir>/<name>.png`.
//! Every intermediate step degrades gracefully (warn and continue) rather
//! than aborting the target: the target application's UI state is not fully
//! under our control, and a partial capture beats no capture. Only the
//! primary navigation is fatal to the owning batch.

use crate::browser::{docs_mode_url, PageCapture, PageHandle, PageNavigator};
use crate::config::Config;
use crate::error::{CaptureError, Result};
use crate::masking::MaskingEngine;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Settle time after a tab click before the idle wait
const TAB_SETTLE_MS: u64 = 1000;
/// Extra settle after the post-tab idle wait
const TAB_EXTRA_SETTLE_MS: u64 = 500;
/// Idle timeout after tab clicks; shorter than the navigation idle window
const POST_CLICK_IDLE_MS: u64 = 8000;
/// Settle time after a button click
const BTN_SETTLE_MS: u64 = 1000;
/// Settle time after scrolling an element into view
const SCROLL_SETTLE_MS: u64 = 500;
/// Settle time after the masking pass, before serialization
const MASK_SETTLE_MS: u64 = 300;

/// How to locate an interaction target in the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locator {
    /// A CSS selector, resolved via `querySelector`
    Css(String),
    /// Visible-text match over button-like elements; the first label that
    /// locates an element wins
    Text(Vec<String>),
}

impl Locator {
    /// CSS locator from a selector string
    pub fn css<S: Into<String>>(selector: S) -> Self {
        Locator::Css(selector.into())
    }

    /// Text locator from one label
    pub fn text<S: Into<String>>(label: S) -> Self {
        Locator::Text(vec![label.into()])
    }
}

/// Per-target capture options. All fields optional; absence means a full
/// visible-viewport capture with no interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureOptions {
    /// Capture only this DOM subtree
    pub selector: Option<String>,
    /// Block (best effort) until this subtree exists before capture
    pub wait_for: Option<String>,
    /// Visible label of a tab to click before capture
    pub click_tab: Option<String>,
    /// Button/element to click before capture
    pub click_btn: Option<Locator>,
    /// Bring this subtree into view before capture
    pub scroll_to: Option<String>,
    /// Minimum settle time after navigation; None = config default
    pub delay_ms: Option<u64>,
    /// Capture the entire scrollable surface instead of the viewport
    pub full_page: bool,
    /// Capture restricted to this subtree, overriding `selector`
    pub crop: Option<String>,
}

impl CaptureOptions {
    /// Empty options: full viewport, no interaction
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture only this DOM subtree
    pub fn selector<S: Into<String>>(mut self, sel: S) -> Self {
        self.selector = Some(sel.into());
        self
    }

    /// Wait for this subtree before capture
    pub fn wait_for<S: Into<String>>(mut self, sel: S) -> Self {
        self.wait_for = Some(sel.into());
        self
    }

    /// Click the tab with this visible label before capture
    pub fn click_tab<S: Into<String>>(mut self, label: S) -> Self {
        self.click_tab = Some(label.into());
        self
    }

    /// Click this element before capture
    pub fn click_btn(mut self, locator: Locator) -> Self {
        self.click_btn = Some(locator);
        self
    }

    /// Scroll this subtree into view before capture
    pub fn scroll_to<S: Into<String>>(mut self, sel: S) -> Self {
        self.scroll_to = Some(sel.into());
        self
    }

    /// Override the post-navigation settle delay
    pub fn delay_ms(mut self, ms: u64) -> Self {
        self.delay_ms = Some(ms);
        self
    }

    /// Capture the full scrollable page
    pub fn full_page(mut self) -> Self {
        self.full_page = true;
        self
    }

    /// Crop the capture to this subtree
    pub fn crop<S: Into<String>>(mut self, sel: S) -> Self {
        self.crop = Some(sel.into());
        self
    }
}

/// One named screenshot artifact to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureTarget {
    /// Unique output key; maps to `<output_dir>/<name>.png`
    pub name: String,
    /// Route within the target application
    pub route: String,
    /// Capture options
    pub options: CaptureOptions,
}

impl CaptureTarget {
    /// Plain target with default options
    pub fn new<S: Into<String>>(name: S, route: S) -> Self {
        Self {
            name: name.into(),
            route: route.into(),
            options: CaptureOptions::default(),
        }
    }

    /// Target with options
    pub fn with_options<S: Into<String>>(name: S, route: S, options: CaptureOptions) -> Self {
        Self {
            name: name.into(),
            route: route.into(),
            options,
        }
    }

    /// Destination path of this target's artifact
    pub fn output_path(&self, config: &Config) -> PathBuf {
        config.output_dir.join(format!("{}.png", self.name))
    }
}

/// Write PNG bytes to `<output_dir>/<name>.png`, creating the directory on
/// demand. Re-execution overwrites the prior artifact in place.
pub async fn write_artifact(config: &Config, name: &str, data: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(&config.output_dir).await?;
    let path = config.output_dir.join(format!("{name}.png"));
    tokio::fs::write(&path, data)
        .await
        .map_err(|source| CaptureError::WriteFailed {
            path: path.display().to_string(),
            source,
        })?;
    info!("Saved: {}.png", name);
    Ok(path)
}

/// Apply the masking pass, settle, and serialize the current view to
/// `<output_dir>/<name>.png`. Used for captures of already-reached states
/// (detail drill-downs, wizard panes).
pub async fn masked_shot(
    page: &PageHandle,
    config: &Config,
    name: &str,
    full_page: bool,
) -> Result<()> {
    if let Err(e) = MaskingEngine::apply(page, &config.masking).await {
        warn!("Masking pass failed for {}: {}", name, e);
    }
    tokio::time::sleep(Duration::from_millis(MASK_SETTLE_MS)).await;
    let data = PageCapture::screenshot(page, full_page).await?;
    write_artifact(config, name, &data).await?;
    Ok(())
}

/// Execute one capture target against an open session.
///
/// Navigation failure is the only error that propagates; every other
/// intermediate failure is logged and execution continues with a degraded
/// fallback.
#[instrument(skip(page, config, target), fields(name = %target.name))]
pub async fn capture(page: &PageHandle, config: &Config, target: &CaptureTarget) -> Result<()> {
    info!("Capturing: {}", target.name);
    let opts = &target.options;

    // Navigate with the documentation-mode flag appended
    let url = docs_mode_url(&config.base_url, &target.route)?;
    PageNavigator::goto(page, &url, config.nav_timeout_ms).await?;

    // Network quiescence may never arrive on views with long-lived
    // connections; tolerate the timeout.
    if PageNavigator::wait_for_network_idle(page, config.idle_timeout_ms)
        .await
        .is_err()
    {
        warn!("Network idle not reached for {}, continuing", target.name);
    }

    let delay = opts.delay_ms.unwrap_or(config.default_delay_ms);
    tokio::time::sleep(Duration::from_millis(delay)).await;

    if let Some(ref wait_for) = opts.wait_for {
        if let Err(e) = PageNavigator::wait_for_selector(page, wait_for, config.wait_timeout_ms).await
        {
            warn!("waitFor selector {:?} not found, continuing: {}", wait_for, e);
        }
    }

    if let Some(ref label) = opts.click_tab {
        let _ = click_tab(page, label).await;
    }

    if let Some(ref locator) = opts.click_btn {
        click_button(page, locator).await;
    }

    if let Some(ref scroll_to) = opts.scroll_to {
        match PageNavigator::scroll_into_view(page, scroll_to).await {
            Ok(true) => {
                tokio::time::sleep(Duration::from_millis(SCROLL_SETTLE_MS)).await;
            }
            Ok(false) => warn!("scrollTo {:?} matched nothing", scroll_to),
            Err(e) => warn!("scrollTo {:?} failed: {}", scroll_to, e),
        }
    }

    if let Err(e) = MaskingEngine::apply(page, &config.masking).await {
        warn!("Masking pass failed for {}: {}", target.name, e);
    }
    tokio::time::sleep(Duration::from_millis(MASK_SETTLE_MS)).await;

    // crop takes precedence over selector; both fall back to a full capture
    // when the region cannot be located at capture time.
    let region = opts.crop.as_deref().or(opts.selector.as_deref());
    let data = match region {
        Some(sel) => match PageCapture::element_screenshot(page, sel).await {
            Ok(data) => data,
            Err(e) => {
                warn!(
                    "Capture region {:?} not found, taking full page: {}",
                    sel, e
                );
                PageCapture::screenshot(page, opts.full_page).await?
            }
        },
        None => PageCapture::screenshot(page, opts.full_page).await?,
    };

    write_artifact(config, &target.name, &data).await?;
    Ok(())
}

/// Click a tab by visible label and let the pane settle. Best effort;
/// returns whether the tab was found and clicked.
pub async fn click_tab(page: &PageHandle, label: &str) -> bool {
    match PageNavigator::click_by_text(page, crate::catalogue::TAB_SCOPE, label).await {
        Ok(true) => {
            tokio::time::sleep(Duration::from_millis(TAB_SETTLE_MS)).await;
            if PageNavigator::wait_for_network_idle(page, POST_CLICK_IDLE_MS)
                .await
                .is_err()
            {
                warn!("Network idle not reached after tab {:?}", label);
            }
            tokio::time::sleep(Duration::from_millis(TAB_EXTRA_SETTLE_MS)).await;
            true
        }
        Ok(false) => {
            warn!("Tab {:?} not found", label);
            false
        }
        Err(e) => {
            warn!("Tab click {:?} failed: {}", label, e);
            false
        }
    }
}

/// Click a button-like element and let the page settle. Best effort.
async fn click_button(page: &PageHandle, locator: &Locator) {
    let clicked = match locator {
        Locator::Css(selector) => match PageNavigator::click(page, selector).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Button click {:?} failed: {}", selector, e);
                false
            }
        },
        Locator::Text(labels) => {
            let mut hit = false;
            for label in labels {
                match PageNavigator::click_by_text(page, "button, a", label).await {
                    Ok(true) => {
                        hit = true;
                        break;
                    }
                    Ok(false) => {}
                    Err(e) => warn!("Button click {:?} failed: {}", label, e),
                }
            }
            if !hit {
                warn!("No button matched any of {:?}", labels);
            }
            hit
        }
    };

    if clicked {
        tokio::time::sleep(Duration::from_millis(BTN_SETTLE_MS)).await;
    }
}
