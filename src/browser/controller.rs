//! Browser lifecycle management
//!
//! One browser process is acquired per run and released in a guaranteed
//! cleanup path once every batch has finished, whatever the outcomes.
//! Each batch gets its own fresh page so no state leaks across batches.

use crate::config::Config;
use crate::error::{BrowserError, Error, Result};
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Handle to an open browser page; one per batch session.
#[derive(Clone)]
pub struct PageHandle {
    pub(crate) page: Page,
}

impl PageHandle {
    /// Get the underlying chromiumoxide Page
    pub fn inner(&self) -> &Page {
        &self.page
    }

    /// Current URL as reported by the page, if any.
    pub async fn url(&self) -> Result<Option<String>> {
        self.page.url().await.map_err(|e| Error::cdp(e.to_string()))
    }

    /// Close this page/tab.
    pub async fn close(self) -> Result<()> {
        self.page
            .close()
            .await
            .map_err(|e| Error::cdp(e.to_string()))?;
        debug!("Page closed");
        Ok(())
    }
}

/// High-level browser controller
pub struct BrowserController {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserController {
    /// Launch a browser according to the run configuration.
    #[instrument(skip(config))]
    pub async fn launch(config: &Config) -> Result<Self> {
        info!(headless = config.headless, "Launching browser");

        let mut builder = CdpBrowserConfig::builder();

        builder = builder.viewport(chromiumoxide::handler::viewport::Viewport {
            width: config.width,
            height: config.height,
            device_scale_factor: None,
            emulating_mobile: false,
            is_landscape: true,
            has_touch: false,
        });

        if !config.headless {
            builder = builder.with_head();
        }

        if let Some(ref path) = config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder
            .build()
            .map_err(|e| BrowserError::ConfigError(e.to_string()))?;

        let (browser, mut handler) = Browser::launch(cdp_config)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    warn!("Browser handler event error");
                    break;
                }
            }
            debug!("Browser handler finished");
        });

        info!("Browser launched");

        Ok(Self {
            browser,
            handler: handler_task,
        })
    }

    /// Create a fresh page/tab for one batch session.
    #[instrument(skip(self))]
    pub async fn new_page(&self) -> Result<PageHandle> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::PageCreationFailed(e.to_string()))?;

        debug!("Created new page");
        Ok(PageHandle { page })
    }

    /// Close the browser.
    #[instrument(skip(self))]
    pub async fn close(mut self) -> Result<()> {
        info!("Closing browser");

        self.browser
            .close()
            .await
            .map_err(|e| Error::cdp(e.to_string()))?;

        // Wait for handler to finish
        let _ = tokio::time::timeout(Duration::from_secs(5), self.handler).await;

        info!("Browser closed");
        Ok(())
    }
}
