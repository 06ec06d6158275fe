//! Session handling: authentication and tenant switching
//!
//! Login is the one hard requirement of a batch: without the post-login
//! redirect the session is unusable, so its timeout is fatal to the owning
//! batch. Tenant switching only affects which data the captures show, so a
//! failed switch is logged and the batch proceeds under whatever tenant
//! context remains active.

use crate::browser::{PageHandle, PageNavigator};
use crate::config::Config;
use crate::error::{Result, SessionError};
use std::time::Duration;
use tracing::{info, instrument, warn};
use url::Url;

/// Login form field/button selectors
const EMAIL_FIELD: &str = "input[formcontrolname=\"email\"]";
const PASSWORD_FIELD: &str = "input[formcontrolname=\"password\"]";
const SUBMIT_BUTTON: &str = "button[type=\"submit\"]";

/// Tenant switcher control in the toolbar
const SWITCHER_BUTTON: &str =
    "app-company-switcher button[mat-icon-button], app-company-switcher button";
/// Filter input inside the opened switcher menu
const SWITCHER_FILTER: &str = ".company-switcher-menu input, .mat-mdc-menu-panel input";
/// Entries inside the opened switcher menu
const SWITCHER_ENTRIES: &str = ".mat-mdc-menu-panel button";
/// Fallback dropdown/select controls swept when the primary path fails
const FALLBACK_TRIGGERS: [&str; 2] = [".mat-mdc-select-trigger", "[class*=\"company\"] button"];
/// Fallback scope for the final text-matched click
const FALLBACK_ENTRY_SCOPE: &str = "button, a, .mat-mdc-option, [role=\"option\"], span";

/// How long the switcher menu gets to open/filter
const MENU_SETTLE_MS: u64 = 800;
/// Settle after the tenant selection lands
const SWITCH_SETTLE_MS: u64 = 3000;
/// Idle timeout after the tenant switch
const POST_SWITCH_IDLE_MS: u64 = 8000;
/// Settle after the login form renders
const LOGIN_FORM_SETTLE_MS: u64 = 2000;
/// Poll interval while waiting for the post-login redirect
const REDIRECT_POLL_MS: u64 = 250;

/// Authenticate the session through the target application's login form.
///
/// Blocks until the application redirects to the configured post-login
/// location; not observing the redirect within `login_timeout_ms` is a
/// hard failure for the owning batch.
#[instrument(skip(page, config))]
pub async fn login(page: &PageHandle, config: &Config) -> Result<()> {
    info!("Logging in as {}", config.credentials.email);

    let url = Url::parse(&config.base_url)
        .and_then(|base| base.join(&config.login_route))
        .map_err(|e| SessionError::FormFailed(format!("bad login URL: {e}")))?;

    PageNavigator::goto(page, url.as_str(), config.nav_timeout_ms).await?;
    tokio::time::sleep(Duration::from_millis(LOGIN_FORM_SETTLE_MS)).await;

    PageNavigator::fill(page, EMAIL_FIELD, &config.credentials.email)
        .await
        .map_err(|e| SessionError::FormFailed(e.to_string()))?;
    PageNavigator::fill(page, PASSWORD_FIELD, &config.credentials.password)
        .await
        .map_err(|e| SessionError::FormFailed(e.to_string()))?;
    PageNavigator::click(page, SUBMIT_BUTTON)
        .await
        .map_err(|e| SessionError::FormFailed(e.to_string()))?;

    wait_for_redirect(page, &config.post_login_path, config.login_timeout_ms).await?;

    info!("Logged in");
    Ok(())
}

/// Poll the page URL until it contains `expected`, bounded by `timeout_ms`.
async fn wait_for_redirect(page: &PageHandle, expected: &str, timeout_ms: u64) -> Result<()> {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);

    loop {
        if let Some(url) = page.url().await? {
            if url.contains(expected) {
                return Ok(());
            }
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(SessionError::RedirectTimeout {
                expected: expected.to_string(),
                timeout_ms,
            }
            .into());
        }
        tokio::time::sleep(Duration::from_millis(REDIRECT_POLL_MS)).await;
    }
}

/// Switch the active tenant/organization context mid-session.
///
/// Opens the tenant switcher, filters by name, and selects the first entry
/// whose text contains `tenant`. When the primary path fails, falls back to
/// a heuristic sweep of generic dropdown controls. The caller treats any
/// error as a soft failure.
#[instrument(skip(page))]
pub async fn switch_tenant(page: &PageHandle, tenant: &str) -> Result<()> {
    info!("Switching to tenant: {}", tenant);

    match switch_via_switcher(page, tenant).await {
        Ok(()) => {
            info!("Switched to: {}", tenant);
            Ok(())
        }
        Err(e) => {
            warn!("Tenant switch failed ({}), trying fallback path", e);
            switch_via_fallback(page, tenant).await?;
            info!("Switched via fallback path: {}", tenant);
            Ok(())
        }
    }
}

/// Primary path: the dedicated switcher control in the toolbar.
async fn switch_via_switcher(page: &PageHandle, tenant: &str) -> Result<()> {
    PageNavigator::click(page, SWITCHER_BUTTON).await?;
    tokio::time::sleep(Duration::from_millis(MENU_SETTLE_MS)).await;

    // Filter input is optional; some builds render the full list directly.
    if PageNavigator::exists(page, SWITCHER_FILTER).await? {
        PageNavigator::fill(page, SWITCHER_FILTER, tenant).await?;
        tokio::time::sleep(Duration::from_millis(MENU_SETTLE_MS)).await;
    }

    if !PageNavigator::click_by_text(page, SWITCHER_ENTRIES, tenant).await? {
        return Err(SessionError::FormFailed(format!(
            "no switcher entry matching {tenant:?}"
        ))
        .into());
    }

    tokio::time::sleep(Duration::from_millis(SWITCH_SETTLE_MS)).await;
    if PageNavigator::wait_for_network_idle(page, POST_SWITCH_IDLE_MS)
        .await
        .is_err()
    {
        warn!("Network idle not reached after tenant switch");
    }
    Ok(())
}

/// Secondary heuristic: open the first generic dropdown control that
/// exists, then click anything whose text matches the tenant name.
async fn switch_via_fallback(page: &PageHandle, tenant: &str) -> Result<()> {
    for trigger in FALLBACK_TRIGGERS {
        if PageNavigator::exists(page, trigger).await.unwrap_or(false) {
            if let Err(e) = PageNavigator::click(page, trigger).await {
                warn!("Fallback trigger {:?} click failed: {}", trigger, e);
                continue;
            }
            tokio::time::sleep(Duration::from_millis(500)).await;
            break;
        }
    }

    if !PageNavigator::click_by_text(page, FALLBACK_ENTRY_SCOPE, tenant).await? {
        return Err(SessionError::FormFailed(format!(
            "tenant {tenant:?} not found via fallback path"
        ))
        .into());
    }

    tokio::time::sleep(Duration::from_millis(2000)).await;
    Ok(())
}
