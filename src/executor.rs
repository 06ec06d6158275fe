//! Batch executor
//!
//! Interprets the declarative step records of a batch against one fresh
//! browser session. Each step reports an explicit [`StepOutcome`], so the
//! continue/abort policy is a single match here instead of exception
//! suppression scattered through the call sites.

use crate::browser::{docs_mode_url, BrowserController, PageCapture, PageHandle, PageNavigator};
use crate::capture::{self, masked_shot, write_artifact};
use crate::catalogue::{Batch, DrillDown, Step, Wizard, FIRST_ROW};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::session;
use std::ops::ControlFlow;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Settle after navigating to a list before probing for rows
const LIST_SETTLE_MS: u64 = 2000;
/// Settle after opening a detail view or wizard pane
const DETAIL_SETTLE_MS: u64 = 1500;
/// Idle timeout after in-page navigation clicks
const POST_CLICK_IDLE_MS: u64 = 8000;
/// Settle after scrolling a section into view
const SCROLL_SETTLE_MS: u64 = 500;

/// Result of executing one step.
#[derive(Debug)]
pub enum StepOutcome {
    /// Step completed
    Ok,
    /// Step degraded or was skipped; the batch continues
    Soft(String),
    /// Step failed in a way that invalidates the rest of the batch
    Hard(Error),
}

/// Continue/abort decision for one step outcome. Soft outcomes are logged
/// against the owning batch and execution continues; a hard outcome breaks
/// with its error.
fn outcome_policy(outcome: StepOutcome, batch: &str) -> ControlFlow<Error> {
    match outcome {
        StepOutcome::Ok => ControlFlow::Continue(()),
        StepOutcome::Soft(reason) => {
            warn!("Step degraded in {}: {}", batch, reason);
            ControlFlow::Continue(())
        }
        StepOutcome::Hard(err) => {
            error!("Batch {} aborted: {}", batch, err);
            ControlFlow::Break(err)
        }
    }
}

/// Fold a sequence of step outcomes into one batch result.
///
/// Consumption stops at the first hard outcome, which becomes the batch
/// error; soft outcomes are logged and skipped over. The live step loop
/// applies the same policy per step.
pub fn fold_outcomes<I>(batch: &str, outcomes: I) -> Result<()>
where
    I: IntoIterator<Item = StepOutcome>,
{
    for outcome in outcomes {
        if let ControlFlow::Break(err) = outcome_policy(outcome, batch) {
            return Err(err);
        }
    }
    Ok(())
}

/// Execute one batch under a fresh, exclusively-owned page.
///
/// The page is torn down whatever the outcome; a hard failure is returned
/// to the caller for isolation at the runner boundary.
#[instrument(skip(browser, config, batch), fields(batch = %batch.name))]
pub async fn execute_batch(
    browser: &BrowserController,
    config: &Config,
    batch: &Batch,
) -> Result<()> {
    info!("Running batch: {} ({})", batch.name, batch.description);

    let page = browser.new_page().await?;

    let mut result = Ok(());
    for step in &batch.steps {
        let outcome = execute_step(&page, config, step).await;
        if let ControlFlow::Break(err) = outcome_policy(outcome, &batch.name) {
            result = Err(err);
            break;
        }
    }

    if let Err(e) = page.close().await {
        warn!("Failed to close page for {}: {}", batch.name, e);
    }

    result
}

/// Execute one step record.
pub async fn execute_step(page: &PageHandle, config: &Config, step: &Step) -> StepOutcome {
    match step {
        Step::Login => match session::login(page, config).await {
            Ok(()) => StepOutcome::Ok,
            Err(e) => StepOutcome::Hard(e),
        },
        Step::SwitchTenant(tenant) => match session::switch_tenant(page, tenant).await {
            Ok(()) => StepOutcome::Ok,
            Err(e) => StepOutcome::Soft(format!("tenant switch to {tenant:?} failed: {e}")),
        },
        Step::Capture(target) => match capture::capture(page, config, target).await {
            Ok(()) => StepOutcome::Ok,
            Err(e) => StepOutcome::Hard(e),
        },
        Step::DrillDown(drill) => run_drilldown(page, config, drill).await,
        Step::Wizard(wizard) => run_wizard(page, config, wizard).await,
    }
}

/// Open a list's first row and capture the detail view plus any tabs.
async fn run_drilldown(page: &PageHandle, config: &Config, drill: &DrillDown) -> StepOutcome {
    let url = match docs_mode_url(&config.base_url, &drill.list_route) {
        Ok(url) => url,
        Err(e) => return StepOutcome::Hard(e),
    };
    if let Err(e) = PageNavigator::goto(page, &url, config.nav_timeout_ms).await {
        return StepOutcome::Hard(e);
    }
    tokio::time::sleep(Duration::from_millis(LIST_SETTLE_MS)).await;

    let has_row = PageNavigator::exists(page, &drill.row_selector)
        .await
        .unwrap_or(false);
    if !has_row {
        if drill.fallback_to_list {
            // Capture the list itself under the detail name
            return match masked_shot(page, config, &drill.capture_name, false).await {
                Ok(()) => StepOutcome::Ok,
                Err(e) => StepOutcome::Hard(e),
            };
        }
        return StepOutcome::Soft(format!(
            "no rows found in {} for detail capture",
            drill.list_route
        ));
    }

    if let Err(e) = PageNavigator::click(page, &drill.row_selector).await {
        return StepOutcome::Soft(format!("first-row click failed: {e}"));
    }
    if PageNavigator::wait_for_network_idle(page, POST_CLICK_IDLE_MS)
        .await
        .is_err()
    {
        warn!("Network idle not reached after opening detail view");
    }
    tokio::time::sleep(Duration::from_millis(DETAIL_SETTLE_MS)).await;

    if let Err(e) = masked_shot(page, config, &drill.capture_name, false).await {
        return StepOutcome::Hard(e);
    }

    // Each tab is independently best-effort; a missing tab is skipped.
    for tab in &drill.tabs {
        if !capture::click_tab(page, &tab.label).await {
            continue;
        }
        if let Err(e) = masked_shot(page, config, &tab.name, false).await {
            return StepOutcome::Hard(e);
        }
    }

    if let Some(ref section) = drill.scroll_section {
        let shot = match PageNavigator::scroll_into_view(page, &section.selector).await {
            Ok(true) => {
                tokio::time::sleep(Duration::from_millis(SCROLL_SETTLE_MS)).await;
                PageCapture::screenshot(page, false).await
            }
            Ok(false) | Err(_) => {
                // Section missing; a full-page capture still shows it when
                // it renders below the fold.
                warn!(
                    "Section {:?} not found, capturing full page for {}",
                    section.selector, section.name
                );
                PageCapture::screenshot(page, true).await
            }
        };
        match shot {
            Ok(data) => {
                if let Err(e) = write_artifact(config, &section.name, &data).await {
                    return StepOutcome::Hard(e);
                }
            }
            Err(e) => return StepOutcome::Hard(e),
        }
    }

    StepOutcome::Ok
}

/// Open a wizard flow from a list's first row and capture each pane.
/// The flow advances by locating a "next" control; its absence ends the
/// wizard capture early.
async fn run_wizard(page: &PageHandle, config: &Config, wizard: &Wizard) -> StepOutcome {
    let url = match docs_mode_url(&config.base_url, &wizard.list_route) {
        Ok(url) => url,
        Err(e) => return StepOutcome::Hard(e),
    };
    if let Err(e) = PageNavigator::goto(page, &url, config.nav_timeout_ms).await {
        return StepOutcome::Hard(e);
    }
    tokio::time::sleep(Duration::from_millis(LIST_SETTLE_MS)).await;

    if !PageNavigator::exists(page, FIRST_ROW).await.unwrap_or(false) {
        return StepOutcome::Soft(format!("no rows found in {}", wizard.list_route));
    }
    if let Err(e) = PageNavigator::click(page, FIRST_ROW).await {
        return StepOutcome::Soft(format!("first-row click failed: {e}"));
    }
    if PageNavigator::wait_for_network_idle(page, POST_CLICK_IDLE_MS)
        .await
        .is_err()
    {
        warn!("Network idle not reached after opening wizard host");
    }
    tokio::time::sleep(Duration::from_millis(DETAIL_SETTLE_MS)).await;

    let mut opened = false;
    for label in &wizard.open_labels {
        match PageNavigator::click_by_text(page, "button, a", label).await {
            Ok(true) => {
                opened = true;
                break;
            }
            Ok(false) => {}
            Err(e) => warn!("Wizard open control {:?} failed: {}", label, e),
        }
    }
    if !opened {
        if let Some(ref selector) = wizard.open_selector {
            match PageNavigator::click(page, selector).await {
                Ok(()) => opened = true,
                Err(e) => warn!("Wizard open selector {:?} failed: {}", selector, e),
            }
        }
    }
    if !opened {
        return StepOutcome::Soft(format!(
            "wizard open control not found (tried {:?})",
            wizard.open_labels
        ));
    }

    if PageNavigator::wait_for_network_idle(page, POST_CLICK_IDLE_MS)
        .await
        .is_err()
    {
        warn!("Network idle not reached after opening wizard");
    }
    tokio::time::sleep(Duration::from_millis(DETAIL_SETTLE_MS)).await;

    let mut panes = wizard.panes.iter();
    if let Some(first) = panes.next() {
        if let Err(e) = masked_shot(page, config, first, false).await {
            return StepOutcome::Hard(e);
        }
    }

    for pane in panes {
        if !advance_wizard(page).await {
            info!("Wizard has no next control, ending capture early");
            break;
        }
        tokio::time::sleep(Duration::from_millis(DETAIL_SETTLE_MS)).await;
        if let Err(e) = masked_shot(page, config, pane, false).await {
            return StepOutcome::Hard(e);
        }
    }

    StepOutcome::Ok
}

/// Click the wizard's "next" control. Returns false when none exists.
async fn advance_wizard(page: &PageHandle) -> bool {
    match PageNavigator::click_by_text(page, "button", "Next").await {
        Ok(true) => return true,
        Ok(false) => {}
        Err(e) => warn!("Next control lookup failed: {}", e),
    }
    PageNavigator::click(page, ".mat-stepper-next").await.is_ok()
}
