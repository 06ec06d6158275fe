//! Run orchestration
//!
//! Resolves which batch(es) to execute, owns the one browser process for
//! the whole run, and isolates per-batch failures so one batch cannot
//! abort the others. No operation is retried.

use crate::browser::BrowserController;
use crate::catalogue::{self, Batch};
use crate::config::Config;
use crate::error::{CatalogueError, Result};
use crate::executor;
use tracing::{error, info, instrument};

/// What the operator asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// No selection: print usage, do nothing else
    Usage,
    /// Execute one named batch
    Single(String),
    /// Execute the full catalogue, one isolated session per batch
    All,
}

/// Render the usage text, including available batch names.
pub fn usage_text(catalogue: &[Batch]) -> String {
    let mut out = String::from(
        "Usage:\n  guideshot <batch>   Run a specific batch\n  guideshot --all     Run all batches\n\nAvailable batches:\n",
    );
    for batch in catalogue {
        out.push_str(&format!("  {:<10} {}\n", batch.name, batch.description));
    }
    out
}

/// Execute a capture run.
///
/// Batch selection is resolved before the browser is launched, so an
/// unknown name never starts a capture. The browser is released in a
/// guaranteed-cleanup path whatever the batch outcomes.
#[instrument(skip(config))]
pub async fn run(config: &Config, mode: Mode) -> Result<()> {
    let catalogue = catalogue::standard_catalogue();

    let selection: Vec<&Batch> = match &mode {
        Mode::Usage => {
            println!("{}", usage_text(&catalogue));
            return Ok(());
        }
        Mode::Single(name) => {
            let batch = catalogue::find(&catalogue, name)
                .ok_or_else(|| CatalogueError::UnknownBatch(name.clone()))?;
            vec![batch]
        }
        Mode::All => catalogue.iter().collect(),
    };

    let browser = BrowserController::launch(config).await?;

    // Batch failures are isolated inside run_batches; the browser teardown
    // below runs regardless of them.
    let failed = run_batches(selection, |batch| {
        executor::execute_batch(&browser, config, batch)
    })
    .await;

    browser.close().await?;

    if failed > 0 {
        info!("Done ({} batch(es) failed)", failed);
    } else {
        info!("Done");
    }
    Ok(())
}

/// Run the selected batches strictly sequentially, isolating failures: a
/// failed batch is logged and the remaining batches still run. Returns how
/// many batches failed.
async fn run_batches<'a, F, Fut>(selection: Vec<&'a Batch>, mut exec: F) -> usize
where
    F: FnMut(&'a Batch) -> Fut,
    Fut: std::future::Future<Output = Result<()>>,
{
    let mut failed = 0;
    for batch in selection {
        if let Err(e) = exec(batch).await {
            error!("Batch {} failed: {}", batch.name, e);
            failed += 1;
        }
    }
    failed
}
