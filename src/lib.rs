//! guideshot - Documentation screenshot capture pipeline
//!
//! This crate drives a headless Chromium browser through a fixed catalogue
//! of application routes and UI interactions ("batches"), applies an
//! in-page PII-masking pass before each capture, and writes PNG artifacts
//! for a documentation site to consume.
//!
//! # Architecture
//!
//! ```text
//! Runner ──▶ Batch Catalogue ──▶ Executor (per-step outcome policy)
//!                                    │
//!                      ┌─────────────┼──────────────┐
//!                      ▼             ▼              ▼
//!                  Session      Capture Step   Masking Engine
//!                (auth/tenant)  (navigate +    (in-page text
//!                               serialize)      substitution)
//!                                    │
//!                                    ▼
//!                         <output_dir>/<name>.png
//! ```
//!
//! Execution is strictly sequential: one browser process per run, one
//! fresh page per batch, never two batches at once. Soft failures (missing
//! tabs, absent crop regions, idle timeouts) degrade the capture and are
//! logged; only authentication failure and catalogue lookup failure abort
//! a batch or the run.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod browser;
pub mod capture;
pub mod catalogue;
pub mod config;
pub mod error;
pub mod executor;
pub mod masking;
pub mod runner;
pub mod session;

// Re-exports for convenience
pub use browser::BrowserController;
pub use capture::{CaptureOptions, CaptureTarget};
pub use config::Config;
pub use error::{Error, Result};
pub use masking::{MaskingEngine, MaskingProfile};
pub use runner::Mode;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
