//! Browser automation module
//!
//! High-level browser control through ChromiumOxide: lifecycle management,
//! navigation/interaction helpers, and screenshot serialization.

pub mod capture;
pub mod controller;
pub mod navigation;

pub use capture::PageCapture;
pub use controller::{BrowserController, PageHandle};
pub use navigation::{docs_mode_url, PageNavigator};
