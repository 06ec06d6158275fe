//! Page navigation and interaction helpers
//!
//! Navigation waits for minimal DOM readiness with a bounded timeout.
//! The interaction helpers (selector waits, clicks, text-matched clicks,
//! scrolls) report failure through `Result` so the capture step can decide
//! whether a failure is soft or fatal.

use crate::browser::PageHandle;
use crate::error::{Error, NavigationError, Result};
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

/// Query parameter asserted on every navigated route, signalling the target
/// application to render a state suitable for illustrative capture.
pub const DOCS_MODE_PARAM: (&str, &str) = ("docs_mode", "true");

/// Build the destination URL for a route: join onto the base and append the
/// documentation-mode flag, preserving any query string the route carries.
pub fn docs_mode_url(base_url: &str, route: &str) -> Result<String> {
    let base = Url::parse(base_url)
        .map_err(|e| NavigationError::InvalidUrl(format!("{base_url}: {e}")))?;
    let mut url = base
        .join(route)
        .map_err(|e| NavigationError::InvalidUrl(format!("{route}: {e}")))?;
    url.query_pairs_mut()
        .append_pair(DOCS_MODE_PARAM.0, DOCS_MODE_PARAM.1);
    Ok(url.to_string())
}

/// Page navigator and interaction helpers
pub struct PageNavigator;

impl PageNavigator {
    /// Navigate to a URL and wait for DOMContentLoaded, bounded by
    /// `timeout_ms`.
    #[instrument(skip(page))]
    pub async fn goto(page: &PageHandle, url: &str, timeout_ms: u64) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(NavigationError::InvalidUrl(format!(
                "URL must start with http:// or https://: {url}"
            ))
            .into());
        }

        info!("Navigating to: {}", url);

        let timeout = Duration::from_millis(timeout_ms);
        tokio::time::timeout(timeout, page.page.goto(url))
            .await
            .map_err(|_| NavigationError::Timeout(timeout_ms))?
            .map_err(|e| NavigationError::LoadFailed(e.to_string()))?;

        let ready_script = r#"
            new Promise(resolve => {
                if (document.readyState !== 'loading') {
                    resolve(true);
                } else {
                    document.addEventListener('DOMContentLoaded', () => resolve(true));
                }
            })
        "#;

        tokio::time::timeout(timeout, page.page.evaluate(ready_script))
            .await
            .map_err(|_| NavigationError::Timeout(timeout_ms))?
            .map_err(|e| Error::cdp(e.to_string()))?;

        debug!("Navigation complete: {}", url);
        Ok(())
    }

    /// Wait for network quiescence, approximated as the load event plus a
    /// short settle window. Errors out on timeout; callers treat that as a
    /// soft failure because some views hold long-lived connections.
    #[instrument(skip(page))]
    pub async fn wait_for_network_idle(page: &PageHandle, timeout_ms: u64) -> Result<()> {
        let script = r#"
            new Promise(resolve => {
                if (document.readyState === 'complete') {
                    setTimeout(() => resolve(true), 500);
                } else {
                    window.addEventListener('load', () => {
                        setTimeout(() => resolve(true), 500);
                    });
                }
            })
        "#;

        let timeout = Duration::from_millis(timeout_ms);
        tokio::time::timeout(timeout, page.page.evaluate(script))
            .await
            .map_err(|_| NavigationError::Timeout(timeout_ms))?
            .map_err(|e| Error::cdp(e.to_string()))?;

        Ok(())
    }

    /// Wait for a specific element to appear.
    #[instrument(skip(page))]
    pub async fn wait_for_selector(
        page: &PageHandle,
        selector: &str,
        timeout_ms: u64,
    ) -> Result<()> {
        let script = selector_wait_script(selector, timeout_ms)?;

        let timeout = Duration::from_millis(timeout_ms + 1000);
        tokio::time::timeout(timeout, page.page.evaluate(script.as_str()))
            .await
            .map_err(|_| NavigationError::Timeout(timeout_ms))?
            .map_err(|e| Error::cdp(e.to_string()))?;

        Ok(())
    }

    /// Click the first element matching a selector.
    #[instrument(skip(page))]
    pub async fn click(page: &PageHandle, selector: &str) -> Result<()> {
        let element = page
            .page
            .find_element(selector)
            .await
            .map_err(|e| Error::cdp(format!("element not found {selector:?}: {e}")))?;
        element
            .click()
            .await
            .map_err(|e| Error::cdp(format!("click failed {selector:?}: {e}")))?;
        debug!("Clicked: {}", selector);
        Ok(())
    }

    /// Click the first element within `scope` whose visible text contains
    /// `text`. Returns false when no match exists.
    #[instrument(skip(page))]
    pub async fn click_by_text(page: &PageHandle, scope: &str, text: &str) -> Result<bool> {
        let script = format!(
            r#"
                (() => {{
                    const needle = {needle};
                    for (const el of document.querySelectorAll({scope})) {{
                        if ((el.textContent || '').includes(needle)) {{
                            el.click();
                            return true;
                        }}
                    }}
                    return false;
                }})()
            "#,
            needle = serde_json::to_string(text)?,
            scope = serde_json::to_string(scope)?,
        );

        let clicked: bool = page
            .page
            .evaluate(script.as_str())
            .await
            .map_err(|e| Error::cdp(e.to_string()))?
            .into_value()
            .map_err(|e| Error::cdp(e.to_string()))?;

        debug!(clicked, "Text-matched click in {scope:?} for {text:?}");
        Ok(clicked)
    }

    /// Type a value into the first element matching a selector, replacing
    /// any existing content.
    #[instrument(skip(page, value))]
    pub async fn fill(page: &PageHandle, selector: &str, value: &str) -> Result<()> {
        let element = page
            .page
            .find_element(selector)
            .await
            .map_err(|e| Error::cdp(format!("element not found {selector:?}: {e}")))?;
        element
            .click()
            .await
            .map_err(|e| Error::cdp(e.to_string()))?;
        page.page
            .evaluate(clear_field_script(selector)?.as_str())
            .await
            .map_err(|e| Error::cdp(format!("clearing {selector:?} failed: {e}")))?;
        element
            .type_str(value)
            .await
            .map_err(|e| Error::cdp(format!("typing into {selector:?} failed: {e}")))?;
        Ok(())
    }

    /// Scroll the first element matching a selector into view. Returns
    /// false when no element matches.
    #[instrument(skip(page))]
    pub async fn scroll_into_view(page: &PageHandle, selector: &str) -> Result<bool> {
        let script = format!(
            r#"
                (() => {{
                    const el = document.querySelector({});
                    if (!el) return false;
                    el.scrollIntoView({{ block: 'center' }});
                    return true;
                }})()
            "#,
            serde_json::to_string(selector)?,
        );

        let found: bool = page
            .page
            .evaluate(script.as_str())
            .await
            .map_err(|e| Error::cdp(e.to_string()))?
            .into_value()
            .map_err(|e| Error::cdp(e.to_string()))?;

        Ok(found)
    }

    /// Check whether any element matches a selector.
    #[instrument(skip(page))]
    pub async fn exists(page: &PageHandle, selector: &str) -> Result<bool> {
        let script = format!(
            "document.querySelector({}) !== null",
            serde_json::to_string(selector)?,
        );

        let found: bool = page
            .page
            .evaluate(script.as_str())
            .await
            .map_err(|e| Error::cdp(e.to_string()))?
            .into_value()
            .map_err(|e| Error::cdp(e.to_string()))?;

        Ok(found)
    }
}

/// Render the rAF polling script for a selector wait. The selector is
/// JSON-embedded so quotes, backslashes, and newlines survive intact.
fn selector_wait_script(selector: &str, timeout_ms: u64) -> Result<String> {
    Ok(format!(
        r#"
            new Promise((resolve, reject) => {{
                const selector = {selector};
                const timeout = {timeout_ms};
                const start = Date.now();

                function check() {{
                    const el = document.querySelector(selector);
                    if (el) {{
                        resolve(true);
                    }} else if (Date.now() - start > timeout) {{
                        reject(new Error('Timeout waiting for selector'));
                    }} else {{
                        requestAnimationFrame(check);
                    }}
                }}
                check();
            }})
        "#,
        selector = serde_json::to_string(selector)?,
        timeout_ms = timeout_ms,
    ))
}

/// Render the script emptying a field before new input, notifying the
/// framework through an input event.
fn clear_field_script(selector: &str) -> Result<String> {
    Ok(format!(
        r#"
            (() => {{
                const el = document.querySelector({});
                if (!el) return;
                el.value = '';
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
            }})()
        "#,
        serde_json::to_string(selector)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_docs_mode_url_plain_route() {
        let url = docs_mode_url("http://localhost:4200", "/customer/list").unwrap();
        assert_eq!(url, "http://localhost:4200/customer/list?docs_mode=true");
    }

    #[test]
    fn test_docs_mode_url_preserves_existing_query() {
        let url = docs_mode_url("http://localhost:4200", "/reports/list?period=monthly").unwrap();
        assert_eq!(
            url,
            "http://localhost:4200/reports/list?period=monthly&docs_mode=true"
        );
    }

    #[test]
    fn test_docs_mode_url_base_with_trailing_slash() {
        let url = docs_mode_url("http://localhost:4200/", "/dashboard/default").unwrap();
        assert_eq!(url, "http://localhost:4200/dashboard/default?docs_mode=true");
    }

    #[test]
    fn test_docs_mode_url_invalid_base() {
        assert!(docs_mode_url("not a url", "/x").is_err());
    }

    #[test]
    fn test_docs_mode_url_non_local_base() {
        let url = docs_mode_url("https://demo.easybiller.com", "/tariff/list").unwrap();
        assert_eq!(url, "https://demo.easybiller.com/tariff/list?docs_mode=true");
    }

    #[test]
    fn test_selector_wait_script_embeds_awkward_selectors() {
        // Quotes and backslashes must reach the page as one JSON string
        // literal, never spliced into a quoted context.
        let sel = r#"input[aria-label="O'Brien \ co"]"#;
        let script = selector_wait_script(sel, 5000).unwrap();
        assert!(script.contains(&serde_json::to_string(sel).unwrap()));
        assert!(!script.contains("querySelector('"));
        assert!(script.contains("const timeout = 5000"));
    }

    #[test]
    fn test_clear_field_script_embeds_selector_as_json() {
        let script = clear_field_script("input[formcontrolname=\"email\"]").unwrap();
        assert!(script.contains(r#""input[formcontrolname=\"email\"]""#));
        assert!(script.contains("el.value = ''"));
        assert!(script.contains("new Event('input'"));
    }
}
