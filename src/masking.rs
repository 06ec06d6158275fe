//! In-page PII masking
//!
//! Before every capture, matched literal text in the live DOM is rewritten
//! to synthetic substitute values. Repeated row-like elements receive
//! visually distinct identities, keyed by their ordinal position modulo the
//! substitute pool size, so a table of customers does not show fifteen
//! copies of the same synthetic name.

use crate::browser::PageHandle;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument};

/// Row-like repeated elements (table rows, card rows).
pub const ROW_SCOPE: &str = "mat-row, tr[mat-row], .mat-mdc-row";

/// Detail/summary containers (detail layouts, cards).
pub const DETAIL_SCOPE: &str =
    "app-detail-page-layout, .detail-container, mat-card, .customer-detail, .mat-mdc-card";

/// Toolbar/header chrome showing the operator identity.
pub const CHROME_SCOPE: &str = "mat-toolbar, .mat-toolbar, header, nav";

/// Side navigation and profile areas showing the operator identity.
pub const SIDENAV_SCOPE: &str = ".sidenav, mat-sidenav, .user-profile, .user-info";

/// A synthetic person identity, rendered as "First Last".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticIdentity {
    /// Given name
    pub first: String,
    /// Family name
    pub last: String,
}

impl SyntheticIdentity {
    /// Construct from string pair
    pub fn new<S: Into<String>>(first: S, last: S) -> Self {
        Self {
            first: first.into(),
            last: last.into(),
        }
    }

    /// Render as "First Last"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first, self.last)
    }
}

/// A literal search string paired with a pool of substitute values.
///
/// The replacement chosen for a matched container at ordinal position `i`
/// is `pool[i % pool.len()]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskingRule {
    /// Literal text to search for (not a pattern)
    pub search: String,
    /// Substitute values, cycled by container ordinal
    pub pool: Vec<String>,
}

impl MaskingRule {
    /// Create a rule
    pub fn new<S: Into<String>>(search: S, pool: Vec<String>) -> Self {
        Self {
            search: search.into(),
            pool,
        }
    }

    /// Substitute for a container at ordinal position `idx`.
    ///
    /// Returns `None` for an empty pool.
    pub fn pick(&self, idx: usize) -> Option<&str> {
        if self.pool.is_empty() {
            return None;
        }
        Some(self.pool[idx % self.pool.len()].as_str())
    }
}

/// Static masking data: substitute pools, the sentinel strings the target
/// application renders for seeded demo data, and the operator's own identity
/// as shown in the page chrome.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskingProfile {
    /// Synthetic identities for row/detail name substitution
    pub identities: Vec<SyntheticIdentity>,
    /// Synthetic email pool
    pub emails: Vec<String>,
    /// Synthetic phone pool
    pub phones: Vec<String>,
    /// Literal name strings the application renders for demo records
    pub sentinel_names: Vec<String>,
    /// Literal email the application renders for demo records
    pub sentinel_email: String,
    /// Literal phone the application renders for demo records
    pub sentinel_phone: String,
    /// The operator's login email as shown in toolbar/sidenav chrome
    pub operator_email: String,
    /// The operator's display name as shown in chrome
    pub operator_name: String,
    /// Generic placeholder replacing the operator email
    pub operator_email_placeholder: String,
    /// Generic placeholder replacing the operator name
    pub operator_name_placeholder: String,
}

impl Default for MaskingProfile {
    fn default() -> Self {
        let identities = [
            ("Wanjiku", "Kamau"),
            ("Otieno", "Odhiambo"),
            ("Amina", "Hassan"),
            ("Kipchoge", "Ruto"),
            ("Njeri", "Mwangi"),
            ("Barasa", "Wekesa"),
            ("Fatuma", "Ali"),
            ("Kibet", "Kosgei"),
            ("Achieng", "Onyango"),
            ("Mutua", "Musyoka"),
            ("Nyambura", "Kariuki"),
            ("Juma", "Bakari"),
            ("Chebet", "Langat"),
            ("Muthoni", "Ndung'u"),
            ("Ouma", "Akinyi"),
        ]
        .into_iter()
        .map(|(f, l)| SyntheticIdentity::new(f, l))
        .collect();

        let emails = [
            "wanjiku.k@example.com",
            "otieno.o@example.com",
            "amina.h@example.com",
            "kipchoge.r@example.com",
            "njeri.m@example.com",
            "barasa.w@example.com",
            "fatuma.a@example.com",
            "kibet.k@example.com",
            "achieng.o@example.com",
            "mutua.m@example.com",
            "nyambura.k@example.com",
            "juma.b@example.com",
            "chebet.l@example.com",
            "muthoni.n@example.com",
            "ouma.a@example.com",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let phones = [
            "+254 712 345 678",
            "+254 723 456 789",
            "+254 734 567 890",
            "+254 745 678 901",
            "+254 756 789 012",
            "+254 767 890 123",
            "+254 778 901 234",
            "+254 789 012 345",
            "+254 790 123 456",
            "+254 701 234 567",
            "+254 712 098 765",
            "+254 723 987 654",
            "+254 734 876 543",
            "+254 745 765 432",
            "+254 756 654 321",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        Self {
            identities,
            emails,
            phones,
            sentinel_names: vec!["John Doe".to_string(), "Standard Customer".to_string()],
            sentinel_email: "customer@example.com".to_string(),
            sentinel_phone: "+254 722 000 000".to_string(),
            operator_email: "nelsonbwogora23136@gmail.com".to_string(),
            operator_name: "Nelson".to_string(),
            operator_email_placeholder: "admin@easybiller.com".to_string(),
            operator_name_placeholder: "Admin".to_string(),
        }
    }
}

impl MaskingProfile {
    /// Rules applied per row/detail container, pool value cycled by ordinal.
    pub fn positional_rules(&self) -> Vec<MaskingRule> {
        let names: Vec<String> = self.identities.iter().map(|i| i.full_name()).collect();
        let mut rules: Vec<MaskingRule> = self
            .sentinel_names
            .iter()
            .map(|s| MaskingRule::new(s.clone(), names.clone()))
            .collect();
        rules.push(MaskingRule::new(
            self.sentinel_email.clone(),
            self.emails.clone(),
        ));
        rules.push(MaskingRule::new(
            self.sentinel_phone.clone(),
            self.phones.clone(),
        ));
        rules
    }

    /// Fixed single substitutions applied in toolbar/sidenav chrome.
    pub fn chrome_rules(&self) -> Vec<(String, String)> {
        vec![
            (
                self.operator_email.clone(),
                self.operator_email_placeholder.clone(),
            ),
            (
                self.operator_name.clone(),
                self.operator_name_placeholder.clone(),
            ),
            (
                self.operator_name.to_lowercase(),
                self.operator_name_placeholder.to_lowercase(),
            ),
        ]
    }
}

/// Applies a [`MaskingProfile`] to a live page.
pub struct MaskingEngine;

impl MaskingEngine {
    /// Rewrite matched text in the live DOM.
    ///
    /// Mutates text nodes only; element count and layout are untouched.
    /// Absence of matching elements for any rule/scope pair is not an
    /// error. Re-applying is a no-op because substitutes no longer match
    /// the original search strings.
    #[instrument(skip(page, profile))]
    pub async fn apply(page: &PageHandle, profile: &MaskingProfile) -> Result<()> {
        let script = Self::script(profile)?;
        page.inner().evaluate(script.as_str()).await?;
        debug!("Masking pass applied");
        Ok(())
    }

    /// Render the in-page masking script for a profile.
    ///
    /// Search strings are literal; they are regex-escaped here, before the
    /// page-side code builds a `RegExp` from them, so metacharacters in
    /// sentinel text (e.g. the `+` in phone numbers) are never interpreted.
    pub fn script(profile: &MaskingProfile) -> Result<String> {
        let positional: Vec<serde_json::Value> = profile
            .positional_rules()
            .iter()
            .map(|r| {
                json!({
                    "search": r.search,
                    "pattern": regex::escape(&r.search),
                    "pool": r.pool,
                })
            })
            .collect();

        let chrome: Vec<serde_json::Value> = profile
            .chrome_rules()
            .iter()
            .map(|(search, replacement)| {
                json!({
                    "search": search,
                    "pattern": regex::escape(search),
                    "replacement": replacement,
                })
            })
            .collect();

        let payload = serde_json::to_string(&json!({
            "positional": positional,
            "chrome": chrome,
            "rowScope": ROW_SCOPE,
            "detailScope": DETAIL_SCOPE,
            "chromeScope": CHROME_SCOPE,
            "sidenavScope": SIDENAV_SCOPE,
        }))?;

        Ok(format!(
            r#"
(() => {{
    const cfg = {payload};

    function replaceText(root, search, pattern, replacement) {{
        if (!root) return;
        const walker = document.createTreeWalker(root, NodeFilter.SHOW_TEXT, null, false);
        let node;
        while ((node = walker.nextNode())) {{
            if (node.textContent.includes(search)) {{
                node.textContent = node.textContent.replace(new RegExp(pattern, 'g'), replacement);
            }}
        }}
    }}

    function applyPositional(scope) {{
        document.querySelectorAll(scope).forEach((el, idx) => {{
            for (const rule of cfg.positional) {{
                if (rule.pool.length === 0) continue;
                replaceText(el, rule.search, rule.pattern, rule.pool[idx % rule.pool.length]);
            }}
        }});
    }}

    applyPositional(cfg.rowScope);
    applyPositional(cfg.detailScope);

    for (const scope of [cfg.chromeScope, cfg.sidenavScope]) {{
        document.querySelectorAll(scope).forEach(el => {{
            for (const rule of cfg.chrome) {{
                replaceText(el, rule.search, rule.pattern, rule.replacement);
            }}
        }});
    }}
}})()
"#
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_name_rendering() {
        let id = SyntheticIdentity::new("Wanjiku", "Kamau");
        assert_eq!(id.full_name(), "Wanjiku Kamau");
    }

    #[test]
    fn test_pick_cycles_by_ordinal() {
        let rule = MaskingRule::new("John Doe", vec!["A".into(), "B".into(), "C".into()]);
        assert_eq!(rule.pick(0), Some("A"));
        assert_eq!(rule.pick(1), Some("B"));
        assert_eq!(rule.pick(2), Some("C"));
        assert_eq!(rule.pick(3), Some("A"));
        assert_eq!(rule.pick(7), Some("B"));
    }

    #[test]
    fn test_pick_empty_pool() {
        let rule = MaskingRule::new("John Doe", vec![]);
        assert_eq!(rule.pick(0), None);
    }

    #[test]
    fn test_positional_selection_matches_modulo() {
        let profile = MaskingProfile::default();
        let rules = profile.positional_rules();
        let name_rule = rules.iter().find(|r| r.search == "John Doe").unwrap();
        let n = profile.identities.len();
        for i in [0, 1, n - 1, n, n + 3] {
            assert_eq!(
                name_rule.pick(i),
                Some(profile.identities[i % n].full_name().as_str())
            );
        }
    }

    #[test]
    fn test_substitutes_never_rematch_search() {
        // Idempotence: a second pass finds nothing because no pool value
        // contains the original search string.
        let profile = MaskingProfile::default();
        for rule in profile.positional_rules() {
            for value in &rule.pool {
                assert!(
                    !value.contains(&rule.search),
                    "substitute {value:?} would re-match {:?}",
                    rule.search
                );
            }
        }
    }

    #[test]
    fn test_default_profile_pools() {
        let profile = MaskingProfile::default();
        assert_eq!(profile.identities.len(), 15);
        assert_eq!(profile.emails.len(), 15);
        assert_eq!(profile.phones.len(), 15);
        assert!(profile
            .sentinel_names
            .contains(&"John Doe".to_string()));
    }

    #[test]
    fn test_chrome_rules_fixed_substitution() {
        let profile = MaskingProfile::default();
        let rules = profile.chrome_rules();
        assert!(rules
            .iter()
            .any(|(s, r)| s == &profile.operator_email && r == &profile.operator_email_placeholder));
        // Lowercased variant is covered too
        assert!(rules.iter().any(|(s, _)| s == "nelson"));
    }

    #[test]
    fn test_script_escapes_metacharacters() {
        let profile = MaskingProfile::default();
        let script = MaskingEngine::script(&profile).unwrap();
        // The phone sentinel contains '+', which must reach the page as an
        // escaped pattern, not a regex quantifier.
        assert!(script.contains(r"\+254 722 000 000"));
        assert!(script.contains("John Doe"));
    }

    #[test]
    fn test_script_embeds_scopes_and_pools() {
        let profile = MaskingProfile::default();
        let script = MaskingEngine::script(&profile).unwrap();
        assert!(script.contains(ROW_SCOPE));
        assert!(script.contains(SIDENAV_SCOPE));
        assert!(script.contains("Wanjiku Kamau"));
        assert!(script.contains("admin@easybiller.com"));
    }

    #[test]
    fn test_script_is_valid_json_payload() {
        // Apostrophes in identity names must survive JSON embedding.
        let profile = MaskingProfile::default();
        let script = MaskingEngine::script(&profile).unwrap();
        assert!(script.contains("Muthoni Ndung'u"));
    }
}
