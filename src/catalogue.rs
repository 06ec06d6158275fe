//! Batch catalogue
//!
//! Each batch is a named, ordered list of declarative step records run
//! under one isolated browser session. The records carry everything the
//! executor needs (route, waits, interaction, capture options), so batches
//! are plain data and independently testable.

use crate::capture::{CaptureOptions, CaptureTarget, Locator};
use serde::{Deserialize, Serialize};

/// First row-like element of a list view
pub const FIRST_ROW: &str =
    "mat-row:first-child, tr[mat-row]:first-child, .mat-mdc-row:first-child";

/// First row-like element, accepting card layouts too
pub const FIRST_ROW_OR_CARD: &str =
    "mat-row:first-child, tr[mat-row]:first-child, .mat-mdc-row:first-child, mat-card:first-child";

/// Elements considered tabs for text-matched tab clicks
pub const TAB_SCOPE: &str = "[role=\"tab\"], .mat-mdc-tab, .mat-tab-label";

/// One labeled tab to capture during a detail drill-down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabShot {
    /// Output artifact name
    pub name: String,
    /// Visible tab label
    pub label: String,
}

impl TabShot {
    /// Construct a tab capture record
    pub fn new<S: Into<String>>(name: S, label: S) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }
}

/// An extra scroll-to-section capture taken after a drill-down detail shot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollShot {
    /// Output artifact name
    pub name: String,
    /// Section selector to bring into view
    pub selector: String,
}

/// Navigate to a list, open its first row, capture the detail view, then
/// capture each labeled tab that is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillDown {
    /// List route to start from
    pub list_route: String,
    /// Selector locating the first row-like element
    pub row_selector: String,
    /// Artifact name of the detail capture
    pub capture_name: String,
    /// Labeled tabs to capture, each best-effort
    pub tabs: Vec<TabShot>,
    /// Optional section scrolled into view and captured after the detail
    pub scroll_section: Option<ScrollShot>,
    /// Capture the list itself under `capture_name` when no row exists
    pub fallback_to_list: bool,
}

impl DrillDown {
    /// Drill-down with default row selector and no tabs
    pub fn new<S: Into<String>>(list_route: S, capture_name: S) -> Self {
        Self {
            list_route: list_route.into(),
            row_selector: FIRST_ROW.to_string(),
            capture_name: capture_name.into(),
            tabs: Vec::new(),
            scroll_section: None,
            fallback_to_list: false,
        }
    }

    /// Add a labeled tab capture
    pub fn tab<S: Into<String>>(mut self, name: S, label: S) -> Self {
        self.tabs.push(TabShot::new(name.into(), label.into()));
        self
    }

    /// Add a scroll-to-section capture
    pub fn scroll_section<S: Into<String>>(mut self, name: S, selector: S) -> Self {
        self.scroll_section = Some(ScrollShot {
            name: name.into(),
            selector: selector.into(),
        });
        self
    }

    /// Override the row selector
    pub fn row_selector<S: Into<String>>(mut self, selector: S) -> Self {
        self.row_selector = selector.into();
        self
    }

    /// Capture the list itself when no row is present
    pub fn fallback_to_list(mut self) -> Self {
        self.fallback_to_list = true;
        self
    }
}

/// A multi-step wizard opened from the first row of a list. The flow
/// advances by repeatedly locating a "next" control; its absence ends the
/// wizard capture early.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wizard {
    /// List route holding the entity the wizard starts from
    pub list_route: String,
    /// Visible labels of the control opening the wizard, tried in order
    pub open_labels: Vec<String>,
    /// CSS selector for the opening control, tried after the labels
    pub open_selector: Option<String>,
    /// Artifact name per wizard pane, first pane included
    pub panes: Vec<String>,
}

impl Wizard {
    /// Construct a wizard record
    pub fn new<S: Into<String>>(list_route: S, open_labels: Vec<S>, panes: Vec<S>) -> Self {
        Self {
            list_route: list_route.into(),
            open_labels: open_labels.into_iter().map(Into::into).collect(),
            open_selector: None,
            panes: panes.into_iter().map(Into::into).collect(),
        }
    }

    /// Add a CSS fallback for the opening control
    pub fn open_selector<S: Into<String>>(mut self, selector: S) -> Self {
        self.open_selector = Some(selector.into());
        self
    }
}

/// One operation within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    /// Authenticate the session; failure aborts the batch
    Login,
    /// Switch the active tenant context; failure is soft
    SwitchTenant(String),
    /// Execute one capture target
    Capture(CaptureTarget),
    /// Detail-page drill-down with optional tab captures
    DrillDown(DrillDown),
    /// Multi-step wizard flow
    Wizard(Wizard),
}

/// One named, ordered capture recipe run under one isolated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// Batch name used on the command line
    pub name: String,
    /// Human-readable description shown in usage output
    pub description: String,
    /// Ordered steps
    pub steps: Vec<Step>,
}

impl Batch {
    fn new<S: Into<String>>(name: S, description: S, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            steps,
        }
    }

    /// All artifact names this batch can produce.
    pub fn artifact_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for step in &self.steps {
            match step {
                Step::Capture(target) => names.push(target.name.as_str()),
                Step::DrillDown(d) => {
                    names.push(d.capture_name.as_str());
                    names.extend(d.tabs.iter().map(|t| t.name.as_str()));
                    if let Some(ref s) = d.scroll_section {
                        names.push(s.name.as_str());
                    }
                }
                Step::Wizard(w) => names.extend(w.panes.iter().map(String::as_str)),
                Step::Login | Step::SwitchTenant(_) => {}
            }
        }
        names
    }
}

fn shot(name: &str, route: &str) -> Step {
    Step::Capture(CaptureTarget::new(name, route))
}

fn shot_with(name: &str, route: &str, options: CaptureOptions) -> Step {
    Step::Capture(CaptureTarget::with_options(name, route, options))
}

/// The full, ordered capture catalogue.
pub fn standard_catalogue() -> Vec<Batch> {
    vec![
        Batch::new(
            "batch1",
            "Auth & Dashboard",
            vec![
                shot("auth-login-page", "/sessions/signin4"),
                shot("auth-registration-form", "/sessions/company-registration"),
                shot("auth-forgot-password", "/sessions/forgot-password"),
                Step::Login,
                shot_with(
                    "dashboard-overview",
                    "/dashboard/default",
                    CaptureOptions::new().wait_for("mat-card"),
                ),
                shot_with(
                    "dashboard-sidebar-nav",
                    "/dashboard/default",
                    CaptureOptions::new()
                        .crop("mat-sidenav, .sidenav, app-sidebar, [class*=\"sidenav\"]")
                        .delay_ms(1000),
                ),
                shot_with(
                    "dashboard-company-switcher",
                    "/dashboard/default",
                    CaptureOptions::new()
                        .click_btn(Locator::css(
                            "app-company-switcher button[mat-icon-button], app-company-switcher button",
                        ))
                        .delay_ms(1500),
                ),
            ],
        ),
        Batch::new(
            "batch2",
            "Customers & Meters",
            vec![
                Step::Login,
                shot_with(
                    "customers-list",
                    "/customer/list",
                    CaptureOptions::new().wait_for("mat-table, table"),
                ),
                shot_with(
                    "customer-add-form",
                    "/customer/add",
                    CaptureOptions::new().wait_for("form"),
                ),
                Step::DrillDown(
                    DrillDown::new("/customer/list", "customer-detail-overview")
                        .tab("customer-detail-water-statement", "Water Statement")
                        .tab("customer-detail-water-bills", "Water Bill")
                        .tab("customer-detail-meter-readings", "Meter Reading")
                        .tab("customer-detail-accounts", "Account")
                        .tab("customer-detail-water-charges", "Water Charge"),
                ),
                shot_with(
                    "water-meters-list",
                    "/analog-meter/list",
                    CaptureOptions::new().wait_for("mat-table, table"),
                ),
                shot_with(
                    "water-meter-add-form",
                    "/analog-meter/add",
                    CaptureOptions::new().wait_for("form"),
                ),
            ],
        ),
        Batch::new(
            "batch3",
            "Meter Readings",
            vec![
                Step::Login,
                shot_with(
                    "meter-readings-list",
                    "/meter-readings/list",
                    CaptureOptions::new().wait_for("mat-table, table"),
                ),
                shot_with(
                    "meter-reading-add-form",
                    "/meter-readings/add",
                    CaptureOptions::new().wait_for("form"),
                ),
                Step::DrillDown(DrillDown::new("/meter-readings/list", "meter-reading-detail")),
                shot_with(
                    "meter-readings-filtered",
                    "/meter-readings/list",
                    CaptureOptions::new()
                        .wait_for("mat-table, table")
                        .delay_ms(2000),
                ),
            ],
        ),
        Batch::new(
            "batch4",
            "Water Bills",
            vec![
                Step::Login,
                shot_with(
                    "water-bills-list",
                    "/water-bills/list",
                    CaptureOptions::new().wait_for("mat-table, table"),
                ),
                shot_with(
                    "water-bill-add-form",
                    "/water-bills/add",
                    CaptureOptions::new().wait_for("form"),
                ),
                Step::DrillDown(
                    DrillDown::new("/water-bills/list", "water-bill-detail").scroll_section(
                        "water-bill-tier-breakdown",
                        "[class*=\"tier\"], [class*=\"breakdown\"], .tier-breakdown, mat-expansion-panel",
                    ),
                ),
                shot_with(
                    "water-bills-status-filter",
                    "/water-bills/list",
                    CaptureOptions::new()
                        .wait_for("mat-table, table")
                        .delay_ms(2000),
                ),
            ],
        ),
        Batch::new(
            "batch5",
            "Payments",
            vec![
                Step::Login,
                shot_with(
                    "payments-list",
                    "/debit-credits/list",
                    CaptureOptions::new().wait_for("mat-table, table"),
                ),
                shot_with(
                    "payments-failed-tab",
                    "/debit-credits/list",
                    CaptureOptions::new()
                        .click_tab("Failed")
                        .wait_for("mat-table, table"),
                ),
                Step::DrillDown(DrillDown::new("/debit-credits/list", "payment-detail")),
                shot_with(
                    "payments-rent-tab",
                    "/debit-credits/list",
                    CaptureOptions::new()
                        .click_tab("Rent")
                        .wait_for("mat-table, table"),
                ),
            ],
        ),
        Batch::new(
            "batch6",
            "Company Setup & Tariffs",
            vec![
                Step::Login,
                shot_with(
                    "tariffs-list",
                    "/tariff/list",
                    CaptureOptions::new().wait_for("mat-table, table"),
                ),
                shot_with(
                    "tariff-add-form",
                    "/tariff/add",
                    CaptureOptions::new().wait_for("form"),
                ),
                Step::DrillDown(DrillDown::new("/tariff/list", "tariff-detail")),
                shot_with(
                    "regions-list",
                    "/region/list",
                    CaptureOptions::new().wait_for("mat-table, table"),
                ),
                shot_with(
                    "region-add-form",
                    "/region/add",
                    CaptureOptions::new().wait_for("form"),
                ),
                shot_with(
                    "service-charges-list",
                    "/service-charge/list",
                    CaptureOptions::new().wait_for("mat-table, table"),
                ),
                shot_with(
                    "service-charge-add-form",
                    "/service-charge/add",
                    CaptureOptions::new().wait_for("form"),
                ),
                Step::DrillDown(
                    DrillDown::new("/company/list", "company-settings-page").fallback_to_list(),
                ),
            ],
        ),
        Batch::new(
            "batch7",
            "Staff Management",
            vec![
                Step::Login,
                shot_with(
                    "staff-list",
                    "/company-staff/list",
                    CaptureOptions::new().wait_for("mat-table, table"),
                ),
                shot_with(
                    "staff-invite-form",
                    "/company-staff/add",
                    CaptureOptions::new().wait_for("form"),
                ),
                Step::DrillDown(DrillDown::new("/company-staff/list", "staff-detail")),
                shot_with(
                    "staff-role-selector",
                    "/company-staff/add",
                    CaptureOptions::new().wait_for("form").click_btn(Locator::css(
                        "mat-select[formcontrolname=\"role\"], mat-select[formcontrolname=\"roleId\"], [formcontrolname=\"role\"] .mat-mdc-select-trigger",
                    )),
                ),
            ],
        ),
        Batch::new(
            "batch8",
            "Complaints & Reports",
            vec![
                Step::Login,
                shot_with(
                    "complaints-list",
                    "/complaints/list",
                    CaptureOptions::new().wait_for("mat-table, table"),
                ),
                shot_with(
                    "complaint-add-form",
                    "/complaints/add",
                    CaptureOptions::new().wait_for("form"),
                ),
                shot_with(
                    "reports-overview",
                    "/reports/list",
                    CaptureOptions::new().wait_for("mat-card, .report"),
                ),
                shot_with(
                    "reports-map-view",
                    "/reports/list",
                    CaptureOptions::new().click_tab("Map").delay_ms(2000),
                ),
            ],
        ),
        Batch::new(
            "batch9",
            "Real Estate Properties & Units",
            vec![
                Step::Login,
                Step::SwitchTenant("Real Estate".to_string()),
                shot_with(
                    "properties-list",
                    "/properties",
                    CaptureOptions::new().wait_for("mat-table, table, mat-card"),
                ),
                shot_with(
                    "property-add-form",
                    "/properties/add",
                    CaptureOptions::new().wait_for("form"),
                ),
                Step::DrillDown(
                    DrillDown::new("/properties", "property-detail")
                        .row_selector(FIRST_ROW_OR_CARD)
                        .tab("property-units-tab", "Unit"),
                ),
                Step::DrillDown(DrillDown::new("/units", "unit-detail")),
                shot_with(
                    "unit-add-form",
                    "/units/add",
                    CaptureOptions::new().wait_for("form"),
                ),
            ],
        ),
        Batch::new(
            "batch10",
            "Real Estate Tenants & Leases",
            vec![
                Step::Login,
                Step::SwitchTenant("Real Estate".to_string()),
                shot_with(
                    "tenants-list",
                    "/tenants",
                    CaptureOptions::new().wait_for("mat-table, table, mat-card"),
                ),
                shot_with(
                    "tenant-create-form",
                    "/tenants/create",
                    CaptureOptions::new().wait_for("form"),
                ),
                Step::Wizard(
                    Wizard::new(
                        "/tenants",
                        vec!["Move In"],
                        vec![
                            "tenant-move-in-wizard",
                            "tenant-move-in-lease",
                            "tenant-move-in-charges",
                        ],
                    )
                    .open_selector("[routerlink*=\"move-in\"]"),
                ),
                Step::DrillDown(DrillDown::new("/tenants", "tenant-detail")),
            ],
        ),
        Batch::new(
            "batch11",
            "Real Estate Pricing & Transactions",
            vec![
                Step::Login,
                Step::SwitchTenant("Real Estate".to_string()),
                shot_with(
                    "pricing-list",
                    "/pricing",
                    CaptureOptions::new().wait_for("mat-table, table, mat-card"),
                ),
                shot_with(
                    "pricing-create-form",
                    "/pricing/create",
                    CaptureOptions::new().wait_for("form"),
                ),
                Step::DrillDown(DrillDown::new("/pricing", "pricing-detail")),
                shot_with(
                    "transactions-list",
                    "/transactions",
                    CaptureOptions::new().wait_for("mat-table, table"),
                ),
                shot_with(
                    "transactions-money-in",
                    "/transactions",
                    CaptureOptions::new()
                        .click_btn(Locator::Text(vec![
                            "Money In".to_string(),
                            "Record Payment".to_string(),
                            "Add Payment".to_string(),
                        ]))
                        .delay_ms(1500),
                ),
            ],
        ),
    ]
}

/// Find a batch by name.
pub fn find<'a>(catalogue: &'a [Batch], name: &str) -> Option<&'a Batch> {
    catalogue.iter().find(|b| b.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn test_catalogue_has_eleven_batches() {
        assert_eq!(standard_catalogue().len(), 11);
    }

    #[test]
    fn test_artifact_names_unique_across_catalogue() {
        let catalogue = standard_catalogue();
        let mut seen = HashSet::new();
        for batch in &catalogue {
            for name in batch.artifact_names() {
                assert!(seen.insert(name.to_string()), "duplicate artifact name {name:?}");
            }
        }
    }

    #[test]
    fn test_every_batch_with_protected_routes_logs_in_first() {
        for batch in standard_catalogue() {
            // batch1 captures public auth pages before logging in; every
            // other batch must start with Login.
            if batch.name != "batch1" {
                assert_eq!(
                    batch.steps.first(),
                    Some(&Step::Login),
                    "{} must authenticate before any capture",
                    batch.name
                );
            }
        }
    }

    #[test]
    fn test_tenant_switch_only_in_real_estate_batches() {
        for batch in standard_catalogue() {
            let switches = batch
                .steps
                .iter()
                .any(|s| matches!(s, Step::SwitchTenant(_)));
            let expected = matches!(batch.name.as_str(), "batch9" | "batch10" | "batch11");
            assert_eq!(switches, expected, "{}", batch.name);
        }
    }

    #[test]
    fn test_find_known_and_unknown() {
        let catalogue = standard_catalogue();
        assert!(find(&catalogue, "batch4").is_some());
        assert!(find(&catalogue, "batch99").is_none());
    }

    #[test]
    fn test_batch1_captures_auth_pages_before_login() {
        let catalogue = standard_catalogue();
        let batch1 = find(&catalogue, "batch1").unwrap();
        let login_pos = batch1
            .steps
            .iter()
            .position(|s| matches!(s, Step::Login))
            .unwrap();
        assert_eq!(login_pos, 3);
        for step in &batch1.steps[..login_pos] {
            assert!(matches!(step, Step::Capture(_)));
        }
    }

    #[test]
    fn test_customer_drilldown_tabs() {
        let catalogue = standard_catalogue();
        let batch2 = find(&catalogue, "batch2").unwrap();
        let drill = batch2
            .steps
            .iter()
            .find_map(|s| match s {
                Step::DrillDown(d) => Some(d),
                _ => None,
            })
            .unwrap();
        assert_eq!(drill.capture_name, "customer-detail-overview");
        assert_eq!(drill.tabs.len(), 5);
        assert_eq!(drill.tabs[0].label, "Water Statement");
    }

    #[test]
    fn test_wizard_panes_ordered() {
        let catalogue = standard_catalogue();
        let batch10 = find(&catalogue, "batch10").unwrap();
        let wizard = batch10
            .steps
            .iter()
            .find_map(|s| match s {
                Step::Wizard(w) => Some(w),
                _ => None,
            })
            .unwrap();
        assert_eq!(
            wizard.panes,
            vec![
                "tenant-move-in-wizard",
                "tenant-move-in-lease",
                "tenant-move-in-charges"
            ]
        );
        assert_eq!(wizard.open_labels, vec!["Move In"]);
        // Router-link fallback covers builds where the label is an icon.
        assert_eq!(
            wizard.open_selector.as_deref(),
            Some("[routerlink*=\"move-in\"]")
        );
    }

    #[test]
    fn test_tier_breakdown_scroll_section() {
        let catalogue = standard_catalogue();
        let batch4 = find(&catalogue, "batch4").unwrap();
        let drill = batch4
            .steps
            .iter()
            .find_map(|s| match s {
                Step::DrillDown(d) => Some(d),
                _ => None,
            })
            .unwrap();
        let scroll = drill.scroll_section.as_ref().unwrap();
        assert_eq!(scroll.name, "water-bill-tier-breakdown");
    }

    #[test]
    fn test_company_settings_falls_back_to_list() {
        let catalogue = standard_catalogue();
        let batch6 = find(&catalogue, "batch6").unwrap();
        let drill = batch6
            .steps
            .iter()
            .find_map(|s| match s {
                Step::DrillDown(d) if d.capture_name == "company-settings-page" => Some(d),
                _ => None,
            })
            .unwrap();
        assert!(drill.fallback_to_list);
    }
}
