//! Catalogue and capture-target tests
//!
//! These verify the declarative batch table: unique artifact naming,
//! authentication ordering, and the shape of the drill-down and wizard
//! records the executor interprets.

use guideshot::capture::{CaptureOptions, CaptureTarget, Locator};
use guideshot::catalogue::{find, standard_catalogue, Step};
use guideshot::Config;
use std::collections::HashSet;
use std::path::PathBuf;

// ============================================================================
// Artifact naming
// ============================================================================

#[test]
fn test_artifact_names_unique_across_whole_catalogue() {
    let catalogue = standard_catalogue();
    let mut seen = HashSet::new();
    for batch in &catalogue {
        for name in batch.artifact_names() {
            assert!(
                seen.insert(name.to_string()),
                "artifact name {name:?} appears twice"
            );
        }
    }
    // Sanity: the catalogue is not trivially empty
    assert!(seen.len() > 40, "expected a substantial catalogue, got {}", seen.len());
}

#[test]
fn test_filenames_derive_solely_from_target_name() {
    let config = Config::builder().output_dir("/var/shots").build();
    let a = CaptureTarget::new("customers-list", "/customer/list");
    let b = CaptureTarget::new("customers-list", "/some/other/route");
    assert_eq!(a.output_path(&config), b.output_path(&config));
    assert_eq!(
        a.output_path(&config),
        PathBuf::from("/var/shots/customers-list.png")
    );
}

// ============================================================================
// Batch structure
// ============================================================================

#[test]
fn test_known_batches_resolve() {
    let catalogue = standard_catalogue();
    for name in [
        "batch1", "batch2", "batch3", "batch4", "batch5", "batch6", "batch7", "batch8", "batch9",
        "batch10", "batch11",
    ] {
        assert!(find(&catalogue, name).is_some(), "missing {name}");
    }
    assert!(find(&catalogue, "batch12").is_none());
}

#[test]
fn test_protected_batches_authenticate_before_captures() {
    for batch in standard_catalogue() {
        if batch.name == "batch1" {
            continue; // captures public auth pages first
        }
        let login = batch.steps.iter().position(|s| matches!(s, Step::Login));
        let first_capture = batch.steps.iter().position(|s| {
            matches!(
                s,
                Step::Capture(_) | Step::DrillDown(_) | Step::Wizard(_)
            )
        });
        assert!(
            login.unwrap() < first_capture.unwrap(),
            "{} captures before authenticating",
            batch.name
        );
    }
}

#[test]
fn test_real_estate_batches_switch_tenant_after_login() {
    for name in ["batch9", "batch10", "batch11"] {
        let catalogue = standard_catalogue();
        let batch = find(&catalogue, name).unwrap();
        let login = batch
            .steps
            .iter()
            .position(|s| matches!(s, Step::Login))
            .unwrap();
        let switch = batch
            .steps
            .iter()
            .position(|s| matches!(s, Step::SwitchTenant(_)))
            .unwrap();
        assert!(login < switch, "{name}: tenant switch requires a session");
    }
}

// ============================================================================
// Options semantics
// ============================================================================

#[test]
fn test_crop_takes_precedence_over_selector() {
    let opts = CaptureOptions::new()
        .selector("main.content")
        .crop("mat-sidenav");
    assert_eq!(
        opts.crop.as_deref().or(opts.selector.as_deref()),
        Some("mat-sidenav")
    );
}

#[test]
fn test_money_in_button_tries_multiple_labels() {
    let catalogue = standard_catalogue();
    let batch11 = find(&catalogue, "batch11").unwrap();
    let target = batch11
        .steps
        .iter()
        .find_map(|s| match s {
            Step::Capture(t) if t.name == "transactions-money-in" => Some(t),
            _ => None,
        })
        .unwrap();
    match target.options.click_btn.as_ref().unwrap() {
        Locator::Text(labels) => assert!(labels.contains(&"Money In".to_string())),
        other => panic!("expected text locator, got {other:?}"),
    }
}

#[test]
fn test_steps_serialize_roundtrip() {
    // The catalogue is plain data; step records survive serialization.
    let catalogue = standard_catalogue();
    let json = serde_json::to_string(&catalogue).unwrap();
    let back: Vec<guideshot::catalogue::Batch> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, catalogue);
}
