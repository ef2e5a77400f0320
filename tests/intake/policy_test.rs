//! Reclassification and readiness policies.

use std::collections::BTreeMap;

use serde_json::json;

use lawlord::intake::{ReadinessGuard, ReclassificationPolicy};
use lawlord::knowledge::texas_parking;

#[test]
fn lock_adopts_first_and_repeat_proposals_only() {
    let policy = ReclassificationPolicy::Lock;
    assert!(policy.adopts(None, "dwi"));
    assert!(policy.adopts(Some("dwi"), "dwi"));
    assert!(!policy.adopts(Some("dwi"), "parking_ticket"));
}

#[test]
fn allow_override_adopts_any_proposal() {
    let policy = ReclassificationPolicy::AllowOverride;
    assert!(policy.adopts(Some("dwi"), "parking_ticket"));
}

#[test]
fn trust_oracle_accepts_unconditionally() {
    assert!(ReadinessGuard::TrustOracle.accepts(None, &BTreeMap::new()));
}

#[test]
fn require_critical_needs_every_unconditional_p1_fact() {
    let knowledge = texas_parking();
    let guard = ReadinessGuard::RequireCritical;

    assert!(!guard.accepts(None, &BTreeMap::new()));
    assert!(!guard.accepts(Some(&knowledge), &BTreeMap::new()));

    let gathered: BTreeMap<String, serde_json::Value> = [
        ("violation_type", json!("expired_meter")),
        ("citation_date", json!("Monday")),
        ("citation_city", json!("Austin")),
        ("fine_amount", json!(35)),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), v))
    .collect();
    assert!(guard.accepts(Some(&knowledge), &gathered));
}

#[test]
fn policies_deserialize_from_snake_case() {
    #[derive(serde::Deserialize)]
    struct Knobs {
        reclassification: ReclassificationPolicy,
        readiness_guard: ReadinessGuard,
    }

    let knobs: Knobs = toml::from_str(
        "reclassification = \"allow_override\"\nreadiness_guard = \"require_critical\"\n",
    )
    .expect("policies should parse");
    assert_eq!(knobs.reclassification, ReclassificationPolicy::AllowOverride);
    assert_eq!(knobs.readiness_guard, ReadinessGuard::RequireCritical);
}
