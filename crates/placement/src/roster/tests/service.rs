use super::common::*;
use crate::allocation::{Preference, SlotKey};
use crate::roster::payload::SaveRequest;
use crate::roster::store::RosterStore;
use crate::roster::{RosterService, RosterServiceError};
use std::sync::Arc;

#[test]
fn save_requires_a_name() {
    let (service, _) = build_service();

    for name in [None, Some("   ".to_string())] {
        let request = SaveRequest {
            name,
            preferences: vec![Preference::regular("ER")],
        };
        match service.save(request) {
            Err(RosterServiceError::MissingName) => {}
            other => panic!("expected missing name, got {other:?}"),
        }
    }
}

#[test]
fn save_rejects_unknown_applicant_without_writing() {
    let (service, store) = build_service();

    match service.save(SaveRequest::new("Zed", vec![Preference::regular("ER")])) {
        Err(RosterServiceError::UnknownApplicant(name)) => assert_eq!(name, "Zed"),
        other => panic!("expected unknown applicant, got {other:?}"),
    }
    assert_eq!(store.load().expect("store loads"), snapshot());
}

#[test]
fn save_overwrites_whole_list_and_drops_duplicates() {
    let (service, store) = build_service();

    service
        .save(SaveRequest::new(
            " Bob ",
            vec![
                Preference::regular("ER"),
                Preference::bound("ICU"),
                Preference::regular("ER"),
            ],
        ))
        .expect("save succeeds");

    let stored = store.load().expect("store loads");
    let bob = stored.applicant("Bob").expect("Bob present");
    assert_eq!(
        bob.preferences,
        vec![Preference::regular("ER"), Preference::bound("ICU")]
    );
}

#[test]
fn allocation_report_is_recomputed_after_save() {
    let (service, _) = build_service();

    let before = service.allocation().expect("allocation computes");
    let bob = before
        .placements
        .iter()
        .find(|placement| placement.name == "Bob")
        .expect("Bob placed");
    assert_eq!(bob.assignment.as_ref().map(|a| a.label.as_str()), Some("ER"));

    service
        .save(SaveRequest::new("Bob", vec![Preference::bound("ICU")]))
        .expect("save succeeds");

    let after = service.allocation().expect("allocation computes");
    let bob = after
        .placements
        .iter()
        .find(|placement| placement.name == "Bob")
        .expect("Bob placed");
    let assignment = bob.assignment.as_ref().expect("Bob assigned");
    assert_eq!(assignment.label, "ICU");
    assert!(assignment.is_bound);
    assert_eq!(after.residual.remaining(&SlotKey::bound("ICU")), Some(0));
}

#[test]
fn viewer_projection_counts_applicants_ahead() {
    let (service, _) = build_service();

    let report = service.viewer("Bob").expect("Bob known");
    assert_eq!(report.capacity_before.remaining(&SlotKey::regular("ICU")), Some(0));
    assert_eq!(report.capacity_before.remaining(&SlotKey::regular("ER")), Some(2));

    match service.viewer("Nobody") {
        Err(RosterServiceError::UnknownApplicant(_)) => {}
        other => panic!("expected unknown applicant, got {other:?}"),
    }
}

#[test]
fn store_failures_propagate() {
    let service = RosterService::new(Arc::new(UnavailableStore));

    assert!(matches!(service.data(), Err(RosterServiceError::Store(_))));
    assert!(matches!(
        service.save(SaveRequest::new("Alice", Vec::new())),
        Err(RosterServiceError::Store(_))
    ));
}
