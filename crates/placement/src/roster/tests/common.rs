use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::allocation::{Applicant, Department, Preference, RosterSnapshot};
use crate::roster::store::{RosterStore, StoreError};
use crate::roster::{roster_router, InMemoryRosterStore, RosterService};

pub(super) fn snapshot() -> RosterSnapshot {
    RosterSnapshot::new(
        vec![Department::new("ICU", 1, 1), Department::new("ER", 2, 0)],
        vec![
            Applicant::new(2, "Bob")
                .with_password("456")
                .with_preferences(vec![Preference::regular("ICU"), Preference::regular("ER")]),
            Applicant::new(1, "Alice")
                .with_password("123")
                .with_preferences(vec![Preference::regular("ICU")]),
            Applicant::new(3, "Cara").with_pre_assigned("ICU(綁定)"),
        ],
    )
}

pub(super) fn build_service() -> (RosterService<InMemoryRosterStore>, Arc<InMemoryRosterStore>) {
    let store = Arc::new(InMemoryRosterStore::new(snapshot()));
    (RosterService::new(store.clone()), store)
}

pub(super) fn router_with_store(store: InMemoryRosterStore) -> axum::Router {
    roster_router(Arc::new(RosterService::new(Arc::new(store))))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Store whose backend is always down.
pub(super) struct UnavailableStore;

impl RosterStore for UnavailableStore {
    fn load(&self) -> Result<RosterSnapshot, StoreError> {
        Err(StoreError::Unavailable("sheet offline".to_string()))
    }

    fn save_preferences(&self, _: &str, _: &[Preference]) -> Result<usize, StoreError> {
        Err(StoreError::Unavailable("sheet offline".to_string()))
    }
}
