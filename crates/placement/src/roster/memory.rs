use std::sync::{Arc, Mutex};

use super::store::{RosterStore, StoreError};
use crate::allocation::{Preference, RosterSnapshot};

/// Process-local store, used for demos and as a test double.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRosterStore {
    snapshot: Arc<Mutex<RosterSnapshot>>,
}

impl InMemoryRosterStore {
    pub fn new(snapshot: RosterSnapshot) -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(snapshot)),
        }
    }
}

impl RosterStore for InMemoryRosterStore {
    fn load(&self) -> Result<RosterSnapshot, StoreError> {
        let guard = self
            .snapshot
            .lock()
            .map_err(|_| StoreError::Unavailable("roster lock poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save_preferences(
        &self,
        name: &str,
        preferences: &[Preference],
    ) -> Result<usize, StoreError> {
        let mut guard = self
            .snapshot
            .lock()
            .map_err(|_| StoreError::Unavailable("roster lock poisoned".to_string()))?;
        let index = guard
            .applicants
            .iter()
            .position(|applicant| applicant.name == name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;

        guard.applicants[index].preferences = preferences.to_vec();
        Ok(index + 2)
    }
}
