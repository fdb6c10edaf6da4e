use std::sync::Arc;

use tracing::info;

use super::payload::{AllocationReport, SaveRequest, ViewerReport};
use super::store::{RosterStore, StoreError};
use crate::allocation::{allocate, capacity_before, dedupe_preferences, RosterSnapshot};

/// Validation and allocation views over an injected [`RosterStore`].
pub struct RosterService<S> {
    store: Arc<S>,
}

impl<S> RosterService<S>
where
    S: RosterStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Current configuration and roster, straight from the store.
    pub fn data(&self) -> Result<RosterSnapshot, RosterServiceError> {
        Ok(self.store.load()?)
    }

    /// Overwrites an applicant's preference list. Returns the sheet row written.
    pub fn save(&self, request: SaveRequest) -> Result<usize, RosterServiceError> {
        let name = request
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or(RosterServiceError::MissingName)?;
        let preferences = dedupe_preferences(request.preferences);

        match self.store.save_preferences(&name, &preferences) {
            Ok(row) => {
                info!(applicant = %name, row, choices = preferences.len(), "saved preference list");
                Ok(row)
            }
            Err(StoreError::NotFound(_)) => Err(RosterServiceError::UnknownApplicant(name)),
            Err(other) => Err(other.into()),
        }
    }

    /// Allocation recomputed from the latest store contents.
    pub fn allocation(&self) -> Result<AllocationReport, RosterServiceError> {
        let snapshot = self.data()?;
        Ok(AllocationReport::from(&allocate(&snapshot)))
    }

    /// One applicant's placement plus the capacity visible at their turn.
    pub fn viewer(&self, name: &str) -> Result<ViewerReport, RosterServiceError> {
        let snapshot = self.data()?;
        let allocation = allocate(&snapshot);
        let applicant = snapshot
            .applicant(name)
            .ok_or_else(|| RosterServiceError::UnknownApplicant(name.to_string()))?;
        let placement = allocation
            .placement_for(name)
            .ok_or_else(|| RosterServiceError::UnknownApplicant(name.to_string()))?;

        Ok(ViewerReport {
            placement: placement.into(),
            capacity_before: capacity_before(&snapshot, &allocation, applicant.rank),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RosterServiceError {
    #[error("missing applicant name")]
    MissingName,
    #[error("applicant '{0}' not found")]
    UnknownApplicant(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
