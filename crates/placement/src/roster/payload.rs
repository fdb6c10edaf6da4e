use serde::{Deserialize, Serialize};

use crate::allocation::{
    Allocation, Assignment, CapacityTable, Placement, PlacementSource, Preference, Rank,
};

/// Body of `POST /api/save`: a whole-list overwrite of one applicant's preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::allocation::domain::null_as_empty"
    )]
    pub preferences: Vec<Preference>,
}

impl SaveRequest {
    pub fn new(name: impl Into<String>, preferences: Vec<Preference>) -> Self {
        Self {
            name: Some(name.into()),
            preferences,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveResponse {
    pub fn saved() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Public view of one placement.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementView {
    pub rank: Rank,
    pub name: String,
    pub pre_assigned: bool,
    pub assignment: Option<Assignment>,
    pub outcome: PlacementSource,
}

impl From<&Placement> for PlacementView {
    fn from(placement: &Placement) -> Self {
        Self {
            rank: placement.rank,
            name: placement.name.clone(),
            pre_assigned: placement.is_pre_assigned(),
            assignment: placement.assignment.clone(),
            outcome: placement.source,
        }
    }
}

/// Body of `GET /api/allocation`.
#[derive(Debug, Clone, Serialize)]
pub struct AllocationReport {
    pub placements: Vec<PlacementView>,
    pub residual: CapacityTable,
}

impl From<&Allocation> for AllocationReport {
    fn from(allocation: &Allocation) -> Self {
        Self {
            placements: allocation.placements().iter().map(PlacementView::from).collect(),
            residual: allocation.residual().clone(),
        }
    }
}

/// Body of `GET /api/allocation/{name}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerReport {
    pub placement: PlacementView,
    pub capacity_before: CapacityTable,
}
