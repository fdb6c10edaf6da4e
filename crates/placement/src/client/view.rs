use serde::Serialize;

use super::editor::PreferenceEditor;
use super::session::Session;
use crate::allocation::{
    allocate, capacity_before, Assignment, CapacityTable, Rank, RosterSnapshot, SlotKey,
};

/// Where the logged-in applicant currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ApplicantStatus {
    Assigned {
        label: String,
        is_bound: bool,
        /// Pre-assigned, so the list cannot be edited.
        locked: bool,
        choices_submitted: usize,
    },
    /// Nothing submitted yet.
    AwaitingPreferences,
    /// Preferences exist but every listed slot is taken.
    AllChoicesFull { choices_submitted: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterRow {
    pub rank: Rank,
    pub name: String,
    pub pre_assigned: bool,
    pub assignment: Option<Assignment>,
    pub is_viewer: bool,
}

/// A department slot the applicant may add to their list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionTile {
    pub label: String,
    pub is_bound: bool,
    pub remaining: u32,
    pub is_full: bool,
    pub is_selected: bool,
}

/// Everything the client renders for one applicant, rebuilt on every snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub status: ApplicantStatus,
    pub roster: Vec<RosterRow>,
    pub options: Vec<OptionTile>,
    pub capacity_before: CapacityTable,
}

impl Dashboard {
    pub fn build(snapshot: &RosterSnapshot, session: &Session, editor: &PreferenceEditor) -> Self {
        let allocation = allocate(snapshot);
        let capacity = capacity_before(snapshot, &allocation, session.current_rank(snapshot));
        let applicant = session.applicant(snapshot);
        let choices_submitted = applicant.map_or(0, |applicant| applicant.preferences.len());

        let status = match allocation.placement_for(&session.name) {
            Some(placement) => match &placement.assignment {
                Some(assignment) => ApplicantStatus::Assigned {
                    label: assignment.label.clone(),
                    is_bound: assignment.is_bound,
                    locked: placement.is_pre_assigned(),
                    choices_submitted,
                },
                None if choices_submitted == 0 => ApplicantStatus::AwaitingPreferences,
                None => ApplicantStatus::AllChoicesFull { choices_submitted },
            },
            None => ApplicantStatus::AwaitingPreferences,
        };

        let roster = allocation
            .placements()
            .iter()
            .map(|placement| RosterRow {
                rank: placement.rank,
                name: placement.name.clone(),
                pre_assigned: placement.is_pre_assigned(),
                assignment: placement.assignment.clone(),
                is_viewer: placement.name == session.name,
            })
            .collect();

        // Only regular slots are offered, and only for departments that have any.
        let options = snapshot
            .departments
            .iter()
            .filter(|department| department.regular > 0)
            .map(|department| {
                let key = SlotKey::regular(department.label.clone());
                let remaining = capacity
                    .remaining(&key)
                    .unwrap_or_else(|| u32::try_from(department.regular).unwrap_or(u32::MAX));
                OptionTile {
                    label: department.label.clone(),
                    is_bound: false,
                    remaining,
                    is_full: remaining == 0,
                    is_selected: editor.is_selected(&department.label, false),
                }
            })
            .collect();

        Self {
            status,
            roster,
            options,
            capacity_before: capacity,
        }
    }
}
