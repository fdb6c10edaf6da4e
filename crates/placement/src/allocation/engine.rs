use std::collections::HashMap;

use serde::Serialize;

use super::capacity::CapacityTable;
use super::domain::{Applicant, Assignment, Rank, RosterSnapshot};

/// How a placement was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlacementSource {
    /// Fixed ahead of time; bypasses the greedy pass and the counted pool.
    PreAssigned,
    /// Won through the preference list; `choice` is the zero-based list index.
    Preference { choice: usize },
    /// Every listed slot was full, or the list was empty.
    Unassigned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub name: String,
    pub rank: Rank,
    pub assignment: Option<Assignment>,
    pub source: PlacementSource,
}

impl Placement {
    pub fn is_pre_assigned(&self) -> bool {
        matches!(self.source, PlacementSource::PreAssigned)
    }
}

/// Result of one full allocation pass: placements in claim order plus the
/// counted capacity left over.
#[derive(Debug, Clone)]
pub struct Allocation {
    placements: Vec<Placement>,
    by_name: HashMap<String, usize>,
    residual: CapacityTable,
}

impl Allocation {
    fn new(placements: Vec<Placement>, residual: CapacityTable) -> Self {
        // A repeated name resolves to its last placement.
        let by_name = placements
            .iter()
            .enumerate()
            .map(|(index, placement)| (placement.name.clone(), index))
            .collect();

        Self {
            placements,
            by_name,
            residual,
        }
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn placement_for(&self, name: &str) -> Option<&Placement> {
        self.by_name
            .get(name)
            .and_then(|index| self.placements.get(*index))
    }

    pub fn assignment_for(&self, name: &str) -> Option<&Assignment> {
        self.placement_for(name)
            .and_then(|placement| placement.assignment.as_ref())
    }

    pub fn residual(&self) -> &CapacityTable {
        &self.residual
    }

    pub fn assigned_count(&self) -> usize {
        self.placements
            .iter()
            .filter(|placement| placement.assignment.is_some())
            .count()
    }
}

/// Runs the rank-ordered, first-fit pass over a roster snapshot.
///
/// Applicants claim in ascending rank (roster order on ties). A pre-assigned
/// applicant keeps their pre-assignment and does not touch the counted pool;
/// everyone else takes the first listed slot with remaining capacity.
pub fn allocate(snapshot: &RosterSnapshot) -> Allocation {
    let mut capacity = CapacityTable::from_departments(&snapshot.departments);
    let placements = snapshot
        .ranked_applicants()
        .into_iter()
        .map(|applicant| place(applicant, &mut capacity))
        .collect();

    Allocation::new(placements, capacity)
}

fn place(applicant: &Applicant, capacity: &mut CapacityTable) -> Placement {
    let (assignment, source) = match applicant.pre_assignment() {
        Some(assignment) => (Some(assignment), PlacementSource::PreAssigned),
        None => first_available(applicant, capacity),
    };

    Placement {
        name: applicant.name.clone(),
        rank: applicant.rank,
        assignment,
        source,
    }
}

fn first_available(
    applicant: &Applicant,
    capacity: &mut CapacityTable,
) -> (Option<Assignment>, PlacementSource) {
    for (choice, preference) in applicant.preferences.iter().enumerate() {
        if capacity.consume(&preference.slot_key()) {
            return (
                Some(Assignment::from(preference)),
                PlacementSource::Preference { choice },
            );
        }
    }

    (None, PlacementSource::Unassigned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::domain::{Department, Preference, SlotKey};

    fn snapshot(departments: Vec<Department>, applicants: Vec<Applicant>) -> RosterSnapshot {
        RosterSnapshot::new(departments, applicants)
    }

    #[test]
    fn lower_rank_claims_single_slot_first() {
        let roster = snapshot(
            vec![Department::new("X", 1, 0)],
            vec![
                Applicant::new(2, "B").with_preferences(vec![Preference::regular("X")]),
                Applicant::new(1, "A").with_preferences(vec![Preference::regular("X")]),
            ],
        );

        let allocation = allocate(&roster);

        assert_eq!(
            allocation.assignment_for("A"),
            Some(&Assignment {
                label: "X".to_string(),
                is_bound: false
            })
        );
        assert!(allocation.assignment_for("B").is_none());
        assert_eq!(
            allocation.placement_for("B").map(|placement| placement.source),
            Some(PlacementSource::Unassigned)
        );
        assert_eq!(allocation.residual().remaining(&SlotKey::regular("X")), Some(0));
        assert_eq!(allocation.placements()[0].name, "A");
    }

    #[test]
    fn falls_through_to_next_preference_with_room() {
        let roster = snapshot(
            vec![Department::new("X", 1, 0), Department::new("Y", 1, 1)],
            vec![
                Applicant::new(1, "A").with_preferences(vec![Preference::regular("X")]),
                Applicant::new(2, "B").with_preferences(vec![
                    Preference::regular("X"),
                    Preference::bound("X"),
                    Preference::bound("Y"),
                ]),
            ],
        );

        let allocation = allocate(&roster);
        let placement = allocation.placement_for("B").expect("B placed");

        assert_eq!(placement.source, PlacementSource::Preference { choice: 2 });
        assert_eq!(
            placement.assignment,
            Some(Assignment {
                label: "Y".to_string(),
                is_bound: true
            })
        );
        assert_eq!(allocation.residual().remaining(&SlotKey::bound("Y")), Some(0));
        assert_eq!(allocation.residual().remaining(&SlotKey::regular("Y")), Some(1));
    }

    #[test]
    fn pre_assignment_bypasses_counted_capacity() {
        let roster = snapshot(
            vec![Department::new("X", 1, 0)],
            vec![
                Applicant::new(1, "A").with_pre_assigned("X(綁定)"),
                Applicant::new(2, "B")
                    .with_pre_assigned("X")
                    .with_preferences(vec![Preference::regular("Y")]),
                Applicant::new(3, "C").with_preferences(vec![Preference::regular("X")]),
            ],
        );

        let allocation = allocate(&roster);

        assert_eq!(
            allocation.assignment_for("A"),
            Some(&Assignment {
                label: "X".to_string(),
                is_bound: true
            })
        );
        assert_eq!(
            allocation.assignment_for("B"),
            Some(&Assignment {
                label: "X".to_string(),
                is_bound: false
            })
        );
        assert!(allocation
            .placement_for("B")
            .is_some_and(Placement::is_pre_assigned));
        assert_eq!(
            allocation.assignment_for("C").map(|a| a.label.as_str()),
            Some("X")
        );
    }

    #[test]
    fn tied_ranks_keep_roster_order() {
        let roster = snapshot(
            vec![Department::new("X", 1, 0)],
            vec![
                Applicant::new(5, "First").with_preferences(vec![Preference::regular("X")]),
                Applicant::new(5, "Second").with_preferences(vec![Preference::regular("X")]),
            ],
        );

        let allocation = allocate(&roster);
        assert!(allocation.assignment_for("First").is_some());
        assert!(allocation.assignment_for("Second").is_none());
    }

    #[test]
    fn empty_preferences_leave_applicant_unassigned() {
        let roster = snapshot(
            vec![Department::new("X", 3, 3)],
            vec![Applicant::new(1, "A")],
        );

        let allocation = allocate(&roster);
        let placement = allocation.placement_for("A").expect("every applicant placed");
        assert!(placement.assignment.is_none());
        assert_eq!(placement.source, PlacementSource::Unassigned);
        assert_eq!(allocation.assigned_count(), 0);
    }

    #[test]
    fn preference_for_unconfigured_department_is_skipped() {
        let roster = snapshot(
            vec![Department::new("X", 1, 0)],
            vec![Applicant::new(1, "A").with_preferences(vec![
                Preference::regular("Ghost"),
                Preference::regular("X"),
            ])],
        );

        let allocation = allocate(&roster);
        assert_eq!(
            allocation.placement_for("A").map(|placement| placement.source),
            Some(PlacementSource::Preference { choice: 1 })
        );
    }
}
