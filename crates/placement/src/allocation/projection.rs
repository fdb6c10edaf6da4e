use super::capacity::CapacityTable;
use super::domain::{Rank, RosterSnapshot};
use super::engine::Allocation;

/// Capacity left when the claim order reaches `viewer`.
///
/// Every applicant ranked strictly ahead of the viewer removes one unit from
/// the slot they ended up in, pre-assigned or not. This is an informational
/// view; the engine's residual table stays authoritative.
pub fn capacity_before(
    snapshot: &RosterSnapshot,
    allocation: &Allocation,
    viewer: Rank,
) -> CapacityTable {
    let mut capacity = CapacityTable::from_departments(&snapshot.departments);

    for applicant in snapshot.ranked_applicants() {
        if applicant.rank >= viewer {
            break;
        }
        if let Some(assignment) = allocation.assignment_for(&applicant.name) {
            capacity.consume(&assignment.slot_key());
        }
    }

    capacity
}

/// [`capacity_before`] for a named applicant. `None` when the name is not on the roster.
pub fn capacity_before_applicant(
    snapshot: &RosterSnapshot,
    allocation: &Allocation,
    name: &str,
) -> Option<CapacityTable> {
    snapshot
        .applicant(name)
        .map(|applicant| capacity_before(snapshot, allocation, applicant.rank))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::domain::{Applicant, Department, Preference, SlotKey};
    use crate::allocation::engine::allocate;

    fn roster() -> RosterSnapshot {
        RosterSnapshot::new(
            vec![Department::new("X", 2, 1), Department::new("Y", 1, 0)],
            vec![
                Applicant::new(1, "A").with_pre_assigned("X-綁定"),
                Applicant::new(2, "B").with_preferences(vec![Preference::regular("X")]),
                Applicant::new(3, "C").with_preferences(vec![Preference::regular("Y")]),
                Applicant::new(4, "D").with_preferences(vec![Preference::regular("X")]),
            ],
        )
    }

    #[test]
    fn lowest_rank_sees_initial_capacity() {
        let snapshot = roster();
        let allocation = allocate(&snapshot);

        let view = capacity_before(&snapshot, &allocation, Rank::from(1));
        assert_eq!(view, CapacityTable::from_departments(&snapshot.departments));
    }

    #[test]
    fn counts_pre_assigned_applicants_ahead_of_viewer() {
        let snapshot = roster();
        let allocation = allocate(&snapshot);

        let view = capacity_before_applicant(&snapshot, &allocation, "D").expect("D on roster");
        assert_eq!(view.remaining(&SlotKey::bound("X")), Some(0));
        assert_eq!(view.remaining(&SlotKey::regular("X")), Some(1));
        assert_eq!(view.remaining(&SlotKey::regular("Y")), Some(0));

        // The engine itself never counted A's bound slot.
        assert_eq!(
            allocation.residual().remaining(&SlotKey::bound("X")),
            Some(1)
        );
    }

    #[test]
    fn projection_saturates_at_zero() {
        let snapshot = RosterSnapshot::new(
            vec![Department::new("X", 0, 0)],
            vec![
                Applicant::new(1, "A").with_pre_assigned("X"),
                Applicant::new(2, "B"),
            ],
        );
        let allocation = allocate(&snapshot);

        let view = capacity_before(&snapshot, &allocation, Rank::from(2));
        assert_eq!(view.remaining(&SlotKey::regular("X")), Some(0));
    }

    #[test]
    fn empty_roster_returns_initial_capacity() {
        let snapshot = RosterSnapshot::new(vec![Department::new("X", 4, 2)], Vec::new());
        let allocation = allocate(&snapshot);

        let view = capacity_before(&snapshot, &allocation, Rank::UNRANKED);
        assert_eq!(view.remaining(&SlotKey::regular("X")), Some(4));
        assert!(capacity_before_applicant(&snapshot, &allocation, "nobody").is_none());
    }

    #[test]
    fn unranked_viewer_sees_every_ranked_claim() {
        let snapshot = roster();
        let allocation = allocate(&snapshot);

        let view = capacity_before(&snapshot, &allocation, Rank::UNRANKED);
        assert_eq!(view.remaining(&SlotKey::regular("X")), Some(0));
    }
}
