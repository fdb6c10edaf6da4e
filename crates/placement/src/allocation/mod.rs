//! Rank-ordered department slot allocation.
//!
//! Everything here is a pure function of a [`RosterSnapshot`]: the allocation
//! is recomputed in full on every read and never stored.

mod capacity;
pub mod domain;
mod engine;
mod projection;

pub use capacity::CapacityTable;
pub use domain::{
    dedupe_preferences, parse_pre_assignment, Applicant, Assignment, Department, Preference, Rank,
    RosterSnapshot, SlotKey, SlotKind, BOUND_MARKER,
};
pub use engine::{allocate, Allocation, Placement, PlacementSource};
pub use projection::{capacity_before, capacity_before_applicant};
