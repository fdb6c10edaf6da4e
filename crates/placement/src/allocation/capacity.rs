use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::domain::{Department, SlotKey, SlotKind};

/// Remaining slot counts per `(department, kind)`.
///
/// Counts are unsigned: negative configured capacities are clamped to zero and
/// consuming an empty slot is refused rather than going below zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapacityTable {
    slots: BTreeMap<SlotKey, u32>,
}

impl CapacityTable {
    pub fn from_departments(departments: &[Department]) -> Self {
        let mut slots = BTreeMap::new();
        for department in departments {
            slots.insert(
                SlotKey::new(department.label.clone(), SlotKind::Regular),
                clamp_capacity(department.regular),
            );
            slots.insert(
                SlotKey::new(department.label.clone(), SlotKind::Bound),
                clamp_capacity(department.bound),
            );
        }
        Self { slots }
    }

    pub fn remaining(&self, key: &SlotKey) -> Option<u32> {
        self.slots.get(key).copied()
    }

    pub fn has_room(&self, key: &SlotKey) -> bool {
        self.remaining(key).is_some_and(|count| count > 0)
    }

    /// Takes one unit from `key`. Unknown or exhausted keys are left untouched.
    pub fn consume(&mut self, key: &SlotKey) -> bool {
        match self.slots.get_mut(key) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SlotKey, u32)> {
        self.slots.iter().map(|(key, count)| (key, *count))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn total(&self, kind: SlotKind) -> u64 {
        self.slots
            .iter()
            .filter(|(key, _)| key.kind == kind)
            .map(|(_, count)| u64::from(*count))
            .sum()
    }
}

fn clamp_capacity(configured: i64) -> u32 {
    u32::try_from(configured.max(0)).unwrap_or(u32::MAX)
}

impl Serialize for CapacityTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.slots.len()))?;
        for (key, count) in &self.slots {
            map.serialize_entry(&key.to_string(), count)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_regular_and_bound_entries_per_department() {
        let table = CapacityTable::from_departments(&[
            Department::new("ICU", 2, 1),
            Department::new("ER", 0, 3),
        ]);

        assert_eq!(table.len(), 4);
        assert_eq!(table.remaining(&SlotKey::regular("ICU")), Some(2));
        assert_eq!(table.remaining(&SlotKey::bound("ICU")), Some(1));
        assert_eq!(table.remaining(&SlotKey::regular("ER")), Some(0));
        assert_eq!(table.remaining(&SlotKey::bound("ER")), Some(3));
        assert_eq!(table.total(SlotKind::Regular), 2);
    }

    #[test]
    fn later_duplicate_department_overwrites_earlier() {
        let table = CapacityTable::from_departments(&[
            Department::new("ICU", 2, 1),
            Department::new("ICU", 5, 0),
        ]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.remaining(&SlotKey::regular("ICU")), Some(5));
        assert_eq!(table.remaining(&SlotKey::bound("ICU")), Some(0));
    }

    #[test]
    fn negative_capacity_is_clamped_to_zero() {
        let table = CapacityTable::from_departments(&[Department::new("ICU", -4, -1)]);
        assert_eq!(table.remaining(&SlotKey::regular("ICU")), Some(0));
        assert!(!table.has_room(&SlotKey::bound("ICU")));
    }

    #[test]
    fn consume_never_goes_below_zero() {
        let mut table = CapacityTable::from_departments(&[Department::new("ICU", 1, 0)]);
        let key = SlotKey::regular("ICU");

        assert!(table.consume(&key));
        assert!(!table.consume(&key));
        assert_eq!(table.remaining(&key), Some(0));
        assert!(!table.consume(&SlotKey::regular("Unknown")));
    }

    #[test]
    fn serializes_with_string_slot_keys() {
        let table = CapacityTable::from_departments(&[Department::new("ICU", 2, 1)]);
        let value = serde_json::to_value(&table).expect("serializes");
        assert_eq!(
            value,
            serde_json::json!({ "ICU-bound": 1, "ICU-regular": 2 })
        );
    }
}
