use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Marker carried by pre-assignment labels that occupy a bound slot.
pub const BOUND_MARKER: &str = "綁定";

/// Per-department slot configuration, one row of the configuration sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub label: String,
    pub regular: i64,
    pub bound: i64,
}

impl Department {
    pub fn new(label: impl Into<String>, regular: i64, bound: i64) -> Self {
        Self {
            label: label.into(),
            regular,
            bound,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    Regular,
    Bound,
}

impl SlotKind {
    pub fn from_bound(is_bound: bool) -> Self {
        if is_bound {
            Self::Bound
        } else {
            Self::Regular
        }
    }

    pub fn is_bound(self) -> bool {
        matches!(self, Self::Bound)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Bound => "bound",
        }
    }
}

/// Capacity bucket identifier. Renders as `"{label}-regular"` or `"{label}-bound"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotKey {
    pub label: String,
    pub kind: SlotKind,
}

impl SlotKey {
    pub fn new(label: impl Into<String>, kind: SlotKind) -> Self {
        Self {
            label: label.into(),
            kind,
        }
    }

    pub fn regular(label: impl Into<String>) -> Self {
        Self::new(label, SlotKind::Regular)
    }

    pub fn bound(label: impl Into<String>) -> Self {
        Self::new(label, SlotKind::Bound)
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.label, self.kind.label())
    }
}

/// One entry of an applicant's ordered wish list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preference {
    pub label: String,
    #[serde(default)]
    pub is_bound: bool,
}

impl Preference {
    pub fn new(label: impl Into<String>, is_bound: bool) -> Self {
        Self {
            label: label.into(),
            is_bound,
        }
    }

    pub fn regular(label: impl Into<String>) -> Self {
        Self::new(label, false)
    }

    pub fn bound(label: impl Into<String>) -> Self {
        Self::new(label, true)
    }

    pub fn kind(&self) -> SlotKind {
        SlotKind::from_bound(self.is_bound)
    }

    pub fn slot_key(&self) -> SlotKey {
        SlotKey::new(self.label.clone(), self.kind())
    }
}

/// Drops repeated `(label, kind)` entries, keeping the first occurrence.
pub fn dedupe_preferences(preferences: Vec<Preference>) -> Vec<Preference> {
    let mut seen = HashSet::new();
    preferences
        .into_iter()
        .filter(|preference| seen.insert((preference.label.clone(), preference.is_bound)))
        .collect()
}

/// Department slot an applicant ends up holding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub label: String,
    pub is_bound: bool,
}

impl Assignment {
    pub fn slot_key(&self) -> SlotKey {
        SlotKey::new(self.label.clone(), SlotKind::from_bound(self.is_bound))
    }
}

impl From<&Preference> for Assignment {
    fn from(preference: &Preference) -> Self {
        Self {
            label: preference.label.clone(),
            is_bound: preference.is_bound,
        }
    }
}

/// Interprets a raw pre-assignment cell such as `"Surgery"` or `"Surgery(綁定)"`.
///
/// Blank input means no pre-assignment. When the bound marker is present the
/// assignment is bound and the marker (with one adjacent `(`/`-` before it and
/// one `)` after it) is removed from the display label.
pub fn parse_pre_assignment(raw: &str) -> Option<Assignment> {
    if raw.trim().is_empty() {
        return None;
    }

    let is_bound = raw.contains(BOUND_MARKER);
    let label = if is_bound {
        strip_bound_marker(raw)
    } else {
        raw.to_string()
    };

    Some(Assignment {
        label: label.trim().to_string(),
        is_bound,
    })
}

fn strip_bound_marker(raw: &str) -> String {
    let Some(index) = raw.find(BOUND_MARKER) else {
        return raw.to_string();
    };

    let head = &raw[..index];
    let head = head
        .strip_suffix('(')
        .or_else(|| head.strip_suffix('-'))
        .unwrap_or(head);
    let tail = &raw[index + BOUND_MARKER.len()..];
    let tail = tail.strip_prefix(')').unwrap_or(tail);

    format!("{head}{tail}")
}

/// Claim order of an applicant; lower ranks claim first.
///
/// Values that are not numbers are "unranked" and sort after every ranked
/// applicant. Unranked values compare equal to each other.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rank(Option<f64>);

impl Rank {
    pub const UNRANKED: Rank = Rank(None);

    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            Self::UNRANKED
        } else {
            Self(Some(value))
        }
    }

    /// Parses spreadsheet text. Blank or non-numeric text is unranked.
    pub fn parse(raw: &str) -> Self {
        raw.trim()
            .parse::<f64>()
            .map(Self::new)
            .unwrap_or(Self::UNRANKED)
    }

    pub fn value(self) -> Option<f64> {
        self.0
    }

    pub fn is_ranked(self) -> bool {
        self.0.is_some()
    }
}

impl From<i32> for Rank {
    fn from(value: i32) -> Self {
        Self::new(f64::from(value))
    }
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0, other.0) {
            (Some(left), Some(right)) => left.total_cmp(&right),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Rank {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Rank {}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{value}"),
            None => write!(f, "-"),
        }
    }
}

impl Serialize for Rank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Some(value) if value.fract() == 0.0 && value.abs() < 9.0e15 => {
                serializer.serialize_i64(value as i64)
            }
            Some(value) => serializer.serialize_f64(value),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Rank {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawRank {
            Number(f64),
            Text(String),
        }

        Ok(match Option::<RawRank>::deserialize(deserializer)? {
            Some(RawRank::Number(value)) => Rank::new(value),
            Some(RawRank::Text(text)) => Rank::parse(&text),
            None => Rank::UNRANKED,
        })
    }
}

/// Roster row as exchanged over `/api/data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
    #[serde(default)]
    pub rank: Rank,
    pub name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub pre_assigned: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub preferences: Vec<Preference>,
}

impl Applicant {
    pub fn new(rank: impl Into<Rank>, name: impl Into<String>) -> Self {
        Self {
            rank: rank.into(),
            name: name.into(),
            password: String::new(),
            pre_assigned: None,
            preferences: Vec::new(),
        }
    }

    pub fn with_preferences(mut self, preferences: Vec<Preference>) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn with_pre_assigned(mut self, raw: impl Into<String>) -> Self {
        self.pre_assigned = Some(raw.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn pre_assignment(&self) -> Option<Assignment> {
        self.pre_assigned.as_deref().and_then(parse_pre_assignment)
    }

    pub fn is_pre_assigned(&self) -> bool {
        self.pre_assignment().is_some()
    }
}

pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Preference>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Preference>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Configuration plus roster, the payload of `GET /api/data`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    #[serde(rename = "config", default)]
    pub departments: Vec<Department>,
    #[serde(rename = "users", default)]
    pub applicants: Vec<Applicant>,
}

impl RosterSnapshot {
    pub fn new(departments: Vec<Department>, applicants: Vec<Applicant>) -> Self {
        Self {
            departments,
            applicants,
        }
    }

    pub fn applicant(&self, name: &str) -> Option<&Applicant> {
        self.applicants
            .iter()
            .find(|applicant| applicant.name == name)
    }

    /// Applicants in claim order. The sort is stable, so tied ranks keep roster order.
    pub fn ranked_applicants(&self) -> Vec<&Applicant> {
        let mut ordered: Vec<&Applicant> = self.applicants.iter().collect();
        ordered.sort_by(|left, right| left.rank.cmp(&right.rank));
        ordered
    }

    /// Replaces one applicant's list in place. Returns `false` when the name is unknown.
    pub fn replace_preferences(&mut self, name: &str, preferences: Vec<Preference>) -> bool {
        match self
            .applicants
            .iter_mut()
            .find(|applicant| applicant.name == name)
        {
            Some(applicant) => {
                applicant.preferences = preferences;
                true
            }
            None => false,
        }
    }
}
