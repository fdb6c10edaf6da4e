use std::io::Read;

use csv::StringRecord;
use tracing::warn;

use crate::allocation::{dedupe_preferences, Applicant, Department, Preference, Rank};

pub(crate) const NAME_COLUMN: usize = 1;
pub(crate) const PREFERENCES_COLUMN: usize = 4;
pub(crate) const ROSTER_COLUMNS: usize = 5;

/// Reads the configuration sheet: label, regular capacity, bound capacity.
pub(crate) fn read_departments<R: Read>(reader: R) -> Result<Vec<Department>, csv::Error> {
    let mut departments = Vec::new();
    for record in sheet_reader(reader).records() {
        let row = record?;
        if let Some(department) = department_from_row(&row) {
            departments.push(department);
        }
    }
    Ok(departments)
}

/// Reads the roster sheet: rank, name, password, pre-assignment, preferences JSON.
pub(crate) fn read_applicants<R: Read>(reader: R) -> Result<Vec<Applicant>, csv::Error> {
    let mut applicants = Vec::new();
    for record in sheet_reader(reader).records() {
        let row = record?;
        if let Some(applicant) = applicant_from_row(&row) {
            applicants.push(applicant);
        }
    }
    Ok(applicants)
}

fn sheet_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader)
}

fn cell(row: &StringRecord, index: usize) -> &str {
    row.get(index).map(str::trim).unwrap_or_default()
}

fn line_of(row: &StringRecord) -> u64 {
    row.position().map(|position| position.line()).unwrap_or_default()
}

fn department_from_row(row: &StringRecord) -> Option<Department> {
    let label = cell(row, 0);
    if label.is_empty() {
        warn!(line = line_of(row), "skipping config row without a department label");
        return None;
    }

    Some(Department {
        label: label.to_string(),
        regular: parse_capacity(label, "regular", cell(row, 1)),
        bound: parse_capacity(label, "bound", cell(row, 2)),
    })
}

/// Blank cells read as zero. Decimal text is truncated; anything else is zero with a warning.
fn parse_capacity(label: &str, column: &str, raw: &str) -> i64 {
    if raw.is_empty() {
        return 0;
    }
    if let Ok(value) = raw.parse::<i64>() {
        return value;
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => value.trunc() as i64,
        _ => {
            warn!(department = label, column, value = raw, "capacity is not a number, using 0");
            0
        }
    }
}

fn applicant_from_row(row: &StringRecord) -> Option<Applicant> {
    let name = cell(row, NAME_COLUMN);
    if name.is_empty() {
        warn!(line = line_of(row), "skipping roster row without a name");
        return None;
    }

    let rank = Rank::parse(cell(row, 0));
    if !rank.is_ranked() {
        warn!(applicant = name, value = cell(row, 0), "rank is not numeric, ordering last");
    }

    let pre_assigned = Some(cell(row, 3))
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    Some(Applicant {
        rank,
        name: name.to_string(),
        password: cell(row, 2).to_string(),
        pre_assigned,
        preferences: decode_preferences(name, cell(row, PREFERENCES_COLUMN)),
    })
}

/// Decodes a stored preference cell. Malformed JSON is logged and treated as an empty list.
pub(crate) fn decode_preferences(name: &str, raw: &str) -> Vec<Preference> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<Option<Vec<Preference>>>(raw) {
        Ok(preferences) => dedupe_preferences(preferences.unwrap_or_default()),
        Err(err) => {
            warn!(applicant = name, error = %err, "failed to parse stored preferences");
            Vec::new()
        }
    }
}

pub(crate) fn encode_preferences(preferences: &[Preference]) -> Result<String, serde_json::Error> {
    serde_json::to_string(preferences)
}
