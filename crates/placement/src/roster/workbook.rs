use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use super::parser::{self, NAME_COLUMN, PREFERENCES_COLUMN, ROSTER_COLUMNS};
use super::store::{RosterStore, StoreError};
use crate::allocation::{Preference, RosterSnapshot};

/// Spreadsheet kept as two CSV sheets in one directory.
///
/// `config.csv` holds label, regular capacity and bound capacity; `roster.csv`
/// holds rank, name, password, pre-assignment and the preference list as JSON.
/// The first row of each sheet is a header. Columns are positional.
#[derive(Debug)]
pub struct CsvWorkbook {
    config_path: PathBuf,
    roster_path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvWorkbook {
    pub const CONFIG_SHEET: &'static str = "config.csv";
    pub const ROSTER_SHEET: &'static str = "roster.csv";

    pub fn open<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self::from_paths(dir.join(Self::CONFIG_SHEET), dir.join(Self::ROSTER_SHEET))
    }

    pub fn from_paths(config_path: PathBuf, roster_path: PathBuf) -> Self {
        Self {
            config_path,
            roster_path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn roster_path(&self) -> &Path {
        &self.roster_path
    }
}

impl RosterStore for CsvWorkbook {
    fn load(&self) -> Result<RosterSnapshot, StoreError> {
        let departments = parser::read_departments(File::open(&self.config_path)?)?;
        let applicants = parser::read_applicants(File::open(&self.roster_path)?)?;
        debug!(
            departments = departments.len(),
            applicants = applicants.len(),
            "loaded workbook"
        );
        Ok(RosterSnapshot::new(departments, applicants))
    }

    fn save_preferences(
        &self,
        name: &str,
        preferences: &[Preference],
    ) -> Result<usize, StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("workbook write lock poisoned".to_string()))?;

        let mut rows = read_rows(&self.roster_path)?;
        let index = rows
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, row)| row.get(NAME_COLUMN).map(|cell| cell.trim()) == Some(name))
            .map(|(index, _)| index)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;

        let encoded = parser::encode_preferences(preferences)?;
        let row = &mut rows[index];
        if row.len() < ROSTER_COLUMNS {
            row.resize(ROSTER_COLUMNS, String::new());
        }
        row[PREFERENCES_COLUMN] = encoded;

        write_rows(&self.roster_path, &rows)?;
        Ok(index + 1)
    }
}

fn read_rows(path: &Path) -> Result<Vec<Vec<String>>, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn write_rows(path: &Path, rows: &[Vec<String>]) -> Result<(), StoreError> {
    let staging = path.with_extension("csv.tmp");
    let outcome = stage_rows(&staging, rows).and_then(|()| Ok(fs::rename(&staging, path)?));
    if outcome.is_err() {
        let _ = fs::remove_file(&staging);
    }
    outcome
}

fn stage_rows(staging: &Path, rows: &[Vec<String>]) -> Result<(), StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(staging)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
