use crate::allocation::{Preference, RosterSnapshot};

/// Access to the spreadsheet-like system of record.
///
/// The write path is find-row-then-update-cell and is not transactional across
/// processes; callers treat each applicant's list as an idempotent overwrite.
pub trait RosterStore: Send + Sync {
    fn load(&self) -> Result<RosterSnapshot, StoreError>;

    /// Overwrites the preference cell of `name`'s row and returns the
    /// 1-based sheet row that was written (the header is row 1).
    fn save_preferences(&self, name: &str, preferences: &[Preference])
        -> Result<usize, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("applicant '{0}' not found")]
    NotFound(String),
    #[error("workbook io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid workbook data: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to encode preferences: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
