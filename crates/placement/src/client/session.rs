use crate::allocation::{Applicant, Rank, RosterSnapshot};

/// Logged-in applicant.
///
/// Login is a name lookup only. The passcode is kept for display and is not
/// verified; this is not an authentication mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub name: String,
    pub passcode: String,
    pub rank: Rank,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    #[error("roster has not been loaded yet")]
    NotLoaded,
    #[error("applicant '{0}' not found")]
    UnknownApplicant(String),
}

impl Session {
    pub fn login(
        snapshot: &RosterSnapshot,
        name: &str,
        passcode: &str,
    ) -> Result<Self, LoginError> {
        if snapshot.applicants.is_empty() {
            return Err(LoginError::NotLoaded);
        }

        let applicant = snapshot
            .applicant(name)
            .ok_or_else(|| LoginError::UnknownApplicant(name.to_string()))?;

        Ok(Self {
            name: applicant.name.clone(),
            passcode: passcode.to_string(),
            rank: applicant.rank,
        })
    }

    pub fn applicant<'a>(&self, snapshot: &'a RosterSnapshot) -> Option<&'a Applicant> {
        snapshot.applicant(&self.name)
    }

    /// Rank from the latest snapshot, falling back to the rank seen at login.
    pub fn current_rank(&self, snapshot: &RosterSnapshot) -> Rank {
        self.applicant(snapshot)
            .map(|applicant| applicant.rank)
            .unwrap_or(self.rank)
    }
}
