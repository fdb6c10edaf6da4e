use std::fmt;

use crate::allocation::{Applicant, Preference};
use crate::roster::SaveRequest;

/// Display-only identifier for a working-copy entry, e.g. `"ICU-r"` or `"ICU-b"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryId(String);

impl EntryId {
    pub fn for_slot(label: &str, is_bound: bool) -> Self {
        Self(format!("{label}-{}", if is_bound { "b" } else { "r" }))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftEntry {
    pub id: EntryId,
    pub preference: Preference,
}

impl DraftEntry {
    fn new(preference: Preference) -> Self {
        Self {
            id: EntryId::for_slot(&preference.label, preference.is_bound),
            preference,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState {
    Viewing,
    Editing { draft: Vec<DraftEntry> },
    Saving { request: SaveRequest },
}

impl EditorState {
    fn label(&self) -> &'static str {
        match self {
            Self::Viewing => "viewing",
            Self::Editing { .. } => "editing",
            Self::Saving { .. } => "saving",
        }
    }
}

/// The caller must re-fetch from the store after a save, successful or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Resync {
    Required,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("preferences are locked to pre-assigned department {0}")]
    Locked(String),
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
    #[error("entry index {index} out of range for {len} entries")]
    OutOfRange { index: usize, len: usize },
}

/// Client-side preference editing: `Viewing → Editing → Saving → Viewing`,
/// or `Editing → Viewing` on cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceEditor {
    state: EditorState,
}

impl Default for PreferenceEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceEditor {
    pub fn new() -> Self {
        Self {
            state: EditorState::Viewing,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditorState::Editing { .. })
    }

    /// Working copy while editing; empty otherwise.
    pub fn draft(&self) -> &[DraftEntry] {
        match &self.state {
            EditorState::Editing { draft } => draft,
            _ => &[],
        }
    }

    pub fn is_selected(&self, label: &str, is_bound: bool) -> bool {
        self.draft().iter().any(|entry| {
            entry.preference.label == label && entry.preference.is_bound == is_bound
        })
    }

    /// Seeds a working copy from the applicant's stored list.
    pub fn begin(&mut self, applicant: &Applicant) -> Result<(), EditError> {
        if !matches!(self.state, EditorState::Viewing) {
            return Err(self.invalid("begin editing"));
        }
        if let Some(pre_assigned) = applicant.pre_assignment() {
            return Err(EditError::Locked(pre_assigned.label));
        }

        let mut draft: Vec<DraftEntry> = Vec::with_capacity(applicant.preferences.len());
        for preference in &applicant.preferences {
            let entry = DraftEntry::new(preference.clone());
            if !draft.iter().any(|existing| existing.id == entry.id) {
                draft.push(entry);
            }
        }
        self.state = EditorState::Editing { draft };
        Ok(())
    }

    /// Appends `(label, kind)` unless it is already listed. Returns whether it was added.
    pub fn add(&mut self, label: &str, is_bound: bool) -> Result<bool, EditError> {
        let draft = self.draft_mut("add an entry")?;
        let entry = DraftEntry::new(Preference::new(label, is_bound));
        if draft.iter().any(|existing| existing.id == entry.id) {
            return Ok(false);
        }
        draft.push(entry);
        Ok(true)
    }

    pub fn remove(&mut self, id: &EntryId) -> Result<(), EditError> {
        let draft = self.draft_mut("remove an entry")?;
        draft.retain(|entry| &entry.id != id);
        Ok(())
    }

    /// Moves the entry at `from` so it ends up at `to`, shifting the rest.
    pub fn move_entry(&mut self, from: usize, to: usize) -> Result<(), EditError> {
        let draft = self.draft_mut("reorder entries")?;
        let len = draft.len();
        for index in [from, to] {
            if index >= len {
                return Err(EditError::OutOfRange { index, len });
            }
        }
        let entry = draft.remove(from);
        draft.insert(to, entry);
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), EditError> {
        self.draft_mut("cancel")?;
        self.state = EditorState::Viewing;
        Ok(())
    }

    /// An empty working copy clears every preference; callers confirm first.
    pub fn needs_confirmation(&self) -> bool {
        self.is_editing() && self.draft().is_empty()
    }

    /// Moves to `Saving` and returns the request to send, identifiers stripped.
    pub fn submit(&mut self, name: &str) -> Result<SaveRequest, EditError> {
        let draft = std::mem::take(self.draft_mut("save")?);
        let preferences = draft.into_iter().map(|entry| entry.preference).collect();
        let request = SaveRequest::new(name, preferences);
        self.state = EditorState::Saving {
            request: request.clone(),
        };
        Ok(request)
    }

    /// Leaves `Saving` whatever the outcome.
    pub fn finish(&mut self) -> Result<Resync, EditError> {
        if !matches!(self.state, EditorState::Saving { .. }) {
            return Err(self.invalid("finish saving"));
        }
        self.state = EditorState::Viewing;
        Ok(Resync::Required)
    }

    fn draft_mut(&mut self, action: &'static str) -> Result<&mut Vec<DraftEntry>, EditError> {
        let state = self.state.label();
        match &mut self.state {
            EditorState::Editing { draft } => Ok(draft),
            _ => Err(EditError::InvalidTransition { action, state }),
        }
    }

    fn invalid(&self, action: &'static str) -> EditError {
        EditError::InvalidTransition {
            action,
            state: self.state.label(),
        }
    }
}
