//! Client side of the roster service: HTTP access, polling, login, editing,
//! and the view models a front end renders.

mod api;
mod editor;
mod session;
mod sync;
mod view;

pub use api::{ApiClient, ClientError};
pub use editor::{DraftEntry, EditError, EditorState, EntryId, PreferenceEditor, Resync};
pub use session::{LoginError, Session};
pub use sync::{RosterSync, SyncState};
pub use view::{ApplicantStatus, Dashboard, OptionTile, RosterRow};
