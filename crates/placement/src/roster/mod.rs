//! Roster storage, validation, and the HTTP surface over it.

mod memory;
mod parser;
pub mod payload;
pub mod router;
pub mod service;
pub mod store;
mod workbook;

#[cfg(test)]
mod tests;

pub use memory::InMemoryRosterStore;
pub use payload::{AllocationReport, PlacementView, SaveRequest, SaveResponse, ViewerReport};
pub use router::roster_router;
pub use service::{RosterService, RosterServiceError};
pub use store::{RosterStore, StoreError};
pub use workbook::CsvWorkbook;
