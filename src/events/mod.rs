// src/events/mod.rs
//
// History page → event records:
//   extract_first_table → rows_from_table → merge_dates → reconcile → normalize

pub mod annotate;
pub mod dates;
pub mod record;

pub use record::{EventKind, EventRecord};

use crate::core::html::extract_first_table;
use crate::error::StructuralParseError;
use crate::specs::history::rows_from_table;

/// Every event on the page, in page order (newest first).
/// Deterministic: the same page always yields the same records.
pub fn parse_history(html_doc: &str) -> Result<Vec<EventRecord>, StructuralParseError> {
    let table = extract_first_table(html_doc)?;
    let rows = rows_from_table(&table)?;
    let dated = dates::merge_dates(rows)?;
    let reconciled = annotate::reconcile(dated)?;
    record::normalize(reconciled)
}

/// Oldest first.
pub fn sorted(mut records: Vec<EventRecord>) -> Vec<EventRecord> {
    records.sort();
    records
}
