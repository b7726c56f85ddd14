// src/specs/history.rs
//
// The status page ("mscherm=status&div=historie") lists events newest-first:
//
//   Tijd      Aansluiting  Alrm  Groep  Sector  Omschrijving
//   02/02/23                            ---                      <- date separator
//   19:09:48  E0123456     INF   5      0       VOLL. ING BOB    <- annotation
//   19:09:48  E0123456     IN    5      0       In
//
// The device column ("Aansluiting") only appears in the short layout.

use crate::core::{RawRow, Table};
use crate::error::StructuralParseError;

pub const TIME: &str = "Tijd";
pub const DEVICE: &str = "Aansluiting";
pub const CODE: &str = "Alrm";
pub const GROUP: &str = "Groep";
pub const SECTOR: &str = "Sector";
pub const DESCRIPTION: &str = "Omschrijving";

const REQUIRED: [&str; 5] = [TIME, CODE, GROUP, SECTOR, DESCRIPTION];

/// Sector value of a date separator row.
pub const SEPARATOR_SECTOR: &str = "---";
/// Alarm code of a "who/why" annotation row.
pub const INFO_CODE: &str = "INF";

/// One history row with its cells named. `time` is still raw text:
/// `dd/mm/yy` on separators, `hh:mm:ss` everywhere else.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryRow {
    /// `None` when the page has no device column.
    pub device: Option<String>,
    pub time: String,
    pub code: String,
    pub group: String,
    pub sector: String,
    pub description: String,
}

impl HistoryRow {
    /// Cells missing from a short row read as empty.
    pub fn from_raw(raw: &RawRow, has_device: bool) -> Self {
        let cell = |label: &str| s!(raw.get(label).unwrap_or(""));
        Self {
            device: has_device.then(|| cell(DEVICE)),
            time: cell(TIME),
            code: cell(CODE),
            group: cell(GROUP),
            sector: cell(SECTOR),
            description: cell(DESCRIPTION),
        }
    }

    /// All identity fields empty and the sector holding the `---` sentinel.
    pub fn is_date_separator(&self) -> bool {
        self.device.as_deref().unwrap_or("").is_empty()
            && self.code.is_empty()
            && self.group.is_empty()
            && self.description.is_empty()
            && self.sector == SEPARATOR_SECTOR
    }
}

/// Type every body row of the history table, in document order.
pub fn rows_from_table(table: &Table) -> Result<Vec<HistoryRow>, StructuralParseError> {
    if let Some(missing) = REQUIRED.iter().find(|label| !table.has_label(label)) {
        return Err(StructuralParseError::MissingColumn(s!(*missing)));
    }
    let has_device = table.has_label(DEVICE);
    Ok(table
        .rows
        .iter()
        .map(|raw| HistoryRow::from_raw(raw, has_device))
        .collect())
}
