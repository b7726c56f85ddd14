// src/events/annotate.rs
//
// The portal splits one event over two rows: the event itself ("IN", "Uit")
// and an INF row saying who or what did it ("VOLL. ING BOB"). The INF row
// shows up either right above or right below its event, so one pass keeps two
// slots:
// - `pending`: an INF row waiting for the next event row (forward case);
// - `last`: the last event emitted without an annotation (backward case).
// Both sides must agree on (device, group, sector, timestamp).

use log::debug;

use super::dates::DatedRow;
use crate::error::StructuralParseError;

/// An event row with the text of its annotation folded in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconciledRow {
    pub row: DatedRow,
    pub info: Option<String>,
}

pub fn reconcile(rows: Vec<DatedRow>) -> Result<Vec<ReconciledRow>, StructuralParseError> {
    let mut out: Vec<ReconciledRow> = Vec::with_capacity(rows.len());
    let mut pending: Option<DatedRow> = None;
    let mut last: Option<usize> = None;

    for row in rows {
        if row.is_annotation() {
            match last.and_then(|i| out.get_mut(i)) {
                Some(target) if target.row.correlation_key() == row.correlation_key() => {
                    target.info = Some(row.description);
                }
                _ => {
                    if let Some(dropped) = pending.replace(row) {
                        debug!("annotation without event, dropped: {}", dropped.describe());
                    }
                }
            }
            continue;
        }

        match pending.take() {
            Some(info) => {
                if info.correlation_key() != row.correlation_key() {
                    return Err(StructuralParseError::CorrelationMismatch {
                        annotation: info.describe(),
                        row: row.describe(),
                    });
                }
                out.push(ReconciledRow { row, info: Some(info.description) });
                // Already annotated; must not take a second one from below
                last = None;
            }
            None => {
                out.push(ReconciledRow { row, info: None });
                last = Some(out.len() - 1);
            }
        }
    }

    if let Some(dropped) = pending {
        debug!("annotation at end of page, dropped: {}", dropped.describe());
    }

    Ok(out)
}
