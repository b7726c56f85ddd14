// src/events/record.rs
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::NaiveDateTime;

use super::annotate::ReconciledRow;
use crate::error::StructuralParseError;

/// Stands in for `detail` when the annotation carried no real text.
pub const DETAIL_PLACEHOLDER: &str = ":";

/// What happened, from the portal's short alarm codes.
///
/// Unknown codes pass through as `Other`. Equality, hashing and ordering all
/// go through [`EventKind::as_str`], so a kind behaves exactly like its label.
#[derive(Clone, Debug)]
pub enum EventKind {
    AlarmOn,
    AlarmOff,
    /// Daily self-test ("24H", usually "AUTOTEST").
    SelfTest,
    /// Deviating arm/disarm schedule for the day.
    OverrideAlarmTime,
    /// Disarmed earlier than scheduled ("Te Vroeg Uitgeschakeld").
    UnexpectedAlarmOff,
    /// Not armed by the scheduled time ("Te Laat Ingeschakeld").
    UnexpectedNoAlarmYet,
    /// Row without a code: free-form log line.
    Log,
    Other(String),
}

impl EventKind {
    pub fn from_code(code: &str) -> Self {
        match code {
            "IN" => Self::AlarmOn,
            "UIT" => Self::AlarmOff,
            "24H" => Self::SelfTest,
            "AFW" => Self::OverrideAlarmTime,
            "TVU" => Self::UnexpectedAlarmOff,
            "TLI" => Self::UnexpectedNoAlarmYet,
            "" => Self::Log,
            other => Self::Other(s!(other)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::AlarmOn => "ALARM_ON",
            Self::AlarmOff => "ALARM_OFF",
            Self::SelfTest => "24H",
            Self::OverrideAlarmTime => "OVERRIDE_ALARM_TIME",
            Self::UnexpectedAlarmOff => "UNEXPECT_ALARM_OFF",
            Self::UnexpectedNoAlarmYet => "UNEXPECT_NO_ALARM_YET",
            Self::Log => "(log)",
            Self::Other(code) => code.as_str(),
        }
    }

    /// Everyday traffic. Anything else deserves the whole channel's attention.
    pub fn is_common(&self) -> bool {
        matches!(
            self,
            Self::AlarmOn | Self::AlarmOff | Self::SelfTest | Self::OverrideAlarmTime
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq for EventKind {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for EventKind {}

impl Hash for EventKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl PartialOrd for EventKind {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventKind {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

/// One normalized event. The whole tuple is its identity: two fetches that
/// agree on all five fields describe the same event.
///
/// Field order matters: the derived `Ord` sorts by timestamp, then kind, with
/// the remaining fields only breaking ties.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventRecord {
    /// Portal local time, no zone.
    pub timestamp: NaiveDateTime,
    pub kind: EventKind,
    pub group: String,
    pub sector: String,
    pub detail: String,
}

impl EventRecord {
    pub fn is_uncommon(&self) -> bool {
        !self.kind.is_common()
    }
}

/// Turn reconciled rows into records, same order. Every row must come from
/// one device: two devices in one page means the portal mixed up sessions.
pub fn normalize(rows: Vec<ReconciledRow>) -> Result<Vec<EventRecord>, StructuralParseError> {
    if let Some(first) = rows.first() {
        let device = &first.row.device;
        if let Some(other) = rows.iter().find(|r| r.row.device != *device) {
            return Err(StructuralParseError::MixedDevices {
                first: device.clone().unwrap_or_default(),
                other: other.row.device.clone().unwrap_or_default(),
            });
        }
    }

    Ok(rows.into_iter().map(to_record).collect())
}

fn to_record(reconciled: ReconciledRow) -> EventRecord {
    let ReconciledRow { row, info } = reconciled;
    EventRecord {
        timestamp: row.at,
        kind: EventKind::from_code(&row.code),
        detail: compose_detail(info.as_deref(), &row.description),
        group: row.group,
        sector: row.sector,
    }
}

/// Annotation first, own description in parentheses after it:
/// `"VOLL. ING BOB" + "In"` → `"VOLL. ING BOB (In)"`. Without a usable
/// annotation the description stands alone.
pub fn compose_detail(info: Option<&str>, description: &str) -> String {
    let info = info.unwrap_or("");
    if description.is_empty() {
        return s!(info);
    }
    if info.is_empty() || info == DETAIL_PLACEHOLDER {
        return s!(description);
    }
    format!("{info} ({description})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::dates::DatedRow;
    use chrono::NaiveDate;

    fn reconciled(device: &str, code: &str, info: Option<&str>, description: &str) -> ReconciledRow {
        ReconciledRow {
            row: DatedRow {
                device: Some(s!(device)),
                at: NaiveDate::from_ymd_opt(2023, 2, 2).unwrap().and_hms_opt(19, 9, 48).unwrap(),
                code: s!(code),
                group: s!("5"),
                sector: s!("0"),
                description: s!(description),
            },
            info: info.map(String::from),
        }
    }

    #[test]
    fn vocabulary() {
        assert_eq!(EventKind::from_code("IN").as_str(), "ALARM_ON");
        assert_eq!(EventKind::from_code("UIT").as_str(), "ALARM_OFF");
        assert_eq!(EventKind::from_code("24H").as_str(), "24H");
        assert_eq!(EventKind::from_code("AFW").as_str(), "OVERRIDE_ALARM_TIME");
        assert_eq!(EventKind::from_code("TVU").as_str(), "UNEXPECT_ALARM_OFF");
        assert_eq!(EventKind::from_code("TLI").as_str(), "UNEXPECT_NO_ALARM_YET");
        assert_eq!(EventKind::from_code("").as_str(), "(log)");
        assert_eq!(EventKind::from_code("INB").as_str(), "INB");

        assert!(EventKind::from_code("AFW").is_common());
        assert!(!EventKind::from_code("TVU").is_common());
        assert!(!EventKind::from_code("INB").is_common());
        assert!(!EventKind::Log.is_common());
    }

    #[test]
    fn detail_composition() {
        assert_eq!(compose_detail(Some("VOLL. ING BOB"), "In"), "VOLL. ING BOB (In)");
        assert_eq!(compose_detail(None, "11-07-23 Bewaking"), "11-07-23 Bewaking");
        assert_eq!(compose_detail(Some(":"), "Reset"), "Reset");
        assert_eq!(compose_detail(Some(""), "Reset"), "Reset");
        assert_eq!(compose_detail(Some("AUTOTEST"), ""), "AUTOTEST");
        assert_eq!(compose_detail(Some(":"), ""), ":");
        assert_eq!(compose_detail(None, ""), "");
    }

    #[test]
    fn normalizes_in_order() {
        let records = normalize(vec![
            reconciled("E0123456", "IN", Some("VOLL. ING BOB"), "In"),
            reconciled("E0123456", "INB", None, "INBRAAK"),
        ])
        .unwrap();

        assert_eq!(records[0].kind, EventKind::AlarmOn);
        assert_eq!(records[0].group, "5");
        assert_eq!(records[0].detail, "VOLL. ING BOB (In)");
        assert!(!records[0].is_uncommon());
        assert_eq!(records[1].kind.as_str(), "INB");
        assert!(records[1].is_uncommon());
    }

    #[test]
    fn mixed_devices_fail_before_any_record() {
        let err = normalize(vec![
            reconciled("E0123456", "IN", None, "In"),
            reconciled("E0123456", "UIT", None, "Uit"),
            reconciled("E0999999", "IN", None, "In"),
        ])
        .unwrap_err();
        match err {
            StructuralParseError::MixedDevices { first, other } => {
                assert_eq!(first, "E0123456");
                assert_eq!(other, "E0999999");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn kind_sorts_by_label() {
        let mut kinds = vec![EventKind::OverrideAlarmTime, EventKind::SelfTest, EventKind::AlarmOn];
        kinds.sort();
        let labels: Vec<&str> = kinds.iter().map(EventKind::as_str).collect();
        assert_eq!(labels, vec!["24H", "ALARM_ON", "OVERRIDE_ALARM_TIME"]);
    }
}
