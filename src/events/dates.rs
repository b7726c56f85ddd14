// src/events/dates.rs
//
// Date separators carry only `dd/mm/yy`; every row below one (older, since the
// page is newest-first) carries only `hh:mm:ss`. Fold the two into one
// timestamp and drop the separators.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::StructuralParseError;
use crate::specs::history::{HistoryRow, INFO_CODE};

/// A history row with a full local timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatedRow {
    pub device: Option<String>,
    pub at: NaiveDateTime,
    pub code: String,
    pub group: String,
    pub sector: String,
    pub description: String,
}

impl DatedRow {
    fn new(row: HistoryRow, at: NaiveDateTime) -> Self {
        Self {
            device: row.device,
            at,
            code: row.code,
            group: row.group,
            sector: row.sector,
            description: row.description,
        }
    }

    pub fn is_annotation(&self) -> bool {
        self.code == INFO_CODE
    }

    /// What ties an annotation to the row it describes.
    pub fn correlation_key(&self) -> (Option<&str>, &str, &str, NaiveDateTime) {
        (self.device.as_deref(), &self.group, &self.sector, self.at)
    }

    pub(crate) fn describe(&self) -> String {
        format!(
            "{} {} G{}/S{} dev={} {:?}",
            self.at,
            self.code,
            self.group,
            self.sector,
            self.device.as_deref().unwrap_or("-"),
            self.description,
        )
    }
}

pub fn merge_dates(rows: Vec<HistoryRow>) -> Result<Vec<DatedRow>, StructuralParseError> {
    let mut date: Option<NaiveDate> = None;
    let mut out = Vec::with_capacity(rows.len());

    for (index, row) in rows.into_iter().enumerate() {
        if row.is_date_separator() {
            date = Some(parse_date(&row.time)?);
            continue;
        }
        let day = date.ok_or(StructuralParseError::NoDateContext { row: index })?;
        let at = day.and_time(parse_time(&row.time)?);
        out.push(DatedRow::new(row, at));
    }

    Ok(out)
}

/// `dd/mm/yy`, always in the 2000s.
pub fn parse_date(text: &str) -> Result<NaiveDate, StructuralParseError> {
    let bad = || StructuralParseError::BadDate(s!(text));
    let [dd, mm, yy] = split3(text, '/').ok_or_else(bad)?;
    let year = i32::try_from(yy)
        .ok()
        .and_then(|y| y.checked_add(2000))
        .ok_or_else(bad)?;
    NaiveDate::from_ymd_opt(year, mm, dd).ok_or_else(bad)
}

/// `hh:mm:ss`, local time as shown by the portal.
pub fn parse_time(text: &str) -> Result<NaiveTime, StructuralParseError> {
    let bad = || StructuralParseError::BadTime(s!(text));
    let [hh, mm, ss] = split3(text, ':').ok_or_else(bad)?;
    NaiveTime::from_hms_opt(hh, mm, ss).ok_or_else(bad)
}

fn split3(text: &str, sep: char) -> Option<[u32; 3]> {
    let mut parts = text.split(sep).map(|p| p.trim().parse::<u32>());
    let a = parts.next()?.ok()?;
    let b = parts.next()?.ok()?;
    let c = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some([a, b, c])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sep(date: &str) -> HistoryRow {
        HistoryRow { time: s!(date), sector: s!("---"), ..Default::default() }
    }

    fn ev(time: &str, code: &str) -> HistoryRow {
        HistoryRow {
            device: Some(s!("E0123456")),
            time: s!(time),
            code: s!(code),
            sector: s!("0"),
            ..Default::default()
        }
    }

    fn dt(y: i32, m: u32, d: u32, hh: u32, mm: u32, ss: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(hh, mm, ss).unwrap()
    }

    #[test]
    fn separators_set_context_and_vanish() {
        let rows = vec![
            sep("03/02/23"),
            ev("10:12:05", "24H"),
            ev("08:37:20", "UIT"),
            sep("02/02/23"),
            ev("19:09:48", "IN"),
        ];
        let dated = merge_dates(rows).unwrap();
        let stamps: Vec<_> = dated.iter().map(|r| r.at).collect();
        assert_eq!(
            stamps,
            vec![dt(2023, 2, 3, 10, 12, 5), dt(2023, 2, 3, 8, 37, 20), dt(2023, 2, 2, 19, 9, 48)]
        );
        assert_eq!(dated[2].code, "IN");
    }

    #[test]
    fn row_before_any_separator_fails() {
        let err = merge_dates(vec![ev("19:09:48", "IN"), sep("02/02/23")]).unwrap_err();
        assert!(matches!(err, StructuralParseError::NoDateContext { row: 0 }));

        let err = merge_dates(vec![ev("19:09:48", "IN")]).unwrap_err();
        assert!(matches!(err, StructuralParseError::NoDateContext { .. }));
    }

    #[test]
    fn malformed_dates_and_times() {
        assert!(matches!(merge_dates(vec![sep("31/02/23")]), Err(StructuralParseError::BadDate(_))));
        assert!(matches!(merge_dates(vec![sep("02-02-23")]), Err(StructuralParseError::BadDate(_))));
        assert!(matches!(
            merge_dates(vec![sep("02/02/23"), ev("25:00:00", "IN")]),
            Err(StructuralParseError::BadTime(_))
        ));
        assert!(matches!(
            merge_dates(vec![sep("02/02/23"), ev("19:09", "IN")]),
            Err(StructuralParseError::BadTime(_))
        ));
    }

    #[test]
    fn two_digit_years_are_2000s() {
        assert_eq!(parse_date("15/01/99").unwrap(), NaiveDate::from_ymd_opt(2099, 1, 15).unwrap());
        assert_eq!(parse_date("01/11/22").unwrap(), NaiveDate::from_ymd_opt(2022, 11, 1).unwrap());
    }
}
