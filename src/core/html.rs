// src/core/html.rs
// Table extraction on top of `scraper`.
// Only direct children are walked (table > thead/tbody > tr > th/td), so a
// nested table inside a cell never contributes rows of its own.

use scraper::{ElementRef, Html};

use super::sanitize::cell_text;
use crate::error::StructuralParseError;

/// One body row: (header label, trimmed cell text) pairs in column order.
/// A short row simply carries fewer pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    pub fn new(cells: Vec<(String, String)>) -> Self {
        Self { cells }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Header labels plus body rows of one table, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    pub labels: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl Table {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// Parse the first `<table>` of the document.
///
/// Labels come from the `<th>` cells of the first `<thead>` row. Each body row
/// is zipped positionally with those labels; a row with more cells than labels
/// is rejected with the row's texts attached, since there is no label to give
/// the extra cells.
pub fn extract_first_table(html_doc: &str) -> Result<Table, StructuralParseError> {
    let doc = Html::parse_document(html_doc);
    let table = doc
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table")
        .ok_or(StructuralParseError::NoTable)?;

    let labels: Vec<String> = child_elements(table, "thead")
        .next()
        .and_then(|thead| child_elements(thead, "tr").next())
        .map(|tr| child_elements(tr, "th").map(cell_text).collect())
        .unwrap_or_default();
    if labels.is_empty() {
        return Err(StructuralParseError::NoHeader);
    }

    let mut rows = Vec::new();
    for (index, tr) in child_elements(table, "tbody")
        .flat_map(|tbody| child_elements(tbody, "tr"))
        .enumerate()
    {
        let texts: Vec<String> = child_elements(tr, "td").map(cell_text).collect();
        if texts.len() > labels.len() {
            return Err(StructuralParseError::TooManyCells {
                row: index,
                cells: texts.len(),
                headers: labels.len(),
                texts,
            });
        }
        rows.push(RawRow::new(labels.iter().cloned().zip(texts).collect()));
    }

    Ok(Table { labels, rows })
}

fn child_elements<'a>(
    parent: ElementRef<'a>,
    name: &'static str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |el| el.value().name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEAD: &str = "<thead><tr><th>Tijd</th><th> Alrm </th><th>Omschrijving</th></tr></thead>";

    #[test]
    fn zips_labels_with_trimmed_cells() {
        let doc = format!(
            "<html><body><p>intro</p><table>{HEAD}<tbody>\
             <tr><td> 10:11:40 </td><td>INF</td><td>\n  AUTOTEST&nbsp;</td></tr>\
             <tr><td>02/02/23</td></tr>\
             </tbody></table><table>{HEAD}</table></body></html>"
        );
        let table = extract_first_table(&doc).unwrap();

        assert_eq!(table.labels, vec!["Tijd", "Alrm", "Omschrijving"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].get("Tijd"), Some("10:11:40"));
        assert_eq!(table.rows[0].get("Omschrijving"), Some("AUTOTEST"));
        // Short rows are fine; the missing labels are just absent
        assert_eq!(table.rows[1].len(), 1);
        assert_eq!(table.rows[1].get("Alrm"), None);
    }

    #[test]
    fn no_table_is_structural() {
        let err = extract_first_table("<html><body><p>Recent ontvangen meldingen:</p></body></html>")
            .unwrap_err();
        assert!(matches!(err, StructuralParseError::NoTable));
    }

    #[test]
    fn missing_header_is_structural() {
        let err = extract_first_table("<table><tbody><tr><td>x</td></tr></tbody></table>").unwrap_err();
        assert!(matches!(err, StructuralParseError::NoHeader));
    }

    #[test]
    fn extra_cells_name_the_offending_row() {
        let doc = format!(
            "<table>{HEAD}<tbody>\
             <tr><td>a</td><td>b</td><td>c</td></tr>\
             <tr><td>1</td><td>2</td><td>3</td><td>4</td></tr>\
             </tbody></table>"
        );
        match extract_first_table(&doc).unwrap_err() {
            StructuralParseError::TooManyCells { row, cells, headers, texts } => {
                assert_eq!((row, cells, headers), (1, 4, 3));
                assert_eq!(texts, vec!["1", "2", "3", "4"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
