// src/core/sanitize.rs
use scraper::ElementRef;

/// Visible text of a cell, entities decoded, surrounding whitespace (incl. &nbsp;) trimmed.
pub fn cell_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// First `max` chars of `s`, marked when cut. Keeps error messages readable
/// when a server answers with a whole HTML page.
pub fn excerpt(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => join!(&s[..cut], "…"),
        None => s!(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_cuts_on_char_boundary() {
        assert_eq!(excerpt("short", 10), "short");
        assert_eq!(excerpt("Chaniciën!", 8), "Chanicië…");
    }
}
