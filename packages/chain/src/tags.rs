//! Structural tag vocabulary.
//!
//! The parser never looks at layout or styling, only at which tags a row or
//! cell carries. [`ChainTags::default`] matches the `MarketWatch` options
//! page; other pages with the same two-sided layout can override any tag.

/// Tags the parser matches against rows and cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainTags {
    /// Row tag marking the column header row.
    pub header_row: String,
    /// Row tag marking a heading row (candidate expiration boundary).
    pub heading: String,
    /// Text a heading row must contain to be an expiration boundary. Also
    /// stripped from the row text to produce the label.
    pub expires_token: String,
    /// Row tag marking a data row.
    pub data_row: String,
    /// Cell tag marking the strike cell of a data row.
    pub strike_cell: String,
    /// Cell tag marking the in-the-money highlighted cell group.
    pub in_the_money: String,
    /// Row tag marking the current underlying price.
    pub price_marker: String,
}

impl Default for ChainTags {
    fn default() -> Self {
        Self {
            header_row: "understated".to_owned(),
            heading: "heading".to_owned(),
            expires_token: "Expires".to_owned(),
            data_row: "aright".to_owned(),
            strike_cell: "strike-col".to_owned(),
            in_the_money: "inthemoney".to_owned(),
            price_marker: "stockprice".to_owned(),
        }
    }
}

/// Trims whitespace and strips `,` thousands separators.
#[must_use]
pub fn clean_text(text: &str) -> String {
    text.trim().replace(',', "")
}

/// Like [`clean_text`], but an empty result is absent.
#[must_use]
pub fn clean_value(text: &str) -> Option<String> {
    let cleaned = clean_text(text);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
