//! HTML options page decoder.
//!
//! Locates the options container via CSS selector and decodes each chain
//! row into a [`RawRow`], keeping every row's and cell's classes and raw
//! text. No classification happens here.

use option_chain_models::{RawCell, RawRow, StructureError};
use scraper::{ElementRef, Html, Selector};

use crate::SourceError;

/// CSS selectors used to find the chain rows in a page.
///
/// The defaults match standard `MarketWatch` options markup. Use the
/// builder methods to customise selectors for other layouts.
#[derive(Debug, Clone)]
pub struct DocumentSelectors {
    /// CSS selector for the element containing the options table.
    container: String,
    /// CSS selector for chain rows inside the container.
    row: String,
    /// CSS selector for cells within a row.
    cell: String,
}

impl Default for DocumentSelectors {
    fn default() -> Self {
        Self {
            container: "div#options".to_owned(),
            row: "tr.chainrow".to_owned(),
            cell: "td".to_owned(),
        }
    }
}

impl DocumentSelectors {
    /// Overrides the CSS selector used to locate the options container.
    #[must_use]
    pub fn with_container(mut self, selector: &str) -> Self {
        selector.clone_into(&mut self.container);
        self
    }

    /// Overrides the CSS selector used to locate chain rows.
    #[must_use]
    pub fn with_row(mut self, selector: &str) -> Self {
        selector.clone_into(&mut self.row);
        self
    }

    /// Overrides the CSS selector used to locate cells within a row.
    #[must_use]
    pub fn with_cell(mut self, selector: &str) -> Self {
        selector.clone_into(&mut self.cell);
        self
    }
}

/// Decodes every chain row of an options page, in document order.
///
/// # Errors
///
/// * [`SourceError::Structure`] if the options container is missing
/// * [`SourceError::Parse`] if a configured selector is invalid
pub fn decode_rows(html: &str, selectors: &DocumentSelectors) -> Result<Vec<RawRow>, SourceError> {
    let document = Html::parse_document(html);

    // ── Locate the options container ───────────────────────────────────
    let container_sel = parse_selector(&selectors.container)?;
    let container = document
        .select(&container_sel)
        .next()
        .ok_or_else(|| StructureError::new("options_table", "webpage"))?;
    log::debug!("Found item 'options_table' in 'webpage'");

    // ── Decode rows ────────────────────────────────────────────────────
    let row_sel = parse_selector(&selectors.row)?;
    let cell_sel = parse_selector(&selectors.cell)?;

    let rows: Vec<RawRow> = container
        .select(&row_sel)
        .map(|row| {
            let cells = row
                .select(&cell_sel)
                .map(|cell| RawCell {
                    classes: classes(cell),
                    text: cell.text().collect(),
                })
                .collect();
            RawRow {
                classes: classes(row),
                text: row.text().collect(),
                cells,
            }
        })
        .collect();

    log::debug!("Found {} rows in options table", rows.len());
    Ok(rows)
}

fn classes(element: ElementRef<'_>) -> Vec<String> {
    element.value().classes().map(str::to_owned).collect()
}

/// Parses a CSS selector string, returning a [`SourceError`] on failure.
fn parse_selector(selector: &str) -> Result<Selector, SourceError> {
    Selector::parse(selector)
        .map_err(|e| SourceError::Parse(format!("invalid CSS selector '{selector}': {e}")))
}
