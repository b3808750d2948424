//! Decoded markup rows.
//!
//! Rows and cells carry their raw text plus the structural tags (CSS
//! classes) the markup attached to them. Tags are only used to classify
//! rows and group cells; they never reach the output.

use serde::{Deserialize, Serialize};

/// One table cell as it appeared in the markup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCell {
    /// Structural tags attached to the cell.
    pub classes: Vec<String>,
    /// Concatenated text content, untrimmed.
    pub text: String,
}

impl RawCell {
    /// Creates an untagged cell.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            classes: Vec::new(),
            text: text.into(),
        }
    }

    /// Adds a structural tag to the cell.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Whether the cell carries `class`.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Whether the cell carries no tags at all.
    #[must_use]
    pub fn is_untagged(&self) -> bool {
        self.classes.is_empty()
    }
}

/// One table row: its tags, its full text, and its cells in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    /// Structural tags attached to the row.
    pub classes: Vec<String>,
    /// Full text content of the row, including any non-cell text.
    pub text: String,
    /// Cells in document order.
    pub cells: Vec<RawCell>,
}

impl RawRow {
    /// Creates an empty row with the given tags.
    #[must_use]
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
            text: String::new(),
            cells: Vec::new(),
        }
    }

    /// Appends a cell, extending the row text with the cell's text.
    #[must_use]
    pub fn with_cell(mut self, cell: RawCell) -> Self {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(&cell.text);
        self.cells.push(cell);
        self
    }

    /// Appends one untagged cell per text.
    #[must_use]
    pub fn with_cells<I, S>(self, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        texts
            .into_iter()
            .fold(self, |row, text| row.with_cell(RawCell::new(text)))
    }

    /// Replaces the row text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Whether the row carries `class`.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// The first cell carrying `class`, if any.
    #[must_use]
    pub fn cell_with_class(&self, class: &str) -> Option<&RawCell> {
        self.cells.iter().find(|c| c.has_class(class))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_text_accumulates_cell_text() {
        let row = RawRow::new(["chainrow"]).with_cells(["Bid", "Ask"]);
        assert_eq!(row.text, "Bid Ask");
        assert_eq!(row.cells.len(), 2);
        assert!(row.has_class("chainrow"));
        assert!(!row.has_class("heading"));
    }

    #[test]
    fn with_text_overrides_cell_text() {
        let row = RawRow::new(["heading"])
            .with_cells(["ignored"])
            .with_text("Expires Jan 19 '18");
        assert_eq!(row.text, "Expires Jan 19 '18");
    }

    #[test]
    fn finds_tagged_cell() {
        let row = RawRow::new(["aright"])
            .with_cell(RawCell::new("1.20").with_class("inthemoney"))
            .with_cell(RawCell::new("100").with_class("strike-col"));
        assert_eq!(row.cell_with_class("strike-col").unwrap().text, "100");
        assert!(row.cell_with_class("stockprice").is_none());
        assert!(!row.cells[0].is_untagged());
        assert!(RawCell::new("x").is_untagged());
    }
}
