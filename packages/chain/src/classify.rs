//! Row classification.
//!
//! Each row is classified once, in document order, into a [`RowKind`].
//! The classifier owns the only mutable state of a walk: whether the call
//! columns are still the in-the-money highlighted group. That flag starts
//! `true` and flips to `false` at the first price marker row; it never
//! flips back within a document.

use option_chain_models::{RawRow, Strike, StrikeRecord, StructureError};

use crate::ChainError;
use crate::tags::{ChainTags, clean_text, clean_value};

/// What a single row is.
#[derive(Debug, Clone, PartialEq)]
pub enum RowKind {
    /// A heading announcing a new expiration, with its label.
    ExpirationBoundary(String),
    /// The current underlying price row. Carries no strike data.
    PriceMarker,
    /// A strike row with both sides assembled.
    Data(StrikeRecord),
    /// Anything else (dividers, footers, the header row).
    Ignorable,
}

/// Stateful row classifier for one document walk.
#[derive(Debug, Clone)]
pub struct RowClassifier {
    tags: ChainTags,
    width: usize,
    calls_on_left: bool,
}

impl RowClassifier {
    /// Creates a classifier producing `width` values per side.
    #[must_use]
    pub const fn new(tags: ChainTags, width: usize) -> Self {
        Self {
            tags,
            width,
            calls_on_left: true,
        }
    }

    /// Whether call cells are currently read from the in-the-money group.
    #[must_use]
    pub const fn calls_on_left(&self) -> bool {
        self.calls_on_left
    }

    /// Classifies the next row, flipping side attribution on a price
    /// marker.
    ///
    /// # Errors
    ///
    /// * [`ChainError::Structure`] if a data row has no strike cell
    /// * [`ChainError::InvalidNumber`] if the strike cell is not numeric
    pub fn classify(&mut self, row: &RawRow) -> Result<RowKind, ChainError> {
        if row.has_class(&self.tags.heading) && row.text.contains(&self.tags.expires_token) {
            let label = row
                .text
                .trim()
                .replacen(&self.tags.expires_token, "", 1)
                .trim()
                .to_owned();
            log::debug!("Found expiration boundary: {label}");
            return Ok(RowKind::ExpirationBoundary(label));
        }

        if row.has_class(&self.tags.data_row) {
            return self.data_row(row).map(RowKind::Data);
        }

        if row.has_class(&self.tags.price_marker) {
            if self.calls_on_left {
                log::debug!("Passed current stock price; calls are no longer in the money");
            }
            self.calls_on_left = false;
            return Ok(RowKind::PriceMarker);
        }

        Ok(RowKind::Ignorable)
    }

    fn data_row(&self, row: &RawRow) -> Result<StrikeRecord, ChainError> {
        let strike_cell = row
            .cell_with_class(&self.tags.strike_cell)
            .ok_or_else(|| StructureError::new(self.tags.strike_cell.as_str(), "options_row"))?;
        let strike_text = clean_text(&strike_cell.text);
        let strike = strike_text
            .parse::<f64>()
            .map_err(|_| ChainError::InvalidNumber { text: strike_text })?;

        log::debug!("Processing row with strike: {strike}");

        let itm = self.side_values(row, true);
        let plain = self.side_values(row, false);
        let (calls, puts) = if self.calls_on_left {
            (itm, plain)
        } else {
            (plain, itm)
        };

        Ok(StrikeRecord::new(Strike::new(strike), calls, puts))
    }

    /// Collects one cell group, padded with absent values or truncated to
    /// exactly `width` slots.
    fn side_values(&self, row: &RawRow, in_the_money: bool) -> Vec<Option<String>> {
        let mut values: Vec<Option<String>> = row
            .cells
            .iter()
            .filter(|cell| {
                if in_the_money {
                    cell.has_class(&self.tags.in_the_money)
                } else {
                    cell.is_untagged()
                }
            })
            .map(|cell| clean_value(&cell.text))
            .collect();
        values.resize(self.width, None);
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{data_row, expires, header, price_marker};

    fn classifier() -> RowClassifier {
        RowClassifier::new(ChainTags::default(), 2)
    }

    fn record(kind: RowKind) -> StrikeRecord {
        match kind {
            RowKind::Data(record) => record,
            other => panic!("expected data row, got {other:?}"),
        }
    }

    #[test]
    fn boundary_label_is_stripped() {
        let kind = classifier().classify(&expires("Jan 19 '18")).unwrap();
        assert_eq!(kind, RowKind::ExpirationBoundary("Jan 19 '18".to_owned()));
    }

    #[test]
    fn heading_without_expires_is_ignored() {
        let row = RawRow::new(["chainrow", "heading"]).with_cells(["Calls  Puts"]);
        assert_eq!(classifier().classify(&row).unwrap(), RowKind::Ignorable);
    }

    #[test]
    fn header_row_is_ignored() {
        let row = header(&["Bid", "Ask", "Strike", "Bid", "Ask"]);
        assert_eq!(classifier().classify(&row).unwrap(), RowKind::Ignorable);
    }

    #[test]
    fn calls_read_from_in_the_money_group_before_marker() {
        let rec = record(
            classifier()
                .classify(&data_row("100", &["1.20", "1.30"], &["0.80", "0.90"]))
                .unwrap(),
        );
        assert_eq!(rec.strike, Strike::new(100.0));
        assert_eq!(rec.calls, vec![Some("1.20".to_owned()), Some("1.30".to_owned())]);
        assert_eq!(rec.puts, vec![Some("0.80".to_owned()), Some("0.90".to_owned())]);
    }

    #[test]
    fn price_marker_flips_once_and_stays_flipped() {
        let mut c = classifier();
        assert!(c.calls_on_left());
        assert_eq!(c.classify(&price_marker()).unwrap(), RowKind::PriceMarker);
        assert!(!c.calls_on_left());
        c.classify(&price_marker()).unwrap();
        c.classify(&expires("Feb 16 '18")).unwrap();
        assert!(!c.calls_on_left());
    }

    #[test]
    fn calls_read_from_plain_group_after_marker() {
        let mut c = classifier();
        c.classify(&price_marker()).unwrap();
        let rec = record(
            c.classify(&data_row("110", &["2.00", "2.10"], &["0.05", "0.10"]))
                .unwrap(),
        );
        assert_eq!(rec.calls, vec![Some("0.05".to_owned()), Some("0.10".to_owned())]);
        assert_eq!(rec.puts, vec![Some("2.00".to_owned()), Some("2.10".to_owned())]);
    }

    #[test]
    fn short_group_is_padded_with_absent_values() {
        let rec = record(
            classifier()
                .classify(&data_row("100", &["1.20"], &["0.80", "0.90"]))
                .unwrap(),
        );
        assert_eq!(rec.calls, vec![Some("1.20".to_owned()), None]);
        assert_eq!(rec.puts.len(), 2);
    }

    #[test]
    fn long_group_is_truncated() {
        let rec = record(
            classifier()
                .classify(&data_row("100", &["1", "2", "3"], &["4", "5", "6", "7"]))
                .unwrap(),
        );
        assert_eq!(rec.calls, vec![Some("1".to_owned()), Some("2".to_owned())]);
        assert_eq!(rec.puts, vec![Some("4".to_owned()), Some("5".to_owned())]);
    }

    #[test]
    fn blank_cells_are_absent() {
        let rec = record(
            classifier()
                .classify(&data_row("100", &["  ", "1.30"], &["0.80", ""]))
                .unwrap(),
        );
        assert_eq!(rec.calls, vec![None, Some("1.30".to_owned())]);
        assert_eq!(rec.puts, vec![Some("0.80".to_owned()), None]);
    }

    #[test]
    fn strike_thousands_separator_is_removed() {
        let rec = record(
            classifier()
                .classify(&data_row(" 1,250 ", &["1", "2"], &["3", "4"]))
                .unwrap(),
        );
        assert_eq!(rec.strike, Strike::new(1250.0));
    }

    #[test]
    fn missing_strike_cell_is_structure_error() {
        let row = RawRow::new(["chainrow", "aright"]).with_cells(["1.20", "0.80"]);
        let err = classifier().classify(&row).unwrap_err();
        assert_eq!(
            err,
            ChainError::Structure(StructureError::new("strike-col", "options_row"))
        );
    }

    #[test]
    fn non_numeric_strike_is_value_error() {
        let err = classifier()
            .classify(&data_row("n/a", &["1"], &["2"]))
            .unwrap_err();
        assert_eq!(
            err,
            ChainError::InvalidNumber {
                text: "n/a".to_owned()
            }
        );
    }
}
