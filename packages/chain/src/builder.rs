//! Per-expiration table assembly.

use option_chain_models::{ExpirationTable, StrikeRecord};

use crate::ChainError;

/// Accumulates strike records into the currently open expiration table.
///
/// At most one table is open at a time. Adding a row or closing with
/// nothing open is a contract violation and fails loudly rather than
/// dropping data.
#[derive(Debug, Default)]
pub struct TableBuilder {
    current: Option<ExpirationTable>,
}

impl TableBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Label of the open table.
    #[must_use]
    pub fn current_label(&self) -> Option<&str> {
        self.current.as_ref().map(ExpirationTable::label)
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Opens an empty table for `label`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::TableAlreadyOpen`] if a table is already open.
    pub fn open(&mut self, label: impl Into<String>) -> Result<(), ChainError> {
        if let Some(table) = &self.current {
            return Err(ChainError::TableAlreadyOpen {
                label: table.label().to_owned(),
            });
        }
        let label = label.into();
        log::debug!("Starting new expiration: {label}");
        self.current = Some(ExpirationTable::new(label));
        Ok(())
    }

    /// Inserts or overwrites the record at its strike in the open table,
    /// returning the overwritten record if any.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::NoOpenTable`] if no table is open.
    pub fn add_row(&mut self, record: StrikeRecord) -> Result<Option<StrikeRecord>, ChainError> {
        let table = self.current.as_mut().ok_or(ChainError::NoOpenTable)?;
        let replaced = table.insert(record);
        if let Some(old) = &replaced {
            log::debug!(
                "Strike {} seen twice in '{}'; keeping the later row",
                old.strike,
                table.label()
            );
        }
        Ok(replaced)
    }

    /// Finalizes and returns the open table.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::NoOpenTable`] if no table is open.
    pub fn close(&mut self) -> Result<ExpirationTable, ChainError> {
        self.current.take().ok_or(ChainError::NoOpenTable)
    }
}

#[cfg(test)]
mod tests {
    use option_chain_models::{Side, Strike};

    use super::*;

    fn record(strike: f64, bid: &str) -> StrikeRecord {
        StrikeRecord::new(
            Strike::new(strike),
            vec![Some(bid.to_owned())],
            vec![None],
        )
    }

    #[test]
    fn add_row_before_open_fails() {
        let mut builder = TableBuilder::new();
        assert_eq!(
            builder.add_row(record(100.0, "1")).unwrap_err(),
            ChainError::NoOpenTable
        );
        assert_eq!(builder.close().unwrap_err(), ChainError::NoOpenTable);
    }

    #[test]
    fn open_twice_fails() {
        let mut builder = TableBuilder::new();
        builder.open("Jan").unwrap();
        assert_eq!(
            builder.open("Feb").unwrap_err(),
            ChainError::TableAlreadyOpen {
                label: "Jan".to_owned()
            }
        );
    }

    #[test]
    fn close_returns_accumulated_rows() {
        let mut builder = TableBuilder::new();
        builder.open("Jan 19 '18").unwrap();
        assert_eq!(builder.current_label(), Some("Jan 19 '18"));
        builder.add_row(record(100.0, "1")).unwrap();
        builder.add_row(record(105.0, "2")).unwrap();

        let table = builder.close().unwrap();
        assert!(!builder.is_open());
        assert_eq!(table.label(), "Jan 19 '18");
        assert_eq!(table.len(), 2);
        assert_eq!(
            builder.add_row(record(110.0, "3")).unwrap_err(),
            ChainError::NoOpenTable
        );
    }

    #[test]
    fn duplicate_strike_is_last_write_wins() {
        let mut builder = TableBuilder::new();
        builder.open("Jan").unwrap();
        assert!(builder.add_row(record(100.0, "1")).unwrap().is_none());
        let old = builder.add_row(record(100.0, "2")).unwrap().unwrap();
        assert_eq!(old.value(Side::Call, 0), Some("1"));

        let table = builder.close().unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get(Strike::new(100.0)).unwrap().value(Side::Call, 0),
            Some("2")
        );
    }
}
