//! Strike-indexed tables, one per expiration.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::Side;

/// A strike price.
///
/// Equality and hashing are by bit pattern (with `-0.0` folded into `0.0`)
/// so strikes can key a table. Displays with at least one decimal place
/// (`1250.0`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Strike(f64);

impl Strike {
    /// Wraps a strike price.
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// The strike price.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    fn key(self) -> u64 {
        // `-0.0 + 0.0` is `+0.0`
        (self.0 + 0.0).to_bits()
    }
}

impl PartialEq for Strike {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Strike {}

impl PartialOrd for Strike {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl Hash for Strike {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Strike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl From<f64> for Strike {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

/// The pricing columns shared by both sides of the chain, in call-side
/// header order, plus the strike column's display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseColumnSet {
    columns: Vec<String>,
    strike_label: String,
}

impl BaseColumnSet {
    /// Creates a column set.
    #[must_use]
    pub fn new<I, S>(columns: I, strike_label: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            strike_label: strike_label.into(),
        }
    }

    /// Base column names, unprefixed.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The strike column's display label (e.g. `Strike`).
    #[must_use]
    pub fn strike_label(&self) -> &str {
        &self.strike_label
    }

    /// Number of base columns (per side).
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether there are no base columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a base column by name.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Side-prefixed column names for one side (e.g. `put_Bid`, `put_Ask`).
    #[must_use]
    pub fn side_columns(&self, side: Side) -> Vec<String> {
        self.columns.iter().map(|c| side.column_name(c)).collect()
    }

    /// All side-prefixed column names, calls first.
    #[must_use]
    pub fn data_columns(&self) -> Vec<String> {
        Side::ALL
            .iter()
            .flat_map(|side| self.side_columns(*side))
            .collect()
    }
}

/// The values of one chain row, keyed by strike.
///
/// Each side holds exactly one slot per base column; `None` is an absent
/// cell, never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrikeRecord {
    /// The row's strike price.
    pub strike: Strike,
    /// Call-side values in base-column order.
    pub calls: Vec<Option<String>>,
    /// Put-side values in base-column order.
    pub puts: Vec<Option<String>>,
}

impl StrikeRecord {
    /// Creates a record.
    #[must_use]
    pub const fn new(
        strike: Strike,
        calls: Vec<Option<String>>,
        puts: Vec<Option<String>>,
    ) -> Self {
        Self {
            strike,
            calls,
            puts,
        }
    }

    /// All values for one side.
    #[must_use]
    pub fn values(&self, side: Side) -> &[Option<String>] {
        match side {
            Side::Call => &self.calls,
            Side::Put => &self.puts,
        }
    }

    /// A single value by side and base-column position.
    #[must_use]
    pub fn value(&self, side: Side, index: usize) -> Option<&str> {
        self.values(side).get(index)?.as_deref()
    }

    /// A single value by side and base-column name.
    #[must_use]
    pub fn get(&self, columns: &BaseColumnSet, side: Side, name: &str) -> Option<&str> {
        self.value(side, columns.position(name)?)
    }

    /// Flattens the record into a JSON object keyed by the strike label and
    /// the side-prefixed column names. Absent values become `null`.
    #[must_use]
    pub fn to_record(&self, columns: &BaseColumnSet) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        map.insert(
            columns.strike_label().to_owned(),
            serde_json::json!(self.strike.value()),
        );
        for side in Side::ALL {
            for (i, name) in columns.columns().iter().enumerate() {
                let value = self
                    .value(side, i)
                    .map_or(serde_json::Value::Null, |v| {
                        serde_json::Value::String(v.to_owned())
                    });
                map.insert(side.column_name(name), value);
            }
        }
        map
    }
}

/// All strike records for one expiration, in discovery order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpirationTable {
    label: String,
    records: Vec<StrikeRecord>,
    #[serde(skip)]
    index: HashMap<Strike, usize>,
}

impl ExpirationTable {
    /// Creates an empty table for the given expiration label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// The expiration label (e.g. `Jan 19 '18`).
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Records in discovery order.
    #[must_use]
    pub fn records(&self) -> &[StrikeRecord] {
        &self.records
    }

    /// Number of strikes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no strikes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up the record for a strike.
    #[must_use]
    pub fn get(&self, strike: Strike) -> Option<&StrikeRecord> {
        self.index
            .get(&strike)
            .and_then(|&i| self.records.get(i))
    }

    /// Strikes in discovery order.
    pub fn strikes(&self) -> impl Iterator<Item = Strike> + '_ {
        self.records.iter().map(|r| r.strike)
    }

    /// Inserts a record. A strike already present is overwritten in place
    /// (keeping its original position) and the old record is returned.
    pub fn insert(&mut self, record: StrikeRecord) -> Option<StrikeRecord> {
        if let Some(&i) = self.index.get(&record.strike) {
            return Some(std::mem::replace(&mut self.records[i], record));
        }
        self.index.insert(record.strike, self.records.len());
        self.records.push(record);
        None
    }

    /// Folds another table's records into this one, last write wins.
    pub fn merge(&mut self, other: Self) {
        for record in other.records {
            self.insert(record);
        }
    }
}

/// Every expiration table found in one document, in the order their
/// boundary rows appeared.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionChain {
    columns: BaseColumnSet,
    tables: Vec<ExpirationTable>,
}

impl OptionChain {
    /// Creates an empty chain over the given columns.
    #[must_use]
    pub const fn new(columns: BaseColumnSet) -> Self {
        Self {
            columns,
            tables: Vec::new(),
        }
    }

    /// The base columns shared by every table.
    #[must_use]
    pub const fn columns(&self) -> &BaseColumnSet {
        &self.columns
    }

    /// Tables in discovery order.
    #[must_use]
    pub fn tables(&self) -> &[ExpirationTable] {
        &self.tables
    }

    /// Consumes the chain, returning its tables.
    #[must_use]
    pub fn into_tables(self) -> Vec<ExpirationTable> {
        self.tables
    }

    /// Expiration labels in discovery order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(ExpirationTable::label)
    }

    /// Looks up a table by expiration label.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&ExpirationTable> {
        self.tables.iter().find(|t| t.label() == label)
    }

    /// Number of expirations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no expirations were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Adds a finished table. If a table with the same label already exists
    /// the two are merged at the existing table's position and `true` is
    /// returned.
    pub fn push(&mut self, table: ExpirationTable) -> bool {
        if let Some(existing) = self.tables.iter_mut().find(|t| t.label() == table.label()) {
            existing.merge(table);
            return true;
        }
        self.tables.push(table);
        false
    }
}
