#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for options-chain extraction.
//!
//! A document source decodes an options page into [`RawRow`]s. The parser
//! turns those rows into one [`ExpirationTable`] per expiration, each keyed
//! by [`Strike`] and holding a [`StrikeRecord`] with one value per
//! ([`Side`], base column) pair. Sinks only ever see these types, never the
//! markup.

pub mod row;
pub mod table;

pub use row::{RawCell, RawRow};
pub use table::{BaseColumnSet, ExpirationTable, OptionChain, Strike, StrikeRecord};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Which half of a chain row a value belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    /// Call options.
    Call,
    /// Put options.
    Put,
}

impl Side {
    /// Both sides in output column order (calls first).
    pub const ALL: [Self; 2] = [Self::Call, Self::Put];

    /// Prefixes a base column name with this side, e.g. `call_Bid`.
    #[must_use]
    pub fn column_name(self, base: &str) -> String {
        format!("{}_{base}", self.as_ref())
    }
}

/// A required structural element was not present in the document.
///
/// Always fatal: the parse is aborted and no partial result is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to find item '{element}' in '{context}'")]
pub struct StructureError {
    /// The element that was missing or malformed (e.g. `header_row`).
    pub element: String,
    /// Where it was expected (e.g. `options_table`).
    pub context: String,
}

impl StructureError {
    /// Creates a new `StructureError`.
    #[must_use]
    pub fn new(element: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            context: context.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_prefixes_column_names() {
        assert_eq!(Side::Call.column_name("Bid"), "call_Bid");
        assert_eq!(Side::Put.column_name("Open Int."), "put_Open Int.");
    }

    #[test]
    fn side_round_trips_through_strum() {
        assert_eq!("put".parse::<Side>().unwrap(), Side::Put);
        assert_eq!(Side::Call.to_string(), "call");
    }

    #[test]
    fn structure_error_names_element_and_context() {
        let err = StructureError::new("header_row", "options_table");
        assert_eq!(
            err.to_string(),
            "failed to find item 'header_row' in 'options_table'"
        );
    }
}
