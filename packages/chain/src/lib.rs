#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Options-chain extraction.
//!
//! Turns the decoded rows of an options page into strike-indexed tables,
//! one per expiration. Call and put columns sit side by side in the markup
//! and only the in-the-money highlighting tells them apart, so the work is
//! split into three steps:
//!
//! 1. [`header::extract_header`] derives the base columns shared by both
//!    sides from the first header row.
//! 2. [`classify::RowClassifier`] classifies every row exactly once and
//!    tracks which cell group currently holds the calls.
//! 3. [`builder::TableBuilder`] places classified strike rows into the open
//!    expiration table.
//!
//! [`ChainParser`] ties them together in two modes: [`ChainParser::parse_chain`]
//! eagerly builds every expiration, and [`ChainParser::first_expiration`]
//! lazily yields the rows of the first expiration only.
//!
//! Parsing is pure and synchronous. Each call owns its own state, so
//! documents can be parsed concurrently without locking.

pub mod builder;
pub mod classify;
pub mod header;
pub mod parse;
pub mod tags;

#[cfg(test)]
mod fixtures;

pub use parse::{ChainEvent, ChainParser, ChainWalker, FirstExpiration, ParseMode, Parsed};
pub use tags::ChainTags;

use option_chain_models::{OptionChain, RawRow, StructureError};

/// Errors that abort a parse. No partial result is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// A required structural element is missing or malformed.
    #[error(transparent)]
    Structure(#[from] StructureError),

    /// A cell that must be numeric (the strike) could not be parsed.
    #[error("invalid number: '{text}'")]
    InvalidNumber {
        /// The cleaned cell text.
        text: String,
    },

    /// A strike row arrived with no expiration table open.
    #[error("no expiration table is open")]
    NoOpenTable,

    /// A table was opened while another was still open.
    #[error("expiration table '{label}' is already open")]
    TableAlreadyOpen {
        /// Label of the table that is still open.
        label: String,
    },
}

/// Parses every expiration using the default tag vocabulary.
///
/// # Errors
///
/// See [`ChainParser::parse_chain`].
pub fn parse_chain(rows: &[RawRow]) -> Result<OptionChain, ChainError> {
    ChainParser::default().parse_chain(rows)
}

/// Lazily yields the first expiration's strike rows using the default tag
/// vocabulary.
///
/// # Errors
///
/// See [`ChainParser::first_expiration`].
pub fn first_expiration(rows: &[RawRow]) -> Result<FirstExpiration<'_>, ChainError> {
    ChainParser::default().first_expiration(rows)
}
