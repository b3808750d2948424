#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Document sources for options pages.
//!
//! Provides the [`DocumentSource`] trait and two implementations: a live
//! HTTP fetch ([`fetch::WebPageSource`]) and a saved page on disk
//! ([`fetch::SavedPageSource`]). Both hand the body to
//! [`document::decode_rows`], which turns the page's chain rows into
//! [`RawRow`]s for the parser.
//!
//! This crate never classifies rows; it only decodes markup.

pub mod document;
pub mod fetch;

use option_chain_models::{RawRow, StructureError};

pub use document::{DocumentSelectors, decode_rows};
pub use fetch::{FetchConfig, SavedPageSource, WebPageSource};

/// Errors that can occur while loading an options page.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// An HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Reading a saved page failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The page has no options container.
    #[error(transparent)]
    Structure(#[from] StructureError),

    /// A selector or header could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Loads the decoded chain rows of an options page.
pub trait DocumentSource: Send + Sync {
    /// Loads and decodes the page for `symbol`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the page cannot be read or has no options
    /// container.
    fn load(
        &self,
        symbol: &str,
    ) -> impl std::future::Future<Output = Result<Vec<RawRow>, SourceError>> + Send;

    /// Returns the name of the loading strategy (e.g. `"web_page"`).
    fn kind(&self) -> &str;
}
