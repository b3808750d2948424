//! Parse modes.
//!
//! Both modes share one walk: [`ChainWalker`] runs the classifier over the
//! rows and surfaces only expiration boundaries and strike rows. They
//! differ only in how results are materialized.

use std::iter::FusedIterator;

use option_chain_models::{BaseColumnSet, ExpirationTable, OptionChain, RawRow, StrikeRecord};

use crate::ChainError;
use crate::builder::TableBuilder;
use crate::classify::{RowClassifier, RowKind};
use crate::header::extract_header;
use crate::tags::ChainTags;

/// A row that matters to table assembly.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainEvent {
    /// An expiration boundary with its label.
    Expiration(String),
    /// A strike row.
    Row(StrikeRecord),
}

/// Classifies rows in document order, skipping price markers and
/// ignorable rows.
#[derive(Debug, Clone)]
pub struct ChainWalker<'a> {
    rows: std::slice::Iter<'a, RawRow>,
    classifier: RowClassifier,
}

impl<'a> ChainWalker<'a> {
    /// Starts a walk producing `columns.len()` values per side.
    #[must_use]
    pub fn new(rows: &'a [RawRow], tags: ChainTags, columns: &BaseColumnSet) -> Self {
        Self {
            rows: rows.iter(),
            classifier: RowClassifier::new(tags, columns.len()),
        }
    }
}

impl Iterator for ChainWalker<'_> {
    type Item = Result<ChainEvent, ChainError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let row = self.rows.next()?;
            match self.classifier.classify(row) {
                Ok(RowKind::ExpirationBoundary(label)) => {
                    return Some(Ok(ChainEvent::Expiration(label)));
                }
                Ok(RowKind::Data(record)) => return Some(Ok(ChainEvent::Row(record))),
                Ok(RowKind::PriceMarker | RowKind::Ignorable) => {}
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// How a parse materializes its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Build every expiration table eagerly.
    #[default]
    AllExpirations,
    /// Lazily yield the first expiration's rows and stop at the next one.
    FirstExpiration,
}

/// The result of [`ChainParser::parse`].
#[derive(Debug)]
pub enum Parsed<'a> {
    /// Every expiration, in discovery order.
    Chain(OptionChain),
    /// The first expiration's rows, not yet consumed.
    First(FirstExpiration<'a>),
}

/// Parses options-chain rows with a configurable tag vocabulary.
#[derive(Debug, Clone, Default)]
pub struct ChainParser {
    tags: ChainTags,
}

impl ChainParser {
    /// Creates a parser matching the given tags.
    #[must_use]
    pub const fn new(tags: ChainTags) -> Self {
        Self { tags }
    }

    /// The tag vocabulary in use.
    #[must_use]
    pub const fn tags(&self) -> &ChainTags {
        &self.tags
    }

    /// Parses in the requested mode.
    ///
    /// # Errors
    ///
    /// See [`Self::parse_chain`] and [`Self::first_expiration`].
    pub fn parse<'a>(
        &self,
        rows: &'a [RawRow],
        mode: ParseMode,
    ) -> Result<Parsed<'a>, ChainError> {
        match mode {
            ParseMode::AllExpirations => self.parse_chain(rows).map(Parsed::Chain),
            ParseMode::FirstExpiration => self.first_expiration(rows).map(Parsed::First),
        }
    }

    /// Builds one table per expiration, in the order their boundary rows
    /// appear.
    ///
    /// A repeated boundary with the open table's label is ignored. A label
    /// that reappears after a different expiration is merged into its
    /// earlier table.
    ///
    /// # Errors
    ///
    /// * [`ChainError::Structure`] if the header row or a strike cell is
    ///   missing
    /// * [`ChainError::InvalidNumber`] if a strike is not numeric
    /// * [`ChainError::NoOpenTable`] if a strike row precedes every
    ///   expiration boundary
    pub fn parse_chain(&self, rows: &[RawRow]) -> Result<OptionChain, ChainError> {
        let columns = extract_header(rows, &self.tags)?;
        log::debug!("Found {} rows in options table", rows.len());

        let mut chain = OptionChain::new(columns.clone());
        let mut builder = TableBuilder::new();

        for event in ChainWalker::new(rows, self.tags.clone(), &columns) {
            match event? {
                ChainEvent::Expiration(label) => {
                    match builder.current_label().map(|current| current == label) {
                        Some(true) => {
                            log::warn!("Ignoring repeated boundary for '{label}'");
                            continue;
                        }
                        Some(false) => finish(&mut chain, builder.close()?),
                        None => {}
                    }
                    builder.open(label)?;
                }
                ChainEvent::Row(record) => {
                    builder.add_row(record)?;
                }
            }
        }

        if builder.is_open() {
            finish(&mut chain, builder.close()?);
        }

        Ok(chain)
    }

    /// Lazily yields the strike rows of the first expiration only.
    ///
    /// The header is read eagerly, so a missing header fails here rather
    /// than on the first `next()`. The returned iterator stops pulling rows
    /// as soon as a boundary with a different label appears. Calling this
    /// again restarts from the top of `rows`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Structure`] if the header row is missing or
    /// malformed.
    pub fn first_expiration<'a>(
        &self,
        rows: &'a [RawRow],
    ) -> Result<FirstExpiration<'a>, ChainError> {
        let columns = extract_header(rows, &self.tags)?;
        let walker = ChainWalker::new(rows, self.tags.clone(), &columns);
        Ok(FirstExpiration {
            walker,
            columns,
            expiration: None,
            done: false,
        })
    }
}

fn finish(chain: &mut OptionChain, table: ExpirationTable) {
    let label = table.label().to_owned();
    let strikes = table.len();
    if chain.push(table) {
        log::warn!("Expiration '{label}' appeared again; merged {strikes} strikes into it");
    } else {
        log::info!("Finished expiration '{label}' with {strikes} strikes");
    }
}

/// Strike rows of the first expiration in a document.
///
/// Yields `Err` at most once, after which it is exhausted.
#[derive(Debug, Clone)]
pub struct FirstExpiration<'a> {
    walker: ChainWalker<'a>,
    columns: BaseColumnSet,
    expiration: Option<String>,
    done: bool,
}

impl FirstExpiration<'_> {
    /// The base columns read from the header.
    #[must_use]
    pub const fn columns(&self) -> &BaseColumnSet {
        &self.columns
    }

    /// The label of the expiration being yielded, once its boundary has
    /// been seen.
    #[must_use]
    pub fn expiration(&self) -> Option<&str> {
        self.expiration.as_deref()
    }
}

impl Iterator for FirstExpiration<'_> {
    type Item = Result<StrikeRecord, ChainError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let event = match self.walker.next() {
                Some(Ok(event)) => event,
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    return None;
                }
            };

            match event {
                ChainEvent::Expiration(label) => match &self.expiration {
                    None => {
                        log::debug!("Starting expiration: {label}");
                        self.expiration = Some(label);
                    }
                    Some(current) if *current == label => {}
                    Some(current) => {
                        log::info!("Reached expiration '{label}'; stopping after '{current}'");
                        self.done = true;
                        return None;
                    }
                },
                ChainEvent::Row(record) => {
                    if self.expiration.is_none() {
                        self.done = true;
                        return Some(Err(ChainError::NoOpenTable));
                    }
                    return Some(Ok(record));
                }
            }
        }
    }
}

impl FusedIterator for FirstExpiration<'_> {}
