//! Column header discovery.
//!
//! The header row lists the call columns, then the strike column, then the
//! put columns in the same order as the calls. Only the first header row in
//! the document is used.

use std::collections::HashSet;

use option_chain_models::{BaseColumnSet, RawRow, Side, StructureError};

use crate::ChainError;
use crate::tags::{ChainTags, clean_text};

const CONTEXT: &str = "options_table";

/// Finds the first header row and derives the shared base columns and the
/// strike label from it.
///
/// # Errors
///
/// Returns [`ChainError::Structure`] if there is no header row, if its cell
/// count is not `2n + 1` with `n >= 1`, if the put half does not repeat
/// the call half, or if a base column name appears twice.
pub fn extract_header(rows: &[RawRow], tags: &ChainTags) -> Result<BaseColumnSet, ChainError> {
    let header_row = rows
        .iter()
        .find(|row| row.has_class(&tags.header_row))
        .ok_or_else(|| StructureError::new("header_row", CONTEXT))?;

    let headers: Vec<String> = header_row
        .cells
        .iter()
        .map(|cell| clean_text(&cell.text))
        .collect();

    if headers.len() < 3 || headers.len() % 2 == 0 {
        return Err(StructureError::new(
            format!("mirrored header_row columns (found {} cells)", headers.len()),
            CONTEXT,
        )
        .into());
    }

    let half = headers.len() / 2;
    let calls = &headers[..half];
    let strike_label = &headers[half];
    let puts = &headers[half + 1..];

    for (call, put) in calls.iter().zip(puts) {
        if strip_side_prefix(call) != strip_side_prefix(put) {
            return Err(StructureError::new(
                format!("put column matching '{call}' (found '{put}')"),
                "header_row",
            )
            .into());
        }
    }

    let columns: Vec<&str> = calls.iter().map(|c| strip_side_prefix(c)).collect();
    let mut seen = HashSet::with_capacity(columns.len());
    if let Some(name) = columns.iter().find(|name| !seen.insert(**name)) {
        return Err(StructureError::new(
            format!("unique header_row column '{name}'"),
            "header_row",
        )
        .into());
    }

    log::info!("Found main headers: {columns:?} (strike column '{strike_label}')");

    Ok(BaseColumnSet::new(columns, strike_label.as_str()))
}

/// Drops a leading `Call`/`Put` word (any case) from a header cell, so
/// `Call Bid` and `Put Bid` both become `Bid`.
fn strip_side_prefix(name: &str) -> &str {
    for side in Side::ALL {
        let prefix = side.as_ref();
        let Some(head) = name.get(..prefix.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(prefix) {
            continue;
        }
        if let Some(rest) = name[prefix.len()..].strip_prefix([' ', '_', '-', ':']) {
            let rest = rest.trim_start();
            if !rest.is_empty() {
                return rest;
            }
        }
    }
    name
}
