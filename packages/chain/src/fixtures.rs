//! Row builders mirroring the `MarketWatch` chain markup.

use option_chain_models::{RawCell, RawRow};

pub fn header(cells: &[&str]) -> RawRow {
    RawRow::new(["chainrow", "understated"]).with_cells(cells.iter().copied())
}

pub fn expires(label: &str) -> RawRow {
    RawRow::new(["chainrow", "heading"]).with_cells([format!("Expires {label}")])
}

pub fn price_marker() -> RawRow {
    RawRow::new(["chainrow", "stockprice"]).with_cells(["Current price as of 4:00PM", "2,695.81"])
}

/// A data row: highlighted cells, then the strike, then plain cells.
pub fn data_row(strike: &str, in_the_money: &[&str], plain: &[&str]) -> RawRow {
    let row = in_the_money.iter().fold(RawRow::new(["chainrow", "aright"]), |row, text| {
        row.with_cell(RawCell::new(*text).with_class("inthemoney"))
    });
    let row = row.with_cell(RawCell::new(strike).with_class("strike-col"));
    row.with_cells(plain.iter().copied())
}
