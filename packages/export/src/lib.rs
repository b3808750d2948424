#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CSV export of options-chain tables.
//!
//! Each expiration becomes one delimited file with a header row of the
//! strike column followed by every `call_*` then `put_*` column, and one
//! line per strike in discovery order. Absent values are written as empty
//! fields.

pub mod filename;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use option_chain_models::{BaseColumnSet, ExpirationTable, OptionChain, Side, StrikeRecord};
use option_chain_parser::{ChainError, FirstExpiration};

pub use filename::{clean_filename, secure_filename};

/// Header of the strike column in multi-expiration exports.
pub const STRIKE_COLUMN: &str = "strike";

/// Errors that can occur while exporting.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Creating or writing an output file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing a CSV record failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The lazy record stream failed mid-export.
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),
}

/// Where and how exported files are named.
#[derive(Debug, Clone)]
pub struct ExportTarget {
    /// Output directory.
    pub dir: PathBuf,
    /// Ticker used in filenames.
    pub ticker: String,
    /// Date stamped into filenames.
    pub date: NaiveDate,
}

impl ExportTarget {
    /// Creates a target.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, ticker: &str, date: NaiveDate) -> Self {
        Self {
            dir: dir.into(),
            ticker: ticker.to_owned(),
            date,
        }
    }

    /// Full output path for an expiration.
    #[must_use]
    pub fn path_for(&self, expiration: &str) -> PathBuf {
        self.dir
            .join(secure_filename(self.date, &self.ticker, expiration, "csv"))
    }
}

fn header(strike: &str, columns: &BaseColumnSet) -> Vec<String> {
    std::iter::once(strike.to_owned())
        .chain(columns.data_columns())
        .collect()
}

fn record_fields(record: &StrikeRecord, columns: &BaseColumnSet) -> Vec<String> {
    let mut fields = Vec::with_capacity(1 + 2 * columns.len());
    fields.push(record.strike.to_string());
    for side in Side::ALL {
        for i in 0..columns.len() {
            fields.push(record.value(side, i).unwrap_or_default().to_owned());
        }
    }
    fields
}

/// Writes one expiration table as CSV.
///
/// # Errors
///
/// Returns [`ExportError`] if writing fails.
pub fn write_table<W: Write>(
    writer: W,
    table: &ExpirationTable,
    columns: &BaseColumnSet,
) -> Result<(), ExportError> {
    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
    csv_writer.write_record(header(STRIKE_COLUMN, columns))?;
    for record in table.records() {
        csv_writer.write_record(record_fields(record, columns))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Streams strike records as CSV, keyed by the page's own strike label.
/// Returns the number of records written.
///
/// # Errors
///
/// Returns [`ExportError::Chain`] if the stream yields an error, or
/// another [`ExportError`] if writing fails.
pub fn write_records<W, I>(
    writer: W,
    columns: &BaseColumnSet,
    records: I,
) -> Result<usize, ExportError>
where
    W: Write,
    I: IntoIterator<Item = Result<StrikeRecord, ChainError>>,
{
    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
    csv_writer.write_record(header(columns.strike_label(), columns))?;

    let mut count = 0;
    for record in records {
        csv_writer.write_record(record_fields(&record?, columns))?;
        count += 1;
    }

    csv_writer.flush()?;
    Ok(count)
}

fn create(path: &Path) -> Result<BufWriter<File>, ExportError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(BufWriter::new(File::create(path)?))
}

/// Writes every expiration of a chain to its own file.
///
/// # Errors
///
/// Returns [`ExportError`] if any file cannot be written.
pub fn export_chain(
    chain: &OptionChain,
    target: &ExportTarget,
) -> Result<Vec<PathBuf>, ExportError> {
    let mut paths = Vec::with_capacity(chain.len());
    for table in chain.tables() {
        let path = target.path_for(table.label());
        write_table(create(&path)?, table, chain.columns())?;
        log::info!(
            "Finished expiration '{}'; Saved to: {}",
            table.label(),
            path.display()
        );
        paths.push(path);
    }
    Ok(paths)
}

/// Writes the first expiration's rows to a single file as they are pulled.
///
/// Rows are streamed into a `.partial` sibling that is renamed into place
/// only once the stream has ended cleanly. Returns `None` without creating
/// a file if the document has no expiration at all.
///
/// # Errors
///
/// Returns [`ExportError`] if the stream fails or the file cannot be
/// written. Either way no output file is left behind.
pub fn export_first_expiration(
    mut records: FirstExpiration<'_>,
    target: &ExportTarget,
) -> Result<Option<PathBuf>, ExportError> {
    // The label is only known once the first boundary has been pulled.
    let first = records.next().transpose()?;
    let Some(label) = records.expiration().map(str::to_owned) else {
        return Ok(None);
    };

    let columns = records.columns().clone();
    let path = target.path_for(&label);
    let partial = partial_path(&path);

    let written = create(&partial).and_then(|writer| {
        write_records(writer, &columns, first.map(Ok).into_iter().chain(records))
    });
    let count = match written {
        Ok(count) => count,
        Err(e) => {
            if let Err(remove) = std::fs::remove_file(&partial) {
                log::debug!("Could not remove {}: {remove}", partial.display());
            }
            return Err(e);
        }
    };
    std::fs::rename(&partial, &path)?;

    log::info!(
        "Finished expiration '{label}' ({count} strikes); Saved to: {}",
        path.display()
    );
    Ok(Some(path))
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use option_chain_models::{RawCell, RawRow, Strike};

    use super::*;

    fn columns() -> BaseColumnSet {
        BaseColumnSet::new(["Bid", "Ask"], "Strike")
    }

    fn table() -> ExpirationTable {
        let mut table = ExpirationTable::new("Jan 19 '18");
        table.insert(StrikeRecord::new(
            Strike::new(100.0),
            vec![Some("1.20".to_owned()), Some("1.30".to_owned())],
            vec![Some("0.80".to_owned()), None],
        ));
        table.insert(StrikeRecord::new(
            Strike::new(1250.5),
            vec![None, Some("0.05".to_owned())],
            vec![Some("3.00".to_owned()), Some("3.10".to_owned())],
        ));
        table
    }

    fn rows() -> Vec<RawRow> {
        let data = |strike: &str, itm: &str, plain: &str| {
            RawRow::new(["chainrow", "aright"])
                .with_cell(RawCell::new(itm).with_class("inthemoney"))
                .with_cell(RawCell::new(strike).with_class("strike-col"))
                .with_cells([plain])
        };
        vec![
            RawRow::new(["chainrow", "understated"]).with_cells(["Bid", "Strike", "Bid"]),
            RawRow::new(["chainrow", "heading"]).with_cells(["Expires Jan 19 '18"]),
            data("100", "1.20", "0.80"),
            data("105", "0.90", "1.10"),
            RawRow::new(["chainrow", "heading"]).with_cells(["Expires Feb 16 '18"]),
            data("100", "2.00", "1.50"),
        ]
    }

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("option_chain_export_{name}_{}", std::process::id()))
    }

    #[test]
    fn table_csv_has_strike_then_calls_then_puts() {
        let mut out = Vec::new();
        write_table(&mut out, &table(), &columns()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "strike,call_Bid,call_Ask,put_Bid,put_Ask\n\
             100.0,1.20,1.30,0.80,\n\
             1250.5,,0.05,3.00,3.10\n"
        );
    }

    #[test]
    fn record_stream_uses_strike_label() {
        let records = table().records().to_vec().into_iter().map(Ok);
        let mut out = Vec::new();
        let count = write_records(&mut out, &columns(), records).unwrap();
        assert_eq!(count, 2);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Strike,call_Bid,call_Ask,put_Bid,put_Ask\n"));
    }

    #[test]
    fn record_stream_error_aborts_export() {
        let records = vec![Err(ChainError::NoOpenTable)];
        let err = write_records(Vec::new(), &columns(), records).unwrap_err();
        assert!(matches!(err, ExportError::Chain(ChainError::NoOpenTable)));
    }

    #[test]
    fn exports_one_file_per_expiration() {
        let dir = scratch_dir("chain");
        let date = NaiveDate::from_ymd_opt(2018, 1, 2).unwrap();
        let chain = option_chain_parser::parse_chain(&rows()).unwrap();

        let paths = export_chain(&chain, &ExportTarget::new(&dir, "spx", date)).unwrap();

        assert_eq!(
            paths,
            vec![
                dir.join("2018-01-02_spx_expJan-19-18.csv"),
                dir.join("2018-01-02_spx_expFeb-16-18.csv"),
            ]
        );
        let jan = std::fs::read_to_string(&paths[0]).unwrap();
        assert_eq!(jan, "strike,call_Bid,put_Bid\n100.0,1.20,0.80\n105.0,0.90,1.10\n");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn exports_first_expiration_only() {
        let dir = scratch_dir("first");
        let date = NaiveDate::from_ymd_opt(2018, 1, 2).unwrap();
        let rows = rows();
        let first = option_chain_parser::first_expiration(&rows).unwrap();

        let path = export_first_expiration(first, &ExportTarget::new(&dir, "spx", date))
            .unwrap()
            .unwrap();

        assert_eq!(path, dir.join("2018-01-02_spx_expJan-19-18.csv"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Strike,call_Bid,put_Bid\n100.0,1.20,0.80\n105.0,0.90,1.10\n");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn failed_stream_leaves_no_file() {
        let dir = scratch_dir("failed");
        let date = NaiveDate::from_ymd_opt(2018, 1, 2).unwrap();
        let mut rows = rows();
        rows.truncate(3);
        rows.push(
            RawRow::new(["chainrow", "aright"])
                .with_cell(RawCell::new("1.00").with_class("inthemoney"))
                .with_cell(RawCell::new("oops").with_class("strike-col"))
                .with_cells(["2.00"]),
        );
        let first = option_chain_parser::first_expiration(&rows).unwrap();

        let err = export_first_expiration(first, &ExportTarget::new(&dir, "spx", date)).unwrap_err();

        assert!(matches!(
            err,
            ExportError::Chain(ChainError::InvalidNumber { .. })
        ));
        assert!(!dir.join("2018-01-02_spx_expJan-19-18.csv").exists());
        assert!(!dir.join("2018-01-02_spx_expJan-19-18.csv.partial").exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn no_expiration_writes_nothing() {
        let dir = scratch_dir("none");
        let date = NaiveDate::from_ymd_opt(2018, 1, 2).unwrap();
        let rows =
            vec![RawRow::new(["chainrow", "understated"]).with_cells(["Bid", "Strike", "Bid"])];
        let first = option_chain_parser::first_expiration(&rows).unwrap();

        assert!(
            export_first_expiration(first, &ExportTarget::new(&dir, "spx", date))
                .unwrap()
                .is_none()
        );
        assert!(!dir.exists());
    }
}
