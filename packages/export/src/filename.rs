//! Output filenames.
//!
//! Expiration labels contain quotes and spaces (`Jan 19 '18`), so they are
//! reduced to a filesystem-safe form before being used in a filename.

use chrono::NaiveDate;

/// Keeps only ASCII letters, digits, and spaces, then drops trailing
/// spaces.
#[must_use]
pub fn clean_filename(s: &str) -> String {
    let kept: String = s
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect();
    kept.trim_end().to_owned()
}

/// `{date}_{ticker}_exp{expiration}.{extension}`, with the ticker and
/// expiration cleaned and their spaces replaced by `-`.
#[must_use]
pub fn secure_filename(
    date: NaiveDate,
    ticker: &str,
    expiration: &str,
    extension: &str,
) -> String {
    let ticker = clean_filename(ticker).replace(' ', "-");
    let expiration = clean_filename(expiration).replace(' ', "-");
    format!("{date}_{ticker}_exp{expiration}.{extension}")
}
