//! Flat-file line codec for the four tables.
//!
//! Each record is one line of comma-separated fields in a fixed order, with
//! enums written as their integer ordinal:
//!
//! ```text
//! users.txt      id,username,password,role
//! inventory.txt  id,name,total,allocated,description...
//! attendees.txt  id,name,contact,event_id,checked_in
//! events.txt     id,name,date,time,location,description,category,status,attendees,allocations
//! ```
//!
//! The event line nests two variable-length collections in its last two
//! fields: attendee ids joined by `;`, and `item_id:quantity` pairs joined by
//! `;`. Either may be empty (`...,2,,`) or omitted (`...,2`).
//!
//! # Limitations
//!
//! There is no quoting or escaping. A free-text value containing `,` `;` or
//! `:` is written verbatim and will split differently on the next load. The
//! inventory description is the exception: it is the last field and is read
//! to the end of the line, so commas survive there.
//!
//! # Failure policy
//!
//! [`LineCodec::decode`] fails with a [`DecodeError`] on a short line, a
//! non-integer numeric field or an unknown ordinal. [`decode_table`] logs a
//! warning for such a line, records a [`Diagnostic`], and keeps going; it
//! never aborts the rest of the table.

mod attendee;
mod event;
mod inventory;
mod user;

use tracing::warn;

use crate::error::ErrorCode;
use crate::repo::Table;

/// Why a table line could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("line is blank")]
    Blank,

    #[error("expected at least {min} comma-separated fields, found {found}")]
    FieldCount { found: usize, min: usize },

    #[error("invalid integer in {field}: '{raw}'")]
    InvalidInteger { field: &'static str, raw: String },

    #[error("unknown role ordinal '{0}'")]
    UnknownRole(String),

    #[error("unknown status ordinal '{0}'")]
    UnknownStatus(String),
}

impl DecodeError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::MalformedRecord
    }
}

/// Encoding and decoding of one record type to a single table line.
pub trait LineCodec: Sized {
    /// The table this record type is stored in.
    const TABLE: Table;

    /// Minimum number of comma-separated fields a line must have.
    const MIN_FIELDS: usize;

    /// Serialize to a single line without a trailing newline. Never fails.
    fn encode(&self) -> String;

    /// Parse a single line (a trailing `\r` or `\n` is ignored).
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the line is blank, too short, or a
    /// numeric field does not parse.
    fn decode(line: &str) -> Result<Self, DecodeError>;
}

/// A skipped line, kept so callers can report what was lost.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Diagnostic {
    pub table: Table,
    /// 1-indexed line number within the table file.
    pub line_no: usize,
    pub line: String,
    pub error: String,
}

/// Result of decoding a whole table: whatever parsed, plus what did not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<T> {
    pub records: Vec<T>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Decode every non-blank line of a table file.
///
/// Malformed lines are logged and returned as diagnostics; they never stop
/// the remaining lines from loading.
pub fn decode_table<T: LineCodec>(input: &str) -> Decoded<T> {
    let mut records = Vec::new();
    let mut diagnostics = Vec::new();

    for (i, line) in input.lines().enumerate() {
        let line_no = i + 1;
        if line.trim().is_empty() {
            continue;
        }
        match T::decode(line) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(
                    table = %T::TABLE,
                    line_no,
                    line,
                    error = %err,
                    "skipping malformed line"
                );
                diagnostics.push(Diagnostic {
                    table: T::TABLE,
                    line_no,
                    line: line.to_string(),
                    error: err.to_string(),
                });
            }
        }
    }

    Decoded {
        records,
        diagnostics,
    }
}

/// Encode records as a whole table file, one newline-terminated line each.
pub fn encode_table<'a, T: LineCodec + 'a>(records: impl IntoIterator<Item = &'a T>) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&record.encode());
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// Field helpers shared by the per-table codecs
// ---------------------------------------------------------------------------

fn strip_line_ending(line: &str) -> &str {
    line.trim_end_matches('\n').trim_end_matches('\r')
}

/// Split off at most `max` fields; the last one keeps any remaining commas.
/// Fails if fewer than `min` fields are present.
fn split_fields(line: &str, min: usize, max: usize) -> Result<Vec<&str>, DecodeError> {
    let line = strip_line_ending(line);
    if line.trim().is_empty() {
        return Err(DecodeError::Blank);
    }
    let fields: Vec<&str> = line.splitn(max, ',').collect();
    if fields.len() < min {
        return Err(DecodeError::FieldCount {
            found: fields.len(),
            min,
        });
    }
    Ok(fields)
}

/// Split on every comma, ignoring fields past `max`.
fn split_fields_truncating(line: &str, min: usize, max: usize) -> Result<Vec<&str>, DecodeError> {
    let line = strip_line_ending(line);
    if line.trim().is_empty() {
        return Err(DecodeError::Blank);
    }
    let fields: Vec<&str> = line.split(',').take(max).collect();
    if fields.len() < min {
        return Err(DecodeError::FieldCount {
            found: fields.len(),
            min,
        });
    }
    Ok(fields)
}

fn parse_u32(field: &'static str, raw: &str) -> Result<u32, DecodeError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| DecodeError::InvalidInteger {
            field,
            raw: raw.to_string(),
        })
}

/// A record's own id. `u32::MAX` is refused: no id can follow it, so the
/// table's allocator could not be seeded past it.
fn parse_id(raw: &str) -> Result<u32, DecodeError> {
    match parse_u32("id", raw)? {
        u32::MAX => Err(DecodeError::InvalidInteger {
            field: "id",
            raw: raw.to_string(),
        }),
        id => Ok(id),
    }
}

fn parse_ordinal(field: &'static str, raw: &str) -> Result<i64, DecodeError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| DecodeError::InvalidInteger {
            field,
            raw: raw.to_string(),
        })
}
