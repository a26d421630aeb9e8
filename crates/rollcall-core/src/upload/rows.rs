//! Row parsing for attendance spreadsheets.
//!
//! A device export looks like:
//!
//! ```text
//! Device ID(s) | Last Name | First Name | 25/09/2017⏎170925 1228 | 26/09/2017⏎EEE122 170926 1138
//! 10519C       | Smith     | Jane       | ✔                      | ✘
//! ```
//!
//! Column numbers in messages are 1-based, as a spreadsheet shows them.

use crate::model::StudentId;
use crate::registry::Registry;
use chrono::NaiveDate;
use thiserror::Error;

/// First cell of the row that names the sessions.
pub const HEADER_MARKER: &str = "Device ID(s)";

/// Device ID, Last Name and First Name come before the session columns.
pub const LEADING_COLUMNS: usize = 3;

const DATE_FORMAT: &str = "%d/%m/%Y";

/// Marks meaning "attended". Compared lowercased and trimmed.
///
/// The last entry is the tick glyph after a UTF-8 file was saved as Latin-1.
const ATTENDED_MARKS: [&str; 4] = ["y", "1", "\u{2714}", "\u{e2}\u{153}\u{201d}"];

/// Marks meaning "absent".
const ABSENT_MARKS: [&str; 4] = ["n", "0", "\u{2718}", "\u{e2}\u{153}\u{2dc}"];

/// A row failed validation. The message lists every problem found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct RowError(pub String);

/// Finds the student an upload row refers to.
pub trait StudentLookup {
    /// Student for a device ID or username, already trimmed.
    fn lookup_student(&self, key: &str) -> Option<StudentId>;
}

impl StudentLookup for Registry {
    fn lookup_student(&self, key: &str) -> Option<StudentId> {
        self.find_student(key).map(|s| s.id)
    }
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Lines of a cell, breaking on every line separator a spreadsheet may
/// write, including a bare `\r`. `\r\n` is one break and a trailing break
/// adds no empty line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((index, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        lines.push(&text[start..index]);
        start = index + c.len_utf8();
        if c == '\r' && chars.next_if(|&(_, next)| next == '\n').is_some() {
            start += 1;
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// 1-based spreadsheet column for a 0-based cell index.
fn column(index: usize) -> usize {
    index.saturating_add(1)
}

// =============================================================================
// SESSION HEADER
// =============================================================================

/// One session column: when it ran and the device's session id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub date: NaiveDate,
    pub session_id: String,
}

/// The header row naming every session in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHeaderRow {
    pub sessions: Vec<Session>,
}

impl SessionHeaderRow {
    /// Whether a row is the session header.
    pub fn is_header<S: AsRef<str>>(cells: &[S]) -> bool {
        cells
            .first()
            .is_some_and(|first| first.as_ref().trim() == HEADER_MARKER)
    }

    /// Parse every session cell. Stops at the first bad cell.
    pub fn parse<S: AsRef<str>>(cells: &[S]) -> Result<Self, RowError> {
        let mut sessions = Vec::new();

        for (index, cell) in cells.iter().enumerate().skip(LEADING_COLUMNS) {
            let cell = cell.as_ref();
            let col = column(index);

            if cell.is_empty() {
                return Err(RowError(format!(
                    "Unexpected empty session data at column {col}"
                )));
            }

            let parts = split_lines(cell);
            let [date, session_id] = parts.as_slice() else {
                return Err(RowError(format!(
                    "Expected newline to separate date and session id for: {cell} at column {col}"
                )));
            };
            let (date, session_id) = (date.trim(), session_id.trim());

            if date.is_empty() {
                return Err(RowError(format!("Unexpected empty date at column {col}")));
            }
            if session_id.is_empty() {
                return Err(RowError(format!(
                    "Unexpected empty session id at column {col}"
                )));
            }

            let date = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| {
                RowError(format!(
                    "Incorrect date format: {date}, should be DD/MM/YYYY at column {col}"
                ))
            })?;

            sessions.push(Session {
                date,
                session_id: session_id.to_string(),
            });
        }

        Ok(Self { sessions })
    }
}

// =============================================================================
// ATTENDANCE ROW
// =============================================================================

/// Attendance for one session in a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mark {
    pub session: Session,
    pub attended: bool,
}

/// One student's row: who they are and a mark per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRow {
    /// The device ID or username as written in the file.
    pub key: String,
    pub student: StudentId,
    pub marks: Vec<Mark>,
}

/// `Some(true)` for attended, `Some(false)` for absent, `None` if unknown.
#[must_use]
pub fn parse_mark(value: &str) -> Option<bool> {
    let value = value.trim().to_lowercase();
    if ATTENDED_MARKS.contains(&value.as_str()) {
        Some(true)
    } else if ABSENT_MARKS.contains(&value.as_str()) {
        Some(false)
    } else {
        None
    }
}

impl AttendanceRow {
    /// Parse a student row against the header's sessions.
    ///
    /// A column count mismatch is reported on its own. Otherwise an unknown
    /// student and every unknown mark are reported together.
    pub fn parse<S, L>(header: &SessionHeaderRow, cells: &[S], lookup: &L) -> Result<Self, RowError>
    where
        S: AsRef<str>,
        L: StudentLookup + ?Sized,
    {
        let key = cells
            .first()
            .map(|c| c.as_ref().trim().to_string())
            .unwrap_or_default();
        let data = cells.get(LEADING_COLUMNS..).unwrap_or_default();

        if data.len() != header.sessions.len() {
            return Err(RowError(format!(
                "Number of data columns doesn't match number of sessions. Expected {} but found {}",
                header.sessions.len(),
                data.len()
            )));
        }

        let mut problems = Vec::new();
        let student = lookup.lookup_student(&key);
        if student.is_none() {
            problems.push(format!("Unrecognised student: {key}"));
        }

        let mut marks = Vec::with_capacity(data.len());
        for (offset, (value, session)) in data.iter().zip(&header.sessions).enumerate() {
            let value = value.as_ref().trim();
            match parse_mark(value) {
                Some(attended) => marks.push(Mark {
                    session: session.clone(),
                    attended,
                }),
                None => problems.push(format!(
                    "Unrecognised attendance value for {key}: {value} at column {}",
                    column(LEADING_COLUMNS.saturating_add(offset))
                )),
            }
        }

        match student {
            Some(student) if problems.is_empty() => Ok(Self {
                key,
                student,
                marks,
            }),
            _ => Err(RowError(problems.join(", "))),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
