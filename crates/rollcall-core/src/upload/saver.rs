//! Reads a CSV upload, validates every row and saves the attendance.

use super::rows::{AttendanceRow, SessionHeaderRow, StudentLookup};
use crate::error::RollcallError;
use crate::model::{CourseId, ModuleId, StudentId};
use crate::registry::{AttendanceChange, Registry};
use crate::Result;
use serde::Serialize;
use std::collections::BTreeSet;

pub const INVALID_FILE_TYPE: &str = "Invalid file type. Only csv files are accepted.";
pub const NO_FILE: &str = "No file uploaded. Please upload a .csv file.";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// An uploaded file as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub contents: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }

    fn is_csv(&self) -> bool {
        self.name.to_ascii_lowercase().ends_with(".csv")
    }
}

/// What a successful upload changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    pub file: String,
    pub module: ModuleId,
    pub rows: usize,
    pub students_enrolled: usize,
    pub lectures_created: usize,
    pub attendances_created: usize,
    pub attendances_updated: usize,
    pub courses_linked: Vec<CourseId>,
}

/// Results of a multi-file upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadOutcome {
    pub saved: Vec<UploadSummary>,
    pub errors: Vec<String>,
}

impl UploadOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A file that passed validation, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUpload {
    pub header: Option<SessionHeaderRow>,
    pub rows: Vec<AttendanceRow>,
}

fn offset(position: &csv::Position) -> usize {
    usize::try_from(position.byte()).unwrap_or(usize::MAX)
}

/// Empty lines read ahead of a record. The reader skips them, but each
/// one is still a row of the sheet. A `\n` finishing the previous
/// record's `\r\n` is not a line of its own.
fn blank_lines(consumed: &[u8], after_cr: bool) -> usize {
    let consumed = match consumed {
        [b'\n', rest @ ..] if after_cr => rest,
        _ => consumed,
    };
    let mut blanks = 0;
    let mut bytes = consumed.iter().peekable();
    while let Some(&byte) = bytes.next() {
        match byte {
            b'\r' => {
                bytes.next_if_eq(&&b'\n');
                blanks += 1;
            }
            b'\n' => blanks += 1,
            _ => break,
        }
    }
    blanks
}

// =============================================================================
// DATA SAVER
// =============================================================================

/// Validates and saves attendance spreadsheets.
pub struct DataSaver;

impl DataSaver {
    /// Validate a file without touching the registry.
    ///
    /// Rows before the `Device ID(s)` header are ignored, as are rows whose
    /// cells are all blank. A file without a header parses to nothing.
    /// Error line numbers are 0-based rows, counting empty lines as rows.
    pub fn parse<L>(file: &UploadFile, lookup: &L) -> Result<ParsedUpload>
    where
        L: StudentLookup + ?Sized,
    {
        if !file.is_csv() {
            return Err(RollcallError::Upload(INVALID_FILE_TYPE.into()));
        }

        let contents = file
            .contents
            .strip_prefix(UTF8_BOM)
            .unwrap_or(file.contents.as_slice());
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(contents);

        let mut header: Option<SessionHeaderRow> = None;
        let mut rows = Vec::new();
        let mut record = csv::StringRecord::new();
        let mut line = 0usize;
        let mut after_cr = false;

        loop {
            let start = offset(reader.position());
            let more = reader
                .read_record(&mut record)
                .map_err(|e| RollcallError::Upload(format!("Could not read file: {e}")))?;
            if !more {
                break;
            }
            let consumed = contents
                .get(start..offset(reader.position()))
                .unwrap_or_default();
            line += blank_lines(consumed, after_cr);
            after_cr = consumed.last() == Some(&b'\r');

            let cells: Vec<&str> = record.iter().collect();
            if cells.iter().all(|cell| cell.trim().is_empty()) {
                line += 1;
                continue;
            }

            if let Some(sessions) = &header {
                let row = AttendanceRow::parse(sessions, &cells, lookup).map_err(|e| {
                    RollcallError::Upload(format!("Error with inputs: [[{}]] at line {line}", e.0))
                })?;
                rows.push(row);
            } else if SessionHeaderRow::is_header(&cells) {
                header =
                    Some(SessionHeaderRow::parse(&cells).map_err(|e| RollcallError::Upload(e.0))?);
            }
            line += 1;
        }

        Ok(ParsedUpload { header, rows })
    }

    /// Validate a file and, if every row is good, write it to the registry.
    pub fn save(registry: &mut Registry, module: ModuleId, file: &UploadFile) -> Result<UploadSummary> {
        if registry.module(module).is_none() {
            return Err(RollcallError::NotFound("Module does not exist".into()));
        }
        let parsed = Self::parse(file, &*registry)?;
        Self::apply(registry, module, &file.name, parsed)
    }

    fn apply(
        registry: &mut Registry,
        module: ModuleId,
        file: &str,
        parsed: ParsedUpload,
    ) -> Result<UploadSummary> {
        let mut summary = UploadSummary {
            file: file.to_string(),
            module,
            rows: parsed.rows.len(),
            ..UploadSummary::default()
        };
        let mut courses = BTreeSet::new();
        let mut students: BTreeSet<StudentId> = BTreeSet::new();

        for row in parsed.rows {
            if let Some(student) = registry.student(row.student) {
                courses.insert(student.course);
            }
            if registry.enrol(module, row.student)? {
                students.insert(row.student);
            }

            for mark in row.marks {
                let (lecture, created) =
                    registry.lecture_for(module, &mark.session.session_id, mark.session.date)?;
                if created {
                    summary.lectures_created = summary.lectures_created.saturating_add(1);
                }
                match registry.record_attendance(row.student, lecture, mark.attended)? {
                    AttendanceChange::Created => {
                        summary.attendances_created = summary.attendances_created.saturating_add(1);
                    }
                    AttendanceChange::Updated => {
                        summary.attendances_updated = summary.attendances_updated.saturating_add(1);
                    }
                    AttendanceChange::Unchanged => {}
                }
            }
        }

        for course in courses {
            if registry.link_course(module, course)? {
                summary.courses_linked.push(course);
            }
        }
        summary.students_enrolled = students.len();

        Ok(summary)
    }
}

/// Save each file on its own.
///
/// A failed file is reported and skipped; files already saved stay saved.
pub fn upload_files(
    registry: &mut Registry,
    module: ModuleId,
    files: &[UploadFile],
) -> Result<UploadOutcome> {
    if files.is_empty() {
        return Err(RollcallError::Upload(NO_FILE.into()));
    }

    let mut outcome = UploadOutcome::default();
    for file in files {
        match DataSaver::save(registry, module, file) {
            Ok(summary) => outcome.saved.push(summary),
            Err(e) => outcome
                .errors
                .push(format!("Error processing file {}: {e}", file.name)),
        }
    }
    Ok(outcome)
}

/// The example spreadsheet offered for download.
#[must_use]
pub fn example_template() -> String {
    [
        "Attendance export,,,,",
        "Device ID(s),Last Name,First Name,\"25/09/2017\n170925 1228\",\"26/09/2017\nEEE122 170926 1138\"",
        "10519C,Smith,Jane,\u{2714},\u{2718}",
        "B00987654,Doe,John,Y,N",
        "",
    ]
    .join("\r\n")
}

// =============================================================================
// TESTS
// =============================================================================
