//! # Attendance Uploads
//!
//! Spreadsheets exported from registration devices, parsed in two steps:
//! - [`rows`] validates the session header and each student row.
//! - [`saver`] reads the CSV, validates the whole file, then writes it
//!   into the [`Registry`](crate::Registry).

pub mod rows;
pub mod saver;

pub use rows::{AttendanceRow, Mark, RowError, Session, SessionHeaderRow, StudentLookup};
pub use saver::{DataSaver, UploadFile, UploadOutcome, UploadSummary, example_template, upload_files};
