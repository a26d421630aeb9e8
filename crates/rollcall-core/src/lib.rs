//! # Rollcall Core
//!
//! The deterministic attendance engine behind Rollcall.
//!
//! Staff upload attendance spreadsheets exported from registration devices,
//! the engine validates every row against the known students and records
//! who attended which lecture. Students, lecturers and administrators then
//! read attendance percentages per module, lecture, student and course.
//!
//! ## Layout
//!
//! - [`model`] - record types (courses, students, staff, modules, lectures)
//! - [`validation`] - field rules and their messages
//! - [`registry`] - the in-memory record store
//! - [`upload`] - spreadsheet row parsing and saving
//! - [`aggregate`] - attendance percentages per entity
//! - [`access`] - who may read what
//! - [`feedback`], [`settings`], [`report`] - the remaining user features
//! - [`formats`], [`storage`] - snapshots, roster files and the redb store
//!
//! ## Constraints
//!
//! - `BTreeMap`/`BTreeSet` only, so every listing has a stable order.
//! - No floating point: percentages are hundredths of a percent.
//! - No I/O outside [`storage`]; the app layer reads and writes files.

pub mod access;
pub mod aggregate;
pub mod error;
pub mod feedback;
pub mod formats;
pub mod model;
pub mod percent;
pub mod registry;
pub mod report;
pub mod settings;
pub mod storage;
pub mod upload;
pub mod validation;

pub use access::Viewer;
pub use error::{FieldError, RollcallError, ValidationErrors};
pub use model::{
    Admin, AttendanceId, Course, CourseId, FeedbackId, Lecture, LectureId, Module, ModuleFeedback,
    ModuleId, Person, Staff, StaffId, Student, StudentAttendance, StudentId,
};
pub use percent::Percentage;
pub use registry::{Registry, RegistrySnapshot};

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, RollcallError>;
