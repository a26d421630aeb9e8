//! # Records
//!
//! The attendance records Rollcall keeps. Every record is owned by the
//! [`Registry`](crate::Registry); relations are stored as ids so records can
//! be serialized independently.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// =============================================================================
// IDENTIFIERS
// =============================================================================

macro_rules! record_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Identifies a [`Course`].
    CourseId
);
record_id!(
    /// Identifies a [`Student`].
    StudentId
);
record_id!(
    /// Identifies a [`Staff`] member.
    StaffId
);
record_id!(
    /// Identifies a [`Module`].
    ModuleId
);
record_id!(
    /// Identifies a [`Lecture`].
    LectureId
);
record_id!(
    /// Identifies a [`StudentAttendance`] record.
    AttendanceId
);
record_id!(
    /// Identifies a [`ModuleFeedback`] entry.
    FeedbackId
);

// =============================================================================
// PEOPLE
// =============================================================================

/// Account details shared by students and staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Person {
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
        }
    }

    /// "First Last", or the username when no name is on record.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim();
        if name.is_empty() {
            self.username.clone()
        } else {
            name.to_string()
        }
    }
}

/// A degree course students are registered on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub course_code: String,
}

/// A student. Found during upload by device ID or username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub person: Person,
    pub device_id: String,
    pub course: CourseId,
}

/// A lecturer. `modules` and `courses` are the ones they chose to follow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub person: Person,
    pub modules: BTreeSet<ModuleId>,
    pub courses: BTreeSet<CourseId>,
}

/// A superuser who can see every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    pub username: String,
    pub email: String,
}

// =============================================================================
// TEACHING
// =============================================================================

/// A course unit, identified by its code and CRN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub module_code: String,
    pub module_crn: String,
    pub students: BTreeSet<StudentId>,
    pub courses: BTreeSet<CourseId>,
}

impl Module {
    #[must_use]
    pub fn is_enrolled(&self, student: StudentId) -> bool {
        self.students.contains(&student)
    }
}

/// One scheduled session of a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lecture {
    pub id: LectureId,
    pub module: ModuleId,
    pub session_id: String,
    pub date: NaiveDate,
}

/// Whether a student attended a lecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentAttendance {
    pub id: AttendanceId,
    pub student: StudentId,
    pub lecture: LectureId,
    pub attended: bool,
}

/// Free-text feedback a student left for a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleFeedback {
    pub id: FeedbackId,
    pub module: ModuleId,
    pub student: StudentId,
    pub general: String,
    pub positive: String,
    pub constructive: String,
    pub other: String,
    pub date: NaiveDate,
    pub anonymous: bool,
}
