//! # Access Rules
//!
//! Who may read which records. Every view resolves its viewer first and
//! then asks this module for the record, so the rules live in one place.

use crate::error::RollcallError;
use crate::model::{Course, CourseId, Lecture, LectureId, Module, ModuleId, Staff, StaffId, Student, StudentId};
use crate::registry::Registry;
use crate::Result;
use serde::Serialize;
use std::collections::BTreeSet;

pub const NOT_AUTHORISED_MODULE: &str = "Not authorised to view this module";
pub const NOT_AUTHORISED_LECTURER: &str = "Not authorised to view this lecturer";
pub const NOT_AUTHORISED_STUDENT: &str = "Not authorised to view this student";
pub const NOT_AUTHORISED_LECTURE: &str = "Not authorised to view this lecture";
pub const NOT_AUTHORISED_FEEDBACK: &str = "Not authorised to give feedback for this module";
pub const NOT_AUTHORISED_PAGE: &str = "Not authorised to view this page";

pub const MODULE_MISSING: &str = "Module does not exist";
pub const COURSE_MISSING: &str = "Course does not exist";
pub const LECTURER_MISSING: &str = "Lecturer does not exist";
pub const STUDENT_MISSING: &str = "Student does not exist";
pub const LECTURE_MISSING: &str = "Lecture does not exist";

fn refuse<T>(message: &str) -> Result<T> {
    Err(RollcallError::NotAuthorised(message.to_string()))
}

fn missing(message: &str) -> RollcallError {
    RollcallError::NotFound(message.to_string())
}

/// The user a request is made as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Viewer {
    Admin(String),
    Staff(StaffId),
    Student(StudentId),
}

impl Viewer {
    /// Look a username up as admin, then staff, then student.
    pub fn resolve(registry: &Registry, username: &str) -> Result<Self> {
        let username = username.trim();
        if let Some(admin) = registry.admin(username) {
            return Ok(Self::Admin(admin.username.clone()));
        }
        if let Some(staff) = registry.staff_by_username(username) {
            return Ok(Self::Staff(staff.id));
        }
        if let Some(student) = registry.student_by_username(username) {
            return Ok(Self::Student(student.id));
        }
        Err(RollcallError::Unauthorised(username.to_string()))
    }

    /// The student id when the viewer is a student.
    #[must_use]
    pub fn student(&self) -> Option<StudentId> {
        match self {
            Self::Student(id) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin(_))
    }

    /// Username and email, for settings and report delivery.
    #[must_use]
    pub fn contact<'a>(&'a self, registry: &'a Registry) -> Option<(&'a str, &'a str)> {
        match self {
            Self::Admin(username) => registry
                .admin(username)
                .map(|a| (a.username.as_str(), a.email.as_str())),
            Self::Staff(id) => registry
                .staff_member(*id)
                .map(|s| (s.person.username.as_str(), s.person.email.as_str())),
            Self::Student(id) => registry
                .student(*id)
                .map(|s| (s.person.username.as_str(), s.person.email.as_str())),
        }
    }
}

// =============================================================================
// RECORD ACCESS
// =============================================================================

/// A module. Students must be enrolled on it.
pub fn module<'a>(registry: &'a Registry, viewer: &Viewer, id: ModuleId) -> Result<&'a Module> {
    let module = registry.module(id).ok_or_else(|| missing(MODULE_MISSING))?;
    match viewer.student() {
        Some(student) if !module.is_enrolled(student) => refuse(NOT_AUTHORISED_MODULE),
        _ => Ok(module),
    }
}

/// A course. Students may not view courses.
pub fn course<'a>(registry: &'a Registry, viewer: &Viewer, id: CourseId) -> Result<&'a Course> {
    if viewer.student().is_some() {
        return refuse(NOT_AUTHORISED_LECTURER);
    }
    registry.course(id).ok_or_else(|| missing(COURSE_MISSING))
}

/// A lecturer. Students may not view lecturers.
pub fn lecturer<'a>(registry: &'a Registry, viewer: &Viewer, id: StaffId) -> Result<&'a Staff> {
    let lecturer = registry
        .staff_member(id)
        .ok_or_else(|| missing(LECTURER_MISSING))?;
    if viewer.student().is_some() {
        return refuse(NOT_AUTHORISED_LECTURER);
    }
    Ok(lecturer)
}

/// A student. Students may only view themselves.
pub fn student<'a>(registry: &'a Registry, viewer: &Viewer, id: StudentId) -> Result<&'a Student> {
    let student = registry.student(id).ok_or_else(|| missing(STUDENT_MISSING))?;
    match viewer.student() {
        Some(own) if own != id => refuse(NOT_AUTHORISED_STUDENT),
        _ => Ok(student),
    }
}

/// A lecture. Students must be enrolled on its module.
pub fn lecture<'a>(registry: &'a Registry, viewer: &Viewer, id: LectureId) -> Result<&'a Lecture> {
    let lecture = registry.lecture(id).ok_or_else(|| missing(LECTURE_MISSING))?;
    if let Some(student) = viewer.student() {
        let enrolled = registry
            .module(lecture.module)
            .is_some_and(|m| m.is_enrolled(student));
        if !enrolled {
            return refuse(NOT_AUTHORISED_LECTURE);
        }
    }
    Ok(lecture)
}

/// The student giving feedback on a module. Only enrolled students may.
pub fn feedback_giver<'a>(
    registry: &'a Registry,
    viewer: &Viewer,
    id: ModuleId,
) -> Result<(StudentId, &'a Module)> {
    let Some(student) = viewer.student() else {
        return refuse(NOT_AUTHORISED_FEEDBACK);
    };
    let module = module(registry, viewer, id)?;
    Ok((student, module))
}

/// Staff-only pages such as the module and course view selection.
pub fn staff_only(viewer: &Viewer) -> Result<StaffId> {
    match viewer {
        Viewer::Staff(id) => Ok(*id),
        _ => refuse(NOT_AUTHORISED_PAGE),
    }
}

/// Admin-only pages such as the upload template.
pub fn admin_only(viewer: &Viewer) -> Result<()> {
    if viewer.is_admin() {
        Ok(())
    } else {
        refuse(NOT_AUTHORISED_PAGE)
    }
}

// =============================================================================
// INDEX
// =============================================================================

/// Records listed on a viewer's landing page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Index<'a> {
    pub modules: Vec<&'a Module>,
    pub lecturers: Vec<&'a Staff>,
    pub students: Vec<&'a Student>,
    pub lectures: Vec<&'a Lecture>,
}

/// Everything an admin may open. Staff get the modules they follow, the
/// students enrolled on them and their lectures. Students get their modules,
/// the lecturers following those and their lectures.
#[must_use]
pub fn index<'a>(registry: &'a Registry, viewer: &Viewer) -> Index<'a> {
    match viewer {
        Viewer::Admin(_) => Index {
            modules: registry.modules().collect(),
            lecturers: registry.staff().collect(),
            students: registry.students().collect(),
            lectures: registry.lectures().collect(),
        },
        Viewer::Staff(id) => {
            let modules: Vec<&Module> = registry
                .staff_member(*id)
                .map(|s| s.modules.iter().filter_map(|m| registry.module(*m)).collect())
                .unwrap_or_default();
            let students: BTreeSet<StudentId> = modules
                .iter()
                .flat_map(|m| m.students.iter().copied())
                .collect();
            Index {
                students: students
                    .into_iter()
                    .filter_map(|s| registry.student(s))
                    .collect(),
                lectures: lectures_on(registry, &modules),
                modules,
                lecturers: Vec::new(),
            }
        }
        Viewer::Student(id) => {
            let modules: Vec<&Module> = registry.modules_of_student(*id).collect();
            let lecturers = registry
                .staff()
                .filter(|s| modules.iter().any(|m| s.modules.contains(&m.id)))
                .collect();
            Index {
                lecturers,
                lectures: lectures_on(registry, &modules),
                modules,
                students: Vec::new(),
            }
        }
    }
}

fn lectures_on<'a>(registry: &'a Registry, modules: &[&Module]) -> Vec<&'a Lecture> {
    registry
        .lectures()
        .filter(|l| modules.iter().any(|m| m.id == l.module))
        .collect()
}
