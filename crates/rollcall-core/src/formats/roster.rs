//! JSON roster files: the courses, modules and accounts a term starts with.
//!
//! ```json
//! {
//!   "courses": ["Computing"],
//!   "modules": [{ "module_code": "COM101", "module_crn": "12345" }],
//!   "admins": [{ "username": "admin", "email": "admin@uni.ac.uk" }],
//!   "staff": [{ "username": "E00112233", "first_name": "Grace", "last_name": "Hopper",
//!               "email": "g@uni.ac.uk", "modules": ["COM101"], "courses": ["Computing"] }],
//!   "students": [{ "username": "B00112233", "first_name": "Ada", "last_name": "Lovelace",
//!                  "email": "a@uni.ac.uk", "device_id": "10519C", "course": "Computing",
//!                  "modules": [{ "module_code": "COM101", "module_crn": "12345" }] }]
//! }
//! ```
//!
//! Records that already exist are left alone, so a roster can be applied
//! again after it grows.

use crate::error::RollcallError;
use crate::model::{CourseId, ModuleId, Person};
use crate::registry::Registry;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A module named by code alone, or by code and CRN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModuleRef {
    Code(String),
    Exact {
        module_code: String,
        module_crn: String,
    },
}

impl ModuleRef {
    fn resolve(&self, registry: &Registry) -> Result<ModuleId> {
        let module = match self {
            Self::Code(code) => registry.module_by_code(code, None)?,
            Self::Exact {
                module_code,
                module_crn,
            } => registry.module_by_code(module_code, Some(module_crn))?,
        };
        Ok(module.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterModule {
    pub module_code: String,
    pub module_crn: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterAdmin {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterStaff {
    #[serde(flatten)]
    pub person: Person,
    #[serde(default)]
    pub modules: Vec<ModuleRef>,
    #[serde(default)]
    pub courses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterStudent {
    #[serde(flatten)]
    pub person: Person,
    pub device_id: String,
    pub course: String,
    #[serde(default)]
    pub modules: Vec<ModuleRef>,
}

/// A parsed roster file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Roster {
    pub courses: Vec<String>,
    pub modules: Vec<RosterModule>,
    pub admins: Vec<RosterAdmin>,
    pub staff: Vec<RosterStaff>,
    pub students: Vec<RosterStudent>,
}

/// New records a roster added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RosterSummary {
    pub courses: usize,
    pub modules: usize,
    pub admins: usize,
    pub staff: usize,
    pub students: usize,
    pub enrolments: usize,
}

pub fn parse_roster(text: &str) -> Result<Roster> {
    Ok(serde_json::from_str(text)?)
}

/// Prefix a failure with the record it came from.
fn context<T>(label: &str, result: Result<T>) -> Result<T> {
    result.map_err(|e| match e {
        RollcallError::Invalid(errors) => {
            RollcallError::Format(format!("{label}: {errors}"))
        }
        other => RollcallError::Format(format!("{label}: {other}")),
    })
}

fn course_id(registry: &Registry, code: &str) -> Result<CourseId> {
    registry
        .course_by_code(code)
        .map(|c| c.id)
        .ok_or_else(|| RollcallError::NotFound(format!("Unrecognised course: {code}")))
}

/// Apply a roster. Nothing changes unless every record is accepted.
pub fn apply_roster(registry: &mut Registry, roster: &Roster) -> Result<RosterSummary> {
    let mut staged = registry.clone();
    let mut summary = RosterSummary::default();

    for code in &roster.courses {
        if staged.course_by_code(code.trim()).is_none() {
            context(&format!("course {code}"), staged.add_course(code))?;
            summary.courses = summary.courses.saturating_add(1);
        }
    }

    for module in &roster.modules {
        let known = staged
            .module_by_code(module.module_code.trim(), Some(module.module_crn.trim()))
            .is_ok();
        if !known {
            context(
                &format!("module {}", module.module_code),
                staged.add_module(&module.module_code, &module.module_crn),
            )?;
            summary.modules = summary.modules.saturating_add(1);
        }
    }

    for admin in &roster.admins {
        if staged.admin(admin.username.trim()).is_none() {
            context(
                &format!("admin {}", admin.username),
                staged.add_admin(&admin.username, &admin.email),
            )?;
            summary.admins = summary.admins.saturating_add(1);
        }
    }

    for member in &roster.staff {
        let label = format!("staff {}", member.person.username);
        let id = match staged.staff_by_username(&member.person.username) {
            Some(existing) => existing.id,
            None => {
                summary.staff = summary.staff.saturating_add(1);
                context(&label, staged.add_staff(member.person.clone()))?
            }
        };
        let modules = member
            .modules
            .iter()
            .map(|m| m.resolve(&staged))
            .collect::<Result<BTreeSet<_>>>();
        let courses = member
            .courses
            .iter()
            .map(|c| course_id(&staged, c))
            .collect::<Result<BTreeSet<_>>>();
        let modules = context(&label, modules)?;
        let courses = context(&label, courses)?;
        if !modules.is_empty() || !courses.is_empty() {
            context(&label, staged.assign_staff(id, modules, courses))?;
        }
    }

    for student in &roster.students {
        let label = format!("student {}", student.person.username);
        let id = match staged.student_by_username(&student.person.username) {
            Some(existing) => existing.id,
            None => {
                let course = context(&label, course_id(&staged, &student.course))?;
                summary.students = summary.students.saturating_add(1);
                context(
                    &label,
                    staged.add_student(student.person.clone(), &student.device_id, course),
                )?
            }
        };
        for module in &student.modules {
            let module = context(&label, module.resolve(&staged))?;
            if context(&label, staged.enrol(module, id))? {
                summary.enrolments = summary.enrolments.saturating_add(1);
            }
        }
    }

    *registry = staged;
    Ok(summary)
}
