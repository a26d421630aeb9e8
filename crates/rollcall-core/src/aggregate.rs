//! # Attendance Aggregation
//!
//! Percentages per module, student, lecturer, course and lecture.
//!
//! A student's percentage is attended / recorded over their own records.
//! Module and course figures average the student percentages, so a student
//! with few records weighs the same as one with many.

use crate::access::Viewer;
use crate::model::{
    AttendanceId, Course, Lecture, LectureId, Module, ModuleId, Staff, StudentId,
};
use crate::percent::Percentage;
use crate::registry::Registry;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Inclusive range of lecture dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    #[must_use]
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// Attended and absent shares, for an overview chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttendanceSplit {
    pub attended: Percentage,
    pub absent: Percentage,
}

impl From<Percentage> for AttendanceSplit {
    fn from(attended: Percentage) -> Self {
        Self {
            attended,
            absent: attended.complement(),
        }
    }
}

/// One attendance record with its lecture details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceEntry {
    pub id: AttendanceId,
    pub student: StudentId,
    pub lecture: LectureId,
    pub date: NaiveDate,
    pub session_id: String,
    pub attended: bool,
}

impl AttendanceEntry {
    fn new(id: AttendanceId, student: StudentId, lecture: &Lecture, attended: bool) -> Self {
        Self {
            id,
            student,
            lecture: lecture.id,
            date: lecture.date,
            session_id: lecture.session_id.clone(),
            attended,
        }
    }
}

fn tally(entries: &[AttendanceEntry]) -> (usize, Percentage) {
    let attended = entries.iter().filter(|e| e.attended).count();
    (attended, Percentage::from_ratio(attended as u64, entries.len() as u64))
}

// =============================================================================
// MODULE
// =============================================================================

/// One student's attendance on a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentSummary {
    pub student: StudentId,
    pub entries: Vec<AttendanceEntry>,
    pub attended: usize,
    pub percent: Percentage,
}

/// Attendance at one lecture, against every student with records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LecturePercent {
    pub lecture: LectureId,
    pub date: NaiveDate,
    pub session_id: String,
    pub attended: usize,
    pub percent: Percentage,
}

/// Everything the module view shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleData {
    pub module: ModuleId,
    pub module_code: String,
    pub students: Vec<StudentSummary>,
    pub lectures: Vec<LecturePercent>,
    pub overall: Percentage,
}

impl ModuleData {
    #[must_use]
    pub fn split(&self) -> AttendanceSplit {
        self.overall.into()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}

/// Attendance for a module, optionally limited to a date range.
///
/// A student viewer only sees their own records.
#[must_use]
pub fn module_data(
    registry: &Registry,
    module: &Module,
    viewer: &Viewer,
    range: Option<DateRange>,
) -> ModuleData {
    collect_module(registry, module, viewer.student(), range)
}

fn collect_module(
    registry: &Registry,
    module: &Module,
    only: Option<StudentId>,
    range: Option<DateRange>,
) -> ModuleData {
    let lectures: BTreeMap<LectureId, &Lecture> = registry
        .lectures_of(module.id)
        .filter(|l| range.is_none_or(|r| r.contains(l.date)))
        .map(|l| (l.id, l))
        .collect();

    let mut grouped: BTreeMap<StudentId, Vec<AttendanceEntry>> = BTreeMap::new();
    for record in registry.attendances() {
        if only.is_some_and(|s| s != record.student) {
            continue;
        }
        if let Some(lecture) = lectures.get(&record.lecture) {
            grouped
                .entry(record.student)
                .or_default()
                .push(AttendanceEntry::new(record.id, record.student, lecture, record.attended));
        }
    }

    let mut per_lecture: BTreeMap<(NaiveDate, String, LectureId), usize> = BTreeMap::new();
    let mut students = Vec::with_capacity(grouped.len());
    for (student, mut entries) in grouped {
        entries.sort_by(|a, b| (a.date, &a.session_id).cmp(&(b.date, &b.session_id)));
        for entry in &entries {
            let count = per_lecture
                .entry((entry.date, entry.session_id.clone(), entry.lecture))
                .or_default();
            if entry.attended {
                *count = count.saturating_add(1);
            }
        }
        let (attended, percent) = tally(&entries);
        students.push(StudentSummary {
            student,
            entries,
            attended,
            percent,
        });
    }

    let headcount = students.len() as u64;
    let lectures = per_lecture
        .into_iter()
        .map(|((date, session_id, lecture), attended)| LecturePercent {
            lecture,
            date,
            session_id,
            attended,
            percent: Percentage::from_ratio(attended as u64, headcount),
        })
        .collect();
    let overall = Percentage::average(students.iter().map(|s| s.percent));

    ModuleData {
        module: module.id,
        module_code: module.module_code.clone(),
        students,
        lectures,
        overall,
    }
}

// =============================================================================
// STUDENT
// =============================================================================

/// A student's attendance on one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleAttendance {
    pub module: ModuleId,
    pub module_code: String,
    pub entries: Vec<AttendanceEntry>,
    pub attended: usize,
    pub percent: Percentage,
}

/// A student's attendance grouped by module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentOverview {
    pub student: StudentId,
    pub modules: Vec<ModuleAttendance>,
    pub overall: Percentage,
}

/// Modules appear in the order of the student's earliest lecture on each.
#[must_use]
pub fn student_overview(registry: &Registry, student: StudentId) -> StudentOverview {
    let mut entries: Vec<(ModuleId, AttendanceEntry)> = registry
        .attendances_of_student(student)
        .filter_map(|record| {
            let lecture = registry.lecture(record.lecture)?;
            Some((
                lecture.module,
                AttendanceEntry::new(record.id, student, lecture, record.attended),
            ))
        })
        .collect();
    entries.sort_by(|(_, a), (_, b)| (a.date, &a.session_id).cmp(&(b.date, &b.session_id)));

    let mut modules: Vec<ModuleAttendance> = Vec::new();
    for (module, entry) in entries {
        match modules.iter_mut().find(|m| m.module == module) {
            Some(group) => group.entries.push(entry),
            None => modules.push(ModuleAttendance {
                module,
                module_code: registry
                    .module(module)
                    .map(|m| m.module_code.clone())
                    .unwrap_or_default(),
                entries: vec![entry],
                attended: 0,
                percent: Percentage::ZERO,
            }),
        }
    }
    for group in &mut modules {
        (group.attended, group.percent) = tally(&group.entries);
    }

    let overall = Percentage::average(modules.iter().map(|m| m.percent));
    StudentOverview {
        student,
        modules,
        overall,
    }
}

// =============================================================================
// LECTURER AND COURSE
// =============================================================================

/// One module's percentage in a lecturer or course overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModulePercent {
    pub module: ModuleId,
    pub module_code: String,
    pub percent: Percentage,
}

/// Per-module percentages with their average.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub modules: Vec<ModulePercent>,
    pub overall: Percentage,
}

impl Overview {
    fn from_modules(modules: Vec<ModulePercent>) -> Self {
        let overall = Percentage::average(modules.iter().map(|m| m.percent));
        Self { modules, overall }
    }

    #[must_use]
    pub fn split(&self) -> AttendanceSplit {
        self.overall.into()
    }
}

/// Attended over recorded, across every record of each of the lecturer's
/// modules. A module with no records is 0%.
#[must_use]
pub fn lecturer_overview(registry: &Registry, lecturer: &Staff) -> Overview {
    let modules = lecturer
        .modules
        .iter()
        .filter_map(|id| registry.module(*id))
        .map(|module| {
            let (mut attended, mut total) = (0u64, 0u64);
            for lecture in registry.lectures_of(module.id) {
                for record in registry.attendances_for_lecture(lecture.id) {
                    total = total.saturating_add(1);
                    if record.attended {
                        attended = attended.saturating_add(1);
                    }
                }
            }
            ModulePercent {
                module: module.id,
                module_code: module.module_code.clone(),
                percent: Percentage::from_ratio(attended, total),
            }
        })
        .collect();
    Overview::from_modules(modules)
}

/// Average student percentage of every module linked to the course.
#[must_use]
pub fn course_overview(registry: &Registry, course: &Course) -> Overview {
    let modules = registry
        .modules_of_course(course.id)
        .map(|module| ModulePercent {
            module: module.id,
            module_code: module.module_code.clone(),
            percent: collect_module(registry, module, None, None).overall,
        })
        .collect();
    Overview::from_modules(modules)
}

// =============================================================================
// LECTURE
// =============================================================================

/// Attendance at a single lecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LectureData {
    pub lecture: LectureId,
    pub module: ModuleId,
    pub date: NaiveDate,
    pub session_id: String,
    pub entries: Vec<AttendanceEntry>,
    pub attended: usize,
    pub percent: Percentage,
}

impl LectureData {
    #[must_use]
    pub fn split(&self) -> AttendanceSplit {
        self.percent.into()
    }
}

/// Records for one lecture, by student. A student viewer sees only their own.
#[must_use]
pub fn lecture_overview(registry: &Registry, lecture: &Lecture, viewer: &Viewer) -> LectureData {
    let only = viewer.student();
    let mut entries: Vec<AttendanceEntry> = registry
        .attendances_for_lecture(lecture.id)
        .filter(|record| only.is_none_or(|s| s == record.student))
        .map(|record| AttendanceEntry::new(record.id, record.student, lecture, record.attended))
        .collect();
    entries.sort_by_key(|e| e.student);
    let (attended, percent) = tally(&entries);

    LectureData {
        lecture: lecture.id,
        module: lecture.module,
        date: lecture.date,
        session_id: lecture.session_id.clone(),
        entries,
        attended,
        percent,
    }
}
