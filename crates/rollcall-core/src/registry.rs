//! # Registry
//!
//! The in-memory record store for Rollcall.
//!
//! All collections use `BTreeMap` keyed by id, so iteration follows creation
//! order and every listing is deterministic. Records are only created through
//! the methods here, which run the [`validation`](crate::validation) rules
//! and keep the secondary indexes in step.

use crate::error::{RECORD_FIELD, RollcallError, ValidationErrors};
use crate::model::{
    Admin, AttendanceId, Course, CourseId, FeedbackId, Lecture, LectureId, Module, ModuleFeedback,
    ModuleId, Person, Staff, StaffId, Student, StudentAttendance, StudentId,
};
use crate::settings::UserSettings;
use crate::validation::{self as rules};
use crate::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const DUPLICATE_MODULE: &str = "Module with this Module code and Module crn already exists.";
pub const DUPLICATE_COURSE: &str = "Course with this Course code already exists.";
pub const DUPLICATE_USERNAME: &str = "User with this Username already exists.";
pub const DUPLICATE_EMAIL: &str = "User with this Email already exists.";
pub const DUPLICATE_DEVICE_ID: &str = "Student with this Device ID already exists.";
pub const UNKNOWN_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

// =============================================================================
// ID COUNTERS
// =============================================================================

/// Next id to hand out for each record kind. Ids start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdCounters {
    pub course: u64,
    pub student: u64,
    pub staff: u64,
    pub module: u64,
    pub lecture: u64,
    pub attendance: u64,
    pub feedback: u64,
}

impl Default for IdCounters {
    fn default() -> Self {
        Self {
            course: 1,
            student: 1,
            staff: 1,
            module: 1,
            lecture: 1,
            attendance: 1,
            feedback: 1,
        }
    }
}

fn take(counter: &mut u64) -> u64 {
    let id = *counter;
    *counter = counter.saturating_add(1);
    id
}

// =============================================================================
// CHANGE REPORTING
// =============================================================================

/// What [`Registry::record_attendance`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceChange {
    Created,
    Updated,
    Unchanged,
}

/// Record counts, for status output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub courses: usize,
    pub students: usize,
    pub staff: usize,
    pub admins: usize,
    pub modules: usize,
    pub lectures: usize,
    pub attendances: usize,
    pub feedback: usize,
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Every record Rollcall knows about.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    courses: BTreeMap<CourseId, Course>,
    students: BTreeMap<StudentId, Student>,
    staff: BTreeMap<StaffId, Staff>,
    admins: BTreeMap<String, Admin>,
    modules: BTreeMap<ModuleId, Module>,
    lectures: BTreeMap<LectureId, Lecture>,
    attendances: BTreeMap<AttendanceId, StudentAttendance>,
    feedback: BTreeMap<FeedbackId, ModuleFeedback>,
    settings: BTreeMap<String, UserSettings>,

    /// (module, session id, date) -> lecture
    lecture_index: BTreeMap<(ModuleId, String, NaiveDate), LectureId>,

    /// (student, lecture) -> attendance
    attendance_index: BTreeMap<(StudentId, LectureId), AttendanceId>,

    counters: IdCounters,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            courses: self.courses.len(),
            students: self.students.len(),
            staff: self.staff.len(),
            admins: self.admins.len(),
            modules: self.modules.len(),
            lectures: self.lectures.len(),
            attendances: self.attendances.len(),
            feedback: self.feedback.len(),
        }
    }

    // -------------------------------------------------------------------------
    // Creation
    // -------------------------------------------------------------------------

    pub fn add_course(&mut self, course_code: &str) -> Result<CourseId> {
        let course_code = course_code.trim();
        let mut errors = ValidationErrors::new();
        if rules::text(&mut errors, "course_code", course_code, rules::COURSE_CODE_MAX)
            && self.course_by_code(course_code).is_some()
        {
            errors.push(RECORD_FIELD, DUPLICATE_COURSE);
        }
        errors.into_result()?;

        let id = CourseId(take(&mut self.counters.course));
        self.courses.insert(
            id,
            Course {
                id,
                course_code: course_code.to_string(),
            },
        );
        Ok(id)
    }

    pub fn add_module(&mut self, module_code: &str, module_crn: &str) -> Result<ModuleId> {
        let (module_code, module_crn) = (module_code.trim(), module_crn.trim());
        let mut errors = ValidationErrors::new();
        rules::pattern(
            &mut errors,
            "module_code",
            module_code,
            rules::MODULE_CODE_MAX,
            rules::is_module_code,
            rules::INVALID_MODULE_CODE,
        );
        rules::text(&mut errors, "module_crn", module_crn, rules::MODULE_CRN_MAX);
        if errors.is_empty()
            && self.modules.values().any(|m| {
                m.module_code.eq_ignore_ascii_case(module_code)
                    && m.module_crn.eq_ignore_ascii_case(module_crn)
            })
        {
            errors.push(RECORD_FIELD, DUPLICATE_MODULE);
        }
        errors.into_result()?;

        let id = ModuleId(take(&mut self.counters.module));
        self.modules.insert(
            id,
            Module {
                id,
                module_code: module_code.to_string(),
                module_crn: module_crn.to_string(),
                students: BTreeSet::new(),
                courses: BTreeSet::new(),
            },
        );
        Ok(id)
    }

    pub fn add_student(
        &mut self,
        person: Person,
        device_id: &str,
        course: CourseId,
    ) -> Result<StudentId> {
        let device_id = device_id.trim();
        let mut errors = ValidationErrors::new();
        rules::person(
            &mut errors,
            &person,
            rules::is_student_code,
            rules::INVALID_STUDENT_CODE,
        );
        rules::pattern(
            &mut errors,
            "device_id",
            device_id,
            rules::DEVICE_ID_LEN,
            rules::is_device_id,
            rules::INVALID_DEVICE_ID,
        );
        if !self.courses.contains_key(&course) {
            errors.push("course", UNKNOWN_CHOICE);
        }
        if errors.is_empty() {
            self.check_account_unique(&mut errors, &person.username, &person.email);
            if self.student_by_device_id(device_id).is_some() {
                errors.push(RECORD_FIELD, DUPLICATE_DEVICE_ID);
            }
        }
        errors.into_result()?;

        let id = StudentId(take(&mut self.counters.student));
        self.students.insert(
            id,
            Student {
                id,
                person,
                device_id: device_id.to_string(),
                course,
            },
        );
        Ok(id)
    }

    pub fn add_staff(&mut self, person: Person) -> Result<StaffId> {
        let mut errors = ValidationErrors::new();
        rules::person(
            &mut errors,
            &person,
            rules::is_staff_code,
            rules::INVALID_STAFF_CODE,
        );
        if errors.is_empty() {
            self.check_account_unique(&mut errors, &person.username, &person.email);
        }
        errors.into_result()?;

        let id = StaffId(take(&mut self.counters.staff));
        self.staff.insert(
            id,
            Staff {
                id,
                person,
                modules: BTreeSet::new(),
                courses: BTreeSet::new(),
            },
        );
        Ok(id)
    }

    pub fn add_admin(&mut self, username: &str, email: &str) -> Result<()> {
        let username = username.trim();
        let mut errors = ValidationErrors::new();
        rules::pattern(
            &mut errors,
            "username",
            username,
            rules::USERNAME_MAX,
            rules::is_username,
            rules::INVALID_USERNAME,
        );
        rules::pattern(
            &mut errors,
            "email",
            email,
            rules::EMAIL_MAX,
            rules::is_email,
            rules::INVALID_EMAIL,
        );
        if errors.is_empty() {
            self.check_account_unique(&mut errors, username, email);
        }
        errors.into_result()?;

        self.admins.insert(
            username.to_string(),
            Admin {
                username: username.to_string(),
                email: email.to_string(),
            },
        );
        Ok(())
    }

    fn check_account_unique(&self, errors: &mut ValidationErrors, username: &str, email: &str) {
        if self.account_exists(username) {
            errors.push(RECORD_FIELD, DUPLICATE_USERNAME);
        }
        if self.emails().any(|known| known.eq_ignore_ascii_case(email)) {
            errors.push(RECORD_FIELD, DUPLICATE_EMAIL);
        }
    }

    fn account_exists(&self, username: &str) -> bool {
        self.admins
            .keys()
            .any(|known| known.eq_ignore_ascii_case(username))
            || self
                .students
                .values()
                .any(|s| s.person.username.eq_ignore_ascii_case(username))
            || self
                .staff
                .values()
                .any(|s| s.person.username.eq_ignore_ascii_case(username))
    }

    fn emails(&self) -> impl Iterator<Item = &str> {
        self.admins
            .values()
            .map(|a| a.email.as_str())
            .chain(self.students.values().map(|s| s.person.email.as_str()))
            .chain(self.staff.values().map(|s| s.person.email.as_str()))
    }

    // -------------------------------------------------------------------------
    // Relations
    // -------------------------------------------------------------------------

    /// Enrol a student on a module. Returns `true` if they were not enrolled.
    pub fn enrol(&mut self, module: ModuleId, student: StudentId) -> Result<bool> {
        if !self.students.contains_key(&student) {
            return Err(RollcallError::NotFound("Student does not exist".into()));
        }
        let module = self.module_mut(module)?;
        Ok(module.students.insert(student))
    }

    /// Link a module to a course. Returns `true` if it was not linked.
    pub fn link_course(&mut self, module: ModuleId, course: CourseId) -> Result<bool> {
        if !self.courses.contains_key(&course) {
            return Err(RollcallError::NotFound("Course does not exist".into()));
        }
        let module = self.module_mut(module)?;
        Ok(module.courses.insert(course))
    }

    /// Replace the modules and courses a staff member follows.
    pub fn assign_staff(
        &mut self,
        staff: StaffId,
        modules: BTreeSet<ModuleId>,
        courses: BTreeSet<CourseId>,
    ) -> Result<()> {
        if let Some(missing) = modules.iter().find(|m| !self.modules.contains_key(m)) {
            return Err(RollcallError::NotFound(format!(
                "Module {missing} does not exist"
            )));
        }
        if let Some(missing) = courses.iter().find(|c| !self.courses.contains_key(c)) {
            return Err(RollcallError::NotFound(format!(
                "Course {missing} does not exist"
            )));
        }
        let member = self
            .staff
            .get_mut(&staff)
            .ok_or_else(|| RollcallError::NotFound("Lecturer does not exist".into()))?;
        member.modules = modules;
        member.courses = courses;
        Ok(())
    }

    fn module_mut(&mut self, id: ModuleId) -> Result<&mut Module> {
        self.modules
            .get_mut(&id)
            .ok_or_else(|| RollcallError::NotFound("Module does not exist".into()))
    }

    // -------------------------------------------------------------------------
    // Lectures and attendance
    // -------------------------------------------------------------------------

    /// Find the lecture for (module, session id, date), creating it if needed.
    ///
    /// Returns the lecture and whether it was created.
    pub fn lecture_for(
        &mut self,
        module: ModuleId,
        session_id: &str,
        date: NaiveDate,
    ) -> Result<(LectureId, bool)> {
        if !self.modules.contains_key(&module) {
            return Err(RollcallError::NotFound("Module does not exist".into()));
        }
        let key = (module, session_id.to_string(), date);
        if let Some(&id) = self.lecture_index.get(&key) {
            return Ok((id, false));
        }

        let id = LectureId(take(&mut self.counters.lecture));
        self.lectures.insert(
            id,
            Lecture {
                id,
                module,
                session_id: session_id.to_string(),
                date,
            },
        );
        self.lecture_index.insert(key, id);
        Ok((id, true))
    }

    /// Create or replace a student's attendance for a lecture.
    pub fn record_attendance(
        &mut self,
        student: StudentId,
        lecture: LectureId,
        attended: bool,
    ) -> Result<AttendanceChange> {
        if !self.students.contains_key(&student) {
            return Err(RollcallError::NotFound("Student does not exist".into()));
        }
        if !self.lectures.contains_key(&lecture) {
            return Err(RollcallError::NotFound("Lecture does not exist".into()));
        }

        if let Some(existing) = self
            .attendance_index
            .get(&(student, lecture))
            .and_then(|id| self.attendances.get_mut(id))
        {
            if existing.attended == attended {
                return Ok(AttendanceChange::Unchanged);
            }
            existing.attended = attended;
            return Ok(AttendanceChange::Updated);
        }

        let id = AttendanceId(take(&mut self.counters.attendance));
        self.attendances.insert(
            id,
            StudentAttendance {
                id,
                student,
                lecture,
                attended,
            },
        );
        self.attendance_index.insert((student, lecture), id);
        Ok(AttendanceChange::Created)
    }

    // -------------------------------------------------------------------------
    // Feedback and settings
    // -------------------------------------------------------------------------

    /// Store a feedback entry. Form validation happens in [`crate::feedback`].
    pub(crate) fn insert_feedback(&mut self, mut entry: ModuleFeedback) -> FeedbackId {
        let id = FeedbackId(take(&mut self.counters.feedback));
        entry.id = id;
        self.feedback.insert(id, entry);
        id
    }

    /// Feedback for a module, newest first. Limited to one student when given.
    #[must_use]
    pub fn feedback_for(
        &self,
        module: ModuleId,
        student: Option<StudentId>,
    ) -> Vec<&ModuleFeedback> {
        let mut entries: Vec<_> = self
            .feedback
            .values()
            .filter(|f| f.module == module && student.is_none_or(|s| f.student == s))
            .collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        entries
    }

    /// Settings for a user, or the defaults when none were saved.
    #[must_use]
    pub fn settings(&self, username: &str) -> UserSettings {
        self.settings.get(username).cloned().unwrap_or_default()
    }

    /// Settings for a user, created with defaults on first access.
    pub fn settings_mut(&mut self, username: &str) -> &mut UserSettings {
        self.settings.entry(username.to_string()).or_default()
    }

    #[must_use]
    pub fn has_settings(&self, username: &str) -> bool {
        self.settings.contains_key(username)
    }

    // -------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn course(&self, id: CourseId) -> Option<&Course> {
        self.courses.get(&id)
    }

    #[must_use]
    pub fn student(&self, id: StudentId) -> Option<&Student> {
        self.students.get(&id)
    }

    #[must_use]
    pub fn staff_member(&self, id: StaffId) -> Option<&Staff> {
        self.staff.get(&id)
    }

    #[must_use]
    pub fn module(&self, id: ModuleId) -> Option<&Module> {
        self.modules.get(&id)
    }

    #[must_use]
    pub fn lecture(&self, id: LectureId) -> Option<&Lecture> {
        self.lectures.get(&id)
    }

    #[must_use]
    pub fn admin(&self, username: &str) -> Option<&Admin> {
        self.admins.get(username)
    }

    #[must_use]
    pub fn attendance(&self, student: StudentId, lecture: LectureId) -> Option<&StudentAttendance> {
        self.attendance_index
            .get(&(student, lecture))
            .and_then(|id| self.attendances.get(id))
    }

    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.values()
    }

    pub fn students(&self) -> impl Iterator<Item = &Student> {
        self.students.values()
    }

    pub fn staff(&self) -> impl Iterator<Item = &Staff> {
        self.staff.values()
    }

    pub fn admins(&self) -> impl Iterator<Item = &Admin> {
        self.admins.values()
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    pub fn lectures(&self) -> impl Iterator<Item = &Lecture> {
        self.lectures.values()
    }

    pub fn attendances(&self) -> impl Iterator<Item = &StudentAttendance> {
        self.attendances.values()
    }

    pub fn lectures_of(&self, module: ModuleId) -> impl Iterator<Item = &Lecture> {
        self.lectures.values().filter(move |l| l.module == module)
    }

    pub fn attendances_for_lecture(
        &self,
        lecture: LectureId,
    ) -> impl Iterator<Item = &StudentAttendance> {
        self.attendances
            .values()
            .filter(move |a| a.lecture == lecture)
    }

    pub fn attendances_of_student(
        &self,
        student: StudentId,
    ) -> impl Iterator<Item = &StudentAttendance> {
        self.attendances
            .values()
            .filter(move |a| a.student == student)
    }

    /// Modules a student is enrolled on.
    pub fn modules_of_student(&self, student: StudentId) -> impl Iterator<Item = &Module> {
        self.modules
            .values()
            .filter(move |m| m.is_enrolled(student))
    }

    /// Modules linked to a course.
    pub fn modules_of_course(&self, course: CourseId) -> impl Iterator<Item = &Module> {
        self.modules
            .values()
            .filter(move |m| m.courses.contains(&course))
    }

    #[must_use]
    pub fn student_by_username(&self, username: &str) -> Option<&Student> {
        self.students
            .values()
            .find(|s| s.person.username == username)
    }

    #[must_use]
    pub fn student_by_device_id(&self, device_id: &str) -> Option<&Student> {
        self.students.values().find(|s| s.device_id == device_id)
    }

    /// Student for an upload key: device ID first, then username.
    #[must_use]
    pub fn find_student(&self, key: &str) -> Option<&Student> {
        let key = key.trim();
        self.student_by_device_id(key)
            .or_else(|| self.student_by_username(key))
    }

    #[must_use]
    pub fn staff_by_username(&self, username: &str) -> Option<&Staff> {
        self.staff.values().find(|s| s.person.username == username)
    }

    #[must_use]
    pub fn course_by_code(&self, course_code: &str) -> Option<&Course> {
        self.courses
            .values()
            .find(|c| c.course_code.eq_ignore_ascii_case(course_code))
    }

    /// Module by code, narrowed by CRN when given.
    ///
    /// Fails when nothing matches, or when the code alone matches several
    /// modules.
    pub fn module_by_code(&self, module_code: &str, module_crn: Option<&str>) -> Result<&Module> {
        let mut matches = self.modules.values().filter(|m| {
            m.module_code.eq_ignore_ascii_case(module_code)
                && module_crn.is_none_or(|crn| m.module_crn.eq_ignore_ascii_case(crn))
        });
        let first = matches.next().ok_or_else(|| {
            RollcallError::NotFound(format!("Unrecognised module: {module_code}"))
        })?;
        if matches.next().is_some() {
            return Err(RollcallError::NotFound(format!(
                "Module {module_code} has several CRNs, choose one"
            )));
        }
        Ok(first)
    }

    // -------------------------------------------------------------------------
    // Snapshots
    // -------------------------------------------------------------------------

    /// Serializable copy of every record.
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            courses: self.courses.values().cloned().collect(),
            students: self.students.values().cloned().collect(),
            staff: self.staff.values().cloned().collect(),
            admins: self.admins.values().cloned().collect(),
            modules: self.modules.values().cloned().collect(),
            lectures: self.lectures.values().cloned().collect(),
            attendances: self.attendances.values().cloned().collect(),
            feedback: self.feedback.values().cloned().collect(),
            settings: self
                .settings
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            counters: self.counters,
        }
    }

    /// Rebuild a registry from a snapshot, keeping the original ids.
    ///
    /// Counters are raised past the largest id present so new records never
    /// collide with restored ones.
    #[must_use]
    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Self {
        let mut registry = Self {
            counters: snapshot.counters,
            ..Self::default()
        };
        let counters = &mut registry.counters;

        for course in snapshot.courses {
            bump(&mut counters.course, course.id.0);
            registry.courses.insert(course.id, course);
        }
        for student in snapshot.students {
            bump(&mut counters.student, student.id.0);
            registry.students.insert(student.id, student);
        }
        for member in snapshot.staff {
            bump(&mut counters.staff, member.id.0);
            registry.staff.insert(member.id, member);
        }
        for admin in snapshot.admins {
            registry.admins.insert(admin.username.clone(), admin);
        }
        for module in snapshot.modules {
            bump(&mut counters.module, module.id.0);
            registry.modules.insert(module.id, module);
        }
        for lecture in snapshot.lectures {
            bump(&mut counters.lecture, lecture.id.0);
            registry.lecture_index.insert(
                (lecture.module, lecture.session_id.clone(), lecture.date),
                lecture.id,
            );
            registry.lectures.insert(lecture.id, lecture);
        }
        for attendance in snapshot.attendances {
            bump(&mut counters.attendance, attendance.id.0);
            registry
                .attendance_index
                .insert((attendance.student, attendance.lecture), attendance.id);
            registry.attendances.insert(attendance.id, attendance);
        }
        for entry in snapshot.feedback {
            bump(&mut counters.feedback, entry.id.0);
            registry.feedback.insert(entry.id, entry);
        }
        registry.settings = snapshot.settings.into_iter().collect();

        registry
    }
}

fn bump(counter: &mut u64, seen: u64) {
    if seen >= *counter {
        *counter = seen.saturating_add(1);
    }
}

/// Serializable form of a [`Registry`], used by every persistence format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub courses: Vec<Course>,
    pub students: Vec<Student>,
    pub staff: Vec<Staff>,
    pub admins: Vec<Admin>,
    pub modules: Vec<Module>,
    pub lectures: Vec<Lecture>,
    pub attendances: Vec<StudentAttendance>,
    pub feedback: Vec<ModuleFeedback>,
    pub settings: Vec<(String, UserSettings)>,
    pub counters: IdCounters,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn student_person(username: &str) -> Person {
        Person::new(
            username,
            "First Name",
            "Last Name",
            format!("{username}@uni.ac.uk"),
        )
    }

    fn setup() -> (Registry, ModuleId, StudentId) {
        let mut registry = Registry::new();
        let course = registry.add_course("Course Code").unwrap();
        let module = registry.add_module("COM101", "COM101-crn").unwrap();
        let student = registry
            .add_student(student_person("B00112233"), "10519C", course)
            .unwrap();
        (registry, module, student)
    }

    fn messages(result: Result<impl Sized>) -> Vec<String> {
        match result {
            Err(RollcallError::Invalid(errors)) => {
                errors.0.into_iter().map(|e| e.message).collect()
            }
            _ => Vec::new(),
        }
    }

    #[test]
    fn ids_start_at_one() {
        let (registry, module, student) = setup();
        assert_eq!(module, ModuleId(1));
        assert_eq!(student, StudentId(1));
        assert_eq!(registry.stats().courses, 1);
    }

    #[test]
    fn empty_module_reports_both_fields() {
        let mut registry = Registry::new();
        assert_eq!(
            messages(registry.add_module("", "")),
            vec![rules::REQUIRED, rules::REQUIRED]
        );
    }

    #[test]
    fn duplicate_module_is_case_insensitive() {
        let (mut registry, _, _) = setup();
        assert_eq!(
            messages(registry.add_module("COM101", "com101-CRN")),
            vec![DUPLICATE_MODULE]
        );
        assert!(registry.add_module("COM101", "COM101-crn-2").is_ok());
    }

    #[test]
    fn duplicate_course_is_case_insensitive() {
        let mut registry = Registry::new();
        assert!(registry.add_course("SOME COURSE CODE").is_ok());
        assert_eq!(
            messages(registry.add_course("some course code")),
            vec![DUPLICATE_COURSE]
        );
    }

    #[test]
    fn usernames_and_emails_are_unique_across_accounts() {
        let (mut registry, _, _) = setup();
        assert_eq!(
            messages(registry.add_admin("b00112233", "other@uni.ac.uk")),
            vec![DUPLICATE_USERNAME]
        );
        assert_eq!(
            messages(registry.add_staff(Person::new(
                "E00112233",
                "First",
                "Last",
                "B00112233@uni.ac.uk"
            ))),
            vec![DUPLICATE_EMAIL]
        );
    }

    #[test]
    fn admin_usernames_are_single_words() {
        let mut registry = Registry::new();
        assert_eq!(
            messages(registry.add_admin("../escaped", "a@uni.ac.uk")),
            vec![rules::INVALID_USERNAME]
        );
        assert_eq!(
            messages(registry.add_admin("ops/admin", "b@uni.ac.uk")),
            vec![rules::INVALID_USERNAME]
        );
        assert!(registry.add_admin("ops.admin@uni", "c@uni.ac.uk").is_ok());
        assert_eq!(registry.stats().admins, 1);
    }

    #[test]
    fn student_needs_known_course_and_device() {
        let mut registry = Registry::new();
        assert_eq!(
            messages(registry.add_student(student_person("B00112233"), "1", CourseId(9))),
            vec![rules::INVALID_DEVICE_ID, UNKNOWN_CHOICE]
        );
    }

    #[test]
    fn find_student_by_device_or_username() {
        let (registry, _, student) = setup();
        assert_eq!(registry.find_student(" 10519C ").map(|s| s.id), Some(student));
        assert_eq!(registry.find_student("B00112233").map(|s| s.id), Some(student));
        assert!(registry.find_student("10518B").is_none());
    }

    #[test]
    fn lecture_for_is_get_or_create() {
        let (mut registry, module, _) = setup();
        let date = NaiveDate::from_ymd_opt(2017, 9, 25).unwrap();

        let first = registry.lecture_for(module, "170925 1228", date);
        let again = registry.lecture_for(module, "170925 1228", date);
        assert_eq!(first.ok(), Some((LectureId(1), true)));
        assert_eq!(again.ok(), Some((LectureId(1), false)));
        assert_eq!(registry.lectures_of(module).count(), 1);
    }

    #[test]
    fn record_attendance_upserts() {
        let (mut registry, module, student) = setup();
        let date = NaiveDate::from_ymd_opt(2017, 9, 25).unwrap();
        let (lecture, _) = registry
            .lecture_for(module, "s1", date)
            .unwrap();

        assert_eq!(
            registry.record_attendance(student, lecture, false).ok(),
            Some(AttendanceChange::Created)
        );
        assert_eq!(
            registry.record_attendance(student, lecture, false).ok(),
            Some(AttendanceChange::Unchanged)
        );
        assert_eq!(
            registry.record_attendance(student, lecture, true).ok(),
            Some(AttendanceChange::Updated)
        );
        assert_eq!(registry.stats().attendances, 1);
        assert_eq!(
            registry.attendance(student, lecture).map(|a| a.attended),
            Some(true)
        );
    }

    #[test]
    fn module_by_code_needs_crn_when_ambiguous() {
        let (mut registry, module, _) = setup();
        assert_eq!(registry.module_by_code("COM101", None).map(|m| m.id).ok(), Some(module));

        let second = registry.add_module("COM101", "COM101-b").unwrap();
        assert!(registry.module_by_code("COM101", None).is_err());
        assert_eq!(
            registry.module_by_code("com101", Some("com101-B")).map(|m| m.id).ok(),
            Some(second)
        );
    }

    #[test]
    fn assign_staff_rejects_unknown_modules() {
        let (mut registry, module, _) = setup();
        let staff = registry
            .add_staff(Person::new("E00112233", "First", "Last", "staff@uni.ac.uk"))
            .unwrap();

        let unknown = BTreeSet::from([ModuleId(42)]);
        assert!(registry.assign_staff(staff, unknown, BTreeSet::new()).is_err());

        let known = BTreeSet::from([module]);
        assert!(registry.assign_staff(staff, known.clone(), BTreeSet::new()).is_ok());
        assert_eq!(registry.staff_member(staff).map(|s| &s.modules), Some(&known));
    }

    #[test]
    fn snapshot_roundtrip_preserves_ids_and_indexes() {
        let (mut registry, module, student) = setup();
        let date = NaiveDate::from_ymd_opt(2017, 9, 25).unwrap();
        let (lecture, _) = registry
            .lecture_for(module, "s1", date)
            .unwrap();
        registry.record_attendance(student, lecture, true).unwrap();

        let mut restored = Registry::from_snapshot(registry.snapshot());
        assert_eq!(restored.stats(), registry.stats());
        assert_eq!(
            restored.lecture_for(module, "s1", date).ok(),
            Some((lecture, false))
        );
        assert_eq!(
            restored.record_attendance(student, lecture, true).ok(),
            Some(AttendanceChange::Unchanged)
        );
        assert_eq!(restored.add_course("Another").ok(), Some(CourseId(2)));
    }
}
