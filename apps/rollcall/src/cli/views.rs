//! Read-only views plus the per-user feedback and settings commands.

use super::output::{banded, emit, split_line};
use super::store::{load_registry, save_registry};
use super::CliError;
use chrono::NaiveDate;
use rollcall_core::access::{self, Viewer};
use rollcall_core::aggregate::{self, DateRange};
use rollcall_core::feedback::{self, FeedbackForm};
use rollcall_core::settings::UserSettings;
use rollcall_core::{CourseId, LectureId, ModuleId, Registry, StaffId, StudentId};
use serde_json::json;
use std::fmt::Write as _;
use std::path::Path;

/// Load the registry and resolve who is asking.
fn open_as(db_path: &Path, backend: &str, as_user: &str) -> Result<(Registry, Viewer), CliError> {
    let registry = load_registry(db_path, backend)?;
    let viewer = Viewer::resolve(&registry, as_user)?;
    tracing::debug!(user = as_user, ?viewer, "viewer resolved");
    Ok((registry, viewer))
}

fn settings_of(registry: &Registry, viewer: &Viewer) -> UserSettings {
    viewer
        .contact(registry)
        .map(|(username, _)| registry.settings(username))
        .unwrap_or_default()
}

fn student_label(registry: &Registry, id: StudentId) -> String {
    registry
        .student(id)
        .map(|s| format!("{} {}", s.person.username, s.person.display_name()))
        .unwrap_or_else(|| format!("student {id}"))
}

/// A range from optional bounds; open ends stretch to the earliest or latest date.
pub(crate) fn date_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Option<DateRange> {
    if from.is_none() && to.is_none() {
        return None;
    }
    Some(DateRange::new(
        from.unwrap_or(NaiveDate::MIN),
        to.unwrap_or(NaiveDate::MAX),
    ))
}

// =============================================================================
// INDEX
// =============================================================================

/// The records a user may open, with the ids the other views take.
pub fn cmd_index(db_path: &Path, backend: &str, json: bool, as_user: &str) -> Result<(), CliError> {
    let (registry, viewer) = open_as(db_path, backend, as_user)?;
    let index = access::index(&registry, &viewer);

    emit(json, &json!({ "viewer": viewer, "index": index }), || {
        let mut out = String::new();
        if !index.modules.is_empty() {
            let _ = writeln!(out, "Modules:");
            for module in &index.modules {
                let _ = writeln!(
                    out,
                    "  {}  {} (CRN {})",
                    module.id, module.module_code, module.module_crn
                );
            }
        }
        if !index.lecturers.is_empty() {
            let _ = writeln!(out, "Lecturers:");
            for lecturer in &index.lecturers {
                let _ = writeln!(
                    out,
                    "  {}  {} {}",
                    lecturer.id,
                    lecturer.person.username,
                    lecturer.person.display_name()
                );
            }
        }
        if !index.students.is_empty() {
            let _ = writeln!(out, "Students:");
            for student in &index.students {
                let _ = writeln!(out, "  {}  {}", student.id, student_label(&registry, student.id));
            }
        }
        if !index.lectures.is_empty() {
            let _ = writeln!(out, "Lectures:");
            for lecture in &index.lectures {
                let _ = writeln!(out, "  {}  {} {}", lecture.id, lecture.date, lecture.session_id);
            }
        }
        if out.is_empty() {
            out.push_str("Nothing to show yet\n");
        }
        out
    })
}

// =============================================================================
// ENTITY VIEWS
// =============================================================================

/// Attendance for one module, with its feedback.
pub fn cmd_module(
    db_path: &Path,
    backend: &str,
    json: bool,
    as_user: &str,
    module_id: u64,
    range: Option<DateRange>,
) -> Result<(), CliError> {
    let (registry, viewer) = open_as(db_path, backend, as_user)?;
    let module = access::module(&registry, &viewer, ModuleId(module_id))?;
    let data = aggregate::module_data(&registry, module, &viewer, range);
    let entries = registry.feedback_for(module.id, viewer.student());
    let settings = settings_of(&registry, &viewer);

    let value = json!({
        "module": module,
        "attendance": data,
        "feedback": entries,
        "settings": settings,
    });
    emit(json, &value, || {
        let mut out = String::new();
        let _ = writeln!(out, "Module {} (CRN {})", module.module_code, module.module_crn);
        let _ = writeln!(out, "Overall: {}", banded(&settings, data.overall));
        let _ = writeln!(out, "{}", split_line(&settings, data.overall));

        let _ = writeln!(out, "\nStudents:");
        for summary in &data.students {
            let _ = writeln!(
                out,
                "  {}  {}/{}  {}",
                student_label(&registry, summary.student),
                summary.attended,
                summary.entries.len(),
                banded(&settings, summary.percent)
            );
        }
        let _ = writeln!(out, "\nLectures:");
        for lecture in &data.lectures {
            let _ = writeln!(
                out,
                "  {} {}  {}",
                lecture.date, lecture.session_id, lecture.percent
            );
        }
        if !entries.is_empty() {
            let _ = writeln!(out, "\nFeedback:");
            for entry in &entries {
                let _ = writeln!(out, "  {} from {}", entry.date, feedback::author(&registry, entry));
                let _ = writeln!(out, "    General: {}", entry.general);
                let _ = writeln!(out, "    Positive: {}", entry.positive);
                let _ = writeln!(out, "    Constructive: {}", entry.constructive);
                if !entry.other.is_empty() {
                    let _ = writeln!(out, "    Other: {}", entry.other);
                }
            }
        }
        out
    })
}

/// A student's attendance across their modules.
pub fn cmd_student(
    db_path: &Path,
    backend: &str,
    json: bool,
    as_user: &str,
    student_id: u64,
) -> Result<(), CliError> {
    let (registry, viewer) = open_as(db_path, backend, as_user)?;
    let student = access::student(&registry, &viewer, StudentId(student_id))?;
    let overview = aggregate::student_overview(&registry, student.id);
    let settings = settings_of(&registry, &viewer);

    emit(json, &json!({ "student": student, "attendance": overview }), || {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Student {} {} (device {})",
            student.person.username,
            student.person.display_name(),
            student.device_id
        );
        let _ = writeln!(out, "{}", split_line(&settings, overview.overall));
        for module in &overview.modules {
            let _ = writeln!(
                out,
                "\n{}  {}/{}  {}",
                module.module_code,
                module.attended,
                module.entries.len(),
                banded(&settings, module.percent)
            );
            for entry in &module.entries {
                let mark = if entry.attended { "attended" } else { "absent" };
                let _ = writeln!(out, "  {} {}: {mark}", entry.date, entry.session_id);
            }
        }
        out
    })
}

/// Attendance across a lecturer's modules.
pub fn cmd_lecturer(
    db_path: &Path,
    backend: &str,
    json: bool,
    as_user: &str,
    staff_id: u64,
) -> Result<(), CliError> {
    let (registry, viewer) = open_as(db_path, backend, as_user)?;
    let lecturer = access::lecturer(&registry, &viewer, StaffId(staff_id))?;
    let overview = aggregate::lecturer_overview(&registry, lecturer);
    let settings = settings_of(&registry, &viewer);

    emit(json, &json!({ "lecturer": lecturer.person, "attendance": overview }), || {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Lecturer {} {}",
            lecturer.person.username,
            lecturer.person.display_name()
        );
        let _ = writeln!(out, "{}", split_line(&settings, overview.overall));
        for module in &overview.modules {
            let _ = writeln!(out, "  {}  {}", module.module_code, banded(&settings, module.percent));
        }
        out
    })
}

/// Average attendance of each module on a course.
pub fn cmd_course(
    db_path: &Path,
    backend: &str,
    json: bool,
    as_user: &str,
    course_id: u64,
) -> Result<(), CliError> {
    let (registry, viewer) = open_as(db_path, backend, as_user)?;
    let course = access::course(&registry, &viewer, CourseId(course_id))?;
    let overview = aggregate::course_overview(&registry, course);
    let settings = settings_of(&registry, &viewer);

    emit(json, &json!({ "course": course, "attendance": overview }), || {
        let mut out = String::new();
        let _ = writeln!(out, "Course {}", course.course_code);
        let _ = writeln!(out, "{}", split_line(&settings, overview.overall));
        for module in &overview.modules {
            let _ = writeln!(out, "  {}  {}", module.module_code, banded(&settings, module.percent));
        }
        out
    })
}

/// Who attended a single lecture.
pub fn cmd_lecture(
    db_path: &Path,
    backend: &str,
    json: bool,
    as_user: &str,
    lecture_id: u64,
) -> Result<(), CliError> {
    let (registry, viewer) = open_as(db_path, backend, as_user)?;
    let lecture = access::lecture(&registry, &viewer, LectureId(lecture_id))?;
    let data = aggregate::lecture_overview(&registry, lecture, &viewer);
    let settings = settings_of(&registry, &viewer);
    let module_code = registry
        .module(lecture.module)
        .map(|m| m.module_code.clone())
        .unwrap_or_default();

    emit(json, &json!({ "lecture": lecture, "attendance": data }), || {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Lecture {} on {} ({module_code})",
            lecture.session_id, lecture.date
        );
        let _ = writeln!(out, "{}", split_line(&settings, data.percent));
        for entry in &data.entries {
            let mark = if entry.attended { "attended" } else { "absent" };
            let _ = writeln!(out, "  {}: {mark}", student_label(&registry, entry.student));
        }
        out
    })
}

// =============================================================================
// FEEDBACK
// =============================================================================

/// Leave feedback on a module as an enrolled student.
pub fn cmd_feedback_give(
    db_path: &Path,
    backend: &str,
    as_user: &str,
    module_id: u64,
    form: FeedbackForm,
) -> Result<(), CliError> {
    let (mut registry, viewer) = open_as(db_path, backend, as_user)?;
    let today = chrono::Local::now().date_naive();
    let id = feedback::submit(&mut registry, &viewer, ModuleId(module_id), form, today)?;
    save_registry(&registry, db_path, backend)?;

    tracing::info!(feedback = %id, module = module_id, "feedback saved");
    println!("Feedback saved");
    Ok(())
}

/// Feedback on a module, newest first.
pub fn cmd_feedback_list(
    db_path: &Path,
    backend: &str,
    json: bool,
    as_user: &str,
    module_id: u64,
) -> Result<(), CliError> {
    let (registry, viewer) = open_as(db_path, backend, as_user)?;
    let entries = feedback::list(&registry, &viewer, ModuleId(module_id))?;

    emit(json, &entries, || {
        let mut out = String::new();
        if entries.is_empty() {
            out.push_str("No feedback yet\n");
        }
        for entry in &entries {
            let _ = writeln!(
                out,
                "{} from {}: {}",
                entry.date,
                feedback::author(&registry, entry),
                entry.general
            );
        }
        out
    })
}

// =============================================================================
// SETTINGS
// =============================================================================

fn username_of(registry: &Registry, viewer: &Viewer) -> String {
    viewer
        .contact(registry)
        .map(|(username, _)| username.to_string())
        .unwrap_or_default()
}

/// The viewer's display settings.
pub fn cmd_settings_show(
    db_path: &Path,
    backend: &str,
    json: bool,
    as_user: &str,
) -> Result<(), CliError> {
    let (registry, viewer) = open_as(db_path, backend, as_user)?;
    let settings = settings_of(&registry, &viewer);

    emit(json, &settings, || {
        let [first, second, third] = settings.range_caps;
        format!(
            "Attendance ranges: 0-{first}, {first}-{second}, {second}-{third}, {third}-100\n\
             Colourblind palette: {}\n",
            if settings.colourblind { "on" } else { "off" }
        )
    })
}

/// Change the three range caps. A rejected change keeps the old caps.
pub fn cmd_settings_ranges(
    db_path: &Path,
    backend: &str,
    as_user: &str,
    ranges: [&str; 3],
) -> Result<(), CliError> {
    let (mut registry, viewer) = open_as(db_path, backend, as_user)?;
    let username = username_of(&registry, &viewer);

    let result = registry.settings_mut(&username).update_ranges(ranges);
    save_registry(&registry, db_path, backend)?;
    result?;

    tracing::info!(user = %username, caps = ?registry.settings(&username).range_caps, "ranges updated");
    println!("Attendance ranges updated");
    Ok(())
}

/// Switch the colourblind palette on or off.
pub fn cmd_settings_colourblind(
    db_path: &Path,
    backend: &str,
    as_user: &str,
    enabled: bool,
) -> Result<(), CliError> {
    let (mut registry, viewer) = open_as(db_path, backend, as_user)?;
    let username = username_of(&registry, &viewer);
    registry.settings_mut(&username).colourblind = enabled;
    save_registry(&registry, db_path, backend)?;

    println!(
        "Colourblind palette {}",
        if enabled { "enabled" } else { "disabled" }
    );
    Ok(())
}
