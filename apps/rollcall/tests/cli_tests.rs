//! Integration tests for Rollcall CLI commands.
//!
//! Uses tempfile for testing file-based operations.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use chrono::NaiveDate;
use rollcall::cli::{
    CliError, cmd_assign, cmd_course, cmd_export, cmd_feedback_give, cmd_feedback_list,
    cmd_import, cmd_index, cmd_init, cmd_lecture, cmd_lecturer, cmd_module, cmd_report, cmd_roster,
    cmd_settings_colourblind, cmd_settings_ranges, cmd_settings_show, cmd_status, cmd_student,
    cmd_template, cmd_upload, load_registry, save_registry,
};
use rollcall_core::access::{self, Viewer};
use rollcall_core::feedback::FeedbackForm;
use rollcall_core::report::{Audience, ReportPeriod};
use rollcall_core::{Admin, ModuleId, Registry, RollcallError, StaffId, StudentId};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Create a temporary directory for tests.
fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// One course, one module, an admin, a lecturer and two students.
/// Only the first student is enrolled on COM101.
fn create_roster(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("roster.json");
    let content = r#"{
        "courses": ["Computing"],
        "modules": [{ "module_code": "COM101", "module_crn": "12345" }],
        "admins": [{ "username": "admin", "email": "admin@uni.ac.uk" }],
        "staff": [{
            "username": "E00112233", "first_name": "Grace", "last_name": "Hopper",
            "email": "grace@uni.ac.uk", "modules": ["COM101"], "courses": ["Computing"]
        }],
        "students": [
            {
                "username": "B00112233", "first_name": "Ada", "last_name": "Lovelace",
                "email": "ada@uni.ac.uk", "device_id": "10519C", "course": "Computing",
                "modules": ["COM101"]
            },
            {
                "username": "B00445566", "first_name": "Alan", "last_name": "Turing",
                "email": "alan@uni.ac.uk", "device_id": "20620D", "course": "Computing"
            }
        ]
    }"#;
    std::fs::write(&path, content).unwrap();
    path
}

/// A two-session sheet: Ada attends the first, misses the second.
fn create_sheet(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    let content = "Attendance export,,,,\r\n\
        Device ID(s),Last Name,First Name,\"25/09/2017\n170925 1228\",\"26/09/2017\n170926 1138\"\r\n\
        10519C,Lovelace,Ada,Y,N\r\n";
    std::fs::write(&path, content).unwrap();
    path
}

/// A sheet naming a student nobody knows.
fn create_bad_sheet(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("bad.csv");
    let content = "Device ID(s),Last Name,First Name,\"25/09/2017\n170925 1228\"\n\
        B00999999,Nobody,Known,Y\n";
    std::fs::write(&path, content).unwrap();
    path
}

/// Initialised database with the roster applied.
fn setup(temp: &TempDir, backend: &str) -> PathBuf {
    let db_path = temp.path().join(format!("test.{backend}"));
    cmd_init(&db_path, backend, false).unwrap();
    let roster = create_roster(temp);
    cmd_roster(&db_path, backend, false, &roster).unwrap();
    db_path
}

/// Database with the roster and one uploaded sheet.
fn setup_with_attendance(temp: &TempDir, backend: &str) -> PathBuf {
    let db_path = setup(temp, backend);
    let sheet = create_sheet(temp, "week1.csv");
    cmd_upload(&db_path, backend, false, "COM101", None, &[sheet]).unwrap();
    db_path
}

fn registry(db_path: &Path, backend: &str) -> Registry {
    load_registry(db_path, backend).unwrap()
}

fn is_not_authorised(result: Result<(), CliError>) -> bool {
    matches!(result, Err(CliError::Core(RollcallError::NotAuthorised(_))))
}

fn feedback_form() -> FeedbackForm {
    FeedbackForm {
        general: "Good module".to_string(),
        positive: "Clear slides".to_string(),
        constructive: "More examples".to_string(),
        other: "Thanks".to_string(),
        anonymous: false,
    }
}

// =============================================================================
// INIT COMMAND TESTS
// =============================================================================

#[test]
fn test_init_creates_file_database() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.db");

    let result = cmd_init(&db_path, "file", false);
    assert!(result.is_ok());
    assert!(db_path.exists());
}

#[test]
fn test_init_creates_redb_database() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.redb");

    let result = cmd_init(&db_path, "redb", false);
    assert!(result.is_ok());
    assert!(db_path.exists());
}

#[test]
fn test_init_fails_if_exists_without_force() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.db");

    cmd_init(&db_path, "file", false).unwrap();

    let result = cmd_init(&db_path, "file", false);
    assert!(matches!(result, Err(CliError::AlreadyExists(_))));
}

#[test]
fn test_init_with_force_resets_records() {
    let temp = create_temp_dir();
    let db_path = setup(&temp, "file");
    assert_eq!(registry(&db_path, "file").stats().students, 2);

    cmd_init(&db_path, "file", true).unwrap();
    assert_eq!(registry(&db_path, "file").stats().students, 0);
}

#[test]
fn test_unknown_backend_is_rejected() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.db");

    let result = cmd_init(&db_path, "sqlite", false);
    assert!(matches!(result, Err(CliError::UnknownBackend(_))));
}

// =============================================================================
// STATUS / ROSTER TESTS
// =============================================================================

#[test]
fn test_status_on_missing_file_database() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("never-created.db");

    assert!(cmd_status(&db_path, "file", false).is_ok());
    assert!(cmd_status(&db_path, "file", true).is_ok());
}

#[test]
fn test_roster_adds_records() {
    for backend in ["file", "redb"] {
        let temp = create_temp_dir();
        let db_path = setup(&temp, backend);

        let stats = registry(&db_path, backend).stats();
        assert_eq!(stats.courses, 1);
        assert_eq!(stats.modules, 1);
        assert_eq!(stats.admins, 1);
        assert_eq!(stats.staff, 1);
        assert_eq!(stats.students, 2);
    }
}

#[test]
fn test_roster_applied_twice_adds_nothing() {
    let temp = create_temp_dir();
    let db_path = setup(&temp, "file");
    let before = registry(&db_path, "file").stats();

    let roster = create_roster(&temp);
    cmd_roster(&db_path, "file", true, &roster).unwrap();
    assert_eq!(registry(&db_path, "file").stats(), before);
}

#[test]
fn test_roster_with_invalid_student_changes_nothing() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.db");
    cmd_init(&db_path, "file", false).unwrap();

    let path = temp.path().join("bad-roster.json");
    let content = r#"{
        "courses": ["Computing"],
        "students": [{
            "username": "not-a-code", "first_name": "A", "last_name": "B",
            "email": "a@uni.ac.uk", "device_id": "10519C", "course": "Computing"
        }]
    }"#;
    std::fs::write(&path, content).unwrap();

    assert!(cmd_roster(&db_path, "file", false, &path).is_err());
    assert_eq!(registry(&db_path, "file").stats().courses, 0);
}

#[test]
fn test_roster_rejects_admin_with_path_in_username() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.db");
    cmd_init(&db_path, "file", false).unwrap();

    let path = temp.path().join("bad-admin.json");
    let content = r#"{ "admins": [{ "username": "../escaped", "email": "x@uni.ac.uk" }] }"#;
    std::fs::write(&path, content).unwrap();

    assert!(cmd_roster(&db_path, "file", false, &path).is_err());
    assert_eq!(registry(&db_path, "file").stats().admins, 0);
}

// =============================================================================
// UPLOAD TESTS
// =============================================================================

#[test]
fn test_upload_records_attendance() {
    for backend in ["file", "redb"] {
        let temp = create_temp_dir();
        let db_path = setup_with_attendance(&temp, backend);

        let reg = registry(&db_path, backend);
        let stats = reg.stats();
        assert_eq!(stats.lectures, 2);
        assert_eq!(stats.attendances, 2);
        assert_eq!(reg.attendances().filter(|a| a.attended).count(), 1);
    }
}

#[test]
fn test_upload_same_sheet_twice_updates_in_place() {
    let temp = create_temp_dir();
    let db_path = setup_with_attendance(&temp, "file");

    let sheet = create_sheet(&temp, "week1-again.csv");
    let outcome = cmd_upload(&db_path, "file", false, "COM101", Some("12345"), &[sheet]).unwrap();
    assert!(outcome.is_success());
    assert_eq!(outcome.saved[0].lectures_created, 0);
    assert_eq!(outcome.saved[0].attendances_created, 0);

    let stats = registry(&db_path, "file").stats();
    assert_eq!(stats.lectures, 2);
    assert_eq!(stats.attendances, 2);
}

#[test]
fn test_upload_bad_sheet_saves_nothing() {
    let temp = create_temp_dir();
    let db_path = setup(&temp, "file");

    let bad = create_bad_sheet(&temp);
    let outcome = cmd_upload(&db_path, "file", false, "COM101", None, &[bad]).unwrap();
    assert!(!outcome.is_success());
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("Unrecognised student: B00999999"));
    assert_eq!(registry(&db_path, "file").stats().lectures, 0);
}

#[test]
fn test_upload_keeps_good_files_when_another_fails() {
    let temp = create_temp_dir();
    let db_path = setup(&temp, "file");

    let good = create_sheet(&temp, "good.csv");
    let bad = create_bad_sheet(&temp);
    let outcome = cmd_upload(&db_path, "file", true, "COM101", None, &[good, bad]).unwrap();

    assert_eq!(outcome.saved.len(), 1);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].starts_with("Error processing file bad.csv"));
    assert_eq!(registry(&db_path, "file").stats().attendances, 2);
}

#[test]
fn test_upload_to_unknown_module_fails() {
    let temp = create_temp_dir();
    let db_path = setup(&temp, "file");

    let sheet = create_sheet(&temp, "week1.csv");
    let result = cmd_upload(&db_path, "file", false, "XYZ999", None, &[sheet]);
    assert!(result.is_err());
}

#[test]
fn test_upload_missing_file_fails() {
    let temp = create_temp_dir();
    let db_path = setup(&temp, "file");

    let missing = temp.path().join("missing.csv");
    let result = cmd_upload(&db_path, "file", false, "COM101", None, &[missing]);
    assert!(matches!(result, Err(CliError::Io { .. })));
}

// =============================================================================
// VIEW TESTS
// =============================================================================

#[test]
fn test_views_for_admin_and_lecturer() {
    let temp = create_temp_dir();
    let db_path = setup_with_attendance(&temp, "file");

    for user in ["admin", "E00112233"] {
        assert!(cmd_module(&db_path, "file", false, user, 1, None).is_ok());
        assert!(cmd_module(&db_path, "file", true, user, 1, None).is_ok());
        assert!(cmd_student(&db_path, "file", false, user, 2).is_ok());
        assert!(cmd_lecturer(&db_path, "file", false, user, 1).is_ok());
        assert!(cmd_course(&db_path, "file", true, user, 1).is_ok());
        assert!(cmd_lecture(&db_path, "file", false, user, 1).is_ok());
    }
}

#[test]
fn test_student_sees_own_records_only() {
    let temp = create_temp_dir();
    let db_path = setup_with_attendance(&temp, "file");
    let ada = "B00112233";
    let alan = "B00445566";

    assert!(cmd_student(&db_path, "file", false, ada, 1).is_ok());
    assert!(cmd_module(&db_path, "file", false, ada, 1, None).is_ok());
    assert!(cmd_lecture(&db_path, "file", false, ada, 1).is_ok());

    assert!(is_not_authorised(cmd_student(&db_path, "file", false, ada, 2)));
    assert!(is_not_authorised(cmd_lecturer(&db_path, "file", false, ada, 1)));
    assert!(is_not_authorised(cmd_course(&db_path, "file", false, ada, 1)));
    assert!(is_not_authorised(cmd_module(&db_path, "file", false, alan, 1, None)));
    assert!(is_not_authorised(cmd_lecture(&db_path, "file", false, alan, 1)));
}

#[test]
fn test_index_lists_what_each_role_may_open() {
    let temp = create_temp_dir();
    let db_path = setup_with_attendance(&temp, "redb");

    for user in ["admin", "E00112233", "B00112233", "B00445566"] {
        assert!(cmd_index(&db_path, "redb", false, user).is_ok());
        assert!(cmd_index(&db_path, "redb", true, user).is_ok());
    }
    let result = cmd_index(&db_path, "redb", false, "stranger");
    assert!(matches!(result, Err(CliError::Core(RollcallError::Unauthorised(_)))));

    let registry = registry(&db_path, "redb");
    let admin = access::index(&registry, &Viewer::Admin("admin".to_string()));
    assert_eq!(
        (admin.modules.len(), admin.lecturers.len(), admin.students.len(), admin.lectures.len()),
        (1, 1, 2, 2)
    );

    let lecturer = access::index(&registry, &Viewer::Staff(StaffId(1)));
    assert_eq!(lecturer.modules.len(), 1);
    assert!(lecturer.lecturers.is_empty());
    let students: Vec<StudentId> = lecturer.students.iter().map(|s| s.id).collect();
    assert_eq!(students, vec![StudentId(1)]);
    assert_eq!(lecturer.lectures.len(), 2);

    let ada = access::index(&registry, &Viewer::Student(StudentId(1)));
    assert_eq!(ada.modules.len(), 1);
    let lecturers: Vec<StaffId> = ada.lecturers.iter().map(|s| s.id).collect();
    assert_eq!(lecturers, vec![StaffId(1)]);
    assert!(ada.students.is_empty());
    assert_eq!(ada.lectures.len(), 2);

    let alan = access::index(&registry, &Viewer::Student(StudentId(2)));
    assert!(alan.modules.is_empty() && alan.lectures.is_empty());
}

#[test]
fn test_views_report_missing_records() {
    let temp = create_temp_dir();
    let db_path = setup(&temp, "file");

    let result = cmd_module(&db_path, "file", false, "admin", 99, None);
    assert!(matches!(result, Err(CliError::Core(RollcallError::NotFound(_)))));
    let result = cmd_lecture(&db_path, "file", false, "admin", 1);
    assert!(matches!(result, Err(CliError::Core(RollcallError::NotFound(_)))));
}

#[test]
fn test_unknown_user_is_refused() {
    let temp = create_temp_dir();
    let db_path = setup(&temp, "file");

    let result = cmd_module(&db_path, "file", false, "stranger", 1, None);
    assert!(matches!(result, Err(CliError::Core(RollcallError::Unauthorised(_)))));
}

// =============================================================================
// FEEDBACK TESTS
// =============================================================================

#[test]
fn test_enrolled_student_gives_feedback() {
    let temp = create_temp_dir();
    let db_path = setup(&temp, "file");

    cmd_feedback_give(&db_path, "file", "B00112233", 1, feedback_form()).unwrap();

    let reg = registry(&db_path, "file");
    let entries = reg.feedback_for(ModuleId(1), None);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].student, StudentId(1));
    assert!(cmd_feedback_list(&db_path, "file", false, "E00112233", 1).is_ok());
    assert!(cmd_feedback_list(&db_path, "file", true, "B00112233", 1).is_ok());
}

#[test]
fn test_feedback_refused_for_staff_and_unenrolled() {
    let temp = create_temp_dir();
    let db_path = setup(&temp, "file");

    let staff = cmd_feedback_give(&db_path, "file", "E00112233", 1, feedback_form());
    assert!(is_not_authorised(staff));
    let unenrolled = cmd_feedback_give(&db_path, "file", "B00445566", 1, feedback_form());
    assert!(is_not_authorised(unenrolled));
    assert_eq!(registry(&db_path, "file").stats().feedback, 0);
}

#[test]
fn test_incomplete_feedback_is_rejected() {
    let temp = create_temp_dir();
    let db_path = setup(&temp, "file");

    let form = FeedbackForm {
        positive: String::new(),
        ..feedback_form()
    };
    assert!(cmd_feedback_give(&db_path, "file", "B00112233", 1, form).is_err());

    let no_other = FeedbackForm {
        other: String::new(),
        ..feedback_form()
    };
    let result = cmd_feedback_give(&db_path, "file", "B00112233", 1, no_other);
    assert!(matches!(
        result,
        Err(CliError::Core(RollcallError::Form(ref message))) if message == "Please fill in all form fields"
    ));
    assert_eq!(registry(&db_path, "file").stats().feedback, 0);
}

// =============================================================================
// SETTINGS / ASSIGN TESTS
// =============================================================================

#[test]
fn test_settings_update_and_show() {
    let temp = create_temp_dir();
    let db_path = setup(&temp, "redb");

    cmd_settings_ranges(&db_path, "redb", "B00112233", ["30", "60", "90"]).unwrap();
    cmd_settings_colourblind(&db_path, "redb", "B00112233", true).unwrap();

    let settings = registry(&db_path, "redb").settings("B00112233");
    assert_eq!(settings.range_caps, [30, 60, 90]);
    assert!(settings.colourblind);
    assert!(cmd_settings_show(&db_path, "redb", true, "B00112233").is_ok());
}

#[test]
fn test_settings_rejects_bad_ranges() {
    let temp = create_temp_dir();
    let db_path = setup(&temp, "file");

    cmd_settings_ranges(&db_path, "file", "admin", ["30", "60", "90"]).unwrap();
    assert!(cmd_settings_ranges(&db_path, "file", "admin", ["60", "30", "90"]).is_err());
    assert!(cmd_settings_ranges(&db_path, "file", "admin", ["x", "60", "90"]).is_err());

    let settings = registry(&db_path, "file").settings("admin");
    assert_eq!(settings.range_caps, [30, 60, 90]);
}

#[test]
fn test_rejected_first_ranges_still_create_settings() {
    let temp = create_temp_dir();
    let db_path = setup(&temp, "redb");
    assert!(!registry(&db_path, "redb").has_settings("B00112233"));

    let result = cmd_settings_ranges(&db_path, "redb", "B00112233", ["1", "2", "99999999999999999999"]);
    assert!(matches!(
        result,
        Err(CliError::Core(RollcallError::Form(ref message)))
            if message == "Attendance range 3 must be less than 100"
    ));

    let registry = registry(&db_path, "redb");
    assert!(registry.has_settings("B00112233"));
    assert_eq!(registry.settings("B00112233").range_caps, [25, 50, 75]);
}

#[test]
fn test_assign_is_staff_only() {
    let temp = create_temp_dir();
    let db_path = setup(&temp, "file");

    cmd_assign(&db_path, "file", "E00112233", &[], &[1]).unwrap();
    let reg = registry(&db_path, "file");
    let staff = reg.staff_member(StaffId(1)).unwrap();
    assert!(staff.modules.is_empty());
    assert_eq!(staff.courses.len(), 1);

    assert!(is_not_authorised(cmd_assign(&db_path, "file", "admin", &[1], &[])));
    assert!(cmd_assign(&db_path, "file", "E00112233", &[42], &[]).is_err());
}

// =============================================================================
// TEMPLATE / REPORT TESTS
// =============================================================================

#[test]
fn test_template_is_admin_only() {
    let temp = create_temp_dir();
    let db_path = setup(&temp, "file");
    let output = temp.path().join("template.csv");

    assert!(is_not_authorised(cmd_template(&db_path, "file", "E00112233", &output)));
    assert!(!output.exists());

    cmd_template(&db_path, "file", "admin", &output).unwrap();
    let content = std::fs::read_to_string(&output).unwrap();
    assert!(content.contains("Device ID(s)"));
}

#[test]
fn test_report_writes_outbox() {
    let temp = create_temp_dir();
    let db_path = setup_with_attendance(&temp, "file");
    let outbox = temp.path().join("outbox");
    let date = NaiveDate::from_ymd_opt(2017, 9, 29);

    let batch = cmd_report(
        &db_path,
        "file",
        false,
        Audience::AllUsers,
        ReportPeriod::Weekly,
        date,
        Some(&outbox),
        false,
    )
    .unwrap();

    // Alan has no modules to report on.
    assert_eq!(batch.skipped, vec!["B00445566".to_string()]);
    for report in &batch.reports {
        let path = outbox.join(format!("{}.txt", report.username));
        let message = std::fs::read_to_string(path).unwrap();
        assert!(message.contains("Subject: Attendance report"));
    }
    assert!(outbox.join("B00112233.txt").exists());
}

#[test]
fn test_report_refuses_usernames_that_are_not_file_names() {
    let temp = create_temp_dir();
    let db_path = setup_with_attendance(&temp, "file");
    let outbox = temp.path().join("outbox");

    // An import skips roster validation.
    let mut snapshot = registry(&db_path, "file").snapshot();
    snapshot.admins.push(Admin {
        username: "../escaped".to_string(),
        email: "x@uni.ac.uk".to_string(),
    });
    save_registry(&Registry::from_snapshot(snapshot), &db_path, "file").unwrap();

    let result = cmd_report(
        &db_path,
        "file",
        false,
        Audience::Admins,
        ReportPeriod::Weekly,
        NaiveDate::from_ymd_opt(2017, 9, 29),
        Some(&outbox),
        false,
    );
    assert!(matches!(result, Err(CliError::BadRecipient(ref name)) if name == "../escaped"));
    assert!(!temp.path().join("escaped.txt").exists());
    assert!(!outbox.exists());
}

#[test]
fn test_report_dry_run_writes_nothing() {
    let temp = create_temp_dir();
    let db_path = setup_with_attendance(&temp, "file");
    let outbox = temp.path().join("outbox");

    let batch = cmd_report(
        &db_path,
        "file",
        true,
        Audience::Students,
        ReportPeriod::Monthly,
        NaiveDate::from_ymd_opt(2017, 9, 30),
        Some(&outbox),
        true,
    )
    .unwrap();
    assert_eq!(batch.reports.len(), 1);
    assert!(!outbox.exists());
}

#[test]
fn test_report_without_outbox_fails() {
    let temp = create_temp_dir();
    let db_path = setup(&temp, "file");

    let result = cmd_report(
        &db_path,
        "file",
        false,
        Audience::Admins,
        ReportPeriod::Weekly,
        None,
        None,
        false,
    );
    assert!(matches!(result, Err(CliError::MissingOutbox)));
}

// =============================================================================
// EXPORT / IMPORT TESTS
// =============================================================================

#[test]
fn test_export_import_round_trip_across_backends() {
    let temp = create_temp_dir();
    let db_path = setup_with_attendance(&temp, "file");
    let original = registry(&db_path, "file");

    for format in ["json", "snapshot"] {
        let export_path = temp.path().join(format!("export.{format}"));
        cmd_export(&db_path, "file", &export_path, format).unwrap();

        let target = temp.path().join(format!("imported-{format}.redb"));
        cmd_init(&target, "redb", false).unwrap();
        cmd_import(&target, "redb", &export_path).unwrap();

        let imported = registry(&target, "redb");
        assert_eq!(imported.snapshot(), original.snapshot());
    }
}

#[test]
fn test_export_is_deterministic() {
    let temp = create_temp_dir();
    let db_path = setup_with_attendance(&temp, "file");

    let first = temp.path().join("first.bin");
    let second = temp.path().join("second.bin");
    cmd_export(&db_path, "file", &first, "snapshot").unwrap();
    cmd_export(&db_path, "file", &second, "snapshot").unwrap();

    assert_eq!(std::fs::read(first).unwrap(), std::fs::read(second).unwrap());
}

#[test]
fn test_export_unknown_format_fails() {
    let temp = create_temp_dir();
    let db_path = setup(&temp, "file");
    let output = temp.path().join("out.xml");

    let result = cmd_export(&db_path, "file", &output, "xml");
    assert!(matches!(result, Err(CliError::UnknownFormat(_))));
}

#[test]
fn test_import_rejects_garbage() {
    let temp = create_temp_dir();
    let db_path = setup(&temp, "file");
    let input = temp.path().join("garbage.bin");
    std::fs::write(&input, b"RCAL\x07not a snapshot").unwrap();

    assert!(cmd_import(&db_path, "file", &input).is_err());
    assert_eq!(registry(&db_path, "file").stats().students, 2);
}

#[test]
fn test_save_and_load_registry() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("direct.redb");

    let mut reg = Registry::new();
    reg.add_course("Computing").unwrap();
    save_registry(&reg, &db_path, "redb").unwrap();

    assert_eq!(registry(&db_path, "redb").stats().courses, 1);
}
