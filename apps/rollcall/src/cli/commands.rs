//! Data management commands: setup, roster, uploads, reports, import/export.

use super::output::emit;
use super::store::{Backend, load_registry, save_registry};
use super::CliError;
use chrono::NaiveDate;
use rollcall_core::access::{self, Viewer};
use rollcall_core::formats::{
    SNAPSHOT_MAGIC, apply_roster, decode_snapshot, encode_snapshot, export_json, import_json,
    parse_roster,
};
use rollcall_core::report::{Audience, ReportBatch, ReportPeriod, build_reports};
use rollcall_core::upload::{UploadFile, UploadOutcome, example_template, upload_files};
use rollcall_core::validation;
use rollcall_core::{CourseId, ModuleId, Registry};
use serde_json::json;
use std::collections::BTreeSet;
use std::path::Path;

fn read_file(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|e| CliError::io(path, e))
}

fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), CliError> {
    std::fs::write(path, contents).map_err(|e| CliError::io(path, e))
}

// =============================================================================
// INIT / STATUS
// =============================================================================

/// Create an empty database.
pub fn cmd_init(db_path: &Path, backend: &str, force: bool) -> Result<(), CliError> {
    let kind = backend.parse::<Backend>()?;
    if db_path.exists() {
        if !force {
            return Err(CliError::AlreadyExists(db_path.to_path_buf()));
        }
        std::fs::remove_file(db_path).map_err(|e| CliError::io(db_path, e))?;
    }
    save_registry(&Registry::new(), db_path, backend)?;
    tracing::info!(path = %db_path.display(), backend = ?kind, "database initialised");
    println!("Initialised {} database at {}", backend, db_path.display());
    Ok(())
}

/// Record counts.
pub fn cmd_status(db_path: &Path, backend: &str, json: bool) -> Result<(), CliError> {
    let registry = load_registry(db_path, backend)?;
    let stats = registry.stats();
    emit(
        json,
        &json!({ "db": db_path.display().to_string(), "backend": backend, "records": stats }),
        || {
            format!(
                "Database: {} ({backend})\n\
                 Courses:     {}\nModules:     {}\nStudents:    {}\nStaff:       {}\n\
                 Admins:      {}\nLectures:    {}\nAttendances: {}\nFeedback:    {}\n",
                db_path.display(),
                stats.courses,
                stats.modules,
                stats.students,
                stats.staff,
                stats.admins,
                stats.lectures,
                stats.attendances,
                stats.feedback,
            )
        },
    )
}

// =============================================================================
// ROSTER / UPLOAD
// =============================================================================

/// Apply a JSON roster file.
pub fn cmd_roster(db_path: &Path, backend: &str, json: bool, file: &Path) -> Result<(), CliError> {
    let text = String::from_utf8_lossy(&read_file(file)?).into_owned();
    let roster = parse_roster(&text)?;

    let mut registry = load_registry(db_path, backend)?;
    let summary = apply_roster(&mut registry, &roster)?;
    save_registry(&registry, db_path, backend)?;

    tracing::info!(file = %file.display(), ?summary, "roster applied");
    emit(json, &summary, || {
        format!(
            "Added {} courses, {} modules, {} admins, {} staff, {} students, {} enrolments\n",
            summary.courses,
            summary.modules,
            summary.admins,
            summary.staff,
            summary.students,
            summary.enrolments
        )
    })
}

/// Upload attendance spreadsheets for a module.
///
/// Each file is saved on its own; failures are listed in the outcome.
pub fn cmd_upload(
    db_path: &Path,
    backend: &str,
    json: bool,
    module_code: &str,
    module_crn: Option<&str>,
    files: &[std::path::PathBuf],
) -> Result<UploadOutcome, CliError> {
    let mut registry = load_registry(db_path, backend)?;
    let module = registry.module_by_code(module_code, module_crn)?.id;

    let uploads = files
        .iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Ok(UploadFile::new(name, read_file(path)?))
        })
        .collect::<Result<Vec<_>, CliError>>()?;

    let outcome = upload_files(&mut registry, module, &uploads)?;
    if !outcome.saved.is_empty() {
        save_registry(&registry, db_path, backend)?;
    }

    for summary in &outcome.saved {
        tracing::info!(
            file = %summary.file,
            rows = summary.rows,
            lectures = summary.lectures_created,
            created = summary.attendances_created,
            updated = summary.attendances_updated,
            "upload saved"
        );
    }
    for error in &outcome.errors {
        tracing::warn!("{error}");
    }

    emit(json, &outcome, || {
        let mut out = String::new();
        for s in &outcome.saved {
            out.push_str(&format!(
                "{}: {} rows, {} new lectures, {} new and {} changed attendances\n",
                s.file, s.rows, s.lectures_created, s.attendances_created, s.attendances_updated
            ));
        }
        for e in &outcome.errors {
            out.push_str(&format!("{e}\n"));
        }
        out
    })?;
    Ok(outcome)
}

/// Write the example upload spreadsheet. Admins only.
pub fn cmd_template(
    db_path: &Path,
    backend: &str,
    as_user: &str,
    output: &Path,
) -> Result<(), CliError> {
    let registry = load_registry(db_path, backend)?;
    let viewer = Viewer::resolve(&registry, as_user)?;
    access::admin_only(&viewer)?;

    write_file(output, example_template())?;
    println!("Wrote example template to {}", output.display());
    Ok(())
}

// =============================================================================
// STAFF VIEW SELECTION
// =============================================================================

/// Choose which modules and courses a lecturer follows.
pub fn cmd_assign(
    db_path: &Path,
    backend: &str,
    as_user: &str,
    modules: &[u64],
    courses: &[u64],
) -> Result<(), CliError> {
    let mut registry = load_registry(db_path, backend)?;
    let viewer = Viewer::resolve(&registry, as_user)?;
    let staff = access::staff_only(&viewer)?;

    let modules: BTreeSet<ModuleId> = modules.iter().copied().map(ModuleId).collect();
    let courses: BTreeSet<CourseId> = courses.iter().copied().map(CourseId).collect();
    let (module_count, course_count) = (modules.len(), courses.len());
    registry.assign_staff(staff, modules, courses)?;
    save_registry(&registry, db_path, backend)?;

    println!("Following {module_count} modules and {course_count} courses");
    Ok(())
}

// =============================================================================
// REPORTS
// =============================================================================

/// Build attendance reports and deliver them to an outbox directory.
///
/// With `dry_run` nothing is written; each recipient is only logged.
pub fn cmd_report(
    db_path: &Path,
    backend: &str,
    json: bool,
    audience: Audience,
    period: ReportPeriod,
    date: Option<NaiveDate>,
    outbox: Option<&Path>,
    dry_run: bool,
) -> Result<ReportBatch, CliError> {
    let registry = load_registry(db_path, backend)?;
    let to = date.unwrap_or_else(|| chrono::Local::now().date_naive());
    let batch = build_reports(&registry, audience, period, to);

    if dry_run {
        tracing::info!("dry run, no reports will be written");
        for report in &batch.reports {
            tracing::info!("Report for {} <{}>", report.username, report.email);
        }
    } else {
        let outbox = outbox.ok_or(CliError::MissingOutbox)?;
        if let Some(report) = batch
            .reports
            .iter()
            .find(|r| !validation::is_username(&r.username))
        {
            return Err(CliError::BadRecipient(report.username.clone()));
        }
        std::fs::create_dir_all(outbox).map_err(|e| CliError::io(outbox, e))?;
        for report in &batch.reports {
            let path = outbox.join(format!("{}.txt", report.username));
            write_file(&path, report.render_message())?;
            tracing::info!(path = %path.display(), "report written for {}", report.email);
        }
    }
    for username in &batch.skipped {
        tracing::info!("No modules to report for {username}, skipping");
    }

    emit(json, &batch, || {
        format!(
            "{} reports ({} to {}), {} users skipped\n",
            batch.reports.len(),
            period.from_date(to),
            to,
            batch.skipped.len()
        )
    })?;
    Ok(batch)
}

// =============================================================================
// EXPORT / IMPORT
// =============================================================================

/// Export the registry as `json` or a binary `snapshot`.
pub fn cmd_export(
    db_path: &Path,
    backend: &str,
    output: &Path,
    format: &str,
) -> Result<(), CliError> {
    let registry = load_registry(db_path, backend)?;
    match format.to_ascii_lowercase().as_str() {
        "json" => write_file(output, export_json(&registry)?)?,
        "snapshot" => write_file(output, encode_snapshot(&registry)?)?,
        _ => return Err(CliError::UnknownFormat(format.to_string())),
    }
    tracing::info!(output = %output.display(), format, "registry exported");
    println!("Exported to {}", output.display());
    Ok(())
}

/// Replace the registry with an export. The format is detected from the file.
pub fn cmd_import(db_path: &Path, backend: &str, input: &Path) -> Result<(), CliError> {
    let bytes = read_file(input)?;
    let registry = if bytes.starts_with(SNAPSHOT_MAGIC) {
        decode_snapshot(&bytes)?
    } else {
        import_json(&String::from_utf8_lossy(&bytes))?
    };
    save_registry(&registry, db_path, backend)?;

    let stats = registry.stats();
    tracing::info!(input = %input.display(), ?stats, "registry imported");
    println!(
        "Imported {} students, {} modules and {} attendances",
        stats.students, stats.modules, stats.attendances
    );
    Ok(())
}
