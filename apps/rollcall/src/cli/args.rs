//! Command-line argument definitions and dispatch.

use super::views::date_range;
use super::{CliError, commands, views};
use chrono::NaiveDate;
use clap::builder::BoolishValueParser;
use clap::{Parser, Subcommand, ValueEnum};
use rollcall_core::feedback::FeedbackForm;
use rollcall_core::report::{Audience, ReportPeriod};
use std::path::PathBuf;

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

/// Recipients of a report run.
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum AudienceArg {
    Students,
    Staff,
    Admins,
    AllUsers,
}

impl From<AudienceArg> for Audience {
    fn from(arg: AudienceArg) -> Self {
        match arg {
            AudienceArg::Students => Self::Students,
            AudienceArg::Staff => Self::Staff,
            AudienceArg::Admins => Self::Admins,
            AudienceArg::AllUsers => Self::AllUsers,
        }
    }
}

/// How far back a report looks.
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum PeriodArg {
    Weekly,
    Monthly,
}

impl From<PeriodArg> for ReportPeriod {
    fn from(arg: PeriodArg) -> Self {
        match arg {
            PeriodArg::Weekly => Self::Weekly,
            PeriodArg::Monthly => Self::Monthly,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum FeedbackAction {
    /// Leave feedback on a module you are enrolled on.
    Give {
        #[arg(long = "as", value_name = "USERNAME")]
        as_user: String,
        #[arg(long, value_name = "ID")]
        module: u64,
        #[arg(long)]
        general: String,
        #[arg(long)]
        positive: String,
        #[arg(long)]
        constructive: String,
        #[arg(long)]
        other: String,
        /// Hide your name from staff.
        #[arg(long)]
        anonymous: bool,
    },
    /// List feedback on a module. Students see only their own.
    List {
        #[arg(long = "as", value_name = "USERNAME")]
        as_user: String,
        #[arg(long, value_name = "ID")]
        module: u64,
    },
}

#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    /// Show attendance ranges and palette.
    Show {
        #[arg(long = "as", value_name = "USERNAME")]
        as_user: String,
    },
    /// Set the three attendance range caps, each 1-99 and increasing.
    Ranges {
        #[arg(long = "as", value_name = "USERNAME")]
        as_user: String,
        first: String,
        second: String,
        third: String,
    },
    /// Turn the colourblind palette on or off.
    Colourblind {
        #[arg(long = "as", value_name = "USERNAME")]
        as_user: String,
        #[arg(action = clap::ArgAction::Set, value_parser = BoolishValueParser::new(), value_name = "on|off")]
        enabled: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an empty database.
    Init {
        /// Overwrite an existing database.
        #[arg(long)]
        force: bool,
    },
    /// Show record counts.
    Status,
    /// Add courses, modules and people from a JSON roster.
    Roster {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Upload attendance spreadsheets for a module.
    Upload {
        /// Module code the sheets belong to.
        #[arg(long, value_name = "CODE")]
        module: String,
        /// CRN, when several modules share the code.
        #[arg(long, value_name = "CRN")]
        crn: Option<String>,
        #[arg(value_name = "FILES", num_args = 1.., required = true)]
        files: Vec<PathBuf>,
    },
    /// List the modules, lecturers, students and lectures you can view.
    Index {
        #[arg(long = "as", value_name = "USERNAME")]
        as_user: String,
    },
    /// Attendance for a module.
    Module {
        id: u64,
        #[arg(long = "as", value_name = "USERNAME")]
        as_user: String,
        /// First lecture date to include (YYYY-MM-DD).
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        /// Last lecture date to include (YYYY-MM-DD).
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
    },
    /// Attendance for a student.
    Student {
        id: u64,
        #[arg(long = "as", value_name = "USERNAME")]
        as_user: String,
    },
    /// Attendance across a lecturer's modules.
    Lecturer {
        id: u64,
        #[arg(long = "as", value_name = "USERNAME")]
        as_user: String,
    },
    /// Attendance across a course's modules.
    Course {
        id: u64,
        #[arg(long = "as", value_name = "USERNAME")]
        as_user: String,
    },
    /// Attendance for a single lecture.
    Lecture {
        id: u64,
        #[arg(long = "as", value_name = "USERNAME")]
        as_user: String,
    },
    /// Module feedback.
    Feedback {
        #[command(subcommand)]
        action: FeedbackAction,
    },
    /// Per-user display settings.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Choose the modules and courses a lecturer follows.
    Assign {
        #[arg(long = "as", value_name = "USERNAME")]
        as_user: String,
        #[arg(long = "module", value_name = "ID")]
        modules: Vec<u64>,
        #[arg(long = "course", value_name = "ID")]
        courses: Vec<u64>,
    },
    /// Build attendance reports into an outbox directory.
    Report {
        #[arg(long, value_enum, default_value = "all-users")]
        audience: AudienceArg,
        #[arg(long, value_enum, default_value = "weekly")]
        period: PeriodArg,
        /// End date of the period (YYYY-MM-DD). Defaults to today.
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(long, value_name = "DIR")]
        outbox: Option<PathBuf>,
        /// Log recipients without writing anything.
        #[arg(long)]
        dry_run: bool,
    },
    /// Export all records.
    Export {
        /// json or snapshot
        #[arg(short, long, default_value = "snapshot")]
        format: String,
        #[arg(value_name = "FILE")]
        output: PathBuf,
    },
    /// Replace all records with an export.
    Import {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
    /// Write the example upload spreadsheet.
    Template {
        #[arg(value_name = "FILE")]
        output: PathBuf,
        #[arg(long = "as", value_name = "USERNAME")]
        as_user: String,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "rollcall",
    about = "Lecture attendance tracking",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// Database path.
    #[arg(long, global = true, env = "ROLLCALL_DB", default_value = "rollcall.db")]
    pub db: PathBuf,

    /// Storage backend: file or redb.
    #[arg(long, global = true, env = "ROLLCALL_BACKEND", default_value = "file")]
    pub backend: String,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Debug-level logging.
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Run the parsed command.
pub fn run(cli: Cli) -> Result<(), CliError> {
    let Cli {
        db,
        backend,
        json,
        command,
        ..
    } = cli;
    let db = db.as_path();
    let backend = backend.as_str();

    match command {
        Command::Init { force } => commands::cmd_init(db, backend, force),
        Command::Status => commands::cmd_status(db, backend, json),
        Command::Roster { file } => commands::cmd_roster(db, backend, json, &file),
        Command::Upload { module, crn, files } => {
            let outcome =
                commands::cmd_upload(db, backend, json, &module, crn.as_deref(), &files)?;
            if outcome.is_success() {
                Ok(())
            } else {
                Err(CliError::Upload(outcome.errors.join("; ")))
            }
        }
        Command::Index { as_user } => views::cmd_index(db, backend, json, &as_user),
        Command::Module {
            id,
            as_user,
            from,
            to,
        } => views::cmd_module(db, backend, json, &as_user, id, date_range(from, to)),
        Command::Student { id, as_user } => views::cmd_student(db, backend, json, &as_user, id),
        Command::Lecturer { id, as_user } => views::cmd_lecturer(db, backend, json, &as_user, id),
        Command::Course { id, as_user } => views::cmd_course(db, backend, json, &as_user, id),
        Command::Lecture { id, as_user } => views::cmd_lecture(db, backend, json, &as_user, id),
        Command::Feedback { action } => match action {
            FeedbackAction::Give {
                as_user,
                module,
                general,
                positive,
                constructive,
                other,
                anonymous,
            } => {
                let form = FeedbackForm {
                    general,
                    positive,
                    constructive,
                    other,
                    anonymous,
                };
                views::cmd_feedback_give(db, backend, &as_user, module, form)
            }
            FeedbackAction::List { as_user, module } => {
                views::cmd_feedback_list(db, backend, json, &as_user, module)
            }
        },
        Command::Settings { action } => match action {
            SettingsAction::Show { as_user } => views::cmd_settings_show(db, backend, json, &as_user),
            SettingsAction::Ranges {
                as_user,
                first,
                second,
                third,
            } => {
                let ranges = [first.as_str(), second.as_str(), third.as_str()];
                views::cmd_settings_ranges(db, backend, &as_user, ranges)
            }
            SettingsAction::Colourblind { as_user, enabled } => {
                views::cmd_settings_colourblind(db, backend, &as_user, enabled)
            }
        },
        Command::Assign {
            as_user,
            modules,
            courses,
        } => commands::cmd_assign(db, backend, &as_user, &modules, &courses),
        Command::Report {
            audience,
            period,
            date,
            outbox,
            dry_run,
        } => commands::cmd_report(
            db,
            backend,
            json,
            audience.into(),
            period.into(),
            date,
            outbox.as_deref(),
            dry_run,
        )
        .map(|_| ()),
        Command::Export { format, output } => commands::cmd_export(db, backend, &output, &format),
        Command::Import { input } => commands::cmd_import(db, backend, &input),
        Command::Template { output, as_user } => {
            commands::cmd_template(db, backend, &as_user, &output)
        }
    }
}
