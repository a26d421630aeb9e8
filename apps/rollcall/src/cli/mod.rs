//! # CLI Module
//!
//! Command-line interface for Rollcall.
//!
//! Every command is a `cmd_*` function taking plain arguments, so tests can
//! call it directly. [`run`] maps parsed [`Cli`] arguments onto them.
//!
//! Data lives in one of two backends:
//! - `file`: a single binary snapshot, rewritten on every change
//! - `redb`: a redb database with one table per record kind

mod args;
mod commands;
mod output;
mod store;
mod views;

pub use args::{AudienceArg, Cli, Command, FeedbackAction, PeriodArg, SettingsAction, run};
pub use commands::{
    cmd_assign, cmd_export, cmd_import, cmd_init, cmd_report, cmd_roster, cmd_status,
    cmd_template, cmd_upload,
};
pub use store::{Backend, load_registry, save_registry};
pub use views::{
    cmd_course, cmd_feedback_give, cmd_feedback_list, cmd_index, cmd_lecture, cmd_lecturer,
    cmd_module, cmd_settings_colourblind, cmd_settings_ranges, cmd_settings_show, cmd_student,
};

use rollcall_core::RollcallError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced to the command line.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] RollcallError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown backend: {0}. Use 'file' or 'redb'")]
    UnknownBackend(String),

    #[error("Unknown format: {0}. Use 'json' or 'snapshot'")]
    UnknownFormat(String),

    #[error("Database already exists at {0}. Use --force to overwrite")]
    AlreadyExists(PathBuf),

    #[error("An outbox directory is required unless --dry-run is given")]
    MissingOutbox,

    /// The username cannot name a file in the outbox.
    #[error("Cannot write a report for {0:?}: usernames may contain only letters, numbers, and @/./+/-/_")]
    BadRecipient(String),

    /// Some files in an upload failed. Files that passed are already saved.
    #[error("{0}")]
    Upload(String),
}

impl CliError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
