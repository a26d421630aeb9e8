//! # Errors
//!
//! One error type for the whole engine. Validation failures carry every
//! failing field so callers can show all messages at once.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Field name used for record-level (not field-specific) failures.
pub const RECORD_FIELD: &str = "__all__";

/// A single failed rule on a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every failed rule for one record, in the order the rules ran.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Messages recorded against `field`.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Turn the collected failures into a result.
    pub fn into_result(self) -> Result<(), RollcallError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(RollcallError::Invalid(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            if error.field == RECORD_FIELD {
                write!(f, "{}", error.message)?;
            } else {
                write!(f, "{}: {}", error.field, error.message)?;
            }
        }
        Ok(())
    }
}

/// Errors produced by the attendance engine.
#[derive(Debug, Error)]
pub enum RollcallError {
    /// One or more fields failed validation.
    #[error("invalid record: {0}")]
    Invalid(ValidationErrors),

    /// A referenced record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The viewer may not read or change the record.
    #[error("{0}")]
    NotAuthorised(String),

    /// The username does not belong to any admin, staff member or student.
    #[error("Unrecognised user: {0}")]
    Unauthorised(String),

    /// A spreadsheet upload was rejected. The message is shown verbatim.
    #[error("{0}")]
    Upload(String),

    /// A settings or feedback form was rejected. The message is shown verbatim.
    #[error("{0}")]
    Form(String),

    /// Snapshot or roster data could not be decoded.
    #[error("format error: {0}")]
    Format(String),

    /// The redb store failed.
    #[error("storage error: {0}")]
    Storage(String),
}

macro_rules! storage_error_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for RollcallError {
                fn from(e: $ty) -> Self {
                    Self::Storage(e.to_string())
                }
            }
        )*
    };
}

storage_error_from!(
    redb::Error,
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

impl From<postcard::Error> for RollcallError {
    fn from(e: postcard::Error) -> Self {
        Self::Format(e.to_string())
    }
}

impl From<serde_json::Error> for RollcallError {
    fn from(e: serde_json::Error) -> Self {
        Self::Format(e.to_string())
    }
}
