//! # Module Feedback
//!
//! Free-text feedback enrolled students leave on a module.

use crate::access::{self, Viewer};
use crate::error::RollcallError;
use crate::model::{FeedbackId, ModuleFeedback, ModuleId};
use crate::registry::Registry;
use crate::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const FEEDBACK_MAX: usize = 1000;

pub const FILL_ALL_FIELDS: &str = "Please fill in all form fields";
pub const FEEDBACK_LENGTH: &str = "Feedback should be between 1 and 1000 characters";

/// Shown instead of the student's name on anonymous feedback.
pub const ANONYMOUS: &str = "Anonymous";

/// A submitted feedback form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackForm {
    pub general: String,
    pub positive: String,
    pub constructive: String,
    pub other: String,
    #[serde(default)]
    pub anonymous: bool,
}

impl FeedbackForm {
    /// Every text is required and must be 1 to [`FEEDBACK_MAX`] characters.
    /// Whitespace counts as text.
    pub fn validate(&self) -> Result<()> {
        let texts = [&self.general, &self.positive, &self.constructive, &self.other];
        if texts.iter().any(|text| text.is_empty()) {
            return Err(RollcallError::Form(FILL_ALL_FIELDS.into()));
        }
        let out_of_range = texts
            .into_iter()
            .any(|text| !(1..=FEEDBACK_MAX).contains(&text.chars().count()));
        if out_of_range {
            return Err(RollcallError::Form(FEEDBACK_LENGTH.into()));
        }
        Ok(())
    }
}

/// Save feedback from an enrolled student, dated `today`.
pub fn submit(
    registry: &mut Registry,
    viewer: &Viewer,
    module: ModuleId,
    form: FeedbackForm,
    today: NaiveDate,
) -> Result<FeedbackId> {
    let (student, _) = access::feedback_giver(registry, viewer, module)?;
    form.validate()?;

    Ok(registry.insert_feedback(ModuleFeedback {
        id: FeedbackId::default(),
        module,
        student,
        general: form.general,
        positive: form.positive,
        constructive: form.constructive,
        other: form.other,
        date: today,
        anonymous: form.anonymous,
    }))
}

/// Feedback on a module, newest first. Students see only their own.
pub fn list<'a>(
    registry: &'a Registry,
    viewer: &Viewer,
    module: ModuleId,
) -> Result<Vec<&'a ModuleFeedback>> {
    let module = access::module(registry, viewer, module)?;
    Ok(registry.feedback_for(module.id, viewer.student()))
}

/// Who to show as the author.
#[must_use]
pub fn author(registry: &Registry, entry: &ModuleFeedback) -> String {
    if entry.anonymous {
        return ANONYMOUS.to_string();
    }
    registry
        .student(entry.student)
        .map(|s| s.person.display_name())
        .unwrap_or_else(|| ANONYMOUS.to_string())
}
