//! # Attendance Reports
//!
//! Periodic summaries for students, staff and admins. Building a report is
//! pure; delivering it is left to the caller.

use crate::access::Viewer;
use crate::aggregate::{self, DateRange, ModuleData};
use crate::model::Module;
use crate::registry::Registry;
use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use std::fmt::Write as _;

pub const SUBJECT: &str = "Attendance report";

/// How far back a report looks from its end date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    /// From the Monday of the end date's week.
    Weekly,
    /// From the first of the end date's month.
    Monthly,
}

impl ReportPeriod {
    #[must_use]
    pub fn from_date(self, to: NaiveDate) -> NaiveDate {
        match self {
            Self::Weekly => to
                .checked_sub_days(Days::new(u64::from(to.weekday().num_days_from_monday())))
                .unwrap_or(to),
            Self::Monthly => to.with_day(1).unwrap_or(to),
        }
    }

    #[must_use]
    pub fn range(self, to: NaiveDate) -> DateRange {
        DateRange::new(self.from_date(to), to)
    }
}

/// Who receives reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Audience {
    Students,
    Staff,
    Admins,
    AllUsers,
}

impl Audience {
    fn includes(self, viewer: &Viewer) -> bool {
        match (self, viewer) {
            (Self::AllUsers, _) => true,
            (Self::Students, Viewer::Student(_)) => true,
            (Self::Staff, Viewer::Staff(_)) => true,
            (Self::Admins, Viewer::Admin(_)) => true,
            _ => false,
        }
    }
}

/// One module's section of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleReport {
    pub module_code: String,
    pub module_crn: String,
    pub data: ModuleData,
}

/// A report for one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub username: String,
    pub email: String,
    pub recipient: Viewer,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub modules: Vec<ModuleReport>,
}

/// Reports to deliver, and the users left out for having no modules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportBatch {
    pub reports: Vec<Report>,
    pub skipped: Vec<String>,
}

/// Every account as a viewer: admins, then staff, then students.
fn recipients(registry: &Registry) -> Vec<Viewer> {
    registry
        .admins()
        .map(|a| Viewer::Admin(a.username.clone()))
        .chain(registry.staff().map(|s| Viewer::Staff(s.id)))
        .chain(registry.students().map(|s| Viewer::Student(s.id)))
        .collect()
}

fn modules_for<'a>(registry: &'a Registry, viewer: &Viewer) -> Vec<&'a Module> {
    match viewer {
        Viewer::Admin(_) => registry.modules().collect(),
        Viewer::Staff(id) => registry
            .staff_member(*id)
            .map(|s| s.modules.iter().filter_map(|m| registry.module(*m)).collect())
            .unwrap_or_default(),
        Viewer::Student(id) => registry.modules_of_student(*id).collect(),
    }
}

/// Build reports for the audience over the period ending `to`.
#[must_use]
pub fn build_reports(
    registry: &Registry,
    audience: Audience,
    period: ReportPeriod,
    to: NaiveDate,
) -> ReportBatch {
    let range = period.range(to);
    let mut batch = ReportBatch::default();

    for viewer in recipients(registry) {
        if !audience.includes(&viewer) {
            continue;
        }
        let Some((username, email)) = viewer.contact(registry) else {
            continue;
        };
        let (username, email) = (username.to_string(), email.to_string());

        let modules: Vec<ModuleReport> = modules_for(registry, &viewer)
            .into_iter()
            .map(|module| ModuleReport {
                module_code: module.module_code.clone(),
                module_crn: module.module_crn.clone(),
                data: aggregate::module_data(registry, module, &viewer, Some(range)),
            })
            .collect();

        if modules.is_empty() {
            batch.skipped.push(username);
            continue;
        }
        batch.reports.push(Report {
            username,
            email,
            recipient: viewer,
            from: range.from,
            to: range.to,
            modules,
        });
    }

    batch
}

impl Report {
    #[must_use]
    pub fn subject(&self) -> &'static str {
        SUBJECT
    }

    /// Plain-text body.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Attendance from {} to {}", self.from, self.to);

        for module in &self.modules {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "{} ({}): {}",
                module.module_code, module.module_crn, module.data.overall
            );
            if module.data.is_empty() {
                let _ = writeln!(out, "  No attendance recorded");
                continue;
            }
            match self.recipient {
                Viewer::Student(_) => {
                    for entry in module.data.students.iter().flat_map(|s| &s.entries) {
                        let mark = if entry.attended { "attended" } else { "absent" };
                        let _ = writeln!(out, "  {} {}: {mark}", entry.date, entry.session_id);
                    }
                }
                _ => {
                    let _ = writeln!(out, "  Students: {}", module.data.students.len());
                    for lecture in &module.data.lectures {
                        let _ = writeln!(
                            out,
                            "  {} {}: {}",
                            lecture.date, lecture.session_id, lecture.percent
                        );
                    }
                }
            }
        }
        out
    }

    /// The full message, headers then body.
    #[must_use]
    pub fn render_message(&self) -> String {
        format!(
            "To: {} <{}>\nSubject: {}\n\n{}",
            self.username,
            self.email,
            self.subject(),
            self.render_text()
        )
    }
}
