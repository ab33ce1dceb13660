use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::super::domain::{Candidate, Requisition};
use super::super::snapshot::Snapshot;

const ALL: &str = "All";

/// Dashboard scope. Requisitions are matched on start-date year and month,
/// department, and recruiter; a missing value or `All` leaves that axis open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dept: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recruiter: Option<String>,
}

impl DashboardFilter {
    pub fn matches(&self, requisition: &Requisition) -> bool {
        if self.year.is_some() || self.month.is_some() {
            let Some(start) = requisition.start_date else {
                return false;
            };
            if self.year.is_some_and(|year| start.year() != year) {
                return false;
            }
            if self.month.is_some_and(|month| start.month() != month) {
                return false;
            }
        }
        text_matches(self.dept.as_deref(), &requisition.dept)
            && text_matches(self.recruiter.as_deref(), &requisition.recruiter)
    }

    /// Requisitions in scope, plus the candidates attached to them.
    pub fn scope<'a>(&self, snapshot: &'a Snapshot) -> (Vec<&'a Requisition>, Vec<&'a Candidate>) {
        let requisitions: Vec<&Requisition> = snapshot
            .requisitions
            .iter()
            .filter(|requisition| self.matches(requisition))
            .collect();
        let candidates = snapshot
            .candidates
            .iter()
            .filter(|candidate| {
                requisitions
                    .iter()
                    .any(|requisition| requisition.req_id == candidate.req_id)
            })
            .collect();
        (requisitions, candidates)
    }

    /// Recruiter named by the filter, if one is selected.
    pub fn selected_recruiter(&self) -> Option<&str> {
        self.recruiter
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty() && *value != ALL)
    }
}

fn text_matches(wanted: Option<&str>, actual: &str) -> bool {
    match wanted.map(str::trim) {
        None | Some("") | Some(ALL) => true,
        Some(value) => value == actual,
    }
}
