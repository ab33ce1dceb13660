use chrono::NaiveDate;
use serde::Serialize;

use super::super::domain::{CandidateStage, RequisitionId, RequisitionStatus};
use super::super::sla::{classify_sla, SlaStatus};
use super::super::snapshot::Snapshot;

/// Days from start to fill, or days running for a requisition still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "days", rename_all = "snake_case")]
pub enum TimeToFill {
    Filled(i64),
    Running(i64),
    Unknown,
}

impl TimeToFill {
    pub fn summary(&self) -> String {
        match self {
            Self::Filled(days) => format!("{days} Days"),
            Self::Running(days) => format!("Running ({days} Days)"),
            Self::Unknown => "-".to_string(),
        }
    }
}

/// One line of the positions status table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionStatusRow {
    pub req_id: RequisitionId,
    pub title: String,
    pub recruiter: String,
    pub status: RequisitionStatus,
    pub candidate_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hired_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filled_date: Option<NaiveDate>,
    pub time_to_fill: TimeToFill,
    pub sla: SlaStatus,
    pub sla_summary: String,
}

impl PositionStatusRow {
    /// Rows for every requisition, optionally narrowed to one position title.
    pub fn collect(snapshot: &Snapshot, title: Option<&str>, today: NaiveDate) -> Vec<Self> {
        snapshot
            .requisitions
            .iter()
            .filter(|requisition| {
                title
                    .map(str::trim)
                    .filter(|title| !title.is_empty() && *title != "All")
                    .map_or(true, |title| requisition.title == title)
            })
            .map(|requisition| {
                let hired_name = snapshot
                    .candidates_for(&requisition.req_id)
                    .find(|candidate| candidate.status == CandidateStage::Hired)
                    .map(|candidate| candidate.name.clone());

                let time_to_fill = match (requisition.status, requisition.start_date) {
                    (RequisitionStatus::Filled, Some(start)) => requisition
                        .filled_date
                        .map_or(TimeToFill::Unknown, |filled| {
                            TimeToFill::Filled((filled - start).num_days())
                        }),
                    (RequisitionStatus::Rejected, _) | (_, None) => TimeToFill::Unknown,
                    (_, Some(start)) => TimeToFill::Running((today - start).num_days()),
                };

                let sla = classify_sla(requisition, today);
                Self {
                    req_id: requisition.req_id.clone(),
                    title: requisition.title.clone(),
                    recruiter: requisition.recruiter.clone(),
                    status: requisition.status,
                    candidate_count: snapshot.candidates_for(&requisition.req_id).count(),
                    hired_name,
                    filled_date: requisition.filled_date,
                    time_to_fill,
                    sla,
                    sla_summary: sla.summary(),
                }
            })
            .collect()
    }
}
