use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::domain::{
    AuditEntry, Candidate, CandidateId, Employee, EmployeeCode, PerformanceReview, RecordKind,
    Referral, Requisition, RequisitionId, Training,
};
use super::snapshot::Snapshot;

/// Requisition replacement, optionally carrying the extension record that justified it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequisitionUpdate {
    pub requisition: Requisition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<AuditEntry>,
}

/// A single write sent to the backend. Serialized as `{ "type": ..., "payload": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Mutation {
    Requisition(Requisition),
    Candidate(Candidate),
    UpdateCandidate(Candidate),
    UpdateRequisition(RequisitionUpdate),
    Training(Training),
    Performance(PerformanceReview),
    Referral(Referral),
    HireEmployee(Employee),
}

impl Mutation {
    /// Rebuild a mutation from its wire parts.
    pub fn from_parts(kind: &str, payload: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(json!({ "type": kind, "payload": payload }))
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Requisition(_) => "requisition",
            Self::Candidate(_) => "candidate",
            Self::UpdateCandidate(_) => "update_candidate",
            Self::UpdateRequisition(_) => "update_requisition",
            Self::Training(_) => "training",
            Self::Performance(_) => "performance",
            Self::Referral(_) => "referral",
            Self::HireEmployee(_) => "hire_employee",
        }
    }

    /// Entity the mutation writes to, used to serialize writes per key.
    pub fn entity_key(&self) -> EntityKey {
        match self {
            Self::Requisition(requisition) => EntityKey::Requisition(requisition.req_id.clone()),
            Self::UpdateRequisition(update) => {
                EntityKey::Requisition(update.requisition.req_id.clone())
            }
            Self::Candidate(candidate) | Self::UpdateCandidate(candidate) => {
                EntityKey::Candidate(candidate.id.clone())
            }
            Self::HireEmployee(employee) => EntityKey::Employee(employee.code.clone()),
            Self::Training(training) => {
                EntityKey::Record(RecordKind::Trainings, training.id.clone())
            }
            Self::Performance(review) => {
                EntityKey::Record(RecordKind::PerformanceReviews, review.id.clone())
            }
            Self::Referral(referral) => {
                EntityKey::Record(RecordKind::Referrals, referral.id.clone())
            }
        }
    }
}

/// Key of an entity within the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Requisition(RequisitionId),
    Candidate(CandidateId),
    Employee(EmployeeCode),
    Record(RecordKind, String),
}

impl EntityKey {
    pub fn for_record(kind: RecordKind, key: &str) -> Self {
        match kind {
            RecordKind::Requisitions => Self::Requisition(RequisitionId::new(key)),
            RecordKind::Candidates => Self::Candidate(CandidateId::new(key)),
            RecordKind::Employees => Self::Employee(EmployeeCode::new(key)),
            other => Self::Record(other, key.to_string()),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requisition(id) => write!(f, "requisition {id}"),
            Self::Candidate(id) => write!(f, "candidate {id}"),
            Self::Employee(code) => write!(f, "employee {code}"),
            Self::Record(kind, key) => write!(f, "{} {key}", kind.label().to_lowercase()),
        }
    }
}

/// Data-access seam to the backend that owns the authoritative snapshot.
pub trait SnapshotGateway: Send + Sync {
    /// Full snapshot; callers replace their local copy wholesale.
    fn fetch_snapshot(&self) -> Result<Snapshot, GatewayError>;
    fn persist(&self, mutation: &Mutation, actor: &str) -> Result<(), GatewayError>;
    fn remove(&self, kind: RecordKind, key: &str, actor: &str) -> Result<(), GatewayError>;
}

/// Failure reported by the data-access collaborator. Always recoverable by retrying.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("backend rejected the request: {0}")]
    Rejected(String),
}
