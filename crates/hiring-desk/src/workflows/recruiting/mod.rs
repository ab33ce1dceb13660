//! Recruiting workflow: requisition SLA policy, the candidate stage machine, and the
//! service and HTTP surface composing them over a snapshot held by an external backend.

pub mod domain;
pub mod export;
pub mod gateway;
pub mod hire;
pub mod pipeline;
pub mod report;
pub mod router;
pub mod service;
pub mod sla;
pub mod snapshot;

pub use domain::{
    AuditEntry, Candidate, CandidateId, CandidateStage, Employee, EmployeeCode, Layer,
    PerformanceReview, RecordKind, Referral, Requisition, RequisitionId, RequisitionStatus,
    Training, UnknownStatus,
};
pub use export::{export_csv, write_csv, ExportError};
pub use gateway::{EntityKey, GatewayError, Mutation, RequisitionUpdate, SnapshotGateway};
pub use hire::{HireReport, HireSaga, HireStep, SagaFailure};
pub use pipeline::{Assessment, HireOutcome, PipelineError};
pub use report::{DashboardFilter, DashboardReport, PositionStatusRow};
pub use router::recruiting_router;
pub use service::{RecruitingService, ServiceError};
pub use sla::{
    AgingBucket, AgingBuckets, ExtensionMode, ExtensionRequest, SlaError, SlaPolicy, SlaState,
    SlaStatus,
};
pub use snapshot::{Snapshot, SnapshotError};

#[cfg(test)]
mod tests;
