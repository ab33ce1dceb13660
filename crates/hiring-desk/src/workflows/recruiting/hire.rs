use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use super::domain::{CandidateId, EmployeeCode, RequisitionId};
use super::gateway::{GatewayError, Mutation, RequisitionUpdate, SnapshotGateway};
use super::pipeline::HireOutcome;

/// One persisted write of the hire transaction, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HireStep {
    UpdateCandidate,
    CreateEmployee,
    FillRequisition,
}

impl HireStep {
    pub const fn label(self) -> &'static str {
        match self {
            Self::UpdateCandidate => "update candidate",
            Self::CreateEmployee => "create employee",
            Self::FillRequisition => "fill requisition",
        }
    }
}

/// Which hire steps reached the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HireReport {
    pub candidate_id: CandidateId,
    pub employee_code: EmployeeCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requisition_id: Option<RequisitionId>,
    pub completed: Vec<HireStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<HireStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HireReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_none()
    }
}

impl fmt::Display for HireReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let completed: Vec<&str> = self.completed.iter().map(|step| step.label()).collect();
        write!(
            f,
            "hire of {} completed [{}]",
            self.candidate_id,
            completed.join(", ")
        )?;
        if let Some(step) = self.failed {
            write!(f, ", failed at {}", step.label())?;
        }
        if let Some(error) = &self.error {
            write!(f, ": {error}")?;
        }
        Ok(())
    }
}

/// Hire persistence failed. `report` tells which steps had already landed.
#[derive(Debug, Clone)]
pub struct SagaFailure {
    pub report: HireReport,
    pub source: GatewayError,
}

impl SagaFailure {
    /// At least one earlier step was persisted, so backend and caller may disagree.
    pub fn is_partial(&self) -> bool {
        !self.report.completed.is_empty()
    }
}

/// Transaction script for the candidate, employee, and requisition writes of a hire.
/// Steps run in order and stop at the first failure; nothing is compensated.
pub struct HireSaga {
    outcome: HireOutcome,
}

impl HireSaga {
    pub fn new(outcome: HireOutcome) -> Self {
        Self { outcome }
    }

    pub fn outcome(&self) -> &HireOutcome {
        &self.outcome
    }

    pub fn steps(&self) -> Vec<(HireStep, Mutation)> {
        let mut steps = vec![
            (
                HireStep::UpdateCandidate,
                Mutation::UpdateCandidate(self.outcome.candidate.clone()),
            ),
            (
                HireStep::CreateEmployee,
                Mutation::HireEmployee(self.outcome.employee.clone()),
            ),
        ];
        if let Some(requisition) = &self.outcome.requisition {
            steps.push((
                HireStep::FillRequisition,
                Mutation::UpdateRequisition(RequisitionUpdate {
                    requisition: requisition.clone(),
                    extension: None,
                }),
            ));
        }
        steps
    }

    pub fn execute<G>(&self, gateway: &G, actor: &str) -> Result<HireReport, SagaFailure>
    where
        G: SnapshotGateway + ?Sized,
    {
        let mut report = HireReport {
            candidate_id: self.outcome.candidate.id.clone(),
            employee_code: self.outcome.employee.code.clone(),
            requisition_id: self
                .outcome
                .requisition
                .as_ref()
                .map(|requisition| requisition.req_id.clone()),
            completed: Vec::new(),
            failed: None,
            error: None,
        };

        for (step, mutation) in self.steps() {
            match gateway.persist(&mutation, actor) {
                Ok(()) => {
                    info!(candidate = %report.candidate_id, step = step.label(), "hire step persisted");
                    report.completed.push(step);
                }
                Err(source) => {
                    warn!(
                        candidate = %report.candidate_id,
                        step = step.label(),
                        completed = report.completed.len(),
                        error = %source,
                        "hire step failed"
                    );
                    report.failed = Some(step);
                    report.error = Some(source.to_string());
                    return Err(SagaFailure { report, source });
                }
            }
        }

        Ok(report)
    }
}
