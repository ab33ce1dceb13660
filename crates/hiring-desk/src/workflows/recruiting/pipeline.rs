//! Candidate stage machine. Every command is pure: it returns the next state and
//! leaves persistence to the caller.

use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{
    Candidate, CandidateStage, Employee, EmployeeCode, Requisition, RequisitionStatus,
    ACTIVE_EMPLOYEE, NO_MANAGER, UNASSIGNED,
};

pub const MAX_HR_SCORE: u8 = 5;
pub const MAX_TECH_SCORE: u8 = 50;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("a rejection reason is required")]
    MissingRejectionReason,
    #[error("hr score {0} is outside 0..={}", MAX_HR_SCORE)]
    HrScoreOutOfRange(u8),
    #[error("technical score {0} is outside 0..={}", MAX_TECH_SCORE)]
    TechScoreOutOfRange(u8),
    #[error("cannot {action} a candidate who is already {}", .from.label())]
    InvalidTransition {
        from: CandidateStage,
        action: &'static str,
    },
}

impl PipelineError {
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::InvalidTransition { .. })
    }
}

/// Move a candidate one stage forward. Candidates at `Job Offer Phase` or in a
/// terminal stage come back unchanged.
pub fn advance(candidate: &Candidate) -> Candidate {
    let mut next = candidate.clone();
    if let Some(stage) = candidate.status.next() {
        next.status = stage;
    }
    next
}

/// The three coordinated records produced by a hire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HireOutcome {
    pub candidate: Candidate,
    pub employee: Employee,
    /// Present only when the candidate's requisition exists.
    pub requisition: Option<Requisition>,
}

/// Finalize a hire. Title, department, and manager are copied from the matched
/// requisition at this moment; without a match they fall back to sentinels.
pub fn hire(
    candidate: &Candidate,
    requisition: Option<&Requisition>,
    hire_date: NaiveDate,
    employee_code: EmployeeCode,
) -> Result<HireOutcome, PipelineError> {
    if candidate.status.is_terminal() {
        return Err(PipelineError::InvalidTransition {
            from: candidate.status,
            action: "hire",
        });
    }

    let requisition = requisition.filter(|requisition| requisition.req_id == candidate.req_id);

    let mut hired = candidate.clone();
    hired.status = CandidateStage::Hired;

    let employee = Employee {
        code: employee_code,
        name: candidate.name.clone(),
        title: requisition
            .map(|r| r.title.clone())
            .unwrap_or_else(|| UNASSIGNED.to_string()),
        dept: requisition
            .map(|r| r.dept.clone())
            .unwrap_or_else(|| UNASSIGNED.to_string()),
        manager: requisition
            .map(|r| r.requester_name.clone())
            .unwrap_or_else(|| NO_MANAGER.to_string()),
        recruiter: candidate.recruiter.clone(),
        email: candidate.email.clone(),
        phone: candidate.phone.clone(),
        start_date: Some(hire_date),
        status: ACTIVE_EMPLOYEE.to_string(),
    };

    let requisition = requisition.map(|requisition| {
        let mut filled = requisition.clone();
        filled.status = RequisitionStatus::Filled;
        filled.filled_date = Some(hire_date);
        filled
    });

    Ok(HireOutcome {
        candidate: hired,
        employee,
        requisition,
    })
}

/// Reject a candidate out of band with a mandatory reason.
pub fn reject(candidate: &Candidate, reason: &str) -> Result<Candidate, PipelineError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(PipelineError::MissingRejectionReason);
    }
    if candidate.status.is_terminal() {
        return Err(PipelineError::InvalidTransition {
            from: candidate.status,
            action: "reject",
        });
    }

    let mut rejected = candidate.clone();
    rejected.status = CandidateStage::Rejected;
    rejected.rejection_reason = Some(reason.to_string());
    Ok(rejected)
}

/// Interview scores and notes captured from the candidate profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub hr_score: u8,
    pub tech_score: u8,
    pub notes: String,
}

pub fn record_assessment(
    candidate: &Candidate,
    assessment: &Assessment,
) -> Result<Candidate, PipelineError> {
    if assessment.hr_score > MAX_HR_SCORE {
        return Err(PipelineError::HrScoreOutOfRange(assessment.hr_score));
    }
    if assessment.tech_score > MAX_TECH_SCORE {
        return Err(PipelineError::TechScoreOutOfRange(assessment.tech_score));
    }

    let mut scored = candidate.clone();
    scored.hr_score = assessment.hr_score;
    scored.tech_score = assessment.tech_score;
    scored.notes = assessment.notes.trim().to_string();
    Ok(scored)
}
