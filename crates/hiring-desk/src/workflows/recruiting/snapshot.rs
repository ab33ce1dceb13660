use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::domain::{
    AuditEntry, Candidate, CandidateId, Employee, EmployeeCode, PerformanceReview, RecordKind,
    Referral, Requisition, RequisitionId, Training,
};
use super::gateway::{Mutation, RequisitionUpdate};

/// The in-memory data set every query and command operates on. Entities refer to each
/// other by key only, so every lookup may come back empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub requisitions: Vec<Requisition>,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub trainings: Vec<Training>,
    #[serde(default)]
    pub performance_reviews: Vec<PerformanceReview>,
    #[serde(default)]
    pub referrals: Vec<Referral>,
    #[serde(default)]
    pub audit_log: Vec<AuditEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recruiters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("{kind} {key} not found")]
    NotFound { kind: &'static str, key: String },
    #[error("{kind} {key} already exists")]
    Conflict { kind: &'static str, key: String },
    #[error("{} cannot be removed", .0.collection())]
    Unsupported(RecordKind),
}

impl Snapshot {
    pub fn requisition(&self, id: &RequisitionId) -> Option<&Requisition> {
        self.requisitions.iter().find(|r| &r.req_id == id)
    }

    pub fn candidate(&self, id: &CandidateId) -> Option<&Candidate> {
        self.candidates.iter().find(|c| &c.id == id)
    }

    pub fn employee(&self, code: &EmployeeCode) -> Option<&Employee> {
        self.employees.iter().find(|e| &e.code == code)
    }

    pub fn candidates_for<'a>(
        &'a self,
        req_id: &'a RequisitionId,
    ) -> impl Iterator<Item = &'a Candidate> + 'a {
        self.candidates.iter().filter(move |c| &c.req_id == req_id)
    }

    /// Configured recruiter roster, or the distinct recruiters found on requisitions.
    pub fn recruiters(&self) -> Vec<String> {
        if !self.recruiters.is_empty() {
            return self.recruiters.clone();
        }
        self.requisitions
            .iter()
            .map(|r| r.recruiter.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn next_requisition_id(&self) -> RequisitionId {
        RequisitionId(next_sequence(
            "REQ",
            self.requisitions.iter().map(|r| r.req_id.as_str()),
        ))
    }

    pub fn next_candidate_id(&self) -> CandidateId {
        CandidateId(next_sequence(
            "CAND",
            self.candidates.iter().map(|c| c.id.as_str()),
        ))
    }

    /// Employee codes never repeat within a snapshot.
    pub fn next_employee_code(&self) -> EmployeeCode {
        EmployeeCode(next_sequence(
            "EMP",
            self.employees.iter().map(|e| e.code.as_str()),
        ))
    }

    /// Apply a persisted mutation the way the backend does and prepend an audit entry.
    pub fn apply(
        &mut self,
        mutation: &Mutation,
        actor: &str,
        now: NaiveDateTime,
    ) -> Result<(), SnapshotError> {
        let action = match mutation {
            Mutation::Requisition(requisition) => {
                if self.requisition(&requisition.req_id).is_some() {
                    return Err(SnapshotError::Conflict {
                        kind: "requisition",
                        key: requisition.req_id.to_string(),
                    });
                }
                self.requisitions.push(requisition.clone());
                format!("New Job Created: {}", requisition.req_id)
            }
            Mutation::UpdateRequisition(RequisitionUpdate {
                requisition,
                extension,
            }) => {
                let slot = self
                    .requisitions
                    .iter_mut()
                    .find(|r| r.req_id == requisition.req_id)
                    .ok_or_else(|| SnapshotError::NotFound {
                        kind: "requisition",
                        key: requisition.req_id.to_string(),
                    })?;
                *slot = requisition.clone();
                if let Some(entry) = extension {
                    self.audit_log.insert(0, entry.clone());
                    return Ok(());
                }
                format!("Job Updated: {}", requisition.req_id)
            }
            Mutation::Candidate(candidate) => {
                if self.candidate(&candidate.id).is_some() {
                    return Err(SnapshotError::Conflict {
                        kind: "candidate",
                        key: candidate.id.to_string(),
                    });
                }
                self.candidates.push(candidate.clone());
                format!("New Candidate: {}", candidate.name)
            }
            Mutation::UpdateCandidate(candidate) => {
                let slot = self
                    .candidates
                    .iter_mut()
                    .find(|c| c.id == candidate.id)
                    .ok_or_else(|| SnapshotError::NotFound {
                        kind: "candidate",
                        key: candidate.id.to_string(),
                    })?;
                *slot = candidate.clone();
                format!(
                    "Candidate Status Change: {} -> {}",
                    candidate.name, candidate.status
                )
            }
            Mutation::HireEmployee(employee) => {
                if self.employee(&employee.code).is_some() {
                    return Err(SnapshotError::Conflict {
                        kind: "employee",
                        key: employee.code.to_string(),
                    });
                }
                self.employees.push(employee.clone());
                format!("HIRED: {} added to Master Data", employee.name)
            }
            Mutation::Referral(referral) => {
                self.referrals.push(referral.clone());
                format!("New Referral: {}", referral.name)
            }
            Mutation::Training(training) => {
                self.trainings.push(training.clone());
                format!("New Training: {}", training.course_name)
            }
            Mutation::Performance(review) => {
                self.performance_reviews.push(review.clone());
                format!("New Performance Review: {}", review.employee_name)
            }
        };

        self.record(now, actor, action);
        Ok(())
    }

    /// Delete a record by key and log what was removed.
    pub fn remove(
        &mut self,
        kind: RecordKind,
        key: &str,
        actor: &str,
        now: NaiveDateTime,
    ) -> Result<(), SnapshotError> {
        let removed = match kind {
            RecordKind::Requisitions => take_by(&mut self.requisitions, |r| r.req_id.as_str() == key)
                .map(|r| r.title),
            RecordKind::Candidates => {
                take_by(&mut self.candidates, |c| c.id.as_str() == key).map(|c| c.name)
            }
            RecordKind::Employees => {
                take_by(&mut self.employees, |e| e.code.as_str() == key).map(|e| e.name)
            }
            RecordKind::Referrals => {
                take_by(&mut self.referrals, |r| r.id == key).map(|r| r.name)
            }
            RecordKind::Trainings => {
                take_by(&mut self.trainings, |t| t.id == key).map(|t| t.course_name)
            }
            RecordKind::PerformanceReviews => {
                take_by(&mut self.performance_reviews, |p| p.id == key).map(|p| p.employee_name)
            }
            RecordKind::AuditLog => return Err(SnapshotError::Unsupported(kind)),
        };

        let name = removed.ok_or_else(|| SnapshotError::NotFound {
            kind: kind.label(),
            key: key.to_string(),
        })?;
        let name = if name.trim().is_empty() {
            "Unknown".to_string()
        } else {
            name
        };

        self.record(now, actor, format!("{} deleted: {name}", kind.label()));
        Ok(())
    }

    fn record(&mut self, now: NaiveDateTime, actor: &str, action: String) {
        self.audit_log.insert(0, AuditEntry::new(now, actor, action));
    }
}

fn take_by<T>(items: &mut Vec<T>, predicate: impl Fn(&T) -> bool) -> Option<T> {
    let index = items.iter().position(predicate)?;
    Some(items.remove(index))
}

fn next_sequence<'a>(prefix: &str, existing: impl Iterator<Item = &'a str>) -> String {
    let marker = format!("{prefix}-");
    let highest = existing
        .filter_map(|id| id.strip_prefix(marker.as_str()))
        .filter_map(|suffix| suffix.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("{prefix}-{:04}", highest + 1)
}
