use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use super::domain::{
    Candidate, CandidateId, CandidateStage, RecordKind, Requisition, RequisitionId,
};
use super::gateway::{EntityKey, GatewayError, Mutation, RequisitionUpdate, SnapshotGateway};
use super::hire::{HireReport, HireSaga};
use super::pipeline::{self, Assessment, PipelineError};
use super::report::{DashboardFilter, DashboardReport, PositionStatusRow};
use super::sla::{self, ExtensionMode, ExtensionRequest, SlaError, SlaPolicy, SlaStatus};
use super::snapshot::Snapshot;

/// Service composing the policy engine, stage machine, and data-access gateway around
/// a locally held snapshot.
pub struct RecruitingService<G> {
    gateway: Arc<G>,
    snapshot: RwLock<Snapshot>,
    in_flight: Mutex<HashSet<EntityKey>>,
    /// Held from identifier generation until the write that consumes the identifier.
    allocation: Mutex<()>,
    policy: SlaPolicy,
}

impl<G> RecruitingService<G>
where
    G: SnapshotGateway + 'static,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self::with_policy(gateway, SlaPolicy::standard())
    }

    pub fn with_policy(gateway: Arc<G>, policy: SlaPolicy) -> Self {
        Self {
            gateway,
            snapshot: RwLock::new(Snapshot::default()),
            in_flight: Mutex::new(HashSet::new()),
            allocation: Mutex::new(()),
            policy,
        }
    }

    /// Build the service and pull the first snapshot.
    pub fn connect(gateway: Arc<G>) -> Result<Self, ServiceError> {
        let service = Self::new(gateway);
        service.reload()?;
        Ok(service)
    }

    pub fn policy(&self) -> &SlaPolicy {
        &self.policy
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the local snapshot with the backend's. Unsaved local state is discarded.
    pub fn reload(&self) -> Result<(), ServiceError> {
        let next = self.gateway.fetch_snapshot()?;
        debug!(
            requisitions = next.requisitions.len(),
            candidates = next.candidates.len(),
            "snapshot reloaded"
        );
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = next;
        Ok(())
    }

    pub fn requisition_sla(
        &self,
        id: &RequisitionId,
        today: NaiveDate,
    ) -> Result<SlaStatus, ServiceError> {
        let requisition = self.find_requisition(id)?;
        Ok(sla::classify_sla(&requisition, today))
    }

    pub fn preview_extension(
        &self,
        id: &RequisitionId,
        mode: ExtensionMode,
    ) -> Result<Option<NaiveDate>, ServiceError> {
        let requisition = self.find_requisition(id)?;
        Ok(sla::preview_extension(&requisition, mode, &self.policy))
    }

    pub fn dashboard(&self, filter: &DashboardFilter, today: NaiveDate) -> DashboardReport {
        DashboardReport::build(&self.snapshot(), filter, today)
    }

    pub fn positions(&self, title: Option<&str>, today: NaiveDate) -> Vec<PositionStatusRow> {
        PositionStatusRow::collect(&self.snapshot(), title, today)
    }

    /// Persist a raw mutation after boundary checks. Blank identifiers are generated and
    /// requisition target dates are derived from the policy, never taken from the payload.
    pub fn save(&self, mutation: Mutation, actor: &str) -> Result<Mutation, ServiceError> {
        let _allocation = needs_generated_id(&mutation).then(|| lock(&self.allocation));
        let mutation = self.assign_id(mutation);
        let _guard = self.claim(vec![mutation.entity_key()])?;
        let mutation = self.prepare(mutation)?;
        self.persist(&mutation, actor)?;
        Ok(mutation)
    }

    pub fn remove(&self, kind: RecordKind, key: &str, actor: &str) -> Result<(), ServiceError> {
        let _guard = self.claim(vec![EntityKey::for_record(kind, key)])?;
        self.gateway.remove(kind, key, actor)?;
        info!(collection = kind.collection(), key, actor, "record removed");
        self.refresh();
        Ok(())
    }

    /// Advance one stage. Candidates that cannot advance are returned unchanged and
    /// nothing is persisted.
    pub fn advance_candidate(
        &self,
        id: &CandidateId,
        actor: &str,
    ) -> Result<Candidate, ServiceError> {
        let _guard = self.claim(vec![EntityKey::Candidate(id.clone())])?;
        let current = self.find_candidate(id)?;
        let next = pipeline::advance(&current);
        if next == current {
            debug!(candidate = %id, stage = %current.status, "advance is a no-op");
            return Ok(current);
        }

        self.persist(&Mutation::UpdateCandidate(next.clone()), actor)?;
        Ok(next)
    }

    pub fn reject_candidate(
        &self,
        id: &CandidateId,
        reason: &str,
        actor: &str,
    ) -> Result<Candidate, ServiceError> {
        let _guard = self.claim(vec![EntityKey::Candidate(id.clone())])?;
        let current = self.find_candidate(id)?;
        let rejected = pipeline::reject(&current, reason)?;
        self.persist(&Mutation::UpdateCandidate(rejected.clone()), actor)?;
        Ok(rejected)
    }

    pub fn record_assessment(
        &self,
        id: &CandidateId,
        assessment: &Assessment,
        actor: &str,
    ) -> Result<Candidate, ServiceError> {
        let _guard = self.claim(vec![EntityKey::Candidate(id.clone())])?;
        let current = self.find_candidate(id)?;
        let scored = pipeline::record_assessment(&current, assessment)?;
        self.persist(&Mutation::UpdateCandidate(scored.clone()), actor)?;
        Ok(scored)
    }

    /// Run the hire transaction. A failure after the first persisted step surfaces as
    /// `PartialFailure` with the step report; the local snapshot is left untouched.
    pub fn hire_candidate(
        &self,
        id: &CandidateId,
        hire_date: NaiveDate,
        actor: &str,
    ) -> Result<HireReport, ServiceError> {
        let _allocation = lock(&self.allocation);
        let req_id = self.find_candidate(id)?.req_id;
        let _guard = self.claim(vec![
            EntityKey::Candidate(id.clone()),
            EntityKey::Requisition(req_id.clone()),
        ])?;

        let snapshot = self.snapshot();
        let candidate = snapshot.candidate(id).ok_or_else(|| not_found_candidate(id))?;
        if candidate.req_id != req_id {
            warn!(candidate = %id, "candidate moved requisitions while the hire was claimed");
            return Err(ServiceError::Busy(EntityKey::Candidate(id.clone())));
        }
        let requisition = snapshot.requisition(&candidate.req_id);
        if requisition.is_none() {
            debug!(candidate = %id, req_id = %candidate.req_id, "hiring without a matching requisition");
        }

        let outcome = pipeline::hire(
            candidate,
            requisition,
            hire_date,
            snapshot.next_employee_code(),
        )?;
        let saga = HireSaga::new(outcome);

        match saga.execute(self.gateway.as_ref(), actor) {
            Ok(report) => {
                info!(candidate = %id, employee = %report.employee_code, "candidate hired");
                self.refresh();
                Ok(report)
            }
            Err(failure) if failure.is_partial() => {
                Err(ServiceError::PartialFailure(failure.report))
            }
            Err(failure) => Err(ServiceError::Gateway(failure.source)),
        }
    }

    pub fn extend_requisition(
        &self,
        id: &RequisitionId,
        request: &ExtensionRequest,
        now: NaiveDateTime,
    ) -> Result<Requisition, ServiceError> {
        let _guard = self.claim(vec![EntityKey::Requisition(id.clone())])?;
        let current = self.find_requisition(id)?;
        let outcome = sla::apply_extension(&current, request, &self.policy, now)?;

        let mutation = Mutation::UpdateRequisition(RequisitionUpdate {
            requisition: outcome.requisition.clone(),
            extension: Some(outcome.audit),
        });
        self.persist(&mutation, &request.actor)?;
        Ok(outcome.requisition)
    }

    /// Mark an entity as having a write in flight. The claim is released on drop.
    pub(crate) fn claim(&self, keys: Vec<EntityKey>) -> Result<InFlight<'_>, ServiceError> {
        let mut registry = lock(&self.in_flight);
        if let Some(busy) = keys.iter().find(|key| registry.contains(*key)) {
            warn!(entity = %busy, "rejecting concurrent mutation");
            return Err(ServiceError::Busy(busy.clone()));
        }
        registry.extend(keys.iter().cloned());
        Ok(InFlight {
            registry: &self.in_flight,
            keys,
        })
    }

    fn persist(&self, mutation: &Mutation, actor: &str) -> Result<(), ServiceError> {
        self.gateway.persist(mutation, actor)?;
        info!(
            kind = mutation.kind(),
            entity = %mutation.entity_key(),
            actor,
            "mutation persisted"
        );
        self.refresh();
        Ok(())
    }

    /// Reload after a successful write. The write already landed, so a failed reload
    /// only leaves the local copy stale until the next one.
    fn refresh(&self) {
        if let Err(err) = self.reload() {
            warn!(error = %err, "snapshot reload failed after write");
        }
    }

    fn assign_id(&self, mutation: Mutation) -> Mutation {
        match mutation {
            Mutation::Requisition(mut requisition) if requisition.req_id.as_str().trim().is_empty() => {
                requisition.req_id = self.snapshot().next_requisition_id();
                Mutation::Requisition(requisition)
            }
            Mutation::Candidate(mut candidate) if candidate.id.as_str().trim().is_empty() => {
                candidate.id = self.snapshot().next_candidate_id();
                Mutation::Candidate(candidate)
            }
            other => other,
        }
    }

    /// Validate against the current snapshot. Callers hold the entity's claim.
    fn prepare(&self, mutation: Mutation) -> Result<Mutation, ServiceError> {
        let snapshot = self.snapshot();
        match mutation {
            Mutation::Requisition(mut requisition) => {
                requisition.target_date = self
                    .policy
                    .target_date(requisition.start_date, requisition.layer.as_ref())
                    .ok();
                requisition.extension_count = 0;
                ensure_fill_state(&requisition)?;
                Ok(Mutation::Requisition(requisition))
            }
            Mutation::UpdateRequisition(RequisitionUpdate {
                mut requisition,
                extension,
            }) => {
                let current = snapshot
                    .requisition(&requisition.req_id)
                    .ok_or_else(|| not_found_requisition(&requisition.req_id))?;
                if extension.is_some() {
                    return Err(ServiceError::Validation(
                        "SLA extensions are applied through the extend command".to_string(),
                    ));
                }
                if requisition.extension_count != current.extension_count {
                    return Err(ServiceError::Validation(
                        "extension_count only changes through an SLA extension".to_string(),
                    ));
                }
                let expected = self.updated_target(current, &requisition);
                if requisition.target_date != expected
                    && requisition.target_date != current.target_date
                {
                    return Err(ServiceError::Validation(
                        "target_date only moves through an SLA extension".to_string(),
                    ));
                }
                requisition.target_date = expected;
                ensure_fill_state(&requisition)?;
                Ok(Mutation::UpdateRequisition(RequisitionUpdate {
                    requisition,
                    extension: None,
                }))
            }
            Mutation::Candidate(candidate) => {
                if candidate.status == CandidateStage::Hired {
                    return Err(ServiceError::Validation(
                        "candidates are hired through the hire command".to_string(),
                    ));
                }
                ensure_rejection_reason(&candidate)?;
                Ok(Mutation::Candidate(candidate))
            }
            Mutation::UpdateCandidate(candidate) => {
                let current = snapshot
                    .candidate(&candidate.id)
                    .ok_or_else(|| not_found_candidate(&candidate.id))?;
                if !current.status.can_transition_to(candidate.status) {
                    return Err(ServiceError::InvalidTransition {
                        from: current.status,
                        to: candidate.status,
                    });
                }
                ensure_rejection_reason(&candidate)?;
                Ok(Mutation::UpdateCandidate(candidate))
            }
            other => Ok(other),
        }
    }

    /// Target date an edited requisition must carry. Editing the start date or layer of
    /// a never-extended requisition re-derives the policy target; otherwise it is kept.
    fn updated_target(&self, current: &Requisition, edited: &Requisition) -> Option<NaiveDate> {
        let rescheduled =
            edited.start_date != current.start_date || edited.layer != current.layer;
        if rescheduled && current.extension_count == 0 {
            self.policy
                .target_date(edited.start_date, edited.layer.as_ref())
                .ok()
        } else {
            current.target_date
        }
    }

    fn find_candidate(&self, id: &CandidateId) -> Result<Candidate, ServiceError> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .candidate(id)
            .cloned()
            .ok_or_else(|| not_found_candidate(id))
    }

    fn find_requisition(&self, id: &RequisitionId) -> Result<Requisition, ServiceError> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .requisition(id)
            .cloned()
            .ok_or_else(|| not_found_requisition(id))
    }
}

/// Held while a write against the listed entities is outstanding.
pub(crate) struct InFlight<'a> {
    registry: &'a Mutex<HashSet<EntityKey>>,
    keys: Vec<EntityKey>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut registry = lock(self.registry);
        for key in &self.keys {
            registry.remove(key);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn needs_generated_id(mutation: &Mutation) -> bool {
    match mutation {
        Mutation::Requisition(requisition) => requisition.req_id.as_str().trim().is_empty(),
        Mutation::Candidate(candidate) => candidate.id.as_str().trim().is_empty(),
        _ => false,
    }
}

fn ensure_fill_state(requisition: &Requisition) -> Result<(), ServiceError> {
    if requisition.fill_state_consistent() {
        Ok(())
    } else {
        Err(ServiceError::Validation(format!(
            "requisition {} must carry a filled_date exactly when its status is Filled",
            requisition.req_id
        )))
    }
}

fn ensure_rejection_reason(candidate: &Candidate) -> Result<(), ServiceError> {
    let rejected = candidate.status == CandidateStage::Rejected;
    let has_reason = candidate
        .rejection_reason
        .as_deref()
        .is_some_and(|reason| !reason.trim().is_empty());
    match (rejected, has_reason) {
        (true, false) => Err(PipelineError::MissingRejectionReason.into()),
        (false, true) => Err(ServiceError::Validation(
            "rejection_reason is only recorded for rejected candidates".to_string(),
        )),
        _ => Ok(()),
    }
}

fn not_found_candidate(id: &CandidateId) -> ServiceError {
    ServiceError::NotFound {
        kind: "candidate",
        key: id.to_string(),
    }
}

fn not_found_requisition(id: &RequisitionId) -> ServiceError {
    ServiceError::NotFound {
        kind: "requisition",
        key: id.to_string(),
    }
}

/// Error raised by the recruiting service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Sla(#[from] SlaError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("invalid payload: {0}")]
    Validation(String),
    #[error("cannot move candidate from {} to {}", .from.label(), .to.label())]
    InvalidTransition {
        from: CandidateStage,
        to: CandidateStage,
    },
    #[error("{kind} {key} not found")]
    NotFound { kind: &'static str, key: String },
    #[error("{0} already has a change in flight")]
    Busy(EntityKey),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("hire partially persisted: {0}")]
    PartialFailure(HireReport),
}

impl ServiceError {
    /// Missing or malformed caller input; nothing was changed.
    pub fn is_validation(&self) -> bool {
        match self {
            Self::Sla(_) | Self::Validation(_) => true,
            Self::Pipeline(err) => err.is_validation(),
            _ => false,
        }
    }
}
