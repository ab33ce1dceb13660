use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::workflows::recruiting::{
    recruiting_router, AuditEntry, Candidate, CandidateId, CandidateStage, Employee, EmployeeCode,
    GatewayError, Layer, Mutation, PerformanceReview, RecordKind, RecruitingService, Requisition,
    RequisitionId, RequisitionStatus, Snapshot, SnapshotGateway, Training,
};

pub(super) const ACTOR: &str = "Manager (Admin)";

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn fixed_now() -> NaiveDateTime {
    date(2024, 3, 1).and_hms_opt(9, 30, 0).expect("valid time")
}

pub(super) fn requisition(
    id: &str,
    title: &str,
    layer: Option<Layer>,
    status: RequisitionStatus,
    start: Option<NaiveDate>,
    target: Option<NaiveDate>,
) -> Requisition {
    Requisition {
        req_id: RequisitionId::new(id),
        title: title.to_string(),
        dept: "Engineering".to_string(),
        recruiter: "Sara".to_string(),
        requester_name: "Omar Ali".to_string(),
        requester_code: "E-100".to_string(),
        layer,
        status,
        start_date: start,
        target_date: target,
        filled_date: None,
        extension_count: 0,
        responsibilities: String::new(),
        skills: String::new(),
    }
}

pub(super) fn candidate(id: &str, req_id: &str, name: &str, status: CandidateStage) -> Candidate {
    Candidate {
        id: CandidateId::new(id),
        req_id: RequisitionId::new(req_id),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone: "0100000000".to_string(),
        recruiter: "Sara".to_string(),
        source: "LinkedIn".to_string(),
        interview_date: None,
        applied_date: Some(date(2024, 1, 10)),
        status,
        hr_score: 0,
        tech_score: 0,
        notes: String::new(),
        rejection_reason: None,
    }
}

/// Four requisitions across layers and statuses with candidates at every stage.
pub(super) fn seeded_snapshot() -> Snapshot {
    let site_engineer = requisition(
        "REQ-0001",
        "Site Engineer",
        Some(Layer::Staff),
        RequisitionStatus::Approved,
        Some(date(2024, 1, 1)),
        Some(date(2024, 3, 16)),
    );

    let mut plant_manager = requisition(
        "REQ-0002",
        "Plant Manager",
        Some(Layer::Manager),
        RequisitionStatus::Filled,
        Some(date(2024, 1, 1)),
        Some(date(2024, 4, 15)),
    );
    plant_manager.dept = "Operations".to_string();
    plant_manager.filled_date = Some(date(2024, 4, 10));

    let mut forklift = requisition(
        "REQ-0003",
        "Forklift Operator",
        Some(Layer::BlueCollar),
        RequisitionStatus::Approved,
        Some(date(2024, 2, 1)),
        Some(date(2024, 3, 2)),
    );
    forklift.dept = "Operations".to_string();
    forklift.recruiter = "Hassan".to_string();

    let mut accountant = requisition(
        "REQ-0004",
        "Accountant",
        Some(Layer::Staff),
        RequisitionStatus::Rejected,
        Some(date(2024, 2, 10)),
        Some(date(2024, 4, 25)),
    );
    accountant.dept = "Finance".to_string();
    accountant.recruiter = "Hassan".to_string();

    let mut karim = candidate("CAND-0002", "REQ-0001", "Karim", CandidateStage::JobOfferPhase);
    karim.source = "Referral".to_string();

    let mut yousef = candidate(
        "CAND-0004",
        "REQ-0003",
        "Yousef",
        CandidateStage::TechnicalInterview,
    );
    yousef.recruiter = "Hassan".to_string();
    yousef.source = "Job Board".to_string();

    let mut maya = candidate("CAND-0005", "REQ-0004", "Maya", CandidateStage::Rejected);
    maya.recruiter = "Hassan".to_string();
    maya.rejection_reason = Some("Position cancelled".to_string());

    let mut orphan = candidate("CAND-0006", "REQ-0099", "Sami", CandidateStage::HrInterview);
    orphan.recruiter = "Hassan".to_string();

    Snapshot {
        requisitions: vec![site_engineer, plant_manager, forklift, accountant],
        candidates: vec![
            candidate("CAND-0001", "REQ-0001", "Lina", CandidateStage::PhoneScreen),
            karim,
            candidate("CAND-0003", "REQ-0002", "Nour", CandidateStage::Hired),
            yousef,
            maya,
            orphan,
        ],
        employees: vec![Employee {
            code: EmployeeCode::new("EMP-0001"),
            name: "Nour".to_string(),
            title: "Plant Manager".to_string(),
            dept: "Operations".to_string(),
            manager: "Omar Ali".to_string(),
            recruiter: "Sara".to_string(),
            email: "nour@example.com".to_string(),
            phone: "0100000000".to_string(),
            start_date: Some(date(2024, 4, 10)),
            status: "Active".to_string(),
        }],
        trainings: vec![Training {
            id: "TRN-1".to_string(),
            course_name: "Safety Basics".to_string(),
            kind: "Internal".to_string(),
            provider: "HSE".to_string(),
            date: Some(date(2024, 2, 5)),
            cost: 1500.0,
            status: "Planned".to_string(),
        }],
        performance_reviews: vec![
            PerformanceReview {
                id: "PR-1".to_string(),
                employee_name: "Nour".to_string(),
                period: "2024-Q1".to_string(),
                rating: 4.5,
                comment: String::new(),
            },
            PerformanceReview {
                id: "PR-2".to_string(),
                employee_name: "Adel".to_string(),
                period: "2024-Q1".to_string(),
                rating: 1.5,
                comment: String::new(),
            },
        ],
        referrals: Vec::new(),
        audit_log: vec![AuditEntry::new(fixed_now(), "System", "Seeded")],
        recruiters: Vec::new(),
    }
}

/// Backend double applying mutations to an owned snapshot. A persist call can be
/// scripted to fail by its 1-based position, or held until the test releases it.
#[derive(Default)]
pub(super) struct MemoryGateway {
    state: Mutex<Snapshot>,
    persisted: Mutex<Vec<Mutation>>,
    persist_calls: AtomicUsize,
    fail_at: Mutex<Option<usize>>,
    fetches: AtomicUsize,
    gate: Mutex<Option<PersistGate>>,
}

struct PersistGate {
    entered: Sender<()>,
    release: Receiver<()>,
}

impl MemoryGateway {
    pub(super) fn seeded(snapshot: Snapshot) -> Self {
        Self {
            state: Mutex::new(snapshot),
            ..Self::default()
        }
    }

    pub(super) fn fail_on_persist(&self, call: usize) {
        *self.fail_at.lock().expect("gateway mutex poisoned") = Some(call);
    }

    /// Hold the next persist call. The first channel signals that the call has
    /// started; sending on the second lets it continue.
    pub(super) fn pause_next_persist(&self) -> (Receiver<()>, Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        *self.gate.lock().expect("gateway mutex poisoned") = Some(PersistGate {
            entered: entered_tx,
            release: release_rx,
        });
        (entered_rx, release_tx)
    }

    pub(super) fn persisted(&self) -> Vec<Mutation> {
        self.persisted.lock().expect("gateway mutex poisoned").clone()
    }

    pub(super) fn backend(&self) -> Snapshot {
        self.state.lock().expect("gateway mutex poisoned").clone()
    }

    /// Change backend data behind the service's back.
    pub(super) fn edit(&self, change: impl FnOnce(&mut Snapshot)) {
        change(&mut self.state.lock().expect("gateway mutex poisoned"));
    }

    pub(super) fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl SnapshotGateway for MemoryGateway {
    fn fetch_snapshot(&self) -> Result<Snapshot, GatewayError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.backend())
    }

    fn persist(&self, mutation: &Mutation, actor: &str) -> Result<(), GatewayError> {
        let call = self.persist_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let gate = self.gate.lock().expect("gateway mutex poisoned").take();
        if let Some(gate) = gate {
            gate.entered.send(()).expect("test waits for the held persist");
            gate.release.recv().expect("test releases the held persist");
        }
        if *self.fail_at.lock().expect("gateway mutex poisoned") == Some(call) {
            return Err(GatewayError::Unavailable("sheet write timed out".to_string()));
        }
        self.state
            .lock()
            .expect("gateway mutex poisoned")
            .apply(mutation, actor, fixed_now())
            .map_err(|err| GatewayError::Rejected(err.to_string()))?;
        self.persisted
            .lock()
            .expect("gateway mutex poisoned")
            .push(mutation.clone());
        Ok(())
    }

    fn remove(&self, kind: RecordKind, key: &str, actor: &str) -> Result<(), GatewayError> {
        self.state
            .lock()
            .expect("gateway mutex poisoned")
            .remove(kind, key, actor, fixed_now())
            .map_err(|err| GatewayError::Rejected(err.to_string()))
    }
}

pub(super) struct UnavailableGateway;

impl SnapshotGateway for UnavailableGateway {
    fn fetch_snapshot(&self) -> Result<Snapshot, GatewayError> {
        Err(GatewayError::Unavailable("backend offline".to_string()))
    }

    fn persist(&self, _mutation: &Mutation, _actor: &str) -> Result<(), GatewayError> {
        Err(GatewayError::Unavailable("backend offline".to_string()))
    }

    fn remove(&self, _kind: RecordKind, _key: &str, _actor: &str) -> Result<(), GatewayError> {
        Err(GatewayError::Unavailable("backend offline".to_string()))
    }
}

pub(super) fn build_service() -> (RecruitingService<MemoryGateway>, Arc<MemoryGateway>) {
    let gateway = Arc::new(MemoryGateway::seeded(seeded_snapshot()));
    let service = RecruitingService::connect(gateway.clone()).expect("initial load");
    (service, gateway)
}

pub(super) fn router_with_service(service: RecruitingService<MemoryGateway>) -> axum::Router {
    recruiting_router(Arc::new(service), ACTOR)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
