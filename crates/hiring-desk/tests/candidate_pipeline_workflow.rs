//! End-to-end candidate pipeline scenarios through the public service facade and HTTP
//! router, backed by an in-memory gateway that behaves like the remote store.

mod common {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDate;
    use serde_json::json;

    use hiring_desk::workflows::recruiting::{
        GatewayError, Mutation, RecordKind, RecruitingService, Snapshot, SnapshotGateway,
    };

    pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    pub(super) fn snapshot() -> Snapshot {
        serde_json::from_value(json!({
            "requisitions": [{
                "req_id": "REQ-0010",
                "title": "Electrical Technician",
                "dept": "Maintenance",
                "layer": "Blue Collar",
                "recruiter": "Sara",
                "requester_name": "Omar Ali",
                "requester_code": "E-100",
                "status": "Approved",
                "start_date": "2024-02-01",
                "target_date": "2024-03-02",
            }],
            "candidates": [{
                "id": "CAND-0100",
                "req_id": "REQ-0010",
                "name": "Rania",
                "email": "rania@example.com",
                "phone": "0100000000",
                "recruiter": "Sara",
                "source": "Walk-in",
                "status": "Phone Screen",
                "applied_date": "2024-02-05",
            }],
            "employees": [{
                "code": "EMP-0007",
                "name": "Adel",
                "title": "Supervisor",
                "dept": "Maintenance",
                "status": "Active",
            }],
        }))
        .expect("snapshot payload parses")
    }

    /// Store that applies writes with backend semantics; `offline` flips it unavailable.
    #[derive(Default)]
    pub(super) struct InMemoryBackend {
        snapshot: Mutex<Snapshot>,
        offline: AtomicBool,
    }

    impl InMemoryBackend {
        pub(super) fn with(snapshot: Snapshot) -> Self {
            Self {
                snapshot: Mutex::new(snapshot),
                offline: AtomicBool::new(false),
            }
        }

        pub(super) fn go_offline(&self) {
            self.offline.store(true, Ordering::SeqCst);
        }

        pub(super) fn stored(&self) -> Snapshot {
            self.snapshot.lock().expect("backend mutex poisoned").clone()
        }

        fn check_online(&self) -> Result<(), GatewayError> {
            if self.offline.load(Ordering::SeqCst) {
                Err(GatewayError::Unavailable("backend offline".to_string()))
            } else {
                Ok(())
            }
        }
    }

    impl SnapshotGateway for InMemoryBackend {
        fn fetch_snapshot(&self) -> Result<Snapshot, GatewayError> {
            self.check_online()?;
            Ok(self.stored())
        }

        fn persist(&self, mutation: &Mutation, actor: &str) -> Result<(), GatewayError> {
            self.check_online()?;
            let now = date(2024, 3, 1).and_hms_opt(8, 0, 0).expect("valid time");
            self.snapshot
                .lock()
                .expect("backend mutex poisoned")
                .apply(mutation, actor, now)
                .map_err(|err| GatewayError::Rejected(err.to_string()))
        }

        fn remove(&self, kind: RecordKind, key: &str, actor: &str) -> Result<(), GatewayError> {
            self.check_online()?;
            let now = date(2024, 3, 1).and_hms_opt(8, 0, 0).expect("valid time");
            self.snapshot
                .lock()
                .expect("backend mutex poisoned")
                .remove(kind, key, actor, now)
                .map_err(|err| GatewayError::Rejected(err.to_string()))
        }
    }

    pub(super) fn service() -> (Arc<RecruitingService<InMemoryBackend>>, Arc<InMemoryBackend>) {
        let backend = Arc::new(InMemoryBackend::with(snapshot()));
        let service = RecruitingService::connect(Arc::clone(&backend)).expect("backend reachable");
        (Arc::new(service), backend)
    }
}

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use hiring_desk::workflows::recruiting::{
    recruiting_router, Assessment, CandidateId, CandidateStage, DashboardFilter, GatewayError,
    HireStep, RequisitionId, RequisitionStatus, ServiceError,
};

use common::{date, service};

const ACTOR: &str = "Sara (Recruiter)";

#[test]
fn candidate_walks_the_pipeline_to_hire() {
    let (service, backend) = service();
    let candidate = CandidateId::new("CAND-0100");

    let stages: Vec<CandidateStage> = (0..4)
        .map(|_| {
            service
                .advance_candidate(&candidate, ACTOR)
                .expect("advance succeeds")
                .status
        })
        .collect();
    assert_eq!(
        stages,
        vec![
            CandidateStage::HrInterview,
            CandidateStage::TechnicalInterview,
            CandidateStage::JobOfferPhase,
            CandidateStage::JobOfferPhase,
        ]
    );

    let scored = service
        .record_assessment(
            &candidate,
            &Assessment {
                hr_score: 4,
                tech_score: 41,
                notes: "Strong on wiring diagrams".to_string(),
            },
            ACTOR,
        )
        .expect("assessment recorded");
    assert_eq!(scored.tech_score, 41);

    let report = service
        .hire_candidate(&candidate, date(2024, 3, 4), ACTOR)
        .expect("hire completes");
    assert!(report.is_complete());
    assert_eq!(report.employee_code.as_str(), "EMP-0008");
    assert_eq!(
        report.completed,
        vec![
            HireStep::UpdateCandidate,
            HireStep::CreateEmployee,
            HireStep::FillRequisition
        ]
    );

    let stored = backend.stored();
    let requisition = stored
        .requisition(&RequisitionId::new("REQ-0010"))
        .expect("requisition kept");
    assert_eq!(requisition.status, RequisitionStatus::Filled);
    assert_eq!(requisition.filled_date, Some(date(2024, 3, 4)));

    let employee = stored
        .employees
        .iter()
        .find(|employee| employee.name == "Rania")
        .expect("employee created");
    assert_eq!(employee.title, "Electrical Technician");
    assert_eq!(employee.manager, "Omar Ali");
    assert_eq!(service.snapshot(), stored);
}

#[test]
fn hired_candidates_cannot_be_rejected_afterwards() {
    let (service, _) = service();
    let candidate = CandidateId::new("CAND-0100");
    service
        .hire_candidate(&candidate, date(2024, 3, 4), ACTOR)
        .expect("hire completes");

    let err = service
        .reject_candidate(&candidate, "Changed mind", ACTOR)
        .expect_err("hired is terminal");
    assert!(matches!(err, ServiceError::Pipeline(_)), "{err:?}");
}

#[test]
fn offline_backend_leaves_local_snapshot_alone() {
    let (service, backend) = service();
    let before = service.snapshot();
    backend.go_offline();

    let err = service
        .advance_candidate(&CandidateId::new("CAND-0100"), ACTOR)
        .expect_err("backend offline");
    assert!(matches!(
        err,
        ServiceError::Gateway(GatewayError::Unavailable(_))
    ));
    assert_eq!(service.snapshot(), before);

    let report = service.dashboard(&DashboardFilter::default(), date(2024, 3, 10));
    assert_eq!(report.headline.open_requisitions, 1);
    assert_eq!(report.aging.late_low, 1);
}

async fn send(router: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("router responds");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

#[tokio::test]
async fn http_flow_extends_then_hires() {
    let (service, backend) = service();
    let router = recruiting_router(service, "Admin");

    let (status, body) = send(
        router.clone(),
        post(
            "/api/v1/requisitions/REQ-0010/extend",
            json!({ "mode": "2024-03-20", "reason": "Candidate notice period", "user": ACTOR }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["target_date"], "2024-03-20");

    let (status, body) = send(
        router.clone(),
        post(
            "/api/v1/candidates/CAND-0100/hire",
            json!({ "hire_date": "2024-03-18" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["requisition_id"], "REQ-0010");

    let (status, body) = send(
        router,
        Request::get("/api/v1/positions?today=2024-03-25")
            .body(Body::empty())
            .expect("request builds"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["sla"]["state"], "on_time");
    assert_eq!(body[0]["sla_summary"], "On Time");

    let audit = backend.stored().audit_log;
    assert_eq!(audit.len(), 4);
    assert!(audit
        .iter()
        .any(|entry| entry.action.starts_with("Extended SLA for REQ-0010") && entry.user == ACTOR));
    assert!(audit
        .iter()
        .any(|entry| entry.action == "HIRED: Rania added to Master Data" && entry.user == "Admin"));
}

#[tokio::test]
async fn http_flow_reports_unreachable_backend() {
    let (service, backend) = service();
    backend.go_offline();
    let (status, body) = send(
        recruiting_router(service, "Admin"),
        Request::get("/api/v1/data")
            .body(Body::empty())
            .expect("request builds"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"]
        .as_str()
        .is_some_and(|message| message.contains("unavailable")));
}
