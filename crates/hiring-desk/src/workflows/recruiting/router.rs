use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Value};

use super::domain::{parse_date, CandidateId, Layer, RecordKind, RequisitionId};
use super::export::{export_csv, export_file_name};
use super::gateway::{Mutation, SnapshotGateway};
use super::pipeline::Assessment;
use super::report::DashboardFilter;
use super::service::RecruitingService;
use super::sla::{AgingBucket, ExtensionMode, ExtensionRequest, SlaError};
use crate::error::AppError;

/// Shared handler state: the service plus the actor recorded when a request names none.
pub struct RecruitingState<G> {
    pub service: Arc<RecruitingService<G>>,
    pub default_actor: Arc<str>,
}

impl<G> Clone for RecruitingState<G> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            default_actor: Arc::clone(&self.default_actor),
        }
    }
}

impl<G> RecruitingState<G> {
    fn actor(&self, requested: Option<&str>) -> String {
        requested
            .map(str::trim)
            .filter(|actor| !actor.is_empty())
            .unwrap_or(&*self.default_actor)
            .to_string()
    }
}

/// Router exposing snapshot access, pipeline commands, SLA tooling, and reports.
pub fn recruiting_router<G>(
    service: Arc<RecruitingService<G>>,
    default_actor: impl Into<String>,
) -> Router
where
    G: SnapshotGateway + 'static,
{
    let state = RecruitingState {
        service,
        default_actor: Arc::from(default_actor.into()),
    };

    Router::new()
        .route("/api/v1/data", get(data_handler::<G>))
        .route("/api/v1/save", post(save_handler::<G>))
        .route("/api/v1/records/:kind/:key", delete(delete_handler::<G>))
        .route(
            "/api/v1/candidates/:id/advance",
            post(advance_handler::<G>),
        )
        .route("/api/v1/candidates/:id/hire", post(hire_handler::<G>))
        .route("/api/v1/candidates/:id/reject", post(reject_handler::<G>))
        .route(
            "/api/v1/candidates/:id/assessment",
            post(assessment_handler::<G>),
        )
        .route(
            "/api/v1/requisitions/:id/extend",
            post(extend_handler::<G>),
        )
        .route("/api/v1/requisitions/:id/sla", get(sla_handler::<G>))
        .route("/api/v1/sla/target", post(target_handler))
        .route("/api/v1/dashboard", get(dashboard_handler::<G>))
        .route("/api/v1/positions", get(positions_handler::<G>))
        .route("/api/v1/export/:kind", get(export_handler::<G>))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ActorQuery {
    #[serde(default)]
    user: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SaveRequest {
    #[serde(rename = "type")]
    kind: String,
    payload: Value,
    #[serde(default)]
    user: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HireRequest {
    #[serde(default)]
    hire_date: Option<NaiveDate>,
    #[serde(default)]
    user: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RejectRequest {
    #[serde(default)]
    reason: String,
    #[serde(default)]
    user: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssessmentRequest {
    hr_score: u8,
    tech_score: u8,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    user: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExtendRequest {
    mode: ExtensionMode,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    user: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SlaQuery {
    #[serde(default)]
    today: Option<String>,
    /// Extension mode to preview alongside the classification.
    #[serde(default)]
    mode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TargetRequest {
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    layer: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DashboardQuery {
    #[serde(default)]
    year: Option<String>,
    #[serde(default)]
    month: Option<String>,
    #[serde(default)]
    dept: Option<String>,
    #[serde(default)]
    recruiter: Option<String>,
    #[serde(default)]
    today: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PositionsQuery {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    today: Option<String>,
}

fn resolve_today(raw: Option<&str>) -> Result<NaiveDate, AppError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => parse_date(value).map_err(AppError::InvalidRequest),
        None => Ok(Local::now().date_naive()),
    }
}

/// `All` and blank select everything; anything else must parse as a number.
fn numeric_filter<T: std::str::FromStr>(
    name: &str,
    raw: Option<&str>,
) -> Result<Option<T>, AppError> {
    match raw.map(str::trim) {
        None | Some("") | Some("All") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| AppError::InvalidRequest(format!("{name} must be a number, got '{value}'"))),
    }
}

fn parse_collection(raw: &str) -> Result<RecordKind, AppError> {
    RecordKind::parse(raw).ok_or_else(|| AppError::UnknownCollection(raw.to_string()))
}

pub(crate) async fn data_handler<G>(
    State(state): State<RecruitingState<G>>,
) -> Result<Response, AppError>
where
    G: SnapshotGateway + 'static,
{
    state.service.reload()?;
    Ok(Json(state.service.snapshot()).into_response())
}

pub(crate) async fn save_handler<G>(
    State(state): State<RecruitingState<G>>,
    Json(request): Json<SaveRequest>,
) -> Result<Response, AppError>
where
    G: SnapshotGateway + 'static,
{
    let mutation = Mutation::from_parts(&request.kind, request.payload)
        .map_err(|err| AppError::InvalidRequest(format!("{} payload: {err}", request.kind)))?;
    let actor = state.actor(request.user.as_deref());
    let saved = state.service.save(mutation, &actor)?;
    let body = json!({
        "status": "success",
        "type": saved.kind(),
        "key": saved.entity_key().to_string(),
        "saved": saved,
    });
    Ok((StatusCode::OK, Json(body)).into_response())
}

pub(crate) async fn delete_handler<G>(
    State(state): State<RecruitingState<G>>,
    Path((kind, key)): Path<(String, String)>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, AppError>
where
    G: SnapshotGateway + 'static,
{
    let kind = parse_collection(&kind)?;
    let actor = state.actor(query.user.as_deref());
    state.service.remove(kind, &key, &actor)?;
    Ok(Json(json!({ "status": "success" })).into_response())
}

pub(crate) async fn advance_handler<G>(
    State(state): State<RecruitingState<G>>,
    Path(id): Path<String>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, AppError>
where
    G: SnapshotGateway + 'static,
{
    let actor = state.actor(query.user.as_deref());
    let candidate = state
        .service
        .advance_candidate(&CandidateId::new(id), &actor)?;
    Ok(Json(candidate).into_response())
}

pub(crate) async fn hire_handler<G>(
    State(state): State<RecruitingState<G>>,
    Path(id): Path<String>,
    Json(request): Json<HireRequest>,
) -> Result<Response, AppError>
where
    G: SnapshotGateway + 'static,
{
    let actor = state.actor(request.user.as_deref());
    let hire_date = request
        .hire_date
        .ok_or_else(|| AppError::InvalidRequest("hire_date is required".to_string()))?;
    let report = state
        .service
        .hire_candidate(&CandidateId::new(id), hire_date, &actor)?;
    Ok((StatusCode::CREATED, Json(report)).into_response())
}

pub(crate) async fn reject_handler<G>(
    State(state): State<RecruitingState<G>>,
    Path(id): Path<String>,
    Json(request): Json<RejectRequest>,
) -> Result<Response, AppError>
where
    G: SnapshotGateway + 'static,
{
    let actor = state.actor(request.user.as_deref());
    let candidate = state
        .service
        .reject_candidate(&CandidateId::new(id), &request.reason, &actor)?;
    Ok(Json(candidate).into_response())
}

pub(crate) async fn assessment_handler<G>(
    State(state): State<RecruitingState<G>>,
    Path(id): Path<String>,
    Json(request): Json<AssessmentRequest>,
) -> Result<Response, AppError>
where
    G: SnapshotGateway + 'static,
{
    let actor = state.actor(request.user.as_deref());
    let assessment = Assessment {
        hr_score: request.hr_score,
        tech_score: request.tech_score,
        notes: request.notes,
    };
    let candidate = state
        .service
        .record_assessment(&CandidateId::new(id), &assessment, &actor)?;
    Ok(Json(candidate).into_response())
}

pub(crate) async fn extend_handler<G>(
    State(state): State<RecruitingState<G>>,
    Path(id): Path<String>,
    Json(request): Json<ExtendRequest>,
) -> Result<Response, AppError>
where
    G: SnapshotGateway + 'static,
{
    let extension = ExtensionRequest {
        mode: request.mode,
        reason: request.reason,
        actor: state.actor(request.user.as_deref()),
    };
    let requisition = state.service.extend_requisition(
        &RequisitionId::new(id),
        &extension,
        Local::now().naive_local(),
    )?;
    Ok(Json(requisition).into_response())
}

pub(crate) async fn sla_handler<G>(
    State(state): State<RecruitingState<G>>,
    Path(id): Path<String>,
    Query(query): Query<SlaQuery>,
) -> Result<Response, AppError>
where
    G: SnapshotGateway + 'static,
{
    let today = resolve_today(query.today.as_deref())?;
    let id = RequisitionId::new(id);
    let status = state.service.requisition_sla(&id, today)?;

    let snapshot = state.service.snapshot();
    let requisition = snapshot.requisition(&id);
    let bucket = requisition.and_then(|requisition| AgingBucket::for_requisition(requisition, today));

    let preview = match query.mode.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        Some(raw) => {
            let mode: ExtensionMode = raw
                .parse()
                .map_err(|err: SlaError| AppError::InvalidRequest(err.to_string()))?;
            state.service.preview_extension(&id, mode)?
        }
        None => None,
    };

    let body = json!({
        "req_id": id,
        "target_date": requisition.and_then(|r| r.target_date),
        "extension_count": requisition.map(|r| r.extension_count).unwrap_or_default(),
        "state": status.state,
        "state_label": status.state.label(),
        "days": status.days,
        "summary": status.summary(),
        "aging_bucket": bucket,
        "preview_target_date": preview,
    });
    Ok(Json(body).into_response())
}

pub(crate) async fn target_handler(Json(request): Json<TargetRequest>) -> Result<Response, AppError> {
    let start_date = request
        .start_date
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(parse_date)
        .transpose()
        .map_err(AppError::InvalidRequest)?;
    let layer = request.layer.as_deref().and_then(Layer::parse);

    let target = super::sla::compute_target_date(start_date, layer.as_ref())
        .map_err(|err| AppError::Recruiting(err.into()))?;
    Ok(Json(json!({ "target_date": target })).into_response())
}

pub(crate) async fn dashboard_handler<G>(
    State(state): State<RecruitingState<G>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, AppError>
where
    G: SnapshotGateway + 'static,
{
    let today = resolve_today(query.today.as_deref())?;
    let month: Option<u32> = numeric_filter("month", query.month.as_deref())?;
    if month.is_some_and(|month| !(1..=12).contains(&month)) {
        return Err(AppError::InvalidRequest(
            "month must be between 1 and 12".to_string(),
        ));
    }
    let filter = DashboardFilter {
        year: numeric_filter("year", query.year.as_deref())?,
        month,
        dept: query.dept,
        recruiter: query.recruiter,
    };
    Ok(Json(state.service.dashboard(&filter, today)).into_response())
}

pub(crate) async fn positions_handler<G>(
    State(state): State<RecruitingState<G>>,
    Query(query): Query<PositionsQuery>,
) -> Result<Response, AppError>
where
    G: SnapshotGateway + 'static,
{
    let today = resolve_today(query.today.as_deref())?;
    let rows = state.service.positions(query.title.as_deref(), today);
    Ok(Json(rows).into_response())
}

pub(crate) async fn export_handler<G>(
    State(state): State<RecruitingState<G>>,
    Path(kind): Path<String>,
) -> Result<Response, AppError>
where
    G: SnapshotGateway + 'static,
{
    let kind = parse_collection(&kind)?;
    let body = export_csv(&state.service.snapshot(), kind)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(kind, Local::now().date_naive())
    );
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
