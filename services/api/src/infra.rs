use chrono::Local;
use hiring_desk::error::AppError;
use hiring_desk::workflows::recruiting::{
    GatewayError, Mutation, RecordKind, Snapshot, SnapshotError, SnapshotGateway,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Backend stand-in holding the authoritative snapshot in process memory.
#[derive(Default, Clone)]
pub(crate) struct InMemorySnapshotGateway {
    state: Arc<Mutex<Snapshot>>,
}

impl InMemorySnapshotGateway {
    pub(crate) fn seeded(snapshot: Snapshot) -> Self {
        Self {
            state: Arc::new(Mutex::new(snapshot)),
        }
    }

    fn with_state<T>(&self, apply: impl FnOnce(&mut Snapshot) -> T) -> T {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        apply(&mut guard)
    }
}

fn rejected(err: SnapshotError) -> GatewayError {
    GatewayError::Rejected(err.to_string())
}

impl SnapshotGateway for InMemorySnapshotGateway {
    fn fetch_snapshot(&self) -> Result<Snapshot, GatewayError> {
        Ok(self.with_state(|snapshot| snapshot.clone()))
    }

    fn persist(&self, mutation: &Mutation, actor: &str) -> Result<(), GatewayError> {
        let now = Local::now().naive_local();
        self.with_state(|snapshot| snapshot.apply(mutation, actor, now))
            .map_err(rejected)
    }

    fn remove(&self, kind: RecordKind, key: &str, actor: &str) -> Result<(), GatewayError> {
        let now = Local::now().naive_local();
        self.with_state(|snapshot| snapshot.remove(kind, key, actor, now))
            .map_err(rejected)
    }
}

/// Read a JSON snapshot from disk, or start empty when no path is configured.
pub(crate) fn load_snapshot(path: Option<&Path>) -> Result<Snapshot, AppError> {
    let Some(path) = path else {
        return Ok(Snapshot::default());
    };
    let raw = std::fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&raw)
        .map_err(|err| AppError::Seed(format!("{}: {err}", path.display())))?;
    info!(
        path = %path.display(),
        requisitions = snapshot.requisitions.len(),
        candidates = snapshot.candidates.len(),
        "loaded seed snapshot"
    );
    Ok(snapshot)
}
