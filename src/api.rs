//! REST API handlers (spec §6, supplemented per `SPEC_FULL.md` §B).
//!
//! Job tracking follows the same shape the teacher used for its solver
//! jobs: a `RwLock`-guarded map keyed by a UUID, with the actual solve
//! offloaded to `rayon::spawn` so the Tokio runtime stays free for other
//! requests while the CPU-bound CP search runs.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use parking_lot::RwLock;
use serde::Serialize;
use uuid::Uuid;

use crate::config::EngineSettings;
use crate::demo_data::{self, DemoSize};
use crate::dto::{HealthResponse, InfoResponse, ScheduleRequest, ScheduleResponse};
use crate::error::EngineError;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobStatus {
    Running,
    Done { result: Arc<ScheduleResponse> },
    Failed { error: String },
}

pub struct AppState {
    jobs: RwLock<HashMap<String, JobStatus>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/info", get(info))
        .route("/demo-data/{size}", get(get_demo_data))
        .route("/schedules", post(create_schedule))
        .route("/schedules/{id}", get(get_schedule))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "UP" })
}

async fn info() -> Json<InfoResponse> {
    Json(InfoResponse {
        name: "SALSA scheduling engine",
        version: env!("CARGO_PKG_VERSION"),
        solver_engine: "selen",
    })
}

/// GET /demo-data/{size} — a synthetic raw-table bundle sized `small`,
/// `medium`, or `large` (spec `SPEC_FULL.md` §B).
async fn get_demo_data(Path(size): Path<String>) -> Result<Json<crate::dto::DemoDataResponse>, StatusCode> {
    let size: DemoSize = size.parse().map_err(|_| StatusCode::NOT_FOUND)?;
    let raw = demo_data::generate(size);
    let settings = EngineSettings::default();
    match crate::run(&raw, &settings) {
        Ok(output) => {
            let sample_cells = output
                .schedule
                .matrix
                .iter()
                .take(20)
                .map(|(&(worker, day), &label)| (worker, day, label))
                .collect();
            Ok(Json(crate::dto::DemoDataResponse {
                employee_count: output.schedule.employee_counters.len(),
                horizon_days: output
                    .schedule
                    .matrix
                    .keys()
                    .map(|&(_, day)| day)
                    .collect::<std::collections::BTreeSet<_>>()
                    .len(),
                sample_cells,
            }))
        }
        Err(_) => Err(StatusCode::UNPROCESSABLE_ENTITY),
    }
}

/// POST /schedules — accepts the three raw tables and settings, starts
/// solving in the background, and returns the job id.
async fn create_schedule(State(state): State<Arc<AppState>>, Json(request): Json<ScheduleRequest>) -> String {
    let id = Uuid::new_v4().to_string();
    let settings = request.settings.clone();
    let raw = request.into_raw_tables();

    {
        let mut jobs = state.jobs.write();
        jobs.insert(id.clone(), JobStatus::Running);
    }

    let job_id = id.clone();
    let state_clone = state.clone();
    rayon::spawn(move || {
        let status = match crate::run(&raw, &settings) {
            Ok(output) => JobStatus::Done {
                result: Arc::new(ScheduleResponse::build(&output.schedule, &output.report, &output.warnings)),
            },
            Err(err) => JobStatus::Failed { error: describe_error(&err) },
        };
        state_clone.jobs.write().insert(job_id, status);
    });

    id
}

/// GET /schedules/{id} — poll for the result of a previously submitted
/// solve.
async fn get_schedule(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<Json<JobStatus>, StatusCode> {
    match state.jobs.read().get(&id) {
        Some(status) => Ok(Json(status.clone())),
        None => Err(StatusCode::NOT_FOUND),
    }
}

fn describe_error(err: &EngineError) -> String {
    err.to_string()
}
