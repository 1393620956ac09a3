//! In-process stand-in for the run service, used by tests
//!
//! Each GET of a run advances it to the next status in its script, so tests
//! can describe a whole run lifecycle up front.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use runwatch_core::domain::log::{LogEntry, LogLevel};
use runwatch_core::domain::run::{Run, RunStatus};
use runwatch_core::dto::run::{RunSummary, SubmitRun};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

type StubResult<T> = std::result::Result<Json<T>, (StatusCode, String)>;

#[derive(Clone, Default)]
pub struct StubService {
    state: Arc<Mutex<StubState>>,
}

#[derive(Default)]
struct StubState {
    runs: HashMap<Uuid, StubRun>,
    failing_gets: u32,
}

struct StubRun {
    run: Run,
    script: VecDeque<String>,
    logs: Vec<LogEntry>,
    gets: u32,
}

fn new_run(name: &str, status: &str) -> Run {
    Run {
        id: Uuid::new_v4(),
        name: name.to_string(),
        status: RunStatus::new(status),
        submitted_at: chrono::Utc::now(),
        started_at: None,
        finished_at: None,
        parameters: HashMap::new(),
        message: None,
    }
}

impl StubService {
    /// Adds a run whose successive GETs report `statuses` in order
    ///
    /// Once the script is exhausted the last status repeats.
    pub fn insert_run(&self, name: &str, statuses: &[&str]) -> Uuid {
        let mut script: VecDeque<String> = statuses.iter().map(|s| s.to_string()).collect();
        let first = script.pop_front().unwrap_or_else(|| "Queued".to_string());
        let run = new_run(name, &first);
        let id = run.id;

        // The first GET reports the first status
        script.push_front(first);

        self.state.lock().unwrap().runs.insert(
            id,
            StubRun {
                run,
                script,
                logs: Vec::new(),
                gets: 0,
            },
        );
        id
    }

    pub fn push_log(&self, id: Uuid, message: &str) {
        if let Some(entry) = self.state.lock().unwrap().runs.get_mut(&id) {
            entry.logs.push(LogEntry {
                timestamp: chrono::Utc::now(),
                level: LogLevel::Info,
                message: message.to_string(),
                stream: None,
            });
        }
    }

    /// Makes the next `count` run GETs answer 503
    pub fn fail_next_gets(&self, count: u32) {
        self.state.lock().unwrap().failing_gets = count;
    }

    /// Number of GET requests received for a run, failed ones included
    pub fn get_count(&self, id: Uuid) -> u32 {
        self.state
            .lock()
            .unwrap()
            .runs
            .get(&id)
            .map(|r| r.gets)
            .unwrap_or(0)
    }

    /// Binds to an ephemeral local port and returns the base URL
    pub async fn serve(self) -> String {
        let router = Router::new()
            .route("/api/runs", post(submit_run).get(list_runs))
            .route("/api/runs/{id}", get(get_run))
            .route("/api/runs/{id}/cancel", post(cancel_run))
            .route("/api/runs/{id}/logs", get(get_logs))
            .with_state(self);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        format!("http://{}", addr)
    }
}

/// Accepts connections and never answers; returns the base URL
pub async fn serve_unresponsive() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            open.push(socket);
        }
    });

    format!("http://{}", addr)
}

fn not_found(id: Uuid) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("Run {} not found", id))
}

async fn submit_run(State(stub): State<StubService>, Json(req): Json<SubmitRun>) -> Json<Run> {
    let mut run = new_run(&req.name, "Queued");
    run.parameters = req.parameters;

    stub.state.lock().unwrap().runs.insert(
        run.id,
        StubRun {
            run: run.clone(),
            script: VecDeque::new(),
            logs: Vec::new(),
            gets: 0,
        },
    );
    Json(run)
}

async fn list_runs(State(stub): State<StubService>) -> Json<Vec<RunSummary>> {
    let state = stub.state.lock().unwrap();
    Json(
        state
            .runs
            .values()
            .map(|r| RunSummary::from(r.run.clone()))
            .collect(),
    )
}

async fn get_run(State(stub): State<StubService>, Path(id): Path<Uuid>) -> StubResult<Run> {
    let mut state = stub.state.lock().unwrap();
    let failing = state.failing_gets > 0;
    if failing {
        state.failing_gets -= 1;
    }

    let entry = state.runs.get_mut(&id).ok_or_else(|| not_found(id))?;
    entry.gets += 1;
    if failing {
        return Err((StatusCode::SERVICE_UNAVAILABLE, "try again".to_string()));
    }

    if let Some(next) = entry.script.pop_front() {
        entry.run.status = RunStatus::new(next);
    }
    Ok(Json(entry.run.clone()))
}

async fn cancel_run(
    State(stub): State<StubService>,
    Path(id): Path<Uuid>,
) -> std::result::Result<StatusCode, (StatusCode, String)> {
    let mut state = stub.state.lock().unwrap();
    let entry = state.runs.get_mut(&id).ok_or_else(|| not_found(id))?;
    entry.script.clear();
    entry.run.status = RunStatus::new("Cancelled");
    Ok(StatusCode::NO_CONTENT)
}

async fn get_logs(
    State(stub): State<StubService>,
    Path(id): Path<Uuid>,
) -> StubResult<Vec<LogEntry>> {
    let state = stub.state.lock().unwrap();
    let entry = state.runs.get(&id).ok_or_else(|| not_found(id))?;
    Ok(Json(entry.logs.clone()))
}
