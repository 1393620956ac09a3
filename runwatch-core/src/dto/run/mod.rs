//! Run DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::run::{Run, RunStatus};

/// Request to submit a new run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRun {
    pub name: String,
    /// Script body to execute, if the run is not purely parameter driven
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(default)]
    pub parameters: HashMap<String, serde_json::Value>,
}

/// Lightweight run entry returned by list endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub id: Uuid,
    pub name: String,
    pub status: RunStatus,
    pub submitted_at: DateTime<Utc>,
}

impl From<Run> for RunSummary {
    fn from(run: Run) -> Self {
        Self {
            id: run.id,
            name: run.name,
            status: run.status,
            submitted_at: run.submitted_at,
        }
    }
}
