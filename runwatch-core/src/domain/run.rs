//! Run domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use crate::status::{self, Snapshot, StatusClass};

/// A run as reported by the run service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: Uuid,
    pub name: String,
    pub status: RunStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub parameters: HashMap<String, serde_json::Value>,
    /// Free-form detail from the service, usually set on failure
    #[serde(default)]
    pub message: Option<String>,
}

impl Run {
    /// Wall-clock time between start and finish, if both are known
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.started_at, self.finished_at) {
            (Some(started), Some(finished)) => Some(finished.signed_duration_since(started)),
            _ => None,
        }
    }
}

impl Snapshot for Run {
    fn status(&self) -> &str {
        self.status.as_str()
    }
}

/// Run status
///
/// Kept as the raw string the service sent so that values unknown to this
/// client survive a round trip and are still displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunStatus(String);

impl RunStatus {
    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn class(&self) -> StatusClass {
        status::classify(&self.0)
    }

    pub fn is_terminal(&self) -> bool {
        status::is_terminal(&self.0)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RunStatus {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RunStatus {
    fn from(s: String) -> Self {
        Self(s)
    }
}
