use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::mode::{Backend, Mode};

/// One row of the results log, appended after every completed training run.
///
/// Field order is the column order of the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub date: DateTime<Utc>,
    pub f1: f64,
    pub mode: Mode,
    /// Wall-clock fit time in seconds.
    pub duration: f64,
    pub model_name: String,
    pub using: Option<Backend>,
}

impl EvaluationRecord {
    /// Column names of the results log, in write order.
    pub const COLUMNS: [&'static str; 6] = ["date", "f1", "mode", "duration", "model_name", "using"];

    /// A record stamped with the current time.
    pub fn now(
        model_name: impl Into<String>,
        mode: Mode,
        using: Option<Backend>,
        f1: f64,
        duration: f64,
    ) -> Self {
        Self {
            date: Utc::now(),
            f1,
            mode,
            duration,
            model_name: model_name.into(),
            using,
        }
    }
}
