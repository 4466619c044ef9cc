use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::gps_processor::Point;
use crate::utils;
use crate::workout::WorkoutType;

/// The result of a finished session. Built once by `Tracker::finish` and
/// owned by the caller from then on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub workout_type: WorkoutType,
    pub total_distance_km: f64,
    pub total_duration_seconds: u64,
    pub average_pace: String,
    pub route: Vec<Point>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SessionSummary {
    pub fn formatted_duration(&self) -> String {
        utils::format_duration(self.total_duration_seconds)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
