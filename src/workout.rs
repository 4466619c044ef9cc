use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};
use uuid::Uuid;

use crate::pace::UNDEFINED_PACE;
use crate::summary::SessionSummary;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, Display, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
#[repr(i8)]
pub enum WorkoutType {
    Run = 0,
    Walk = 1,
    Cycling = 2,
    Swimming = 3,
    Yoga = 4,
    Other = 5,
}

impl WorkoutType {
    pub fn to_int(&self) -> i8 {
        *self as i8
    }

    pub fn of_int(i: i8) -> Result<Self> {
        match i {
            0 => Ok(WorkoutType::Run),
            1 => Ok(WorkoutType::Walk),
            2 => Ok(WorkoutType::Cycling),
            3 => Ok(WorkoutType::Swimming),
            4 => Ok(WorkoutType::Yoga),
            5 => Ok(WorkoutType::Other),
            _ => bail!("Invalid int for `WorkoutType` {}", i),
        }
    }

    /// Whether distance and pace mean anything for this kind of workout.
    pub fn tracks_distance(&self) -> bool {
        matches!(
            self,
            WorkoutType::Run | WorkoutType::Walk | WorkoutType::Cycling
        )
    }
}

/// What the feed-posting side stores for a finished workout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub id: Uuid,
    pub workout_type: WorkoutType,
    pub distance_km: Option<f64>,
    pub duration_seconds: u64,
    pub timestamp: DateTime<Utc>,
    // local date of the workout, as seen by the user
    pub date: NaiveDate,
    pub pace: Option<String>,
    pub caption: Option<String>,
}

impl WorkoutRecord {
    pub fn from_summary(summary: &SessionSummary, caption: Option<String>) -> Self {
        let tracks_distance = summary.workout_type.tracks_distance();
        let pace = if tracks_distance && summary.average_pace != UNDEFINED_PACE {
            Some(summary.average_pace.clone())
        } else {
            None
        };
        WorkoutRecord {
            id: Uuid::new_v4(),
            workout_type: summary.workout_type,
            distance_km: tracks_distance.then_some(summary.total_distance_km),
            duration_seconds: summary.total_duration_seconds,
            timestamp: summary.finished_at,
            date: summary.finished_at.with_timezone(&Local).date_naive(),
            pace,
            caption,
        }
    }
}
