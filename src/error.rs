//! Conditions the tracker reports to its caller. Everything else (bad
//! samples, late ticks) is absorbed inside the tracker.

use strum_macros::Display;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum TrackingState {
    Idle,
    Running,
    Paused,
    Failed,
    Finished,
    Cancelled,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    Start,
    Pause,
    Resume,
    Finish,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum InputKind {
    Location,
    Ticks,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AcquisitionError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("unavailable: {0}")]
    Unavailable(String),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TrackerError {
    #[error("cannot {action} while {state}")]
    InvalidTransition { state: TrackingState, action: Action },

    #[error("failed to acquire {input}: {source}")]
    AcquisitionFailed {
        input: InputKind,
        #[source]
        source: AcquisitionError,
    },

    #[error("no workout session")]
    NoSession,
}

impl TrackerError {
    pub fn is_acquisition_failure(&self) -> bool {
        matches!(self, TrackerError::AcquisitionFailed { .. })
    }
}
