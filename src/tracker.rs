use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::config::TrackerConfig;
use crate::duration_clock::DurationClock;
use crate::error::{Action, InputKind, TrackerError, TrackingState};
use crate::gps_processor::{DistanceAccumulator, Point, ProcessResult, RawData};
use crate::pace;
use crate::sources::{Clock, LocationProvider, SubscriptionGuard, TickProvider};
use crate::summary::SessionSummary;
use crate::workout::WorkoutType;

/// Everything the tracker needs from the host.
pub struct TrackerSources {
    pub location: Box<dyn LocationProvider>,
    pub ticks: Box<dyn TickProvider>,
    pub clock: Box<dyn Clock>,
}

// Both inputs are held only while running; leaving `Running` drops them.
struct ActiveInputs {
    _location: SubscriptionGuard,
    _ticks: SubscriptionGuard,
}

enum Phase {
    Idle,
    Running(ActiveInputs),
    Paused,
    Failed {
        error: TrackerError,
        // `false` if nothing was ever tracked (the failure happened on start)
        has_session: bool,
    },
    Finished,
    Cancelled,
}

impl Phase {
    fn state(&self) -> TrackingState {
        match self {
            Phase::Idle => TrackingState::Idle,
            Phase::Running(_) => TrackingState::Running,
            Phase::Paused => TrackingState::Paused,
            Phase::Failed { .. } => TrackingState::Failed,
            Phase::Finished => TrackingState::Finished,
            Phase::Cancelled => TrackingState::Cancelled,
        }
    }
}

/// Read model for presentation.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackerSnapshot {
    pub state: TrackingState,
    pub workout_type: WorkoutType,
    pub distance_km: f64,
    pub duration_seconds: u64,
    pub pace: String,
    pub route_len: usize,
    // diagnostics of the latest raw sample, accepted or not
    pub last_accuracy: Option<f32>,
    pub last_speed: Option<f32>,
}

/// One workout session. Drive it with `start` / `pause` / `resume` and
/// end it with `finish` or `cancel`; after that it rejects everything and
/// a new `Tracker` is needed.
///
/// Inputs (`on_location`, `on_tick`) are accepted at any time but only
/// count while running. All methods take `&mut self`, so a host that
/// shares a tracker between threads has to put it behind one lock.
pub struct Tracker {
    config: TrackerConfig,
    workout_type: WorkoutType,
    phase: Phase,
    accumulator: DistanceAccumulator,
    duration: DurationClock,
    // last value published by a tick, so the read model never goes back
    duration_seconds: u64,
    last_accuracy: Option<f32>,
    last_speed: Option<f32>,
    started_at: Option<DateTime<Utc>>,
    sources: TrackerSources,
}

impl Tracker {
    pub fn new(workout_type: WorkoutType, config: TrackerConfig, sources: TrackerSources) -> Self {
        Tracker {
            accumulator: DistanceAccumulator::new(&config),
            config,
            workout_type,
            phase: Phase::Idle,
            duration: DurationClock::new(),
            duration_seconds: 0,
            last_accuracy: None,
            last_speed: None,
            started_at: None,
            sources,
        }
    }

    pub fn state(&self) -> TrackingState {
        self.phase.state()
    }

    /// The acquisition failure that put the tracker in `Failed`.
    pub fn failure(&self) -> Option<&TrackerError> {
        match &self.phase {
            Phase::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Whether there is tracked data that only `finish` or `cancel` may end.
    pub fn has_session(&self) -> bool {
        match &self.phase {
            Phase::Running(_) | Phase::Paused => true,
            Phase::Failed { has_session, .. } => *has_session,
            Phase::Idle | Phase::Finished | Phase::Cancelled => false,
        }
    }

    pub fn workout_type(&self) -> WorkoutType {
        self.workout_type
    }

    pub fn distance_km(&self) -> f64 {
        self.accumulator.total_distance_km()
    }

    pub fn duration_seconds(&self) -> u64 {
        self.duration_seconds
    }

    pub fn pace(&self) -> String {
        pace::format_pace_with_epsilon(
            self.distance_km(),
            self.duration_seconds,
            self.config.pace_epsilon_km,
        )
    }

    pub fn route(&self) -> &[Point] {
        self.accumulator.route()
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            state: self.state(),
            workout_type: self.workout_type,
            distance_km: self.distance_km(),
            duration_seconds: self.duration_seconds,
            pace: self.pace(),
            route_len: self.route().len(),
            last_accuracy: self.last_accuracy,
            last_speed: self.last_speed,
        }
    }

    pub fn start(&mut self) -> Result<(), TrackerError> {
        if !matches!(self.phase, Phase::Idle) {
            return Err(self.invalid(Action::Start));
        }
        let inputs = match self.acquire_inputs() {
            Ok(inputs) => inputs,
            Err(error) => {
                warn!("[tracker] start failed: {}", error);
                self.phase = Phase::Failed {
                    error: error.clone(),
                    has_session: false,
                };
                return Err(error);
            }
        };

        self.accumulator.reset();
        self.duration.reset();
        self.duration_seconds = 0;
        self.last_accuracy = None;
        self.last_speed = None;
        self.started_at = Some(Utc::now());
        self.duration.start_run(self.sources.clock.now_ms());
        self.phase = Phase::Running(inputs);
        info!("[tracker] {} session started", self.workout_type);
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), TrackerError> {
        if !matches!(self.phase, Phase::Running(_)) {
            return Err(self.invalid(Action::Pause));
        }
        self.stop_inputs(Phase::Paused);
        info!(
            "[tracker] paused at {:.3} km, {} s",
            self.distance_km(),
            self.duration_seconds
        );
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), TrackerError> {
        if !matches!(self.phase, Phase::Paused) {
            return Err(self.invalid(Action::Resume));
        }
        match self.acquire_inputs() {
            Ok(inputs) => {
                self.duration.start_run(self.sources.clock.now_ms());
                self.phase = Phase::Running(inputs);
                info!("[tracker] resumed");
                Ok(())
            }
            Err(error) => {
                warn!("[tracker] resume failed: {}", error);
                self.phase = Phase::Failed {
                    error: error.clone(),
                    has_session: true,
                };
                Err(error)
            }
        }
    }

    /// Ends the session and hands out its summary. Inputs are released
    /// before the snapshot is taken, so nothing delivered from here on can
    /// sneak into it.
    pub fn finish(&mut self) -> Result<SessionSummary, TrackerError> {
        if !self.has_session() {
            return Err(self.invalid(Action::Finish));
        }
        self.stop_inputs(Phase::Finished);

        let total_distance_km = self.accumulator.total_distance_km();
        let total_duration_seconds = self.duration_seconds;
        let summary = SessionSummary {
            workout_type: self.workout_type,
            total_distance_km,
            total_duration_seconds,
            average_pace: pace::format_pace_with_epsilon(
                total_distance_km,
                total_duration_seconds,
                self.config.pace_epsilon_km,
            ),
            route: self.accumulator.take_route(),
            started_at: self.started_at.unwrap_or_else(Utc::now),
            finished_at: Utc::now(),
        };
        self.discard_working_state();
        info!(
            "[tracker] finished: {:.3} km in {} s, pace {}",
            summary.total_distance_km, summary.total_duration_seconds, summary.average_pace
        );
        Ok(summary)
    }

    /// Drops the session without a summary. Allowed from every state.
    pub fn cancel(&mut self) {
        let previous = self.state();
        // assigning the new phase drops any held inputs
        self.phase = Phase::Cancelled;
        self.accumulator.reset();
        self.discard_working_state();
        info!("[tracker] cancelled (was {})", previous);
    }

    pub fn on_location(&mut self, data: &RawData) -> ProcessResult {
        if !matches!(self.phase, Phase::Running(_)) {
            debug!("[tracker] sample ignored while {}", self.state());
            return ProcessResult::NotTracking;
        }
        self.last_accuracy = data.accuracy;
        self.last_speed = data.speed;
        self.accumulator.process(data)
    }

    /// Re-reads the clock. Ticks carry no payload, so a late or duplicated
    /// one is harmless.
    pub fn on_tick(&mut self) {
        if !matches!(self.phase, Phase::Running(_)) {
            return;
        }
        self.refresh_duration(self.sources.clock.now_ms());
    }

    fn acquire_inputs(&mut self) -> Result<ActiveInputs, TrackerError> {
        let location = self.sources.location.subscribe().map_err(|source| {
            TrackerError::AcquisitionFailed {
                input: InputKind::Location,
                source,
            }
        })?;
        // taken into a guard first so a tick failure below releases it
        let location = SubscriptionGuard::new("location", location);

        let interval = Duration::from_millis(self.config.tick_interval_ms);
        let ticks = self.sources.ticks.subscribe(interval).map_err(|source| {
            TrackerError::AcquisitionFailed {
                input: InputKind::Ticks,
                source,
            }
        })?;
        Ok(ActiveInputs {
            _location: location,
            _ticks: SubscriptionGuard::new("ticks", ticks),
        })
    }

    // Releases the inputs (if running) and banks the current run.
    fn stop_inputs(&mut self, next: Phase) {
        let was_running = matches!(self.phase, Phase::Running(_));
        self.phase = next;
        if was_running {
            let now_ms = self.sources.clock.now_ms();
            self.duration.stop_run(now_ms);
            self.refresh_duration(now_ms);
        }
    }

    fn refresh_duration(&mut self, now_ms: u64) {
        self.duration_seconds = self
            .duration_seconds
            .max(self.duration.elapsed_seconds(now_ms));
    }

    fn discard_working_state(&mut self) {
        self.duration.reset();
        self.duration_seconds = 0;
        self.last_accuracy = None;
        self.last_speed = None;
        self.started_at = None;
    }

    fn invalid(&self, action: Action) -> TrackerError {
        let state = self.state();
        warn!("[tracker] rejected {} while {}", action, state);
        TrackerError::InvalidTransition { state, action }
    }
}
