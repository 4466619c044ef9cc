use std::sync::{mpsc, Mutex, OnceLock};

use anyhow::Result;

use crate::caption::{self, CaptionGenerator};
use crate::config::TrackerConfig;
use crate::error::{Action, TrackerError};
use crate::gps_processor::{self, Point, ProcessResult, RawData};
use crate::logs;
use crate::sources::{HostLocation, LocationPermission, MonotonicClock, ThreadTicker};
use crate::storage::{self, Storage};
use crate::summary::SessionSummary;
use crate::tracker::{Tracker, TrackerSnapshot, TrackerSources};
use crate::workout::{WorkoutRecord, WorkoutType};

// Lock order: `tracker` before the storage's own lock. The ticker thread
// only ever takes `tracker`.
struct MainState {
    cache_dir: String,
    config: TrackerConfig,
    storage: Storage,
    location: HostLocation,
    tracker: Mutex<Option<Tracker>>,
}

static MAIN_STATE: OnceLock<MainState> = OnceLock::new();

pub fn init(support_dir: String, cache_dir: String) -> Result<()> {
    if MAIN_STATE.get().is_some() {
        warn!("`init` is called multiple times");
        return Ok(());
    }
    logs::init(&cache_dir)?;
    let config = TrackerConfig::load_or_default(&support_dir)?;
    let storage = Storage::init(support_dir, config.raw_data_mode)?;
    let main_state = MainState {
        cache_dir,
        config,
        storage,
        location: HostLocation::new(),
        tracker: Mutex::new(None),
    };
    if MAIN_STATE.set(main_state).is_err() {
        warn!("`init` raced with another `init`");
    }
    info!("initialized");
    Ok(())
}

fn get() -> Result<&'static MainState> {
    MAIN_STATE
        .get()
        .ok_or_else(|| anyhow!("main state is not initialized"))
}

fn with_tracker<T>(f: impl FnOnce(&mut Tracker) -> Result<T, TrackerError>) -> Result<T> {
    let state = get()?;
    let mut tracker = state.tracker.lock().unwrap();
    let tracker = tracker.as_mut().ok_or(TrackerError::NoSession)?;
    Ok(f(tracker)?)
}

pub fn set_location_permission(permission: LocationPermission) -> Result<()> {
    get()?.location.set_permission(permission);
    info!("location permission: {:?}", permission);
    Ok(())
}

/// Whether the host should keep its location updates on right now.
pub fn location_updates_wanted() -> Result<bool> {
    Ok(get()?.location.updates_wanted())
}

pub fn start_workout(workout_type: WorkoutType) -> Result<()> {
    let state = get()?;
    let mut slot = state.tracker.lock().unwrap();
    // a session that failed to resume still holds data, it has to be
    // finished or cancelled first
    if let Some(current) = slot.as_ref().filter(|current| current.has_session()) {
        return Err(TrackerError::InvalidTransition {
            state: current.state(),
            action: Action::Start,
        }
        .into());
    }

    let sources = TrackerSources {
        location: Box::new(state.location.clone()),
        ticks: Box::new(ThreadTicker::new(|| {
            if let Err(e) = on_tick() {
                warn!("tick dropped: {:?}", e);
            }
        })),
        clock: Box::new(MonotonicClock::new()),
    };
    let mut tracker = Tracker::new(workout_type, state.config.clone(), sources);
    let result = tracker.start();
    // a failed tracker stays around so `get_snapshot` can report it
    *slot = Some(tracker);
    Ok(result?)
}

pub fn pause_workout() -> Result<()> {
    with_tracker(|tracker| tracker.pause())
}

pub fn resume_workout() -> Result<()> {
    with_tracker(|tracker| tracker.resume())
}

pub fn finish_workout() -> Result<SessionSummary> {
    let state = get()?;
    let mut slot = state.tracker.lock().unwrap();
    let tracker = slot.as_mut().ok_or(TrackerError::NoSession)?;
    let summary = tracker.finish()?;
    *slot = None;
    Ok(summary)
}

pub fn cancel_workout() -> Result<()> {
    let state = get()?;
    let mut slot = state.tracker.lock().unwrap();
    match slot.take() {
        Some(mut tracker) => tracker.cancel(),
        None => debug!("nothing to cancel"),
    }
    Ok(())
}

pub fn on_location_update(mut raw_data_list: Vec<RawData>) -> Result<()> {
    let state = get()?;
    // NOTE: some platforms deliver batches out of order.
    gps_processor::sort_by_timestamp(&mut raw_data_list);

    // the whole batch is applied under one lock
    let mut tracker = state.tracker.lock().unwrap();
    for raw_data in &raw_data_list {
        let process_result = match tracker.as_mut() {
            Some(tracker) => tracker.on_location(raw_data),
            None => ProcessResult::NotTracking,
        };
        state.storage.record_gps_data(raw_data, process_result);
    }
    drop(tracker);

    if let Err(e) = state.storage.flush() {
        warn!("failed to flush raw data: {:?}", e);
    }
    Ok(())
}

pub fn on_tick() -> Result<()> {
    let state = get()?;
    if let Some(tracker) = state.tracker.lock().unwrap().as_mut() {
        tracker.on_tick();
    }
    Ok(())
}

pub fn get_snapshot() -> Result<Option<TrackerSnapshot>> {
    let state = get()?;
    let tracker = state.tracker.lock().unwrap();
    Ok(tracker.as_ref().map(|tracker| tracker.snapshot()))
}

pub fn get_route() -> Result<Vec<Point>> {
    let state = get()?;
    let tracker = state.tracker.lock().unwrap();
    Ok(tracker
        .as_ref()
        .map(|tracker| tracker.route().to_vec())
        .unwrap_or_default())
}

pub fn prepare_post(
    summary: &SessionSummary,
    image: &str,
    generator: &dyn CaptionGenerator,
) -> WorkoutRecord {
    let caption = caption::caption_or_fallback(generator, image, summary);
    WorkoutRecord::from_summary(summary, Some(caption))
}

pub fn list_all_raw_data() -> Result<Vec<storage::RawDataFile>> {
    get()?.storage.list_all_raw_data()
}

pub fn get_raw_data_mode() -> Result<bool> {
    Ok(get()?.storage.get_raw_data_mode())
}

pub fn toggle_raw_data_mode(enable: bool) -> Result<()> {
    get()?.storage.toggle_raw_data_mode(enable)
}

/// Every log line is also sent to `listener`, e.g. for an in-app console.
pub fn set_log_listener(listener: mpsc::Sender<String>) {
    logs::set_listener(listener);
}

pub fn export_logs(target_file_path: String) -> Result<()> {
    let state = get()?;
    log::logger().flush();
    logs::export(&state.cache_dir, &target_file_path)
}
