#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use stride_core::config::TrackerConfig;
use stride_core::error::AcquisitionError;
use stride_core::gps_processor::{Point, RawData, EARTH_RADIUS_KM};
use stride_core::sources::{LocationProvider, ManualClock, Subscription, TickProvider};
use stride_core::tracker::{Tracker, TrackerSources};
use stride_core::workout::WorkoutType;

// Meters per degree of latitude on the haversine sphere.
const METERS_PER_DEGREE: f64 = EARTH_RADIUS_KM * 1000. * std::f64::consts::PI / 180.;

pub const START_LAT: f64 = 49.2827;
pub const START_LNG: f64 = -123.1207;

pub fn start_point() -> Point {
    Point::new(START_LAT, START_LNG)
}

/// Moves `origin` by roughly `north_m` / `east_m` meters. Pure north/south
/// moves are exact on the haversine sphere.
pub fn offset(origin: &Point, north_m: f64, east_m: f64) -> Point {
    let latitude = origin.latitude + north_m / METERS_PER_DEGREE;
    let longitude =
        origin.longitude + east_m / (METERS_PER_DEGREE * origin.latitude.to_radians().cos());
    Point::new(latitude, longitude)
}

pub fn sample(point: &Point, accuracy: Option<f32>) -> RawData {
    let mut raw_data = RawData::new(point.latitude, point.longitude);
    raw_data.accuracy = accuracy;
    raw_data
}

pub fn good_sample(point: &Point) -> RawData {
    sample(point, Some(5.0))
}

/// A provider that can be told to refuse, and counts what it hands out.
#[derive(Clone, Default)]
pub struct FakeSource {
    deny: Arc<AtomicBool>,
    pub acquired: Arc<AtomicUsize>,
    pub released: Arc<AtomicUsize>,
}

impl FakeSource {
    pub fn set_deny(&self, deny: bool) {
        self.deny.store(deny, Ordering::SeqCst);
    }

    pub fn active(&self) -> usize {
        self.acquired.load(Ordering::SeqCst) - self.released.load(Ordering::SeqCst)
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    fn subscribe_inner(&self) -> Result<Box<dyn Subscription>, AcquisitionError> {
        if self.deny.load(Ordering::SeqCst) {
            return Err(AcquisitionError::PermissionDenied);
        }
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSubscription {
            released: self.released.clone(),
        }))
    }
}

struct FakeSubscription {
    released: Arc<AtomicUsize>,
}

impl Subscription for FakeSubscription {
    fn release(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl LocationProvider for FakeSource {
    fn subscribe(&mut self) -> Result<Box<dyn Subscription>, AcquisitionError> {
        self.subscribe_inner()
    }
}

impl TickProvider for FakeSource {
    fn subscribe(&mut self, _interval: Duration) -> Result<Box<dyn Subscription>, AcquisitionError> {
        self.subscribe_inner()
    }
}

pub struct TestTracker {
    pub tracker: Tracker,
    pub clock: ManualClock,
    pub location: FakeSource,
    pub ticks: FakeSource,
}

impl TestTracker {
    pub fn new() -> Self {
        Self::with_config(WorkoutType::Run, TrackerConfig::default())
    }

    pub fn with_config(workout_type: WorkoutType, config: TrackerConfig) -> Self {
        let clock = ManualClock::new();
        let location = FakeSource::default();
        let ticks = FakeSource::default();
        let tracker = Tracker::new(
            workout_type,
            config,
            TrackerSources {
                location: Box::new(location.clone()),
                ticks: Box::new(ticks.clone()),
                clock: Box::new(clock.clone()),
            },
        );
        TestTracker {
            tracker,
            clock,
            location,
            ticks,
        }
    }

    /// Moves the clock forward one second at a time, ticking after each.
    pub fn run_for_secs(&mut self, secs: u64) {
        for _ in 0..secs {
            self.clock.advance_ms(1000);
            self.tracker.on_tick();
        }
    }
}
