use anyhow::Result;
use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

use crate::config::TrackerConfig;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

impl Point {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Point {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance on a sphere of radius `EARTH_RADIUS_KM`.
    pub fn haversine_distance_km(&self, other: &Point) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = lat2 - lat1;
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        // `a` can drift slightly above 1 for antipodal points.
        2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RawData {
    pub point: Point,
    pub timestamp_ms: Option<i64>,
    pub accuracy: Option<f32>,
    pub altitude: Option<f32>,
    pub speed: Option<f32>,
}

impl RawData {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        RawData {
            point: Point::new(latitude, longitude),
            timestamp_ms: None,
            accuracy: None,
            altitude: None,
            speed: None,
        }
    }
}

/// Orders a batch by timestamp. Samples without one keep their arrival
/// position; the timestamped ones are sorted among the remaining slots.
pub fn sort_by_timestamp(raw_data_list: &mut [RawData]) {
    let slots: Vec<usize> = raw_data_list
        .iter()
        .enumerate()
        .filter(|(_, raw_data)| raw_data.timestamp_ms.is_some())
        .map(|(i, _)| i)
        .collect();
    let mut timed: Vec<RawData> = slots.iter().map(|&i| raw_data_list[i].clone()).collect();
    timed.sort_by_key(|raw_data| raw_data.timestamp_ms);
    for (slot, raw_data) in slots.into_iter().zip(timed) {
        raw_data_list[slot] = raw_data;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter)]
#[repr(i8)]
pub enum ProcessResult {
    Append = 0,
    First = 1,
    // negative values are for ones that never reach the route.
    Malformed = -1,
    Inaccurate = -2,
    Jitter = -3,
    NotTracking = -4,
}

impl ProcessResult {
    pub fn to_int(&self) -> i8 {
        *self as i8
    }

    pub fn of_int(i: i8) -> Result<Self> {
        match i {
            0 => Ok(ProcessResult::Append),
            1 => Ok(ProcessResult::First),
            -1 => Ok(ProcessResult::Malformed),
            -2 => Ok(ProcessResult::Inaccurate),
            -3 => Ok(ProcessResult::Jitter),
            -4 => Ok(ProcessResult::NotTracking),
            _ => bail!("Invalid int for `ProcessResult` {}", i),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.to_int() >= 0
    }
}


/// Turns raw samples into a route and a running distance. Samples are
/// checked for sanity, then accuracy, then against the distance from the
/// last accepted point. Rejected samples leave no trace.
pub struct DistanceAccumulator {
    accuracy_threshold_m: f32,
    jitter_threshold_km: f64,
    last_point: Option<Point>,
    total_distance_km: f64,
    route: Vec<Point>,
}

impl DistanceAccumulator {
    pub fn new(config: &TrackerConfig) -> Self {
        DistanceAccumulator {
            accuracy_threshold_m: config.accuracy_threshold_m,
            jitter_threshold_km: config.jitter_threshold_km,
            last_point: None,
            total_distance_km: 0.,
            route: Vec::new(),
        }
    }

    pub fn process(&mut self, curr_data: &RawData) -> ProcessResult {
        let point = &curr_data.point;
        if !point.is_valid() {
            debug!("[gps_processor] dropping malformed sample: {:?}", point);
            return ProcessResult::Malformed;
        }

        // NaN accuracy is treated the same as a very poor fix.
        let inaccurate = match curr_data.accuracy {
            Some(accuracy) => accuracy.is_nan() || accuracy > self.accuracy_threshold_m,
            None => false,
        };
        if inaccurate {
            return ProcessResult::Inaccurate;
        }

        let result = match &self.last_point {
            None => ProcessResult::First,
            Some(last_point) => {
                let distance_km = last_point.haversine_distance_km(point);
                if distance_km < self.jitter_threshold_km {
                    ProcessResult::Jitter
                } else {
                    self.total_distance_km += distance_km;
                    ProcessResult::Append
                }
            }
        };

        if result.is_accepted() {
            self.route.push(point.clone());
            self.last_point = Some(point.clone());
        }
        result
    }

    pub fn last_point(&self) -> Option<&Point> {
        self.last_point.as_ref()
    }

    pub fn total_distance_km(&self) -> f64 {
        self.total_distance_km
    }

    pub fn route(&self) -> &[Point] {
        &self.route
    }

    /// Hands the route out and leaves the accumulator as freshly created.
    pub fn take_route(&mut self) -> Vec<Point> {
        self.last_point = None;
        self.total_distance_km = 0.;
        std::mem::take(&mut self.route)
    }

    pub fn reset(&mut self) {
        let _ = self.take_route();
    }
}
