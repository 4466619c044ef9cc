//! Replays a raw data csv (as recorded in raw data mode) through a fresh
//! tracker and prints the summary.
//!
//!     cargo run --example replay -- <raw_data.csv> [out.gpx]
use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::time::Duration;

use stride_core::config::TrackerConfig;
use stride_core::error::AcquisitionError;
use stride_core::export_data;
use stride_core::gps_processor::ProcessResult;
use stride_core::sources::{LocationProvider, ManualClock, Subscription, TickProvider};
use stride_core::storage;
use stride_core::tracker::{Tracker, TrackerSources};
use stride_core::workout::WorkoutType;

struct Replayed;

impl Subscription for Replayed {
    fn release(&mut self) {}
}

impl LocationProvider for Replayed {
    fn subscribe(&mut self) -> Result<Box<dyn Subscription>, AcquisitionError> {
        Ok(Box::new(Replayed))
    }
}

impl TickProvider for Replayed {
    fn subscribe(&mut self, _interval: Duration) -> Result<Box<dyn Subscription>, AcquisitionError> {
        Ok(Box::new(Replayed))
    }
}

pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("usage: {} <raw_data.csv> [out.gpx]", args[0]);
        std::process::exit(1);
    }

    let rows = storage::read_raw_data_file(&args[1])?;
    println!("replaying {} samples from {}", rows.len(), args[1]);

    let clock = ManualClock::new();
    let mut tracker = Tracker::new(
        WorkoutType::Run,
        TrackerConfig::default(),
        TrackerSources {
            location: Box::new(Replayed),
            ticks: Box::new(Replayed),
            clock: Box::new(clock.clone()),
        },
    );
    tracker.start()?;

    let first_timestamp_ms = rows.iter().find_map(|row| row.timestamp_ms);
    let mut rejected = 0;
    for row in &rows {
        // samples recorded while nothing was tracking stay out of the replay
        if ProcessResult::of_int(row.process_result)? == ProcessResult::NotTracking {
            continue;
        }
        if let (Some(first), Some(timestamp_ms)) = (first_timestamp_ms, row.timestamp_ms) {
            clock.set_ms((timestamp_ms - first).max(0) as u64);
            tracker.on_tick();
        }
        if !tracker.on_location(&row.to_raw_data()).is_accepted() {
            rejected += 1;
        }
    }

    let summary = tracker.finish()?;
    println!("{rejected} samples rejected");
    println!("{}", summary.to_json()?);

    if let Some(gpx_path) = args.get(2) {
        let mut writer = BufWriter::new(File::create(gpx_path)?);
        export_data::route_to_gpx_file(&summary, &mut writer)?;
        println!("route written to {gpx_path}");
    }
    Ok(())
}
