pub mod test_utils;
#[macro_use]
extern crate assert_float_eq;

use chrono::{TimeZone, Utc};
use std::io::BufReader;
use stride_core::export_data;
use stride_core::summary::SessionSummary;
use stride_core::workout::WorkoutType;
use test_utils::*;

fn summary_with_route(route_len: usize) -> SessionSummary {
    let a = start_point();
    let route = (0..route_len)
        .map(|i| offset(&a, 10. * i as f64, 5. * i as f64))
        .collect();
    SessionSummary {
        workout_type: WorkoutType::Cycling,
        total_distance_km: 0.1,
        total_duration_seconds: 65,
        average_pace: "10'50\"".to_string(),
        route,
        started_at: Utc.with_ymd_and_hms(2024, 5, 1, 7, 30, 0).unwrap(),
        finished_at: Utc.with_ymd_and_hms(2024, 5, 1, 7, 31, 5).unwrap(),
    }
}

#[test]
fn gpx_track_follows_route() {
    let summary = summary_with_route(10);
    let mut buf = Vec::new();
    export_data::route_to_gpx_file(&summary, &mut buf).unwrap();

    let gpx = gpx::read(BufReader::new(buf.as_slice())).unwrap();
    assert_eq!(gpx.tracks.len(), 1);
    let track = &gpx.tracks[0];
    assert_eq!(track.name.as_deref(), Some("CYCLING 2024-05-01 07:30"));
    assert_eq!(track.type_.as_deref(), Some("CYCLING"));
    assert_eq!(track.segments.len(), 1);

    let points = &track.segments[0].points;
    assert_eq!(points.len(), summary.route.len());
    for (waypoint, point) in points.iter().zip(summary.route.iter()) {
        let p = waypoint.point();
        assert_float_absolute_eq!(p.y(), point.latitude, 1e-7);
        assert_float_absolute_eq!(p.x(), point.longitude, 1e-7);
    }
}

#[test]
fn gpx_description() {
    let gpx = export_data::route_to_gpx(&summary_with_route(2));
    assert_eq!(
        gpx.tracks[0].description.as_deref(),
        Some("0.10 km in 01:05, pace 10'50\"")
    );
}

#[test]
fn empty_route_is_rejected() {
    let summary = summary_with_route(0);
    let mut buf = Vec::new();
    assert!(export_data::route_to_gpx_file(&summary, &mut buf).is_err());
    assert!(buf.is_empty());
}
