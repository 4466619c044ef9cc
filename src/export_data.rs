use anyhow::Result;
use geo_types::Point;
use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint};
use std::io::Write;

use crate::summary::SessionSummary;

pub fn route_to_gpx(summary: &SessionSummary) -> Gpx {
    let mut segment = TrackSegment::new();
    segment.points = summary
        .route
        .iter()
        // geo_types points are (x, y), i.e. (longitude, latitude)
        .map(|point| Waypoint::new(Point::new(point.longitude, point.latitude)))
        .collect();

    let mut track = Track::new();
    track.name = Some(format!(
        "{} {}",
        summary.workout_type,
        summary.started_at.format("%Y-%m-%d %H:%M")
    ));
    track.description = Some(format!(
        "{:.2} km in {}, pace {}",
        summary.total_distance_km,
        summary.formatted_duration(),
        summary.average_pace
    ));
    track.type_ = Some(summary.workout_type.to_string());
    track.segments.push(segment);

    let mut gpx = Gpx::default();
    gpx.version = GpxVersion::Gpx11;
    gpx.creator = Some("stride_core".to_string());
    gpx.tracks.push(track);
    gpx
}

pub fn route_to_gpx_file<W: Write>(summary: &SessionSummary, writer: &mut W) -> Result<()> {
    if summary.route.is_empty() {
        bail!("[export_data] nothing to export, the route is empty");
    }
    gpx::write(&route_to_gpx(summary), writer)?;
    Ok(())
}
