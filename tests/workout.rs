use anyhow::Result;
use chrono::Utc;
use std::cell::RefCell;
use stride_core::caption::{
    self, CaptionGenerator, CaptionRequest, EMPTY_CAPTION, FALLBACK_CAPTION,
};
use stride_core::gps_processor::Point;
use stride_core::pace::UNDEFINED_PACE;
use stride_core::summary::SessionSummary;
use stride_core::workout::{WorkoutRecord, WorkoutType};

fn summary(workout_type: WorkoutType, distance_km: f64, pace: &str) -> SessionSummary {
    let now = Utc::now();
    SessionSummary {
        workout_type,
        total_distance_km: distance_km,
        total_duration_seconds: 1530,
        average_pace: pace.to_string(),
        route: vec![Point::new(1., 2.)],
        started_at: now,
        finished_at: now,
    }
}

struct Canned {
    reply: Option<&'static str>,
    seen: RefCell<Vec<(String, f64, String, u64)>>,
}

impl Canned {
    fn new(reply: Option<&'static str>) -> Self {
        Canned {
            reply,
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl CaptionGenerator for Canned {
    fn generate(&self, request: &CaptionRequest) -> Result<String> {
        self.seen.borrow_mut().push((
            request.image_base64.to_string(),
            request.distance_km,
            request.pace.to_string(),
            request.duration_minutes,
        ));
        match self.reply {
            Some(reply) => Ok(reply.to_string()),
            None => Err(anyhow::anyhow!("quota exceeded")),
        }
    }
}

#[test]
fn caption_request_from_summary() {
    let generator = Canned::new(Some("Sunrise 5k done"));
    let summary = summary(WorkoutType::Run, 5.0, "5'06\"");
    let caption = caption::caption_or_fallback(&generator, "data:image/jpeg;base64,QUJD", &summary);
    assert_eq!(caption, "Sunrise 5k done");
    assert_eq!(
        generator.seen.borrow().as_slice(),
        &[("QUJD".to_string(), 5.0, "5'06\"".to_string(), 25)]
    );
}

#[test]
fn caption_falls_back() {
    let summary = summary(WorkoutType::Run, 5.0, "5'06\"");
    assert_eq!(
        caption::caption_or_fallback(&Canned::new(None), "QUJD", &summary),
        FALLBACK_CAPTION
    );
    assert_eq!(
        caption::caption_or_fallback(&Canned::new(Some("  ")), "QUJD", &summary),
        EMPTY_CAPTION
    );
}

#[test]
fn record_for_distance_workout() {
    let summary = summary(WorkoutType::Run, 5.0, "5'06\"");
    let record = WorkoutRecord::from_summary(&summary, Some("hi".to_string()));
    assert_eq!(record.workout_type, WorkoutType::Run);
    assert_eq!(record.distance_km, Some(5.0));
    assert_eq!(record.duration_seconds, 1530);
    assert_eq!(record.pace.as_deref(), Some("5'06\""));
    assert_eq!(record.caption.as_deref(), Some("hi"));
    assert_eq!(record.timestamp, summary.finished_at);

    let other = WorkoutRecord::from_summary(&summary, None);
    assert_ne!(record.id, other.id);
}

#[test]
fn record_without_pace() {
    let yoga = WorkoutRecord::from_summary(&summary(WorkoutType::Yoga, 0., UNDEFINED_PACE), None);
    assert_eq!(yoga.distance_km, None);
    assert_eq!(yoga.pace, None);

    let short_walk =
        WorkoutRecord::from_summary(&summary(WorkoutType::Walk, 0.0002, UNDEFINED_PACE), None);
    assert_eq!(short_walk.distance_km, Some(0.0002));
    assert_eq!(short_walk.pace, None);
}

#[test]
fn record_json() {
    let record = WorkoutRecord::from_summary(&summary(WorkoutType::Cycling, 12.5, "2'24\""), None);
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["workout_type"], "CYCLING");
    assert_eq!(json["distance_km"], 12.5);
    let back: WorkoutRecord = serde_json::from_value(json).unwrap();
    assert_eq!(back, record);
}
