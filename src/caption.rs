use anyhow::Result;

use crate::summary::SessionSummary;
use crate::utils;

pub const FALLBACK_CAPTION: &str = "Crushed it! 💪 (AI is sleeping)";
pub const EMPTY_CAPTION: &str = "Just finished a run! 🏃‍♂️💨";

pub struct CaptionRequest<'a> {
    /// Bare base64, without any data-url prefix.
    pub image_base64: &'a str,
    pub distance_km: f64,
    pub pace: &'a str,
    pub duration_minutes: u64,
}

/// Whatever writes the post caption (a remote model, usually). It lives
/// outside this crate; the tracker only feeds it the summary.
pub trait CaptionGenerator {
    fn generate(&self, request: &CaptionRequest) -> Result<String>;
}

pub fn caption_or_fallback(
    generator: &dyn CaptionGenerator,
    image: &str,
    summary: &SessionSummary,
) -> String {
    let request = CaptionRequest {
        image_base64: utils::strip_data_url_prefix(image),
        distance_km: summary.total_distance_km,
        pace: &summary.average_pace,
        duration_minutes: summary.total_duration_seconds / 60,
    };
    match generator.generate(&request) {
        Ok(caption) if caption.trim().is_empty() => EMPTY_CAPTION.to_string(),
        Ok(caption) => caption,
        Err(e) => {
            warn!("[caption] generation failed, using fallback: {:?}", e);
            FALLBACK_CAPTION.to_string()
        }
    }
}
