pub const UNDEFINED_PACE: &str = "--'--\"";
pub const DEFAULT_PACE_EPSILON_KM: f64 = 0.0005;

/// Minutes per kilometer, or `None` when the distance is too short to mean
/// anything.
pub fn pace_minutes_per_km(distance_km: f64, duration_seconds: u64, epsilon_km: f64) -> Option<f64> {
    // written this way so a NaN distance also ends up undefined
    if !(distance_km > epsilon_km) {
        return None;
    }
    Some((duration_seconds as f64 / 60.) / distance_km)
}

pub fn format_pace(distance_km: f64, duration_seconds: u64) -> String {
    format_pace_with_epsilon(distance_km, duration_seconds, DEFAULT_PACE_EPSILON_KM)
}

/// Renders as `M'SS"`. Rounded seconds never show as 60.
pub fn format_pace_with_epsilon(distance_km: f64, duration_seconds: u64, epsilon_km: f64) -> String {
    match pace_minutes_per_km(distance_km, duration_seconds, epsilon_km) {
        None => UNDEFINED_PACE.to_string(),
        Some(pace) => {
            let mut minutes = pace.floor() as u64;
            let mut seconds = ((pace - minutes as f64) * 60.).round() as u64;
            if seconds >= 60 {
                minutes += 1;
                seconds -= 60;
            }
            format!("{minutes}'{seconds:02}\"")
        }
    }
}
