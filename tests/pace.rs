use stride_core::pace::{
    format_pace, format_pace_with_epsilon, pace_minutes_per_km, UNDEFINED_PACE,
};

#[test]
fn whole_and_half_minutes() {
    assert_eq!(format_pace(1.0, 300), "5'00\"");
    assert_eq!(format_pace(5.0, 1500), "5'00\"");
    assert_eq!(format_pace(1.0, 330), "5'30\"");
    assert_eq!(format_pace(2.0, 660), "5'30\"");
    assert_eq!(format_pace(10.0, 3000), "5'00\"");
    assert_eq!(format_pace(0.5, 210), "7'00\"");
    assert_eq!(format_pace(1.0, 0), "0'00\"");
}

#[test]
fn seconds_are_padded() {
    assert_eq!(format_pace(1.0, 305), "5'05\"");
    assert_eq!(format_pace(1.0, 61), "1'01\"");
}

#[test]
fn slow_paces_keep_minutes() {
    assert_eq!(format_pace(0.1, 3600), "600'00\"");
}

#[test]
fn too_short_is_undefined() {
    assert_eq!(format_pace(0., 300), UNDEFINED_PACE);
    assert_eq!(format_pace(0.0005, 300), UNDEFINED_PACE);
    assert_eq!(format_pace(-1., 300), UNDEFINED_PACE);
    assert_eq!(format_pace(f64::NAN, 300), UNDEFINED_PACE);
    assert_ne!(format_pace(0.0006, 300), UNDEFINED_PACE);
    assert_eq!(pace_minutes_per_km(0.0004, 300, 0.0005), None);
}

#[test]
fn rounding_carries_into_minutes() {
    // 4.9995 min/km would otherwise show as 4'60"
    assert_eq!(format_pace(1.0001, 300), "5'00\"");
    assert_eq!(format_pace(1.0, 359), "5'59\"");
}

#[test]
fn custom_epsilon() {
    assert_eq!(format_pace_with_epsilon(0.05, 60, 0.1), UNDEFINED_PACE);
    assert_eq!(format_pace_with_epsilon(0.2, 60, 0.1), "5'00\"");
}
