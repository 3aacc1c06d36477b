use super::*;

#[test]
fn position_clamps_offset_to_segment_duration() {
    let p = PlaybackPosition::start_of(SegmentRef::new(2, 1));
    assert_eq!(p.offset_ms, 0);
    assert_eq!(p.clamped(5_000, 1_200).offset_ms, 1_200);
    assert_eq!(p.clamped(900, 1_200).offset_ms, 900);
    assert_eq!(p.clamped(900, 1_200).segment_ref(), SegmentRef::new(2, 1));
}

#[test]
fn delay_conversion_clamps_bad_values() {
    assert_eq!(delay_ms_to_secs(500.0), 0.5);
    assert_eq!(delay_ms_to_secs(-250.0), 0.0);
    assert_eq!(delay_ms_to_secs(f64::NAN), 0.0);
    assert_eq!(delay_ms_to_u64(1499.6), 1500);
    assert_eq!(delay_ms_to_u64(-1.0), 0);
}

#[test]
fn audio_duration_defaults_to_zero() {
    assert_eq!(audio_secs(None), 0.0);
    assert_eq!(audio_secs(Some(-3.0)), 0.0);
    assert_eq!(audio_secs(Some(f64::INFINITY)), 0.0);
    assert_eq!(audio_secs(Some(2.25)), 2.25);
    assert_eq!(secs_to_ms(2.25), 2_250);
}

#[test]
fn mmss_formatting() {
    assert_eq!(format_mmss(0.0), "0:00");
    assert_eq!(format_mmss(59.9), "0:59");
    assert_eq!(format_mmss(61.0), "1:01");
    assert_eq!(format_mmss(3_600.0), "60:00");
    assert_eq!(format_mmss(-4.0), "0:00");
}
