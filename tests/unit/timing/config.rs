use super::*;

fn uniform(v: f64) -> ResolvedTiming {
    ResolvedTiming {
        between_segments: v,
        between_slides: v,
        after_final_slide: v,
        before_first_slide: v,
    }
}

#[test]
fn each_level_overrides_only_its_own_field() {
    let defaults = uniform(1.0);
    let demo = TimingConfig {
        between_segments: Some(2.0),
        ..TimingConfig::EMPTY
    };
    let slide = TimingConfig {
        between_slides: Some(2.0),
        ..TimingConfig::EMPTY
    };
    let segment = TimingConfig {
        after_final_slide: Some(2.0),
        ..TimingConfig::EMPTY
    };

    let r = resolve_timing(&defaults, Some(&demo), Some(&slide), Some(&segment));
    assert_eq!(r.between_segments, 2.0);
    assert_eq!(r.between_slides, 2.0);
    assert_eq!(r.after_final_slide, 2.0);
    assert_eq!(r.before_first_slide, 1.0);
}

#[test]
fn more_specific_level_wins_per_field() {
    let defaults = ResolvedTiming::DEFAULT;
    let demo = TimingConfig {
        between_segments: Some(100.0),
        between_slides: Some(200.0),
        ..TimingConfig::EMPTY
    };
    let slide = TimingConfig {
        between_segments: Some(300.0),
        ..TimingConfig::EMPTY
    };
    let segment = TimingConfig {
        between_segments: Some(400.0),
        ..TimingConfig::EMPTY
    };

    let r = resolve_timing(&defaults, Some(&demo), Some(&slide), Some(&segment));
    assert_eq!(r.between_segments, 400.0);
    assert_eq!(r.between_slides, 200.0);
    assert_eq!(r.after_final_slide, 2000.0);

    let r = resolve_timing(&defaults, Some(&demo), Some(&slide), None);
    assert_eq!(r.between_segments, 300.0);
}

#[test]
fn absent_levels_fall_back_to_defaults() {
    let r = resolve_timing(&ResolvedTiming::DEFAULT, None, None, None);
    assert_eq!(r, ResolvedTiming::DEFAULT);

    let empty = TimingConfig::default();
    let r = resolve_timing(&ResolvedTiming::DEFAULT, Some(&empty), Some(&empty), Some(&empty));
    assert_eq!(r, ResolvedTiming::DEFAULT);
}

#[test]
fn negative_values_pass_through_unchanged() {
    let segment = TimingConfig {
        between_segments: Some(-50.0),
        ..TimingConfig::EMPTY
    };
    let r = resolve_timing(&ResolvedTiming::DEFAULT, None, None, Some(&segment));
    assert_eq!(r.between_segments, -50.0);
}

#[test]
fn zero_is_a_defined_value() {
    let slide = TimingConfig {
        between_slides: Some(0.0),
        ..TimingConfig::EMPTY
    };
    let r = resolve_timing(&ResolvedTiming::DEFAULT, None, Some(&slide), None);
    assert_eq!(r.between_slides, 0.0);
}

#[test]
fn partial_defaults_file_merges_over_builtins() {
    let json = r#"{ "betweenSlides": 1500, "beforeFirstSlide": 250 }"#;
    let d = ResolvedTiming::from_reader(json.as_bytes()).unwrap();
    assert_eq!(d.between_segments, 500.0);
    assert_eq!(d.between_slides, 1500.0);
    assert_eq!(d.after_final_slide, 2000.0);
    assert_eq!(d.before_first_slide, 250.0);
}

#[test]
fn malformed_defaults_file_is_a_validation_error() {
    let err = ResolvedTiming::from_reader("{ nope".as_bytes()).unwrap_err();
    assert!(err.to_string().contains("validation error:"));
}

#[test]
fn defined_fields_lists_only_set_values() {
    let cfg = TimingConfig {
        between_slides: Some(10.0),
        before_first_slide: Some(-1.0),
        ..TimingConfig::EMPTY
    };
    let fields: Vec<_> = cfg.defined_fields().collect();
    assert_eq!(fields, vec![("betweenSlides", 10.0), ("beforeFirstSlide", -1.0)]);
    assert!(TimingConfig::EMPTY.is_empty());
    assert!(!cfg.is_empty());
}
