use super::*;

fn seg(id: impl Into<SegmentId>, secs: f64) -> AudioSegment {
    let mut s = AudioSegment::with_duration(id, secs);
    s.audio_file_path = Some("/audio/x.wav".to_owned());
    s
}

fn def(slides: Vec<SlideMetadata>) -> PresentationDef {
    PresentationDef {
        slides,
        ..PresentationDef::default()
    }
}

fn messages(def: &PresentationDef) -> Vec<String> {
    match validate_presentation(def) {
        Ok(()) => Vec::new(),
        Err(e) => e.errors.iter().map(ToString::to_string).collect(),
    }
}

#[test]
fn well_formed_presentation_passes() {
    let d = def(vec![
        SlideMetadata::new(1, 1, "Intro", vec![seg(0u64, 3.0), seg(1u64, 2.0)]),
        SlideMetadata::new(1, 2, "Next", vec![seg("outro", 1.0)]),
        SlideMetadata::new(2, 1, "Blank", vec![]),
    ]);
    assert!(validate_presentation(&d).is_ok());
}

#[test]
fn reports_paths_for_slide_and_segment_problems() {
    let mut bad_path = seg(1u64, 1.0);
    bad_path.audio_file_path = Some("  ".to_owned());
    let d = def(vec![
        SlideMetadata::new(1, 1, "", vec![seg(0u64, 1.0), bad_path]),
        SlideMetadata::new(1, 1, "Again", vec![seg("a", 1.0), seg("a", 1.0)]),
    ]);
    let msgs = messages(&d);
    assert!(msgs.contains(&"$.slides[0].title: title must be non-empty".to_owned()));
    assert!(msgs.contains(
        &"$.slides[0].audioSegments[1].audioFilePath: audioFilePath must be non-empty when present"
            .to_owned()
    ));
    assert!(msgs.contains(&"$.slides[1]: duplicate slide coordinates chapter 1 slide 1".to_owned()));
    assert!(msgs.contains(&"$.slides[1].audioSegments[1].id: duplicate segment id 'a'".to_owned()));
}

#[test]
fn numeric_ids_must_match_position() {
    let d = def(vec![SlideMetadata::new(
        1,
        1,
        "S",
        vec![seg(0u64, 1.0), seg(5u64, 1.0)],
    )]);
    assert_eq!(
        messages(&d),
        vec!["$.slides[0].audioSegments[1].id: numeric id 5 does not match segment position 1"]
    );
}

#[test]
fn rejects_negative_durations_and_delays() {
    let mut s = seg(0u64, -1.0);
    s.timing = Some(TimingConfig {
        between_segments: Some(-5.0),
        ..TimingConfig::EMPTY
    });
    let mut d = def(vec![SlideMetadata::new(1, 1, "S", vec![s])]);
    d.timing = Some(TimingConfig {
        after_final_slide: Some(f64::NAN),
        ..TimingConfig::EMPTY
    });
    let msgs = messages(&d);
    assert_eq!(msgs.len(), 3);
    assert!(msgs[0].starts_with("$.timing.afterFinalSlide: delay must be finite"));
    assert!(msgs[1].starts_with("$.slides[0].audioSegments[0].duration:"));
    assert!(msgs[2].starts_with("$.slides[0].audioSegments[0].timing.betweenSegments:"));
}

#[test]
fn ranges_and_markers_need_names() {
    let mut s = seg(0u64, 1.0);
    s.markers = vec!["ok".to_owned(), "".to_owned()];
    s.ranges = vec![MarkerRange::new("r", "", Some(" "))];
    s.narration_text = Some("{#a}one {#a}two".to_owned());
    let mut slide = SlideMetadata::new(1, 1, "S", vec![s]);
    slide.ranges = vec![MarkerRange::new("", "a", None)];
    let msgs = messages(&def(vec![slide]));
    assert_eq!(
        msgs,
        vec![
            "$.slides[0].ranges[0].name: range name must be non-empty",
            "$.slides[0].audioSegments[0].markers[1]: marker name must be non-empty",
            "$.slides[0].audioSegments[0].narrationText: marker 'a' appears more than once",
            "$.slides[0].audioSegments[0].ranges[0].from: range start marker must be non-empty",
            "$.slides[0].audioSegments[0].ranges[0].until: range end marker must be non-empty",
        ]
    );
}

#[test]
fn errors_display_one_per_line() {
    let d = def(vec![
        SlideMetadata::new(1, 1, "", vec![]),
        SlideMetadata::new(1, 1, "", vec![]),
    ]);
    let err = validate_presentation(&d).unwrap_err();
    assert_eq!(err.to_string().lines().count(), 3);
}
