use super::*;

#[test]
fn segment_ids_accept_numbers_and_strings() {
    let seg: AudioSegment = serde_json::from_str(r#"{ "id": 3, "duration": 1.5 }"#).unwrap();
    assert_eq!(seg.id, SegmentId::Index(3));
    let seg: AudioSegment = serde_json::from_str(r#"{ "id": "intro" }"#).unwrap();
    assert_eq!(seg.id, SegmentId::Name("intro".to_owned()));
    assert_eq!(seg.id.to_string(), "intro");
    assert_eq!(seg.audio_duration(), 0.0);
}

#[test]
fn slide_json_uses_authoring_field_names() {
    let json = r#"
{
  "chapter": 1,
  "slide": 2,
  "title": "Costs",
  "timing": { "betweenSegments": 750 },
  "ranges": [{ "name": "hl", "from": "cost", "until": "done" }],
  "audioSegments": [
    { "id": 0, "audioFilePath": "audio/c1/s2_segment_01.wav", "duration": 2.0,
      "narrationText": "The {#cost}cost{done#} matters." },
    { "id": 1, "duration": 1.0, "timing": { "betweenSlides": 0 } }
  ]
}
"#;
    let slide: SlideMetadata = serde_json::from_str(json).unwrap();
    assert_eq!(slide.coord_key(), "c1_s2");
    assert_eq!(slide.audio_segments.len(), 2);
    assert_eq!(
        slide.timing.unwrap().between_segments,
        Some(750.0)
    );
    assert_eq!(slide.ranges[0], MarkerRange::new("hl", "cost", Some("done")));
    assert_eq!(
        slide.audio_segments[0].audio_file_path.as_deref(),
        Some("audio/c1/s2_segment_01.wav")
    );
    assert_eq!(
        slide.audio_segments[1].timing.unwrap().between_slides,
        Some(0.0)
    );
}

#[test]
fn segments_alias_is_accepted() {
    let slide: SlideMetadata =
        serde_json::from_str(r#"{ "chapter": 0, "slide": 0, "title": "t", "segments": [{ "id": 0 }] }"#)
            .unwrap();
    assert!(slide.has_audio_segments());
}

#[test]
fn known_audio_duration_requires_every_segment() {
    let mut slide = SlideMetadata::new(
        0,
        0,
        "t",
        vec![AudioSegment::with_duration(0, 1.5), AudioSegment::with_duration(1, 2.0)],
    );
    assert_eq!(slide.known_audio_duration(), Some(3.5));
    slide.audio_segments[1].duration = None;
    assert_eq!(slide.known_audio_duration(), None);
    slide.audio_segments.clear();
    assert_eq!(slide.known_audio_duration(), None);
}
