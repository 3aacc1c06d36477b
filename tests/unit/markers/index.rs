use super::*;
use crate::markers::alignment::ResolvedMarker;
use crate::scene::model::SegmentId;

#[test]
fn lookup_returns_offsets_and_misses() {
    let idx = MarkerIndex::build([("intro", 0u64), ("cost", 1200), ("done", 4000)]);
    assert_eq!(idx.len(), 3);
    assert_eq!(idx.lookup("cost"), Some(1200));
    assert_eq!(idx.lookup("missing"), None);
    assert!(idx.contains("done"));
    assert!(!MarkerIndex::empty().contains("done"));
    assert!(MarkerIndex::empty().is_empty());
}

#[test]
fn first_duplicate_wins() {
    let idx = MarkerIndex::build([("a", 100u64), ("a", 50)]);
    assert_eq!(idx.len(), 1);
    assert_eq!(idx.lookup("a"), Some(100));
}

#[test]
fn out_of_order_offsets_keep_authored_order() {
    let idx = MarkerIndex::build([("late", 3000u64), ("early", 1000)]);
    let names: Vec<&str> = idx.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["late", "early"]);
    assert_eq!(idx.lookup("early"), Some(1000));
}

#[test]
fn builds_from_alignment_in_milliseconds() {
    let alignment = SegmentAlignment {
        segment_id: SegmentId::Index(0),
        words: vec![
            AlignedWord {
                word: "Hello".to_owned(),
                start: 0.1,
                end: 0.5,
                score: None,
            },
            AlignedWord {
                word: "world".to_owned(),
                start: 0.6,
                end: 1.2,
                score: Some(0.8),
            },
        ],
        markers: vec![ResolvedMarker {
            id: "world".to_owned(),
            time: 0.6,
            anchor: None,
            word_index: Some(1),
        }],
        ..SegmentAlignment::default()
    };
    let idx = MarkerIndex::from_alignment(&alignment, None);
    assert_eq!(idx.lookup("world"), Some(600));
    assert_eq!(idx.words().len(), 2);
    assert_eq!(idx.word_at(99), None);
    assert_eq!(idx.word_at(100), Some(0));
    assert_eq!(idx.word_at(500), None);
    assert_eq!(idx.word_at(1199), Some(1));
    assert_eq!(idx.word_at(1200), None);
}
