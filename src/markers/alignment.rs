use crate::foundation::error::{SlidecueError, SlidecueResult};
use crate::markers::parse::{MarkerAnchor, ParsedMarker, parse_markers};
use crate::scene::model::SegmentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// One word with its timing inside the segment audio, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedWord {
    /// Spoken word as transcribed.
    pub word: String,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Aligner confidence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Marker with a resolved time in seconds from segment start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMarker {
    /// Marker id.
    pub id: String,
    /// Time in seconds.
    pub time: f64,
    /// Word edge the time was taken from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<MarkerAnchor>,
    /// Index of the word the marker was bound to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_index: Option<usize>,
}

/// Alignment output for one audio segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentAlignment {
    /// Id of the segment this alignment belongs to.
    pub segment_id: SegmentId,
    /// Hash of the audio the words were aligned against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_hash: Option<String>,
    /// Hash of the narration text, markers included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narration_hash: Option<String>,
    /// Word timings in spoken order.
    #[serde(default)]
    pub words: Vec<AlignedWord>,
    /// Markers already resolved by the aligner.
    #[serde(default)]
    pub markers: Vec<ResolvedMarker>,
}

impl SegmentAlignment {
    /// Markers for this segment.
    ///
    /// Uses the pre-resolved markers when present; otherwise resolves markers parsed from
    /// `narration` against the word timings.
    pub fn markers_for(&self, narration: Option<&str>) -> Vec<ResolvedMarker> {
        if !self.markers.is_empty() {
            return self.markers.clone();
        }
        match narration {
            Some(text) if !self.words.is_empty() => {
                resolve_markers(&parse_markers(text).markers, &self.words)
            }
            _ => Vec::new(),
        }
    }
}

/// Alignment for every segment of one slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideAlignment {
    /// Chapter of the slide.
    pub chapter: u32,
    /// Slide number within the chapter.
    pub slide: u32,
    /// Per-segment alignment.
    #[serde(default)]
    pub segments: Vec<SegmentAlignment>,
}

/// Alignment file of a whole presentation, keyed by `c{chapter}_s{slide}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentSet {
    /// Presentation the file was generated for.
    #[serde(default)]
    pub demo_id: String,
    /// Generation timestamp as written by the aligner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    /// Slides keyed by coordinate.
    #[serde(default)]
    pub slides: BTreeMap<String, SlideAlignment>,
}

impl AlignmentSet {
    /// Parse an alignment file from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> SlidecueResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| SlidecueError::alignment(format!("parse alignment JSON: {e}")))
    }

    /// Parse an alignment file from a JSON string.
    pub fn from_json_str(s: &str) -> SlidecueResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Parse an alignment file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> SlidecueResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SlidecueError::alignment(format!("open alignment JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// `true` when no slide carries alignment.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Alignment of one slide.
    pub fn slide(&self, chapter: u32, slide: u32) -> Option<&SlideAlignment> {
        self.slides.get(&format!("c{chapter}_s{slide}"))
    }

    /// Alignment of one segment, matched by segment id.
    pub fn segment(&self, chapter: u32, slide: u32, id: &SegmentId) -> Option<&SegmentAlignment> {
        self.slide(chapter, slide)?
            .segments
            .iter()
            .find(|s| &s.segment_id == id)
    }
}

/// Resolve parsed markers against word timings.
///
/// Start anchors take the bound word's start, end anchors its end. Markers whose word index
/// falls outside `words` are dropped.
pub fn resolve_markers(parsed: &[ParsedMarker], words: &[AlignedWord]) -> Vec<ResolvedMarker> {
    let mut out = Vec::with_capacity(parsed.len());
    for m in parsed {
        let Some(word) = m.word_index.and_then(|i| words.get(i)) else {
            tracing::warn!(
                marker = %m.id,
                word_index = ?m.word_index,
                words = words.len(),
                "marker word index out of bounds, skipping"
            );
            continue;
        };
        let time = match m.anchor {
            MarkerAnchor::Start => word.start,
            MarkerAnchor::End => word.end,
        };
        out.push(ResolvedMarker {
            id: m.id.clone(),
            time,
            anchor: Some(m.anchor),
            word_index: m.word_index,
        });
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/markers/alignment.rs"]
mod tests;
