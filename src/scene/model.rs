use crate::foundation::core::audio_secs;
use crate::timing::config::TimingConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable segment identifier: authored either as an ordinal or as an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SegmentId {
    /// Numeric id, conventionally equal to the segment's position in its slide.
    Index(u64),
    /// Free-form id.
    Name(String),
}

impl Default for SegmentId {
    fn default() -> Self {
        Self::Index(0)
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Name(s) => f.write_str(s),
        }
    }
}

impl From<u64> for SegmentId {
    fn from(v: u64) -> Self {
        Self::Index(v)
    }
}

impl From<&str> for SegmentId {
    fn from(v: &str) -> Self {
        Self::Name(v.to_owned())
    }
}

/// Named interval between two markers of the same segment, `[from, until)`.
///
/// An absent `until` makes the range open-ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerRange {
    /// Name visual consumers observe in `activeRanges`.
    pub name: String,
    /// Marker that opens the range.
    pub from: String,
    /// Marker that closes the range (exclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,
}

impl MarkerRange {
    /// Build a range; pass `None` for an open-ended range.
    pub fn new(name: impl Into<String>, from: impl Into<String>, until: Option<&str>) -> Self {
        Self {
            name: name.into(),
            from: from.into(),
            until: until.map(str::to_owned),
        }
    }
}

/// One narrated unit inside a slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSegment {
    /// Stable identifier.
    pub id: SegmentId,
    /// Audio resource; segments without one are paced by a timer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_file_path: Option<String>,
    /// Audio length in seconds; absent counts as zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Segment-level delay overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<TimingConfig>,
    /// Narration text, possibly carrying inline `{#id}` / `{id#}` markers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narration_text: Option<String>,
    /// Extra marker names visuals observe, beyond those inline in the narration.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<String>,
    /// Ranges scoped to this segment only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ranges: Vec<MarkerRange>,
}

impl AudioSegment {
    /// Segment with an id and an audio duration in seconds.
    pub fn with_duration(id: impl Into<SegmentId>, secs: f64) -> Self {
        Self {
            id: id.into(),
            duration: Some(secs),
            ..Self::default()
        }
    }

    /// Sanitized audio duration in seconds (absent, negative or non-finite become `0.0`).
    pub fn audio_duration(&self) -> f64 {
        audio_secs(self.duration)
    }
}

/// Authored metadata of one slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideMetadata {
    /// Chapter grouping.
    pub chapter: u32,
    /// Slide number within the chapter.
    pub slide: u32,
    /// Display title.
    pub title: String,
    /// Ordered narrated segments.
    #[serde(default, alias = "segments")]
    pub audio_segments: Vec<AudioSegment>,
    /// Slide-level delay overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<TimingConfig>,
    /// Ranges evaluated against every segment of the slide.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ranges: Vec<MarkerRange>,
}

impl SlideMetadata {
    /// Slide with coordinates, a title and segments.
    pub fn new(
        chapter: u32,
        slide: u32,
        title: impl Into<String>,
        segments: Vec<AudioSegment>,
    ) -> Self {
        Self {
            chapter,
            slide,
            title: title.into(),
            audio_segments: segments,
            ..Self::default()
        }
    }

    /// `true` when the slide has at least one segment.
    pub fn has_audio_segments(&self) -> bool {
        !self.audio_segments.is_empty()
    }

    /// Sum of segment durations, or `None` when the slide has no segments or any duration is
    /// missing.
    pub fn known_audio_duration(&self) -> Option<f64> {
        if !self.has_audio_segments() {
            return None;
        }
        self.audio_segments
            .iter()
            .map(|s| s.duration)
            .sum::<Option<f64>>()
    }

    /// Alignment-file key, `c{chapter}_s{slide}`.
    pub fn coord_key(&self) -> String {
        format!("c{}_s{}", self.chapter, self.slide)
    }
}

/// Boundary JSON of a whole presentation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PresentationDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) timing: Option<TimingConfig>,
    #[serde(default)]
    pub(crate) slides: Vec<SlideMetadata>,
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
