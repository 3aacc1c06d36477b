use serde::{Deserialize, Serialize};

/// Address of one segment: slide index in presentation order plus segment index within it.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SegmentRef {
    /// 0-based slide index in presentation order.
    pub slide: usize,
    /// 0-based segment index within the slide.
    pub segment: usize,
}

impl SegmentRef {
    /// Shorthand constructor.
    pub fn new(slide: usize, segment: usize) -> Self {
        Self { slide, segment }
    }
}

/// `(slide, segment, offset)` triple owned by the playback clock.
///
/// The offset is milliseconds from the start of the segment and is kept inside
/// `[0, segment duration]` by [`PlaybackPosition::clamped`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackPosition {
    /// 0-based slide index in presentation order.
    pub slide_index: usize,
    /// 0-based segment index within the slide.
    pub segment_index: usize,
    /// Milliseconds from segment start.
    pub offset_ms: u64,
}

impl PlaybackPosition {
    /// Position at offset 0 of `seg`.
    pub fn start_of(seg: SegmentRef) -> Self {
        Self {
            slide_index: seg.slide,
            segment_index: seg.segment,
            offset_ms: 0,
        }
    }

    /// The segment this position points into.
    pub fn segment_ref(self) -> SegmentRef {
        SegmentRef::new(self.slide_index, self.segment_index)
    }

    /// Same segment, offset replaced and clamped to `[0, duration_ms]`.
    pub fn clamped(self, offset_ms: u64, duration_ms: u64) -> Self {
        Self {
            offset_ms: offset_ms.min(duration_ms),
            ..self
        }
    }
}

/// Convert an authored millisecond delay into seconds.
///
/// Negative and non-finite inputs become `0.0`.
pub fn delay_ms_to_secs(ms: f64) -> f64 {
    if !ms.is_finite() || ms <= 0.0 {
        return 0.0;
    }
    ms / 1000.0
}

/// Convert an authored millisecond delay into whole milliseconds (rounded, clamped at 0).
pub fn delay_ms_to_u64(ms: f64) -> u64 {
    if !ms.is_finite() || ms <= 0.0 {
        return 0;
    }
    ms.round() as u64
}

/// Seconds to whole milliseconds (rounded). Negative and non-finite inputs become `0`.
pub fn secs_to_ms(secs: f64) -> u64 {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    (secs * 1000.0).round() as u64
}

/// Sanitize an authored audio duration in seconds.
pub(crate) fn audio_secs(duration: Option<f64>) -> f64 {
    match duration {
        Some(d) if d.is_finite() && d > 0.0 => d,
        _ => 0.0,
    }
}

/// Format seconds as `m:ss`.
pub fn format_mmss(total_secs: f64) -> String {
    let total = if total_secs.is_finite() && total_secs > 0.0 {
        total_secs.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
