use crate::foundation::core::delay_ms_to_secs;
use crate::foundation::hash::{Fingerprint, StableHasher};
use crate::scene::model::SlideMetadata;
use crate::timing::config::{ResolvedTiming, TimingConfig, resolve_timing};
use serde::{Deserialize, Serialize};

/// Which gap follows a segment.
///
/// Purely positional: it depends on the segment's index within its slide and on whether the slide
/// is the last one, never on segment content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DelayKind {
    /// Segment is not the last of its slide.
    BetweenSegments,
    /// Last segment of a non-final slide.
    BetweenSlides,
    /// Last segment of the final slide.
    AfterFinalSlide,
}

impl DelayKind {
    /// Classify the gap after segment `segment_index` of a slide with `segment_count` segments.
    pub fn classify(segment_index: usize, segment_count: usize, is_last_slide: bool) -> Self {
        if segment_index + 1 < segment_count {
            Self::BetweenSegments
        } else if is_last_slide {
            Self::AfterFinalSlide
        } else {
            Self::BetweenSlides
        }
    }

    /// The resolved millisecond value this kind reads.
    pub fn delay_ms(self, timing: &ResolvedTiming) -> f64 {
        match self {
            Self::BetweenSegments => timing.between_segments,
            Self::BetweenSlides => timing.between_slides,
            Self::AfterFinalSlide => timing.after_final_slide,
        }
    }

    fn tag(self) -> u8 {
        match self {
            Self::BetweenSegments => 0,
            Self::BetweenSlides => 1,
            Self::AfterFinalSlide => 2,
        }
    }
}

/// Per-segment timing, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentDurationInfo {
    /// Position within the slide.
    pub segment_index: usize,
    /// Audio length (0 when absent).
    pub audio_duration: f64,
    /// Gap inserted after this segment.
    pub delay_after: f64,
    /// Which configured gap `delay_after` came from.
    pub delay_kind: DelayKind,
}

/// Duration breakdown of one slide, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideDurationBreakdown {
    /// Chapter of the slide.
    pub chapter: u32,
    /// Slide number within the chapter.
    pub slide: u32,
    /// Slide title.
    pub title: String,
    /// `audio_duration + delays_duration`.
    pub total_duration: f64,
    /// Sum of segment audio.
    pub audio_duration: f64,
    /// Sum of every segment's `delay_after`.
    pub delays_duration: f64,
    /// Ordered per-segment timing.
    pub segments: Vec<SegmentDurationInfo>,
}

/// Whole-presentation duration report, in seconds.
///
/// Delays are partitioned by [`DelayKind`]; the three buckets always sum to the sum of every
/// segment's `delay_after`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationDurationReport {
    /// Audio plus all three delay buckets.
    pub total_duration: f64,
    /// Sum of all segment audio.
    pub audio_only_duration: f64,
    /// Gaps between segments inside a slide.
    pub segment_delays_duration: f64,
    /// Gaps between slides.
    pub slide_delays_duration: f64,
    /// Gap after the last segment of the last slide.
    pub final_delay_duration: f64,
    /// Start silence before the first slide. Reported separately, not part of `total_duration`.
    pub lead_in_duration: f64,
    /// Ordered per-slide breakdowns.
    pub slide_breakdowns: Vec<SlideDurationBreakdown>,
}

impl PresentationDurationReport {
    /// All-zero report with no slides.
    pub fn empty() -> Self {
        Self {
            total_duration: 0.0,
            audio_only_duration: 0.0,
            segment_delays_duration: 0.0,
            slide_delays_duration: 0.0,
            final_delay_duration: 0.0,
            lead_in_duration: 0.0,
            slide_breakdowns: Vec::new(),
        }
    }

    /// Sum of the three delay buckets.
    pub fn delays_duration(&self) -> f64 {
        self.segment_delays_duration + self.slide_delays_duration + self.final_delay_duration
    }

    /// Wall-clock length a recorder should reserve: lead-in plus total, scaled by `buffer`.
    pub fn recording_budget(&self, buffer: f64) -> f64 {
        let buffer = if buffer.is_finite() && buffer > 0.0 {
            buffer
        } else {
            1.0
        };
        (self.lead_in_duration + self.total_duration) * buffer
    }

    /// Number of segments across all slides.
    pub fn segment_count(&self) -> usize {
        self.slide_breakdowns.iter().map(|s| s.segments.len()).sum()
    }

    /// Stable fingerprint over every number and title in the report.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut h = StableHasher::new();
        h.write_f64(self.total_duration);
        h.write_f64(self.audio_only_duration);
        h.write_f64(self.segment_delays_duration);
        h.write_f64(self.slide_delays_duration);
        h.write_f64(self.final_delay_duration);
        h.write_f64(self.lead_in_duration);
        h.write_usize(self.slide_breakdowns.len());
        for s in &self.slide_breakdowns {
            h.write_u64(u64::from(s.chapter));
            h.write_u64(u64::from(s.slide));
            h.write_str(&s.title);
            h.write_f64(s.total_duration);
            h.write_f64(s.audio_duration);
            h.write_f64(s.delays_duration);
            h.write_usize(s.segments.len());
            for seg in &s.segments {
                h.write_usize(seg.segment_index);
                h.write_f64(seg.audio_duration);
                h.write_f64(seg.delay_after);
                h.write_u8(seg.delay_kind.tag());
            }
        }
        h.finish()
    }
}

/// Duration calculator bound to one set of global defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DurationCalculator {
    defaults: ResolvedTiming,
}

impl DurationCalculator {
    /// Calculator over the given global defaults.
    pub fn new(defaults: ResolvedTiming) -> Self {
        Self { defaults }
    }

    /// Global defaults in effect.
    pub fn defaults(&self) -> &ResolvedTiming {
        &self.defaults
    }

    /// Duration breakdown of one slide.
    ///
    /// A slide without segments yields an all-zero breakdown. Otherwise each segment's delay is
    /// resolved through the timing hierarchy and chosen by [`DelayKind::classify`].
    pub fn slide_duration(
        &self,
        slide: &SlideMetadata,
        is_last_slide: bool,
        demo: Option<&TimingConfig>,
    ) -> SlideDurationBreakdown {
        let segments = &slide.audio_segments;
        let mut out = SlideDurationBreakdown {
            chapter: slide.chapter,
            slide: slide.slide,
            title: slide.title.clone(),
            total_duration: 0.0,
            audio_duration: 0.0,
            delays_duration: 0.0,
            segments: Vec::with_capacity(segments.len()),
        };
        if segments.is_empty() {
            return out;
        }

        for (index, segment) in segments.iter().enumerate() {
            let audio_duration = segment.audio_duration();
            let resolved = resolve_timing(
                &self.defaults,
                demo,
                slide.timing.as_ref(),
                segment.timing.as_ref(),
            );
            let delay_kind = DelayKind::classify(index, segments.len(), is_last_slide);
            let delay_ms = delay_kind.delay_ms(&resolved);
            if !delay_ms.is_finite() || delay_ms < 0.0 {
                tracing::warn!(
                    chapter = slide.chapter,
                    slide = slide.slide,
                    segment = index,
                    delay_ms,
                    "invalid delay clamped to 0"
                );
            }
            let delay_after = delay_ms_to_secs(delay_ms);

            out.audio_duration += audio_duration;
            out.delays_duration += delay_after;
            out.segments.push(SegmentDurationInfo {
                segment_index: index,
                audio_duration,
                delay_after,
                delay_kind,
            });
        }

        out.total_duration = out.audio_duration + out.delays_duration;
        out
    }

    /// Duration report for a whole presentation.
    ///
    /// Only the last slide (by position) is treated as final. Every segment's `delay_after` is
    /// bucketed with the same positional rule that produced it.
    #[tracing::instrument(skip(self, slides, demo), fields(slides = slides.len()))]
    pub fn presentation_duration(
        &self,
        slides: &[SlideMetadata],
        demo: Option<&TimingConfig>,
    ) -> PresentationDurationReport {
        if slides.is_empty() {
            return PresentationDurationReport::empty();
        }

        let mut report = PresentationDurationReport::empty();
        let last = slides.len() - 1;
        for (slide_index, slide) in slides.iter().enumerate() {
            let is_last_slide = slide_index == last;
            let breakdown = self.slide_duration(slide, is_last_slide, demo);
            report.audio_only_duration += breakdown.audio_duration;

            let count = breakdown.segments.len();
            for (segment_index, seg) in breakdown.segments.iter().enumerate() {
                match DelayKind::classify(segment_index, count, is_last_slide) {
                    DelayKind::BetweenSegments => report.segment_delays_duration += seg.delay_after,
                    DelayKind::BetweenSlides => report.slide_delays_duration += seg.delay_after,
                    DelayKind::AfterFinalSlide => report.final_delay_duration += seg.delay_after,
                }
            }
            report.slide_breakdowns.push(breakdown);
        }

        report.total_duration = report.audio_only_duration
            + report.segment_delays_duration
            + report.slide_delays_duration
            + report.final_delay_duration;
        report.lead_in_duration =
            delay_ms_to_secs(resolve_timing(&self.defaults, demo, None, None).before_first_slide);

        tracing::debug!(
            total = report.total_duration,
            audio = report.audio_only_duration,
            "presentation duration computed"
        );
        report
    }
}

/// [`DurationCalculator::slide_duration`] over the built-in defaults.
pub fn calculate_slide_duration(
    slide: &SlideMetadata,
    is_last_slide: bool,
    demo: Option<&TimingConfig>,
) -> SlideDurationBreakdown {
    DurationCalculator::default().slide_duration(slide, is_last_slide, demo)
}

/// [`DurationCalculator::presentation_duration`] over the built-in defaults.
pub fn calculate_presentation_duration(
    slides: &[SlideMetadata],
    demo: Option<&TimingConfig>,
) -> PresentationDurationReport {
    DurationCalculator::default().presentation_duration(slides, demo)
}

#[cfg(test)]
#[path = "../../tests/unit/timing/calculator.rs"]
mod tests;
