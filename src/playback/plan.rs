use crate::foundation::core::{SegmentRef, delay_ms_to_u64, secs_to_ms};
use crate::markers::alignment::AlignmentSet;
use crate::markers::index::MarkerIndex;
use crate::markers::parse::parse_markers;
use crate::reveal::evaluate::RevealTargets;
use crate::scene::model::{SegmentId, SlideMetadata};
use crate::scene::presentation::Presentation;
use crate::timing::calculator::{DelayKind, DurationCalculator};
use crate::timing::config::{ResolvedTiming, TimingConfig, resolve_timing};

/// Segment as the clock plays it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedSegment {
    /// Authored id.
    pub id: SegmentId,
    /// Audio resource, if any.
    pub audio_path: Option<String>,
    /// Authored audio length in milliseconds.
    pub duration_ms: u64,
    /// Gap after the segment in milliseconds.
    pub delay_after_ms: u64,
    /// Which gap follows.
    pub delay_kind: DelayKind,
    /// Resolved marker offsets and word spans.
    pub markers: MarkerIndex,
    /// Markers and ranges visuals observe.
    pub reveal: RevealTargets,
}

/// Slide as the clock plays it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedSlide {
    /// Chapter grouping.
    pub chapter: u32,
    /// Slide number within the chapter.
    pub slide: u32,
    /// Display title.
    pub title: String,
    /// Segments in order; may be empty.
    pub segments: Vec<PlannedSegment>,
}

/// Immutable per-presentation schedule: everything the clock reads, resolved once at load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackPlan {
    slides: Vec<PlannedSlide>,
    lead_in_ms: u64,
}

impl PlaybackPlan {
    /// Resolve delays, marker indices and reveal targets for every segment.
    ///
    /// Segments without alignment get an empty marker index, so every marker they observe is
    /// reached immediately.
    pub fn build(
        presentation: &Presentation,
        alignment: Option<&AlignmentSet>,
        defaults: &ResolvedTiming,
    ) -> Self {
        let calc = DurationCalculator::new(*defaults);
        let demo = presentation.timing();
        let slides = presentation.slides();
        let last = slides.len().saturating_sub(1);

        let planned = slides
            .iter()
            .enumerate()
            .map(|(i, slide)| plan_slide(&calc, slide, i == last, demo, alignment))
            .collect();

        let lead_in = resolve_timing(defaults, demo, None, None).before_first_slide;
        Self {
            slides: planned,
            lead_in_ms: delay_ms_to_u64(lead_in),
        }
    }

    /// Slides in presentation order.
    pub fn slides(&self) -> &[PlannedSlide] {
        &self.slides
    }

    /// Silence before the first segment in milliseconds.
    pub fn lead_in_ms(&self) -> u64 {
        self.lead_in_ms
    }

    /// Segment at `at`, if it exists.
    pub fn segment(&self, at: SegmentRef) -> Option<&PlannedSegment> {
        self.slides.get(at.slide)?.segments.get(at.segment)
    }

    /// `true` when `at` names an existing segment.
    pub fn contains(&self, at: SegmentRef) -> bool {
        self.segment(at).is_some()
    }

    /// First segment of the presentation, skipping empty slides.
    pub fn first(&self) -> Option<SegmentRef> {
        self.first_from_slide(0)
    }

    /// Last segment of the presentation, skipping empty slides.
    pub fn last(&self) -> Option<SegmentRef> {
        self.slides
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, s)| s.segments.len().checked_sub(1).map(|j| SegmentRef::new(i, j)))
    }

    /// Segment played after `at`.
    pub fn next_after(&self, at: SegmentRef) -> Option<SegmentRef> {
        let slide = self.slides.get(at.slide)?;
        if at.segment + 1 < slide.segments.len() {
            return Some(SegmentRef::new(at.slide, at.segment + 1));
        }
        self.first_from_slide(at.slide + 1)
    }

    /// Segment played before `at`.
    pub fn previous_before(&self, at: SegmentRef) -> Option<SegmentRef> {
        if at.segment > 0 {
            return Some(SegmentRef::new(at.slide, at.segment - 1));
        }
        self.slides[..at.slide.min(self.slides.len())]
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, s)| s.segments.len().checked_sub(1).map(|j| SegmentRef::new(i, j)))
    }

    /// Number of playable segments.
    pub fn segment_count(&self) -> usize {
        self.slides.iter().map(|s| s.segments.len()).sum()
    }

    /// Narrated run time in milliseconds, lead-in included.
    pub fn total_ms(&self) -> u64 {
        self.lead_in_ms
            + self
                .slides
                .iter()
                .flat_map(|s| &s.segments)
                .map(|s| s.duration_ms + s.delay_after_ms)
                .sum::<u64>()
    }

    fn first_from_slide(&self, from: usize) -> Option<SegmentRef> {
        self.slides
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, s)| !s.segments.is_empty())
            .map(|(i, _)| SegmentRef::new(i, 0))
    }
}

fn plan_slide(
    calc: &DurationCalculator,
    slide: &SlideMetadata,
    is_last_slide: bool,
    demo: Option<&TimingConfig>,
    alignment: Option<&AlignmentSet>,
) -> PlannedSlide {
    let breakdown = calc.slide_duration(slide, is_last_slide, demo);
    let segments = slide
        .audio_segments
        .iter()
        .zip(&breakdown.segments)
        .map(|(seg, info)| {
            let narration = seg.narration_text.as_deref();

            let mut reveal = RevealTargets {
                markers: Vec::new(),
                ranges: slide.ranges.iter().chain(&seg.ranges).cloned().collect(),
            };
            for name in &seg.markers {
                reveal.observe_marker(name.as_str());
            }
            if let Some(text) = narration {
                for m in parse_markers(text).markers {
                    reveal.observe_marker(m.id);
                }
            }

            let aligned = alignment.and_then(|a| a.segment(slide.chapter, slide.slide, &seg.id));
            let markers = match aligned {
                Some(a) => MarkerIndex::from_alignment(a, narration),
                None => {
                    if alignment.is_some() && !reveal.markers.is_empty() {
                        tracing::warn!(
                            chapter = slide.chapter,
                            slide = slide.slide,
                            segment = %seg.id,
                            "no alignment for segment, markers reveal immediately"
                        );
                    }
                    MarkerIndex::empty()
                }
            };

            PlannedSegment {
                id: seg.id.clone(),
                audio_path: seg.audio_file_path.clone().filter(|p| !p.trim().is_empty()),
                duration_ms: secs_to_ms(info.audio_duration),
                delay_after_ms: secs_to_ms(info.delay_after),
                delay_kind: info.delay_kind,
                markers,
                reveal,
            }
        })
        .collect();

    PlannedSlide {
        chapter: slide.chapter,
        slide: slide.slide,
        title: slide.title.clone(),
        segments,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/plan.rs"]
mod tests;
