//! Slidecue computes the timing of narrated slide presentations and keeps on-screen reveals in
//! step with the narration while they play.
//!
//! - Load a [`Presentation`] and get a [`PresentationDurationReport`] from the four-level timing
//!   hierarchy (segment, slide, presentation, global defaults)
//! - Resolve narration markers against an [`AlignmentSet`] into per-segment [`MarkerIndex`]es
//! - Drive a [`PlaybackClock`] (narrated or manual) and observe [`PlaybackSnapshot`]s carrying
//!   reached markers and active ranges
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod markers;
pub(crate) mod playback;
pub(crate) mod reveal;
pub(crate) mod scene;
pub(crate) mod timing;

pub use crate::foundation::core::{
    PlaybackPosition, SegmentRef, delay_ms_to_secs, delay_ms_to_u64, format_mmss, secs_to_ms,
};
pub use crate::foundation::error::{SlidecueError, SlidecueResult};
pub use crate::foundation::hash::Fingerprint;

pub use crate::markers::alignment::{
    AlignedWord, AlignmentSet, ResolvedMarker, SegmentAlignment, SlideAlignment, resolve_markers,
};
pub use crate::markers::index::{MarkerEntry, MarkerIndex, WordSpan};
pub use crate::markers::parse::{
    MarkerAnchor, ParsedMarker, ParsedNarration, has_markers, parse_markers, strip_markers,
};
pub use crate::playback::clock::{
    AudioTicket, ClockEffect, ClockOptions, EventOutcome, PlaybackClock, SubscriptionId,
    TimerKind, TimerToken,
};
pub use crate::playback::driver::{Transition, VirtualDriver};
pub use crate::playback::plan::{PlannedSegment, PlannedSlide, PlaybackPlan};
pub use crate::playback::state::{ClockState, PlaybackMode, PlaybackSnapshot};
pub use crate::reveal::evaluate::{
    RevealClock, RevealTargets, RevealState, evaluate_reveal, marker_reached, range_progress,
    range_within,
};
pub use crate::reveal::window::SegmentWindow;
pub use crate::scene::model::{AudioSegment, MarkerRange, SegmentId, SlideMetadata};
pub use crate::scene::presentation::Presentation;
pub use crate::timing::calculator::{
    DelayKind, DurationCalculator, PresentationDurationReport, SegmentDurationInfo,
    SlideDurationBreakdown, calculate_presentation_duration, calculate_slide_duration,
};
pub use crate::timing::config::{ResolvedTiming, TimingConfig, resolve_timing};
