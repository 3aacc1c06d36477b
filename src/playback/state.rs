use crate::foundation::core::PlaybackPosition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Playback clock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClockState {
    /// No segment loaded.
    Idle,
    /// Holding the start silence before the first segment.
    LeadIn,
    /// Segment audio (or its stand-in timer) is advancing.
    Playing,
    /// Held by the user, or waiting for a manual advance.
    Paused,
    /// Holding the gap after a finished segment.
    AdvancingDelay,
    /// The final delay of the final slide has elapsed.
    Finished,
}

impl ClockState {
    /// `true` for states that own a pending timer or audio.
    pub fn is_running(self) -> bool {
        matches!(self, Self::LeadIn | Self::Playing | Self::AdvancingDelay)
    }
}

/// How position advances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackMode {
    /// Audio drives the position and the clock advances on its own.
    #[default]
    Narrated,
    /// The user advances with next/previous; reveals show fully elapsed segments.
    Manual,
}

/// Everything a visual consumer needs after a clock change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    /// Generation the snapshot was taken under.
    pub generation: u64,
    /// Clock state.
    pub state: ClockState,
    /// Clock mode.
    pub mode: PlaybackMode,
    /// Current position; `None` while idle.
    pub position: Option<PlaybackPosition>,
    /// Live duration of the current segment in milliseconds.
    pub segment_duration_ms: u64,
    /// Gap after the current segment in milliseconds.
    pub delay_after_ms: u64,
    /// Markers reached in the current segment.
    pub reached_markers: BTreeSet<String>,
    /// Ranges the position is within.
    pub active_ranges: BTreeSet<String>,
    /// Word being spoken, when word timings exist.
    pub current_word: Option<usize>,
}

impl PlaybackSnapshot {
    /// `true` when `name` is among the reached markers.
    pub fn reached(&self, name: &str) -> bool {
        self.reached_markers.contains(name)
    }

    /// `true` when `name` is among the active ranges.
    pub fn within(&self, name: &str) -> bool {
        self.active_ranges.contains(name)
    }
}
