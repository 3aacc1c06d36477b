use crate::markers::index::MarkerIndex;
use crate::scene::model::MarkerRange;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Where inside the current segment reveals are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RevealClock {
    /// Every marker of the segment counts as passed (manual mode without scrubbing).
    FullyElapsed,
    /// Offset from segment start in milliseconds.
    At(u64),
}

impl RevealClock {
    fn offset_ms(self) -> u64 {
        match self {
            Self::FullyElapsed => u64::MAX,
            Self::At(ms) => ms,
        }
    }
}

/// Marker and range names a segment's visuals observe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevealTargets {
    /// Observed marker names, including ones that may never resolve.
    pub markers: Vec<String>,
    /// Observed ranges.
    pub ranges: Vec<MarkerRange>,
}

impl RevealTargets {
    /// Add a marker name unless already present.
    pub fn observe_marker(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.markers.contains(&name) {
            self.markers.push(name);
        }
    }
}

/// What visuals should show for the current position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealState {
    /// Markers at or before the current offset, plus every unresolved observed marker.
    pub reached_markers: BTreeSet<String>,
    /// Ranges the current offset is within.
    pub active_ranges: BTreeSet<String>,
}

/// `true` once the offset is at or past the marker. Unresolved markers count as reached.
pub fn marker_reached(index: &MarkerIndex, name: &str, clock: RevealClock) -> bool {
    match index.lookup(name) {
        Some(at) => clock.offset_ms() >= at,
        None => true,
    }
}

/// `true` when the offset lies in `[from, until)`. An absent or unresolved `until` leaves the
/// range open-ended.
pub fn range_within(index: &MarkerIndex, range: &MarkerRange, clock: RevealClock) -> bool {
    if !marker_reached(index, &range.from, clock) {
        return false;
    }
    match range.until.as_deref().and_then(|u| index.lookup(u)) {
        Some(until) => match clock {
            RevealClock::FullyElapsed => false,
            RevealClock::At(ms) => ms < until,
        },
        None => true,
    }
}

/// Progress through a range, `0.0..=1.0`.
///
/// Linear between the two resolved ends, clamped. A range with a missing end, no `until`, or
/// `until <= from` has no measurable span and reports `0.0`; [`range_within`] still degrades to
/// visible for it.
pub fn range_progress(index: &MarkerIndex, range: &MarkerRange, clock: RevealClock) -> f64 {
    let from = index.lookup(&range.from);
    let until = range.until.as_deref().and_then(|u| index.lookup(u));
    let (Some(from), Some(until)) = (from, until) else {
        return 0.0;
    };
    if until <= from {
        return 0.0;
    }
    match clock {
        RevealClock::FullyElapsed => 1.0,
        RevealClock::At(ms) => ((ms as f64 - from as f64) / (until - from) as f64).clamp(0.0, 1.0),
    }
}

/// Evaluate reveals for one segment.
///
/// Indexed markers are reached by offset. Observed markers missing from the index are always
/// reached so visuals never wait on absent alignment.
pub fn evaluate_reveal(
    targets: &RevealTargets,
    index: &MarkerIndex,
    clock: RevealClock,
) -> RevealState {
    let mut state = RevealState::default();
    let names = index
        .entries()
        .iter()
        .map(|e| e.name.as_str())
        .chain(targets.markers.iter().map(String::as_str));
    for name in names {
        if marker_reached(index, name, clock) {
            state.reached_markers.insert(name.to_owned());
        }
    }
    for range in &targets.ranges {
        if range_within(index, range, clock) {
            state.active_ranges.insert(range.name.clone());
        }
    }
    state
}

#[cfg(test)]
#[path = "../../tests/unit/reveal/evaluate.rs"]
mod tests;
