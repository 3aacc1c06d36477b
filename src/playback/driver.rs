use crate::foundation::core::{PlaybackPosition, SegmentRef};
use crate::foundation::error::{SlidecueError, SlidecueResult};
use crate::playback::clock::{
    AudioTicket, ClockEffect, EventOutcome, PlaybackClock, TimerKind, TimerToken,
};
use crate::playback::state::ClockState;
use std::collections::{HashMap, HashSet};

/// One observed clock transition on the virtual timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Virtual time in milliseconds.
    pub at_ms: u64,
    /// State entered.
    pub state: ClockState,
    /// Segment the clock pointed at.
    pub segment: Option<SegmentRef>,
}

#[derive(Debug, Clone, Copy)]
struct VirtualTimer {
    token: TimerToken,
    remaining_ms: u64,
    elapsed_ms: u64,
    paused: bool,
}

#[derive(Debug, Clone, Copy)]
struct VirtualAudio {
    ticket: AudioTicket,
    duration_ms: u64,
    position_ms: u64,
    paused: bool,
}

/// Deterministic host for a [`PlaybackClock`]: virtual time, timers and simulated audio.
///
/// Applies the clock's effects and feeds events back in timestamp order. Audio plays for its
/// configured real length (the segment's live duration by default) and reports its playhead
/// every tick.
#[derive(Debug, Clone)]
pub struct VirtualDriver {
    now_ms: u64,
    tick_ms: u64,
    since_tick_ms: u64,
    timers: Vec<VirtualTimer>,
    audio: Option<VirtualAudio>,
    audio_lengths: HashMap<String, u64>,
    failing: HashSet<String>,
    transitions: Vec<Transition>,
    stale_events: usize,
}

impl Default for VirtualDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualDriver {
    /// Driver at virtual time zero with a 50ms tick.
    pub fn new() -> Self {
        Self::with_tick(50)
    }

    /// Driver reporting playheads every `tick_ms` (minimum 1).
    pub fn with_tick(tick_ms: u64) -> Self {
        Self {
            now_ms: 0,
            tick_ms: tick_ms.max(1),
            since_tick_ms: 0,
            timers: Vec::new(),
            audio: None,
            audio_lengths: HashMap::new(),
            failing: HashSet::new(),
            transitions: Vec::new(),
            stale_events: 0,
        }
    }

    /// Make audio at `path` play for `ms` regardless of the authored duration.
    pub fn set_audio_length(&mut self, path: impl Into<String>, ms: u64) {
        self.audio_lengths.insert(path.into(), ms);
    }

    /// Make audio at `path` fail to load.
    pub fn fail_audio(&mut self, path: impl Into<String>) {
        self.failing.insert(path.into());
    }

    /// Virtual time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// State transitions observed so far.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Events the clock rejected as stale.
    pub fn stale_events(&self) -> usize {
        self.stale_events
    }

    /// Number of timers currently scheduled.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Apply queued clock effects until none remain.
    pub fn pump(&mut self, clock: &mut PlaybackClock) {
        loop {
            self.record(clock);
            let effects = clock.drain_effects();
            if effects.is_empty() {
                return;
            }
            for effect in effects {
                self.apply(clock, effect);
            }
        }
    }

    /// Advance virtual time by `ms`, delivering every event due on the way.
    pub fn advance(&mut self, clock: &mut PlaybackClock, ms: u64) {
        let target = self.now_ms.saturating_add(ms);
        loop {
            self.pump(clock);
            if self.fire_due(clock) {
                continue;
            }
            if self.now_ms >= target {
                break;
            }
            let step = self.next_step(target);
            self.elapse(step);
            self.since_tick_ms += step;
            if self.since_tick_ms >= self.tick_ms {
                self.since_tick_ms = 0;
                self.report_progress(clock);
            }
        }
    }

    /// Advance until the clock finishes or goes idle. Returns the virtual time spent.
    pub fn run_to_completion(
        &mut self,
        clock: &mut PlaybackClock,
        limit_ms: u64,
    ) -> SlidecueResult<u64> {
        let started = self.now_ms;
        self.pump(clock);
        loop {
            if matches!(clock.state(), ClockState::Finished | ClockState::Idle) {
                return Ok(self.now_ms - started);
            }
            if self.now_ms - started >= limit_ms {
                return Err(SlidecueError::playback(format!(
                    "playback still {:?} after {limit_ms}ms",
                    clock.state()
                )));
            }
            self.advance(clock, self.tick_ms);
        }
    }

    fn record(&mut self, clock: &PlaybackClock) {
        let segment = clock.position().map(PlaybackPosition::segment_ref);
        let state = clock.state();
        let changed = self
            .transitions
            .last()
            .is_none_or(|t| t.state != state || t.segment != segment);
        if changed {
            self.transitions.push(Transition {
                at_ms: self.now_ms,
                state,
                segment,
            });
        }
    }

    fn note(&mut self, outcome: EventOutcome) {
        if outcome == EventOutcome::Stale {
            self.stale_events += 1;
        }
    }

    fn apply(&mut self, clock: &mut PlaybackClock, effect: ClockEffect) {
        match effect {
            ClockEffect::PlayAudio { ticket, path } => {
                if self.failing.contains(&path) {
                    let outcome = clock.on_audio_error(ticket, &format!("cannot load '{path}'"));
                    self.note(outcome);
                    return;
                }
                let duration_ms = self
                    .audio_lengths
                    .get(&path)
                    .copied()
                    .unwrap_or_else(|| clock.segment_duration_ms());
                self.audio = Some(VirtualAudio {
                    ticket,
                    duration_ms,
                    position_ms: 0,
                    paused: false,
                });
                let outcome = clock.on_audio_loaded(ticket, duration_ms as f64 / 1000.0);
                self.note(outcome);
            }
            ClockEffect::PauseAudio { ticket } => self.with_audio(ticket, |a| a.paused = true),
            ClockEffect::ResumeAudio { ticket } => self.with_audio(ticket, |a| a.paused = false),
            ClockEffect::StopAudio { ticket } => {
                if self.audio.is_some_and(|a| a.ticket == ticket) {
                    self.audio = None;
                }
            }
            ClockEffect::StartTimer { token, after_ms } => self.timers.push(VirtualTimer {
                token,
                remaining_ms: after_ms,
                elapsed_ms: 0,
                paused: false,
            }),
            ClockEffect::CancelTimer { token } => self.timers.retain(|t| t.token != token),
            ClockEffect::PauseTimer { token } => self.with_timer(token, |t| t.paused = true),
            ClockEffect::ResumeTimer { token } => self.with_timer(token, |t| t.paused = false),
        }
    }

    fn with_audio(&mut self, ticket: AudioTicket, f: impl FnOnce(&mut VirtualAudio)) {
        if let Some(a) = self.audio.as_mut().filter(|a| a.ticket == ticket) {
            f(a);
        }
    }

    fn with_timer(&mut self, token: TimerToken, f: impl FnOnce(&mut VirtualTimer)) {
        if let Some(t) = self.timers.iter_mut().find(|t| t.token == token) {
            f(t);
        }
    }

    /// Deliver one event due now. Returns `false` when nothing is due.
    fn fire_due(&mut self, clock: &mut PlaybackClock) -> bool {
        if let Some(i) = self
            .timers
            .iter()
            .position(|t| !t.paused && t.remaining_ms == 0)
        {
            let timer = self.timers.remove(i);
            if timer.token.kind == TimerKind::SegmentEnd {
                let outcome = clock.on_timer_progress(timer.token, timer.elapsed_ms);
                self.note(outcome);
            }
            let outcome = clock.on_timer(timer.token);
            self.note(outcome);
            return true;
        }
        if let Some(a) = self.audio
            && !a.paused
            && a.position_ms >= a.duration_ms
        {
            self.audio = None;
            let outcome = clock.on_audio_time(a.ticket, a.position_ms);
            self.note(outcome);
            let outcome = clock.on_audio_ended(a.ticket);
            self.note(outcome);
            return true;
        }
        false
    }

    fn next_step(&self, target: u64) -> u64 {
        let mut step = (target - self.now_ms).min(self.tick_ms - self.since_tick_ms);
        for t in self.timers.iter().filter(|t| !t.paused) {
            step = step.min(t.remaining_ms);
        }
        if let Some(a) = self.audio.filter(|a| !a.paused) {
            step = step.min(a.duration_ms - a.position_ms);
        }
        step.max(1)
    }

    fn elapse(&mut self, step: u64) {
        self.now_ms += step;
        for t in self.timers.iter_mut().filter(|t| !t.paused) {
            t.remaining_ms = t.remaining_ms.saturating_sub(step);
            t.elapsed_ms += step;
        }
        if let Some(a) = self.audio.as_mut().filter(|a| !a.paused) {
            a.position_ms = (a.position_ms + step).min(a.duration_ms);
        }
    }

    fn report_progress(&mut self, clock: &mut PlaybackClock) {
        if let Some(a) = self.audio.filter(|a| !a.paused) {
            let outcome = clock.on_audio_time(a.ticket, a.position_ms);
            self.note(outcome);
        }
        let running: Vec<VirtualTimer> = self
            .timers
            .iter()
            .filter(|t| !t.paused && t.token.kind == TimerKind::SegmentEnd)
            .copied()
            .collect();
        for t in running {
            let outcome = clock.on_timer_progress(t.token, t.elapsed_ms);
            self.note(outcome);
        }
        self.pump(clock);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/driver.rs"]
mod tests;
