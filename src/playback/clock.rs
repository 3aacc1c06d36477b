use crate::foundation::core::{PlaybackPosition, SegmentRef, secs_to_ms};
use crate::foundation::error::{SlidecueError, SlidecueResult};
use crate::markers::alignment::AlignmentSet;
use crate::playback::plan::{PlannedSegment, PlaybackPlan};
use crate::playback::state::{ClockState, PlaybackMode, PlaybackSnapshot};
use crate::reveal::evaluate::{RevealClock, RevealState, evaluate_reveal};
use crate::scene::presentation::Presentation;
use crate::timing::config::ResolvedTiming;
use std::fmt;

/// Clock configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClockOptions {
    /// Initial mode.
    pub mode: PlaybackMode,
    /// Global delay defaults.
    pub defaults: ResolvedTiming,
}

/// What a timer was scheduled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Start silence before the first segment.
    LeadIn,
    /// Stand-in for audio on a silent segment (or after an audio failure).
    SegmentEnd,
    /// Gap after a segment.
    DelayEnd,
}

/// Identity of a scheduled timer. Only the token of the current generation is honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken {
    /// Generation the timer was scheduled under.
    pub generation: u64,
    /// Purpose of the timer.
    pub kind: TimerKind,
}

/// Identity of a started audio playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioTicket {
    /// Generation the audio was started under.
    pub generation: u64,
}

/// Side effect the host must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClockEffect {
    /// Load and play `path`; report events with `ticket`.
    PlayAudio {
        /// Ticket to report events with.
        ticket: AudioTicket,
        /// Audio resource.
        path: String,
    },
    /// Pause the current audio.
    PauseAudio {
        /// Audio being paused.
        ticket: AudioTicket,
    },
    /// Resume the current audio.
    ResumeAudio {
        /// Audio being resumed.
        ticket: AudioTicket,
    },
    /// Stop and drop the current audio.
    StopAudio {
        /// Audio being stopped.
        ticket: AudioTicket,
    },
    /// Fire `token` after `after_ms`.
    StartTimer {
        /// Token to fire.
        token: TimerToken,
        /// Delay in milliseconds; may be zero.
        after_ms: u64,
    },
    /// Drop a pending timer.
    CancelTimer {
        /// Timer to drop.
        token: TimerToken,
    },
    /// Freeze a pending timer.
    PauseTimer {
        /// Timer to freeze.
        token: TimerToken,
    },
    /// Unfreeze a paused timer.
    ResumeTimer {
        /// Timer to unfreeze.
        token: TimerToken,
    },
}

/// Whether an incoming event was acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// The event matched the current generation and state.
    Applied,
    /// The event belonged to a cancelled position or an unexpected state and was dropped.
    Stale,
}

/// Handle returned by [`PlaybackClock::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&PlaybackSnapshot)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pacing {
    Audio(AudioTicket),
    Timer,
}

/// Single-owner playback state machine over a [`PlaybackPlan`].
///
/// Every transition bumps the generation; timers and audio tickets issued under an older
/// generation are reported back as [`EventOutcome::Stale`] and ignored.
pub struct PlaybackClock {
    plan: PlaybackPlan,
    mode: PlaybackMode,
    state: ClockState,
    position: Option<PlaybackPosition>,
    generation: u64,
    live_duration_ms: u64,
    pacing: Pacing,
    timer_base_ms: u64,
    pending_timer: Option<TimerToken>,
    audio_live: Option<AudioTicket>,
    resume_to: Option<ClockState>,
    scrubbing: bool,
    effects: Vec<ClockEffect>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl fmt::Debug for PlaybackClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackClock")
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("position", &self.position)
            .field("generation", &self.generation)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl PlaybackClock {
    /// Clock over a prepared plan.
    pub fn new(plan: PlaybackPlan, mode: PlaybackMode) -> Self {
        Self {
            plan,
            mode,
            state: ClockState::Idle,
            position: None,
            generation: 0,
            live_duration_ms: 0,
            pacing: Pacing::Timer,
            timer_base_ms: 0,
            pending_timer: None,
            audio_live: None,
            resume_to: None,
            scrubbing: false,
            effects: Vec::new(),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Build the plan for `presentation` and wrap it in a clock.
    pub fn for_presentation(
        presentation: &Presentation,
        alignment: Option<&AlignmentSet>,
        opts: ClockOptions,
    ) -> Self {
        Self::new(
            PlaybackPlan::build(presentation, alignment, &opts.defaults),
            opts.mode,
        )
    }

    /// The plan being played.
    pub fn plan(&self) -> &PlaybackPlan {
        &self.plan
    }

    /// Current state.
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Current mode.
    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    /// Current position; `None` while idle.
    pub fn position(&self) -> Option<PlaybackPosition> {
        self.position
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Live duration of the current segment in milliseconds.
    pub fn segment_duration_ms(&self) -> u64 {
        self.live_duration_ms
    }

    /// Take the effects queued since the last call.
    pub fn drain_effects(&mut self) -> Vec<ClockEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Register a listener called with a snapshot after every state change.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&PlaybackSnapshot) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` when `id` is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    /// Switch mode. Only allowed while idle or finished.
    pub fn set_mode(&mut self, mode: PlaybackMode) -> SlidecueResult<()> {
        if !matches!(self.state, ClockState::Idle | ClockState::Finished) {
            return Err(SlidecueError::playback(format!(
                "cannot change mode while {:?}",
                self.state
            )));
        }
        self.mode = mode;
        Ok(())
    }

    /// Start (or restart) from the first playable segment.
    ///
    /// Narrated mode holds the lead-in first when it is non-zero. A plan with nothing to play
    /// finishes immediately.
    pub fn start(&mut self) -> SlidecueResult<()> {
        self.cancel_pending();
        let Some(first) = self.plan.first() else {
            self.position = None;
            self.live_duration_ms = 0;
            self.state = ClockState::Finished;
            self.notify();
            return Ok(());
        };

        match self.mode {
            PlaybackMode::Manual => self.select(first),
            PlaybackMode::Narrated if self.plan.lead_in_ms() > 0 => {
                self.load(first);
                self.state = ClockState::LeadIn;
                self.schedule(TimerKind::LeadIn, self.plan.lead_in_ms());
            }
            PlaybackMode::Narrated => self.begin_segment(first),
        }
        self.notify();
        Ok(())
    }

    /// Hold playback. A no-op when already paused.
    pub fn pause(&mut self) -> SlidecueResult<()> {
        match self.state {
            ClockState::Paused => Ok(()),
            running if running.is_running() => {
                if running == ClockState::Playing
                    && let Pacing::Audio(ticket) = self.pacing
                    && self.audio_live.is_some()
                {
                    self.effects.push(ClockEffect::PauseAudio { ticket });
                }
                if let Some(token) = self.pending_timer {
                    self.effects.push(ClockEffect::PauseTimer { token });
                }
                self.resume_to = Some(running);
                self.state = ClockState::Paused;
                self.notify();
                Ok(())
            }
            idle => Err(SlidecueError::playback(format!(
                "nothing to pause while {idle:?}"
            ))),
        }
    }

    /// Continue after [`PlaybackClock::pause`]. A no-op in manual mode and when not paused by
    /// the user.
    pub fn resume(&mut self) -> SlidecueResult<()> {
        if matches!(self.state, ClockState::Idle | ClockState::Finished) {
            return Err(SlidecueError::playback(format!(
                "nothing to resume while {:?}",
                self.state
            )));
        }
        let Some(to) = self.resume_to.take() else {
            return Ok(());
        };
        if to == ClockState::Playing
            && let Pacing::Audio(ticket) = self.pacing
            && self.audio_live.is_some()
        {
            self.effects.push(ClockEffect::ResumeAudio { ticket });
        }
        if let Some(token) = self.pending_timer {
            self.effects.push(ClockEffect::ResumeTimer { token });
        }
        self.state = to;
        self.notify();
        Ok(())
    }

    /// Drop everything and return to idle.
    pub fn stop(&mut self) {
        self.cancel_pending();
        self.position = None;
        self.live_duration_ms = 0;
        self.state = ClockState::Idle;
        self.notify();
    }

    /// Jump to a segment.
    ///
    /// Narrated mode starts playing it; manual mode selects it. Out-of-range targets are
    /// rejected and leave the clock untouched.
    pub fn seek_to(&mut self, slide_index: usize, segment_index: usize) -> SlidecueResult<()> {
        let target = SegmentRef::new(slide_index, segment_index);
        if !self.plan.contains(target) {
            return Err(SlidecueError::playback(format!(
                "no segment {segment_index} on slide {slide_index}"
            )));
        }
        self.cancel_pending();
        match self.mode {
            PlaybackMode::Manual => self.select(target),
            PlaybackMode::Narrated => self.begin_segment(target),
        }
        self.notify();
        Ok(())
    }

    /// Move to the following segment. Returns `Ok(false)` at the end.
    pub fn next(&mut self) -> SlidecueResult<bool> {
        let at = self.require_position("next")?;
        match self.plan.next_after(at) {
            Some(to) => self.seek_to(to.slide, to.segment).map(|()| true),
            None => Ok(false),
        }
    }

    /// Move to the preceding segment. Returns `Ok(false)` at the start.
    pub fn previous(&mut self) -> SlidecueResult<bool> {
        let at = self.require_position("previous")?;
        match self.plan.previous_before(at) {
            Some(to) => self.seek_to(to.slide, to.segment).map(|()| true),
            None => Ok(false),
        }
    }

    /// Evaluate reveals mid-segment in manual mode. The offset is clamped to the segment.
    pub fn scrub_to(&mut self, offset_ms: u64) -> SlidecueResult<()> {
        if self.mode != PlaybackMode::Manual {
            return Err(SlidecueError::playback("scrubbing requires manual mode"));
        }
        let at = self.require_position("scrub")?;
        let pos = PlaybackPosition::start_of(at).clamped(offset_ms, self.live_duration_ms);
        self.position = Some(pos);
        self.scrubbing = true;
        self.notify();
        Ok(())
    }

    /// Return manual reveals to the fully elapsed view.
    pub fn clear_scrub(&mut self) {
        if self.scrubbing {
            self.scrubbing = false;
            if let Some(pos) = self.position {
                self.position = Some(pos.clamped(0, 0));
            }
            self.notify();
        }
    }

    /// Audio metadata arrived. A longer real duration extends the segment.
    pub fn on_audio_loaded(&mut self, ticket: AudioTicket, duration_secs: f64) -> EventOutcome {
        if !self.audio_is_current(ticket) {
            return self.stale("audio loaded");
        }
        let real_ms = secs_to_ms(duration_secs);
        if real_ms > self.live_duration_ms {
            tracing::debug!(
                authored_ms = self.live_duration_ms,
                real_ms,
                "audio longer than authored duration"
            );
            self.live_duration_ms = real_ms;
            self.notify();
        }
        EventOutcome::Applied
    }

    /// Audio playhead moved. Backward moves are ignored.
    pub fn on_audio_time(&mut self, ticket: AudioTicket, offset_ms: u64) -> EventOutcome {
        if !self.audio_is_current(ticket) || self.state != ClockState::Playing {
            return self.stale("audio time");
        }
        self.advance_offset(offset_ms);
        EventOutcome::Applied
    }

    /// Segment audio finished.
    pub fn on_audio_ended(&mut self, ticket: AudioTicket) -> EventOutcome {
        if !self.audio_is_current(ticket) || self.state != ClockState::Playing {
            return self.stale("audio ended");
        }
        self.audio_live = None;
        self.finish_segment();
        self.notify();
        EventOutcome::Applied
    }

    /// Segment audio failed. Pacing falls back to a timer for the rest of the segment.
    pub fn on_audio_error(&mut self, ticket: AudioTicket, message: &str) -> EventOutcome {
        if !self.audio_is_current(ticket) {
            return self.stale("audio error");
        }
        let offset = self.position.map_or(0, |p| p.offset_ms);
        tracing::warn!(
            position = ?self.position,
            error = message,
            "audio failed, continuing on timer"
        );
        self.audio_live = None;
        self.generation += 1;
        self.pacing = Pacing::Timer;
        self.timer_base_ms = offset;
        if self.state == ClockState::Playing {
            self.schedule(TimerKind::SegmentEnd, self.live_duration_ms.saturating_sub(offset));
        } else if self.resume_to == Some(ClockState::Playing) {
            self.schedule(TimerKind::SegmentEnd, self.live_duration_ms.saturating_sub(offset));
            if let Some(token) = self.pending_timer {
                self.effects.push(ClockEffect::PauseTimer { token });
            }
        }
        self.notify();
        EventOutcome::Applied
    }

    /// Progress of a segment stand-in timer, in milliseconds since it started.
    pub fn on_timer_progress(&mut self, token: TimerToken, elapsed_ms: u64) -> EventOutcome {
        if token.kind != TimerKind::SegmentEnd
            || !self.timer_is_current(token)
            || self.state != ClockState::Playing
        {
            return self.stale("timer progress");
        }
        self.advance_offset(self.timer_base_ms.saturating_add(elapsed_ms));
        EventOutcome::Applied
    }

    /// A scheduled timer fired.
    pub fn on_timer(&mut self, token: TimerToken) -> EventOutcome {
        if !self.timer_is_current(token) {
            return self.stale("timer");
        }
        match (token.kind, self.state) {
            (TimerKind::LeadIn, ClockState::LeadIn) => {
                self.pending_timer = None;
                let Some(at) = self.position.map(PlaybackPosition::segment_ref) else {
                    return self.stale("lead-in without position");
                };
                self.begin_segment(at);
            }
            (TimerKind::SegmentEnd, ClockState::Playing) => {
                self.pending_timer = None;
                self.finish_segment();
            }
            (TimerKind::DelayEnd, ClockState::AdvancingDelay) => {
                self.pending_timer = None;
                let next = self
                    .position
                    .and_then(|p| self.plan.next_after(p.segment_ref()));
                match next {
                    Some(at) => self.begin_segment(at),
                    None => {
                        self.generation += 1;
                        self.state = ClockState::Finished;
                        tracing::debug!("presentation finished");
                    }
                }
            }
            _ => return self.stale("timer in unexpected state"),
        }
        self.notify();
        EventOutcome::Applied
    }

    /// Snapshot of the current state and reveals.
    pub fn snapshot(&self) -> PlaybackSnapshot {
        let segment = self.current_segment();
        let reveal = match (self.position, segment) {
            (Some(pos), Some(seg)) => {
                evaluate_reveal(&seg.reveal, &seg.markers, self.reveal_clock(pos))
            }
            _ => RevealState::default(),
        };
        let current_word = match (self.position, segment) {
            (Some(pos), Some(seg)) if self.tracks_words() => seg.markers.word_at(pos.offset_ms),
            _ => None,
        };
        PlaybackSnapshot {
            generation: self.generation,
            state: self.state,
            mode: self.mode,
            position: self.position,
            segment_duration_ms: self.live_duration_ms,
            delay_after_ms: segment.map_or(0, |s| s.delay_after_ms),
            reached_markers: reveal.reached_markers,
            active_ranges: reveal.active_ranges,
            current_word,
        }
    }

    fn current_segment(&self) -> Option<&PlannedSegment> {
        self.plan.segment(self.position?.segment_ref())
    }

    fn reveal_clock(&self, pos: PlaybackPosition) -> RevealClock {
        match (self.mode, self.state) {
            (PlaybackMode::Manual, _) if !self.scrubbing => RevealClock::FullyElapsed,
            (PlaybackMode::Manual, _) => RevealClock::At(pos.offset_ms),
            (_, ClockState::AdvancingDelay | ClockState::Finished) => RevealClock::FullyElapsed,
            (_, ClockState::Paused) if self.resume_to == Some(ClockState::AdvancingDelay) => {
                RevealClock::FullyElapsed
            }
            _ => RevealClock::At(pos.offset_ms),
        }
    }

    fn tracks_words(&self) -> bool {
        match self.mode {
            PlaybackMode::Manual => self.scrubbing,
            PlaybackMode::Narrated => {
                self.state == ClockState::Playing
                    || (self.state == ClockState::Paused
                        && self.resume_to == Some(ClockState::Playing))
            }
        }
    }

    fn require_position(&self, op: &str) -> SlidecueResult<SegmentRef> {
        self.position
            .map(PlaybackPosition::segment_ref)
            .ok_or_else(|| SlidecueError::playback(format!("{op} before start")))
    }

    fn audio_is_current(&self, ticket: AudioTicket) -> bool {
        ticket.generation == self.generation && self.audio_live == Some(ticket)
    }

    fn timer_is_current(&self, token: TimerToken) -> bool {
        token.generation == self.generation && self.pending_timer == Some(token)
    }

    fn stale(&self, what: &str) -> EventOutcome {
        tracing::debug!(generation = self.generation, event = what, "dropping stale event");
        EventOutcome::Stale
    }

    /// Invalidate every outstanding timer and audio ticket.
    fn cancel_pending(&mut self) {
        if let Some(token) = self.pending_timer.take() {
            self.effects.push(ClockEffect::CancelTimer { token });
        }
        if let Some(ticket) = self.audio_live.take() {
            self.effects.push(ClockEffect::StopAudio { ticket });
        }
        self.resume_to = None;
        self.scrubbing = false;
        self.generation += 1;
    }

    fn schedule(&mut self, kind: TimerKind, after_ms: u64) {
        let token = TimerToken {
            generation: self.generation,
            kind,
        };
        self.pending_timer = Some(token);
        self.effects.push(ClockEffect::StartTimer { token, after_ms });
    }

    fn load(&mut self, at: SegmentRef) {
        self.position = Some(PlaybackPosition::start_of(at));
        self.live_duration_ms = self.plan.segment(at).map_or(0, |s| s.duration_ms);
        self.timer_base_ms = 0;
    }

    fn select(&mut self, at: SegmentRef) {
        self.load(at);
        self.state = ClockState::Paused;
    }

    fn begin_segment(&mut self, at: SegmentRef) {
        self.generation += 1;
        self.load(at);
        self.state = ClockState::Playing;
        let path = self.plan.segment(at).and_then(|s| s.audio_path.clone());
        match path {
            Some(path) => {
                let ticket = AudioTicket {
                    generation: self.generation,
                };
                self.pacing = Pacing::Audio(ticket);
                self.audio_live = Some(ticket);
                self.effects.push(ClockEffect::PlayAudio { ticket, path });
            }
            None => {
                self.pacing = Pacing::Timer;
                self.schedule(TimerKind::SegmentEnd, self.live_duration_ms);
            }
        }
        tracing::debug!(slide = at.slide, segment = at.segment, "segment started");
    }

    fn finish_segment(&mut self) {
        self.generation += 1;
        if let Some(pos) = self.position {
            self.position = Some(pos.clamped(self.live_duration_ms, self.live_duration_ms));
        }
        self.state = ClockState::AdvancingDelay;
        let delay = self.current_segment().map_or(0, |s| s.delay_after_ms);
        self.schedule(TimerKind::DelayEnd, delay);
    }

    fn advance_offset(&mut self, offset_ms: u64) {
        let Some(pos) = self.position else {
            return;
        };
        let next = offset_ms.min(self.live_duration_ms);
        if next > pos.offset_ms {
            self.position = Some(pos.clamped(next, self.live_duration_ms));
            self.notify();
        }
    }

    fn notify(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let snap = self.snapshot();
        for (_, listener) in &mut self.listeners {
            listener(&snap);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/clock.rs"]
mod tests;
