use super::*;
use crate::scene::model::{AudioSegment, SlideMetadata};
use crate::timing::config::TimingConfig;
use std::cell::RefCell;
use std::rc::Rc;

fn seg(id: u64, secs: f64, path: Option<&str>) -> AudioSegment {
    let mut s = AudioSegment::with_duration(id, secs);
    s.audio_file_path = path.map(str::to_owned);
    s
}

/// Two slides: [audio 1s, silent 2s] then [audio 0.5s].
fn presentation() -> Presentation {
    Presentation::new(
        vec![
            SlideMetadata::new(1, 1, "One", vec![seg(0, 1.0, Some("/a.wav")), seg(1, 2.0, None)]),
            SlideMetadata::new(1, 2, "Two", vec![seg(0, 0.5, Some("/c.wav"))]),
        ],
        None,
    )
}

fn clock(mode: PlaybackMode) -> PlaybackClock {
    PlaybackClock::for_presentation(
        &presentation(),
        None,
        ClockOptions {
            mode,
            ..ClockOptions::default()
        },
    )
}

fn play_ticket(effects: &[ClockEffect]) -> AudioTicket {
    effects
        .iter()
        .find_map(|e| match e {
            ClockEffect::PlayAudio { ticket, .. } => Some(*ticket),
            _ => None,
        })
        .expect("PlayAudio effect")
}

fn started_timer(effects: &[ClockEffect]) -> (TimerToken, u64) {
    effects
        .iter()
        .find_map(|e| match e {
            ClockEffect::StartTimer { token, after_ms } => Some((*token, *after_ms)),
            _ => None,
        })
        .expect("StartTimer effect")
}

#[test]
fn narrated_run_walks_every_transition() {
    let mut c = clock(PlaybackMode::Narrated);
    assert_eq!(c.state(), ClockState::Idle);
    c.start().unwrap();
    assert_eq!(c.state(), ClockState::Playing);
    let fx = c.drain_effects();
    let a = play_ticket(&fx);
    assert!(matches!(&fx[0], ClockEffect::PlayAudio { path, .. } if path == "/a.wav"));

    assert_eq!(c.on_audio_ended(a), EventOutcome::Applied);
    assert_eq!(c.state(), ClockState::AdvancingDelay);
    assert_eq!(c.position().unwrap().offset_ms, 1000);
    let (delay, after) = started_timer(&c.drain_effects());
    assert_eq!((delay.kind, after), (TimerKind::DelayEnd, 500));

    assert_eq!(c.on_timer(delay), EventOutcome::Applied);
    assert_eq!(c.position(), Some(PlaybackPosition::start_of(SegmentRef::new(0, 1))));
    let (silent, after) = started_timer(&c.drain_effects());
    assert_eq!((silent.kind, after), (TimerKind::SegmentEnd, 2000));

    c.on_timer(silent);
    let (delay, after) = started_timer(&c.drain_effects());
    assert_eq!(after, 1000);
    c.on_timer(delay);
    let last = play_ticket(&c.drain_effects());
    assert_eq!(c.position().unwrap().slide_index, 1);

    c.on_audio_ended(last);
    let (final_delay, after) = started_timer(&c.drain_effects());
    assert_eq!(after, 2000);
    c.on_timer(final_delay);
    assert_eq!(c.state(), ClockState::Finished);
}

#[test]
fn stale_events_after_seek_are_ignored() {
    let mut c = clock(PlaybackMode::Narrated);
    c.start().unwrap();
    let a = play_ticket(&c.drain_effects());
    c.on_audio_ended(a);
    let (delay, _) = started_timer(&c.drain_effects());

    c.seek_to(1, 0).unwrap();
    let fx = c.drain_effects();
    assert!(fx.contains(&ClockEffect::CancelTimer { token: delay }));
    assert_eq!(c.on_timer(delay), EventOutcome::Stale);
    assert_eq!(c.on_audio_ended(a), EventOutcome::Stale);
    assert_eq!(c.position(), Some(PlaybackPosition::start_of(SegmentRef::new(1, 0))));
    assert_eq!(c.state(), ClockState::Playing);
}

#[test]
fn stop_cancels_audio_and_returns_to_idle() {
    let mut c = clock(PlaybackMode::Narrated);
    c.start().unwrap();
    let a = play_ticket(&c.drain_effects());
    c.stop();
    assert_eq!(c.state(), ClockState::Idle);
    assert_eq!(c.position(), None);
    assert_eq!(c.drain_effects(), vec![ClockEffect::StopAudio { ticket: a }]);
    assert_eq!(c.on_audio_ended(a), EventOutcome::Stale);
}

#[test]
fn bad_seek_is_rejected_without_side_effects() {
    let mut c = clock(PlaybackMode::Narrated);
    c.start().unwrap();
    c.drain_effects();
    let generation = c.generation();
    let before = c.snapshot();

    let err = c.seek_to(5, 0).unwrap_err();
    assert!(err.to_string().starts_with("playback error:"));
    assert!(c.seek_to(0, 2).is_err());
    assert_eq!(c.generation(), generation);
    assert_eq!(c.snapshot(), before);
    assert!(c.drain_effects().is_empty());
}

#[test]
fn audio_time_is_clamped_and_monotonic() {
    let mut c = clock(PlaybackMode::Narrated);
    c.start().unwrap();
    let a = play_ticket(&c.drain_effects());
    c.on_audio_time(a, 400);
    c.on_audio_time(a, 300);
    assert_eq!(c.position().unwrap().offset_ms, 400);
    c.on_audio_time(a, 5000);
    assert_eq!(c.position().unwrap().offset_ms, 1000);
}

#[test]
fn longer_audio_extends_live_duration() {
    let mut c = clock(PlaybackMode::Narrated);
    c.start().unwrap();
    let a = play_ticket(&c.drain_effects());
    c.on_audio_loaded(a, 0.8);
    assert_eq!(c.segment_duration_ms(), 1000);
    c.on_audio_loaded(a, 1.25);
    assert_eq!(c.segment_duration_ms(), 1250);
    c.on_audio_time(a, 1200);
    assert_eq!(c.position().unwrap().offset_ms, 1200);
}

#[test]
fn audio_error_falls_back_to_timer() {
    let mut c = clock(PlaybackMode::Narrated);
    c.start().unwrap();
    let a = play_ticket(&c.drain_effects());
    c.on_audio_time(a, 300);
    assert_eq!(c.on_audio_error(a, "decode failed"), EventOutcome::Applied);
    assert_eq!(c.state(), ClockState::Playing);
    let (token, after) = started_timer(&c.drain_effects());
    assert_eq!((token.kind, after), (TimerKind::SegmentEnd, 700));

    c.on_timer_progress(token, 200);
    assert_eq!(c.position().unwrap().offset_ms, 500);
    assert_eq!(c.on_audio_ended(a), EventOutcome::Stale);
    c.on_timer(token);
    assert_eq!(c.state(), ClockState::AdvancingDelay);
}

#[test]
fn pause_and_resume_forward_to_audio_and_timers() {
    let mut c = clock(PlaybackMode::Narrated);
    c.start().unwrap();
    let a = play_ticket(&c.drain_effects());
    c.pause().unwrap();
    assert_eq!(c.state(), ClockState::Paused);
    assert_eq!(c.drain_effects(), vec![ClockEffect::PauseAudio { ticket: a }]);
    c.pause().unwrap();
    assert!(c.drain_effects().is_empty());
    assert_eq!(c.on_audio_ended(a), EventOutcome::Stale);
    c.resume().unwrap();
    assert_eq!(c.state(), ClockState::Playing);
    assert_eq!(c.drain_effects(), vec![ClockEffect::ResumeAudio { ticket: a }]);

    c.on_audio_ended(a);
    let (delay, _) = started_timer(&c.drain_effects());
    c.pause().unwrap();
    assert_eq!(c.drain_effects(), vec![ClockEffect::PauseTimer { token: delay }]);
    assert_eq!(c.on_timer(delay), EventOutcome::Stale);
    c.resume().unwrap();
    assert_eq!(c.state(), ClockState::AdvancingDelay);
    assert_eq!(c.on_timer(delay), EventOutcome::Applied);
}

#[test]
fn pause_when_idle_is_rejected() {
    let mut c = clock(PlaybackMode::Narrated);
    assert!(c.pause().is_err());
    assert!(c.resume().is_err());
}

#[test]
fn only_timed_states_count_as_running() {
    assert!(ClockState::LeadIn.is_running());
    assert!(ClockState::Playing.is_running());
    assert!(ClockState::AdvancingDelay.is_running());
    assert!(!ClockState::Idle.is_running());
    assert!(!ClockState::Paused.is_running());
    assert!(!ClockState::Finished.is_running());
}

#[test]
fn lead_in_holds_before_first_segment() {
    let p = Presentation::new(
        presentation().slides().to_vec(),
        Some(TimingConfig {
            before_first_slide: Some(1500.0),
            ..TimingConfig::EMPTY
        }),
    );
    let mut c = PlaybackClock::for_presentation(&p, None, ClockOptions::default());
    c.start().unwrap();
    assert_eq!(c.state(), ClockState::LeadIn);
    let (token, after) = started_timer(&c.drain_effects());
    assert_eq!((token.kind, after), (TimerKind::LeadIn, 1500));
    c.on_timer(token);
    assert_eq!(c.state(), ClockState::Playing);
    play_ticket(&c.drain_effects());
}

#[test]
fn manual_mode_selects_without_auto_advance() {
    let mut c = clock(PlaybackMode::Manual);
    c.start().unwrap();
    assert_eq!(c.state(), ClockState::Paused);
    assert!(c.drain_effects().is_empty());
    let snap = c.snapshot();
    assert_eq!(snap.delay_after_ms, 500);

    assert!(c.next().unwrap());
    assert!(c.next().unwrap());
    assert_eq!(c.position().unwrap().segment_ref(), SegmentRef::new(1, 0));
    assert!(!c.next().unwrap());
    assert!(c.previous().unwrap());
    assert_eq!(c.position().unwrap().segment_ref(), SegmentRef::new(0, 1));
    assert!(c.drain_effects().is_empty());
}

#[test]
fn next_before_start_is_rejected() {
    let mut c = clock(PlaybackMode::Manual);
    assert!(c.next().is_err());
    assert!(c.scrub_to(10).is_err());
}

#[test]
fn mode_changes_only_when_stopped() {
    let mut c = clock(PlaybackMode::Narrated);
    c.start().unwrap();
    assert!(c.set_mode(PlaybackMode::Manual).is_err());
    assert!(c.scrub_to(0).is_err());
    c.stop();
    c.set_mode(PlaybackMode::Manual).unwrap();
    assert_eq!(c.mode(), PlaybackMode::Manual);
}

#[test]
fn empty_presentation_finishes_immediately() {
    let mut c = PlaybackClock::for_presentation(
        &Presentation::default(),
        None,
        ClockOptions::default(),
    );
    c.start().unwrap();
    assert_eq!(c.state(), ClockState::Finished);
    assert!(c.drain_effects().is_empty());
}

#[test]
fn zero_delay_is_still_scheduled() {
    let p = Presentation::new(
        vec![SlideMetadata::new(1, 1, "Only", vec![seg(0, 0.0, None), seg(1, 0.0, None)])],
        Some(TimingConfig {
            between_segments: Some(0.0),
            after_final_slide: Some(-20.0),
            ..TimingConfig::EMPTY
        }),
    );
    let mut c = PlaybackClock::for_presentation(&p, None, ClockOptions::default());
    c.start().unwrap();
    let (t, after) = started_timer(&c.drain_effects());
    assert_eq!(after, 0);
    c.on_timer(t);
    let (d, after) = started_timer(&c.drain_effects());
    assert_eq!((d.kind, after), (TimerKind::DelayEnd, 0));
    c.on_timer(d);
    let (t, _) = started_timer(&c.drain_effects());
    c.on_timer(t);
    let (d, after) = started_timer(&c.drain_effects());
    assert_eq!(after, 0);
    c.on_timer(d);
    assert_eq!(c.state(), ClockState::Finished);
}

#[test]
fn subscribers_see_every_change() {
    let mut c = clock(PlaybackMode::Narrated);
    let seen: Rc<RefCell<Vec<ClockState>>> = Rc::default();
    let sink = Rc::clone(&seen);
    let id = c.subscribe(move |s| sink.borrow_mut().push(s.state));

    c.start().unwrap();
    let a = play_ticket(&c.drain_effects());
    c.on_audio_ended(a);
    assert_eq!(*seen.borrow(), [ClockState::Playing, ClockState::AdvancingDelay]);

    assert!(c.unsubscribe(id));
    assert!(!c.unsubscribe(id));
    c.stop();
    assert_eq!(seen.borrow().len(), 2);
}
