use approx::assert_relative_eq;
use scrolly_clips_core::{
    AnimationSet, ClipSpec, SchedulerConfig, TickOutcome, TickReport, WithRest,
};
use scrolly_test_fixtures::{ManualClock, ManualPump, ProgressLog};

// 50 fps keeps the throttle interval at an exact 20 ms.
fn config() -> SchedulerConfig {
    SchedulerConfig::default().with_target_fps(50.0)
}

/// Resolve the outstanding registration and deliver the frame at `now`.
fn frame(set: &mut AnimationSet, pump: &ManualPump, clock: &ManualClock, now: f64) -> TickReport {
    assert!(pump.fire(), "no frame was scheduled before t={now}");
    clock.set(now);
    set.tick(now)
}

#[test]
fn finite_clip_scenario_with_delay() {
    let (clock, pump, log) = (ManualClock::new(0.0), ManualPump::new(), ProgressLog::new());
    let mut set = AnimationSet::builder(config())
        .clip(ClipSpec::once("intro", 200.0).with_delay(100.0), log.recorder())
        .build(clock.clone(), pump.clone())
        .unwrap();

    set.start_now();

    frame(&mut set, &pump, &clock, 50.0);
    assert!(log.is_empty(), "delayed clip must not update");

    frame(&mut set, &pump, &clock, 150.0);
    assert_eq!(log.calls(), vec![0.25]);

    let report = frame(&mut set, &pump, &clock, 301.0);
    assert_eq!(log.calls(), vec![0.25, 1.0]);
    assert_eq!(report.completed, vec!["intro".to_string()]);

    frame(&mut set, &pump, &clock, 400.0);
    assert_eq!(log.calls(), vec![0.25, 1.0]);
}

#[test]
fn looping_clip_scenario() {
    let (clock, pump, log) = (ManualClock::new(0.0), ManualPump::new(), ProgressLog::new());
    let mut set = AnimationSet::builder(config())
        .clip(ClipSpec::looping("spin", 1000.0), log.recorder())
        .build(clock.clone(), pump.clone())
        .unwrap();

    set.start(0.0);
    frame(&mut set, &pump, &clock, 1500.0);
    frame(&mut set, &pump, &clock, 2000.0);
    assert_eq!(log.calls(), vec![0.5, 0.0]);
}

#[test]
fn completion_snap_fires_once_at_exact_boundary() {
    let (clock, pump, log) = (ManualClock::new(0.0), ManualPump::new(), ProgressLog::new());
    let mut set = AnimationSet::builder(config())
        .clip(ClipSpec::once("a", 100.0), log.recorder())
        .build(clock.clone(), pump.clone())
        .unwrap();

    set.start(0.0);
    frame(&mut set, &pump, &clock, 40.0);
    frame(&mut set, &pump, &clock, 100.0);
    frame(&mut set, &pump, &clock, 140.0);
    frame(&mut set, &pump, &clock, 180.0);

    let calls = log.calls();
    assert_eq!(calls, vec![0.4, 1.0]);
    assert_eq!(calls.iter().filter(|p| **p == 1.0).count(), 1);
}

#[test]
fn completion_snap_survives_long_frame_gap() {
    let (clock, pump, log) = (ManualClock::new(0.0), ManualPump::new(), ProgressLog::new());
    let mut set = AnimationSet::builder(config())
        .clip(ClipSpec::once("a", 100.0), log.recorder())
        .build(clock.clone(), pump.clone())
        .unwrap();

    set.start(0.0);
    // The tab was hidden for ten seconds; the clip still lands on 1.
    frame(&mut set, &pump, &clock, 10_000.0);
    assert_eq!(log.calls(), vec![1.0]);
}

#[test]
fn restart_delivers_a_fresh_completion() {
    let (clock, pump, log) = (ManualClock::new(0.0), ManualPump::new(), ProgressLog::new());
    let mut set = AnimationSet::builder(config())
        .clip(ClipSpec::once("a", 100.0), log.recorder())
        .build(clock.clone(), pump.clone())
        .unwrap();

    set.start(0.0);
    frame(&mut set, &pump, &clock, 200.0);
    set.stop();
    set.start(1000.0);
    frame(&mut set, &pump, &clock, 1200.0);
    assert_eq!(log.calls(), vec![1.0, 1.0]);
}

#[test]
fn looping_progress_stays_in_range_and_wraps_once_per_cycle() {
    let (clock, pump, log) = (ManualClock::new(0.0), ManualPump::new(), ProgressLog::new());
    let mut set = AnimationSet::builder(config())
        .clip(ClipSpec::looping("wave", 300.0).with_delay(50.0), log.recorder())
        .build(clock.clone(), pump.clone())
        .unwrap();

    set.start(0.0);
    let mut now = 0.0;
    while now < 3000.0 {
        now += 7.0;
        frame(&mut set, &pump, &clock, now);
    }

    let calls = log.calls();
    assert!(!calls.is_empty());
    assert!(calls.iter().all(|p| (0.0..1.0).contains(p)));
    let wraps = calls.windows(2).filter(|w| w[1] < w[0]).count();
    // One wrap for every cycle boundary crossed during the active window.
    let active = now - 50.0;
    assert_eq!(wraps, (active / 300.0).floor() as usize);
}

#[test]
fn throttling_skips_early_frames_but_keeps_pumping() {
    let (clock, pump, log) = (ManualClock::new(0.0), ManualPump::new(), ProgressLog::new());
    let mut set = AnimationSet::builder(config())
        .clip(ClipSpec::looping("a", 1000.0), log.recorder())
        .build(clock.clone(), pump.clone())
        .unwrap();

    set.start(0.0);
    assert_eq!(frame(&mut set, &pump, &clock, 10.0).outcome, TickOutcome::Skipped);
    assert_eq!(frame(&mut set, &pump, &clock, 20.0).outcome, TickOutcome::Skipped);
    assert_eq!(frame(&mut set, &pump, &clock, 21.0).outcome, TickOutcome::Processed);
    assert_eq!(log.len(), 1);
    assert_eq!(pump.outstanding(), 1);
    assert_eq!(pump.max_outstanding(), 1);

    let stats = set.stats();
    assert_eq!((stats.pumped, stats.skipped, stats.processed), (3, 2, 1));
}

#[test]
fn irregular_frames_do_not_drift() {
    let (clock, pump) = (ManualClock::new(0.0), ManualPump::new());
    let mut set = AnimationSet::builder(config())
        .build(clock.clone(), pump.clone())
        .unwrap();
    let interval = set.frame_interval_ms();
    let start = 1000.0;
    set.start(start);

    let mut now = start;
    let gaps = [5.0, 40.0, 5.0, 40.0, 13.0, 61.0, 5.0, 5.0, 5.0, 33.0];
    for _ in 0..20 {
        for gap in gaps {
            now += gap;
            let report = frame(&mut set, &pump, &clock, now);
            let last = set.last_frame_time_ms().unwrap();
            if report.is_processed() {
                // Every processed frame lands on the start-aligned grid.
                let phase = (last - start) % interval;
                assert_relative_eq!(phase, 0.0, epsilon = 1e-9);
                assert!(now - last < interval);
            }
            assert!(now - last <= interval * 4.0);
        }
    }
}

#[test]
fn stop_is_idempotent_and_exact() {
    let (clock, pump) = (ManualClock::new(0.0), ManualPump::new());
    let rests = ProgressLog::new();
    let mut rest_sink = rests.recorder();
    let mut set = AnimationSet::builder(config())
        .clip(
            ClipSpec::looping("a", 100.0),
            WithRest::new(|_: f64| {}, move || rest_sink(0.0)),
        )
        .build(clock.clone(), pump.clone())
        .unwrap();

    set.start(0.0);
    frame(&mut set, &pump, &clock, 50.0);
    let pending = set.pending_frame().unwrap();

    set.stop();
    set.stop();
    assert_eq!(rests.len(), 1);
    assert_eq!(pump.cancelled(), vec![pending]);
    assert_eq!(pump.outstanding(), 0);
    assert!(!set.is_running());
    assert_eq!(set.start_time_ms(), None);
    assert_eq!(set.last_frame_time_ms(), None);
}

#[test]
fn repeated_start_never_double_schedules() {
    let (clock, pump) = (ManualClock::new(0.0), ManualPump::new());
    let mut set = AnimationSet::builder(config())
        .clip(ClipSpec::looping("a", 100.0), |_: f64| {})
        .build(clock.clone(), pump.clone())
        .unwrap();

    for i in 0..5 {
        set.start(i as f64 * 10.0);
    }
    assert_eq!(pump.outstanding(), 1);
    assert_eq!(pump.max_outstanding(), 1);
    assert_eq!(pump.cancelled().len(), 4);
    assert_eq!(set.stats().runs, 5);
}

#[test]
fn refused_registration_halts_loop() {
    let (clock, pump, log) = (ManualClock::new(0.0), ManualPump::new(), ProgressLog::new());
    let mut set = AnimationSet::builder(config())
        .clip(ClipSpec::looping("a", 100.0), log.recorder())
        .build(clock.clone(), pump.clone())
        .unwrap();

    pump.refuse_registrations(true);
    set.start(0.0);
    assert!(set.is_running());
    assert_eq!(set.pending_frame(), None);
    assert_eq!(pump.outstanding(), 0);
    // A manual tick still evaluates clips.
    assert!(set.tick(50.0).is_processed());
    assert_eq!(log.len(), 1);
}

#[test]
fn manual_tick_replaces_the_outstanding_registration() {
    let (clock, pump) = (ManualClock::new(0.0), ManualPump::new());
    let mut set = AnimationSet::builder(config())
        .clip(ClipSpec::looping("a", 100.0), |_: f64| {})
        .build(clock.clone(), pump.clone())
        .unwrap();

    set.start(0.0);
    let first = set.pending_frame().unwrap();
    // Ticked by hand while the registration from `start` is still live.
    set.tick(50.0);
    set.tick(80.0);
    assert_eq!(pump.outstanding(), 1);
    assert_eq!(pump.max_outstanding(), 1);
    assert_eq!(pump.cancelled()[0], first);

    set.stop();
    assert_eq!(pump.outstanding(), 0);
}

#[test]
fn clips_dispatch_in_registration_order() {
    let (clock, pump) = (ManualClock::new(0.0), ManualPump::new());
    let order = ProgressLog::new();
    let (mut first, mut second, mut third) = (order.recorder(), order.recorder(), order.recorder());
    let mut set = AnimationSet::builder(config())
        .clip(ClipSpec::looping("c", 100.0), move |_: f64| first(3.0))
        .clip(ClipSpec::looping("a", 100.0), move |_: f64| second(1.0))
        .clip(ClipSpec::looping("b", 100.0), move |_: f64| third(2.0))
        .build(clock.clone(), pump.clone())
        .unwrap();

    set.start(0.0);
    frame(&mut set, &pump, &clock, 30.0);
    assert_eq!(order.calls(), vec![3.0, 1.0, 2.0]);
    assert_eq!(set.clip_ids().collect::<Vec<_>>(), vec!["c", "a", "b"]);
}

#[test]
fn frame_hooks_wrap_processed_ticks_only() {
    let (clock, pump) = (ManualClock::new(0.0), ManualPump::new());
    let events = ProgressLog::new();
    let (mut before, mut clip, mut after) = (events.recorder(), events.recorder(), events.recorder());
    let mut set = AnimationSet::builder(config())
        .before_frame(move || before(0.0))
        .clip(ClipSpec::looping("a", 100.0), move |_: f64| clip(1.0))
        .after_frame(move || after(2.0))
        .build(clock.clone(), pump.clone())
        .unwrap();

    set.start(0.0);
    frame(&mut set, &pump, &clock, 5.0);
    assert!(events.is_empty());
    frame(&mut set, &pump, &clock, 25.0);
    assert_eq!(events.calls(), vec![0.0, 1.0, 2.0]);
}
