use scrolly_clips_core::{
    parse_clip_specs_json, AnimationSet, ClipError, ClipSpec, ScreenRouter, SetControl,
    SetDefinition, SharedAnimationSet,
};
use scrolly_test_fixtures::{clip_sets, ManualClock, ManualPump, ProgressLog};

#[test]
fn hero_intro_fixture_builds_a_set() {
    let def = parse_clip_specs_json(&clip_sets::json("hero-intro").unwrap()).unwrap();
    assert_eq!(def.config.target_fps, 30.0);
    assert_eq!(def.clips.len(), 3);
    assert!(!def.clips[2].finite);

    let (clock, pump) = (ManualClock::new(0.0), ManualPump::new());
    let logs: Vec<ProgressLog> = def.clips.iter().map(|_| ProgressLog::new()).collect();
    let mut builder = AnimationSet::builder(def.config.clone());
    for (clip, log) in def.clips.iter().cloned().zip(&logs) {
        builder = builder.clip(clip, log.recorder());
    }
    let mut set = builder.build(clock.clone(), pump.clone()).unwrap();

    set.start_now();
    pump.fire();
    set.tick(450.0);

    // headline 450/600, subtitle (450-300)/400, cta still delayed until 900
    assert_eq!(logs[0].calls(), vec![0.75]);
    assert_eq!(logs[1].calls(), vec![0.375]);
    assert!(logs[2].is_empty());
}

#[test]
fn ambient_fixture_uses_default_rate() {
    let def: SetDefinition =
        parse_clip_specs_json(&clip_sets::json("ambient-loop").unwrap()).unwrap();
    assert_eq!(def.config.target_fps, 60.0);
    assert!(def.clips.iter().all(|c| !c.finite));
}

#[test]
fn invalid_fixture_is_rejected_at_parse() {
    let err = parse_clip_specs_json(&clip_sets::json("invalid-duration").unwrap()).unwrap_err();
    assert_eq!(
        err,
        ClipError::InvalidDuration {
            id: "broken".into(),
            duration_ms: 0.0
        }
    );
}

#[test]
fn raw_fixture_deserializes_into_specs() {
    let clips: Vec<ClipSpec> = clip_sets::load("ambient-loop").unwrap();
    assert_eq!(clips[1], ClipSpec::looping("drift", 5000.0).with_delay(500.0));
    assert!(clip_sets::keys().contains(&"hero-intro".to_string()));
    assert!(clip_sets::json("missing").is_err());
}

#[test]
fn clip_can_stop_its_own_set_mid_tick() {
    let (clock, pump) = (ManualClock::new(0.0), ManualPump::new());
    let control = SetControl::new();
    let from_clip = control.clone();
    let set = AnimationSet::builder(Default::default())
        .clip(ClipSpec::once("reveal", 100.0), move |p: f64| {
            if p >= 1.0 {
                from_clip.request_stop();
            }
        })
        .build(clock, pump.clone())
        .unwrap();
    let shared = SharedAnimationSet::with_control(set, control);

    shared.start(0.0);
    pump.fire();
    shared.tick(50.0);
    assert!(shared.is_running());
    pump.fire();
    shared.tick(200.0);
    assert!(!shared.is_running());
    assert_eq!(pump.outstanding(), 0);
}

#[test]
fn router_drives_sets_from_screen_changes() {
    let (clock, pump_a, pump_b) = (ManualClock::new(0.0), ManualPump::new(), ManualPump::new());
    let hero = SharedAnimationSet::new(
        AnimationSet::builder(Default::default())
            .clip(ClipSpec::looping("glow", 1000.0), |_: f64| {})
            .build(clock.clone(), pump_a.clone())
            .unwrap(),
    );
    let game = SharedAnimationSet::new(
        AnimationSet::builder(Default::default())
            .clip(ClipSpec::once("timer", 30_000.0), |_: f64| {})
            .build(clock.clone(), pump_b.clone())
            .unwrap(),
    );

    let mut router = ScreenRouter::new();
    router.bind("hero", hero.clone()).bind("game", game.clone());

    router.show("hero", 0.0);
    assert_eq!((pump_a.outstanding(), pump_b.outstanding()), (1, 0));

    router.show("game", 800.0);
    assert_eq!((pump_a.outstanding(), pump_b.outstanding()), (0, 1));
    assert_eq!(game.with(|s| s.start_time_ms()), Some(Some(800.0)));

    router.show("hero", 1600.0);
    assert!(hero.is_running() && !game.is_running());
    assert_eq!(router.sets_for("hero").count(), 1);
}
