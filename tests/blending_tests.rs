//! Motion System Tests
//!
//! Tests for:
//! - Cross-fade setup (blend time capping, outgoing slot)
//! - Two-pass layer blending during a cross-fade
//! - Layer priority override
//! - Bind pose fallback when every layer goes idle
//! - Stop / pause / reset per layer
//! - Event draining across a cross-fade
//! - Playing from a MotionCache and from JSON presets

use std::sync::Arc;

use glam::{Affine3A, Vec3};

use marionette::PlayerState;
use marionette::prelude::*;

const EPSILON: f32 = 1e-4;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

const ROOT: usize = 0;
const SPINE: usize = 1;
const HEAD: usize = 2;

fn rig() -> Arc<Skeleton> {
    Arc::new(
        Skeleton::new(
            "rig",
            vec![
                Bone::new("bt_root", None, Transform::IDENTITY),
                Bone::new("bt_spine", Some(ROOT), Transform::from_translation(Vec3::Y)),
                Bone::new("bt_head", Some(SPINE), Transform::from_translation(Vec3::Y)),
            ],
        )
        .unwrap(),
    )
}

/// A motion holding each listed bone at a fixed translation for `duration`.
fn hold(name: &str, bones: &[(&str, Vec3)], duration: f32) -> MotionHandle {
    let tracks = bones
        .iter()
        .map(|(bone, translation)| {
            BoneTrack::new(
                bone,
                KeyframeTrack::constant(0.0, Transform::from_translation(*translation)).unwrap(),
            )
        })
        .collect();
    Arc::new(Motion::new(name, 0.0, duration, tracks).unwrap())
}

fn setup() -> (MotionSystem, SkeletonInstance) {
    let skeleton = rig();
    let system = MotionSystem::new(Arc::clone(&skeleton), MotionSettings::default());
    let instance = SkeletonInstance::new(skeleton);
    (system, instance)
}

fn full_weight() -> MotionPlaybackConfig {
    MotionPlaybackConfig::default().with_weight(1.0)
}

fn motion_translation(instance: &SkeletonInstance, index: usize) -> Vec3 {
    Vec3::from(instance.bone(index).unwrap().motion_matrix().translation)
}

// ============================================================================
// Cross-Fade Setup
// ============================================================================

#[test]
fn blend_time_is_capped_by_outgoing_remaining_time() {
    let (mut system, mut instance) = setup();
    system.play(MotionLayer::Base, hold("bt_walk", &[("bt_root", Vec3::X)], 10.0), full_weight());
    assert!(system.update(8.0, &mut instance));

    system.play(
        MotionLayer::Base,
        hold("bt_run", &[("bt_root", Vec3::Z)], 10.0),
        full_weight().with_blend_time(10.0),
    );

    let primary = system.player(MotionLayer::Base);
    assert_eq!(primary.config().blend_time, 2.0);
    assert_eq!(primary.motion().unwrap().name, "bt_run");

    let outgoing = system.outgoing_player(MotionLayer::Base);
    assert_eq!(outgoing.motion().unwrap().name, "bt_walk");
    assert_eq!(outgoing.play_time(), 8.0);
}

#[test]
fn play_without_blend_replaces_primary() {
    let (mut system, mut instance) = setup();
    system.play(MotionLayer::Base, hold("bt_idle", &[("bt_root", Vec3::X)], 4.0), full_weight());
    system.update(1.0, &mut instance);

    system.play(MotionLayer::Base, hold("bt_wave", &[("bt_root", Vec3::Y)], 4.0), full_weight());
    assert_eq!(system.player(MotionLayer::Base).motion().unwrap().name, "bt_wave");
    assert!(!system.outgoing_player(MotionLayer::Base).is_playing());
}

#[test]
fn blend_scenario_reaches_full_weight_at_capped_time() {
    let (mut system, mut instance) = setup();
    system.play(
        MotionLayer::Base,
        hold("bt_from", &[("bt_root", Vec3::new(2.0, 0.0, 0.0))], 1.0),
        full_weight(),
    );
    system.update(0.75, &mut instance);

    system.play(
        MotionLayer::Base,
        hold("bt_to", &[("bt_root", Vec3::new(4.0, 0.0, 0.0))], 1.0),
        MotionPlaybackConfig::default()
            .with_weight(0.6)
            .with_blend_time(0.5),
    );
    assert_eq!(system.player(MotionLayer::Base).config().blend_time, 0.25);

    assert!(system.update(0.125, &mut instance));
    assert_eq!(system.player(MotionLayer::Base).blend_weight(), 0.3);

    assert!(system.update(0.125, &mut instance));
    assert_eq!(system.player(MotionLayer::Base).blend_weight(), 0.6);
    assert!(system.outgoing_player(MotionLayer::Base).is_playing());

    // Frame 1: outgoing only, 0 -> 2 by 0.3 = 0.6
    // Frame 2: 0.6 -> 2 by 0.6 = 1.44, then 1.44 -> 4 by 0.6 = 2.976
    let root = system.pose()[ROOT].translation;
    assert!(vec3_approx(root, Vec3::new(2.976, 0.0, 0.0)), "root = {root}");

    // The outgoing motion runs out and is released
    assert!(system.update(0.125, &mut instance));
    assert!(!system.outgoing_player(MotionLayer::Base).is_playing());
    assert_eq!(system.player(MotionLayer::Base).blend_weight(), 0.6);
}

// ============================================================================
// Layer Priority
// ============================================================================

#[test]
fn higher_layer_overrides_shared_bones() {
    let (mut system, mut instance) = setup();
    system.play(
        MotionLayer::Base,
        hold(
            "bt_lean",
            &[
                ("bt_spine", Vec3::new(5.0, 0.0, 0.0)),
                ("bt_head", Vec3::new(1.0, 2.0, 3.0)),
            ],
            10.0,
        ),
        full_weight(),
    );
    system.play(
        MotionLayer::Upper,
        hold("bt_twist", &[("bt_spine", Vec3::new(0.0, 0.0, 7.0))], 10.0),
        full_weight(),
    );

    assert!(system.update(0.1, &mut instance));

    assert!(vec3_approx(motion_translation(&instance, SPINE), Vec3::new(0.0, 0.0, 7.0)));
    assert!(vec3_approx(motion_translation(&instance, HEAD), Vec3::new(1.0, 2.0, 3.0)));
    // Untouched by any layer
    assert!(vec3_approx(motion_translation(&instance, ROOT), Vec3::ZERO));
    assert!(instance.is_dirty());

    let head = instance.global_matrix(HEAD).unwrap();
    assert!(vec3_approx(Vec3::from(head.translation), Vec3::new(1.0, 2.0, 10.0)));
}

#[test]
fn partial_weight_layer_mixes_with_lower_layers() {
    let (mut system, mut instance) = setup();
    system.play(
        MotionLayer::Base,
        hold("bt_base", &[("bt_root", Vec3::new(4.0, 0.0, 0.0))], 10.0),
        full_weight(),
    );
    system.play(
        MotionLayer::Overlay,
        hold("bt_overlay", &[("bt_root", Vec3::ZERO)], 10.0),
        MotionPlaybackConfig::default().with_weight(0.25),
    );

    system.update(0.1, &mut instance);
    assert!(vec3_approx(system.pose()[ROOT].translation, Vec3::new(3.0, 0.0, 0.0)));
}

// ============================================================================
// Bind Pose Fallback
// ============================================================================

#[test]
fn idle_system_restores_bind_pose_once() {
    let (mut system, mut instance) = setup();
    system.play(
        MotionLayer::Base,
        hold("bt_nod", &[("bt_spine", Vec3::new(5.0, 0.0, 0.0))], 0.5),
        full_weight(),
    );

    assert!(system.update(0.25, &mut instance));
    assert!(instance.is_dirty());
    assert!(vec3_approx(motion_translation(&instance, SPINE), Vec3::new(5.0, 0.0, 0.0)));

    assert!(system.update(0.25, &mut instance));
    // The motion ends here
    assert!(!system.update(0.1, &mut instance));

    assert!(!instance.is_dirty());
    assert!(vec3_approx(motion_translation(&instance, SPINE), Vec3::Y));
    assert!(vec3_approx(system.pose()[SPINE].translation, Vec3::Y));

    // Not repeated while idle
    instance
        .set_motion_matrix(SPINE, Affine3A::from_translation(Vec3::splat(9.0)))
        .unwrap();
    assert!(!system.update(0.1, &mut instance));
    assert!(vec3_approx(motion_translation(&instance, SPINE), Vec3::splat(9.0)));
}

#[test]
fn bind_pose_fallback_can_be_disabled() {
    let skeleton = rig();
    let settings = MotionSettings {
        bind_pose_fallback: false,
        ..MotionSettings::default()
    };
    let mut system = MotionSystem::new(Arc::clone(&skeleton), settings);
    let mut instance = SkeletonInstance::new(skeleton);

    system.play(
        MotionLayer::Base,
        hold("bt_pose", &[("bt_spine", Vec3::new(5.0, 0.0, 0.0))], 0.5),
        full_weight(),
    );
    system.update(0.25, &mut instance);
    system.update(0.5, &mut instance);
    assert!(!system.update(0.1, &mut instance));

    assert!(instance.is_dirty());
    assert!(vec3_approx(motion_translation(&instance, SPINE), Vec3::new(5.0, 0.0, 0.0)));
}

// ============================================================================
// Layer Control
// ============================================================================

#[test]
fn play_none_is_noop() {
    let (mut system, mut instance) = setup();
    system.play(MotionLayer::Base, None::<MotionHandle>, full_weight());

    assert_eq!(system.player(MotionLayer::Base).state(), PlayerState::Idle);
    assert!(!system.is_any_playing());
    assert!(!system.update(0.1, &mut instance));
}

#[test]
fn stop_layer_ends_after_fade_time() {
    let (mut system, mut instance) = setup();
    system.play(MotionLayer::Lower, hold("bt_legs", &[("bt_root", Vec3::X)], 10.0), full_weight());
    system.update(0.5, &mut instance);

    system.stop(MotionLayer::Lower, 0.25);
    assert!(system.player(MotionLayer::Lower).is_stopping());
    assert!(system.update(0.125, &mut instance));
    assert!(!system.update(0.125, &mut instance));
    assert!(!system.is_any_playing());
}

#[test]
fn paused_layer_holds_time() {
    let (mut system, mut instance) = setup();
    system.play(MotionLayer::Upper, hold("bt_arms", &[("bt_spine", Vec3::X)], 10.0), full_weight());
    system.update(0.5, &mut instance);

    system.set_paused(MotionLayer::Upper, true);
    assert!(system.update(1.0, &mut instance));
    assert_eq!(system.player(MotionLayer::Upper).play_time(), 0.5);

    system.set_paused(MotionLayer::Upper, false);
    system.update(0.25, &mut instance);
    assert_eq!(system.player(MotionLayer::Upper).play_time(), 0.75);
}

#[test]
fn reset_all_releases_motions() {
    let (mut system, mut instance) = setup();
    let motion = hold("bt_shared", &[("bt_root", Vec3::X)], 10.0);
    system.play(MotionLayer::Base, Arc::clone(&motion), full_weight());
    system.play(MotionLayer::Overlay, Arc::clone(&motion), full_weight());
    system.update(0.1, &mut instance);
    assert_eq!(Arc::strong_count(&motion), 3);

    system.reset_all();
    assert_eq!(Arc::strong_count(&motion), 1);
    assert!(!system.is_any_playing());
}

#[test]
fn events_drain_through_system() {
    let (mut system, mut instance) = setup();
    let track = BoneTrack::new(
        "bt_root",
        KeyframeTrack::constant(0.0, Transform::IDENTITY).unwrap(),
    );
    let motion = Motion::new("bt_clap", 0.0, 1.0, vec![track])
        .unwrap()
        .with_events(vec![MotionEvent::new(0.25, "clap")]);
    system.play(MotionLayer::Overlay, Arc::new(motion), full_weight());

    system.update(0.5, &mut instance);
    system.update(0.5, &mut instance);

    let event = system.pop_event(MotionLayer::Overlay).unwrap();
    assert_eq!(&*event.name, "clap");
    assert!(system.pop_event(MotionLayer::Overlay).is_none());
    assert!(system.pop_event(MotionLayer::Base).is_none());
}

#[test]
fn events_of_fading_motion_are_drained_after_cross_fade() {
    let (mut system, mut instance) = setup();
    let track = BoneTrack::new(
        "bt_root",
        KeyframeTrack::constant(0.0, Transform::IDENTITY).unwrap(),
    );
    let walk = Motion::new("bt_walk_steps", 0.0, 1.0, vec![track])
        .unwrap()
        .with_events(vec![
            MotionEvent::new(0.0, "contact"),
            MotionEvent::new(0.25, "step_left"),
            MotionEvent::new(0.875, "step_right"),
        ]);
    system.play(MotionLayer::Base, Arc::new(walk), full_weight());

    // Samples at 0 only; "contact" stays undrained
    system.update(0.5, &mut instance);

    system.play(
        MotionLayer::Base,
        hold("bt_idle_pose", &[("bt_root", Vec3::X)], 4.0),
        full_weight().with_blend_time(1.0),
    );
    assert_eq!(system.player(MotionLayer::Base).config().blend_time, 0.5);

    // The outgoing walk samples 0.5, 0.625, 0.75, 0.875, then ends
    for _ in 0..5 {
        assert!(system.update(0.125, &mut instance));
    }
    assert!(!system.outgoing_player(MotionLayer::Base).is_playing());

    let names: Vec<String> = std::iter::from_fn(|| system.pop_event(MotionLayer::Base))
        .map(|e| e.name.to_string())
        .collect();
    assert_eq!(names, ["contact", "step_left", "step_right"]);
}

#[test]
fn outgoing_player_counts_as_playing() {
    let (mut system, mut instance) = setup();
    system.play(MotionLayer::Base, hold("bt_long", &[("bt_root", Vec3::X)], 10.0), full_weight());
    system.update(1.0, &mut instance);

    system.play(
        MotionLayer::Base,
        hold("bt_short", &[("bt_root", Vec3::Y)], 0.25),
        full_weight().with_blend_time(0.5),
    );
    assert!(system.update(0.125, &mut instance));
    assert!(system.update(0.125, &mut instance));
    // The short primary ends; the outgoing motion is still assigned
    assert!(!system.update(0.125, &mut instance));

    assert!(!system.player(MotionLayer::Base).is_playing());
    assert!(system.outgoing_player(MotionLayer::Base).is_playing());
    assert!(system.is_any_playing());

    system.reset(MotionLayer::Base);
    assert!(!system.is_any_playing());
}

// ============================================================================
// Cache Integration
// ============================================================================

#[test]
fn play_named_resolves_from_cache() {
    let (mut system, mut instance) = setup();
    let cache = MotionCache::default();
    cache.insert(hold("bt_cached", &[("bt_head", Vec3::Z)], 2.0));

    assert!(system.play_named(MotionLayer::Base, &cache, "bt_cached", full_weight()));
    assert!(!system.play_named(MotionLayer::Upper, &cache, "bt_missing", full_weight()));

    assert!(system.update(0.1, &mut instance));
    assert!(vec3_approx(motion_translation(&instance, HEAD), Vec3::Z));
    assert_eq!(system.player(MotionLayer::Upper).state(), PlayerState::Idle);
}

#[test]
fn json_preset_drives_playback() {
    let (mut system, mut instance) = setup();
    let preset: MotionPlaybackConfig = serde_json::from_str(
        r#"{ "weight": 0.5, "speed": 2.0, "loop_count": "Infinite" }"#,
    )
    .unwrap();
    assert_eq!(preset.blend_time, 0.0);

    system.play(
        MotionLayer::Base,
        hold("bt_preset", &[("bt_root", Vec3::new(4.0, 0.0, 0.0))], 1.0),
        preset,
    );
    system.update(0.25, &mut instance);

    let player = system.player(MotionLayer::Base);
    assert_eq!(player.play_time(), 0.5);
    assert_eq!(player.config().loop_count, LoopCount::Infinite);
    assert!(vec3_approx(system.pose()[ROOT].translation, Vec3::new(2.0, 0.0, 0.0)));
}
