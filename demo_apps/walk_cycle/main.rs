use std::f32::consts::PI;
use std::sync::Arc;

use glam::{Quat, Vec3};
use marionette::prelude::*;

const FRAME_DT: f32 = 1.0 / 60.0;
const WALK_DURATION: f32 = 1.2;

fn humanoid() -> anyhow::Result<Arc<Skeleton>> {
    let bones = vec![
        Bone::new("hips", None, Transform::from_translation(Vec3::new(0.0, 1.0, 0.0))),
        Bone::new("spine", Some(0), Transform::from_translation(Vec3::new(0.0, 0.3, 0.0))),
        Bone::new("shoulder_r", Some(1), Transform::from_translation(Vec3::new(0.2, 0.2, 0.0))),
        Bone::new("hand_r", Some(2), Transform::from_translation(Vec3::new(0.5, 0.0, 0.0))),
        Bone::new("thigh_l", Some(0), Transform::from_translation(Vec3::new(-0.1, 0.0, 0.0))),
        Bone::new("thigh_r", Some(0), Transform::from_translation(Vec3::new(0.1, 0.0, 0.0))),
    ];
    Ok(Arc::new(Skeleton::new("humanoid", bones)?))
}

/// Rotation keys about `axis`, swinging `amplitude` radians over `duration`.
fn swing_track(
    bone: &str,
    offset: Vec3,
    axis: Vec3,
    amplitude: f32,
    phase: f32,
    duration: f32,
) -> anyhow::Result<BoneTrack> {
    const KEYS: usize = 9;
    let times: Vec<f32> = (0..KEYS)
        .map(|k| k as f32 * duration / (KEYS - 1) as f32)
        .collect();
    let values = times
        .iter()
        .map(|t| {
            let angle = (2.0 * PI * t / duration + phase).sin() * amplitude;
            Transform::new(Vec3::ONE, Quat::from_axis_angle(axis, angle), offset)
        })
        .collect();
    let keyframes = KeyframeTrack::new(times, values, InterpolationMode::Linear)?;
    Ok(BoneTrack::new(bone, keyframes))
}

fn walk() -> anyhow::Result<Motion> {
    let tracks = vec![
        swing_track("thigh_l", Vec3::new(-0.1, 0.0, 0.0), Vec3::X, 0.5, 0.0, WALK_DURATION)?,
        swing_track("thigh_r", Vec3::new(0.1, 0.0, 0.0), Vec3::X, 0.5, PI, WALK_DURATION)?,
        swing_track("spine", Vec3::new(0.0, 0.3, 0.0), Vec3::Y, 0.1, 0.0, WALK_DURATION)?,
    ];
    Ok(Motion::from_tracks("walk", tracks)?.with_events(vec![
        MotionEvent::new(0.0, "footstep_left"),
        MotionEvent::new(WALK_DURATION * 0.5, "footstep_right"),
    ]))
}

fn wave() -> anyhow::Result<Motion> {
    let tracks = vec![
        swing_track("shoulder_r", Vec3::new(0.2, 0.2, 0.0), Vec3::Z, 1.2, 0.0, 0.8)?,
        swing_track("hand_r", Vec3::new(0.5, 0.0, 0.0), Vec3::Z, 0.6, 0.0, 0.4)?,
    ];
    Ok(Motion::from_tracks("wave", tracks)?)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings = match std::env::args().nth(1) {
        Some(path) => MotionSettings::from_json(&std::fs::read_to_string(path)?)?,
        None => MotionSettings::default(),
    };

    let skeleton = humanoid()?;
    let cache = MotionCache::new(&settings);
    cache.insert(Arc::new(walk()?));
    cache.insert(Arc::new(wave()?));

    let mut system = MotionSystem::new(Arc::clone(&skeleton), settings);
    let mut instance = SkeletonInstance::new(Arc::clone(&skeleton));
    let hand = skeleton
        .find_bone("hand_r")
        .ok_or_else(|| anyhow::anyhow!("skeleton has no hand_r bone"))?;

    system.play_named(
        MotionLayer::Base,
        &cache,
        "walk",
        MotionPlaybackConfig::default().with_weight(1.0).looping(),
    );

    let frames = (4.0 / FRAME_DT) as u32;
    for frame in 0..frames {
        let time = frame as f32 * FRAME_DT;

        if frame == 60 {
            println!("[{time:5.2}s] wave in");
            system.play_named(
                MotionLayer::Upper,
                &cache,
                "wave",
                MotionPlaybackConfig::default()
                    .with_weight(1.0)
                    .with_blend_time(0.25)
                    .with_loop_count(LoopCount::Finite(2)),
            );
        }
        if frame == 180 {
            println!("[{time:5.2}s] walk stops");
            system.stop(MotionLayer::Base, 0.5);
        }

        let animated = system.update(FRAME_DT, &mut instance);

        while let Some(event) = system.pop_event(MotionLayer::Base) {
            println!("[{time:5.2}s] event '{}' at {:.2}s", event.name, event.time);
        }

        if frame % 15 == 0 {
            let position = instance.global_matrix(hand)?.translation;
            println!(
                "[{time:5.2}s] animated={animated:<5} hand_r=({:+.3}, {:+.3}, {:+.3})",
                position.x, position.y, position.z
            );
        }

        cache.maintain(f64::from(time));
    }

    log::info!("{} motions still cached", cache.len());
    Ok(())
}
