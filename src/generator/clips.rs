//! Stance animation baker.
//!
//! Synthesizes the three looping stance clips against the fixed rig. Every
//! track starts and ends on the same value so the clips loop seamlessly,
//! and every targeted bone is asserted against the rig at bake time.

use std::f32::consts::TAU;

use glam::{Quat, Vec3};

use crate::animation::{
    AnimationClip, InterpolationMode, KeyframeTrack, TargetPath, Track, TrackData, TrackMeta,
};
use crate::rig::{Rig, bone};
use crate::stance::Stance;

/// Keyframe spacing used by all stance clips, in seconds.
const KEY_STEP: f32 = 0.25;

fn sample_times(duration: f32) -> Vec<f32> {
    let steps = (duration / KEY_STEP).round() as usize;
    (0..=steps).map(|i| i as f32 * KEY_STEP).collect()
}

fn rotation_track(rig: &Rig, bone_name: &str, times: Vec<f32>, values: Vec<Quat>) -> Track {
    assert!(rig.contains(bone_name), "clip targets unknown bone '{bone_name}'");
    Track {
        meta: TrackMeta {
            node_name: bone_name.to_string(),
            target: TargetPath::Rotation,
        },
        data: TrackData::Quaternion(KeyframeTrack::new(
            times,
            values,
            InterpolationMode::Linear,
        )),
    }
}

fn translation_track(rig: &Rig, bone_name: &str, times: Vec<f32>, values: Vec<Vec3>) -> Track {
    assert!(rig.contains(bone_name), "clip targets unknown bone '{bone_name}'");
    Track {
        meta: TrackMeta {
            node_name: bone_name.to_string(),
            target: TargetPath::Translation,
        },
        data: TrackData::Vector3(KeyframeTrack::new(
            times,
            values,
            InterpolationMode::Linear,
        )),
    }
}

/// Samples `f` over one loop of `duration`, guaranteeing the first and last
/// samples are identical (the phase argument passed to `f` is 0 at both
/// ends).
fn sampled<T>(times: &[f32], duration: f32, f: impl Fn(f32) -> T) -> Vec<T> {
    times
        .iter()
        .map(|&t| {
            let phase = TAU * (t / duration);
            // Snap the final key onto the first so the loop closes exactly
            if (t - duration).abs() < 1e-6 { f(0.0) } else { f(phase) }
        })
        .collect()
}

/// Bakes one stance clip.
#[must_use]
pub fn bake_clip(rig: &Rig, stance: Stance) -> AnimationClip {
    match stance {
        Stance::Idle => bake_idle(rig),
        Stance::Action => bake_action(rig),
        Stance::Victory => bake_victory(rig),
    }
}

/// Bakes all three stance clips, in [`Stance::ALL`] order.
#[must_use]
pub fn bake_stance_clips(rig: &Rig) -> Vec<AnimationClip> {
    Stance::ALL.iter().map(|&s| bake_clip(rig, s)).collect()
}

/// Idle: gentle spine sway, chest counter-sway, slow head bob.
fn bake_idle(rig: &Rig) -> AnimationClip {
    let duration = 3.0;
    let times = sample_times(duration);
    let head_rest = rig.rest_local_translation(bone::HEAD);

    let tracks = vec![
        rotation_track(
            rig,
            bone::SPINE,
            times.clone(),
            sampled(&times, duration, |p| Quat::from_rotation_z(0.035 * p.sin())),
        ),
        rotation_track(
            rig,
            bone::CHEST,
            times.clone(),
            sampled(&times, duration, |p| Quat::from_rotation_z(-0.025 * p.sin())),
        ),
        translation_track(
            rig,
            bone::HEAD,
            times.clone(),
            sampled(&times, duration, |p| {
                head_rest + Vec3::new(0.0, 0.012 * (2.0 * p).sin(), 0.0)
            }),
        ),
    ];

    AnimationClip::new(Stance::Idle.clip_name().to_string(), tracks)
}

/// Action: alternating leg swing with opposite arm pump and a slight
/// forward lean.
fn bake_action(rig: &Rig) -> AnimationClip {
    let duration = 1.0;
    let times = sample_times(duration);
    let left_hand_rest = rig.rest_local_translation(bone::LEFT_HAND);
    let right_hand_rest = rig.rest_local_translation(bone::RIGHT_HAND);

    let tracks = vec![
        rotation_track(
            rig,
            bone::LEFT_LEG,
            times.clone(),
            sampled(&times, duration, |p| Quat::from_rotation_x(0.55 * p.sin())),
        ),
        rotation_track(
            rig,
            bone::RIGHT_LEG,
            times.clone(),
            sampled(&times, duration, |p| Quat::from_rotation_x(-0.55 * p.sin())),
        ),
        translation_track(
            rig,
            bone::LEFT_HAND,
            times.clone(),
            sampled(&times, duration, |p| {
                left_hand_rest + Vec3::new(0.0, 0.0, -0.14 * p.sin())
            }),
        ),
        translation_track(
            rig,
            bone::RIGHT_HAND,
            times.clone(),
            sampled(&times, duration, |p| {
                right_hand_rest + Vec3::new(0.0, 0.0, 0.14 * p.sin())
            }),
        ),
        rotation_track(
            rig,
            bone::SPINE,
            times.clone(),
            sampled(&times, duration, |p| {
                Quat::from_rotation_x(0.08 + 0.02 * (2.0 * p).sin())
            }),
        ),
    ];

    AnimationClip::new(Stance::Action.clip_name().to_string(), tracks)
}

/// Victory: hands held high with a small bounce and a head tilt.
fn bake_victory(rig: &Rig) -> AnimationClip {
    let duration = 2.0;
    let times = sample_times(duration);
    let left_hand_rest = rig.rest_local_translation(bone::LEFT_HAND);
    let right_hand_rest = rig.rest_local_translation(bone::RIGHT_HAND);

    let raise = Vec3::new(0.0, 0.38, 0.0);
    let pull_in = 0.10;

    let tracks = vec![
        translation_track(
            rig,
            bone::LEFT_HAND,
            times.clone(),
            sampled(&times, duration, |p| {
                left_hand_rest + raise + Vec3::new(-pull_in, 0.04 * p.sin(), 0.0)
            }),
        ),
        translation_track(
            rig,
            bone::RIGHT_HAND,
            times.clone(),
            sampled(&times, duration, |p| {
                right_hand_rest + raise + Vec3::new(pull_in, 0.04 * p.sin(), 0.0)
            }),
        ),
        rotation_track(
            rig,
            bone::HEAD,
            times.clone(),
            sampled(&times, duration, |p| Quat::from_rotation_z(0.08 * p.sin())),
        ),
    ];

    AnimationClip::new(Stance::Victory.clip_name().to_string(), tracks)
}
