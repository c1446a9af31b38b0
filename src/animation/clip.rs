use glam::{Quat, Vec3};

use crate::animation::binding::TargetPath;
use crate::animation::tracks::KeyframeTrack;

#[derive(Debug, Clone)]
pub struct TrackMeta {
    pub node_name: String,
    pub target: TargetPath,
}

#[derive(Debug, Clone)]
pub enum TrackData {
    Vector3(KeyframeTrack<Vec3>),
    Quaternion(KeyframeTrack<Quat>),
    Scalar(KeyframeTrack<f32>),
}

/// A complete track: metadata plus keyframe data.
#[derive(Debug, Clone)]
pub struct Track {
    pub meta: TrackMeta,
    pub data: TrackData,
}

impl Track {
    /// Last keyframe time of this track (0.0 when empty).
    #[must_use]
    pub fn end_time(&self) -> f32 {
        match &self.data {
            TrackData::Vector3(track) => track.times.last().copied().unwrap_or(0.0),
            TrackData::Quaternion(track) => track.times.last().copied().unwrap_or(0.0),
            TrackData::Scalar(track) => track.times.last().copied().unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    /// Builds a clip; the duration is the maximum end time of its tracks.
    #[must_use]
    pub fn new(name: String, tracks: Vec<Track>) -> Self {
        let duration = tracks.iter().map(Track::end_time).fold(0.0_f32, f32::max);

        Self {
            name,
            duration,
            tracks,
        }
    }
}
