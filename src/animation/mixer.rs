use std::sync::Arc;

use crate::animation::action::AnimationAction;
use crate::animation::binding::TargetPath;
use crate::animation::clip::TrackData;
use crate::scene::Scene;

/// Drives a set of [`AnimationAction`]s and writes sampled values into the
/// scene's node transforms.
///
/// Owned per avatar: each avatar's playback state is exclusive to its own
/// scene subtree.
#[derive(Default)]
pub struct AnimationMixer {
    actions: Vec<AnimationAction>,
}

impl AnimationMixer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    /// Adds an action and returns its index.
    pub fn add_action(&mut self, action: AnimationAction) -> usize {
        self.actions.push(action);
        self.actions.len() - 1
    }

    #[must_use]
    pub fn actions(&self) -> &[AnimationAction] {
        &self.actions
    }

    #[must_use]
    pub fn action(&self, index: usize) -> Option<&AnimationAction> {
        self.actions.get(index)
    }

    pub fn action_mut(&mut self, index: usize) -> Option<&mut AnimationAction> {
        self.actions.get_mut(index)
    }

    /// Advances every action and applies the enabled ones to the scene.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        for action in &mut self.actions {
            action.update(dt);
        }

        for action in &mut self.actions {
            if action.paused || !action.enabled || action.weight <= 0.0 {
                continue;
            }

            let clip = Arc::clone(action.clip());
            let time = action.time;

            for binding in &action.bindings {
                let track = &clip.tracks[binding.track_index];
                let cursor = &mut action.track_cursors[binding.track_index];

                match (&track.data, binding.target) {
                    (TrackData::Vector3(t), TargetPath::Translation) => {
                        if let Some(node) = scene.get_node_mut(binding.node_handle) {
                            let val = t.sample_with_cursor(time, cursor);
                            node.transform.position = val;
                            node.transform.mark_dirty();
                        }
                    }
                    (TrackData::Vector3(t), TargetPath::Scale) => {
                        if let Some(node) = scene.get_node_mut(binding.node_handle) {
                            let val = t.sample_with_cursor(time, cursor);
                            node.transform.scale = val;
                            node.transform.mark_dirty();
                        }
                    }
                    (TrackData::Quaternion(t), TargetPath::Rotation) => {
                        if let Some(node) = scene.get_node_mut(binding.node_handle) {
                            let val = t.sample_with_cursor(time, cursor);
                            node.transform.rotation = val;
                            node.transform.mark_dirty();
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}
