use crate::animation::binding::PropertyBinding;
use crate::animation::clip::AnimationClip;
use crate::scene::{NodeHandle, Scene};

pub struct Binder;

impl Binder {
    /// Resolves a clip's tracks to actual scene nodes under `root_node`.
    ///
    /// Tracks whose target node is absent from the subtree are skipped;
    /// they simply produce no binding.
    #[must_use]
    pub fn bind(scene: &Scene, root_node: NodeHandle, clip: &AnimationClip) -> Vec<PropertyBinding> {
        let mut bindings = Vec::with_capacity(clip.tracks.len());

        for (track_idx, track) in clip.tracks.iter().enumerate() {
            let node_name = &track.meta.node_name;
            let target = track.meta.target;

            if let Some(node_handle) = scene.find_by_name(root_node, node_name) {
                bindings.push(PropertyBinding {
                    track_index: track_idx,
                    node_handle,
                    target,
                });
            } else {
                log::debug!(
                    "clip '{}': no node named '{node_name}' under the bind root, track skipped",
                    clip.name
                );
            }
        }

        bindings
    }
}
