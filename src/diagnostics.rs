//! Diagnostics extractor.
//!
//! Read-only introspection over a loaded avatar subtree, used for developer
//! verification after load (e.g. confirming exported bone names survived
//! the round trip). Never part of the end-user runtime path; callable any
//! number of times and always reflects current live state.

use serde::Serialize;

use crate::assets::LoadedModel;
use crate::scene::Scene;

/// Snapshot of a loaded avatar's shape. Derived, recomputed per call, not
/// persisted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiagnosticsReport {
    pub model_loaded: bool,
    /// Root orientation as XYZ Euler angles (radians)
    pub orientation: Option<[f32; 3]>,
    pub scale: Option<[f32; 3]>,
    /// Animation clip names present on the loaded asset
    pub animation_clips: Vec<String>,
    /// Joint-flagged node names in hierarchy order
    pub detected_bones: Vec<String>,
}

/// Walks the model's subtree and reports bones, clips and the root
/// transform.
#[must_use]
pub fn inspect(scene: &Scene, model: &LoadedModel) -> DiagnosticsReport {
    let Some(root_node) = scene.get_node(model.root) else {
        return DiagnosticsReport::default();
    };

    let mut detected_bones = Vec::new();
    for handle in scene.collect_subtree(model.root) {
        if let Some(node) = scene.get_node(handle)
            && node.is_joint
        {
            detected_bones.push(node.name.clone());
        }
    }

    DiagnosticsReport {
        model_loaded: true,
        orientation: Some(root_node.transform.rotation_euler().to_array()),
        scale: Some(root_node.transform.scale.to_array()),
        animation_clips: model.clip_names(),
        detected_bones,
    }
}

/// The report for "nothing loaded yet".
#[must_use]
pub fn inspect_unloaded() -> DiagnosticsReport {
    DiagnosticsReport::default()
}
