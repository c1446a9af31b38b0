use glam::Affine3A;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use uuid::Uuid;

use crate::scene::{Node, NodeHandle};

/// A skeleton reconstructed from a loaded skin.
///
/// Bone order matches the skin's joint order. The inverse bind matrices are
/// static data carried along from the asset; the attachment runtime only
/// needs the name→node index, but diagnostics and future pose math read the
/// rest of it.
#[derive(Debug, Clone)]
pub struct SkeletonInstance {
    pub id: Uuid,
    pub name: String,

    /// Bone list in joint-index order
    pub bones: Vec<NodeHandle>,

    /// Bone names in joint-index order (captured at load time)
    bone_names: Vec<String>,

    /// name -> position in `bones`
    by_name: FxHashMap<String, usize>,

    /// Inverse bind matrices, static after load
    pub(crate) inverse_bind_matrices: Vec<Affine3A>,

    /// Root bone index (usually 0)
    pub(crate) root_bone_index: usize,
}

impl SkeletonInstance {
    #[must_use]
    pub fn new(
        name: &str,
        bones: Vec<NodeHandle>,
        bone_names: Vec<String>,
        inverse_bind_matrices: Vec<Affine3A>,
        root_bone_index: usize,
    ) -> Self {
        debug_assert_eq!(bones.len(), bone_names.len());
        debug_assert_eq!(bones.len(), inverse_bind_matrices.len());

        let by_name = bone_names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();

        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            bones,
            bone_names,
            by_name,
            inverse_bind_matrices,
            root_bone_index,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Bone names in joint-index order.
    #[must_use]
    pub fn bone_names(&self) -> &[String] {
        &self.bone_names
    }

    #[must_use]
    pub fn contains_bone(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Node handle of the named bone, if present.
    #[must_use]
    pub fn bone_by_name(&self, name: &str) -> Option<NodeHandle> {
        self.by_name.get(name).map(|&i| self.bones[i])
    }

    /// Gets the root bone node handle.
    #[must_use]
    pub fn root_bone(&self) -> Option<NodeHandle> {
        self.bones.get(self.root_bone_index).copied()
    }

    #[must_use]
    pub fn inverse_bind_matrix(&self, index: usize) -> Option<&Affine3A> {
        self.inverse_bind_matrices.get(index)
    }

    /// Computes per-joint skinning matrices for the current pose.
    ///
    /// # Arguments
    /// * `nodes`: global node storage, each bone's `world_matrix` is read
    ///   from here
    /// * `root_matrix_inv`: inverse world matrix of the node carrying the
    ///   skinned mesh (brings joint transforms back into mesh space)
    #[must_use]
    pub fn compute_joint_matrices(
        &self,
        nodes: &SlotMap<NodeHandle, Node>,
        root_matrix_inv: Affine3A,
    ) -> Vec<Affine3A> {
        let mut joint_matrices = vec![Affine3A::IDENTITY; self.bones.len()];
        for (i, &bone_handle) in self.bones.iter().enumerate() {
            let Some(bone_node) = nodes.get(bone_handle) else {
                continue;
            };
            let bone_world_matrix = bone_node.transform.world_matrix;
            let ibm = self.inverse_bind_matrices[i];

            // Order matters: IBM first (into bone local space), then the
            // bone's current world transform, then cancel the mesh's own
            // transform.
            joint_matrices[i] = root_matrix_inv * bone_world_matrix * ibm;
        }
        joint_matrices
    }
}
