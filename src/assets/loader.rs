//! GLB → scene loader.
//!
//! Instantiates the node hierarchy, skins and animation clips of a binary
//! glTF asset into a [`Scene`]. Geometry and materials are deliberately not
//! materialized: rendering is the host's concern, and the avatar runtime needs
//! the bone nodes, the skeletons and the clips.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use glam::{Affine3A, Mat4, Quat, Vec3};
use rustc_hash::FxHashSet;

use crate::animation::{
    AnimationClip, InterpolationMode, KeyframeTrack, TargetPath, Track, TrackData, TrackMeta,
};
use crate::errors::AssetLoadError;
use crate::scene::{Node, NodeHandle, Scene, SkeletonInstance, SkeletonKey};

/// Handles into the scene for one instantiated asset.
///
/// Owned by the session (or attachment) that created it; tearing the model
/// down means removing `root`'s subtree from the scene.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    /// Container node parenting everything the asset instantiated
    pub root: NodeHandle,
    /// First skin of the asset, if any
    pub skeleton: Option<SkeletonKey>,
    /// Animation clips, shared with whoever plays them
    pub clips: Vec<Arc<AnimationClip>>,
    /// Scene name from the asset (container node name)
    pub name: String,
}

impl LoadedModel {
    /// Clip names in document order.
    #[must_use]
    pub fn clip_names(&self) -> Vec<String> {
        self.clips.iter().map(|c| c.name.clone()).collect()
    }

    #[must_use]
    pub fn clip_by_name(&self, name: &str) -> Option<&Arc<AnimationClip>> {
        self.clips.iter().find(|c| c.name == name)
    }
}

pub struct GlbLoader<'a> {
    scene: &'a mut Scene,
    // glTF node index -> scene NodeHandle
    node_mapping: Vec<NodeHandle>,
}

impl<'a> GlbLoader<'a> {
    /// Parses `bytes` (GLB or embedded glTF) and instantiates its default
    /// scene into `scene`.
    pub fn load_slice(bytes: &[u8], scene: &'a mut Scene) -> Result<LoadedModel, AssetLoadError> {
        let gltf = gltf::Gltf::from_slice(bytes)?;
        let buffers = Self::load_buffers(&gltf)?;

        let mut loader = Self {
            scene,
            node_mapping: Vec::with_capacity(gltf.nodes().count()),
        };
        loader.instantiate(&gltf, &buffers)
    }

    /// Resolves buffer declarations to raw bytes. The slice loader supports
    /// the GLB binary chunk and base64 data URIs; external buffer files
    /// belong to the host's asset layer.
    fn load_buffers(gltf: &gltf::Gltf) -> Result<Vec<Vec<u8>>, AssetLoadError> {
        let mut buffer_data = Vec::new();
        for buffer in gltf.buffers() {
            match buffer.source() {
                gltf::buffer::Source::Bin => {
                    if let Some(blob) = gltf.blob.as_deref() {
                        buffer_data.push(blob.to_vec());
                    } else {
                        return Err(AssetLoadError::MissingBlob);
                    }
                }
                gltf::buffer::Source::Uri(uri) => {
                    if let Some(encoded) = uri.strip_prefix("data:") {
                        let payload = encoded.split_once(',').map(|(_, p)| p).ok_or_else(|| {
                            AssetLoadError::DataUri(format!("malformed data URI: {uri}"))
                        })?;
                        buffer_data.push(BASE64_STANDARD.decode(payload)?);
                    } else {
                        return Err(AssetLoadError::UnsupportedUri(uri.to_string()));
                    }
                }
            }
        }
        Ok(buffer_data)
    }

    fn instantiate(
        &mut self,
        gltf: &gltf::Gltf,
        buffers: &[Vec<u8>],
    ) -> Result<LoadedModel, AssetLoadError> {
        // 1. One scene node per document node, TRS applied
        for node in gltf.nodes() {
            let name = node
                .name()
                .map_or_else(|| format!("Node_{}", node.index()), ToString::to_string);
            let mut scene_node = Node::new(&name);

            let (translation, rotation, scale) = node.transform().decomposed();
            scene_node.transform.position = Vec3::from_array(translation);
            scene_node.transform.rotation = Quat::from_array(rotation);
            scene_node.transform.scale = Vec3::from_array(scale);

            let handle = self.scene.nodes.insert(scene_node);
            self.node_mapping.push(handle);
        }

        // 2. Wire the hierarchy
        for node in gltf.nodes() {
            let parent_handle = self.node_mapping[node.index()];
            for child in node.children() {
                let child_handle = self.node_mapping[child.index()];
                if let Some(p) = self.scene.nodes.get_mut(parent_handle) {
                    p.push_child_raw(child_handle);
                }
                if let Some(c) = self.scene.nodes.get_mut(child_handle) {
                    c.set_parent_raw(Some(parent_handle));
                }
            }
        }

        // 3. Container node parenting the document scene's roots
        let doc_scene = gltf
            .default_scene()
            .or_else(|| gltf.scenes().next())
            .ok_or(AssetLoadError::MissingScene)?;
        let container_name = doc_scene
            .name()
            .map_or_else(|| "Model".to_string(), ToString::to_string);

        let container = self.scene.add_node(Node::new(&container_name));
        for root in doc_scene.nodes() {
            let handle = self.node_mapping[root.index()];
            if let Some(p) = self.scene.nodes.get_mut(container) {
                p.push_child_raw(handle);
            }
            if let Some(c) = self.scene.nodes.get_mut(handle) {
                c.set_parent_raw(Some(container));
            }
        }

        // 4. Skins → skeleton instances (joints flagged along the way)
        let skeleton_keys = self.load_skins(gltf, buffers);
        let skeleton = skeleton_keys.first().copied();

        // 5. Animations → runtime clips
        let clips = Self::load_animations(gltf, buffers)?
            .into_iter()
            .map(Arc::new)
            .collect();

        // World matrices are valid immediately after load
        self.scene.update_subtree(container);

        log::debug!(
            "loaded '{container_name}': {} nodes, {} skins, {} clips",
            self.node_mapping.len(),
            skeleton_keys.len(),
            gltf.animations().count()
        );

        Ok(LoadedModel {
            root: container,
            skeleton,
            clips,
            name: container_name,
        })
    }

    fn load_skins(&mut self, gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Vec<SkeletonKey> {
        let mut skeleton_keys = Vec::new();

        for skin in gltf.skins() {
            let name = skin.name().unwrap_or("Skeleton");

            // 1. Inverse bind matrices
            let reader = skin.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
            let ibms: Vec<Affine3A> = if let Some(iter) = reader.read_inverse_bind_matrices() {
                iter.map(|m| Affine3A::from_mat4(Mat4::from_cols_array_2d(&m)))
                    .collect()
            } else {
                vec![Affine3A::IDENTITY; skin.joints().count()]
            };

            // 2. Map glTF joint indices onto scene node handles, flagging
            // the nodes as joints
            let mut bones = Vec::new();
            let mut bone_names = Vec::new();
            for joint in skin.joints() {
                let handle = self.node_mapping[joint.index()];
                if let Some(node) = self.scene.nodes.get_mut(handle) {
                    node.is_joint = true;
                    bone_names.push(node.name.clone());
                } else {
                    bone_names.push(format!("Node_{}", joint.index()));
                }
                bones.push(handle);
            }

            // 3. Find the root joint
            let joints: Vec<_> = skin.joints().collect();
            let joint_indices: FxHashSet<usize> = joints.iter().map(gltf::Node::index).collect();

            // Joints referenced as a child of another joint have a parent
            // within the skin
            let mut child_joint_indices = FxHashSet::default();
            for node in &joints {
                for child in node.children() {
                    if joint_indices.contains(&child.index()) {
                        child_joint_indices.insert(child.index());
                    }
                }
            }

            let root_bone_index = 'block: {
                // A. Prefer the skin's explicit skeleton root
                if let Some(skeleton_root) = skin.skeleton()
                    && let Some(index) = joints.iter().position(|n| n.index() == skeleton_root.index())
                {
                    break 'block index;
                }

                // B. Otherwise the first joint with no parent inside the skin
                for (i, node) in joints.iter().enumerate() {
                    if !child_joint_indices.contains(&node.index()) {
                        break 'block i;
                    }
                }

                // C. Degenerate structure, fall back to 0
                0
            };

            let skeleton = SkeletonInstance::new(name, bones, bone_names, ibms, root_bone_index);
            skeleton_keys.push(self.scene.add_skeleton(skeleton));
        }

        skeleton_keys
    }

    fn load_animations(
        gltf: &gltf::Gltf,
        buffers: &[Vec<u8>],
    ) -> Result<Vec<AnimationClip>, AssetLoadError> {
        let mut animations = Vec::new();

        for anim in gltf.animations() {
            let mut tracks = Vec::new();

            for channel in anim.channels() {
                let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
                let target = channel.target();
                let gltf_node = target.node();

                // Track targets bind by node name at playback time
                let node_name = gltf_node
                    .name()
                    .map_or_else(|| format!("Node_{}", gltf_node.index()), ToString::to_string);

                let times: Vec<f32> = reader
                    .read_inputs()
                    .ok_or_else(|| {
                        AssetLoadError::Gltf("animation sampler missing input accessor".to_string())
                    })?
                    .collect();

                let interpolation = match channel.sampler().interpolation() {
                    gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
                    gltf::animation::Interpolation::Step => InterpolationMode::Step,
                    gltf::animation::Interpolation::CubicSpline => InterpolationMode::CubicSpline,
                };

                let outputs = reader.read_outputs().ok_or_else(|| {
                    AssetLoadError::Gltf("animation sampler missing output accessor".to_string())
                })?;

                let track = match outputs {
                    gltf::animation::util::ReadOutputs::Translations(iter) => Track {
                        meta: TrackMeta {
                            node_name,
                            target: TargetPath::Translation,
                        },
                        data: TrackData::Vector3(KeyframeTrack::new(
                            times,
                            iter.map(Vec3::from_array).collect(),
                            interpolation,
                        )),
                    },
                    gltf::animation::util::ReadOutputs::Rotations(iter) => Track {
                        meta: TrackMeta {
                            node_name,
                            target: TargetPath::Rotation,
                        },
                        data: TrackData::Quaternion(KeyframeTrack::new(
                            times,
                            iter.into_f32().map(Quat::from_array).collect(),
                            interpolation,
                        )),
                    },
                    gltf::animation::util::ReadOutputs::Scales(iter) => Track {
                        meta: TrackMeta {
                            node_name,
                            target: TargetPath::Scale,
                        },
                        data: TrackData::Vector3(KeyframeTrack::new(
                            times,
                            iter.map(Vec3::from_array).collect(),
                            interpolation,
                        )),
                    },
                    gltf::animation::util::ReadOutputs::MorphTargetWeights(_) => {
                        // The avatar pipeline has no morph targets
                        log::debug!(
                            "animation '{}': morph weight channel skipped",
                            anim.name().unwrap_or("anim")
                        );
                        continue;
                    }
                };

                tracks.push(track);
            }

            let clip = AnimationClip::new(anim.name().unwrap_or("anim").to_string(), tracks);
            animations.push(clip);
        }

        Ok(animations)
    }
}
