//! GLB asset exporter.
//!
//! Serializes the generated figure, the rig and the baked stance clips into
//! a single glTF 2.0 binary container: a JSON chunk describing nodes, one
//! skinned mesh, one skin and the named animations, plus a packed
//! little-endian binary chunk for all accessor data.

use std::collections::BTreeMap;

use glam::Mat4;
use gltf::json;
use json::validation::Checked::Valid;
use json::validation::USize64;

use crate::animation::{AnimationClip, InterpolationMode, TargetPath, TrackData};
use crate::errors::ExportError;
use crate::generator::figure::Figure;
use crate::rig::{ROOT_NODE_NAME, Rig};

/// Exporter configuration.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Upper bound for the assembled GLB; `None` disables the check.
    pub max_bytes: Option<usize>,
    /// Written into the glTF `asset.generator` field.
    pub generator: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            max_bytes: Some(8 * 1024 * 1024),
            generator: concat!("avakit ", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Binary-chunk bookkeeping: every accessor gets its own 4-byte-aligned
/// buffer view over buffer 0.
struct BinWriter {
    buffer: Vec<u8>,
    views: Vec<json::buffer::View>,
    accessors: Vec<json::Accessor>,
}

impl BinWriter {
    fn new() -> Self {
        Self {
            buffer: Vec::new(),
            views: Vec::new(),
            accessors: Vec::new(),
        }
    }

    fn align(&mut self) {
        while !self.buffer.len().is_multiple_of(4) {
            self.buffer.push(0);
        }
    }

    fn push_view(&mut self, bytes: &[u8]) -> u32 {
        self.align();
        let start = self.buffer.len();
        self.buffer.extend_from_slice(bytes);

        self.views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_offset: Some(USize64::from(start)),
            byte_length: USize64::from(bytes.len()),
            byte_stride: None,
            target: None,
            name: None,
            extensions: Default::default(),
            extras: Default::default(),
        });
        self.views.len() as u32 - 1
    }

    fn push_accessor(
        &mut self,
        bytes: &[u8],
        count: usize,
        component_type: json::accessor::ComponentType,
        type_: json::accessor::Type,
        min: Option<json::Value>,
        max: Option<json::Value>,
    ) -> u32 {
        let view = self.push_view(bytes);
        self.accessors.push(json::Accessor {
            buffer_view: Some(json::Index::new(view)),
            byte_offset: Some(USize64::from(0usize)),
            count: USize64::from(count),
            component_type: Valid(json::accessor::GenericComponentType(component_type)),
            type_: Valid(type_),
            min,
            max,
            name: None,
            normalized: false,
            sparse: None,
            extensions: Default::default(),
            extras: Default::default(),
        });
        self.accessors.len() as u32 - 1
    }
}

fn f32_slice_min_max(values: &[f32]) -> (json::Value, json::Value) {
    let min = values.iter().copied().fold(f32::INFINITY, f32::min);
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    (
        json::Value::Array(vec![json::Value::from(min)]),
        json::Value::Array(vec![json::Value::from(max)]),
    )
}

/// Serializes `figure` + `rig` + `clips` into a GLB byte buffer.
///
/// The returned buffer, loaded by any conformant glTF loader, reconstructs
/// a skeleton with the rig's bone names and hierarchy, the skinned mesh
/// bound to it, and the clips addressable by their bake-time names.
pub fn export_avatar(
    figure: &Figure,
    rig: &Rig,
    clips: &[AnimationClip],
    options: &ExportOptions,
) -> Result<Vec<u8>, ExportError> {
    // Fail before doing any work if a clip targets a bone the rig lacks.
    for clip in clips {
        for track in &clip.tracks {
            if !rig.contains(&track.meta.node_name) {
                return Err(ExportError::UnknownBone {
                    clip: clip.name.clone(),
                    bone: track.meta.node_name.clone(),
                });
            }
        }
    }

    let mut writer = BinWriter::new();

    // ========================================================================
    // Nodes: 0 = armature root, 1..=N = bones in joint order, N+1 = mesh
    // ========================================================================

    let bone_count = rig.len();
    let node_of_bone = |bone_index: usize| bone_index as u32 + 1;
    let mesh_node_index = bone_count as u32 + 1;

    let mut nodes: Vec<json::Node> = Vec::with_capacity(bone_count + 2);

    let root_bone_index = rig
        .bones()
        .iter()
        .position(|b| b.parent.is_none())
        .unwrap_or(0);

    nodes.push(json::Node {
        name: Some(ROOT_NODE_NAME.to_string()),
        children: Some(vec![json::Index::new(node_of_bone(root_bone_index))]),
        ..Default::default()
    });

    for spec in rig.bones() {
        let children: Vec<json::Index<json::Node>> = rig
            .bones()
            .iter()
            .enumerate()
            .filter(|(_, other)| other.parent == Some(spec.name))
            .map(|(j, _)| json::Index::new(node_of_bone(j)))
            .collect();

        nodes.push(json::Node {
            name: Some(spec.name.to_string()),
            translation: Some(spec.rest_translation.to_array()),
            rotation: Some(json::scene::UnitQuaternion(spec.rest_rotation.to_array())),
            scale: Some(spec.rest_scale.to_array()),
            children: if children.is_empty() {
                None
            } else {
                Some(children)
            },
            ..Default::default()
        });
    }

    // ========================================================================
    // Skin: inverse bind matrices from the rest pose
    // ========================================================================

    let mut ibm_bytes: Vec<u8> = Vec::with_capacity(bone_count * 64);
    for i in 0..bone_count {
        let ibm = Mat4::from(rig.rest_world_matrix(i).inverse());
        for value in ibm.to_cols_array() {
            ibm_bytes.extend_from_slice(&value.to_le_bytes());
        }
    }
    let ibm_accessor = writer.push_accessor(
        &ibm_bytes,
        bone_count,
        json::accessor::ComponentType::F32,
        json::accessor::Type::Mat4,
        None,
        None,
    );

    let skin = json::Skin {
        inverse_bind_matrices: Some(json::Index::new(ibm_accessor)),
        joints: (0..bone_count)
            .map(|i| json::Index::new(node_of_bone(i)))
            .collect(),
        skeleton: None,
        name: Some("AvatarRig".to_string()),
        extensions: Default::default(),
        extras: Default::default(),
    };

    // ========================================================================
    // Mesh: positions, normals, UVs, joints, weights, indices
    // ========================================================================

    let vertex_count = figure.vertex_count();

    let mut min_pos = [f32::MAX; 3];
    let mut max_pos = [f32::MIN; 3];
    for p in &figure.positions {
        for (axis, value) in p.to_array().iter().enumerate() {
            min_pos[axis] = min_pos[axis].min(*value);
            max_pos[axis] = max_pos[axis].max(*value);
        }
    }

    let position_accessor = writer.push_accessor(
        bytemuck::cast_slice(&figure.positions),
        vertex_count,
        json::accessor::ComponentType::F32,
        json::accessor::Type::Vec3,
        Some(json::Value::from(min_pos.to_vec())),
        Some(json::Value::from(max_pos.to_vec())),
    );
    let normal_accessor = writer.push_accessor(
        bytemuck::cast_slice(&figure.normals),
        vertex_count,
        json::accessor::ComponentType::F32,
        json::accessor::Type::Vec3,
        None,
        None,
    );
    let uv_accessor = writer.push_accessor(
        bytemuck::cast_slice(&figure.uvs),
        vertex_count,
        json::accessor::ComponentType::F32,
        json::accessor::Type::Vec2,
        None,
        None,
    );
    let joints_accessor = writer.push_accessor(
        bytemuck::cast_slice(&figure.joints),
        vertex_count,
        json::accessor::ComponentType::U16,
        json::accessor::Type::Vec4,
        None,
        None,
    );
    let weights_accessor = writer.push_accessor(
        bytemuck::cast_slice(&figure.weights),
        vertex_count,
        json::accessor::ComponentType::F32,
        json::accessor::Type::Vec4,
        None,
        None,
    );
    let index_accessor = writer.push_accessor(
        bytemuck::cast_slice(&figure.indices),
        figure.indices.len(),
        json::accessor::ComponentType::U32,
        json::accessor::Type::Scalar,
        None,
        None,
    );

    let mut attributes: BTreeMap<
        json::validation::Checked<json::mesh::Semantic>,
        json::Index<json::Accessor>,
    > = BTreeMap::new();
    attributes.insert(
        Valid(json::mesh::Semantic::Positions),
        json::Index::new(position_accessor),
    );
    attributes.insert(
        Valid(json::mesh::Semantic::Normals),
        json::Index::new(normal_accessor),
    );
    attributes.insert(
        Valid(json::mesh::Semantic::TexCoords(0)),
        json::Index::new(uv_accessor),
    );
    attributes.insert(
        Valid(json::mesh::Semantic::Joints(0)),
        json::Index::new(joints_accessor),
    );
    attributes.insert(
        Valid(json::mesh::Semantic::Weights(0)),
        json::Index::new(weights_accessor),
    );

    let primitive = json::mesh::Primitive {
        attributes,
        extensions: Default::default(),
        extras: Default::default(),
        indices: Some(json::Index::new(index_accessor)),
        material: Some(json::Index::new(0)),
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
    };

    let mesh = json::Mesh {
        extensions: Default::default(),
        extras: Default::default(),
        name: Some("AvatarMesh".to_string()),
        primitives: vec![primitive],
        weights: None,
    };

    nodes.push(json::Node {
        name: Some("Avatar".to_string()),
        mesh: Some(json::Index::new(0)),
        skin: Some(json::Index::new(0)),
        ..Default::default()
    });

    let material = json::Material {
        name: Some("AvatarBody".to_string()),
        pbr_metallic_roughness: json::material::PbrMetallicRoughness {
            base_color_factor: json::material::PbrBaseColorFactor([0.72, 0.76, 0.85, 1.0]),
            metallic_factor: json::material::StrengthFactor(0.1),
            roughness_factor: json::material::StrengthFactor(0.6),
            ..Default::default()
        },
        ..Default::default()
    };

    // ========================================================================
    // Animations
    // ========================================================================

    let mut animations: Vec<json::Animation> = Vec::with_capacity(clips.len());

    for clip in clips {
        let mut samplers: Vec<json::animation::Sampler> = Vec::new();
        let mut channels: Vec<json::animation::Channel> = Vec::new();

        for track in &clip.tracks {
            // Unknown bones were rejected up front
            let Some(bone_index) = rig.index_of(&track.meta.node_name) else {
                continue;
            };
            let target_node = node_of_bone(bone_index);

            let (times, value_bytes, value_count, accessor_type, path) = match &track.data {
                TrackData::Vector3(t) => {
                    let path = match track.meta.target {
                        TargetPath::Translation => json::animation::Property::Translation,
                        TargetPath::Scale => json::animation::Property::Scale,
                        TargetPath::Rotation => {
                            log::warn!(
                                "clip '{}': Vector3 track cannot target rotation, skipped",
                                clip.name
                            );
                            continue;
                        }
                    };
                    let mut bytes = Vec::with_capacity(t.values.len() * 12);
                    for v in &t.values {
                        for value in v.to_array() {
                            bytes.extend_from_slice(&value.to_le_bytes());
                        }
                    }
                    (
                        &t.times,
                        bytes,
                        t.values.len(),
                        json::accessor::Type::Vec3,
                        path,
                    )
                }
                TrackData::Quaternion(t) => {
                    let mut bytes = Vec::with_capacity(t.values.len() * 16);
                    for q in &t.values {
                        for value in q.to_array() {
                            bytes.extend_from_slice(&value.to_le_bytes());
                        }
                    }
                    (
                        &t.times,
                        bytes,
                        t.values.len(),
                        json::accessor::Type::Vec4,
                        json::animation::Property::Rotation,
                    )
                }
                TrackData::Scalar(_) => {
                    log::warn!(
                        "clip '{}': scalar track has no glTF animation path, skipped",
                        clip.name
                    );
                    continue;
                }
            };

            let interpolation = match interpolation_of(&track.data) {
                InterpolationMode::Linear => json::animation::Interpolation::Linear,
                InterpolationMode::Step => json::animation::Interpolation::Step,
                InterpolationMode::CubicSpline => json::animation::Interpolation::CubicSpline,
            };

            let mut time_bytes = Vec::with_capacity(times.len() * 4);
            for t in times {
                time_bytes.extend_from_slice(&t.to_le_bytes());
            }
            let (time_min, time_max) = f32_slice_min_max(times);
            let time_accessor = writer.push_accessor(
                &time_bytes,
                times.len(),
                json::accessor::ComponentType::F32,
                json::accessor::Type::Scalar,
                Some(time_min),
                Some(time_max),
            );

            let value_accessor = writer.push_accessor(
                &value_bytes,
                value_count,
                json::accessor::ComponentType::F32,
                accessor_type,
                None,
                None,
            );

            let sampler_index = samplers.len() as u32;
            samplers.push(json::animation::Sampler {
                input: json::Index::new(time_accessor),
                output: json::Index::new(value_accessor),
                interpolation: Valid(interpolation),
                extensions: Default::default(),
                extras: Default::default(),
            });

            channels.push(json::animation::Channel {
                sampler: json::Index::new(sampler_index),
                target: json::animation::Target {
                    node: json::Index::new(target_node),
                    path: Valid(path),
                    extensions: Default::default(),
                    extras: Default::default(),
                },
                extensions: Default::default(),
                extras: Default::default(),
            });
        }

        animations.push(json::Animation {
            name: Some(clip.name.clone()),
            channels,
            samplers,
            extensions: Default::default(),
            extras: Default::default(),
        });
    }

    // ========================================================================
    // Assemble the container
    // ========================================================================

    writer.align();
    let bin = writer.buffer;

    let root = json::Root {
        accessors: writer.accessors,
        animations,
        asset: json::Asset {
            generator: Some(options.generator.clone()),
            version: "2.0".to_string(),
            ..Default::default()
        },
        buffers: vec![json::Buffer {
            byte_length: USize64::from(bin.len()),
            uri: None,
            name: None,
            extensions: Default::default(),
            extras: Default::default(),
        }],
        buffer_views: writer.views,
        materials: vec![material],
        meshes: vec![mesh],
        nodes,
        scene: Some(json::Index::new(0)),
        scenes: vec![json::Scene {
            name: Some("AvatarScene".to_string()),
            nodes: vec![json::Index::new(0), json::Index::new(mesh_node_index)],
            extensions: Default::default(),
            extras: Default::default(),
        }],
        skins: vec![skin],
        ..Default::default()
    };

    let json_string = json::serialize::to_string(&root)?;
    let mut json_chunk = json_string.into_bytes();
    // JSON chunks are padded with spaces
    while !json_chunk.len().is_multiple_of(4) {
        json_chunk.push(0x20);
    }

    let total_length = 12 + 8 + json_chunk.len() + 8 + bin.len();

    let mut glb: Vec<u8> = Vec::with_capacity(total_length);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total_length as u32).to_le_bytes());

    glb.extend_from_slice(&(json_chunk.len() as u32).to_le_bytes());
    glb.extend_from_slice(&0x4E4F_534Au32.to_le_bytes()); // 'JSON'
    glb.extend_from_slice(&json_chunk);

    glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    glb.extend_from_slice(&0x004E_4942u32.to_le_bytes()); // 'BIN\0'
    glb.extend_from_slice(&bin);

    if let Some(limit) = options.max_bytes
        && glb.len() > limit
    {
        return Err(ExportError::SizeLimit {
            size: glb.len(),
            limit,
        });
    }

    log::debug!(
        "exported avatar GLB: {} bytes ({} nodes, {} vertices, {} clips)",
        glb.len(),
        bone_count + 2,
        vertex_count,
        clips.len()
    );

    Ok(glb)
}

fn interpolation_of(data: &TrackData) -> InterpolationMode {
    match data {
        TrackData::Vector3(t) => t.interpolation,
        TrackData::Quaternion(t) => t.interpolation,
        TrackData::Scalar(t) => t.interpolation,
    }
}
