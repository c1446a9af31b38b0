//! Procedural humanoid mesh builder.
//!
//! Builds the stylized avatar body (oversized head, slender limbs) from box
//! parts, each skinned to the rig with up to four bone influences per
//! vertex. Pure computation over fixed proportions; no error paths.

use glam::{Vec2, Vec3};

use crate::rig::{Rig, bone};

/// Maximum bone influences per vertex (glTF JOINTS_0/WEIGHTS_0 layout).
pub const MAX_INFLUENCES: usize = 4;

/// CPU-side skinned geometry, laid out for export.
#[derive(Debug, Clone, Default)]
pub struct Figure {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub joints: Vec<[u16; MAX_INFLUENCES]>,
    pub weights: Vec<[f32; MAX_INFLUENCES]>,
    pub indices: Vec<u32>,
}

impl Figure {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Appends an axis-aligned box part.
    ///
    /// 24 vertices (4 per face) with per-face normals and CCW winding;
    /// `weigh` assigns bone influences from the vertex's model-space
    /// position.
    fn push_box(
        &mut self,
        center: Vec3,
        half: Vec3,
        weigh: impl Fn(Vec3) -> ([u16; MAX_INFLUENCES], [f32; MAX_INFLUENCES]),
    ) {
        let (w, h, d) = (half.x, half.y, half.z);

        // Format: [x, y, z], offsets from the part center
        let corners = [
            // Front face (+Z)
            [-w, -h, d],
            [w, -h, d],
            [w, h, d],
            [-w, h, d],
            // Back face (-Z)
            [-w, -h, -d],
            [-w, h, -d],
            [w, h, -d],
            [w, -h, -d],
            // Top face (+Y)
            [-w, h, -d],
            [-w, h, d],
            [w, h, d],
            [w, h, -d],
            // Bottom face (-Y)
            [-w, -h, -d],
            [w, -h, -d],
            [w, -h, d],
            [-w, -h, d],
            // Right face (+X)
            [w, -h, -d],
            [w, h, -d],
            [w, h, d],
            [w, -h, d],
            // Left face (-X)
            [-w, -h, -d],
            [-w, -h, d],
            [-w, h, d],
            [-w, h, -d],
        ];

        // All 4 vertices of each face share the same normal
        let face_normals = [
            Vec3::Z,
            Vec3::NEG_Z,
            Vec3::Y,
            Vec3::NEG_Y,
            Vec3::X,
            Vec3::NEG_X,
        ];

        // Standard 0–1 UV range per face
        let face_uvs = [
            [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]],
            [[1.0, 1.0], [1.0, 0.0], [0.0, 0.0], [0.0, 1.0]],
            [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]],
            [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]],
            [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]],
            [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]],
        ];

        let base = self.positions.len() as u32;

        for (i, corner) in corners.iter().enumerate() {
            let position = center + Vec3::from_array(*corner);
            let face = i / 4;

            self.positions.push(position);
            self.normals.push(face_normals[face]);
            self.uvs.push(Vec2::from_array(face_uvs[face][i % 4]));

            let (joints, weights) = weigh(position);
            self.joints.push(joints);
            self.weights.push(weights);
        }

        // 2 triangles per face, CCW winding
        for face in 0..6u32 {
            let f = base + face * 4;
            self.indices
                .extend_from_slice(&[f, f + 1, f + 2, f, f + 2, f + 3]);
        }
    }
}

/// Rigid binding: every vertex of the part follows one bone.
fn rigid(joint: u16) -> impl Fn(Vec3) -> ([u16; MAX_INFLUENCES], [f32; MAX_INFLUENCES]) {
    move |_| ([joint, 0, 0, 0], [1.0, 0.0, 0.0, 0.0])
}

/// Linear blend between two bones along one axis: at `from_at` the vertex
/// follows `from` entirely, at `to_at` it follows `to`.
fn blend(
    from: u16,
    to: u16,
    axis: usize,
    from_at: f32,
    to_at: f32,
) -> impl Fn(Vec3) -> ([u16; MAX_INFLUENCES], [f32; MAX_INFLUENCES]) {
    move |position| {
        let v = position[axis];
        let t = ((v - from_at) / (to_at - from_at)).clamp(0.0, 1.0);
        ([from, to, 0, 0], [1.0 - t, t, 0.0, 0.0])
    }
}

/// Builds the avatar body mesh against `rig`.
///
/// Every vertex ends up with influences summing to 1.0 and joint indices
/// valid for the rig's joint order.
#[must_use]
pub fn build_figure(rig: &Rig) -> Figure {
    // Missing bones are a programmer error in the rig table; fail fast
    let joint = |name: &str| {
        rig.index_of(name)
            .unwrap_or_else(|| panic!("rig has no bone named '{name}'")) as u16
    };
    let spine = joint(bone::SPINE);
    let chest = joint(bone::CHEST);
    let head = joint(bone::HEAD);
    let left_hand = joint(bone::LEFT_HAND);
    let right_hand = joint(bone::RIGHT_HAND);
    let left_leg = joint(bone::LEFT_LEG);
    let right_leg = joint(bone::RIGHT_LEG);
    let left_foot = joint(bone::LEFT_FOOT);
    let right_foot = joint(bone::RIGHT_FOOT);

    let head_pos = rig.rest_world_translation(bone::HEAD);
    let spine_pos = rig.rest_world_translation(bone::SPINE);
    let chest_pos = rig.rest_world_translation(bone::CHEST);
    let left_hand_pos = rig.rest_world_translation(bone::LEFT_HAND);
    let left_leg_pos = rig.rest_world_translation(bone::LEFT_LEG);
    let left_foot_pos = rig.rest_world_translation(bone::LEFT_FOOT);

    let mut figure = Figure::default();

    // Oversized head, slightly above the head bone pivot
    figure.push_box(
        head_pos + Vec3::new(0.0, 0.07, 0.0),
        Vec3::new(0.17, 0.17, 0.155),
        rigid(head),
    );

    // Torso: vertical Spine↔Chest gradient between the two pivots
    let torso_center = (spine_pos + chest_pos) / 2.0;
    figure.push_box(
        torso_center,
        Vec3::new(0.145, 0.215, 0.095),
        blend(spine, chest, 1, spine_pos.y, chest_pos.y),
    );

    // Arms: the rig has no elbow bones, so each arm blends Chest→Hand
    // along its length
    let arm_center_y = left_hand_pos.y + 0.01;
    figure.push_box(
        Vec3::new(0.30, arm_center_y, 0.0),
        Vec3::new(0.145, 0.048, 0.048),
        blend(chest, left_hand, 0, 0.155, left_hand_pos.x),
    );
    figure.push_box(
        Vec3::new(-0.30, arm_center_y, 0.0),
        Vec3::new(0.145, 0.048, 0.048),
        blend(chest, right_hand, 0, -0.155, -left_hand_pos.x),
    );

    // Legs span hip to ankle: rigid to the leg bone down to the knee
    // region, then a short blend into the foot near the ankle
    let leg_center_y = (spine_pos.y + left_foot_pos.y) / 2.0;
    figure.push_box(
        Vec3::new(left_leg_pos.x, leg_center_y, 0.0),
        Vec3::new(0.058, 0.40, 0.058),
        blend(left_leg, left_foot, 1, 0.35, 0.10),
    );
    figure.push_box(
        Vec3::new(-left_leg_pos.x, leg_center_y, 0.0),
        Vec3::new(0.058, 0.40, 0.058),
        blend(right_leg, right_foot, 1, 0.35, 0.10),
    );

    // Feet, extended forward
    figure.push_box(
        Vec3::new(left_foot_pos.x, 0.045, 0.09),
        Vec3::new(0.062, 0.042, 0.13),
        rigid(left_foot),
    );
    figure.push_box(
        Vec3::new(-left_foot_pos.x, 0.045, 0.09),
        Vec3::new(0.062, 0.042, 0.13),
        rigid(right_foot),
    );

    figure
}
