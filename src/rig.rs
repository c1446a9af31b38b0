//! Humanoid rig definition.
//!
//! The avatar generator works against one fixed, named bone hierarchy. The
//! table here is the single source of truth: the mesh builder weights
//! vertices against it, the clip baker targets its bone names, and the
//! exporter emits it as the glTF skin. The `Root` node that parents the
//! hierarchy in the exported scene is an armature container, not a joint,
//! and is deliberately absent from this table.

use glam::{Affine3A, Quat, Vec3};

/// Canonical bone names.
///
/// Wardrobe catalog entries and stance clips refer to bones by these names;
/// using the constants keeps typos out of static data.
pub mod bone {
    pub const SPINE: &str = "Spine";
    pub const CHEST: &str = "Chest";
    pub const HEAD: &str = "Head";
    pub const LEFT_HAND: &str = "LeftHand";
    pub const RIGHT_HAND: &str = "RightHand";
    pub const LEFT_LEG: &str = "LeftLeg";
    pub const RIGHT_LEG: &str = "RightLeg";
    pub const LEFT_FOOT: &str = "LeftFoot";
    pub const RIGHT_FOOT: &str = "RightFoot";
}

/// Name of the non-joint armature node that parents the bone hierarchy in
/// the exported scene.
pub const ROOT_NODE_NAME: &str = "Root";

/// One bone in the rest pose: name, parent, local TRS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneSpec {
    pub name: &'static str,
    /// `None` for the root bone
    pub parent: Option<&'static str>,
    pub rest_translation: Vec3,
    pub rest_rotation: Quat,
    pub rest_scale: Vec3,
}

impl BoneSpec {
    const fn new(name: &'static str, parent: Option<&'static str>, translation: Vec3) -> Self {
        Self {
            name,
            parent,
            rest_translation: translation,
            rest_rotation: Quat::IDENTITY,
            rest_scale: Vec3::ONE,
        }
    }

    /// Local rest transform as an affine matrix.
    #[must_use]
    pub fn local_matrix(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(
            self.rest_scale,
            self.rest_rotation,
            self.rest_translation,
        )
    }
}

/// Rest-pose bone table.
///
/// Order is significant: a bone's index here is its joint index in the
/// exported skin, and parents always precede children.
pub const HUMANOID_BONES: [BoneSpec; 9] = [
    BoneSpec::new(bone::SPINE, None, Vec3::new(0.0, 0.9, 0.0)),
    BoneSpec::new(bone::CHEST, Some(bone::SPINE), Vec3::new(0.0, 0.35, 0.0)),
    BoneSpec::new(bone::HEAD, Some(bone::CHEST), Vec3::new(0.0, 0.3, 0.0)),
    BoneSpec::new(bone::LEFT_HAND, Some(bone::CHEST), Vec3::new(0.42, -0.05, 0.0)),
    BoneSpec::new(bone::RIGHT_HAND, Some(bone::CHEST), Vec3::new(-0.42, -0.05, 0.0)),
    BoneSpec::new(bone::LEFT_LEG, Some(bone::SPINE), Vec3::new(0.12, -0.45, 0.0)),
    BoneSpec::new(bone::RIGHT_LEG, Some(bone::SPINE), Vec3::new(-0.12, -0.45, 0.0)),
    BoneSpec::new(bone::LEFT_FOOT, Some(bone::LEFT_LEG), Vec3::new(0.0, -0.4, 0.04)),
    BoneSpec::new(bone::RIGHT_FOOT, Some(bone::RIGHT_LEG), Vec3::new(0.0, -0.4, 0.04)),
];

/// The fixed humanoid rig.
///
/// Immutable once constructed; the generator embeds it in the exported
/// asset and the loader reconstructs an equivalent skeleton from the skin.
#[derive(Debug, Clone)]
pub struct Rig {
    bones: Vec<BoneSpec>,
}

impl Rig {
    /// The standard humanoid rig used by the avatar generator.
    #[must_use]
    pub fn humanoid() -> Self {
        let rig = Self {
            bones: HUMANOID_BONES.to_vec(),
        };
        rig.validate();
        rig
    }

    /// Bones in joint-index order.
    #[must_use]
    pub fn bones(&self) -> &[BoneSpec] {
        &self.bones
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Joint index of `name`, if the rig has such a bone.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    #[must_use]
    pub fn parent_index(&self, index: usize) -> Option<usize> {
        let parent = self.bones.get(index)?.parent?;
        self.index_of(parent)
    }

    /// Rest-pose world transform of the bone at `index` (the armature root
    /// sits at the origin, so "world" here is model space).
    #[must_use]
    pub fn rest_world_matrix(&self, index: usize) -> Affine3A {
        let mut matrix = self.bones[index].local_matrix();
        let mut current = self.parent_index(index);
        while let Some(parent) = current {
            matrix = self.bones[parent].local_matrix() * matrix;
            current = self.parent_index(parent);
        }
        matrix
    }

    /// Rest-pose world position of the named bone.
    ///
    /// Panics if the bone does not exist; the builder and baker only ask
    /// for bones out of this table.
    #[must_use]
    pub fn rest_world_translation(&self, name: &str) -> Vec3 {
        let index = self
            .index_of(name)
            .unwrap_or_else(|| panic!("rig has no bone named '{name}'"));
        self.rest_world_matrix(index).translation.into()
    }

    /// Local rest translation of the named bone (relative to its parent).
    #[must_use]
    pub fn rest_local_translation(&self, name: &str) -> Vec3 {
        let index = self
            .index_of(name)
            .unwrap_or_else(|| panic!("rig has no bone named '{name}'"));
        self.bones[index].rest_translation
    }

    /// Structural invariants: unique names, exactly one root, every parent
    /// present and declared before its children. Violations are programmer
    /// errors in the bone table, so this asserts rather than returning.
    fn validate(&self) {
        let mut roots = 0;
        for (i, spec) in self.bones.iter().enumerate() {
            assert!(
                self.bones[..i].iter().all(|b| b.name != spec.name),
                "duplicate bone name '{}'",
                spec.name
            );
            match spec.parent {
                None => roots += 1,
                Some(parent) => {
                    let parent_index = self
                        .index_of(parent)
                        .unwrap_or_else(|| panic!("bone '{}' has unknown parent '{parent}'", spec.name));
                    assert!(
                        parent_index < i,
                        "bone '{}' is declared before its parent '{parent}'",
                        spec.name
                    );
                }
            }
        }
        assert_eq!(roots, 1, "rig must have exactly one root bone");
    }
}

impl Default for Rig {
    fn default() -> Self {
        Self::humanoid()
    }
}
