//! Rig Definition Tests
//!
//! Tests for:
//! - Bone table structure: count, uniqueness, single root, parent ordering
//! - Rest pose: world positions derived from local transforms
//! - Joint index lookups

use avakit::rig::{HUMANOID_BONES, Rig, bone};

// ============================================================================
// Structure
// ============================================================================

#[test]
fn rig_has_nine_bones() {
    let rig = Rig::humanoid();
    assert_eq!(rig.len(), 9);
}

#[test]
fn rig_bone_names_are_unique() {
    let rig = Rig::humanoid();
    for (i, spec) in rig.bones().iter().enumerate() {
        assert!(
            rig.bones()[..i].iter().all(|b| b.name != spec.name),
            "duplicate bone '{}'",
            spec.name
        );
    }
}

#[test]
fn rig_has_single_root() {
    let rig = Rig::humanoid();
    let roots: Vec<_> = rig.bones().iter().filter(|b| b.parent.is_none()).collect();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].name, bone::SPINE);
}

#[test]
fn rig_parents_declared_before_children() {
    let rig = Rig::humanoid();
    for (i, spec) in rig.bones().iter().enumerate() {
        if let Some(parent) = spec.parent {
            let parent_index = rig.index_of(parent).expect("parent exists");
            assert!(parent_index < i, "'{}' declared before parent", spec.name);
        }
    }
}

#[test]
fn rig_contains_expected_names() {
    let rig = Rig::humanoid();
    for name in [
        bone::SPINE,
        bone::CHEST,
        bone::HEAD,
        bone::LEFT_HAND,
        bone::RIGHT_HAND,
        bone::LEFT_LEG,
        bone::RIGHT_LEG,
        bone::LEFT_FOOT,
        bone::RIGHT_FOOT,
    ] {
        assert!(rig.contains(name), "rig should contain '{name}'");
    }
    assert!(!rig.contains("Tail"));
}

#[test]
fn rig_matches_static_table() {
    let rig = Rig::humanoid();
    assert_eq!(rig.bones().len(), HUMANOID_BONES.len());
    for (spec, expected) in rig.bones().iter().zip(HUMANOID_BONES.iter()) {
        assert_eq!(spec.name, expected.name);
    }
}

// ============================================================================
// Rest Pose
// ============================================================================

#[test]
fn rig_rest_world_positions_accumulate() {
    let rig = Rig::humanoid();

    // Head = Spine (0.9) + Chest (0.35) + Head (0.3)
    let head = rig.rest_world_translation(bone::HEAD);
    assert!((head.y - 1.55).abs() < 1e-5, "head at {head:?}");

    // Feet end up near the ground
    let foot = rig.rest_world_translation(bone::LEFT_FOOT);
    assert!((foot.y - 0.05).abs() < 1e-5, "foot at {foot:?}");
    assert!(foot.x > 0.0, "left foot on +X side");
}

#[test]
fn rig_hands_are_mirrored() {
    let rig = Rig::humanoid();
    let left = rig.rest_world_translation(bone::LEFT_HAND);
    let right = rig.rest_world_translation(bone::RIGHT_HAND);
    assert!((left.x + right.x).abs() < 1e-5);
    assert!((left.y - right.y).abs() < 1e-5);
}

#[test]
fn rig_root_world_equals_local() {
    let rig = Rig::humanoid();
    let spine_world = rig.rest_world_translation(bone::SPINE);
    let spine_local = rig.rest_local_translation(bone::SPINE);
    assert!((spine_world - spine_local).length() < 1e-6);
}

// ============================================================================
// Lookups
// ============================================================================

#[test]
fn rig_index_lookup_roundtrip() {
    let rig = Rig::humanoid();
    for (i, spec) in rig.bones().iter().enumerate() {
        assert_eq!(rig.index_of(spec.name), Some(i));
    }
    assert_eq!(rig.index_of("NoSuchBone"), None);
}

#[test]
fn rig_parent_index_follows_table() {
    let rig = Rig::humanoid();
    let chest = rig.index_of(bone::CHEST).unwrap();
    let spine = rig.index_of(bone::SPINE).unwrap();
    assert_eq!(rig.parent_index(chest), Some(spine));
    assert_eq!(rig.parent_index(spine), None);
}
