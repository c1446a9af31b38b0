//! Exporter Tests
//!
//! Tests for:
//! - GLB container shape: magic, version, chunk alignment, chunk tags
//! - Document structure via the gltf parser (nodes, skin, animations)
//! - Error cases: unknown bone reference, size limit

use avakit::animation::{
    AnimationClip, InterpolationMode, KeyframeTrack, TargetPath, Track, TrackData, TrackMeta,
};
use avakit::errors::ExportError;
use avakit::generator::{ExportOptions, bake_stance_clips, build_figure, export_avatar, generate_avatar};
use avakit::rig::Rig;
use glam::Quat;

fn generate() -> Vec<u8> {
    generate_avatar(&ExportOptions::default()).expect("generation should succeed")
}

// ============================================================================
// Container Shape
// ============================================================================

#[test]
fn glb_header_magic_and_version() {
    let glb = generate();
    assert_eq!(&glb[0..4], b"glTF");
    assert_eq!(u32::from_le_bytes(glb[4..8].try_into().unwrap()), 2);
}

#[test]
fn glb_declared_length_matches() {
    let glb = generate();
    let total = u32::from_le_bytes(glb[8..12].try_into().unwrap()) as usize;
    assert_eq!(total, glb.len());
}

#[test]
fn glb_chunks_are_aligned_and_tagged() {
    let glb = generate();

    let json_len = u32::from_le_bytes(glb[12..16].try_into().unwrap()) as usize;
    assert_eq!(json_len % 4, 0, "JSON chunk must be 4-byte aligned");
    let json_tag = u32::from_le_bytes(glb[16..20].try_into().unwrap());
    assert_eq!(json_tag, 0x4E4F_534A, "JSON chunk tag");

    let bin_offset = 20 + json_len;
    let bin_len =
        u32::from_le_bytes(glb[bin_offset..bin_offset + 4].try_into().unwrap()) as usize;
    assert_eq!(bin_len % 4, 0, "BIN chunk must be 4-byte aligned");
    let bin_tag =
        u32::from_le_bytes(glb[bin_offset + 4..bin_offset + 8].try_into().unwrap());
    assert_eq!(bin_tag, 0x004E_4942, "BIN chunk tag");
}

// ============================================================================
// Document Structure
// ============================================================================

#[test]
fn glb_parses_with_gltf_crate() {
    let glb = generate();
    let gltf = gltf::Gltf::from_slice(&glb).expect("conformant GLB");

    // Armature root + 9 bones + mesh node
    assert_eq!(gltf.nodes().count(), 11);
    assert_eq!(gltf.skins().count(), 1);
    assert_eq!(gltf.animations().count(), 3);
    assert_eq!(gltf.meshes().count(), 1);
}

#[test]
fn glb_skin_has_nine_named_joints() {
    let glb = generate();
    let gltf = gltf::Gltf::from_slice(&glb).unwrap();
    let skin = gltf.skins().next().unwrap();

    let names: Vec<&str> = skin.joints().map(|j| j.name().unwrap()).collect();
    assert_eq!(names.len(), 9);
    for expected in [
        "Head", "Chest", "Spine", "LeftHand", "RightHand", "LeftFoot", "RightFoot", "LeftLeg",
        "RightLeg",
    ] {
        assert!(names.contains(&expected), "missing joint '{expected}'");
    }
}

#[test]
fn glb_animation_names_match_stances() {
    let glb = generate();
    let gltf = gltf::Gltf::from_slice(&glb).unwrap();

    let names: Vec<&str> = gltf.animations().map(|a| a.name().unwrap()).collect();
    assert_eq!(names, vec!["Idle", "Action", "Victory"]);
}

#[test]
fn glb_root_node_is_not_a_joint() {
    let glb = generate();
    let gltf = gltf::Gltf::from_slice(&glb).unwrap();
    let skin = gltf.skins().next().unwrap();

    let joint_names: Vec<&str> = skin.joints().map(|j| j.name().unwrap()).collect();
    assert!(!joint_names.contains(&"Root"), "armature root must not be a joint");

    let node_names: Vec<&str> = gltf.nodes().filter_map(|n| n.name()).collect();
    assert!(node_names.contains(&"Root"));
}

#[test]
fn glb_mesh_primitive_is_skinned() {
    let glb = generate();
    let gltf = gltf::Gltf::from_slice(&glb).unwrap();

    let mesh_node = gltf
        .nodes()
        .find(|n| n.mesh().is_some())
        .expect("mesh node present");
    assert!(mesh_node.skin().is_some(), "mesh node must reference the skin");

    let mesh = mesh_node.mesh().unwrap();
    let primitive = mesh.primitives().next().unwrap();
    let semantics: Vec<String> = primitive
        .attributes()
        .map(|(semantic, _)| format!("{semantic:?}"))
        .collect();
    assert!(semantics.iter().any(|s| s.contains("Joints")));
    assert!(semantics.iter().any(|s| s.contains("Weights")));
}

// ============================================================================
// Error Cases
// ============================================================================

#[test]
fn export_rejects_unknown_bone_track() {
    let rig = Rig::humanoid();
    let figure = build_figure(&rig);

    let bad_clip = AnimationClip::new(
        "Idle".to_string(),
        vec![Track {
            meta: TrackMeta {
                node_name: "Tail".to_string(),
                target: TargetPath::Rotation,
            },
            data: TrackData::Quaternion(KeyframeTrack::new(
                vec![0.0, 1.0],
                vec![Quat::IDENTITY, Quat::IDENTITY],
                InterpolationMode::Linear,
            )),
        }],
    );

    let result = export_avatar(&figure, &rig, &[bad_clip], &ExportOptions::default());
    match result {
        Err(ExportError::UnknownBone { clip, bone }) => {
            assert_eq!(clip, "Idle");
            assert_eq!(bone, "Tail");
        }
        other => panic!("expected UnknownBone, got {other:?}"),
    }
}

#[test]
fn export_enforces_size_limit() {
    let rig = Rig::humanoid();
    let figure = build_figure(&rig);
    let clips = bake_stance_clips(&rig);

    let options = ExportOptions {
        max_bytes: Some(64),
        ..Default::default()
    };

    let result = export_avatar(&figure, &rig, &clips, &options);
    match result {
        Err(ExportError::SizeLimit { size, limit }) => {
            assert_eq!(limit, 64);
            assert!(size > limit);
        }
        other => panic!("expected SizeLimit, got {other:?}"),
    }
}

#[test]
fn export_without_clips_still_valid() {
    let rig = Rig::humanoid();
    let figure = build_figure(&rig);

    let glb = export_avatar(&figure, &rig, &[], &ExportOptions::default()).unwrap();
    let gltf = gltf::Gltf::from_slice(&glb).unwrap();
    assert_eq!(gltf.animations().count(), 0);
    assert_eq!(gltf.skins().count(), 1);
}
