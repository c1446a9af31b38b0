//! Export → Load Round-Trip Tests
//!
//! The exporter's key correctness property: a freshly generated asset,
//! loaded back through the scene loader, reports exactly the rig's bone
//! names and the three stance clip names.

use avakit::assets::GlbLoader;
use avakit::diagnostics::inspect;
use avakit::generator::{ExportOptions, generate_avatar};
use avakit::rig::Rig;
use avakit::scene::Scene;

fn load_generated() -> (Scene, avakit::assets::LoadedModel) {
    let glb = generate_avatar(&ExportOptions::default()).unwrap();
    let mut scene = Scene::new();
    let model = GlbLoader::load_slice(&glb, &mut scene).unwrap();
    (scene, model)
}

// ============================================================================
// End-to-End Scenario A: generate → load → inspect
// ============================================================================

#[test]
fn roundtrip_diagnostics_report_scenario() {
    let (scene, model) = load_generated();
    let report = inspect(&scene, &model);

    assert!(report.model_loaded);
    assert_eq!(report.detected_bones.len(), 9);
    for expected in [
        "Head", "Chest", "Spine", "LeftHand", "RightHand", "LeftFoot", "RightFoot", "LeftLeg",
        "RightLeg",
    ] {
        assert!(
            report.detected_bones.iter().any(|b| b == expected),
            "missing bone '{expected}' in {:?}",
            report.detected_bones
        );
    }
    assert_eq!(report.animation_clips, vec!["Idle", "Action", "Victory"]);
}

#[test]
fn roundtrip_bone_names_match_rig_exactly() {
    let (scene, model) = load_generated();
    let skeleton = scene.get_skeleton(model.skeleton.unwrap()).unwrap();

    let rig = Rig::humanoid();
    let mut expected: Vec<&str> = rig.bones().iter().map(|b| b.name).collect();
    let mut actual: Vec<&str> = skeleton.bone_names().iter().map(String::as_str).collect();
    expected.sort_unstable();
    actual.sort_unstable();
    assert_eq!(actual, expected);
}

#[test]
fn roundtrip_root_transform_is_identity() {
    let (scene, model) = load_generated();
    let report = inspect(&scene, &model);

    let orientation = report.orientation.unwrap();
    assert!(orientation.iter().all(|v| v.abs() < 1e-5));
    let scale = report.scale.unwrap();
    assert!(scale.iter().all(|v| (v - 1.0).abs() < 1e-5));
}

// ============================================================================
// Skeleton Reconstruction
// ============================================================================

#[test]
fn roundtrip_skeleton_root_is_spine() {
    let (scene, model) = load_generated();
    let skeleton = scene.get_skeleton(model.skeleton.unwrap()).unwrap();

    let root = skeleton.root_bone().unwrap();
    assert_eq!(scene.get_node(root).unwrap().name, "Spine");
}

#[test]
fn roundtrip_bone_hierarchy_preserved() {
    let (scene, model) = load_generated();
    let skeleton = scene.get_skeleton(model.skeleton.unwrap()).unwrap();

    let head = skeleton.bone_by_name("Head").unwrap();
    let chest = skeleton.bone_by_name("Chest").unwrap();
    let spine = skeleton.bone_by_name("Spine").unwrap();

    assert_eq!(scene.get_node(head).unwrap().parent(), Some(chest));
    assert_eq!(scene.get_node(chest).unwrap().parent(), Some(spine));
}

#[test]
fn roundtrip_rest_pose_world_positions() {
    let (mut scene, model) = load_generated();
    scene.update_matrix_world();

    let skeleton = scene.get_skeleton(model.skeleton.unwrap()).unwrap();
    let head = skeleton.bone_by_name("Head").unwrap();
    let world_y = scene.get_node(head).unwrap().world_matrix().translation.y;
    assert!((world_y - 1.55).abs() < 1e-4, "head world y = {world_y}");
}

#[test]
fn roundtrip_joints_are_flagged() {
    let (scene, model) = load_generated();
    let skeleton = scene.get_skeleton(model.skeleton.unwrap()).unwrap();

    for &bone in &skeleton.bones {
        assert!(scene.get_node(bone).unwrap().is_joint);
    }
    // The armature root is not a joint
    let root = scene.find_by_name(model.root, "Root").unwrap();
    assert!(!scene.get_node(root).unwrap().is_joint);
}

// ============================================================================
// Clip Reconstruction
// ============================================================================

#[test]
fn roundtrip_clips_keep_durations() {
    let (_, model) = load_generated();

    let idle = model.clip_by_name("Idle").unwrap();
    assert!((idle.duration - 3.0).abs() < 1e-4);
    let action = model.clip_by_name("Action").unwrap();
    assert!((action.duration - 1.0).abs() < 1e-4);
    let victory = model.clip_by_name("Victory").unwrap();
    assert!((victory.duration - 2.0).abs() < 1e-4);
}

#[test]
fn roundtrip_clip_tracks_target_bone_names() {
    let (_, model) = load_generated();
    let rig = Rig::humanoid();

    for clip in &model.clips {
        assert!(!clip.tracks.is_empty());
        for track in &clip.tracks {
            assert!(
                rig.contains(&track.meta.node_name),
                "loaded track targets '{}'",
                track.meta.node_name
            );
        }
    }
}
