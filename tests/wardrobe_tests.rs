//! Wardrobe Tests
//!
//! Tests for:
//! - Attachment resolver: primary/fallback order, explicit failure
//! - Catalog serde round-trip and builtin entries
//! - EquipmentRig: idempotent apply, per-item failure isolation, teardown
//! - End-to-end scenario B: two equipped slots, one empty

use rustc_hash::FxHashSet;

use avakit::assets::{GlbLoader, MemoryAssetProvider};
use avakit::errors::AttachmentError;
use avakit::generator::{ExportOptions, generate_avatar};
use avakit::rig::bone;
use avakit::scene::Scene;
use avakit::wardrobe::{
    EquipmentCatalog, EquipmentMapping, EquipmentRig, EquipmentSlot, EquippedLook, resolve_bone,
};

fn bone_set(names: &[&str]) -> FxHashSet<String> {
    names.iter().map(ToString::to_string).collect()
}

fn mapping(item_id: &str, primary: &str, fallbacks: &[&str]) -> EquipmentMapping {
    EquipmentMapping {
        item_id: item_id.to_string(),
        asset_path: format!("wardrobe/{item_id}.glb"),
        slot: EquipmentSlot::Accessories,
        attachment_bone: primary.to_string(),
        fallback_bones: fallbacks.iter().map(ToString::to_string).collect(),
        offset: [0.0; 3],
        scale: None,
    }
}

/// Minimal equipment asset: a one-node glTF scene (no buffers needed).
fn prop_asset(name: &str) -> Vec<u8> {
    serde_json::json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "name": name, "nodes": [0] }],
        "nodes": [{ "name": name }]
    })
    .to_string()
    .into_bytes()
}

/// A loaded avatar plus a provider serving assets for the builtin catalog.
fn avatar_fixture() -> (Scene, avakit::assets::LoadedModel, MemoryAssetProvider) {
    let glb = generate_avatar(&ExportOptions::default()).unwrap();
    let mut scene = Scene::new();
    let model = GlbLoader::load_slice(&glb, &mut scene).unwrap();

    let mut provider = MemoryAssetProvider::new();
    for entry in EquipmentCatalog::builtin().iter() {
        provider.insert(&entry.asset_path, prop_asset(&entry.item_id));
    }

    (scene, model, provider)
}

// ============================================================================
// Resolver Correctness
// ============================================================================

#[test]
fn resolver_prefers_primary_bone() {
    let loaded = bone_set(&["Head", "RightHand", "Spine"]);
    let m = mapping("item", "RightHand", &["RightArm", "Spine"]);
    assert_eq!(resolve_bone(&loaded, &m).unwrap(), "RightHand");
}

#[test]
fn resolver_walks_fallback_chain_in_order() {
    // Primary and first fallback missing → second fallback wins
    let loaded = bone_set(&["Head", "Spine"]);
    let m = mapping("item", "RightHand", &["RightArm", "Spine"]);
    assert_eq!(resolve_bone(&loaded, &m).unwrap(), "Spine");
}

#[test]
fn resolver_fails_when_nothing_matches() {
    let loaded = bone_set(&["Head"]);
    let m = mapping("item", "RightHand", &["RightArm", "Spine"]);

    let err = resolve_bone(&loaded, &m).unwrap_err();
    assert_eq!(err.item_id, "item");
    assert_eq!(err.candidates, vec!["RightHand", "RightArm", "Spine"]);
}

#[test]
fn resolver_without_fallbacks() {
    let loaded = bone_set(&["Spine"]);
    let m = mapping("item", "Spine", &[]);
    assert_eq!(resolve_bone(&loaded, &m).unwrap(), "Spine");

    let empty = bone_set(&[]);
    assert!(resolve_bone(&empty, &m).is_err());
}

// ============================================================================
// Catalog
// ============================================================================

#[test]
fn catalog_builtin_entries_reference_rig_bones() {
    let catalog = EquipmentCatalog::builtin();
    assert!(!catalog.is_empty());

    let rig = avakit::rig::Rig::humanoid();
    for entry in catalog.iter() {
        assert!(rig.contains(&entry.attachment_bone), "{}", entry.item_id);
        for fallback in &entry.fallback_bones {
            assert!(rig.contains(fallback), "{}: {fallback}", entry.item_id);
        }
    }
}

#[test]
fn catalog_json_roundtrip() {
    let m = EquipmentMapping {
        item_id: "shoe-x".to_string(),
        asset_path: "wardrobe/shoes/x.glb".to_string(),
        slot: EquipmentSlot::Shoes,
        attachment_bone: bone::RIGHT_FOOT.to_string(),
        fallback_bones: vec![bone::LEFT_FOOT.to_string()],
        offset: [0.0, 0.02, 0.0],
        scale: Some([1.2, 1.2, 1.2]),
    };

    let json = serde_json::to_string(&vec![m.clone()]).unwrap();
    assert!(json.contains("\"shoes\""), "slot serializes snake_case: {json}");

    let catalog = EquipmentCatalog::from_json(&json).unwrap();
    assert_eq!(catalog.get("shoe-x"), Some(&m));
}

#[test]
fn mapping_scale_defaults_to_identity() {
    let m = mapping("item", "Head", &[]);
    assert_eq!(m.scale_vec(), glam::Vec3::ONE);
}

#[test]
fn look_serde_skips_empty_slots() {
    let look = EquippedLook {
        shoes: Some("shoe-1".to_string()),
        ..Default::default()
    };
    let json = serde_json::to_string(&look).unwrap();
    assert!(json.contains("shoe-1"));
    assert!(!json.contains("accessories"));

    let parsed: EquippedLook = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, look);
}

// ============================================================================
// Attachment Runtime
// ============================================================================

#[test]
fn apply_look_scenario_b_two_slots_attach() {
    let (mut scene, model, provider) = avatar_fixture();
    let catalog = EquipmentCatalog::builtin();
    let mut rig = EquipmentRig::new();

    let look = EquippedLook {
        shoes: Some("shoe-1".to_string()),
        accessories: None,
        outfits: Some("outfit-3".to_string()),
    };

    let report = rig.apply_look(
        &mut scene,
        model.skeleton.unwrap(),
        &look,
        &catalog,
        &provider,
    );

    assert!(report.is_clean(), "failures: {:?}", report.failures);
    assert_eq!(rig.len(), 2, "exactly two resolved attachments");
    assert!(rig.attachment(EquipmentSlot::Shoes).is_some());
    assert!(rig.attachment(EquipmentSlot::Accessories).is_none());
    assert!(rig.attachment(EquipmentSlot::Outfits).is_some());
}

#[test]
fn apply_look_parents_equipment_under_resolved_bone() {
    let (mut scene, model, provider) = avatar_fixture();
    let catalog = EquipmentCatalog::builtin();
    let mut rig = EquipmentRig::new();

    let look = EquippedLook {
        accessories: Some("visor-1".to_string()),
        ..Default::default()
    };
    let report = rig.apply_look(
        &mut scene,
        model.skeleton.unwrap(),
        &look,
        &catalog,
        &provider,
    );
    assert!(report.is_clean());

    let attachment = rig.attachment(EquipmentSlot::Accessories).unwrap();
    assert_eq!(attachment.resolved_bone, "Head");

    let skeleton = scene.get_skeleton(model.skeleton.unwrap()).unwrap();
    let head = skeleton.bone_by_name("Head").unwrap();
    assert_eq!(scene.get_node(attachment.node).unwrap().parent(), Some(head));

    // Configured offset lands on the equipment root's local transform
    let node = scene.get_node(attachment.node).unwrap();
    assert!((node.transform.position.y - 0.06).abs() < 1e-6);
    assert!((node.transform.position.z - 0.13).abs() < 1e-6);
}

#[test]
fn apply_look_is_idempotent() {
    let (mut scene, model, provider) = avatar_fixture();
    let catalog = EquipmentCatalog::builtin();
    let mut rig = EquipmentRig::new();

    let look = EquippedLook {
        shoes: Some("shoe-1".to_string()),
        ..Default::default()
    };

    rig.apply_look(&mut scene, model.skeleton.unwrap(), &look, &catalog, &provider);
    let first_node = rig.attachment(EquipmentSlot::Shoes).unwrap().node;

    rig.apply_look(&mut scene, model.skeleton.unwrap(), &look, &catalog, &provider);
    let second_node = rig.attachment(EquipmentSlot::Shoes).unwrap().node;

    assert_eq!(first_node, second_node, "unchanged slot keeps its node");
    assert_eq!(rig.len(), 1);

    // Exactly one equipment child under the mount bone
    let skeleton = scene.get_skeleton(model.skeleton.unwrap()).unwrap();
    let foot = skeleton.bone_by_name("RightFoot").unwrap();
    assert_eq!(scene.get_node(foot).unwrap().children().len(), 1);
}

#[test]
fn apply_look_replaces_changed_item() {
    let (mut scene, model, provider) = avatar_fixture();
    let catalog = EquipmentCatalog::builtin();
    let mut rig = EquipmentRig::new();
    let skeleton_key = model.skeleton.unwrap();

    let look1 = EquippedLook {
        shoes: Some("shoe-1".to_string()),
        ..Default::default()
    };
    rig.apply_look(&mut scene, skeleton_key, &look1, &catalog, &provider);
    let old_node = rig.attachment(EquipmentSlot::Shoes).unwrap().node;

    let look2 = EquippedLook {
        shoes: Some("shoe-2".to_string()),
        ..Default::default()
    };
    rig.apply_look(&mut scene, skeleton_key, &look2, &catalog, &provider);

    assert!(scene.get_node(old_node).is_none(), "old subtree removed");
    assert_eq!(rig.attachment(EquipmentSlot::Shoes).unwrap().item_id, "shoe-2");

    let skeleton = scene.get_skeleton(skeleton_key).unwrap();
    let foot = skeleton.bone_by_name("RightFoot").unwrap();
    assert_eq!(scene.get_node(foot).unwrap().children().len(), 1, "no duplicates");
}

#[test]
fn apply_look_removes_cleared_slot() {
    let (mut scene, model, provider) = avatar_fixture();
    let catalog = EquipmentCatalog::builtin();
    let mut rig = EquipmentRig::new();
    let skeleton_key = model.skeleton.unwrap();

    let look = EquippedLook {
        outfits: Some("outfit-1".to_string()),
        ..Default::default()
    };
    rig.apply_look(&mut scene, skeleton_key, &look, &catalog, &provider);
    let node = rig.attachment(EquipmentSlot::Outfits).unwrap().node;

    rig.apply_look(&mut scene, skeleton_key, &EquippedLook::default(), &catalog, &provider);
    assert!(rig.is_empty());
    assert!(scene.get_node(node).is_none());
}

#[test]
fn apply_look_failure_is_isolated_per_item() {
    let (mut scene, model, provider) = avatar_fixture();
    let mut catalog = EquipmentCatalog::builtin();

    // An accessory whose bones exist on no skeleton
    catalog.insert(EquipmentMapping {
        item_id: "ghost-hat".to_string(),
        asset_path: "wardrobe/ghost.glb".to_string(),
        slot: EquipmentSlot::Accessories,
        attachment_bone: "Skull".to_string(),
        fallback_bones: vec!["Crown".to_string()],
        offset: [0.0; 3],
        scale: None,
    });

    let mut rig = EquipmentRig::new();
    let look = EquippedLook {
        shoes: Some("shoe-1".to_string()),
        accessories: Some("ghost-hat".to_string()),
        outfits: Some("outfit-3".to_string()),
    };

    let report = rig.apply_look(
        &mut scene,
        model.skeleton.unwrap(),
        &look,
        &catalog,
        &provider,
    );

    // The failing accessory never blocks the other two slots
    assert_eq!(rig.len(), 2);
    assert!(rig.attachment(EquipmentSlot::Shoes).is_some());
    assert!(rig.attachment(EquipmentSlot::Outfits).is_some());

    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.item_id, "ghost-hat");
    match &failure.error {
        AttachmentError::Resolution(err) => {
            assert_eq!(err.candidates, vec!["Skull", "Crown"]);
        }
        other => panic!("expected resolution failure, got {other:?}"),
    }
}

#[test]
fn apply_look_reports_unknown_item() {
    let (mut scene, model, provider) = avatar_fixture();
    let catalog = EquipmentCatalog::builtin();
    let mut rig = EquipmentRig::new();

    let look = EquippedLook {
        shoes: Some("not-in-catalog".to_string()),
        ..Default::default()
    };
    let report = rig.apply_look(
        &mut scene,
        model.skeleton.unwrap(),
        &look,
        &catalog,
        &provider,
    );

    assert!(rig.is_empty());
    assert!(matches!(
        report.failures[0].error,
        AttachmentError::UnknownItem(_)
    ));
}

#[test]
fn clear_removes_all_equipment_nodes() {
    let (mut scene, model, provider) = avatar_fixture();
    let catalog = EquipmentCatalog::builtin();
    let mut rig = EquipmentRig::new();

    let look = EquippedLook {
        shoes: Some("shoe-1".to_string()),
        accessories: Some("halo-1".to_string()),
        outfits: None,
    };
    rig.apply_look(&mut scene, model.skeleton.unwrap(), &look, &catalog, &provider);
    let nodes: Vec<_> = rig.attachments().map(|(_, a)| a.node).collect();
    assert_eq!(nodes.len(), 2);

    rig.clear(&mut scene);
    assert!(rig.is_empty());
    for node in nodes {
        assert!(scene.get_node(node).is_none());
    }
}
