//! Equipment catalog types.
//!
//! Static wardrobe data: which asset each item uses, which bone it mounts
//! to, the fallback chain for skeletons with different naming, and the
//! local offset/scale applied after attachment. Read-only at runtime.

use glam::Vec3;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::rig::bone;

/// Wardrobe slots an avatar can equip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlot {
    Shoes,
    Accessories,
    Outfits,
}

impl EquipmentSlot {
    pub const ALL: [EquipmentSlot; 3] = [
        EquipmentSlot::Shoes,
        EquipmentSlot::Accessories,
        EquipmentSlot::Outfits,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EquipmentSlot::Shoes => "shoes",
            EquipmentSlot::Accessories => "accessories",
            EquipmentSlot::Outfits => "outfits",
        }
    }
}

/// One wardrobe item's attachment recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentMapping {
    /// Stable item id (the marketplace's identifier)
    pub item_id: String,
    /// Asset path, resolved by the host's asset layer
    pub asset_path: String,
    /// Which slot this item occupies
    pub slot: EquipmentSlot,
    /// Preferred mount bone
    pub attachment_bone: String,
    /// Alternate bone names tried in order when the primary is absent
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallback_bones: Vec<String>,
    /// Local translation applied to the equipment root after attachment
    #[serde(default)]
    pub offset: [f32; 3],
    /// Local scale; identity when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<[f32; 3]>,
}

impl EquipmentMapping {
    #[must_use]
    pub fn offset_vec(&self) -> Vec3 {
        Vec3::from_array(self.offset)
    }

    #[must_use]
    pub fn scale_vec(&self) -> Vec3 {
        self.scale.map_or(Vec3::ONE, Vec3::from_array)
    }

    /// Mount candidates in resolution order: primary first, then fallbacks.
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.attachment_bone.as_str())
            .chain(self.fallback_bones.iter().map(String::as_str))
    }
}

/// The wearer's current selection, one optional item per slot.
///
/// Persisted by the host (profile or local storage); this crate only
/// consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EquippedLook {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shoes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessories: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outfits: Option<String>,
}

impl EquippedLook {
    #[must_use]
    pub fn item_for(&self, slot: EquipmentSlot) -> Option<&String> {
        match slot {
            EquipmentSlot::Shoes => self.shoes.as_ref(),
            EquipmentSlot::Accessories => self.accessories.as_ref(),
            EquipmentSlot::Outfits => self.outfits.as_ref(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        EquipmentSlot::ALL.iter().all(|&s| self.item_for(s).is_none())
    }
}

/// Item id → mapping table.
#[derive(Debug, Clone, Default)]
pub struct EquipmentCatalog {
    entries: FxHashMap<String, EquipmentMapping>,
}

impl EquipmentCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mapping: EquipmentMapping) {
        self.entries.insert(mapping.item_id.clone(), mapping);
    }

    #[must_use]
    pub fn get(&self, item_id: &str) -> Option<&EquipmentMapping> {
        self.entries.get(item_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EquipmentMapping> {
        self.entries.values()
    }

    /// Loads a catalog from a JSON array of [`EquipmentMapping`]s.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mappings: Vec<EquipmentMapping> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for mapping in mappings {
            catalog.insert(mapping);
        }
        Ok(catalog)
    }

    /// The shipped wardrobe.
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::new();

        catalog.insert(EquipmentMapping {
            item_id: "shoe-1".to_string(),
            asset_path: "wardrobe/shoes/velocity_runners.glb".to_string(),
            slot: EquipmentSlot::Shoes,
            attachment_bone: bone::RIGHT_FOOT.to_string(),
            fallback_bones: vec![bone::LEFT_FOOT.to_string(), bone::RIGHT_LEG.to_string()],
            offset: [0.0, 0.02, 0.04],
            scale: None,
        });
        catalog.insert(EquipmentMapping {
            item_id: "shoe-2".to_string(),
            asset_path: "wardrobe/shoes/aero_glides.glb".to_string(),
            slot: EquipmentSlot::Shoes,
            attachment_bone: bone::RIGHT_FOOT.to_string(),
            fallback_bones: vec![bone::LEFT_FOOT.to_string(), bone::RIGHT_LEG.to_string()],
            offset: [0.0, 0.02, 0.04],
            scale: Some([1.1, 1.1, 1.1]),
        });
        catalog.insert(EquipmentMapping {
            item_id: "visor-1".to_string(),
            asset_path: "wardrobe/accessories/neon_visor.glb".to_string(),
            slot: EquipmentSlot::Accessories,
            attachment_bone: bone::HEAD.to_string(),
            fallback_bones: vec![bone::CHEST.to_string(), bone::SPINE.to_string()],
            offset: [0.0, 0.06, 0.13],
            scale: None,
        });
        catalog.insert(EquipmentMapping {
            item_id: "halo-1".to_string(),
            asset_path: "wardrobe/accessories/circuit_halo.glb".to_string(),
            slot: EquipmentSlot::Accessories,
            attachment_bone: bone::HEAD.to_string(),
            fallback_bones: vec![bone::CHEST.to_string()],
            offset: [0.0, 0.28, 0.0],
            scale: None,
        });
        catalog.insert(EquipmentMapping {
            item_id: "outfit-1".to_string(),
            asset_path: "wardrobe/outfits/street_jacket.glb".to_string(),
            slot: EquipmentSlot::Outfits,
            attachment_bone: bone::CHEST.to_string(),
            fallback_bones: vec![bone::SPINE.to_string()],
            offset: [0.0, 0.0, 0.0],
            scale: None,
        });
        catalog.insert(EquipmentMapping {
            item_id: "outfit-3".to_string(),
            asset_path: "wardrobe/outfits/flight_suit.glb".to_string(),
            slot: EquipmentSlot::Outfits,
            attachment_bone: bone::CHEST.to_string(),
            fallback_bones: vec![bone::SPINE.to_string()],
            offset: [0.0, -0.05, 0.0],
            scale: None,
        });

        catalog
    }
}
