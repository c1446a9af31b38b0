//! Equipment attachment runtime.
//!
//! Binds equipped wardrobe items onto a loaded avatar skeleton: loads each
//! item's asset, resolves its mount bone (with fallbacks), re-parents the
//! equipment subtree under that bone and applies the configured local
//! offset/scale. Failures are isolated per item: one unresolvable
//! accessory never blocks the shoes.

use glam::Vec3;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::assets::{AssetProvider, GlbLoader};
use crate::errors::AttachmentError;
use crate::scene::{NodeHandle, Scene, SkeletonKey};
use crate::wardrobe::catalog::{EquipmentCatalog, EquipmentMapping, EquipmentSlot, EquippedLook};
use crate::wardrobe::resolver::resolve_bone;

/// Typed attachment configuration.
///
/// The host's declarative markup (string attributes) is translated into
/// this struct at the boundary; nothing below it deals in stringly-typed
/// configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentConfig {
    pub target_bone: String,
    pub fallback_bones: Vec<String>,
    pub offset: Vec3,
    pub scale: Vec3,
}

impl From<&EquipmentMapping> for AttachmentConfig {
    fn from(mapping: &EquipmentMapping) -> Self {
        Self {
            target_bone: mapping.attachment_bone.clone(),
            fallback_bones: mapping.fallback_bones.clone(),
            offset: mapping.offset_vec(),
            scale: mapping.scale_vec(),
        }
    }
}

/// One successfully mounted item.
///
/// Owned by the [`EquipmentRig`] (and thus the scene instance) that created
/// it; never shared across avatar instances.
#[derive(Debug, Clone)]
pub struct ResolvedAttachment {
    pub item_id: String,
    /// The bone name that actually matched (primary or fallback)
    pub resolved_bone: String,
    /// Root node of the instantiated equipment subtree
    pub node: NodeHandle,
}

/// One item that could not be mounted.
#[derive(Debug)]
pub struct AttachmentFailure {
    pub slot: EquipmentSlot,
    pub item_id: String,
    pub error: AttachmentError,
}

/// Outcome of one `apply_look` call. Failures here are developer
/// diagnostics; end users never see them directly.
#[derive(Debug, Default)]
pub struct AttachmentReport {
    /// (slot, item id, resolved bone) for every item mounted after the call
    pub attached: Vec<(EquipmentSlot, String, String)>,
    pub failures: Vec<AttachmentFailure>,
}

impl AttachmentReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runtime component holding the currently mounted equipment of one avatar.
#[derive(Default)]
pub struct EquipmentRig {
    slots: FxHashMap<EquipmentSlot, ResolvedAttachment>,
}

impl EquipmentRig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn attachment(&self, slot: EquipmentSlot) -> Option<&ResolvedAttachment> {
        self.slots.get(&slot)
    }

    pub fn attachments(&self) -> impl Iterator<Item = (&EquipmentSlot, &ResolvedAttachment)> {
        self.slots.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Reconciles the mounted equipment with `look`.
    ///
    /// Idempotent per look value: slots whose item is unchanged are left
    /// alone; slots whose item changed or cleared have their old subtree
    /// removed before the new one is added. Per-item failures are recorded
    /// and logged, and never abort the remaining slots.
    pub fn apply_look(
        &mut self,
        scene: &mut Scene,
        skeleton: SkeletonKey,
        look: &EquippedLook,
        catalog: &EquipmentCatalog,
        assets: &dyn AssetProvider,
    ) -> AttachmentReport {
        let mut report = AttachmentReport::default();

        // Snapshot the skeleton's bone names and handles up front; the
        // loader below needs the scene mutably.
        let Some(instance) = scene.get_skeleton(skeleton) else {
            log::error!("apply_look called with a stale skeleton key");
            return report;
        };
        let bone_names: FxHashSet<String> = instance.bone_names().iter().cloned().collect();
        let bone_handles: FxHashMap<String, NodeHandle> = instance
            .bone_names()
            .iter()
            .cloned()
            .zip(instance.bones.iter().copied())
            .collect();

        for slot in EquipmentSlot::ALL {
            let desired = look.item_for(slot);

            // Unchanged slot: keep the existing node (no duplicates)
            if let Some(current) = self.slots.get(&slot)
                && desired == Some(&current.item_id)
            {
                report.attached.push((
                    slot,
                    current.item_id.clone(),
                    current.resolved_bone.clone(),
                ));
                continue;
            }

            // Changed or cleared: tear down the old subtree first
            if let Some(old) = self.slots.remove(&slot) {
                scene.remove_node(old.node);
            }

            let Some(item_id) = desired else {
                continue;
            };

            match Self::mount_item(scene, &bone_names, &bone_handles, item_id, catalog, assets) {
                Ok(attachment) => {
                    report.attached.push((
                        slot,
                        attachment.item_id.clone(),
                        attachment.resolved_bone.clone(),
                    ));
                    self.slots.insert(slot, attachment);
                }
                Err(error) => {
                    log::warn!("failed to attach '{item_id}' ({}): {error}", slot.as_str());
                    report.failures.push(AttachmentFailure {
                        slot,
                        item_id: item_id.clone(),
                        error,
                    });
                }
            }
        }

        report
    }

    fn mount_item(
        scene: &mut Scene,
        bone_names: &FxHashSet<String>,
        bone_handles: &FxHashMap<String, NodeHandle>,
        item_id: &str,
        catalog: &EquipmentCatalog,
        assets: &dyn AssetProvider,
    ) -> Result<ResolvedAttachment, AttachmentError> {
        let mapping = catalog
            .get(item_id)
            .ok_or_else(|| AttachmentError::UnknownItem(item_id.to_string()))?;

        let resolved = resolve_bone(bone_names, mapping)?.to_string();
        let bone_handle = bone_handles[&resolved];

        let bytes = assets.fetch(&mapping.asset_path)?;
        let model = GlbLoader::load_slice(&bytes, scene)?;

        // Rigid child of the mount bone with the configured local transform
        let config = AttachmentConfig::from(mapping);
        scene.attach(model.root, bone_handle);
        if let Some(node) = scene.get_node_mut(model.root) {
            node.transform.position = config.offset;
            node.transform.scale = config.scale;
        }
        scene.update_subtree(model.root);

        log::debug!("attached '{item_id}' to bone '{resolved}'");

        Ok(ResolvedAttachment {
            item_id: item_id.to_string(),
            resolved_bone: resolved,
            node: model.root,
        })
    }

    /// Removes every mounted item from the scene.
    pub fn clear(&mut self, scene: &mut Scene) {
        for (_, attachment) in self.slots.drain() {
            scene.remove_node(attachment.node);
        }
    }
}
