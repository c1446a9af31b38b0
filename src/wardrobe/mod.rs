//! Wardrobe module.
//!
//! Equipment catalog data, attachment bone resolution, and the runtime
//! component that mounts equipped items onto a loaded skeleton.

pub mod attachment;
pub mod catalog;
pub mod resolver;

pub use attachment::{
    AttachmentConfig, AttachmentFailure, AttachmentReport, EquipmentRig, ResolvedAttachment,
};
pub use catalog::{EquipmentCatalog, EquipmentMapping, EquipmentSlot, EquippedLook};
pub use resolver::resolve_bone;
