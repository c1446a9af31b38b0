#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod animation;
pub mod assets;
pub mod diagnostics;
pub mod errors;
pub mod generator;
pub mod rig;
pub mod scene;
pub mod session;
pub mod stance;
pub mod wardrobe;

pub use animation::{AnimationAction, AnimationClip, AnimationMixer, Binder, LoopMode};
pub use assets::{
    AssetProvider, AssetServer, AssetSource, BytesSource, FileAssetProvider, GlbLoader,
    LoadedModel, MemoryAssetProvider,
};
pub use diagnostics::{DiagnosticsReport, inspect};
pub use errors::{
    AssetLoadError, AttachmentError, AttachmentResolutionError, AvatarError, ExportError,
    InvalidStanceError, Result,
};
pub use generator::{ExportOptions, bake_stance_clips, build_figure, export_avatar, generate_avatar};
pub use rig::Rig;
pub use scene::{Node, Scene, SkeletonInstance, Transform};
pub use session::AvatarSession;
pub use stance::{Stance, StanceController};
pub use wardrobe::{
    AttachmentConfig, AttachmentReport, EquipmentCatalog, EquipmentMapping, EquipmentRig,
    EquipmentSlot, EquippedLook, ResolvedAttachment, resolve_bone,
};
