//! Avatar generation pipeline.
//!
//! Mesh builder → stance clip baker → GLB exporter. All three stages are
//! deterministic and parameter-free apart from [`ExportOptions`].

pub mod clips;
pub mod export;
pub mod figure;

pub use clips::{bake_clip, bake_stance_clips};
pub use export::{ExportOptions, export_avatar};
pub use figure::{Figure, MAX_INFLUENCES, build_figure};

use crate::errors::ExportError;
use crate::rig::Rig;

/// Conventional filename hosts save generated avatars under.
pub const AVATAR_ASSET_FILENAME: &str = "avatar.glb";

/// One-call generation: builds the standard humanoid rig, figure and stance
/// clips, and exports them as a GLB byte buffer.
///
/// The host application saves the buffer under its conventional filename;
/// this crate never touches the filesystem on the generation path.
pub fn generate_avatar(options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
    let rig = Rig::humanoid();
    let figure = build_figure(&rig);
    let clips = bake_stance_clips(&rig);
    export_avatar(&figure, &rig, &clips, options)
}
