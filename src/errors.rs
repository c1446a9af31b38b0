//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! Each failure domain has its own error type so callers can match on the
//! granularity they care about:
//! - [`ExportError`]: avatar asset serialization failures
//! - [`AssetLoadError`]: GLB fetch/parse failures
//! - [`AttachmentResolutionError`]: no mount bone matched a loaded skeleton
//! - [`InvalidStanceError`]: a stance transition with no matching clip
//!
//! The umbrella [`AvatarError`] covers all of them; public APIs that cross
//! subsystem boundaries return [`Result<T>`], an alias for
//! `std::result::Result<T, AvatarError>`.

use thiserror::Error;

/// Avatar asset serialization failed.
///
/// Not recoverable within a single generation attempt; the caller surfaces
/// the failure whole (typically with a retry option).
#[derive(Error, Debug)]
pub enum ExportError {
    /// An animation track references a bone that is not part of the rig.
    #[error("animation clip '{clip}' targets unknown bone '{bone}'")]
    UnknownBone {
        /// Name of the offending clip
        clip: String,
        /// The bone name that failed to resolve
        bone: String,
    },

    /// The assembled GLB exceeds the configured size limit.
    ///
    /// Signals that the caller should reduce mesh/animation detail.
    #[error("exported asset is {size} bytes, exceeding the {limit} byte limit")]
    SizeLimit { size: usize, limit: usize },

    /// The glTF JSON chunk failed to serialize.
    #[error("glTF serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A binary asset failed to fetch or parse.
///
/// Per-item for equipment; fatal for the primary avatar load.
#[derive(Error, Debug)]
pub enum AssetLoadError {
    /// File I/O error while fetching asset bytes.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// glTF parsing or structural error.
    #[error("glTF error: {0}")]
    Gltf(String),

    /// A buffer declared `Source::Bin` but the container has no binary chunk.
    #[error("missing GLB binary chunk")]
    MissingBlob,

    /// Data URI parsing error.
    #[error("data URI error: {0}")]
    DataUri(String),

    /// Base64 decoding error (embedded data-URI buffers).
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A buffer URI points outside the asset (external files are the host
    /// asset layer's concern, not the slice loader's).
    #[error("unsupported buffer URI: {0}")]
    UnsupportedUri(String),

    /// The document contains no scene to instantiate.
    #[error("asset contains no scene")]
    MissingScene,
}

impl From<gltf::Error> for AssetLoadError {
    fn from(err: gltf::Error) -> Self {
        AssetLoadError::Gltf(err.to_string())
    }
}

/// No bone name (primary or fallback) matched the loaded skeleton for an
/// equipped item.
///
/// Recovered locally: the caller skips that one attachment and continues
/// with the remaining items.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no attachment bone for item '{item_id}': tried {candidates:?}")]
pub struct AttachmentResolutionError {
    /// The wardrobe item that failed to attach
    pub item_id: String,
    /// Every bone name tried, primary first, in order
    pub candidates: Vec<String>,
}

/// Per-item attachment failure.
///
/// Wraps the two ways a single equipped item can fail without affecting the
/// rest of the look.
#[derive(Error, Debug)]
pub enum AttachmentError {
    /// The item id has no entry in the equipment catalog.
    #[error("unknown wardrobe item '{0}'")]
    UnknownItem(String),

    /// No mount bone matched the loaded skeleton.
    #[error(transparent)]
    Resolution(#[from] AttachmentResolutionError),

    /// The item's asset failed to load.
    #[error(transparent)]
    Load(#[from] AssetLoadError),
}

/// A stance transition was requested whose clip has no match on the loaded
/// skeleton's animation set. The controller stays in its previous stance.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no animation clip for stance '{requested}' (available: {available:?})")]
pub struct InvalidStanceError {
    /// The clip name the transition asked for
    pub requested: String,
    /// Clip names actually present on the avatar
    pub available: Vec<String>,
}

/// The umbrella error type for the avatar pipeline.
#[derive(Error, Debug)]
pub enum AvatarError {
    /// Asset serialization failed.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Asset fetch/parse failed.
    #[error(transparent)]
    AssetLoad(#[from] AssetLoadError),

    /// A single equipped item failed to attach.
    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    /// A stance transition failed.
    #[error(transparent)]
    Stance(#[from] InvalidStanceError),

    /// A bone-dependent operation ran before the avatar model finished
    /// loading. This is a programmer error, not a transient race.
    #[error("avatar model is not loaded")]
    AvatarNotLoaded,
}

/// Alias for `Result<T, AvatarError>`.
pub type Result<T> = std::result::Result<T, AvatarError>;
