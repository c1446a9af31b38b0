//! Avatar session.
//!
//! The explicit context object tying the subsystems together: one scene,
//! one loaded avatar, its equipment rig and its stance controller. Hosts
//! construct a session per avatar view and pass it around instead of
//! reading ambient globals.

use std::sync::Arc;

use uuid::Uuid;

use crate::assets::{AssetProvider, AssetServer, AssetSource, AvatarPathProvider, GlbLoader, LoadedModel};
use crate::diagnostics::{self, DiagnosticsReport};
use crate::errors::{AvatarError, Result};
use crate::scene::Scene;
use crate::stance::{Stance, StanceController};
use crate::wardrobe::{AttachmentReport, EquipmentCatalog, EquipmentRig, EquippedLook};

/// A loaded avatar and its per-instance runtime state.
struct AvatarInstance {
    model: LoadedModel,
    rig: EquipmentRig,
    stance: StanceController,
}

/// Owns one avatar's scene and runtime components.
///
/// Nothing in a session is shared with other sessions; tearing one down
/// leaves every other avatar untouched. Bone-dependent operations
/// (attachment, stance, diagnostics with bones) fail fast with
/// [`AvatarError::AvatarNotLoaded`] before the model-loaded signal.
pub struct AvatarSession {
    pub id: Uuid,
    scene: Scene,
    assets: AssetServer,
    catalog: EquipmentCatalog,
    wardrobe_assets: Box<dyn AssetProvider>,
    avatar: Option<AvatarInstance>,
    torn_down: bool,
}

impl AvatarSession {
    #[must_use]
    pub fn new(catalog: EquipmentCatalog, wardrobe_assets: Box<dyn AssetProvider>) -> Self {
        Self {
            id: Uuid::new_v4(),
            scene: Scene::new(),
            assets: AssetServer::new(),
            catalog,
            wardrobe_assets,
            avatar: None,
            torn_down: false,
        }
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.avatar.is_some()
    }

    // ========================================================================
    // Avatar loading
    // ========================================================================

    /// Fetches and installs the avatar model, blocking until done.
    pub fn load_avatar(&mut self, source: &impl AssetSource) -> Result<()> {
        let bytes = self.assets.fetch_bytes(source)?;
        self.install_avatar(&bytes)
    }

    /// Loads the avatar the host's path provider currently points at.
    pub fn load_active_avatar(&mut self, provider: &dyn AvatarPathProvider) -> Result<()> {
        let path = provider.active_avatar_path();
        self.load_avatar(&path)
    }

    /// Fetches the avatar bytes without touching the session, for hosts
    /// driving the load asynchronously. Install the result afterwards with
    /// [`install_avatar`](Self::install_avatar).
    pub async fn fetch_avatar_bytes(
        &self,
        source: &impl AssetSource,
    ) -> Result<Arc<Vec<u8>>> {
        Ok(self.assets.fetch_bytes_async(source).await?)
    }

    /// Load-completion handler: instantiates the model and spins up the
    /// equipment rig and stance controller.
    ///
    /// On a torn-down session this is a guarded no-op; a late completion
    /// must not resurrect a dead view.
    pub fn install_avatar(&mut self, bytes: &[u8]) -> Result<()> {
        if self.torn_down {
            log::debug!("session {}: install after teardown ignored", self.id);
            return Ok(());
        }

        // Replace any previously loaded avatar wholesale
        if let Some(previous) = self.avatar.take() {
            self.scene.remove_node(previous.model.root);
            if let Some(key) = previous.model.skeleton {
                self.scene.remove_skeleton(key);
            }
        }

        let model = GlbLoader::load_slice(bytes, &mut self.scene)?;
        let stance = StanceController::new(&self.scene, model.root, &model.clips);

        self.avatar = Some(AvatarInstance {
            model,
            rig: EquipmentRig::new(),
            stance,
        });

        Ok(())
    }

    // ========================================================================
    // Wardrobe
    // ========================================================================

    /// Reconciles mounted equipment with `look`. Per-item failures are in
    /// the report; the call itself only fails before the avatar is loaded.
    pub fn apply_look(&mut self, look: &EquippedLook) -> Result<AttachmentReport> {
        let avatar = self.avatar.as_mut().ok_or(AvatarError::AvatarNotLoaded)?;
        let Some(skeleton) = avatar.model.skeleton else {
            return Err(AvatarError::AvatarNotLoaded);
        };

        Ok(avatar.rig.apply_look(
            &mut self.scene,
            skeleton,
            look,
            &self.catalog,
            self.wardrobe_assets.as_ref(),
        ))
    }

    /// Currently mounted equipment, if the avatar is loaded.
    #[must_use]
    pub fn equipment(&self) -> Option<&EquipmentRig> {
        self.avatar.as_ref().map(|a| &a.rig)
    }

    // ========================================================================
    // Stance
    // ========================================================================

    pub fn set_stance(&mut self, stance: Stance) -> Result<bool> {
        let avatar = self.avatar.as_mut().ok_or(AvatarError::AvatarNotLoaded)?;
        Ok(avatar.stance.set_stance(stance)?)
    }

    #[must_use]
    pub fn stance(&self) -> Option<Stance> {
        self.avatar.as_ref().map(|a| a.stance.current())
    }

    #[must_use]
    pub fn stance_controller(&self) -> Option<&StanceController> {
        self.avatar.as_ref().map(|a| &a.stance)
    }

    // ========================================================================
    // Frame update & diagnostics
    // ========================================================================

    /// Per-frame step: advances animation, then refreshes world matrices.
    pub fn update(&mut self, dt: f32) {
        if let Some(avatar) = &mut self.avatar {
            avatar.stance.update(dt, &mut self.scene);
        }
        self.scene.update_matrix_world();
    }

    /// Current diagnostics snapshot.
    #[must_use]
    pub fn diagnostics(&self) -> DiagnosticsReport {
        match &self.avatar {
            Some(avatar) => diagnostics::inspect(&self.scene, &avatar.model),
            None => diagnostics::inspect_unloaded(),
        }
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Tears the session down. Pending load completions become no-ops and
    /// the avatar subtree is removed from the scene.
    pub fn teardown(&mut self) {
        self.torn_down = true;
        if let Some(avatar) = self.avatar.take() {
            self.scene.remove_node(avatar.model.root);
            if let Some(key) = avatar.model.skeleton {
                self.scene.remove_skeleton(key);
            }
        }
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}
