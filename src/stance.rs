//! Stance controller.
//!
//! A three-state machine over the baked stance clips. Transitions happen
//! only on explicit request; at most one clip plays at a time, and
//! re-selecting the active stance is a no-op (the clip keeps its phase).

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::animation::{AnimationAction, AnimationClip, AnimationMixer, Binder, LoopMode};
use crate::errors::InvalidStanceError;
use crate::scene::{NodeHandle, Scene};

/// The avatar's named animation states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Stance {
    #[default]
    Idle,
    Action,
    Victory,
}

impl Stance {
    pub const ALL: [Stance; 3] = [Stance::Idle, Stance::Action, Stance::Victory];

    /// The clip name the baker emits for this stance.
    #[must_use]
    pub fn clip_name(self) -> &'static str {
        match self {
            Stance::Idle => "Idle",
            Stance::Action => "Action",
            Stance::Victory => "Victory",
        }
    }

    #[must_use]
    pub fn from_clip_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.clip_name() == name)
    }
}

impl std::fmt::Display for Stance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.clip_name())
    }
}

/// Per-avatar playback controller.
///
/// Owns the avatar's [`AnimationMixer`]; each avatar instance gets its own
/// controller, so playback state is never shared.
pub struct StanceController {
    current: Stance,
    mixer: AnimationMixer,
    // stance -> action index in the mixer
    actions: FxHashMap<Stance, usize>,
}

impl StanceController {
    /// Binds the loaded model's stance clips against the avatar subtree
    /// rooted at `root`.
    ///
    /// Clips whose names match no stance are ignored. Playback starts in
    /// [`Stance::Idle`] when an Idle clip is present.
    #[must_use]
    pub fn new(scene: &Scene, root: NodeHandle, clips: &[Arc<AnimationClip>]) -> Self {
        let mut mixer = AnimationMixer::new();
        let mut actions = FxHashMap::default();

        for clip in clips {
            let Some(stance) = Stance::from_clip_name(&clip.name) else {
                log::debug!("clip '{}' matches no stance, ignored", clip.name);
                continue;
            };

            let mut action = AnimationAction::new(Arc::clone(clip));
            action.loop_mode = LoopMode::Loop;
            action.bindings = Binder::bind(scene, root, clip);
            action.enabled = stance == Stance::Idle;

            let index = mixer.add_action(action);
            actions.insert(stance, index);
        }

        Self {
            current: Stance::Idle,
            mixer,
            actions,
        }
    }

    #[must_use]
    pub fn current(&self) -> Stance {
        self.current
    }

    /// Clip names available on this avatar, in mixer order.
    #[must_use]
    pub fn available_clips(&self) -> Vec<String> {
        self.mixer
            .actions()
            .iter()
            .map(|a| a.clip().name.clone())
            .collect()
    }

    /// Whether the given stance's clip is currently enabled.
    #[must_use]
    pub fn is_playing(&self, stance: Stance) -> bool {
        self.actions
            .get(&stance)
            .and_then(|&i| self.mixer.action(i))
            .is_some_and(|a| a.enabled)
    }

    /// Number of concurrently enabled clips (0 or 1 by construction).
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.mixer.actions().iter().filter(|a| a.enabled).count()
    }

    /// Requests a stance transition.
    ///
    /// Returns `Ok(true)` when playback switched, `Ok(false)` for the
    /// no-op transition onto the already-active stance. When the stance's
    /// clip is missing the controller keeps its previous stance and
    /// returns [`InvalidStanceError`].
    pub fn set_stance(&mut self, stance: Stance) -> Result<bool, InvalidStanceError> {
        if stance == self.current && self.is_playing(stance) {
            // Re-selecting the active stance leaves the clip mid-loop
            return Ok(false);
        }

        let Some(&next_index) = self.actions.get(&stance) else {
            return Err(InvalidStanceError {
                requested: stance.clip_name().to_string(),
                available: self.available_clips(),
            });
        };

        // Stop whatever is playing, then start the new clip from t=0
        for index in self.actions.values() {
            if let Some(action) = self.mixer.action_mut(*index) {
                action.enabled = false;
            }
        }
        if let Some(action) = self.mixer.action_mut(next_index) {
            action.enabled = true;
            action.paused = false;
            action.reset();
        }

        log::debug!("stance {} -> {stance}", self.current);
        self.current = stance;
        Ok(true)
    }

    /// Restarts the active stance's clip from t=0.
    ///
    /// The explicit opt-in for hosts that want re-selection to restart
    /// rather than no-op.
    pub fn restart_current(&mut self) {
        if let Some(&index) = self.actions.get(&self.current)
            && let Some(action) = self.mixer.action_mut(index)
        {
            action.reset();
        }
    }

    /// Advances playback and writes the sampled pose into the scene.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        self.mixer.update(dt, scene);
    }
}
