//! Player animation controllers, facing and stance transitions.
//!
//! Every entry point here runs once per tick for the authoritative server simulation and once per
//! frame for the locally predicted client. A listen server runs both in sequence on the same
//! thread, which is why persistent per-player data lives in an [`AnimationStore`] partitioned by
//! [`Role`].
//!
//! A typical frame looks like this:
//!
//! 1. [`player_angles()`] swings the torso and legs towards the view and movement direction.
//! 2. [`do_controllers()`] builds the target controller angles with [`build_controllers()`],
//!    blends the cached pose towards them and hands the result to [`BoneTags`].
//!
//! [`set_new_animation()`] is called by the host whenever the legs or torso animation changes and
//! [`movement_yaw()`] during player movement.

use serde::{Deserialize, Serialize};

pub mod angles;
pub use angles::*;

pub mod anim;
pub use anim::*;

pub mod apply;
pub use apply::*;

pub mod controllers;
pub use controllers::*;

pub mod entity;
pub use entity::*;

pub mod facing;
pub use facing::*;

pub mod movement;
pub use movement::*;

pub mod stance;
pub use stance::*;

pub mod store;
pub use store::*;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

/// Animation behavior negotiated with the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Compat {
    /// Behaves exactly like the unmodified game, required when playing with legacy peers.
    #[default]
    Legacy,
    /// Enhanced animations.
    Enhanced,
}

impl Compat {
    /// The first protocol version with enhanced animations.
    pub const ENHANCED_VERSION: i32 = 3;

    /// Returns the behavior for the given protocol version.
    pub fn from_version(version: i32) -> Self {
        if version >= Self::ENHANCED_VERSION {
            Self::Enhanced
        } else {
            Self::Legacy
        }
    }

    pub fn is_enhanced(self) -> bool {
        self == Self::Enhanced
    }
}

/// Timing and role of the current animation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Which simulation is running this pass.
    pub role: Role,
    pub compat: Compat,
    /// Absolute simulation time, in milliseconds.
    pub time: i32,
    /// Duration of the current frame, in milliseconds.
    pub frame_time: i32,
}

/// Access to the host game's animation state.
///
/// The host implements this once for the server and once for the client game module.
pub trait Host {
    /// Returns the animation metadata for the given index.
    ///
    /// Returns `None` for indices outside of the loaded animation script.
    fn animation(&self, index: u32) -> Option<&Animation>;

    /// Returns the movetype condition of the player's current animation state.
    fn move_types(&self, ci: &ClientInfo) -> MoveTypes;

    /// Returns `true` if the player's firing condition is set.
    fn is_firing(&self, ci: &ClientInfo) -> bool;

    /// Zeroes the server-side legs animation timer of the player, ending the current legs
    /// animation.
    fn clear_legs_timer(&mut self, client_num: usize);

    /// Switches the server-side player and entity to the neutral animation.
    ///
    /// Both the legs and torso animation numbers should be replaced with [`AnimNum::neutral()`].
    fn reset_animations(&mut self, client_num: usize);
}
