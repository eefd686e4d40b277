//! Per-player inputs owned by the host.

use bitflags::bitflags;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{AnimNum, Controllers, SwingAngle};

bitflags! {
    /// Networked entity flags relevant to player animation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct EntityFlags: u32 {
        const CROUCH = 1 << 2;
        const PRONE = 1 << 3;
        const FIRING = 1 << 6;
        /// Using a mounted gun.
        const MG = 1 << 8;
        const MANTLE = 1 << 14;
        const DEAD = 1 << 17;
        /// Aiming down the sights.
        const ADS = 1 << 18;
    }
}

impl Default for EntityFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Networked state of a player entity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EntityState {
    pub client_num: usize,
    pub flags: EntityFlags,
    pub origin: Vec3,
    pub legs_anim: AnimNum,
    pub torso_anim: AnimNum,
    /// Height of the torso above the origin.
    pub torso_height: f32,
    pub torso_pitch: f32,
    pub waist_pitch: f32,
    /// Raw lean as networked.
    pub leanf: f32,
}

impl EntityState {
    pub fn is_prone(&self) -> bool {
        self.flags.contains(EntityFlags::PRONE)
    }

    pub fn is_crouching(&self) -> bool {
        self.flags.contains(EntityFlags::CROUCH)
    }

    pub fn is_dead(&self) -> bool {
        self.flags.contains(EntityFlags::DEAD)
    }
}

/// Which half of the body an animation plays on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Body {
    Legs,
    Torso,
}

/// Animation playback and facing of one half of the body.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LerpFrame {
    pub yaw: SwingAngle,
    pub pitch: SwingAngle,
    /// Number of the playing animation, including the toggle bit.
    pub animation_number: AnimNum,
    /// Index of the playing animation, `None` if nothing is playing.
    pub animation: Option<u32>,
    /// Blend time into the current animation, in milliseconds.
    pub animation_time: i32,
}

/// Cached per-player animation state.
///
/// The host keeps one of these per client for the server and one for the client game module.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClientInfo {
    pub client_num: usize,
    /// View angles of the player.
    pub player_angles: Vec3,
    pub legs: LerpFrame,
    pub torso: LerpFrame,
    /// Smoothed lean in `[-1, 1]`, negative is left.
    pub lerp_lean: f32,
    /// Movement direction relative to the view yaw, in `[-90, 90]`, positive is left.
    pub movement_yaw: f32,
    /// Blended controller angles currently applied to the model.
    pub control: Controllers,
}

impl ClientInfo {
    pub fn lerp_frame(&self, body: Body) -> &LerpFrame {
        match body {
            Body::Legs => &self.legs,
            Body::Torso => &self.torso,
        }
    }

    pub fn lerp_frame_mut(&mut self, body: Body) -> &mut LerpFrame {
        match body {
            Body::Legs => &mut self.legs,
            Body::Torso => &mut self.torso,
        }
    }
}
