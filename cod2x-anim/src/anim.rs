//! Animation script metadata.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Script animation movetypes.
    ///
    /// Every animation in the player animation script declares the movetypes it is used for, and
    /// the animation condition system reports the movetype of the player's current state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct MoveTypes: u64 {
        const IDLE = 1 << 1;
        const IDLECR = 1 << 2;
        const IDLEPRONE = 1 << 3;
        const WALK = 1 << 4;
        const WALKBK = 1 << 5;
        const WALKCR = 1 << 6;
        const WALKCRBK = 1 << 7;
        const WALKPRONE = 1 << 8;
        const WALKPRONEBK = 1 << 9;
        const RUN = 1 << 10;
        const RUNBK = 1 << 11;
        const RUNCR = 1 << 12;
        const RUNCRBK = 1 << 13;
        const TURNRIGHT = 1 << 14;
        const TURNLEFT = 1 << 15;
        const TURNRIGHTCR = 1 << 16;
        const TURNLEFTCR = 1 << 17;
        const CLIMBUP = 1 << 18;
        const CLIMBDOWN = 1 << 19;
        const MANTLE_ROOT = 1 << 20;
        const MANTLE_UP_57 = 1 << 21;
        const MANTLE_UP_51 = 1 << 22;
        const MANTLE_UP_45 = 1 << 23;
        const MANTLE_UP_39 = 1 << 24;
        const MANTLE_UP_33 = 1 << 25;
        const MANTLE_UP_27 = 1 << 26;
        const MANTLE_UP_21 = 1 << 27;
        const MANTLE_OVER_HIGH = 1 << 28;
        const MANTLE_OVER_MID = 1 << 29;
        const MANTLE_OVER_LOW = 1 << 30;
        const FLINCH_FORWARD = 1 << 31;
        const FLINCH_BACKWARD = 1 << 32;
        const FLINCH_LEFT = 1 << 33;
        const FLINCH_RIGHT = 1 << 34;
        const STUMBLE_FORWARD = 1 << 35;
        const STUMBLE_BACKWARD = 1 << 36;
        const STUMBLE_WALK_FORWARD = 1 << 37;
        const STUMBLE_WALK_BACKWARD = 1 << 38;
        const STUMBLE_CROUCH_FORWARD = 1 << 39;
        const STUMBLE_CROUCH_BACKWARD = 1 << 40;
    }
}

impl MoveTypes {
    /// Moving forward in any stance.
    pub const FORWARD: Self = Self::RUN
        .union(Self::WALK)
        .union(Self::RUNCR)
        .union(Self::WALKCR)
        .union(Self::WALKPRONE);

    /// Moving backward in any stance.
    pub const BACKWARD: Self = Self::RUNBK
        .union(Self::WALKBK)
        .union(Self::RUNCRBK)
        .union(Self::WALKCRBK)
        .union(Self::WALKPRONEBK);

    /// On a ladder.
    pub const CLIMB: Self = Self::CLIMBUP.union(Self::CLIMBDOWN);

    /// Standing or crouching still.
    pub const IDLE_UPRIGHT: Self = Self::IDLE.union(Self::IDLECR);

    /// Animations played while crouched.
    ///
    /// The game itself only checks the first three; the running, turning and stumbling crouch
    /// animations are needed to detect stance transitions from and to them.
    pub const CROUCH: Self = Self::IDLECR
        .union(Self::WALKCR)
        .union(Self::WALKCRBK)
        .union(Self::RUNCR)
        .union(Self::RUNCRBK)
        .union(Self::TURNRIGHTCR)
        .union(Self::TURNLEFTCR)
        .union(Self::STUMBLE_CROUCH_FORWARD)
        .union(Self::STUMBLE_CROUCH_BACKWARD);

    /// Animations played while prone.
    pub const PRONE: Self = Self::IDLEPRONE
        .union(Self::WALKPRONE)
        .union(Self::WALKPRONEBK);
}

bitflags! {
    /// Animation script flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct AnimFlags: u32 {
        /// Legs animation for moving directly left.
        const STRAFE_LEFT = 0x10;
        /// Legs animation for moving directly right.
        const STRAFE_RIGHT = 0x20;
    }
}

/// Animation number as networked: an animation index plus a toggle bit.
///
/// The toggle bit flips every time an animation is restarted, so that playing the same animation
/// twice in a row is still noticed as a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimNum(pub u32);

impl AnimNum {
    pub const TOGGLE_BIT: u32 = 0x200;

    /// Returns the animation index with the toggle bit stripped.
    pub fn index(self) -> u32 {
        self.0 & !Self::TOGGLE_BIT
    }

    /// Returns the neutral animation (index 0), flipping the toggle bit so the change is noticed.
    pub fn neutral(self) -> Self {
        Self((self.0 & Self::TOGGLE_BIT) ^ Self::TOGGLE_BIT)
    }
}

/// Metadata of one animation from the player animation script.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Animation {
    pub name: String,
    pub move_types: MoveTypes,
    pub flags: AnimFlags,
    /// Blend time into this animation, in milliseconds.
    pub initial_lerp: i32,
    /// Movement speed the animation was authored for, zero for stationary animations.
    pub move_speed: f32,
}

impl Default for MoveTypes {
    fn default() -> Self {
        Self::empty()
    }
}

impl Default for AnimFlags {
    fn default() -> Self {
        Self::empty()
    }
}
