//! Movement classification and movement direction.

use bitflags::bitflags;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{angle_delta, normalize_180, AnimFlags, Compat, MoveTypes};

bitflags! {
    /// What the player is doing, as far as the controller blend is concerned.
    ///
    /// Whenever this changes from one frame to the next, the controllers blend from their current
    /// pose into the new one.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ControllerMovement: u32 {
        const DEFAULT = 1 << 0;
        const STRAIGHT_STANCE = 1 << 1;
        const TURNING_STANCE = 1 << 2;
        const MOVING_LEFT = 1 << 3;
        const MOVING_RIGHT = 1 << 4;
        const MOVING = 1 << 5;
        const MOVING_BACKWARDS = 1 << 6;
        const STAND_LEAN_LEFT = 1 << 7;
        const CROUCH_LEAN_LEFT = 1 << 8;
        const PRONE_FORWARD_RELOAD = 1 << 9;
        const PRONE_BACKWARDS_FIRE = 1 << 10;
        const PRONE_BACKWARDS_RELOAD = 1 << 11;
        const CLIMBUP = 1 << 12;
        const CLIMBDOWN = 1 << 13;
        const MOVING_LEFT_STRAFE = 1 << 14;
        const MOVING_RIGHT_STRAFE = 1 << 15;
        const STAND = 1 << 16;
        const CROUCH = 1 << 17;
        const PRONE = 1 << 18;
    }
}

impl Default for ControllerMovement {
    fn default() -> Self {
        Self::empty()
    }
}

/// Minimal movement yaw for movement to count as strafing.
pub const STRAFE_YAW: f32 = 20.;

/// Which way the player's animations are moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Locomotion {
    pub forward: bool,
    pub backward: bool,
    /// The legs animation moves directly left.
    pub left: bool,
    /// The legs animation moves directly right.
    pub right: bool,
}

impl Locomotion {
    pub fn new(move_types: MoveTypes, legs_flags: AnimFlags) -> Self {
        Self {
            forward: move_types.intersects(MoveTypes::FORWARD),
            backward: move_types.intersects(MoveTypes::BACKWARD),
            left: legs_flags.contains(AnimFlags::STRAFE_LEFT),
            right: legs_flags.contains(AnimFlags::STRAFE_RIGHT),
        }
    }

    pub fn is_moving(&self) -> bool {
        self.forward || self.backward
    }

    pub fn is_sideways(&self) -> bool {
        self.left || self.right
    }
}

impl ControllerMovement {
    /// Classifies the direction of movement.
    ///
    /// Stance and the special cases are added later by the controller builder.
    pub fn classify(locomotion: &Locomotion, movement_yaw: f32) -> Self {
        let Locomotion {
            forward,
            backward,
            left,
            right,
        } = *locomotion;

        let mut movement = Self::DEFAULT;

        if forward {
            movement |= Self::MOVING;
        } else if backward {
            movement |= Self::MOVING_BACKWARDS;
        }

        if left {
            movement |= Self::MOVING_LEFT;
        } else if right {
            movement |= Self::MOVING_RIGHT;
        }

        if (forward && movement_yaw > STRAFE_YAW) || (backward && movement_yaw < -STRAFE_YAW) {
            movement |= Self::MOVING_LEFT_STRAFE;
        } else if (forward && movement_yaw < -STRAFE_YAW) || (backward && movement_yaw > STRAFE_YAW)
        {
            movement |= Self::MOVING_RIGHT_STRAFE;
        }

        movement
    }
}

/// Player movement state needed to compute the movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MoveDirInput {
    pub origin: Vec3,
    pub previous_origin: Vec3,
    /// Duration of the movement frame, in seconds.
    pub frame_time: f32,
    pub view_yaw: f32,
    pub forward_move: i8,
    pub right_move: i8,
    pub on_ground: bool,
    pub prone: bool,
    pub using_mg: bool,
    /// Direction the player went prone in.
    pub prone_direction: f32,
}

/// Minimal speed, in units per second, for the movement direction to follow the velocity.
pub const MOVEMENT_DIR_MIN_SPEED: f32 = 5.;

/// Computes the direction the legs should point in, relative to the view yaw.
///
/// The result is in `[-90, 90]`, positive is left. Moving backward flips the direction so that
/// the legs keep facing forward. While standing still the result is 0.
#[instrument(level = "trace", ret)]
pub fn movement_yaw(input: &MoveDirInput, compat: Compat) -> i32 {
    let move_yaw = if !input.prone || input.using_mg {
        let moved = input.origin - input.previous_origin;
        let speed = moved.length() / input.frame_time;

        if (input.forward_move != 0 || input.right_move != 0)
            && input.on_ground
            && speed > MOVEMENT_DIR_MIN_SPEED
        {
            let dir_yaw = moved.y.atan2(moved.x).to_degrees();
            let move_yaw = angle_delta(dir_yaw, input.view_yaw);

            // Holding back while moving sideways does not count as moving backward.
            let backward = input.forward_move < 0
                && (!compat.is_enhanced() || !(-90. ..=90.).contains(&move_yaw));

            let move_yaw = if backward {
                normalize_180(move_yaw + 180.)
            } else {
                move_yaw
            };

            move_yaw.clamp(-90., 90.)
        } else {
            0.
        }
    } else {
        angle_delta(input.prone_direction, input.view_yaw).clamp(-90., 90.)
    };

    move_yaw as i32
}
