//! Player torso and legs facing.

use cod2x_anim::{movement_yaw, player_angles, ClientInfo, EntityState, Host, MoveDirInput, Role};

use super::cvars::CVar;
use super::{compat, Module};
use crate::utils::*;

pub struct PlayerFacing;
impl Module for PlayerFacing {
    fn name(&self) -> &'static str {
        "Player facing"
    }

    fn description(&self) -> &'static str {
        "\
Turning the player's torso and legs towards the view and the movement direction.

With the enhanced animations the torso follows the view immediately and the legs point where the \
player is actually going."
    }

    fn cvars(&self) -> &'static [&'static CVar] {
        static CVARS: &[&CVar] = &[&BG_SWING_SPEED];
        CVARS
    }

    fn is_enabled(&self, _marker: MainThreadMarker) -> bool {
        true
    }
}

pub static BG_SWING_SPEED: CVar = CVar::new(
    "bg_swingSpeed",
    "0.2",
    "Turning speed of the torso and legs with the original animations, in degrees per millisecond.",
);

/// Turns the torso and legs of a player.
///
/// Called once per player model per frame, with `frame_time` in milliseconds.
pub fn on_player_angles(
    marker: MainThreadMarker,
    role: Role,
    time: i32,
    frame_time: i32,
    host: &impl Host,
    es: &EntityState,
    ci: &mut ClientInfo,
) {
    let frame = compat::frame(marker, role, time, frame_time);
    let swing_speed = BG_SWING_SPEED.as_f32(marker);
    player_angles(&frame, host, es, ci, swing_speed);
}

/// Returns the movement direction of a player relative to their view, in degrees.
///
/// Called during player movement.
pub fn on_set_movement_dir(marker: MainThreadMarker, input: &MoveDirInput) -> i32 {
    movement_yaw(input, compat::compat(marker))
}
