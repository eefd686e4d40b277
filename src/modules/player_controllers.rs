//! Player bone controllers.

use cod2x_anim::{
    do_controllers, set_new_animation, AnimNum, AnimationPlayerData, AnimationStore, Body,
    BoneTags, ClientInfo, Controllers, EntityState, Host, PlayerKey, Role, StanceTransition,
    Tuning,
};

use super::cvars::CVar;
use super::{compat, Module};
use crate::utils::*;

pub struct PlayerControllers;
impl Module for PlayerControllers {
    fn name(&self) -> &'static str {
        "Player controllers"
    }

    fn description(&self) -> &'static str {
        "\
Bending the player model's spine, neck and head to follow the view, movement, leaning and stance \
changes.

The offset variables are meant for tuning the poses and only apply with the enhanced animations."
    }

    fn cvars(&self) -> &'static [&'static CVar] {
        static CVARS: &[&CVar] = &[
            &PLAYER_DEBUG,
            &PLAYER_OFFSET_ENABLE,
            &PLAYER_OFFSET_NEUTRAL,
            &PLAYER_OFFSET_ANGLE_BACK_LOW,
            &PLAYER_OFFSET_ANGLE_BACK_MID,
            &PLAYER_OFFSET_ANGLE_BACK_UP,
            &PLAYER_OFFSET_ANGLE_NECK,
            &PLAYER_OFFSET_ANGLE_HEAD,
            &PLAYER_OFFSET_ANGLE_PELVIS,
            &PLAYER_OFFSET_ANGLE_ORIGIN,
            &PLAYER_OFFSET_POSITION_ORIGIN,
        ];
        CVARS
    }

    fn is_enabled(&self, _marker: MainThreadMarker) -> bool {
        true
    }
}

pub static PLAYER_DEBUG: CVar = CVar::new(
    "player_debug",
    "0",
    "\
Logs controller changes.

- `0` - disabled.
- `1` - log movement changes.
- `2` - also log the controller targets every frame.",
);
pub static PLAYER_OFFSET_ENABLE: CVar = CVar::new(
    "player_offsetEnable",
    "0",
    "Set to `1` to add the `player_offset*` variables to the controller targets.",
);
pub static PLAYER_OFFSET_NEUTRAL: CVar = CVar::new(
    "player_offsetNeutral",
    "0",
    "\
Set to `1` to keep the players in the neutral animation, which makes the offsets easier to see. \
Only takes effect on the server.",
);
pub static PLAYER_OFFSET_ANGLE_BACK_LOW: CVar =
    CVar::new("player_offsetAngleBackLow", "0 0 0", "Lower back angle offset.");
pub static PLAYER_OFFSET_ANGLE_BACK_MID: CVar =
    CVar::new("player_offsetAngleBackMid", "0 0 0", "Middle back angle offset.");
pub static PLAYER_OFFSET_ANGLE_BACK_UP: CVar =
    CVar::new("player_offsetAngleBackUp", "0 0 0", "Upper back angle offset.");
pub static PLAYER_OFFSET_ANGLE_NECK: CVar =
    CVar::new("player_offsetAngleNeck", "0 0 0", "Neck angle offset.");
pub static PLAYER_OFFSET_ANGLE_HEAD: CVar =
    CVar::new("player_offsetAngleHead", "0 0 0", "Head angle offset.");
pub static PLAYER_OFFSET_ANGLE_PELVIS: CVar =
    CVar::new("player_offsetAnglePelvis", "0 0 0", "Pelvis angle offset.");
pub static PLAYER_OFFSET_ANGLE_ORIGIN: CVar =
    CVar::new("player_offsetAngleOrigin", "0 0 0", "Model origin angle offset.");
pub static PLAYER_OFFSET_POSITION_ORIGIN: CVar = CVar::new(
    "player_offsetPositionOrigin",
    "0 0 0",
    "Model origin position offset.",
);

/// Persistent animation data of every player, for both the server and the client.
static STORE: MainThreadRefCell<AnimationStore> = MainThreadRefCell::new(AnimationStore::new());

/// Drops the animation data of every player.
pub fn reset_store(marker: MainThreadMarker) {
    STORE.borrow_mut(marker).reset();
}

/// Returns a copy of the animation data of a player.
pub fn player_data(marker: MainThreadMarker, key: PlayerKey) -> AnimationPlayerData {
    *STORE.borrow(marker).get(key)
}

fn offsets(marker: MainThreadMarker) -> Controllers {
    Controllers {
        back_low: PLAYER_OFFSET_ANGLE_BACK_LOW.as_vec3(marker),
        back_mid: PLAYER_OFFSET_ANGLE_BACK_MID.as_vec3(marker),
        back_up: PLAYER_OFFSET_ANGLE_BACK_UP.as_vec3(marker),
        neck: PLAYER_OFFSET_ANGLE_NECK.as_vec3(marker),
        head: PLAYER_OFFSET_ANGLE_HEAD.as_vec3(marker),
        pelvis: PLAYER_OFFSET_ANGLE_PELVIS.as_vec3(marker),
        origin_angles: PLAYER_OFFSET_ANGLE_ORIGIN.as_vec3(marker),
        origin_offset: PLAYER_OFFSET_POSITION_ORIGIN.as_vec3(marker),
    }
}

/// Returns the operator tuning from the console variables.
pub fn tuning(marker: MainThreadMarker) -> Tuning {
    Tuning {
        neutral: PLAYER_OFFSET_NEUTRAL.as_bool(marker),
        offsets: PLAYER_OFFSET_ENABLE
            .as_bool(marker)
            .then(|| offsets(marker)),
    }
}

/// Updates the controllers of a player and writes them to the model.
///
/// Called once per player model per frame, with `time` and `frame_time` in milliseconds.
#[allow(clippy::too_many_arguments)]
pub fn on_do_controllers(
    marker: MainThreadMarker,
    role: Role,
    time: i32,
    frame_time: i32,
    host: &mut impl Host,
    bones: &mut impl BoneTags,
    es: &EntityState,
    ci: &mut ClientInfo,
) {
    let frame = compat::frame(marker, role, time, frame_time);
    let tuning = tuning(marker);
    let debug = PLAYER_DEBUG.as_i32(marker);

    let mut store = STORE.borrow_mut(marker);
    let key = PlayerKey::new(ci.client_num, role);
    let movement_before = store.get(key).movement_last;

    let target = do_controllers(&frame, host, &mut store, bones, es, ci, &tuning);

    if debug >= 1 {
        let data = store.get(key);
        if data.movement_last != movement_before {
            info!(
                ?role,
                client_num = ci.client_num,
                time,
                movement = ?data.movement_last,
                duration = data.movement_time,
                "controller movement changed"
            );
        }
    }

    if debug >= 2 {
        info!(?role, client_num = ci.client_num, ?target, control = ?ci.control);
    }
}

/// Starts a new legs or torso animation.
///
/// Called whenever the animation number of a lerp frame changes, with `time` in milliseconds.
pub fn on_set_new_animation(
    marker: MainThreadMarker,
    role: Role,
    time: i32,
    host: &impl Host,
    ci: &mut ClientInfo,
    body: Body,
    animation: AnimNum,
) -> StanceTransition {
    // Starting an animation doesn't depend on the frame duration.
    let frame = compat::frame(marker, role, time, 0);
    let mut store = STORE.borrow_mut(marker);
    set_new_animation(&frame, host, &mut store, ci, body, animation)
}
