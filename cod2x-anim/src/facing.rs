//! Torso and legs facing.

use tracing::instrument;

use crate::{
    normalize_180, normalize_360, AnimFlags, ClientInfo, EntityFlags, EntityState, Frame, Host,
    MoveTypes, SwingAngle,
};

/// Swing speed of enhanced mode, in degrees per millisecond, fast enough to follow the view.
pub const ENHANCED_SWING_SPEED: f32 = 1.;

/// Legacy swing speed of the torso pitch.
pub const PITCH_SWING_SPEED: f32 = 0.15;

/// Share of the view pitch the torso follows.
pub const PITCH_SCALE: f32 = 0.6;

/// Share of the movement direction the torso follows in legacy mode.
pub const TORSO_MOVEMENT_SCALE: f32 = 0.3;

/// How far the legs may lag behind their target.
pub const LEGS_CLAMP: f32 = 150.;

/// How far the legs may lag behind before they start turning in legacy mode.
pub const LEGS_SWING_TOLERANCE: f32 = 40.;

/// Swings the torso and legs towards the view angles and movement direction.
///
/// `swing_speed` is the legacy yaw swing speed in degrees per millisecond.
#[instrument(level = "trace", skip_all, fields(client_num = ci.client_num))]
pub fn player_angles(
    frame: &Frame,
    host: &impl Host,
    es: &EntityState,
    ci: &mut ClientInfo,
    swing_speed: f32,
) {
    let enhanced = frame.compat.is_enhanced();
    let frame_time = frame.frame_time as f32;
    let speed = if enhanced {
        ENHANCED_SWING_SPEED
    } else {
        swing_speed
    };

    let move_types = host.move_types(ci);
    let climbing = move_types.intersects(MoveTypes::CLIMB);
    let using_mg = es.flags.contains(EntityFlags::MG);
    let mantling = es.flags.contains(EntityFlags::MANTLE);

    let legs_dir = ci.movement_yaw;
    let view_pitch = ci.player_angles.x;
    let view_yaw = normalize_360(ci.player_angles.y);

    if using_mg || climbing || mantling {
        ci.torso.yaw.swinging = true;
        ci.torso.pitch.swinging = true;
        ci.legs.yaw.swinging = true;
    } else if move_types.intersects(MoveTypes::IDLE_UPRIGHT) {
        // Standing still, only turn when shooting.
        if host.is_firing(ci) {
            ci.torso.yaw.swinging = true;
            ci.torso.pitch.swinging = true;
        }
    } else {
        ci.torso.yaw.swinging = true;
        ci.torso.pitch.swinging = true;
        ci.legs.yaw.swinging = true;
    }

    // Torso yaw.
    let mut legs_yaw = view_yaw + legs_dir;
    let (torso_yaw, clamp) = if es.is_dead() {
        (view_yaw, 90.)
    } else if climbing {
        (legs_yaw, 0.)
    } else if mantling {
        legs_yaw = view_yaw;
        (view_yaw, 90.)
    } else if es.is_prone() {
        (view_yaw, 90.)
    } else if es.flags.contains(EntityFlags::FIRING) {
        (view_yaw, 45.)
    } else if es.flags.contains(EntityFlags::ADS) || enhanced {
        (view_yaw, 90.)
    } else {
        (legs_dir * TORSO_MOVEMENT_SCALE + view_yaw, 90.)
    };

    ci.torso.yaw.swing(torso_yaw, 0., clamp, speed, frame_time);

    // Legs yaw.
    if es.is_dead() {
        ci.legs.yaw = SwingAngle::new(view_yaw);
    } else {
        let swing_tolerance = if es.is_prone() {
            let angle = if enhanced { view_yaw } else { legs_yaw };
            ci.legs.yaw = SwingAngle::new(angle);
            legs_yaw = angle;
            1.
        } else if legs_strafing(host, es) {
            ci.legs.yaw.swinging = false;
            legs_yaw = view_yaw;
            0.
        } else if ci.legs.yaw.swinging || enhanced {
            0.
        } else {
            LEGS_SWING_TOLERANCE
        };

        ci.legs
            .yaw
            .swing(legs_yaw, swing_tolerance, LEGS_CLAMP, speed, frame_time);
    }

    if using_mg {
        ci.torso.yaw.angle = view_yaw;
        ci.legs.yaw.angle = view_yaw;
    } else if climbing {
        ci.torso.yaw.angle = view_yaw + legs_dir;
        ci.legs.yaw.angle = view_yaw + legs_dir;
    }

    // Torso pitch.
    let destination = if es.is_dead() || using_mg || climbing || es.flags == EntityFlags::MANTLE {
        0.
    } else {
        normalize_180(view_pitch) * PITCH_SCALE
    };
    let pitch_speed = if enhanced {
        ENHANCED_SWING_SPEED
    } else {
        PITCH_SWING_SPEED
    };

    ci.torso
        .pitch
        .swing(destination, 0., 45., pitch_speed, frame_time);
}

/// Returns `true` if the legs animation moves directly sideways.
fn legs_strafing(host: &impl Host, es: &EntityState) -> bool {
    host.animation(es.legs_anim.index())
        .is_some_and(|anim| anim.flags.intersects(AnimFlags::STRAFE_LEFT | AnimFlags::STRAFE_RIGHT))
}
