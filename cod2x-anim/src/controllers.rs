//! Controller target angles.
//!
//! Controllers are additional rotations the game applies on top of the animated skeleton: three
//! back bones, the neck, the head and the pelvis are rotated to follow the view angles and lean,
//! and the whole model is rotated and shifted through the origin tag.

use std::ops::{AddAssign, Index, IndexMut};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    adjust_rotation_for_yaw, angle_subtract, angles_subtract, lean_fraction, normalize_180,
    raised_cosine, AnimationPlayerData, AnimationStore, ClientInfo, ControllerMovement,
    EntityFlags, EntityState, Frame, Host, Locomotion, MoveTypes, PlayerKey, Role,
    StanceTransition,
};

/// One controller slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Controller {
    BackLow,
    BackMid,
    BackUp,
    Neck,
    Head,
    Pelvis,
    /// Rotation of the whole model.
    OriginAngles,
    /// Translation of the whole model.
    OriginOffset,
}

impl Controller {
    pub const ALL: [Self; 8] = [
        Self::BackLow,
        Self::BackMid,
        Self::BackUp,
        Self::Neck,
        Self::Head,
        Self::Pelvis,
        Self::OriginAngles,
        Self::OriginOffset,
    ];

    /// Controllers that rotate a bone.
    pub const BONES: [Self; 6] = [
        Self::BackLow,
        Self::BackMid,
        Self::BackUp,
        Self::Neck,
        Self::Head,
        Self::Pelvis,
    ];

    /// Returns the name of the tag the controller is applied to.
    pub fn tag_name(self) -> &'static str {
        match self {
            Self::BackLow => "back_low",
            Self::BackMid => "back_mid",
            Self::BackUp => "back_up",
            Self::Neck => "neck",
            Self::Head => "head",
            Self::Pelvis => "pelvis",
            Self::OriginAngles | Self::OriginOffset => "tag_origin",
        }
    }

    pub fn is_origin(self) -> bool {
        matches!(self, Self::OriginAngles | Self::OriginOffset)
    }
}

/// Values of all controllers.
///
/// Every slot is a rotation in degrees, except for [`Controller::OriginOffset`] which is a
/// translation in units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Controllers {
    pub back_low: Vec3,
    pub back_mid: Vec3,
    pub back_up: Vec3,
    pub neck: Vec3,
    pub head: Vec3,
    pub pelvis: Vec3,
    pub origin_angles: Vec3,
    pub origin_offset: Vec3,
}

impl Controllers {
    pub const ZERO: Self = Self {
        back_low: Vec3::ZERO,
        back_mid: Vec3::ZERO,
        back_up: Vec3::ZERO,
        neck: Vec3::ZERO,
        head: Vec3::ZERO,
        pelvis: Vec3::ZERO,
        origin_angles: Vec3::ZERO,
        origin_offset: Vec3::ZERO,
    };
}

impl Index<Controller> for Controllers {
    type Output = Vec3;

    fn index(&self, controller: Controller) -> &Vec3 {
        match controller {
            Controller::BackLow => &self.back_low,
            Controller::BackMid => &self.back_mid,
            Controller::BackUp => &self.back_up,
            Controller::Neck => &self.neck,
            Controller::Head => &self.head,
            Controller::Pelvis => &self.pelvis,
            Controller::OriginAngles => &self.origin_angles,
            Controller::OriginOffset => &self.origin_offset,
        }
    }
}

impl IndexMut<Controller> for Controllers {
    fn index_mut(&mut self, controller: Controller) -> &mut Vec3 {
        match controller {
            Controller::BackLow => &mut self.back_low,
            Controller::BackMid => &mut self.back_mid,
            Controller::BackUp => &mut self.back_up,
            Controller::Neck => &mut self.neck,
            Controller::Head => &mut self.head,
            Controller::Pelvis => &mut self.pelvis,
            Controller::OriginAngles => &mut self.origin_angles,
            Controller::OriginOffset => &mut self.origin_offset,
        }
    }
}

impl AddAssign for Controllers {
    fn add_assign(&mut self, rhs: Self) {
        for controller in Controller::ALL {
            self[controller] += rhs[controller];
        }
    }
}

/// Torso and head roll at full lean.
pub const LEAN_ROLL: f32 = 50. * 0.925;
/// Extra torso and head roll when leaning upright.
pub const LEAN_ROLL_UPRIGHT_SCALE: f32 = 1.25;
/// Roll of the whole model at full lean.
pub const LEAN_ORIGIN_ROLL: f32 = 3.75;

/// Sideways shift of the model at full lean, crouching to the left.
pub const LEAN_OFFSET_CROUCH_LEFT: f32 = 12.5;
pub const LEAN_OFFSET_CROUCH_RIGHT: f32 = 2.5;
pub const LEAN_OFFSET_STAND_LEFT: f32 = 5.;
pub const LEAN_OFFSET_STAND_RIGHT: f32 = 2.5;

/// Backward shift of a prone model turned sideways.
pub const PRONE_TURN_OFFSET_X: f32 = -24.;
/// Sideways shift of a prone model turned sideways.
pub const PRONE_TURN_OFFSET_Y: f32 = -12.;
/// Sideways shift of a prone model turned and leaning to the same side.
pub const PRONE_TURN_LEAN_OFFSET_Y: f32 = 16.;

/// Share of the torso angles taken by the back bones when upright.
pub const UPRIGHT_BACK_LOW: Vec3 = Vec3::new(0.2, 0.4, 0.5);
pub const UPRIGHT_BACK_MID: Vec3 = Vec3::new(0.3, 0.4, 0.5);
pub const UPRIGHT_BACK_UP: Vec3 = Vec3::new(0.5, 0.2, -0.6);

/// Share of the head angles taken by the neck and the head.
pub const NECK: Vec3 = Vec3::new(0.3, 0.3, 0.);
pub const HEAD: Vec3 = Vec3::new(0.7, 0.7, -0.3);

/// Blend time into a new standing or crouching movement, in milliseconds.
pub const MOVEMENT_TIME_UPRIGHT: i32 = 250;
pub const MOVEMENT_TIME_PRONE: i32 = 400;
pub const MOVEMENT_TIME_PRONE_BACKWARDS_FIRE: i32 = 100;
pub const MOVEMENT_TIME_PRONE_SIDEWAYS: i32 = 150;

/// Forward and left tilt of the model when moving to the left while leaning left.
pub const LEAN_LEFT_TILT_CROUCH: f32 = 3.8;
pub const LEAN_LEFT_TILT_STAND: f32 = 7.2;

/// Base neck angles on a ladder that cancel out the head rotation of the climbing animations.
pub const CLIMB_UP_NECK: Vec3 = Vec3::new(30., -12., -9.);
pub const CLIMB_DOWN_NECK: Vec3 = Vec3::new(-30., -12., -9.);

/// Fraction of the crouch to prone transition at which the body hits the ground.
pub const PRONE_TOUCHDOWN: f32 = 0.4;

pub const STAND_GRENADE_THROW: &str = "pb_stand_grenade_throw";
pub const CROUCH_GRENADE_THROW: &str = "pb_crouch_grenade_throw";

/// Computes the target controller angles of a player.
///
/// In enhanced mode this also classifies the movement of the player into the store, which
/// [`crate::do_controllers()`] uses to time the blend.
///
/// If `neutral` is set, the server resets the player to the neutral animation instead.
pub fn build_controllers(
    frame: &Frame,
    host: &mut impl Host,
    store: &mut AnimationStore,
    es: &EntityState,
    ci: &ClientInfo,
    neutral: bool,
) -> Controllers {
    let mut control = Controllers::ZERO;

    if neutral && frame.role == Role::Server {
        host.reset_animations(es.client_num);
        return control;
    }

    if es.flags.contains(EntityFlags::MG) {
        return control;
    }

    let move_types = host.move_types(ci);
    let crouching = es.is_crouching();

    let mut head = ci.player_angles;
    let mut torso = Vec3::ZERO;

    control.origin_angles.y = ci.legs.yaw.angle;
    torso.y = ci.torso.yaw.angle;

    if !move_types.intersects(MoveTypes::CLIMB) {
        torso.x = ci.torso.pitch.angle;

        if es.is_prone() {
            torso.x = normalize_180(torso.x);
            torso.x *= if torso.x <= 0. { 0.25 } else { 0.5 };
        }
    }

    head = angles_subtract(head, torso);
    torso = angles_subtract(torso, control.origin_angles);
    control.origin_offset = Vec3::new(0., 0., es.torso_height);

    let lean = lean_fraction(ci.lerp_lean);
    torso.z = lean * LEAN_ROLL;
    head.z = torso.z;

    if lean != 0. {
        let shift = match (crouching, lean <= 0.) {
            (true, true) => LEAN_OFFSET_CROUCH_LEFT,
            (true, false) => LEAN_OFFSET_CROUCH_RIGHT,
            (false, true) => LEAN_OFFSET_STAND_LEFT,
            (false, false) => LEAN_OFFSET_STAND_RIGHT,
        };
        control.origin_offset.y += -lean * shift;
    }

    if !es.is_dead() {
        control.origin_angles.y = angle_subtract(control.origin_angles.y, ci.player_angles.y);
    }

    let waist_delta = if es.torso_pitch != 0. || es.waist_pitch != 0. {
        angle_subtract(es.torso_pitch, es.waist_pitch)
    } else {
        0.
    };

    if es.is_prone() {
        if lean != 0. {
            head.z *= 0.5;
        }

        let (sin, cos) = torso.y.to_radians().sin_cos();

        control.origin_angles.x += es.torso_pitch;
        control.origin_offset.x += (1. - cos) * PRONE_TURN_OFFSET_X;
        control.origin_offset.y += sin * PRONE_TURN_OFFSET_Y;

        if lean * sin > 0. {
            control.origin_offset.y += -lean * (1. - cos) * PRONE_TURN_LEAN_OFFSET_Y;
        }

        control.back_low = Vec3::new(waist_delta, torso.z * -1.2, torso.z * 0.3);
        control.back_mid = Vec3::new(0., torso.y * 0.1 - torso.z * 0.2, torso.z * 0.2);
        control.back_up = Vec3::new(torso.x, torso.y * 0.8 + torso.z, torso.z * -0.2);
    } else {
        if lean != 0. && (!crouching || lean <= 0.) {
            torso.z *= LEAN_ROLL_UPRIGHT_SCALE;
            head.z *= LEAN_ROLL_UPRIGHT_SCALE;
        }

        control.origin_angles.z += lean * LEAN_ORIGIN_ROLL;

        control.back_low = torso * UPRIGHT_BACK_LOW;
        control.back_low.x += waist_delta;
        control.back_mid = torso * UPRIGHT_BACK_MID;
        control.back_up = torso * UPRIGHT_BACK_UP;
    }

    control.neck = head * NECK;
    control.head = head * HEAD;

    if es.waist_pitch != 0. || es.torso_pitch != 0. {
        control.pelvis.x = angle_subtract(es.waist_pitch, es.torso_pitch);
    }

    if frame.compat.is_enhanced() {
        enhance(frame, host, store, es, ci, move_types, lean, &mut control);
    }

    control
}

/// Applies the enhanced animation fixes and classifies the movement.
#[allow(clippy::too_many_arguments)]
fn enhance(
    frame: &Frame,
    host: &mut impl Host,
    store: &mut AnimationStore,
    es: &EntityState,
    ci: &ClientInfo,
    move_types: MoveTypes,
    lean: f32,
    control: &mut Controllers,
) {
    let data = store.get_mut(PlayerKey::new(ci.client_num, frame.role));

    let legs_flags = host
        .animation(es.legs_anim.index())
        .map(|anim| anim.flags)
        .unwrap_or_default();
    let locomotion = Locomotion::new(move_types, legs_flags);
    let movement_yaw = ci.movement_yaw;

    data.movement = ControllerMovement::classify(&locomotion, movement_yaw);

    if es.is_prone() {
        enhance_prone(&*host, ci, &locomotion, data, control);
    } else {
        enhance_upright(es, &locomotion, movement_yaw, lean, data, control);
    }

    if move_types.contains(MoveTypes::CLIMBUP) {
        let pitch = ci.player_angles.x;

        control.neck = CLIMB_UP_NECK + ladder_look(ci);
        control.neck = adjust_rotation_for_yaw(Vec3::ZERO, control.neck);

        let looking_down = pitch.clamp(0., 90.).to_radians().sin();
        control.neck.x += looking_down * movement_yaw.clamp(-90., 0.).to_radians().sin() * 45.;
        control.neck.y += looking_down * movement_yaw.clamp(0., 90.).to_radians().sin() * 30.;

        data.movement |= ControllerMovement::CLIMBUP;
    } else if move_types.contains(MoveTypes::CLIMBDOWN) {
        control.neck = CLIMB_DOWN_NECK + ladder_look(ci);
        control.neck = adjust_rotation_for_yaw(Vec3::ZERO, control.neck);

        data.movement |= ControllerMovement::CLIMBDOWN;
    }

    if frame.role == Role::Server && grenade_throw_mismatch(&*host, es, ci) {
        trace!(client_num = es.client_num, "clearing mismatched grenade throw");
        host.clear_legs_timer(es.client_num);
    }

    apply_stance_transition(frame, data, control);

    trace!(
        role = ?frame.role,
        client_num = ci.client_num,
        movement = ?data.movement,
        "classified movement"
    );
}

fn enhance_upright(
    es: &EntityState,
    locomotion: &Locomotion,
    movement_yaw: f32,
    lean: f32,
    data: &mut AnimationPlayerData,
    control: &mut Controllers,
) {
    let crouching = es.is_crouching();

    data.movement |= if crouching {
        ControllerMovement::CROUCH
    } else {
        ControllerMovement::STAND
    };
    data.movement_time = MOVEMENT_TIME_UPRIGHT;

    // Moving to the left while leaning left, shift the model to the left.
    if lean < 0. && locomotion.is_moving() && movement_yaw > 0. && movement_yaw < 90. {
        let offset = -lean;

        let (tilt, flag) = if crouching {
            (LEAN_LEFT_TILT_CROUCH, ControllerMovement::CROUCH_LEAN_LEFT)
        } else {
            (LEAN_LEFT_TILT_STAND, ControllerMovement::STAND_LEAN_LEFT)
        };

        control.origin_angles.x += offset * tilt;
        control.origin_angles.z -= offset * tilt;
        data.movement |= flag;
    }

    // Bend further forward so the head ends up lower.
    if crouching && lean < 0. && locomotion.is_moving() {
        control.back_low.x += 40. * -lean;
        control.back_low.y += 30. * -lean;
        control.back_mid.x += -20. * -lean;
        control.back_up.x += -20. * -lean;
    }

    control.back_low = adjust_rotation_for_yaw(control.origin_angles, control.back_low);
}

fn enhance_prone(
    host: &impl Host,
    ci: &ClientInfo,
    locomotion: &Locomotion,
    data: &mut AnimationPlayerData,
    control: &mut Controllers,
) {
    data.movement |= ControllerMovement::PRONE;
    data.movement_time = MOVEMENT_TIME_PRONE;

    // Full at no lean, none at a quarter lean.
    let scale = if ci.lerp_lean < 0. {
        (0.25 + ci.lerp_lean) / 0.25
    } else if ci.lerp_lean > 0. {
        (0.25 - ci.lerp_lean) / 0.25
    } else {
        1.
    };

    // Flatten the back so the items on the sides sink into the ground.
    control.back_low.x += -30. * scale;
    control.back_mid.x += 30. * scale;
    if locomotion.is_moving() && !locomotion.is_sideways() {
        control.back_low.x += -10. * scale;
        control.back_mid.x += 10. * scale;
    }
    control.pelvis.x += 3.;

    let torso_anim = ci.torso.animation.and_then(|index| host.animation(index));
    let reloading = torso_anim.is_some_and(|anim| anim.name.contains("reload"));

    if locomotion.backward && scale != 0. {
        control.origin_offset.y += -8.;
        control.origin_offset.z += -3.;
        control.back_low.x += -20.;
        control.pelvis.x += 7.;

        match torso_anim {
            None => control.origin_offset.z += -3.,
            Some(_) if reloading => {
                control.pelvis.x += 14.;
                control.origin_offset.z += -3.;
                data.movement |= ControllerMovement::PRONE_BACKWARDS_RELOAD;
            }
            Some(_) => {
                control.pelvis.x += 13.;
                control.origin_offset.z += -3.;
                data.movement_time = MOVEMENT_TIME_PRONE_BACKWARDS_FIRE;
                data.movement |= ControllerMovement::PRONE_BACKWARDS_FIRE;
            }
        }
    } else if locomotion.is_sideways() && scale != 0. {
        control.origin_offset.z += -1.;
        data.movement_time = MOVEMENT_TIME_PRONE_SIDEWAYS;
    } else if locomotion.forward && reloading {
        control.pelvis.x += 3.;
        data.movement |= ControllerMovement::PRONE_FORWARD_RELOAD;
    }
}

/// Neck angles following the view on a ladder.
fn ladder_look(ci: &ClientInfo) -> Vec3 {
    Vec3::new(
        ci.player_angles.x.clamp(-80., 70.),
        normalize_180(ci.player_angles.y - ci.torso.yaw.angle),
        0.,
    )
}

/// Returns `true` if the player is throwing a grenade with the animation of another stance.
fn grenade_throw_mismatch(host: &impl Host, es: &EntityState, ci: &ClientInfo) -> bool {
    let Some(legs) = ci.legs.animation.and_then(|index| host.animation(index)) else {
        return false;
    };

    let crouching = es.is_crouching();
    (legs.name == STAND_GRENADE_THROW && (es.is_prone() || crouching))
        || (legs.name == CROUCH_GRENADE_THROW && !crouching)
}

/// Adds the in-progress stance transition on top of the target.
fn apply_stance_transition(frame: &Frame, data: &AnimationPlayerData, control: &mut Controllers) {
    let fraction = data.raw_stance_transition_fraction(frame.time);
    if fraction <= 0. || fraction >= 1. {
        return;
    }

    match data.stance_transition {
        StanceTransition::CrouchToProne => {
            let falling = (fraction / (1. - PRONE_TOUCHDOWN)).clamp(0., 1.);
            let landed = ((fraction - PRONE_TOUCHDOWN) / (1. - PRONE_TOUCHDOWN)).clamp(0., 1.);

            let falling = raised_cosine(falling);
            let landed = raised_cosine(landed);

            // Keep the head centered on the first person view.
            control.origin_offset.x += falling * -5.;

            // Bounce off the ground.
            control.origin_offset.z += landed * 12.;
            control.origin_angles.x += landed * -10.;
            control.back_low.x += landed * 10.;
        }
        StanceTransition::ProneToCrouch => {
            control.origin_offset.x += raised_cosine(fraction) * -5.;
        }
        _ => (),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use crate::{AnimNum, Compat};

    fn upright_client() -> (EntityState, ClientInfo) {
        let es = entity_state(0);
        let mut ci = client_info(0);
        ci.player_angles = Vec3::new(10., 90., 0.);
        ci.legs.yaw.angle = 80.;
        ci.torso.yaw.angle = 85.;
        ci.torso.pitch.angle = 6.;
        (es, ci)
    }

    #[test]
    fn upright_baseline() {
        let mut host = TestHost::new();
        let mut store = AnimationStore::new();
        let (es, ci) = upright_client();

        let frame = frame(Role::Client, Compat::Legacy, 0);
        let control = build_controllers(&frame, &mut host, &mut store, &es, &ci, false);

        assert_vec_eq(control.origin_angles, Vec3::new(0., -10., 0.));
        assert_vec_eq(control.origin_offset, Vec3::ZERO);
        assert_vec_eq(control.back_low, Vec3::new(1.2, 2., 0.));
        assert_vec_eq(control.back_mid, Vec3::new(1.8, 2., 0.));
        assert_vec_eq(control.back_up, Vec3::new(3., 1., 0.));
        assert_vec_eq(control.neck, Vec3::new(1.2, 1.5, 0.));
        assert_vec_eq(control.head, Vec3::new(2.8, 3.5, 0.));
        assert_vec_eq(control.pelvis, Vec3::ZERO);

        // Legacy mode doesn't touch the store.
        assert_eq!(
            *store.get(PlayerKey::new(0, Role::Client)),
            AnimationPlayerData::new()
        );
    }

    #[test]
    fn full_left_lean_standing() {
        let mut host = TestHost::new();
        let mut store = AnimationStore::new();
        let (es, mut ci) = upright_client();
        ci.lerp_lean = -1.;

        let frame = frame(Role::Client, Compat::Legacy, 0);
        let control = build_controllers(&frame, &mut host, &mut store, &es, &ci, false);

        assert_vec_eq(control.origin_offset, Vec3::new(0., 5., 0.));
        assert!((control.origin_angles.z - -3.75).abs() < 1e-4);

        // Standing lean rolls further.
        let roll = -LEAN_ROLL * LEAN_ROLL_UPRIGHT_SCALE;
        assert!((control.back_low.z - roll * 0.5).abs() < 1e-4);
        assert!((control.head.z - roll * -0.3).abs() < 1e-4);
    }

    #[test]
    fn lean_offsets_per_stance() {
        let mut host = TestHost::new();
        let mut store = AnimationStore::new();
        let (mut es, mut ci) = upright_client();
        let frame = frame(Role::Client, Compat::Legacy, 0);

        ci.lerp_lean = 1.;
        let control = build_controllers(&frame, &mut host, &mut store, &es, &ci, false);
        assert!((control.origin_offset.y - -2.5).abs() < 1e-4);

        es.flags = EntityFlags::CROUCH;
        ci.lerp_lean = -1.;
        let control = build_controllers(&frame, &mut host, &mut store, &es, &ci, false);
        assert!((control.origin_offset.y - 12.5).abs() < 1e-4);

        // Crouching and leaning right doesn't roll further.
        ci.lerp_lean = 1.;
        let control = build_controllers(&frame, &mut host, &mut store, &es, &ci, false);
        assert!((control.origin_offset.y - -2.5).abs() < 1e-4);
        assert!((control.back_low.z - LEAN_ROLL * 0.5).abs() < 1e-4);
    }

    #[test]
    fn no_lean_no_lean_contributions() {
        let mut host = TestHost::new();
        let mut store = AnimationStore::new();
        let (es, mut ci) = upright_client();
        ci.legs.yaw.angle = 90.;
        ci.torso.yaw.angle = 90.;

        for compat in [Compat::Legacy, Compat::Enhanced] {
            let frame = frame(Role::Client, compat, 0);
            let control = build_controllers(&frame, &mut host, &mut store, &es, &ci, false);

            assert_eq!(control.origin_offset.y, 0.);
            assert_eq!(control.origin_angles.z, 0.);
            assert_eq!(control.back_low.z, 0.);
            assert_eq!(control.back_mid.z, 0.);
            assert_eq!(control.back_up.z, 0.);
            assert_eq!(control.neck.z, 0.);
        }
    }

    #[test]
    fn mounted_gun_skips_controllers() {
        let mut host = TestHost::new();
        let mut store = AnimationStore::new();
        let (mut es, mut ci) = upright_client();
        es.flags = EntityFlags::MG;
        ci.lerp_lean = -1.;

        let frame = frame(Role::Server, Compat::Enhanced, 0);
        let control = build_controllers(&frame, &mut host, &mut store, &es, &ci, false);
        assert_eq!(control, Controllers::ZERO);
        assert!(store.get(PlayerKey::new(0, Role::Server)).movement.is_empty());
    }

    #[test]
    fn neutral_resets_only_on_server() {
        let mut host = TestHost::new();
        let mut store = AnimationStore::new();
        let (mut es, ci) = upright_client();
        es.client_num = 7;

        let frame = frame(Role::Server, Compat::Legacy, 0);
        let control = build_controllers(&frame, &mut host, &mut store, &es, &ci, true);
        assert_eq!(control, Controllers::ZERO);
        assert_eq!(host.reset, [7]);

        let frame = crate::test_utils::frame(Role::Client, Compat::Legacy, 0);
        let control = build_controllers(&frame, &mut host, &mut store, &es, &ci, true);
        assert_ne!(control, Controllers::ZERO);
        assert_eq!(host.reset, [7]);
    }

    #[test]
    fn enhanced_classifies_movement() {
        let mut host = TestHost::new();
        host.move_types = MoveTypes::RUN;
        let mut store = AnimationStore::new();
        let (mut es, mut ci) = upright_client();
        es.legs_anim = AnimNum(STAND_RUN);
        ci.movement_yaw = 45.;

        let frame = frame(Role::Server, Compat::Enhanced, 0);
        build_controllers(&frame, &mut host, &mut store, &es, &ci, false);

        let data = store.get(PlayerKey::new(0, Role::Server));
        assert_eq!(
            data.movement,
            ControllerMovement::DEFAULT
                | ControllerMovement::MOVING
                | ControllerMovement::MOVING_LEFT_STRAFE
                | ControllerMovement::STAND
        );
        assert_eq!(data.movement_time, 250);
        assert!(store.get(PlayerKey::new(0, Role::Client)).movement.is_empty());
    }

    #[test]
    fn leaning_left_while_moving_left() {
        let mut host = TestHost::new();
        host.move_types = MoveTypes::RUNCR;
        let mut store = AnimationStore::new();
        let (mut es, mut ci) = upright_client();
        es.flags = EntityFlags::CROUCH;
        ci.lerp_lean = -1.;
        ci.movement_yaw = 45.;

        let frame = frame(Role::Client, Compat::Enhanced, 0);
        let control = build_controllers(&frame, &mut host, &mut store, &es, &ci, false);

        let data = store.get(PlayerKey::new(0, Role::Client));
        assert!(data.movement.contains(ControllerMovement::CROUCH_LEAN_LEFT));
        assert!(!data.movement.contains(ControllerMovement::STAND_LEAN_LEFT));
        assert!((control.origin_angles.x - 3.8).abs() < 1e-4);

        // Bent forward on top of the baseline.
        assert!(control.back_mid.x < 0.);
        assert!(control.back_up.x < 0.);
    }

    #[test]
    fn prone_backwards_fire() {
        let mut host = TestHost::new();
        host.move_types = MoveTypes::WALKPRONEBK;
        let mut store = AnimationStore::new();
        let (mut es, mut ci) = upright_client();
        es.flags = EntityFlags::PRONE;
        ci.torso.animation = Some(TORSO_FIRE);

        let frame = frame(Role::Server, Compat::Enhanced, 0);
        let control = build_controllers(&frame, &mut host, &mut store, &es, &ci, false);

        let data = store.get(PlayerKey::new(0, Role::Server));
        assert!(data
            .movement
            .contains(ControllerMovement::PRONE | ControllerMovement::PRONE_BACKWARDS_FIRE));
        assert_eq!(data.movement_time, 100);
        assert!((control.pelvis.x - (3. + 7. + 13.)).abs() < 1e-4);
        assert!((control.origin_offset.z - -6.).abs() < 1e-4);

        ci.torso.animation = Some(TORSO_RELOAD);
        let control = build_controllers(&frame, &mut host, &mut store, &es, &ci, false);
        let data = store.get(PlayerKey::new(0, Role::Server));
        assert!(data
            .movement
            .contains(ControllerMovement::PRONE_BACKWARDS_RELOAD));
        assert_eq!(data.movement_time, 400);
        assert!((control.pelvis.x - (3. + 7. + 14.)).abs() < 1e-4);
    }

    #[test]
    fn prone_flattening_fades_with_lean() {
        let mut host = TestHost::new();
        host.move_types = MoveTypes::IDLEPRONE;
        let mut store = AnimationStore::new();
        let (mut es, mut ci) = upright_client();
        es.flags = EntityFlags::PRONE;
        let frame = frame(Role::Client, Compat::Enhanced, 0);

        let legacy = {
            let frame = crate::test_utils::frame(Role::Client, Compat::Legacy, 0);
            build_controllers(&frame, &mut host, &mut store, &es, &ci, false)
        };
        let control = build_controllers(&frame, &mut host, &mut store, &es, &ci, false);
        assert!((control.back_mid.x - legacy.back_mid.x - 30.).abs() < 1e-4);

        ci.lerp_lean = 0.25;
        let legacy = {
            let frame = crate::test_utils::frame(Role::Client, Compat::Legacy, 0);
            build_controllers(&frame, &mut host, &mut store, &es, &ci, false)
        };
        let control = build_controllers(&frame, &mut host, &mut store, &es, &ci, false);
        assert!((control.back_mid.x - legacy.back_mid.x).abs() < 1e-4);
    }

    #[test]
    fn grenade_throw_mismatch_is_cleared_on_server() {
        let mut host = TestHost::new();
        let mut store = AnimationStore::new();
        let (mut es, mut ci) = upright_client();
        es.flags = EntityFlags::CROUCH;
        es.client_num = 4;
        ci.legs.animation = Some(STAND_GRENADE);

        let client = frame(Role::Client, Compat::Enhanced, 0);
        build_controllers(&client, &mut host, &mut store, &es, &ci, false);
        assert!(host.cleared_legs_timers.is_empty());

        let server = frame(Role::Server, Compat::Enhanced, 0);
        build_controllers(&server, &mut host, &mut store, &es, &ci, false);
        assert_eq!(host.cleared_legs_timers, [4]);

        // Matching stance.
        ci.legs.animation = Some(CROUCH_GRENADE);
        build_controllers(&server, &mut host, &mut store, &es, &ci, false);
        assert_eq!(host.cleared_legs_timers, [4]);

        es.flags = EntityFlags::empty();
        build_controllers(&server, &mut host, &mut store, &es, &ci, false);
        assert_eq!(host.cleared_legs_timers, [4, 4]);
    }

    #[test]
    fn climbing_up_looks_around() {
        let mut host = TestHost::new();
        host.move_types = MoveTypes::CLIMBUP;
        let mut store = AnimationStore::new();
        let (es, mut ci) = upright_client();
        ci.player_angles = Vec3::new(0., 85., 0.);

        let frame = frame(Role::Client, Compat::Enhanced, 0);
        let control = build_controllers(&frame, &mut host, &mut store, &es, &ci, false);

        // Looking straight ahead along the ladder leaves just the base angles.
        assert_vec_eq(
            control.neck,
            adjust_rotation_for_yaw(Vec3::ZERO, CLIMB_UP_NECK),
        );
        assert!(store
            .get(PlayerKey::new(0, Role::Client))
            .movement
            .contains(ControllerMovement::CLIMBUP));
    }

    #[test]
    fn crouch_to_prone_curve() {
        let mut host = TestHost::new();
        host.move_types = MoveTypes::IDLEPRONE;
        let mut store = AnimationStore::new();
        let (mut es, ci) = upright_client();
        es.flags = EntityFlags::PRONE;

        let data = store.get_mut(PlayerKey::new(0, Role::Client));
        data.stance_transition = StanceTransition::CrouchToProne;
        data.stance_transition_time = 400;
        data.stance_transition_end = 1400;

        let before = build_controllers(
            &frame(Role::Client, Compat::Enhanced, 1400),
            &mut host,
            &mut store,
            &es,
            &ci,
            false,
        );
        let during = build_controllers(
            &frame(Role::Client, Compat::Enhanced, 1200),
            &mut host,
            &mut store,
            &es,
            &ci,
            false,
        );

        // Halfway through both curves are at a quarter.
        let diff = during.origin_offset - before.origin_offset;
        assert_vec_eq(diff, Vec3::new(-1.25, 0., 3.));
        assert!((during.origin_angles.x - before.origin_angles.x - -2.5).abs() < 1e-3);
        assert!((during.back_low.x - before.back_low.x - 2.5).abs() < 1e-3);
    }

    #[test]
    fn prone_to_crouch_curve() {
        let mut host = TestHost::new();
        host.move_types = MoveTypes::IDLECR;
        let mut store = AnimationStore::new();
        let (mut es, ci) = upright_client();
        es.flags = EntityFlags::CROUCH;

        let data = store.get_mut(PlayerKey::new(0, Role::Server));
        data.stance_transition = StanceTransition::ProneToCrouch;
        data.stance_transition_time = 400;
        data.stance_transition_end = 400;

        let control = build_controllers(
            &frame(Role::Server, Compat::Enhanced, 200),
            &mut host,
            &mut store,
            &es,
            &ci,
            false,
        );
        assert!((control.origin_offset.x - -5.).abs() < 1e-4);

        // The other role is not in a transition.
        let control = build_controllers(
            &frame(Role::Client, Compat::Enhanced, 200),
            &mut host,
            &mut store,
            &es,
            &ci,
            false,
        );
        assert_eq!(control.origin_offset.x, 0.);
    }

    #[test]
    fn legacy_prone_turn_and_back() {
        let mut host = TestHost::new();
        host.move_types = MoveTypes::IDLEPRONE;
        let mut store = AnimationStore::new();
        let mut es = entity_state(0);
        es.flags = EntityFlags::PRONE;
        es.torso_pitch = 4.;
        es.waist_pitch = 1.;
        let mut ci = client_info(0);
        ci.player_angles = Vec3::new(0., 90., 0.);
        ci.legs.yaw.angle = 90.;
        ci.torso.yaw.angle = 120.;
        ci.torso.pitch.angle = -20.;
        // Eased to 0.75, which rolls the torso by 34.6875.
        ci.lerp_lean = 0.5;

        let frame = frame(Role::Client, Compat::Legacy, 0);
        let control = build_controllers(&frame, &mut host, &mut store, &es, &ci, false);

        // Torso turned 30 degrees: x is (1 - cos 30) * -24, y is sin 30 * -12 plus the right lean
        // shift of -1.875 and the lean correction of -0.75 * (1 - cos 30) * 16.
        assert_vec_eq(control.origin_offset, Vec3::new(-3.2154, -9.4827, 0.));
        assert_vec_eq(control.origin_angles, Vec3::new(4., 0., 0.));

        assert_vec_eq(control.back_low, Vec3::new(3., -41.625, 10.40625));
        assert_vec_eq(control.back_mid, Vec3::new(0., -3.9375, 6.9375));
        // Looking down only takes a quarter of the pitch.
        assert_vec_eq(control.back_up, Vec3::new(-5., 58.6875, -6.9375));

        // Lean roll on the head is halved.
        assert_vec_eq(control.neck, Vec3::new(1.5, -9., 0.));
        assert_vec_eq(control.head, Vec3::new(3.5, -21., -5.203125));
        assert_vec_eq(control.pelvis, Vec3::new(-3., 0., 0.));

        // Leaning against the turn skips the correction.
        ci.lerp_lean = -0.5;
        let control = build_controllers(&frame, &mut host, &mut store, &es, &ci, false);
        assert!((control.origin_offset.y - (3.75 - 6.)).abs() < 1e-3);
    }

    fn prone_client() -> (EntityState, ClientInfo) {
        let mut es = entity_state(0);
        es.flags = EntityFlags::PRONE;
        es.legs_anim = AnimNum(PRONE_IDLE);
        let mut ci = client_info(0);
        ci.player_angles = Vec3::new(0., 90., 0.);
        ci.legs.yaw.angle = 90.;
        ci.torso.yaw.angle = 90.;
        (es, ci)
    }

    #[test]
    fn prone_crawling_sideways() {
        let mut host = TestHost::new();
        host.move_types = MoveTypes::WALKPRONE;
        let mut store = AnimationStore::new();
        let (mut es, ci) = prone_client();
        let frame = frame(Role::Client, Compat::Enhanced, 0);

        let control = build_controllers(&frame, &mut host, &mut store, &es, &ci, false);
        let data = *store.get(PlayerKey::new(0, Role::Client));
        assert_eq!(data.movement_time, 400);
        assert_vec_eq(control.back_low, Vec3::new(-40., 0., 0.));
        assert_vec_eq(control.back_mid, Vec3::new(40., 0., 0.));
        assert_vec_eq(control.origin_offset, Vec3::ZERO);

        es.legs_anim = AnimNum(STRAFE_LEFT_RUN);
        let control = build_controllers(&frame, &mut host, &mut store, &es, &ci, false);
        let data = *store.get(PlayerKey::new(0, Role::Client));
        assert_eq!(
            data.movement,
            ControllerMovement::DEFAULT
                | ControllerMovement::MOVING
                | ControllerMovement::MOVING_LEFT
                | ControllerMovement::PRONE
        );
        assert_eq!(data.movement_time, 150);
        // No extra flattening when crawling sideways, and the body sinks a little.
        assert_vec_eq(control.back_low, Vec3::new(-30., 0., 0.));
        assert_vec_eq(control.back_mid, Vec3::new(30., 0., 0.));
        assert_vec_eq(control.origin_offset, Vec3::new(0., 0., -1.));
        assert_vec_eq(control.pelvis, Vec3::new(3., 0., 0.));
    }

    #[test]
    fn prone_crawling_forward_while_reloading() {
        let mut host = TestHost::new();
        host.move_types = MoveTypes::WALKPRONE;
        let mut store = AnimationStore::new();
        let (es, mut ci) = prone_client();
        let frame = frame(Role::Server, Compat::Enhanced, 0);

        ci.torso.animation = Some(TORSO_FIRE);
        let control = build_controllers(&frame, &mut host, &mut store, &es, &ci, false);
        let data = *store.get(PlayerKey::new(0, Role::Server));
        assert!(!data.movement.contains(ControllerMovement::PRONE_FORWARD_RELOAD));
        assert_vec_eq(control.pelvis, Vec3::new(3., 0., 0.));

        ci.torso.animation = Some(TORSO_RELOAD);
        let control = build_controllers(&frame, &mut host, &mut store, &es, &ci, false);
        let data = *store.get(PlayerKey::new(0, Role::Server));
        assert!(data
            .movement
            .contains(ControllerMovement::PRONE | ControllerMovement::PRONE_FORWARD_RELOAD));
        assert_eq!(data.movement_time, 400);
        assert_vec_eq(control.pelvis, Vec3::new(6., 0., 0.));
        assert_vec_eq(control.origin_offset, Vec3::ZERO);
    }

    #[test]
    fn climbing_down_looks_around() {
        let mut host = TestHost::new();
        host.move_types = MoveTypes::CLIMBDOWN;
        let mut store = AnimationStore::new();
        let (es, mut ci) = upright_client();
        ci.player_angles = Vec3::new(20., 100., 0.);
        let frame = frame(Role::Client, Compat::Enhanced, 0);

        // Base (-30, -12, -9) plus the look (20, 15, 0), re-projected through 3 degrees of yaw.
        let control = build_controllers(&frame, &mut host, &mut store, &es, &ci, false);
        assert_vec_eq(control.neck, Vec3::new(-9.5153, 3., -9.5110));

        let movement = store.get(PlayerKey::new(0, Role::Client)).movement;
        assert!(movement.contains(ControllerMovement::CLIMBDOWN));
        assert!(!movement.contains(ControllerMovement::CLIMBUP));

        // Pitch is clamped to 70 looking down.
        ci.player_angles = Vec3::new(85., 85., 0.);
        let control = build_controllers(&frame, &mut host, &mut store, &es, &ci, false);
        assert_vec_eq(control.neck, Vec3::new(37.2547, -12., -17.1198));
    }

    #[test]
    fn leaning_left_while_running_left_standing() {
        let mut host = TestHost::new();
        host.move_types = MoveTypes::RUN;
        let mut store = AnimationStore::new();
        let (es, mut ci) = upright_client();
        ci.lerp_lean = -1.;
        ci.movement_yaw = 45.;
        let frame = frame(Role::Client, Compat::Enhanced, 0);

        let control = build_controllers(&frame, &mut host, &mut store, &es, &ci, false);
        let data = *store.get(PlayerKey::new(0, Role::Client));
        assert!(data.movement.contains(ControllerMovement::STAND_LEAN_LEFT));
        assert!(!data.movement.contains(ControllerMovement::CROUCH_LEAN_LEFT));
        // The tilt comes on top of the -3.75 lean roll.
        assert_vec_eq(control.origin_angles, Vec3::new(7.2, -10., -10.95));

        // Eased to 0.75.
        ci.lerp_lean = -0.5;
        let control = build_controllers(&frame, &mut host, &mut store, &es, &ci, false);
        assert_vec_eq(control.origin_angles, Vec3::new(5.4, -10., -8.2125));

        // Running right.
        ci.movement_yaw = -45.;
        let control = build_controllers(&frame, &mut host, &mut store, &es, &ci, false);
        let data = *store.get(PlayerKey::new(0, Role::Client));
        assert!(!data.movement.contains(ControllerMovement::STAND_LEAN_LEFT));
        assert_vec_eq(control.origin_angles, Vec3::new(0., -10., -2.8125));
    }

    #[test]
    fn enhanced_lower_back_follows_the_legs_yaw() {
        let mut host = TestHost::new();
        let mut store = AnimationStore::new();
        let (es, ci) = upright_client();

        let legacy = build_controllers(
            &frame(Role::Client, Compat::Legacy, 0),
            &mut host,
            &mut store,
            &es,
            &ci,
            false,
        );
        let enhanced = build_controllers(
            &frame(Role::Client, Compat::Enhanced, 0),
            &mut host,
            &mut store,
            &es,
            &ci,
            false,
        );

        // 12 degrees between the lower back and the model: the pitch of 1.2 partly turns into roll.
        assert_vec_eq(legacy.back_low, Vec3::new(1.2, 2., 0.));
        assert_vec_eq(enhanced.back_low, Vec3::new(1.1738, 2., 0.2495));
        assert_vec_eq(enhanced.back_mid, legacy.back_mid);
        assert_vec_eq(enhanced.back_up, legacy.back_up);
    }

    #[test]
    fn build_is_deterministic() {
        let mut host = TestHost::new();
        host.move_types = MoveTypes::WALKCR;
        let mut store = AnimationStore::new();
        let (mut es, mut ci) = upright_client();
        es.flags = EntityFlags::CROUCH;
        es.torso_pitch = 5.;
        es.waist_pitch = -3.;
        ci.lerp_lean = -0.4;
        ci.movement_yaw = 30.;

        let frame = frame(Role::Server, Compat::Enhanced, 5000);
        let first = build_controllers(&frame, &mut host, &mut store, &es, &ci, false);
        let data = *store.get(PlayerKey::new(0, Role::Server));
        let second = build_controllers(&frame, &mut host, &mut store, &es, &ci, false);

        assert_eq!(first, second);
        assert_eq!(data, *store.get(PlayerKey::new(0, Role::Server)));
    }

    #[test]
    fn controller_indexing() {
        let mut control = Controllers::ZERO;
        control[Controller::Neck] = Vec3::X;
        let copy = control;
        control += copy;
        assert_eq!(control.neck, Vec3::new(2., 0., 0.));
        assert_eq!(Controller::Neck.tag_name(), "neck");
        assert_eq!(Controller::OriginOffset.tag_name(), "tag_origin");
        assert_eq!(Controller::BONES.iter().filter(|c| c.is_origin()).count(), 0);
    }
}
