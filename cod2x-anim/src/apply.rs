//! Blending the controllers towards their targets and writing them to the model.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    build_controllers, lerp_angles, lerp_offset, AnimationStore, ClientInfo, Controller,
    Controllers, EntityState, Frame, Host, PlayerKey,
};

/// Maximal controller rotation per millisecond when blending by steps, in degrees.
pub const MAX_ANGLE_CHANGE_PER_MS: f32 = 0.36;

/// Maximal origin translation per millisecond when blending by steps, in units.
pub const MAX_OFFSET_CHANGE_PER_MS: f32 = 0.1;

/// Blend time into a new movement that didn't set one, in milliseconds.
pub const DEFAULT_MOVEMENT_TIME: i32 = 300;

/// Bone tags of a player model.
pub trait BoneTags {
    /// Sets the rotation of a bone controller.
    ///
    /// Never called with [`Controller::OriginAngles`] or [`Controller::OriginOffset`].
    fn set_control_tag_angles(&mut self, controller: Controller, angles: Vec3);

    /// Sets the translation and rotation of the origin tag.
    fn set_origin(&mut self, offset: Vec3, angles: Vec3);
}

/// Operator tuning of the controllers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Tuning {
    /// Reset players to the neutral animation.
    pub neutral: bool,
    /// Constant offsets added to the targets in enhanced mode.
    pub offsets: Option<Controllers>,
}

/// Updates the controllers of a player and writes them to the model.
///
/// The cached controllers in `ci.control` move towards freshly built targets. In legacy mode they
/// move by at most a fixed step per millisecond. In enhanced mode a change of movement starts a
/// linear blend from the current pose into the targets, which falls back to steps once it's over.
///
/// Returns the targets.
#[instrument(level = "trace", skip_all, fields(role = ?frame.role, client_num = ci.client_num))]
pub fn do_controllers(
    frame: &Frame,
    host: &mut impl Host,
    store: &mut AnimationStore,
    bones: &mut impl BoneTags,
    es: &EntityState,
    ci: &mut ClientInfo,
    tuning: &Tuning,
) -> Controllers {
    let mut target = build_controllers(frame, host, store, es, ci, tuning.neutral);

    let frame_time = frame.frame_time as f32;
    let max_angle_change = frame_time * MAX_ANGLE_CHANGE_PER_MS;
    let max_offset_change = frame_time * MAX_OFFSET_CHANGE_PER_MS;

    if !frame.compat.is_enhanced() {
        for controller in Controller::BONES {
            lerp_angles(target[controller], max_angle_change, &mut ci.control[controller]);
            bones.set_control_tag_angles(controller, ci.control[controller]);
        }

        lerp_angles(
            target.origin_angles,
            max_angle_change,
            &mut ci.control.origin_angles,
        );
        lerp_offset(
            target.origin_offset,
            max_offset_change,
            &mut ci.control.origin_offset,
        );
        bones.set_origin(ci.control.origin_offset, ci.control.origin_angles);

        return target;
    }

    if let Some(offsets) = tuning.offsets {
        target += offsets;
    }

    let data = store.get_mut(PlayerKey::new(ci.client_num, frame.role));

    if data.movement != data.movement_last {
        data.movement_last = data.movement;
        if data.movement_time <= 0 {
            data.movement_time = DEFAULT_MOVEMENT_TIME;
        }
        data.movement_end_time = frame.time + data.movement_time;
        data.movement_running = true;
        data.movement_start = ci.control;

        debug!(
            time = frame.time,
            movement = ?data.movement_last,
            duration = data.movement_time,
            "controller movement changed"
        );
    }

    let raw_fraction = if data.movement_time > 0 {
        1. - (data.movement_end_time - frame.time) as f32 / data.movement_time as f32
    } else {
        f32::INFINITY
    };
    let blending = (0. ..=1.).contains(&raw_fraction);
    let fraction = raw_fraction.clamp(0., 1.);

    for controller in Controller::ALL {
        let current = &mut ci.control[controller];

        if blending {
            *current = data.movement_start[controller].lerp(target[controller], fraction);
        } else if controller == Controller::OriginOffset {
            lerp_offset(target[controller], max_offset_change, current);
        } else {
            lerp_angles(target[controller], max_angle_change, current);
        }

        if !controller.is_origin() {
            bones.set_control_tag_angles(controller, *current);
        }
    }

    bones.set_origin(ci.control.origin_offset, ci.control.origin_angles);

    if data.movement_running && raw_fraction > 1. {
        data.movement_running = false;
        debug!(time = frame.time, "controller movement finished");
    }

    target
}
