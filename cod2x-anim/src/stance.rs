//! Stance transitions between standing, crouching and going prone.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{AnimNum, AnimationStore, Body, ClientInfo, Frame, Host, MoveTypes, PlayerKey};

/// Duration of the transition between standing and crouching, in milliseconds.
pub const PLAYER_CROUCH_TIME: i32 = 150;

/// Duration of the transition between crouching and prone, in milliseconds.
pub const PLAYER_PRONE_TIME: i32 = 400;

/// Scale of the crouch to prone animation blend.
///
/// The first person view drops faster than the prone transition takes.
pub const CROUCH_TO_PRONE_BLEND_SCALE: f64 = 0.58;

/// Blend time into the neutral animation.
pub const NEUTRAL_BLEND_TIME: i32 = 200;

/// Minimal blend time between two stationary animations.
pub const MIN_BLEND_TIME_STATIONARY: i32 = 170;

/// Minimal blend time from a moving animation into a stationary one.
pub const MIN_BLEND_TIME_STOPPING: i32 = 250;

/// Minimal blend time into a moving animation.
pub const MIN_BLEND_TIME_MOVING: i32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StanceTransition {
    #[default]
    None = 0,
    StandToCrouch = 1,
    CrouchToProne = 2,
    ProneToCrouch = 3,
    CrouchToStand = 4,
}

/// Stance an animation is played in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StancePose {
    pub crouching: bool,
    pub prone: bool,
}

impl StancePose {
    pub fn from_move_types(move_types: MoveTypes) -> Self {
        Self {
            crouching: move_types.intersects(MoveTypes::CROUCH),
            prone: move_types.intersects(MoveTypes::PRONE),
        }
    }

    /// Returns the stance of the given animation.
    ///
    /// Animations outside of the script are treated as standing.
    pub fn of(host: &impl Host, anim: AnimNum) -> Self {
        let move_types = host
            .animation(anim.index())
            .map(|anim| anim.move_types)
            .unwrap_or_else(MoveTypes::empty);
        Self::from_move_types(move_types)
    }

    pub fn standing(self) -> bool {
        !self.crouching && !self.prone
    }
}

impl StanceTransition {
    /// Classifies the transition from the `old` stance into the `new` one.
    pub fn between(old: StancePose, new: StancePose) -> Self {
        if old.standing() && new.crouching {
            Self::StandToCrouch
        } else if old.crouching && new.prone {
            Self::CrouchToProne
        } else if old.prone && new.crouching {
            Self::ProneToCrouch
        } else if old.crouching && new.standing() {
            Self::CrouchToStand
        } else {
            Self::None
        }
    }

    /// Classifies the transition from the `old` animation into the `new` one.
    pub fn classify(host: &impl Host, old: AnimNum, new: AnimNum) -> Self {
        Self::between(StancePose::of(host, old), StancePose::of(host, new))
    }

    /// Returns how long the transition takes, in milliseconds.
    pub fn duration(self) -> i32 {
        match self {
            Self::None => 0,
            Self::StandToCrouch | Self::CrouchToStand => PLAYER_CROUCH_TIME,
            Self::CrouchToProne | Self::ProneToCrouch => PLAYER_PRONE_TIME,
        }
    }

    /// Returns the blend time into the new legs animation, in milliseconds.
    pub fn blend_time(self) -> i32 {
        match self {
            // Truncated, the product is just under 232.
            Self::CrouchToProne => {
                (f64::from(PLAYER_PRONE_TIME) * CROUCH_TO_PRONE_BLEND_SCALE) as i32
            }
            _ => self.duration(),
        }
    }
}

/// Starts a new legs or torso animation.
///
/// Sets the animation blend time of the lerp frame and switches it to the new animation. In
/// enhanced mode, changing the stance through the legs animation also starts a stance transition,
/// which is recorded in the store and returned.
///
/// Animations past the end of the script are ignored.
#[instrument(level = "trace", skip(host, store, ci), fields(client_num = ci.client_num))]
pub fn set_new_animation(
    frame: &Frame,
    host: &impl Host,
    store: &mut AnimationStore,
    ci: &mut ClientInfo,
    body: Body,
    new_num: AnimNum,
) -> StanceTransition {
    let new_index = new_num.index();

    let new_anim = if new_index > 0 {
        match host.animation(new_index) {
            Some(anim) => Some(anim),
            None => return StanceTransition::None,
        }
    } else {
        None
    };

    let lf = ci.lerp_frame(body);
    let current_num = lf.animation_number;
    let current_anim = lf.animation.and_then(|index| host.animation(index));
    let first_legs_animation = lf.animation.is_none() && body == Body::Legs;

    let mut animation_time = new_anim.map_or(NEUTRAL_BLEND_TIME, |anim| anim.initial_lerp);
    let mut transition = StanceTransition::None;

    if first_legs_animation {
        animation_time = 0;
    } else {
        let mut transition_min = -1;
        if new_anim.is_none() || animation_time <= 0 {
            let new_moving = new_anim.is_some_and(|anim| anim.move_speed != 0.);
            let current_moving = current_anim.is_some_and(|anim| anim.move_speed != 0.);

            transition_min = if new_moving {
                MIN_BLEND_TIME_MOVING
            } else if current_moving {
                MIN_BLEND_TIME_STOPPING
            } else {
                MIN_BLEND_TIME_STATIONARY
            };
        }

        if frame.compat.is_enhanced() && body == Body::Legs && new_index > 0 {
            transition = StanceTransition::classify(host, current_num, AnimNum(new_index));
        }

        if transition != StanceTransition::None {
            let duration = transition.duration();
            animation_time = transition.blend_time();

            let data = store.get_mut(PlayerKey::new(ci.client_num, frame.role));
            data.stance_transition = transition;
            data.stance_transition_time = duration;
            data.stance_transition_end = frame.time + duration;

            debug!(
                role = ?frame.role,
                client_num = ci.client_num,
                ?transition,
                end = data.stance_transition_end,
                "stance transition"
            );
        } else if animation_time < transition_min {
            animation_time = transition_min;
        }
    }

    let lf = ci.lerp_frame_mut(body);
    lf.animation_time = animation_time;
    lf.animation_number = new_num;
    lf.animation = (new_index > 0).then_some(new_index);

    transition
}
