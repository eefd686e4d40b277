//! Shared test fixtures.

use glam::Vec3;

use crate::{
    AnimFlags, Animation, BoneTags, ClientInfo, Compat, Controller, Controllers, EntityState,
    Frame, Host, MoveTypes, Role, CROUCH_GRENADE_THROW, STAND_GRENADE_THROW,
};

pub const STAND_IDLE: u32 = 1;
pub const STAND_RUN: u32 = 2;
pub const CROUCH_IDLE: u32 = 3;
pub const CROUCH_RUN: u32 = 4;
pub const PRONE_IDLE: u32 = 5;
pub const STRAFE_LEFT_RUN: u32 = 6;
pub const TORSO_RELOAD: u32 = 7;
pub const TORSO_FIRE: u32 = 8;
pub const STAND_GRENADE: u32 = 9;
pub const CROUCH_GRENADE: u32 = 10;

fn animation(name: &str, move_types: MoveTypes, move_speed: f32) -> Animation {
    Animation {
        name: name.to_owned(),
        move_types,
        flags: AnimFlags::empty(),
        initial_lerp: 0,
        move_speed,
    }
}

/// A small animation script.
pub fn script() -> Vec<Animation> {
    vec![
        animation("root", MoveTypes::empty(), 0.),
        animation("pb_stand_alert", MoveTypes::IDLE, 0.),
        animation("pb_sprint", MoveTypes::RUN, 150.),
        animation("pb_crouch_alert", MoveTypes::IDLECR, 0.),
        animation("pb_crouch_run_forward", MoveTypes::RUNCR, 80.),
        animation("pb_prone_aim", MoveTypes::IDLEPRONE, 0.),
        Animation {
            flags: AnimFlags::STRAFE_LEFT,
            ..animation("pb_run_left", MoveTypes::RUN, 120.)
        },
        Animation {
            initial_lerp: 50,
            ..animation("pt_reload_stand_rifle", MoveTypes::empty(), 0.)
        },
        animation("pt_rifle_fire", MoveTypes::empty(), 0.),
        animation(STAND_GRENADE_THROW, MoveTypes::IDLE, 0.),
        animation(CROUCH_GRENADE_THROW, MoveTypes::IDLECR, 0.),
    ]
}

/// Host with a fixed animation condition that records its callbacks.
pub struct TestHost {
    pub animations: Vec<Animation>,
    pub move_types: MoveTypes,
    pub firing: bool,
    pub cleared_legs_timers: Vec<usize>,
    pub reset: Vec<usize>,
}

impl TestHost {
    pub fn new() -> Self {
        Self {
            animations: script(),
            move_types: MoveTypes::IDLE,
            firing: false,
            cleared_legs_timers: Vec::new(),
            reset: Vec::new(),
        }
    }
}

impl Host for TestHost {
    fn animation(&self, index: u32) -> Option<&Animation> {
        self.animations.get(index as usize)
    }

    fn move_types(&self, _ci: &ClientInfo) -> MoveTypes {
        self.move_types
    }

    fn is_firing(&self, _ci: &ClientInfo) -> bool {
        self.firing
    }

    fn clear_legs_timer(&mut self, client_num: usize) {
        self.cleared_legs_timers.push(client_num);
    }

    fn reset_animations(&mut self, client_num: usize) {
        self.reset.push(client_num);
    }
}

/// Bone tags remembering everything written to them.
#[derive(Debug, Default)]
pub struct RecordingBones {
    pub angles: Vec<(Controller, Vec3)>,
    pub origins: Vec<(Vec3, Vec3)>,
}

impl BoneTags for RecordingBones {
    fn set_control_tag_angles(&mut self, controller: Controller, angles: Vec3) {
        self.angles.push((controller, angles));
    }

    fn set_origin(&mut self, offset: Vec3, angles: Vec3) {
        self.origins.push((offset, angles));
    }
}

/// A 50 ms frame.
pub fn frame(role: Role, compat: Compat, time: i32) -> Frame {
    Frame {
        role,
        compat,
        time,
        frame_time: 50,
    }
}

pub fn client_info(client_num: usize) -> ClientInfo {
    ClientInfo {
        client_num,
        ..Default::default()
    }
}

pub fn entity_state(client_num: usize) -> EntityState {
    EntityState {
        client_num,
        ..Default::default()
    }
}

pub fn lerp(from: &Controllers, to: &Controllers, fraction: f32) -> Controllers {
    let mut rv = *from;
    for controller in Controller::ALL {
        rv[controller] = from[controller].lerp(to[controller], fraction);
    }
    rv
}

#[track_caller]
pub fn assert_vec_eq(a: Vec3, b: Vec3) {
    assert!(a.abs_diff_eq(b, 1e-3), "{a} != {b}");
}

#[track_caller]
pub fn assert_controllers_eq(a: &Controllers, b: &Controllers) {
    for controller in Controller::ALL {
        assert!(
            a[controller].abs_diff_eq(b[controller], 1e-3),
            "{controller:?}: {} != {}",
            a[controller],
            b[controller]
        );
    }
}
