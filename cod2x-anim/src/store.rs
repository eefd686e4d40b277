//! Persistent per-player animation data.

use serde::{Deserialize, Serialize};

use crate::{ControllerMovement, Controllers, StanceTransition};

/// Maximum number of connected players.
pub const MAX_CLIENTS: usize = 64;

/// Which simulation an animation pass belongs to.
///
/// A listen server runs the animation code for both roles on the same frame, and each role must
/// only ever see its own data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// The authoritative server simulation.
    Server,
    /// The locally predicted and interpolated client view.
    Client,
}

/// Key of one [`AnimationPlayerData`] entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerKey {
    pub client_num: usize,
    pub role: Role,
}

impl PlayerKey {
    pub fn new(client_num: usize, role: Role) -> Self {
        Self { client_num, role }
    }
}

/// Animation data of one player as seen by one role.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationPlayerData {
    /// The last stance transition that was started.
    pub stance_transition: StanceTransition,
    /// Duration of the last stance transition, in milliseconds.
    pub stance_transition_time: i32,
    /// Time at which the last stance transition ends.
    pub stance_transition_end: i32,

    /// Movement classification of the current frame.
    pub movement: ControllerMovement,
    /// Movement classification the current blend was started for.
    pub movement_last: ControllerMovement,
    /// Time at which the current blend ends.
    pub movement_end_time: i32,
    /// Duration of the blend for the current movement, in milliseconds.
    pub movement_time: i32,
    pub movement_running: bool,
    /// Controller angles at the moment the current blend was started.
    pub movement_start: Controllers,

    pub lerp_lean: f32,
}

impl AnimationPlayerData {
    pub const fn new() -> Self {
        Self {
            stance_transition: StanceTransition::None,
            stance_transition_time: 0,
            stance_transition_end: 0,
            movement: ControllerMovement::empty(),
            movement_last: ControllerMovement::empty(),
            movement_end_time: 0,
            movement_time: 0,
            movement_running: false,
            movement_start: Controllers::ZERO,
            lerp_lean: 0.,
        }
    }

    /// Returns how far along the last stance transition is at `time`.
    ///
    /// The result is 0 at the start and when there is no transition, and 1 once it's over.
    pub fn stance_transition_fraction(&self, time: i32) -> f32 {
        self.raw_stance_transition_fraction(time).clamp(0., 1.)
    }

    /// Same as [`Self::stance_transition_fraction()`], but not clamped.
    pub(crate) fn raw_stance_transition_fraction(&self, time: i32) -> f32 {
        if self.stance_transition == StanceTransition::None || self.stance_transition_time <= 0 {
            return 0.;
        }

        1. - (self.stance_transition_end - time) as f32 / self.stance_transition_time as f32
    }
}

impl Default for AnimationPlayerData {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-player animation data for both roles.
#[derive(Debug, Clone)]
pub struct AnimationStore {
    server: [AnimationPlayerData; MAX_CLIENTS],
    client: [AnimationPlayerData; MAX_CLIENTS],
}

impl AnimationStore {
    pub const fn new() -> Self {
        Self {
            server: [AnimationPlayerData::new(); MAX_CLIENTS],
            client: [AnimationPlayerData::new(); MAX_CLIENTS],
        }
    }

    fn table(&self, role: Role) -> &[AnimationPlayerData; MAX_CLIENTS] {
        match role {
            Role::Server => &self.server,
            Role::Client => &self.client,
        }
    }

    fn table_mut(&mut self, role: Role) -> &mut [AnimationPlayerData; MAX_CLIENTS] {
        match role {
            Role::Server => &mut self.server,
            Role::Client => &mut self.client,
        }
    }

    /// Returns the data of the given player.
    ///
    /// # Panics
    ///
    /// Panics if the client number is not below [`MAX_CLIENTS`].
    pub fn get(&self, key: PlayerKey) -> &AnimationPlayerData {
        &self.table(key.role)[key.client_num]
    }

    /// Returns the data of the given player.
    ///
    /// # Panics
    ///
    /// Panics if the client number is not below [`MAX_CLIENTS`].
    pub fn get_mut(&mut self, key: PlayerKey) -> &mut AnimationPlayerData {
        &mut self.table_mut(key.role)[key.client_num]
    }

    /// Resets every player of every role.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for AnimationStore {
    fn default() -> Self {
        Self::new()
    }
}
