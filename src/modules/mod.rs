//! Modules providing the actual functionality.
//!
//! Each module has more or less self-contained functionality and owns its console variables.
//! Every module is represented by a unit struct implementing the [`Module`] trait. All modules live
//! in the global [`MODULES`] array where they all can be operated on at once as trait objects.

use crate::utils::*;

pub mod cvars;
use cvars::CVar;

pub mod compat;
pub mod player_controllers;
pub mod player_facing;

/// Trait for getting module information.
pub trait Module: Sync {
    /// Returns the name of the module.
    fn name(&self) -> &'static str;

    /// Returns the description of the module.
    ///
    /// For short descriptions, try to return a string that would fit this phrase: "This module
    /// provides support for <description>".
    fn description(&self) -> &'static str;

    /// Returns the console variables defined by the module.
    fn cvars(&self) -> &'static [&'static CVar] {
        &[]
    }

    /// Returns `true` if the module is enabled.
    ///
    /// Console variables of disabled modules are not registered.
    fn is_enabled(&self, marker: MainThreadMarker) -> bool;
}

/// All modules.
pub static MODULES: &[&dyn Module] = &[
    &compat::CompatVersion,
    &cvars::CVars,
    &player_controllers::PlayerControllers,
    &player_facing::PlayerFacing,
];

/// Resets all global state, as if the game was just started.
#[cfg(test)]
pub fn reset_for_test(marker: MainThreadMarker) {
    cvars::deregister_all_cvars(marker);
    cvars::register_all_cvars(marker);
    compat::reset(marker);
    player_controllers::reset_store(marker);
}
