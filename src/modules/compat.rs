//! Animation compatibility with the server.

use cod2x_anim::{Compat, Frame, Role};

use super::cvars::CVar;
use super::player_controllers;
use super::Module;
use crate::utils::*;

pub struct CompatVersion;
impl Module for CompatVersion {
    fn name(&self) -> &'static str {
        "Animation compatibility"
    }

    fn description(&self) -> &'static str {
        "\
Switching between the original and the enhanced player animations.

Enhanced animations only look right when the server and all clients agree on them, so the server \
announces its version through `g_cod2x`."
    }

    fn cvars(&self) -> &'static [&'static CVar] {
        static CVARS: &[&CVar] = &[&G_COD2X];
        CVARS
    }

    fn is_enabled(&self, _marker: MainThreadMarker) -> bool {
        true
    }
}

pub static G_COD2X: CVar = CVar::new(
    "g_cod2x",
    "0",
    "\
Compatibility version of the server. Versions 3 and above enable the enhanced animations, lower \
versions behave exactly like the original game.",
);

/// Compatibility as of the last frame.
static LAST: MainThreadCell<Compat> = MainThreadCell::new(Compat::Legacy);

/// Returns the current animation compatibility.
///
/// Switching between legacy and enhanced drops all cached player animation data.
pub fn compat(marker: MainThreadMarker) -> Compat {
    let version = if G_COD2X.is_registered(marker) {
        G_COD2X.as_i32(marker)
    } else {
        0
    };
    let compat = Compat::from_version(version);

    if compat != LAST.get(marker) {
        info!(version, ?compat, "animation compatibility changed");
        LAST.set(marker, compat);
        player_controllers::reset_store(marker);
    }

    compat
}

/// Returns the timing of an animation pass with the current compatibility.
pub fn frame(marker: MainThreadMarker, role: Role, time: i32, frame_time: i32) -> Frame {
    Frame {
        role,
        compat: compat(marker),
        time,
        frame_time,
    }
}

#[cfg(test)]
pub(super) fn reset(marker: MainThreadMarker) {
    LAST.set(marker, Compat::Legacy);
}
