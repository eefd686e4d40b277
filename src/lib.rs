//! Enhanced player animations for Call of Duty 2.
//!
//! The animation algorithms live in the [`cod2x_anim`] crate. This crate wires them to console
//! variables and the global per-role animation store, and is what the game hooks call into.

#[macro_use]
extern crate tracing;

pub mod config;
pub mod logging;
pub mod modules;
pub mod utils;
