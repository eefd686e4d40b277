//! Utility objects.

pub mod main_thread;
pub use main_thread::{MainThreadCell, MainThreadMarker, MainThreadRefCell};
#[cfg(test)]
pub use main_thread::test_main_thread;

/// Parses a whitespace-separated list of numbers like `"1 2.5 -3"`.
///
/// Returns `None` if any of the items isn't a number.
pub fn parse_floats(value: &str) -> Option<Vec<f32>> {
    value.split_whitespace().map(|s| s.parse().ok()).collect()
}
