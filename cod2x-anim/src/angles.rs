//! Angle helpers.
//!
//! All angles are in degrees. Angle vectors use `x` for pitch, `y` for yaw and `z` for roll.

use std::f32::consts::TAU;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Reduces the angle into `[0, 360)`.
pub fn normalize_360(angle: f32) -> f32 {
    let angle = angle.rem_euclid(360.);

    // rem_euclid() rounds tiny negative angles up to exactly 360.
    if angle >= 360. {
        0.
    } else {
        angle
    }
}

/// Reduces the angle into `(-180, 180]`.
pub fn normalize_180(angle: f32) -> f32 {
    let angle = normalize_360(angle);

    if angle > 180. {
        angle - 360.
    } else {
        angle
    }
}

/// Returns the shortest signed rotation from `b` to `a`, in `(-180, 180]`.
pub fn angle_subtract(a: f32, b: f32) -> f32 {
    normalize_180(a - b)
}

/// Same as [`angle_subtract()`].
pub fn angle_delta(a: f32, b: f32) -> f32 {
    angle_subtract(a, b)
}

/// Component-wise [`angle_subtract()`].
pub fn angles_subtract(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(
        angle_subtract(a.x, b.x),
        angle_subtract(a.y, b.y),
        angle_subtract(a.z, b.z),
    )
}

/// Re-projects the child's pitch and roll through the yaw difference from its parent.
///
/// The game applies child pitch and roll in the parent's frame, so a bone yawed relative to its
/// parent tilts along the wrong axis (the weapon drops down and to the right when moving
/// diagonally). Rotating pitch and roll by the yaw difference compensates for that. Yaw is
/// returned unchanged.
pub fn adjust_rotation_for_yaw(parent: Vec3, child: Vec3) -> Vec3 {
    let (sin, cos) = (child.y - parent.y).to_radians().sin_cos();

    Vec3::new(
        child.x * cos - child.z * sin,
        child.y,
        child.x * sin + child.z * cos,
    )
}

/// Maps the raw lean value in `[-1, 1]` onto the eased lean fraction.
///
/// Negative values lean left, positive values lean right.
pub fn lean_fraction(lean: f32) -> f32 {
    (2. - lean.abs()) * lean
}

/// Moves every angle towards the goal by at most `max_change`.
pub fn lerp_angles(goal: Vec3, max_change: f32, angles: &mut Vec3) {
    for i in 0..3 {
        let diff = goal[i] - angles[i];

        if diff > max_change {
            angles[i] += max_change;
        } else if diff < -max_change {
            angles[i] -= max_change;
        } else {
            angles[i] = goal[i];
        }
    }
}

/// Moves the offset towards the goal by at most `max_change` units of distance.
pub fn lerp_offset(goal: Vec3, max_change: f32, offset: &mut Vec3) {
    let diff = goal - *offset;
    let dist = diff.length();

    if dist == 0. {
        return;
    }

    if dist > max_change {
        *offset += diff * (max_change / dist);
    } else {
        *offset = goal;
    }
}

/// One period of a raised cosine: 0 at `fraction = 0`, 1 at `0.5` and back to 0 at `1`.
pub fn raised_cosine(fraction: f32) -> f32 {
    0.5 * (1. - (TAU * fraction).cos())
}

/// An angle that follows its destination with a delay.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SwingAngle {
    /// Current angle, in `[0, 360)` once it has swung at least once.
    pub angle: f32,
    /// Whether the angle is currently moving towards the destination.
    pub swinging: bool,
}

impl SwingAngle {
    pub fn new(angle: f32) -> Self {
        Self {
            angle,
            swinging: false,
        }
    }

    /// Swings the angle towards `destination`.
    ///
    /// A swing starts once the angle is more than `swing_tolerance` away from the destination,
    /// then moves at `speed` degrees per millisecond, scaled down when close and scaled up when
    /// far, until it arrives. Regardless of swinging, the angle is never left more than
    /// `clamp_tolerance` away from the destination.
    pub fn swing(
        &mut self,
        destination: f32,
        swing_tolerance: f32,
        clamp_tolerance: f32,
        speed: f32,
        frame_time: f32,
    ) {
        if !self.swinging {
            let swing = angle_subtract(self.angle, destination);
            if swing > swing_tolerance || swing < -swing_tolerance {
                self.swinging = true;
            }
        }

        if !self.swinging {
            return;
        }

        // Modify the speed depending on the delta so it doesn't seem so linear.
        let swing = angle_subtract(destination, self.angle);
        let scale = if swing.abs() < swing_tolerance * 0.5 {
            0.5
        } else if swing.abs() < swing_tolerance {
            1.
        } else {
            2.
        };

        if swing >= 0. {
            let mut step = frame_time * scale * speed;
            if step >= swing {
                step = swing;
                self.swinging = false;
            }
            self.angle = normalize_360(self.angle + step);
        } else {
            let mut step = frame_time * scale * -speed;
            if step <= swing {
                step = swing;
                self.swinging = false;
            }
            self.angle = normalize_360(self.angle + step);
        }

        let swing = angle_subtract(destination, self.angle);
        if swing > clamp_tolerance {
            self.angle = normalize_360(destination - (clamp_tolerance - 1.));
        } else if swing < -clamp_tolerance {
            self.angle = normalize_360(destination + (clamp_tolerance - 1.));
        }
    }
}
