//! Included-angle computation between three joint positions.

use crate::constants::{DEGENERATE_ANGLE, DEGENERATE_VECTOR_EPSILON};
use serde::{Deserialize, Serialize};

/// A 2D joint coordinate, either normalized to [0, 1] or in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JointPosition {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl JointPosition {
    /// Create a new joint position
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn minus(self, other: Self) -> (f64, f64) {
        (self.x - other.x, self.y - other.y)
    }
}

impl From<(f64, f64)> for JointPosition {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Angle at `vertex` between the rays towards `a` and `c`, in degrees.
///
/// Uses `cos(θ) = (BA · BC) / (|BA| × |BC|)` with the cosine clamped to
/// [-1, 1] before `acos`. The result always lies in [0°, 180°].
///
/// If `a` or `c` coincides with `vertex` the angle is undefined; this returns
/// `0.0` instead of NaN because landmark detectors occasionally collapse
/// points onto each other.
#[must_use]
pub fn joint_angle(a: JointPosition, vertex: JointPosition, c: JointPosition) -> f64 {
    let ba = a.minus(vertex);
    let bc = c.minus(vertex);

    let squared_ba = ba.0 * ba.0 + ba.1 * ba.1;
    let squared_bc = bc.0 * bc.0 + bc.1 * bc.1;

    if squared_ba.sqrt() < DEGENERATE_VECTOR_EPSILON || squared_bc.sqrt() < DEGENERATE_VECTOR_EPSILON {
        return DEGENERATE_ANGLE;
    }

    // One rounding step in the denominator keeps collinear rays at exactly 0°
    let dot = ba.0 * bc.0 + ba.1 * bc.1;
    let cosine = (dot / (squared_ba * squared_bc).sqrt()).clamp(-1.0, 1.0);

    cosine.acos().to_degrees()
}
