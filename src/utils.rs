//! Numeric helpers shared by the analyzers and the vision adapters.

pub mod safe_cast;

use safe_cast::f64_to_i32_clamp;

/// Integer part of an angle for display, truncated toward zero
///
/// Angles are bounded to [0, 180] by construction; values read from
/// external tables are clamped rather than overflowing.
#[must_use]
pub fn whole_degrees(value: f64) -> i32 {
    f64_to_i32_clamp(value.trunc(), i32::MIN, i32::MAX)
}
