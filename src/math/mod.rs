mod vector;
mod aabb;

pub use vector::Vector2;
pub use aabb::Aabb;

/// Constant for a very small number, used for comparisons
pub const EPSILON: f32 = 1.0e-6;

/// Value returned by [`sqrt`] for negative input
pub const SQRT_NEGATIVE: f32 = -1.0;

/// Number of Newton-Raphson refinements used by [`newton_sqrt`]
pub const NEWTON_SQRT_ITERATIONS: usize = 20;

/// Returns true if the two floating point values are approximately equal
#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// Returns true if the value is approximately zero
#[inline]
pub fn approx_zero(a: f32) -> bool {
    a.abs() < EPSILON
}

/// Clamps a value between a minimum and maximum value
#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

/// Square root used by the engine.
///
/// Non-negative input yields a non-negative result. Negative input yields
/// [`SQRT_NEGATIVE`] so call sites can tell the failure apart from a real root.
#[inline]
pub fn sqrt(value: f32) -> f32 {
    #[cfg(feature = "newton-sqrt")]
    {
        newton_sqrt(value)
    }

    #[cfg(not(feature = "newton-sqrt"))]
    {
        if value >= 0.0 {
            value.sqrt()
        } else {
            SQRT_NEGATIVE
        }
    }
}

/// Newton-Raphson square root with a fixed iteration count, for targets
/// without a hardware square root. Same contract as [`sqrt`]; accuracy
/// degrades for inputs far from 1 because the iteration count is fixed.
pub fn newton_sqrt(value: f32) -> f32 {
    if value < 0.0 || value.is_nan() {
        return SQRT_NEGATIVE;
    }
    if value == 0.0 || value.is_infinite() {
        return value;
    }

    let mut x = value;
    for _ in 0..NEWTON_SQRT_ITERATIONS {
        x = 0.5 * (x + value / x);
    }
    x
}
