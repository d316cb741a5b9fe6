//! Moments of inertia for the supported shape outlines.

use crate::math::Vector2;

/// Moment of inertia of a ring with inner radius `r1` and outer radius `r2`,
/// displaced from the body's center of gravity by `offset`.
///
/// Pass `r1 = 0` for a solid disk.
pub fn moment_for_circle(mass: f32, r1: f32, r2: f32, offset: Vector2) -> f32 {
    0.5 * mass * (r1 * r1 + r2 * r2) + mass * offset.dot(&offset)
}

/// Moment of inertia of a solid polygon whose vertices are displaced by `offset`.
///
/// The polygon must have non-zero signed area; a degenerate outline divides
/// by zero and yields a non-finite value.
pub fn moment_for_polygon(mass: f32, vertices: &[Vector2], offset: Vector2) -> f32 {
    let count = vertices.len();
    let mut sum1 = 0.0;
    let mut sum2 = 0.0;

    for i in 0..count {
        let v1 = vertices[i] + offset;
        let v2 = vertices[(i + 1) % count] + offset;

        let a = v2.cross(&v1);
        let b = v1.dot(&v1) + v1.dot(&v2) + v2.dot(&v2);

        sum1 += a * b;
        sum2 += a;
    }

    (mass * sum1) / (6.0 * sum2)
}

/// Signed area of a polygon outline. Positive for the winding shapes expect.
pub fn area_for_polygon(vertices: &[Vector2]) -> f32 {
    let count = vertices.len();
    let mut area = 0.0;
    for i in 0..count {
        area += vertices[(i + 1) % count].cross(&vertices[i]);
    }
    area * 0.5
}
