use crate::math::{Aabb, Vector2};

/// A solid circle
#[derive(Debug, Clone)]
pub struct Circle {
    /// Center in body space
    center: Vector2,

    /// The radius of the circle
    radius: f32,

    /// Center in world space, refreshed by `update`
    tc: Vector2,
}

impl Circle {
    /// Creates a new circle with the given radius and body-space center
    pub fn new(radius: f32, center: Vector2) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            tc: center,
        }
    }

    /// Returns the radius of the circle
    pub fn get_radius(&self) -> f32 {
        self.radius
    }

    /// Returns the body-space center
    pub fn get_center(&self) -> Vector2 {
        self.center
    }

    /// Returns the world-space center
    pub fn world_center(&self) -> Vector2 {
        self.tc
    }

    pub(crate) fn update(&mut self, position: Vector2, rotation: Vector2) -> Aabb {
        self.tc = position + self.center.rotate(&rotation);
        Aabb::from_center_radius(self.tc, self.radius)
    }

    pub(crate) fn contains_point(&self, point: Vector2) -> bool {
        self.tc.distance_squared(&point) < self.radius * self.radius
    }
}
