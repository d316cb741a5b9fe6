use crate::math::Vector2;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Axis-aligned bounding box used by the broad-phase
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner of the AABB
    pub min: Vector2,

    /// Maximum corner of the AABB
    pub max: Vector2,
}

impl Aabb {
    /// Creates a new AABB from minimum and maximum points
    #[inline]
    pub fn new(min: Vector2, max: Vector2) -> Self {
        Self { min, max }
    }

    /// Creates an AABB from its left, bottom, right and top edges
    #[inline]
    pub fn from_edges(l: f32, b: f32, r: f32, t: f32) -> Self {
        Self::new(Vector2::new(l, b), Vector2::new(r, t))
    }

    /// Creates an AABB centered at a point with the given half extent on both axes
    #[inline]
    pub fn from_center_radius(center: Vector2, radius: f32) -> Self {
        let half = Vector2::new(radius, radius);
        Self::new(center - half, center + half)
    }

    /// Creates an AABB from a set of points
    pub fn from_points(points: &[Vector2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;

        let mut aabb = Self::new(*first, *first);
        for point in rest {
            aabb.expand_to_include_point(*point);
        }

        Some(aabb)
    }

    /// Checks if this AABB contains a point
    #[inline]
    pub fn contains_point(&self, point: Vector2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y
    }

    /// Checks if this AABB intersects with another AABB (touching counts)
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y
    }

    /// Returns the union of this AABB with another
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(
            Vector2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            Vector2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        )
    }

    /// Expands this AABB to include a point
    #[inline]
    pub fn expand_to_include_point(&mut self, point: Vector2) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);

        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    /// Expands this AABB by a margin in all directions
    #[inline]
    pub fn expand(&self, margin: f32) -> Self {
        let margin_vec = Vector2::new(margin, margin);
        Self {
            min: self.min - margin_vec,
            max: self.max + margin_vec,
        }
    }
}
