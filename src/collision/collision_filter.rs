use crate::shapes::Shape;

/// A filter for determining whether two shapes should be tested for collision.
/// Runs after the broad-phase has found overlapping bounding boxes.
pub trait CollisionFilter: Send + Sync {
    /// Returns whether the two shapes should be passed to the narrow-phase
    fn should_collide(&self, shape_a: &Shape, shape_b: &Shape) -> bool;
}

/// Default filter: shapes on the same body, in the same non-zero group, or
/// with disjoint layers never collide
#[derive(Debug, Default, Clone, Copy)]
pub struct GroupLayerFilter;

impl GroupLayerFilter {
    /// Creates a new group/layer filter
    pub fn new() -> Self {
        Self
    }
}

impl CollisionFilter for GroupLayerFilter {
    fn should_collide(&self, shape_a: &Shape, shape_b: &Shape) -> bool {
        if shape_a.get_body() == shape_b.get_body() {
            return false;
        }

        if shape_a.group != 0 && shape_a.group == shape_b.group {
            return false;
        }

        shape_a.layers.intersects(shape_b.layers)
    }
}
