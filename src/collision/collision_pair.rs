use crate::core::ShapeHandle;

/// An unordered pair of shapes, used to key contact sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapePair {
    /// The shape with the lower id
    pub shape_a: ShapeHandle,

    /// The shape with the higher id
    pub shape_b: ShapeHandle,
}

impl ShapePair {
    /// Creates a new pair
    pub fn new(shape_a: ShapeHandle, shape_b: ShapeHandle) -> Self {
        // Always sort the handles to ensure consistent ordering
        if shape_a.0 <= shape_b.0 {
            Self { shape_a, shape_b }
        } else {
            Self { shape_a: shape_b, shape_b: shape_a }
        }
    }

    /// Checks if this pair contains the specified shape
    pub fn contains(&self, shape: ShapeHandle) -> bool {
        self.shape_a == shape || self.shape_b == shape
    }

    /// Returns the other shape in the pair
    pub fn other(&self, shape: ShapeHandle) -> Option<ShapeHandle> {
        if self.shape_a == shape {
            Some(self.shape_b)
        } else if self.shape_b == shape {
            Some(self.shape_a)
        } else {
            None
        }
    }
}
