mod shape;
mod circle;
mod segment;
mod polygon;

pub use self::shape::{Shape, ShapeKind, ShapeType, Layers, reset_shape_id_counter};
pub use self::circle::Circle;
pub use self::segment::Segment;
pub use self::polygon::{Polygon, PolygonAxis};
