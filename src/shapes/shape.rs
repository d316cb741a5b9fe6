use std::sync::atomic::{AtomicU32, Ordering};

use bitflags::bitflags;
use tracing::warn;

use crate::bodies::{Body, Material};
use crate::core::{BodyHandle, ShapeHandle};
use crate::error::PhysicsError;
use crate::math::{Aabb, Vector2};
use crate::shapes::{Circle, Polygon, Segment};
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

static NEXT_SHAPE_ID: AtomicU32 = AtomicU32::new(1);

/// Restarts shape id allocation so a rebuilt scene gets the same ids,
/// and therefore the same contact hashes, as the previous run.
pub fn reset_shape_id_counter() {
    NEXT_SHAPE_ID.store(1, Ordering::Relaxed);
}

fn next_shape_id() -> u32 {
    NEXT_SHAPE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Shape type tag. The numeric order is the order narrow-phase pairs are sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum ShapeType {
    Circle = 0,
    Segment = 1,
    Polygon = 2,
}

impl ShapeType {
    /// Number of shape types
    pub const COUNT: usize = 3;

    /// Index of this type in dispatch tables
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Checks a raw tag from outside the engine. Shapes already built cannot hold a
/// bad tag, since their type comes from [`ShapeKind`].
impl TryFrom<u8> for ShapeType {
    type Error = PhysicsError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(ShapeType::Circle),
            1 => Ok(ShapeType::Segment),
            2 => Ok(ShapeType::Polygon),
            other => {
                warn!(value = other, "malformed shape type tag");
                Err(PhysicsError::InvalidShapeType(other))
            }
        }
    }
}

bitflags! {
    /// Collision layers. Two shapes are only tested when their layers intersect.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
    pub struct Layers: u32 {
        const LAYER_1 = 0x0000_0001;
        const LAYER_2 = 0x0000_0002;
        const LAYER_3 = 0x0000_0004;
        const LAYER_4 = 0x0000_0008;
        const ALL = 0xFFFF_FFFF;
    }
}

impl Default for Layers {
    fn default() -> Self {
        Layers::ALL
    }
}

/// Geometry of a shape
#[derive(Debug, Clone)]
pub enum ShapeKind {
    Circle(Circle),
    Segment(Segment),
    Polygon(Polygon),
}

/// A collision shape attached to a body
#[derive(Debug, Clone)]
pub struct Shape {
    /// Unique id, also the shape's handle in a space
    id: u32,

    /// The body this shape is attached to
    body: BodyHandle,

    /// The shape's geometry and world-space cache
    kind: ShapeKind,

    /// World-space bounding box from the last update
    bb: Aabb,

    /// Restitution and friction
    pub material: Material,

    /// Shapes sharing a non-zero group never collide
    pub group: u32,

    /// Shapes only collide when their layers intersect
    pub layers: Layers,

    /// User tag carried into collision events
    pub collision_type: u32,
}

impl Shape {
    fn with_kind(body: BodyHandle, kind: ShapeKind) -> Self {
        Self {
            id: next_shape_id(),
            body,
            kind,
            bb: Aabb::new(Vector2::zero(), Vector2::zero()),
            material: Material::default(),
            group: 0,
            layers: Layers::default(),
            collision_type: 0,
        }
    }

    /// Creates a circle of `radius` centered at `offset` in body space
    pub fn circle(body: BodyHandle, radius: f32, offset: Vector2) -> Self {
        Self::with_kind(body, ShapeKind::Circle(Circle::new(radius, offset)))
    }

    /// Creates a segment from `a` to `b` in body space, thickened by `radius`
    pub fn segment(body: BodyHandle, a: Vector2, b: Vector2, radius: f32) -> Self {
        Self::with_kind(body, ShapeKind::Segment(Segment::new(a, b, radius)))
    }

    /// Creates a convex polygon from body-space vertices displaced by `offset`
    pub fn polygon(body: BodyHandle, vertices: &[Vector2], offset: Vector2) -> Result<Self> {
        let polygon = Polygon::new(vertices, offset)?;
        Ok(Self::with_kind(body, ShapeKind::Polygon(polygon)))
    }

    /// Sets the material and returns the shape, for builder-style setup
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Returns the shape's unique id
    pub fn get_id(&self) -> u32 {
        self.id
    }

    /// Returns the shape's handle
    pub fn handle(&self) -> ShapeHandle {
        ShapeHandle(self.id)
    }

    /// Returns the body this shape is attached to
    pub fn get_body(&self) -> BodyHandle {
        self.body
    }

    /// Returns the type tag
    pub fn shape_type(&self) -> ShapeType {
        match self.kind {
            ShapeKind::Circle(_) => ShapeType::Circle,
            ShapeKind::Segment(_) => ShapeType::Segment,
            ShapeKind::Polygon(_) => ShapeType::Polygon,
        }
    }

    /// Returns the geometry
    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    /// Returns the circle geometry, if this is a circle
    pub fn as_circle(&self) -> Option<&Circle> {
        match &self.kind {
            ShapeKind::Circle(circle) => Some(circle),
            _ => None,
        }
    }

    /// Returns the segment geometry, if this is a segment
    pub fn as_segment(&self) -> Option<&Segment> {
        match &self.kind {
            ShapeKind::Segment(segment) => Some(segment),
            _ => None,
        }
    }

    /// Returns the polygon geometry, if this is a polygon
    pub fn as_polygon(&self) -> Option<&Polygon> {
        match &self.kind {
            ShapeKind::Polygon(polygon) => Some(polygon),
            _ => None,
        }
    }

    /// Returns the cached world-space bounding box
    pub fn get_bb(&self) -> Aabb {
        self.bb
    }

    /// Refreshes the world-space geometry and bounding box from the body's transform
    pub fn update(&mut self, body: &Body) -> Aabb {
        let position = body.get_position();
        let rotation = body.get_rotation();

        self.bb = match &mut self.kind {
            ShapeKind::Circle(circle) => circle.update(position, rotation),
            ShapeKind::Segment(segment) => segment.update(position, rotation),
            ShapeKind::Polygon(polygon) => polygon.update(position, rotation),
        };

        self.bb
    }

    /// Returns true if the world-space point lies inside the shape
    pub fn point_query(&self, point: Vector2) -> bool {
        match &self.kind {
            ShapeKind::Circle(circle) => circle.contains_point(point),
            ShapeKind::Segment(segment) => segment.contains_point(point),
            ShapeKind::Polygon(polygon) => {
                self.bb.contains_point(point) && polygon.contains_vertex(point)
            }
        }
    }
}
