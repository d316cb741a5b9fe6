pub mod space;
pub mod config;
pub mod storage;
pub mod events;

pub use self::space::Space;
pub use self::config::{SpaceConfig, SpaceHashConfig};
pub use self::storage::{BodyStorage, ShapeStorage, Storage, Handle};
pub use self::events::{EventQueue, CollisionEvent, CollisionEventType};

/// A unique identifier for a body in a space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub(crate) u32);

/// A unique identifier for a shape. Equal to the shape's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeHandle(pub(crate) u32);

impl BodyHandle {
    /// Returns the raw id behind this handle
    pub fn id(self) -> u32 {
        self.0
    }
}

impl ShapeHandle {
    /// Returns the raw id behind this handle
    pub fn id(self) -> u32 {
        self.0
    }
}
