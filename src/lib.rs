pub mod math;
pub mod core;
pub mod bodies;
pub mod shapes;
pub mod collision;
pub mod integration;

/// Re-export common types for easier usage
pub use crate::core::{BodyHandle, ShapeHandle, Space, SpaceConfig};
pub use crate::bodies::{Body, BodyType, Material};
pub use crate::shapes::{Shape, ShapeType};
pub use crate::collision::Contact;
pub use crate::math::Vector2;

/// Error types for the physics engine
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum PhysicsError {
        #[error("Invalid parameter: {0}")]
        InvalidParameter(String),

        #[error("Resource not found: {0}")]
        ResourceNotFound(String),

        #[error("Invalid shape type tag: {0}")]
        InvalidShapeType(u8),

        #[error("Internal error: {0}")]
        InternalError(String),
    }
}

/// Result type for physics engine operations
pub type Result<T> = std::result::Result<T, error::PhysicsError>;

/// Engine version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
