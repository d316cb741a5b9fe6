#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Type of body, determining how it behaves in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum BodyType {
    /// Dynamic bodies are fully simulated (gravity, forces, contact impulses)
    #[default]
    Dynamic,

    /// Kinematic bodies move with their own velocity but have infinite mass
    Kinematic,

    /// Static bodies never move and are never integrated
    Static,
}

impl BodyType {
    /// Returns true if the integrator should move bodies of this type
    #[inline]
    pub fn is_integrated(self) -> bool {
        self != BodyType::Static
    }
}
