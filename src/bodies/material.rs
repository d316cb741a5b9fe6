#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Surface properties of a shape
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Material {
    /// Coefficient of restitution `e` in [0, 1]; 0 is fully inelastic
    pub restitution: f32,

    /// Coulomb friction coefficient `u`, non-negative
    pub friction: f32,
}

impl Material {
    /// Creates a new material, clamping both coefficients into range
    pub fn new(restitution: f32, friction: f32) -> Self {
        Self {
            restitution: restitution.clamp(0.0, 1.0),
            friction: friction.max(0.0),
        }
    }

    /// Creates a material for ice (low friction, some bounce)
    pub fn ice() -> Self {
        Self::new(0.4, 0.05)
    }

    /// Creates a material for rubber (high friction, bouncy)
    pub fn rubber() -> Self {
        Self::new(0.7, 0.8)
    }

    /// Creates a material for wood (medium friction, little bounce)
    pub fn wood() -> Self {
        Self::new(0.0, 0.6)
    }

    /// Combined coefficients for a contact between two materials.
    /// Both are multiplied, so a frictionless surface stays frictionless.
    #[inline]
    pub fn combine(&self, other: &Material) -> Material {
        Material {
            restitution: self.restitution * other.restitution,
            friction: self.friction * other.friction,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            restitution: 0.0,
            friction: 0.0,
        }
    }
}
