use crate::bodies::Body;
use crate::math::Vector2;

/// Trait for numerical integration algorithms
pub trait Integrator: Send + Sync {
    /// Advances a body's velocity and position over a time step.
    ///
    /// `damping` is the fraction of velocity the body keeps over `dt`.
    fn integrate(&self, body: &mut Body, gravity: Vector2, damping: f32, dt: f32);

    /// Returns the name of the integrator
    fn name(&self) -> &str;
}
