use crate::bodies::{Body, BodyType};
use crate::integration::Integrator;
use crate::math::Vector2;

/// Symplectic Euler integrator (semi-implicit Euler)
/// More stable than explicit Euler for physics simulations
#[derive(Debug, Default, Clone, Copy)]
pub struct SymplecticEulerIntegrator;

impl SymplecticEulerIntegrator {
    /// Creates a new Symplectic Euler integrator
    pub fn new() -> Self {
        Self
    }
}

impl Integrator for SymplecticEulerIntegrator {
    fn integrate(&self, body: &mut Body, gravity: Vector2, damping: f32, dt: f32) {
        match body.get_body_type() {
            BodyType::Static => {}
            BodyType::Kinematic => body.update_position(dt),
            BodyType::Dynamic => {
                // Velocity first, then position from the *new* velocity
                body.update_velocity(gravity, damping, dt);
                body.update_position(dt);
            }
        }
    }

    fn name(&self) -> &str {
        "SymplecticEuler"
    }
}
