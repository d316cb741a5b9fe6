use crate::bodies::{Body, BodyType};
use crate::integration::Integrator;
use crate::math::Vector2;

/// Explicit (forward) Euler integrator.
/// Moves the body with the velocity it had at the start of the step.
#[derive(Debug, Default, Clone, Copy)]
pub struct EulerIntegrator;

impl EulerIntegrator {
    /// Creates a new explicit Euler integrator
    pub fn new() -> Self {
        Self
    }
}

impl Integrator for EulerIntegrator {
    fn integrate(&self, body: &mut Body, gravity: Vector2, damping: f32, dt: f32) {
        match body.get_body_type() {
            BodyType::Static => {}
            BodyType::Kinematic => body.update_position(dt),
            BodyType::Dynamic => {
                body.update_position(dt);
                body.update_velocity(gravity, damping, dt);
            }
        }
    }

    fn name(&self) -> &str {
        "Euler"
    }
}
