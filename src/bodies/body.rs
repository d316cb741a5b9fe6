use crate::bodies::BodyType;
use crate::math::Vector2;

/// A rigid body: mass, moment and kinematic state.
///
/// Bodies do not own shapes. Shapes refer back to their body through a
/// [`BodyHandle`](crate::core::BodyHandle) once the body lives in a space.
#[derive(Debug, Clone)]
pub struct Body {
    /// How the body takes part in the simulation
    body_type: BodyType,

    /// The body's mass
    mass: f32,

    /// Inverse of the body's mass (zero for infinite mass)
    inv_mass: f32,

    /// The body's moment of inertia
    moment: f32,

    /// Inverse of the moment of inertia (zero for infinite moment)
    inv_moment: f32,

    /// Position of the center of gravity in world space
    position: Vector2,

    /// Linear velocity
    velocity: Vector2,

    /// Force accumulated since the last step
    force: Vector2,

    /// Rotation angle in radians
    angle: f32,

    /// Cached `(cos, sin)` of `angle`
    rotation: Vector2,

    /// Angular velocity in radians per second
    angular_velocity: f32,

    /// Torque accumulated since the last step
    torque: f32,

    /// Position correction velocity, consumed by the next position update
    velocity_bias: Vector2,

    /// Angular position correction velocity
    angular_velocity_bias: f32,
}

impl Body {
    /// Creates a dynamic body with the given mass and moment of inertia
    pub fn new(mass: f32, moment: f32) -> Self {
        let mut body = Self {
            body_type: BodyType::Dynamic,
            mass: 0.0,
            inv_mass: 0.0,
            moment: 0.0,
            inv_moment: 0.0,
            position: Vector2::zero(),
            velocity: Vector2::zero(),
            force: Vector2::zero(),
            angle: 0.0,
            rotation: Vector2::unit_x(),
            angular_velocity: 0.0,
            torque: 0.0,
            velocity_bias: Vector2::zero(),
            angular_velocity_bias: 0.0,
        };

        body.set_mass(mass);
        body.set_moment(moment);

        body
    }

    /// Creates a body with infinite mass that is never integrated
    pub fn new_static() -> Self {
        let mut body = Self::new(f32::INFINITY, f32::INFINITY);
        body.body_type = BodyType::Static;
        body
    }

    /// Creates a body with infinite mass that moves with its own velocity
    pub fn new_kinematic() -> Self {
        let mut body = Self::new(f32::INFINITY, f32::INFINITY);
        body.body_type = BodyType::Kinematic;
        body
    }

    /// Returns the body's type
    pub fn get_body_type(&self) -> BodyType {
        self.body_type
    }

    /// Returns true if gravity and contact impulses move this body
    pub fn is_dynamic(&self) -> bool {
        self.body_type == BodyType::Dynamic
    }

    /// Returns true if the body never moves
    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    /// Returns the body's mass
    pub fn get_mass(&self) -> f32 {
        self.mass
    }

    /// Returns the inverse mass (zero for infinite mass)
    pub fn get_inverse_mass(&self) -> f32 {
        self.inv_mass
    }

    /// Sets the body's mass; infinite mass yields a zero inverse
    pub fn set_mass(&mut self, mass: f32) {
        self.mass = mass;
        self.inv_mass = 1.0 / mass;
    }

    /// Returns the body's moment of inertia
    pub fn get_moment(&self) -> f32 {
        self.moment
    }

    /// Returns the inverse moment of inertia (zero for infinite moment)
    pub fn get_inverse_moment(&self) -> f32 {
        self.inv_moment
    }

    /// Sets the body's moment of inertia
    pub fn set_moment(&mut self, moment: f32) {
        self.moment = moment;
        self.inv_moment = 1.0 / moment;
    }

    /// Returns true if mass and moment are usable for a dynamic body
    pub fn has_valid_mass_properties(&self) -> bool {
        self.mass.is_finite() && self.mass > 0.0 && self.moment.is_finite() && self.moment > 0.0
    }

    /// Returns the body's position
    pub fn get_position(&self) -> Vector2 {
        self.position
    }

    /// Sets the body's position
    pub fn set_position(&mut self, position: Vector2) {
        self.position = position;
    }

    /// Returns the body's linear velocity
    pub fn get_velocity(&self) -> Vector2 {
        self.velocity
    }

    /// Sets the body's linear velocity
    pub fn set_velocity(&mut self, velocity: Vector2) {
        self.velocity = velocity;
    }

    /// Returns the body's rotation angle in radians
    pub fn get_angle(&self) -> f32 {
        self.angle
    }

    /// Sets the rotation angle and refreshes the cached rotation vector
    pub fn set_angle(&mut self, angle: f32) {
        self.angle = angle;
        self.rotation = Vector2::from_angle(angle);
    }

    /// Returns the cached `(cos, sin)` rotation vector
    pub fn get_rotation(&self) -> Vector2 {
        self.rotation
    }

    /// Returns the body's angular velocity
    pub fn get_angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    /// Sets the body's angular velocity
    pub fn set_angular_velocity(&mut self, angular_velocity: f32) {
        self.angular_velocity = angular_velocity;
    }

    /// Returns the force accumulated since the last step
    pub fn get_force(&self) -> Vector2 {
        self.force
    }

    /// Returns the torque accumulated since the last step
    pub fn get_torque(&self) -> f32 {
        self.torque
    }

    /// Converts a body-local point to world space
    #[inline]
    pub fn local_to_world(&self, point: Vector2) -> Vector2 {
        self.position + point.rotate(&self.rotation)
    }

    /// Converts a world-space point to body-local space
    #[inline]
    pub fn world_to_local(&self, point: Vector2) -> Vector2 {
        (point - self.position).unrotate(&self.rotation)
    }

    /// Velocity of a point given relative to the center of gravity, in world space
    #[inline]
    pub fn velocity_at_offset(&self, r: Vector2) -> Vector2 {
        self.velocity + r.perpendicular() * self.angular_velocity
    }

    /// Velocity of a world-space point attached to the body
    #[inline]
    pub fn velocity_at_world_point(&self, point: Vector2) -> Vector2 {
        self.velocity_at_offset(point - self.position)
    }

    /// Bias velocity of a point relative to the center of gravity
    #[inline]
    pub(crate) fn bias_velocity_at_offset(&self, r: Vector2) -> Vector2 {
        self.velocity_bias + r.perpendicular() * self.angular_velocity_bias
    }

    /// Accumulates a force applied at offset `r` from the center of gravity
    pub fn apply_force(&mut self, force: Vector2, r: Vector2) {
        self.force += force;
        self.torque += r.cross(&force);
    }

    /// Clears accumulated force and torque
    pub fn reset_forces(&mut self) {
        self.force = Vector2::zero();
        self.torque = 0.0;
    }

    /// Applies an impulse at offset `r` from the center of gravity
    #[inline]
    pub fn apply_impulse(&mut self, impulse: Vector2, r: Vector2) {
        self.velocity += impulse * self.inv_mass;
        self.angular_velocity += self.inv_moment * r.cross(&impulse);
    }

    /// Applies a position correction impulse, consumed by the next position update
    #[inline]
    pub(crate) fn apply_bias_impulse(&mut self, impulse: Vector2, r: Vector2) {
        self.velocity_bias += impulse * self.inv_mass;
        self.angular_velocity_bias += self.inv_moment * r.cross(&impulse);
    }

    /// Integrates velocity from gravity and accumulated forces.
    ///
    /// `damping` is the fraction of velocity kept over this step.
    pub fn update_velocity(&mut self, gravity: Vector2, damping: f32, dt: f32) {
        self.velocity = self.velocity * damping + (gravity + self.force * self.inv_mass) * dt;
        self.angular_velocity = self.angular_velocity * damping + self.torque * self.inv_moment * dt;
    }

    /// Integrates position and rotation from the current (and bias) velocity
    pub fn update_position(&mut self, dt: f32) {
        self.position += (self.velocity + self.velocity_bias) * dt;
        self.set_angle(self.angle + (self.angular_velocity + self.angular_velocity_bias) * dt);

        self.velocity_bias = Vector2::zero();
        self.angular_velocity_bias = 0.0;
    }
}
