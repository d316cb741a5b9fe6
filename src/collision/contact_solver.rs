use crate::bodies::Body;
use crate::collision::arbiter::Arbiter;
use crate::core::config::{DEFAULT_BIAS_COEF, DEFAULT_COLLISION_SLOP};
use crate::core::BodyStorage;
use crate::math::{self, Vector2};

/// Trait for contact constraint solvers
pub trait ContactSolver: Send + Sync {
    /// Computes per-contact effective masses, bias and bounce targets
    fn pre_step(&self, arbiters: &mut [&mut Arbiter], bodies: &BodyStorage<Body>, dt_inv: f32);

    /// Re-applies the impulses accumulated on the previous step
    fn apply_cached_impulses(&self, arbiters: &mut [&mut Arbiter], bodies: &mut BodyStorage<Body>);

    /// Runs one solver pass. `e_coef` scales restitution (0 disables bounce).
    fn apply_impulses(&self, arbiters: &mut [&mut Arbiter], bodies: &mut BodyStorage<Body>, e_coef: f32);

    /// Returns the name of the solver
    fn name(&self) -> &str;
}

/// Sequential impulse solver with accumulated, clamped impulses and a
/// separate bias velocity for position correction
#[derive(Debug, Clone)]
pub struct SequentialImpulseSolver {
    /// Fraction of the positional error corrected per step
    bias_coef: f32,

    /// Overlap allowed before position correction kicks in
    collision_slop: f32,
}

impl Default for SequentialImpulseSolver {
    fn default() -> Self {
        Self::new(DEFAULT_BIAS_COEF, DEFAULT_COLLISION_SLOP)
    }
}

impl SequentialImpulseSolver {
    /// Creates a new sequential impulse solver
    pub fn new(bias_coef: f32, collision_slop: f32) -> Self {
        Self {
            bias_coef,
            collision_slop,
        }
    }

    /// Returns the bias coefficient
    pub fn bias_coef(&self) -> f32 {
        self.bias_coef
    }

    /// Returns the collision slop
    pub fn collision_slop(&self) -> f32 {
        self.collision_slop
    }
}

/// Inverse effective mass of the pair along `n` at offsets `r1`, `r2`
#[inline]
fn k_scalar(a: &Body, b: &Body, r1: Vector2, r2: Vector2, n: Vector2) -> f32 {
    let r1cn = r1.cross(&n);
    let r2cn = r2.cross(&n);
    a.get_inverse_mass()
        + b.get_inverse_mass()
        + a.get_inverse_moment() * r1cn * r1cn
        + b.get_inverse_moment() * r2cn * r2cn
}

impl ContactSolver for SequentialImpulseSolver {
    fn pre_step(&self, arbiters: &mut [&mut Arbiter], bodies: &BodyStorage<Body>, dt_inv: f32) {
        for arbiter in arbiters.iter_mut() {
            let (Some(a), Some(b)) = (bodies.get(arbiter.body_a), bodies.get(arbiter.body_b)) else {
                continue;
            };
            let restitution = arbiter.restitution;

            for contact in &mut arbiter.contacts {
                let n = contact.normal;
                contact.r1 = contact.point - a.get_position();
                contact.r2 = contact.point - b.get_position();

                let kn = k_scalar(a, b, contact.r1, contact.r2, n);
                let kt = k_scalar(a, b, contact.r1, contact.r2, n.perpendicular());

                // A pair of infinite-mass bodies cannot be pushed apart
                contact.n_mass = if kn > 0.0 { 1.0 / kn } else { 0.0 };
                contact.t_mass = if kt > 0.0 { 1.0 / kt } else { 0.0 };

                contact.bias = -self.bias_coef * dt_inv * (contact.dist + self.collision_slop).min(0.0);
                contact.j_bias = 0.0;

                let vr = b.velocity_at_offset(contact.r2) - a.velocity_at_offset(contact.r1);
                contact.bounce = n.dot(&vr) * restitution;
            }
        }
    }

    fn apply_cached_impulses(&self, arbiters: &mut [&mut Arbiter], bodies: &mut BodyStorage<Body>) {
        for arbiter in arbiters.iter_mut() {
            let Some((a, b)) = bodies.get_pair_mut(arbiter.body_a, arbiter.body_b) else {
                continue;
            };

            for contact in &arbiter.contacts {
                let j = Vector2::new(contact.jn_acc, contact.jt_acc).rotate(&contact.normal);
                a.apply_impulse(-j, contact.r1);
                b.apply_impulse(j, contact.r2);
            }
        }
    }

    fn apply_impulses(&self, arbiters: &mut [&mut Arbiter], bodies: &mut BodyStorage<Body>, e_coef: f32) {
        for arbiter in arbiters.iter_mut() {
            let Some((a, b)) = bodies.get_pair_mut(arbiter.body_a, arbiter.body_b) else {
                continue;
            };
            let friction = arbiter.friction;

            for contact in &mut arbiter.contacts {
                let n = contact.normal;
                let r1 = contact.r1;
                let r2 = contact.r2;

                // Position correction through the bias velocities
                let vbn = (b.bias_velocity_at_offset(r2) - a.bias_velocity_at_offset(r1)).dot(&n);
                let jbn = (contact.bias - vbn) * contact.n_mass;
                let jbn_old = contact.j_bias;
                contact.j_bias = (jbn_old + jbn).max(0.0);
                let jbn = contact.j_bias - jbn_old;

                a.apply_bias_impulse(-n * jbn, r1);
                b.apply_bias_impulse(n * jbn, r2);

                // Normal impulse, never pulling the shapes together
                let vr = b.velocity_at_offset(r2) - a.velocity_at_offset(r1);
                let vrn = vr.dot(&n);

                let jn = -(contact.bounce * e_coef + vrn) * contact.n_mass;
                let jn_old = contact.jn_acc;
                contact.jn_acc = (jn_old + jn).max(0.0);
                let jn = contact.jn_acc - jn_old;

                // Friction, bounded by the accumulated normal impulse
                let vrt = vr.dot(&n.perpendicular());
                let jt_max = friction * contact.jn_acc;
                let jt = -vrt * contact.t_mass;
                let jt_old = contact.jt_acc;
                contact.jt_acc = math::clamp(jt_old + jt, -jt_max, jt_max);
                let jt = contact.jt_acc - jt_old;

                let j = Vector2::new(jn, jt).rotate(&n);
                a.apply_impulse(-j, r1);
                b.apply_impulse(j, r2);
            }
        }
    }

    fn name(&self) -> &str {
        "Sequential Impulse"
    }
}
