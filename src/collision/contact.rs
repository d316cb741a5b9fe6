use crate::math::Vector2;

/// Multiplier used to mix shape ids and feature indices into contact hashes
pub const HASH_COEF: u32 = 3_344_921_057;

/// Combines a shape id and a feature index into a hash key.
///
/// The second argument is rotated before mixing, so swapping the arguments
/// gives a different key and vertex `i` of shape `j` never shares a key with
/// vertex `j` of shape `i`.
#[inline]
pub fn hash_pair(a: u32, b: u32) -> u32 {
    a.wrapping_mul(HASH_COEF) ^ b.wrapping_mul(HASH_COEF).rotate_left(16)
}

/// A contact point between two shapes
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// World-space contact point
    pub point: Vector2,

    /// Unit normal pointing from the first shape of the pair into the second
    pub normal: Vector2,

    /// Signed distance along the normal; zero or negative when touching
    pub dist: f32,

    /// Key identifying the same feature pair across steps
    pub hash: u32,

    // Accumulated impulses, carried between steps for warm starting
    pub(crate) jn_acc: f32,
    pub(crate) jt_acc: f32,

    // Per-step solver data
    pub(crate) r1: Vector2,
    pub(crate) r2: Vector2,
    pub(crate) n_mass: f32,
    pub(crate) t_mass: f32,
    pub(crate) bounce: f32,
    pub(crate) bias: f32,
    pub(crate) j_bias: f32,
}

impl Contact {
    /// Creates a new contact with no accumulated impulse
    pub fn new(point: Vector2, normal: Vector2, dist: f32, hash: u32) -> Self {
        Self {
            point,
            normal,
            dist,
            hash,
            jn_acc: 0.0,
            jt_acc: 0.0,
            r1: Vector2::zero(),
            r2: Vector2::zero(),
            n_mass: 0.0,
            t_mass: 0.0,
            bounce: 0.0,
            bias: 0.0,
            j_bias: 0.0,
        }
    }

    /// Penetration depth, positive when the shapes overlap
    #[inline]
    pub fn penetration(&self) -> f32 {
        -self.dist
    }

    /// Normal impulse accumulated by the solver
    pub fn normal_impulse(&self) -> f32 {
        self.jn_acc
    }

    /// Friction impulse accumulated by the solver
    pub fn tangent_impulse(&self) -> f32 {
        self.jt_acc
    }

    /// Total impulse applied at this contact, in world space
    pub fn impulse(&self) -> Vector2 {
        Vector2::new(self.jn_acc, self.jt_acc).rotate(&self.normal)
    }
}
