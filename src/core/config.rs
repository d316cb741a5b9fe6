use crate::math::Vector2;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Amount of overlap, in world units, that shapes may keep without being
/// pushed apart. Also the margin the segment/polygon routine allows before it
/// looks for polygon vertices behind the segment: larger values add contacts
/// earlier, smaller values can drop contacts on resting stacks.
pub const DEFAULT_COLLISION_SLOP: f32 = 0.1;

/// Fraction of the positional error corrected per step
pub const DEFAULT_BIAS_COEF: f32 = 0.1;

/// Number of steps a contact set survives without being touched
pub const DEFAULT_CONTACT_PERSISTENCE: u32 = 3;

/// Default edge length of a spatial hash cell
pub const DEFAULT_CELL_SIZE: f32 = 100.0;

/// Sizing of one spatial hash partition
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SpaceHashConfig {
    /// Edge length of a grid cell; pick something close to the typical shape size
    pub cell_size: f32,

    /// Number of hash buckets (rounded up to a prime)
    pub cell_count: usize,
}

impl Default for SpaceHashConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            cell_count: 1000,
        }
    }
}

/// Configuration parameters for a [`Space`](crate::core::Space)
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SpaceConfig {
    /// Constant acceleration applied to every dynamic body
    pub gravity: Vector2,

    /// Fraction of velocity kept per second (1.0 keeps everything)
    pub damping: f32,

    /// Impulse solver passes per step
    pub iterations: u32,

    /// Solver passes run with restitution before velocity integration
    pub elastic_iterations: u32,

    /// See [`DEFAULT_COLLISION_SLOP`]
    pub collision_slop: f32,

    /// See [`DEFAULT_BIAS_COEF`]
    pub bias_coef: f32,

    /// See [`DEFAULT_CONTACT_PERSISTENCE`]
    pub contact_persistence: u32,

    /// Partition holding shapes that never move
    pub static_hash: SpaceHashConfig,

    /// Partition rebuilt every step from moving shapes
    pub active_hash: SpaceHashConfig,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            gravity: Vector2::zero(),
            damping: 1.0,
            iterations: 10,
            elastic_iterations: 0,
            collision_slop: DEFAULT_COLLISION_SLOP,
            bias_coef: DEFAULT_BIAS_COEF,
            contact_persistence: DEFAULT_CONTACT_PERSISTENCE,
            static_hash: SpaceHashConfig::default(),
            active_hash: SpaceHashConfig::default(),
        }
    }
}
