mod collision_pair;
mod broad_phase;
mod narrow_phase;
mod contact;
mod arbiter;
mod contact_solver;
mod collision_filter;

pub use self::collision_pair::ShapePair;
pub use self::broad_phase::{is_valid_cell_size, next_prime, SpaceHash};
pub use self::narrow_phase::{collision_fn, min_separating_axis, order_shapes, CollisionFn, NarrowPhase};
pub use self::contact::{hash_pair, Contact, HASH_COEF};
pub use self::arbiter::Arbiter;
pub use self::contact_solver::{ContactSolver, SequentialImpulseSolver};
pub use self::collision_filter::{CollisionFilter, GroupLayerFilter};
