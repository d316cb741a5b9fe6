mod body;
mod material;
mod body_type;
mod mass_properties;

pub use self::body::Body;
pub use self::material::Material;
pub use self::body_type::BodyType;
pub use self::mass_properties::{moment_for_circle, moment_for_polygon, area_for_polygon};
