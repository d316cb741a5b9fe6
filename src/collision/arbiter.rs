use crate::bodies::Material;
use crate::collision::collision_pair::ShapePair;
use crate::collision::contact::Contact;
use crate::core::{BodyHandle, ShapeHandle};
use crate::math::Vector2;

/// The contact set between two shapes, kept across steps for warm starting
#[derive(Debug, Clone)]
pub struct Arbiter {
    /// First shape in narrow-phase order; contact normals point away from it
    pub shape_a: ShapeHandle,

    /// Second shape in narrow-phase order
    pub shape_b: ShapeHandle,

    /// Body owning `shape_a`
    pub body_a: BodyHandle,

    /// Body owning `shape_b`
    pub body_b: BodyHandle,

    /// Current contact points
    pub contacts: Vec<Contact>,

    /// Combined restitution of the two shapes
    pub restitution: f32,

    /// Combined friction of the two shapes
    pub friction: f32,

    /// Step at which the contacts were last refreshed
    pub(crate) stamp: u64,

    /// Whether the shapes touched on the last step they were tested
    pub(crate) touching: bool,
}

impl Arbiter {
    /// Creates an arbiter for shapes already in narrow-phase order
    pub fn new(
        shape_a: ShapeHandle,
        shape_b: ShapeHandle,
        body_a: BodyHandle,
        body_b: BodyHandle,
        material_a: &Material,
        material_b: &Material,
    ) -> Self {
        let mut arbiter = Self {
            shape_a,
            shape_b,
            body_a,
            body_b,
            contacts: Vec::new(),
            restitution: 0.0,
            friction: 0.0,
            stamp: 0,
            touching: false,
        };
        arbiter.set_materials(material_a, material_b);
        arbiter
    }

    /// Recomputes the combined restitution and friction
    pub fn set_materials(&mut self, material_a: &Material, material_b: &Material) {
        let combined = material_a.combine(material_b);
        self.restitution = combined.restitution;
        self.friction = combined.friction;
    }

    /// Returns true if the shapes touched on the last step they were tested
    pub fn is_touching(&self) -> bool {
        self.touching
    }

    /// Returns the key this arbiter is stored under
    pub fn pair(&self) -> ShapePair {
        ShapePair::new(self.shape_a, self.shape_b)
    }

    /// Replaces the contact set, carrying accumulated impulses over from old
    /// contacts with the same hash
    pub fn inject(&mut self, mut contacts: Vec<Contact>, stamp: u64) {
        for new_contact in &mut contacts {
            if let Some(old) = self.contacts.iter().find(|old| old.hash == new_contact.hash) {
                new_contact.jn_acc = old.jn_acc;
                new_contact.jt_acc = old.jt_acc;
            }
        }

        self.contacts = contacts;
        self.stamp = stamp;
        self.touching = true;
    }

    /// Returns the step at which the contacts were last refreshed
    pub fn get_stamp(&self) -> u64 {
        self.stamp
    }

    /// Returns the sum of the impulses applied at every contact, in world space.
    /// The impulse acts on the second body; the first gets its negation.
    pub fn total_impulse(&self) -> Vector2 {
        self.contacts
            .iter()
            .fold(Vector2::zero(), |sum, c| sum + c.impulse())
    }
}
