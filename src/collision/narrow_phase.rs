//! Exact contact generation for each pair of shape types.
//!
//! Every routine takes its shapes in [`ShapeType`] order and reports normals
//! pointing from the first shape into the second. A `dist` of zero or less
//! means the shapes touch or overlap.

use tracing::trace;

use crate::collision::contact::{hash_pair, Contact};
use crate::core::config::DEFAULT_COLLISION_SLOP;
use crate::math::{self, Vector2};
use crate::shapes::{Polygon, PolygonAxis, Segment, Shape, ShapeType};

/// Contact generator for one ordered pair of shape types
pub type CollisionFn = fn(&NarrowPhase, &Shape, &Shape) -> Vec<Contact>;

const INITIAL_CONTACT_CAPACITY: usize = 2;

/// Dispatch table indexed by `[type_a][type_b]` with `type_a <= type_b`
static COLLISION_FUNCS: [[Option<CollisionFn>; ShapeType::COUNT]; ShapeType::COUNT] = [
    [
        Some(circle_to_circle as CollisionFn),
        Some(circle_to_segment as CollisionFn),
        Some(circle_to_polygon as CollisionFn),
    ],
    [None, None, Some(segment_to_polygon as CollisionFn)],
    [None, None, Some(polygon_to_polygon as CollisionFn)],
];

/// Looks up the routine for an ordered pair of shape types
pub fn collision_fn(a: ShapeType, b: ShapeType) -> Option<CollisionFn> {
    COLLISION_FUNCS[a.index()][b.index()]
}

/// Orders two shapes the way the dispatch table expects. Shapes of the same
/// type are ordered by id so a pair always comes out the same way round.
pub fn order_shapes<'a>(a: &'a Shape, b: &'a Shape) -> (&'a Shape, &'a Shape) {
    if needs_swap(a, b) {
        (b, a)
    } else {
        (a, b)
    }
}

#[inline]
fn needs_swap(a: &Shape, b: &Shape) -> bool {
    (a.shape_type(), a.get_id()) > (b.shape_type(), b.get_id())
}

/// Narrow-phase collision detection
#[derive(Debug, Clone, Copy)]
pub struct NarrowPhase {
    /// Margin subtracted from the polygon penetration before the segment's
    /// own normal is considered for contacts (see `DEFAULT_COLLISION_SLOP`)
    collision_slop: f32,
}

impl Default for NarrowPhase {
    fn default() -> Self {
        Self::new(DEFAULT_COLLISION_SLOP)
    }
}

impl NarrowPhase {
    /// Creates a narrow-phase with the given collision slop
    pub fn new(collision_slop: f32) -> Self {
        Self { collision_slop }
    }

    /// Returns the collision slop
    pub fn collision_slop(&self) -> f32 {
        self.collision_slop
    }

    /// Collides two shapes whose types are already in order.
    ///
    /// Returns an empty list when the shapes do not touch or when no routine
    /// exists for the pair of types.
    pub fn collide(&self, a: &Shape, b: &Shape) -> Vec<Contact> {
        match collision_fn(a.shape_type(), b.shape_type()) {
            Some(func) => func(self, a, b),
            None => {
                trace!(
                    type_a = ?a.shape_type(),
                    type_b = ?b.shape_type(),
                    "no collision routine for shape pair"
                );
                Vec::new()
            }
        }
    }

    /// Collides two shapes in any order.
    ///
    /// The returned flag is true when the shapes were swapped, in which case
    /// normals point from `b` into `a`.
    pub fn collide_any(&self, a: &Shape, b: &Shape) -> (Vec<Contact>, bool) {
        let swapped = needs_swap(a, b);
        let (first, second) = order_shapes(a, b);
        (self.collide(first, second), swapped)
    }
}

/// Contact between two circles given by center and radius, if they overlap
fn circle_to_circle_query(p1: Vector2, p2: Vector2, r1: f32, r2: f32, hash: u32) -> Option<Contact> {
    let min_dist = r1 + r2;
    let delta = p2 - p1;
    let dist_sq = delta.length_squared();
    if dist_sq >= min_dist * min_dist {
        return None;
    }

    let dist = math::sqrt(dist_sq);
    // Coincident centers: an infinite distance keeps the point at p1 without dividing by zero
    let non_zero_dist = if dist > 0.0 { dist } else { f32::INFINITY };

    let point = p1 + delta * (0.5 + (r1 - 0.5 * min_dist) / non_zero_dist);
    let normal = if dist > 0.0 {
        delta * (1.0 / non_zero_dist)
    } else {
        Vector2::unit_x()
    };

    Some(Contact::new(point, normal, dist - min_dist, hash))
}

fn circle_to_circle(_: &NarrowPhase, a: &Shape, b: &Shape) -> Vec<Contact> {
    let (Some(circle1), Some(circle2)) = (a.as_circle(), b.as_circle()) else {
        return Vec::new();
    };

    circle_to_circle_query(
        circle1.world_center(),
        circle2.world_center(),
        circle1.get_radius(),
        circle2.get_radius(),
        0,
    )
    .into_iter()
    .collect()
}

fn circle_to_segment(_: &NarrowPhase, a: &Shape, b: &Shape) -> Vec<Contact> {
    let (Some(circle), Some(segment)) = (a.as_circle(), b.as_segment()) else {
        return Vec::new();
    };

    let center = circle.world_center();
    let radius = circle.get_radius();
    let seg_radius = segment.get_radius();

    // Distance from the segment's center line
    let dn = segment.normal_distance(center);
    let dist = dn.abs() - radius - seg_radius;
    if dist > 0.0 {
        return Vec::new();
    }

    // Position along the segment decides which feature is hit
    let (dt, dt_min, dt_max) = segment.tangent_coordinates(center);

    let contact = if dt < dt_min {
        if dt < dt_min - radius {
            None
        } else {
            circle_to_circle_query(center, segment.world_a(), radius, seg_radius, 0)
        }
    } else if dt < dt_max {
        let tn = segment.world_normal();
        let n = if dn < 0.0 { tn } else { -tn };
        Some(Contact::new(center + n * (radius + dist * 0.5), n, dist, 0))
    } else if dt < dt_max + radius {
        circle_to_circle_query(center, segment.world_b(), radius, seg_radius, 0)
    } else {
        None
    };

    contact.into_iter().collect()
}

fn circle_to_polygon(_: &NarrowPhase, a: &Shape, b: &Shape) -> Vec<Contact> {
    let (Some(circle), Some(polygon)) = (a.as_circle(), b.as_polygon()) else {
        return Vec::new();
    };

    let center = circle.world_center();
    let radius = circle.get_radius();
    let axes = polygon.world_axes();

    let mut min_index = 0;
    let mut min = axes[0].n.dot(&center) - axes[0].d - radius;
    for (i, axis) in axes.iter().enumerate() {
        let dist = axis.n.dot(&center) - axis.d - radius;
        if dist > 0.0 {
            return Vec::new();
        } else if dist > min {
            min = dist;
            min_index = i;
        }
    }

    let verts = polygon.world_vertices();
    let n = axes[min_index].n;
    let a = verts[min_index];
    let b = verts[(min_index + 1) % verts.len()];
    let dta = n.cross(&a);
    let dtb = n.cross(&b);
    let dt = n.cross(&center);

    let contact = if dt < dtb {
        circle_to_circle_query(center, b, radius, 0.0, 0)
    } else if dt < dta {
        Some(Contact::new(center - n * (radius + min / 2.0), -n, min, 0))
    } else {
        circle_to_circle_query(center, a, radius, 0.0, 0)
    };

    contact.into_iter().collect()
}

/// Finds the axis of `axes` along which `polygon` penetrates least.
///
/// Returns `None` as soon as any axis separates the shapes, otherwise the
/// axis index and the (non-positive) separation along it.
pub fn min_separating_axis(polygon: &Polygon, axes: &[PolygonAxis]) -> Option<(usize, f32)> {
    let (first, rest) = axes.split_first()?;

    let mut min_index = 0;
    let mut min = polygon.value_on_axis(first.n, first.d);
    if min > 0.0 {
        return None;
    }

    for (i, axis) in rest.iter().enumerate() {
        let dist = polygon.value_on_axis(axis.n, axis.d);
        if dist > 0.0 {
            return None;
        } else if dist > min {
            min = dist;
            min_index = i + 1;
        }
    }

    Some((min_index, min))
}

/// Adds a contact for every vertex of either polygon lying inside the other
fn find_vertices(
    contacts: &mut Vec<Contact>,
    (id1, poly1): (u32, &Polygon),
    (id2, poly2): (u32, &Polygon),
    n: Vector2,
    dist: f32,
) {
    for (i, v) in poly1.world_vertices().iter().enumerate() {
        if poly2.contains_vertex(*v) {
            contacts.push(Contact::new(*v, n, dist, hash_pair(id1, i as u32)));
        }
    }

    for (i, v) in poly2.world_vertices().iter().enumerate() {
        if poly1.contains_vertex(*v) {
            contacts.push(Contact::new(*v, n, dist, hash_pair(id2, i as u32)));
        }
    }
}

fn polygon_to_polygon(_: &NarrowPhase, a: &Shape, b: &Shape) -> Vec<Contact> {
    let (Some(poly1), Some(poly2)) = (a.as_polygon(), b.as_polygon()) else {
        return Vec::new();
    };

    let Some((min_index1, min1)) = min_separating_axis(poly2, poly1.world_axes()) else {
        return Vec::new();
    };
    let Some((min_index2, min2)) = min_separating_axis(poly1, poly2.world_axes()) else {
        return Vec::new();
    };

    // Use the shallower of the two penetration axes
    let (n, dist) = if min1 > min2 {
        (poly1.world_axes()[min_index1].n, min1)
    } else {
        (-poly2.world_axes()[min_index2].n, min2)
    };

    let mut contacts = Vec::with_capacity(INITIAL_CONTACT_CAPACITY);
    find_vertices(
        &mut contacts,
        (a.get_id(), poly1),
        (b.get_id(), poly2),
        n,
        dist,
    );
    contacts
}

/// Like [`Polygon::value_on_axis`], for a thick segment
#[inline]
fn segment_value_on_axis(segment: &Segment, n: Vector2, d: f32) -> f32 {
    let r = segment.get_radius();
    let a = n.dot(&segment.world_a()) - r;
    let b = n.dot(&segment.world_b()) - r;
    a.min(b) - d
}

/// Adds contacts for polygon vertices that have crossed the segment's line
/// within its tangential span. `coef` selects the side of the segment.
fn find_points_behind_segment(
    contacts: &mut Vec<Contact>,
    segment: &Segment,
    (polygon_id, polygon): (u32, &Polygon),
    p_dist: f32,
    coef: f32,
) {
    let tn = segment.world_normal();
    let ta = segment.world_a();
    let dta = tn.cross(&ta);
    let dtb = tn.cross(&segment.world_b());
    let n = tn * coef;
    let limit = tn.dot(&ta) * coef + segment.get_radius();

    for (i, v) in polygon.world_vertices().iter().enumerate() {
        if v.dot(&n) < limit {
            let dt = tn.cross(v);
            if dta >= dt && dt >= dtb {
                contacts.push(Contact::new(*v, n, p_dist, hash_pair(polygon_id, i as u32)));
            }
        }
    }
}

fn segment_to_polygon(narrow_phase: &NarrowPhase, a: &Shape, b: &Shape) -> Vec<Contact> {
    let (Some(segment), Some(polygon)) = (a.as_segment(), b.as_polygon()) else {
        return Vec::new();
    };

    let tn = segment.world_normal();
    let r = segment.get_radius();

    // The segment only has one real face, tested in both directions
    let seg_d = tn.dot(&segment.world_a());
    let min_norm = polygon.value_on_axis(tn, seg_d) - r;
    let min_neg = polygon.value_on_axis(-tn, -seg_d) - r;
    if min_neg > 0.0 || min_norm > 0.0 {
        return Vec::new();
    }

    let axes = polygon.world_axes();
    let mut min_index = 0;
    let mut poly_min = segment_value_on_axis(segment, axes[0].n, axes[0].d);
    if poly_min > 0.0 {
        return Vec::new();
    }
    for (i, axis) in axes.iter().enumerate() {
        let dist = segment_value_on_axis(segment, axis.n, axis.d);
        if dist > 0.0 {
            return Vec::new();
        } else if dist > poly_min {
            poly_min = dist;
            min_index = i;
        }
    }

    let mut contacts = Vec::with_capacity(INITIAL_CONTACT_CAPACITY);

    let poly_n = -axes[min_index].n;
    let va = segment.world_a() + poly_n * r;
    let vb = segment.world_b() + poly_n * r;
    if polygon.contains_vertex(va) {
        contacts.push(Contact::new(va, poly_n, poly_min, hash_pair(a.get_id(), 0)));
    }
    if polygon.contains_vertex(vb) {
        contacts.push(Contact::new(vb, poly_n, poly_min, hash_pair(a.get_id(), 1)));
    }

    // Float precision makes the segment normal win too rarely without the slop
    let poly_min = poly_min - narrow_phase.collision_slop;
    if min_norm >= poly_min || min_neg >= poly_min {
        if min_norm > min_neg {
            find_points_behind_segment(&mut contacts, segment, (b.get_id(), polygon), min_norm, 1.0);
        } else {
            find_points_behind_segment(&mut contacts, segment, (b.get_id(), polygon), min_neg, -1.0);
        }
    }

    contacts
}
