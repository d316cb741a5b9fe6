use phys2d_engine::{
    Body, BodyHandle, Shape, ShapeType, Vector2,
    collision::{collision_fn, hash_pair, min_separating_axis, order_shapes, NarrowPhase},
    core::Handle,
};
use approx::{assert_abs_diff_eq, assert_relative_eq};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn body_at(position: Vector2) -> Body {
    let mut body = Body::new(1.0, 1.0);
    body.set_position(position);
    body
}

fn handle(id: u32) -> BodyHandle {
    BodyHandle::from_raw(id)
}

fn circle_at(id: u32, position: Vector2, radius: f32) -> Shape {
    let mut shape = Shape::circle(handle(id), radius, Vector2::zero());
    shape.update(&body_at(position));
    shape
}

fn box_at(id: u32, position: Vector2, side: f32) -> Shape {
    let h = side / 2.0;
    let verts = [
        Vector2::new(-h, -h),
        Vector2::new(-h, h),
        Vector2::new(h, h),
        Vector2::new(h, -h),
    ];
    let mut shape = Shape::polygon(handle(id), &verts, Vector2::zero()).unwrap();
    shape.update(&body_at(position));
    shape
}

fn segment_at(id: u32, a: Vector2, b: Vector2, radius: f32) -> Shape {
    let mut shape = Shape::segment(handle(id), a, b, radius);
    shape.update(&body_at(Vector2::zero()));
    shape
}

fn floor_segment(id: u32) -> Shape {
    let mut shape = Shape::segment(
        handle(id),
        Vector2::new(-100.0, 0.0),
        Vector2::new(100.0, 0.0),
        0.0,
    );
    shape.update(&body_at(Vector2::zero()));
    shape
}

#[test]
fn test_dispatch_table_covers_ordered_pairs() {
    let types = [ShapeType::Circle, ShapeType::Segment, ShapeType::Polygon];

    for a in types {
        for b in types {
            let expected = a <= b && !(a == ShapeType::Segment && b == ShapeType::Segment);
            assert_eq!(collision_fn(a, b).is_some(), expected, "{:?} x {:?}", a, b);
        }
    }
}

#[test]
fn test_overlapping_circles() {
    let narrow_phase = NarrowPhase::default();
    let a = circle_at(1, Vector2::new(0.0, 0.0), 10.0);
    let b = circle_at(2, Vector2::new(5.0, 0.0), 10.0);

    let contacts = narrow_phase.collide(&a, &b);
    assert_eq!(contacts.len(), 1);

    let contact = &contacts[0];
    assert_relative_eq!(contact.dist, -15.0);
    assert_abs_diff_eq!(contact.normal, Vector2::new(1.0, 0.0), epsilon = 1e-6);
    assert_abs_diff_eq!(contact.point, Vector2::new(2.5, 0.0), epsilon = 1e-5);
    assert_relative_eq!(contact.penetration(), 15.0);
}

#[test]
fn test_separated_and_touching_circles() {
    let narrow_phase = NarrowPhase::default();
    let a = circle_at(1, Vector2::new(0.0, 0.0), 10.0);

    let far = circle_at(2, Vector2::new(25.0, 0.0), 10.0);
    assert!(narrow_phase.collide(&a, &far).is_empty());

    // Exactly touching is not a collision
    let touching = circle_at(3, Vector2::new(20.0, 0.0), 10.0);
    assert!(narrow_phase.collide(&a, &touching).is_empty());
}

#[test]
fn test_coincident_circles_stay_finite() {
    let narrow_phase = NarrowPhase::default();
    let a = circle_at(1, Vector2::new(3.0, 4.0), 5.0);
    let b = circle_at(2, Vector2::new(3.0, 4.0), 5.0);

    let contacts = narrow_phase.collide(&a, &b);
    assert_eq!(contacts.len(), 1);

    let contact = &contacts[0];
    assert_relative_eq!(contact.dist, -10.0);
    assert_relative_eq!(contact.normal.length(), 1.0);
    assert!(contact.point.x.is_finite() && contact.point.y.is_finite());
}

#[test]
fn test_random_circle_pairs() {
    let narrow_phase = NarrowPhase::default();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..500 {
        let p1 = Vector2::new(rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0));
        let p2 = Vector2::new(rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0));
        let r1 = rng.gen_range(1.0..30.0);
        let r2 = rng.gen_range(1.0..30.0);

        let a = circle_at(1, p1, r1);
        let b = circle_at(2, p2, r2);
        let contacts = narrow_phase.collide(&a, &b);

        let min_dist = r1 + r2;
        let dist_sq = (p2 - p1).length_squared();
        if dist_sq >= min_dist * min_dist {
            assert!(contacts.is_empty());
        } else {
            assert_eq!(contacts.len(), 1);
            let contact = &contacts[0];
            assert!(contact.dist < 0.0);
            assert_relative_eq!(contact.dist, dist_sq.sqrt() - min_dist, epsilon = 1e-3);
            assert_relative_eq!(contact.normal.length(), 1.0, epsilon = 1e-5);
            // Normal points from the first circle toward the second
            assert!(contact.normal.dot(&(p2 - p1)) >= 0.0);
        }
    }
}

#[test]
fn test_circle_on_segment_face() {
    let narrow_phase = NarrowPhase::default();
    let circle = circle_at(1, Vector2::new(0.0, -5.0), 10.0);
    let segment = floor_segment(2);

    let contacts = narrow_phase.collide(&circle, &segment);
    assert_eq!(contacts.len(), 1);

    let contact = &contacts[0];
    assert_relative_eq!(contact.dist, -5.0);
    assert_abs_diff_eq!(contact.normal, Vector2::new(0.0, 1.0), epsilon = 1e-6);
    assert_abs_diff_eq!(contact.point, Vector2::new(0.0, 2.5), epsilon = 1e-5);
}

#[test]
fn test_circle_on_other_side_of_segment() {
    let narrow_phase = NarrowPhase::default();
    let circle = circle_at(1, Vector2::new(10.0, 4.0), 10.0);
    let segment = floor_segment(2);

    let contacts = narrow_phase.collide(&circle, &segment);
    assert_eq!(contacts.len(), 1);
    assert_abs_diff_eq!(contacts[0].normal, Vector2::new(0.0, -1.0), epsilon = 1e-6);
    assert_relative_eq!(contacts[0].dist, -6.0);
}

#[test]
fn test_circle_past_segment_end() {
    let narrow_phase = NarrowPhase::default();
    let segment = floor_segment(2);

    // Near the second endpoint: hits the end cap
    let circle = circle_at(1, Vector2::new(105.0, -3.0), 10.0);
    let contacts = narrow_phase.collide(&circle, &segment);
    assert_eq!(contacts.len(), 1);

    let expected = (Vector2::new(100.0, 0.0) - Vector2::new(105.0, -3.0)).normalize();
    assert_relative_eq!(contacts[0].normal.length(), 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(contacts[0].normal, expected, epsilon = 1e-5);
    assert!(contacts[0].dist <= 0.0);

    // Past the first endpoint by more than the radius: nothing
    let beyond = circle_at(3, Vector2::new(-112.0, -1.0), 10.0);
    assert!(narrow_phase.collide(&beyond, &segment).is_empty());

    // Well above the segment: nothing
    let above = circle_at(4, Vector2::new(0.0, -30.0), 10.0);
    assert!(narrow_phase.collide(&above, &segment).is_empty());
}

#[test]
fn test_circle_at_segment_endpoint_boundaries() {
    let narrow_phase = NarrowPhase::default();
    let segment = floor_segment(2);

    // Exactly over the first endpoint: still the face
    let circle = circle_at(1, Vector2::new(-100.0, -8.0), 10.0);
    let contacts = narrow_phase.collide(&circle, &segment);
    assert_eq!(contacts.len(), 1);
    assert_abs_diff_eq!(contacts[0].normal, Vector2::new(0.0, 1.0), epsilon = 1e-6);
    assert_relative_eq!(contacts[0].dist, -2.0, epsilon = 1e-5);
    assert_abs_diff_eq!(contacts[0].point, Vector2::new(-100.0, 1.0), epsilon = 1e-5);

    // Just past the second endpoint: the end cap, normal toward the endpoint
    let center = Vector2::new(103.0, -8.0);
    let circle = circle_at(3, center, 10.0);
    let contacts = narrow_phase.collide(&circle, &segment);
    assert_eq!(contacts.len(), 1);
    let offset = Vector2::new(100.0, 0.0) - center;
    assert_abs_diff_eq!(contacts[0].normal, offset.normalize(), epsilon = 1e-5);
    assert_relative_eq!(contacts[0].dist, offset.length() - 10.0, epsilon = 1e-4);

    // Within reach of the face line but more than a radius past the end
    let circle = circle_at(4, Vector2::new(111.0, -1.0), 10.0);
    assert!(narrow_phase.collide(&circle, &segment).is_empty());
}

#[test]
fn test_circle_on_polygon_face_and_corner() {
    let narrow_phase = NarrowPhase::default();
    let polygon = box_at(10, Vector2::zero(), 20.0);

    let circle = circle_at(1, Vector2::new(0.0, -12.0), 5.0);
    let contacts = narrow_phase.collide(&circle, &polygon);
    assert_eq!(contacts.len(), 1);
    assert_relative_eq!(contacts[0].dist, -3.0, epsilon = 1e-5);
    assert_abs_diff_eq!(contacts[0].normal, Vector2::new(0.0, 1.0), epsilon = 1e-6);

    let corner = circle_at(2, Vector2::new(12.0, 12.0), 5.0);
    let contacts = narrow_phase.collide(&corner, &polygon);
    assert_eq!(contacts.len(), 1);
    let expected = Vector2::new(-1.0, -1.0).normalize();
    assert_abs_diff_eq!(contacts[0].normal, expected, epsilon = 1e-5);

    let clear = circle_at(3, Vector2::new(0.0, -20.0), 5.0);
    assert!(narrow_phase.collide(&clear, &polygon).is_empty());
}

#[test]
fn test_polygons_overlapping_by_margin() {
    let narrow_phase = NarrowPhase::default();
    let a = box_at(1, Vector2::zero(), 20.0);
    let b = box_at(2, Vector2::new(15.0, 0.0), 20.0);

    let poly_a = a.as_polygon().unwrap();
    let poly_b = b.as_polygon().unwrap();

    let (_, min_a) = min_separating_axis(poly_b, poly_a.world_axes()).unwrap();
    let (_, min_b) = min_separating_axis(poly_a, poly_b.world_axes()).unwrap();
    assert!(min_a <= 0.0);
    assert!(min_b <= 0.0);
    assert_relative_eq!(min_a.max(min_b), -5.0, epsilon = 1e-5);

    let contacts = narrow_phase.collide(&a, &b);
    assert!(!contacts.is_empty());
    for contact in &contacts {
        assert_abs_diff_eq!(contact.normal, Vector2::new(1.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(contact.dist, -5.0, epsilon = 1e-5);
    }
}

#[test]
fn test_polygon_contact_hashes_are_distinct() {
    assert_ne!(hash_pair(1, 3), hash_pair(3, 1));

    // Vertex 3 of shape 1 and vertex 1 of shape 3 both end up inside
    let narrow_phase = NarrowPhase::default();
    let a = box_at(1, Vector2::zero(), 2.0);
    let b = box_at(3, Vector2::new(1.5, -1.5), 2.0);

    let contacts = narrow_phase.collide(&a, &b);
    assert_eq!(contacts.len(), 2);
    assert_abs_diff_eq!(contacts[0].point, Vector2::new(1.0, -1.0), epsilon = 1e-6);
    assert_abs_diff_eq!(contacts[1].point, Vector2::new(0.5, -0.5), epsilon = 1e-6);
    assert_ne!(contacts[0].hash, contacts[1].hash);

    for id_a in 1..20 {
        for id_b in (id_a + 1)..20 {
            let a = box_at(id_a, Vector2::zero(), 2.0);
            let b = box_at(id_b, Vector2::new(1.5, -1.5), 2.0);
            let contacts = narrow_phase.collide(&a, &b);
            assert_ne!(contacts[0].hash, contacts[1].hash, "ids {} and {}", id_a, id_b);
        }
    }
}

#[test]
fn test_disjoint_polygons() {
    let narrow_phase = NarrowPhase::default();
    let a = box_at(1, Vector2::zero(), 20.0);

    // Bounding radius of each box is 10·√2
    for offset in [
        Vector2::new(40.0, 0.0),
        Vector2::new(0.0, -40.0),
        Vector2::new(-30.0, 30.0),
    ] {
        let b = box_at(2, offset, 20.0);
        assert!(narrow_phase.collide(&a, &b).is_empty());
        assert!(min_separating_axis(b.as_polygon().unwrap(), a.as_polygon().unwrap().world_axes()).is_none());
    }
}

#[test]
fn test_rotated_polygons_report_negative_separation() {
    let narrow_phase = NarrowPhase::default();
    let a = box_at(1, Vector2::zero(), 20.0);

    let h = 10.0;
    let verts = [
        Vector2::new(-h, -h),
        Vector2::new(-h, h),
        Vector2::new(h, h),
        Vector2::new(h, -h),
    ];
    let mut b = Shape::polygon(handle(2), &verts, Vector2::zero()).unwrap();
    let mut body = body_at(Vector2::new(20.0, 0.0));
    body.set_angle(std::f32::consts::FRAC_PI_4);
    b.update(&body);

    let contacts = narrow_phase.collide(&a, &b);
    assert!(!contacts.is_empty());
    for contact in &contacts {
        assert!(contact.dist <= 0.0);
        assert_relative_eq!(contact.normal.length(), 1.0, epsilon = 1e-5);
    }
}

#[test]
fn test_segment_against_polygon() {
    let narrow_phase = NarrowPhase::default();
    let segment = floor_segment(1);
    let polygon = box_at(2, Vector2::new(0.0, -9.0), 20.0);

    let contacts = narrow_phase.collide(&segment, &polygon);
    assert_eq!(contacts.len(), 2);

    for contact in &contacts {
        // Normal points from the segment toward the box resting on it
        assert_abs_diff_eq!(contact.normal, Vector2::new(0.0, -1.0), epsilon = 1e-6);
        assert_relative_eq!(contact.dist, -1.0, epsilon = 1e-5);
        assert_relative_eq!(contact.point.y, 1.0, epsilon = 1e-5);
    }

    // Contact keys differ per vertex
    assert_ne!(contacts[0].hash, contacts[1].hash);

    let lifted = box_at(3, Vector2::new(0.0, -20.0), 20.0);
    assert!(narrow_phase.collide(&segment, &lifted).is_empty());
}

#[test]
fn test_segment_endpoint_inside_polygon() {
    let narrow_phase = NarrowPhase::default();
    let polygon = box_at(10, Vector2::zero(), 20.0);

    // Poking down into the box's upper face by 2
    let segment = segment_at(1, Vector2::new(0.0, -30.0), Vector2::new(0.0, -8.0), 0.0);
    let contacts = narrow_phase.collide(&segment, &polygon);
    assert_eq!(contacts.len(), 1);
    assert_abs_diff_eq!(contacts[0].point, Vector2::new(0.0, -8.0), epsilon = 1e-6);
    assert_abs_diff_eq!(contacts[0].normal, Vector2::new(0.0, 1.0), epsilon = 1e-6);
    assert_relative_eq!(contacts[0].dist, -2.0, epsilon = 1e-5);
    assert_eq!(contacts[0].hash, hash_pair(1, 1));

    // The same reach from a thick segment: the contact sits on its rounded tip
    let thick = segment_at(2, Vector2::new(0.0, -30.0), Vector2::new(0.0, -11.0), 3.0);
    let contacts = narrow_phase.collide(&thick, &polygon);
    assert_eq!(contacts.len(), 1);
    assert_abs_diff_eq!(contacts[0].point, Vector2::new(0.0, -8.0), epsilon = 1e-6);
    assert_relative_eq!(contacts[0].dist, -2.0, epsilon = 1e-5);
}

#[test]
fn test_thick_segment_against_polygon() {
    let narrow_phase = NarrowPhase::default();
    let polygon = box_at(10, Vector2::new(0.0, -11.0), 20.0);

    // One unit clear of the center line
    let thin = segment_at(1, Vector2::new(-100.0, 0.0), Vector2::new(100.0, 0.0), 0.0);
    assert!(narrow_phase.collide(&thin, &polygon).is_empty());

    // A radius of 2 reaches one unit into the box
    let thick = segment_at(2, Vector2::new(-100.0, 0.0), Vector2::new(100.0, 0.0), 2.0);
    let contacts = narrow_phase.collide(&thick, &polygon);
    assert_eq!(contacts.len(), 2);
    for contact in &contacts {
        assert_abs_diff_eq!(contact.normal, Vector2::new(0.0, -1.0), epsilon = 1e-6);
        assert_relative_eq!(contact.dist, -1.0, epsilon = 1e-5);
        assert_relative_eq!(contact.point.y, -1.0, epsilon = 1e-5);
    }

    let lifted = box_at(11, Vector2::new(0.0, -12.5), 20.0);
    assert!(narrow_phase.collide(&thick, &lifted).is_empty());
}

#[test]
fn test_collision_slop_gates_points_behind_segment() {
    let segment = floor_segment(1);

    // The box overlaps the segment's end by half a unit, its lower half below the line
    let polygon = box_at(2, Vector2::new(109.5, 0.0), 20.0);

    let contacts = NarrowPhase::default().collide(&segment, &polygon);
    assert_eq!(contacts.len(), 1);
    assert_abs_diff_eq!(contacts[0].point, Vector2::new(100.0, 0.0), epsilon = 1e-6);
    assert_abs_diff_eq!(contacts[0].normal, Vector2::new(1.0, 0.0), epsilon = 1e-6);
    assert_relative_eq!(contacts[0].dist, -0.5, epsilon = 1e-5);

    // A slop wider than the face penetration also collects the vertex behind the face
    let wide = NarrowPhase::new(10.0);
    assert_eq!(wide.collision_slop(), 10.0);
    let contacts = wide.collide(&segment, &polygon);
    assert_eq!(contacts.len(), 2);
    assert_abs_diff_eq!(contacts[1].point, Vector2::new(99.5, 10.0), epsilon = 1e-5);
    assert_abs_diff_eq!(contacts[1].normal, Vector2::new(0.0, -1.0), epsilon = 1e-6);
    assert_relative_eq!(contacts[1].dist, -10.0, epsilon = 1e-5);
    assert_ne!(contacts[0].hash, contacts[1].hash);
}

#[test]
fn test_segment_pairs_have_no_routine() {
    let narrow_phase = NarrowPhase::default();
    let a = floor_segment(1);
    let b = floor_segment(2);
    assert!(narrow_phase.collide(&a, &b).is_empty());
}

#[test]
fn test_collide_any_orders_by_type() {
    let narrow_phase = NarrowPhase::default();
    let polygon = box_at(10, Vector2::zero(), 20.0);
    let circle = circle_at(1, Vector2::new(0.0, -12.0), 5.0);

    let (first, second) = order_shapes(&polygon, &circle);
    assert_eq!(first.shape_type(), ShapeType::Circle);
    assert_eq!(second.shape_type(), ShapeType::Polygon);

    let (contacts, swapped) = narrow_phase.collide_any(&polygon, &circle);
    assert!(swapped);
    assert_eq!(contacts.len(), 1);
    assert_abs_diff_eq!(contacts[0].normal, Vector2::new(0.0, 1.0), epsilon = 1e-6);
}
