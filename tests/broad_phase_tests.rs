use phys2d_engine::collision::{is_valid_cell_size, next_prime, SpaceHash};
use phys2d_engine::math::{Aabb, Vector2};
use std::collections::BTreeSet;

fn square_bb(center: Vector2, half: f32) -> Aabb {
    Aabb::new(
        center - Vector2::new(half, half),
        center + Vector2::new(half, half),
    )
}

fn collect_pairs(hash: &mut SpaceHash<u32>) -> Vec<(u32, u32)> {
    let mut pairs = Vec::new();
    hash.query_rehash(|a, b| pairs.push((a.min(b), a.max(b))));
    pairs
}

#[test]
fn test_bucket_count_is_prime() {
    assert_eq!(next_prime(1000), 1009);
    assert_eq!(next_prime(7), 7);
    assert_eq!(next_prime(0), 2);

    let hash: SpaceHash<u32> = SpaceHash::new(100.0, 1000);
    assert_eq!(hash.cell_count(), 1009);
    assert_eq!(hash.cell_size(), 100.0);
}

#[test]
fn test_separated_shapes_yield_no_pairs() {
    let mut hash = SpaceHash::new(100.0, 1000);

    for i in 0..10u32 {
        for j in 0..10u32 {
            let center = Vector2::new(i as f32 * 300.0 + 50.0, j as f32 * 300.0 + 50.0);
            hash.insert(i * 10 + j, square_bb(center, 20.0));
        }
    }

    assert_eq!(hash.len(), 100);
    assert!(collect_pairs(&mut hash).is_empty());
}

#[test]
fn test_overlapping_pair_is_reported_once() {
    let mut hash = SpaceHash::new(100.0, 1000);
    hash.insert(1, square_bb(Vector2::new(50.0, 50.0), 20.0));
    hash.insert(2, square_bb(Vector2::new(60.0, 60.0), 20.0));
    hash.insert(3, square_bb(Vector2::new(900.0, 900.0), 20.0));

    assert_eq!(collect_pairs(&mut hash), vec![(1, 2)]);
}

#[test]
fn test_pair_spanning_many_cells_is_not_duplicated() {
    let mut hash = SpaceHash::new(10.0, 101);

    // Both boxes span dozens of shared cells
    hash.insert(1, Aabb::new(Vector2::new(0.0, 0.0), Vector2::new(95.0, 95.0)));
    hash.insert(2, Aabb::new(Vector2::new(5.0, 5.0), Vector2::new(100.0, 100.0)));

    let pairs = collect_pairs(&mut hash);
    assert_eq!(pairs, vec![(1, 2)]);

    // The same holds on the next pass
    let pairs = collect_pairs(&mut hash);
    assert_eq!(pairs, vec![(1, 2)]);
}

#[test]
fn test_query_visits_each_element_once() {
    let mut hash = SpaceHash::new(10.0, 101);
    hash.insert(7, Aabb::new(Vector2::new(0.0, 0.0), Vector2::new(200.0, 200.0)));
    hash.insert(8, square_bb(Vector2::new(500.0, 500.0), 5.0));

    let mut hits = Vec::new();
    hash.query(Aabb::new(Vector2::new(20.0, 20.0), Vector2::new(180.0, 180.0)), |id| hits.push(id));
    assert_eq!(hits, vec![7]);

    let mut hits = Vec::new();
    hash.query(square_bb(Vector2::new(1000.0, 1000.0), 5.0), |id| hits.push(id));
    assert!(hits.is_empty());
}

#[test]
fn test_negative_coordinates() {
    let mut hash = SpaceHash::new(100.0, 1000);
    hash.insert(1, square_bb(Vector2::new(-250.0, -40.0), 20.0));
    hash.insert(2, square_bb(Vector2::new(-235.0, -30.0), 20.0));
    hash.insert(3, square_bb(Vector2::new(250.0, 40.0), 20.0));

    assert_eq!(collect_pairs(&mut hash), vec![(1, 2)]);
}

#[test]
fn test_moving_elements_with_query_rehash() {
    let mut hash = SpaceHash::new(50.0, 97);
    hash.insert(1, square_bb(Vector2::new(0.0, 0.0), 10.0));
    hash.insert(2, square_bb(Vector2::new(400.0, 0.0), 10.0));
    assert!(collect_pairs(&mut hash).is_empty());

    // Move element 2 next to element 1; only the stored box changes
    hash.set_bb(2, square_bb(Vector2::new(15.0, 0.0), 10.0));
    assert_eq!(collect_pairs(&mut hash), vec![(1, 2)]);

    // And back out again
    hash.set_bb(2, square_bb(Vector2::new(400.0, 0.0), 10.0));
    assert!(collect_pairs(&mut hash).is_empty());
}

#[test]
fn test_remove_and_rehash_object() {
    let mut hash = SpaceHash::new(100.0, 1000);
    hash.insert(1, square_bb(Vector2::new(0.0, 0.0), 10.0));
    hash.insert(2, square_bb(Vector2::new(5.0, 0.0), 10.0));

    let mut hits = Vec::new();
    hash.query(square_bb(Vector2::new(0.0, 0.0), 1.0), |id| hits.push(id));
    assert_eq!(hits.len(), 2);

    assert!(hash.remove(2));
    assert!(!hash.remove(2));
    assert!(!hash.contains(2));

    let mut hits = Vec::new();
    hash.query(square_bb(Vector2::new(0.0, 0.0), 1.0), |id| hits.push(id));
    assert_eq!(hits, vec![1]);

    hash.rehash_object(1, square_bb(Vector2::new(800.0, 800.0), 10.0));
    let mut hits = Vec::new();
    hash.query(square_bb(Vector2::new(0.0, 0.0), 1.0), |id| hits.push(id));
    assert!(hits.is_empty());
    assert_eq!(hash.get_bb(1), Some(square_bb(Vector2::new(800.0, 800.0), 10.0)));
}

#[test]
fn test_point_query() {
    let mut hash = SpaceHash::new(100.0, 1000);
    hash.insert(1, square_bb(Vector2::new(0.0, 0.0), 10.0));
    hash.insert(2, square_bb(Vector2::new(5.0, 5.0), 10.0));
    hash.insert(3, square_bb(Vector2::new(300.0, 300.0), 10.0));

    let mut hits = BTreeSet::new();
    hash.point_query(Vector2::new(2.0, 2.0), |id| {
        hits.insert(id);
    });
    assert_eq!(hits.into_iter().collect::<Vec<_>>(), vec![1, 2]);

    let mut hits = Vec::new();
    hash.point_query(Vector2::new(150.0, 150.0), |id| hits.push(id));
    assert!(hits.is_empty());
}

#[test]
fn test_each_and_resize() {
    let mut hash = SpaceHash::new(100.0, 10);
    for id in 0..20u32 {
        hash.insert(id, square_bb(Vector2::new(id as f32 * 8.0, 0.0), 5.0));
    }

    let mut seen = Vec::new();
    hash.each(|id, _| seen.push(id));
    assert_eq!(seen, (0..20).collect::<Vec<_>>());

    let before = collect_pairs(&mut hash);
    assert_eq!(before.len(), 19);
    hash.resize(7.0, 500);
    assert_eq!(hash.cell_count(), 503);
    assert_eq!(hash.len(), 20);
    assert_eq!(collect_pairs(&mut hash), before);
}

#[test]
fn test_non_finite_boxes_are_ignored() {
    let mut hash = SpaceHash::new(100.0, 1000);
    hash.insert(1, Aabb::new(Vector2::new(f32::NAN, 0.0), Vector2::new(1.0, 1.0)));
    hash.insert(2, square_bb(Vector2::new(0.0, 0.0), 10.0));

    assert!(hash.contains(1));
    assert!(collect_pairs(&mut hash).is_empty());
}

#[test]
fn test_invalid_cell_size_falls_back() {
    assert!(is_valid_cell_size(0.5));
    assert!(!is_valid_cell_size(0.0));
    assert!(!is_valid_cell_size(-100.0));
    assert!(!is_valid_cell_size(f32::NAN));
    assert!(!is_valid_cell_size(f32::INFINITY));

    for cell_size in [0.0, -100.0, f32::NAN, f32::INFINITY] {
        let mut hash = SpaceHash::new(cell_size, 1000);
        assert_eq!(hash.cell_size(), 100.0);

        hash.insert(1, square_bb(Vector2::new(0.0, 0.0), 10.0));
        hash.insert(2, square_bb(Vector2::new(5.0, 0.0), 10.0));
        assert_eq!(collect_pairs(&mut hash), vec![(1, 2)]);
    }
}

#[test]
fn test_resize_keeps_cell_size_when_invalid() {
    let mut hash = SpaceHash::new(40.0, 100);
    hash.insert(1, square_bb(Vector2::new(0.0, 0.0), 10.0));
    hash.insert(2, square_bb(Vector2::new(5.0, 0.0), 10.0));

    hash.resize(-100.0, 200);
    assert_eq!(hash.cell_size(), 40.0);
    assert_eq!(hash.cell_count(), 211);
    assert_eq!(collect_pairs(&mut hash), vec![(1, 2)]);

    hash.resize(0.0, 200);
    assert_eq!(hash.cell_size(), 40.0);
    assert_eq!(collect_pairs(&mut hash), vec![(1, 2)]);
}
