use super::shapes::{box_sdf, circle_sdf, stamp_obstacle};
use super::*;
use bevy::math::Vec2;

fn open_map(size: i32, value: f32) -> SdfMap {
    let distances = vec![value; (size * size) as usize];
    SdfMap::from_distances(size, size, 1.0, Vec2::ZERO, &distances).unwrap()
}

/// 10x10 field with a 3-wide wall over x = 4..6 running from below the map up to `top`.
fn wall_map(top: f32) -> SdfMap {
    let center_y = (top - 1.0) / 2.0;
    let half_height = (top + 1.0) / 2.0;
    SdfMap::from_fn(10, 10, 1.0, Vec2::ZERO, |p| {
        box_sdf(p, Vec2::new(5.0, center_y), Vec2::new(1.0, half_height))
    })
    .unwrap()
}

#[test]
fn test_quantization_scale_uses_max_abs_distance() {
    let map = SdfMap::from_distances(2, 1, 1.0, Vec2::ZERO, &[-4.0, 2.0]).unwrap();
    assert!((map.scale() - 4.0 / 32767.0).abs() < 1e-9);
    assert_eq!(map.cell(0, 0), -32767);
    assert!((map.clearance(1, 0) - 2.0).abs() < 1e-3);
}

#[test]
fn test_out_of_range_accessors_are_asymmetric() {
    let map = open_map(4, 10.0);
    // 2D accessor checks both axes
    assert_eq!(map.cell(4, 0), i16::MIN);
    assert_eq!(map.cell(-1, 2), i16::MIN);
    // flat accessor wraps x == width into the next row
    assert!(map.distance_at(4) > 0.0);
    assert_eq!(map.distance_at(16), map.solid_distance());
    assert_eq!(map.distance_at(-1), map.solid_distance());
    assert_eq!(map.clearance(4, 0), map.solid_distance());
    // the sentinel only reaches just past the largest stored distance
    assert!(map.solid_distance() < -10.0 && map.solid_distance() > -10.01);
}

#[test]
fn test_sample_is_constant_on_open_field() {
    let map = open_map(10, 100.0);
    for p in [Vec2::new(0.5, 0.5), Vec2::new(9.5, 9.5), Vec2::new(4.2, 7.9)] {
        assert!((map.sample(p) - 100.0).abs() < 0.01, "sample at {:?} = {}", p, map.sample(p));
    }
    assert!(map.sample(Vec2::new(-0.5, 3.0)) < 0.0, "outside the footprint reads as solid");
}

#[test]
fn test_sample_is_continuous_across_cell_boundaries() {
    let mut rng = fastrand::Rng::with_seed(7);
    let distances: Vec<f32> = (0..64).map(|_| rng.f32() * 10.0 - 5.0).collect();
    let map = SdfMap::from_distances(8, 8, 0.5, Vec2::new(-1.0, 2.0), &distances).unwrap();

    for x in 1..7 {
        for y in 1..7 {
            let corner = map.grid_to_world(x, y);
            let exact = map.sample(corner);
            for offset in [Vec2::new(-1e-4, 0.0), Vec2::new(0.0, -1e-4), Vec2::new(-1e-4, -1e-4)] {
                let near = map.sample(corner + offset);
                assert!(
                    (exact - near).abs() < 1e-2,
                    "discontinuity at ({}, {}): {} vs {}",
                    x,
                    y,
                    exact,
                    near
                );
            }
            assert!((exact - map.clearance(x, y)).abs() < 1e-3);
        }
    }
}

#[test]
fn test_gradient_points_away_from_obstacle() {
    let map = SdfMap::from_fn(20, 20, 0.5, Vec2::ZERO, |p| circle_sdf(p, Vec2::new(5.0, 5.0), 2.0)).unwrap();
    let g = map.gradient(Vec2::new(8.0, 5.0));
    assert!(g.x > 0.5, "gradient should point in +x, got {:?}", g);
    assert!(g.y.abs() < 0.1);
}

#[test]
fn test_straight_move_on_open_field() {
    let map = open_map(10, 100.0);
    assert!(map.check_straight_move(Vec2::new(0.5, 0.5), Vec2::new(9.5, 9.5), 0.5));
}

#[test]
fn test_straight_move_blocked_by_wall() {
    let map = wall_map(10.0);
    assert!(!map.check_straight_move(Vec2::new(0.5, 0.5), Vec2::new(9.5, 9.5), 0.5));
    assert!(!map.check_straight_move(Vec2::new(1.0, 5.0), Vec2::new(9.0, 5.0), 0.5));
    assert!(map.check_straight_move(Vec2::new(1.0, 1.0), Vec2::new(1.0, 8.0), 0.5));
}

#[test]
fn test_disk_cast_stops_before_wall() {
    let map = SdfMap::from_fn(20, 20, 0.5, Vec2::ZERO, |p| box_sdf(p, Vec2::new(7.0, 5.0), Vec2::new(0.5, 4.0))).unwrap();
    let origin = Vec2::new(2.0, 5.0);
    let travel = map.disk_cast(origin, Vec2::X, 0.5, 10.0);
    // wall face at x = 6.5, so the disk stops with its center near x = 6.0
    assert!(travel <= 4.0 + 1e-2, "travelled {}", travel);
    assert!(travel > 3.5, "travelled {}", travel);
    assert!(map.sample(origin + Vec2::X * travel) >= 0.5 - 1e-2);

    let free = map.disk_cast(origin, -Vec2::Y, 0.5, 1.0);
    assert_eq!(free, 1.0);
}

#[test]
fn test_try_move_to_lets_penetrating_agent_escape() {
    let map = SdfMap::from_fn(20, 20, 0.5, Vec2::ZERO, |p| box_sdf(p, Vec2::new(5.0, 5.0), Vec2::new(1.0, 1.0))).unwrap();
    let inside_edge = Vec2::new(6.2, 5.0);
    assert!(map.sample(inside_edge) < 0.5);
    assert_eq!(map.try_move_to(inside_edge, Vec2::X, 0.5, 0.3), 0.3);
    assert_eq!(map.try_move_to(inside_edge, -Vec2::X, 0.5, 0.3), 0.0);
}

#[test]
fn test_rescue_never_decreases_clearance() {
    let map = SdfMap::from_fn(20, 20, 0.5, Vec2::ZERO, |p| circle_sdf(p, Vec2::new(5.0, 5.0), 2.0))
        .unwrap()
        .with_params(SdfQueryParams {
            rescue_iterations: 1,
            ..Default::default()
        });
    let radius = 0.6;
    let mut point = Vec2::new(5.8, 5.3);
    let mut last = map.sample(point);
    for _ in 0..40 {
        point = map.find_nearest_valid_point(point, radius);
        let sd = map.sample(point);
        assert!(sd >= last - 1e-5, "clearance dropped from {} to {}", last, sd);
        last = sd;
    }
    assert!(last >= radius - 1e-3, "rescue should reach the radius, got {}", last);
}

#[test]
fn test_map_round_trip_preserves_every_sample() {
    let map = SdfMap::from_fn(7, 5, 0.25, Vec2::new(-3.5, 12.0), |p| circle_sdf(p, Vec2::new(-2.0, 12.5), 0.4)).unwrap();
    let bytes = map.to_bytes().unwrap();
    assert_eq!(bytes.len(), 28 + 7 * 5 * 2);
    let decoded = SdfMap::from_bytes(&bytes).unwrap();
    assert_eq!(decoded.width(), 7);
    assert_eq!(decoded.height(), 5);
    assert_eq!(decoded.grain(), map.grain());
    assert_eq!(decoded.scale(), map.scale());
    assert_eq!(decoded.origin(), map.origin());
    assert_eq!(decoded.data(), map.data());
}

#[test]
fn test_header_layout_is_little_endian() {
    let map = SdfMap::new(2, 1, 1.5, 0.5, Vec2::new(3.0, -1.0), vec![1, -2]).unwrap();
    let bytes = map.to_bytes().unwrap();
    assert_eq!(&bytes[0..4], &2i32.to_le_bytes());
    assert_eq!(&bytes[4..8], &1i32.to_le_bytes());
    assert_eq!(&bytes[8..12], &1.5f32.to_le_bytes());
    assert_eq!(&bytes[24..28], &2i32.to_le_bytes());
    assert_eq!(&bytes[28..30], &1i16.to_le_bytes());
    assert_eq!(&bytes[30..32], &(-2i16).to_le_bytes());
}

#[test]
fn test_truncated_blob_is_rejected() {
    let map = open_map(3, 1.0);
    let bytes = map.to_bytes().unwrap();
    assert!(SdfMap::from_bytes(&bytes[..bytes.len() - 1]).is_err());

    let mut bad_len = bytes.clone();
    bad_len[24..28].copy_from_slice(&5i32.to_le_bytes());
    assert!(matches!(SdfMap::from_bytes(&bad_len), Err(SdfError::DataLength { .. })));
}

#[test]
fn test_scene_round_trip_and_compose() {
    let map = open_map(10, 5.0);
    let post = stamp_obstacle("post", &map, 3, 3, 4, 4, |p| circle_sdf(p, Vec2::new(4.5, 4.5), 1.0)).unwrap();
    let mut scene = SdfScene::new(map);
    scene.obstacles.push(post);

    let decoded = SdfScene::from_bytes(&scene.to_bytes().unwrap()).unwrap();
    assert_eq!(decoded, scene);

    let composed = scene.compose();
    assert!(composed.clearance(4, 4) < 0.0, "post interior should be solid");
    assert!((composed.clearance(0, 0) - 5.0).abs() < 1e-3, "cells outside the patch keep the base value");

    scene.set_active("post", false);
    assert_eq!(scene.compose().data(), scene.map.data());
}

#[test]
fn test_compressed_scene_round_trip() {
    let mut scene = SdfScene::new(open_map(6, 2.0));
    scene
        .obstacles
        .push(DynamicObstacle::new("gate ☐".into(), 2, 1, 1, 1, vec![-5, -6]).unwrap());
    let mut buf = Vec::new();
    write_compressed(&mut buf, &scene).unwrap();
    let decoded = read_compressed(buf.as_slice()).unwrap();
    assert_eq!(decoded, scene);
}

#[test]
fn test_obstacle_rejects_mismatched_data() {
    let short = DynamicObstacle::new("short".into(), 3, 2, 0, 0, vec![-1; 5]);
    assert!(matches!(
        short,
        Err(SdfError::DataLength { expected: 6, actual: 5 })
    ));
    let empty = DynamicObstacle::new("empty".into(), 0, 4, 0, 0, Vec::new());
    assert!(matches!(empty, Err(SdfError::InvalidDimensions { .. })));

    let map = open_map(6, 3.0);
    assert!(stamp_obstacle("none", &map, 1, 1, 0, 2, |_| -1.0).is_err());

    let ok = DynamicObstacle::new("ok".into(), 3, 2, 4, 4, vec![-1; 6]).unwrap();
    assert_eq!((ok.width(), ok.height(), ok.data().len()), (3, 2, 6));
    // patch hangs over the map edge; only the overlap is merged
    let mut scene = SdfScene::new(map);
    scene.obstacles.push(ok);
    let composed = scene.compose();
    assert_eq!(composed.cell(5, 5), -1);
    assert_eq!(composed.cell(3, 3), scene.map.cell(3, 3));
}
