use bevy::prelude::*;
use sdfnav::nav::config::{AvoidanceMode, NavConfig};
use sdfnav::nav::context::NavContext;
use sdfnav::nav::sdf::shapes::box_sdf;
use sdfnav::nav::sdf::{load_scene, save_scene, SdfMap, SdfScene};
use sdfnav::nav::simulation::{NavAgent, NavPath, NavPosition, PathRequest};
use sdfnav::nav::NavigationPlugin;

const RADIUS: f32 = 0.5;

fn nav_app(map: SdfMap, config: NavConfig) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(NavigationPlugin {
        config: Some(config.clone()),
    });
    app.insert_resource(NavContext::new(map, config.tolerances()));
    app
}

fn open_map(size: i32) -> SdfMap {
    let distances = vec![100.0; (size * size) as usize];
    SdfMap::from_distances(size, size, 1.0, Vec2::ZERO, &distances).unwrap()
}

/// 20x14 map with a wall at x = 9..11 from the bottom up to y = 9.
fn wall_with_gap_map() -> SdfMap {
    SdfMap::from_fn(20, 14, 1.0, Vec2::ZERO, |p| {
        box_sdf(p, Vec2::new(10.0, 4.0), Vec2::new(1.0, 5.0))
    })
    .unwrap()
}

fn spawn_with_goal(app: &mut App, start: Vec2, goal: Vec2) -> Entity {
    let entity = app
        .world_mut()
        .spawn((
            NavAgent {
                radius: RADIUS,
                speed: 4.0,
            },
            NavPosition(start),
        ))
        .id();
    app.world_mut().write_message(PathRequest { entity, goal });
    entity
}

fn positions(app: &mut App) -> Vec<Vec2> {
    let mut query = app.world_mut().query::<&NavPosition>();
    query.iter(app.world()).map(|p| p.0).collect()
}

fn min_gap(points: &[Vec2]) -> f32 {
    let mut gap = f32::INFINITY;
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            gap = gap.min(a.distance(*b) - 2.0 * RADIUS);
        }
    }
    gap
}

#[test]
fn test_agent_routes_through_gap_without_touching_wall() {
    let map = wall_with_gap_map();
    let mut app = nav_app(map.clone(), NavConfig::default());
    let goal = Vec2::new(17.0, 3.0);
    let agent = spawn_with_goal(&mut app, Vec2::new(3.0, 3.0), goal);

    let mut min_clearance = f32::INFINITY;
    let mut max_y: f32 = 0.0;
    for _ in 0..600 {
        app.world_mut().run_schedule(FixedUpdate);
        let p = app.world().get::<NavPosition>(agent).unwrap().0;
        min_clearance = min_clearance.min(map.sample(p));
        max_y = max_y.max(p.y);
    }

    let end = app.world().get::<NavPosition>(agent).unwrap().0;
    println!("end {:?} min clearance {} highest y {}", end, min_clearance, max_y);
    assert!(end.distance(goal) < 1e-3, "agent stopped at {:?}", end);
    assert!(app.world().get::<NavPath>(agent).unwrap().has_finished());
    // had to climb over the wall's top edge at y = 9
    assert!(max_y > 9.0);
    assert!(min_clearance >= RADIUS - 0.02, "entered the wall: {}", min_clearance);
}

#[test]
fn test_passing_agents_never_overlap() {
    for mode in [AvoidanceMode::DirectionBlocking, AvoidanceMode::Orca] {
        let config = NavConfig {
            avoidance: mode,
            ..Default::default()
        };
        let mut app = nav_app(open_map(16), config);
        let a_goal = Vec2::new(12.0, 8.0);
        let b_goal = Vec2::new(4.0, 8.3);
        let a = spawn_with_goal(&mut app, Vec2::new(4.0, 8.3), a_goal);
        let b = spawn_with_goal(&mut app, Vec2::new(12.0, 8.0), b_goal);

        let mut gap = f32::INFINITY;
        for _ in 0..600 {
            app.world_mut().run_schedule(FixedUpdate);
            gap = gap.min(min_gap(&positions(&mut app)));
        }

        let pa = app.world().get::<NavPosition>(a).unwrap().0;
        let pb = app.world().get::<NavPosition>(b).unwrap().0;
        println!("{:?}: a {:?} b {:?} min gap {}", mode, pa, pb, gap);
        assert!(gap >= -1e-3, "{:?} overlapped by {}", mode, -gap);
        assert!(pa.distance(a_goal) < 4.0, "{:?}: a made no progress", mode);
        assert!(pb.distance(b_goal) < 4.0, "{:?}: b made no progress", mode);
    }
}

#[test]
fn test_crowd_swap_keeps_agents_apart() {
    let mut app = nav_app(open_map(32), NavConfig::default());
    let center = Vec2::splat(16.0);
    let count = 8;
    let mut goals = Vec::new();
    let mut agents = Vec::new();
    for i in 0..count {
        let angle = i as f32 / count as f32 * std::f32::consts::TAU + 0.05;
        let offset = Vec2::new(angle.cos(), angle.sin()) * 6.0;
        agents.push(spawn_with_goal(&mut app, center + offset, center - offset));
        goals.push(center - offset);
    }

    let mut gap = f32::INFINITY;
    for _ in 0..450 {
        app.world_mut().run_schedule(FixedUpdate);
        gap = gap.min(min_gap(&positions(&mut app)));
    }

    let total_left: f32 = agents
        .iter()
        .zip(&goals)
        .map(|(e, g)| app.world().get::<NavPosition>(*e).unwrap().0.distance(*g))
        .sum();
    println!("min gap {} remaining distance {}", gap, total_left);
    assert!(gap >= -1e-3, "agents overlapped by {}", -gap);
    // everyone started 12 away from their goal
    assert!(total_left < count as f32 * 12.0 * 0.75);
}

#[test]
fn test_saved_scene_drives_navigation() {
    let map = wall_with_gap_map();
    let scene = SdfScene::new(map);
    let path = std::env::temp_dir().join(format!("sdfnav_scene_{}.z", std::process::id()));
    save_scene(&path, &scene).unwrap();
    let loaded = load_scene(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(loaded, scene);

    let mut app = nav_app(loaded.compose(), NavConfig::default());
    let goal = Vec2::new(17.0, 12.0);
    let agent = spawn_with_goal(&mut app, Vec2::new(3.0, 12.0), goal);
    for _ in 0..300 {
        app.world_mut().run_schedule(FixedUpdate);
    }
    let end = app.world().get::<NavPosition>(agent).unwrap().0;
    println!("end {:?}", end);
    assert!(end.distance(goal) < 1e-3);
}
