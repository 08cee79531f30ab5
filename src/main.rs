use std::fs;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use clap::Parser;
use rand::Rng;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sdfnav::nav::config::{load_nav_config, AvoidanceMode, NavConfig, DEFAULT_CONFIG_PATH};
use sdfnav::nav::context::NavContext;
use sdfnav::nav::sdf::shapes::{box_sdf, circle_sdf, stamp_obstacle, triangle_sdf};
use sdfnav::nav::sdf::{load_scene, save_scene, SdfMap, SdfResult, SdfScene};
use sdfnav::nav::simulation::{
    AgentArrived, NavAgent, NavPosition, NavStats, NavTick, PathFailed, PathRequest,
};
use sdfnav::nav::NavigationPlugin;

const AGENT_RADIUS: f32 = 0.5;
const AGENT_SPEED: f32 = 4.0;

fn setup_file_logging() -> Option<String> {
    let log_dir = PathBuf::from("logs");
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Failed to create logs directory: {}", e);
        return None;
    }

    // Keep only the most recent runs
    cleanup_old_logs(&log_dir, 25);

    let now = chrono::Local::now();
    let log_filename = format!("sdfnav_{}.log", now.format("%Y%m%d_%H%M%S"));
    let log_path = log_dir.join(&log_filename).to_string_lossy().to_string();

    let file_appender = RollingFileAppender::new(Rotation::NEVER, &log_dir, &log_filename);
    let file_layer = fmt::layer().with_writer(file_appender).with_ansi(false);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sdfnav=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Some(log_path)
}

fn cleanup_old_logs(log_dir: &Path, keep_count: usize) {
    let Ok(entries) = fs::read_dir(log_dir) else {
        return;
    };
    let mut log_files: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .file_name()
                .and_then(|n| n.to_str())
                .map(|s| s.starts_with("sdfnav") && s.ends_with(".log"))
                .unwrap_or(false)
        })
        .collect();

    // Oldest first
    log_files.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

    if log_files.len() > keep_count {
        for file in log_files.iter().take(log_files.len() - keep_count) {
            let _ = fs::remove_file(file.path());
        }
    }
}

// ============================================================================
// Command Line
// ============================================================================

/// Headless crowd navigation run over an SDF scene.
#[derive(Parser, Debug)]
#[command(name = "sdfnav", version)]
struct DemoArgs {
    /// Scene file to load (`.z` for compressed). Builds a demo arena when omitted.
    scene: Option<PathBuf>,

    /// Write the scene to this path before running
    #[arg(long)]
    save: Option<PathBuf>,

    /// Navigation config (RON)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Number of agents to spawn
    #[arg(long, default_value_t = 48)]
    agents: usize,

    /// Fixed ticks to simulate
    #[arg(long, default_value_t = 900)]
    ticks: usize,

    /// Use ORCA avoidance instead of direction blocking
    #[arg(long)]
    orca: bool,
}

// ============================================================================
// Scene Setup
// ============================================================================

/// A walled 32x32 arena with a few solid shapes and a gate obstacle.
fn synthesize_arena() -> SdfResult<SdfScene> {
    let center = Vec2::splat(16.0);
    let map = SdfMap::from_fn(65, 65, 0.5, Vec2::ZERO, |p| {
        let walls = -box_sdf(p, center, Vec2::splat(15.0));
        let pillar = circle_sdf(p, Vec2::new(10.0, 20.0), 2.5);
        let block = box_sdf(p, Vec2::new(22.0, 10.0), Vec2::new(3.0, 1.5));
        let wedge = triangle_sdf(p, Vec2::new(18.0, 22.0), Vec2::new(24.0, 22.0), Vec2::new(21.0, 27.0));
        walls.min(pillar).min(block).min(wedge)
    })?;

    let gate = stamp_obstacle("gate", &map, 30, 8, 6, 16, |p| {
        box_sdf(p, Vec2::new(16.5, 8.0), Vec2::new(0.75, 3.5))
    })?;
    let mut scene = SdfScene::new(map);
    scene.obstacles.push(gate);
    Ok(scene)
}

fn load_map(args: &DemoArgs) -> Option<SdfMap> {
    let scene = match &args.scene {
        Some(path) => match load_scene(path) {
            Ok(scene) => {
                info!("[SDF] Loaded scene {:?} with {} obstacles", path, scene.obstacles.len());
                scene
            }
            Err(e) => {
                error!("[SDF] Failed to load {:?}: {}", path, e);
                return None;
            }
        },
        None => match synthesize_arena() {
            Ok(scene) => scene,
            Err(e) => {
                error!("[SDF] Failed to build the demo arena: {}", e);
                return None;
            }
        },
    };

    if let Some(path) = &args.save {
        match save_scene(path, &scene) {
            Ok(()) => info!("[SDF] Saved scene to {:?}", path),
            Err(e) => error!("[SDF] Failed to save scene to {:?}: {}", path, e),
        }
    }
    Some(scene.compose())
}

/// Random points with room for an agent, bounded number of attempts.
fn random_open_point(map: &SdfMap, rng: &mut impl Rng) -> Option<Vec2> {
    let min = map.origin();
    let max = min + Vec2::new(map.width() as f32, map.height() as f32) * map.grain();
    for _ in 0..200 {
        let p = Vec2::new(rng.random_range(min.x..max.x), rng.random_range(min.y..max.y));
        if map.sample(p) >= AGENT_RADIUS * 1.5 {
            return Some(p);
        }
    }
    None
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    let args = DemoArgs::parse();
    let log_file = setup_file_logging();
    if let Some(log_file) = &log_file {
        println!("sdfnav - logging to {}", log_file);
    }

    let mut config: NavConfig = load_nav_config(&args.config);
    if args.orca {
        config.avoidance = AvoidanceMode::Orca;
    }

    let Some(map) = load_map(&args) else {
        return;
    };
    info!(
        "[NAV] Map {}x{} grain {} origin {:?}, avoidance {:?}",
        map.width(),
        map.height(),
        map.grain(),
        map.origin(),
        config.avoidance
    );

    let mut ctx = NavContext::new(map, config.tolerances());
    if args.scene.is_none() {
        // ORCA only sees polygons; mirror the arena's solid block
        ctx.obstacles_mut().add_polygon(&[
            Vec2::new(19.0, 8.5),
            Vec2::new(25.0, 8.5),
            Vec2::new(25.0, 11.5),
            Vec2::new(19.0, 11.5),
        ]);
    }

    let mut rng = rand::rng();
    let mut starts = Vec::with_capacity(args.agents);
    let mut goals = Vec::with_capacity(args.agents);
    for _ in 0..args.agents {
        let (Some(start), Some(goal)) = (
            random_open_point(ctx.map(), &mut rng),
            random_open_point(ctx.map(), &mut rng),
        ) else {
            warn!("[DEMO] Could not place an agent, map too crowded");
            break;
        };
        starts.push(start);
        goals.push(goal);
    }

    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(NavigationPlugin {
        config: Some(config),
    });
    app.insert_resource(ctx);

    for (start, goal) in starts.iter().zip(&goals) {
        let entity = app
            .world_mut()
            .spawn((
                NavAgent {
                    radius: AGENT_RADIUS,
                    speed: AGENT_SPEED,
                },
                NavPosition(*start),
            ))
            .id();
        app.world_mut().write_message(PathRequest { entity, goal: *goal });
    }
    info!("[DEMO] Spawned {} agents, running {} ticks", starts.len(), args.ticks);

    let started = std::time::Instant::now();
    let mut positions = app.world_mut().query::<(&NavAgent, &NavPosition)>();
    let mut min_gap = f32::INFINITY;
    let mut moved_total = 0usize;
    for _ in 0..args.ticks {
        app.world_mut().run_schedule(FixedUpdate);
        moved_total += app.world().resource::<NavStats>().moved;

        let agents: Vec<(f32, Vec2)> = positions
            .iter(app.world())
            .map(|(agent, position)| (agent.radius, position.0))
            .collect();
        for (i, (ra, pa)) in agents.iter().enumerate() {
            for (rb, pb) in &agents[i + 1..] {
                min_gap = min_gap.min(pa.distance(*pb) - ra - rb);
            }
        }
    }

    let arrived = {
        let messages = app.world().resource::<Messages<AgentArrived>>();
        let mut cursor = messages.get_cursor();
        cursor.read(messages).count()
    };
    let failed = {
        let messages = app.world().resource::<Messages<PathFailed>>();
        let mut cursor = messages.get_cursor();
        cursor.read(messages).count()
    };

    info!(
        "[DEMO] {} ticks in {:?} | agents: {} | arrived: {} | failed: {} | agent moves: {} | min gap: {:.4}",
        app.world().resource::<NavTick>().0,
        started.elapsed(),
        starts.len(),
        arrived,
        failed,
        moved_total,
        min_gap
    );
    if min_gap < -1e-3 {
        warn!("[DEMO] Agents overlapped by {:.4}", -min_gap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        DemoArgs::command().debug_assert();
    }

    #[test]
    fn cli_defaults_and_flags() {
        let args = DemoArgs::try_parse_from(["sdfnav"]).unwrap();
        assert_eq!(args.agents, 48);
        assert_eq!(args.ticks, 900);
        assert_eq!(args.config, DEFAULT_CONFIG_PATH);
        assert!(args.scene.is_none() && !args.orca);

        let args = DemoArgs::try_parse_from([
            "sdfnav", "arena.z", "--agents", "12", "--ticks", "30", "--orca", "--save", "out.z",
        ])
        .unwrap();
        assert_eq!(args.scene, Some(PathBuf::from("arena.z")));
        assert_eq!((args.agents, args.ticks), (12, 30));
        assert!(args.orca);
        assert_eq!(args.save, Some(PathBuf::from("out.z")));
    }

    #[test]
    fn cli_rejects_bad_input() {
        assert!(DemoArgs::try_parse_from(["sdfnav", "--ticks", "foo"]).is_err());
        assert!(DemoArgs::try_parse_from(["sdfnav", "--agents"]).is_err());
        assert!(DemoArgs::try_parse_from(["sdfnav", "--speed", "3"]).is_err());
    }
}
