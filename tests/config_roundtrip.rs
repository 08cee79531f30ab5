use sdfnav::nav::config::{load_nav_config, AvoidanceMode, NavConfig};
use sdfnav::nav::pathfinding::Heuristic;

#[test]
fn test_shipped_config_matches_defaults() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/nav_config.ron");
    let config = load_nav_config(path);
    assert_eq!(config, NavConfig::default());
}

#[test]
fn test_config_survives_json() {
    let config = NavConfig {
        avoidance: AvoidanceMode::Orca,
        heuristic: Heuristic::Manhattan,
        max_neighbors: 6,
        space_to_neighbor: 0.1,
        ..Default::default()
    };
    let json = serde_json::to_string_pretty(&config).unwrap();
    println!("{}", json);
    let back: NavConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_missing_fields_take_defaults() {
    let back: NavConfig = serde_json::from_str(r#"{ "tick_rate": 60.0 }"#).unwrap();
    assert_eq!(back.tick_rate, 60.0);
    assert_eq!(back.max_neighbors, NavConfig::default().max_neighbors);
    assert!((back.tick_seconds() - 1.0 / 60.0).abs() < 1e-7);
}

#[test]
fn test_malformed_ron_falls_back_to_defaults() {
    let path = std::env::temp_dir().join(format!("sdfnav_bad_config_{}.ron", std::process::id()));
    std::fs::write(&path, "(tick_rate: \"fast\")").unwrap();
    let config = load_nav_config(path.to_str().unwrap());
    let _ = std::fs::remove_file(&path);
    assert_eq!(config, NavConfig::default());
}
