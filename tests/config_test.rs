use geoid::io::{ConfigError, object_from_json, object_to_json};
use geoid::{CameraResolution, TrackerConfig};
use tempfile::TempDir;

#[test]
fn test_partial_config_keeps_defaults() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("tracker.json");
    std::fs::write(
        &path,
        r#"{
            "camera_index": 2,
            "target_resolution": { "width": 640, "height": 480 },
            "features": { "max_features": 100 }
        }"#,
    )
    .unwrap();

    let config: TrackerConfig = object_from_json(&path).unwrap();
    let defaults = TrackerConfig::default();
    assert_eq!(config.camera_index, 2);
    assert_eq!(config.target_resolution, Some(CameraResolution::new(640, 480)));
    assert_eq!(config.features.max_features, 100);
    assert_eq!(config.features.fast_threshold, defaults.features.fast_threshold);
    assert_eq!(config.max_capture_height, 720);
    assert_eq!(config.fps_window, 25);
    assert_eq!(config.match_threshold_factor, 2.0);
}

#[test]
fn test_dumped_config_loads_back() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("dump.json");
    let config = TrackerConfig {
        min_match_threshold: 3.0,
        ..Default::default()
    };
    object_to_json(&path, &config).unwrap();
    let loaded: TrackerConfig = object_from_json(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_config_errors() {
    let tmp = TempDir::new().unwrap();
    let missing = object_from_json::<TrackerConfig>(tmp.path().join("missing.json"));
    assert!(matches!(missing, Err(ConfigError::Io { .. })));

    let path = tmp.path().join("broken.json");
    std::fs::write(&path, "{ camera_index: ").unwrap();
    let broken = object_from_json::<TrackerConfig>(&path);
    assert!(matches!(broken, Err(ConfigError::Json { .. })));
}
