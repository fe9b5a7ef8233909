use std::io::Write;
use std::path::Path;

use clap::Parser;
use detrack_rs::cli::Args;
use detrack_rs::{ConfigError, ConfigFile, Detection, Overrides, Rect, RunConfig};

const SHIPPED: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config/presets.toml");

#[test]
fn test_shipped_presets_parse() {
    let file = ConfigFile::load(Path::new(SHIPPED)).unwrap();
    assert_eq!(file.presets.len(), 2);
    assert_eq!(file.confidence, Some(0.6));

    let config = RunConfig::resolve(file, Overrides::default(), "videos/sample_video2.mp4").unwrap();
    assert_eq!(config.classes.as_ref().unwrap().sorted(), vec![2, 3, 5, 7]);
    assert_eq!(config.roi.as_ref().unwrap().label(), Some("ROI - lane"));

    let filter = config.detection_filter();
    let car = Detection::new(Rect::from_tlbr(100.0, 100.0, 200.0, 200.0), 0.9, 2);
    let person = Detection::new(Rect::from_tlbr(100.0, 100.0, 200.0, 200.0), 0.9, 0);
    let edge_car = Detection::new(Rect::from_tlbr(10.0, 10.0, 60.0, 60.0), 0.9, 2);
    assert!(filter.admits(&car));
    assert!(!filter.admits(&person));
    assert!(!filter.admits(&edge_car));
}

#[test]
fn test_people_preset_has_no_roi() {
    let file = ConfigFile::load(Path::new(SHIPPED)).unwrap();
    let config = RunConfig::resolve(file, Overrides::default(), "sample_video.mp4").unwrap();
    assert_eq!(config.classes.unwrap().sorted(), vec![0]);
    assert!(config.roi.is_none());
}

#[test]
fn test_cli_flags_override_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
confidence = 0.3
skip_frames = 4
classes = [1, 2]

[[presets]]
name = "lane"
match = "sample_video2.mp4"
classes = [2, 3, 5, 7]
roi = {{ x_min = 50, y_min = 0, x_max = 1250, y_max = 700, label = "ROI - lane" }}
"#
    )
    .unwrap();

    let path = file.path().to_str().unwrap();
    let args = Args::try_parse_from([
        "detrack",
        "--video",
        "sample_video2.mp4",
        "--model",
        "yolo.onnx",
        "--config",
        path,
        "--skip-frames",
        "2",
        "--roi",
        "0,0,640,480",
    ])
    .unwrap();
    let config = args.resolve_config().unwrap();

    assert_eq!(config.confidence, 0.3);
    assert_eq!(config.skip_interval.get(), 2);
    // File-level classes and the explicit ROI both beat the preset.
    assert_eq!(config.classes.unwrap().sorted(), vec![1, 2]);
    let roi = config.roi.unwrap();
    assert_eq!(roi.x_max(), 640.0);
    assert_eq!(roi.label(), None);
}

#[test]
fn test_preset_fills_what_flags_leave_unset() {
    let args = Args::try_parse_from([
        "detrack",
        "--video",
        "sample_video2.mp4",
        "--model",
        "yolo.onnx",
        "--config",
        SHIPPED,
        "--filter-classes",
        "0",
    ])
    .unwrap();
    let config = args.resolve_config().unwrap();

    assert_eq!(config.classes.unwrap().sorted(), vec![0]);
    assert_eq!(config.roi.unwrap().label(), Some("ROI - lane"));
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = ConfigFile::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn test_malformed_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "confidence = \"high\"").unwrap();
    let err = ConfigFile::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains(&file.path().display().to_string()));
}
