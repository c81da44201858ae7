use std::io::Write;

use super::*;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp config");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn defaults_match_tracker_defaults() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.tracker.active_threshold_px, 200.0);
    assert_eq!(settings.tracker.trigger_distance_px, 500.0);
    assert_eq!(settings.tracker.header_offset_px, DEFAULT_HEADER_OFFSET_PX);
    assert_eq!(settings.logging.level, LevelFilter::WARN);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.tracker.trigger_distance_px = Some(800.0);
    raw.logging.level = Some("info".to_string());

    raw.apply_tracker_overrides(&TrackerOverrides {
        trigger_distance_px: Some(250.0),
        ..Default::default()
    });
    raw.apply_logging_overrides(&LoggingOverrides {
        log_level: Some("debug".to_string()),
        ..Default::default()
    });
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.tracker.trigger_distance_px, 250.0);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    raw.apply_logging_overrides(&LoggingOverrides {
        log_json: Some(true),
        ..Default::default()
    });

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn negative_distances_are_rejected() {
    let mut raw = RawSettings::default();
    raw.tracker.active_threshold_px = Some(-1.0);

    let err = Settings::from_raw(raw).expect_err("negative threshold");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "tracker.active_threshold_px",
            ..
        }
    ));
}

#[test]
fn non_finite_distances_are_rejected() {
    let mut raw = RawSettings::default();
    raw.tracker.header_offset_px = Some(f64::INFINITY);

    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn unparsable_log_level_is_rejected() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());

    let err = Settings::from_raw(raw).expect_err("bad level");
    assert!(err.to_string().contains("logging.level"));
}

#[test]
fn config_file_is_layered_under_cli_flags() {
    let file = write_config(
        "[tracker]\nactive_threshold_px = 120.0\ntrigger_distance_px = 900.0\n\n[logging]\nlevel = \"info\"\n",
    );
    let path = file.path().to_str().expect("utf-8 path");

    let args = CliArgs::parse_from([
        "lectio",
        "--config-file",
        path,
        "replay",
        "--trigger-distance-px",
        "300",
        "trace.json",
    ]);
    let settings = load(&args).expect("settings");

    assert_eq!(settings.tracker.active_threshold_px, 120.0);
    assert_eq!(settings.tracker.trigger_distance_px, 300.0);
    assert_eq!(settings.logging.level, LevelFilter::INFO);
}

#[test]
fn parse_index_arguments() {
    let args = CliArgs::parse_from([
        "lectio",
        "index",
        "--region",
        "hello-world",
        "--json",
        "post.html",
    ]);

    match args.command {
        Command::Index(index) => {
            assert_eq!(index.region, "hello-world");
            assert!(index.json);
            assert_eq!(
                index.source_format(),
                crate::application::indexer::SourceFormat::Html
            );
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn explicit_format_beats_extension() {
    let args = CliArgs::parse_from(["lectio", "index", "--format", "markdown", "post.html"]);

    match args.command {
        Command::Index(index) => assert_eq!(
            index.source_format(),
            crate::application::indexer::SourceFormat::Markdown
        ),
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn logging_flags_are_global() {
    let args = CliArgs::parse_from(["lectio", "ids", "post.html", "--log-level", "trace"]);

    assert_eq!(args.logging.log_level.as_deref(), Some("trace"));
    assert!(matches!(args.command, Command::Ids(_)));
}
