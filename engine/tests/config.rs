use std::path::Path;

use duel_engine::content::{builtin_presets, preset};
use duel_engine::DuelConfig;

#[test]
fn defaults_match_the_classic_pacing() {
    let cfg = DuelConfig::default();
    assert!(cfg.timed);
    assert_eq!(cfg.round_time_ms, 3000);
    assert_eq!(cfg.tick_ms, 100);
    assert_eq!(cfg.reveal_ms, 1000);
    assert_eq!(cfg.cooldown_ms, 2000);
    assert!(cfg.auto_restart);
    assert_eq!(cfg.seed, None);
    assert_eq!(preset("classic").unwrap(), cfg);
}

#[test]
fn every_builtin_preset_parses() {
    for name in builtin_presets().keys() {
        let cfg = preset(name).unwrap_or_else(|e| panic!("{name}: {e:#}"));
        assert!(cfg.round_time_ms > 0);
    }
    assert!(!preset("practice").unwrap().timed);
    assert_eq!(preset("BLITZ").unwrap().round_time_ms, 1500);
}

#[test]
fn unknown_preset_is_an_error() {
    let err = preset("marathon").unwrap_err();
    assert!(err.to_string().contains("marathon"));
}

#[test]
fn partial_json_falls_back_to_defaults() {
    let cfg = DuelConfig::from_json_str(r#"{ "timed": false, "seed": 7 }"#).unwrap();
    assert!(!cfg.timed);
    assert_eq!(cfg.seed, Some(7));
    assert_eq!(cfg.round_time_ms, 3000);
}

#[test]
fn extension_picks_the_format() {
    let yaml = "round_time_ms: 2500\n";
    let cfg = DuelConfig::from_str_for_path(Path::new("duel.yml"), yaml).unwrap();
    assert_eq!(cfg.round_time_ms, 2500);

    let json = r#"{"round_time_ms": 1200}"#;
    let cfg = DuelConfig::from_str_for_path(Path::new("duel.json"), json).unwrap();
    assert_eq!(cfg.round_time_ms, 1200);
}

#[test]
fn invalid_values_are_rejected() {
    assert!(DuelConfig::from_json_str(r#"{"round_time_ms": 0}"#).is_err());
    assert!(DuelConfig::from_yaml_str("tick_ms: 0\n").is_err());
    assert!(DuelConfig::from_json_str("not json").is_err());
}

#[test]
fn tick_longer_than_the_countdown_is_rejected() {
    let err = DuelConfig::from_yaml_str("round_time_ms: 500\ntick_ms: 600\n").unwrap_err();
    assert!(format!("{err:#}").contains("must not exceed round_time_ms"));

    let edge = DuelConfig::from_yaml_str("round_time_ms: 500\ntick_ms: 500\n").unwrap();
    assert_eq!(edge.tick_ms, edge.round_time_ms);
}

#[test]
fn load_reads_from_disk() {
    let path = std::env::temp_dir().join(format!("duel-config-{}.yaml", std::process::id()));
    std::fs::write(&path, "timed: false\ncooldown_ms: 10\n").unwrap();
    let cfg = DuelConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert!(!cfg.timed);
    assert_eq!(cfg.cooldown_ms, 10);

    let missing = DuelConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
    assert!(format!("{missing:#}").contains("failed to read duel config"));
}
