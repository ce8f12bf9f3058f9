use std::path::PathBuf;

use batch_ngin::config::EngineConfig;

#[test]
fn empty_file_gives_the_defaults() {
    let config = EngineConfig::from_toml_str("").unwrap();

    assert_eq!(config, EngineConfig::default());
    assert_eq!((config.width, config.height), (800, 600));
    assert!(!config.log_timing);
    assert_eq!(config.shader, None);
}

#[test]
fn given_fields_override_the_defaults() {
    let config = EngineConfig::from_toml_str(
        r#"
        title = "demo"
        width = 1280
        log_timing = true
        zfar = 250.0
        clear_colour = [0.25, 0.5, 0.75, 1.0]
        shader = "custom.shader"
        "#,
    )
    .unwrap();

    assert_eq!(config.title, "demo");
    assert_eq!(config.width, 1280);
    assert_eq!(config.height, 600);
    assert!(config.log_timing);
    assert_eq!(config.zfar, 250.0);
    assert_eq!(config.shader, Some(PathBuf::from("custom.shader")));
    let colour = config.clear_colour();
    assert_eq!((colour.r, colour.g, colour.b, colour.a), (0.25, 0.5, 0.75, 1.0));
}

#[test]
fn wrong_types_are_rejected() {
    assert!(EngineConfig::from_toml_str("width = \"wide\"").is_err());
    assert!(EngineConfig::from_toml_str("clear_colour = [1.0]").is_err());
}

#[test]
fn missing_file_falls_back_to_the_defaults() {
    let config = EngineConfig::load("definitely/not/here/engine.toml").unwrap();
    assert_eq!(config, EngineConfig::default());
}

#[test]
fn config_file_is_read_from_disk() {
    let path = std::env::temp_dir().join(format!("batch-ngin-{}.toml", std::process::id()));
    std::fs::write(&path, "vsync = false\nheight = 480\n").unwrap();

    let config = EngineConfig::load(&path);
    std::fs::remove_file(&path).unwrap();

    let config = config.unwrap();
    assert!(!config.vsync);
    assert_eq!(config.height, 480);
}
