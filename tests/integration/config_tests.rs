use clap::Parser;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use refdup::cli::Cli;
use refdup::config::Config;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();
    assert_eq!(config.io_threads, 4);
    assert_eq!(config.min_size, None);
    assert!(!config.follow_symlinks);
    assert!(config.progress);
}

#[test]
fn test_config_load_from_env() {
    std::env::set_var("REFDUP_IO_THREADS", "16");

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("REFDUP_"))
        .extract()
        .unwrap();
    assert_eq!(config.io_threads, 16);

    std::env::remove_var("REFDUP_IO_THREADS");
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
io_threads = 8
min_size = 1024
follow_symlinks = true
delete = ['\(1\)', 'bak$']
keep = ['^/srv/originals/']
progress = false
"#,
    )
    .unwrap();

    let config = Config::load(Some(&config_path)).unwrap();

    assert_eq!(config.min_size, Some(1024));
    assert!(config.follow_symlinks);
    assert_eq!(config.delete, vec![r"\(1\)", "bak$"]);
    assert_eq!(config.keep, vec!["^/srv/originals/"]);
    assert!(!config.progress);
}

#[test]
fn test_config_file_then_cli() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "min_size = 10\ndelete = ['file$']\n").unwrap();

    let cli = Cli::try_parse_from([
        "refdup",
        "--config",
        config_path.to_str().unwrap(),
        "--min-size",
        "20",
        "--delete=cli$",
        "/data",
    ])
    .unwrap();

    let mut config = Config::load(cli.config.as_deref()).unwrap();
    config.apply_cli(&cli);

    assert_eq!(config.min_size, Some(20));
    assert_eq!(config.delete, vec!["file$", "cli$"]);
}

#[test]
fn test_config_invalid_toml_is_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "min_size = [").unwrap();

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&config_path));
    let result: Result<Config, _> = figment.extract();
    assert!(result.is_err());
    assert!(Config::load(Some(&config_path)).is_err());
}
