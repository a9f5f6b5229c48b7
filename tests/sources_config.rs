// tests/sources_config.rs
use admission_thresholds::config::{
    load_registry_default, load_registry_from, only_filter_from_env, ENV_SOURCES_CONFIG_PATH,
    ENV_SOURCES_ONLY,
};
use admission_thresholds::SourceId;
use std::{env, fs};

const ONE_SOURCE: &str = r#"
[[source]]
id = "TECH"
url = "https://example.test/sekem"
method = "get"

[source.query]
scope = "td"
"#;

#[test]
fn load_from_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("sources.toml");
    fs::write(&p, ONE_SOURCE).unwrap();

    let reg = load_registry_from(&p).unwrap();
    assert_eq!(reg.sources.len(), 1);
    assert_eq!(reg.sources[0].id, SourceId::Tech);
    assert_eq!(reg.sources[0].url, "https://example.test/sekem");
}

#[test]
fn invalid_file_names_path() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("broken.toml");
    fs::write(&p, "[[source]]\nid = \"NOPE\"\n").unwrap();
    let err = load_registry_from(&p).unwrap_err();
    assert!(format!("{err:#}").contains("broken.toml"));
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_disk_then_builtin() {
    // Isolate CWD so the repo's own config/ is not picked up
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    env::remove_var(ENV_SOURCES_CONFIG_PATH);

    // 1) Nothing on disk → built-in registry with all four sources
    let builtin = load_registry_default().unwrap();
    assert_eq!(builtin.sources.len(), 4);

    // 2) ./config/sources.toml wins over the built-in copy
    fs::create_dir_all(tmp.path().join("config")).unwrap();
    fs::write(tmp.path().join("config/sources.toml"), ONE_SOURCE).unwrap();
    let local = load_registry_default().unwrap();
    assert_eq!(local.sources.len(), 1);

    // 3) Env wins over disk; a dangling env path is an error
    env::set_var(ENV_SOURCES_CONFIG_PATH, tmp.path().join("missing.toml"));
    assert!(load_registry_default().is_err());
    env::remove_var(ENV_SOURCES_CONFIG_PATH);

    env::set_current_dir(&old).unwrap();
}

#[serial_test::serial]
#[test]
fn only_filter_reads_env() {
    env::remove_var(ENV_SOURCES_ONLY);
    assert_eq!(only_filter_from_env().unwrap(), None);

    env::set_var(ENV_SOURCES_ONLY, "bgu,TAU");
    assert_eq!(
        only_filter_from_env().unwrap(),
        Some(vec![SourceId::Bgu, SourceId::Tau])
    );

    env::set_var(ENV_SOURCES_ONLY, " , ");
    assert_eq!(only_filter_from_env().unwrap(), None);

    env::set_var(ENV_SOURCES_ONLY, "MIT");
    assert!(only_filter_from_env().is_err());
    env::remove_var(ENV_SOURCES_ONLY);
}
