use std::path::PathBuf;
use std::sync::Mutex;

use letterfreq::config::Config;
use letterfreq::engine::FailurePolicy;

// Environment is process-global; serialize tests that touch it.
static ENV_LOCK: Mutex<()> = Mutex::new(());

const VARS: [&str; 5] = [
    "LETTERFREQ_OUTPUT_DIR",
    "LETTERFREQ_STRICT",
    "LETTERFREQ_WORKER",
    "OTEL_ENDPOINT",
    "LOG_LEVEL",
];

fn clear_env() {
    for var in VARS {
        unsafe {
            std::env::remove_var(var);
        }
    }
}

#[test]
fn defaults_are_lenient_and_local() {
    let config = Config::default();
    assert_eq!(config.output_dir, PathBuf::from("."));
    assert!(!config.strict);
    assert_eq!(config.policy(), FailurePolicy::Isolate);
    assert_eq!(config.log_level, "info");
}

#[test]
fn toml_overrides_defaults() {
    let config = Config::from_toml(
        r#"
        output_dir = "/tmp/hist"
        strict = true
        "#,
    )
    .unwrap();
    assert_eq!(config.output_dir, PathBuf::from("/tmp/hist"));
    assert_eq!(config.policy(), FailurePolicy::Strict);
    assert_eq!(config.log_level, "info");
    assert!(config.worker.is_none());
}

#[test]
fn toml_rejects_unknown_keys() {
    assert!(Config::from_toml("outptu_dir = \"x\"").is_err());
}

#[test]
fn from_file_reports_bad_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("letterfreq.toml");
    std::fs::write(&path, "strict = \"maybe\"").unwrap();
    assert!(Config::from_file(&path).is_err());
}

#[test]
fn env_overrides_file() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("letterfreq.toml");
    std::fs::write(&path, "output_dir = \"from-file\"\nlog_level = \"debug\"\n").unwrap();

    unsafe {
        std::env::set_var("LETTERFREQ_OUTPUT_DIR", "from-env");
        std::env::set_var("LETTERFREQ_STRICT", "yes");
    }

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.output_dir, PathBuf::from("from-env"));
    assert!(config.strict);
    assert_eq!(config.log_level, "debug");

    clear_env();
}

#[test]
fn env_rejects_non_boolean_strict() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    unsafe {
        std::env::set_var("LETTERFREQ_STRICT", "sometimes");
    }
    assert!(Config::from_env().is_err());

    clear_env();
}

#[test]
fn from_env_without_vars_is_default() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    assert_eq!(Config::from_env().unwrap(), Config::default());
}
