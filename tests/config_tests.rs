use std::env;

use pretty_assertions::assert_eq;
use serial_test::serial;

use tempo_be::config::Config;

mod common;

const CONFIG_VARS: &[&str] = &[
    "DATABASE_URL",
    "JWT_SECRET",
    "JWT_EXPIRATION_DAYS",
    "HOST",
    "PORT",
    "ENVIRONMENT",
    "BASE_URL",
    "JOBS_ENABLED",
    "OVERTIME_CHECK_INTERVAL_SECS",
    "AUTO_STOP_INTERVAL_SECS",
    "TIMESHEET_INTERVAL_SECS",
    "DAILY_SUMMARY_INTERVAL_SECS",
];

fn snapshot_env() -> Vec<(&'static str, Option<String>)> {
    CONFIG_VARS
        .iter()
        .map(|key| (*key, env::var(key).ok()))
        .collect()
}

fn restore_env(saved: Vec<(&'static str, Option<String>)>) {
    for (key, value) in saved {
        match value {
            Some(value) => unsafe { env::set_var(key, value) },
            None => unsafe { env::remove_var(key) },
        }
    }
}

#[test]
#[serial]
fn config_defaults_apply_when_env_is_empty() {
    common::setup_test_env();
    let saved = snapshot_env();

    for key in CONFIG_VARS {
        unsafe { env::remove_var(key) };
    }

    let config = Config::from_env_only().unwrap();

    assert_eq!(config.database_url, "postgres://@localhost:5432/tempo");
    assert_eq!(config.jwt_expiration_days, 30);
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 8080);
    assert_eq!(config.environment, "development");
    assert!(config.jobs_enabled);
    assert_eq!(config.overtime_check_interval_secs, 3600);
    assert_eq!(config.auto_stop_interval_secs, 900);
    assert!(config.is_development());
    assert!(!config.is_production());

    restore_env(saved);
}

#[test]
#[serial]
fn config_reads_custom_values() {
    common::setup_test_env();
    let saved = snapshot_env();

    unsafe {
        env::set_var("DATABASE_URL", "postgres://db.internal:5432/tempo_prod");
        env::set_var("JWT_SECRET", "custom-secret");
        env::set_var("JWT_EXPIRATION_DAYS", "7");
        env::set_var("HOST", "0.0.0.0");
        env::set_var("PORT", "9000");
        env::set_var("ENVIRONMENT", "production");
        env::set_var("JOBS_ENABLED", "false");
        env::set_var("OVERTIME_CHECK_INTERVAL_SECS", "120");
    }

    let config = Config::from_env_only().unwrap();

    assert_eq!(config.database_url, "postgres://db.internal:5432/tempo_prod");
    assert_eq!(config.jwt_secret, "custom-secret");
    assert_eq!(config.jwt_expiration_days, 7);
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 9000);
    assert!(config.is_production());
    assert!(!config.jobs_enabled);
    assert_eq!(config.overtime_check_interval_secs, 120);
    assert_eq!(config.server_address(), "0.0.0.0:9000");

    restore_env(saved);
}

#[test]
#[serial]
fn config_falls_back_on_unparseable_values() {
    common::setup_test_env();
    let saved = snapshot_env();

    unsafe {
        env::set_var("PORT", "not-a-port");
        env::set_var("JWT_EXPIRATION_DAYS", "soon");
    }

    let config = Config::from_env_only().unwrap();

    assert_eq!(config.port, 8080);
    assert_eq!(config.jwt_expiration_days, 30);

    restore_env(saved);
}
