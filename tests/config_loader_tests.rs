use busline::config::ConfigLoader;
use std::{
    env, fs,
    sync::{Mutex, MutexGuard, OnceLock},
};
use tempfile::TempDir;

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn env_guard() -> MutexGuard<'static, ()> {
    env_lock()
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
}

fn clear_env() {
    unsafe {
        env::remove_var("BUSLINE_PROFILE");
        env::remove_var("BUSLINE_API_BIND_ADDR");
        env::remove_var("BUSLINE_LOG_LEVEL");
        env::remove_var("BUSLINE_JWT_SECRET");
        env::remove_var("BUSLINE_DB_MAX_CONNECTIONS");
        env::remove_var("BUSLINE_DB_RECYCLE_SECONDS");
    }
}

fn write_env_file(dir: &TempDir, name: &str, contents: &str) {
    let path = dir.path().join(name);
    fs::write(path, contents).unwrap();
}

#[test]
fn loads_defaults_when_no_env_present() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    let loader = ConfigLoader::with_base_dir(temp_dir.path().to_path_buf());
    let cfg = loader.load().expect("config loads with defaults");

    assert_eq!(cfg.profile, "local");
    assert_eq!(cfg.api_bind_addr, "0.0.0.0:8080");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.db_recycle_seconds, 280);
    assert!(cfg.db_test_before_acquire);
    cfg.bind_addr().expect("default bind addr parses");
    cfg.validate().expect("defaults validate");
    clear_env();
}

#[test]
fn layered_env_files_apply_in_order() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "BUSLINE_API_BIND_ADDR=127.0.0.1:3000\n");
    write_env_file(
        &temp_dir,
        ".env.local",
        "BUSLINE_PROFILE=test\nBUSLINE_API_BIND_ADDR=127.0.0.1:4000\n",
    );
    write_env_file(
        &temp_dir,
        ".env.test",
        "BUSLINE_API_BIND_ADDR=192.168.0.10:5000\n",
    );
    write_env_file(
        &temp_dir,
        ".env.test.local",
        "BUSLINE_API_BIND_ADDR=10.0.0.5:6000\n",
    );

    let loader = ConfigLoader::with_base_dir(temp_dir.path().to_path_buf());
    let cfg = loader.load().expect("layered config loads");

    assert_eq!(cfg.profile, "test");
    // The most specific profile file wins.
    assert_eq!(cfg.api_bind_addr, "10.0.0.5:6000");
    clear_env();
}

#[test]
fn process_env_overrides_files() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "BUSLINE_API_BIND_ADDR=127.0.0.1:3000\n");

    unsafe {
        env::set_var("BUSLINE_API_BIND_ADDR", "127.0.0.1:9999");
    }

    let loader = ConfigLoader::with_base_dir(temp_dir.path().to_path_buf());
    let cfg = loader.load().expect("config loads");

    assert_eq!(cfg.api_bind_addr, "127.0.0.1:9999");
    clear_env();
}

#[test]
fn non_busline_keys_are_ignored() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(
        &temp_dir,
        ".env",
        "DATABASE_URL=postgres://other/app\nBUSLINE_LOG_LEVEL=debug\n",
    );

    let loader = ConfigLoader::with_base_dir(temp_dir.path().to_path_buf());
    let cfg = loader.load().expect("config loads");

    assert_eq!(cfg.log_level, "debug");
    // The unprefixed DATABASE_URL must not leak into the config.
    assert_ne!(cfg.database_url, "postgres://other/app");
    clear_env();
}

#[test]
fn numeric_pool_settings_parse() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(
        &temp_dir,
        ".env",
        "BUSLINE_DB_MAX_CONNECTIONS=200\nBUSLINE_DB_RECYCLE_SECONDS=600\n",
    );

    let loader = ConfigLoader::with_base_dir(temp_dir.path().to_path_buf());
    let cfg = loader.load().expect("config loads");

    assert_eq!(cfg.db_max_connections, 200);
    assert_eq!(cfg.db_recycle_seconds, 600);
    clear_env();
}
