//! Configuration loading tests

use std::env;

use studienplaner::config::Config;

// Env vars are process-global, so the default/profile/override cases run in
// one test instead of racing each other.
#[test]
fn test_config_resolves_database_url() {
    unsafe {
        env::remove_var("DATABASE_URL");
        env::remove_var("PROFILE");
    }
    let cfg = Config::from_env();
    assert_eq!(cfg.profile, "default");
    assert_eq!(cfg.database_url, "sqlite://studienplaner.db?mode=rwc");

    unsafe {
        env::set_var("PROFILE", "demo");
    }
    let cfg = Config::from_env();
    assert_eq!(cfg.profile, "demo");
    assert_eq!(cfg.database_url, "sqlite://studienplaner_demo.db?mode=rwc");

    unsafe {
        env::set_var("DATABASE_URL", "sqlite::memory:");
    }
    let cfg = Config::from_env();
    assert_eq!(cfg.database_url, "sqlite::memory:");

    unsafe {
        env::remove_var("DATABASE_URL");
        env::remove_var("PROFILE");
    }
}
