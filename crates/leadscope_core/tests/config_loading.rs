//! Layered config loading, sandboxed with `figment::Jail`.

use figment::Jail;
use leadscope_core::config::CONFIG_FILE_NAME;
use leadscope_core::{ConfigError, CoreConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[test]
fn defaults_apply_without_file_or_env() {
    Jail::expect_with(|_jail| {
        let config: CoreConfig = CoreConfig::figment(Path::new(CONFIG_FILE_NAME)).extract()?;
        assert!(config.database.path.is_none());
        assert_eq!(config.database.busy_timeout(), Duration::from_millis(5_000));
        assert_eq!(config.invite.sender, "admin@test.com");
        assert!(config.logging.dir.is_none());
        Ok(())
    });
}

#[test]
fn toml_file_overrides_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            CONFIG_FILE_NAME,
            r#"
[database]
path = "crm.sqlite3"
busy_timeout_ms = 250

[invite]
subject = "Welcome aboard"
"#,
        )?;

        let config: CoreConfig = CoreConfig::figment(Path::new(CONFIG_FILE_NAME)).extract()?;
        assert_eq!(config.database.path, Some(PathBuf::from("crm.sqlite3")));
        assert_eq!(config.database.busy_timeout_ms, 250);
        assert_eq!(config.invite.subject, "Welcome aboard");
        assert_eq!(config.invite.sender, "admin@test.com");
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            CONFIG_FILE_NAME,
            r#"
[database]
path = "from-file.sqlite3"
"#,
        )?;
        jail.set_env("LEADSCOPE_DATABASE__PATH", "from-env.sqlite3");
        jail.set_env("LEADSCOPE_INVITE__SENDER", "crm@agency.test");
        jail.set_env("LEADSCOPE_LOGGING__LEVEL", "debug");

        let config: CoreConfig = CoreConfig::figment(Path::new(CONFIG_FILE_NAME)).extract()?;
        assert_eq!(config.database.path, Some(PathBuf::from("from-env.sqlite3")));
        assert_eq!(config.invite.sender, "crm@agency.test");
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        Ok(())
    });
}

#[test]
fn load_rejects_invalid_sender() {
    Jail::expect_with(|jail| {
        jail.set_env("LEADSCOPE_INVITE__SENDER", "not-an-address");

        let result = CoreConfig::load();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "invite.sender"
        ));
        Ok(())
    });
}

#[test]
fn load_from_explicit_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "custom.toml",
            r#"
[logging]
level = "warn"
"#,
        )?;

        let config = CoreConfig::load_from("custom.toml").map_err(|err| err.to_string())?;
        assert_eq!(config.logging.level.as_deref(), Some("warn"));
        Ok(())
    });
}

#[test]
fn malformed_toml_surfaces_figment_error() {
    Jail::expect_with(|jail| {
        jail.create_file(CONFIG_FILE_NAME, "[database\npath = ")?;

        assert!(matches!(CoreConfig::load(), Err(ConfigError::Figment(_))));
        Ok(())
    });
}
