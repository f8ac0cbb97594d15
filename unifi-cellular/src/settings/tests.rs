// NOTE: Setting env vars in tests will clobber env vars in other tests, so each test
// uses its own env prefix.

use std::{path::Path, time::Duration};

use clap::Parser as _;
use figment::Jail;
use secrecy::{ExposeSecret as _, SecretString};

use crate::{args::Args, settings::Settings};

const CFG_FILE_CONTENTS: &str = r#"
    host = "unifi.config"
    api_key = "config-key"
    site = "config-site"
    verify_ssl = true
    scan_interval = 60
    request_timeout = 5
    unavailable_after = 7
    state_file = "/config/state.json"
"#;

fn make_args(args: &str) -> Result<Args, clap::Error> {
    Args::try_parse_from(str::split_ascii_whitespace(args))
}

#[test]
fn test_defaults_apply_when_only_api_key_is_given() {
    Jail::expect_with(|jail| {
        jail.set_env("defaults_api_key", "env-key");
        let args = make_args("unifi-cellular run").unwrap();

        let settings =
            Settings::get(&args, Path::new("does-not-exist.toml"), "defaults_")?;

        assert_eq!(settings.host, "192.168.1.1");
        assert_eq!(settings.site, "default");
        assert!(!settings.verify_ssl);
        assert_eq!(settings.scan_interval, Duration::from_secs(30));
        assert_eq!(settings.request_timeout, Duration::from_secs(10));
        assert_eq!(settings.unavailable_after, 3);
        assert_eq!(settings.state_file, None);
        assert_eq!(settings.api_key.expose_secret(), "env-key");
        Ok(())
    });
}

#[test]
fn test_missing_api_key_is_an_error() {
    Jail::expect_with(|_jail| {
        let args = make_args("unifi-cellular run").unwrap();

        let result =
            Settings::get(&args, Path::new("does-not-exist.toml"), "missing_key_");

        assert!(result.is_err());
        Ok(())
    });
}

#[test]
fn test_config_file_is_read() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", CFG_FILE_CONTENTS)?;
        let args = make_args("unifi-cellular run").unwrap();

        let settings = Settings::get(&args, "config.toml", "config_file_")?;

        assert_eq!(settings.host, "unifi.config");
        assert_eq!(settings.api_key.expose_secret(), "config-key");
        assert_eq!(settings.site, "config-site");
        assert!(settings.verify_ssl);
        assert_eq!(settings.scan_interval, Duration::from_secs(60));
        assert_eq!(settings.request_timeout, Duration::from_secs(5));
        assert_eq!(settings.unavailable_after, 7);
        assert_eq!(
            settings.state_file.as_deref(),
            Some(Path::new("/config/state.json"))
        );
        Ok(())
    });
}

#[test]
fn test_env_vars_override_config_file() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", CFG_FILE_CONTENTS)?;
        jail.set_env("env_override_host", "unifi.env");
        jail.set_env("env_override_site", "env-site");
        jail.set_env("env_override_scan_interval", "15");
        let args = make_args("unifi-cellular run").unwrap();

        let settings = Settings::get(&args, "config.toml", "env_override_")?;

        assert_eq!(settings.host, "unifi.env");
        assert_eq!(settings.site, "env-site");
        assert_eq!(settings.scan_interval, Duration::from_secs(15));
        assert_eq!(settings.api_key.expose_secret(), "config-key");
        Ok(())
    });
}

#[test]
fn test_cli_args_override_config_file_and_env_vars() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", CFG_FILE_CONTENTS)?;
        jail.set_env("cli_override_host", "unifi.env");
        jail.set_env("cli_override_verify_ssl", "true");
        let args = make_args(
            "unifi-cellular --host unifi.args --verify-ssl false --scan-interval 45 \
             --state-file /args/state.json snapshot --raw",
        )
        .unwrap();

        let settings = Settings::get(&args, "config.toml", "cli_override_")?;

        assert_eq!(settings.host, "unifi.args");
        assert!(!settings.verify_ssl);
        assert_eq!(settings.scan_interval, Duration::from_secs(45));
        assert_eq!(
            settings.state_file.as_deref(),
            Some(Path::new("/args/state.json"))
        );
        assert_eq!(settings.site, "config-site");
        Ok(())
    });
}

#[test]
fn test_zero_durations_are_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", CFG_FILE_CONTENTS)?;
        let args = make_args("unifi-cellular --scan-interval 0 run").unwrap();

        let err = Settings::get(&args, "config.toml", "zero_cli_").unwrap_err();
        assert!(err.to_string().contains("scan_interval"), "{err}");

        jail.set_env("zero_env_request_timeout", "0");
        let args = make_args("unifi-cellular run").unwrap();

        let err = Settings::get(&args, "config.toml", "zero_env_").unwrap_err();
        assert!(err.to_string().contains("request_timeout"), "{err}");
        Ok(())
    });
}

#[test]
fn test_zero_scan_interval_in_config_file_is_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "api_key = \"k\"\nscan_interval = 0\n")?;
        let args = make_args("unifi-cellular run").unwrap();

        let result = Settings::get(&args, "config.toml", "zero_file_");

        assert!(result.is_err());
        Ok(())
    });
}

#[test]
fn test_built_settings_are_validated_too() {
    let zero = Settings::builder()
        .api_key(SecretString::new("k".into()))
        .scan_interval(Duration::ZERO)
        .build();

    assert!(zero.validate().is_err());
    assert!(
        Settings::builder()
            .api_key(SecretString::new("k".into()))
            .build()
            .validate()
            .is_ok()
    );
}
