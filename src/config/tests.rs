use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn defaults_are_sensible() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.port(), DEFAULT_PORT);
    assert_eq!(settings.content.recent_posts, DEFAULT_RECENT_POSTS);
    assert_eq!(settings.content.listing_limit, DEFAULT_LISTING_LIMIT);
    assert!(settings.content.graphql_endpoint.is_none());
    assert!(settings.cache.enabled);
    assert!(settings.hooks.secret.is_none());
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn graphql_endpoint_must_be_a_url() {
    let mut raw = RawSettings::default();
    raw.content.graphql_endpoint = Some("not a url".to_string());

    let err = Settings::from_raw(raw).expect_err("invalid endpoint");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "content.graphql_endpoint",
            ..
        }
    ));
}

#[test]
fn blank_graphql_endpoint_is_treated_as_unset() {
    let mut raw = RawSettings::default();
    raw.content.graphql_endpoint = Some("   ".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.content.graphql_endpoint.is_none());
}

#[test]
fn zero_port_is_rejected() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(0);

    let err = Settings::from_raw(raw).expect_err("invalid port");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "server.port",
            ..
        }
    ));
}

#[test]
fn zero_request_timeout_is_rejected() {
    let mut raw = RawSettings::default();
    raw.content.request_timeout_seconds = Some(0);

    let err = Settings::from_raw(raw).expect_err("invalid timeout");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "content.request_timeout_seconds",
            ..
        }
    ));
}

#[test]
fn blank_hook_secret_is_dropped() {
    let mut raw = RawSettings::default();
    raw.hooks.secret = Some("  ".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.hooks.secret.is_none());
}

#[test]
fn cache_toggles_apply_from_cli() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        cache_enabled: Some(false),
        cache_ttl_seconds: Some(60),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(!settings.cache.enabled);
    assert_eq!(settings.cache.ttl_seconds, 60);
}

#[test]
fn check_command_applies_content_overrides() {
    let mut raw = RawSettings::default();
    let overrides = ContentOverrides {
        graphql_endpoint: Some("https://cms.example.com/graphql".to_string()),
        request_timeout_seconds: Some(5),
    };

    raw.apply_content_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(
        settings
            .content
            .graphql_endpoint
            .expect("endpoint set")
            .as_str(),
        "https://cms.example.com/graphql"
    );
    assert_eq!(settings.content.request_timeout, Duration::from_secs(5));
}
