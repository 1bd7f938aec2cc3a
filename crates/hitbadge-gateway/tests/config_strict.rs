#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use hitbadge_core::svg::Escaping;
use hitbadge_gateway::config::{self, FallbackPolicy, GatewayConfig, StoreBackend};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
store:
  backend: redis
  urii: "redis://localhost:6379" # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.gateway.listen, "0.0.0.0:5000");
    assert_eq!(cfg.store.backend, StoreBackend::Redis);
    assert_eq!(cfg.store.uri, "redis://localhost:6379");
    assert_eq!(cfg.store.connect_timeout_ms, 5000);
    assert_eq!(cfg.store.max_retries, 3);
    assert_eq!(cfg.badge.keep_max_age_secs, 60);
    assert_eq!(cfg.badge.fallback, FallbackPolicy::Random);
    assert_eq!(cfg.badge.escape, Escaping::Xml);
    assert!(!cfg.badge.degraded_header);
}

#[test]
fn full_config() {
    let ok = r#"
version: 1
gateway:
  listen: "127.0.0.1:3001"
  port_fallback_attempts: 2
store:
  backend: memory
badge:
  keep_max_age_secs: 30
  fallback: zero
  degraded_header: true
  escape: raw
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.gateway.port_fallback_attempts, 2);
    assert_eq!(cfg.store.backend, StoreBackend::Memory);
    assert_eq!(cfg.badge.fallback, FallbackPolicy::Zero);
    assert_eq!(cfg.badge.escape, Escaping::Raw);
    assert!(cfg.badge.degraded_header);
}

#[test]
fn unsupported_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn out_of_range_timeout_rejected() {
    let bad = "version: 1\nstore:\n  response_timeout_ms: 0\n";
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn env_overrides_port_and_redis() {
    let mut cfg = GatewayConfig::default();
    config::apply_env(&mut cfg, |k| match k {
        "PORT" => Some("3001".into()),
        "REDIS_HOST" => Some("cache".into()),
        _ => None,
    })
    .unwrap();
    assert_eq!(cfg.gateway.listen, "0.0.0.0:3001");
    assert_eq!(cfg.store.uri, "redis://cache:6379");
}

#[test]
fn redis_uri_wins_over_host() {
    let mut cfg = GatewayConfig::default();
    config::apply_env(&mut cfg, |k| match k {
        "REDIS_URI" => Some("redis://10.0.0.1:6380".into()),
        "REDIS_HOST" => Some("cache".into()),
        _ => None,
    })
    .unwrap();
    assert_eq!(cfg.store.uri, "redis://10.0.0.1:6380");
}

#[test]
fn bad_port_env_rejected() {
    let mut cfg = GatewayConfig::default();
    let err = config::apply_env(&mut cfg, |k| (k == "PORT").then(|| "http".into())).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn shipped_sample_config_parses() {
    let cfg = config::load_from_file("../../hitbadge.yaml").expect("sample config must parse");
    assert_eq!(cfg.store.backend, StoreBackend::Redis);
    assert_eq!(cfg.gateway.listen, "0.0.0.0:5000");
}
