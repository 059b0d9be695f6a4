//! Zone resolver integration tests
//!
//! Runs `ZoneResolver` against two `wiremock` servers standing in for the
//! primary and secondary lookup hosts.

mod common;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use xmlmc::commands::zone::lookup_zone;
use xmlmc::config::ZoneConfig;
use xmlmc::error::XmlmcError;
use xmlmc::zone::ZoneResolver;

use common::{config_with_zone_hosts, mount_zone_info, zone_info_json};

fn resolver_for(primary: &str, secondary: &str) -> ZoneResolver {
    ZoneResolver::new(&ZoneConfig {
        primary_url: primary.to_string(),
        secondary_url: secondary.to_string(),
        timeout_seconds: 5,
    })
}

// ---------------------------------------------------------------------------
// Primary host
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_resolve_from_primary() {
    let primary = MockServer::start().await;
    let secondary = MockServer::start().await;
    mount_zone_info(
        &primary,
        "hornbill",
        zone_info_json("https://eurapi.example.com/hornbill/", "stable"),
    )
    .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&secondary)
        .await;

    let resolver = resolver_for(&primary.uri(), &secondary.uri());
    let info = resolver.resolve("hornbill").await.unwrap();

    assert_eq!(info.endpoint(), "https://eurapi.example.com/hornbill/");
    assert_eq!(info.release_stream(), "stable");
    assert_eq!(info.zoneinfo.zone, "eur");
}

#[tokio::test]
async fn test_resolve_trailing_slash_on_host() {
    let primary = MockServer::start().await;
    mount_zone_info(
        &primary,
        "acme",
        zone_info_json("https://eurapi.example.com/acme/", ""),
    )
    .await;

    let resolver = resolver_for(&format!("{}/", primary.uri()), "http://127.0.0.1:1");
    let info = resolver.resolve("acme").await.unwrap();
    assert_eq!(info.endpoint(), "https://eurapi.example.com/acme/");
    assert_eq!(info.release_stream(), "");
}

// ---------------------------------------------------------------------------
// Fallback
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_fallback_on_primary_error_status() {
    let primary = MockServer::start().await;
    let secondary = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/instances/hornbill/zoneinfo"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&primary)
        .await;
    mount_zone_info(
        &secondary,
        "hornbill",
        zone_info_json("https://betaapi.example.com/hornbill/", "beta"),
    )
    .await;

    let resolver = resolver_for(&primary.uri(), &secondary.uri());
    let info = resolver.resolve("hornbill").await.unwrap();

    assert_eq!(info.endpoint(), "https://betaapi.example.com/hornbill/");
    assert_eq!(info.release_stream(), "beta");
}

#[tokio::test]
async fn test_fallback_on_unreachable_primary() {
    let secondary = MockServer::start().await;
    mount_zone_info(
        &secondary,
        "hornbill",
        zone_info_json("https://eurapi.example.com/hornbill/", "stable"),
    )
    .await;

    let resolver = resolver_for("http://127.0.0.1:1", &secondary.uri());
    let info = resolver.resolve("hornbill").await.unwrap();
    assert_eq!(info.endpoint(), "https://eurapi.example.com/hornbill/");
}

#[tokio::test]
async fn test_both_hosts_failing_is_network_error() {
    let primary = MockServer::start().await;
    let secondary = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&primary)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&secondary)
        .await;

    let resolver = resolver_for(&primary.uri(), &secondary.uri());
    let err = resolver.resolve("missing").await.unwrap_err();

    match err.downcast_ref::<XmlmcError>() {
        Some(e @ XmlmcError::Network { .. }) => assert_eq!(e.status(), Some(404)),
        other => panic!("expected network error, got {:?}", other),
    }
    assert!(resolver.endpoint_from_name("missing").await.is_none());
}

#[tokio::test]
async fn test_undecodable_body_is_decode_error() {
    let primary = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/instances/hornbill/zoneinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&primary)
        .await;

    let resolver = resolver_for(&primary.uri(), "http://127.0.0.1:1");
    let err = resolver.resolve("hornbill").await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<XmlmcError>(),
        Some(XmlmcError::Decode(_))
    ));
}

// ---------------------------------------------------------------------------
// Endpoint helper and command
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_endpoint_from_name() {
    let primary = MockServer::start().await;
    mount_zone_info(
        &primary,
        "hornbill",
        zone_info_json("https://eurapi.example.com/hornbill/", "stable"),
    )
    .await;
    mount_zone_info(&primary, "noendpoint", zone_info_json("", "stable")).await;

    let resolver = resolver_for(&primary.uri(), "http://127.0.0.1:1");
    assert_eq!(
        resolver.endpoint_from_name("hornbill").await.as_deref(),
        Some("https://eurapi.example.com/hornbill/")
    );
    assert!(resolver.endpoint_from_name("noendpoint").await.is_none());
}

#[tokio::test]
async fn test_lookup_zone_command_uses_config_hosts() {
    let primary = MockServer::start().await;
    let secondary = MockServer::start().await;
    mount_zone_info(
        &secondary,
        "hornbill",
        zone_info_json("https://eurapi.example.com/hornbill/", "stable"),
    )
    .await;

    let config = config_with_zone_hosts(&primary, &secondary);
    let info = lookup_zone(&config, "hornbill").await.unwrap();
    assert_eq!(info.zoneinfo.name, "hornbill");
}

// ---------------------------------------------------------------------------
// Lookup timeout and instance id encoding
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_zero_lookup_timeout_means_no_deadline() {
    let primary = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/instances/acme/zoneinfo"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(zone_info_json("https://eurapi.example.com/acme/", "stable"))
                .set_delay(std::time::Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&primary)
        .await;

    let resolver = ZoneResolver::new(&ZoneConfig {
        primary_url: primary.uri(),
        secondary_url: "http://127.0.0.1:1".to_string(),
        timeout_seconds: 0,
    });
    let info = resolver.resolve("acme").await.unwrap();
    assert_eq!(info.endpoint(), "https://eurapi.example.com/acme/");
}

#[tokio::test]
async fn test_zero_lookup_timeout_config_resolves_instance() {
    let primary = MockServer::start().await;
    let secondary = MockServer::start().await;
    mount_zone_info(
        &primary,
        "acme",
        zone_info_json("https://eurapi.example.com/acme/", "stable"),
    )
    .await;

    let mut config = config_with_zone_hosts(&primary, &secondary);
    config.zone.timeout_seconds = 0;
    assert!(config.validate().is_ok());

    let conn = xmlmc::XmlmcInstance::with_config("acme", &config).await;
    assert_eq!(conn.server_url(), "https://eurapi.example.com/acme/");
    assert!(conn.resolution_error().is_none());
}

#[tokio::test]
async fn test_instance_id_is_a_single_path_segment() {
    let primary = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/instances/acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(zone_info_json(
            "https://wrong.example.com/",
            "stable",
        )))
        .expect(0)
        .mount(&primary)
        .await;
    Mock::given(method("GET"))
        .and(path("/instances/acme%23x/zoneinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(zone_info_json(
            "https://eurapi.example.com/acme-x/",
            "stable",
        )))
        .expect(1)
        .mount(&primary)
        .await;

    let resolver = resolver_for(&primary.uri(), "http://127.0.0.1:1");
    let info = resolver.resolve("acme#x").await.unwrap();
    assert_eq!(info.endpoint(), "https://eurapi.example.com/acme-x/");
}
