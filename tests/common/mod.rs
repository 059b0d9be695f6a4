use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xmlmc::config::{ClientConfig, ZoneConfig};

/// Config whose zone lookup hosts are the given mock servers.
#[allow(dead_code)]
pub fn config_with_zone_hosts(primary: &MockServer, secondary: &MockServer) -> ClientConfig {
    ClientConfig {
        zone: ZoneConfig {
            primary_url: primary.uri(),
            secondary_url: secondary.uri(),
            timeout_seconds: 5,
        },
        ..ClientConfig::default()
    }
}

/// A zone-info document in the shape served by the lookup hosts.
#[allow(dead_code)]
pub fn zone_info_json(endpoint: &str, stream: &str) -> serde_json::Value {
    serde_json::json!({
        "zoneinfo": {
            "name": "hornbill",
            "zone": "eur",
            "message": "",
            "endpoint": endpoint,
            "releaseStream": stream
        }
    })
}

/// Serve `info` for `instance` on `server`.
#[allow(dead_code)]
pub async fn mount_zone_info(server: &MockServer, instance: &str, info: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/instances/{}/zoneinfo", instance)))
        .respond_with(ResponseTemplate::new(200).set_body_json(info))
        .mount(server)
        .await;
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
