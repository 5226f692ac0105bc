// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `collector.rs`

use super::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gw(id: &str) -> GatewayId {
    id.parse().unwrap()
}

fn endpoint(server_uri: &str, id: &str) -> PeerEndpoint {
    PeerEndpoint {
        gateway: gw(id),
        url: Url::parse(&format!("{server_uri}/{id}{STATUS_PATH}")).unwrap(),
    }
}

fn status_body(timestamp: i64) -> serde_json::Value {
    json!({
        "version": "1",
        "timestamp": timestamp,
        "segments": {
            "1": { "preference": 50, "dnsactive": 1 }
        }
    })
}

async fn mount_status(server: &MockServer, id: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/{id}{STATUS_PATH}")))
        .respond_with(template)
        .mount(server)
        .await;
}

#[test]
fn test_peer_endpoints_public_hostnames() {
    let config = Config::default();
    let candidates: BTreeSet<GatewayId> = [gw("gw01n03"), gw("gw07n01")].into_iter().collect();

    let endpoints = peer_endpoints(&candidates, &config).unwrap();
    assert_eq!(endpoints.len(), 2);
    assert_eq!(
        endpoints[0].url.as_str(),
        "http://gw01n03.gw.freifunk-stuttgart.de/data/gwstatus.json"
    );
}

#[test]
fn test_peer_endpoints_backbone() {
    let config = Config {
        use_backbone: true,
        ..Config::default()
    };
    let candidates: BTreeSet<GatewayId> = [gw("gw07n01")].into_iter().collect();

    let endpoints = peer_endpoints(&candidates, &config).unwrap();
    assert_eq!(
        endpoints[0].url.as_str(),
        "http://10.191.255.71/data/gwstatus.json"
    );
}

#[tokio::test]
async fn test_collect_fetches_documents() {
    let server = MockServer::start().await;
    mount_status(
        &server,
        "gw01n03",
        ResponseTemplate::new(200).set_body_json(status_body(100)),
    )
    .await;
    mount_status(
        &server,
        "gw07n01",
        ResponseTemplate::new(200).set_body_json(status_body(200)),
    )
    .await;

    let collector = StatusCollector::new(reqwest::Client::new());
    let endpoints = vec![
        endpoint(&server.uri(), "gw01n03"),
        endpoint(&server.uri(), "gw07n01"),
    ];

    let documents = collector.collect(&endpoints).await.unwrap();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[&gw("gw01n03")].timestamp, 100);
    assert_eq!(documents[&gw("gw07n01")].timestamp, 200);
}

#[tokio::test]
async fn test_collect_degrades_on_404_and_503() {
    let server = MockServer::start().await;
    mount_status(&server, "gw01n03", ResponseTemplate::new(404)).await;
    mount_status(&server, "gw05n03", ResponseTemplate::new(503)).await;
    mount_status(
        &server,
        "gw07n01",
        ResponseTemplate::new(200).set_body_json(status_body(100)),
    )
    .await;

    let collector = StatusCollector::new(reqwest::Client::new());
    let endpoints = vec![
        endpoint(&server.uri(), "gw01n03"),
        endpoint(&server.uri(), "gw05n03"),
        endpoint(&server.uri(), "gw07n01"),
    ];

    let documents = collector.collect(&endpoints).await.unwrap();
    assert_eq!(documents.len(), 1);
    assert!(documents.contains_key(&gw("gw07n01")));
}

#[tokio::test]
async fn test_collect_degrades_on_empty_body() {
    let server = MockServer::start().await;
    mount_status(
        &server,
        "gw01n03",
        ResponseTemplate::new(200).set_body_string(""),
    )
    .await;

    let collector = StatusCollector::new(reqwest::Client::new());
    let documents = collector
        .collect(&[endpoint(&server.uri(), "gw01n03")])
        .await
        .unwrap();
    assert!(documents.is_empty());
}

#[tokio::test]
async fn test_collect_degrades_on_unreachable_peer() {
    // Nothing listens here; connection refused must degrade, not abort.
    let collector = StatusCollector::new(reqwest::Client::new());
    let endpoints = vec![PeerEndpoint {
        gateway: gw("gw01n03"),
        url: Url::parse("http://127.0.0.1:9/data/gwstatus.json").unwrap(),
    }];

    let documents = collector.collect(&endpoints).await.unwrap();
    assert!(documents.is_empty());
}

#[tokio::test]
async fn test_collect_unparsable_body_is_fatal() {
    let server = MockServer::start().await;
    mount_status(
        &server,
        "gw01n03",
        ResponseTemplate::new(200).set_body_string("<html>not json</html>"),
    )
    .await;

    let collector = StatusCollector::new(reqwest::Client::new());
    let err = collector
        .collect(&[endpoint(&server.uri(), "gw01n03")])
        .await
        .unwrap_err();

    match err {
        CycleError::ProtocolViolation { gateway, .. } => assert_eq!(gateway, gw("gw01n03")),
        other => panic!("expected ProtocolViolation, got {other:?}"),
    }
}

#[tokio::test]
async fn test_zone_discovery_uses_gateway_nodes() {
    let raw = "\
gw01n03.gw.freifunk-stuttgart.de. 300 IN A 88.198.230.6
gw07n01.gw.freifunk-stuttgart.de. 300 IN A 163.172.223.244
";
    let zone = ZoneSnapshot::parse(raw, "gw.freifunk-stuttgart.de").unwrap();

    let discovered = ZoneDiscovery::new(&zone).discover().await.unwrap();
    let expected: BTreeSet<GatewayId> = [gw("gw01n03"), gw("gw07n01")].into_iter().collect();
    assert_eq!(discovered, expected);
}

#[tokio::test]
async fn test_mesh_discovery_merges_self() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    std::io::Write::write_all(
        &mut file,
        b"  02:00:38:01:07:01 (255) 02:00:35:01:07:01 [      bb01]: 64.0/64.0 MBit\n",
    )
    .unwrap();

    let discovery = MeshDiscovery::new(
        gw("gw01n03"),
        OriginatorSource::File(file.path().to_path_buf()),
    );
    let discovered = discovery.discover().await.unwrap();

    let expected: BTreeSet<GatewayId> = [gw("gw01n03"), gw("gw07n01")].into_iter().collect();
    assert_eq!(discovered, expected);
}

#[tokio::test]
async fn test_mesh_discovery_missing_file_is_discovery_error() {
    let discovery = MeshDiscovery::new(
        gw("gw01n03"),
        OriginatorSource::File("/nonexistent/originators".into()),
    );

    match discovery.discover().await.unwrap_err() {
        CycleError::Discovery(_) => {}
        other => panic!("expected Discovery, got {other:?}"),
    }
}
