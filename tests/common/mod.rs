// Common test utilities for integration tests

use gwbalancer::collector::PeerEndpoint;
use gwbalancer::gateway::GatewayId;
use serde_json::{json, Value};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const DOMAIN: &str = "gw.freifunk-stuttgart.de";

/// Fixed "now" for deterministic staleness checks
pub const NOW: i64 = 1_693_526_400;

/// Parse a canonical gateway id, panicking on typos in the test itself
pub fn gw(id: &str) -> GatewayId {
    id.parse().unwrap()
}

/// A zone transfer with the given node records and segment aliases.
///
/// `nodes` is `(id, a, aaaa)` with empty strings for absent records;
/// `aliases` is `(alias_label, address)`.
pub fn zone_text(nodes: &[(&str, &str, &str)], aliases: &[(&str, &str)]) -> String {
    let mut lines = vec![
        format!("; <<>> DiG 9.16.1 <<>> -t axfr {DOMAIN}"),
        format!("{DOMAIN}. 86400 IN SOA dns1.lihas.de. hostmaster.lihas.de. 1 3600 600 604800 86400"),
    ];
    for &(id, a, aaaa) in nodes {
        if !a.is_empty() {
            lines.push(format!("{id}.{DOMAIN}. 300 IN A {a}"));
        }
        if !aaaa.is_empty() {
            lines.push(format!("{id}.{DOMAIN}. 300 IN AAAA {aaaa}"));
        }
    }
    for &(alias, addr) in aliases {
        lines.push(format!("{alias}.{DOMAIN}. 300 IN A {addr}"));
    }
    lines.join("\n")
}

/// A status document body with the given `(segment, preference, dnsactive)`
/// entries and a fresh timestamp relative to [`NOW`].
pub fn status_body(age_secs: i64, entries: &[(&str, i64, u8)]) -> Value {
    let segments: serde_json::Map<String, Value> = entries
        .iter()
        .map(|&(segment, preference, dnsactive)| {
            (
                segment.to_string(),
                json!({ "preference": preference, "dnsactive": dnsactive }),
            )
        })
        .collect();
    json!({
        "version": "1",
        "timestamp": NOW - age_secs,
        "segments": segments
    })
}

/// Serve `body` as `id`'s status document on the mock server.
pub async fn serve_status(server: &MockServer, id: &str, body: &Value) {
    Mock::given(method("GET"))
        .and(path(format!("/{id}/data/gwstatus.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Endpoint for `id` pointing at the mock server.
pub fn endpoint(server: &MockServer, id: &str) -> PeerEndpoint {
    PeerEndpoint {
        gateway: gw(id),
        url: Url::parse(&format!("{}/{id}/data/gwstatus.json", server.uri())).unwrap(),
    }
}
