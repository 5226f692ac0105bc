// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Peer discovery and concurrent status collection.
//!
//! Discovery has two strategies, exactly one of which is used per cycle:
//!
//! - [`MeshDiscovery`] on a gateway node: parse the batman-adv originator
//!   table for reachable peers and merge in the local identity
//! - [`ZoneDiscovery`] elsewhere: take every gateway node the zone snapshot
//!   knows about
//!
//! Collection fans the status fetches out with bounded concurrency so cycle
//! latency tracks the slowest responsive peer rather than the sum of all
//! peers. Failure isolation is per peer: an unreachable peer, a non-2xx
//! response or an empty body degrade that one peer to "no data". A 2xx
//! response with a body that is not JSON aborts the cycle, since it means the
//! producer speaks a different protocol.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::{debug, warn};
use url::Url;

use crate::constants::{MAX_CONCURRENT_FETCHES, STATUS_PATH, STATUS_VERSION};
use crate::context::Config;
use crate::errors::CycleError;
use crate::gateway::GatewayId;
use crate::status::StatusDocument;
use crate::zone::ZoneSnapshot;

/// Source of candidate gateway identifiers for one cycle.
#[async_trait]
pub trait Discovery {
    /// Produce the set of gateways whose status should be fetched.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::Discovery`] when no candidate set can be
    /// produced at all; an empty set is not an error.
    async fn discover(&self) -> Result<BTreeSet<GatewayId>, CycleError>;
}

/// Where the originator table dump comes from.
#[derive(Debug, Clone)]
pub enum OriginatorSource {
    /// Run `batctl o` on this host
    Command,
    /// Read a previously captured dump from a file
    File(PathBuf),
}

/// Mesh-routing-table discovery, used when running on a gateway node.
#[derive(Debug, Clone)]
pub struct MeshDiscovery {
    local: GatewayId,
    source: OriginatorSource,
}

impl MeshDiscovery {
    /// Discovery for the gateway `local`, reading originators from `source`.
    #[must_use]
    pub fn new(local: GatewayId, source: OriginatorSource) -> Self {
        Self { local, source }
    }

    async fn originator_table(&self) -> Result<String, CycleError> {
        match &self.source {
            OriginatorSource::Command => {
                let output = tokio::process::Command::new("batctl")
                    .arg("o")
                    .output()
                    .await
                    .map_err(|err| CycleError::Discovery(format!("running batctl: {err}")))?;
                if !output.status.success() {
                    return Err(CycleError::Discovery(format!(
                        "batctl exited with {}",
                        output.status
                    )));
                }
                Ok(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            OriginatorSource::File(path) => tokio::fs::read_to_string(path).await.map_err(|err| {
                CycleError::Discovery(format!("reading {}: {err}", path.display()))
            }),
        }
    }
}

#[async_trait]
impl Discovery for MeshDiscovery {
    async fn discover(&self) -> Result<BTreeSet<GatewayId>, CycleError> {
        let table = self.originator_table().await?;
        let mut gateways = crate::mesh::parse_originators(&table);
        // The local node never shows up in its own originator table.
        gateways.insert(self.local);
        debug!(count = gateways.len(), "discovered gateways via mesh");
        Ok(gateways)
    }
}

/// Zone-based discovery, used when this host is not a gateway node.
#[derive(Debug, Clone)]
pub struct ZoneDiscovery<'a> {
    snapshot: &'a ZoneSnapshot,
}

impl<'a> ZoneDiscovery<'a> {
    /// Discovery over the gateway node records of `snapshot`.
    #[must_use]
    pub fn new(snapshot: &'a ZoneSnapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl Discovery for ZoneDiscovery<'_> {
    async fn discover(&self) -> Result<BTreeSet<GatewayId>, CycleError> {
        let gateways = self.snapshot.gateway_nodes().clone();
        debug!(count = gateways.len(), "discovered gateways via zone");
        Ok(gateways)
    }
}

/// One gateway's resolved status endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerEndpoint {
    /// The gateway this endpoint belongs to
    pub gateway: GatewayId,
    /// Full URL of its status document
    pub url: Url,
}

/// Resolve candidate gateways into status endpoints.
///
/// With `use_backbone` set the backbone address is used, otherwise the public
/// hostname under the configured domain.
///
/// # Errors
///
/// Returns [`CycleError::Discovery`] if an endpoint URL cannot be built,
/// which only happens for out-of-range backbone octets.
pub fn peer_endpoints(
    candidates: &BTreeSet<GatewayId>,
    config: &Config,
) -> Result<Vec<PeerEndpoint>, CycleError> {
    candidates
        .iter()
        .map(|&gateway| {
            let host = if config.use_backbone {
                gateway.backbone_addr()
            } else {
                gateway.public_host(&config.domain)
            };
            let url = Url::parse(&format!("http://{host}{STATUS_PATH}")).map_err(|err| {
                CycleError::Discovery(format!("endpoint for {gateway}: {err}"))
            })?;
            Ok(PeerEndpoint { gateway, url })
        })
        .collect()
}

/// Fetches peer status documents with bounded concurrency.
#[derive(Debug, Clone)]
pub struct StatusCollector {
    http: reqwest::Client,
}

impl StatusCollector {
    /// Collector using `http`, which carries the per-request timeout.
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Fetch every endpoint's status document.
    ///
    /// Peers that are unreachable, answer non-2xx or send an empty body are
    /// simply absent from the result; they will be retried next cycle.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::ProtocolViolation`] when a peer answers with
    /// HTTP success but a body that is not valid JSON.
    pub async fn collect(
        &self,
        endpoints: &[PeerEndpoint],
    ) -> Result<BTreeMap<GatewayId, StatusDocument>, CycleError> {
        let mut fetches = stream::iter(endpoints.iter().map(|ep| self.fetch_one(ep)))
            .buffer_unordered(MAX_CONCURRENT_FETCHES);

        let mut documents = BTreeMap::new();
        while let Some(fetched) = fetches.next().await {
            if let Some((gateway, document)) = fetched? {
                documents.insert(gateway, document);
            }
        }
        Ok(documents)
    }

    /// Fetch one peer; `Ok(None)` means that peer degraded to "no data".
    async fn fetch_one(
        &self,
        endpoint: &PeerEndpoint,
    ) -> Result<Option<(GatewayId, StatusDocument)>, CycleError> {
        let gateway = endpoint.gateway;

        let response = match self.http.get(endpoint.url.clone()).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(%gateway, %err, "peer unreachable, treating as no data");
                return Ok(None);
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(%gateway, %status, "peer returned non-success, treating as no data");
            return Ok(None);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                warn!(%gateway, %err, "peer body read failed, treating as no data");
                return Ok(None);
            }
        };
        if body.trim().is_empty() {
            warn!(%gateway, "peer returned empty body, treating as no data");
            return Ok(None);
        }

        let document: StatusDocument =
            serde_json::from_str(&body).map_err(|err| CycleError::ProtocolViolation {
                gateway,
                reason: err.to_string(),
            })?;

        if document.version != STATUS_VERSION {
            warn!(%gateway, version = %document.version, "unexpected status document version");
        }
        debug!(%gateway, segments = document.segments.len(), "fetched peer status");

        Ok(Some((gateway, document)))
    }
}

#[cfg(test)]
#[path = "collector_tests.rs"]
mod collector_tests;
