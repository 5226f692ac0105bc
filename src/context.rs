// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared per-cycle context and configuration.
//!
//! All tunables are threaded explicitly through this context; nothing in the
//! decision path reads ambient global state. One [`CycleContext`] is built at
//! startup and borrowed by every stage of the cycle.

use anyhow::{Context as _, Result};
use std::time::Duration;

use crate::constants::{
    DEFAULT_DESIRED_GW_PER_SEGMENT, DEFAULT_DNS_SERVER, DEFAULT_DOMAIN, DEFAULT_MAX_AGE_SECS,
    DEFAULT_SEGMENT_COUNT, STATUS_FETCH_TIMEOUT_SECS,
};
use crate::gateway::GatewayId;

/// Complete configuration surface of the balancer.
#[derive(Debug, Clone)]
pub struct Config {
    /// DNS domain carrying gateway and segment records
    pub domain: String,

    /// DNS server asked for the zone transfer
    pub dns_server: String,

    /// How many gateways should be DNS-active per segment
    pub desired_gw_per_segment: usize,

    /// Maximum accepted age of a peer status document, in seconds
    pub max_age_secs: i64,

    /// Total number of traffic segments; reports for segments outside
    /// `1..=segment_count` are ignored
    pub segment_count: u32,

    /// Fetch peer status over the backbone network instead of the public
    /// hostnames
    pub use_backbone: bool,

    /// Identity of the gateway this process runs on, when it runs on one.
    /// Selects mesh-based discovery and is merged into the candidate set.
    pub local: Option<GatewayId>,

    /// Gateway whose local action list is extracted and rendered; defaults
    /// to `local`
    pub target: Option<GatewayId>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            dns_server: DEFAULT_DNS_SERVER.to_string(),
            desired_gw_per_segment: DEFAULT_DESIRED_GW_PER_SEGMENT,
            max_age_secs: DEFAULT_MAX_AGE_SECS,
            segment_count: DEFAULT_SEGMENT_COUNT,
            use_backbone: false,
            local: None,
            target: None,
        }
    }
}

impl Config {
    /// The gateway whose local actions are reported: the explicit target if
    /// set, otherwise the local identity.
    #[must_use]
    pub fn effective_target(&self) -> Option<GatewayId> {
        self.target.or(self.local)
    }
}

/// Everything one decision cycle needs: configuration plus the shared HTTP
/// client used for peer status fetches.
#[derive(Debug, Clone)]
pub struct CycleContext {
    /// Balancer configuration
    pub config: Config,

    /// HTTP client with the per-peer fetch timeout applied
    pub http: reqwest::Client,
}

impl CycleContext {
    /// Build a context from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(STATUS_FETCH_TIMEOUT_SECS))
            .build()
            .context("building HTTP client for peer status fetches")?;

        Ok(Self { config, http })
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod context_tests;
