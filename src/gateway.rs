// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Gateway and segment identity types.
//!
//! A gateway is addressed by its canonical id `gwCCnNN` where `CC` is the
//! cluster number and `NN` the node number, e.g. `gw07n01`. Everything else
//! about a gateway is derived on demand from that id:
//!
//! - the backbone address `10.191.255.<cluster><node>` (unpadded decimal
//!   concatenation, so `gw01n03` maps to `10.191.255.13`)
//! - the public hostname `<id>.<domain>`
//! - the per-segment alias name `gw<CC>s<SS>.<domain>`
//!
//! A segment is a plain integer key identifying one traffic class.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::BACKBONE_NET_PREFIX;

/// Error raised when a gateway or segment identifier cannot be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The string does not match the `gwCCnNN` grammar
    #[error("'{0}' is not a valid gateway id (expected gwCCnNN)")]
    InvalidGatewayId(String),

    /// The string is not a decimal segment number
    #[error("'{0}' is not a valid segment number")]
    InvalidSegment(String),
}

/// Canonical identity of one gateway node.
///
/// Ordering is derived from `(cluster, node)`, which coincides with the
/// lexicographic ordering of the canonical `gwCCnNN` form because both
/// components are zero-padded to two digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GatewayId {
    cluster: u8,
    node: u8,
}

impl GatewayId {
    /// Build an id from raw cluster and node numbers.
    #[must_use]
    pub fn new(cluster: u8, node: u8) -> Self {
        Self { cluster, node }
    }

    /// Cluster number, e.g. `7` for `gw07n01`.
    #[must_use]
    pub fn cluster(&self) -> u8 {
        self.cluster
    }

    /// Node number within the cluster, e.g. `1` for `gw07n01`.
    #[must_use]
    pub fn node(&self) -> u8 {
        self.node
    }

    /// Backbone address of this gateway, e.g. `10.191.255.71` for `gw07n01`.
    ///
    /// The last octet is the unpadded decimal concatenation of cluster and
    /// node, matching how the backbone network is numbered.
    #[must_use]
    pub fn backbone_addr(&self) -> String {
        format!("{BACKBONE_NET_PREFIX}.{}{}", self.cluster, self.node)
    }

    /// Public hostname of this gateway under `domain`, e.g.
    /// `gw07n01.gw.freifunk-stuttgart.de`.
    #[must_use]
    pub fn public_host(&self, domain: &str) -> String {
        format!("{self}.{domain}")
    }

    /// Segment alias name for this gateway's cluster under `domain`, e.g.
    /// `gw01s02.gw.freifunk-stuttgart.de` for `gw01n03` and segment 2.
    ///
    /// The alias only encodes the cluster; the record value (the gateway's
    /// address) identifies the node.
    #[must_use]
    pub fn segment_alias(&self, segment: Segment, domain: &str) -> String {
        format!("gw{:02}s{:02}.{domain}", self.cluster, segment.number())
    }
}

impl fmt::Display for GatewayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gw{:02}n{:02}", self.cluster, self.node)
    }
}

impl FromStr for GatewayId {
    type Err = IdentityError;

    /// Parse the canonical `gwCCnNN` form, e.g. `gw01n03`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let invalid = || IdentityError::InvalidGatewayId(s.to_string());

        if bytes.len() != 7 || &bytes[0..2] != b"gw" || bytes[4] != b'n' {
            return Err(invalid());
        }
        if !bytes[2..4].iter().chain(&bytes[5..7]).all(u8::is_ascii_digit) {
            return Err(invalid());
        }

        let cluster: u8 = s[2..4].parse().map_err(|_| invalid())?;
        let node: u8 = s[5..7].parse().map_err(|_| invalid())?;

        Ok(Self { cluster, node })
    }
}

/// One traffic segment, identified by a small integer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Segment(u32);

impl Segment {
    /// Build a segment from its raw number.
    #[must_use]
    pub fn new(number: u32) -> Self {
        Self(number)
    }

    /// Raw segment number.
    #[must_use]
    pub fn number(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Segment {
    type Err = IdentityError;

    /// Parse a decimal segment number; leading zeros are accepted, so both
    /// `"1"` and `"01"` name segment 1.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>()
            .map(Self)
            .map_err(|_| IdentityError::InvalidSegment(s.to_string()))
    }
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod gateway_tests;
