// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! batman-adv originator table parsing.
//!
//! On a gateway node the cheapest way to find the reachable peers is the
//! mesh routing table (`batctl o`). Gateway originator MACs encode the
//! gateway identity in their last two octets:
//!
//! ```text
//!   02:00:38:01:07:01 (255) 02:00:35:01:07:01 [      bb01]: 64.0/64.0 MBit
//! ```
//!
//! maps to `gw07n01`. Lines that do not carry such a MAC (headers, client
//! originators) are skipped.

use std::collections::BTreeSet;
use tracing::trace;

use crate::gateway::GatewayId;

/// Parse an originator table dump into the set of reachable gateways.
///
/// Never fails; unrecognized lines contribute nothing.
#[must_use]
pub fn parse_originators(raw: &str) -> BTreeSet<GatewayId> {
    let mut gateways = BTreeSet::new();
    for line in raw.lines() {
        if let Some(gateway) = parse_originator_line(line) {
            gateways.insert(gateway);
        } else {
            trace!(line, "skipping non-gateway originator line");
        }
    }
    gateways
}

/// Extract the gateway id from one originator line, if its first MAC matches
/// the gateway numbering scheme.
fn parse_originator_line(line: &str) -> Option<GatewayId> {
    let mac = line.split_whitespace().next()?;
    let octets: Vec<&str> = mac.split(':').collect();
    if octets.len() != 6 || octets[0] != "02" || octets[1] != "00" || octets[3] != "01" {
        return None;
    }

    // Gateway MACs spell cluster and node in decimal in the last two octets.
    let cluster: u8 = parse_decimal_octet(octets[4])?;
    let node: u8 = parse_decimal_octet(octets[5])?;
    Some(GatewayId::new(cluster, node))
}

fn parse_decimal_octet(octet: &str) -> Option<u8> {
    if octet.len() != 2 || !octet.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    octet.parse().ok()
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod mesh_tests;
