// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone transfer parsing and the per-cycle DNS snapshot.
//!
//! A decision cycle starts from a full zone transfer of the gateway domain.
//! [`ZoneSnapshot::parse`] turns that raw text into an immutable snapshot
//! answering three questions:
//!
//! - which gateway owns a given address ([`ZoneSnapshot::ip_to_gateway`])
//! - which gateways are currently DNS-active for a segment
//!   ([`ZoneSnapshot::active_gateways_for_segment`])
//! - which address records a gateway node has, for rendering updates
//!   ([`ZoneSnapshot::record_for`])
//!
//! The line grammar is deliberately permissive: anything that does not look
//! like `<host>.<domain>. <ttl> IN <A|AAAA> <value>` with a recognized
//! gateway host label is silently skipped, matching how a real transfer mixes
//! SOA/NS/TXT records and comments into the output. The only hard failure is
//! a zone integrity violation: a segment alias pointing at an address no
//! gateway node owns.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::constants::RESERVED_SEGMENT;
use crate::errors::CycleError;
use crate::gateway::{GatewayId, Segment};

/// DNS record types the balancer manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    Aaaa,
}

impl RecordType {
    /// Both managed record types, in rendering order.
    pub const ALL: [RecordType; 2] = [RecordType::A, RecordType::Aaaa];
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::A => write!(f, "A"),
            RecordType::Aaaa => write!(f, "AAAA"),
        }
    }
}

impl FromStr for RecordType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::Aaaa),
            _ => Err(()),
        }
    }
}

/// Host label classification within the gateway domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostLabel {
    /// A gateway node record, `gwCCnNN`
    Node(GatewayId),
    /// A segment alias record, `gwCCsSS`
    SegmentAlias(Segment),
}

/// One recognized line of the zone transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ZoneRecord {
    host: HostLabel,
    rtype: RecordType,
    value: String,
}

/// Immutable view of the zone for one decision cycle.
///
/// Built once per cycle; all validation and rendering reads go against the
/// same snapshot so that status fetched before and after a transfer never
/// intermingle.
#[derive(Debug, Clone)]
pub struct ZoneSnapshot {
    domain: String,
    /// Reverse lookup from record value to owning gateway node
    ip_to_gateway: BTreeMap<String, GatewayId>,
    /// Gateways currently published for each segment
    active: BTreeMap<Segment, BTreeSet<GatewayId>>,
    /// First A/AAAA record value seen per gateway node
    node_records: BTreeMap<(GatewayId, RecordType), String>,
    /// Every gateway node with at least one address record
    gateway_nodes: BTreeSet<GatewayId>,
}

impl ZoneSnapshot {
    /// Parse a raw zone transfer into a snapshot.
    ///
    /// Malformed or unrelated lines are skipped without error. Alias records
    /// for the reserved segment are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::UnmappedAliasAddress`] when a segment alias
    /// record points at an address that no gateway node record owns; the zone
    /// data is inconsistent and no safe decision can be made from it.
    pub fn parse(raw: &str, domain: &str) -> Result<Self, CycleError> {
        let mut records = Vec::new();
        for line in raw.lines() {
            if let Some(record) = parse_zone_line(line, domain) {
                records.push(record);
            } else {
                debug!(line, "skipping unrecognized zone line");
            }
        }

        let mut snapshot = Self {
            domain: domain.to_string(),
            ip_to_gateway: BTreeMap::new(),
            active: BTreeMap::new(),
            node_records: BTreeMap::new(),
            gateway_nodes: BTreeSet::new(),
        };

        // Node records first so the reverse map is complete before any alias
        // is resolved against it.
        for record in &records {
            if let HostLabel::Node(gateway) = record.host {
                snapshot
                    .ip_to_gateway
                    .insert(record.value.clone(), gateway);
                snapshot
                    .node_records
                    .entry((gateway, record.rtype))
                    .or_insert_with(|| record.value.clone());
                snapshot.gateway_nodes.insert(gateway);
            }
        }

        for record in &records {
            if let HostLabel::SegmentAlias(segment) = record.host {
                if segment.number() == RESERVED_SEGMENT {
                    continue;
                }
                let Some(gateway) = snapshot.ip_to_gateway.get(&record.value) else {
                    return Err(CycleError::UnmappedAliasAddress {
                        segment,
                        address: record.value.clone(),
                    });
                };
                snapshot.active.entry(segment).or_default().insert(*gateway);
            }
        }

        Ok(snapshot)
    }

    /// Domain this snapshot was taken for.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Gateway node owning `addr`, if any node record carries that value.
    #[must_use]
    pub fn ip_to_gateway(&self, addr: &str) -> Option<GatewayId> {
        self.ip_to_gateway.get(addr).copied()
    }

    /// Gateways currently DNS-active for `segment`.
    ///
    /// A segment without alias records yields an empty set, not an error.
    #[must_use]
    pub fn active_gateways_for_segment(&self, segment: Segment) -> BTreeSet<GatewayId> {
        self.active.get(&segment).cloned().unwrap_or_default()
    }

    /// First record value of `rtype` for `gateway`, if the node has one.
    #[must_use]
    pub fn record_for(&self, gateway: GatewayId, rtype: RecordType) -> Option<&str> {
        self.node_records
            .get(&(gateway, rtype))
            .map(String::as_str)
    }

    /// Every gateway node seen in the zone, used as the DNS-based discovery
    /// candidate set.
    #[must_use]
    pub fn gateway_nodes(&self) -> &BTreeSet<GatewayId> {
        &self.gateway_nodes
    }
}

/// Parse one zone transfer line, returning `None` for anything that is not a
/// gateway A/AAAA record under `domain`.
///
/// Expected shape (whitespace separated, as emitted by `dig -t axfr`):
///
/// ```text
/// gw01n03.gw.freifunk-stuttgart.de. 300 IN A 88.198.230.6
/// ```
fn parse_zone_line(line: &str, domain: &str) -> Option<ZoneRecord> {
    let mut fields = line.split_whitespace();
    let name = fields.next()?;
    let _ttl: u32 = fields.next()?.parse().ok()?;
    if fields.next()? != "IN" {
        return None;
    }
    let rtype: RecordType = fields.next()?.parse().ok()?;
    let value = fields.next()?;
    if fields.next().is_some() {
        return None;
    }

    let label = name
        .strip_suffix('.')?
        .strip_suffix(domain)?
        .strip_suffix('.')?;
    let host = parse_host_label(label)?;

    Some(ZoneRecord {
        host,
        rtype,
        value: value.to_string(),
    })
}

/// Classify a bare host label as gateway node or segment alias.
fn parse_host_label(label: &str) -> Option<HostLabel> {
    let bytes = label.as_bytes();
    if bytes.len() != 7 || &bytes[0..2] != b"gw" {
        return None;
    }

    match bytes[4] {
        b'n' => label.parse::<GatewayId>().ok().map(HostLabel::Node),
        b's' => {
            // The alias cluster prefix is redundant with the record value;
            // only the segment number matters here.
            if !label[2..4].bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let segment: u32 = label[5..7].parse().ok()?;
            Some(HostLabel::SegmentAlias(Segment::new(segment)))
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "zone_tests.rs"]
mod zone_tests;
