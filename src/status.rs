// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Peer status document types and the aggregated per-segment view.
//!
//! Every gateway publishes a small JSON document describing, per segment, how
//! willing it is to take traffic and whether it believes it is currently
//! published in DNS:
//!
//! ```json
//! {
//!   "version": "1",
//!   "timestamp": 1693526400,
//!   "segments": {
//!     "1": { "preference": 50, "dnsactive": 1 },
//!     "2": { "preference": 50, "dnsactive": 0 }
//!   }
//! }
//! ```
//!
//! [`StatusDocument`] is the wire shape; [`SegmentStatus`] is the validated,
//! merged `segment -> gateway -> report` view the decision engine consumes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::gateway::{GatewayId, Segment};

/// One gateway's self-report for one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentReport {
    /// Willingness to accept traffic; conventionally 0..=100 but the engine
    /// makes no assumption about the range
    pub preference: i64,

    /// 1 when the gateway believes it is published in DNS for this segment.
    /// The status generator omits the field until the balancer has run once,
    /// so absent means 0.
    #[serde(default)]
    pub dnsactive: u8,
}

impl SegmentReport {
    /// Whether the gateway claims to be DNS-active for this segment.
    #[must_use]
    pub fn is_dns_active(&self) -> bool {
        self.dnsactive != 0
    }
}

/// The status document a gateway serves at `/data/gwstatus.json`.
///
/// Segment keys stay strings here because that is what JSON object keys are;
/// they are parsed into [`Segment`] during validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDocument {
    /// Producer document format version
    pub version: String,

    /// Producer wall-clock at generation time, unix epoch seconds
    pub timestamp: i64,

    /// Per-segment self-reports, keyed by decimal segment number
    #[serde(default)]
    pub segments: BTreeMap<String, SegmentReport>,
}

/// Validated reports merged across all peers, keyed segment-first.
///
/// This is the only input the decision engine sees; it is immutable for the
/// rest of the cycle once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentStatus {
    map: BTreeMap<Segment, BTreeMap<GatewayId, SegmentReport>>,
}

impl SegmentStatus {
    /// Empty aggregate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `gateway`'s report for `segment`.
    pub fn insert(&mut self, segment: Segment, gateway: GatewayId, report: SegmentReport) {
        self.map.entry(segment).or_default().insert(gateway, report);
    }

    /// All reports for one segment, if any gateway reported it.
    #[must_use]
    pub fn segment(&self, segment: Segment) -> Option<&BTreeMap<GatewayId, SegmentReport>> {
        self.map.get(&segment)
    }

    /// Iterate segments in ascending order.
    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (Segment, &BTreeMap<GatewayId, SegmentReport>)> + '_ {
        self.map.iter().map(|(segment, reports)| (*segment, reports))
    }

    /// Number of segments with at least one report.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when no gateway contributed any report.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod status_tests;
