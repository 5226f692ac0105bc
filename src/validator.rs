// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status document validation against the zone snapshot.
//!
//! A peer's document is accepted or rejected as a whole. Two checks apply:
//!
//! - staleness: the producer timestamp must be within the configured age
//! - consistency: every per-segment `dnsactive` claim must agree with what
//!   the zone snapshot observed, in both directions
//!
//! A rejected document simply contributes nothing this cycle; the peer is
//! reconsidered next cycle. After aggregation a global sanity check verifies
//! that nobody claims to be active for a segment where DNS disagrees.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

use crate::context::Config;
use crate::errors::CycleError;
use crate::gateway::{GatewayId, Segment};
use crate::status::{SegmentStatus, StatusDocument};
use crate::zone::ZoneSnapshot;

/// Check one peer's document for staleness and DNS consistency.
///
/// `now` is the validating host's wall clock, unix epoch seconds. Returns
/// `false` (with a warn log) on any failure; the caller drops the document.
#[must_use]
pub fn validate_document(
    gateway: GatewayId,
    document: &StatusDocument,
    zone: &ZoneSnapshot,
    max_age_secs: i64,
    now: i64,
) -> bool {
    let age = now - document.timestamp;
    if age > max_age_secs {
        warn!(%gateway, age, max_age_secs, "rejecting stale status document");
        return false;
    }

    for (key, report) in &document.segments {
        let Ok(segment) = key.parse::<Segment>() else {
            warn!(%gateway, key, "rejecting document with unparsable segment key");
            return false;
        };

        let dns_active = zone
            .active_gateways_for_segment(segment)
            .contains(&gateway);
        if report.is_dns_active() != dns_active {
            warn!(
                %gateway,
                %segment,
                claims_active = report.is_dns_active(),
                dns_active,
                "rejecting document inconsistent with DNS"
            );
            return false;
        }
    }

    true
}

/// Merge validated documents into the per-segment view.
///
/// Documents failing validation are skipped entirely. Reports for segments
/// outside `1..=segment_count` are ignored with a debug log; the keys were
/// already proven parsable by validation.
#[must_use]
pub fn build_segment_status(
    documents: &BTreeMap<GatewayId, StatusDocument>,
    zone: &ZoneSnapshot,
    config: &Config,
    now: i64,
) -> SegmentStatus {
    let mut status = SegmentStatus::new();

    for (&gateway, document) in documents {
        if !validate_document(gateway, document, zone, config.max_age_secs, now) {
            continue;
        }

        for (key, report) in &document.segments {
            let Ok(segment) = key.parse::<Segment>() else {
                continue;
            };
            if segment.number() == 0 || segment.number() > config.segment_count {
                debug!(%gateway, %segment, "ignoring report for out-of-range segment");
                continue;
            }
            status.insert(segment, gateway, *report);
        }
    }

    status
}

/// Post-aggregation sanity check of self-reports against DNS.
///
/// For every segment the set of gateways claiming to be active must be a
/// subset of the DNS-observed active set. DNS-active gateways that did not
/// contribute a validated report are normal (peer down, report stale) and
/// only logged.
///
/// # Errors
///
/// Returns [`CycleError::ActiveSetDrift`] on the first segment where a
/// gateway claims activity DNS does not show; acting on that drift could
/// amplify it, so the cycle must not emit actions.
pub fn check_active_consistency(
    status: &SegmentStatus,
    zone: &ZoneSnapshot,
) -> Result<(), CycleError> {
    for (segment, reports) in status.iter() {
        let self_active: BTreeSet<GatewayId> = reports
            .iter()
            .filter(|(_, report)| report.is_dns_active())
            .map(|(&gateway, _)| gateway)
            .collect();
        let dns_active = zone.active_gateways_for_segment(segment);

        if !self_active.is_subset(&dns_active) {
            return Err(CycleError::ActiveSetDrift { segment });
        }

        for gateway in dns_active.difference(&self_active) {
            info!(%gateway, %segment, "DNS-active gateway contributed no validated report");
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod validator_tests;
