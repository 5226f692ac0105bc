// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The per-segment add/remove decision.
//!
//! Pure computation over one cycle's [`SegmentStatus`]; no I/O, no state
//! between cycles. For each segment the engine ranks the reporting gateways
//! by preference, keeps the best `desired_count`, and diffs that selection
//! against who is currently active:
//!
//! - gateways in the selection but not yet active are added
//! - active gateways outside the selection are removed, but only in cycles
//!   where the segment has no pending additions (additions land first; the
//!   removal completes in a later cycle)
//!
//! Ranking is deterministic: descending by `(preference, gateway id)`, so
//! among equal preferences the higher id wins a slot; the final selection is
//! then re-sorted ascending by id. Both steps are load-bearing for stable
//! output across runs and hosts.

use tracing::debug;

use crate::gateway::{GatewayId, Segment};
use crate::status::SegmentStatus;

/// What to do with one gateway in one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionKind {
    /// Publish the gateway's records for the segment alias
    Add,
    /// Withdraw the gateway's records from the segment alias
    Remove,
}

/// One decided DNS change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Action {
    /// Add or remove
    pub kind: ActionKind,
    /// Gateway whose records change
    pub gateway: GatewayId,
    /// Segment whose alias changes
    pub segment: Segment,
}

/// Stateless decision engine for one cycle.
#[derive(Debug, Clone, Copy)]
pub struct DecisionEngine {
    desired_count: usize,
}

impl DecisionEngine {
    /// Engine keeping `desired_count` gateways active per segment.
    #[must_use]
    pub fn new(desired_count: usize) -> Self {
        Self { desired_count }
    }

    /// All gateways with a report for `segment`, ascending by id.
    #[must_use]
    pub fn all_gateways(&self, status: &SegmentStatus, segment: Segment) -> Vec<GatewayId> {
        status
            .segment(segment)
            .map(|reports| reports.keys().copied().collect())
            .unwrap_or_default()
    }

    /// The `desired_count` highest-preference gateways for `segment`,
    /// returned ascending by id.
    ///
    /// Yields fewer than `desired_count` entries only when fewer gateways
    /// reported for the segment.
    #[must_use]
    pub fn best_gateways(&self, status: &SegmentStatus, segment: Segment) -> Vec<GatewayId> {
        let Some(reports) = status.segment(segment) else {
            return Vec::new();
        };

        // Rank descending by (preference, id): equal preference resolves in
        // favor of the higher id.
        let mut ranked: Vec<(i64, GatewayId)> = reports
            .iter()
            .map(|(&gateway, report)| (report.preference, gateway))
            .collect();
        ranked.sort_by(|a, b| b.cmp(a));

        let mut best: Vec<GatewayId> = ranked
            .into_iter()
            .take(self.desired_count)
            .map(|(_, gateway)| gateway)
            .collect();
        best.sort();
        best
    }

    /// Decide every segment's actions for this cycle, segments ascending,
    /// gateways ascending within a segment.
    #[must_use]
    pub fn decide(&self, status: &SegmentStatus) -> Vec<Action> {
        let mut actions = Vec::new();

        for (segment, reports) in status.iter() {
            let best = self.best_gateways(status, segment);

            let to_add: Vec<GatewayId> = best
                .iter()
                .copied()
                .filter(|gateway| !reports[gateway].is_dns_active())
                .collect();

            let to_remove: Vec<GatewayId> = reports
                .iter()
                .filter(|(_, report)| report.is_dns_active())
                .map(|(&gateway, _)| gateway)
                .filter(|gateway| !best.contains(gateway))
                .collect();

            if to_add.is_empty() {
                for gateway in to_remove {
                    actions.push(Action {
                        kind: ActionKind::Remove,
                        gateway,
                        segment,
                    });
                }
            } else {
                // Additions first; removing in the same cycle would flap the
                // segment through fewer-than-desired gateways.
                if !to_remove.is_empty() {
                    debug!(
                        %segment,
                        pending_removals = to_remove.len(),
                        "suppressing removals while additions are pending"
                    );
                }
                for gateway in to_add {
                    actions.push(Action {
                        kind: ActionKind::Add,
                        gateway,
                        segment,
                    });
                }
            }
        }

        actions
    }

    /// The subset of `actions` concerning `target`, in original order.
    #[must_use]
    pub fn actions_for(actions: &[Action], target: GatewayId) -> Vec<Action> {
        actions
            .iter()
            .copied()
            .filter(|action| action.gateway == target)
            .collect()
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;
