// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Rendering decided actions into nsupdate directives.
//!
//! Each action becomes at most one directive per record type, using the
//! address values the zone snapshot holds for the gateway node:
//!
//! ```text
//! update add gw01s02.gw.freifunk-stuttgart.de. 300 A 88.198.230.6
//! update add gw01s02.gw.freifunk-stuttgart.de. 300 AAAA 2a01:4f8:190:5205:260:2fff:fe08:13cd
//! ```
//!
//! A gateway without a record of some type (no AAAA, say) simply yields
//! fewer lines. A batch with any directives ends with a literal `send` line;
//! an empty batch renders as a single comment so downstream tooling always
//! sees well-formed input.

use crate::constants::DIRECTIVE_TTL_SECS;
use crate::engine::{Action, ActionKind};
use crate::zone::{RecordType, ZoneSnapshot};

/// Placeholder written when a cycle decided no changes.
pub const EMPTY_BATCH_PLACEHOLDER: &str = "; no zone changes required";

/// Renders actions against one zone snapshot.
#[derive(Debug, Clone)]
pub struct UpdateRenderer<'a> {
    zone: &'a ZoneSnapshot,
}

impl<'a> UpdateRenderer<'a> {
    /// Renderer reading record values and the domain from `zone`.
    #[must_use]
    pub fn new(zone: &'a ZoneSnapshot) -> Self {
        Self { zone }
    }

    /// Directive lines for one action, one per record type the gateway has.
    #[must_use]
    pub fn render_action(&self, action: &Action) -> Vec<String> {
        let verb = match action.kind {
            ActionKind::Add => "add",
            ActionKind::Remove => "delete",
        };
        let alias = action
            .gateway
            .segment_alias(action.segment, self.zone.domain());

        RecordType::ALL
            .iter()
            .filter_map(|&rtype| {
                self.zone.record_for(action.gateway, rtype).map(|value| {
                    format!("update {verb} {alias}. {DIRECTIVE_TTL_SECS} {rtype} {value}")
                })
            })
            .collect()
    }

    /// Render a whole batch, terminated by `send` when non-empty.
    #[must_use]
    pub fn render_batch(&self, actions: &[Action]) -> String {
        let mut lines: Vec<String> = actions
            .iter()
            .flat_map(|action| self.render_action(action))
            .collect();

        if lines.is_empty() {
            lines.push(EMPTY_BATCH_PLACEHOLDER.to_string());
        } else {
            lines.push("send".to_string());
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod render_tests;
