// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! One complete decision cycle, wired together.
//!
//! The sequence is strictly: zone snapshot, peer discovery, status
//! collection, validation, decision, rendering. Everything after collection
//! is pure computation over immutable inputs, so a cycle that fails anywhere
//! produces no output at all.

use chrono::Utc;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::collector::{
    peer_endpoints, Discovery, MeshDiscovery, OriginatorSource, StatusCollector, ZoneDiscovery,
};
use crate::context::CycleContext;
use crate::engine::{Action, DecisionEngine};
use crate::errors::CycleError;
use crate::gateway::GatewayId;
use crate::render::UpdateRenderer;
use crate::status::StatusDocument;
use crate::validator::{build_segment_status, check_active_consistency};
use crate::zone::ZoneSnapshot;

/// Everything one cycle decided.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    /// Actions across all gateways, segments ascending
    pub actions: Vec<Action>,
    /// The target gateway's subset of `actions`; empty when no target is
    /// configured
    pub target_actions: Vec<Action>,
    /// Rendered directive batch: the target's actions when a target is
    /// configured, otherwise the global list
    pub rendered: String,
}

/// Run a full cycle from raw zone transfer text.
///
/// Discovery strategy follows the configured identity: a gateway node asks
/// the mesh (merging in itself), anything else takes the gateway nodes the
/// zone knows about.
///
/// # Errors
///
/// Any [`CycleError`]; no directives are produced on failure.
pub async fn run_cycle(
    ctx: &CycleContext,
    zone_text: &str,
    originators: OriginatorSource,
) -> Result<CycleOutcome, CycleError> {
    let zone = ZoneSnapshot::parse(zone_text, &ctx.config.domain)?;

    let candidates = match ctx.config.local {
        Some(local) => MeshDiscovery::new(local, originators).discover().await?,
        None => ZoneDiscovery::new(&zone).discover().await?,
    };
    info!(count = candidates.len(), "candidate gateways discovered");

    let endpoints = peer_endpoints(&candidates, &ctx.config)?;
    let documents = StatusCollector::new(ctx.http.clone())
        .collect(&endpoints)
        .await?;
    debug!(responded = documents.len(), "peer status collection finished");

    decide_cycle(ctx, &zone, &documents, Utc::now().timestamp())
}

/// Validation, decision and rendering over already-fetched inputs.
///
/// Split out from [`run_cycle`] so the pure tail of the cycle can run against
/// fixture documents.
///
/// # Errors
///
/// Returns [`CycleError::ActiveSetDrift`] when the validated self-reports
/// disagree with DNS in the unsafe direction.
pub fn decide_cycle(
    ctx: &CycleContext,
    zone: &ZoneSnapshot,
    documents: &BTreeMap<GatewayId, StatusDocument>,
    now: i64,
) -> Result<CycleOutcome, CycleError> {
    let status = build_segment_status(documents, zone, &ctx.config, now);
    check_active_consistency(&status, zone)?;

    let engine = DecisionEngine::new(ctx.config.desired_gw_per_segment);
    let actions = engine.decide(&status);

    let target_actions = match ctx.config.effective_target() {
        Some(target) => DecisionEngine::actions_for(&actions, target),
        None => Vec::new(),
    };

    let renderer = UpdateRenderer::new(zone);
    let rendered = if ctx.config.effective_target().is_some() {
        renderer.render_batch(&target_actions)
    } else {
        renderer.render_batch(&actions)
    };

    info!(
        total = actions.len(),
        local = target_actions.len(),
        "cycle decided"
    );

    Ok(CycleOutcome {
        actions,
        target_actions,
        rendered,
    })
}
