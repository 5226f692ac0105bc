// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the gateway balancer.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// DNS Constants
// ============================================================================

/// Default DNS domain under which gateway and segment records live
pub const DEFAULT_DOMAIN: &str = "gw.freifunk-stuttgart.de";

/// Default DNS server asked for the zone transfer
pub const DEFAULT_DNS_SERVER: &str = "dns1.lihas.de";

/// TTL written into every rendered zone-update directive (5 minutes)
pub const DIRECTIVE_TTL_SECS: u32 = 300;

/// Segment number reserved for non-production use; its alias records are
/// ignored when deriving the DNS-active set
pub const RESERVED_SEGMENT: u32 = 99;

// ============================================================================
// Peer Status Constants
// ============================================================================

/// First three octets of the backbone network; the last octet is derived
/// from the gateway id
pub const BACKBONE_NET_PREFIX: &str = "10.191.255";

/// HTTP path under which every gateway publishes its status document
pub const STATUS_PATH: &str = "/data/gwstatus.json";

/// Status document version this implementation understands
pub const STATUS_VERSION: &str = "1";

/// Per-peer HTTP fetch timeout; a peer slower than this counts as unreachable
pub const STATUS_FETCH_TIMEOUT_SECS: u64 = 1;

/// Upper bound on concurrent peer status fetches
pub const MAX_CONCURRENT_FETCHES: usize = 8;

// ============================================================================
// Decision Defaults
// ============================================================================

/// Default number of gateways to keep DNS-active per segment
pub const DEFAULT_DESIRED_GW_PER_SEGMENT: usize = 2;

/// Default maximum age of a peer status document before it is rejected
/// as stale (15 minutes)
pub const DEFAULT_MAX_AGE_SECS: i64 = 900;

/// Default total number of traffic segments
pub const DEFAULT_SEGMENT_COUNT: u32 = 32;
