// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # gwbalancer - DNS load balancing for redundant mesh gateways
//!
//! Each gateway in the fleet can serve any traffic segment, but only a
//! bounded number of gateways should be published in DNS per segment. Every
//! gateway runs this balancer periodically and independently decides, from
//! the peers' self-reported preference scores and a fresh zone transfer,
//! whether it must add itself to or remove itself from DNS for each segment.
//! The outcome is a batch of nsupdate directives.
//!
//! ## Modules
//!
//! - [`zone`] - zone transfer parsing and the per-cycle DNS snapshot
//! - [`collector`] - peer discovery and concurrent status fetching
//! - [`validator`] - staleness and DNS-consistency checks on peer reports
//! - [`engine`] - the best-N selection and add/remove diffing
//! - [`render`] - nsupdate directive rendering
//! - [`cycle`] - one full decision cycle wired together
//!
//! ## Example
//!
//! ```rust
//! use gwbalancer::engine::DecisionEngine;
//! use gwbalancer::gateway::{GatewayId, Segment};
//! use gwbalancer::status::{SegmentReport, SegmentStatus};
//!
//! let mut status = SegmentStatus::new();
//! let segment = Segment::new(1);
//! status.insert(
//!     segment,
//!     "gw07n01".parse::<GatewayId>().unwrap(),
//!     SegmentReport { preference: 50, dnsactive: 1 },
//! );
//! status.insert(
//!     segment,
//!     "gw09n02".parse::<GatewayId>().unwrap(),
//!     SegmentReport { preference: 80, dnsactive: 0 },
//! );
//!
//! let engine = DecisionEngine::new(2);
//! let actions = engine.decide(&status);
//! assert_eq!(actions.len(), 1); // add gw09n02
//! ```

pub mod collector;
pub mod constants;
pub mod context;
pub mod cycle;
pub mod engine;
pub mod errors;
pub mod gateway;
pub mod mesh;
pub mod render;
pub mod status;
pub mod validator;
pub mod zone;
