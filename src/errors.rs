// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Fatal error taxonomy for one decision cycle.
//!
//! Everything in here aborts the cycle before any directive is emitted.
//! Peer-local trouble (unreachable peer, 404/503, empty body) and rejected
//! status documents are deliberately *not* errors; they degrade that one peer
//! to "no data" and are logged where they happen.
//!
//! Each variant maps to a distinct process exit code so operational tooling
//! can tell "nothing to do" (exit 0) apart from "could not decide safely".

use thiserror::Error;

use crate::gateway::{GatewayId, Segment};

/// A condition that makes the whole decision cycle unsafe to act on.
#[derive(Error, Debug)]
pub enum CycleError {
    /// A peer answered with HTTP success but a body that is not valid JSON.
    ///
    /// Unlike an unreachable peer this indicates a protocol mismatch between
    /// balancer and status producer, so it is surfaced instead of swallowed.
    #[error("gateway '{gateway}' returned an unparsable status document: {reason}")]
    ProtocolViolation {
        /// The peer whose response could not be parsed
        gateway: GatewayId,
        /// Parser diagnostic for the log
        reason: String,
    },

    /// A segment alias record points at an address no gateway node owns.
    ///
    /// The zone data is corrupted or incomplete; deciding on top of it would
    /// mean guessing which gateway the alias belongs to.
    #[error("segment {segment} alias points at {address}, which maps to no gateway node")]
    UnmappedAliasAddress {
        /// Segment whose alias record is broken
        segment: Segment,
        /// The unmapped record value
        address: String,
    },

    /// The validated self-reports claim more active gateways than DNS shows.
    ///
    /// Emitting adds or removes on top of that drift would amplify it, so the
    /// cycle refuses to act.
    #[error("segment {segment}: self-reported active set is not a subset of the DNS-active set")]
    ActiveSetDrift {
        /// Segment where the sets diverge
        segment: Segment,
    },

    /// Candidate gateway discovery failed entirely.
    #[error("gateway discovery failed: {0}")]
    Discovery(String),

    /// Reading the zone transfer failed.
    #[error("zone transfer unavailable: {0}")]
    ZoneTransfer(String),

    /// The cycle exceeded its configured deadline; inputs may be incomplete.
    #[error("decision cycle exceeded its deadline")]
    Deadline,
}

impl CycleError {
    /// Process exit code for this condition.
    ///
    /// Exit 0 is reserved for a completed cycle (including "no changes
    /// needed"); 1 for usage errors; everything here is 3 or above.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            CycleError::ProtocolViolation { .. } => 3,
            CycleError::UnmappedAliasAddress { .. } => 4,
            CycleError::ActiveSetDrift { .. } => 5,
            CycleError::Discovery(_) => 6,
            CycleError::ZoneTransfer(_) => 7,
            CycleError::Deadline => 8,
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
