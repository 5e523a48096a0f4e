// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

//! Roles, directions and the steps exchanged between the two parties

use core::fmt;

/// The two symmetric roles of the exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Emits first in every round
    Client,
    /// Consumes first in every round
    Server,
}

impl Role {
    /// The opposite role
    pub fn peer(self) -> Self {
        match self {
            Role::Client => Role::Server,
            Role::Server => Role::Client,
        }
    }

    /// The identity used in proofs when the caller supplies none
    pub(crate) fn default_id(self) -> &'static [u8] {
        match self {
            Role::Client => b"client",
            Role::Server => b"server",
        }
    }
}

/// Whether a step is produced by [`output`](crate::PakeOperation::output) or
/// consumed by [`input`](crate::PakeOperation::input)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Produced locally and sent to the peer
    Output,
    /// Received from the peer
    Input,
}

/// What a step carries on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    /// A public group element `X = G·x`
    KeyShare,
    /// The commitment `V = G·v` of a Schnorr proof
    ZkPublic,
    /// The response `r = v - x·h` of a Schnorr proof
    ZkProof,
    /// A transcript-bound key confirmation tag
    Confirm,
}

/// One exchanged unit, identified by its kind, round and sub-index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step {
    /// What the step carries
    pub kind: StepKind,
    /// Round number, starting at 1
    pub round: u8,
    /// Sub-index within the round; round 1 has two generator commitments
    pub index: u8,
}

impl Step {
    /// Create a new [`Step`]
    pub const fn new(kind: StepKind, round: u8, index: u8) -> Self {
        Self { kind, round, index }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}[round {}, index {}]", self.kind, self.round, self.index)
    }
}
