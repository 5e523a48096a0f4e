// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

//! The per-role step schedule and the cursor that enforces it

use crate::errors::PakeError;
use crate::step::{Direction, Role, Step, StepKind};
use crate::suite::Algorithm;

static PROOF_TRIPLE: [StepKind; 3] = [StepKind::KeyShare, StepKind::ZkPublic, StepKind::ZkProof];
static CONFIRM_ONLY: [StepKind; 1] = [StepKind::Confirm];

/// Steps of one round, in wire order. Both directions of a round carry the same steps.
fn round_steps(round: u8) -> impl Iterator<Item = Step> {
    let (indices, kinds): (u8, &'static [StepKind]) = match round {
        1 => (2, &PROOF_TRIPLE[..]),
        2 => (1, &PROOF_TRIPLE[..]),
        _ => (1, &CONFIRM_ONLY[..]),
    };
    (0..indices).flat_map(move |index| kinds.iter().map(move |&kind| Step::new(kind, round, index)))
}

/// The client emits first in every round, the server consumes first
fn round_directions(role: Role) -> [Direction; 2] {
    match role {
        Role::Client => [Direction::Output, Direction::Input],
        Role::Server => [Direction::Input, Direction::Output],
    }
}

#[derive(Debug)]
pub(crate) struct Sequencer {
    schedule: Vec<(Direction, Step)>,
    cursor: usize,
}

impl Sequencer {
    pub(crate) fn new(algorithm: Algorithm, role: Role) -> Result<Self, PakeError> {
        let mut schedule = Vec::new();
        for round in 1..=algorithm.rounds() {
            let len = round_steps(round).count();
            schedule.try_reserve(2 * len)?;
            for direction in round_directions(role) {
                schedule.extend(round_steps(round).map(|step| (direction, step)));
            }
        }

        Ok(Self {
            schedule,
            cursor: 0,
        })
    }

    /// The next legal call, or `None` once every step has been completed
    pub(crate) fn expected(&self) -> Option<(Direction, Step)> {
        self.schedule.get(self.cursor).copied()
    }

    pub(crate) fn check(&self, direction: Direction, step: Step) -> Result<(), PakeError> {
        match self.expected() {
            Some(expected) if expected == (direction, step) => Ok(()),
            expected => Err(PakeError::OutOfOrder {
                expected,
                requested: (direction, step),
            }),
        }
    }

    pub(crate) fn advance(&mut self) {
        if self.cursor < self.schedule.len() {
            self.cursor += 1;
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.schedule.len()
    }

    pub(crate) fn position(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_schedule_shape() {
        let sequencer = Sequencer::new(Algorithm::Jpake, Role::Client).unwrap();
        // 6 out + 6 in for round 1, 3 out + 3 in for round 2
        assert_eq!(sequencer.len(), 18);
        assert_eq!(
            sequencer.expected(),
            Some((Direction::Output, Step::new(StepKind::KeyShare, 1, 0)))
        );
        assert_eq!(
            sequencer.schedule[3],
            (Direction::Output, Step::new(StepKind::KeyShare, 1, 1))
        );
        assert_eq!(
            sequencer.schedule[6],
            (Direction::Input, Step::new(StepKind::KeyShare, 1, 0))
        );
        assert_eq!(
            sequencer.schedule[12],
            (Direction::Output, Step::new(StepKind::KeyShare, 2, 0))
        );
    }

    #[test]
    fn test_roles_are_mirrored() {
        let client = Sequencer::new(Algorithm::JpakeConfirmed, Role::Client).unwrap();
        let server = Sequencer::new(Algorithm::JpakeConfirmed, Role::Server).unwrap();
        assert_eq!(client.len(), 20);
        assert_eq!(client.len(), server.len());
        for ((client_dir, client_step), (server_dir, server_step)) in
            client.schedule.iter().zip(server.schedule.iter())
        {
            assert_eq!(client_step, server_step);
            assert_ne!(client_dir, server_dir);
        }
        assert_eq!(
            server.schedule.last(),
            Some(&(Direction::Output, Step::new(StepKind::Confirm, 3, 0)))
        );
    }

    #[test]
    fn test_check_and_advance() {
        let mut sequencer = Sequencer::new(Algorithm::Jpake, Role::Server).unwrap();
        let first = Step::new(StepKind::KeyShare, 1, 0);
        assert!(sequencer.check(Direction::Output, first).is_err());
        assert!(sequencer
            .check(Direction::Input, Step::new(StepKind::KeyShare, 1, 1))
            .is_err());
        sequencer.check(Direction::Input, first).unwrap();
        sequencer.advance();
        assert_eq!(sequencer.position(), 1);

        while sequencer.position() < sequencer.len() {
            sequencer.advance();
        }
        assert_eq!(sequencer.position(), sequencer.len());
        sequencer.advance();
        assert_eq!(sequencer.position(), sequencer.len());
        assert_eq!(
            sequencer.check(Direction::Input, first),
            Err(PakeError::OutOfOrder {
                expected: None,
                requested: (Direction::Input, first),
            })
        );
    }
}
