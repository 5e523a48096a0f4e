// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

//! The operation context driven by the caller

use core::fmt;
use rand_core::{CryptoRng, RngCore};
use tracing::{debug, warn};

use crate::errors::PakeError;
use crate::inputs::PakeInputs;
use crate::round::Engine;
use crate::sequencer::Sequencer;
use crate::step::{Direction, Role, Step};
use crate::suite::{self, CipherSuite, SuiteInfo};

/// Lifecycle of a [`PakeOperation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Created, not yet configured
    Uninitialized,
    /// Configured, no step taken yet
    SetupDone,
    /// Inside the given round
    Round(u8),
    /// Every step completed, the key can be read once
    KeyReady,
    /// The key was read and all secrets erased
    Finished,
    /// Failed or aborted, all secrets erased
    Aborted,
}

impl State {
    /// Whether no further step can ever succeed
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Finished | State::Aborted)
    }

    /// Whether the operation holds secrets
    fn is_live(self) -> bool {
        matches!(self, State::SetupDone | State::Round(_) | State::KeyReady)
    }

    fn can_transition_to(self, next: State) -> bool {
        match (self, next) {
            (_, State::Aborted) => true,
            (State::Uninitialized, State::SetupDone) => true,
            (State::SetupDone, State::Round(1)) => true,
            (State::Round(current), State::Round(next)) => current.checked_add(1) == Some(next),
            (State::Round(_), State::KeyReady) => true,
            (State::KeyReady, State::Finished) => true,
            _ => false,
        }
    }
}

/// One party's side of a single key exchange.
///
/// Created [`State::Uninitialized`], configured once with
/// [`PakeOperation::setup`], then driven step by step with
/// [`PakeOperation::output`] and [`PakeOperation::input`] until the key can be
/// read with [`PakeOperation::get_implicit_key`]. Any error that is not a
/// resource shortage aborts the operation and erases its secrets, as does
/// dropping it.
pub struct PakeOperation {
    state: State,
    suite: Option<&'static SuiteInfo>,
    role: Option<Role>,
    sequencer: Option<Sequencer>,
    engine: Option<Engine>,
}

impl Default for PakeOperation {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PakeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PakeOperation")
            .field("state", &self.state)
            .field("suite", &self.cipher_suite())
            .field("role", &self.role)
            .field("next_step", &self.next_step())
            .field(
                "progress",
                &self
                    .sequencer
                    .as_ref()
                    .map(|sequencer| (sequencer.position(), sequencer.len())),
            )
            .finish_non_exhaustive()
    }
}

impl PakeOperation {
    /// A fresh, unconfigured operation
    pub fn new() -> Self {
        Self {
            state: State::Uninitialized,
            suite: None,
            role: None,
            sequencer: None,
            engine: None,
        }
    }

    /// Bind the cipher suite and the party's inputs.
    ///
    /// The password is converted into a group scalar and the buffer holding it
    /// is erased before returning. A failed setup leaves an uninitialized
    /// operation uninitialized, so it can be configured again.
    pub fn setup(&mut self, suite: CipherSuite, inputs: PakeInputs) -> Result<(), PakeError> {
        if self.state != State::Uninitialized {
            return self.settle(Err(PakeError::BadState(self.state)));
        }

        let info = suite::validate(suite.algorithm, suite.primitive, suite.hash)?;
        if !inputs.attributes.usage.derive {
            return Err(PakeError::NotPermitted);
        }
        if inputs.password.as_bytes().is_empty() {
            return Err(PakeError::InvalidArgument("password is empty"));
        }
        if inputs.user_id() == inputs.peer_id() {
            return Err(PakeError::InvalidArgument(
                "user and peer identities must differ",
            ));
        }

        let role = inputs.role();
        let sequencer = Sequencer::new(suite.algorithm, role)?;
        let engine = Engine::new(info, &inputs)?;
        drop(inputs);

        self.transition(State::SetupDone)?;
        self.suite = Some(info);
        self.role = Some(role);
        self.sequencer = Some(sequencer);
        self.engine = Some(engine);
        debug!(?role, ?suite, "operation set up");
        Ok(())
    }

    /// Write this party's value for `step` into `out`, returning its length.
    ///
    /// `out` must hold at least [`crate::required_output_size`] bytes for the
    /// step; a shorter buffer is left untouched.
    pub fn output<R: RngCore + CryptoRng>(
        &mut self,
        step: Step,
        out: &mut [u8],
        rng: &mut R,
    ) -> Result<usize, PakeError> {
        let result = self.run_output(step, out, rng);
        self.settle(result)
    }

    fn run_output<R: RngCore + CryptoRng>(
        &mut self,
        step: Step,
        out: &mut [u8],
        rng: &mut R,
    ) -> Result<usize, PakeError> {
        let required = self.accept_step(Direction::Output, step)?;
        if out.len() < required {
            return Err(PakeError::BufferTooSmall {
                required,
                provided: out.len(),
            });
        }

        let len = self.engine_mut()?.output(step, out, rng)?;
        self.step_done(Direction::Output, step)?;
        Ok(len)
    }

    /// Consume the peer's value for `step`
    pub fn input(&mut self, step: Step, value: &[u8]) -> Result<(), PakeError> {
        let result = self.run_input(step, value);
        self.settle(result)
    }

    fn run_input(&mut self, step: Step, value: &[u8]) -> Result<(), PakeError> {
        let required = self.accept_step(Direction::Input, step)?;
        if value.len() != required {
            return Err(PakeError::InvalidArgument("input has the wrong length"));
        }

        self.engine_mut()?.input(step, value)?;
        self.step_done(Direction::Input, step)
    }

    /// Copy the shared key into `out` and erase every remaining secret.
    ///
    /// Legal exactly once, after the last step.
    pub fn get_implicit_key(&mut self, out: &mut [u8]) -> Result<usize, PakeError> {
        let result = self.run_get_implicit_key(out);
        self.settle(result)
    }

    fn run_get_implicit_key(&mut self, out: &mut [u8]) -> Result<usize, PakeError> {
        if self.state != State::KeyReady {
            return Err(PakeError::BadState(self.state));
        }
        let required = self.suite.ok_or(PakeError::CorruptionDetected)?.key_len();
        if out.len() < required {
            return Err(PakeError::BufferTooSmall {
                required,
                provided: out.len(),
            });
        }

        let len = self.engine_mut()?.take_key(out)?;
        self.transition(State::Finished)?;
        self.release();
        Ok(len)
    }

    /// Erase every secret and move to [`State::Aborted`].
    ///
    /// Legal in every state and idempotent. If the internal consistency check
    /// fails the secrets are still erased and
    /// [`PakeError::CorruptionDetected`] is returned.
    pub fn abort(&mut self) -> Result<(), PakeError> {
        let consistent = self.is_consistent();
        self.teardown();
        if consistent {
            Ok(())
        } else {
            warn!("inconsistent operation state found during abort");
            Err(PakeError::CorruptionDetected)
        }
    }

    /// The (direction, step) the operation expects next, if it is mid-exchange
    pub fn next_step(&self) -> Option<(Direction, Step)> {
        match self.state {
            State::SetupDone | State::Round(_) => self.sequencer.as_ref()?.expected(),
            _ => None,
        }
    }

    /// The current lifecycle state
    pub fn state(&self) -> State {
        self.state
    }

    /// The configured role
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// The configured cipher suite
    pub fn cipher_suite(&self) -> Option<CipherSuite> {
        self.suite.map(SuiteInfo::cipher_suite)
    }

    /// Check the state and sequencing of a step, returning its wire length
    fn accept_step(&self, direction: Direction, step: Step) -> Result<usize, PakeError> {
        match self.state {
            State::SetupDone | State::Round(_) | State::KeyReady => {}
            state => return Err(PakeError::BadState(state)),
        }
        self.sequencer
            .as_ref()
            .ok_or(PakeError::CorruptionDetected)?
            .check(direction, step)?;
        Ok(self
            .suite
            .ok_or(PakeError::CorruptionDetected)?
            .step_len(step.kind))
    }

    fn engine_mut(&mut self) -> Result<&mut Engine, PakeError> {
        self.engine.as_mut().ok_or(PakeError::CorruptionDetected)
    }

    /// Advance the cursor and move to the state of the next step
    fn step_done(&mut self, direction: Direction, step: Step) -> Result<(), PakeError> {
        let sequencer = self.sequencer.as_mut().ok_or(PakeError::CorruptionDetected)?;
        sequencer.advance();
        let next = match sequencer.expected() {
            Some((_, next)) => State::Round(next.round),
            None => State::KeyReady,
        };
        debug!(role = ?self.role, ?direction, %step, "step completed");

        if next == State::KeyReady && !self.engine_mut()?.key_ready() {
            return Err(PakeError::CorruptionDetected);
        }
        if next != self.state {
            self.transition(next)?;
        }
        Ok(())
    }

    fn transition(&mut self, next: State) -> Result<(), PakeError> {
        if !self.state.can_transition_to(next) {
            return Err(PakeError::CorruptionDetected);
        }
        debug!(from = ?self.state, to = ?next, "state transition");
        self.state = next;
        Ok(())
    }

    /// Abort a live operation on any error that is not a resource shortage
    fn settle<T>(&mut self, result: Result<T, PakeError>) -> Result<T, PakeError> {
        if let Err(err) = &result {
            if !err.is_retryable() && self.state.is_live() {
                warn!(role = ?self.role, state = ?self.state, error = %err, "aborting operation");
                self.teardown();
            }
        }
        result
    }

    fn is_consistent(&self) -> bool {
        let holds_secrets = self.engine.is_some() || self.sequencer.is_some();
        if !self.state.is_live() {
            return !holds_secrets;
        }
        self.suite.is_some()
            && self.role.is_some()
            && self.sequencer.is_some()
            && self.engine.as_ref().map_or(false, Engine::is_consistent)
    }

    /// Erase and drop the ephemeral storage
    fn release(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.wipe();
        }
        self.engine = None;
        self.sequencer = None;
    }

    fn teardown(&mut self) {
        self.release();
        if self.state != State::Aborted {
            debug!(from = ?self.state, to = ?State::Aborted, "state transition");
            self.state = State::Aborted;
        }
    }
}

impl Drop for PakeOperation {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::Password;

    #[test]
    fn test_transitions() {
        assert!(State::Uninitialized.can_transition_to(State::SetupDone));
        assert!(State::SetupDone.can_transition_to(State::Round(1)));
        assert!(State::Round(1).can_transition_to(State::Round(2)));
        assert!(State::Round(2).can_transition_to(State::KeyReady));
        assert!(State::KeyReady.can_transition_to(State::Finished));

        assert!(!State::SetupDone.can_transition_to(State::Round(2)));
        assert!(!State::Round(2).can_transition_to(State::Round(1)));
        assert!(!State::Round(u8::MAX).can_transition_to(State::Round(0)));
        assert!(!State::Finished.can_transition_to(State::KeyReady));
        assert!(!State::Aborted.can_transition_to(State::SetupDone));

        for state in [
            State::Uninitialized,
            State::SetupDone,
            State::Round(1),
            State::KeyReady,
            State::Finished,
            State::Aborted,
        ] {
            assert!(state.can_transition_to(State::Aborted));
        }
    }

    #[test]
    fn test_abort_detects_inconsistent_state() {
        let mut operation = PakeOperation::new();
        operation
            .setup(
                CipherSuite::default(),
                PakeInputs::new(Role::Client, Password::new(b"password")),
            )
            .unwrap();

        // A terminal tag while secrets are still held
        operation.state = State::Finished;
        assert_eq!(operation.abort(), Err(PakeError::CorruptionDetected));
        assert_eq!(operation.state(), State::Aborted);
        assert!(operation.engine.is_none());
        assert!(operation.sequencer.is_none());

        assert_eq!(operation.abort(), Ok(()));
    }

    #[test]
    fn test_setup_then_abort_releases_everything() {
        for suite in CipherSuite::all_supported() {
            let mut operation = PakeOperation::new();
            operation
                .setup(
                    suite,
                    PakeInputs::new(Role::Server, Password::new(b"password")),
                )
                .unwrap();
            assert!(operation.engine.is_some());
            assert_eq!(operation.abort(), Ok(()));
            assert!(operation.engine.is_none());
            assert_eq!(operation.next_step(), None);
        }
    }

    #[test]
    fn test_debug_does_not_leak_password() {
        let mut operation = PakeOperation::new();
        operation
            .setup(
                CipherSuite::default(),
                PakeInputs::new(Role::Client, Password::new(b"hunter2")),
            )
            .unwrap();
        let debug = format!("{:?}", operation);
        assert!(debug.contains("SetupDone"));
        assert!(!debug.contains("hunter2"));
    }
}
