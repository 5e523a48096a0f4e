// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

use thiserror::Error;

use crate::operation::State;
use crate::step::{Direction, Step};

/// The library's error type
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PakeError {
    /// The cipher suite, or one of its components, is not supported
    #[error("unsupported cipher suite")]
    NotSupported,
    /// The password key does not permit key derivation
    #[error("password key usage does not permit derivation")]
    NotPermitted,
    /// An input is malformed or out of range for the configured primitive
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// The operation is not in a state that allows the call
    #[error("operation is in state {0:?}")]
    BadState(State),
    /// The step does not match the next one the sequencer expects
    #[error("step {requested:?} is out of order, expected {expected:?}")]
    OutOfOrder {
        /// The step the sequencer expected next, if any remain
        expected: Option<(Direction, Step)>,
        /// The step that was supplied by the caller
        requested: (Direction, Step),
    },
    /// Verification of a zero-knowledge proof or confirmation tag failed
    #[error("verification failed")]
    InvalidSignature,
    /// The caller's buffer cannot hold the output
    #[error("buffer too small: {required} bytes required, {provided} provided")]
    BufferTooSmall {
        /// Bytes needed for this step
        required: usize,
        /// Bytes offered by the caller
        provided: usize,
    },
    /// Ephemeral storage could not be allocated
    #[error("insufficient memory")]
    InsufficientMemory,
    /// The random provider failed
    #[error("insufficient entropy")]
    InsufficientEntropy,
    /// An internal invariant was violated
    #[error("corruption detected")]
    CorruptionDetected,
}

/// Broad families of [`PakeError`], used to decide whether a failure is fatal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The suite or password key cannot be used; reconfigure before retrying
    Configuration,
    /// Wrong step or wrong state; fatal to the handshake
    Sequencing,
    /// A peer value failed validation; fatal to the operation
    Validation,
    /// A buffer, memory or entropy shortfall; the call may be retried
    Resource,
    /// An internal self-check tripped
    Corruption,
}

impl PakeError {
    /// The [`ErrorClass`] this error belongs to
    pub fn class(&self) -> ErrorClass {
        match self {
            PakeError::NotSupported | PakeError::NotPermitted => ErrorClass::Configuration,
            PakeError::BadState(_) | PakeError::OutOfOrder { .. } => ErrorClass::Sequencing,
            PakeError::InvalidArgument(_) | PakeError::InvalidSignature => ErrorClass::Validation,
            PakeError::BufferTooSmall { .. }
            | PakeError::InsufficientMemory
            | PakeError::InsufficientEntropy => ErrorClass::Resource,
            PakeError::CorruptionDetected => ErrorClass::Corruption,
        }
    }

    /// Whether the operation survives this error and the call may be retried
    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Resource
    }
}

impl From<std::collections::TryReserveError> for PakeError {
    fn from(_: std::collections::TryReserveError) -> Self {
        PakeError::InsufficientMemory
    }
}

impl From<rand_core::Error> for PakeError {
    fn from(_: rand_core::Error) -> Self {
        PakeError::InsufficientEntropy
    }
}
