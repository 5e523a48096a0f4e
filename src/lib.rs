// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

//! A step-driven engine for the J-PAKE password authenticated key exchange
//!
//! ⚠️ **Warning**: This implementation has not been audited. Use at your own risk!
//!
//! # Overview
//!
//! J-PAKE is a balanced PAKE between two parties: a client and a server. Each
//! party holds the same low-entropy password. After exchanging a fixed
//! sequence of group elements and zero-knowledge proofs, both parties hold a
//! high-entropy shared key. If the passwords differ, the keys are
//! (computationally) uncorrelated, and an eavesdropper or active attacker
//! gets one online guess per exchange.
//!
//! Unlike message-oriented APIs, this crate exposes the exchange as a sequence
//! of individual *steps*. Each step is a single value (a group element, a
//! scalar, or a confirmation tag) that one party writes with
//! [`PakeOperation::output`] and the other reads with
//! [`PakeOperation::input`]. How steps are framed and transported is left to
//! the caller.
//!
//! # Setup
//!
//! Both parties first agree on a [`CipherSuite`]: the algorithm, the prime
//! order group, and the hash function. The supported combinations are:
//!
//! | group        | hash    | element | scalar |
//! |--------------|---------|---------|--------|
//! | P-256        | SHA-256 | 65      | 32     |
//! | P-384        | SHA-384 | 97      | 48     |
//! | Ristretto255 | SHA-512 | 32      | 32     |
//!
//! each under both [`Algorithm::Jpake`] (implicit key authentication) and
//! [`Algorithm::JpakeConfirmed`] (one extra round of key confirmation tags).
//!
//! Each party then creates a [`PakeOperation`] and configures it with its
//! [`PakeInputs`]:
//!
//! ```
//! use pake_engine::{CipherSuite, PakeInputs, PakeOperation, Password, Role};
//!
//! let mut client = PakeOperation::new();
//! client
//!     .setup(
//!         CipherSuite::default(),
//!         PakeInputs::new(Role::Client, Password::new(b"password")),
//!     )
//!     .expect("Error with setup()");
//! ```
//!
//! Without explicit identities the role names `client` and `server` are used.
//! Identities set with [`PakeInputs::with_user_id`] and
//! [`PakeInputs::with_peer_id`] are bound into every proof, so the two parties
//! must use mirrored values.
//!
//! # Protocol Execution
//!
//! The exchange has two rounds (three with confirmation). In every round the
//! client emits its values first and the server consumes them first. Within
//! a round, each proof is sent as three steps: the key share, the proof
//! commitment and the proof response. [`PakeOperation::next_step`] reports
//! what the operation expects next, which makes it easy to drive an exchange
//! generically:
//!
//! ```
//! # use pake_engine::{CipherSuite, PakeInputs, PakeOperation, Password, Role};
//! use pake_engine::{required_output_size, Direction};
//! use rand_core::OsRng;
//!
//! let suite = CipherSuite::default();
//! let mut client = PakeOperation::new();
//! client.setup(suite, PakeInputs::new(Role::Client, Password::new(b"password")))
//!     .expect("Error with setup()");
//! let mut server = PakeOperation::new();
//! server.setup(suite, PakeInputs::new(Role::Server, Password::new(b"password")))
//!     .expect("Error with setup()");
//!
//! let mut buf = [0u8; 128];
//! while let Some((direction, step)) = client.next_step() {
//!     let (sender, receiver) = match direction {
//!         Direction::Output => (&mut client, &mut server),
//!         Direction::Input => (&mut server, &mut client),
//!     };
//!     let needed = required_output_size(suite.algorithm, suite.primitive, step.kind);
//!     let len = sender.output(step, &mut buf[..needed], &mut OsRng)
//!         .expect("Error with output()");
//!     receiver.input(step, &buf[..len]).expect("Error with input()");
//! }
//! # let mut client_key = [0u8; 32];
//! # let mut server_key = [0u8; 32];
//! # client.get_implicit_key(&mut client_key).unwrap();
//! # server.get_implicit_key(&mut server_key).unwrap();
//! # assert_eq!(client_key, server_key);
//! ```
//!
//! Calling a step out of order fails with [`PakeError::OutOfOrder`] without
//! touching any secret.
//!
//! # Finishing
//!
//! Once every step has completed the operation is in [`State::KeyReady`] and
//! [`PakeOperation::get_implicit_key`] copies the key out, exactly once:
//!
//! ```
//! # use pake_engine::{CipherSuite, PakeInputs, PakeOperation, Password, Role};
//! # use pake_engine::Direction;
//! # use rand_core::OsRng;
//! # let suite = CipherSuite::default();
//! # let mut client = PakeOperation::new();
//! # client.setup(suite, PakeInputs::new(Role::Client, Password::new(b"password"))).unwrap();
//! # let mut server = PakeOperation::new();
//! # server.setup(suite, PakeInputs::new(Role::Server, Password::new(b"password"))).unwrap();
//! # let mut buf = [0u8; 128];
//! # while let Some((direction, step)) = client.next_step() {
//! #     let (sender, receiver) = match direction {
//! #         Direction::Output => (&mut client, &mut server),
//! #         Direction::Input => (&mut server, &mut client),
//! #     };
//! #     let len = sender.output(step, &mut buf, &mut OsRng).unwrap();
//! #     receiver.input(step, &buf[..len]).unwrap();
//! # }
//! use pake_engine::State;
//!
//! let mut client_key = [0u8; 32];
//! let len = client.get_implicit_key(&mut client_key)
//!     .expect("Error with get_implicit_key()");
//! assert_eq!(len, 32);
//! assert_eq!(client.state(), State::Finished);
//!
//! let mut server_key = [0u8; 32];
//! server.get_implicit_key(&mut server_key)
//!     .expect("Error with get_implicit_key()");
//!
//! // The key is only implicitly authenticated: with mismatched passwords the
//! // calls above still succeed, but the keys differ.
//! assert_eq!(client_key, server_key);
//! ```
//!
//! # Errors and erasure
//!
//! Every error other than a resource shortage ([`ErrorClass::Resource`]:
//! a buffer too small, memory or entropy exhausted) is fatal. The operation
//! moves to [`State::Aborted`], its secrets are erased, and every later call
//! fails with [`PakeError::BadState`]. [`PakeOperation::abort`] does the same
//! on request and may be called any number of times. Secrets are also erased
//! when an operation is dropped.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(not(test), deny(unsafe_code))]
#![warn(clippy::doc_markdown, missing_docs, rustdoc::all)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod errors;
mod group;
mod inputs;
mod operation;
mod round;
mod secret;
mod sequencer;
mod step;
mod suite;
mod transcript;
mod zkp;

pub use errors::{ErrorClass, PakeError};
pub use inputs::{KeyUsage, PakeInputs, Password, PasswordAttributes};
pub use operation::{PakeOperation, State};
pub use rand_core;
pub use step::{Direction, Role, Step, StepKind};
pub use suite::{
    required_input_size, required_output_size, validate, Algorithm, CipherSuite, EccFamily,
    HashAlgorithm, Primitive, SuiteInfo,
};

#[cfg(test)]
mod tests;
