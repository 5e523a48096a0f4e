// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

use rand_core::{CryptoRng, OsRng, RngCore};

use crate::{
    required_output_size, CipherSuite, Direction, PakeError, PakeInputs, PakeOperation, Password,
    Role, Step,
};

mod test_properties;

/// A random source that always fails
pub(crate) struct FailingRng;

impl RngCore for FailingRng {
    fn next_u32(&mut self) -> u32 {
        0
    }

    fn next_u64(&mut self) -> u64 {
        0
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        dest.fill(0)
    }

    fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand_core::Error> {
        Err(rand_core::Error::new("entropy source unavailable"))
    }
}

impl CryptoRng for FailingRng {}

pub(crate) fn setup_operation(suite: CipherSuite, inputs: PakeInputs) -> PakeOperation {
    let mut operation = PakeOperation::new();
    operation
        .setup(suite, inputs)
        .expect("Error with setup()");
    operation
}

pub(crate) fn setup_pair(
    suite: CipherSuite,
    client_password: &[u8],
    server_password: &[u8],
) -> (PakeOperation, PakeOperation) {
    (
        setup_operation(
            suite,
            PakeInputs::new(Role::Client, Password::new(client_password)),
        ),
        setup_operation(
            suite,
            PakeInputs::new(Role::Server, Password::new(server_password)),
        ),
    )
}

/// Send one step from `sender` to `receiver`, passing the bytes through `tamper`
pub(crate) fn transfer_with(
    suite: CipherSuite,
    sender: &mut PakeOperation,
    receiver: &mut PakeOperation,
    step: Step,
    tamper: impl FnOnce(&mut [u8]),
) -> Result<(), PakeError> {
    let mut buf = vec![0u8; required_output_size(suite.algorithm, suite.primitive, step.kind)];
    let len = sender.output(step, &mut buf, &mut OsRng)?;
    tamper(&mut buf[..len]);
    receiver.input(step, &buf[..len])
}

/// Drive the exchange from the client's point of view until `stop` returns
/// true for the next step or the client has nothing left to do
pub(crate) fn exchange_until(
    suite: CipherSuite,
    client: &mut PakeOperation,
    server: &mut PakeOperation,
    mut stop: impl FnMut(Direction, Step) -> bool,
) -> Result<(), PakeError> {
    while let Some((direction, step)) = client.next_step() {
        if stop(direction, step) {
            break;
        }
        match direction {
            Direction::Output => transfer_with(suite, client, server, step, |_| {})?,
            Direction::Input => transfer_with(suite, server, client, step, |_| {})?,
        }
    }
    Ok(())
}

pub(crate) fn exchange(
    suite: CipherSuite,
    client: &mut PakeOperation,
    server: &mut PakeOperation,
) -> Result<(), PakeError> {
    exchange_until(suite, client, server, |_, _| false)
}

/// Read both keys and fail unless they match
pub(crate) fn compare_keys(
    client: &mut PakeOperation,
    server: &mut PakeOperation,
) -> Result<(), PakeError> {
    let mut client_key = [0u8; 64];
    let mut server_key = [0u8; 64];
    let client_len = client.get_implicit_key(&mut client_key)?;
    let server_len = server.get_implicit_key(&mut server_key)?;
    match client_key[..client_len] == server_key[..server_len] {
        true => Ok(()),
        false => Err(PakeError::InvalidSignature),
    }
}
