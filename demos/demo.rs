// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

use pake_engine::rand_core::OsRng;
use pake_engine::{
    required_output_size, CipherSuite, Direction, PakeInputs, PakeOperation, Password, Role,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    for suite in CipherSuite::all_supported() {
        println!("{:?}", suite);

        let mut client = PakeOperation::new();
        client
            .setup(
                suite,
                PakeInputs::new(Role::Client, Password::new(b"password"))
                    .with_user_id(b"alice")
                    .with_peer_id(b"bob"),
            )
            .expect("Error with client setup()");

        let mut server = PakeOperation::new();
        server
            .setup(
                suite,
                PakeInputs::new(Role::Server, Password::new(b"password"))
                    .with_user_id(b"bob")
                    .with_peer_id(b"alice"),
            )
            .expect("Error with server setup()");

        while let Some((direction, step)) = client.next_step() {
            let (sender, receiver, name) = match direction {
                Direction::Output => (&mut client, &mut server, "client"),
                Direction::Input => (&mut server, &mut client, "server"),
            };
            let mut buf = vec![0u8; required_output_size(suite.algorithm, suite.primitive, step.kind)];
            let len = sender
                .output(step, &mut buf, &mut OsRng)
                .expect("Error with output()");
            println!(
                "  {} {} ({} bytes): {}",
                name,
                step,
                len,
                hex::encode(&buf[..len])
            );
            receiver
                .input(step, &buf[..len])
                .expect("Error with input()");
        }

        let mut client_key = [0u8; 64];
        let client_len = client
            .get_implicit_key(&mut client_key)
            .expect("Error with client get_implicit_key()");
        let mut server_key = [0u8; 64];
        let server_len = server
            .get_implicit_key(&mut server_key)
            .expect("Error with server get_implicit_key()");

        println!(
            "  client key ({} bytes): {}",
            client_len,
            hex::encode(&client_key[..client_len])
        );
        println!(
            "  server key ({} bytes): {}",
            server_len,
            hex::encode(&server_key[..server_len])
        );
        assert_eq!(client_key[..client_len], server_key[..server_len]);
    }
}
