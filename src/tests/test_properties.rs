// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

use proptest::prelude::*;

use super::{compare_keys, setup_pair, transfer_with};
use crate::{
    required_input_size, required_output_size, Algorithm, CipherSuite, Direction, HashAlgorithm,
    Primitive, State, StepKind,
};

fn suite_strategy() -> impl Strategy<Value = CipherSuite> {
    proptest::sample::select(CipherSuite::all_supported().collect::<Vec<_>>())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Flipping any bit of any exchanged value is noticed: the receiving
    /// side rejects it, or the keys (or confirmation tags) differ.
    #[test]
    fn test_any_corruption_is_detected(
        suite in suite_strategy(),
        position in 0usize..20,
        offset in 0usize..97,
        bit in 0u8..8,
    ) {
        let (mut client, mut server) = setup_pair(suite, b"password", b"password");
        let mut index = 0;
        let mut rejected = false;

        while let Some((direction, step)) = client.next_step() {
            let corrupt = index == position;
            let tamper = |value: &mut [u8]| {
                if corrupt {
                    value[offset % value.len()] ^= 1 << bit;
                }
            };
            let result = match direction {
                Direction::Output => transfer_with(suite, &mut client, &mut server, step, tamper),
                Direction::Input => transfer_with(suite, &mut server, &mut client, step, tamper),
            };
            if result.is_err() {
                prop_assert!(corrupt);
                rejected = true;
                break;
            }
            index += 1;
        }

        if rejected {
            prop_assert!(
                client.state() == State::Aborted || server.state() == State::Aborted
            );
        } else if position < index {
            // A corruption that slipped through must still break agreement
            prop_assert!(compare_keys(&mut client, &mut server).is_err());
        } else {
            prop_assert!(compare_keys(&mut client, &mut server).is_ok());
        }
    }

    #[test]
    fn test_sizes_are_symmetric(
        suite in suite_strategy(),
        kind in proptest::sample::select(vec![
            StepKind::KeyShare,
            StepKind::ZkPublic,
            StepKind::ZkProof,
            StepKind::Confirm,
        ]),
    ) {
        let output = required_output_size(suite.algorithm, suite.primitive, kind);
        prop_assert_eq!(output, required_input_size(suite.algorithm, suite.primitive, kind));
        prop_assert_eq!(
            output == 0,
            kind == StepKind::Confirm && suite.algorithm == Algorithm::Jpake
        );
    }
}

#[test]
fn test_unsupported_sizes_are_zero() {
    assert_eq!(
        required_output_size(
            Algorithm::Jpake,
            Primitive::Ecc {
                family: crate::EccFamily::BrainpoolPR1,
                bits: 256
            },
            StepKind::KeyShare
        ),
        0
    );
    assert!(!CipherSuite::new(Algorithm::Jpake, Primitive::P384, HashAlgorithm::Sha256)
        .is_supported());
}
