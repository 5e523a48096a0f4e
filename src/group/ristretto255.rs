// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::traits::Identity;
use curve25519_dalek::Scalar;
use zeroize::Zeroize;

use super::Group;
use crate::errors::PakeError;
use crate::secret::SecretBytes;

/// The Ristretto255 group, using the `curve25519-dalek` crate
#[derive(Debug, Clone, Copy)]
pub struct Ristretto255;

impl Group for Ristretto255 {
    type Scalar = Scalar;
    type Element = RistrettoPoint;

    const ELEMENT_LEN: usize = 32;
    const SCALAR_LEN: usize = 32;
    // Wide reduction keeps the bias negligible
    const SAMPLE_LEN: usize = 64;

    fn generator() -> Self::Element {
        RISTRETTO_BASEPOINT_POINT
    }

    fn identity() -> Self::Element {
        RistrettoPoint::identity()
    }

    fn mul(element: &Self::Element, scalar: &Self::Scalar) -> Self::Element {
        element * scalar
    }

    fn serialize_element(element: &Self::Element, out: &mut [u8]) -> Result<(), PakeError> {
        if out.len() != Self::ELEMENT_LEN {
            return Err(PakeError::CorruptionDetected);
        }
        out.copy_from_slice(element.compress().as_bytes());
        Ok(())
    }

    fn deserialize_element(bytes: &[u8]) -> Result<Self::Element, PakeError> {
        if bytes.len() != Self::ELEMENT_LEN {
            return Err(PakeError::InvalidArgument("element has the wrong length"));
        }
        CompressedRistretto::from_slice(bytes)
            .ok()
            .and_then(|compressed| compressed.decompress())
            .filter(|point| point != &RistrettoPoint::identity())
            .ok_or(PakeError::InvalidArgument("element is not a valid non-identity encoding"))
    }

    fn serialize_scalar(scalar: &Self::Scalar, out: &mut [u8]) -> Result<(), PakeError> {
        if out.len() != Self::SCALAR_LEN {
            return Err(PakeError::CorruptionDetected);
        }
        let mut bytes = scalar.to_bytes();
        out.copy_from_slice(&bytes);
        bytes.zeroize();
        Ok(())
    }

    fn deserialize_scalar(bytes: &[u8]) -> Result<Self::Scalar, PakeError> {
        let mut arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| PakeError::InvalidArgument("scalar has the wrong length"))?;
        let scalar: Option<Scalar> = Scalar::from_canonical_bytes(arr).into();
        arr.zeroize();
        scalar.ok_or(PakeError::InvalidArgument("scalar is not reduced"))
    }

    fn scalar_from_sample(sample: &[u8]) -> Option<Self::Scalar> {
        let mut wide: [u8; 64] = sample.try_into().ok()?;
        let scalar = Scalar::from_bytes_mod_order_wide(&wide);
        wide.zeroize();
        Some(scalar)
    }

    fn shared_secret(element: &Self::Element) -> Result<SecretBytes, PakeError> {
        if element == &RistrettoPoint::identity() {
            return Err(PakeError::InvalidArgument("shared element is the identity"));
        }
        SecretBytes::try_from_slice(element.compress().as_bytes())
    }
}
