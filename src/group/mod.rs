// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

//! Includes the [`Group`] trait and the prime-order groups the engine runs in

mod ristretto255;
mod sec1;

use core::fmt::Debug;
use core::ops::{Add, Mul, Sub};
use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, Zeroizing};

use crate::errors::PakeError;
use crate::secret::SecretBytes;
pub use ristretto255::Ristretto255;
pub use sec1::{P256, P384};

/// Bounded rejection sampling, so a broken generator cannot spin forever
const MAX_SAMPLING_ATTEMPTS: usize = 30;

/// Widest candidate any group draws when sampling a scalar
const MAX_SAMPLE_LEN: usize = 64;

/// A prime-order group with fixed-length encodings
pub trait Group {
    /// Integers modulo the group order
    type Scalar: Copy
        + Debug
        + Zeroize
        + PartialEq
        + From<u64>
        + Add<Output = Self::Scalar>
        + Sub<Output = Self::Scalar>
        + Mul<Output = Self::Scalar>;
    /// Group elements
    type Element: Copy + Debug + PartialEq + Add<Output = Self::Element> + Sub<Output = Self::Element>;

    /// Length of an encoded element
    const ELEMENT_LEN: usize;
    /// Length of an encoded scalar
    const SCALAR_LEN: usize;
    /// Number of random bytes drawn per sampling attempt
    const SAMPLE_LEN: usize;

    /// The fixed base point
    fn generator() -> Self::Element;

    /// The neutral element
    fn identity() -> Self::Element;

    /// Scalar multiplication
    fn mul(element: &Self::Element, scalar: &Self::Scalar) -> Self::Element;

    /// Encode `element` into `out`, which must be exactly [`Self::ELEMENT_LEN`] bytes
    fn serialize_element(element: &Self::Element, out: &mut [u8]) -> Result<(), PakeError>;

    /// Decode an element, rejecting the identity and anything outside the group
    fn deserialize_element(bytes: &[u8]) -> Result<Self::Element, PakeError>;

    /// Encode `scalar` into `out`, which must be exactly [`Self::SCALAR_LEN`] bytes
    fn serialize_scalar(scalar: &Self::Scalar, out: &mut [u8]) -> Result<(), PakeError>;

    /// Decode a canonical scalar
    fn deserialize_scalar(bytes: &[u8]) -> Result<Self::Scalar, PakeError>;

    /// Map [`Self::SAMPLE_LEN`] uniformly random bytes to a scalar, or `None` to resample
    fn scalar_from_sample(sample: &[u8]) -> Option<Self::Scalar>;

    /// The bytes of a shared Diffie-Hellman element fed into key derivation
    fn shared_secret(element: &Self::Element) -> Result<SecretBytes, PakeError>;

    /// Whether `scalar` is zero
    fn is_zero(scalar: &Self::Scalar) -> bool {
        *scalar == Self::Scalar::from(0)
    }

    /// Interpret `bytes` as a big-endian integer and reduce it modulo the group order
    fn reduce(bytes: &[u8]) -> Self::Scalar {
        let radix = Self::Scalar::from(256);
        bytes.iter().fold(Self::Scalar::from(0), |acc, &byte| {
            acc * radix + Self::Scalar::from(u64::from(byte))
        })
    }

    /// Draw a uniformly random non-zero scalar from `rng`.
    ///
    /// A failing generator is reported as [`PakeError::InsufficientEntropy`]
    /// and never called again within the same draw.
    fn random_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self::Scalar, PakeError> {
        let mut sample = Zeroizing::new([0u8; MAX_SAMPLE_LEN]);
        let sample = sample
            .get_mut(..Self::SAMPLE_LEN)
            .ok_or(PakeError::CorruptionDetected)?;
        for _ in 0..MAX_SAMPLING_ATTEMPTS {
            rng.try_fill_bytes(sample)?;
            match Self::scalar_from_sample(sample) {
                Some(scalar) if !Self::is_zero(&scalar) => return Ok(scalar),
                _ => continue,
            }
        }
        Err(PakeError::InsufficientEntropy)
    }
}

/// Encode `element` into a fresh fixed-length array
pub(crate) fn element_bytes<G: Group>(element: &G::Element) -> Result<Vec<u8>, PakeError> {
    let mut out = vec![0u8; G::ELEMENT_LEN];
    G::serialize_element(element, &mut out)?;
    Ok(out)
}

/// Encode `scalar` into a zeroizing buffer
pub(crate) fn scalar_secret<G: Group>(scalar: &G::Scalar) -> Result<SecretBytes, PakeError> {
    let mut out = Zeroizing::new(vec![0u8; G::SCALAR_LEN]);
    G::serialize_scalar(scalar, &mut out)?;
    SecretBytes::try_from_slice(&out)
}

/// Decode a scalar previously stored with [`scalar_secret`]
pub(crate) fn secret_scalar<G: Group>(secret: &SecretBytes) -> Result<G::Scalar, PakeError> {
    G::deserialize_scalar(secret.as_slice()).map_err(|_| PakeError::CorruptionDetected)
}
