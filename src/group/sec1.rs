// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

//! NIST short Weierstrass curves with SEC1 uncompressed encodings

use p256::elliptic_curve::ff::PrimeField;
use p256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use zeroize::Zeroize;

use super::Group;
use crate::errors::PakeError;
use crate::secret::SecretBytes;

/// SEC1 tag of an uncompressed point
const UNCOMPRESSED_TAG: u8 = 0x04;

macro_rules! impl_sec1_group {
    ($group:ident, $curve:ident, $name:literal, $element_len:expr, $scalar_len:expr) => {
        #[doc = concat!("The ", $name, " group, using the `", stringify!($curve), "` crate")]
        #[derive(Debug, Clone, Copy)]
        pub struct $group;

        impl Group for $group {
            type Scalar = $curve::Scalar;
            type Element = $curve::ProjectivePoint;

            const ELEMENT_LEN: usize = $element_len;
            const SCALAR_LEN: usize = $scalar_len;
            const SAMPLE_LEN: usize = $scalar_len;

            fn generator() -> Self::Element {
                $curve::ProjectivePoint::GENERATOR
            }

            fn identity() -> Self::Element {
                $curve::ProjectivePoint::IDENTITY
            }

            fn mul(element: &Self::Element, scalar: &Self::Scalar) -> Self::Element {
                *element * *scalar
            }

            fn serialize_element(element: &Self::Element, out: &mut [u8]) -> Result<(), PakeError> {
                let encoded = $curve::AffinePoint::from(*element).to_encoded_point(false);
                let bytes = encoded.as_bytes();
                if bytes.len() != Self::ELEMENT_LEN || out.len() != Self::ELEMENT_LEN {
                    return Err(PakeError::CorruptionDetected);
                }
                out.copy_from_slice(bytes);
                Ok(())
            }

            fn deserialize_element(bytes: &[u8]) -> Result<Self::Element, PakeError> {
                if bytes.len() != Self::ELEMENT_LEN || bytes[0] != UNCOMPRESSED_TAG {
                    return Err(PakeError::InvalidArgument("element is not an uncompressed point"));
                }
                let encoded = $curve::EncodedPoint::from_bytes(bytes)
                    .map_err(|_| PakeError::InvalidArgument("malformed element encoding"))?;
                let affine: Option<$curve::AffinePoint> =
                    $curve::AffinePoint::from_encoded_point(&encoded).into();
                affine
                    .map($curve::ProjectivePoint::from)
                    .ok_or(PakeError::InvalidArgument("element is not on the curve"))
            }

            fn serialize_scalar(scalar: &Self::Scalar, out: &mut [u8]) -> Result<(), PakeError> {
                if out.len() != Self::SCALAR_LEN {
                    return Err(PakeError::CorruptionDetected);
                }
                let mut repr = scalar.to_repr();
                out.copy_from_slice(&repr);
                repr[..].zeroize();
                Ok(())
            }

            fn deserialize_scalar(bytes: &[u8]) -> Result<Self::Scalar, PakeError> {
                if bytes.len() != Self::SCALAR_LEN {
                    return Err(PakeError::InvalidArgument("scalar has the wrong length"));
                }
                let mut repr = $curve::FieldBytes::default();
                repr.copy_from_slice(bytes);
                let scalar: Option<$curve::Scalar> = $curve::Scalar::from_repr(repr).into();
                repr[..].zeroize();
                scalar.ok_or(PakeError::InvalidArgument("scalar is not reduced"))
            }

            fn scalar_from_sample(sample: &[u8]) -> Option<Self::Scalar> {
                Self::deserialize_scalar(sample).ok()
            }

            fn shared_secret(element: &Self::Element) -> Result<SecretBytes, PakeError> {
                let encoded = $curve::AffinePoint::from(*element).to_encoded_point(false);
                let x = encoded
                    .x()
                    .ok_or(PakeError::InvalidArgument("shared element is the identity"))?;
                SecretBytes::try_from_slice(x)
            }
        }
    };
}

impl_sec1_group!(P256, p256, "NIST P-256", 65, 32);
impl_sec1_group!(P384, p384, "NIST P-384", 97, 48);
