// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

//! Cipher suites and the static compatibility table

use crate::errors::PakeError;
use crate::step::StepKind;

/// The PAKE algorithm driven by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Two-round, dual-generator J-PAKE yielding an implicitly confirmed key
    Jpake,
    /// J-PAKE followed by a round of transcript-bound confirmation tags
    JpakeConfirmed,
}

impl Algorithm {
    /// Number of rounds in a complete exchange
    pub fn rounds(self) -> u8 {
        match self {
            Algorithm::Jpake => 2,
            Algorithm::JpakeConfirmed => 3,
        }
    }
}

/// Families of short Weierstrass curves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EccFamily {
    /// NIST random curves (P-256, P-384, ...)
    SecpR1,
    /// Koblitz curves
    SecpK1,
    /// Brainpool random curves
    BrainpoolPR1,
}

/// The group the exchange runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// An elliptic curve of the given family and bit size
    Ecc {
        /// Curve family
        family: EccFamily,
        /// Size of the curve's base field in bits
        bits: u16,
    },
    /// The Ristretto255 prime-order group
    Ristretto255,
}

impl Primitive {
    /// NIST P-256
    pub const P256: Primitive = Primitive::Ecc {
        family: EccFamily::SecpR1,
        bits: 256,
    };
    /// NIST P-384
    pub const P384: Primitive = Primitive::Ecc {
        family: EccFamily::SecpR1,
        bits: 384,
    };
}

/// The hash function used for proof challenges, the transcript and key derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl HashAlgorithm {
    /// Digest length in bytes
    pub fn output_len(self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }
}

/// Identifies the group implementation backing a table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GroupId {
    P256,
    P384,
    Ristretto255,
}

/// The (algorithm, primitive, hash) triple configuring one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CipherSuite {
    /// The PAKE algorithm
    pub algorithm: Algorithm,
    /// The group
    pub primitive: Primitive,
    /// The hash function
    pub hash: HashAlgorithm,
}

impl CipherSuite {
    /// Create a new [`CipherSuite`]; compatibility is checked at setup
    pub const fn new(algorithm: Algorithm, primitive: Primitive, hash: HashAlgorithm) -> Self {
        Self {
            algorithm,
            primitive,
            hash,
        }
    }

    /// Whether the triple appears in the compatibility table
    pub fn is_supported(&self) -> bool {
        validate(self.algorithm, self.primitive, self.hash).is_ok()
    }

    /// Every supported cipher suite, in table order
    pub fn all_supported() -> impl Iterator<Item = CipherSuite> {
        SUPPORTED_SUITES.iter().map(SuiteInfo::cipher_suite)
    }
}

/// The default [`CipherSuite`]: J-PAKE over P-256 with SHA-256
impl Default for CipherSuite {
    fn default() -> Self {
        Self::new(Algorithm::Jpake, Primitive::P256, HashAlgorithm::Sha256)
    }
}

/// Metadata of one row of the compatibility table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuiteInfo {
    algorithm: Algorithm,
    primitive: Primitive,
    hash: HashAlgorithm,
    pub(crate) group: GroupId,
    element_len: usize,
    scalar_len: usize,
}

impl SuiteInfo {
    /// The suite this row describes
    pub fn cipher_suite(&self) -> CipherSuite {
        CipherSuite::new(self.algorithm, self.primitive, self.hash)
    }

    /// Encoded length of a group element
    pub fn element_len(&self) -> usize {
        self.element_len
    }

    /// Encoded length of a scalar
    pub fn scalar_len(&self) -> usize {
        self.scalar_len
    }

    /// Length of the implicit key
    pub fn key_len(&self) -> usize {
        self.hash.output_len()
    }

    /// Wire length of a step of the given kind, or 0 if the algorithm has no such step
    pub fn step_len(&self, kind: StepKind) -> usize {
        match kind {
            StepKind::KeyShare | StepKind::ZkPublic => self.element_len,
            StepKind::ZkProof => self.scalar_len,
            StepKind::Confirm => match self.algorithm {
                Algorithm::Jpake => 0,
                Algorithm::JpakeConfirmed => self.hash.output_len(),
            },
        }
    }
}

const fn entry(
    algorithm: Algorithm,
    primitive: Primitive,
    hash: HashAlgorithm,
    group: GroupId,
    element_len: usize,
    scalar_len: usize,
) -> SuiteInfo {
    SuiteInfo {
        algorithm,
        primitive,
        hash,
        group,
        element_len,
        scalar_len,
    }
}

// Each (algorithm, primitive) pair appears at most once.
static SUPPORTED_SUITES: [SuiteInfo; 6] = [
    entry(Algorithm::Jpake, Primitive::P256, HashAlgorithm::Sha256, GroupId::P256, 65, 32),
    entry(Algorithm::Jpake, Primitive::P384, HashAlgorithm::Sha384, GroupId::P384, 97, 48),
    entry(
        Algorithm::Jpake,
        Primitive::Ristretto255,
        HashAlgorithm::Sha512,
        GroupId::Ristretto255,
        32,
        32,
    ),
    entry(
        Algorithm::JpakeConfirmed,
        Primitive::P256,
        HashAlgorithm::Sha256,
        GroupId::P256,
        65,
        32,
    ),
    entry(
        Algorithm::JpakeConfirmed,
        Primitive::P384,
        HashAlgorithm::Sha384,
        GroupId::P384,
        97,
        48,
    ),
    entry(
        Algorithm::JpakeConfirmed,
        Primitive::Ristretto255,
        HashAlgorithm::Sha512,
        GroupId::Ristretto255,
        32,
        32,
    ),
];

fn lookup(algorithm: Algorithm, primitive: Primitive) -> Option<&'static SuiteInfo> {
    SUPPORTED_SUITES
        .iter()
        .find(|info| info.algorithm == algorithm && info.primitive == primitive)
}

/// Check that the triple is supported and mutually compatible
pub fn validate(
    algorithm: Algorithm,
    primitive: Primitive,
    hash: HashAlgorithm,
) -> Result<&'static SuiteInfo, PakeError> {
    match lookup(algorithm, primitive) {
        Some(info) if info.hash == hash => Ok(info),
        _ => Err(PakeError::NotSupported),
    }
}

/// Size of the buffer [`output`](crate::PakeOperation::output) needs for a step.
///
/// Returns 0 when the algorithm and primitive are not a supported pair, or
/// when the algorithm has no step of this kind.
pub fn required_output_size(algorithm: Algorithm, primitive: Primitive, kind: StepKind) -> usize {
    lookup(algorithm, primitive).map_or(0, |info| info.step_len(kind))
}

/// Exact length [`input`](crate::PakeOperation::input) accepts for a step.
///
/// Every step has a fixed-length encoding, so this equals
/// [`required_output_size`].
pub fn required_input_size(algorithm: Algorithm, primitive: Primitive, kind: StepKind) -> usize {
    required_output_size(algorithm, primitive, kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_table() {
        for suite in CipherSuite::all_supported() {
            assert!(suite.is_supported());
        }
        assert_eq!(CipherSuite::all_supported().count(), 6);
        assert!(CipherSuite::default().is_supported());
    }

    #[test]
    fn test_validate_rejects_incompatible_hash() {
        assert_eq!(
            validate(Algorithm::Jpake, Primitive::P256, HashAlgorithm::Sha512),
            Err(PakeError::NotSupported)
        );
        assert_eq!(
            validate(Algorithm::Jpake, Primitive::Ristretto255, HashAlgorithm::Sha256),
            Err(PakeError::NotSupported)
        );
    }

    #[test]
    fn test_validate_rejects_unknown_primitive() {
        let brainpool = Primitive::Ecc {
            family: EccFamily::BrainpoolPR1,
            bits: 256,
        };
        let p521 = Primitive::Ecc {
            family: EccFamily::SecpR1,
            bits: 521,
        };
        for primitive in [brainpool, p521] {
            assert_eq!(
                validate(Algorithm::Jpake, primitive, HashAlgorithm::Sha256),
                Err(PakeError::NotSupported)
            );
            assert_eq!(
                required_output_size(Algorithm::Jpake, primitive, StepKind::KeyShare),
                0
            );
        }
    }

    #[test]
    fn test_required_output_size() {
        use StepKind::*;
        let p256 = Primitive::P256;
        assert_eq!(required_output_size(Algorithm::Jpake, p256, KeyShare), 65);
        assert_eq!(required_output_size(Algorithm::Jpake, p256, ZkPublic), 65);
        assert_eq!(required_output_size(Algorithm::Jpake, p256, ZkProof), 32);
        assert_eq!(required_output_size(Algorithm::Jpake, p256, Confirm), 0);
        assert_eq!(
            required_output_size(Algorithm::JpakeConfirmed, p256, Confirm),
            32
        );
        assert_eq!(
            required_output_size(Algorithm::Jpake, Primitive::P384, KeyShare),
            97
        );
        assert_eq!(
            required_input_size(Algorithm::JpakeConfirmed, Primitive::Ristretto255, Confirm),
            64
        );
    }
}
