// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

//! Non-interactive Schnorr proofs of knowledge of a discrete logarithm.
//!
//! A proof that the prover knows `x` with `X = G·x` is the pair `(V, r)`
//! where `V = G·v` for a fresh nonce `v`, `h = H(G, V, X, id)` and
//! `r = v - x·h`. The verifier accepts when `V == G·r + X·h`.

use digest::Digest;
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::errors::PakeError;
use crate::group::{element_bytes, Group};
use crate::transcript::lv_cat;

const DSI_ZKP: &[u8] = b"JPAKE_ZKP";

/// The Fiat-Shamir challenge, bound to the prover's identity
fn challenge<G: Group, H: Digest>(
    generator: &G::Element,
    commitment: &G::Element,
    public: &G::Element,
    prover_id: &[u8],
) -> Result<G::Scalar, PakeError> {
    let input = lv_cat(&[
        DSI_ZKP,
        &element_bytes::<G>(generator)?,
        &element_bytes::<G>(commitment)?,
        &element_bytes::<G>(public)?,
        prover_id,
    ]);
    Ok(G::reduce(&H::digest(input)))
}

/// Draw the nonce `v` and return it with the commitment `V = G·v`
pub(crate) fn commit<G: Group, R: RngCore + CryptoRng>(
    generator: &G::Element,
    rng: &mut R,
) -> Result<(Zeroizing<G::Scalar>, G::Element), PakeError> {
    let nonce = Zeroizing::new(G::random_scalar(rng)?);
    let commitment = G::mul(generator, &nonce);
    Ok((nonce, commitment))
}

/// Compute the response `r = v - x·h`
pub(crate) fn respond<G: Group, H: Digest>(
    generator: &G::Element,
    commitment: &G::Element,
    public: &G::Element,
    secret: &G::Scalar,
    nonce: &G::Scalar,
    prover_id: &[u8],
) -> Result<G::Scalar, PakeError> {
    let h = challenge::<G, H>(generator, commitment, public, prover_id)?;
    Ok(*nonce - *secret * h)
}

/// Check that `response` proves knowledge of the discrete log of `public`
pub(crate) fn verify<G: Group, H: Digest>(
    generator: &G::Element,
    commitment: &G::Element,
    public: &G::Element,
    response: &G::Scalar,
    prover_id: &[u8],
) -> Result<(), PakeError> {
    let h = challenge::<G, H>(generator, commitment, public, prover_id)?;
    let expected = G::mul(generator, response) + G::mul(public, &h);
    if &expected == commitment {
        Ok(())
    } else {
        Err(PakeError::InvalidSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{Ristretto255, P256, P384};
    use rand_core::OsRng;
    use sha2::{Sha256, Sha384, Sha512};

    fn check_proof<G: Group, H: Digest>() {
        let generator = G::mul(&G::generator(), &G::random_scalar(&mut OsRng).unwrap());
        let secret = G::random_scalar(&mut OsRng).unwrap();
        let public = G::mul(&generator, &secret);

        let (nonce, commitment) = commit::<G, _>(&generator, &mut OsRng).unwrap();
        let response =
            respond::<G, H>(&generator, &commitment, &public, &secret, &nonce, b"alice").unwrap();

        verify::<G, H>(&generator, &commitment, &public, &response, b"alice").unwrap();

        // Bound to the prover identity
        assert_eq!(
            verify::<G, H>(&generator, &commitment, &public, &response, b"mallory"),
            Err(PakeError::InvalidSignature)
        );
        // Bound to the generator
        assert_eq!(
            verify::<G, H>(&G::generator(), &commitment, &public, &response, b"alice"),
            Err(PakeError::InvalidSignature)
        );
        // A different response fails
        let tampered = response + G::Scalar::from(1);
        assert_eq!(
            verify::<G, H>(&generator, &commitment, &public, &tampered, b"alice"),
            Err(PakeError::InvalidSignature)
        );
        // A proof for one secret does not transfer to another public value
        let other = G::mul(&generator, &G::random_scalar(&mut OsRng).unwrap());
        assert_eq!(
            verify::<G, H>(&generator, &commitment, &other, &response, b"alice"),
            Err(PakeError::InvalidSignature)
        );
    }

    #[test]
    fn test_schnorr_proofs() {
        check_proof::<P256, Sha256>();
        check_proof::<P384, Sha384>();
        check_proof::<Ristretto255, Sha512>();
    }
}
