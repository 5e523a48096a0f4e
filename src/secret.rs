// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

use core::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::PakeError;

/// A heap buffer holding secret bytes, wiped when dropped or cleared.
///
/// Allocation is fallible so that a shortfall surfaces as
/// [`PakeError::InsufficientMemory`] instead of aborting the process.
#[derive(Default, Zeroize, ZeroizeOnDrop)]
pub(crate) struct SecretBytes(Vec<u8>);

impl SecretBytes {
    pub(crate) fn try_from_slice(data: &[u8]) -> Result<Self, PakeError> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(data.len())?;
        buf.extend_from_slice(data);
        Ok(Self(buf))
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overwrite the contents with zeroes and release them
    pub(crate) fn clear(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes([REDACTED; {}])", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_empties_buffer() {
        let mut secret = SecretBytes::try_from_slice(b"ephemeral").unwrap();
        assert_eq!(secret.as_slice(), b"ephemeral");
        secret.clear();
        assert!(secret.is_empty());
    }

    #[test]
    fn test_debug_is_redacted() {
        let secret = SecretBytes::try_from_slice(&[0xAA; 4]).unwrap();
        assert_eq!(format!("{:?}", secret), "SecretBytes([REDACTED; 4])");
    }
}
