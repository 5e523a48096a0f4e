// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

use core::fmt;
use zeroize::Zeroizing;

use crate::step::Role;

/// The shared password. Wiped on drop and never cloned.
pub struct Password(Zeroizing<Vec<u8>>);

impl Password {
    /// Create a new [`Password`] by copying `password`
    pub fn new(password: &[u8]) -> Self {
        Self(Zeroizing::new(password.to_vec()))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Password {
    fn from(password: Vec<u8>) -> Self {
        Self(Zeroizing::new(password))
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

/// Usage flags carried by the password key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyUsage {
    /// The key may be used as input to a key derivation
    pub derive: bool,
    /// The key material may be exported
    pub export: bool,
}

impl KeyUsage {
    /// Derivation only
    pub const DERIVE: KeyUsage = KeyUsage {
        derive: true,
        export: false,
    };
}

impl Default for KeyUsage {
    fn default() -> Self {
        Self::DERIVE
    }
}

/// Attributes of the key holding the password
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PasswordAttributes {
    /// How the password key may be used
    pub usage: KeyUsage,
}

/// The input to a PAKE operation
#[derive(Debug)]
pub struct PakeInputs {
    pub(crate) role: Role,
    pub(crate) password: Password,
    pub(crate) user_id: Option<Vec<u8>>,
    pub(crate) peer_id: Option<Vec<u8>>,
    pub(crate) attributes: PasswordAttributes,
}

impl PakeInputs {
    /// Create a new [`PakeInputs`] object for `role`.
    ///
    /// Without explicit identities the role names `client` and `server` are
    /// bound into the proofs.
    pub fn new(role: Role, password: Password) -> Self {
        Self {
            role,
            password,
            user_id: None,
            peer_id: None,
            attributes: PasswordAttributes::default(),
        }
    }

    /// Set the local party's identity
    pub fn with_user_id(mut self, user_id: &[u8]) -> Self {
        self.user_id = Some(user_id.to_vec());
        self
    }

    /// Set the expected identity of the peer
    pub fn with_peer_id(mut self, peer_id: &[u8]) -> Self {
        self.peer_id = Some(peer_id.to_vec());
        self
    }

    /// Set the attributes of the password key
    pub fn with_attributes(mut self, attributes: PasswordAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// The role these inputs are for
    pub fn role(&self) -> Role {
        self.role
    }

    pub(crate) fn user_id(&self) -> &[u8] {
        self.user_id
            .as_deref()
            .unwrap_or_else(|| self.role.default_id())
    }

    pub(crate) fn peer_id(&self) -> &[u8] {
        self.peer_id
            .as_deref()
            .unwrap_or_else(|| self.role.peer().default_id())
    }
}
