// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

//! Length-prefixed encodings and the running transcript hash

use digest::Digest;

use crate::step::{Role, Step, StepKind};

const DSI_TRANSCRIPT: &[u8] = b"JPAKE_Transcript";

/*
Defined here: <https://www.ietf.org/archive/id/draft-irtf-cfrg-cpace-12.html#appendix-A.1.1>

def prepend_len(data):
"prepend LEB128 encoding of length"
length = len(data)
length_encoded = b""
while True:
    if length < 128:
        length_encoded += bytes([length])
    else:
        length_encoded += bytes([(length & 0x7f) + 0x80])
    length = int(length >> 7)
    if length == 0:
        break;
return length_encoded + data
*/
pub(crate) fn prepend_len(data: &[u8]) -> Vec<u8> {
    let mut length = data.len();
    let mut length_encoded = Vec::new();
    loop {
        if length < 128 {
            length_encoded.push(length as u8);
        } else {
            length_encoded.push((length & 0x7f) as u8 + 0x80);
        }
        length >>= 7;
        if length == 0 {
            break;
        }
    }
    length_encoded.extend_from_slice(data);
    length_encoded
}

/*
Defined here: <https://www.ietf.org/archive/id/draft-irtf-cfrg-cpace-12.html#appendix-A.1.3>
  def lv_cat(*args):
      result = b""
      for arg in args:
          result += prepend_len(arg)
      return result
*/
pub(crate) fn lv_cat(args: &[&[u8]]) -> Vec<u8> {
    let mut result = Vec::new();
    for arg in args {
        result.extend_from_slice(&prepend_len(arg));
    }
    result
}

fn kind_tag(kind: StepKind) -> u8 {
    match kind {
        StepKind::KeyShare => 1,
        StepKind::ZkPublic => 2,
        StepKind::ZkProof => 3,
        StepKind::Confirm => 4,
    }
}

/// Running hash of every value exchanged.
///
/// Each role's values go into their own lane, so both parties end with the
/// same digest no matter in which order they emitted and received.
#[derive(Clone)]
pub(crate) struct Transcript<H: Digest + Clone> {
    client: H,
    server: H,
}

impl<H: Digest + Clone> Transcript<H> {
    pub(crate) fn new(client_id: &[u8], server_id: &[u8]) -> Self {
        let mut client = H::new();
        client.update(lv_cat(&[DSI_TRANSCRIPT, b"client", client_id]));
        let mut server = H::new();
        server.update(lv_cat(&[DSI_TRANSCRIPT, b"server", server_id]));
        Self { client, server }
    }

    /// Fold one value sent by `origin` into its lane
    pub(crate) fn absorb(&mut self, origin: Role, step: Step, value: &[u8]) {
        let lane = match origin {
            Role::Client => &mut self.client,
            Role::Server => &mut self.server,
        };
        lane.update([kind_tag(step.kind), step.round, step.index]);
        lane.update(prepend_len(value));
    }

    /// The digest of both lanes, client first
    pub(crate) fn digest(&self) -> Vec<u8> {
        let client = self.client.clone().finalize();
        let server = self.server.clone().finalize();
        let mut hasher = H::new();
        hasher.update(lv_cat(&[&client, &server]));
        hasher.finalize().to_vec()
    }
}
