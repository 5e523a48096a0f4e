// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

//! The J-PAKE round computations.
//!
//! Round 1 publishes `X1 = G·x1` and `X2 = G·x2` with a proof of knowledge
//! for each. Round 2 publishes `A = (X1 + X1' + X2')·(x2·s)`, where primed
//! values are the peer's and `s` is the password scalar, again with a proof.
//! Both parties then arrive at `K = (X1 + X1')·x2·x2'·s` and feed it, salted
//! with the transcript digest, into HKDF. The confirmed variant adds one more
//! round in which each side sends an HMAC over the transcript.

use digest::core_api::BlockSizeUser;
use digest::Digest;
use hkdf::SimpleHkdf;
use hmac::{Mac, SimpleHmac};
use rand_core::{CryptoRng, RngCore};
use sha2::{Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;
use tracing::warn;
use zeroize::Zeroizing;

use crate::errors::PakeError;
use crate::group::{element_bytes, scalar_secret, secret_scalar, Group, Ristretto255, P256, P384};
use crate::inputs::PakeInputs;
use crate::secret::SecretBytes;
use crate::step::{Role, Step, StepKind};
use crate::suite::{Algorithm, GroupId, SuiteInfo};
use crate::transcript::{lv_cat, Transcript};
use crate::zkp;

const INFO_IMPLICIT_KEY: &[u8] = b"pake-engine implicit key";
const INFO_CONFIRM_KEY: &[u8] = b"pake-engine confirmation key";
const DSI_CONFIRM: &[u8] = b"JPAKE_KC";

/// Round 1 index 0 and 1, then round 2
const SLOTS: usize = 3;
const ROUND2: usize = 2;

/// Hash functions usable for challenges, the transcript and key derivation
pub(crate) trait PakeHash: Digest + BlockSizeUser + Clone {}

impl<H: Digest + BlockSizeUser + Clone> PakeHash for H {}

/// Which element slot a proof-carrying step belongs to
fn slot(step: Step) -> Result<usize, PakeError> {
    match (step.round, step.index) {
        (1, 0) => Ok(0),
        (1, 1) => Ok(1),
        (2, 0) => Ok(ROUND2),
        _ => Err(PakeError::CorruptionDetected),
    }
}

fn non_identity<G: Group>(element: G::Element) -> Result<G::Element, PakeError> {
    if element == G::identity() {
        Err(PakeError::InvalidArgument("round 2 generator is the identity"))
    } else {
        Ok(element)
    }
}

fn copy_vec(data: &[u8]) -> Result<Vec<u8>, PakeError> {
    let mut out = Vec::new();
    out.try_reserve_exact(data.len())?;
    out.extend_from_slice(data);
    Ok(out)
}

/// What a step changes, computed before anything is stored
enum Update<G: Group> {
    OwnShare {
        slot: usize,
        secret: SecretBytes,
        public: G::Element,
    },
    OwnCommitment {
        nonce: SecretBytes,
        commitment: G::Element,
    },
    OwnProof {
        slot: usize,
    },
    OwnConfirm,
    PeerShare {
        slot: usize,
        element: G::Element,
    },
    PeerCommitment(G::Element),
    PeerProof {
        slot: usize,
    },
    PeerConfirmed,
}

/// Keys derived at the end of round 2
struct Keys {
    key: SecretBytes,
    confirm_key: SecretBytes,
    digest: Vec<u8>,
}

struct Progress<H: PakeHash> {
    transcript: Option<Transcript<H>>,
    keys: Option<Keys>,
}

impl<H: PakeHash> Default for Progress<H> {
    fn default() -> Self {
        Self {
            transcript: None,
            keys: None,
        }
    }
}

/// Ephemeral state of one party for one exchange
pub(crate) struct Rounds<G: Group, H: PakeHash> {
    role: Role,
    algorithm: Algorithm,
    user_id: Vec<u8>,
    peer_id: Vec<u8>,
    /// The password scalar `s`, cleared once `x2·s` is computed
    password: SecretBytes,
    /// `x1`, `x2` and `x2·s`
    own_secrets: [SecretBytes; SLOTS],
    own_publics: [Option<G::Element>; SLOTS],
    own_proved: [bool; SLOTS],
    nonce: SecretBytes,
    own_commitment: Option<G::Element>,
    peer_publics: [Option<G::Element>; SLOTS],
    peer_commitment: Option<G::Element>,
    peer_verified: [bool; SLOTS],
    transcript: Transcript<H>,
    transcript_digest: Vec<u8>,
    confirm_key: SecretBytes,
    key: SecretBytes,
    key_ready: bool,
}

impl<G: Group, H: PakeHash> Rounds<G, H> {
    pub(crate) fn new(algorithm: Algorithm, inputs: &PakeInputs) -> Result<Self, PakeError> {
        let s = Zeroizing::new(G::reduce(inputs.password.as_bytes()));
        if G::is_zero(&s) {
            return Err(PakeError::InvalidArgument(
                "password is empty or reduces to zero",
            ));
        }
        let password = scalar_secret::<G>(&s)?;

        let role = inputs.role();
        let (client_id, server_id) = match role {
            Role::Client => (inputs.user_id(), inputs.peer_id()),
            Role::Server => (inputs.peer_id(), inputs.user_id()),
        };

        Ok(Self {
            role,
            algorithm,
            user_id: copy_vec(inputs.user_id())?,
            peer_id: copy_vec(inputs.peer_id())?,
            password,
            own_secrets: Default::default(),
            own_publics: [None; SLOTS],
            own_proved: [false; SLOTS],
            nonce: SecretBytes::default(),
            own_commitment: None,
            peer_publics: [None; SLOTS],
            peer_commitment: None,
            peer_verified: [false; SLOTS],
            transcript: Transcript::new(client_id, server_id),
            transcript_digest: Vec::new(),
            confirm_key: SecretBytes::default(),
            key: SecretBytes::default(),
            key_ready: false,
        })
    }

    fn own_public(&self, slot: usize) -> Result<G::Element, PakeError> {
        self.own_publics[slot].ok_or(PakeError::CorruptionDetected)
    }

    fn peer_public(&self, slot: usize) -> Result<G::Element, PakeError> {
        self.peer_publics[slot].ok_or(PakeError::CorruptionDetected)
    }

    fn round1_done(&self) -> bool {
        self.own_proved[..ROUND2].iter().all(|&done| done)
            && self.peer_verified[..ROUND2].iter().all(|&done| done)
    }

    /// Base of our own value in `slot`
    fn own_generator(&self, slot: usize) -> Result<G::Element, PakeError> {
        if slot != ROUND2 {
            return Ok(G::generator());
        }
        if !self.round1_done() {
            return Err(PakeError::CorruptionDetected);
        }
        non_identity::<G>(self.own_public(0)? + self.peer_public(0)? + self.peer_public(1)?)
    }

    /// Base of the peer's value in `slot`
    fn peer_generator(&self, slot: usize) -> Result<G::Element, PakeError> {
        if slot != ROUND2 {
            return Ok(G::generator());
        }
        if !self.round1_done() {
            return Err(PakeError::CorruptionDetected);
        }
        non_identity::<G>(self.peer_public(0)? + self.own_public(0)? + self.own_public(1)?)
    }

    /// Produce the value for `step`. Nothing is written or stored unless every part succeeds.
    pub(crate) fn output<R: RngCore + CryptoRng>(
        &mut self,
        step: Step,
        out: &mut [u8],
        rng: &mut R,
    ) -> Result<usize, PakeError> {
        let (value, update) = match step.kind {
            StepKind::KeyShare => self.prepare_key_share(slot(step)?, rng)?,
            StepKind::ZkPublic => self.prepare_commitment(slot(step)?, rng)?,
            StepKind::ZkProof => self.prepare_response(slot(step)?)?,
            StepKind::Confirm => (self.confirm_tag(self.role)?.to_vec(), Update::OwnConfirm),
        };
        let provided = out.len();
        let dest = out.get_mut(..value.len()).ok_or(PakeError::BufferTooSmall {
            required: value.len(),
            provided,
        })?;
        let progress = self.prepare_progress(self.role, step, &value, &update)?;

        dest.copy_from_slice(&value);
        self.commit(update, progress);
        Ok(value.len())
    }

    fn prepare_key_share<R: RngCore + CryptoRng>(
        &self,
        slot: usize,
        rng: &mut R,
    ) -> Result<(Vec<u8>, Update<G>), PakeError> {
        let (secret, public) = if slot == ROUND2 {
            let generator = self.own_generator(slot)?;
            let x2 = Zeroizing::new(secret_scalar::<G>(&self.own_secrets[1])?);
            let s = Zeroizing::new(secret_scalar::<G>(&self.password)?);
            let secret = Zeroizing::new(*x2 * *s);
            let public = G::mul(&generator, &secret);
            (secret, public)
        } else {
            let secret = Zeroizing::new(G::random_scalar(rng)?);
            let public = G::mul(&G::generator(), &secret);
            (secret, public)
        };

        let bytes = element_bytes::<G>(&public)?;
        let secret = scalar_secret::<G>(&secret)?;
        Ok((
            bytes,
            Update::OwnShare {
                slot,
                secret,
                public,
            },
        ))
    }

    fn prepare_commitment<R: RngCore + CryptoRng>(
        &self,
        slot: usize,
        rng: &mut R,
    ) -> Result<(Vec<u8>, Update<G>), PakeError> {
        if self.own_commitment.is_some() {
            return Err(PakeError::CorruptionDetected);
        }
        let generator = self.own_generator(slot)?;
        let (nonce, commitment) = zkp::commit::<G, R>(&generator, rng)?;

        let bytes = element_bytes::<G>(&commitment)?;
        let nonce = scalar_secret::<G>(&nonce)?;
        Ok((bytes, Update::OwnCommitment { nonce, commitment }))
    }

    fn prepare_response(&self, slot: usize) -> Result<(Vec<u8>, Update<G>), PakeError> {
        let generator = self.own_generator(slot)?;
        let public = self.own_public(slot)?;
        let commitment = self.own_commitment.ok_or(PakeError::CorruptionDetected)?;
        let secret = Zeroizing::new(secret_scalar::<G>(&self.own_secrets[slot])?);
        let nonce = Zeroizing::new(secret_scalar::<G>(&self.nonce)?);

        let response =
            zkp::respond::<G, H>(&generator, &commitment, &public, &secret, &nonce, &self.user_id)?;
        let mut bytes = vec![0u8; G::SCALAR_LEN];
        G::serialize_scalar(&response, &mut bytes)?;
        Ok((bytes, Update::OwnProof { slot }))
    }

    /// Consume the peer's value for `step`. Nothing is stored unless every part succeeds.
    pub(crate) fn input(&mut self, step: Step, value: &[u8]) -> Result<(), PakeError> {
        let update = match step.kind {
            StepKind::KeyShare => Update::PeerShare {
                slot: slot(step)?,
                element: G::deserialize_element(value)?,
            },
            StepKind::ZkPublic => Update::PeerCommitment(G::deserialize_element(value)?),
            StepKind::ZkProof => {
                let slot = slot(step)?;
                let response = G::deserialize_scalar(value)?;
                let generator = self.peer_generator(slot)?;
                let public = self.peer_public(slot)?;
                let commitment = self.peer_commitment.ok_or(PakeError::CorruptionDetected)?;
                zkp::verify::<G, H>(&generator, &commitment, &public, &response, &self.peer_id)
                    .map_err(|err| {
                        warn!(role = ?self.role, %step, "peer proof rejected");
                        err
                    })?;
                Update::PeerProof { slot }
            }
            StepKind::Confirm => {
                let expected = self.confirm_tag(self.role.peer())?;
                if !bool::from(expected.as_slice().ct_eq(value)) {
                    warn!(role = ?self.role, %step, "peer confirmation tag rejected");
                    return Err(PakeError::InvalidSignature);
                }
                Update::PeerConfirmed
            }
        };
        let progress = self.prepare_progress(self.role.peer(), step, value, &update)?;

        self.commit(update, progress);
        Ok(())
    }

    /// The transcript after `step`, and the keys if `step` proves round 2 both ways
    fn prepare_progress(
        &self,
        origin: Role,
        step: Step,
        value: &[u8],
        update: &Update<G>,
    ) -> Result<Progress<H>, PakeError> {
        if step.kind == StepKind::Confirm {
            return Ok(Progress::default());
        }
        let mut transcript = self.transcript.clone();
        transcript.absorb(origin, step, value);

        let round2_done = match *update {
            Update::OwnProof { slot } => slot == ROUND2 && self.peer_verified[ROUND2],
            Update::PeerProof { slot } => slot == ROUND2 && self.own_proved[ROUND2],
            _ => false,
        };
        let keys = if round2_done {
            Some(self.derive_keys(&transcript)?)
        } else {
            None
        };
        Ok(Progress {
            transcript: Some(transcript),
            keys,
        })
    }

    fn derive_keys(&self, transcript: &Transcript<H>) -> Result<Keys, PakeError> {
        if !self.key.is_empty() {
            return Err(PakeError::CorruptionDetected);
        }
        let x2 = Zeroizing::new(secret_scalar::<G>(&self.own_secrets[1])?);
        let x2s = Zeroizing::new(secret_scalar::<G>(&self.own_secrets[ROUND2])?);
        let peer_x2 = self.peer_public(1)?;
        let peer_round2 = self.peer_public(ROUND2)?;

        let shared = G::mul(&(peer_round2 - G::mul(&peer_x2, &x2s)), &x2);
        let dh = G::shared_secret(&shared)?;
        let digest = transcript.digest();

        let hkdf = SimpleHkdf::<H>::new(Some(digest.as_slice()), dh.as_slice());
        let mut okm = Zeroizing::new(vec![0u8; <H as Digest>::output_size()]);
        hkdf.expand(INFO_IMPLICIT_KEY, &mut okm)
            .map_err(|_| PakeError::CorruptionDetected)?;
        let key = SecretBytes::try_from_slice(&okm)?;

        let confirm_key = match self.algorithm {
            Algorithm::Jpake => SecretBytes::default(),
            Algorithm::JpakeConfirmed => {
                hkdf.expand(INFO_CONFIRM_KEY, &mut okm)
                    .map_err(|_| PakeError::CorruptionDetected)?;
                SecretBytes::try_from_slice(&okm)?
            }
        };
        Ok(Keys {
            key,
            confirm_key,
            digest,
        })
    }

    /// Store a prepared step. Infallible, so a failed step leaves no trace.
    fn commit(&mut self, update: Update<G>, progress: Progress<H>) {
        match update {
            Update::OwnShare {
                slot,
                secret,
                public,
            } => {
                self.own_secrets[slot] = secret;
                self.own_publics[slot] = Some(public);
                if slot == ROUND2 {
                    self.password.clear();
                }
            }
            Update::OwnCommitment { nonce, commitment } => {
                self.nonce = nonce;
                self.own_commitment = Some(commitment);
            }
            Update::OwnProof { slot } => {
                self.own_commitment = None;
                self.nonce.clear();
                self.own_proved[slot] = true;
            }
            Update::OwnConfirm => {}
            Update::PeerShare { slot, element } => self.peer_publics[slot] = Some(element),
            Update::PeerCommitment(commitment) => self.peer_commitment = Some(commitment),
            Update::PeerProof { slot } => {
                self.peer_commitment = None;
                self.peer_verified[slot] = true;
            }
            Update::PeerConfirmed => self.key_ready = true,
        }

        if let Some(transcript) = progress.transcript {
            self.transcript = transcript;
        }
        if let Some(keys) = progress.keys {
            self.key = keys.key;
            self.key_ready = self.algorithm == Algorithm::Jpake;
            if self.algorithm == Algorithm::JpakeConfirmed {
                self.confirm_key = keys.confirm_key;
                self.transcript_digest = keys.digest;
            }
            for secret in self.own_secrets.iter_mut() {
                secret.clear();
            }
        }
    }

    /// The confirmation tag sent by `sender`
    fn confirm_tag(&self, sender: Role) -> Result<Zeroizing<Vec<u8>>, PakeError> {
        if self.confirm_key.is_empty() {
            return Err(PakeError::CorruptionDetected);
        }
        let (sender_id, receiver_id) = if sender == self.role {
            (&self.user_id, &self.peer_id)
        } else {
            (&self.peer_id, &self.user_id)
        };

        let mut mac = <SimpleHmac<H> as Mac>::new_from_slice(self.confirm_key.as_slice())
            .map_err(|_| PakeError::CorruptionDetected)?;
        mac.update(&lv_cat(&[
            DSI_CONFIRM,
            sender.default_id(),
            sender_id,
            receiver_id,
            &self.transcript_digest,
        ]));
        Ok(Zeroizing::new(mac.finalize().into_bytes().to_vec()))
    }

    /// Copy the key into `out` and erase every secret
    pub(crate) fn take_key(&mut self, out: &mut [u8]) -> Result<usize, PakeError> {
        if !self.key_ready || self.key.is_empty() {
            return Err(PakeError::CorruptionDetected);
        }
        let key = self.key.as_slice();
        let provided = out.len();
        out.get_mut(..key.len())
            .ok_or(PakeError::BufferTooSmall {
                required: key.len(),
                provided,
            })?
            .copy_from_slice(key);
        let len = key.len();
        self.wipe();
        Ok(len)
    }

    pub(crate) fn key_ready(&self) -> bool {
        self.key_ready
    }

    /// Internal consistency of the stored secrets
    pub(crate) fn is_consistent(&self) -> bool {
        let nonce_pending = self.nonce.is_empty() == self.own_commitment.is_none();
        let key_derived =
            self.key.is_empty() || (self.own_proved[ROUND2] && self.peer_verified[ROUND2]);
        let key_held = !self.key_ready || !self.key.is_empty();
        nonce_pending && key_derived && key_held
    }

    pub(crate) fn wipe(&mut self) {
        self.password.clear();
        for secret in self.own_secrets.iter_mut() {
            secret.clear();
        }
        self.nonce.clear();
        self.own_commitment = None;
        self.confirm_key.clear();
        self.key.clear();
        self.key_ready = false;
    }
}

/// [`Rounds`] instantiated for each supported group
pub(crate) enum Engine {
    P256(Box<Rounds<P256, Sha256>>),
    P384(Box<Rounds<P384, Sha384>>),
    Ristretto255(Box<Rounds<Ristretto255, Sha512>>),
}

macro_rules! dispatch {
    ($engine:expr, $rounds:ident => $body:expr) => {
        match $engine {
            Engine::P256($rounds) => $body,
            Engine::P384($rounds) => $body,
            Engine::Ristretto255($rounds) => $body,
        }
    };
}

impl Engine {
    pub(crate) fn new(info: &SuiteInfo, inputs: &PakeInputs) -> Result<Self, PakeError> {
        let algorithm = info.cipher_suite().algorithm;
        Ok(match info.group {
            GroupId::P256 => Engine::P256(Box::new(Rounds::new(algorithm, inputs)?)),
            GroupId::P384 => Engine::P384(Box::new(Rounds::new(algorithm, inputs)?)),
            GroupId::Ristretto255 => {
                Engine::Ristretto255(Box::new(Rounds::new(algorithm, inputs)?))
            }
        })
    }

    pub(crate) fn output<R: RngCore + CryptoRng>(
        &mut self,
        step: Step,
        out: &mut [u8],
        rng: &mut R,
    ) -> Result<usize, PakeError> {
        dispatch!(self, rounds => rounds.output(step, out, rng))
    }

    pub(crate) fn input(&mut self, step: Step, value: &[u8]) -> Result<(), PakeError> {
        dispatch!(self, rounds => rounds.input(step, value))
    }

    pub(crate) fn take_key(&mut self, out: &mut [u8]) -> Result<usize, PakeError> {
        dispatch!(self, rounds => rounds.take_key(out))
    }

    pub(crate) fn key_ready(&self) -> bool {
        dispatch!(self, rounds => rounds.key_ready())
    }

    pub(crate) fn is_consistent(&self) -> bool {
        dispatch!(self, rounds => rounds.is_consistent())
    }

    pub(crate) fn wipe(&mut self) {
        dispatch!(self, rounds => rounds.wipe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::Password;
    use crate::sequencer::Sequencer;
    use crate::step::Direction;
    use rand_core::OsRng;

    fn new_pair<G: Group, H: PakeHash>(
        algorithm: Algorithm,
        client_password: &[u8],
        server_password: &[u8],
    ) -> (Rounds<G, H>, Rounds<G, H>) {
        let client =
            Rounds::new(algorithm, &PakeInputs::new(Role::Client, Password::new(client_password)))
                .unwrap();
        let server =
            Rounds::new(algorithm, &PakeInputs::new(Role::Server, Password::new(server_password)))
                .unwrap();
        (client, server)
    }

    /// Carry one scheduled step between the parties
    fn play<G: Group, H: PakeHash>(
        direction: Direction,
        step: Step,
        client: &mut Rounds<G, H>,
        server: &mut Rounds<G, H>,
    ) -> Result<(), PakeError> {
        let (sender, receiver) = match direction {
            Direction::Output => (client, server),
            Direction::Input => (server, client),
        };
        let mut buf = [0u8; 128];
        let len = sender.output(step, &mut buf, &mut OsRng)?;
        receiver.input(step, &buf[..len])
    }

    /// Drive both parties through the client schedule, stopping at the first error
    fn run<G: Group, H: PakeHash>(
        algorithm: Algorithm,
        client: &mut Rounds<G, H>,
        server: &mut Rounds<G, H>,
    ) -> Result<(), PakeError> {
        let mut sequencer = Sequencer::new(algorithm, Role::Client).unwrap();
        while let Some((direction, step)) = sequencer.expected() {
            play(direction, step, client, server)?;
            sequencer.advance();
        }
        Ok(())
    }

    fn check_agreement<G: Group, H: PakeHash>(algorithm: Algorithm) {
        let (mut client, mut server) = new_pair::<G, H>(algorithm, b"hunter2", b"hunter2");
        run(algorithm, &mut client, &mut server).unwrap();
        assert!(client.key_ready() && server.key_ready());

        let mut client_key = [0u8; 64];
        let mut server_key = [0u8; 64];
        let len = client.take_key(&mut client_key).unwrap();
        assert_eq!(len, <H as Digest>::output_size());
        assert_eq!(server.take_key(&mut server_key).unwrap(), len);
        assert_eq!(client_key[..len], server_key[..len]);
        assert!(client.is_consistent() && server.is_consistent());
    }

    #[test]
    fn test_keys_agree() {
        for algorithm in [Algorithm::Jpake, Algorithm::JpakeConfirmed] {
            check_agreement::<P256, Sha256>(algorithm);
            check_agreement::<P384, Sha384>(algorithm);
            check_agreement::<Ristretto255, Sha512>(algorithm);
        }
    }

    #[test]
    fn test_wrong_password_gives_different_keys() {
        let (mut client, mut server) =
            new_pair::<P256, Sha256>(Algorithm::Jpake, b"hunter2", b"hunter3");
        run(Algorithm::Jpake, &mut client, &mut server).unwrap();

        let mut client_key = [0u8; 32];
        let mut server_key = [0u8; 32];
        client.take_key(&mut client_key).unwrap();
        server.take_key(&mut server_key).unwrap();
        assert_ne!(client_key, server_key);
    }

    #[test]
    fn test_wrong_password_fails_confirmation() {
        let (mut client, mut server) =
            new_pair::<Ristretto255, Sha512>(Algorithm::JpakeConfirmed, b"hunter2", b"hunter3");
        assert_eq!(
            run(Algorithm::JpakeConfirmed, &mut client, &mut server),
            Err(PakeError::InvalidSignature)
        );
        assert!(!server.key_ready());
    }

    #[test]
    fn test_zero_password_is_rejected() {
        let inputs = PakeInputs::new(Role::Client, Password::new(&[0, 0, 0]));
        assert!(matches!(
            Rounds::<P256, Sha256>::new(Algorithm::Jpake, &inputs),
            Err(PakeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_secrets_are_released_after_key_copy() {
        let (mut client, mut server) =
            new_pair::<P384, Sha384>(Algorithm::Jpake, b"hunter2", b"hunter2");
        run(Algorithm::Jpake, &mut client, &mut server).unwrap();
        assert!(client.password.is_empty());
        assert!(client.own_secrets.iter().all(SecretBytes::is_empty));

        let mut key = [0u8; 48];
        client.take_key(&mut key).unwrap();
        assert!(client.key.is_empty());
        assert_eq!(client.take_key(&mut key), Err(PakeError::CorruptionDetected));
    }

    #[test]
    fn test_failed_key_derivation_stores_nothing() {
        let algorithm = Algorithm::Jpake;
        let (mut client, mut server) =
            new_pair::<P256, Sha256>(algorithm, b"hunter2", b"hunter2");
        let mut sequencer = Sequencer::new(algorithm, Role::Client).unwrap();
        while sequencer.position() + 1 < sequencer.len() {
            let (direction, step) = sequencer.expected().unwrap();
            play(direction, step, &mut client, &mut server).unwrap();
            sequencer.advance();
        }

        // Both parties derive the key on the last proof
        let (direction, step) = sequencer.expected().unwrap();
        assert_eq!(step, Step::new(StepKind::ZkProof, 2, 0));
        let (sender, receiver) = match direction {
            Direction::Output => (&mut client, &mut server),
            Direction::Input => (&mut server, &mut client),
        };

        let x2 = core::mem::take(&mut sender.own_secrets[1]);
        let mut out = [0xAAu8; 128];
        assert_eq!(
            sender.output(step, &mut out, &mut OsRng),
            Err(PakeError::CorruptionDetected)
        );
        assert_eq!(out, [0xAAu8; 128]);
        assert!(sender.own_commitment.is_some());
        assert!(!sender.nonce.is_empty());
        assert!(!sender.own_proved[ROUND2]);
        assert!(sender.key.is_empty());
        assert!(sender.is_consistent());

        sender.own_secrets[1] = x2;
        let len = sender.output(step, &mut out, &mut OsRng).unwrap();
        assert!(sender.key_ready());

        let x2 = core::mem::take(&mut receiver.own_secrets[1]);
        assert_eq!(
            receiver.input(step, &out[..len]),
            Err(PakeError::CorruptionDetected)
        );
        assert!(receiver.peer_commitment.is_some());
        assert!(!receiver.peer_verified[ROUND2]);
        assert!(!receiver.key_ready());

        receiver.own_secrets[1] = x2;
        receiver.input(step, &out[..len]).unwrap();

        let mut client_key = [0u8; 32];
        let mut server_key = [0u8; 32];
        client.take_key(&mut client_key).unwrap();
        server.take_key(&mut server_key).unwrap();
        assert_eq!(client_key, server_key);
    }
}
