// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! Lamport One-Time Signature Scheme.
//!
//! The public key commits to two rows of `BITS` hashes, one row per bit value.
//! Signing reveals, for every bit of the SHA-256 message digest, the secret
//! preimage from the row selected by that bit.
//! A secret key must only ever sign a single message.

use std::fmt;

use rand::{rngs::OsRng, RngCore};
use sha2::{Digest as _, Sha256};
use subtle::ConstantTimeEq;

use crate::error::{Error, Result};
use crate::search::{CandidateSpace, UniformSpace};
use crate::slot::{Row, SlotIndex, SLOTS};

/// Security parameter, hash output size in bytes.
pub const N: usize = 256 / 8;

/// Number of message digest bits, i.e. number of preimages in a signature.
pub const BITS: usize = 8 * N;

/// Secret preimage.
pub type Block = [u8; N];

/// SHA-256 output.
pub type Digest = [u8; N];

/// Lamport Public Key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublicKey {
    pub zero_hash: [Digest; BITS],
    pub one_hash: [Digest; BITS],
}

/// Complete Lamport Secret Key
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey {
    zero_pre: [Block; BITS],
    one_pre: [Block; BITS],
}

/// Secret key with possibly unknown slots, as reconstructed by an attacker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialSecretKey {
    zero_pre: [Option<Block>; BITS],
    one_pre: [Option<Block>; BITS],
}

/// Lamport Signature
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub preimages: [Block; BITS],
}

/// Lamport Keypair
#[derive(Debug, Clone)]
pub struct Keypair {
    pub pk: PublicKey,
    sk: SecretKey,
}

impl Keypair {
    /// Generates a new Keypair from OS randomness.
    pub fn new() -> Self {
        Self::generate(&UniformSpace, &mut OsRng)
    }

    /// Generates a Keypair whose secret preimages are all drawn from `space`.
    pub fn generate<S: CandidateSpace>(space: &S, rng: &mut impl RngCore) -> Self {
        let mut zero_pre = [[0u8; N]; BITS];
        let mut one_pre = [[0u8; N]; BITS];
        for i in 0..BITS {
            zero_pre[i] = space.sample(rng);
            one_pre[i] = space.sample(rng);
        }
        Self::from_secret(SecretKey { zero_pre, one_pre })
    }

    pub fn from_secret(sk: SecretKey) -> Self {
        Self {
            pk: sk.public_key(),
            sk,
        }
    }

    pub fn secret(&self) -> &SecretKey {
        &self.sk
    }

    /// Hashes and then signs a message.
    pub fn sign(&self, msg: &[u8]) -> Signature {
        self.sk.sign(msg)
    }
}

impl Default for Keypair {
    fn default() -> Self {
        Self::new()
    }
}

impl PublicKey {
    /// The commitment stored at `slot`.
    pub fn commitment(&self, slot: SlotIndex) -> &Digest {
        &self.row(slot.row())[slot.position()]
    }

    pub fn row(&self, row: Row) -> &[Digest; BITS] {
        match row {
            Row::Zero => &self.zero_hash,
            Row::One => &self.one_hash,
        }
    }

    /// Verifies the signature on `msg` against this public key.
    pub fn verify(&self, msg: &[u8], sig: &Signature) -> bool {
        let digest = message_digest(msg);

        let mut valid = 1u8;
        for (i, preimage) in sig.preimages.iter().enumerate() {
            let slot = SlotIndex::from_parts(bit_at(&digest, i), i);
            valid &= hash(preimage)[..].ct_eq(&self.commitment(slot)[..]).unwrap_u8();
        }

        return valid == 1;
    }
}

impl SecretKey {
    pub fn preimage(&self, slot: SlotIndex) -> &Block {
        match slot.row() {
            Row::Zero => &self.zero_pre[slot.position()],
            Row::One => &self.one_pre[slot.position()],
        }
    }

    fn preimage_mut(&mut self, slot: SlotIndex) -> &mut Block {
        match slot.row() {
            Row::Zero => &mut self.zero_pre[slot.position()],
            Row::One => &mut self.one_pre[slot.position()],
        }
    }

    /// Hashes every preimage to derive the matching public key.
    pub fn public_key(&self) -> PublicKey {
        let mut zero_hash = [[0u8; N]; BITS];
        let mut one_hash = [[0u8; N]; BITS];
        for i in 0..BITS {
            zero_hash[i] = hash(&self.zero_pre[i]);
            one_hash[i] = hash(&self.one_pre[i]);
        }
        PublicKey {
            zero_hash,
            one_hash,
        }
    }

    /// Hashes and then signs a message.
    pub fn sign(&self, msg: &[u8]) -> Signature {
        let digest = message_digest(msg);

        let mut preimages = [[0u8; N]; BITS];
        for (i, preimage) in preimages.iter_mut().enumerate() {
            let slot = SlotIndex::from_parts(bit_at(&digest, i), i);
            *preimage = *self.preimage(slot);
        }

        return Signature { preimages };
    }

    /// Checks that every preimage hashes to its commitment in `pk`.
    /// Fails with the first slot that does not.
    pub fn check(&self, pk: &PublicKey) -> Result<()> {
        match SlotIndex::all().find(|&slot| hash(self.preimage(slot)) != *pk.commitment(slot)) {
            Some(slot) => Err(Error::InconsistentKey { slot }),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey").finish_non_exhaustive()
    }
}

impl PartialSecretKey {
    /// A key with every slot unknown.
    pub fn new() -> Self {
        Self {
            zero_pre: [None; BITS],
            one_pre: [None; BITS],
        }
    }

    pub fn get(&self, slot: SlotIndex) -> Option<&Block> {
        self.row(slot.row())[slot.position()].as_ref()
    }

    pub fn is_known(&self, slot: SlotIndex) -> bool {
        self.get(slot).is_some()
    }

    /// Records `preimage` at `slot` unless that slot is already known.
    /// Returns whether the slot was newly filled.
    pub fn insert(&mut self, slot: SlotIndex, preimage: Block) -> bool {
        let entry = match slot.row() {
            Row::Zero => &mut self.zero_pre[slot.position()],
            Row::One => &mut self.one_pre[slot.position()],
        };
        if entry.is_some() {
            return false;
        }
        *entry = Some(preimage);
        true
    }

    pub fn known_count(&self) -> usize {
        self.zero_pre
            .iter()
            .chain(self.one_pre.iter())
            .filter(|p| p.is_some())
            .count()
    }

    /// Slots with no known preimage, in ascending order.
    pub fn missing(&self) -> Vec<SlotIndex> {
        SlotIndex::all().filter(|&s| !self.is_known(s)).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.known_count() == SLOTS
    }

    /// Converts into a complete key, failing if any slot is still unknown.
    pub fn complete(&self) -> Result<SecretKey> {
        let mut sk = SecretKey {
            zero_pre: [[0u8; N]; BITS],
            one_pre: [[0u8; N]; BITS],
        };
        for slot in SlotIndex::all() {
            match self.get(slot) {
                Some(preimage) => *sk.preimage_mut(slot) = *preimage,
                None => {
                    return Err(Error::IncompleteKey {
                        missing: SLOTS - self.known_count(),
                    })
                }
            }
        }
        Ok(sk)
    }

    /// Signs a message, which is only possible once every slot is known.
    pub fn sign(&self, msg: &[u8]) -> Result<Signature> {
        Ok(self.complete()?.sign(msg))
    }

    fn row(&self, row: Row) -> &[Option<Block>; BITS] {
        match row {
            Row::Zero => &self.zero_pre,
            Row::One => &self.one_pre,
        }
    }
}

impl Default for PartialSecretKey {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&SecretKey> for PartialSecretKey {
    fn from(sk: &SecretKey) -> Self {
        let mut partial = Self::new();
        for slot in SlotIndex::all() {
            partial.insert(slot, *sk.preimage(slot));
        }
        partial
    }
}

/// Verifies `sig` on `msg` against `pk`.
pub fn verify(msg: &[u8], pk: &PublicKey, sig: &Signature) -> bool {
    pk.verify(msg, sig)
}

/// SHA-256 of arbitrary input.
pub fn hash(data: &[u8]) -> Digest {
    let mut output = [0u8; N];
    output.copy_from_slice(&Sha256::digest(data));
    output
}

/// Reduces a message to the digest whose bits are signed.
pub fn message_digest(msg: &[u8]) -> Digest {
    hash(msg)
}

/// Bit `i` of the digest, where bit 0 is the most significant bit of byte 0.
pub fn bit_at(digest: &Digest, i: usize) -> Row {
    match (digest[i / 8] >> (7 - (i % 8))) & 0x01 {
        0 => Row::Zero,
        _ => Row::One,
    }
}
