// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! Collects the secret preimages already revealed by observed signatures.
//!
//! A revealed preimage is matched against both rows of the public key, so the
//! signed messages themselves are not needed: the row a preimage hashes into
//! tells which bit value it belongs to.

use tracing::debug;

use crate::lamport::{hash, Block, PartialSecretKey, PublicKey, Signature};
use crate::slot::{Row, SlotIndex, SLOTS};

/// Accumulates known preimages for a single public key.
#[derive(Debug, Clone)]
pub struct Harvester<'a> {
    pk: &'a PublicKey,
    key: PartialSecretKey,
}

impl<'a> Harvester<'a> {
    pub fn new(pk: &'a PublicKey) -> Self {
        Self {
            pk,
            key: PartialSecretKey::new(),
        }
    }

    /// Records `preimage` at every slot whose commitment it hashes to.
    /// Returns the number of slots that were not known before.
    pub fn observe_preimage(&mut self, preimage: &Block) -> usize {
        let digest = hash(preimage);

        let mut fresh = 0;
        for &row in Row::BOTH.iter() {
            for (j, commitment) in self.pk.row(row).iter().enumerate() {
                if *commitment == digest && self.key.insert(SlotIndex::from_parts(row, j), *preimage)
                {
                    fresh += 1;
                }
            }
        }

        fresh
    }

    /// Records every preimage revealed by `sig`.
    pub fn observe(&mut self, sig: &Signature) -> usize {
        let fresh: usize = sig
            .preimages
            .iter()
            .map(|p| self.observe_preimage(p))
            .sum();
        debug!(fresh, known = self.key.known_count(), "harvested signature");
        fresh
    }

    pub fn known_count(&self) -> usize {
        self.key.known_count()
    }

    /// Slots no observed preimage has matched so far.
    pub fn unresolved(&self) -> Vec<SlotIndex> {
        self.key.missing()
    }

    pub fn key(&self) -> &PartialSecretKey {
        &self.key
    }

    /// The partially known key and the slots that are still missing.
    pub fn finish(self) -> (PartialSecretKey, Vec<SlotIndex>) {
        let unresolved = self.key.missing();
        debug_assert_eq!(unresolved.len() + self.key.known_count(), SLOTS);
        (self.key, unresolved)
    }
}

/// Harvests all preimages revealed by `sigs`.
pub fn harvest(pk: &PublicKey, sigs: &[Signature]) -> (PartialSecretKey, Vec<SlotIndex>) {
    let mut harvester = Harvester::new(pk);
    for sig in sigs {
        harvester.observe(sig);
    }
    harvester.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lamport::{bit_at, message_digest, Keypair, SecretKey, BITS, N};

    #[test]
    fn single_signature() {
        let kp = Keypair::new();
        let sig = kp.sign(b"1");
        let (key, unresolved) = harvest(&kp.pk, &[sig]);

        assert_eq!(key.known_count(), BITS);
        assert_eq!(unresolved.len(), SLOTS - BITS);

        let digest = message_digest(b"1");
        for i in 0..BITS {
            let signed = SlotIndex::from_parts(bit_at(&digest, i), i);
            assert_eq!(key.get(signed), Some(kp.secret().preimage(signed)));
            assert_eq!(unresolved.contains(&signed), false);
        }
    }

    #[test]
    fn repeated_preimages_are_idempotent() {
        let kp = Keypair::new();
        let sig1 = kp.sign(b"1");
        let sig2 = kp.sign(b"2");

        let (once, unresolved_once) = harvest(&kp.pk, &[sig1.clone(), sig2.clone()]);
        let (twice, unresolved_twice) =
            harvest(&kp.pk, &[sig1.clone(), sig2.clone(), sig1.clone(), sig2]);
        assert_eq!(once, twice);
        assert_eq!(unresolved_once, unresolved_twice);

        let mut harvester = Harvester::new(&kp.pk);
        assert_eq!(harvester.observe(&sig1), BITS);
        assert_eq!(harvester.observe(&sig1), 0);
        assert_eq!(harvester.observe_preimage(&sig1.preimages[0]), 0);
    }

    #[test]
    fn unknown_preimage_is_ignored() {
        let kp = Keypair::new();
        let mut harvester = Harvester::new(&kp.pk);
        assert_eq!(harvester.observe_preimage(&[0x42u8; N]), 0);
        assert_eq!(harvester.known_count(), 0);
        assert_eq!(harvester.unresolved().len(), SLOTS);
    }

    #[test]
    fn preimage_matching_both_rows() {
        // the same secret in two slots of different rows
        let kp = Keypair::new();
        let mut partial = PartialSecretKey::new();
        for slot in SlotIndex::all() {
            let preimage = if slot == SlotIndex::from_parts(Row::One, 7) {
                *kp.secret().preimage(SlotIndex::from_parts(Row::Zero, 3))
            } else {
                *kp.secret().preimage(slot)
            };
            partial.insert(slot, preimage);
        }
        let sk: SecretKey = partial.complete().unwrap();
        let pk = sk.public_key();

        let mut harvester = Harvester::new(&pk);
        let shared = *sk.preimage(SlotIndex::from_parts(Row::Zero, 3));
        assert_eq!(harvester.observe_preimage(&shared), 2);
        assert_eq!(harvester.key().is_known(SlotIndex::from_parts(Row::Zero, 3)), true);
        assert_eq!(harvester.key().is_known(SlotIndex::from_parts(Row::One, 7)), true);
        assert_eq!(
            harvester.unresolved().contains(&SlotIndex::new(BITS + 7).unwrap()),
            false
        );
    }

    #[test]
    fn both_rows_revealed() {
        let kp = Keypair::new();
        // complementary digests cover every slot, build such a pair of signatures by hand
        let sig = kp.sign(b"x");
        let digest = message_digest(b"x");
        let mut complement = sig.clone();
        for i in 0..BITS {
            let other = match bit_at(&digest, i) {
                Row::Zero => Row::One,
                Row::One => Row::Zero,
            };
            complement.preimages[i] = *kp.secret().preimage(SlotIndex::from_parts(other, i));
        }

        let (key, unresolved) = harvest(&kp.pk, &[sig, complement]);
        assert_eq!(unresolved.is_empty(), true);
        assert_eq!(key.complete().unwrap(), *kp.secret());
    }
}
