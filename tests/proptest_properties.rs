// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! Property-based tests for Lamport signing and preimage harvesting.
//!
//! - Roundtrip: every signature verifies and reveals the selected commitments
//! - Tampering: a flipped message byte or preimage byte invalidates the signature
//! - Harvesting: repeated or shuffled observations yield the same partial key

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use lamport_forge::lamport::bit_at;
use lamport_forge::{
    harvest, hash, message_digest, Keypair, Row, Signature, SlotIndex, UniformSpace, BITS,
};

fn arb_seed() -> impl Strategy<Value = [u8; 32]> {
    prop::array::uniform32(any::<u8>())
}

fn arb_message() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..256)
}

fn keypair(seed: [u8; 32]) -> Keypair {
    Keypair::generate(&UniformSpace, &mut StdRng::from_seed(seed))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn sign_then_verify(seed in arb_seed(), message in arb_message()) {
        let kp = keypair(seed);
        let sig = kp.sign(&message);
        prop_assert!(kp.pk.verify(&message, &sig));

        let digest = message_digest(&message);
        for i in 0..BITS {
            let slot = SlotIndex::from_parts(bit_at(&digest, i), i);
            prop_assert_eq!(hash(&sig.preimages[i]), *kp.pk.commitment(slot));
        }
    }

    #[test]
    fn tampered_message_fails(seed in arb_seed(), message in arb_message(), flip_pos in 0usize..256) {
        prop_assume!(!message.is_empty());
        let kp = keypair(seed);
        let sig = kp.sign(&message);

        let mut tampered = message.clone();
        let pos = flip_pos % tampered.len();
        tampered[pos] ^= 0xff;
        prop_assert!(!kp.pk.verify(&tampered, &sig));
    }

    #[test]
    fn tampered_preimage_fails(seed in arb_seed(), message in arb_message(), index in 0usize..BITS) {
        let kp = keypair(seed);
        let mut sig = kp.sign(&message);
        sig.preimages[index][0] ^= 0x01;
        prop_assert!(!kp.pk.verify(&message, &sig));
    }

    #[test]
    fn harvest_is_idempotent(seed in arb_seed(), messages in prop::collection::vec(arb_message(), 1..5)) {
        let kp = keypair(seed);
        let sigs: Vec<Signature> = messages.iter().map(|m| kp.sign(m)).collect();

        let (once, unresolved_once) = harvest(&kp.pk, &sigs);

        let mut repeated: Vec<Signature> = sigs.iter().rev().cloned().collect();
        repeated.extend(sigs.iter().cloned());
        let (twice, unresolved_twice) = harvest(&kp.pk, &repeated);

        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(&unresolved_once, &unresolved_twice);

        // every position was revealed in at least one row
        for i in 0..BITS {
            let zero = once.is_known(SlotIndex::from_parts(Row::Zero, i));
            let one = once.is_known(SlotIndex::from_parts(Row::One, i));
            prop_assert!(zero || one);
        }
    }
}
