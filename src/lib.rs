// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! Lamport One-Time Signatures, and what happens when a key is used more than once.
//!
//! A Lamport key signs a single message safely. Every additional signature
//! reveals more of the secret key, and once enough preimages are known the
//! remaining ones can be searched for, after which any message can be signed.
//! The [`forge`] module implements that attack end-to-end.

pub mod encoding;
pub mod error;
pub mod forge;
pub mod harvest;
pub mod lamport;
pub mod search;
pub mod slot;

pub use error::{Error, Result};
pub use forge::{forge, ForgeConfig, ForgeState, Forger, Forgery};
pub use harvest::{harvest, Harvester};
pub use lamport::{
    hash, message_digest, verify, Block, Digest, Keypair, PartialSecretKey, PublicKey, SecretKey,
    Signature, BITS, N,
};
pub use search::{search, CancelToken, CandidateSpace, Recovered, RestrictedSpace, UniformSpace};
pub use slot::{Row, SlotIndex, SLOTS};
