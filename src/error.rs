// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! Error types for signing, decoding and forging.

use thiserror::Error;

use crate::slot::{SlotIndex, SLOTS};

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Key or signature material is not valid hex.
    #[error("malformed hex input: {0}")]
    Decoding(#[from] hex::FromHexError),

    /// Decoded key or signature material has the wrong size.
    #[error("invalid {what} length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Signing was attempted with a secret key that still has unknown slots.
    #[error("secret key is incomplete: {missing} of {} slots unknown", SLOTS)]
    IncompleteKey { missing: usize },

    /// A preimage does not hash to its commitment, or a slot was filled twice.
    #[error("secret key is inconsistent with the public key at slot {slot}")]
    InconsistentKey { slot: SlotIndex },

    /// The preimage search was aborted before every slot was found.
    #[error("preimage search cancelled with {unresolved} slots unresolved")]
    Cancelled { unresolved: usize },

    #[error("failed to build search thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
