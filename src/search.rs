// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! Parallel brute-force preimage search.
//!
//! Every unresolved slot gets its own task, which samples candidates until one
//! hashes to that slot's commitment and then returns it. Tasks own their result
//! exclusively and never look at each other; the caller collects all results
//! once every task has returned.
//!
//! Against SHA-256 with uniformly random preimages this never finishes.
//! It is only practical when the secret preimages were drawn from a small
//! [`CandidateSpace`], which the search samples from without knowing anything
//! else about it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::{thread_rng, RngCore};
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::lamport::{hash, Block, Digest, PublicKey, N};
use crate::slot::SlotIndex;

/// A distribution of candidate preimages.
pub trait CandidateSpace: Sync {
    /// Draws one candidate block.
    fn sample<R: RngCore>(&self, rng: &mut R) -> Block;
}

/// Uniformly random blocks over all `8 * N` bits.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformSpace;

impl CandidateSpace for UniformSpace {
    fn sample<R: RngCore>(&self, rng: &mut R) -> Block {
        let mut block = [0u8; N];
        rng.fill_bytes(&mut block);
        block
    }
}

/// Blocks whose lowest `entropy_bits` bits are random and all others zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestrictedSpace {
    entropy_bits: u32,
}

impl RestrictedSpace {
    /// Panics if `entropy_bits` exceeds the block size.
    pub fn new(entropy_bits: u32) -> Self {
        assert!(entropy_bits as usize <= 8 * N, "at most {} bits of entropy", 8 * N);
        Self { entropy_bits }
    }

    pub fn entropy_bits(&self) -> u32 {
        self.entropy_bits
    }
}

impl CandidateSpace for RestrictedSpace {
    fn sample<R: RngCore>(&self, rng: &mut R) -> Block {
        let mut block = [0u8; N];
        rng.fill_bytes(&mut block);

        let random = (self.entropy_bits as usize + 7) / 8;
        for byte in block[..N - random].iter_mut() {
            *byte = 0;
        }
        if random > 0 {
            let excess = random * 8 - self.entropy_bits as usize;
            block[N - random] &= 0xff >> excess;
        }

        block
    }
}

/// Shared flag for aborting a running search.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Clears a previous cancellation for every clone of this token.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// A preimage found by the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recovered {
    pub slot: SlotIndex,
    pub preimage: Block,
    /// Number of candidates drawn before the match.
    pub attempts: u64,
}

/// Finds a preimage for every slot in `unresolved`.
///
/// Runs on the current rayon pool, one job per distinct slot, and blocks until
/// all of them have returned. Repeated slots are searched once.
/// Results are in ascending slot order.
/// Fails with [`Error::Cancelled`] if `cancel` fires before every slot is found.
pub fn search<S: CandidateSpace>(
    pk: &PublicKey,
    unresolved: &[SlotIndex],
    space: &S,
    cancel: &CancelToken,
) -> Result<Vec<Recovered>> {
    let mut slots = unresolved.to_vec();
    slots.sort_unstable();
    slots.dedup();

    if slots.is_empty() {
        debug!("no unresolved slots, skipping search");
        return Ok(Vec::new());
    }

    debug!(slots = slots.len(), "starting preimage search");
    let found: Vec<Option<Recovered>> = slots
        .par_iter()
        .with_max_len(1)
        .map(|&slot| {
            let (preimage, attempts) = search_slot(pk.commitment(slot), space, cancel)?;
            trace!(%slot, attempts, "recovered preimage");
            Some(Recovered {
                slot,
                preimage,
                attempts,
            })
        })
        .collect();

    let recovered: Vec<Recovered> = found.into_iter().flatten().collect();
    if recovered.len() < slots.len() {
        return Err(Error::Cancelled {
            unresolved: slots.len() - recovered.len(),
        });
    }

    Ok(recovered)
}

/// Samples candidates until one hashes to `commitment`.
/// Returns the preimage and the number of attempts, or `None` once cancelled.
pub fn search_slot<S: CandidateSpace>(
    commitment: &Digest,
    space: &S,
    cancel: &CancelToken,
) -> Option<(Block, u64)> {
    let mut rng = thread_rng();
    let mut attempts = 0u64;

    loop {
        if cancel.is_cancelled() {
            return None;
        }

        attempts += 1;
        let candidate = space.sample(&mut rng);
        if hash(&candidate) == *commitment {
            return Some((candidate, attempts));
        }
    }
}
