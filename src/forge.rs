// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! Forging Lamport signatures from a reused key.
//!
//! The [`Forger`] harvests the preimages revealed by earlier signatures,
//! searches for the missing ones, checks the reassembled secret key against
//! the public key and signs a message of the attacker's choosing.

use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::harvest::harvest;
use crate::lamport::{PartialSecretKey, PublicKey, SecretKey, Signature};
use crate::search::{search, CancelToken, CandidateSpace, Recovered, UniformSpace};
use crate::slot::{SlotIndex, SLOTS};

/// Progress of a single forgery run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForgeState {
    Idle,
    Harvesting,
    Searching,
    Assembling,
    Signed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForgeConfig {
    /// Size of the search thread pool, 0 uses one thread per core.
    pub threads: usize,
}

impl ForgeConfig {
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self { threads: 0 }
    }
}

/// A signature on a message the key holder never signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forgery {
    pub message: Vec<u8>,
    pub signature: Signature,
    /// Slots already revealed by the observed signatures.
    pub harvested: usize,
    /// Slots recovered by the preimage search.
    pub searched: usize,
}

pub struct Forger<'a, S = UniformSpace> {
    pk: &'a PublicKey,
    space: S,
    config: ForgeConfig,
    cancel: CancelToken,
    /// Whether `cancel` belongs to the caller, see [`Forger::cancel_with`].
    external_cancel: bool,
    state: ForgeState,
}

impl<'a> Forger<'a, UniformSpace> {
    pub fn new(pk: &'a PublicKey) -> Self {
        Self::with_space(pk, UniformSpace)
    }
}

impl<'a, S: CandidateSpace> Forger<'a, S> {
    /// Creates a forger that draws search candidates from `space`.
    pub fn with_space(pk: &'a PublicKey, space: S) -> Self {
        Self {
            pk,
            space,
            config: ForgeConfig::default(),
            cancel: CancelToken::new(),
            external_cancel: false,
            state: ForgeState::Idle,
        }
    }

    pub fn config(mut self, config: ForgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses an externally owned token to cancel the search.
    /// The forger never resets it, so once cancelled every later run fails
    /// until the caller calls [`CancelToken::reset`].
    pub fn cancel_with(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self.external_cancel = true;
        self
    }

    /// Handle for cancelling the next or currently running search.
    /// Unless set through [`Forger::cancel_with`], the token is reset after a
    /// cancelled run, so the following run starts uncancelled.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// State of the most recent run.
    pub fn state(&self) -> ForgeState {
        self.state
    }

    /// Verifies observed signatures against their messages.
    /// Returns the number of valid ones; invalid ones are logged.
    pub fn check_observed(&self, observed: &[(&[u8], &Signature)]) -> usize {
        let mut valid = 0;
        for (i, (msg, sig)) in observed.iter().enumerate() {
            if self.pk.verify(msg, sig) {
                valid += 1;
            } else {
                warn!(index = i, "observed signature does not verify");
            }
        }
        valid
    }

    /// Forges a signature on `msg` from the preimages revealed by `observed`.
    pub fn forge(&mut self, observed: &[Signature], msg: &[u8]) -> Result<Forgery> {
        self.state = ForgeState::Idle;
        match self.run(observed, msg) {
            Ok(forgery) => {
                self.transition(ForgeState::Signed);
                Ok(forgery)
            }
            Err(e @ Error::Cancelled { .. }) => {
                warn!(error = %e, "forgery cancelled");
                if !self.external_cancel {
                    self.cancel.reset();
                }
                self.transition(ForgeState::Failed);
                Err(e)
            }
            Err(e) => {
                error!(error = %e, "forgery failed");
                self.transition(ForgeState::Failed);
                Err(e)
            }
        }
    }

    fn run(&mut self, observed: &[Signature], msg: &[u8]) -> Result<Forgery> {
        self.transition(ForgeState::Harvesting);
        let (partial, unresolved) = harvest(self.pk, observed);
        info!(
            signatures = observed.len(),
            known = SLOTS - unresolved.len(),
            unresolved = unresolved.len(),
            "harvested revealed preimages"
        );

        self.transition(ForgeState::Searching);
        let recovered = self.run_search(&unresolved)?;
        let attempts: u64 = recovered.iter().map(|r| r.attempts).sum();
        info!(slots = recovered.len(), attempts, "preimage search finished");

        self.transition(ForgeState::Assembling);
        let sk = assemble(self.pk, partial, &recovered)?;

        Ok(Forgery {
            message: msg.to_vec(),
            signature: sk.sign(msg),
            harvested: SLOTS - unresolved.len(),
            searched: recovered.len(),
        })
    }

    fn run_search(&self, unresolved: &[SlotIndex]) -> Result<Vec<Recovered>> {
        if unresolved.is_empty() {
            return search(self.pk, unresolved, &self.space, &self.cancel);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .thread_name(|i| format!("preimage-search-{}", i))
            .build()?;
        pool.install(|| search(self.pk, unresolved, &self.space, &self.cancel))
    }

    fn transition(&mut self, next: ForgeState) {
        debug!(from = ?self.state, to = ?next, "forge state");
        self.state = next;
    }
}

/// Forges a signature on `msg` with the default configuration.
pub fn forge(pk: &PublicKey, observed: &[Signature], msg: &[u8]) -> Result<Forgery> {
    Forger::new(pk).forge(observed, msg)
}

/// Fills the search results into the harvested key and checks the result.
fn assemble(
    pk: &PublicKey,
    mut partial: PartialSecretKey,
    recovered: &[Recovered],
) -> Result<SecretKey> {
    for r in recovered {
        if !partial.insert(r.slot, r.preimage) {
            return Err(Error::InconsistentKey { slot: r.slot });
        }
    }

    let sk = partial.complete()?;
    sk.check(pk)?;
    Ok(sk)
}
