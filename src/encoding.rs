// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! Byte and hex encodings of keys and signatures.
//!
//! A public key is all `BITS` zero-row digests followed by all `BITS` one-row
//! digests, each row in message bit order (bit 0 = most significant bit of the
//! digest). A signature is its `BITS` preimages in message bit order.

use crate::error::{Error, Result};
use crate::lamport::{Block, PublicKey, Signature, BITS, N};

pub const PUBLIC_KEY_BYTES: usize = 2 * BITS * N;
pub const SIGNATURE_BYTES: usize = BITS * N;

impl PublicKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        check_length("public key", bytes, PUBLIC_KEY_BYTES)?;
        let (zero, one) = bytes.split_at(BITS * N);

        let mut zero_hash = [[0u8; N]; BITS];
        let mut one_hash = [[0u8; N]; BITS];
        read_blocks(zero, &mut zero_hash);
        read_blocks(one, &mut one_hash);
        Ok(Self {
            zero_hash,
            one_hash,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(PUBLIC_KEY_BYTES);
        for digest in self.zero_hash.iter().chain(self.one_hash.iter()) {
            bytes.extend_from_slice(digest);
        }
        bytes
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        Self::from_bytes(&hex::decode(s.trim())?)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

impl Signature {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        check_length("signature", bytes, SIGNATURE_BYTES)?;
        let mut preimages = [[0u8; N]; BITS];
        read_blocks(bytes, &mut preimages);
        Ok(Self { preimages })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.preimages.concat()
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        Self::from_bytes(&hex::decode(s.trim())?)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

fn check_length(what: &'static str, bytes: &[u8], expected: usize) -> Result<()> {
    if bytes.len() != expected {
        return Err(Error::InvalidLength {
            what,
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// Length has to be checked by the caller.
fn read_blocks(bytes: &[u8], out: &mut [Block]) {
    for (block, chunk) in out.iter_mut().zip(bytes.chunks_exact(N)) {
        block.copy_from_slice(chunk);
    }
}
