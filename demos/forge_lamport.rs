// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! Signs four messages with one Lamport key and then forges a fifth.
//!
//! The secret preimages are drawn from a 16-bit space so that the missing
//! ones can be found by brute force in a reasonable amount of time.
//! Set `RUST_LOG=debug` to follow the individual steps.

use rand::thread_rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lamport_forge::{verify, ForgeConfig, Forger, Keypair, RestrictedSpace, Signature};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let space = RestrictedSpace::new(16);
    let kp = Keypair::generate(&space, &mut thread_rng());

    let messages = ["1", "2", "3", "4"];
    let sigs: Vec<Signature> = messages.iter().map(|m| kp.sign(m.as_bytes())).collect();

    let mut forger = Forger::with_space(&kp.pk, space).config(ForgeConfig::default());
    let observed: Vec<(&[u8], &Signature)> = messages
        .iter()
        .zip(sigs.iter())
        .map(|(m, s)| (m.as_bytes(), s))
        .collect();
    info!(
        valid = forger.check_observed(&observed),
        total = observed.len(),
        "checked observed signatures"
    );

    let forgery = forger.forge(&sigs, b"my forged message")?;
    let ok = verify(&forgery.message, &kp.pk, &forgery.signature);
    info!(
        harvested = forgery.harvested,
        searched = forgery.searched,
        verified = ok,
        "forged signature on {:?}",
        String::from_utf8_lossy(&forgery.message)
    );
    println!("{}", &forgery.signature.to_hex()[..64]);

    Ok(())
}
