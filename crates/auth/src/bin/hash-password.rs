#!/usr/bin/env cargo
//! Password hashing utility for fsgate
//!
//! Produces password hashes in a supported storage format for seeding admin
//! accounts without exposing plaintext passwords.
//!
//! Usage:
//!   cargo run --bin hash-password
//!   cargo run --bin hash-password "MySecurePassword123!"
//!   cargo run --bin hash-password "MySecurePassword123!" crypt-sha512
//!
//! The default algorithm, rounds and salt length come from the
//! FSGATE_HASH_* environment variables; a second argument overrides the
//! algorithm for this run.
//!
//! Example output:
//!   $5$rounds=5000$UsrDbA3Jg1syynVi$...

use std::env;
use std::io::{self, Write};

use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;

use fsgate_auth::config::HasherConfig;
use fsgate_auth::hasher::Hasher;
use fsgate_shared::HashAlgo;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let password = if let Some(pwd) = env::args().nth(1) {
        // Password provided as argument
        pwd
    } else {
        // Read password from stdin (doesn't show in the process list)
        print!("Enter password to hash: ");
        io::stdout().flush()?;

        let mut password = String::new();
        io::stdin().read_line(&mut password)?;
        password.trim().to_string()
    };

    if password.is_empty() {
        bail!("Password cannot be empty");
    }

    if password.len() < 12 {
        eprintln!(
            "Warning: Password is less than 12 characters. Consider using a longer password."
        );
    }

    let hasher = Hasher::from_config(&HasherConfig::from_env()?)?;
    let algorithm = match env::args().nth(2) {
        Some(name) => name.parse::<HashAlgo>().with_context(|| {
            format!("Unknown algorithm {name:?}, supported: {}", supported_list())
        })?,
        None => hasher.default_algorithm(),
    };

    let hash = hasher.hash(&password, algorithm, None, None)?;

    println!("\n===========================================");
    println!("Password Hash ({algorithm}):");
    println!("===========================================");
    println!("{hash}");
    println!("===========================================\n");

    println!("Store the value in the account's stored_hash field; verification");
    println!("detects the algorithm from the stored hash itself.");

    Ok(())
}

fn supported_list() -> String {
    HashAlgo::ALL
        .iter()
        .map(|a| a.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
