//! Password and secret hashing
//!
//! Produces and verifies crypt(3)-style hashes (`$1$`, `$5$`, `$6$`) plus
//! legacy raw hex digests, and generates random API key secrets. Stored
//! hashes are matched to their algorithm by shape, so verification works
//! across algorithm migrations.

use md5::Md5;
use pwhash::{md5_crypt, sha256_crypt, sha512_crypt, HashSetup};
use rand::rngs::OsRng;
use rand::RngCore;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use thiserror::Error;

use fsgate_shared::{HashAlgo, UnsupportedAlgorithm};

use crate::auth::constant_time_eq;
use crate::config::HasherConfig;

// Bounds for tunable crypt(3) parameters
pub const MIN_ROUNDS: u32 = 1_000;
pub const MAX_ROUNDS: u32 = 1_000_000;
pub const MAX_SALT_LENGTH: usize = 16;
const MD5_SALT_LENGTH: usize = 8;

// The salt alphabet crypt(3) understands
const CRYPT_ALPHABET: &[u8; 64] =
    b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

// Bounds for generated API key secrets, in bytes
const MIN_SECRET_BYTES: usize = 16;
const MAX_SECRET_BYTES: usize = 128;
const DEFAULT_SECRET_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum HasherError {
    #[error("Rounds must be between {MIN_ROUNDS} and {MAX_ROUNDS}, got {0}")]
    InvalidRounds(u32),
    #[error("Salt length must be between 1 and {MAX_SALT_LENGTH}, got {0}")]
    InvalidSaltLength(usize),
    #[error("Default algorithm must be a crypt(3) scheme, got {0}")]
    NonCryptDefault(HashAlgo),
    #[error(transparent)]
    Unsupported(#[from] UnsupportedAlgorithm),
    #[error("Crypt hashing failed: {0}")]
    Crypt(String),
    #[error("Random generation failed: {0}")]
    Rng(String),
}

/// Hashes passwords with a configured default algorithm and parameters
#[derive(Debug, Clone)]
pub struct Hasher {
    default_algorithm: HashAlgo,
    default_rounds: u32,
    default_salt_length: usize,
}

impl Hasher {
    /// Known-good defaults: sha256-crypt, 5000 rounds, 16 character salt
    pub fn new() -> Self {
        Self {
            default_algorithm: HashAlgo::CryptSha256,
            default_rounds: 5_000,
            default_salt_length: 16,
        }
    }

    /// Build a hasher from configuration, rejecting raw digests as the
    /// default and out-of-range parameters up front
    pub fn from_config(config: &HasherConfig) -> Result<Self, HasherError> {
        let default_algorithm: HashAlgo = config.default_algorithm.parse()?;
        if !default_algorithm.is_crypt() {
            return Err(HasherError::NonCryptDefault(default_algorithm));
        }
        validate_params(config.default_rounds, config.default_salt_length)?;
        Ok(Self {
            default_algorithm,
            default_rounds: config.default_rounds,
            default_salt_length: config.default_salt_length,
        })
    }

    pub fn default_algorithm(&self) -> HashAlgo {
        self.default_algorithm
    }

    /// Hash with the configured default algorithm and parameters
    pub fn default_hash(&self, plain: &str) -> Result<String, HasherError> {
        self.hash(plain, self.default_algorithm, None, None)
    }

    /// Hash with an explicit algorithm; `rounds` and `salt_length` fall back
    /// to the configured defaults for crypt(3) schemes
    pub fn hash(
        &self,
        plain: &str,
        algorithm: HashAlgo,
        rounds: Option<u32>,
        salt_length: Option<usize>,
    ) -> Result<String, HasherError> {
        if algorithm.is_crypt() {
            let rounds = rounds.unwrap_or(self.default_rounds);
            let salt_length = salt_length.unwrap_or(self.default_salt_length);
            validate_params(rounds, salt_length)?;
            let salt = random_salt(salt_length)?;
            crypt_hash(algorithm, plain, rounds, &salt)
        } else {
            // Raw digests take no parameters; any provided are ignored unchecked
            Ok(raw_digest_hex(algorithm, plain))
        }
    }

    /// Check a password against a stored hash, reporting which algorithm
    /// the hash uses
    pub fn verify(&self, plain: &str, stored: &str) -> Result<(bool, HashAlgo), HasherError> {
        let algorithm = HashAlgo::detect(stored)?;
        let matches = match algorithm {
            HashAlgo::CryptMd5 => verify_md5_crypt(plain, stored),
            HashAlgo::CryptSha256 => sha256_crypt::verify(plain, stored),
            HashAlgo::CryptSha512 => sha512_crypt::verify(plain, stored),
            _ => {
                let computed = raw_digest_hex(algorithm, plain);
                constant_time_eq(stored.to_ascii_lowercase().as_bytes(), computed.as_bytes())
            }
        };
        Ok((matches, algorithm))
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a random API key secret; sizes outside [16, 128] bytes fall
/// back to 32
pub fn generate_secret(requested_size: Option<usize>) -> Result<Vec<u8>, HasherError> {
    let size = match requested_size {
        Some(n) if (MIN_SECRET_BYTES..=MAX_SECRET_BYTES).contains(&n) => n,
        _ => DEFAULT_SECRET_BYTES,
    };
    let mut buf = vec![0u8; size];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| HasherError::Rng(e.to_string()))?;
    Ok(buf)
}

fn validate_params(rounds: u32, salt_length: usize) -> Result<(), HasherError> {
    if !(MIN_ROUNDS..=MAX_ROUNDS).contains(&rounds) {
        return Err(HasherError::InvalidRounds(rounds));
    }
    if salt_length == 0 || salt_length > MAX_SALT_LENGTH {
        return Err(HasherError::InvalidSaltLength(salt_length));
    }
    Ok(())
}

fn random_salt(length: usize) -> Result<String, HasherError> {
    let mut buf = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| HasherError::Rng(e.to_string()))?;
    // 256 % 64 == 0, so a plain modulus stays unbiased
    Ok(buf
        .iter()
        .map(|b| CRYPT_ALPHABET[(b % 64) as usize] as char)
        .collect())
}

// pwhash marks the crypt(3) hashers deprecated; the stored formats are fixed
#[allow(deprecated)]
fn crypt_hash(
    algorithm: HashAlgo,
    plain: &str,
    rounds: u32,
    salt: &str,
) -> Result<String, HasherError> {
    let result = match algorithm {
        HashAlgo::CryptSha256 => sha256_crypt::hash_with(
            HashSetup {
                salt: Some(salt),
                rounds: Some(rounds),
            },
            plain,
        ),
        HashAlgo::CryptSha512 => sha512_crypt::hash_with(
            HashSetup {
                salt: Some(salt),
                rounds: Some(rounds),
            },
            plain,
        ),
        // MD5 crypt has no rounds parameter and caps the salt at 8 characters
        _ => md5_crypt::hash_with(
            HashSetup {
                salt: Some(&salt[..salt.len().min(MD5_SALT_LENGTH)]),
                rounds: None,
            },
            plain,
        ),
    };
    result.map_err(|e| HasherError::Crypt(e.to_string()))
}

/// md5-crypt verification that also accepts legacy salts
///
/// Older frontends handed md5-crypt a literal `rounds=<n>` spec, which it
/// took as the salt truncated to 8 chars, so stored hashes of the form
/// `$1$rounds=5$...` exist. pwhash refuses `=` in a salt; those hashes are
/// re-derived here with the salt embedded in the stored string.
fn verify_md5_crypt(plain: &str, stored: &str) -> bool {
    if md5_crypt::verify(plain, stored) {
        return true;
    }
    match legacy_md5_salt(stored) {
        Some(salt) => {
            let derived = md5_crypt_with_salt(plain.as_bytes(), salt);
            constant_time_eq(derived.as_bytes(), stored.as_bytes())
        }
        None => false,
    }
}

/// The embedded salt of a stored `$1$` hash, only when it falls outside the
/// crypt alphabet and pwhash cannot process it
fn legacy_md5_salt(stored: &str) -> Option<&str> {
    let rest = stored.strip_prefix("$1$")?;
    let salt = rest.split('$').next()?;
    let salt = salt.get(..salt.len().min(MD5_SALT_LENGTH))?;
    if salt.bytes().all(|b| CRYPT_ALPHABET.contains(&b)) {
        None
    } else {
        Some(salt)
    }
}

/// md5-crypt (the `$1$` modular format) over an arbitrary salt
fn md5_crypt_with_salt(pass: &[u8], salt: &str) -> String {
    let salt_bytes = salt.as_bytes();

    let alt = {
        let mut ctx = Md5::new();
        ctx.update(pass);
        ctx.update(salt_bytes);
        ctx.update(pass);
        ctx.finalize()
    };

    let mut ctx = Md5::new();
    ctx.update(pass);
    ctx.update(b"$1$");
    ctx.update(salt_bytes);
    for i in 0..pass.len() {
        ctx.update([alt[i % 16]]);
    }
    let mut length = pass.len();
    while length > 0 {
        if length & 1 == 1 {
            ctx.update([0u8]);
        } else {
            ctx.update([pass[0]]);
        }
        length >>= 1;
    }
    let mut digest = ctx.finalize();

    // 1000 fixed strengthening rounds
    for round in 0..1000 {
        let mut ctx = Md5::new();
        if round % 2 == 1 {
            ctx.update(pass);
        } else {
            ctx.update(&digest[..]);
        }
        if round % 3 != 0 {
            ctx.update(salt_bytes);
        }
        if round % 7 != 0 {
            ctx.update(pass);
        }
        if round % 2 == 1 {
            ctx.update(&digest[..]);
        } else {
            ctx.update(pass);
        }
        digest = ctx.finalize();
    }

    // Digest bytes are interleaved before encoding; the last group carries
    // a single byte
    let mut encoded = String::with_capacity(22);
    for (a, b, c) in [(0, 6, 12), (1, 7, 13), (2, 8, 14), (3, 9, 15), (4, 10, 5)] {
        let group =
            (u32::from(digest[a]) << 16) | (u32::from(digest[b]) << 8) | u32::from(digest[c]);
        push_crypt64(&mut encoded, group, 4);
    }
    push_crypt64(&mut encoded, u32::from(digest[11]), 2);

    format!("$1${salt}${encoded}")
}

/// Append `chars` 6-bit groups of `value`, low bits first, in the crypt alphabet
fn push_crypt64(out: &mut String, mut value: u32, chars: usize) {
    for _ in 0..chars {
        out.push(CRYPT_ALPHABET[(value & 0x3f) as usize] as char);
        value >>= 6;
    }
}

fn raw_digest_hex(algorithm: HashAlgo, plain: &str) -> String {
    match algorithm {
        HashAlgo::RawMd5 => hex::encode(Md5::digest(plain.as_bytes())),
        HashAlgo::RawSha1 => hex::encode(Sha1::digest(plain.as_bytes())),
        HashAlgo::RawSha256 => hex::encode(Sha256::digest(plain.as_bytes())),
        _ => hex::encode(Sha512::digest(plain.as_bytes())),
    }
}
