//! Common types used across fsgate

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Hash Algorithms
// =============================================================================

/// A stored-hash format with no recognizable shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Unsupported hash algorithm")]
pub struct UnsupportedAlgorithm;

/// Password hash algorithm supported by the platform
///
/// The crypt-class algorithms are the salted `crypt(3)` formats used by
/// system account files; the raw-class algorithms are plain unsalted digests
/// kept for compatibility with imported account databases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HashAlgo {
    CryptMd5,
    CryptSha256,
    CryptSha512,
    RawMd5,
    RawSha1,
    RawSha256,
    RawSha512,
}

impl HashAlgo {
    /// All supported algorithms, in a stable order
    pub const ALL: [HashAlgo; 7] = [
        Self::CryptMd5,
        Self::CryptSha256,
        Self::CryptSha512,
        Self::RawMd5,
        Self::RawSha1,
        Self::RawSha256,
        Self::RawSha512,
    ];

    /// The wire name of this algorithm
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CryptMd5 => "crypt-md5",
            Self::CryptSha256 => "crypt-sha256",
            Self::CryptSha512 => "crypt-sha512",
            Self::RawMd5 => "raw-md5",
            Self::RawSha1 => "raw-sha1",
            Self::RawSha256 => "raw-sha256",
            Self::RawSha512 => "raw-sha512",
        }
    }

    /// Whether this is a salted `crypt(3)` format
    pub fn is_crypt(&self) -> bool {
        matches!(self, Self::CryptMd5 | Self::CryptSha256 | Self::CryptSha512)
    }

    /// Classify a stored hash by its shape
    ///
    /// Modular-crypt prefixes are checked first, then pure-hex digest
    /// lengths, so a prefixed string of coincidental hex length is always
    /// treated as crypt-class.
    pub fn detect(stored: &str) -> Result<Self, UnsupportedAlgorithm> {
        let stored = stored.trim();
        if stored.starts_with("$1$") {
            return Ok(Self::CryptMd5);
        }
        if stored.starts_with("$5$") {
            return Ok(Self::CryptSha256);
        }
        if stored.starts_with("$6$") {
            return Ok(Self::CryptSha512);
        }

        let lower = stored.to_ascii_lowercase();
        if is_hex_of_len(&lower, 32) {
            return Ok(Self::RawMd5);
        }
        if is_hex_of_len(&lower, 40) {
            return Ok(Self::RawSha1);
        }
        if is_hex_of_len(&lower, 64) {
            return Ok(Self::RawSha256);
        }
        if is_hex_of_len(&lower, 128) {
            return Ok(Self::RawSha512);
        }
        Err(UnsupportedAlgorithm)
    }
}

impl std::fmt::Display for HashAlgo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HashAlgo {
    type Err = UnsupportedAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "crypt-md5" => Ok(Self::CryptMd5),
            "crypt-sha256" => Ok(Self::CryptSha256),
            "crypt-sha512" => Ok(Self::CryptSha512),
            "raw-md5" => Ok(Self::RawMd5),
            "raw-sha1" => Ok(Self::RawSha1),
            "raw-sha256" => Ok(Self::RawSha256),
            "raw-sha512" => Ok(Self::RawSha512),
            _ => Err(UnsupportedAlgorithm),
        }
    }
}

fn is_hex_of_len(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_hexdigit())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_algo_display_round_trip() {
        for algo in HashAlgo::ALL {
            assert_eq!(algo.to_string().parse::<HashAlgo>().unwrap(), algo);
        }
    }

    #[test]
    fn test_hash_algo_parse_is_lenient_about_case_and_spacing() {
        assert_eq!(
            " Crypt-SHA512 ".parse::<HashAlgo>().unwrap(),
            HashAlgo::CryptSha512
        );
        assert_eq!("RAW-MD5".parse::<HashAlgo>().unwrap(), HashAlgo::RawMd5);
        assert!("sha256".parse::<HashAlgo>().is_err());
        assert!("".parse::<HashAlgo>().is_err());
    }

    #[test]
    fn test_is_crypt_classification() {
        assert!(HashAlgo::CryptMd5.is_crypt());
        assert!(HashAlgo::CryptSha256.is_crypt());
        assert!(HashAlgo::CryptSha512.is_crypt());
        assert!(!HashAlgo::RawMd5.is_crypt());
        assert!(!HashAlgo::RawSha1.is_crypt());
        assert!(!HashAlgo::RawSha256.is_crypt());
        assert!(!HashAlgo::RawSha512.is_crypt());
    }

    #[test]
    fn test_detect_crypt_prefixes() {
        assert_eq!(
            HashAlgo::detect("$1$abcd0123$U.n6Jj1fRNp16L12zcPVi.").unwrap(),
            HashAlgo::CryptMd5
        );
        assert_eq!(
            HashAlgo::detect("$5$rounds=5000$saltsalt$whatever").unwrap(),
            HashAlgo::CryptSha256
        );
        assert_eq!(
            HashAlgo::detect("$6$rounds=5000$saltsalt$whatever").unwrap(),
            HashAlgo::CryptSha512
        );
        // Leading/trailing whitespace is tolerated for classification
        assert_eq!(
            HashAlgo::detect("  $6$salt$digest  ").unwrap(),
            HashAlgo::CryptSha512
        );
    }

    #[test]
    fn test_detect_raw_digest_lengths() {
        assert_eq!(
            HashAlgo::detect("5f4dcc3b5aa765d61d8327deb882cf99").unwrap(),
            HashAlgo::RawMd5
        );
        assert_eq!(
            HashAlgo::detect("af6daf5f1a60c91f73361dd476c97e496beda065").unwrap(),
            HashAlgo::RawSha1
        );
        assert_eq!(
            HashAlgo::detect(&"a".repeat(64)).unwrap(),
            HashAlgo::RawSha256
        );
        assert_eq!(
            HashAlgo::detect(&"0".repeat(128)).unwrap(),
            HashAlgo::RawSha512
        );
        // Uppercase hex still classifies
        assert_eq!(
            HashAlgo::detect("5F4DCC3B5AA765D61D8327DEB882CF99").unwrap(),
            HashAlgo::RawMd5
        );
    }

    #[test]
    fn test_detect_rejects_unknown_shapes() {
        assert!(HashAlgo::detect("").is_err());
        assert!(HashAlgo::detect("plaintext").is_err());
        // Wrong digest lengths
        assert!(HashAlgo::detect(&"a".repeat(31)).is_err());
        assert!(HashAlgo::detect(&"a".repeat(65)).is_err());
        // Non-hex at a digest length
        assert!(HashAlgo::detect(&"g".repeat(32)).is_err());
        // Unsupported crypt families
        assert!(HashAlgo::detect("$2a$10$abcdefghijklmnopqrstuv").is_err());
        assert!(HashAlgo::detect("$7$salt$digest").is_err());
        assert!(HashAlgo::detect("$argon2id$v=19$m=19456,t=2,p=1$x$y").is_err());
    }

    #[test]
    fn test_serde_wire_names() {
        let json = serde_json::to_string(&HashAlgo::CryptSha256).unwrap();
        assert_eq!(json, "\"crypt-sha256\"");
        let parsed: HashAlgo = serde_json::from_str("\"raw-sha512\"").unwrap();
        assert_eq!(parsed, HashAlgo::RawSha512);
    }
}
