//! # StrKey: textual key encoding
//!
//! The network never shows raw key bytes to humans. Public addresses and
//! secret seeds travel as "strkeys": a version byte, the 32-byte payload and
//! a CRC16-XModem checksum, all base32-encoded without padding.
//!
//! ```text
//! +---------+------------------+-----------+
//! | version |   payload (32)   | crc16 LE  |   -> base32 -> 56 chars
//! +---------+------------------+-----------+
//! ```
//!
//! The codec itself is `stellar-strkey`. This module narrows it to the two
//! kinds of key an account holder deals with and names the failures.

use stellar_strkey::{ed25519, Strkey};
use thiserror::Error;

use crate::config::KEY_LENGTH;

/// Length of an encoded account strkey.
pub const ENCODED_LENGTH: usize = 56;

/// What kind of key a strkey carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    /// `G...`: ed25519 public key (account address).
    PublicKey,
    /// `S...`: ed25519 secret seed.
    SecretSeed,
}

impl Version {
    /// First character of every strkey of this version.
    pub fn prefix(self) -> char {
        match self {
            Self::PublicKey => 'G',
            Self::SecretSeed => 'S',
        }
    }
}

/// Why a strkey could not be decoded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StrKeyError {
    /// Bad length, alphabet, version byte or checksum.
    #[error("malformed strkey")]
    Malformed,

    /// A valid strkey of a kind accounts are not identified by (muxed
    /// accounts, hashes, contracts).
    #[error("unsupported strkey kind {0:?}")]
    UnsupportedKind(char),

    #[error("expected a {expected:?} strkey, got a {got:?}")]
    WrongVersion { expected: Version, got: Version },
}

/// Encodes a 32-byte key under the given version.
pub fn encode(version: Version, payload: &[u8; KEY_LENGTH]) -> String {
    let strkey = match version {
        Version::PublicKey => Strkey::PublicKeyEd25519(ed25519::PublicKey(*payload)),
        Version::SecretSeed => Strkey::PrivateKeyEd25519(ed25519::PrivateKey(*payload)),
    };
    strkey.to_string()
}

/// Decodes a strkey of either account version.
pub fn decode_any(s: &str) -> Result<(Version, [u8; KEY_LENGTH]), StrKeyError> {
    match Strkey::from_string(s) {
        Ok(Strkey::PublicKeyEd25519(ed25519::PublicKey(bytes))) => {
            Ok((Version::PublicKey, bytes))
        }
        Ok(Strkey::PrivateKeyEd25519(ed25519::PrivateKey(bytes))) => {
            Ok((Version::SecretSeed, bytes))
        }
        Ok(_) => Err(StrKeyError::UnsupportedKind(s.chars().next().unwrap_or('?'))),
        Err(_) => Err(StrKeyError::Malformed),
    }
}

/// Decodes a strkey and insists on a specific version.
pub fn decode(expected: Version, s: &str) -> Result<[u8; KEY_LENGTH], StrKeyError> {
    let (got, payload) = decode_any(s)?;
    if got != expected {
        return Err(StrKeyError::WrongVersion { expected, got });
    }
    Ok(payload)
}
