//! # Key Management
//!
//! Ed25519 keypairs and public addresses, parsed from and rendered to their
//! strkey form (`S...` seeds, `G...` addresses).
//!
//! Key generation is deliberately absent. Accounts are created elsewhere; this
//! crate only ever *receives* key material from its caller.
//!
//! ## Security considerations
//!
//! - Private keys are zeroized on drop (thanks, ed25519-dalek).
//! - Seeds are never logged and never appear in `Debug` output.

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::strkey::{self, StrKeyError, Version};
use crate::config::{KEY_LENGTH, SIGNATURE_HINT_LENGTH, SIGNATURE_LENGTH};

/// Errors that can occur while parsing or using key material.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid secret seed: {0}")]
    InvalidSecretSeed(StrKeyError),

    #[error("not a secret seed, this is a public address")]
    PublicAddressGiven,

    #[error("invalid public address: {0}")]
    InvalidAddress(StrKeyError),

    #[error("secret seed does not derive address {expected}")]
    KeypairMismatch { expected: String },
}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// An account address: 32 bytes of Ed25519 public key.
///
/// Displays and serializes as the `G...` strkey, never as hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey {
    bytes: [u8; KEY_LENGTH],
}

impl PublicKey {
    /// Wraps raw key bytes. Curve validity is checked lazily, at verification.
    pub fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { bytes }
    }

    /// Parses a `G...` address.
    ///
    /// Seeds are rejected here with a dedicated error. Handing a secret to a
    /// function that wants an address is a mistake worth naming precisely.
    pub fn from_address(address: &str) -> Result<Self, KeyError> {
        match strkey::decode(Version::PublicKey, address.trim()) {
            Ok(bytes) => Ok(Self { bytes }),
            Err(e) => Err(KeyError::InvalidAddress(e)),
        }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.bytes
    }

    /// The `G...` strkey.
    pub fn address(&self) -> String {
        strkey::encode(Version::PublicKey, &self.bytes)
    }

    /// Signature hint: the last four bytes of the key. Lets the network find
    /// the right signer without trying every key on the account.
    pub fn hint(&self) -> [u8; SIGNATURE_HINT_LENGTH] {
        let mut hint = [0u8; SIGNATURE_HINT_LENGTH];
        hint.copy_from_slice(&self.bytes[KEY_LENGTH - SIGNATURE_HINT_LENGTH..]);
        hint
    }

    /// Verifies an Ed25519 signature over `message`.
    ///
    /// Returns `false` for invalid points as well as bad signatures; callers
    /// only ever want a yes/no here.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let dalek_sig = DalekSignature::from_bytes(&signature.bytes);
        verifying_key.verify(message, &dalek_sig).is_ok()
    }
}

impl FromStr for PublicKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_address(s)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.address())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.address())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_address(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A detached Ed25519 signature. Always exactly 64 bytes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    bytes: [u8; SIGNATURE_LENGTH],
}

impl Signature {
    pub fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        write!(f, "Signature({}...{})", &hex_str[..8], &hex_str[120..])
    }
}

// ---------------------------------------------------------------------------
// Keypair
// ---------------------------------------------------------------------------

/// An Ed25519 signing key together with the address it controls.
///
/// Intentionally not `Serialize`. Exporting a seed should be a conscious
/// call to [`Keypair::secret_seed`], not a side effect of dumping a struct
/// to JSON.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Builds a keypair from raw 32-byte seed material.
    pub fn from_seed_bytes(seed: &[u8; KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Parses an `S...` secret seed.
    ///
    /// A well-formed `G...` address yields [`KeyError::PublicAddressGiven`]
    /// rather than a generic decoding failure.
    pub fn from_secret_seed(seed: &str) -> Result<Self, KeyError> {
        match strkey::decode(Version::SecretSeed, seed.trim()) {
            Ok(bytes) => Ok(Self::from_seed_bytes(&bytes)),
            Err(StrKeyError::WrongVersion {
                got: Version::PublicKey,
                ..
            }) => Err(KeyError::PublicAddressGiven),
            Err(e) => Err(KeyError::InvalidSecretSeed(e)),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_bytes(self.signing_key.verifying_key().to_bytes())
    }

    /// The `G...` address this keypair controls.
    pub fn address(&self) -> String {
        self.public_key().address()
    }

    /// The `S...` seed. Handle with care.
    pub fn secret_seed(&self) -> String {
        strkey::encode(Version::SecretSeed, &self.signing_key.to_bytes())
    }

    /// Deterministic Ed25519 signature over `message`.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature::from_bytes(self.signing_key.sign(message).to_bytes())
    }

    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.public_key().verify(message, signature)
    }
}

impl Clone for Keypair {
    fn clone(&self) -> Self {
        Self::from_seed_bytes(&self.signing_key.to_bytes())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print seed material, not even partially.
        write!(f, "Keypair(pub={})", self.address())
    }
}

impl PartialEq for Keypair {
    fn eq(&self, other: &Self) -> bool {
        self.public_key() == other.public_key()
    }
}

impl Eq for Keypair {}
