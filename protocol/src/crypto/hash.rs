//! # Hashing Utilities
//!
//! The ledger uses exactly one hash function: SHA-256. It derives the network
//! identifier from the passphrase and it produces the digest that every
//! transaction signature covers. There's no reason to support more.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of `data`.
///
/// # Example
///
/// ```
/// use bos_protocol::crypto::sha256;
///
/// let hash = sha256(b"BOS protocol");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// The network identifier: `SHA-256(passphrase)`.
///
/// Mixed into every signature payload so an envelope signed for the test
/// network is worthless on the public one, and vice versa.
pub fn network_id(passphrase: &str) -> [u8; 32] {
    sha256(passphrase.as_bytes())
}
