//! # Cryptographic Primitives
//!
//! Everything that touches key material or digests:
//!
//! - **strkey**: the `G...`/`S...` textual encoding of keys.
//! - **keys**: Ed25519 keypairs, addresses and signatures.
//! - **hash**: SHA-256 and the network identifier derived from it.
//!
//! Everything here is a thin, type-safe wrapper around audited
//! implementations (`ed25519-dalek`, `sha2`).

pub mod hash;
pub mod keys;
pub mod strkey;

pub use hash::{network_id, sha256};
pub use keys::{KeyError, Keypair, PublicKey, Signature};
