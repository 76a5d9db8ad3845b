//! # Identity Module
//!
//! Who a transaction acts for. An [`AccountIdentity`] is a public address,
//! optionally paired with the secret seed that controls it.
//!
//! Callers hand us strings. A `G...` string is an address; an `S...` string
//! is a seed and implies its address. Anything that *looks* like a seed but
//! fails to parse is rejected here, before any network call, so a typo in a
//! secret never turns into a confusing `account not found` from the network.

use std::fmt;

use crate::crypto::keys::{KeyError, Keypair, PublicKey};
use crate::crypto::strkey::Version;

/// A public address plus, optionally, the key material that controls it.
///
/// Invariant: when a keypair is present it derives exactly `public_key`.
#[derive(Clone, PartialEq, Eq)]
pub struct AccountIdentity {
    public_key: PublicKey,
    keypair: Option<Keypair>,
}

impl AccountIdentity {
    /// Parses either a `G...` address or an `S...` seed.
    ///
    /// The first character decides which parser runs, so an invalid seed is
    /// reported as [`KeyError::InvalidSecretSeed`] and not as a bad address.
    pub fn parse(s: &str) -> Result<Self, KeyError> {
        let s = s.trim();
        if s.starts_with(Version::SecretSeed.prefix()) {
            Self::from_secret_seed(s)
        } else {
            Ok(Self::public(PublicKey::from_address(s)?))
        }
    }

    /// Parses a seed. A public address here is [`KeyError::PublicAddressGiven`].
    pub fn from_secret_seed(seed: &str) -> Result<Self, KeyError> {
        Ok(Self::from_keypair(Keypair::from_secret_seed(seed)?))
    }

    /// Pairs an address with a seed, checking the seed derives the address.
    pub fn with_secret(address: &str, seed: &str) -> Result<Self, KeyError> {
        let public_key = PublicKey::from_address(address)?;
        let keypair = Keypair::from_secret_seed(seed)?;
        if keypair.public_key() != public_key {
            return Err(KeyError::KeypairMismatch {
                expected: public_key.address(),
            });
        }
        Ok(Self {
            public_key,
            keypair: Some(keypair),
        })
    }

    pub fn public(public_key: PublicKey) -> Self {
        Self {
            public_key,
            keypair: None,
        }
    }

    pub fn from_keypair(keypair: Keypair) -> Self {
        Self {
            public_key: keypair.public_key(),
            keypair: Some(keypair),
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn address(&self) -> String {
        self.public_key.address()
    }

    pub fn keypair(&self) -> Option<&Keypair> {
        self.keypair.as_ref()
    }

    pub fn can_sign(&self) -> bool {
        self.keypair.is_some()
    }
}

impl fmt::Debug for AccountIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountIdentity")
            .field("address", &self.address())
            .field("can_sign", &self.can_sign())
            .finish()
    }
}

impl fmt::Display for AccountIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.public_key, f)
    }
}
