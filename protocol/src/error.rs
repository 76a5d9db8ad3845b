//! Error taxonomy for the transaction layer.
//!
//! Every public operation returns [`Error`]. The variants map one-to-one onto
//! the ways a build/sign/submit cycle can go wrong, and the split matters to
//! callers:
//!
//! - [`Error::InvalidInput`] never touched the network. Fix the input (or
//!   the client configuration).
//! - [`Error::AccountNotFound`], [`Error::NetworkUnreachable`] and
//!   [`Error::UnexpectedResponse`] happened while reading ledger state.
//! - [`Error::SubmissionRejected`] means the network saw the envelope and
//!   refused it. The payload says why.
//! - [`Error::Signing`] and [`Error::InternalEncoding`] are terminal.
//!
//! Nothing in this crate retries. A submit that fails with
//! `NetworkUnreachable` may still have landed; only the caller can decide
//! whether to re-check the account's sequence before trying again.

use thiserror::Error;

use crate::config::ConfigError;
use crate::crypto::keys::KeyError;
use crate::horizon::types::Rejection;
use crate::transaction::signing::SigningError;
use crate::transaction::xdr::CodecError;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed transport error, preserved as the `source` of network failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error for every operation in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed address, amount, key or transaction shape. Raised before
    /// any I/O.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),

    /// The network has no record of the account.
    #[error("account {account} not found on the network")]
    AccountNotFound { account: String },

    /// The network API could not be reached (connect failure, timeout, ...).
    #[error("failed to reach network API at {url}")]
    NetworkUnreachable {
        url: String,
        #[source]
        source: BoxError,
    },

    /// The network API answered, but not in a way we understand.
    #[error("unexpected response from {url} (status {status}): {body}")]
    UnexpectedResponse {
        url: String,
        status: u16,
        body: String,
    },

    /// The network accepted the connection but rejected the transaction.
    #[error("transaction rejected: {0}")]
    SubmissionRejected(Rejection),

    /// Cryptographic failure while signing. Never retryable.
    #[error("signing failed: {0}")]
    Signing(#[from] SigningError),

    /// The envelope could not be serialized. Indicates a bug upstream.
    #[error("internal encoding error: {0}")]
    InternalEncoding(#[from] CodecError),
}

impl Error {
    /// `true` for errors raised before any network interaction.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// The rejection payload, if the network refused the transaction.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::SubmissionRejected(r) => Some(r),
            _ => None,
        }
    }
}

impl From<KeyError> for Error {
    fn from(e: KeyError) -> Self {
        Self::InvalidInput(InputError::from(e))
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::InvalidInput(InputError::InvalidConfig(e))
    }
}

/// Validation failures. Each one is detected locally, without I/O.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("invalid amount {amount:?}: {reason}")]
    InvalidAmount { amount: String, reason: &'static str },

    #[error("{0}")]
    InvalidAddress(KeyError),

    #[error("{0}")]
    InvalidSecretSeed(KeyError),

    #[error("secret seed does not derive address {expected}")]
    KeypairMismatch { expected: String },

    #[error("invalid asset: {0}")]
    InvalidAsset(String),

    #[error("expected ADDRESS,AMOUNT, got {0:?}")]
    InvalidFunding(String),

    #[error("transaction has no operations")]
    EmptyTransaction,

    #[error("transaction has {count} operations, the ceiling is {max}")]
    TooManyOperations { count: usize, max: usize },

    #[error("fee of {base_fee} x {operations} operations does not fit in 32 bits")]
    FeeOverflow { base_fee: u32, operations: usize },

    #[error("sequence number overflow")]
    SequenceOverflow,

    #[error("no source account was supplied to the builder")]
    MissingSource,

    #[error("no sequence number was supplied to the builder")]
    MissingSequence,

    #[error("no network passphrase was supplied to the builder")]
    MissingNetwork,

    #[error("a secret seed is required to sign for {address}")]
    MissingSecret { address: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl From<KeyError> for InputError {
    fn from(e: KeyError) -> Self {
        match e {
            KeyError::InvalidAddress(_) => Self::InvalidAddress(e),
            KeyError::KeypairMismatch { expected } => Self::KeypairMismatch { expected },
            KeyError::InvalidSecretSeed(_) | KeyError::PublicAddressGiven => {
                Self::InvalidSecretSeed(e)
            }
        }
    }
}
