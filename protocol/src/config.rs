//! # Protocol Configuration & Constants
//!
//! Every magic number the transaction layer depends on lives here, plus the
//! [`ClientConfig`] that tells a client which network API to talk to and how
//! long to wait for it.
//!
//! Several of these values are dictated by the ledger protocol itself
//! (operation ceiling, amount precision, envelope discriminants). Changing
//! them locally does not change the network; it only makes our envelopes
//! invalid.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Network Identifiers
// ---------------------------------------------------------------------------

/// Passphrase of the public production network.
pub const PUBLIC_NETWORK_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";

/// Passphrase of the public test network.
pub const TEST_NETWORK_PASSPHRASE: &str = "Test SDF Network ; September 2015";

// ---------------------------------------------------------------------------
// Amounts & Fees
// ---------------------------------------------------------------------------

/// Fractional digits of the native asset. One unit = 10^7 stroops.
pub const AMOUNT_DECIMALS: u32 = 7;

/// Stroops per whole unit of any asset.
pub const STROOPS_PER_UNIT: i64 = 10_000_000;

/// Default base fee per operation, in stroops. BOScoin charged 0.001 BOS per
/// operation, which is considerably more than the 100 stroops the public
/// network asks for. Override with `--fee` when targeting other networks.
pub const DEFAULT_BASE_FEE: u32 = 10_000;

/// Minimum balance an account must hold, in whole units. Creating an account
/// with less than this is rejected by the network (not by us).
pub const MINIMUM_BALANCE: &str = "0.1";

// ---------------------------------------------------------------------------
// Transaction Limits
// ---------------------------------------------------------------------------

/// Maximum number of operations in one transaction. Enforced by the network's
/// XDR schema (`Operation operations<100>`), so it's not negotiable.
pub const MAX_OPERATIONS_PER_TX: usize = 100;

/// Maximum number of signatures attached to one envelope.
pub const MAX_SIGNATURES: usize = 20;

// ---------------------------------------------------------------------------
// Wire Format
// ---------------------------------------------------------------------------

/// Which `TransactionEnvelope` arm submissions are wrapped in.
///
/// BOScoin nodes predate protocol 13 and only read the legacy layout
/// `{ Transaction tx; DecoratedSignature signatures<20>; }` with no envelope
/// type in front. That layout is byte-identical to the `ENVELOPE_TYPE_TX_V0`
/// arm. Current networks take both. Signatures cover the same payload either
/// way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeVersion {
    /// `ENVELOPE_TYPE_TX_V0` (0): ed25519 source key, no preconditions.
    #[default]
    Legacy,
    /// `ENVELOPE_TYPE_TX` (2): muxed source, preconditions.
    V1,
}

impl std::str::FromStr for EnvelopeVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" | "v0" => Ok(Self::Legacy),
            "v1" => Ok(Self::V1),
            other => Err(format!("unknown envelope version {other:?}, expected legacy or v1")),
        }
    }
}

/// Signature hints are the trailing 4 bytes of the signer's public key.
pub const SIGNATURE_HINT_LENGTH: usize = 4;

/// Ed25519 signature length.
pub const SIGNATURE_LENGTH: usize = 64;

/// Ed25519 public/secret key length.
pub const KEY_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Network Client
// ---------------------------------------------------------------------------

/// Default request timeout for every network call. A dead endpoint has to
/// surface as an error in seconds, not hang the submitter forever.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound accepted by [`ClientConfig::validate`].
pub const MAX_HTTP_TIMEOUT: Duration = Duration::from_secs(300);

/// Default network API endpoint (a local node).
pub const DEFAULT_HORIZON_URL: &str = "http://127.0.0.1:8000";

/// Errors raised when a [`ClientConfig`] doesn't make sense.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("network API url must not be empty")]
    EmptyUrl,

    #[error("network API url must start with http:// or https://, got {0}")]
    BadScheme(String),

    #[error("timeout must be between 1ms and {max_secs}s, got {got_ms}ms")]
    BadTimeout { got_ms: u128, max_secs: u64 },

    #[error("operation ceiling must be between 1 and {max}, got {got}")]
    BadCeiling { got: usize, max: usize },
}

/// Settings for a client talking to one network API instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the network API, e.g. `https://horizon-testnet.stellar.org`.
    pub horizon_url: String,

    /// Per-request timeout. Bounded; see [`MAX_HTTP_TIMEOUT`].
    #[serde(with = "duration_secs")]
    pub timeout: Duration,

    /// Fee per operation, in stroops.
    pub base_fee: u32,

    /// Operation ceiling used for validation and bulk planning.
    pub max_operations: usize,

    /// Envelope layout of submitted transactions.
    pub envelope: EnvelopeVersion,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            horizon_url: DEFAULT_HORIZON_URL.to_string(),
            timeout: DEFAULT_HTTP_TIMEOUT,
            base_fee: DEFAULT_BASE_FEE,
            max_operations: MAX_OPERATIONS_PER_TX,
            envelope: EnvelopeVersion::Legacy,
        }
    }
}

impl ClientConfig {
    /// Config for the given endpoint, everything else defaulted.
    pub fn new(horizon_url: impl Into<String>) -> Self {
        Self {
            horizon_url: horizon_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_base_fee(mut self, base_fee: u32) -> Self {
        self.base_fee = base_fee;
        self
    }

    pub fn with_max_operations(mut self, max_operations: usize) -> Self {
        self.max_operations = max_operations;
        self
    }

    pub fn with_envelope(mut self, envelope: EnvelopeVersion) -> Self {
        self.envelope = envelope;
        self
    }

    /// Rejects configs that would make failure detection impossible or
    /// produce envelopes the network can't accept.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.horizon_url.trim();
        if url.is_empty() {
            return Err(ConfigError::EmptyUrl);
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::BadScheme(url.to_string()));
        }
        if self.timeout.is_zero() || self.timeout > MAX_HTTP_TIMEOUT {
            return Err(ConfigError::BadTimeout {
                got_ms: self.timeout.as_millis(),
                max_secs: MAX_HTTP_TIMEOUT.as_secs(),
            });
        }
        if self.max_operations == 0 || self.max_operations > MAX_OPERATIONS_PER_TX {
            return Err(ConfigError::BadCeiling {
                got: self.max_operations,
                max: MAX_OPERATIONS_PER_TX,
            });
        }
        Ok(())
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

/// Returns a friendly name for a network passphrase, mainly for logging.
pub fn network_name(passphrase: &str) -> &'static str {
    match passphrase {
        PUBLIC_NETWORK_PASSPHRASE => "public",
        TEST_NETWORK_PASSPHRASE => "testnet",
        _ => "custom",
    }
}
