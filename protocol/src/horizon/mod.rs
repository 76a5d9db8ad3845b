//! # Network API
//!
//! The narrow read/submit interface this crate needs from the remote network
//! API, and its HTTP implementation.
//!
//! ```text
//! GET  /                 → NetworkInfo    (network passphrase)
//! GET  /accounts/{id}    → AccountRecord  (sequence, balances)
//! POST /transactions     → Accepted       (ledger, hash) | Rejection
//! ```
//!
//! Everything above this module talks to the [`Horizon`] trait, never to
//! HTTP directly, so tests can swap in an in-memory ledger.

pub mod client;
pub mod types;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::crypto::keys::PublicKey;
use crate::error::{Error, Result};

pub use client::HorizonClient;
pub use types::{AccountRecord, Accepted, Balance, NetworkInfo, Rejection};

/// Read and submit access to one network instance.
///
/// Implementations perform exactly one request per call and never retry.
#[async_trait]
pub trait Horizon: Send + Sync {
    /// `GET /`: identifies the network.
    async fn network_info(&self) -> Result<NetworkInfo>;

    /// `GET /accounts/{id}`. Fails with [`Error::AccountNotFound`] if the
    /// network has no such account.
    async fn account(&self, account: &PublicKey) -> Result<AccountRecord>;

    /// `POST /transactions` with a base64 envelope. A refusal comes back as
    /// [`Error::SubmissionRejected`].
    async fn submit(&self, envelope_base64: &str) -> Result<Accepted>;

    /// `true` if the account exists, `false` if the network reports it
    /// missing. Transport problems are still errors.
    async fn account_exists(&self, account: &PublicKey) -> Result<bool> {
        match self.account(account).await {
            Ok(_) => Ok(true),
            Err(Error::AccountNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Native asset balance; zero if the account lists none.
    async fn native_balance(&self, account: &PublicKey) -> Result<Decimal> {
        let record = self.account(account).await?;
        Ok(record.native_balance().unwrap_or(Decimal::ZERO))
    }
}
