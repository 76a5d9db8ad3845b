//! Sequence number resolution.
//!
//! Two mutually exclusive paths produce the *last used* sequence of a source
//! account:
//!
//! - [`SequenceMode::Auto`] asks the network, right before assembly.
//! - [`SequenceMode::Fixed`] takes the caller's value and makes no call.
//!
//! Either way the result is fed to
//! [`TransactionBuilder::last_sequence`](crate::transaction::TransactionBuilder::last_sequence),
//! which adds exactly one.

use tracing::{debug, Span};

use crate::crypto::keys::PublicKey;
use crate::error::Result;
use crate::horizon::Horizon;
use crate::transaction::types::{SequenceMode, SequenceNumber};

/// Looks up sequence numbers through a [`Horizon`] implementation.
pub struct SequenceResolver<'a, H: Horizon + ?Sized> {
    horizon: &'a H,
    span: Span,
}

impl<'a, H: Horizon + ?Sized> SequenceResolver<'a, H> {
    pub fn new(horizon: &'a H) -> Self {
        Self {
            horizon,
            span: tracing::debug_span!("sequence"),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// The account's current (last used) sequence, fetched from the network.
    ///
    /// Fails with `AccountNotFound` or `NetworkUnreachable` as reported by
    /// the underlying client.
    pub async fn resolve(&self, account: &PublicKey) -> Result<SequenceNumber> {
        let record = self.horizon.account(account).await?;
        debug!(
            parent: &self.span,
            account = %account,
            sequence = %record.sequence,
            "fetched sequence"
        );
        Ok(record.sequence)
    }

    /// Resolves according to `mode`. `Fixed` never touches the network.
    pub async fn resolve_mode(
        &self,
        account: &PublicKey,
        mode: SequenceMode,
    ) -> Result<SequenceNumber> {
        match mode {
            SequenceMode::Fixed(last_used) => {
                debug!(
                    parent: &self.span,
                    account = %account,
                    sequence = %last_used,
                    "using fixed sequence"
                );
                Ok(last_used)
            }
            SequenceMode::Auto => self.resolve(account).await,
        }
    }
}
