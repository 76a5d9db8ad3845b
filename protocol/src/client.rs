//! High-level transaction client.
//!
//! [`TxClient`] turns an intent ("create this account", "pay this amount")
//! into one strictly ordered pass:
//!
//! ```text
//! validate → resolve sequence → assemble → sign → encode → submit
//! ```
//!
//! Every step needs the previous step's output, and the sequence number is
//! only valid against the ledger state seen at resolution time, so nothing
//! here runs concurrently. Invalid input fails before the first request.

use rust_decimal::Decimal;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn, Span};

use crate::bulk::{plan_batches, BatchOutcome, Funding};
use crate::config::{
    network_name, ClientConfig, EnvelopeVersion, DEFAULT_BASE_FEE, MAX_OPERATIONS_PER_TX,
};
use crate::crypto::keys::{Keypair, PublicKey};
use crate::error::{Error, InputError, Result};
use crate::horizon::{Accepted, Horizon, HorizonClient};
use crate::identity::AccountIdentity;
use crate::sequence::SequenceResolver;
use crate::transaction::{
    encode, sign_transaction, Amount, Asset, Operation, SequenceMode, SignedEnvelope, Transaction,
    TransactionBuilder,
};

/// Builds, signs and submits transactions through a [`Horizon`].
pub struct TxClient<H> {
    horizon: H,
    base_fee: u32,
    max_operations: usize,
    envelope: EnvelopeVersion,
    network: OnceCell<String>,
    span: Span,
}

impl TxClient<HorizonClient> {
    /// A client talking HTTP to the endpoint in `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let horizon = HorizonClient::new(config)?;
        Ok(Self::new(horizon)
            .with_base_fee(config.base_fee)
            .with_max_operations(config.max_operations)
            .with_envelope(config.envelope))
    }
}

impl<H: Horizon> TxClient<H> {
    pub fn new(horizon: H) -> Self {
        Self {
            horizon,
            base_fee: DEFAULT_BASE_FEE,
            max_operations: MAX_OPERATIONS_PER_TX,
            envelope: EnvelopeVersion::Legacy,
            network: OnceCell::new(),
            span: tracing::info_span!("tx_client"),
        }
    }

    pub fn with_base_fee(mut self, base_fee: u32) -> Self {
        self.base_fee = base_fee;
        self
    }

    /// Operation ceiling per transaction, clamped to the protocol maximum.
    pub fn with_max_operations(mut self, max: usize) -> Self {
        self.max_operations = max.clamp(1, MAX_OPERATIONS_PER_TX);
        self
    }

    /// Envelope layout of every submission.
    pub fn with_envelope(mut self, envelope: EnvelopeVersion) -> Self {
        self.envelope = envelope;
        self
    }

    /// Pins the network passphrase instead of asking the network for it.
    pub fn with_network(mut self, passphrase: impl Into<String>) -> Self {
        self.network = OnceCell::new_with(Some(passphrase.into()));
        self
    }

    /// Replaces the diagnostic span every event of this client is parented to.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn horizon(&self) -> &H {
        &self.horizon
    }

    pub fn base_fee(&self) -> u32 {
        self.base_fee
    }

    /// The network passphrase, fetched once from `GET /` and then cached.
    pub async fn network_passphrase(&self) -> Result<&str> {
        let passphrase = self
            .network
            .get_or_try_init(|| async {
                let info = self.horizon.network_info().await?;
                debug!(
                    parent: &self.span,
                    network = network_name(&info.network_passphrase),
                    "network passphrase resolved"
                );
                Ok::<_, Error>(info.network_passphrase)
            })
            .await?;
        Ok(passphrase.as_str())
    }

    // -----------------------------------------------------------------------
    // Pipeline
    // -----------------------------------------------------------------------

    /// Assembles an unsigned transaction for `source`.
    ///
    /// The operation list is checked before any request. Then the network
    /// passphrase and (in auto mode) the sequence number are resolved.
    pub async fn assemble(
        &self,
        source: &PublicKey,
        operations: Vec<Operation>,
        mode: SequenceMode,
    ) -> Result<Transaction> {
        let builder = TransactionBuilder::new()
            .source(*source)
            .base_fee(self.base_fee)
            .max_operations(self.max_operations)
            .operations(operations);
        builder.check_operations()?;

        let network = self.network_passphrase().await?;
        let last_used = SequenceResolver::new(&self.horizon)
            .with_span(self.span.clone())
            .resolve_mode(source, mode)
            .await?;

        let tx = builder.last_sequence(last_used).network(network).build()?;
        debug!(
            parent: &self.span,
            source = %source,
            sequence = %tx.sequence(),
            fee = tx.fee(),
            operations = tx.operations().len(),
            "transaction assembled"
        );
        Ok(tx)
    }

    /// Submits a signed envelope. Exactly one POST, no retry.
    pub async fn submit_envelope(&self, envelope: &SignedEnvelope) -> Result<Accepted> {
        let wire = encode(envelope)?;
        let hash = envelope.hash_hex()?;
        debug!(parent: &self.span, %hash, "submitting envelope");
        let accepted = self.horizon.submit(&wire).await?;
        if accepted.hash != hash {
            warn!(
                parent: &self.span,
                local = %hash,
                remote = %accepted.hash,
                "network reported a different transaction hash"
            );
        }
        Ok(accepted)
    }

    /// The whole pipeline for an arbitrary operation list.
    pub async fn submit_operations(
        &self,
        source: &AccountIdentity,
        operations: Vec<Operation>,
        mode: SequenceMode,
    ) -> Result<Accepted> {
        let keypair = signer(source)?;
        let kinds: Vec<&'static str> = operations.iter().map(Operation::kind).collect();
        let tx = self.assemble(source.public_key(), operations, mode).await?;
        let envelope = sign_transaction(tx, keypair)?.with_version(self.envelope);
        let accepted = self.submit_envelope(&envelope).await?;
        info!(
            parent: &self.span,
            source = %source,
            ledger = accepted.ledger,
            hash = %accepted.hash,
            operations = ?kinds,
            "transaction posted"
        );
        Ok(accepted)
    }

    // -----------------------------------------------------------------------
    // Intents
    // -----------------------------------------------------------------------

    /// Creates and funds one account.
    pub async fn create_account(
        &self,
        source: &AccountIdentity,
        destination: &PublicKey,
        starting_balance: Amount,
        mode: SequenceMode,
    ) -> Result<Accepted> {
        let op = Operation::create_account(*destination, starting_balance);
        self.submit_operations(source, vec![op], mode).await
    }

    /// Creates several accounts in a single transaction. More destinations
    /// than the ceiling is an error; use
    /// [`create_accounts_bulk`](Self::create_accounts_bulk) to split.
    pub async fn create_accounts(
        &self,
        source: &AccountIdentity,
        fundings: &[Funding],
        mode: SequenceMode,
    ) -> Result<Accepted> {
        let ops = fundings.iter().map(Funding::to_operation).collect();
        self.submit_operations(source, ops, mode).await
    }

    /// Sends `amount` of `asset` to an existing account.
    pub async fn pay(
        &self,
        source: &AccountIdentity,
        destination: &PublicKey,
        amount: Amount,
        asset: Asset,
        mode: SequenceMode,
    ) -> Result<Accepted> {
        let op = Operation::payment(*destination, asset, amount);
        self.submit_operations(source, vec![op], mode).await
    }

    /// Submits an inflation vote.
    pub async fn inflation_vote(
        &self,
        source: &AccountIdentity,
        mode: SequenceMode,
    ) -> Result<Accepted> {
        self.submit_operations(source, vec![Operation::Inflation], mode)
            .await
    }

    /// Creates many accounts, one transaction per group of at most
    /// `max_operations` destinations, submitted in order.
    ///
    /// - `Auto`: each group resolves a fresh sequence. A failed group is
    ///   recorded and the run continues with the next one.
    /// - `Fixed(n)`: group `k` uses `n + k` as its last used sequence. The
    ///   run stops at the first failure, since every later value would be
    ///   off by one.
    ///
    /// Returns one outcome per attempted group. Errors that make every group
    /// fail the same way (bad input, no signing key, unknown network) are
    /// returned directly instead.
    pub async fn create_accounts_bulk(
        &self,
        source: &AccountIdentity,
        fundings: &[Funding],
        mode: SequenceMode,
    ) -> Result<Vec<BatchOutcome>> {
        signer(source)?;
        if fundings.is_empty() {
            return Err(InputError::EmptyTransaction.into());
        }
        self.network_passphrase().await?;

        let batches = plan_batches(fundings, self.max_operations);
        info!(
            parent: &self.span,
            destinations = fundings.len(),
            batches = batches.len(),
            "bulk account creation"
        );

        let mut next_mode = mode;
        let mut outcomes = Vec::with_capacity(batches.len());
        for (index, batch) in batches.into_iter().enumerate() {
            let result = self.create_accounts(source, batch, next_mode).await;
            if let Err(e) = &result {
                warn!(parent: &self.span, batch = index, error = %e, "batch failed");
            }
            let accepted = result.is_ok();
            outcomes.push(BatchOutcome {
                index,
                fundings: batch.to_vec(),
                result,
            });

            let SequenceMode::Fixed(last_used) = next_mode else {
                continue;
            };
            if !accepted {
                warn!(
                    parent: &self.span,
                    batch = index,
                    "stopping: fixed sequence is no longer valid"
                );
                break;
            }
            match last_used.next() {
                Ok(next) => next_mode = SequenceMode::Fixed(next),
                Err(e) => {
                    warn!(parent: &self.span, batch = index, error = %e, "stopping");
                    break;
                }
            }
        }
        Ok(outcomes)
    }

    /// Native balance of `account`, for before/after reports.
    pub async fn native_balance(&self, account: &PublicKey) -> Result<Decimal> {
        self.horizon.native_balance(account).await
    }
}

fn signer(source: &AccountIdentity) -> Result<&Keypair> {
    source.keypair().ok_or_else(|| {
        InputError::MissingSecret {
            address: source.address(),
        }
        .into()
    })
}
