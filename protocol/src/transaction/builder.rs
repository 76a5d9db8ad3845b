//! Transaction assembly via the builder pattern.
//!
//! The [`TransactionBuilder`] accumulates the independently pluggable pieces
//! of a transaction (source, base fee, sequence, network, operations) and
//! performs one consistency check in [`TransactionBuilder::build`]. Nothing
//! fails halfway through construction; every problem surfaces at `build()`
//! as an [`InputError`], before any network interaction.
//!
//! The builder does not sign. That happens in [`super::signing`], so
//! assembly stays testable without key material.

use super::types::{Operation, SequenceNumber};
use stellar_xdr::curr::{self as wire, Limits, WriteXdr};

use super::xdr::{CodecError, TransactionBody};
use crate::config::{DEFAULT_BASE_FEE, MAX_OPERATIONS_PER_TX};
use crate::crypto::hash::{network_id, sha256};
use crate::crypto::keys::PublicKey;
use crate::error::InputError;

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// An assembled, unsigned transaction.
///
/// Bound to exactly one source account, one fee, one sequence number and one
/// network. Instances only come out of [`TransactionBuilder::build`] (or the
/// envelope decoder), so every `Transaction` in hand has 1..=100 operations
/// and `fee == base_fee * operations.len()`.
///
/// The network passphrase is not part of the wire encoding. It only enters
/// the signature payload, which is why it travels with the transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    source: PublicKey,
    fee: u32,
    sequence: SequenceNumber,
    operations: Vec<Operation>,
    network_passphrase: String,
}

impl Transaction {
    /// Reassembles a transaction from its decoded wire body.
    pub(crate) fn from_body(body: TransactionBody, network_passphrase: &str) -> Self {
        Self {
            source: body.source,
            fee: body.fee,
            sequence: SequenceNumber(body.sequence),
            operations: body.operations,
            network_passphrase: network_passphrase.to_string(),
        }
    }

    pub fn source(&self) -> &PublicKey {
        &self.source
    }

    /// Total fee in stroops: base fee times operation count.
    pub fn fee(&self) -> u32 {
        self.fee
    }

    /// The sequence number this transaction consumes.
    pub fn sequence(&self) -> SequenceNumber {
        self.sequence
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn network_passphrase(&self) -> &str {
        &self.network_passphrase
    }

    /// The wire body, without network or signatures.
    pub fn body(&self) -> TransactionBody {
        TransactionBody {
            source: self.source,
            fee: self.fee,
            sequence: self.sequence.value(),
            operations: self.operations.clone(),
        }
    }

    /// The bytes every signature covers:
    /// `SHA-256(passphrase) ‖ int32(ENVELOPE_TYPE_TX) ‖ xdr(Transaction)`.
    ///
    /// Legacy envelopes are signed over the same payload.
    pub fn signature_payload(&self) -> Result<Vec<u8>, CodecError> {
        let payload = wire::TransactionSignaturePayload {
            network_id: wire::Hash(network_id(&self.network_passphrase)),
            tagged_transaction: wire::TransactionSignaturePayloadTaggedTransaction::Tx(
                self.body().to_wire_v1()?,
            ),
        };
        Ok(payload.to_xdr(Limits::none())?)
    }

    /// The transaction hash: `SHA-256(signature_payload)`.
    ///
    /// This is what the network reports back on acceptance, and what an
    /// Ed25519 signature actually signs.
    pub fn hash(&self) -> Result<[u8; 32], CodecError> {
        Ok(sha256(&self.signature_payload()?))
    }

    /// Lowercase hex of [`Transaction::hash`].
    pub fn hash_hex(&self) -> Result<String, CodecError> {
        Ok(hex::encode(self.hash()?))
    }

    /// XDR of the v1 `Transaction`, as it appears in the signature payload.
    pub fn to_xdr(&self) -> Result<Vec<u8>, CodecError> {
        self.body().to_xdr()
    }
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for unsigned [`Transaction`]s.
///
/// # Usage
///
/// ```rust
/// use bos_protocol::config::TEST_NETWORK_PASSPHRASE;
/// use bos_protocol::crypto::Keypair;
/// use bos_protocol::transaction::{Amount, Operation, SequenceNumber, TransactionBuilder};
///
/// let source = Keypair::from_seed_bytes(&[1u8; 32]).public_key();
/// let dest = Keypair::from_seed_bytes(&[2u8; 32]).public_key();
///
/// let tx = TransactionBuilder::new()
///     .source(source)
///     .base_fee(100)
///     .last_sequence(SequenceNumber(41))
///     .network(TEST_NETWORK_PASSPHRASE)
///     .operation(Operation::create_account(dest, Amount::parse("20").unwrap()))
///     .build()
///     .unwrap();
///
/// assert_eq!(tx.sequence(), SequenceNumber(42));
/// assert_eq!(tx.fee(), 100);
/// ```
///
/// Note the sequence: the builder is given the account's *last used* value
/// and always adds one. Passing the already-incremented value produces a
/// transaction the network will reject as `tx_bad_seq`.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    source: Option<PublicKey>,
    base_fee: u32,
    last_sequence: Option<SequenceNumber>,
    network_passphrase: Option<String>,
    operations: Vec<Operation>,
    max_operations: usize,
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionBuilder {
    /// Creates an empty builder.
    ///
    /// Defaults:
    /// - `base_fee`: [`DEFAULT_BASE_FEE`]
    /// - `max_operations`: [`MAX_OPERATIONS_PER_TX`]
    pub fn new() -> Self {
        Self {
            source: None,
            base_fee: DEFAULT_BASE_FEE,
            last_sequence: None,
            network_passphrase: None,
            operations: Vec::new(),
            max_operations: MAX_OPERATIONS_PER_TX,
        }
    }

    /// The account that pays the fee and consumes the sequence number.
    pub fn source(mut self, source: PublicKey) -> Self {
        self.source = Some(source);
        self
    }

    /// Fee per operation, in stroops.
    pub fn base_fee(mut self, base_fee: u32) -> Self {
        self.base_fee = base_fee;
        self
    }

    /// The source account's last used sequence number.
    pub fn last_sequence(mut self, sequence: SequenceNumber) -> Self {
        self.last_sequence = Some(sequence);
        self
    }

    /// The network passphrase the signatures will be scoped to.
    pub fn network(mut self, passphrase: &str) -> Self {
        self.network_passphrase = Some(passphrase.to_string());
        self
    }

    pub fn operation(mut self, op: Operation) -> Self {
        self.operations.push(op);
        self
    }

    pub fn operations(mut self, ops: impl IntoIterator<Item = Operation>) -> Self {
        self.operations.extend(ops);
        self
    }

    /// Lowers the operation ceiling. Values above the protocol limit are
    /// clamped to it.
    pub fn max_operations(mut self, max: usize) -> Self {
        self.max_operations = max.min(MAX_OPERATIONS_PER_TX);
        self
    }

    /// Validates the operation list on its own: non-empty, within the
    /// ceiling, total fee representable. Returns the total fee.
    ///
    /// Lets a caller reject a bad operation list before it spends a network
    /// round trip on the sequence number.
    pub fn check_operations(&self) -> Result<u32, InputError> {
        let count = self.operations.len();
        if count == 0 {
            return Err(InputError::EmptyTransaction);
        }
        if count > self.max_operations {
            return Err(InputError::TooManyOperations {
                count,
                max: self.max_operations,
            });
        }
        u32::try_from(count)
            .ok()
            .and_then(|n| self.base_fee.checked_mul(n))
            .ok_or(InputError::FeeOverflow {
                base_fee: self.base_fee,
                operations: count,
            })
    }

    /// Consumes the builder and produces an unsigned [`Transaction`].
    ///
    /// Checks, in order: source present, at least one operation, operation
    /// count within the ceiling, fee fits in 32 bits, sequence present and
    /// incrementable, network present.
    pub fn build(self) -> Result<Transaction, InputError> {
        let source = self.source.ok_or(InputError::MissingSource)?;
        let fee = self.check_operations()?;

        let sequence = self
            .last_sequence
            .ok_or(InputError::MissingSequence)?
            .next()?;

        let network_passphrase = self.network_passphrase.ok_or(InputError::MissingNetwork)?;

        Ok(Transaction {
            source,
            fee,
            sequence,
            operations: self.operations,
            network_passphrase,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
