//! Transaction signing with Ed25519 keypairs.
//!
//! Signing is a separate step from building because the keypair is the one
//! thing the assembler never needs. The signed bytes are the transaction's
//! [`signature_payload`](super::builder::Transaction::signature_payload),
//! so the signature is bound to the network as well as to the content.

use thiserror::Error;

use super::builder::Transaction;
use super::envelope::SignedEnvelope;
use super::xdr::{CodecError, DecoratedSignature};
use crate::crypto::keys::Keypair;

/// Terminal signing failures. None of these is worth retrying.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SigningError {
    /// The keypair does not control the transaction's source account.
    #[error("signer {signer} is not the transaction source {source_account}")]
    SourceMismatch {
        source_account: String,
        signer: String,
    },

    /// The payload to sign could not be encoded.
    #[error("cannot encode signature payload: {0}")]
    Payload(#[from] CodecError),
}

/// Signs `tx` with `keypair` and seals it into a [`SignedEnvelope`].
///
/// The procedure:
/// 1. Check the keypair's public key is the transaction source.
/// 2. Encode the signature payload (network id, envelope type, v1 body).
/// 3. Produce an Ed25519 signature over `SHA-256(payload)`.
/// 4. Decorate it with the last four bytes of the public key.
///
/// Ed25519 is deterministic, so the same transaction and key always yield
/// the same envelope byte for byte.
///
/// # Example
///
/// ```rust
/// use bos_protocol::config::TEST_NETWORK_PASSPHRASE;
/// use bos_protocol::crypto::Keypair;
/// use bos_protocol::transaction::{
///     sign_transaction, Operation, SequenceNumber, TransactionBuilder,
/// };
///
/// let kp = Keypair::from_seed_bytes(&[1u8; 32]);
/// let tx = TransactionBuilder::new()
///     .source(kp.public_key())
///     .last_sequence(SequenceNumber(1))
///     .network(TEST_NETWORK_PASSPHRASE)
///     .operation(Operation::Inflation)
///     .build()
///     .unwrap();
///
/// let envelope = sign_transaction(tx, &kp).unwrap();
/// assert!(envelope.verify());
/// ```
pub fn sign_transaction(
    tx: Transaction,
    keypair: &Keypair,
) -> Result<SignedEnvelope, SigningError> {
    let signer = keypair.public_key();
    if &signer != tx.source() {
        return Err(SigningError::SourceMismatch {
            source_account: tx.source().address(),
            signer: signer.address(),
        });
    }

    let hash = tx.hash()?;
    let signature = DecoratedSignature {
        hint: signer.hint(),
        signature: keypair.sign(&hash),
    };

    Ok(SignedEnvelope::new(tx, vec![signature]))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
