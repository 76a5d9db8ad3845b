//! Signed envelopes and their wire form.
//!
//! The submission endpoint wants base64 of the XDR `TransactionEnvelope`.
//! [`encode`] produces it; [`SignedEnvelope::from_base64`] reads it back,
//! given the network passphrase the envelope was signed for (the network is
//! never on the wire, only mixed into the signature payload).
//!
//! Envelopes come in two layouts, picked by [`EnvelopeVersion`]:
//!
//! ```text
//! Legacy (TxV0) = int32 0 | uint256 source | fee | seqNum | ... | DecoratedSignature<20>
//! V1     (Tx)   = int32 2 | MuxedAccount source | fee | seqNum | ... | DecoratedSignature<20>
//! ```

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use stellar_xdr::curr::{self as wire, Limits, ReadXdr, WriteXdr};

use super::builder::Transaction;
use super::xdr::{
    signatures_from_wire, signatures_to_wire, CodecError, DecoratedSignature, TransactionBody,
};
use crate::config::EnvelopeVersion;

/// A transaction plus its signatures. Immutable once produced: changing the
/// transaction means building and signing a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    transaction: Transaction,
    signatures: Vec<DecoratedSignature>,
    version: EnvelopeVersion,
}

impl SignedEnvelope {
    /// A legacy-layout envelope.
    pub(crate) fn new(transaction: Transaction, signatures: Vec<DecoratedSignature>) -> Self {
        Self {
            transaction,
            signatures,
            version: EnvelopeVersion::Legacy,
        }
    }

    /// The same transaction and signatures in another layout. Signatures stay
    /// valid: both layouts sign the v1 payload.
    pub fn with_version(mut self, version: EnvelopeVersion) -> Self {
        self.version = version;
        self
    }

    pub fn version(&self) -> EnvelopeVersion {
        self.version
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn signatures(&self) -> &[DecoratedSignature] {
        &self.signatures
    }

    /// `true` if there is at least one signature and every signature is a
    /// valid signature by the source account over this transaction's hash.
    pub fn verify(&self) -> bool {
        let Ok(hash) = self.transaction.hash() else {
            return false;
        };
        let source = self.transaction.source();
        !self.signatures.is_empty()
            && self
                .signatures
                .iter()
                .all(|s| s.hint == source.hint() && source.verify(&hash, &s.signature))
    }

    /// Lowercase hex transaction hash, as the network reports it.
    pub fn hash_hex(&self) -> Result<String, CodecError> {
        self.transaction.hash_hex()
    }

    fn to_wire(&self) -> Result<wire::TransactionEnvelope, CodecError> {
        let body = self.transaction.body();
        let signatures = signatures_to_wire(&self.signatures)?;
        Ok(match self.version {
            EnvelopeVersion::Legacy => {
                wire::TransactionEnvelope::TxV0(wire::TransactionV0Envelope {
                    tx: body.to_wire_v0()?,
                    signatures,
                })
            }
            EnvelopeVersion::V1 => wire::TransactionEnvelope::Tx(wire::TransactionV1Envelope {
                tx: body.to_wire_v1()?,
                signatures,
            }),
        })
    }

    /// Raw envelope XDR in this envelope's layout.
    pub fn to_xdr(&self) -> Result<Vec<u8>, CodecError> {
        Ok(self.to_wire()?.to_xdr(Limits::none())?)
    }

    /// The base64 wire form.
    pub fn to_base64(&self) -> Result<String, CodecError> {
        Ok(BASE64.encode(self.to_xdr()?))
    }

    /// Decodes raw envelope XDR of either layout. Trailing bytes are an
    /// error.
    pub fn from_xdr(bytes: &[u8], network_passphrase: &str) -> Result<Self, CodecError> {
        let (body, signatures, version) =
            match wire::TransactionEnvelope::from_xdr(bytes, Limits::none())? {
                wire::TransactionEnvelope::TxV0(env) => (
                    TransactionBody::from_wire_v0(&env.tx)?,
                    env.signatures,
                    EnvelopeVersion::Legacy,
                ),
                wire::TransactionEnvelope::Tx(env) => (
                    TransactionBody::from_wire_v1(&env.tx)?,
                    env.signatures,
                    EnvelopeVersion::V1,
                ),
                wire::TransactionEnvelope::TxFeeBump(_) => {
                    return Err(CodecError::Unsupported {
                        what: "envelope type",
                        detail: "fee bump".into(),
                    })
                }
            };
        Ok(Self {
            transaction: Transaction::from_body(body, network_passphrase),
            signatures: signatures_from_wire(&signatures)?,
            version,
        })
    }

    /// Decodes the base64 wire form.
    pub fn from_base64(encoded: &str, network_passphrase: &str) -> Result<Self, CodecError> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| CodecError::Base64(e.to_string()))?;
        Self::from_xdr(&bytes, network_passphrase)
    }
}

/// The wire encoder: base64 of the envelope XDR.
///
/// Total over envelopes produced by [`sign_transaction`](super::sign_transaction);
/// an error here means the envelope was malformed upstream.
pub fn encode(envelope: &SignedEnvelope) -> Result<String, CodecError> {
    envelope.to_base64()
}
