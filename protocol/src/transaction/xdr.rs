//! Conversion between this crate's transaction types and the ledger's XDR
//! schema.
//!
//! The schema types and the RFC 4506 codec come from `stellar-xdr`. This
//! module maps the subset the assembler produces onto them and back:
//!
//! ```text
//! Transaction           = MuxedAccount | uint32 fee | int64 seqNum | Preconditions(NONE)
//!                         | Memo(NONE) | Operation<100> | ext(0)
//! TransactionV0         = uint256 source | uint32 fee | int64 seqNum | TimeBounds* (absent)
//!                         | Memo(NONE) | Operation<100> | ext(0)
//! Operation             = MuxedAccount* (absent) | int32 type | body
//! DecoratedSignature    = opaque[4] hint | opaque<64> signature
//! ```
//!
//! Anything outside that subset (muxed accounts, memos, time bounds, other
//! operation types) is rejected on decode with [`CodecError::Unsupported`].

use stellar_xdr::curr as wire;
use thiserror::Error;

use crate::config::{MAX_OPERATIONS_PER_TX, MAX_SIGNATURES};
use crate::crypto::keys::{PublicKey, Signature};
use crate::transaction::types::{Amount, Asset, Operation};

/// Failures while encoding or decoding XDR.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The byte-level codec failed: short input, trailing bytes, bad
    /// discriminant or padding.
    #[error("xdr: {0}")]
    Xdr(String),

    #[error("unsupported {what}: {detail}")]
    Unsupported { what: &'static str, detail: String },

    #[error("{what} length {len} exceeds maximum {max}")]
    LengthOutOfBounds {
        what: &'static str,
        len: usize,
        max: usize,
    },

    #[error("invalid {what}: {reason}")]
    InvalidValue { what: &'static str, reason: String },

    #[error("invalid base64: {0}")]
    Base64(String),
}

impl From<wire::Error> for CodecError {
    fn from(e: wire::Error) -> Self {
        Self::Xdr(e.to_string())
    }
}

fn bounded<T>(what: &'static str, items: Vec<T>, max: usize) -> Result<Vec<T>, CodecError> {
    if items.len() > max {
        return Err(CodecError::LengthOutOfBounds {
            what,
            len: items.len(),
            max,
        });
    }
    Ok(items)
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

fn account_id(key: &PublicKey) -> wire::AccountId {
    wire::AccountId(wire::PublicKey::PublicKeyTypeEd25519(wire::Uint256(
        *key.as_bytes(),
    )))
}

fn account_id_from(id: &wire::AccountId) -> PublicKey {
    let wire::PublicKey::PublicKeyTypeEd25519(wire::Uint256(bytes)) = &id.0;
    PublicKey::from_bytes(*bytes)
}

fn muxed_account(key: &PublicKey) -> wire::MuxedAccount {
    wire::MuxedAccount::Ed25519(wire::Uint256(*key.as_bytes()))
}

fn muxed_account_from(account: &wire::MuxedAccount) -> Result<PublicKey, CodecError> {
    match account {
        wire::MuxedAccount::Ed25519(wire::Uint256(bytes)) => Ok(PublicKey::from_bytes(*bytes)),
        wire::MuxedAccount::MuxedEd25519(m) => Err(CodecError::Unsupported {
            what: "account",
            detail: format!("muxed account id {}", m.id),
        }),
    }
}

// ---------------------------------------------------------------------------
// Amounts, assets, operations
// ---------------------------------------------------------------------------

fn amount_from(stroops: i64, what: &'static str) -> Result<Amount, CodecError> {
    Amount::from_stroops(stroops).map_err(|e| CodecError::InvalidValue {
        what,
        reason: e.to_string(),
    })
}

impl Asset {
    pub(crate) fn to_wire(&self) -> Result<wire::Asset, CodecError> {
        let (code, issuer) = match self {
            Asset::Native => return Ok(wire::Asset::Native),
            Asset::Credit { code, issuer } => (code.as_bytes(), account_id(issuer)),
        };
        match code.len() {
            1..=4 => {
                let mut asset_code = [0u8; 4];
                asset_code[..code.len()].copy_from_slice(code);
                Ok(wire::Asset::CreditAlphanum4(wire::AlphaNum4 {
                    asset_code: wire::AssetCode4(asset_code),
                    issuer,
                }))
            }
            5..=12 => {
                let mut asset_code = [0u8; 12];
                asset_code[..code.len()].copy_from_slice(code);
                Ok(wire::Asset::CreditAlphanum12(wire::AlphaNum12 {
                    asset_code: wire::AssetCode12(asset_code),
                    issuer,
                }))
            }
            len => Err(CodecError::InvalidValue {
                what: "asset code",
                reason: format!("length {len} not in 1..=12"),
            }),
        }
    }

    pub(crate) fn from_wire(asset: &wire::Asset) -> Result<Self, CodecError> {
        let (raw, issuer) = match asset {
            wire::Asset::Native => return Ok(Asset::Native),
            wire::Asset::CreditAlphanum4(a) => (a.asset_code.0.as_slice(), &a.issuer),
            wire::Asset::CreditAlphanum12(a) => (a.asset_code.0.as_slice(), &a.issuer),
        };
        // Codes are NUL-padded to the arm's width.
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        let invalid = |reason: String| CodecError::InvalidValue {
            what: "asset code",
            reason,
        };
        let code = std::str::from_utf8(&raw[..end]).map_err(|e| invalid(e.to_string()))?;
        Asset::credit(code, account_id_from(issuer)).map_err(|e| invalid(e.to_string()))
    }
}

impl Operation {
    pub(crate) fn to_wire(&self) -> Result<wire::Operation, CodecError> {
        let body = match self {
            Operation::CreateAccount {
                destination,
                starting_balance,
            } => wire::OperationBody::CreateAccount(wire::CreateAccountOp {
                destination: account_id(destination),
                starting_balance: starting_balance.stroops(),
            }),
            Operation::Payment {
                destination,
                asset,
                amount,
            } => wire::OperationBody::Payment(wire::PaymentOp {
                destination: muxed_account(destination),
                asset: asset.to_wire()?,
                amount: amount.stroops(),
            }),
            Operation::Inflation => wire::OperationBody::Inflation,
        };
        // No per-operation source: the transaction source applies.
        Ok(wire::Operation {
            source_account: None,
            body,
        })
    }

    pub(crate) fn from_wire(op: &wire::Operation) -> Result<Self, CodecError> {
        if op.source_account.is_some() {
            return Err(CodecError::Unsupported {
                what: "operation",
                detail: "per-operation source account".into(),
            });
        }
        match &op.body {
            wire::OperationBody::CreateAccount(body) => Ok(Operation::CreateAccount {
                destination: account_id_from(&body.destination),
                starting_balance: amount_from(body.starting_balance, "starting balance")?,
            }),
            wire::OperationBody::Payment(body) => Ok(Operation::Payment {
                destination: muxed_account_from(&body.destination)?,
                asset: Asset::from_wire(&body.asset)?,
                amount: amount_from(body.amount, "payment amount")?,
            }),
            wire::OperationBody::Inflation => Ok(Operation::Inflation),
            other => Err(CodecError::Unsupported {
                what: "operation type",
                detail: format!("{:?}", other.discriminant()),
            }),
        }
    }
}

fn operations_to_wire(
    ops: &[Operation],
) -> Result<wire::VecM<wire::Operation, 100>, CodecError> {
    let ops = ops
        .iter()
        .map(Operation::to_wire)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(bounded("operations", ops, MAX_OPERATIONS_PER_TX)?.try_into()?)
}

fn operations_from_wire(ops: &[wire::Operation]) -> Result<Vec<Operation>, CodecError> {
    ops.iter().map(Operation::from_wire).collect()
}

// ---------------------------------------------------------------------------
// Transaction body
// ---------------------------------------------------------------------------

/// The network-independent part of a transaction, exactly as it sits on the
/// wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionBody {
    pub source: PublicKey,
    pub fee: u32,
    pub sequence: i64,
    pub operations: Vec<Operation>,
}

impl TransactionBody {
    /// The v1 `Transaction`. Signatures are always computed over this form.
    pub fn to_wire_v1(&self) -> Result<wire::Transaction, CodecError> {
        Ok(wire::Transaction {
            source_account: muxed_account(&self.source),
            fee: self.fee,
            seq_num: wire::SequenceNumber(self.sequence),
            cond: wire::Preconditions::None,
            memo: wire::Memo::None,
            operations: operations_to_wire(&self.operations)?,
            ext: wire::TransactionExt::V0,
        })
    }

    /// The pre-v1 `TransactionV0`, carried by legacy envelopes.
    pub fn to_wire_v0(&self) -> Result<wire::TransactionV0, CodecError> {
        Ok(wire::TransactionV0 {
            source_account_ed25519: wire::Uint256(*self.source.as_bytes()),
            fee: self.fee,
            seq_num: wire::SequenceNumber(self.sequence),
            time_bounds: None,
            memo: wire::Memo::None,
            operations: operations_to_wire(&self.operations)?,
            ext: wire::TransactionV0Ext::V0,
        })
    }

    pub fn from_wire_v1(tx: &wire::Transaction) -> Result<Self, CodecError> {
        if tx.cond != wire::Preconditions::None {
            return Err(CodecError::Unsupported {
                what: "preconditions",
                detail: format!("{:?}", tx.cond.discriminant()),
            });
        }
        if tx.memo != wire::Memo::None {
            return Err(unsupported_memo(&tx.memo));
        }
        if tx.ext != wire::TransactionExt::V0 {
            return Err(CodecError::Unsupported {
                what: "transaction ext",
                detail: "soroban data".into(),
            });
        }
        Ok(Self {
            source: muxed_account_from(&tx.source_account)?,
            fee: tx.fee,
            sequence: tx.seq_num.0,
            operations: operations_from_wire(&tx.operations)?,
        })
    }

    pub fn from_wire_v0(tx: &wire::TransactionV0) -> Result<Self, CodecError> {
        if tx.time_bounds.is_some() {
            return Err(CodecError::Unsupported {
                what: "preconditions",
                detail: "time bounds".into(),
            });
        }
        if tx.memo != wire::Memo::None {
            return Err(unsupported_memo(&tx.memo));
        }
        Ok(Self {
            source: PublicKey::from_bytes(tx.source_account_ed25519.0),
            fee: tx.fee,
            sequence: tx.seq_num.0,
            operations: operations_from_wire(&tx.operations)?,
        })
    }

    /// XDR of the v1 `Transaction`.
    pub fn to_xdr(&self) -> Result<Vec<u8>, CodecError> {
        use wire::WriteXdr;
        Ok(self.to_wire_v1()?.to_xdr(wire::Limits::none())?)
    }
}

fn unsupported_memo(memo: &wire::Memo) -> CodecError {
    CodecError::Unsupported {
        what: "memo",
        detail: format!("{:?}", memo.discriminant()),
    }
}

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

/// A signature plus the hint identifying which key produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoratedSignature {
    pub hint: [u8; 4],
    pub signature: Signature,
}

impl DecoratedSignature {
    fn to_wire(self) -> Result<wire::DecoratedSignature, CodecError> {
        Ok(wire::DecoratedSignature {
            hint: wire::SignatureHint(self.hint),
            signature: wire::Signature(self.signature.as_bytes().to_vec().try_into()?),
        })
    }

    fn from_wire(sig: &wire::DecoratedSignature) -> Result<Self, CodecError> {
        let raw: &[u8] = sig.signature.0.as_slice();
        let bytes = raw.try_into().map_err(|_| CodecError::InvalidValue {
            what: "signature",
            reason: format!("expected 64 bytes, got {}", raw.len()),
        })?;
        Ok(Self {
            hint: sig.hint.0,
            signature: Signature::from_bytes(bytes),
        })
    }
}

/// Builds a `DecoratedSignature<20>` array.
pub fn signatures_to_wire(
    sigs: &[DecoratedSignature],
) -> Result<wire::VecM<wire::DecoratedSignature, 20>, CodecError> {
    let sigs = sigs
        .iter()
        .map(|s| s.to_wire())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(bounded("signatures", sigs, MAX_SIGNATURES)?.try_into()?)
}

pub fn signatures_from_wire(
    sigs: &[wire::DecoratedSignature],
) -> Result<Vec<DecoratedSignature>, CodecError> {
    sigs.iter().map(DecoratedSignature::from_wire).collect()
}
