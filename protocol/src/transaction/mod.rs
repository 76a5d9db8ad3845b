//! # Transaction Module
//!
//! Assembly, signing and wire encoding of ledger transactions. Every intent
//! this crate serves (create an account, pay, vote for inflation) ends up as
//! a [`Transaction`] sealed into a [`SignedEnvelope`].
//!
//! ## Architecture
//!
//! ```text
//! types.rs    : Value types (Amount, Asset, Operation, SequenceNumber, SequenceMode)
//! builder.rs  : TransactionBuilder: one consistency check, then an unsigned Transaction
//! signing.rs  : Ed25519 signing over the network-scoped payload
//! envelope.rs : SignedEnvelope, legacy or v1 layout, and the base64 wire form
//! xdr.rs      : Mapping onto the ledger's XDR schema (stellar-xdr)
//! ```
//!
//! ## Transaction Lifecycle
//!
//! `Built → Signed → Encoded → Submitted → {Accepted | Rejected}`
//!
//! 1. **Build**: [`TransactionBuilder`] turns pieces into a [`Transaction`].
//! 2. **Sign**: [`sign_transaction`] produces a [`SignedEnvelope`].
//! 3. **Encode**: [`encode`] yields the base64 string the network wants.
//! 4. **Submit**: handled by [`crate::horizon`]; nothing here does I/O.
//!
//! No step is re-entrant. An envelope that was accepted or rejected is never
//! resubmitted as-is; a retry needs a fresh sequence and a fresh envelope.

pub mod builder;
pub mod envelope;
pub mod signing;
pub mod types;
pub mod xdr;

pub use builder::{Transaction, TransactionBuilder};
pub use envelope::{encode, SignedEnvelope};
pub use signing::{sign_transaction, SigningError};
pub use types::{Amount, Asset, Operation, SequenceMode, SequenceNumber};
pub use xdr::{CodecError, DecoratedSignature};
