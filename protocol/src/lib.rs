// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # BOS Protocol: Transaction Library
//!
//! Builds, signs and submits ledger transactions against a Horizon-style
//! network API, on behalf of whoever holds the secret seed. The goal is
//! narrow and unforgiving: a wrong sequence number or a double submission
//! can strand a transaction or burn a fee, so every step is explicit and
//! nothing retries behind your back.
//!
//! ## Architecture
//!
//! The pipeline, leaf-first:
//!
//! - **sequence**: Last used sequence number: fetched (`Auto`) or given (`Fixed`).
//! - **transaction**: Assembly, signing and the canonical XDR wire format.
//! - **horizon**: The network API: account lookups and submission.
//! - **client**: [`TxClient`], which runs the whole pipeline per intent.
//! - **bulk**: Splitting many account creations into ceiling-sized groups.
//! - **identity**: Addresses and the seeds that control them.
//! - **crypto**: Ed25519 keys, strkey encoding, SHA-256.
//! - **config**: Protocol constants and client settings.
//! - **error**: The error taxonomy every operation returns.
//!
//! ## Example
//!
//! ```rust,no_run
//! use bos_protocol::{AccountIdentity, ClientConfig, TxClient};
//! use bos_protocol::transaction::{Amount, Asset, SequenceMode};
//!
//! # async fn run() -> bos_protocol::Result<()> {
//! let client = TxClient::from_config(&ClientConfig::new("https://horizon.example.org"))?;
//! let sender = AccountIdentity::parse("SD7X7LEHBNMUIKQGKPARG5TDJNBHKC346OUARHGZL5ITC6IJPXHILY36")?;
//! let receiver = "GCFIRY65OQE7DFP5KLNS2PF2LVZMUZYJX4OZIEQ36N2IQANUB5XVYOJR".parse()?;
//!
//! let accepted = client
//!     .pay(&sender, &receiver, Amount::parse("10")?, Asset::Native, SequenceMode::Auto)
//!     .await?;
//! println!("posted in ledger {}", accepted.ledger);
//! # Ok(())
//! # }
//! ```
//!
//! ## Ground Rules
//!
//! 1. Validation happens before I/O. A bad amount never costs a request.
//! 2. One submission is one POST. Retrying is the caller's call.
//! 3. No global logger state: components log into the span they were given.
//! 4. Seeds never reach a log line or a `Debug` string.

pub mod bulk;
pub mod client;
pub mod config;
pub mod crypto;
pub mod error;
pub mod horizon;
pub mod identity;
pub mod sequence;
pub mod transaction;

pub use client::TxClient;
pub use config::{ClientConfig, EnvelopeVersion};
pub use error::{Error, InputError, Result};
pub use identity::AccountIdentity;
