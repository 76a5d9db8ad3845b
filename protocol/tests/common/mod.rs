//! An in-memory ledger that speaks the [`Horizon`] interface.
//!
//! It does what the real network does to an envelope, minus consensus:
//! decodes it, checks the signature and the sequence number, charges the fee
//! and applies the operations atomically. Good enough to drive the client
//! end to end without a socket.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use rust_decimal::Decimal;

use bos_protocol::config::{AMOUNT_DECIMALS, TEST_NETWORK_PASSPHRASE};
use bos_protocol::crypto::{Keypair, PublicKey};
use bos_protocol::horizon::{AccountRecord, Accepted, Balance, Horizon, NetworkInfo, Rejection};
use bos_protocol::transaction::{Asset, Operation, SequenceNumber, SignedEnvelope};
use bos_protocol::{Error, Result};

/// Ledger state of one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerAccount {
    pub sequence: i64,
    pub balance: i64,
}

pub struct MemoryLedger {
    passphrase: String,
    accounts: RwLock<HashMap<PublicKey, LedgerAccount>>,
    submissions: RwLock<Vec<String>>,
    ledger: AtomicU32,
    requests: AtomicUsize,
    info_requests: AtomicUsize,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::with_passphrase(TEST_NETWORK_PASSPHRASE)
    }

    pub fn with_passphrase(passphrase: &str) -> Self {
        Self {
            passphrase: passphrase.to_string(),
            accounts: RwLock::new(HashMap::new()),
            submissions: RwLock::new(Vec::new()),
            ledger: AtomicU32::new(1),
            requests: AtomicUsize::new(0),
            info_requests: AtomicUsize::new(0),
        }
    }

    /// Funds an account directly, as if by genesis.
    pub fn fund(&self, account: PublicKey, units: i64, sequence: i64) {
        self.accounts.write().insert(
            account,
            LedgerAccount {
                sequence,
                balance: units * 10_000_000,
            },
        );
    }

    pub fn get(&self, account: &PublicKey) -> Option<LedgerAccount> {
        self.accounts.read().get(account).copied()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.read().len()
    }

    /// Every envelope ever posted, accepted or not.
    pub fn submissions(&self) -> Vec<String> {
        self.submissions.read().clone()
    }

    pub fn decoded_submissions(&self) -> Vec<SignedEnvelope> {
        self.submissions()
            .iter()
            .map(|s| SignedEnvelope::from_base64(s, &self.passphrase).unwrap())
            .collect()
    }

    /// Total requests of any kind.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn info_requests(&self) -> usize {
        self.info_requests.load(Ordering::SeqCst)
    }

    fn reject(code: &str, operations: &[String]) -> Error {
        let body = serde_json::json!({
            "type": "https://stellar.org/horizon-errors/transaction_failed",
            "title": "Transaction Failed",
            "status": 400,
            "extras": {
                "result_codes": { "transaction": code, "operations": operations }
            }
        })
        .to_string();
        Error::SubmissionRejected(Rejection::from_body(400, &body))
    }

    /// Applies every operation to `state` or reports per-operation codes.
    fn apply(
        state: &mut HashMap<PublicKey, LedgerAccount>,
        source: &PublicKey,
        ops: &[Operation],
    ) -> std::result::Result<(), Vec<String>> {
        let mut codes = Vec::with_capacity(ops.len());
        let mut failed = false;

        for op in ops {
            let code = match op {
                Operation::CreateAccount {
                    destination,
                    starting_balance,
                } => {
                    let amount = starting_balance.stroops();
                    if state.contains_key(destination) {
                        "op_already_exists"
                    } else if state[source].balance < amount {
                        "op_underfunded"
                    } else {
                        state.get_mut(source).unwrap().balance -= amount;
                        state.insert(
                            *destination,
                            LedgerAccount {
                                sequence: 0,
                                balance: amount,
                            },
                        );
                        "op_success"
                    }
                }
                Operation::Payment {
                    destination,
                    asset,
                    amount,
                } => {
                    let amount = amount.stroops();
                    if !matches!(asset, Asset::Native) {
                        "op_no_trust"
                    } else if !state.contains_key(destination) {
                        "op_no_destination"
                    } else if state[source].balance < amount {
                        "op_underfunded"
                    } else {
                        state.get_mut(source).unwrap().balance -= amount;
                        state.get_mut(destination).unwrap().balance += amount;
                        "op_success"
                    }
                }
                Operation::Inflation => "op_success",
            };
            failed |= code != "op_success";
            codes.push(code.to_string());
        }

        if failed {
            Err(codes)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Horizon for MemoryLedger {
    async fn network_info(&self) -> Result<NetworkInfo> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.info_requests.fetch_add(1, Ordering::SeqCst);
        Ok(NetworkInfo {
            network_passphrase: self.passphrase.clone(),
            horizon_version: Some("memory".into()),
            core_version: None,
        })
    }

    async fn account(&self, account: &PublicKey) -> Result<AccountRecord> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let entry = self.get(account).ok_or_else(|| Error::AccountNotFound {
            account: account.address(),
        })?;
        Ok(AccountRecord {
            id: account.address(),
            account_id: Some(account.address()),
            sequence: SequenceNumber(entry.sequence),
            balances: vec![Balance {
                balance: Decimal::new(entry.balance, AMOUNT_DECIMALS),
                asset_type: "native".into(),
                asset_code: None,
                asset_issuer: None,
            }],
        })
    }

    async fn submit(&self, envelope_base64: &str) -> Result<Accepted> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.submissions.write().push(envelope_base64.to_string());

        let envelope = SignedEnvelope::from_base64(envelope_base64, &self.passphrase)
            .map_err(|_| Self::reject("tx_malformed", &[]))?;
        if !envelope.verify() {
            return Err(Self::reject("tx_bad_auth", &[]));
        }

        let tx = envelope.transaction();
        let mut accounts = self.accounts.write();
        let Some(current) = accounts.get(tx.source()).copied() else {
            return Err(Self::reject("tx_no_source_account", &[]));
        };
        if tx.sequence().value() != current.sequence + 1 {
            return Err(Self::reject("tx_bad_seq", &[]));
        }
        let fee = i64::from(tx.fee());
        if current.balance < fee {
            return Err(Self::reject("tx_insufficient_balance", &[]));
        }

        // Fee and sequence are consumed even when the operations fail.
        let charged = LedgerAccount {
            sequence: tx.sequence().value(),
            balance: current.balance - fee,
        };
        accounts.insert(*tx.source(), charged);

        let mut staged = accounts.clone();
        match Self::apply(&mut staged, tx.source(), tx.operations()) {
            Ok(()) => *accounts = staged,
            Err(codes) => return Err(Self::reject("tx_failed", &codes)),
        }

        Ok(Accepted {
            hash: envelope.hash_hex()?,
            ledger: self.ledger.fetch_add(1, Ordering::SeqCst),
        })
    }
}

pub fn keypair(n: u8) -> Keypair {
    Keypair::from_seed_bytes(&[n; 32])
}

/// A distinct address per index, for bulk tests.
pub fn destination(i: usize) -> PublicKey {
    let mut seed = [0xAAu8; 32];
    seed[..8].copy_from_slice(&(i as u64).to_le_bytes());
    Keypair::from_seed_bytes(&seed).public_key()
}
