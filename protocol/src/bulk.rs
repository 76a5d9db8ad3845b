//! Bulk account creation: splitting many destinations into transactions.
//!
//! The assembler only validates the group it is handed. Deciding how many
//! destinations go into each group is this module's job, and submitting the
//! groups in order is
//! [`TxClient::create_accounts_bulk`](crate::client::TxClient::create_accounts_bulk).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::MAX_OPERATIONS_PER_TX;
use crate::crypto::keys::PublicKey;
use crate::error::{Error, InputError};
use crate::horizon::Accepted;
use crate::transaction::types::{Amount, Operation};

/// One destination to create and the native amount to fund it with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Funding {
    pub destination: PublicKey,
    pub amount: Amount,
}

impl Funding {
    pub fn new(destination: PublicKey, amount: Amount) -> Self {
        Self {
            destination,
            amount,
        }
    }

    pub fn to_operation(&self) -> Operation {
        Operation::create_account(self.destination, self.amount)
    }
}

impl FromStr for Funding {
    type Err = InputError;

    /// Parses `ADDRESS,AMOUNT`. Whitespace around either field is ignored.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (address, amount) = line
            .split_once(',')
            .ok_or_else(|| InputError::InvalidFunding(line.trim().to_string()))?;
        let destination = PublicKey::from_address(address)?;
        let amount = Amount::parse(amount.trim())?;
        Ok(Self::new(destination, amount))
    }
}

/// Splits `fundings` into consecutive groups of at most `ceiling`
/// destinations, preserving order.
///
/// The ceiling is clamped to `1..=MAX_OPERATIONS_PER_TX`. 150 destinations
/// with a ceiling of 100 give two groups: 100 then 50.
pub fn plan_batches(fundings: &[Funding], ceiling: usize) -> Vec<&[Funding]> {
    let size = ceiling.clamp(1, MAX_OPERATIONS_PER_TX);
    fundings.chunks(size).collect()
}

/// What happened to one group of a bulk run.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Zero-based position of the group in submission order.
    pub index: usize,
    /// The destinations the group tried to create, in order.
    pub fundings: Vec<Funding>,
    pub result: Result<Accepted, Error>,
}

impl BatchOutcome {
    pub fn is_accepted(&self) -> bool {
        self.result.is_ok()
    }
}

impl fmt::Display for BatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Ok(accepted) => write!(
                f,
                "batch {}: {} accounts created in ledger {}",
                self.index,
                self.fundings.len(),
                accepted.ledger
            ),
            Err(e) => write!(
                f,
                "batch {}: {} accounts failed: {e}",
                self.index,
                self.fundings.len()
            ),
        }
    }
}
