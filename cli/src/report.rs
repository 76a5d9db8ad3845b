//! Human-readable output for payments and bulk runs.

use std::fmt;

use rust_decimal::Decimal;

use bos_protocol::bulk::BatchOutcome;
use bos_protocol::config::AMOUNT_DECIMALS;
use bos_protocol::crypto::PublicKey;
use bos_protocol::transaction::Amount;

/// A native balance observed before and after a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceChange {
    pub before: Decimal,
    pub after: Decimal,
}

impl BalanceChange {
    pub fn new(before: Decimal, after: Decimal) -> Self {
        Self { before, after }
    }

    pub fn diff(&self) -> Decimal {
        self.after - self.before
    }
}

/// Renders as `+10.0000000: 5.0000000 -> 15.0000000`.
impl fmt::Display for BalanceChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let diff = units(self.diff());
        let sign = if diff.is_sign_negative() { "" } else { "+" };
        write!(
            f,
            "{sign}{diff}: {} -> {}",
            units(self.before),
            units(self.after)
        )
    }
}

fn units(mut d: Decimal) -> Decimal {
    d.rescale(AMOUNT_DECIMALS);
    d
}

pub fn payment_report(
    amount: Amount,
    sender: &PublicKey,
    receiver: &PublicKey,
    sender_change: BalanceChange,
    receiver_change: BalanceChange,
) -> String {
    format!(
        "{amount} sent from {sender} to {receiver} successfully\n\n  \
         sender: {sender_change}\nreceiver: {receiver_change}"
    )
}

/// One `(O)` or `(X)` line per destination of the group.
pub fn outcome_lines(outcome: &BatchOutcome) -> Vec<String> {
    let mark = if outcome.is_accepted() { "(O)" } else { "(X)" };
    outcome
        .fundings
        .iter()
        .map(|f| format!("{mark} {} : {}", f.destination, f.amount))
        .collect()
}
