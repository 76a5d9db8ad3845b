//! Core value types for ledger transactions.
//!
//! These types are the vocabulary of the assembler: amounts, assets,
//! operations and sequence numbers. Each one validates itself at
//! construction, so by the time a value reaches the builder it is known to be
//! well-formed and the builder only has to check how the pieces fit together.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{AMOUNT_DECIMALS, STROOPS_PER_UNIT};
use crate::crypto::keys::PublicKey;
use crate::error::InputError;

// ---------------------------------------------------------------------------
// Amount
// ---------------------------------------------------------------------------

/// A strictly positive quantity of some asset, in stroops (10^-7 units).
///
/// Parsed from decimal strings like `"10"`, `"0.5"` or `"10.0000000"`. No
/// floating point anywhere near money: the string goes through an exact
/// [`Decimal`] and only then becomes an integer stroop count.
///
/// # Examples
///
/// ```
/// use bos_protocol::transaction::types::Amount;
///
/// let ten = Amount::parse("10.0000000").unwrap();
/// assert_eq!(ten.stroops(), 100_000_000);
/// assert_eq!(ten.to_string(), "10.0000000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount {
    stroops: i64,
}

impl Amount {
    /// Parses a positive decimal string with at most 7 fractional digits.
    ///
    /// Only plain `digits[.digits]` is accepted: no sign, exponent,
    /// separators or bare decimal point.
    pub fn parse(s: &str) -> Result<Self, InputError> {
        let invalid = |reason: &'static str| InputError::InvalidAmount {
            amount: s.to_string(),
            reason,
        };
        let is_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());

        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, Some(f)),
            None => (s, None),
        };
        if !is_digits(whole) {
            return Err(invalid("expected digits before the decimal point"));
        }
        if frac.is_some_and(|f| !is_digits(f)) {
            return Err(invalid("expected digits after the decimal point"));
        }

        let value = Decimal::from_str_exact(s).map_err(|_| invalid("amount out of range"))?;
        if value.scale() > AMOUNT_DECIMALS {
            return Err(invalid("more than 7 fractional digits"));
        }
        if value <= Decimal::ZERO {
            return Err(invalid("amount must be greater than zero"));
        }

        let stroops = value
            .checked_mul(Decimal::from(STROOPS_PER_UNIT))
            .and_then(|d| d.to_i64())
            .ok_or_else(|| invalid("amount out of range"))?;
        Self::from_stroops(stroops).map_err(|_| invalid("amount must be greater than zero"))
    }

    /// Wraps a raw stroop count. Zero and negatives are rejected.
    pub fn from_stroops(stroops: i64) -> Result<Self, InputError> {
        if stroops <= 0 {
            return Err(InputError::InvalidAmount {
                amount: stroops.to_string(),
                reason: "amount must be greater than zero",
            });
        }
        Ok(Self { stroops })
    }

    pub fn stroops(&self) -> i64 {
        self.stroops
    }

    /// The amount as an exact decimal, for arithmetic on balances.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.stroops, AMOUNT_DECIMALS)
    }
}

impl FromStr for Amount {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:07}",
            self.stroops / STROOPS_PER_UNIT,
            self.stroops % STROOPS_PER_UNIT
        )
    }
}

impl Serialize for Amount {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Asset
// ---------------------------------------------------------------------------

/// What a payment moves: the native currency or an issued credit.
///
/// Credit codes of 1–4 characters encode as `AlphaNum4`, 5–12 as `AlphaNum12`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Asset {
    Native,
    Credit { code: String, issuer: PublicKey },
}

impl Asset {
    /// Builds an issued asset, validating the code.
    pub fn credit(code: &str, issuer: PublicKey) -> Result<Self, InputError> {
        if code.is_empty() || code.len() > 12 || !code.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(InputError::InvalidAsset(format!(
                "asset code must be 1-12 ASCII alphanumerics, got {code:?}"
            )));
        }
        Ok(Self::Credit {
            code: code.to_string(),
            issuer,
        })
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }

    /// The network API's `asset_type` string for this asset.
    pub fn asset_type(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Credit { code, .. } if code.len() <= 4 => "credit_alphanum4",
            Self::Credit { .. } => "credit_alphanum12",
        }
    }
}

impl FromStr for Asset {
    type Err = InputError;

    /// Accepts `native` or `CODE:ISSUER`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("native") {
            return Ok(Self::Native);
        }
        let (code, issuer) = s
            .split_once(':')
            .ok_or_else(|| InputError::InvalidAsset(format!("expected CODE:ISSUER, got {s:?}")))?;
        let issuer = PublicKey::from_address(issuer).map_err(InputError::InvalidAddress)?;
        Self::credit(code, issuer)
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::Credit { code, issuer } => write!(f, "{code}:{issuer}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// One state change inside a transaction.
///
/// Operations are plain values: once pushed onto a builder they are never
/// modified, only encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Creates and funds a new account with the native asset.
    CreateAccount {
        destination: PublicKey,
        starting_balance: Amount,
    },
    /// Sends `amount` of `asset` to an existing account.
    Payment {
        destination: PublicKey,
        asset: Asset,
        amount: Amount,
    },
    /// Inflation vote: asks the network to run its inflation round.
    Inflation,
}

impl Operation {
    pub fn create_account(destination: PublicKey, starting_balance: Amount) -> Self {
        Self::CreateAccount {
            destination,
            starting_balance,
        }
    }

    pub fn payment(destination: PublicKey, asset: Asset, amount: Amount) -> Self {
        Self::Payment {
            destination,
            asset,
            amount,
        }
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateAccount { .. } => "create_account",
            Self::Payment { .. } => "payment",
            Self::Inflation => "inflation",
        }
    }
}

// ---------------------------------------------------------------------------
// Sequence numbers
// ---------------------------------------------------------------------------

/// Per-account transaction counter. A transaction must carry exactly the
/// account's last used value plus one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SequenceNumber(pub i64);

impl SequenceNumber {
    pub fn value(self) -> i64 {
        self.0
    }

    /// The sequence a transaction following this one must carry.
    pub fn next(self) -> Result<Self, InputError> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or(InputError::SequenceOverflow)
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the sequence number of a new transaction is obtained.
///
/// Both variants describe the *last used* sequence; the assembler always adds
/// one. `Fixed(n)` therefore produces a transaction with sequence `n + 1`,
/// exactly like `Auto` does when the network reports `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceMode {
    /// Fetch the account's current sequence from the network right before
    /// assembly.
    Auto,
    /// Caller-supplied last used sequence. No network call.
    Fixed(SequenceNumber),
}

impl SequenceMode {
    /// `None` means auto.
    pub fn from_last_used(last_used: Option<i64>) -> Self {
        match last_used {
            Some(n) => Self::Fixed(SequenceNumber(n)),
            None => Self::Auto,
        }
    }
}
