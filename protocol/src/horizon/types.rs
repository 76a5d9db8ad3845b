//! Response shapes of the network API.
//!
//! Only the fields this crate reads are modelled; serde ignores the rest, so
//! newer API versions with extra fields deserialize fine.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::transaction::types::SequenceNumber;

/// `GET /`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub network_passphrase: String,
    #[serde(default)]
    pub horizon_version: Option<String>,
    #[serde(default)]
    pub core_version: Option<String>,
}

/// `GET /accounts/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: String,

    /// Same address as `id`. The API sends both keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    /// Last used sequence number. The API sends it as a decimal string
    /// because it does not fit in a JSON double.
    #[serde(with = "sequence_string")]
    pub sequence: SequenceNumber,

    #[serde(default)]
    pub balances: Vec<Balance>,
}

impl AccountRecord {
    /// Balance of the native asset, if the record lists one.
    pub fn native_balance(&self) -> Option<Decimal> {
        self.balances
            .iter()
            .find(|b| b.asset_type == "native")
            .map(|b| b.balance)
    }
}

/// One entry of an account's balance list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    #[serde(with = "rust_decimal::serde::str")]
    pub balance: Decimal,
    pub asset_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_issuer: Option<String>,
}

/// `POST /transactions`, 2xx.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accepted {
    pub hash: String,
    pub ledger: u32,
}

/// The network's explanation for a refused transaction.
///
/// Built from the API's problem document. `transaction_code` is the
/// machine-readable reason (`tx_bad_seq`, `tx_insufficient_fee`, ...);
/// `operation_codes` has one entry per operation when the transaction got
/// as far as applying them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub status: u16,
    pub title: String,
    pub detail: Option<String>,
    pub transaction_code: Option<String>,
    pub operation_codes: Vec<String>,
    /// The problem document exactly as received.
    pub raw: String,
}

impl Rejection {
    /// Parses a problem document. Bodies that aren't JSON still produce a
    /// rejection; the raw text is kept so nothing is lost.
    pub fn from_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<Problem>(body) {
            Ok(p) => {
                let codes = p.extras.and_then(|e| e.result_codes);
                Self {
                    status,
                    title: p.title.unwrap_or_else(|| "Transaction Failed".into()),
                    detail: p.detail,
                    transaction_code: codes.as_ref().and_then(|c| c.transaction.clone()),
                    operation_codes: codes.and_then(|c| c.operations).unwrap_or_default(),
                    raw: body.to_string(),
                }
            }
            Err(_) => Self {
                status,
                title: format!("HTTP {status}"),
                detail: None,
                transaction_code: None,
                operation_codes: Vec::new(),
                raw: body.to_string(),
            },
        }
    }

    /// `true` when the network refused the sequence number.
    pub fn is_bad_sequence(&self) -> bool {
        self.transaction_code.as_deref() == Some("tx_bad_seq")
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (status {})", self.title, self.status)?;
        if let Some(code) = &self.transaction_code {
            write!(f, ": {code}")?;
        }
        if !self.operation_codes.is_empty() {
            write!(f, " [{}]", self.operation_codes.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct Problem {
    title: Option<String>,
    detail: Option<String>,
    extras: Option<ProblemExtras>,
}

#[derive(Debug, Deserialize)]
struct ProblemExtras {
    result_codes: Option<ResultCodes>,
}

#[derive(Debug, Deserialize)]
struct ResultCodes {
    transaction: Option<String>,
    operations: Option<Vec<String>>,
}

mod sequence_string {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::transaction::types::SequenceNumber;

    pub fn serialize<S: Serializer>(seq: &SequenceNumber, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&seq.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<SequenceNumber, D::Error> {
        let s = String::deserialize(d)?;
        s.parse::<i64>()
            .map(SequenceNumber)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn account_record_parses_string_sequence() {
        let json = r#"{
            "id": "GDFQVQCYYB7GKCGSCUSIQYXTPLV5YJ3XWDMWGQMDNM4EAXAL7LITIBQ7",
            "sequence": "8589934593",
            "balances": [
                {"balance": "5.0000000", "asset_type": "credit_alphanum4",
                 "asset_code": "USD", "asset_issuer": "GDFQVQCYYB7GKCGSCUSIQYXTPLV5YJ3XWDMWGQMDNM4EAXAL7LITIBQ7"},
                {"balance": "100.0000000", "asset_type": "native"}
            ],
            "subentry_count": 0
        }"#;
        let rec: AccountRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.sequence, SequenceNumber(8_589_934_593));
        assert_eq!(rec.native_balance(), Some(Decimal::from_str("100").unwrap()));
        assert_eq!(rec.balances[0].asset_code.as_deref(), Some("USD"));
    }

    #[test]
    fn account_record_accepts_id_and_account_id_together() {
        let json = r#"{
            "id": "GDFQVQCYYB7GKCGSCUSIQYXTPLV5YJ3XWDMWGQMDNM4EAXAL7LITIBQ7",
            "account_id": "GDFQVQCYYB7GKCGSCUSIQYXTPLV5YJ3XWDMWGQMDNM4EAXAL7LITIBQ7",
            "sequence": "8589934593",
            "balances": []
        }"#;
        let rec: AccountRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.account_id.as_deref(), Some(rec.id.as_str()));
        assert_eq!(rec.sequence, SequenceNumber(8_589_934_593));
        assert_eq!(rec.native_balance(), None);
    }

    #[test]
    fn numeric_garbage_sequence_is_an_error() {
        let json = r#"{"id": "G", "sequence": "abc"}"#;
        assert!(serde_json::from_str::<AccountRecord>(json).is_err());
    }

    #[test]
    fn rejection_from_problem_document() {
        let body = r#"{
            "type": "https://stellar.org/horizon-errors/transaction_failed",
            "title": "Transaction Failed",
            "status": 400,
            "detail": "The transaction failed when submitted to the network.",
            "extras": {
                "result_codes": {"transaction": "tx_failed", "operations": ["op_success", "op_underfunded"]}
            }
        }"#;
        let r = Rejection::from_body(400, body);
        assert_eq!(r.transaction_code.as_deref(), Some("tx_failed"));
        assert_eq!(r.operation_codes, vec!["op_success", "op_underfunded"]);
        assert_eq!(
            r.to_string(),
            "Transaction Failed (status 400): tx_failed [op_success, op_underfunded]"
        );
        assert!(!r.is_bad_sequence());
    }

    #[test]
    fn rejection_from_plain_text() {
        let r = Rejection::from_body(502, "Bad Gateway");
        assert_eq!(r.title, "HTTP 502");
        assert_eq!(r.raw, "Bad Gateway");
        assert!(r.transaction_code.is_none());
    }

    #[test]
    fn bad_sequence_is_recognized() {
        let body = r#"{"title": "Transaction Failed", "extras": {"result_codes": {"transaction": "tx_bad_seq"}}}"#;
        assert!(Rejection::from_body(400, body).is_bad_sequence());
    }
}
