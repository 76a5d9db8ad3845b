//! End-to-end tests for the transaction pipeline.
//!
//! Each test runs the real client (validate, resolve, assemble, sign, encode,
//! submit) against an in-memory ledger that decodes and verifies every
//! envelope it receives. No sockets, no shared state between tests.

mod common;

use rust_decimal::Decimal;

use bos_protocol::bulk::Funding;
use bos_protocol::config::{EnvelopeVersion, PUBLIC_NETWORK_PASSPHRASE, TEST_NETWORK_PASSPHRASE};
use bos_protocol::transaction::{
    encode, sign_transaction, Amount, Asset, Operation, SequenceMode, SequenceNumber,
    SignedEnvelope, TransactionBuilder,
};
use bos_protocol::{AccountIdentity, Error, InputError, TxClient};

use common::{destination, keypair, MemoryLedger};

const FEE: u32 = 10_000;

fn sender() -> AccountIdentity {
    AccountIdentity::from_keypair(keypair(1))
}

/// Ledger with the sender funded at 100 units and last used sequence 41.
fn setup() -> TxClient<MemoryLedger> {
    let ledger = MemoryLedger::new();
    ledger.fund(keypair(1).public_key(), 100, 41);
    TxClient::new(ledger).with_base_fee(FEE)
}

fn units(s: &str) -> Decimal {
    s.parse().unwrap()
}

// ---------------------------------------------------------------------------
// Determinism and round trip
// ---------------------------------------------------------------------------

#[test]
fn identical_inputs_give_identical_wire() {
    let build = || {
        let kp = keypair(1);
        let tx = TransactionBuilder::new()
            .source(kp.public_key())
            .base_fee(FEE)
            .last_sequence(SequenceNumber(41))
            .network(TEST_NETWORK_PASSPHRASE)
            .operation(Operation::payment(
                keypair(2).public_key(),
                Asset::Native,
                Amount::parse("10.0000000").unwrap(),
            ))
            .build()
            .unwrap();
        encode(&sign_transaction(tx, &kp).unwrap()).unwrap()
    };
    assert_eq!(build(), build());
}

#[tokio::test]
async fn submitted_envelope_decodes_to_what_was_built() {
    let client = setup();
    let dest = destination(0);
    client
        .create_account(
            &sender(),
            &dest,
            Amount::parse("20.5").unwrap(),
            SequenceMode::Auto,
        )
        .await
        .unwrap();

    let envelopes = client.horizon().decoded_submissions();
    assert_eq!(envelopes.len(), 1);
    let tx = envelopes[0].transaction();
    assert_eq!(tx.source(), &keypair(1).public_key());
    assert_eq!(tx.sequence(), SequenceNumber(42));
    assert_eq!(tx.fee(), FEE);
    assert_eq!(tx.network_passphrase(), TEST_NETWORK_PASSPHRASE);
    assert_eq!(
        tx.operations(),
        &[Operation::create_account(dest, Amount::parse("20.5").unwrap())]
    );
    assert!(envelopes[0].verify());
}

// ---------------------------------------------------------------------------
// Validation before I/O
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_and_oversized_lists_fail_without_requests() {
    let client = setup();

    let err = client
        .submit_operations(&sender(), Vec::new(), SequenceMode::Auto)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(InputError::EmptyTransaction)));

    let err = client
        .submit_operations(&sender(), vec![Operation::Inflation; 101], SequenceMode::Auto)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidInput(InputError::TooManyOperations { count: 101, max: 100 })
    ));

    let fundings: Vec<Funding> = (0..101)
        .map(|i| Funding::new(destination(i), Amount::parse("1").unwrap()))
        .collect();
    let err = client
        .create_accounts(&sender(), &fundings, SequenceMode::Fixed(SequenceNumber(1)))
        .await
        .unwrap_err();
    assert!(err.is_invalid_input());

    assert_eq!(client.horizon().requests(), 0);
}

#[tokio::test]
async fn public_identity_cannot_sign() {
    let client = setup();
    let watcher = AccountIdentity::public(keypair(1).public_key());
    let err = client
        .inflation_vote(&watcher, SequenceMode::Auto)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidInput(InputError::MissingSecret { .. })
    ));
    assert_eq!(client.horizon().requests(), 0);
}

// ---------------------------------------------------------------------------
// Sequence modes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fixed_mode_uses_supplied_plus_one() {
    let client = setup();
    client
        .inflation_vote(&sender(), SequenceMode::Fixed(SequenceNumber(41)))
        .await
        .unwrap();

    let sent = client.horizon().decoded_submissions();
    assert_eq!(sent[0].transaction().sequence(), SequenceNumber(42));
    // network_info + submit; no account lookup.
    assert_eq!(client.horizon().requests(), 2);
}

#[tokio::test]
async fn auto_mode_uses_fetched_plus_one() {
    let ledger = MemoryLedger::new();
    ledger.fund(keypair(1).public_key(), 100, 1_000);
    let client = TxClient::new(ledger).with_base_fee(FEE);

    client
        .inflation_vote(&sender(), SequenceMode::Auto)
        .await
        .unwrap();
    client
        .inflation_vote(&sender(), SequenceMode::Auto)
        .await
        .unwrap();

    let seqs: Vec<_> = client
        .horizon()
        .decoded_submissions()
        .iter()
        .map(|e| e.transaction().sequence())
        .collect();
    assert_eq!(seqs, vec![SequenceNumber(1_001), SequenceNumber(1_002)]);
}

#[tokio::test]
async fn stale_fixed_sequence_is_rejected() {
    let client = setup();
    client
        .inflation_vote(&sender(), SequenceMode::Fixed(SequenceNumber(41)))
        .await
        .unwrap();

    // Same last-used value again: the ledger has moved on to 42.
    let err = client
        .inflation_vote(&sender(), SequenceMode::Fixed(SequenceNumber(41)))
        .await
        .unwrap_err();
    let rejection = err.rejection().expect("submission rejected");
    assert!(rejection.is_bad_sequence());
    assert_eq!(
        client.horizon().get(&keypair(1).public_key()).unwrap().sequence,
        42
    );
}

#[tokio::test]
async fn already_incremented_fixed_value_is_rejected() {
    let client = setup();
    // 42 is the *next* sequence, not the last used one.
    let err = client
        .inflation_vote(&sender(), SequenceMode::Fixed(SequenceNumber(42)))
        .await
        .unwrap_err();
    assert!(err.rejection().unwrap().is_bad_sequence());
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

#[tokio::test]
async fn payment_moves_exactly_the_amount() {
    let client = setup();
    let receiver = keypair(2).public_key();
    client.horizon().fund(receiver, 5, 0);
    let sender_pk = keypair(1).public_key();

    let sender_before = client.native_balance(&sender_pk).await.unwrap();
    let receiver_before = client.native_balance(&receiver).await.unwrap();
    assert_eq!(sender_before, units("100"));

    client
        .pay(
            &sender(),
            &receiver,
            Amount::parse("10.0000000").unwrap(),
            Asset::Native,
            SequenceMode::Auto,
        )
        .await
        .unwrap();

    let sender_after = client.native_balance(&sender_pk).await.unwrap();
    let receiver_after = client.native_balance(&receiver).await.unwrap();

    let sent = client.horizon().decoded_submissions();
    assert_eq!(sent[0].transaction().fee(), FEE);

    let fee = Decimal::new(i64::from(FEE), 7);
    assert_eq!(receiver_after - receiver_before, units("10"));
    assert_eq!(sender_before - sender_after, units("10") + fee);
}

#[tokio::test]
async fn payment_to_missing_account_fails_with_op_code() {
    let client = setup();
    let err = client
        .pay(
            &sender(),
            &keypair(9).public_key(),
            Amount::parse("1").unwrap(),
            Asset::Native,
            SequenceMode::Auto,
        )
        .await
        .unwrap_err();
    let rejection = err.rejection().unwrap();
    assert_eq!(rejection.transaction_code.as_deref(), Some("tx_failed"));
    assert_eq!(rejection.operation_codes, vec!["op_no_destination"]);
}

// ---------------------------------------------------------------------------
// Networks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn network_passphrase_is_fetched_once() {
    let client = setup();
    for _ in 0..3 {
        client
            .inflation_vote(&sender(), SequenceMode::Auto)
            .await
            .unwrap();
    }
    assert_eq!(client.horizon().info_requests(), 1);
}

#[tokio::test]
async fn envelope_for_another_network_is_refused() {
    let ledger = MemoryLedger::new();
    ledger.fund(keypair(1).public_key(), 100, 0);
    let client = TxClient::new(ledger).with_network(PUBLIC_NETWORK_PASSPHRASE);

    let err = client
        .inflation_vote(&sender(), SequenceMode::Auto)
        .await
        .unwrap_err();
    assert_eq!(
        err.rejection().unwrap().transaction_code.as_deref(),
        Some("tx_bad_auth")
    );
    assert_eq!(client.horizon().info_requests(), 0);
}

#[tokio::test]
async fn unknown_source_account_is_not_found() {
    let client = TxClient::new(MemoryLedger::new());
    let err = client
        .inflation_vote(&sender(), SequenceMode::Auto)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AccountNotFound { .. }));
    assert!(client.horizon().submissions().is_empty());
}

// ---------------------------------------------------------------------------
// Bulk
// ---------------------------------------------------------------------------

fn fundings(n: usize) -> Vec<Funding> {
    (0..n)
        .map(|i| Funding::new(destination(i), Amount::parse("0.1").unwrap()))
        .collect()
}

#[tokio::test]
async fn bulk_of_150_is_two_transactions() {
    let client = setup();
    let outcomes = client
        .create_accounts_bulk(&sender(), &fundings(150), SequenceMode::Auto)
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.is_accepted()));
    assert_eq!(outcomes[0].fundings.len(), 100);
    assert_eq!(outcomes[1].fundings.len(), 50);

    let sent = client.horizon().decoded_submissions();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].transaction().operations().len(), 100);
    assert_eq!(sent[0].transaction().fee(), 100 * FEE);
    assert_eq!(sent[1].transaction().operations().len(), 50);
    assert_eq!(sent[0].transaction().sequence(), SequenceNumber(42));
    assert_eq!(sent[1].transaction().sequence(), SequenceNumber(43));

    // Sender plus 150 new accounts.
    assert_eq!(client.horizon().account_count(), 151);
}

#[tokio::test]
async fn bulk_fixed_mode_advances_per_group() {
    let client = setup();
    let outcomes = client
        .create_accounts_bulk(
            &sender(),
            &fundings(250),
            SequenceMode::Fixed(SequenceNumber(41)),
        )
        .await
        .unwrap();
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.iter().all(|o| o.is_accepted()));

    let seqs: Vec<_> = client
        .horizon()
        .decoded_submissions()
        .iter()
        .map(|e| e.transaction().sequence())
        .collect();
    assert_eq!(
        seqs,
        vec![SequenceNumber(42), SequenceNumber(43), SequenceNumber(44)]
    );
}

#[tokio::test]
async fn bulk_auto_mode_continues_past_a_failed_group() {
    let client = setup();
    // Make the first group fail: one of its destinations already exists.
    client.horizon().fund(destination(3), 1, 0);

    let outcomes = client
        .create_accounts_bulk(&sender(), &fundings(150), SequenceMode::Auto)
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 2);
    assert!(!outcomes[0].is_accepted());
    assert!(outcomes[1].is_accepted());
    assert!(client.horizon().get(&destination(120)).is_some());
    assert!(client.horizon().get(&destination(0)).is_none());
}

#[tokio::test]
async fn bulk_fixed_mode_stops_at_first_failure() {
    let client = setup();
    client.horizon().fund(destination(3), 1, 0);

    let outcomes = client
        .create_accounts_bulk(
            &sender(),
            &fundings(150),
            SequenceMode::Fixed(SequenceNumber(41)),
        )
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].is_accepted());
    assert_eq!(client.horizon().submissions().len(), 1);
}

#[tokio::test]
async fn bulk_fixed_mode_at_the_sequence_limit_keeps_earlier_outcomes() {
    let ledger = MemoryLedger::new();
    ledger.fund(keypair(1).public_key(), 100, i64::MAX - 1);
    let client = TxClient::new(ledger)
        .with_base_fee(FEE)
        .with_max_operations(1);

    let outcomes = client
        .create_accounts_bulk(
            &sender(),
            &fundings(3),
            SequenceMode::Fixed(SequenceNumber(i64::MAX - 1)),
        )
        .await
        .unwrap();

    // The first group takes i64::MAX; the second has nothing left.
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[0].is_accepted());
    assert_eq!(outcomes[0].fundings, fundings(3)[..1]);
    assert!(matches!(
        outcomes[1].result,
        Err(Error::InvalidInput(InputError::SequenceOverflow))
    ));
    assert_eq!(client.horizon().submissions().len(), 1);
    assert!(client.horizon().get(&destination(0)).is_some());
    assert_eq!(
        client.horizon().get(&keypair(1).public_key()).unwrap().sequence,
        i64::MAX
    );
}

#[tokio::test]
async fn bulk_with_nothing_to_do_is_invalid() {
    let client = setup();
    let err = client
        .create_accounts_bulk(&sender(), &[], SequenceMode::Auto)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(InputError::EmptyTransaction)));
    assert_eq!(client.horizon().requests(), 0);
}

#[tokio::test]
async fn both_envelope_layouts_are_accepted() {
    for version in [EnvelopeVersion::Legacy, EnvelopeVersion::V1] {
        let client = setup().with_envelope(version);
        client
            .inflation_vote(&sender(), SequenceMode::Auto)
            .await
            .unwrap();
        let sent = client.horizon().decoded_submissions();
        assert_eq!(sent[0].version(), version);
        assert_eq!(sent[0].transaction().sequence(), SequenceNumber(42));
    }
}

#[tokio::test]
async fn default_client_posts_legacy_envelopes() {
    let client = setup();
    client
        .inflation_vote(&sender(), SequenceMode::Auto)
        .await
        .unwrap();
    assert_eq!(
        client.horizon().decoded_submissions()[0].version(),
        EnvelopeVersion::Legacy
    );
}

#[test]
fn decode_requires_the_right_envelope_bytes() {
    assert!(SignedEnvelope::from_base64("AAAA", TEST_NETWORK_PASSPHRASE).is_err());
}
