// Assembly, signing and encoding benchmarks.
//
// Covers the local half of the pipeline: strkey parsing, building a
// transaction, signing it, encoding the envelope, and decoding it back at
// various operation counts up to the protocol ceiling.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::RngCore;

use bos_protocol::config::TEST_NETWORK_PASSPHRASE;
use bos_protocol::crypto::{Keypair, PublicKey};
use bos_protocol::transaction::{
    encode, sign_transaction, Amount, Asset, Operation, SequenceNumber, SignedEnvelope,
    TransactionBuilder,
};

fn random_keypair() -> Keypair {
    let mut seed = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut seed);
    Keypair::from_seed_bytes(&seed)
}

fn payments(n: usize) -> Vec<Operation> {
    (0..n)
        .map(|_| {
            Operation::payment(
                random_keypair().public_key(),
                Asset::Native,
                Amount::parse("10.0000000").unwrap(),
            )
        })
        .collect()
}

fn bench_strkey(c: &mut Criterion) {
    let address = random_keypair().address();
    c.bench_function("strkey/parse_address", |b| {
        b.iter(|| PublicKey::from_address(&address).unwrap());
    });
}

fn bench_sign_payment(c: &mut Criterion) {
    let keypair = random_keypair();
    let ops = payments(1);

    c.bench_function("tx/build_sign_encode", |b| {
        b.iter(|| {
            let tx = TransactionBuilder::new()
                .source(keypair.public_key())
                .base_fee(10_000)
                .last_sequence(SequenceNumber(42))
                .network(TEST_NETWORK_PASSPHRASE)
                .operations(ops.clone())
                .build()
                .unwrap();
            encode(&sign_transaction(tx, &keypair).unwrap()).unwrap()
        });
    });
}

fn bench_envelope_sizes(c: &mut Criterion) {
    let keypair = random_keypair();
    let mut group = c.benchmark_group("tx/decode_verify");

    for size in [1, 10, 50, 100] {
        let tx = TransactionBuilder::new()
            .source(keypair.public_key())
            .last_sequence(SequenceNumber(1))
            .network(TEST_NETWORK_PASSPHRASE)
            .operations(payments(size))
            .build()
            .unwrap();
        let wire = encode(&sign_transaction(tx, &keypair).unwrap()).unwrap();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &wire, |b, wire| {
            b.iter(|| {
                let env = SignedEnvelope::from_base64(wire, TEST_NETWORK_PASSPHRASE).unwrap();
                assert!(env.verify());
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_strkey,
    bench_sign_payment,
    bench_envelope_sizes,
);
criterion_main!(benches);
