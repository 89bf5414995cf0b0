use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hebench::crypto::context::{SecurityLevel, TfheParams};
use hebench::crypto::tfhe_codec::{TfheCodec, TfheCtVec};

fn fixture(params: &TfheParams, bits: usize) -> TfheCtVec {
    (0..bits)
        .map(|i| params.encrypt_bit(i % 2 == 0).unwrap())
        .collect()
}

fn bench_encode(c: &mut Criterion) {
    let params = TfheParams::generate(SecurityLevel::Default);
    let mut group = c.benchmark_group("tfhe_codec_encode");
    for int_bits in [8usize, 32, 64] {
        let ct_vec = fixture(&params, int_bits);
        group.bench_with_input(format!("{int_bits}bit"), &ct_vec, |b, ct_vec| {
            b.iter(|| black_box(TfheCodec::encode(ct_vec).unwrap()));
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let params = TfheParams::generate(SecurityLevel::Default);
    let mut group = c.benchmark_group("tfhe_codec_decode");
    for int_bits in [8usize, 32, 64] {
        let ct_vec = fixture(&params, int_bits);
        let encoded = TfheCodec::encode(&ct_vec).unwrap();
        group.bench_with_input(format!("{int_bits}bit"), &encoded, |b, encoded| {
            b.iter(|| black_box(TfheCodec::decode(encoded, Some(&params)).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
