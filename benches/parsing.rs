//! Benchmarks for trade frame parsing

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use okxflow::okx::parsing::{find_field, parse_trade_frame};

// Test data - real OKX trades channel frame
const OKX_TRADE: &[u8] = br#"{"arg":{"channel":"trades","instType":"SPOT","instId":"BTC-USDT"},"data":[{"instId":"BTC-USDT","tradeId":"130639474","px":"27340.8","sz":"0.0005","side":"sell","ts":"1694464949239"}]}"#;

const SUBSCRIBE_ACK: &[u8] =
    br#"{"event":"subscribe","arg":{"channel":"trades","instId":"BTC-USDT"}}"#;

fn bench_trade_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("okx_parse");
    group.throughput(Throughput::Bytes(OKX_TRADE.len() as u64));

    group.bench_function("trade_frame", |b| {
        b.iter(|| {
            let result = parse_trade_frame(black_box(OKX_TRADE));
            black_box(result)
        })
    });

    group.bench_function("ack_rejection", |b| {
        b.iter(|| {
            let result = parse_trade_frame(black_box(SUBSCRIBE_ACK));
            black_box(result)
        })
    });

    group.finish();
}

fn bench_field_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("okx_parse");

    group.bench_function("find_field_px", |b| {
        b.iter(|| {
            let result = find_field(black_box(OKX_TRADE), black_box(b"px"));
            black_box(result)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_trade_parse, bench_field_lookup);

criterion_main!(benches);
