//! Binlog Decode Throughput Benchmarks
//!
//! Measures event deserialization throughput:
//! - Framing and dispatch of small fixed-size events
//! - Row event decoding against a cached table map
//!
//! Run with: cargo bench -p rivven-binlog

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rivven_binlog::{BinlogEventReader, BinlogInputStream, EventType};

fn event(event_type: EventType, body: &[u8], checksum_length: usize) -> Vec<u8> {
    let event_length = (19 + body.len() + checksum_length) as u32;
    let mut data = Vec::with_capacity(event_length as usize);
    data.extend_from_slice(&1_700_000_000u32.to_le_bytes());
    data.push(event_type.code());
    data.extend_from_slice(&1u32.to_le_bytes());
    data.extend_from_slice(&event_length.to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes());
    data.extend_from_slice(body);
    data.extend(std::iter::repeat(0u8).take(checksum_length));
    data
}

fn table_map(table_id: u64) -> Vec<u8> {
    let mut body = table_id.to_le_bytes()[..6].to_vec();
    body.extend_from_slice(&1u16.to_le_bytes());
    body.extend_from_slice(b"\x05bench\0\x05items\0");
    body.push(4);
    body.extend_from_slice(&[8, 15, 246, 18]); // LONGLONG VARCHAR NEWDECIMAL DATETIME2
    body.push(5);
    body.extend_from_slice(&255u16.to_le_bytes());
    body.extend_from_slice(&[10, 2]);
    body.push(0);
    body.push(0b1110);
    body
}

fn write_rows(table_id: u64, rows: usize) -> Vec<u8> {
    let mut body = table_id.to_le_bytes()[..6].to_vec();
    body.extend_from_slice(&0u16.to_le_bytes());
    body.extend_from_slice(&2u16.to_le_bytes());
    body.push(4);
    body.push(0b1111);
    for i in 0..rows {
        body.push(0);
        body.extend_from_slice(&(i as i64).to_le_bytes());
        body.push(12);
        body.extend_from_slice(format!("item-{:07}", i).as_bytes());
        body.extend_from_slice(&[0x80, 0x00, 0x04, 0xD2, 0x38]);
        let year_month: u64 = 2024 * 13 + 6;
        let packed: u64 = (1 << 39) | (year_month << 22) | (15 << 17) | (12 << 12);
        body.extend_from_slice(&packed.to_be_bytes()[3..]);
    }
    body
}

fn decode_all(bytes: &[u8], checksum_length: usize) -> usize {
    let mut reader = BinlogEventReader::new(BinlogInputStream::from_bytes(bytes.to_vec()));
    reader.deserializer_mut().set_checksum_length(checksum_length);
    reader.map(|event| event.map(|_| 1).unwrap_or(0)).sum()
}

fn benchmark_framing(c: &mut Criterion) {
    let mut group = c.benchmark_group("framing");

    for count in [100usize, 1_000, 10_000].iter() {
        let mut bytes = Vec::new();
        for i in 0..*count {
            bytes.extend(event(EventType::Xid, &(i as u64).to_le_bytes(), 4));
        }

        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("xid_events", count), &bytes, |b, bytes| {
            b.iter(|| decode_all(black_box(bytes), 4))
        });
    }

    let mut unknown = Vec::new();
    for _ in 0..1_000 {
        unknown.extend(event(EventType::Unknown(200), &[0u8; 256], 4));
    }
    group.throughput(Throughput::Bytes(unknown.len() as u64));
    group.bench_function("skip_unknown_events", |b| {
        b.iter(|| decode_all(black_box(&unknown), 4))
    });

    group.finish();
}

fn benchmark_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("rows");

    for rows in [1usize, 10, 100].iter() {
        let mut bytes = event(EventType::TableMap, &table_map(1), 4);
        for _ in 0..100 {
            bytes.extend(event(EventType::ExtWriteRows, &write_rows(1, *rows), 4));
        }

        group.throughput(Throughput::Elements((*rows * 100) as u64));
        group.bench_with_input(BenchmarkId::new("write_rows", rows), &bytes, |b, bytes| {
            b.iter(|| decode_all(black_box(bytes), 4))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_framing, benchmark_rows);
criterion_main!(benches);
