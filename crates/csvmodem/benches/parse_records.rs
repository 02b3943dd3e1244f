use std::hint::black_box;
use std::io::Cursor;

use criterion::{Criterion, criterion_group, criterion_main};
use csvmodem::{ParserOptions, parse_records};

fn document(records: usize) -> Vec<u8> {
    let mut text = String::new();
    for i in 0..records {
        text.push_str(&format!("row{i},\"quoted, field\",plain text,{i}\n"));
    }
    text.into_bytes()
}

fn bench_parse_records(c: &mut Criterion) {
    let small = document(100);
    let large = document(10_000);

    c.bench_function("parse_records/100", |b| {
        b.iter(|| {
            parse_records(
                Cursor::new(black_box(&small)),
                ',',
                ParserOptions::default(),
            )
            .unwrap()
        });
    });

    c.bench_function("parse_records/10000 sanitized", |b| {
        let options = ParserOptions {
            sanitize_fields: true,
            ..Default::default()
        };
        b.iter(|| parse_records(Cursor::new(black_box(&large)), ',', options).unwrap());
    });
}

criterion_group!(benches, bench_parse_records);
criterion_main!(benches);
