//! Benchmark: parse and validate a synthetic schema with many protocols,
//! vendors, and nested container types.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::fmt::Write;
use tlvschema::{parse, validate};

fn synthetic_schema(protocols: usize) -> String {
    let mut src = String::new();
    writeln!(src, "Acme => VENDOR [ id 0x235A ]").unwrap();
    for i in 0..protocols {
        writeln!(src, "proto{i} => PROTOCOL [ id Acme:{i} ]").unwrap();
        writeln!(src, "namespace ns{i}").unwrap();
        writeln!(src, "{{").unwrap();
        writeln!(src, "    Record{i} => STRUCTURE [ extensible ]").unwrap();
        writeln!(src, "    {{").unwrap();
        writeln!(src, "        id [ tag 1 ] : UNSIGNED INTEGER [ range 32bit ],").unwrap();
        writeln!(src, "        label [ tag 2, optional ] : STRING [ length 0..64 ],").unwrap();
        writeln!(src, "        blobs [ tag 3 ] : ARRAY [ length 0.. ] {{ ANY * }},").unwrap();
        writeln!(src, "    }}").unwrap();
        writeln!(src, "}}").unwrap();
    }
    src
}

fn bench_schema(c: &mut Criterion) {
    let source = synthetic_schema(200);
    let schema = parse(&source).expect("synthetic schema parses");

    c.bench_function("parse_200_protocols", |b| {
        b.iter(|| parse(black_box(&source)).expect("parse"))
    });
    c.bench_function("validate_200_protocols", |b| {
        b.iter(|| validate(black_box(&schema)))
    });
}

criterion_group!(benches, bench_schema);
criterion_main!(benches);
