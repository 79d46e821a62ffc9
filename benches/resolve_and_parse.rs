use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ontoparse::grammar::Grammar;
use ontoparse::pos::{build_pos_table, enumerate_paths};

fn criterion_benchmark(c: &mut Criterion) {
  let grammar = Grammar::english().unwrap();
  let ambiguous = "i never gave it to him, he did not give it to me";

  c.bench_function("enumerate paths", |b| {
    let table = build_pos_table(ambiguous);
    b.iter(|| enumerate_paths(black_box(&table)).len())
  });

  c.bench_function("parse ditransitive", |b| {
    b.iter(|| grammar.parse_sentence(black_box("i gave him it")).len())
  });

  c.bench_function("parse passive", |b| {
    b.iter(|| grammar.parse_sentence(black_box("it was given by me")).len())
  });

  c.bench_function("parse ambiguous", |b| {
    b.iter(|| grammar.parse_sentence(black_box(ambiguous)).len())
  });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
