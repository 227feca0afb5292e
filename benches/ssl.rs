//! Benchmarks for the SSL grammar
//!
//! Measures a plain parse against the observer-based modes, and the direct
//! strategy against the two-phase one, on a generated program.
//!
//! Run with: cargo bench --bench ssl

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use parr::driver::{Driver, ParserConfig, RunMode};
use parr::engine::StrategyConfig;
use parr::ssl::Ssl;
use std::io;

fn program(procedures: usize) -> String {
    let mut out = String::from("// generated\nimport variable total;\n");
    for i in 0..procedures {
        out.push_str(&format!(
            "variable v{i} = {d};\nprocedure p{i}();\nprocedure p{i}()\nbegin\n  variable x;\n  x++;\n  if x > {d} then begin end\n  /* block\n     comment */\nend\n",
            i = i,
            d = i % 10
        ));
    }
    out
}

fn bench_modes(c: &mut Criterion) {
    let ssl = Ssl::new().unwrap();
    let input = program(50);
    let mut group = c.benchmark_group("modes");
    for mode in [RunMode::Parse, RunMode::Coverage, RunMode::ParseTree] {
        group.bench_with_input(BenchmarkId::from_parameter(mode), &input, |b, input| {
            let mut driver = Driver::new(&ssl)
                .with_output(io::sink())
                .with_diagnostics(io::sink());
            b.iter(|| {
                let report = driver.run(mode, "bench.ssl", black_box(input.as_bytes()));
                black_box(report.map(|r| r.success()).unwrap_or(false))
            })
        });
    }
    group.finish();
}

fn bench_strategies(c: &mut Criterion) {
    let ssl = Ssl::new().unwrap();
    let input = program(50);
    let strategies = [
        ("direct", StrategyConfig::Direct),
        (
            "two-phase",
            StrategyConfig::TwoPhase {
                optimistic_steps: 1_000,
            },
        ),
    ];
    let mut group = c.benchmark_group("strategies");
    for (name, strategy) in strategies {
        group.bench_function(name, |b| {
            let mut driver = Driver::new(&ssl)
                .with_config(ParserConfig::new().with_strategy(strategy))
                .with_diagnostics(io::sink());
            b.iter(|| {
                let report = driver.parse("bench.ssl", black_box(input.as_bytes()));
                black_box(report.map(|r| r.success()).unwrap_or(false))
            })
        });
    }
    group.finish();
}

fn bench_sizes(c: &mut Criterion) {
    let ssl = Ssl::new().unwrap();
    let mut group = c.benchmark_group("program_size");
    for procedures in [1, 10, 100] {
        let input = program(procedures);
        group.bench_with_input(
            BenchmarkId::from_parameter(procedures),
            &input,
            |b, input| {
                let mut driver = Driver::new(&ssl).with_diagnostics(io::sink());
                b.iter(|| driver.parse("bench.ssl", black_box(input.as_bytes())).is_ok())
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_modes, bench_strategies, bench_sizes);
criterion_main!(benches);
