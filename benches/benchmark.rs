// Scan throughput benchmarks
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use rand::rngs::StdRng;
use sheetscan::{
    digits_only, normalize, scan, text_row, CellValue, MatchPolicy, Row, ScanConfig, SearchOptions,
    SearchQuery, Sheet,
};

const FIRST_NAMES: &[&str] = &["Maria", "João", "Ana", "José", "Francisca", "Antônio", "Luíza", "Paulo"];
const LAST_NAMES: &[&str] = &["Silva", "Souza", "Oliveira", "Conceição", "Pereira", "Araújo", "Gonçalves"];

fn generate_sheet(rng: &mut StdRng, rows: usize) -> Vec<Row> {
    let mut values = vec![text_row(&["Nome", "CPF", "Idade", "Gestante", "Endereço"])];
    for _ in 0..rows {
        let name = format!(
            "{} {}",
            FIRST_NAMES.choose(rng).copied().unwrap_or("Maria"),
            LAST_NAMES.choose(rng).copied().unwrap_or("Silva")
        );
        let cpf: u64 = rng.random_range(10_000_000_000..99_999_999_999);
        let formatted = format!(
            "{}.{}.{}-{}",
            &cpf.to_string()[0..3],
            &cpf.to_string()[3..6],
            &cpf.to_string()[6..9],
            &cpf.to_string()[9..11]
        );
        values.push(vec![
            CellValue::from(name),
            CellValue::from(formatted),
            CellValue::from(rng.random_range(14..50) as f64),
            CellValue::from(if rng.random_bool(0.3) { "sim" } else { "não" }),
            CellValue::from(format!("Rua {}, {}", LAST_NAMES.choose(rng).copied().unwrap_or("A"), rng.random_range(1..999))),
        ]);
    }
    values
}

fn benchmark_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    group.bench_function("text", |b| {
        b.iter(|| normalize(black_box("  Maria da CONCEIÇÃO Araújo  Gonçalves ")))
    });
    group.bench_function("digits", |b| b.iter(|| digits_only(black_box("123.456.789-09"))));
    group.bench_function("digits_scientific", |b| {
        b.iter(|| digits_only(black_box("7.09809060029098e+14")))
    });
    group.finish();
}

fn benchmark_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");
    let mut rng = StdRng::seed_from_u64(42);

    for size in [100, 1000, 10000].iter() {
        let sheets = vec![Sheet::new("Cadastro", generate_sheet(&mut rng, *size))];
        let options = SearchOptions::default();

        let name_query = SearchQuery::single("jose pereira").unwrap();
        let suffix = ScanConfig::default();
        group.bench_with_input(BenchmarkId::new("name", size), size, |b, _| {
            b.iter(|| scan("bench", black_box(&sheets), &name_query, &suffix, &options))
        });

        // A miss forces the whole sheet to be read
        let cpf_query = SearchQuery::single("000.000.000-01").unwrap();
        group.bench_with_input(BenchmarkId::new("identifier_suffix", size), size, |b, _| {
            b.iter(|| scan("bench", black_box(&sheets), &cpf_query, &suffix, &options))
        });

        let exact = ScanConfig::default().with_policy(MatchPolicy::Exact);
        group.bench_with_input(BenchmarkId::new("identifier_exact", size), size, |b, _| {
            b.iter(|| scan("bench", black_box(&sheets), &cpf_query, &exact, &options))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_normalize, benchmark_scan);
criterion_main!(benches);
