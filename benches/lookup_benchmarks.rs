use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use geo::LineString;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use speedregions::{CompilerConfig, QueryGeometry, SpeedRegionLookup, SpeedRule, UncompiledSpeedRulesFile};

const MALTA: &str = include_str!("../tests/fixtures/malta.geojson");

fn malta_file() -> UncompiledSpeedRulesFile {
    UncompiledSpeedRulesFile::new(
        vec![SpeedRule::new().with_multiplier(0.8).matching(["car"], ["valletta"])],
        serde_json::from_str(MALTA).unwrap(),
    )
}

fn benchmark_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    group.sample_size(10);
    let file = malta_file();

    for metres in [1000.0, 100.0, 10.0] {
        let config = CompilerConfig::default().with_min_cell_length_metres(metres);
        group.bench_with_input(BenchmarkId::new("malta", metres), &config, |b, config| {
            b.iter(|| SpeedRegionLookup::compile(black_box(std::slice::from_ref(&file)), config).unwrap())
        });
    }

    group.finish();
}

fn benchmark_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");
    let config = CompilerConfig::default().with_min_cell_length_metres(10.0);
    let lookup = SpeedRegionLookup::compile(&[malta_file()], &config).unwrap();

    let mut rng = StdRng::seed_from_u64(42);
    let points: Vec<(f64, f64)> = (0..1000)
        .map(|_| (rng.gen_range(14.45..14.53), rng.gen_range(35.87..35.92)))
        .collect();

    group.throughput(Throughput::Elements(points.len() as u64));
    group.bench_function("point", |b| {
        b.iter(|| {
            points
                .iter()
                .filter(|(lng, lat)| lookup.region_for_point(black_box(*lng), black_box(*lat)).is_some())
                .count()
        })
    });

    let roads: Vec<QueryGeometry> = points
        .chunks(2)
        .map(|pair| LineString::from(pair.to_vec()).into())
        .collect();

    group.throughput(Throughput::Elements(roads.len() as u64));
    group.bench_function("line", |b| {
        b.iter(|| {
            roads
                .iter()
                .filter_map(|road| lookup.rule_at("car", black_box(road)))
                .count()
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_compile, benchmark_queries);
criterion_main!(benches);
