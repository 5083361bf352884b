use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use http::Request;
use ratelimiter::config::AppConfig;
use ratelimiter::rate_limit::{identify, CounterBackend, LocalBackend};

fn benchmark_local_check_single_key(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("Failed to create runtime");
    let backend = LocalBackend::new();

    c.bench_function("local_check_single_key", |b| {
        b.to_async(&runtime).iter(|| async {
            black_box(backend.check("bench:client", u64::MAX, 60).await)
        })
    });
}

fn benchmark_local_check_scale(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("Failed to create runtime");
    let mut group = c.benchmark_group("local_check_scale");

    for num_keys in [10, 1_000, 100_000].iter() {
        let backend = LocalBackend::new();
        let keys: Vec<String> = (0..*num_keys).map(|i| format!("bench:10.0.{}", i)).collect();

        group.bench_with_input(BenchmarkId::from_parameter(num_keys), num_keys, |b, &_num| {
            let mut i = 0;
            b.to_async(&runtime).iter(|| {
                i = (i + 1) % keys.len();
                let key = &keys[i];
                let backend = &backend;
                async move { black_box(backend.check(key, u64::MAX, 60).await) }
            })
        });
    }
    group.finish();
}

fn benchmark_identify(c: &mut Criterion) {
    let request = Request::builder()
        .header("X-Forwarded-For", "203.0.113.50, 70.41.3.18, 150.172.238.178")
        .body(())
        .expect("Failed to build request");

    c.bench_function("identify_forwarded_for", |b| {
        b.iter(|| black_box(identify(request.headers(), None)))
    });
}

fn benchmark_config_parsing(c: &mut Criterion) {
    let yaml = r#"
server:
  host: "0.0.0.0"
  port: 8000

redis:
  url: "redis://localhost:6379/0"

limits:
  data:
    limit: 10
    window_secs: 60
"#;

    c.bench_function("config_parsing", |b| {
        b.iter(|| black_box(AppConfig::from_yaml(yaml)))
    });
}

criterion_group!(
    benches,
    benchmark_local_check_single_key,
    benchmark_local_check_scale,
    benchmark_identify,
    benchmark_config_parsing
);
criterion_main!(benches);
