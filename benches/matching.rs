use criterion::{black_box, criterion_group, criterion_main, Criterion};
use http::Method;
use wayfinder::{ConstraintRegistry, Matcher, RouteDef, RouteTable};

fn build_matcher(defs: &[(&str, &str, &str)]) -> Matcher {
    let registry = ConstraintRegistry::default();
    let mut table = RouteTable::new();
    for (pattern, method, handler) in defs {
        table
            .add(&registry, RouteDef::new(*pattern, *method, *handler))
            .expect("route should register");
    }
    Matcher::new(table)
}

fn zoo_matcher() -> Matcher {
    build_matcher(&[
        ("/", "GET", "root_handler"),
        ("/zoo/animals", "GET", "get_animals"),
        ("/zoo/animals", "POST", "create_animal"),
        ("/zoo/animals/{id:int}", "GET", "get_animal"),
        ("/zoo/animals/{id:int}", "DELETE", "delete_animal"),
        ("/zoo/animals/{id:int}/toys/{toy_id:int}", "GET", "animal_toy"),
        (
            "/zoo/{category}/animals/{id}/habitats/{habitat_id}/sections/{section_id}",
            "GET",
            "habitat_section",
        ),
        ("/zoo/health", "GET", "health_check"),
        ("/docs/{**path}", "GET", "docs_fallback"),
        ("/complex/{a}/{b}/{c}/{d}/{e}/{f}/{g}/{h}/{i}", "GET", "complex_many_params"),
    ])
}

fn bench_match_throughput(c: &mut Criterion) {
    let matcher = zoo_matcher();
    c.bench_function("match_route", |b| {
        let test_paths = [
            (Method::GET, "/zoo/animals/123"),
            (Method::GET, "/zoo/animals/123/toys/456"),
            (Method::GET, "/zoo/cats/animals/123/habitats/88/sections/5"),
            (Method::GET, "/docs/guide/part/2"),
            (Method::GET, "/complex/1/2/3/4/5/6/7/8/9"),
        ];
        b.iter(|| {
            for (method, path) in test_paths.iter() {
                let res = matcher.match_route(method, path, &[]);
                black_box(&res);
            }
        })
    });
}

fn bench_match_miss(c: &mut Criterion) {
    let matcher = zoo_matcher();
    c.bench_function("match_route_miss", |b| {
        b.iter(|| {
            let res = matcher.match_route(&Method::GET, "/nowhere/at/all", &[]);
            black_box(&res);
        })
    });
}

fn bench_wide_table(c: &mut Criterion) {
    let registry = ConstraintRegistry::default();
    let mut table = RouteTable::new();
    for i in 0..500 {
        table
            .add(
                &registry,
                RouteDef::new(format!("/svc{i}/items/{{id:int}}"), "GET", format!("h{i}")),
            )
            .expect("route should register");
    }
    let matcher = Matcher::new(table);
    c.bench_function("match_route_500_routes", |b| {
        b.iter(|| {
            let res = matcher.match_route(&Method::GET, "/svc250/items/42", &[]);
            black_box(&res);
        })
    });
}

criterion_group!(
    benches,
    bench_match_throughput,
    bench_match_miss,
    bench_wide_table
);
criterion_main!(benches);
