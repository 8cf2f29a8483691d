use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dotlottie_bundle_core::{parse, resolve_marker};
use dotlottie_test_fixtures::{bundles, ArchiveBuilder};
use serde_json::json;

fn wide_bundle(animations: usize) -> Vec<u8> {
    let layers: Vec<_> = (0..64)
        .map(|i| json!({ "ind": i, "ty": 4, "nm": format!("shape {i}"), "ks": {} }))
        .collect();
    let mut builder = ArchiveBuilder::new();
    for i in (0..animations).rev() {
        builder = builder.json(
            &format!("animations/anim_{i:03}.json"),
            &json!({ "v": "5.7.0", "ip": 0, "op": 120, "layers": layers }),
        );
    }
    for i in 0..8 {
        builder = builder
            .json(&format!("themes/theme_{i}.json"), &json!({ "rules": [] }))
            .json(&format!("markers/marker_{i}.json"), &json!({ "frame": i * 10 }));
    }
    builder.build().expect("assemble bench bundle")
}

fn bench_parse_fixture(c: &mut Criterion) {
    let bytes = bundles::bytes("full").expect("full fixture");
    c.bench_function("parse full fixture", |b| {
        b.iter(|| parse(black_box(&bytes)).expect("parse"))
    });
}

fn bench_parse_wide(c: &mut Criterion) {
    let bytes = wide_bundle(32);
    c.bench_function("parse 32 animations", |b| {
        b.iter(|| parse(black_box(&bytes)).expect("parse"))
    });
}

fn bench_resolve_marker(c: &mut Criterion) {
    let bundle = parse(&wide_bundle(4)).expect("parse");
    c.bench_function("resolve marker", |b| {
        b.iter(|| resolve_marker(black_box(&bundle), 2, black_box("marker_7")))
    });
}

criterion_group!(
    benches,
    bench_parse_fixture,
    bench_parse_wide,
    bench_resolve_marker
);
criterion_main!(benches);
