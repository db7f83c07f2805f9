use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sharelite::Shared;
use std::rc::Rc as StdRc;

// A simple struct to test reference counting
#[derive(Debug)]
struct TestStruct {
    x: u8,
    y: u8,
}

// Benchmark the creation of a new reference-counted object
fn new_shared_benchmark(c: &mut Criterion) {
    c.bench_function("sharelite::Shared::new", |b| {
        b.iter(|| {
            let obj = Shared::new(black_box(TestStruct { x: 0, y: 0 }));
            black_box(obj)
        })
    });
    c.bench_function("std::rc::Rc::new", |b| {
        b.iter(|| {
            let obj = StdRc::new(black_box(TestStruct { x: 0, y: 0 }));
            black_box(obj)
        })
    });
}

// Benchmark cloning a reference-counted object
fn clone_shared_benchmark(c: &mut Criterion) {
    let shared_obj = Shared::new(black_box(TestStruct { x: 0, y: 0 }));
    c.bench_function("sharelite::Shared::clone", |b| {
        b.iter(|| {
            let obj_clone = black_box(shared_obj.clone());
            black_box(obj_clone)
        })
    });
    let obj = StdRc::new(black_box(TestStruct { x: 0, y: 0 }));
    c.bench_function("std::rc::Rc::clone", |b| {
        b.iter(|| {
            let obj_clone = black_box(obj.clone());
            black_box(obj_clone)
        })
    });
}

// Benchmark dropping a reference-counted object
fn drop_shared_benchmark(c: &mut Criterion) {
    let shared_obj = Shared::new(black_box(TestStruct { x: 0, y: 0 }));
    c.bench_function("sharelite::Shared::drop", |b| {
        b.iter(|| {
            let obj_clone = black_box(shared_obj.clone());
            drop(obj_clone);
        })
    });
    let obj = StdRc::new(black_box(TestStruct { x: 0, y: 0 }));
    c.bench_function("std::rc::Rc::drop", |b| {
        b.iter(|| {
            let obj_clone = black_box(obj.clone());
            drop(obj_clone);
        })
    });
}

// Benchmark accessing fields of a reference-counted object
fn access_shared_benchmark(c: &mut Criterion) {
    println!();

    let shared_obj = Shared::new(black_box(TestStruct { x: 0, y: 0 }));
    c.bench_function("sharelite::Shared::get", |b| {
        b.iter(|| {
            let view = shared_obj.get().unwrap();
            let x = black_box(view.x);
            let y = black_box(view.y);
            assert_eq!(x, 0);
            assert_eq!(y, 0);
            (x, y)
        })
    });
    let obj = StdRc::new(black_box(TestStruct { x: 0, y: 0 }));
    c.bench_function("std::rc::Rc::access", |b| {
        b.iter(|| {
            let x = black_box(obj.x);
            let y = black_box(obj.y);
            assert_eq!(x, 0);
            assert_eq!(y, 0);
            (x, y)
        })
    });
}

criterion_group!(
    shared_benches,
    access_shared_benchmark,
    new_shared_benchmark,
    clone_shared_benchmark,
    drop_shared_benchmark,
);

criterion_main!(shared_benches);
