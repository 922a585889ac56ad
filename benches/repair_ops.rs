//! Benchmarks for hole repair and export.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use caulk::prelude::*;
use nalgebra::Point3;

fn create_grid_mesh(n: usize) -> HalfEdgeMesh {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n * 2);

    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    build_from_triangles(&vertices, &faces).unwrap()
}

/// A cylinder wall of `n` segments; both rims are holes.
fn create_open_tube(n: usize) -> HalfEdgeMesh {
    let mut vertices = Vec::with_capacity(2 * n);
    for z in [0.0, 1.0] {
        for k in 0..n {
            let a = k as f64 * std::f64::consts::TAU / n as f64;
            vertices.push(Point3::new(a.cos(), a.sin(), z));
        }
    }

    let mut faces = Vec::with_capacity(2 * n);
    for k in 0..n {
        let k1 = (k + 1) % n;
        faces.push([k, k1, n + k1]);
        faces.push([k, n + k1, n + k]);
    }

    build_from_triangles(&vertices, &faces).unwrap()
}

fn bench_boundary_loops(c: &mut Criterion) {
    let mesh = create_grid_mesh(100);

    c.bench_function("boundary_loops_grid_100", |b| {
        b.iter(|| find_boundary_loops(&mesh).len());
    });
}

fn bench_fill_holes(c: &mut Criterion) {
    let tube = create_open_tube(256);
    let options = FillOptions::default();

    c.bench_function("fill_tube_256", |b| {
        b.iter_batched(
            || tube.clone(),
            |mut mesh| {
                fill_holes(&mut mesh, &options).unwrap();
                mesh
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_export(c: &mut Criterion) {
    let mesh = create_grid_mesh(20);

    c.bench_function("export_data_grid_20", |b| {
        b.iter(|| export_data(&mesh));
    });

    c.bench_function("export_data_vi_grid_20", |b| {
        b.iter(|| export_data_vi(&mesh));
    });
}

criterion_group!(benches, bench_boundary_loops, bench_fill_holes, bench_export);
criterion_main!(benches);
