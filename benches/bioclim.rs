use bioclim::{aggregate_monthly, derive_indices, normalize, TemperatureUnit};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use polars::df;
use polars::prelude::*;

fn synthetic_raw(locations: usize, years: usize) -> DataFrame {
    let rows = locations * years * 12;
    let mut ids = Vec::with_capacity(rows);
    let mut dates = Vec::with_capacity(rows);
    let mut temps = Vec::with_capacity(rows);
    let mut tmaxs = Vec::with_capacity(rows);
    let mut tmins = Vec::with_capacity(rows);
    let mut precs = Vec::with_capacity(rows);

    for loc in 0..locations {
        for year in 0..years {
            for month in 1..=12u32 {
                let seasonal = (f64::from(month) / 12.0 * std::f64::consts::TAU).sin();
                ids.push(format!("L{loc:03}"));
                dates.push(format!("{}-{month:02}-15", 1980 + year));
                temps.push(12.0 + 10.0 * seasonal);
                tmaxs.push(18.0 + 10.0 * seasonal);
                tmins.push(6.0 + 10.0 * seasonal);
                precs.push(40.0 + 25.0 * seasonal);
            }
        }
    }

    df!(
        "STATE" => ids,
        "Date" => dates,
        "temperature_2m_MEAN" => temps,
        "temperature_2m_max_MEAN" => tmaxs,
        "temperature_2m_min_MEAN" => tmins,
        "total_precipitation_sum_MEAN" => precs,
    )
    .unwrap()
}

fn bench_derive(c: &mut Criterion) {
    let raw = synthetic_raw(10, 40);
    c.bench_function("derive_indices_10_locations_40_years", |b| {
        b.iter(|| {
            let normalized =
                normalize(black_box(raw.clone().lazy()), TemperatureUnit::Celsius).unwrap();
            let monthly = aggregate_monthly(&normalized);
            derive_indices(&normalized, &monthly)
                .unwrap()
                .frame
                .collect()
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_derive);
criterion_main!(benches);
