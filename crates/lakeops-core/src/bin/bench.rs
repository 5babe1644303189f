//! Pure Rust benchmarks of the daily simulation.
//!
//! Uses std::time::Instant for timing, a deterministic LCG PRNG for forcing
//! generation, and std::hint::black_box to prevent dead-code elimination.
use std::hint::black_box;
use std::time::{Duration, Instant};

use lakeops_core::config::{BackflowSource, OperatingMode};
use lakeops_core::scenario::Scenario;
use lakeops_core::SimResult;

const REPEATS: usize = 7;

/// Simple LCG PRNG for deterministic forcing.
fn lcg(seed: u64) -> impl FnMut() -> f64 {
    let mut state = seed;
    move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) as f64 / (1u64 << 31) as f64
    }
}

/// Steady scenario of `n` days with random inflow, rainfall, ET, basin
/// runoff and estuary flags.
fn forced(n: usize, seed: u64) -> Scenario {
    let mut s = Scenario::steady(10).with_days(n);
    let mut next = lcg(seed);
    let i = &mut s.inputs;
    for r in 0..i.net_inflow.len() {
        i.net_inflow[r] = -4000.0 + next() * 12000.0;
        i.rainfall[r] = next() * 3000.0;
        i.et_volume[r] = 1500.0 + next() * 2500.0;
        i.east_runoff[r] = next() * 800.0;
        i.west_runoff[r] = next() * 1500.0;
        i.losa_demand[r] = next() * 1000.0;
    }
    for d in 0..i.tributary_condition.len() {
        i.tributary_condition[d] = 1.0 + (next() * 6.0).floor();
        i.seasonal_class[d] = 1 + (next() * 6.0) as u8;
        i.multi_seasonal_class[d] = 1 + (next() * 6.0) as u8;
        i.estuary_needs_water[d] = next() > 0.5;
    }
    s.config.east.backflow = BackflowSource::Rule;
    s.config.west.backflow = BackflowSource::Rule;
    s
}

fn parametric(n: usize, seed: u64) -> Scenario {
    let mut s = forced(n, seed);
    let mut next = lcg(seed + 1);
    s.config.mode = OperatingMode::Parametric;
    s.config.parametric.west_monthly = [650.0; 12];
    s.config.parametric.east_monthly = [300.0; 12];
    s.inputs.lake_tp = Some((0..n).map(|_| 0.05 + next() * 0.1).collect());
    s
}

/// Run a closure `REPEATS` times, return the median duration.
fn median_time<F: FnMut()>(mut f: F) -> Duration {
    let mut times: Vec<Duration> = (0..REPEATS)
        .map(|_| {
            let start = Instant::now();
            f();
            start.elapsed()
        })
        .collect();
    times.sort();
    times[REPEATS / 2]
}

fn bench(
    name: &'static str,
    sizes: &[usize],
    build: fn(usize, u64) -> Scenario,
) -> SimResult<Vec<(&'static str, usize, Duration)>> {
    let mut results = Vec::new();
    for &n in sizes {
        let scenario = build(n, 42);

        // Warmup, also surfaces setup errors
        black_box(scenario.run()?);

        let dur = median_time(|| {
            let _ = black_box(scenario.run());
        });
        results.push((name, n, dur));
    }
    Ok(results)
}

fn main() -> SimResult<()> {
    println!("Daily Simulation Benchmarks");
    println!("============================================================");
    println!("{:<18} {:>6}   {:>12}", "Scenario", "Days", "Median (ms)");
    println!("--------------------------------------------");

    let mut all_results: Vec<(&str, usize, Duration)> = Vec::new();

    all_results.extend(bench("steady", &[3650, 36500], |n, _| {
        Scenario::steady(10).with_days(n)
    })?);
    all_results.extend(bench("forced", &[3650, 36500], forced)?);
    all_results.extend(bench("parametric", &[3650, 36500], parametric)?);

    for (scenario, n, dur) in &all_results {
        let ms = dur.as_secs_f64() * 1000.0;
        println!("{:<18} {:>6}      {:>8.2}", scenario, n, ms);
    }

    println!("============================================================");
    Ok(())
}
