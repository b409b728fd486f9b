//! Benchmark for the full normalize -> classify -> build -> post -> solve
//! pipeline against the large demo dataset.
//!
//! Run with: cargo run --release --bin bench

use std::time::Instant;

use salsa_engine::{config::EngineSettings, demo_data};

fn main() {
    let raw = demo_data::generate(demo_data::DemoSize::Large);
    let settings = EngineSettings::default();

    println!("Benchmark: full SALSA pipeline");
    println!("  calendario rows: {}", raw.calendario.rows.len());
    println!("  colaborador rows: {}", raw.colaborador.rows.len());
    println!("  estimativas rows: {}", raw.estimativas.rows.len());
    println!();

    let start = Instant::now();
    match salsa_engine::run(&raw, &settings) {
        Ok(output) => {
            let elapsed = start.elapsed();
            println!("Results:");
            println!("  wall time: {:?}", elapsed);
            println!("  objective: {}", output.report.objective);
            println!("  employees scheduled: {}", output.schedule.employee_counters.len());
            println!("  warnings: {}", output.warnings.len());
        }
        Err(err) => {
            println!("Pipeline failed after {:?}: {}", start.elapsed(), err);
        }
    }
}
