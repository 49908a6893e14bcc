//! Benchmark for model construction and solve time.
//!
//! Run with: cargo run --release --bin bench

use shift_optimizer::demo_data::{self, DemoSize};
use shift_optimizer::{engine, filter};
use std::time::Instant;

fn main() {
    let request = demo_data::generate(DemoSize::Large);
    println!("Benchmark: model build + solve");
    println!("  Employees: {}", request.employees.len());
    println!("  Shifts:    {}", request.shifts.len());
    println!();

    let filtered: Vec<_> = filter::shifts_in_window(&request.shifts, request.start_date, request.end_date)
        .into_iter()
        .cloned()
        .collect();
    println!("  Shifts in window: {}", filtered.len());

    let start = Instant::now();
    let result = engine::solve(&request, filtered).expect("solve should not error on demo data");
    let elapsed = start.elapsed();

    println!();
    println!("Results:");
    println!("  Status:    {:?}", result.status);
    println!("  Solutions: {}", result.solutions.len());
    println!("  Time:      {:.2?}", elapsed);
    for solution in &result.solutions {
        println!(
            "    {} - {} assignments, cost={:.2}, fairness={:.3}",
            solution.id,
            solution.assignments.len(),
            solution.metrics.total_cost,
            solution.metrics.fairness_score
        );
    }
}
