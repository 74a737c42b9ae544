//! Basic p-value example.
//!
//! Prints exact p-values of the weighted-runs statistic for 20 observations,
//! then approximates a long sequence from blocks of 50.
//!
//! Run: `cargo run --example basic`

use squares_core::Squares;

fn main() -> squares_core::Result<()> {
    let squares = Squares::new();

    println!("Exact p-values, N = 20:");
    for tobs in [2.0, 5.0, 10.0, 20.0, 50.0] {
        let p = squares.pvalue(tobs, 20)?;
        println!("  T = {tobs:>5.1}  p = {p:.6e}");
    }

    // 350 observations as 7 blocks of 50
    let tobs = 25.0;
    let exact_block = squares.pvalue(tobs, 50)?;
    let delta = squares.delta(tobs, 50, 50)?;
    let approx = squares.approx_pvalue(tobs, 50, 7)?;
    println!("\nT = {tobs}: p(N = 50) = {exact_block:.6e}, Delta = {delta:.6e}");
    println!("Approximate p(N = 350) = {approx:.6e}");

    // 355 observations do not split evenly; use 7.1 blocks
    let fractional = squares.approx_pvalue_continuous(tobs, 50, 7.1)?;
    println!("Approximate p(N = 355) = {fractional:.6e}");

    Ok(())
}
