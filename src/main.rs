//! CustLens - Customer Dataset Analysis & Chart Generation
//!
//! This is the main entrypoint that orchestrates dataset generation
//! (optional), loading, cleaning, aggregation, and reporting.

use anyhow::Result;
use clap::Parser;
use custlens::data::{DataCleaner, DataLoader};
use custlens::report::Reporter;
use custlens::stats::Aggregator;
use custlens::{synth, Args};
use std::time::Instant;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    if args.verbose {
        println!("CustLens - Customer Dataset Analysis");
        println!("====================================\n");
    }

    let start_time = Instant::now();

    // Step 0: Optionally fabricate the dataset first
    if let Some(n) = args.generate {
        let gen_start = Instant::now();
        let records = synth::generate(n, args.seed)?;
        synth::write_csv(&records, &args.input)?;
        println!(
            "✓ Generated {} customers at {}",
            records.len(),
            args.input.display()
        );
        if args.verbose {
            println!(
                "  Generation time: {:.2}s (seed {})",
                gen_start.elapsed().as_secs_f64(),
                args.seed
            );
        }
    }

    // Step 1: Load the dataset
    if args.verbose {
        println!("\nStep 1: Loading data");
        println!("  Input file: {}", args.input.display());
    }

    let load_start = Instant::now();
    let raw = DataLoader::load_csv(&args.input)?;
    println!("✓ Data loaded: {} rows", raw.height());
    if args.verbose {
        println!("  Columns: {}", raw.column_names().join(", "));
        println!("  Loading time: {:.2}s", load_start.elapsed().as_secs_f64());
    }

    // Step 2: Clean against the fixed policy
    if args.verbose {
        println!("\nStep 2: Cleaning data");
    }

    let clean_start = Instant::now();
    let cleaned = DataCleaner::clean(&raw)?;
    println!(
        "✓ Data cleaned: {} rows kept, {} dropped",
        cleaned.height(),
        raw.height() - cleaned.height()
    );
    if args.verbose {
        println!(
            "  Cleaning time: {:.2}s",
            clean_start.elapsed().as_secs_f64()
        );
    }

    // Step 3: Aggregate per-group statistics
    if args.verbose {
        println!("\nStep 3: Aggregating statistics");
    }

    let agg_start = Instant::now();
    let analysis = Aggregator::analyze(&cleaned)?;
    println!(
        "✓ Statistics computed: {} group summaries",
        analysis.groups.len()
    );
    if args.verbose {
        println!(
            "  Aggregation time: {:.2}s",
            agg_start.elapsed().as_secs_f64()
        );
    }

    // Step 4: Report and render charts
    if args.verbose {
        println!("\nStep 4: Writing reports");
        println!("  Output directory: {}", args.output.display());
    }

    let report_start = Instant::now();
    let written = Reporter::run(&cleaned, &analysis, &args.output)?;
    println!("✓ Reports written");
    if args.verbose {
        println!(
            "  Reporting time: {:.2}s",
            report_start.elapsed().as_secs_f64()
        );
    }

    println!("\n=== Pipeline Complete ===");
    println!(
        "Total processing time: {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    println!("\nOutput files created:");
    for path in &written {
        println!("  {}", path.display());
    }

    Ok(())
}
