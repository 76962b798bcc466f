//! Command-line interface definitions and argument parsing

use clap::Parser;
use std::path::PathBuf;

/// Descriptive analysis of a customer dataset: distributions, group
/// comparisons, and chart images
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file
    #[arg(short, long, default_value = "data/raw_customer_data.csv")]
    pub input: PathBuf,

    /// Directory where reports and chart images are written
    #[arg(short, long, default_value = "results")]
    pub output: PathBuf,

    /// Generate a synthetic dataset of N customers at the input path before
    /// running the analysis
    #[arg(short, long, value_name = "N")]
    pub generate: Option<usize>,

    /// Seed for the synthetic dataset generator
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["custlens"]);
        assert_eq!(args.input, PathBuf::from("data/raw_customer_data.csv"));
        assert_eq!(args.output, PathBuf::from("results"));
        assert_eq!(args.generate, None);
        assert_eq!(args.seed, 42);
        assert!(!args.verbose);
    }

    #[test]
    fn test_generate_flag() {
        let args = Args::parse_from(["custlens", "--generate", "250", "--seed", "7"]);
        assert_eq!(args.generate, Some(250));
        assert_eq!(args.seed, 7);
    }
}
