//! Integration tests for CustLens

use custlens::data::{DataCleaner, DataLoader, LoaderError};
use custlens::report::Reporter;
use custlens::stats::Aggregator;
use custlens::synth;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

/// Create a test CSV file with sample data, including gaps the cleaner
/// has to resolve.
fn create_test_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "customer_id,age,income,spending_score,region,is_premium").unwrap();

    // North / standard
    writeln!(file, "1,29,42000.0,38.5,North,0").unwrap();
    writeln!(file, "2,35,51000.0,47.0,North,0").unwrap();
    writeln!(file, "3,41,58000.0,52.5,North,0").unwrap();
    // North / premium, one income gap to impute
    writeln!(file, "4,38,61000.0,66.0,North,1").unwrap();
    writeln!(file, "5,44,,71.0,North,1").unwrap();
    writeln!(file, "6,52,83000.0,78.5,North,1").unwrap();
    // South / standard, one age gap to impute
    writeln!(file, "7,33,47000.0,44.0,South,0").unwrap();
    writeln!(file, "8,,49500.0,46.5,South,0").unwrap();
    // Row without a region is dropped
    writeln!(file, "9,47,66000.0,58.0,,1").unwrap();

    file
}

#[test]
fn test_end_to_end_pipeline() {
    let test_file = create_test_csv();

    let raw = DataLoader::load_csv(test_file.path()).unwrap();
    assert_eq!(raw.height(), 9);

    let cleaned = DataCleaner::clean(&raw).unwrap();
    // The region-less row is dropped, the two gaps are imputed.
    assert_eq!(cleaned.height(), 8);
    let records = cleaned.records().unwrap();

    // Income gap filled with the North/premium median of 61k and 83k.
    assert_eq!(records[4].income, 72_000.0);
    // Age gap filled with the South/standard median (only 33 present).
    assert_eq!(records[7].age, 33);

    let analysis = Aggregator::analyze(&cleaned).unwrap();

    // Three observed partitions, in sorted key order.
    let keys: Vec<String> = analysis.groups.iter().map(|g| g.key.to_string()).collect();
    assert_eq!(
        keys,
        vec!["North / standard", "North / premium", "South / standard"]
    );
    assert_eq!(
        analysis.groups.iter().map(|g| g.count).sum::<usize>(),
        cleaned.height()
    );

    let north_premium = &analysis.groups[1];
    assert_eq!(north_premium.count, 3);
    assert_eq!(north_premium.income.median, 72_000.0);

    // Premium customers in this fixture spend more on average.
    assert!(analysis.premium.premium.mean > analysis.premium.standard.mean);

    // Reports land in the output directory.
    let out_dir = tempdir().unwrap();
    let written = Reporter::run(&cleaned, &analysis, out_dir.path()).unwrap();
    assert_eq!(written.len(), 4);
    for path in &written {
        assert!(path.exists(), "missing output file {}", path.display());
    }
}

#[test]
fn test_missing_columns_fail_the_load() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "customer_id,age,region").unwrap();
    writeln!(file, "1,29,North").unwrap();

    let err = DataLoader::load_csv(file.path()).unwrap_err();
    assert!(matches!(err, LoaderError::MissingColumns(_)));
}

#[test]
fn test_cleaned_table_has_no_gaps() {
    let test_file = create_test_csv();
    let raw = DataLoader::load_csv(test_file.path()).unwrap();
    let cleaned = DataCleaner::clean(&raw).unwrap();

    // records() errors on any remaining null in the required columns.
    assert!(cleaned.records().is_ok());

    // Cleaning the cleaned table changes nothing.
    let again = DataCleaner::clean(&cleaned).unwrap();
    assert!(cleaned.df().equals(again.df()));
}

#[test]
fn test_summaries_invariant_under_row_order() {
    let mut forward = NamedTempFile::new().unwrap();
    let mut backward = NamedTempFile::new().unwrap();

    let header = "customer_id,age,income,spending_score,region,is_premium";
    let rows = [
        "1,29,42000.0,38.5,North,0",
        "2,35,51000.0,47.0,South,1",
        "3,41,58000.0,52.5,North,0",
        "4,38,61000.0,66.0,East,1",
        "5,52,83000.0,78.5,South,1",
    ];

    writeln!(forward, "{header}").unwrap();
    for row in rows.iter() {
        writeln!(forward, "{row}").unwrap();
    }
    writeln!(backward, "{header}").unwrap();
    for row in rows.iter().rev() {
        writeln!(backward, "{row}").unwrap();
    }

    let summarize = |path: &std::path::Path| {
        let raw = DataLoader::load_csv(path).unwrap();
        let cleaned = DataCleaner::clean(&raw).unwrap();
        Aggregator::summarize_groups(&cleaned).unwrap()
    };

    assert_eq!(summarize(forward.path()), summarize(backward.path()));
}

#[test]
fn test_generated_dataset_round_trip() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("raw_customer_data.csv");

    let records = synth::generate(120, 9).unwrap();
    synth::write_csv(&records, &csv_path).unwrap();

    let raw = DataLoader::load_csv(&csv_path).unwrap();
    assert_eq!(raw.height(), 120);

    // A generated dataset is already complete, so nothing is dropped.
    let cleaned = DataCleaner::clean(&raw).unwrap();
    assert_eq!(cleaned.height(), 120);

    let analysis = Aggregator::analyze(&cleaned).unwrap();
    assert!(!analysis.groups.is_empty());
    assert_eq!(
        analysis.groups.iter().map(|g| g.count).sum::<usize>(),
        cleaned.height()
    );

    // Correlations reflect the built-in age-income relationship.
    let corr = &analysis.correlations;
    let age_idx = corr.columns.iter().position(|c| c == "age").unwrap();
    let income_idx = corr.columns.iter().position(|c| c == "income").unwrap();
    assert!(corr.get(age_idx, income_idx) > 0.0);
}
