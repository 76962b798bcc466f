//! CSV Data Loader Module
//! Reads the customer dataset from disk using Polars.

use polars::prelude::*;
use std::path::Path;
use thiserror::Error;

use crate::data::table::{columns, CustomerTable};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("Missing required columns: {0}")]
    MissingColumns(String),
}

/// Handles CSV file loading with Polars.
///
/// The loader only checks that the schema carries the required columns;
/// malformed cells are read as nulls and left for the cleaner.
pub struct DataLoader;

impl DataLoader {
    /// Load a customer CSV file into a [`CustomerTable`].
    pub fn load_csv(file_path: &Path) -> Result<CustomerTable, LoaderError> {
        // Use lazy evaluation for memory efficiency, then collect
        let df = LazyCsvReader::new(file_path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        Self::check_required_columns(&df)?;
        Ok(CustomerTable::new(df))
    }

    fn check_required_columns(df: &DataFrame) -> Result<(), LoaderError> {
        let present: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let missing: Vec<&str> = columns::REQUIRED
            .iter()
            .copied()
            .filter(|required| !present.iter().any(|name| name == required))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(LoaderError::MissingColumns(missing.join(", ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    #[test]
    fn test_load_valid_csv() {
        let file = write_csv(
            "customer_id,age,income,spending_score,region,is_premium\n\
             1,34,52000.0,48.2,North,0\n\
             2,41,64000.0,63.0,South,1\n",
        );

        let table = DataLoader::load_csv(file.path()).unwrap();
        assert_eq!(table.height(), 2);
        for required in columns::REQUIRED {
            assert!(table.column_names().iter().any(|c| c == required));
        }
    }

    #[test]
    fn test_missing_columns_reported() {
        let file = write_csv("customer_id,age,region\n1,34,North\n");

        let err = DataLoader::load_csv(file.path()).unwrap_err();
        match err {
            LoaderError::MissingColumns(missing) => {
                assert!(missing.contains("income"));
                assert!(missing.contains("spending_score"));
                assert!(missing.contains("is_premium"));
                assert!(!missing.contains("customer_id"));
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_cells_become_nulls() {
        let file = write_csv(
            "customer_id,age,income,spending_score,region,is_premium\n\
             1,34,52000.0,48.2,North,0\n\
             2,oops,64000.0,63.0,South,1\n",
        );

        // Row order is preserved and the bad cell does not abort the load.
        let table = DataLoader::load_csv(file.path()).unwrap();
        assert_eq!(table.height(), 2);
    }
}
