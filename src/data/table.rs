//! Customer Table Module
//! Typed wrapper around the columnar customer dataset.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Column names of the customer dataset schema.
pub mod columns {
    pub const CUSTOMER_ID: &str = "customer_id";
    pub const AGE: &str = "age";
    pub const INCOME: &str = "income";
    pub const SPENDING_SCORE: &str = "spending_score";
    pub const REGION: &str = "region";
    pub const IS_PREMIUM: &str = "is_premium";

    /// Columns every input file must carry.
    pub const REQUIRED: [&str; 6] = [
        CUSTOMER_ID,
        AGE,
        INCOME,
        SPENDING_SCORE,
        REGION,
        IS_PREMIUM,
    ];

    /// Numeric columns covered by the whole-column summaries and the
    /// correlation matrix (`is_premium` participates as 0/1).
    pub const NUMERIC: [&str; 5] = [CUSTOMER_ID, AGE, INCOME, SPENDING_SCORE, IS_PREMIUM];
}

/// One customer row in its fully typed form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub customer_id: i64,
    pub age: i64,
    pub income: f64,
    pub spending_score: f64,
    pub region: String,
    pub is_premium: bool,
}

/// In-memory customer dataset, row order preserved from the source file.
///
/// The table is created once by the loader (or cleaner) and read-only
/// thereafter; every transformation returns a new table.
#[derive(Debug, Clone)]
pub struct CustomerTable {
    df: DataFrame,
}

impl CustomerTable {
    pub fn new(df: DataFrame) -> Self {
        Self { df }
    }

    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Column names present in the table.
    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Extract the fully typed rows of a cleaned table.
    ///
    /// Fails on any missing value, so it is only meaningful after cleaning.
    pub fn records(&self) -> crate::Result<Vec<CustomerRecord>> {
        let ids = self.df.column(columns::CUSTOMER_ID)?.i64()?;
        let ages = self.df.column(columns::AGE)?.i64()?;
        let incomes = self.df.column(columns::INCOME)?.f64()?;
        let spendings = self.df.column(columns::SPENDING_SCORE)?.f64()?;
        let regions = self.df.column(columns::REGION)?.str()?;
        let premiums = self.df.column(columns::IS_PREMIUM)?.i64()?;

        let mut records = Vec::with_capacity(self.df.height());
        for i in 0..self.df.height() {
            let (Some(customer_id), Some(age), Some(income), Some(spending_score)) =
                (ids.get(i), ages.get(i), incomes.get(i), spendings.get(i))
            else {
                anyhow::bail!("missing value in numeric column at row {i}");
            };
            let (Some(region), Some(is_premium)) = (regions.get(i), premiums.get(i)) else {
                anyhow::bail!("missing value in grouping column at row {i}");
            };

            records.push(CustomerRecord {
                customer_id,
                age,
                income,
                spending_score,
                region: region.to_string(),
                is_premium: is_premium != 0,
            });
        }

        Ok(records)
    }

    /// Pull one numeric column out as `f64` values, skipping nulls.
    pub fn numeric_column(&self, name: &str) -> crate::Result<Vec<f64>> {
        let column = self.df.column(name)?.cast(&DataType::Float64)?;
        let ca = column.f64()?;
        Ok(ca.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_df() -> DataFrame {
        DataFrame::new(vec![
            Column::new(columns::CUSTOMER_ID.into(), vec![1i64, 2, 3]),
            Column::new(columns::AGE.into(), vec![30i64, 41, 55]),
            Column::new(columns::INCOME.into(), vec![52_000.0, 64_000.0, 71_000.0]),
            Column::new(columns::SPENDING_SCORE.into(), vec![48.0, 63.0, 55.5]),
            Column::new(columns::REGION.into(), vec!["North", "South", "North"]),
            Column::new(columns::IS_PREMIUM.into(), vec![0i64, 1, 1]),
        ])
        .unwrap()
    }

    #[test]
    fn test_records_roundtrip() {
        let table = CustomerTable::new(sample_df());
        let records = table.records().unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].customer_id, 1);
        assert_eq!(records[1].region, "South");
        assert!(records[2].is_premium);
        assert_eq!(records[2].income, 71_000.0);
    }

    #[test]
    fn test_numeric_column_skips_nulls() {
        let df = DataFrame::new(vec![Column::new(
            columns::INCOME.into(),
            vec![Some(10.0), None, Some(30.0)],
        )])
        .unwrap();
        let table = CustomerTable::new(df);

        let values = table.numeric_column(columns::INCOME).unwrap();
        assert_eq!(values, vec![10.0, 30.0]);
    }
}
