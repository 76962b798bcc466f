//! Data Cleaner Module
//! Applies the fixed missing-value policy to a loaded table.

use polars::prelude::*;
use std::collections::HashMap;
use thiserror::Error;

use crate::data::table::{columns, CustomerTable};

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("No rows survived cleaning")]
    EmptyDataset,
}

/// Per-group medians used for imputation.
struct GroupMedians {
    age: Option<f64>,
    income: Option<f64>,
    spending: Option<f64>,
}

/// Handles missing values, type coercion, and filtering of invalid rows.
///
/// Policy: rows missing the customer id or a grouping key (region, premium
/// flag) are dropped; missing or non-finite numeric fields are imputed with
/// the median of the row's (region, premium) group; rows whose group holds
/// no usable value for a needed field are dropped. The output carries no
/// missing values in the grouping or numeric columns.
pub struct DataCleaner;

impl DataCleaner {
    /// Clean a table according to the fixed policy. Returns a new table;
    /// the input is never mutated.
    pub fn clean(table: &CustomerTable) -> Result<CustomerTable, CleanerError> {
        // Coerce to the expected dtypes first; cells that cannot be
        // converted become nulls and fall under the imputation policy.
        let df = table
            .df()
            .clone()
            .lazy()
            .select([
                col(columns::CUSTOMER_ID).cast(DataType::Int64),
                col(columns::AGE).cast(DataType::Float64),
                col(columns::INCOME).cast(DataType::Float64),
                col(columns::SPENDING_SCORE).cast(DataType::Float64),
                col(columns::REGION).cast(DataType::String),
                col(columns::IS_PREMIUM).cast(DataType::Int64),
            ])
            .filter(
                col(columns::CUSTOMER_ID)
                    .is_not_null()
                    .and(col(columns::REGION).is_not_null())
                    .and(col(columns::IS_PREMIUM).is_not_null()),
            )
            .collect()?;

        let medians = Self::group_medians(&df)?;

        let ids = df.column(columns::CUSTOMER_ID)?.i64()?;
        let ages = df.column(columns::AGE)?.f64()?;
        let incomes = df.column(columns::INCOME)?.f64()?;
        let spendings = df.column(columns::SPENDING_SCORE)?.f64()?;
        let regions = df.column(columns::REGION)?.str()?;
        let premiums = df.column(columns::IS_PREMIUM)?.i64()?;

        let mut out_ids: Vec<i64> = Vec::with_capacity(df.height());
        let mut out_ages: Vec<i64> = Vec::with_capacity(df.height());
        let mut out_incomes: Vec<f64> = Vec::with_capacity(df.height());
        let mut out_spendings: Vec<f64> = Vec::with_capacity(df.height());
        let mut out_regions: Vec<String> = Vec::with_capacity(df.height());
        let mut out_premiums: Vec<i64> = Vec::with_capacity(df.height());

        for i in 0..df.height() {
            let (Some(id), Some(region), Some(premium)) =
                (ids.get(i), regions.get(i), premiums.get(i))
            else {
                continue;
            };
            let is_premium = premium != 0;

            let Some(group) = medians.get(&(region.to_string(), is_premium)) else {
                continue;
            };

            let Some(age) = ages.get(i).filter(|v| v.is_finite()).or(group.age) else {
                continue;
            };
            let Some(income) = incomes.get(i).filter(|v| v.is_finite()).or(group.income) else {
                continue;
            };
            let Some(spending) = spendings.get(i).filter(|v| v.is_finite()).or(group.spending)
            else {
                continue;
            };

            out_ids.push(id);
            out_ages.push(age.round() as i64);
            out_incomes.push(income);
            out_spendings.push(spending);
            out_regions.push(region.to_string());
            out_premiums.push(is_premium as i64);
        }

        if out_ids.is_empty() {
            return Err(CleanerError::EmptyDataset);
        }

        let cleaned = DataFrame::new(vec![
            Column::new(columns::CUSTOMER_ID.into(), out_ids),
            Column::new(columns::AGE.into(), out_ages),
            Column::new(columns::INCOME.into(), out_incomes),
            Column::new(columns::SPENDING_SCORE.into(), out_spendings),
            Column::new(columns::REGION.into(), out_regions),
            Column::new(columns::IS_PREMIUM.into(), out_premiums),
        ])?;

        Ok(CustomerTable::new(cleaned))
    }

    /// Collect the median of every numeric field per (region, premium) group.
    fn group_medians(
        df: &DataFrame,
    ) -> Result<HashMap<(String, bool), GroupMedians>, CleanerError> {
        let ages = df.column(columns::AGE)?.f64()?;
        let incomes = df.column(columns::INCOME)?.f64()?;
        let spendings = df.column(columns::SPENDING_SCORE)?.f64()?;
        let regions = df.column(columns::REGION)?.str()?;
        let premiums = df.column(columns::IS_PREMIUM)?.i64()?;

        type Acc = (Vec<f64>, Vec<f64>, Vec<f64>);
        let mut groups: HashMap<(String, bool), Acc> = HashMap::new();

        for i in 0..df.height() {
            let (Some(region), Some(premium)) = (regions.get(i), premiums.get(i)) else {
                continue;
            };
            let entry = groups
                .entry((region.to_string(), premium != 0))
                .or_default();

            if let Some(v) = ages.get(i).filter(|v| v.is_finite()) {
                entry.0.push(v);
            }
            if let Some(v) = incomes.get(i).filter(|v| v.is_finite()) {
                entry.1.push(v);
            }
            if let Some(v) = spendings.get(i).filter(|v| v.is_finite()) {
                entry.2.push(v);
            }
        }

        Ok(groups
            .into_iter()
            .map(|(key, (age, income, spending))| {
                (
                    key,
                    GroupMedians {
                        age: median(age),
                        income: median(income),
                        spending: median(spending),
                    },
                )
            })
            .collect())
    }
}

fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    Some(if n % 2 == 0 {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    } else {
        values[n / 2]
    })
}
