//! Statistics Aggregator Module
//! Group-wise descriptive statistics, whole-column summaries, the premium
//! spending comparison, and the correlation matrix.

use polars::prelude::*;
use rayon::prelude::*;
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::collections::BTreeSet;
use std::fmt;

use crate::data::{columns, CustomerTable};

/// Significance threshold for the premium spending t-test
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Partition key of the customer table: region and premium flag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub region: String,
    pub is_premium: bool,
}

impl GroupKey {
    pub fn tier(&self) -> &'static str {
        if self.is_premium {
            "premium"
        } else {
            "standard"
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.region, self.tier())
    }
}

/// Count, mean, median, and sample standard deviation of one value series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
}

impl Default for DescriptiveStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
        }
    }
}

/// Aggregated statistics for one (region, premium) partition.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub key: GroupKey,
    pub count: usize,
    pub income: DescriptiveStats,
    pub spending_score: DescriptiveStats,
}

/// Whole-column summary, one row of the `summary_statistics.csv` layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

/// Welch's two-sample t-test result.
#[derive(Debug, Clone, Copy)]
pub struct TTestResult {
    pub t_stat: f64,
    pub df: f64,
    pub p_value: f64,
    pub significant: bool,
}

/// Premium vs standard spending comparison.
#[derive(Debug, Clone)]
pub struct PremiumComparison {
    pub premium: DescriptiveStats,
    pub standard: DescriptiveStats,
    pub test: TTestResult,
}

/// Pearson correlation matrix over the numeric columns.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row][col]
    }
}

/// Everything the reporter consumes, computed in one pass over the table.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub groups: Vec<GroupSummary>,
    pub columns: Vec<ColumnSummary>,
    pub premium: PremiumComparison,
    pub correlations: CorrelationMatrix,
}

/// Computes descriptive statistics over the cleaned customer table.
pub struct Aggregator;

impl Aggregator {
    /// Compute descriptive statistics for an array of values.
    pub fn descriptive_stats(values: &[f64]) -> DescriptiveStats {
        let n = values.len();
        if n == 0 {
            return DescriptiveStats::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mean = values.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        let variance = if n > 1 {
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };

        DescriptiveStats {
            count: n,
            mean,
            median,
            std: variance.sqrt(),
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Perform Welch's t-test (independent samples, unequal variance).
    pub fn welch_ttest(sample: &[f64], reference: &[f64]) -> TTestResult {
        let n1 = sample.len() as f64;
        let n2 = reference.len() as f64;

        if n1 < 2.0 || n2 < 2.0 {
            return TTestResult {
                t_stat: f64::NAN,
                df: f64::NAN,
                p_value: f64::NAN,
                significant: false,
            };
        }

        let mean1 = sample.iter().sum::<f64>() / n1;
        let mean2 = reference.iter().sum::<f64>() / n2;

        let var1 = sample.iter().map(|x| (x - mean1).powi(2)).sum::<f64>() / (n1 - 1.0);
        let var2 = reference.iter().map(|x| (x - mean2).powi(2)).sum::<f64>() / (n2 - 1.0);

        let se = (var1 / n1 + var2 / n2).sqrt();
        if se == 0.0 {
            // No variance in either sample
            return TTestResult {
                t_stat: 0.0,
                df: f64::NAN,
                p_value: 1.0,
                significant: false,
            };
        }

        let t = (mean1 - mean2) / se;

        // Welch-Satterthwaite degrees of freedom
        let df_num = (var1 / n1 + var2 / n2).powi(2);
        let df_denom = (var1 / n1).powi(2) / (n1 - 1.0) + (var2 / n2).powi(2) / (n2 - 1.0);
        let df = df_num / df_denom;

        // Two-tailed p-value using the t-distribution
        if let Ok(dist) = StudentsT::new(0.0, 1.0, df) {
            let p_value = 2.0 * (1.0 - dist.cdf(t.abs()));
            TTestResult {
                t_stat: t,
                df,
                p_value,
                significant: p_value <= SIGNIFICANCE_THRESHOLD,
            }
        } else {
            TTestResult {
                t_stat: t,
                df,
                p_value: f64::NAN,
                significant: false,
            }
        }
    }

    /// Values of `column` restricted to one (region, premium) partition.
    fn group_values(df: &DataFrame, column: &str, key: &GroupKey) -> crate::Result<Vec<f64>> {
        let filtered = df
            .clone()
            .lazy()
            .filter(
                col(columns::REGION)
                    .eq(lit(key.region.as_str()))
                    .and(col(columns::IS_PREMIUM).eq(lit(key.is_premium as i64))),
            )
            .select([col(column).cast(DataType::Float64)])
            .collect()?;

        let ca = filtered.column(column)?.f64()?;
        Ok(ca.into_iter().flatten().collect())
    }

    /// Partition keys present in the table, in sorted order.
    fn group_keys(df: &DataFrame) -> crate::Result<Vec<GroupKey>> {
        let regions = df.column(columns::REGION)?.str()?;
        let premiums = df.column(columns::IS_PREMIUM)?.i64()?;

        let mut keys = BTreeSet::new();
        for i in 0..df.height() {
            if let (Some(region), Some(premium)) = (regions.get(i), premiums.get(i)) {
                keys.insert(GroupKey {
                    region: region.to_string(),
                    is_premium: premium != 0,
                });
            }
        }

        Ok(keys.into_iter().collect())
    }

    /// One [`GroupSummary`] per non-empty (region, premium) partition,
    /// in sorted key order. Independent of input row order.
    pub fn summarize_groups(table: &CustomerTable) -> crate::Result<Vec<GroupSummary>> {
        let df = table.df();
        let keys = Self::group_keys(df)?;

        // Groups are independent, so fan out across the thread pool; the
        // indexed collect keeps the sorted key order.
        keys.par_iter()
            .map(|key| -> crate::Result<GroupSummary> {
                let income = Self::group_values(df, columns::INCOME, key)?;
                let spending = Self::group_values(df, columns::SPENDING_SCORE, key)?;

                let income_stats = Self::descriptive_stats(&income);
                let spending_stats = Self::descriptive_stats(&spending);

                Ok(GroupSummary {
                    key: key.clone(),
                    count: income_stats.count,
                    income: income_stats,
                    spending_score: spending_stats,
                })
            })
            .collect()
    }

    /// Whole-column summaries for the numeric columns, matching the
    /// count/mean/std/min/quartiles/max layout of `summary_statistics.csv`.
    pub fn describe(table: &CustomerTable) -> crate::Result<Vec<ColumnSummary>> {
        columns::NUMERIC
            .iter()
            .map(|&name| {
                let values = table.numeric_column(name)?;
                let stats = Self::descriptive_stats(&values);

                let mut sorted = values;
                sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

                Ok(ColumnSummary {
                    column: name.to_string(),
                    count: stats.count,
                    mean: stats.mean,
                    std: stats.std,
                    min: sorted.first().copied().unwrap_or(f64::NAN),
                    p25: Self::percentile(&sorted, 25.0),
                    median: Self::percentile(&sorted, 50.0),
                    p75: Self::percentile(&sorted, 75.0),
                    max: sorted.last().copied().unwrap_or(f64::NAN),
                })
            })
            .collect()
    }

    /// Compare spending scores of premium vs standard customers with
    /// Welch's t-test.
    pub fn compare_premium_spending(table: &CustomerTable) -> crate::Result<PremiumComparison> {
        let df = table.df();

        let split = |flag: i64| -> crate::Result<Vec<f64>> {
            let filtered = df
                .clone()
                .lazy()
                .filter(col(columns::IS_PREMIUM).eq(lit(flag)))
                .select([col(columns::SPENDING_SCORE).cast(DataType::Float64)])
                .collect()?;
            let ca = filtered.column(columns::SPENDING_SCORE)?.f64()?;
            Ok(ca.into_iter().flatten().collect())
        };

        let premium = split(1)?;
        let standard = split(0)?;

        Ok(PremiumComparison {
            premium: Self::descriptive_stats(&premium),
            standard: Self::descriptive_stats(&standard),
            test: Self::welch_ttest(&premium, &standard),
        })
    }

    /// Pearson correlation matrix over the numeric columns.
    pub fn correlation_matrix(table: &CustomerTable) -> crate::Result<CorrelationMatrix> {
        let series: Vec<Vec<f64>> = columns::NUMERIC
            .iter()
            .map(|&name| table.numeric_column(name))
            .collect::<crate::Result<_>>()?;

        let n = series.len();
        let mut values = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..n {
                values[i][j] = if i == j {
                    1.0
                } else {
                    pearson(&series[i], &series[j])
                };
            }
        }

        Ok(CorrelationMatrix {
            columns: columns::NUMERIC.iter().map(|s| s.to_string()).collect(),
            values,
        })
    }

    /// Run every aggregation over the cleaned table.
    pub fn analyze(table: &CustomerTable) -> crate::Result<Analysis> {
        Ok(Analysis {
            groups: Self::summarize_groups(table)?,
            columns: Self::describe(table)?,
            premium: Self::compare_premium_spending(table)?,
            correlations: Self::correlation_matrix(table)?,
        })
    }
}

/// Pearson correlation coefficient; 0.0 when either series has no variance.
fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 0.0;
    }

    let mean_a = a[..n].iter().sum::<f64>() / n as f64;
    let mean_b = b[..n].iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for i in 0..n {
        let da = a[i] - mean_a;
        let db = b[i] - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    let denom = (var_a * var_b).sqrt();
    if denom == 0.0 {
        0.0
    } else {
        cov / denom
    }
}
