//! Stats module - group-wise aggregation and descriptive statistics

mod aggregator;

pub use aggregator::{
    Aggregator, Analysis, ColumnSummary, CorrelationMatrix, DescriptiveStats, GroupKey,
    GroupSummary, PremiumComparison, TTestResult, SIGNIFICANCE_THRESHOLD,
};
