//! Reporter Module
//! Formats aggregated results and writes the run's output files.
//!
//! The reporter holds no business logic: it renders what the aggregator
//! computed and hands numeric series to the chart renderer.

use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use polars::prelude::*;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::charts::ChartRenderer;
use crate::data::CustomerTable;
use crate::stats::{Analysis, ColumnSummary, GroupSummary, PremiumComparison};

/// Row labels of the summary statistics file, one per statistic.
const STATISTICS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

pub struct Reporter;

impl Reporter {
    /// Print the group summary table and write every output file.
    /// Returns the list of files created.
    pub fn run(
        table: &CustomerTable,
        analysis: &Analysis,
        out_dir: &Path,
    ) -> crate::Result<Vec<PathBuf>> {
        fs::create_dir_all(out_dir)?;

        println!("{}", Self::group_table(&analysis.groups));

        let mut written = Vec::new();

        let summary_path = out_dir.join("summary_statistics.csv");
        Self::write_summary_csv(&analysis.columns, &summary_path)?;
        written.push(summary_path);

        let ttest_path = out_dir.join("statistical_analysis.txt");
        Self::write_comparison_report(&analysis.premium, &ttest_path)?;
        written.push(ttest_path);

        let distributions_path = out_dir.join("distributions.png");
        ChartRenderer::render_distributions(table, &distributions_path)?;
        written.push(distributions_path);

        let heatmap_path = out_dir.join("correlation_matrix.png");
        ChartRenderer::render_correlation_heatmap(&analysis.correlations, &heatmap_path)?;
        written.push(heatmap_path);

        Ok(written)
    }

    /// Render the per-group summaries as a console table.
    pub fn group_table(groups: &[GroupSummary]) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                "Region",
                "Tier",
                "N",
                "Income Mean",
                "Income Median",
                "Income Std",
                "Spending Mean",
                "Spending Median",
                "Spending Std",
            ]);

        for group in groups {
            table.add_row(vec![
                Cell::new(&group.key.region),
                Cell::new(group.key.tier()),
                Cell::new(group.count),
                Cell::new(format!("{:.2}", group.income.mean)),
                Cell::new(format!("{:.2}", group.income.median)),
                Cell::new(format!("{:.2}", group.income.std)),
                Cell::new(format!("{:.2}", group.spending_score.mean)),
                Cell::new(format!("{:.2}", group.spending_score.median)),
                Cell::new(format!("{:.2}", group.spending_score.std)),
            ]);
        }

        table
    }

    /// Write the whole-column summaries in the statistic-per-row layout.
    pub fn write_summary_csv(columns: &[ColumnSummary], path: &Path) -> crate::Result<()> {
        let mut cols: Vec<Column> = vec![Column::new(
            "statistic".into(),
            STATISTICS.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        )];

        for summary in columns {
            cols.push(Column::new(
                summary.column.as_str().into(),
                vec![
                    summary.count as f64,
                    summary.mean,
                    summary.std,
                    summary.min,
                    summary.p25,
                    summary.median,
                    summary.p75,
                    summary.max,
                ],
            ));
        }

        let mut df = DataFrame::new(cols)?;
        let mut file = fs::File::create(path)?;
        CsvWriter::new(&mut file).include_header(true).finish(&mut df)?;
        Ok(())
    }

    /// Write the premium vs non-premium spending comparison.
    pub fn write_comparison_report(cmp: &PremiumComparison, path: &Path) -> crate::Result<()> {
        let mut report = String::new();
        writeln!(report, "Statistical Analysis Results")?;
        writeln!(report, "{}", "=".repeat(40))?;
        writeln!(report)?;
        writeln!(report, "Premium customers: {}", cmp.premium.count)?;
        writeln!(report, "Non-premium customers: {}", cmp.standard.count)?;
        writeln!(report)?;
        writeln!(report, "Mean spending (premium): ${:.2}", cmp.premium.mean)?;
        writeln!(
            report,
            "Mean spending (non-premium): ${:.2}",
            cmp.standard.mean
        )?;
        writeln!(report)?;
        writeln!(report, "T-test results:")?;
        writeln!(report, "  t-statistic: {:.4}", cmp.test.t_stat)?;
        writeln!(report, "  p-value: {:.6}", cmp.test.p_value)?;
        writeln!(
            report,
            "  Significant at p < 0.05: {}",
            if cmp.test.significant { "YES" } else { "NO" }
        )?;

        fs::write(path, report)?;
        Ok(())
    }
}
