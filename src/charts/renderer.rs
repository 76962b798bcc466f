//! Static Chart Renderer
//! Generates the analysis chart images with Plotters.
//!
//! Two images are produced per run:
//! 1. `distributions.png` - 2x2 panel: age histogram, income histogram,
//!    spending-by-region boxplot, age-vs-income scatter colored by
//!    spending score
//! 2. `correlation_matrix.png` - annotated heatmap of the Pearson
//!    correlation matrix

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::collections::BTreeMap;
use std::path::Path;

use crate::data::{CustomerRecord, CustomerTable};
use crate::stats::CorrelationMatrix;

// Panel colors
const AGE_COLOR: RGBColor = RGBColor(135, 206, 235); // Sky blue
const INCOME_COLOR: RGBColor = RGBColor(144, 238, 144); // Light green
const BOX_COLOR: RGBColor = RGBColor(52, 152, 219); // Blue

/// Creates the static analysis charts.
pub struct ChartRenderer;

impl ChartRenderer {
    /// Render the 2x2 distribution panel for a cleaned table.
    pub fn render_distributions(table: &CustomerTable, path: &Path) -> crate::Result<()> {
        let records = table.records()?;

        let ages: Vec<f64> = records.iter().map(|r| r.age as f64).collect();
        let incomes: Vec<f64> = records.iter().map(|r| r.income).collect();

        let mut by_region: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for record in &records {
            by_region
                .entry(record.region.clone())
                .or_default()
                .push(record.spending_score);
        }

        let root = BitMapBackend::new(path, (1400, 1000)).into_drawing_area();
        root.fill(&WHITE)?;
        let panels = root.split_evenly((2, 2));

        Self::draw_histogram(&panels[0], "Age Distribution", "Age", &ages, 30, &AGE_COLOR)?;
        Self::draw_histogram(
            &panels[1],
            "Income Distribution",
            "Income ($)",
            &incomes,
            30,
            &INCOME_COLOR,
        )?;
        Self::draw_region_boxplot(&panels[2], &by_region)?;
        Self::draw_income_scatter(&panels[3], &records)?;

        root.present()?;
        Ok(())
    }

    /// Render the annotated correlation heatmap.
    pub fn render_correlation_heatmap(corr: &CorrelationMatrix, path: &Path) -> crate::Result<()> {
        let n = corr.columns.len();
        if n == 0 {
            return Ok(());
        }

        const CELL: i32 = 120;
        const LEFT: i32 = 170;
        const TOP: i32 = 70;
        let grid = CELL * n as i32;
        let width = (LEFT + grid + 40) as u32;
        let height = (TOP + grid + 60) as u32;

        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;

        let title_style = ("sans-serif", 28)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top));
        root.draw(&Text::new(
            "Correlation Matrix",
            (LEFT + grid / 2, 20),
            title_style,
        ))?;

        for i in 0..n {
            for j in 0..n {
                let r = corr.get(i, j);
                let x0 = LEFT + j as i32 * CELL;
                let y0 = TOP + i as i32 * CELL;

                root.draw(&Rectangle::new(
                    [(x0, y0), (x0 + CELL, y0 + CELL)],
                    correlation_color(r).filled(),
                ))?;
                root.draw(&Rectangle::new(
                    [(x0, y0), (x0 + CELL, y0 + CELL)],
                    BLACK.stroke_width(1),
                ))?;

                let text_color = if r.abs() > 0.6 { &WHITE } else { &BLACK };
                let value_style = ("sans-serif", 18)
                    .into_font()
                    .color(text_color)
                    .pos(Pos::new(HPos::Center, VPos::Center));
                root.draw(&Text::new(
                    format!("{:.2}", r),
                    (x0 + CELL / 2, y0 + CELL / 2),
                    value_style,
                ))?;
            }
        }

        let col_style = ("sans-serif", 15)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top));
        let row_style = ("sans-serif", 15)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Right, VPos::Center));

        for (idx, name) in corr.columns.iter().enumerate() {
            root.draw(&Text::new(
                name.clone(),
                (LEFT + idx as i32 * CELL + CELL / 2, TOP + grid + 10),
                col_style.clone(),
            ))?;
            root.draw(&Text::new(
                name.clone(),
                (LEFT - 10, TOP + idx as i32 * CELL + CELL / 2),
                row_style.clone(),
            ))?;
        }

        root.present()?;
        Ok(())
    }

    fn draw_histogram(
        area: &DrawingArea<BitMapBackend, Shift>,
        title: &str,
        x_desc: &str,
        values: &[f64],
        bins: usize,
        color: &RGBColor,
    ) -> crate::Result<()> {
        if values.is_empty() {
            return Ok(());
        }

        let mut min = values.iter().fold(f64::INFINITY, |a, &b| a.min(b));
        let mut max = values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        if (max - min).abs() < f64::EPSILON {
            min -= 0.5;
            max += 0.5;
        }

        let bin_width = (max - min) / bins as f64;
        let mut counts = vec![0usize; bins];
        for &value in values {
            let idx = (((value - min) / bin_width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        let y_max = counts.iter().max().copied().unwrap_or(1).max(1) as f64 * 1.1;

        let mut chart = ChartBuilder::on(area)
            .caption(title, ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(55)
            .build_cartesian_2d(min..max, 0f64..y_max)?;

        chart
            .configure_mesh()
            .x_desc(x_desc)
            .y_desc("Count")
            .axis_desc_style(("sans-serif", 15))
            .draw()?;

        chart.draw_series(counts.iter().enumerate().map(|(i, &count)| {
            let x0 = min + i as f64 * bin_width;
            Rectangle::new(
                [(x0, 0.0), (x0 + bin_width, count as f64)],
                color.mix(0.7).filled(),
            )
        }))?;

        Ok(())
    }

    fn draw_region_boxplot(
        area: &DrawingArea<BitMapBackend, Shift>,
        by_region: &BTreeMap<String, Vec<f64>>,
    ) -> crate::Result<()> {
        if by_region.is_empty() {
            return Ok(());
        }

        let labels: Vec<&str> = by_region.keys().map(|s| s.as_str()).collect();

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for values in by_region.values() {
            for &v in values {
                min = min.min(v);
                max = max.max(v);
            }
        }
        let pad = ((max - min) * 0.1).max(1.0);
        // Boxplot quartiles are f32, so the value axis is too.
        let y_range = ((min - pad) as f32)..((max + pad) as f32);

        let mut chart = ChartBuilder::on(area)
            .caption("Spending Score by Region", ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(55)
            .build_cartesian_2d(labels[..].into_segmented(), y_range)?;

        chart
            .configure_mesh()
            .x_desc("Region")
            .y_desc("Spending Score")
            .axis_desc_style(("sans-serif", 15))
            .draw()?;

        chart.draw_series(labels.iter().map(|label| {
            let quartiles = Quartiles::new(&by_region[*label]);
            Boxplot::new_vertical(SegmentValue::CenterOf(label), &quartiles)
                .width(30)
                .style(BOX_COLOR)
        }))?;

        Ok(())
    }

    fn draw_income_scatter(
        area: &DrawingArea<BitMapBackend, Shift>,
        records: &[CustomerRecord],
    ) -> crate::Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let age_min = records
            .iter()
            .map(|r| r.age as f64)
            .fold(f64::INFINITY, f64::min);
        let age_max = records
            .iter()
            .map(|r| r.age as f64)
            .fold(f64::NEG_INFINITY, f64::max);
        let income_min = records
            .iter()
            .map(|r| r.income)
            .fold(f64::INFINITY, f64::min);
        let income_max = records
            .iter()
            .map(|r| r.income)
            .fold(f64::NEG_INFINITY, f64::max);
        let spend_min = records
            .iter()
            .map(|r| r.spending_score)
            .fold(f64::INFINITY, f64::min);
        let spend_max = records
            .iter()
            .map(|r| r.spending_score)
            .fold(f64::NEG_INFINITY, f64::max);

        let age_pad = ((age_max - age_min) * 0.05).max(1.0);
        let income_pad = ((income_max - income_min) * 0.05).max(1.0);

        let mut chart = ChartBuilder::on(area)
            .caption(
                "Age vs Income (colored by Spending Score)",
                ("sans-serif", 24),
            )
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(75)
            .build_cartesian_2d(
                (age_min - age_pad)..(age_max + age_pad),
                (income_min - income_pad)..(income_max + income_pad),
            )?;

        chart
            .configure_mesh()
            .x_desc("Age")
            .y_desc("Income ($)")
            .axis_desc_style(("sans-serif", 15))
            .draw()?;

        chart.draw_series(records.iter().map(|record| {
            let t = if spend_max > spend_min {
                (record.spending_score - spend_min) / (spend_max - spend_min)
            } else {
                0.5
            };
            Circle::new(
                (record.age as f64, record.income),
                3,
                spending_gradient(t).filled(),
            )
        }))?;

        Ok(())
    }
}

/// Two-segment approximation of the viridis color ramp.
fn spending_gradient(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        lerp_color((68, 1, 84), (33, 145, 140), t * 2.0)
    } else {
        lerp_color((33, 145, 140), (253, 231, 37), (t - 0.5) * 2.0)
    }
}

/// Diverging blue-white-red ramp over [-1, 1].
fn correlation_color(r: f64) -> RGBColor {
    let r = if r.is_finite() { r.clamp(-1.0, 1.0) } else { 0.0 };
    if r < 0.0 {
        lerp_color((255, 255, 255), (59, 76, 192), -r)
    } else {
        lerp_color((255, 255, 255), (180, 4, 38), r)
    }
}

fn lerp_color(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> RGBColor {
    let channel = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    RGBColor(channel(a.0, b.0), channel(a.1, b.1), channel(a.2, b.2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::columns;
    use crate::stats::Aggregator;
    use polars::prelude::*;
    use tempfile::tempdir;

    fn sample_table() -> CustomerTable {
        let df = DataFrame::new(vec![
            Column::new(columns::CUSTOMER_ID.into(), vec![1i64, 2, 3, 4]),
            Column::new(columns::AGE.into(), vec![25i64, 34, 47, 58]),
            Column::new(
                columns::INCOME.into(),
                vec![41_000.0, 56_000.0, 72_000.0, 65_000.0],
            ),
            Column::new(
                columns::SPENDING_SCORE.into(),
                vec![35.0, 52.0, 68.0, 47.0],
            ),
            Column::new(
                columns::REGION.into(),
                vec!["North", "South", "North", "East"],
            ),
            Column::new(columns::IS_PREMIUM.into(), vec![0i64, 1, 1, 0]),
        ])
        .unwrap();
        CustomerTable::new(df)
    }

    #[test]
    fn test_render_distributions() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("distributions.png");

        ChartRenderer::render_distributions(&sample_table(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_render_correlation_heatmap() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("correlation_matrix.png");

        let corr = Aggregator::correlation_matrix(&sample_table()).unwrap();
        ChartRenderer::render_correlation_heatmap(&corr, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_color_ramps_clamp_bad_input() {
        assert_eq!(correlation_color(f64::NAN), correlation_color(0.0));
        assert_eq!(spending_gradient(-1.0), spending_gradient(0.0));
        assert_eq!(spending_gradient(2.0), spending_gradient(1.0));
    }
}
