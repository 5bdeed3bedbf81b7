//! SVG charts of the aggregate views.
//!
//! Charts only draw what the aggregates already hold. An empty view turns
//! into a titled panel with a "No data" note.

use crate::aggregator::{Aggregates, MonthlyRevenue};
use crate::errors::RenderError;
use crate::format::format_amount;
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

pub const OVERVIEW_FILE: &str = "sales_overview.svg";
pub const TOP_QUANTITY_FILE: &str = "top_products_quantity.svg";

const OVERVIEW_SIZE: (u32, u32) = (1600, 1000);
const TOP_QUANTITY_SIZE: (u32, u32) = (1200, 600);

const FONT: &str = "sans-serif";
const ORANGE: RGBColor = RGBColor(255, 165, 0);
const PURPLE: RGBColor = RGBColor(128, 0, 128);
const DARK_BLUE: RGBColor = RGBColor(0, 0, 139);
const LIGHT_BLUE: RGBColor = RGBColor(173, 216, 230);
const PALETTE: [RGBColor; 5] = [BLUE, GREEN, RED, ORANGE, PURPLE];
const QUANTITY_PALETTE: [RGBColor; 5] = [RED, ORANGE, YELLOW, GREEN, BLUE];

/// Paths of the files written by [`render_charts`].
#[derive(Clone, Debug, PartialEq)]
pub struct ChartSet {
    pub overview: PathBuf,
    pub top_quantity: PathBuf,
}

/// Writes the four-panel overview and the standalone units chart into
/// `output_dir`, creating the directory when needed.
pub fn render_charts(aggregates: &Aggregates, output_dir: &Path) -> Result<ChartSet, RenderError> {
    fs::create_dir_all(output_dir).map_err(|err| RenderError::Io(output_dir.to_path_buf(), err))?;

    let charts = ChartSet {
        overview: output_dir.join(OVERVIEW_FILE),
        top_quantity: output_dir.join(TOP_QUANTITY_FILE),
    };

    {
        let root = SVGBackend::new(&charts.overview, OVERVIEW_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let panels = root.split_evenly((2, 2));
        category_bars(&panels[0], &aggregates.category_revenue)?;
        monthly_line(&panels[1], &aggregates.monthly_sales)?;
        horizontal_bars(
            &panels[2],
            "Top 5 products by revenue",
            "Revenue",
            &aggregates.top_products_revenue,
            &[LIGHT_BLUE],
            |value| format!(" {}", format_amount(value)),
        )?;
        category_pie(&panels[3], &aggregates.category_revenue)?;

        root.present()?;
    }

    {
        let root = SVGBackend::new(&charts.top_quantity, TOP_QUANTITY_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let quantities: Vec<(String, f64)> = aggregates
            .top_products_quantity
            .iter()
            .map(|(product, quantity)| (product.clone(), *quantity as f64))
            .collect();
        horizontal_bars(
            &root,
            "Top 5 products by units sold",
            "Units sold",
            &quantities,
            &QUANTITY_PALETTE,
            |value| format!("  {} units", value as u64),
        )?;

        root.present()?;
    }

    tracing::info!(
        overview = %charts.overview.display(),
        top_quantity = %charts.top_quantity.display(),
        "charts written"
    );
    Ok(charts)
}

/// One slot per bar on a segmented axis. Integer ranges include their end,
/// so `n` bars need `0..n - 1`; a single bar keeps `0..1` since a
/// zero-width range cannot be mapped.
fn slot_range(n: usize) -> Range<u32> {
    0..(n as u32).saturating_sub(1).max(1)
}

/// Upper bound of a value axis with some headroom for labels.
fn value_ceiling(values: impl Iterator<Item = f64>, headroom: f64) -> f64 {
    let max = values.fold(0.0, f64::max);
    if max > 0.0 {
        max * headroom
    } else {
        1.0
    }
}

fn slot_label(value: &SegmentValue<u32>, labels: &[&str]) -> String {
    match value {
        SegmentValue::CenterOf(idx) => labels
            .get(*idx as usize)
            .map(|label| label.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

fn empty_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
) -> Result<(), RenderError> {
    let area = area.titled(title, (FONT, 24).into_font())?;
    let (width, height) = area.dim_in_pixel();
    area.draw(&Text::new(
        "No data",
        ((width / 2) as i32, (height / 2) as i32),
        (FONT, 18)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center)),
    ))?;
    Ok(())
}

fn category_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    categories: &[(String, f64)],
) -> Result<(), RenderError> {
    let title = "Revenue by category";
    if categories.is_empty() {
        return empty_panel(area, title);
    }

    let labels: Vec<&str> = categories.iter().map(|(name, _)| name.as_str()).collect();
    let ceiling = value_ceiling(categories.iter().map(|(_, v)| *v), 1.15);

    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 24).into_font())
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(slot_range(categories.len()).into_segmented(), 0f64..ceiling)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(categories.len())
        .x_label_formatter(&|v| slot_label(v, &labels))
        .y_label_formatter(&|v| format_amount(*v))
        .x_desc("Category")
        .y_desc("Revenue")
        .draw()?;

    chart.draw_series(categories.iter().enumerate().map(|(idx, (_, revenue))| {
        let slot = idx as u32;
        let mut bar = Rectangle::new(
            [
                (SegmentValue::Exact(slot), 0.0),
                (SegmentValue::Exact(slot + 1), *revenue),
            ],
            PALETTE[idx % PALETTE.len()].filled(),
        );
        bar.set_margin(0, 0, 10, 10);
        bar
    }))?;

    let label_style = (FONT, 14)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(categories.iter().enumerate().map(|(idx, (_, revenue))| {
        Text::new(
            format_amount(*revenue),
            (SegmentValue::CenterOf(idx as u32), *revenue),
            label_style.clone(),
        )
    }))?;

    Ok(())
}

fn monthly_line<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    months: &[MonthlyRevenue],
) -> Result<(), RenderError> {
    let title = "Monthly revenue";
    if months.is_empty() {
        return empty_panel(area, title);
    }

    let labels: Vec<&str> = months.iter().map(|m| m.month_name).collect();
    let ceiling = value_ceiling(months.iter().map(|m| m.revenue), 1.15);

    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 24).into_font())
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(slot_range(months.len()).into_segmented(), 0f64..ceiling)?;

    chart
        .configure_mesh()
        .x_labels(months.len())
        .x_label_formatter(&|v| slot_label(v, &labels))
        .y_label_formatter(&|v| format_amount(*v))
        .x_desc("Month")
        .y_desc("Revenue")
        .draw()?;

    let points: Vec<(SegmentValue<u32>, f64)> = months
        .iter()
        .enumerate()
        .map(|(idx, m)| (SegmentValue::CenterOf(idx as u32), m.revenue))
        .collect();

    chart.draw_series(LineSeries::new(points.clone(), DARK_BLUE.stroke_width(2)))?;
    chart.draw_series(
        points
            .into_iter()
            .map(|point| Circle::new(point, 4, DARK_BLUE.filled())),
    )?;

    Ok(())
}

/// Horizontal bars, largest at the top. `label` renders the value printed
/// to the right of each bar.
fn horizontal_bars<DB: DrawingBackend, F: Fn(f64) -> String>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    value_desc: &str,
    bars: &[(String, f64)],
    colors: &[RGBColor],
    label: F,
) -> Result<(), RenderError> {
    if bars.is_empty() {
        return empty_panel(area, title);
    }

    let n = bars.len();
    // Row 0 is drawn at the bottom, so the ranking is flipped.
    let row = |idx: usize| (n - 1 - idx) as u32;
    let labels: Vec<&str> = bars.iter().rev().map(|(name, _)| name.as_str()).collect();
    let ceiling = value_ceiling(bars.iter().map(|(_, v)| *v), 1.25);

    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(160)
        .build_cartesian_2d(0f64..ceiling, slot_range(n).into_segmented())?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(n)
        .y_label_formatter(&|v| slot_label(v, &labels))
        .x_label_formatter(&|v| format_amount(*v))
        .x_desc(value_desc)
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(idx, (_, value))| {
        let slot = row(idx);
        let mut bar = Rectangle::new(
            [
                (0.0, SegmentValue::Exact(slot)),
                (*value, SegmentValue::Exact(slot + 1)),
            ],
            colors[idx % colors.len()].filled(),
        );
        bar.set_margin(8, 8, 0, 0);
        bar
    }))?;

    let label_style = (FONT, 14)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));
    chart.draw_series(bars.iter().enumerate().map(|(idx, (_, value))| {
        Text::new(
            label(*value),
            (*value, SegmentValue::CenterOf(row(idx))),
            label_style.clone(),
        )
    }))?;

    Ok(())
}

fn category_pie<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    categories: &[(String, f64)],
) -> Result<(), RenderError> {
    let title = "Revenue share by category";
    let total: f64 = categories.iter().map(|(_, v)| v).sum();
    if categories.is_empty() || total <= 0.0 {
        return empty_panel(area, title);
    }

    let area = area.titled(title, (FONT, 24).into_font())?;
    let (width, height) = area.dim_in_pixel();
    let center = ((width / 2) as i32, (height / 2) as i32);
    let radius = f64::from(width.min(height)) * 0.35;

    let sizes: Vec<f64> = categories.iter().map(|(_, v)| *v).collect();
    let colors: Vec<RGBColor> = (0..categories.len())
        .map(|idx| PALETTE[idx % PALETTE.len()])
        .collect();
    let labels: Vec<&str> = categories.iter().map(|(name, _)| name.as_str()).collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(-90.0);
    pie.label_style((FONT, 16).into_font().color(&BLACK));
    pie.percentages((FONT, 14).into_font().color(&WHITE));
    area.draw(&pie)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::aggregate;
    use crate::enricher::{enrich, MissingValuePolicy};
    use crate::loader::Loader;
    use std::fs;

    fn aggregates() -> Aggregates {
        let dataset = Loader::default()
            .load_reader(
                "Date,Product,Category,Quantity,Price\n\
                 2024-01-15,Widget,Accessories,2,10.00\n\
                 2024-02-20,Phone,Smartphones,1,899.00\n\
                 2024-12-01,Laptop,Laptops,1,1200.00\n"
                    .as_bytes(),
            )
            .unwrap();
        aggregate(&enrich(&dataset, MissingValuePolicy::default()).unwrap().records)
    }

    #[test]
    fn should_write_both_chart_files() {
        let dir = tempfile::tempdir().unwrap();
        let charts = render_charts(&aggregates(), dir.path()).unwrap();

        assert_eq!(charts.overview, dir.path().join(OVERVIEW_FILE));
        let overview = fs::read_to_string(&charts.overview).unwrap();
        assert!(overview.contains("<svg"));
        assert!(overview.contains("Revenue by category"));
        assert!(overview.contains("Smartphones"));

        let top_quantity = fs::read_to_string(&charts.top_quantity).unwrap();
        assert!(top_quantity.contains("Widget"));
    }

    #[test]
    fn should_render_empty_aggregates_without_failing() {
        let dir = tempfile::tempdir().unwrap();
        let charts = render_charts(&Aggregates::default(), dir.path()).unwrap();

        let overview = fs::read_to_string(&charts.overview).unwrap();
        assert!(overview.contains("No data"));
        assert!(charts.top_quantity.exists());
    }

    #[test]
    fn should_create_missing_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("reports").join("charts");
        render_charts(&aggregates(), &nested).unwrap();
        assert!(nested.join(TOP_QUANTITY_FILE).exists());
    }

    #[test]
    fn should_size_axes_for_single_and_many_bars() {
        assert_eq!(slot_range(1), 0..1);
        assert_eq!(slot_range(5), 0..4);
        assert_eq!(value_ceiling(std::iter::empty(), 1.15), 1.0);
        assert_eq!(value_ceiling([10.0, 20.0].into_iter(), 1.5), 30.0);
    }
}
