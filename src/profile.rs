//! First look at a freshly loaded dataset: a preview of the leading rows,
//! shape information, missing cells and summary statistics of the numeric
//! columns.

use crate::enricher::SalesRecord;
use crate::loader::{Dataset, RawRecord, REQUIRED_COLUMNS};
use std::fmt;
use std::fmt::Formatter;

/// Summary statistics for one numeric column. Unparseable and empty cells
/// are left out of every statistic.
#[derive(Clone, Debug, PartialEq)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,

    /// Sample standard deviation; zero when fewer than two values.
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl NumericSummary {
    /// Returns None when the column holds no numeric values at all.
    pub fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(|a, b| a.total_cmp(b));

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                / (count - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };

        Some(Self {
            count,
            mean,
            std,
            min: values[0],
            q25: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            q75: quantile(&values, 0.75),
            max: values[count - 1],
        })
    }
}

/// Linear interpolation between the closest ranks of sorted `values`.
fn quantile(values: &[f64], q: f64) -> f64 {
    let pos = q * (values.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    values[lo] + (values[hi] - values[lo]) * (pos - lo as f64)
}

#[derive(Clone, Debug, PartialEq)]
pub struct DatasetProfile {
    pub rows: usize,
    pub columns: Vec<String>,
    pub head: Vec<RawRecord>,

    /// Empty cells per required column, in header order.
    pub missing: Vec<(&'static str, usize)>,
    pub quantity: Option<NumericSummary>,
    pub price: Option<NumericSummary>,
}

impl DatasetProfile {
    pub fn new(dataset: &Dataset, preview_rows: usize) -> Self {
        let missing = REQUIRED_COLUMNS
            .iter()
            .map(|column| {
                let count = dataset
                    .records
                    .iter()
                    .filter(|record| field(record, column).is_empty())
                    .count();
                (*column, count)
            })
            .collect();

        Self {
            rows: dataset.len(),
            columns: dataset.columns.clone(),
            head: dataset.records.iter().take(preview_rows).cloned().collect(),
            missing,
            quantity: NumericSummary::from_values(numeric_values(dataset, "Quantity")),
            price: NumericSummary::from_values(numeric_values(dataset, "Price")),
        }
    }
}

fn field<'a>(record: &'a RawRecord, column: &str) -> &'a str {
    match column {
        "Date" => &record.date,
        "Product" => &record.product,
        "Category" => &record.category,
        "Quantity" => &record.quantity,
        _ => &record.price,
    }
}

fn numeric_values(dataset: &Dataset, column: &str) -> Vec<f64> {
    dataset
        .records
        .iter()
        .filter_map(|record| field(record, column).parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .collect()
}

impl fmt::Display for DatasetProfile {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "First {} rows:", self.head.len())?;
        writeln!(
            f,
            "{:<12} {:<24} {:<16} {:>8} {:>10}",
            "Date", "Product", "Category", "Quantity", "Price"
        )?;
        for record in &self.head {
            writeln!(
                f,
                "{:<12} {:<24} {:<16} {:>8} {:>10}",
                record.date, record.product, record.category, record.quantity, record.price
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Rows: {}", self.rows)?;
        writeln!(f, "Columns ({}): {}", self.columns.len(), self.columns.join(", "))?;

        writeln!(f)?;
        writeln!(f, "Missing values per column:")?;
        for (column, count) in &self.missing {
            writeln!(f, "  {:<10} {}", column, count)?;
        }

        writeln!(f)?;
        writeln!(f, "Numeric columns:")?;
        writeln!(
            f,
            "  {:<8} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "", "mean", "std", "min", "25%", "50%", "75%", "max"
        )?;
        for (name, summary) in [("Quantity", &self.quantity), ("Price", &self.price)] {
            match summary {
                Some(s) => writeln!(
                    f,
                    "  {:<8} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2}  (n={})",
                    name, s.mean, s.std, s.min, s.q25, s.median, s.q75, s.max, s.count
                )?,
                None => writeln!(f, "  {:<8} no numeric values", name)?,
            }
        }

        Ok(())
    }
}

/// Renders the first enriched records with their derived fields.
pub fn enriched_preview(records: &[SalesRecord], rows: usize) -> String {
    let mut out = format!(
        "{:<12} {:<24} {:<16} {:>8} {:>10} {:>12} {:>5} {:<10}\n",
        "Date", "Product", "Category", "Quantity", "Price", "Revenue", "Month", "Month_Name"
    );
    for record in records.iter().take(rows) {
        out.push_str(&format!(
            "{:<12} {:<24} {:<16} {:>8} {:>10} {:>12} {:>5} {:<10}\n",
            record.date.format("%Y-%m-%d").to_string(),
            record.product,
            record.category,
            display_or_unknown(record.quantity),
            display_or_unknown(record.price),
            display_or_unknown(record.revenue.map(|r| format!("{:.2}", r))),
            record.month,
            record.month_name,
        ));
    }
    out
}

fn display_or_unknown<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| String::from("n/a"))
}
