//! Narrative summary of the aggregate views.
//!
//! Every name that appears in the narrative comes from the aggregates. Lines
//! that refer to a key the data does not contain are dropped instead of
//! failing the report.

use crate::aggregator::{Aggregates, MonthlyRevenue};
use crate::enricher::MissingValues;
use crate::errors::MissingKeyError;
use crate::format::{format_amount, percentage};
use std::fmt;
use std::fmt::Formatter;

const RULE_WIDTH: usize = 60;
const NO_DATA: &str = "No sales data available.";

#[derive(Clone, Debug, Default)]
pub struct ReportOptions {
    /// Categories the user wants called out by name. Absent ones are
    /// skipped with a warning.
    pub focus_categories: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub title: &'static str,
    pub lines: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub sections: Vec<Section>,
}

impl Report {
    pub fn build(aggregates: &Aggregates, missing: MissingValues, options: &ReportOptions) -> Self {
        Self {
            sections: vec![
                Section {
                    title: "Revenue by category",
                    lines: category_lines(aggregates, options),
                },
                Section {
                    title: "Monthly dynamics",
                    lines: monthly_lines(aggregates),
                },
                Section {
                    title: "Top products",
                    lines: top_product_lines(aggregates),
                },
                Section {
                    title: "Key observations",
                    lines: observation_lines(aggregates, missing),
                },
                Section {
                    title: "Recommendations",
                    lines: recommendation_lines(aggregates),
                },
            ],
        }
    }

    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }
}

fn category_lines(aggregates: &Aggregates, options: &ReportOptions) -> Vec<String> {
    let categories = &aggregates.category_revenue;
    let mut lines = Vec::new();

    match categories.first() {
        Some((leader, revenue)) => lines.push(format!(
            "Highest revenue: {} ({})",
            leader,
            format_amount(*revenue)
        )),
        None => lines.push(NO_DATA.to_string()),
    }
    if let Some((second, revenue)) = categories.get(1) {
        lines.push(format!("Runner-up: {} ({})", second, format_amount(*revenue)));
    }
    if categories.len() > 2 {
        if let Some((lowest, revenue)) = categories.last() {
            lines.push(format!("Lowest revenue: {} ({})", lowest, format_amount(*revenue)));
        }
    }

    for name in &options.focus_categories {
        match focus_category_line(aggregates, name) {
            Ok(line) => lines.push(line),
            Err(err) => tracing::warn!(%err, "skipping focus category"),
        }
    }

    lines
}

fn focus_category_line(aggregates: &Aggregates, name: &str) -> Result<String, MissingKeyError> {
    let revenue = aggregates
        .category_revenue(name)
        .ok_or_else(|| MissingKeyError::Category(name.to_string()))?;
    let rank = aggregates
        .category_revenue
        .iter()
        .position(|(category, _)| category == name)
        .map(|idx| idx + 1)
        .unwrap_or_default();

    Ok(format!(
        "{}: {} ({:.1}% of revenue, rank {} of {})",
        name,
        format_amount(revenue),
        percentage(revenue, aggregates.total_revenue()),
        rank,
        aggregates.category_revenue.len()
    ))
}

fn monthly_lines(aggregates: &Aggregates) -> Vec<String> {
    let months = &aggregates.monthly_sales;
    if months.is_empty() {
        return vec![NO_DATA.to_string()];
    }

    let mut lines = Vec::new();

    if let (Some(first), Some(last)) = (months.first(), months.last()) {
        if months.len() == 1 {
            lines.push(format!("Sales cover a single month: {}", first.month_name));
        } else if last.revenue > first.revenue {
            lines.push(format!(
                "Sales grew from {} ({}) to {} ({})",
                first.month_name,
                format_amount(first.revenue),
                last.month_name,
                format_amount(last.revenue)
            ));
        } else if last.revenue < first.revenue {
            lines.push(format!(
                "Sales declined from {} ({}) to {} ({})",
                first.month_name,
                format_amount(first.revenue),
                last.month_name,
                format_amount(last.revenue)
            ));
        } else {
            lines.push(format!(
                "Sales were flat between {} and {}",
                first.month_name, last.month_name
            ));
        }
    }

    if let Some(best) = best_month(months) {
        lines.push(format!(
            "Best month: {} ({})",
            best.month_name,
            format_amount(best.revenue)
        ));
        if best.month >= 10 {
            lines.push(String::from("Revenue peaks toward the end of the year"));
        }
    }
    if let Some(worst) = worst_month(months) {
        lines.push(format!(
            "Worst month: {} ({})",
            worst.month_name,
            format_amount(worst.revenue)
        ));
    }

    let units: Vec<String> = aggregates
        .monthly_quantity
        .iter()
        .map(|m| format!("{} {}", m.month_name, m.quantity))
        .collect();
    lines.push(format!("Units sold per month: {}", units.join(", ")));

    lines
}

// Earliest month wins ties for both extremes.
fn best_month(months: &[MonthlyRevenue]) -> Option<&MonthlyRevenue> {
    months.iter().fold(None, |best, m| match best {
        Some(b) if b.revenue >= m.revenue => Some(b),
        _ => Some(m),
    })
}

fn worst_month(months: &[MonthlyRevenue]) -> Option<&MonthlyRevenue> {
    months.iter().fold(None, |worst, m| match worst {
        Some(w) if w.revenue <= m.revenue => Some(w),
        _ => Some(m),
    })
}

fn top_product_lines(aggregates: &Aggregates) -> Vec<String> {
    if aggregates.top_products_revenue.is_empty() {
        return vec![NO_DATA.to_string()];
    }

    let mut lines = vec![String::from("By revenue:")];
    for (idx, (product, revenue)) in aggregates.top_products_revenue.iter().enumerate() {
        lines.push(format!("  {}. {}: {}", idx + 1, product, format_amount(*revenue)));
    }

    lines.push(String::from("By units sold:"));
    for (idx, (product, quantity)) in aggregates.top_products_quantity.iter().enumerate() {
        let line = match product_revenue(aggregates, product) {
            Ok(revenue) => format!(
                "  {}. {}: {} units ({})",
                idx + 1,
                product,
                quantity,
                format_amount(revenue)
            ),
            Err(err) => {
                tracing::warn!(%err, "omitting product revenue");
                format!("  {}. {}: {} units", idx + 1, product, quantity)
            }
        };
        lines.push(line);
    }

    lines
}

fn product_revenue(aggregates: &Aggregates, product: &str) -> Result<f64, MissingKeyError> {
    aggregates
        .product_revenue(product)
        .ok_or_else(|| MissingKeyError::Product(product.to_string()))
}

/// Products ranked in the revenue top list but absent from the units top
/// list: expensive items that sell in small numbers.
fn high_value_low_volume(aggregates: &Aggregates) -> Vec<&str> {
    aggregates
        .top_products_revenue
        .iter()
        .map(|(product, _)| product.as_str())
        .filter(|product| {
            !aggregates
                .top_products_quantity
                .iter()
                .any(|(other, _)| other == product)
        })
        .collect()
}

fn observation_lines(aggregates: &Aggregates, missing: MissingValues) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some((leader, revenue)) = aggregates.category_revenue.first() {
        lines.push(format!(
            "{} is the most profitable category with {:.1}% of total revenue",
            leader,
            percentage(*revenue, aggregates.total_revenue())
        ));
    }
    if let Some((product, quantity)) = aggregates.top_products_quantity.first() {
        lines.push(format!(
            "{} is the best-selling product by units ({} units)",
            product, quantity
        ));
    }

    let premium = high_value_low_volume(aggregates);
    if !premium.is_empty() {
        lines.push(format!(
            "{} bring high revenue at low volume",
            premium.join(", ")
        ));
    }

    if missing.total() > 0 {
        lines.push(format!(
            "{} missing Quantity and {} missing Price values; affected records are excluded from revenue totals",
            missing.quantity, missing.price
        ));
    }

    if lines.is_empty() {
        lines.push(NO_DATA.to_string());
    }
    lines
}

fn recommendation_lines(aggregates: &Aggregates) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some((leader, _)) = aggregates.category_revenue.first() {
        lines.push(format!("Expand the range and promotion of {}", leader));
    }
    if let Some((product, _)) = aggregates.top_products_quantity.first() {
        lines.push(format!(
            "Build bundles around {} to raise the average order value",
            product
        ));
    }
    if aggregates.monthly_sales.len() > 1 {
        if let Some(worst) = worst_month(&aggregates.monthly_sales) {
            lines.push(format!("Strengthen marketing ahead of {}", worst.month_name));
        }
    }
    if aggregates.category_revenue.len() > 1 {
        if let Some((lowest, _)) = aggregates.category_revenue.last() {
            lines.push(format!("Consider discounts on {} to lift sales", lowest));
        }
    }

    if lines.is_empty() {
        lines.push(NO_DATA.to_string());
    }
    lines
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(f, "CONCLUSIONS")?;
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;

        for (idx, section) in self.sections.iter().enumerate() {
            writeln!(f)?;
            writeln!(f, "{}. {}:", idx + 1, section.title)?;
            for line in &section.lines {
                writeln!(f, "   - {}", line)?;
            }
        }

        writeln!(f)?;
        write!(f, "{}", "=".repeat(RULE_WIDTH))
    }
}

/// Plain tables of every aggregate view, printed before the narrative.
pub fn summary_tables(aggregates: &Aggregates) -> String {
    let mut out = String::new();

    out.push_str("Revenue by category:\n");
    for (category, revenue) in &aggregates.category_revenue {
        out.push_str(&format!("  {:<24} {:>14}\n", category, format_amount(*revenue)));
    }

    out.push_str("\nRevenue by month:\n");
    for month in &aggregates.monthly_sales {
        out.push_str(&format!(
            "  {:<24} {:>14}\n",
            month.month_name,
            format_amount(month.revenue)
        ));
    }

    out.push_str("\nUnits sold by month:\n");
    for month in &aggregates.monthly_quantity {
        out.push_str(&format!("  {:<24} {:>14}\n", month.month_name, month.quantity));
    }

    out.push_str("\nTop products by revenue:\n");
    for (product, revenue) in &aggregates.top_products_revenue {
        out.push_str(&format!("  {:<24} {:>14}\n", product, format_amount(*revenue)));
    }

    out.push_str("\nTop products by units sold:\n");
    for (product, quantity) in &aggregates.top_products_quantity {
        out.push_str(&format!("  {:<24} {:>14}\n", product, quantity));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::MonthlyQuantity;

    fn aggregates() -> Aggregates {
        Aggregates {
            category_revenue: vec![
                (String::from("Smartphones"), 5000.0),
                (String::from("Laptops"), 3000.0),
                (String::from("Accessories"), 2000.0),
            ],
            monthly_sales: vec![
                MonthlyRevenue {
                    month: 1,
                    month_name: "January",
                    revenue: 1000.0,
                },
                MonthlyRevenue {
                    month: 6,
                    month_name: "June",
                    revenue: 3000.0,
                },
                MonthlyRevenue {
                    month: 12,
                    month_name: "December",
                    revenue: 6000.0,
                },
            ],
            monthly_quantity: vec![
                MonthlyQuantity {
                    month_name: "January",
                    quantity: 10,
                },
                MonthlyQuantity {
                    month_name: "June",
                    quantity: 30,
                },
                MonthlyQuantity {
                    month_name: "December",
                    quantity: 60,
                },
            ],
            product_revenue: vec![
                (String::from("Phone"), 5000.0),
                (String::from("Laptop"), 3000.0),
                (String::from("Cable"), 2000.0),
            ],
            top_products_revenue: vec![
                (String::from("Phone"), 5000.0),
                (String::from("Laptop"), 3000.0),
                (String::from("Cable"), 2000.0),
            ],
            top_products_quantity: vec![
                (String::from("Cable"), 80),
                (String::from("Phone"), 5),
                (String::from("Ghost"), 1),
            ],
        }
    }

    #[test]
    fn should_name_category_leaders_from_data() {
        let report = Report::build(&aggregates(), MissingValues::default(), &ReportOptions::default());
        let lines = &report.section("Revenue by category").unwrap().lines;

        assert_eq!(lines[0], "Highest revenue: Smartphones (5,000)");
        assert_eq!(lines[1], "Runner-up: Laptops (3,000)");
        assert_eq!(lines[2], "Lowest revenue: Accessories (2,000)");
    }

    #[test]
    fn should_skip_absent_focus_categories() {
        let options = ReportOptions {
            focus_categories: vec![String::from("Laptops"), String::from("TV")],
        };
        let report = Report::build(&aggregates(), MissingValues::default(), &options);
        let lines = &report.section("Revenue by category").unwrap().lines;

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[3], "Laptops: 3,000 (30.0% of revenue, rank 2 of 3)");
        assert!(!lines.iter().any(|line| line.contains("TV")));
    }

    #[test]
    fn should_find_best_and_worst_month() {
        let report = Report::build(&aggregates(), MissingValues::default(), &ReportOptions::default());
        let lines = &report.section("Monthly dynamics").unwrap().lines;

        assert_eq!(lines[0], "Sales grew from January (1,000) to December (6,000)");
        assert!(lines.contains(&String::from("Best month: December (6,000)")));
        assert!(lines.contains(&String::from("Worst month: January (1,000)")));
        assert!(lines.contains(&String::from("Revenue peaks toward the end of the year")));
    }

    #[test]
    fn should_omit_revenue_for_unknown_product() {
        let report = Report::build(&aggregates(), MissingValues::default(), &ReportOptions::default());
        let lines = &report.section("Top products").unwrap().lines;

        assert!(lines.contains(&String::from("  1. Cable: 80 units (2,000)")));
        assert!(lines.contains(&String::from("  3. Ghost: 1 units")));
    }

    #[test]
    fn should_observe_high_value_low_volume_products() {
        let missing = MissingValues {
            quantity: 2,
            price: 0,
        };
        let report = Report::build(&aggregates(), missing, &ReportOptions::default());
        let lines = &report.section("Key observations").unwrap().lines;

        assert_eq!(
            lines[0],
            "Smartphones is the most profitable category with 50.0% of total revenue"
        );
        assert!(lines.contains(&String::from("Laptop bring high revenue at low volume")));
        assert!(lines.iter().any(|line| line.starts_with("2 missing Quantity")));
    }

    #[test]
    fn should_recommend_from_data() {
        let report = Report::build(&aggregates(), MissingValues::default(), &ReportOptions::default());
        let lines = &report.section("Recommendations").unwrap().lines;

        assert_eq!(
            lines,
            &vec![
                String::from("Expand the range and promotion of Smartphones"),
                String::from("Build bundles around Cable to raise the average order value"),
                String::from("Strengthen marketing ahead of January"),
                String::from("Consider discounts on Accessories to lift sales"),
            ]
        );
    }

    #[test]
    fn should_build_report_for_empty_aggregates() {
        let options = ReportOptions {
            focus_categories: vec![String::from("Smartphones")],
        };
        let report = Report::build(&Aggregates::default(), MissingValues::default(), &options);

        assert_eq!(report.sections.len(), 5);
        for section in &report.sections {
            assert_eq!(section.lines, vec![NO_DATA.to_string()]);
        }
        assert!(report.to_string().contains("5. Recommendations:"));
        assert!(summary_tables(&Aggregates::default()).contains("Revenue by category:"));
    }
}
