//! Grouped views over an enriched dataset.
//!
//! Every view is computed from scratch by [`aggregate`]; nothing here keeps
//! state between runs, so aggregating the same records twice gives the same
//! views.

use crate::enricher::{month_name, SalesRecord};
use std::collections::{BTreeMap, HashMap};

/// How many products the top-N rankings keep.
pub const TOP_PRODUCTS: usize = 5;

/// Revenue for one calendar month, summed across years.
#[derive(Clone, Debug, PartialEq)]
pub struct MonthlyRevenue {
    pub month: u32,
    pub month_name: &'static str,
    pub revenue: f64,
}

/// Units sold in one calendar month, summed across years.
#[derive(Clone, Debug, PartialEq)]
pub struct MonthlyQuantity {
    pub month_name: &'static str,
    pub quantity: u64,
}

/// The aggregate views the renderer and reporter read from. Views that map
/// a key to a value are kept as ordered pairs because their order carries
/// meaning (rank or calendar order).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Aggregates {
    /// Revenue by category, highest first.
    pub category_revenue: Vec<(String, f64)>,

    /// Revenue by month, January first.
    pub monthly_sales: Vec<MonthlyRevenue>,

    /// Units sold by month name, January first.
    pub monthly_quantity: Vec<MonthlyQuantity>,

    /// Revenue for every product, highest first.
    pub product_revenue: Vec<(String, f64)>,

    pub top_products_revenue: Vec<(String, f64)>,
    pub top_products_quantity: Vec<(String, u64)>,
}

impl Aggregates {
    pub fn is_empty(&self) -> bool {
        self.category_revenue.is_empty()
            && self.monthly_sales.is_empty()
            && self.product_revenue.is_empty()
    }

    pub fn total_revenue(&self) -> f64 {
        self.category_revenue.iter().map(|(_, revenue)| revenue).sum()
    }

    pub fn total_quantity(&self) -> u64 {
        self.monthly_quantity.iter().map(|m| m.quantity).sum()
    }

    pub fn category_revenue(&self, category: &str) -> Option<f64> {
        lookup(&self.category_revenue, category)
    }

    pub fn product_revenue(&self, product: &str) -> Option<f64> {
        lookup(&self.product_revenue, product)
    }
}

fn lookup<V: Copy>(view: &[(String, V)], key: &str) -> Option<V> {
    view.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
}

/// Sums values per key while remembering the order in which keys were first
/// seen. Rankings sort this order stably, so ties go to the earliest group.
struct Grouped<V> {
    index: HashMap<String, usize>,
    groups: Vec<(String, V)>,
}

impl<V: Default + std::ops::AddAssign> Grouped<V> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    /// Ensures `key` has a group, then adds `value` to it when present.
    fn add(&mut self, key: &str, value: Option<V>) {
        let idx = match self.index.get(key) {
            Some(idx) => *idx,
            None => {
                self.index.insert(key.to_string(), self.groups.len());
                self.groups.push((key.to_string(), V::default()));
                self.groups.len() - 1
            }
        };

        if let Some(value) = value {
            self.groups[idx].1 += value;
        }
    }

    fn ranked(self) -> Vec<(String, V)>
    where
        V: PartialOrd,
    {
        let mut groups = self.groups;
        // sort_by is stable, which keeps first-seen order among equal values.
        groups.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        groups
    }
}

/// Computes every aggregate view from the enriched records.
pub fn aggregate(records: &[SalesRecord]) -> Aggregates {
    let mut by_category = Grouped::<f64>::new();
    let mut by_product_revenue = Grouped::<f64>::new();
    let mut by_product_quantity = Grouped::<u64>::new();
    let mut by_month: BTreeMap<u32, (f64, u64)> = BTreeMap::new();

    for record in records {
        by_category.add(&record.category, record.revenue);
        by_product_revenue.add(&record.product, record.revenue);
        by_product_quantity.add(&record.product, record.quantity.map(u64::from));

        let month = by_month.entry(record.month).or_default();
        month.0 += record.revenue.unwrap_or_default();
        month.1 += record.quantity.map(u64::from).unwrap_or_default();
    }

    let product_revenue = by_product_revenue.ranked();
    let top_products_revenue = product_revenue.iter().take(TOP_PRODUCTS).cloned().collect();
    let mut top_products_quantity = by_product_quantity.ranked();
    top_products_quantity.truncate(TOP_PRODUCTS);

    let aggregates = Aggregates {
        category_revenue: by_category.ranked(),
        monthly_sales: by_month
            .iter()
            .map(|(month, (revenue, _))| MonthlyRevenue {
                month: *month,
                month_name: month_name(*month),
                revenue: *revenue,
            })
            .collect(),
        monthly_quantity: by_month
            .iter()
            .map(|(month, (_, quantity))| MonthlyQuantity {
                month_name: month_name(*month),
                quantity: *quantity,
            })
            .collect(),
        product_revenue,
        top_products_revenue,
        top_products_quantity,
    };

    tracing::debug!(
        categories = aggregates.category_revenue.len(),
        months = aggregates.monthly_sales.len(),
        products = aggregates.product_revenue.len(),
        "aggregated sales records"
    );

    aggregates
}
