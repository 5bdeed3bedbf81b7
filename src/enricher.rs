use crate::errors::DataFormatError;
use crate::loader::{Dataset, RawRecord};
use chrono::{DateTime, Datelike, Month, NaiveDate, NaiveDateTime};

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// What to do with a record whose Quantity or Price cell is empty.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum MissingValuePolicy {
    /// Keep the record with an unknown revenue. Aggregation skips unknown
    /// values, the same way a tabular library skips nulls in a sum.
    #[default]
    Propagate,

    /// Abort the run on the first missing value.
    Reject,
}

/// A sales record with its derived fields. Source fields are kept
/// alongside the derived ones.
#[derive(Clone, Debug, PartialEq)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub product: String,
    pub category: String,
    pub quantity: Option<u32>,
    pub price: Option<f64>,

    /// Quantity x Price, or None when either side is missing. Always
    /// computed here, never read from the source.
    pub revenue: Option<f64>,

    /// Calendar month, 1 through 12.
    pub month: u32,
    pub month_name: &'static str,
}

/// Tally of empty numeric cells seen during enrichment.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MissingValues {
    pub quantity: usize,
    pub price: usize,
}

impl MissingValues {
    pub fn total(&self) -> usize {
        self.quantity + self.price
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnrichedDataset {
    pub records: Vec<SalesRecord>,
    pub missing: MissingValues,
}

impl EnrichedDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parses every raw record and derives Revenue, Month and Month_Name.
///
/// The first unparseable field aborts enrichment; no partially enriched
/// dataset is ever returned.
pub fn enrich(
    dataset: &Dataset,
    policy: MissingValuePolicy,
) -> Result<EnrichedDataset, DataFormatError> {
    let mut enriched = EnrichedDataset {
        records: Vec::with_capacity(dataset.len()),
        missing: MissingValues::default(),
    };

    for (idx, raw) in dataset.records.iter().enumerate() {
        let record = enrich_record(idx + 1, raw, policy, &mut enriched.missing)?;
        enriched.records.push(record);
    }

    if enriched.missing.total() > 0 {
        tracing::warn!(
            quantity = enriched.missing.quantity,
            price = enriched.missing.price,
            "records with missing values have an unknown revenue"
        );
    }

    Ok(enriched)
}

fn enrich_record(
    row: usize,
    raw: &RawRecord,
    policy: MissingValuePolicy,
    missing: &mut MissingValues,
) -> Result<SalesRecord, DataFormatError> {
    let date = parse_date(&raw.date).ok_or_else(|| DataFormatError::InvalidDate {
        row,
        value: raw.date.clone(),
    })?;

    let quantity = parse_quantity(row, &raw.quantity)?;
    if quantity.is_none() {
        if policy == MissingValuePolicy::Reject {
            return Err(DataFormatError::MissingValue {
                row,
                column: "Quantity",
            });
        }
        missing.quantity += 1;
    }

    let price = parse_price(row, &raw.price)?;
    if price.is_none() {
        if policy == MissingValuePolicy::Reject {
            return Err(DataFormatError::MissingValue {
                row,
                column: "Price",
            });
        }
        missing.price += 1;
    }

    let revenue = match (quantity, price) {
        (Some(quantity), Some(price)) => Some(f64::from(quantity) * price),
        _ => None,
    };

    Ok(SalesRecord {
        date,
        product: raw.product.clone(),
        category: raw.category.clone(),
        quantity,
        price,
        revenue,
        month: date.month(),
        month_name: month_name(date.month()),
    })
}

/// Tries the supported calendar formats in turn, falling back to date-time
/// formats whose time part is dropped.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.date());
        }
    }

    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|datetime| datetime.date_naive())
}

/// English month name for a 1-based month number.
pub fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|month| Month::try_from(month).ok())
        .map(|month| month.name())
        .unwrap_or("Unknown")
}

fn parse_quantity(row: usize, value: &str) -> Result<Option<u32>, DataFormatError> {
    if value.is_empty() {
        return Ok(None);
    }

    match value.parse::<i64>() {
        Ok(quantity) if quantity < 0 => Err(DataFormatError::NegativeValue {
            row,
            column: "Quantity",
            value: value.to_string(),
        }),
        Ok(quantity) => u32::try_from(quantity)
            .map(Some)
            .map_err(|_| DataFormatError::InvalidNumber {
                row,
                column: "Quantity",
                value: value.to_string(),
            }),
        Err(_) => Err(DataFormatError::InvalidNumber {
            row,
            column: "Quantity",
            value: value.to_string(),
        }),
    }
}

fn parse_price(row: usize, value: &str) -> Result<Option<f64>, DataFormatError> {
    if value.is_empty() {
        return Ok(None);
    }

    let price = match value.parse::<f64>() {
        Ok(price) if price.is_finite() => price,
        _ => {
            return Err(DataFormatError::InvalidNumber {
                row,
                column: "Price",
                value: value.to_string(),
            })
        }
    };

    if price < 0.0 {
        return Err(DataFormatError::NegativeValue {
            row,
            column: "Price",
            value: value.to_string(),
        });
    }

    Ok(Some(price))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(date: &str, quantity: &str, price: &str) -> RawRecord {
        RawRecord {
            date: date.to_string(),
            product: String::from("Widget"),
            category: String::from("Accessories"),
            quantity: quantity.to_string(),
            price: price.to_string(),
        }
    }

    fn dataset(records: Vec<RawRecord>) -> Dataset {
        Dataset {
            columns: Vec::new(),
            records,
        }
    }

    #[test]
    fn should_derive_revenue_and_month_fields() {
        let enriched = enrich(
            &dataset(vec![raw("2024-03-15", "2", "10.50")]),
            MissingValuePolicy::default(),
        )
        .unwrap();

        assert_eq!(
            enriched.records[0],
            SalesRecord {
                date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
                product: String::from("Widget"),
                category: String::from("Accessories"),
                quantity: Some(2),
                price: Some(10.5),
                revenue: Some(21.0),
                month: 3,
                month_name: "March",
            }
        );
        assert_eq!(enriched.missing, MissingValues::default());
    }

    #[test]
    fn should_parse_supported_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 12, 5);
        for value in [
            "2024-12-05",
            "2024/12/05",
            "05.12.2024",
            "12/05/2024",
            "2024-12-05 13:45:00",
            "2024-12-05T13:45:00",
            "2024-12-05T13:45:00+03:00",
        ] {
            assert_eq!(parse_date(value), expected, "format {}", value);
        }
    }

    #[test]
    fn should_fail_on_unparseable_date() {
        let err = enrich(
            &dataset(vec![
                raw("2024-01-15", "1", "1.0"),
                raw("yesterday", "1", "1.0"),
            ]),
            MissingValuePolicy::default(),
        )
        .unwrap_err();

        assert_eq!(
            err,
            DataFormatError::InvalidDate {
                row: 2,
                value: String::from("yesterday"),
            }
        );
    }

    #[test]
    fn should_fail_on_non_numeric_and_negative_values() {
        let err = enrich(
            &dataset(vec![raw("2024-01-15", "two", "1.0")]),
            MissingValuePolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DataFormatError::InvalidNumber { column: "Quantity", .. }));

        let err = enrich(
            &dataset(vec![raw("2024-01-15", "-1", "1.0")]),
            MissingValuePolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DataFormatError::NegativeValue { column: "Quantity", .. }));

        let err = enrich(
            &dataset(vec![raw("2024-01-15", "1", "-0.5")]),
            MissingValuePolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DataFormatError::NegativeValue { column: "Price", .. }));

        let err = enrich(
            &dataset(vec![raw("2024-01-15", "1", "NaN")]),
            MissingValuePolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DataFormatError::InvalidNumber { column: "Price", .. }));
    }

    #[test]
    fn should_propagate_unknown_revenue_for_missing_values() {
        let enriched = enrich(
            &dataset(vec![
                raw("2024-01-15", "", "10.0"),
                raw("2024-01-16", "3", ""),
                raw("2024-01-17", "1", "4.0"),
            ]),
            MissingValuePolicy::Propagate,
        )
        .unwrap();

        assert_eq!(enriched.len(), 3);
        assert_eq!(enriched.records[0].revenue, None);
        assert_eq!(enriched.records[1].revenue, None);
        assert_eq!(enriched.records[1].quantity, Some(3));
        assert_eq!(enriched.records[2].revenue, Some(4.0));
        assert_eq!(
            enriched.missing,
            MissingValues {
                quantity: 1,
                price: 1
            }
        );
    }

    #[test]
    fn should_reject_missing_values_when_strict() {
        let err = enrich(
            &dataset(vec![raw("2024-01-15", "2", "")]),
            MissingValuePolicy::Reject,
        )
        .unwrap_err();

        assert_eq!(
            err,
            DataFormatError::MissingValue {
                row: 1,
                column: "Price"
            }
        );
    }

    #[test]
    fn should_enrich_empty_dataset() {
        let enriched = enrich(&Dataset::default(), MissingValuePolicy::default()).unwrap();
        assert!(enriched.is_empty());
    }

    #[test]
    fn should_name_every_month() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(13), "Unknown");
    }
}
