/// Formats an amount with thousands separators and no decimals, the way
/// revenue is shown in the report and on chart labels.
///
/// ```
/// use sales_analysis::format::format_amount;
///
/// assert_eq!(format_amount(1234567.4), "1,234,567");
/// assert_eq!(format_amount(999.5), "1,000");
/// assert_eq!(format_amount(-2500.0), "-2,500");
/// ```
pub fn format_amount(value: f64) -> String {
    let rounded = value.round();
    let grouped = group_thousands(&(rounded.abs() as u64).to_string());

    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Share of `part` in `whole` as a percentage; zero when `whole` is zero.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    part / whole * 100.0
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_group_thousands() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(999.0), "999");
        assert_eq!(format_amount(1000.0), "1,000");
        assert_eq!(format_amount(123456.0), "123,456");
        assert_eq!(format_amount(30.0), "30");
    }

    #[test]
    fn should_not_divide_by_zero() {
        assert_eq!(percentage(5.0, 0.0), 0.0);
        assert_eq!(percentage(25.0, 200.0), 12.5);
    }
}
