use chrono::NaiveDateTime;

/// `$` prefix, two decimals, no thousands separator: 550.0 -> "$550.00".
///
/// Rounding follows the standard float formatter, so 0.00055 shows as
/// "$0.00".
pub fn currency(amount: f64) -> String {
    format!("${amount:.2}")
}

/// "05 JUN, 2024"
pub fn invoice_date(date: &NaiveDateTime) -> String {
    date.format("%d %b, %Y").to_string().to_uppercase()
}
