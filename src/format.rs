// Display formatting for report cells.
//
// Everything renders in the single `en` locale: `,` thousands separators,
// `.` decimal point, US dollar currency.
use num_format::{Locale, ToFormattedString};

/// Marker appended to labels cut by [`truncate_label`].
pub const ELLIPSIS: &str = "...";

/// Display classes cycled through by rank position.
pub const PALETTE: [&str; 7] = [
    "primary",
    "success",
    "info",
    "warning",
    "danger",
    "secondary",
    "dark",
];

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    // First, format to a plain fixed-decimal string like `1234567.89`.
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Use `num-format` to insert commas into the integer portion.
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg && res.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", res)
    } else {
        res
    }
}

/// Thousands-grouped integer, rounding any fraction (`1234.6` -> `1,235`).
pub fn format_int(n: f64) -> String {
    format_number(n, 0)
}

/// Whole-dollar currency (`$125,000`, `-$3,200`).
pub fn format_currency(n: f64) -> String {
    let grouped = format_number(n.abs(), 0);
    if n < 0.0 && grouped != "0" {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Percentage with one decimal place (`66.7%`).
pub fn format_percent(p: f64) -> String {
    format!("{}%", format_number(p, 1))
}

/// Cut `label` to `width` characters and append [`ELLIPSIS`] when it is
/// longer than that; shorter labels pass through untouched.
pub fn truncate_label(label: &str, width: usize) -> String {
    match label.char_indices().nth(width) {
        Some((cut, _)) => format!("{}{}", &label[..cut], ELLIPSIS),
        None => label.to_string(),
    }
}

/// Display class for the entry at zero-based `index`.
pub fn palette_class(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn integers_are_grouped() {
        assert_eq!(format_int(0.0), "0");
        assert_eq!(format_int(1234567.0), "1,234,567");
        assert_eq!(format_int(999.6), "1,000");
    }

    #[test]
    fn numbers_keep_fixed_decimals() {
        assert_eq!(format_number(1234.5, 2), "1,234.50");
        assert_eq!(format_number(-9876.14, 1), "-9,876.1");
        assert_eq!(format_number(-0.01, 1), "0.0");
    }

    #[test]
    fn currency_has_no_decimals() {
        assert_eq!(format_currency(125000.0), "$125,000");
        assert_eq!(format_currency(99999.7), "$100,000");
        assert_eq!(format_currency(-3200.0), "-$3,200");
        assert_eq!(format_currency(0.0), "$0");
    }

    #[test]
    fn percent_has_one_decimal() {
        assert_eq!(format_percent(200.0 / 3.0), "66.7%");
        assert_eq!(format_percent(100.0 / 3.0), "33.3%");
        assert_eq!(format_percent(0.0), "0.0%");
        assert_eq!(format_percent(100.0), "100.0%");
    }

    #[test]
    fn labels_are_cut_to_width_with_ellipsis() {
        assert_eq!(truncate_label("Senior Software Engineer II", 20), "Senior Software Engi...");
        assert_eq!(truncate_label("Data Engineer", 20), "Data Engineer");
        assert_eq!(truncate_label("exactly-twenty-chars", 20), "exactly-twenty-chars");
        assert_eq!(truncate_label("Ingénieur logiciel principal", 10), "Ingénieur ...");
    }

    #[test]
    fn palette_cycles_by_index() {
        assert_eq!(palette_class(0), "primary");
        assert_eq!(palette_class(6), "dark");
        assert_eq!(palette_class(7), "primary");
    }
}
