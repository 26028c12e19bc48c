//! Rupee and date label formatting

/// Inserts `,` every three digits of a non-negative integer string.
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Formats `value` with thousands separators and `decimals` fractional digits.
pub fn format_grouped(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };
    // `-0.00` is not worth a sign.
    let negative = value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0');

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Axis formatter: whole rupees from 1000 up, paisa below.
pub fn format_rupees(value: f64) -> String {
    if value >= 1000.0 {
        format!("Rs {}", format_grouped(value, 0))
    } else {
        format!("Rs {}", format_grouped(value, 2))
    }
}

/// Annotation formatter: always two decimals.
pub fn format_rupees_precise(value: f64) -> String {
    format!("Rs {}", format_grouped(value, 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_formatter() {
        assert_eq!(format_rupees(12345.4), "Rs 12,345");
        assert_eq!(format_rupees(1000.0), "Rs 1,000");
        assert_eq!(format_rupees(999.994), "Rs 999.99");
        assert_eq!(format_rupees(12.346), "Rs 12.35");
        assert_eq!(format_rupees(0.0), "Rs 0.00");
        assert_eq!(format_rupees(1234567.8), "Rs 1,234,568");
    }

    #[test]
    fn test_annotation_formatter() {
        assert_eq!(format_rupees_precise(12870.0), "Rs 12,870.00");
        assert_eq!(format_rupees_precise(13130.456), "Rs 13,130.46");
        assert_eq!(format_rupees_precise(987.5), "Rs 987.50");
    }

    #[test]
    fn test_negative_values() {
        assert_eq!(format_grouped(-1234.5, 1), "-1,234.5");
        assert_eq!(format_grouped(-0.001, 2), "0.00");
    }
}
