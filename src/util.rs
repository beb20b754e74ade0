// Utility helpers for parsing cells and rendering numbers.
//
// Everything that turns a raw value into display text lives here so the
// metric and report code only deals with typed values.
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use num_format::{Locale, ToFormattedString};

/// Parse a text cell into `f64`, forgiving the usual spreadsheet noise.
///
/// - Trims whitespace and strips thousands separators.
/// - Rejects anything with alphabetic characters other than an exponent.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s
        .chars()
        .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
    {
        return None;
    }
    s.replace(',', "").parse::<f64>().ok()
}

/// Parse a text cell holding a timestamp. Date-only values land on midnight.
pub fn parse_datetime_safe(s: Option<&str>) -> Option<NaiveDateTime> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y/%m/%d %H:%M",
        "%d/%m/%Y %H:%M",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .map(|d| d.and_time(NaiveTime::MIN))
}

pub fn format_datetime(dt: &NaiveDateTime) -> String {
    if dt.num_seconds_from_midnight() == 0 {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Shortest round-trip text for a float, always carrying a decimal part
/// (`95.0`, `97.46`), which is how the dashboard has always printed ratios.
pub fn float_repr(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    format!("{:?}", v)
}

/// Numbers as a spreadsheet user expects them: integral values without a
/// decimal part (SR numbers, counts), everything else as `float_repr`.
pub fn format_plain_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        float_repr(v)
    }
}

/// Round half to even at `decimals` places.
pub fn round_half_even(v: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (v * scale).round_ties_even() / scale
}

/// Ratio to a rounded percentage value plus its display text (`0.95` -> `95.0%`).
pub fn ratio_to_percent(ratio: f64) -> (f64, String) {
    let pct = round_half_even(ratio * 100.0, 2);
    (pct, format!("{}%", float_repr(pct)))
}

/// Fixed two-decimal percentage (`0.8765` -> `87.65%`).
pub fn percent_2dp(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Counts on the console get thousands separators (`1,204 incidents`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_keeps_one_decimal_for_whole_values() {
        assert_eq!(ratio_to_percent(0.95).1, "95.0%");
        assert_eq!(ratio_to_percent(0.98).1, "98.0%");
        assert_eq!(ratio_to_percent(1.0).1, "100.0%");
    }

    #[test]
    fn percent_rounds_to_two_places() {
        let (value, text) = ratio_to_percent(0.974561);
        assert_eq!(text, "97.46%");
        assert!((value - 97.46).abs() < 1e-9);
    }

    #[test]
    fn fixed_percent_has_two_decimals() {
        assert_eq!(percent_2dp(0.8765), "87.65%");
        assert_eq!(percent_2dp(1.0), "100.00%");
    }

    #[test]
    fn parse_f64_handles_noise() {
        assert_eq!(parse_f64_safe(Some(" 1,234.5 ")), Some(1234.5));
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn parse_datetime_accepts_date_only() {
        let dt = parse_datetime_safe(Some("2023-05-04")).unwrap();
        assert_eq!(format_datetime(&dt), "2023-05-04");
        let dt = parse_datetime_safe(Some("2023-05-04 08:15:00")).unwrap();
        assert_eq!(format_datetime(&dt), "2023-05-04 08:15:00");
    }

    #[test]
    fn plain_numbers_drop_integral_decimals() {
        assert_eq!(format_plain_number(12345.0), "12345");
        assert_eq!(format_plain_number(0.5), "0.5");
    }

    #[test]
    fn format_int_groups_thousands() {
        assert_eq!(format_int(1234567usize), "1,234,567");
    }
}
