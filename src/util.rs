// Parsing and small numeric helpers.
//
// Everything that touches raw CSV cell text or human-facing number formatting
// lives here so the pipeline stages can work with typed `Value`s.
use num_format::{Locale, ToFormattedString};

/// Parse a CSV cell into a finite `f64`.
///
/// - Trims whitespace.
/// - Returns `None` for empty cells.
/// - Rejects `NaN` and infinities, which `str::parse` would otherwise accept.
/// - Does not strip thousands separators: county exports use `,` as the
///   decimal mark often enough that guessing would corrupt values.
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Cell texts read as missing values, the set pandas' `read_csv` uses.
const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// True when a cleaned cell is one of the usual missing-value markers.
pub fn is_missing_marker(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell)
}

/// Strip a leading UTF-8 byte order mark and surrounding whitespace.
pub fn clean_cell(raw: &str) -> &str {
    raw.trim_start_matches('\u{feff}').trim()
}

/// Arithmetic mean skipping missing values; `None` when nothing is present.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0f64, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with `en` thousands separators, e.g. `1,234,567.89`.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let sep = Locale::en.separator();
    let mut res = String::with_capacity(int_part.len() * 4 / 3 + 4);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            res.push_str(sep);
        }
        res.push(ch);
    }
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_rejects_non_finite_and_text() {
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("Cluj"), None);
        assert_eq!(parse_number("12,5"), None);
    }

    #[test]
    fn missing_markers() {
        for cell in ["NA", "N/A", "NaN", "nan", "null", "None", "#N/A", "<NA>"] {
            assert!(is_missing_marker(cell), "{cell}");
        }
        assert!(!is_missing_marker("Nana"));
        assert!(!is_missing_marker("0"));
    }

    #[test]
    fn mean_skips_missing() {
        assert_eq!(mean([Some(10.0), None, Some(20.0)]), Some(15.0));
        assert_eq!(mean([None, None]), None);
        assert_eq!(mean(Vec::<Option<f64>>::new()), None);
    }

    #[test]
    fn formats_with_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-0.5, 1), "-0.5");
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(2e19, 0), "20,000,000,000,000,000,000");
        assert_eq!(format_number(-1.5e20, 1), "-150,000,000,000,000,000,000.0");
        assert_eq!(format_int(9855u64), "9,855");
    }
}
