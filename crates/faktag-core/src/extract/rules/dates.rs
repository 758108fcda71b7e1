//! Date extraction and normalization for Polish invoices.

use chrono::NaiveDate;
use regex::Regex;

use super::patterns::{
    DATE_DMY, DATE_POLISH_LONG, DATE_YMD, DUE_DATE, IDENTIFIER_LINE, ISSUE_DATE,
};
use super::{ExtractionMatch, FieldExtractor};

/// Date field extractor.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    /// All valid calendar dates in order of appearance.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        // DD.MM.YYYY, DD/MM/YY, DD-MM-YYYY
        for caps in DATE_DMY.captures_iter(text) {
            let date = parse_parts(parse_year(&caps[3]), &caps[2], &caps[1]);
            push_match(&mut results, date, caps.get(0), 0.9);
        }

        // YYYY-MM-DD, YYYY.MM.DD
        for caps in DATE_YMD.captures_iter(text) {
            let date = caps[1]
                .parse()
                .ok()
                .and_then(|year| parse_parts(year, &caps[2], &caps[3]));
            push_match(&mut results, date, caps.get(0), 0.9);
        }

        // "15 stycznia 2024"
        for caps in DATE_POLISH_LONG.captures_iter(text) {
            let date = caps[3].parse().ok().and_then(|year| {
                let month = polish_month_to_number(&caps[2]);
                caps[1]
                    .parse()
                    .ok()
                    .and_then(|day| NaiveDate::from_ymd_opt(year, month, day))
            });
            push_match(&mut results, date, caps.get(0), 0.95);
        }

        results.sort_by_key(|m| m.position.map(|(start, _)| start).unwrap_or(usize::MAX));
        results
    }
}

fn push_match(
    results: &mut Vec<ExtractionMatch<NaiveDate>>,
    date: Option<NaiveDate>,
    full: Option<regex::Match<'_>>,
    confidence: f32,
) {
    let (Some(date), Some(full)) = (date, full) else {
        return;
    };

    results.push(
        ExtractionMatch::new(date, confidence, full.as_str())
            .with_position(full.start(), full.end()),
    );
}

fn parse_parts(year: i32, month: &str, day: &str) -> Option<NaiveDate> {
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Issue and due dates of an invoice, as `DD.MM.YYYY`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceDates {
    /// Issue date (data wystawienia).
    pub issue_date: Option<String>,
    /// Due date (termin płatności).
    pub due_date: Option<String>,
}

/// Extract labeled dates, falling back to the first bare date in the header.
pub fn extract_dates(text: &str, header_lines: usize) -> InvoiceDates {
    let extractor = DateExtractor::new();

    let mut result = InvoiceDates {
        issue_date: labeled_date(&ISSUE_DATE, text),
        due_date: labeled_date(&DUE_DATE, text),
    };

    if result.issue_date.is_none() {
        result.issue_date = text
            .lines()
            .take(header_lines)
            .filter(|line| !IDENTIFIER_LINE.is_match(line) && !DUE_DATE.is_match(line))
            .find_map(|line| extractor.extract(line))
            .map(|m| format_date(m.value));
    }

    result
}

fn labeled_date(label: &Regex, text: &str) -> Option<String> {
    let extractor = DateExtractor::new();
    label
        .captures_iter(text)
        .find_map(|caps| extractor.extract(&caps[1]))
        .map(|m| format_date(m.value))
}

/// Normalize any supported date notation to `DD.MM.YYYY`.
///
/// Idempotent: an already canonical date is returned unchanged.
pub fn normalize_date(s: &str) -> Option<String> {
    DateExtractor::new().extract(s).map(|m| format_date(m.value))
}

/// Format a date as `DD.MM.YYYY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// Parse a canonical `DD.MM.YYYY` string.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%d.%m.%Y").ok()
}

fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if s.len() <= 2 {
        // Two-digit year: 00-50 is 20xx, 51-99 is 19xx
        if year <= 50 { 2000 + year } else { 1900 + year }
    } else {
        year
    }
}

fn polish_month_to_number(month: &str) -> u32 {
    match month.to_lowercase().as_str() {
        "stycznia" => 1,
        "lutego" => 2,
        "marca" => 3,
        "kwietnia" => 4,
        "maja" => 5,
        "czerwca" => 6,
        "lipca" => 7,
        "sierpnia" => 8,
        "września" => 9,
        "października" => 10,
        "listopada" => 11,
        "grudnia" => 12,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_variants_agree() {
        let expected = Some("05.03.2024".to_string());
        assert_eq!(normalize_date("05.03.2024"), expected);
        assert_eq!(normalize_date("2024-03-05"), expected);
        assert_eq!(normalize_date("2024.03.05"), expected);
        assert_eq!(normalize_date("5/3/24"), expected);
        assert_eq!(normalize_date("05-03-24"), expected);
        assert_eq!(normalize_date("5 marca 2024"), expected);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in ["31.12.1999", "2024-02-29", "1.1.51", "15 stycznia 2024"] {
            let once = normalize_date(input).unwrap();
            assert_eq!(normalize_date(&once), Some(once.clone()));
        }
    }

    #[test]
    fn test_two_digit_year_pivot() {
        assert_eq!(normalize_date("01.01.50").as_deref(), Some("01.01.2050"));
        assert_eq!(normalize_date("01.01.51").as_deref(), Some("01.01.1951"));
    }

    #[test]
    fn test_invalid_calendar_date_rejected() {
        assert_eq!(normalize_date("31.02.2024"), None);
        assert_eq!(normalize_date("2023-02-29"), None);
        assert_eq!(normalize_date("no date here"), None);
    }

    #[test]
    fn test_extract_labeled_dates() {
        let text = "Faktura VAT nr FV/001/2024\n\
                    Data wystawienia: 2024-01-15\n\
                    Data sprzedaży: 10.01.2024\n\
                    Termin płatności: 29.01.2024\n";

        let dates = extract_dates(text, 15);
        assert_eq!(dates.issue_date.as_deref(), Some("15.01.2024"));
        assert_eq!(dates.due_date.as_deref(), Some("29.01.2024"));
    }

    #[test]
    fn test_due_date_without_date_is_absent() {
        let dates = extract_dates("Termin płatności: 14 dni", 15);
        assert_eq!(dates.due_date, None);
    }

    #[test]
    fn test_issue_date_header_fallback_skips_identifiers() {
        let text = "Acme Sp. z o.o.\nTel. 22-10-2024\nWarszawa, 03.02.2024\nNabywca: Foo";
        let dates = extract_dates(text, 15);
        assert_eq!(dates.issue_date.as_deref(), Some("03.02.2024"));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("15.01.2024"), NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(parse_date("2024-01-15"), None);
    }
}
