// SPDX-License-Identifier: AGPL-3.0-or-later
//! Date value parsing

use crate::model::{DatePrecision, StructuredDate};

const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Convert a date token sequence (`12 JAN 1900`, `JAN 1900`, `1900`) into a
/// precision-tagged date. Unrecognised shapes yield `DatePrecision::Unknown`
/// with every numeric field unset; the original text is always kept.
pub fn parse_date(text: &str) -> StructuredDate {
    let tokens: Vec<&str> = text.split_whitespace().collect();

    let parsed = match tokens.as_slice() {
        [day, month, year] => parse_year(year).and_then(|y| {
            let m = month_number(month)?;
            let d = day.parse::<u32>().ok().filter(|d| (1..=31).contains(d))?;
            Some((y, Some(m), Some(d), DatePrecision::Day))
        }),
        [month, year] => parse_year(year)
            .and_then(|y| month_number(month).map(|m| (y, Some(m), None, DatePrecision::Month))),
        [year] => parse_year(year).map(|y| (y, None, None, DatePrecision::Year)),
        _ => None,
    };

    let Some((year, month, day, precision)) = parsed else {
        return StructuredDate {
            original: text.to_string(),
            ..StructuredDate::default()
        };
    };

    let approx_iso = format!(
        "{:04}-{:02}-{:02}",
        year,
        month.unwrap_or(1),
        day.unwrap_or(1)
    );
    let exact_iso = (precision == DatePrecision::Day).then(|| approx_iso.clone());

    StructuredDate {
        original: text.to_string(),
        year: Some(year),
        month,
        day,
        precision,
        exact_iso,
        approx_iso: Some(approx_iso),
    }
}

fn parse_year(token: &str) -> Option<i32> {
    token.parse::<i32>().ok().filter(|y| (0..=9999).contains(y))
}

fn month_number(token: &str) -> Option<u32> {
    MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(token))
        .map(|i| i as u32 + 1)
}
