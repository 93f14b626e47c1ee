//! Price text normalization
//!
//! Storefront prices arrive as display text (`€1.234,56`, `$1,234.56`,
//! `48,00 €`). [`parse_price`] resolves the separator ambiguity into a
//! single value; the `find_*` helpers locate amounts inside longer text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{Error, Result};

static AMOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?\d(?:[\d.,]*\d)?").expect("static amount pattern"));

static MONEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[€$£¥]\s*-?\d(?:[\d.,]*\d)?|-?\d(?:[\d.,]*\d)?\s*(?:[€$£¥]|\b(?:EUR|USD|GBP)\b)")
        .expect("static money pattern")
});

/// Parse a display price into a number.
///
/// Everything except digits, `.`, `,` and a leading minus is dropped. When
/// both separators occur, the last one is the decimal separator and the other
/// groups thousands. A lone `,` is a decimal separator. A separator repeated
/// with no other separator present only groups thousands.
pub fn parse_price(raw: &str) -> Result<f64> {
    let mut cleaned = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '0'..='9' | '.' | ',' => cleaned.push(c),
            '-' if cleaned.is_empty() => cleaned.push(c),
            _ => {}
        }
    }

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return Err(Error::parse(raw, "no digits"));
    }

    let normalized: String = match (cleaned.rfind('.'), cleaned.rfind(',')) {
        (Some(dot), Some(comma)) => {
            let (decimal, thousands) = if dot > comma { ('.', ',') } else { (',', '.') };
            cleaned
                .chars()
                .filter(|c| *c != thousands)
                .map(|c| if c == decimal { '.' } else { c })
                .collect()
        }
        (None, Some(_)) if cleaned.matches(',').count() == 1 => cleaned.replace(',', "."),
        (None, Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) if cleaned.matches('.').count() > 1 => cleaned.replace('.', ""),
        _ => cleaned,
    };

    let value: f64 = normalized
        .parse()
        .map_err(|_| Error::parse(raw, format!("{normalized:?} is not a number")))?;

    if !value.is_finite() {
        return Err(Error::parse(raw, "not a finite number"));
    }

    Ok(value)
}

/// First amount-looking substring (digits with inner separators)
pub fn find_amount(text: &str) -> Option<&str> {
    AMOUNT_RE.find(text).map(|m| m.as_str())
}

/// First substring that carries a currency marker next to an amount
pub fn find_money(text: &str) -> Option<&str> {
    MONEY_RE.find(text).map(|m| m.as_str())
}

/// Locate the first amount in `text` and parse it
pub fn parse_amount_in(text: &str) -> Result<f64> {
    let amount = find_amount(text).ok_or_else(|| Error::parse(text, "no amount in text"))?;
    parse_price(amount)
}
