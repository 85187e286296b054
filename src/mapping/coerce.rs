//! Cell value coercion.
//!
//! Payroll sheets mix native numbers with numbers typed as text in several
//! locales: `1,234.50`, `1.234,50`, `1500,75`, Arabic-Indic digits with `٫`
//! as decimal separator, and currency decorations. Identifiers are strings
//! whose leading zeros matter.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use crate::models::Cell;

/// Result of reading a numeric cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Numeric {
    /// Blank cell.
    Blank,
    /// Text that does not look like a number.
    NotNumeric,
    /// A parsed value, possibly negative.
    Value(Decimal),
}

/// Currency and unit decorations stripped from numeric text.
const AFFIXES: &[&str] = &["usd", "try", "tl", "us$", "$", "₺", "ل.س", "ل س"];

/// Reads a numeric cell.
///
/// # Example
///
/// ```
/// use payroll_engine::mapping::{coerce_numeric, Numeric};
/// use payroll_engine::models::Cell;
/// use rust_decimal::Decimal;
///
/// let cell = Cell::Text("1.234,50".to_string());
/// assert_eq!(coerce_numeric(&cell), Numeric::Value(Decimal::new(123450, 2)));
/// assert_eq!(coerce_numeric(&Cell::Text("n/a".to_string())), Numeric::NotNumeric);
/// ```
pub fn coerce_numeric(cell: &Cell) -> Numeric {
    match cell {
        Cell::Empty => Numeric::Blank,
        Cell::Number(f) => decimal_from_f64(*f).map_or(Numeric::NotNumeric, Numeric::Value),
        Cell::Text(s) if s.trim().is_empty() => Numeric::Blank,
        Cell::Text(s) => parse_decimal_text(s).map_or(Numeric::NotNumeric, Numeric::Value),
    }
}

/// Reads a cell as a positive integer, as used for grades and steps.
pub fn coerce_positive_int(cell: &Cell) -> Option<u32> {
    match coerce_numeric(cell) {
        Numeric::Value(d) if d > Decimal::ZERO && d.fract().is_zero() => {
            u32::from_str(&d.trunc().normalize().to_string()).ok()
        }
        _ => None,
    }
}

/// Reads an identifier, preserving leading zeros of text cells.
///
/// Integral numeric cells are rendered without a fractional part. Arabic-Indic
/// digits are folded to ASCII. Returns `None` for blank cells.
pub fn coerce_identifier(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Empty => None,
        Cell::Number(f) => {
            let rendered = match decimal_from_f64(*f) {
                Some(d) => d.normalize().to_string(),
                None => f.to_string(),
            };
            Some(rendered)
        }
        Cell::Text(s) => {
            let folded: String = s.trim().chars().map(fold_digit).collect();
            (!folded.is_empty()).then_some(folded)
        }
    }
}

/// Reads a display name, collapsing internal whitespace. Returns `None` for
/// blank cells.
pub fn coerce_name(cell: &Cell) -> Option<String> {
    let raw = match cell {
        Cell::Empty => return None,
        Cell::Number(f) => f.to_string(),
        Cell::Text(s) => s.clone(),
    };
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

/// Converts a float through its shortest round-trip text so that `0.1`
/// becomes exactly `0.1`.
fn decimal_from_f64(f: f64) -> Option<Decimal> {
    if !f.is_finite() {
        return None;
    }
    Decimal::from_str(&f.to_string())
        .ok()
        .or_else(|| Decimal::from_f64(f))
}

fn fold_digit(ch: char) -> char {
    match ch {
        '\u{0660}'..='\u{0669}' => char::from(b'0' + (ch as u32 - 0x0660) as u8),
        '\u{06F0}'..='\u{06F9}' => char::from(b'0' + (ch as u32 - 0x06F0) as u8),
        '٫' => '.',
        '٬' => ',',
        c => c,
    }
}

/// Parses locale-formatted numeric text.
pub(crate) fn parse_decimal_text(raw: &str) -> Option<Decimal> {
    let arabic_decimal = raw.contains('٫');
    let mut text: String = raw
        .chars()
        .map(fold_digit)
        .filter(|c| !matches!(c, ' ' | '\u{00A0}' | '\u{202F}' | '\'' | '\u{200F}' | '\u{200E}'))
        .collect::<String>()
        .to_lowercase();

    let mut negative = false;
    if text.starts_with('(') && text.ends_with(')') && text.len() >= 2 {
        negative = true;
        text = text[1..text.len() - 1].to_string();
    }

    loop {
        let before = text.len();
        for affix in AFFIXES {
            if let Some(rest) = text.strip_prefix(affix) {
                text = rest.to_string();
            }
            if let Some(rest) = text.strip_suffix(affix) {
                text = rest.to_string();
            }
        }
        if text.len() == before {
            break;
        }
    }

    if let Some(rest) = text.strip_prefix('-') {
        negative = !negative;
        text = rest.to_string();
    } else if let Some(rest) = text.strip_prefix('+') {
        text = rest.to_string();
    }

    if !text.chars().any(|c| c.is_ascii_digit())
        || !text.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
    {
        return None;
    }

    let canonical = resolve_separators(&text, arabic_decimal)?;
    let value = Decimal::from_str(&canonical).ok()?;
    Some(if negative { -value } else { value })
}

/// Rewrites digits-and-separators text with `.` as the only separator.
///
/// With both separators present the last one is decimal. With one kind only,
/// repeated occurrences are grouping and a single occurrence is decimal,
/// except in the shape `1,234` / `12.500` (one to three leading digits without
/// a leading zero, exactly three trailing digits), which is grouping. The
/// Arabic decimal sign `٫` is always decimal.
fn resolve_separators(text: &str, arabic_decimal: bool) -> Option<String> {
    let last_dot = text.rfind('.');
    let last_comma = text.rfind(',');

    let decimal_sep = match (last_dot, last_comma) {
        (Some(d), Some(c)) => Some(if d > c { '.' } else { ',' }),
        (Some(_), None) if arabic_decimal => Some('.'),
        (Some(at), None) => single_decimal(text, '.', at),
        (None, Some(at)) => single_decimal(text, ',', at),
        (None, None) => None,
    };

    let mut out = String::with_capacity(text.len() + 1);
    let mut seen_decimal = false;
    for c in text.chars() {
        match c {
            '.' | ',' if Some(c) == decimal_sep => {
                if seen_decimal {
                    return None;
                }
                seen_decimal = true;
                out.push('.');
            }
            '.' | ',' => {}
            d => out.push(d),
        }
    }

    if out.starts_with('.') {
        out.insert(0, '0');
    }
    if out.ends_with('.') {
        out.pop();
    }
    Some(out)
}

fn single_decimal(text: &str, sep: char, at: usize) -> Option<char> {
    if text.matches(sep).count() != 1 {
        return None;
    }
    let (int_part, frac_part) = (&text[..at], &text[at + 1..]);
    let grouped = (1..=3).contains(&int_part.len())
        && !int_part.starts_with('0')
        && frac_part.len() == 3;
    (!grouped).then_some(sep)
}
