//! ISO 8601 duration tokenizer shared by the period, duration and interval parsers
//!
//! Accepts `[-]P[nY][nM][nW][nD][T[nH][nM][n.nS]]`, case-insensitive, with
//! optional signs on each component. Units must appear in order and at most once.

use crate::{CadenceError, CadenceResult};

pub(crate) const NANOS_PER_SECOND: i128 = 1_000_000_000;
pub(crate) const NANOS_PER_MINUTE: i128 = NANOS_PER_SECOND * 60;
pub(crate) const NANOS_PER_HOUR: i128 = NANOS_PER_MINUTE * 60;
pub(crate) const NANOS_PER_DAY: i128 = NANOS_PER_HOUR * 24;

const DATE_UNITS: &str = "YMWD";
const TIME_UNITS: &str = "HMS";

/// One `<number><unit>` component
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Component<'a> {
    pub number: &'a str,
    pub unit: char,
}

/// A tokenized ISO 8601 duration, split at the `T` designator
#[derive(Debug, Default)]
pub(crate) struct IsoParts<'a> {
    /// Leading `-` before the `P`
    pub negative: bool,
    pub date: Vec<Component<'a>>,
    pub time: Vec<Component<'a>>,
}

pub(crate) fn tokenize(input: &str) -> CadenceResult<IsoParts<'_>> {
    let text = input.trim();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let body = rest
        .strip_prefix('P')
        .or_else(|| rest.strip_prefix('p'))
        .ok_or_else(|| CadenceError::parse(input, "expected leading 'P'"))?;

    let mut parts = IsoParts {
        negative,
        ..IsoParts::default()
    };
    let mut in_time = false;
    let mut last_rank: Option<usize> = None;
    let mut number_start = 0;

    for (idx, ch) in body.char_indices() {
        if ch.is_ascii_digit() || matches!(ch, '.' | ',' | '-' | '+') {
            continue;
        }
        let unit = ch.to_ascii_uppercase();
        let number = &body[number_start..idx];
        number_start = idx + ch.len_utf8();

        if unit == 'T' {
            if in_time || !number.is_empty() {
                return Err(CadenceError::parse(input, "misplaced 'T' designator"));
            }
            in_time = true;
            last_rank = None;
            continue;
        }
        if number.is_empty() {
            return Err(CadenceError::parse(input, format!("unit '{ch}' has no value")));
        }

        let units = if in_time { TIME_UNITS } else { DATE_UNITS };
        let rank = units
            .find(unit)
            .ok_or_else(|| CadenceError::parse(input, format!("unexpected unit '{ch}'")))?;
        if last_rank.is_some_and(|last| rank <= last) {
            return Err(CadenceError::parse(input, format!("unit '{ch}' out of order")));
        }
        last_rank = Some(rank);

        let component = Component { number, unit };
        if in_time {
            parts.time.push(component);
        } else {
            parts.date.push(component);
        }
    }

    if number_start < body.len() {
        return Err(CadenceError::parse(input, "trailing value without a unit"));
    }
    if in_time && parts.time.is_empty() {
        return Err(CadenceError::parse(input, "'T' designator without time components"));
    }
    if parts.date.is_empty() && parts.time.is_empty() {
        return Err(CadenceError::parse(input, "no components"));
    }
    Ok(parts)
}

/// Parse a whole-number component value
pub(crate) fn parse_integer(input: &str, number: &str) -> CadenceResult<i64> {
    number
        .parse::<i64>()
        .map_err(|e| CadenceError::parse(input, format!("bad value {number:?}: {e}")))
}

/// Parse a seconds value with up to nine fractional digits into nanoseconds
pub(crate) fn parse_seconds_nanos(input: &str, number: &str) -> CadenceResult<i128> {
    let (negative, unsigned) = match number.as_bytes().first() {
        Some(b'-') => (true, &number[1..]),
        Some(b'+') => (false, &number[1..]),
        _ => (false, number),
    };
    let (whole, fraction) = match unsigned.find(|c: char| c == '.' || c == ',') {
        Some(pos) => (&unsigned[..pos], Some(&unsigned[pos + 1..])),
        None => (unsigned, None),
    };

    let bad = || CadenceError::parse(input, format!("bad seconds value {number:?}"));
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    let secs: i128 = whole.parse().map_err(|_| bad())?;

    let frac_nanos: i128 = match fraction {
        None => 0,
        Some(digits) => {
            if digits.is_empty() || digits.len() > 9 || !digits.bytes().all(|b| b.is_ascii_digit())
            {
                return Err(bad());
            }
            format!("{digits:0<9}").parse().map_err(|_| bad())?
        }
    };

    let nanos = secs
        .checked_mul(NANOS_PER_SECOND)
        .and_then(|n| n.checked_add(frac_nanos))
        .ok_or_else(bad)?;
    Ok(if negative { -nanos } else { nanos })
}
