use std::fmt::Write;

use chrono::format::{ParseResult, Parsed, StrftimeItems, parse_and_remainder};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::aideon::tablediff::model::FieldTransform;

/// Placeholder exported for cells that carry no value.
pub const NULL_SENTINEL: &str = "?";
/// Literal used once a null placeholder has been normalised.
pub const NULL_LITERAL: &str = "null";
/// Prefix of the marker stored in place of dates that fail to parse.
pub const INVALID_DATE_MARKER: &str = "[invalid date]";

/// moment-style tokens and their strftime counterparts, longest first so that
/// `YYYY` wins over `YY` and `MMMM` over `MM`.
const DATE_TOKENS: &[(&str, &str)] = &[
    ("YYYY", "%Y"),
    ("DDDD", "%j"),
    ("MMMM", "%B"),
    ("dddd", "%A"),
    ("MMM", "%b"),
    ("ddd", "%a"),
    ("DDD", "%-j"),
    ("SSS", "%3f"),
    ("YY", "%y"),
    ("MM", "%m"),
    ("DD", "%d"),
    ("HH", "%H"),
    ("hh", "%I"),
    ("mm", "%M"),
    ("ss", "%S"),
    ("ZZ", "%z"),
    ("M", "%-m"),
    ("D", "%-d"),
    ("H", "%-H"),
    ("h", "%-I"),
    ("m", "%-M"),
    ("s", "%-S"),
    ("A", "%p"),
    ("a", "%P"),
    ("Z", "%:z"),
];

impl FieldTransform {
    /// Applies the transform to a single trimmed cell value.
    pub fn apply(&self, value: &str) -> String {
        match self {
            FieldTransform::Date { from, to } => {
                if value == NULL_SENTINEL || value == NULL_LITERAL {
                    return value.to_string();
                }
                match reformat_date(value, from, to) {
                    Some(formatted) => format!("{value} - {formatted}"),
                    None => format!("{INVALID_DATE_MARKER} {value} - Invalid date"),
                }
            }
            FieldTransform::CheckNull => {
                if value == NULL_SENTINEL {
                    NULL_LITERAL.to_string()
                } else {
                    value.to_string()
                }
            }
        }
    }
}

/// Parses `value` with the moment-style pattern `from` and renders it with
/// `to`. Returns `None` when parsing or rendering fails.
pub fn reformat_date(value: &str, from: &str, to: &str) -> Option<String> {
    let parsed = parse_date(value, from)?;
    let pattern = moment_to_strftime(to);
    let mut rendered = String::new();
    // Offset items cannot be rendered from a naive timestamp.
    write!(rendered, "{}", parsed.format(&pattern)).ok()?;
    Some(rendered)
}

/// Parses a date leniently. Any non-alphanumeric character in `value`
/// matches any separator in `pattern`, and input left over once the pattern
/// is exhausted is ignored. Missing units are completed: leading date units
/// come from today, the rest default to the first month, the first day and
/// midnight.
pub fn parse_date(value: &str, pattern: &str) -> Option<NaiveDateTime> {
    parse_date_on(value, pattern, Local::now().date_naive())
}

fn parse_date_on(value: &str, pattern: &str, today: NaiveDate) -> Option<NaiveDateTime> {
    let format = translate(pattern, Separators::Loose);
    let value = loosen_separators(value);
    let mut parsed = Parsed::new();
    parse_and_remainder(&mut parsed, &value, StrftimeItems::new(&format)).ok()?;
    complete_date(&mut parsed, today).ok()?;
    complete_time(&mut parsed).ok()?;

    let date = parsed.to_naive_date().ok()?;
    let time = if parsed.hour_mod_12().is_some() {
        parsed.to_naive_time().ok()?
    } else {
        NaiveTime::MIN
    };
    Some(date.and_time(time))
}

fn complete_date(parsed: &mut Parsed, today: NaiveDate) -> ParseResult<()> {
    let has_year = parsed.year().is_some() || parsed.year_mod_100().is_some();
    if !has_year {
        parsed.set_year(i64::from(today.year()))?;
    }
    if parsed.ordinal().is_some() {
        return Ok(());
    }

    let month_from_today = !has_year && parsed.month().is_none();
    if parsed.month().is_none() {
        let month = if month_from_today { today.month() } else { 1 };
        parsed.set_month(i64::from(month))?;
    }
    if parsed.day().is_none() {
        let day = if month_from_today { today.day() } else { 1 };
        parsed.set_day(i64::from(day))?;
    }
    Ok(())
}

fn complete_time(parsed: &mut Parsed) -> ParseResult<()> {
    if parsed.hour_mod_12().is_none() {
        return Ok(());
    }
    if parsed.hour_div_12().is_none() {
        parsed.set_ampm(false)?;
    }
    if parsed.minute().is_none() {
        parsed.set_minute(0)?;
    }
    Ok(())
}

fn loosen_separators(value: &str) -> String {
    value
        .chars()
        .map(|ch| if is_separator(ch) { ' ' } else { ch })
        .collect()
}

fn is_separator(ch: char) -> bool {
    !ch.is_alphanumeric() && !ch.is_whitespace()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Separators {
    Exact,
    Loose,
}

/// Translates a moment-style date pattern into a chrono strftime string.
/// Text inside square brackets is copied literally.
pub fn moment_to_strftime(pattern: &str) -> String {
    translate(pattern, Separators::Exact)
}

fn translate(pattern: &str, separators: Separators) -> String {
    let mut output = String::with_capacity(pattern.len() * 2);
    let mut rest = pattern;

    while let Some(ch) = rest.chars().next() {
        if ch == '[' {
            let literal_end = rest.find(']').unwrap_or(rest.len());
            push_literal(&mut output, &rest[1..literal_end], separators);
            rest = rest.get(literal_end + 1..).unwrap_or("");
            continue;
        }

        if let Some((token, directive)) = DATE_TOKENS.iter().find(|(token, _)| rest.starts_with(token)) {
            output.push_str(directive);
            rest = &rest[token.len()..];
            continue;
        }

        let mut buf = [0u8; 4];
        push_literal(&mut output, ch.encode_utf8(&mut buf), separators);
        rest = &rest[ch.len_utf8()..];
    }

    output
}

fn push_literal(output: &mut String, literal: &str, separators: Separators) {
    for ch in literal.chars() {
        if separators == Separators::Loose && is_separator(ch) {
            output.push(' ');
        } else if ch == '%' {
            output.push_str("%%");
        } else {
            output.push(ch);
        }
    }
}
