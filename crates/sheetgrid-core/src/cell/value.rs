//! Cell value types

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::date;
use crate::error::{Error, Result};

/// Represents the value stored in a cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Empty cell (no value)
    #[default]
    Empty,

    /// Text value
    Text(String),

    /// Numeric value
    Number(f64),

    /// Boolean value (TRUE/FALSE)
    Boolean(bool),

    /// Date and time; stored on disk as a serial number
    Date(NaiveDateTime),
}

/// The on-disk representation a value is written as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Verbatim text stored in the cell itself
    Text,
    /// Text stored once in the shared string table
    SharedText,
    /// Decimal number
    Number,
    /// Serial date number with the document's date style
    Date,
    /// 0/1 flag
    Boolean,
}

impl ValueKind {
    /// Lowercase name, also accepted by [`ValueKind::parse`]
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::SharedText => "shared",
            ValueKind::Number => "number",
            ValueKind::Date => "date",
            ValueKind::Boolean => "boolean",
        }
    }

    /// Parse a kind name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "str" | "string" => Some(ValueKind::Text),
            "shared" | "sharedtext" | "s" => Some(ValueKind::SharedText),
            "number" | "n" => Some(ValueKind::Number),
            "date" | "d" => Some(ValueKind::Date),
            "boolean" | "bool" | "b" => Some(ValueKind::Boolean),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CellValue {
    /// Create a new text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        CellValue::Text(s.into())
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// True for values that writing would skip: `Empty` and empty text
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// The kind an untyped write stores this value as
    ///
    /// Text goes to the shared string table; `Empty` has no kind.
    pub fn inferred_kind(&self) -> Option<ValueKind> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(_) => Some(ValueKind::SharedText),
            CellValue::Number(_) => Some(ValueKind::Number),
            CellValue::Boolean(_) => Some(ValueKind::Boolean),
            CellValue::Date(_) => Some(ValueKind::Date),
        }
    }

    /// Try to get the value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Boolean(true) => Some(1.0),
            CellValue::Boolean(false) => Some(0.0),
            CellValue::Date(d) => Some(date::to_serial(*d)),
            _ => None,
        }
    }

    /// Try to get the value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Boolean(b) => Some(*b),
            CellValue::Number(n) => Some(*n != 0.0),
            _ => None,
        }
    }

    /// Try to get the value as text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Try to get the value as a date
    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Date(d) => Some(*d),
            CellValue::Number(n) => date::from_serial(*n).ok(),
            _ => None,
        }
    }

    /// Get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::Text(_) => "text",
            CellValue::Number(_) => "number",
            CellValue::Boolean(_) => "boolean",
            CellValue::Date(_) => "date",
        }
    }

    /// Convert this value into the shape `kind` stores
    ///
    /// Text and shared text both yield [`CellValue::Text`]. Textual numbers
    /// accept `,` as the decimal separator. `Empty` stays `Empty`.
    pub fn coerce(self, kind: ValueKind) -> Result<CellValue> {
        if self.is_empty() {
            return Ok(self);
        }

        match kind {
            ValueKind::Text | ValueKind::SharedText => Ok(CellValue::Text(self.to_string())),
            ValueKind::Number => match self {
                CellValue::Text(s) => parse_number(&normalize_decimal(&s)).map(CellValue::Number),
                other => other.as_number().map(CellValue::Number).ok_or_else(|| {
                    Error::InvalidValueType {
                        expected: "number",
                        actual: other.to_string(),
                    }
                }),
            },
            ValueKind::Date => match self {
                CellValue::Date(d) => Ok(CellValue::Date(d)),
                CellValue::Number(n) => date::from_serial(n).map(CellValue::Date),
                CellValue::Text(s) => match date::parse_iso(&s) {
                    Ok(d) => Ok(CellValue::Date(d)),
                    Err(_) => parse_number(&normalize_decimal(&s))
                        .and_then(date::from_serial)
                        .map(CellValue::Date)
                        .map_err(|_| Error::InvalidDate(s)),
                },
                other => Err(Error::InvalidValueType {
                    expected: "date",
                    actual: other.to_string(),
                }),
            },
            ValueKind::Boolean => match self {
                CellValue::Boolean(b) => Ok(CellValue::Boolean(b)),
                CellValue::Number(n) => Ok(CellValue::Boolean(n != 0.0)),
                CellValue::Text(s) => parse_bool(&s).map(CellValue::Boolean).ok_or(
                    Error::InvalidValueType {
                        expected: "boolean",
                        actual: s,
                    },
                ),
                other => Err(Error::InvalidValueType {
                    expected: "boolean",
                    actual: other.to_string(),
                }),
            },
        }
    }
}

/// Format a number the way it is stored on disk: period separator, no grouping
pub fn format_number(n: f64) -> String {
    // Rust's shortest round-trip representation already fits the format
    format!("{}", n)
}

/// Parse a stored number (period separator, no grouping)
pub fn parse_number(text: &str) -> Result<f64> {
    let trimmed = text.trim();
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(Error::InvalidNumber(text.to_string())),
    }
}

fn normalize_decimal(text: &str) -> String {
    text.trim().replace(',', ".")
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => write!(f, ""),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) => write!(f, "{}", format_number(*n)),
            CellValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Date(d) => {
                if d.time().num_seconds_from_midnight() == 0 && d.time().nanosecond() == 0 {
                    write!(f, "{}", d.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", d.format("%Y-%m-%dT%H:%M:%S"))
                }
            }
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<u32> for CellValue {
    fn from(n: u32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::text(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(d: NaiveDateTime) -> Self {
        CellValue::Date(d)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d.and_time(chrono::NaiveTime::MIN))
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or_default()
    }
}
