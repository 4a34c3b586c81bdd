//! Parser for calibration-database boundary strings.
//!
//! Effective-area headers carry `CBDn0001` keywords whose values follow a
//! small fixed grammar:
//!
//! ```text
//! cbd-value := KEY '(' BODY ')'
//! BODY      := VALUE [ ' ' UNIT ]
//! ```
//!
//! e.g. `NAME(South_z20_50h)`, `CAL(1.0.0)`, `ALT(20.0 deg)`. The whole
//! string must match; the unit, when present, is the text after the last
//! space inside the parentheses.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CbdParseError {
    #[error("'{0}' has no opening parenthesis")]
    MissingOpen(String),
    #[error("'{0}' does not end with a closing parenthesis")]
    MissingClose(String),
    #[error("'{0}' has an empty key")]
    EmptyKey(String),
    #[error("'{0}' has an empty value")]
    EmptyValue(String),
}

/// A parsed calibration boundary value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CbdValue {
    pub key: String,
    pub value: String,
    pub unit: Option<String>,
}

pub fn parse_cbd(input: &str) -> Result<CbdValue, CbdParseError> {
    let open = input
        .find('(')
        .ok_or_else(|| CbdParseError::MissingOpen(input.to_owned()))?;
    let body = input[open + 1..]
        .strip_suffix(')')
        .ok_or_else(|| CbdParseError::MissingClose(input.to_owned()))?;

    let key = input[..open].trim();
    if key.is_empty() {
        return Err(CbdParseError::EmptyKey(input.to_owned()));
    }

    let (value, unit) = match body.rsplit_once(' ') {
        Some((value, unit)) => (value, Some(unit.to_owned())),
        None => (body, None),
    };
    if value.is_empty() {
        return Err(CbdParseError::EmptyValue(input.to_owned()));
    }

    Ok(CbdValue {
        key: key.to_owned(),
        value: value.to_owned(),
        unit,
    })
}
