use crate::schema::field::FieldType;
use chrono::NaiveDateTime;
use std::fmt::Display;

/// A typed output value produced by the row-assembly engine.
///
/// Output records are `Vec<Option<Value>>`; `None` is the SQL-style null
/// produced by missing cells, failed (ignored) conversions and blank
/// repeated fields at the top of a sheet.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Boolean values (true/false)
    Boolean(bool),
    /// 64-bit signed integers
    Integer(i64),
    /// Double-precision floating point numbers
    Number(f64),
    /// Arbitrary-magnitude numbers; f64-backed
    BigNumber(f64),
    /// Variable-length strings
    String(String),
    /// Date/time values, wall-clock
    Date(NaiveDateTime),
}

impl Value {
    /// The declared field type this value satisfies.
    pub const fn field_type(&self) -> FieldType {
        match self {
            Self::Boolean(_) => FieldType::Boolean,
            Self::Integer(_) => FieldType::Integer,
            Self::Number(_) => FieldType::Number,
            Self::BigNumber(_) => FieldType::BigNumber,
            Self::String(_) => FieldType::String,
            Self::Date(_) => FieldType::Date,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean(value) => write!(f, "{}", value),
            Self::Integer(value) => write!(f, "{}", value),
            Self::Number(value) => write!(f, "{}", value),
            Self::BigNumber(value) => write!(f, "{}", value),
            Self::String(value) => write!(f, "{}", value),
            Self::Date(value) => write!(f, "{}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_reports_its_type() {
        assert_eq!(Value::Integer(1).field_type(), FieldType::Integer);
        assert_eq!(Value::String("x".to_owned()).field_type(), FieldType::String);
        assert_eq!(Value::BigNumber(1.0).field_type(), FieldType::BigNumber);
    }
}
