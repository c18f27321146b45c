use thiserror::Error;

/// Errors related to field type parsing.
#[derive(Error, Debug)]
pub enum FieldError {
    #[error("Invalid field type '{0}'")]
    TypeError(String),
}

/// Declared semantic type of an output field.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FieldType {
    /// No declared type; values pass through unconverted
    #[default]
    None,
    /// Variable-length strings
    String,
    /// Double-precision floating point numbers
    Number,
    /// 64-bit signed integers
    Integer,
    /// Arbitrary-magnitude numbers
    BigNumber,
    /// Date/time values
    Date,
    /// Boolean values (true/false)
    Boolean,
}

impl FieldType {
    /// Returns the string representation of the field type.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::BigNumber => "bignumber",
            Self::Date => "date",
            Self::Boolean => "boolean",
        }
    }

    /// Parses a field type from its string representation.
    /// Supports various aliases for each type (case-insensitive).
    pub fn parse(name: &str) -> Result<Self, FieldError> {
        match name.to_ascii_uppercase().as_str() {
            "NONE" => Ok(Self::None),
            "TEXT" | "STRING" | "VARCHAR" => Ok(Self::String),
            "FLOAT" | "DOUBLE" | "NUMBER" | "NUMERIC" => Ok(Self::Number),
            "INT" | "BIGINT" | "INTEGER" => Ok(Self::Integer),
            "DECIMAL" | "BIGNUMBER" => Ok(Self::BigNumber),
            "DATE" | "DATETIME" | "TIMESTAMP" => Ok(Self::Date),
            "BOOL" | "BOOLEAN" => Ok(Self::Boolean),
            _ => Err(FieldError::TypeError(name.to_string())),
        }
    }
}

/// How surrounding whitespace of text cells is handled.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TrimPolicy {
    #[default]
    None,
    Left,
    Right,
    Both,
}

impl TrimPolicy {
    /// Applies the policy to a string slice.
    pub fn apply<'a>(&self, value: &'a str) -> &'a str {
        match self {
            Self::None => value,
            Self::Left => value.trim_start(),
            Self::Right => value.trim_end(),
            Self::Both => value.trim(),
        }
    }
}

/// Declares one output column of the row stream.
///
/// Immutable once row processing starts; the engine only reads it.
#[derive(Clone, Debug, PartialEq)]
pub struct SpreadsheetField {
    /// Output field name
    pub name: String,
    /// Target semantic type
    pub field_type: FieldType,
    /// Declared length, -1 when unset
    pub length: i32,
    /// Declared precision, -1 when unset
    pub precision: i32,
    /// Whitespace handling for text cells
    pub trim: TrimPolicy,
    /// Conversion mask: strftime pattern for dates, rendering hint for numbers
    pub format: String,
    /// Grouping symbol for numeric parsing (e.g. "," or ".")
    pub group_symbol: String,
    /// Decimal symbol for numeric parsing
    pub decimal_symbol: String,
    /// Currency symbol stripped during numeric parsing
    pub currency_symbol: String,
    /// Repeat the previous row's value when the cell is blank
    pub repeat: bool,
}

impl SpreadsheetField {
    /// Creates a field with the given name and type and default policies.
    pub fn new(name: &str, field_type: FieldType) -> Self {
        SpreadsheetField {
            name: name.to_owned(),
            field_type,
            length: -1,
            precision: -1,
            trim: TrimPolicy::None,
            format: String::new(),
            group_symbol: String::new(),
            decimal_symbol: String::new(),
            currency_symbol: String::new(),
            repeat: false,
        }
    }

    /// Same field with the repeat-on-blank flag set.
    pub fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }

    /// Same field with the given conversion mask.
    pub fn with_format(mut self, format: &str) -> Self {
        self.format = format.to_owned();
        self
    }

    /// Same field with the given trim policy.
    pub fn with_trim(mut self, trim: TrimPolicy) -> Self {
        self.trim = trim;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_aliases() {
        assert_eq!(FieldType::parse("Integer").unwrap(), FieldType::Integer);
        assert_eq!(FieldType::parse("DOUBLE").unwrap(), FieldType::Number);
        assert_eq!(FieldType::parse("varchar").unwrap(), FieldType::String);
        assert_eq!(FieldType::parse("timestamp").unwrap(), FieldType::Date);
        assert!(FieldType::parse("blob").is_err());
    }

    #[test]
    fn trim_policies() {
        assert_eq!(TrimPolicy::None.apply("  x  "), "  x  ");
        assert_eq!(TrimPolicy::Left.apply("  x  "), "x  ");
        assert_eq!(TrimPolicy::Right.apply("  x  "), "  x");
        assert_eq!(TrimPolicy::Both.apply("  x  "), "x");
    }

    #[test]
    fn field_defaults() {
        let field = SpreadsheetField::new("amount", FieldType::Number);
        assert_eq!(field.length, -1);
        assert_eq!(field.precision, -1);
        assert!(!field.repeat);
        assert_eq!(field.trim, TrimPolicy::None);
    }
}
