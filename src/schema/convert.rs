//! Schema-driven cell conversion.
//!
//! Implements the strict type-check table, native value extraction and the
//! coercion chains that turn a cell's native value into the field's
//! declared target type, honoring the field's conversion mask and
//! grouping/decimal/currency symbols.

use crate::grid::Cell;
use crate::grid::CellValue;
use crate::reference::index_to_reference;
use crate::schema::field::FieldType;
use crate::schema::field::SpreadsheetField;
use crate::schema::value::Value;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use thiserror::Error;

/// Default conversion mask for date values.
const DEFAULT_DATE_MASK: &str = "%Y/%m/%d %H:%M:%S%.3f";

/// A structured per-cell failure, carrying enough position context to
/// identify the offending value in a multi-file stream.
#[derive(Error, Debug)]
pub enum CellError {
    /// Raw cell kind incompatible with the declared target type (strict mode)
    #[error("Type check failed on sheet {sheet}, cell {}, field '{field}': {message}", cell_position(.row, .column))]
    TypeCheckError {
        sheet: usize,
        row: usize,
        column: usize,
        field: String,
        message: String,
    },

    /// The native value could not be rendered into the target type/format
    #[error("Conversion failed on sheet {sheet}, cell {}, field '{field}': {message}", cell_position(.row, .column))]
    ConversionError {
        sheet: usize,
        row: usize,
        column: usize,
        field: String,
        message: String,
    },
}

/// Renders a 1-origin line number and 0-based column index as an A1-style
/// position for diagnostics.
fn cell_position(row: &usize, column: &usize) -> String {
    index_to_reference(row.saturating_sub(1), *column)
}

/// Checks that a cell's native kind is compatible with the declared target
/// type. Only called when strict types are enabled.
///
/// Formula cells are rejected wholesale; loose extraction still accepts
/// them.
pub(crate) fn check_type(cell: &Cell, target: FieldType) -> Result<(), String> {
    if cell.formula {
        return Err(format!(
            "unsupported cell kind '{} formula' with contents '{}'",
            cell.value.kind_name(),
            cell.contents()
        ));
    }
    let allowed = match &cell.value {
        CellValue::Empty => true,
        CellValue::Boolean(_) => {
            matches!(target, FieldType::String | FieldType::None | FieldType::Boolean)
        }
        CellValue::Date(_) => {
            matches!(target, FieldType::String | FieldType::None | FieldType::Date)
        }
        CellValue::Label(_) => !matches!(
            target,
            FieldType::Boolean | FieldType::Date | FieldType::Integer | FieldType::Number
        ),
        CellValue::Number(_) => matches!(
            target,
            FieldType::String
                | FieldType::None
                | FieldType::Integer
                | FieldType::BigNumber
                | FieldType::Number
        ),
    };
    if allowed {
        Ok(())
    } else {
        Err(format!(
            "{} cell with contents '{}' cannot feed a {} field",
            cell.value.kind_name(),
            cell.contents(),
            target.as_str()
        ))
    }
}

/// Extracts the native value of a cell, applying the field's trim policy
/// to text cells. Empty cells yield `None`.
pub(crate) fn extract(cell: &Cell, field: &SpreadsheetField) -> Option<Value> {
    match &cell.value {
        CellValue::Empty => None,
        CellValue::Boolean(value) => Some(Value::Boolean(*value)),
        CellValue::Date(value) => Some(Value::Date(*value)),
        CellValue::Number(value) => Some(Value::Number(*value)),
        CellValue::Label(value) => Some(Value::String(field.trim.apply(value).to_owned())),
    }
}

/// Converts a native value into the field's declared target type.
///
/// A `None` target or a matching native type passes the value through
/// unchanged. The numeric-to-date path deliberately goes through a
/// plain-integer string re-parsed with the field's mask (spreadsheet
/// date-serials stored as numbers, e.g. 20070522.00 -> "20070522").
pub(crate) fn coerce(value: Value, field: &SpreadsheetField) -> Result<Value, String> {
    let target = field.field_type;
    if target == FieldType::None || value.field_type() == target {
        return Ok(value);
    }
    match (value, target) {
        (Value::Boolean(value), FieldType::String) => {
            Ok(Value::String(if value { "true" } else { "false" }.to_owned()))
        }
        (Value::Boolean(value), FieldType::Number) => Ok(Value::Number(if value { 1.0 } else { 0.0 })),
        (Value::Boolean(value), FieldType::Integer) => Ok(Value::Integer(if value { 1 } else { 0 })),
        (Value::Boolean(value), FieldType::BigNumber) => {
            Ok(Value::BigNumber(if value { 1.0 } else { 0.0 }))
        }
        (Value::Boolean(_), FieldType::Date) => Err("cannot convert a boolean to a date".to_owned()),

        (Value::Number(value), FieldType::Date) => number_to_date(value, field),
        (Value::Number(value), FieldType::String) => Ok(Value::String(render_number(value, field))),
        (Value::Number(value), FieldType::Integer) => Ok(Value::Integer(value.round() as i64)),
        (Value::Number(value), FieldType::BigNumber) => Ok(Value::BigNumber(value)),
        (Value::Number(value), FieldType::Boolean) => Ok(Value::Boolean(value != 0.0)),

        (Value::Integer(value), FieldType::Date) => number_to_date(value as f64, field),
        (Value::Integer(value), FieldType::String) => Ok(Value::String(value.to_string())),
        (Value::Integer(value), FieldType::Number) => Ok(Value::Number(value as f64)),
        (Value::Integer(value), FieldType::BigNumber) => Ok(Value::BigNumber(value as f64)),
        (Value::Integer(value), FieldType::Boolean) => Ok(Value::Boolean(value != 0)),

        (Value::BigNumber(value), FieldType::Date) => number_to_date(value, field),
        (Value::BigNumber(value), FieldType::String) => Ok(Value::String(render_number(value, field))),
        (Value::BigNumber(value), FieldType::Integer) => Ok(Value::Integer(value.round() as i64)),
        (Value::BigNumber(value), FieldType::Number) => Ok(Value::Number(value)),
        (Value::BigNumber(value), FieldType::Boolean) => Ok(Value::Boolean(value != 0.0)),

        (Value::Date(value), FieldType::String) => Ok(Value::String(format_date(&value, field))),
        (Value::Date(value), FieldType::Number) => {
            Ok(Value::Number(value.and_utc().timestamp_millis() as f64))
        }
        (Value::Date(value), FieldType::Integer) => {
            Ok(Value::Integer(value.and_utc().timestamp_millis()))
        }
        (Value::Date(value), FieldType::BigNumber) => {
            Ok(Value::BigNumber(value.and_utc().timestamp_millis() as f64))
        }
        (Value::Date(_), FieldType::Boolean) => Err("cannot convert a date to a boolean".to_owned()),

        (Value::String(value), FieldType::Number) => parse_number(&value, field).map(Value::Number),
        (Value::String(value), FieldType::Integer) => parse_integer(&value, field).map(Value::Integer),
        (Value::String(value), FieldType::BigNumber) => {
            parse_number(&value, field).map(Value::BigNumber)
        }
        (Value::String(value), FieldType::Boolean) => Ok(Value::Boolean(parse_boolean(&value))),
        (Value::String(value), FieldType::Date) => parse_date(&value, field).map(Value::Date),

        // Unreachable: matching source/target and None targets return early.
        (value, _) => Ok(value),
    }
}

/// Numeric value into a date target: render as a plain-integer string
/// first, then re-parse that string with the field's date mask.
fn number_to_date(value: f64, field: &SpreadsheetField) -> Result<Value, String> {
    let rendered = format!("{:.0}", value);
    parse_date(&rendered, field).map(Value::Date)
}

/// Parses a date with the field's mask, falling back to a date-only parse
/// (midnight) when the mask carries no time part.
fn parse_date(value: &str, field: &SpreadsheetField) -> Result<NaiveDateTime, String> {
    let mask = if field.format.is_empty() {
        DEFAULT_DATE_MASK
    } else {
        field.format.as_str()
    };
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, mask) {
        return Ok(datetime);
    }
    NaiveDate::parse_from_str(value, mask)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format!("parse '{}' with mask '{}' to date failed", value, mask))
}

fn format_date(value: &NaiveDateTime, field: &SpreadsheetField) -> String {
    let mask = if field.format.is_empty() {
        DEFAULT_DATE_MASK
    } else {
        field.format.as_str()
    };
    value.format(mask).to_string()
}

/// Strips the field's grouping and currency symbols and normalizes the
/// decimal symbol before parsing.
fn clean_numeric(value: &str, field: &SpreadsheetField, decimal: bool) -> String {
    let mut cleaned = value.trim().to_owned();
    if !field.currency_symbol.is_empty() {
        cleaned = cleaned.replace(field.currency_symbol.as_str(), "");
    }
    if !field.group_symbol.is_empty() {
        cleaned = cleaned.replace(field.group_symbol.as_str(), "");
    }
    if decimal && !field.decimal_symbol.is_empty() && field.decimal_symbol != "." {
        cleaned = cleaned.replace(field.decimal_symbol.as_str(), ".");
    }
    cleaned.trim().to_owned()
}

fn parse_number(value: &str, field: &SpreadsheetField) -> Result<f64, String> {
    let cleaned = clean_numeric(value, field, true);
    cleaned
        .parse::<f64>()
        .map_err(|_| format!("parse '{}' to number failed", value))
}

fn parse_integer(value: &str, field: &SpreadsheetField) -> Result<i64, String> {
    let cleaned = clean_numeric(value, field, false);
    cleaned
        .parse::<i64>()
        .map_err(|_| format!("parse '{}' to integer failed", value))
}

/// Boolean literals accepted from text cells.
fn parse_boolean(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_uppercase().as_str(),
        "Y" | "YES" | "TRUE" | "1"
    )
}

/// Renders a number to text honoring the field's mask and precision.
/// The "#" mask produces a plain-integer string.
fn render_number(value: f64, field: &SpreadsheetField) -> String {
    if field.format == "#" {
        format!("{:.0}", value)
    } else if field.precision >= 0 {
        format!("{:.*}", field.precision as usize, value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::field::TrimPolicy;

    fn field(field_type: FieldType) -> SpreadsheetField {
        SpreadsheetField::new("f", field_type)
    }

    fn label_cell(value: &str) -> Cell {
        Cell::new(CellValue::Label(value.to_owned()))
    }

    #[test]
    fn strict_table_accepts_compatible_kinds() {
        let boolean = Cell::new(CellValue::Boolean(true));
        assert!(check_type(&boolean, FieldType::Boolean).is_ok());
        assert!(check_type(&boolean, FieldType::String).is_ok());
        assert!(check_type(&boolean, FieldType::None).is_ok());

        let number = Cell::new(CellValue::Number(1.0));
        assert!(check_type(&number, FieldType::Integer).is_ok());
        assert!(check_type(&number, FieldType::BigNumber).is_ok());
        assert!(check_type(&number, FieldType::Number).is_ok());

        assert!(check_type(&Cell::new(CellValue::Empty), FieldType::Date).is_ok());
    }

    #[test]
    fn strict_table_rejects_incompatible_kinds() {
        let label = label_cell("abc");
        assert!(check_type(&label, FieldType::Integer).is_err());
        assert!(check_type(&label, FieldType::Number).is_err());
        assert!(check_type(&label, FieldType::Date).is_err());
        assert!(check_type(&label, FieldType::Boolean).is_err());
        // BigNumber targets accept labels; text-sourced decimals are parsed.
        assert!(check_type(&label, FieldType::BigNumber).is_ok());

        let boolean = Cell::new(CellValue::Boolean(true));
        assert!(check_type(&boolean, FieldType::Number).is_err());

        let date = Cell::new(CellValue::Date(
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
        ));
        assert!(check_type(&date, FieldType::Integer).is_err());
    }

    #[test]
    fn strict_table_rejects_formula_cells() {
        let formula = Cell::formula(CellValue::Number(2.0));
        assert!(check_type(&formula, FieldType::Number).is_err());
    }

    #[test]
    fn extraction_applies_trim() {
        let field = field(FieldType::String).with_trim(TrimPolicy::Both);
        let value = extract(&label_cell("  hi  "), &field);
        assert_eq!(value, Some(Value::String("hi".to_owned())));
    }

    #[test]
    fn extraction_of_empty_yields_none() {
        let field = field(FieldType::String);
        assert_eq!(extract(&Cell::new(CellValue::Empty), &field), None);
    }

    #[test]
    fn coercion_passthrough_on_matching_type() {
        let field = field(FieldType::Number);
        assert_eq!(coerce(Value::Number(1.5), &field), Ok(Value::Number(1.5)));
        let none = SpreadsheetField::new("f", FieldType::None);
        assert_eq!(
            coerce(Value::String("x".to_owned()), &none),
            Ok(Value::String("x".to_owned()))
        );
    }

    #[test]
    fn numeric_to_date_goes_through_integer_string() {
        let field = field(FieldType::Date).with_format("%Y%m%d");
        let expected = NaiveDate::from_ymd_opt(2007, 5, 22)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            coerce(Value::Number(20070522.00), &field),
            Ok(Value::Date(expected))
        );
    }

    #[test]
    fn string_to_number_honors_symbols() {
        let mut field = field(FieldType::Number);
        field.group_symbol = ".".to_owned();
        field.decimal_symbol = ",".to_owned();
        field.currency_symbol = "€".to_owned();
        assert_eq!(
            coerce(Value::String("€1.234,50".to_owned()), &field),
            Ok(Value::Number(1234.5))
        );
    }

    #[test]
    fn string_to_integer_strips_grouping() {
        let mut field = field(FieldType::Integer);
        field.group_symbol = ",".to_owned();
        assert_eq!(
            coerce(Value::String("1,234".to_owned()), &field),
            Ok(Value::Integer(1234))
        );
    }

    #[test]
    fn string_to_boolean_literals() {
        let field = field(FieldType::Boolean);
        for yes in ["Y", "yes", "TRUE", "1"] {
            assert_eq!(
                coerce(Value::String(yes.to_owned()), &field),
                Ok(Value::Boolean(true))
            );
        }
        assert_eq!(
            coerce(Value::String("nope".to_owned()), &field),
            Ok(Value::Boolean(false))
        );
    }

    #[test]
    fn string_to_date_with_mask() {
        let field = field(FieldType::Date).with_format("%Y-%m-%d");
        let expected = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            coerce(Value::String("2024-02-29".to_owned()), &field),
            Ok(Value::Date(expected))
        );
        assert!(coerce(Value::String("not a date".to_owned()), &field).is_err());
    }

    #[test]
    fn date_to_string_uses_mask() {
        let field = field(FieldType::String).with_format("%Y-%m-%d");
        let date = NaiveDate::from_ymd_opt(2020, 12, 31)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        assert_eq!(
            coerce(Value::Date(date), &field),
            Ok(Value::String("2020-12-31".to_owned()))
        );
    }

    #[test]
    fn number_to_integer_rounds() {
        let field = field(FieldType::Integer);
        assert_eq!(coerce(Value::Number(2.6), &field), Ok(Value::Integer(3)));
        assert_eq!(coerce(Value::Number(-2.6), &field), Ok(Value::Integer(-3)));
    }

    #[test]
    fn cell_errors_render_a1_positions() {
        let error = CellError::TypeCheckError {
            sheet: 0,
            row: 5,
            column: 2,
            field: "amount".to_owned(),
            message: "label cell".to_owned(),
        };
        let rendered = error.to_string();
        assert!(rendered.contains("cell C5"), "{}", rendered);
        assert!(rendered.contains("field 'amount'"), "{}", rendered);
    }

    #[test]
    fn render_number_masks() {
        let plain = field(FieldType::String).with_format("#");
        assert_eq!(render_number(20070522.00, &plain), "20070522");
        let mut precise = field(FieldType::String);
        precise.precision = 2;
        assert_eq!(render_number(1.005, &precise), "1.00");
    }
}
