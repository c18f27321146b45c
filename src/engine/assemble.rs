//! Converts one physical sheet row into one output record.
//!
//! The assembly applies, per configured field: the strict type check (when
//! enabled), native value extraction and schema-driven coercion. Failures
//! are either fatal, or reported to the error handler and resolved by the
//! skip/null policy. The error handler is notified at most once per
//! physical row however many cells of it fail.

use crate::engine::ReadOptions;
use crate::error::SheetStreamError;
use crate::grid::Cell;
use crate::handlers::ErrorHandler;
use crate::schema::convert;
use crate::schema::convert::CellError;
use crate::schema::field::SpreadsheetField;
use crate::schema::value::Value;
use log::warn;

/// One physical row as fetched from a sheet, before assembly.
pub(crate) struct RawRow {
    pub(crate) sheet_name: String,
    /// 1-origin physical line number within the sheet
    pub(crate) row_number: usize,
    pub(crate) cells: Vec<Option<Cell>>,
}

/// True when every cell of the row is absent or blank. A zero-width row is
/// empty.
pub(crate) fn is_line_empty(cells: &[Option<Cell>]) -> bool {
    cells
        .iter()
        .all(|cell| cell.as_ref().map(Cell::is_blank).unwrap_or(true))
}

/// Assembles the configured fields from a raw row.
///
/// Returns `Ok(None)` when the row was discarded by the skip-error-lines
/// policy; otherwise the record has exactly one slot per field, with failed
/// or absent cells left as `None`.
pub(crate) fn fill_row(
    fields: &[SpreadsheetField],
    options: &ReadOptions,
    error_handler: &mut dyn ErrorHandler,
    sheet_index: usize,
    start_col: usize,
    raw: &RawRow,
) -> Result<Option<Vec<Option<Value>>>, SheetStreamError> {
    let mut record: Vec<Option<Value>> = vec![None; fields.len()];
    let mut error_handled = false;

    for (index, field) in fields.iter().enumerate() {
        let column = start_col + index;
        let Some(cell) = raw.cells.get(column).and_then(Option::as_ref) else {
            continue;
        };

        if options.strict_types {
            if let Err(message) = convert::check_type(cell, field.field_type) {
                if !options.ignore_errors {
                    return Err(CellError::TypeCheckError {
                        sheet: sheet_index,
                        row: raw.row_number,
                        column,
                        field: field.name.to_owned(),
                        message,
                    }
                    .into());
                }
                warn!(
                    "Error on line {} of sheet '{}', field '{}': {}",
                    raw.row_number, raw.sheet_name, field.name, message
                );
                if !error_handled {
                    error_handler.handle_line_error(raw.row_number, &raw.sheet_name)?;
                    error_handled = true;
                }
                if options.skip_error_lines {
                    return Ok(None);
                }
                continue;
            }
        }

        let Some(native) = convert::extract(cell, field) else {
            continue;
        };
        match convert::coerce(native, field) {
            Ok(value) => record[index] = Some(value),
            Err(message) => {
                if !options.ignore_errors {
                    return Err(CellError::ConversionError {
                        sheet: sheet_index,
                        row: raw.row_number,
                        column,
                        field: field.name.to_owned(),
                        message,
                    }
                    .into());
                }
                warn!(
                    "Error on line {} of sheet '{}', field '{}': {}",
                    raw.row_number, raw.sheet_name, field.name, message
                );
                if !error_handled {
                    error_handler.handle_line_error(raw.row_number, &raw.sheet_name)?;
                    error_handled = true;
                }
                if options.skip_error_lines {
                    return Ok(None);
                }
            }
        }
    }

    Ok(Some(record))
}
