//! Schema and source discovery helpers.
//!
//! Field discovery reads the header row of each selected sheet and guesses
//! a field type from the first data cell under each header. It never
//! converts rows; it exists so a caller can bootstrap a field list from
//! real files instead of typing it out.

use crate::error::SheetStreamError;
use crate::files::ConfigError;
use crate::files::FileSequencer;
use crate::grid::CellValue;
use crate::grid::OpenOptions;
use crate::grid::Workbook;
use crate::grid::WorkbookFactory;
use crate::schema::field::FieldType;
use crate::schema::field::SpreadsheetField;
use crate::sheets::SheetSelection;
use log::debug;
use std::collections::HashSet;

/// Guesses a field type from the first data cell under a header.
fn guess_type(value: Option<&CellValue>) -> FieldType {
    match value {
        Some(CellValue::Boolean(_)) => FieldType::Boolean,
        Some(CellValue::Date(_)) => FieldType::Date,
        Some(CellValue::Number(_)) => FieldType::Number,
        _ => FieldType::String,
    }
}

/// Reads header rows of the selected sheets of an open workbook and builds
/// one field per header cell. The scan of a header row stops at the first
/// blank or absent cell; duplicate names across sheets are kept once.
pub fn discover_fields(
    workbook: &dyn Workbook,
    selection: &SheetSelection,
) -> Vec<SpreadsheetField> {
    let mut fields = Vec::new();
    let mut seen = HashSet::<String>::new();
    for range in selection.resolve(workbook) {
        let Some(sheet) = workbook.sheet(&range.name) else {
            continue;
        };
        let mut col = range.start_col;
        loop {
            let Some(header) = sheet.cell(col, range.start_row) else {
                break;
            };
            if header.is_blank() {
                break;
            }
            let name = header.contents();
            if seen.insert(name.to_owned()) {
                let sample = sheet.cell(col, range.start_row + 1);
                let field_type = guess_type(sample.as_ref().map(|cell| &cell.value));
                fields.push(SpreadsheetField::new(&name, field_type));
            }
            col += 1;
        }
    }
    fields
}

/// Discovers fields across every readable file of a sequence.
pub fn list_fields(
    factory: &dyn WorkbookFactory,
    files: &FileSequencer,
    selection: &SheetSelection,
    options: &OpenOptions,
) -> Result<Vec<SpreadsheetField>, SheetStreamError> {
    let mut fields = Vec::<SpreadsheetField>::new();
    let mut seen = HashSet::<String>::new();
    for path in files.existing() {
        debug!("Discovering fields in {}", path.display());
        let workbook = factory.open(path, options)?;
        for field in discover_fields(workbook.as_ref(), selection) {
            if seen.insert(field.name.to_owned()) {
                fields.push(field);
            }
        }
    }
    Ok(fields)
}

/// Lists sheet names across every readable file of a sequence, keeping
/// workbook order and dropping duplicates.
pub fn list_sheets(
    factory: &dyn WorkbookFactory,
    files: &FileSequencer,
    options: &OpenOptions,
) -> Result<Vec<String>, SheetStreamError> {
    let mut names = Vec::<String>::new();
    let mut seen = HashSet::<String>::new();
    for path in files.existing() {
        let workbook = factory.open(path, options)?;
        for name in workbook.sheet_names() {
            if seen.insert(name.to_owned()) {
                names.push(name);
            }
        }
    }
    Ok(names)
}

/// Expands file patterns into a classified file sequence.
pub fn list_files<S>(patterns: &[S]) -> Result<FileSequencer, ConfigError>
where
    S: AsRef<str>,
{
    FileSequencer::from_patterns(patterns)
}
