//! # Cell Grid Abstraction
//!
//! This module defines the uniform cell-grid interface the row-assembly
//! engine reads through. A `Workbook` exposes named sheets; a `Sheet` is a
//! 2-D grid addressable by (column, row); a `WorkbookFactory` opens a
//! workbook for a path. Concrete spreadsheet binary formats (xlsx, xls,
//! ods, ...) live behind these traits in pluggable backends; the engine is
//! agnostic to which one is active. An in-memory implementation is provided
//! in [`memory`] for tests and for embedders that already hold tabular data.

pub mod memory;

use chrono::NaiveDateTime;
use std::fmt::Display;
use std::path::Path;
use thiserror::Error;

/// Errors reported by workbook backends.
///
/// Bounds overruns are never errors: a read past the grid simply returns
/// `None`, which the engine treats as end-of-sheet.
#[derive(Error, Debug)]
pub enum GridError {
    /// The workbook could not be opened (missing, corrupt, wrong password, ...)
    #[error("Cannot open workbook '{path}': {message}")]
    OpenError { path: String, message: String },

    /// The workbook was opened but its content is unreadable
    #[error("Workbook fault: {0}")]
    FaultError(String),

    #[error("{0}")]
    IoError(#[from] std::io::Error),
}

/// The native payload of a spreadsheet cell.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    /// Cell exists but holds no data
    Empty,
    /// Boolean values (true/false)
    Boolean(bool),
    /// Numeric values
    Number(f64),
    /// Date/time values, wall-clock (no timezone)
    Date(NaiveDateTime),
    /// Text values
    Label(String),
}

impl CellValue {
    /// Returns the name of the cell kind, for diagnostics.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::Date(_) => "date",
            Self::Label(_) => "label",
        }
    }
}

/// A single cell as handed out by a workbook backend.
///
/// Formula cells carry their cached result in `value` with `formula` set;
/// strict type checking rejects them wholesale, while loose extraction
/// treats them like their base kind.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub formula: bool,
}

impl Cell {
    /// Creates a plain (non-formula) cell.
    pub fn new(value: CellValue) -> Self {
        Cell { value, formula: false }
    }

    /// Creates a formula cell carrying its cached result.
    pub fn formula(value: CellValue) -> Self {
        Cell { value, formula: true }
    }

    /// Returns the text contents of the cell, for diagnostics and
    /// emptiness checks.
    pub fn contents(&self) -> String {
        match &self.value {
            CellValue::Empty => String::new(),
            CellValue::Boolean(value) => value.to_string(),
            CellValue::Number(value) => value.to_string(),
            CellValue::Date(value) => value.to_string(),
            CellValue::Label(value) => value.to_owned(),
        }
    }

    /// True if the cell holds no data at all.
    pub fn is_blank(&self) -> bool {
        match &self.value {
            CellValue::Empty => true,
            CellValue::Label(value) => value.is_empty(),
            _ => false,
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.contents())
    }
}

/// One sheet of an open workbook.
pub trait Sheet {
    /// The sheet name.
    fn name(&self) -> &str;

    /// Number of rows in the sheet's used range.
    fn row_count(&self) -> usize;

    /// The cell at (column, row), both 0-based.
    /// `None` means "no such cell" — past the grid bounds or never written.
    fn cell(&self, col: usize, row: usize) -> Option<Cell>;

    /// The full physical row at the given 0-based index, or `None` when the
    /// row lies past the sheet's last row (end-of-sheet signal).
    fn row(&self, row: usize) -> Option<Vec<Option<Cell>>>;
}

/// One open workbook.
///
/// Exactly one workbook is open at a time per engine instance; dropping the
/// boxed workbook releases its resources.
pub trait Workbook {
    /// Names of all sheets, in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    /// Looks up a sheet by name. `None` if the workbook has no such sheet.
    fn sheet(&self, name: &str) -> Option<&dyn Sheet>;

    /// Looks up a sheet by 0-based index.
    fn sheet_at(&self, index: usize) -> Option<&dyn Sheet>;
}

/// Hints passed through to the backend when opening a workbook.
#[derive(Clone, Debug, Default)]
pub struct OpenOptions {
    /// Character encoding hint for legacy formats
    pub encoding: Option<String>,
    /// Password for protected workbooks
    pub password: Option<String>,
}

/// Opens workbooks for the engine. Implemented by format backends; passed
/// into the engine by the caller.
pub trait WorkbookFactory {
    fn open(&self, path: &Path, options: &OpenOptions) -> Result<Box<dyn Workbook>, GridError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_contents() {
        assert_eq!(Cell::new(CellValue::Label("abc".to_owned())).contents(), "abc");
        assert_eq!(Cell::new(CellValue::Number(1.5)).contents(), "1.5");
        assert_eq!(Cell::new(CellValue::Boolean(true)).contents(), "true");
        assert_eq!(Cell::new(CellValue::Empty).contents(), "");
    }

    #[test]
    fn cell_blankness() {
        assert!(Cell::new(CellValue::Empty).is_blank());
        assert!(Cell::new(CellValue::Label(String::new())).is_blank());
        assert!(!Cell::new(CellValue::Label(" ".to_owned())).is_blank());
        assert!(!Cell::new(CellValue::Number(0.0)).is_blank());
    }

    #[test]
    fn formula_flag_preserves_kind() {
        let cell = Cell::formula(CellValue::Number(2.0));
        assert!(cell.formula);
        assert_eq!(cell.value.kind_name(), "number");
    }
}
