//! In-memory workbook implementation.
//!
//! Backs the test suite and lets embedders feed already-materialized
//! tabular data through the engine without touching the filesystem.

use crate::grid::Cell;
use crate::grid::CellValue;
use crate::grid::GridError;
use crate::grid::OpenOptions;
use crate::grid::Sheet;
use crate::grid::Workbook;
use crate::grid::WorkbookFactory;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

/// A sheet held fully in memory as a dense row-major grid.
#[derive(Clone, Debug, Default)]
pub struct MemorySheet {
    name: String,
    rows: Vec<Vec<Option<Cell>>>,
}

impl MemorySheet {
    pub fn new(name: &str) -> Self {
        MemorySheet {
            name: name.to_owned(),
            rows: Vec::new(),
        }
    }

    /// Appends a physical row. `None` entries model never-written cells.
    pub fn push_row(&mut self, cells: Vec<Option<Cell>>) -> &mut Self {
        self.rows.push(cells);
        self
    }

    /// Appends a row of label cells, a shorthand for header rows.
    pub fn push_labels(&mut self, labels: &[&str]) -> &mut Self {
        self.push_row(
            labels
                .iter()
                .map(|label| Some(Cell::new(CellValue::Label(label.to_string()))))
                .collect(),
        )
    }
}

/// Cell construction helpers used throughout the tests.
pub fn label(value: &str) -> Option<Cell> {
    Some(Cell::new(CellValue::Label(value.to_owned())))
}

pub fn number(value: f64) -> Option<Cell> {
    Some(Cell::new(CellValue::Number(value)))
}

pub fn boolean(value: bool) -> Option<Cell> {
    Some(Cell::new(CellValue::Boolean(value)))
}

pub fn date(value: NaiveDateTime) -> Option<Cell> {
    Some(Cell::new(CellValue::Date(value)))
}

pub fn empty() -> Option<Cell> {
    Some(Cell::new(CellValue::Empty))
}

impl Sheet for MemorySheet {
    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn cell(&self, col: usize, row: usize) -> Option<Cell> {
        self.rows.get(row)?.get(col)?.to_owned()
    }

    fn row(&self, row: usize) -> Option<Vec<Option<Cell>>> {
        self.rows.get(row).map(|cells| cells.to_owned())
    }
}

/// A workbook holding its sheets in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryWorkbook {
    sheets: Vec<MemorySheet>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        MemoryWorkbook { sheets: Vec::new() }
    }

    pub fn add_sheet(mut self, sheet: MemorySheet) -> Self {
        self.sheets.push(sheet);
        self
    }
}

impl Workbook for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|sheet| sheet.name.to_owned()).collect()
    }

    fn sheet(&self, name: &str) -> Option<&dyn Sheet> {
        self.sheets
            .iter()
            .find(|sheet| sheet.name == name)
            .map(|sheet| sheet as &dyn Sheet)
    }

    fn sheet_at(&self, index: usize) -> Option<&dyn Sheet> {
        self.sheets.get(index).map(|sheet| sheet as &dyn Sheet)
    }
}

/// Factory mapping paths to prebuilt in-memory workbooks.
///
/// Unregistered paths fail with [`GridError::OpenError`], which makes open
/// failures testable without a broken file on disk.
#[derive(Clone, Debug, Default)]
pub struct MemoryWorkbookFactory {
    workbooks: HashMap<PathBuf, MemoryWorkbook>,
}

impl MemoryWorkbookFactory {
    pub fn new() -> Self {
        MemoryWorkbookFactory {
            workbooks: HashMap::new(),
        }
    }

    pub fn insert(mut self, path: &str, workbook: MemoryWorkbook) -> Self {
        self.workbooks.insert(PathBuf::from(path), workbook);
        self
    }
}

impl WorkbookFactory for MemoryWorkbookFactory {
    fn open(&self, path: &Path, _options: &OpenOptions) -> Result<Box<dyn Workbook>, GridError> {
        self.workbooks
            .get(path)
            .map(|workbook| Box::new(workbook.to_owned()) as Box<dyn Workbook>)
            .ok_or_else(|| GridError::OpenError {
                path: path.display().to_string(),
                message: "no such workbook".to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryWorkbook {
        let mut sheet = MemorySheet::new("data");
        sheet.push_labels(&["name", "amount"]);
        sheet.push_row(vec![label("apple"), number(12.0)]);
        sheet.push_row(vec![label("pear"), None]);
        MemoryWorkbook::new().add_sheet(sheet)
    }

    #[test]
    fn sheet_lookup() {
        let workbook = sample();
        assert_eq!(workbook.sheet_names(), vec!["data".to_owned()]);
        assert!(workbook.sheet("data").is_some());
        assert!(workbook.sheet("missing").is_none());
        assert!(workbook.sheet_at(1).is_none());
    }

    #[test]
    fn row_access_past_end() {
        let workbook = sample();
        let sheet = workbook.sheet("data").unwrap();
        assert_eq!(sheet.row_count(), 3);
        assert!(sheet.row(2).is_some());
        assert!(sheet.row(3).is_none());
    }

    #[test]
    fn cell_access() {
        let workbook = sample();
        let sheet = workbook.sheet("data").unwrap();
        assert_eq!(sheet.cell(0, 1), label("apple"));
        assert_eq!(sheet.cell(1, 2), None);
        assert_eq!(sheet.cell(5, 0), None);
    }

    #[test]
    fn factory_rejects_unknown_path() {
        let factory = MemoryWorkbookFactory::new().insert("a.xlsx", sample());
        assert!(factory.open(Path::new("a.xlsx"), &OpenOptions::default()).is_ok());
        assert!(factory.open(Path::new("b.xlsx"), &OpenOptions::default()).is_err());
    }
}
