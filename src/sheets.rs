//! Sheet range table: which sheets to read and where each one starts.

use crate::grid::Workbook;
use crate::reference::parse_reference;
use crate::reference::ReferenceError;

/// Starting position for one named sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetRange {
    /// Sheet name
    pub name: String,
    /// First data row (0-based)
    pub start_row: usize,
    /// First data column (0-based)
    pub start_col: usize,
}

impl SheetRange {
    pub fn new(name: &str, start_row: usize, start_col: usize) -> Self {
        SheetRange {
            name: name.to_owned(),
            start_row,
            start_col,
        }
    }

    /// Builds a range from an A1-style origin reference (e.g., "B3").
    pub fn with_origin(name: &str, origin: &str) -> Result<Self, ReferenceError> {
        let (start_row, start_col) = parse_reference(origin)?;
        Ok(Self::new(name, start_row, start_col))
    }
}

/// Which sheets of each workbook get read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SheetSelection {
    /// Explicitly declared sheets with per-sheet start positions
    Named(Vec<SheetRange>),
    /// Every sheet of every workbook, sharing one start position
    AllSheets { start_row: usize, start_col: usize },
}

impl SheetSelection {
    /// Read-all-sheets mode starting at A1.
    pub fn all() -> Self {
        SheetSelection::AllSheets {
            start_row: 0,
            start_col: 0,
        }
    }

    /// Resolves the selection against an open workbook, producing one
    /// range per sheet to visit, in visiting order. In all-sheets mode the
    /// shared start position is applied to every sheet the workbook
    /// actually has.
    pub(crate) fn resolve(&self, workbook: &dyn Workbook) -> Vec<SheetRange> {
        match self {
            SheetSelection::Named(ranges) => ranges.to_owned(),
            SheetSelection::AllSheets { start_row, start_col } => workbook
                .sheet_names()
                .into_iter()
                .map(|name| SheetRange {
                    name,
                    start_row: *start_row,
                    start_col: *start_col,
                })
                .collect(),
        }
    }
}

impl Default for SheetSelection {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::memory::MemorySheet;
    use crate::grid::memory::MemoryWorkbook;

    #[test]
    fn origin_parsing() {
        let range = SheetRange::with_origin("data", "B3").unwrap();
        assert_eq!(range.start_row, 2);
        assert_eq!(range.start_col, 1);
        assert!(SheetRange::with_origin("data", "3B").is_err());
    }

    #[test]
    fn named_resolution_ignores_workbook() {
        let workbook = MemoryWorkbook::new().add_sheet(MemorySheet::new("other"));
        let selection = SheetSelection::Named(vec![SheetRange::new("data", 1, 0)]);
        assert_eq!(
            selection.resolve(&workbook),
            vec![SheetRange::new("data", 1, 0)]
        );
    }

    #[test]
    fn all_sheets_resolution_enumerates_workbook() {
        let workbook = MemoryWorkbook::new()
            .add_sheet(MemorySheet::new("one"))
            .add_sheet(MemorySheet::new("two"));
        let selection = SheetSelection::AllSheets {
            start_row: 4,
            start_col: 2,
        };
        assert_eq!(
            selection.resolve(&workbook),
            vec![SheetRange::new("one", 4, 2), SheetRange::new("two", 4, 2)]
        );
    }
}
