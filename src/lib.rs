//! # sheetstream
//!
//! A streaming row-assembly engine for spreadsheet data. Given an ordered
//! list of workbook files, a sheet selection and a typed field schema, the
//! engine walks file by file and sheet by sheet and emits one typed record
//! per physical row, on demand.
//!
//! ## Features
//!
//! - **Multi-file streaming**: Concatenate any number of workbooks into one
//!   ordered row stream, opening a single file at a time
//! - **Pluggable backends**: Concrete spreadsheet formats live behind the
//!   [`grid::WorkbookFactory`] trait; an in-memory backend ships with the
//!   crate
//! - **Typed schema**: Per-field target types, trim policies, conversion
//!   masks and grouping/decimal/currency symbols
//! - **Strict type checking**: An optional cell-kind compatibility table
//!   that rejects mistyped and formula cells before conversion
//! - **Error routing**: Fail fast, null the failing column, or skip the
//!   whole line, with per-line notifications to a caller-supplied handler
//! - **Replay**: A filter hook that re-runs only the lines a previous
//!   partial run did not finish
//! - **Metadata columns**: Optional file/sheet/row provenance columns
//!   appended to every record
//!
//! ## Example
//!
//! ```
//! use sheetstream::engine::{ReadConfig, RowAssemblyEngine};
//! use sheetstream::files::FileSequencer;
//! use sheetstream::grid::memory::{label, number, MemorySheet, MemoryWorkbook, MemoryWorkbookFactory};
//! use sheetstream::schema::{FieldType, SpreadsheetField};
//! use sheetstream::sheets::SheetSelection;
//!
//! # fn main() -> Result<(), sheetstream::SheetStreamError> {
//! let dir = tempfile::tempdir()?;
//! let path = dir.path().join("book.xlsx");
//! std::fs::write(&path, b"")?;
//!
//! let mut sheet = MemorySheet::new("data");
//! sheet.push_labels(&["name", "amount"]);
//! sheet.push_row(vec![label("apple"), number(12.5)]);
//! let factory = MemoryWorkbookFactory::new()
//!     .insert(&path.display().to_string(), MemoryWorkbook::new().add_sheet(sheet));
//!
//! let mut config = ReadConfig::new(
//!     vec![
//!         SpreadsheetField::new("name", FieldType::String),
//!         SpreadsheetField::new("amount", FieldType::Number),
//!     ],
//!     SheetSelection::all(),
//! );
//! config.options.header = true;
//!
//! let files = FileSequencer::from_paths(vec![path]);
//! let mut engine = RowAssemblyEngine::new(config, files, Box::new(factory))?;
//! while let Some(row) = engine.next_row()? {
//!     println!("{:?}", row);
//! }
//! # Ok(())
//! # }
//! ```

pub mod discover;
pub mod engine;
mod error;
pub mod files;
pub mod grid;
pub mod handlers;
pub mod reference;
pub mod schema;
pub mod sheets;

pub use crate::engine::OutputRow;
pub use crate::engine::ReadConfig;
pub use crate::engine::ReadOptions;
pub use crate::engine::RowAssemblyEngine;
pub use crate::error::SheetStreamError;
pub use crate::files::FileSequencer;
pub use crate::schema::SpreadsheetField;
pub use crate::schema::Value;
pub use crate::sheets::SheetSelection;
