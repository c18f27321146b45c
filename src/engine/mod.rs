//! # Row-Assembly Engine
//!
//! The pull-based state machine at the heart of the crate. The engine walks
//! an ordered file list, opens one workbook at a time through the injected
//! [`WorkbookFactory`], visits the selected sheets in order and assembles
//! one typed output record per physical row. Callers drain it through
//! [`RowAssemblyEngine::next_row`] or the [`Iterator`] impl; `Ok(None)`
//! means the whole stream is exhausted.
//!
//! Cursor layout mirrors the traversal: a file index into the sequencer, a
//! sheet index into the ranges resolved at open time, and a row cursor that
//! is `-1` between sheets.

pub(crate) mod assemble;
pub mod metadata;

use crate::engine::assemble::RawRow;
use crate::engine::metadata::FileMetadata;
use crate::engine::metadata::MetadataFields;
use crate::error::ResultMessage;
use crate::error::SheetStreamError;
use crate::files::ConfigError;
use crate::files::FileSequencer;
use crate::grid::OpenOptions;
use crate::grid::Workbook;
use crate::grid::WorkbookFactory;
use crate::handlers::ErrorHandler;
use crate::handlers::NoopErrorHandler;
use crate::handlers::ProcessAll;
use crate::handlers::ReplayFilter;
use crate::schema::field::SpreadsheetField;
use crate::schema::value::Value;
use crate::sheets::SheetRange;
use crate::sheets::SheetSelection;
use log::debug;
use log::error;
use log::warn;
use std::path::PathBuf;

/// One assembled output record: a slot per configured field, in field
/// order, followed by the enabled metadata columns.
pub type OutputRow = Vec<Option<Value>>;

/// Behavior switches of a streaming run.
#[derive(Clone, Debug, Default)]
pub struct ReadOptions {
    /// First visited row of each sheet is a header row and is skipped
    pub header: bool,
    /// Enforce the strict cell-kind/target-type compatibility table
    pub strict_types: bool,
    /// Report cell failures instead of failing the stream
    pub ignore_errors: bool,
    /// With `ignore_errors`: discard the whole row on any cell failure
    /// instead of nulling the failed column
    pub skip_error_lines: bool,
    /// Do not emit rows whose every cell is blank
    pub ignore_empty_rows: bool,
    /// An all-blank row ends the current sheet
    pub stop_on_empty: bool,
    /// File names arrive from an upstream source, so an empty configured
    /// file list is not an error
    pub accept_files_from_stream: bool,
    /// Stop after emitting this many rows across all files
    pub row_limit: Option<u64>,
    /// Hints passed to the workbook backend
    pub open: OpenOptions,
}

/// Full configuration of a streaming run.
#[derive(Clone, Debug)]
pub struct ReadConfig {
    /// Output fields, in declaration order
    pub fields: Vec<SpreadsheetField>,
    /// Which sheets to visit
    pub sheets: SheetSelection,
    /// Synthesized metadata columns
    pub metadata: MetadataFields,
    /// Behavior switches
    pub options: ReadOptions,
}

impl ReadConfig {
    pub fn new(fields: Vec<SpreadsheetField>, sheets: SheetSelection) -> Self {
        ReadConfig {
            fields,
            sheets,
            metadata: MetadataFields::default(),
            options: ReadOptions::default(),
        }
    }

    /// Total width of emitted records: fields plus enabled metadata columns.
    pub fn output_width(&self) -> usize {
        self.fields.len() + self.metadata.column_count()
    }
}

/// Streams typed records out of a sequence of workbook files.
pub struct RowAssemblyEngine {
    config: ReadConfig,
    files: FileSequencer,
    factory: Box<dyn WorkbookFactory>,
    error_handler: Box<dyn ErrorHandler>,
    replay_filter: Box<dyn ReplayFilter>,

    // Per-file state, reset by jump_to_next_file
    workbook: Option<Box<dyn Workbook>>,
    ranges: Vec<SheetRange>,
    file_metadata: Option<FileMetadata>,
    current_file: Option<PathBuf>,

    // Cursors
    file_index: usize,
    sheet_index: usize,
    /// 0-based index of the next row to fetch; -1 before a sheet starts
    row_cursor: i64,

    /// Last emitted record, source of repeat-field substitution
    previous_row: Option<OutputRow>,
    rows_emitted: u64,
    errors: u64,
    disposed: bool,
}

impl RowAssemblyEngine {
    /// Creates an engine with no error handler and no replay filter.
    pub fn new(
        config: ReadConfig,
        files: FileSequencer,
        factory: Box<dyn WorkbookFactory>,
    ) -> Result<Self, SheetStreamError> {
        Self::with_collaborators(
            config,
            files,
            factory,
            Box::new(NoopErrorHandler),
            Box::new(ProcessAll),
        )
    }

    /// Creates an engine with explicit error-handling collaborators.
    ///
    /// Fails fast on an empty field list, on missing or inaccessible
    /// required files (unless errors are ignored, in which case they are
    /// reported to the handler), and on an empty resolved file list (unless
    /// file names arrive from upstream).
    pub fn with_collaborators(
        config: ReadConfig,
        files: FileSequencer,
        factory: Box<dyn WorkbookFactory>,
        error_handler: Box<dyn ErrorHandler>,
        replay_filter: Box<dyn ReplayFilter>,
    ) -> Result<Self, SheetStreamError> {
        if config.fields.is_empty() {
            return Err(ConfigError::NoFieldsDefined.into());
        }
        let mut engine = RowAssemblyEngine {
            config,
            files,
            factory,
            error_handler,
            replay_filter,
            workbook: None,
            ranges: Vec::new(),
            file_metadata: None,
            current_file: None,
            file_index: 0,
            sheet_index: 0,
            row_cursor: -1,
            previous_row: None,
            rows_emitted: 0,
            errors: 0,
            disposed: false,
        };
        engine.enforce_file_policy()?;
        if engine.files.count() == 0 && !engine.config.options.accept_files_from_stream {
            return Err(ConfigError::NoInputFiles.into());
        }
        Ok(engine)
    }

    fn enforce_file_policy(&mut self) -> Result<(), SheetStreamError> {
        if !self.files.missing().is_empty() {
            let message = FileSequencer::describe(self.files.missing());
            if !self.config.options.ignore_errors {
                return Err(ConfigError::MissingRequiredFiles(message).into());
            }
            warn!("Required files are missing: {}", message);
            for index in 0..self.files.missing().len() {
                let file = self.files.missing()[index].to_owned();
                self.error_handler.handle_missing_file(&file)?;
            }
        }
        if !self.files.inaccessible().is_empty() {
            let message = FileSequencer::describe(self.files.inaccessible());
            if !self.config.options.ignore_errors {
                return Err(ConfigError::InaccessibleFiles(message).into());
            }
            warn!("Required files are not accessible: {}", message);
            for index in 0..self.files.inaccessible().len() {
                let file = self.files.inaccessible()[index].to_owned();
                self.error_handler.handle_inaccessible_file(&file)?;
            }
        }
        Ok(())
    }

    /// Pulls the next assembled record.
    ///
    /// `Ok(None)` means the stream is exhausted (all files read, or the row
    /// limit reached). Discarded iterations (header rows, ignored empty
    /// rows, skipped error lines, replay-declined lines, sheet and file
    /// boundaries) are absorbed internally.
    pub fn next_row(&mut self) -> Result<Option<OutputRow>, SheetStreamError> {
        loop {
            if let Some(limit) = self.config.options.row_limit {
                if self.rows_emitted >= limit {
                    debug!("row limit of {} reached", limit);
                    return Ok(None);
                }
            }
            if self.file_index >= self.files.count() {
                return Ok(None);
            }
            match self.step() {
                Ok(Some(row)) => {
                    self.rows_emitted += 1;
                    return Ok(Some(row));
                }
                Ok(None) => continue,
                Err(e) => {
                    self.errors += 1;
                    if let Some(file) = self.current_file.as_deref() {
                        error!("Error reading '{}': {}", file.display(), e);
                    }
                    // A fatal error terminates the stream; later calls see
                    // end-of-stream instead of retrying the same position.
                    self.file_index = self.files.count();
                    self.workbook = None;
                    self.current_file = None;
                    return Err(e);
                }
            }
        }
    }

    /// Advances the traversal by exactly one position: either emits one
    /// record or moves a cursor.
    fn step(&mut self) -> Result<Option<OutputRow>, SheetStreamError> {
        if self.workbook.is_none() {
            let Some(path) = self.files.file(self.file_index).map(PathBuf::from) else {
                return Ok(None);
            };
            self.open_file(path)?;
        }
        if self.sheet_index >= self.ranges.len() {
            self.jump_to_next_file()?;
            return Ok(None);
        }

        let range = self.ranges[self.sheet_index].to_owned();
        let fetched = match self.workbook.as_deref() {
            None => None,
            Some(workbook) => match workbook.sheet(&range.name) {
                // A file without the requested sheet contributes no rows.
                None => {
                    warn!(
                        "Sheet '{}' not found in file {}",
                        range.name, self.file_index
                    );
                    None
                }
                Some(sheet) => {
                    if self.row_cursor < 0 {
                        self.row_cursor = range.start_row as i64;
                        if self.config.options.header {
                            self.row_cursor += 1;
                        }
                    }
                    sheet
                        .row(self.row_cursor as usize)
                        .map(|cells| (cells, sheet.row_count()))
                }
            },
        };

        let Some((cells, row_count)) = fetched else {
            self.advance_sheet()?;
            return Ok(None);
        };
        self.row_cursor += 1;
        let line_number = self.row_cursor as usize;

        let Some(file) = self.current_file.as_deref() else {
            return Ok(None);
        };
        if !self
            .replay_filter
            .is_processing_needed(file, line_number, &range.name)
        {
            return Ok(None);
        }

        let raw = RawRow {
            sheet_name: range.name.to_owned(),
            row_number: line_number,
            cells,
        };
        let assembled = assemble::fill_row(
            &self.config.fields,
            &self.config.options,
            &mut *self.error_handler,
            self.sheet_index,
            range.start_col,
            &raw,
        )?;
        let Some(values) = assembled else {
            // Row discarded by the skip-error-lines policy.
            return Ok(None);
        };

        if assemble::is_line_empty(&raw.cells) {
            if self.config.options.stop_on_empty {
                self.advance_sheet()?;
                return Ok(None);
            }
            if self.config.options.ignore_empty_rows {
                // The cursor has passed the sheet's last known row; move on
                // without another fetch.
                if self.row_cursor as usize >= row_count {
                    self.advance_sheet()?;
                }
                return Ok(None);
            }
        }
        Ok(Some(self.finish_row(values, &range.name, line_number)))
    }

    /// Applies repeat-field substitution, appends metadata columns and
    /// records the result for the next substitution.
    fn finish_row(&mut self, values: OutputRow, sheet_name: &str, line_number: usize) -> OutputRow {
        let mut record = values;
        if let Some(previous) = &self.previous_row {
            for (index, field) in self.config.fields.iter().enumerate() {
                if field.repeat && record[index].is_none() {
                    record[index] = previous.get(index).cloned().flatten();
                }
            }
        }
        if let Some(metadata) = &self.file_metadata {
            metadata.append(
                &self.config.metadata,
                &mut record,
                sheet_name,
                line_number,
                self.rows_emitted + 1,
            );
        }
        self.previous_row = Some(record.to_owned());
        record
    }

    fn open_file(&mut self, path: PathBuf) -> Result<(), SheetStreamError> {
        debug!("Opening file {}: {}", self.file_index, path.display());
        let metadata = FileMetadata::capture(&path, &self.config.metadata)
            .map_err(SheetStreamError::IoError)
            .with_prefix("Cannot read file attributes")?;
        let workbook = self.factory.open(&path, &self.config.options.open)?;
        self.error_handler.handle_file(&path)?;
        self.ranges = self.config.sheets.resolve(workbook.as_ref());
        self.sheet_index = 0;
        self.row_cursor = -1;
        self.previous_row = None;
        self.file_metadata = Some(metadata);
        self.current_file = Some(path);
        self.workbook = Some(workbook);
        Ok(())
    }

    /// Moves to the next sheet of the current file, or to the next file
    /// when the sheet list is exhausted.
    fn advance_sheet(&mut self) -> Result<(), SheetStreamError> {
        debug!(
            "Finished sheet {} of file {}",
            self.sheet_index, self.file_index
        );
        self.sheet_index += 1;
        self.row_cursor = -1;
        self.previous_row = None;
        if self.sheet_index >= self.ranges.len() {
            self.jump_to_next_file()?;
        }
        Ok(())
    }

    /// Closes the current workbook and the error handler's side files, then
    /// points the cursors at the next file.
    fn jump_to_next_file(&mut self) -> Result<(), SheetStreamError> {
        self.workbook = None;
        self.ranges = Vec::new();
        self.file_metadata = None;
        self.current_file = None;
        self.sheet_index = 0;
        self.row_cursor = -1;
        self.previous_row = None;
        self.error_handler.close()?;
        self.file_index += 1;
        Ok(())
    }

    /// Rows emitted so far.
    pub fn rows_emitted(&self) -> u64 {
        self.rows_emitted
    }

    /// Fatal errors surfaced so far.
    pub fn errors(&self) -> u64 {
        self.errors
    }

    /// The input file list.
    pub fn files(&self) -> &FileSequencer {
        &self.files
    }

    /// Releases the open workbook and closes the error handler. Idempotent;
    /// also run on drop if never called.
    pub fn dispose(&mut self) -> Result<(), SheetStreamError> {
        if self.disposed {
            return Ok(());
        }
        self.disposed = true;
        self.workbook = None;
        self.error_handler.close()?;
        Ok(())
    }
}

impl Drop for RowAssemblyEngine {
    fn drop(&mut self) {
        if !self.disposed {
            self.disposed = true;
            if let Err(e) = self.error_handler.close() {
                warn!("Error closing error handler: {}", e);
            }
        }
    }
}

impl Iterator for RowAssemblyEngine {
    type Item = Result<OutputRow, SheetStreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}
