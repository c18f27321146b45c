//! Collaborator interfaces consumed by the engine.
//!
//! The error handler receives per-line and per-file notifications and owns
//! any persisted warning/line-number side files; the replay filter decides
//! whether a given (file, line, sheet) still needs processing, which is how
//! partial/failed runs get replayed. Both are narrow traits passed in by
//! the caller.

use anyhow::Result;
use std::path::Path;

/// Receives error notifications from the engine. All methods default to
/// no-ops so implementations only override the notifications they persist.
///
/// A returned error is treated as fatal by the engine.
pub trait ErrorHandler {
    /// A line failed a type check or conversion (reported at most once per
    /// physical row).
    fn handle_line_error(&mut self, _line_number: usize, _sheet_name: &str) -> Result<()> {
        Ok(())
    }

    /// A configured input file does not exist.
    fn handle_missing_file(&mut self, _file: &Path) -> Result<()> {
        Ok(())
    }

    /// A configured input file exists but cannot be read.
    fn handle_inaccessible_file(&mut self, _file: &Path) -> Result<()> {
        Ok(())
    }

    /// A file was opened for processing.
    fn handle_file(&mut self, _file: &Path) -> Result<()> {
        Ok(())
    }

    /// Flush and release any side files. Called at every file boundary and
    /// again on engine disposal.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Error handler that ignores every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopErrorHandler;

impl ErrorHandler for NoopErrorHandler {}

/// Fans every notification out to a list of handlers.
#[derive(Default)]
pub struct CompositeErrorHandler {
    handlers: Vec<Box<dyn ErrorHandler>>,
}

impl CompositeErrorHandler {
    pub fn new(handlers: Vec<Box<dyn ErrorHandler>>) -> Self {
        CompositeErrorHandler { handlers }
    }
}

impl ErrorHandler for CompositeErrorHandler {
    fn handle_line_error(&mut self, line_number: usize, sheet_name: &str) -> Result<()> {
        for handler in &mut self.handlers {
            handler.handle_line_error(line_number, sheet_name)?;
        }
        Ok(())
    }

    fn handle_missing_file(&mut self, file: &Path) -> Result<()> {
        for handler in &mut self.handlers {
            handler.handle_missing_file(file)?;
        }
        Ok(())
    }

    fn handle_inaccessible_file(&mut self, file: &Path) -> Result<()> {
        for handler in &mut self.handlers {
            handler.handle_inaccessible_file(file)?;
        }
        Ok(())
    }

    fn handle_file(&mut self, file: &Path) -> Result<()> {
        for handler in &mut self.handlers {
            handler.handle_file(file)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        for handler in &mut self.handlers {
            handler.close()?;
        }
        Ok(())
    }
}

/// Decides whether a given line still needs processing.
pub trait ReplayFilter {
    fn is_processing_needed(&self, file: &Path, line_number: usize, sheet_name: &str) -> bool;
}

/// Replay filter that processes everything (the non-replay case).
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessAll;

impl ReplayFilter for ProcessAll {
    fn is_processing_needed(&self, _file: &Path, _line_number: usize, _sheet_name: &str) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    struct Counting {
        lines: Arc<AtomicUsize>,
        closes: Arc<AtomicUsize>,
    }

    impl ErrorHandler for Counting {
        fn handle_line_error(&mut self, _line_number: usize, _sheet_name: &str) -> Result<()> {
            self.lines.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        fn close(&mut self) -> Result<()> {
            self.closes.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    #[test]
    fn composite_fans_out() {
        let lines = Arc::new(AtomicUsize::new(0));
        let closes = Arc::new(AtomicUsize::new(0));
        let mut composite = CompositeErrorHandler::new(vec![
            Box::new(Counting { lines: lines.clone(), closes: closes.clone() }),
            Box::new(Counting { lines: lines.clone(), closes: closes.clone() }),
        ]);
        composite.handle_line_error(3, "data").unwrap();
        composite.close().unwrap();
        assert_eq!(lines.load(Ordering::Relaxed), 2);
        assert_eq!(closes.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn process_all_accepts_everything() {
        let filter = ProcessAll;
        assert!(filter.is_processing_needed(Path::new("a.xlsx"), 1, "data"));
    }
}
