//! File sequencer: the ordered, deduplicated list of input workbooks.
//!
//! Wildcard and variable resolution against remote filesystems happens
//! upstream; what arrives here is local paths and optional glob patterns.
//! At engine initialization the list is partitioned into existing, missing
//! and inaccessible files so that required-file enforcement can run before
//! the first row is read.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal pre-stream configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No input file remains after resolution")]
    NoInputFiles,

    #[error("Required files are missing: {0}")]
    MissingRequiredFiles(String),

    #[error("Required files are not accessible: {0}")]
    InaccessibleFiles(String),

    #[error("No input fields defined")]
    NoFieldsDefined,

    #[error("{0}")]
    PatternError(#[from] glob::PatternError),
}

/// Ordered input file list with existence bookkeeping.
#[derive(Clone, Debug, Default)]
pub struct FileSequencer {
    existing: Vec<PathBuf>,
    missing: Vec<PathBuf>,
    inaccessible: Vec<PathBuf>,
}

impl FileSequencer {
    /// Builds a sequencer from explicit paths, deduplicating while
    /// preserving order and classifying each path.
    pub fn from_paths<I>(paths: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut sequencer = FileSequencer::default();
        let mut seen = HashSet::<PathBuf>::new();
        for path in paths {
            if seen.insert(path.to_owned()) {
                sequencer.classify(path);
            }
        }
        sequencer
    }

    /// Builds a sequencer from glob patterns. A pattern without wildcard
    /// characters is treated as a literal path, so a misspelled explicit
    /// file still lands in the missing list instead of vanishing.
    pub fn from_patterns<S>(patterns: &[S]) -> Result<Self, ConfigError>
    where
        S: AsRef<str>,
    {
        let mut paths = Vec::<PathBuf>::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            if pattern.contains(['*', '?', '[']) {
                for entry in glob::glob(pattern)? {
                    match entry {
                        Ok(path) => paths.push(path),
                        // Matched but unreadable during traversal.
                        Err(error) => paths.push(error.path().to_owned()),
                    }
                }
            } else {
                paths.push(PathBuf::from(pattern));
            }
        }
        Ok(Self::from_paths(paths))
    }

    fn classify(&mut self, path: PathBuf) {
        if !path.exists() {
            self.missing.push(path);
        } else if File::open(&path).is_err() {
            self.inaccessible.push(path);
        } else {
            self.existing.push(path);
        }
    }

    /// Number of readable files in the sequence.
    pub fn count(&self) -> usize {
        self.existing.len()
    }

    /// The readable file at the given position.
    pub fn file(&self, index: usize) -> Option<&Path> {
        self.existing.get(index).map(PathBuf::as_path)
    }

    pub fn existing(&self) -> &[PathBuf] {
        &self.existing
    }

    pub fn missing(&self) -> &[PathBuf] {
        &self.missing
    }

    pub fn inaccessible(&self) -> &[PathBuf] {
        &self.inaccessible
    }

    /// Human-readable enumeration of paths for aggregate error messages.
    pub(crate) fn describe(paths: &[PathBuf]) -> String {
        paths
            .iter()
            .map(|path| path.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn classifies_existing_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("a.xlsx");
        fs::write(&present, b"x").unwrap();
        let absent = dir.path().join("b.xlsx");

        let sequencer = FileSequencer::from_paths(vec![present.to_owned(), absent.to_owned()]);
        assert_eq!(sequencer.count(), 1);
        assert_eq!(sequencer.file(0), Some(present.as_path()));
        assert_eq!(sequencer.missing(), &[absent]);
        assert!(sequencer.inaccessible().is_empty());
    }

    #[test]
    fn deduplicates_preserving_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.xlsx");
        let second = dir.path().join("second.xlsx");
        fs::write(&first, b"x").unwrap();
        fs::write(&second, b"x").unwrap();

        let sequencer = FileSequencer::from_paths(vec![
            first.to_owned(),
            second.to_owned(),
            first.to_owned(),
        ]);
        assert_eq!(sequencer.existing(), &[first, second]);
    }

    #[test]
    fn expands_patterns_and_keeps_literals() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("one.xlsx"), b"x").unwrap();
        fs::write(dir.path().join("two.xlsx"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let pattern = dir.path().join("*.xlsx").display().to_string();
        let literal = dir.path().join("gone.xlsx").display().to_string();
        let sequencer = FileSequencer::from_patterns(&[pattern, literal]).unwrap();
        assert_eq!(sequencer.count(), 2);
        assert_eq!(sequencer.missing().len(), 1);
    }

    #[test]
    fn empty_sequence() {
        let sequencer = FileSequencer::from_paths(Vec::new());
        assert_eq!(sequencer.count(), 0);
        assert!(sequencer.file(0).is_none());
    }
}
