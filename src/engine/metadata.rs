//! Synthesized metadata columns.
//!
//! Each metadata column is enabled by giving it a non-blank output name in
//! the configuration. The set of requested metadata is computed once per
//! file at open time so that no filesystem call runs for a column nobody
//! asked for.

use crate::schema::value::Value;
use chrono::DateTime;
use chrono::Local;
use chrono::NaiveDateTime;
use std::fs;
use std::path::Path;
use url::Url;

/// Configured output names of the metadata columns, in emission order.
/// `None` or a blank name disables the column.
#[derive(Clone, Debug, Default)]
pub struct MetadataFields {
    /// Full source file name
    pub file_name: Option<String>,
    /// Current sheet name
    pub sheet_name: Option<String>,
    /// Sheet-relative row number (1-origin)
    pub sheet_row_number: Option<String>,
    /// Global row number across all files and sheets (1-origin)
    pub row_number: Option<String>,
    /// File name without directory
    pub short_file_name: Option<String>,
    /// File extension
    pub extension: Option<String>,
    /// Parent directory
    pub path: Option<String>,
    /// File size in bytes
    pub size: Option<String>,
    /// Whether the file is hidden
    pub hidden: Option<String>,
    /// Last modification timestamp
    pub last_modified: Option<String>,
    /// file:// URI of the source
    pub uri: Option<String>,
    /// Root of the source URI
    pub root_uri: Option<String>,
}

fn enabled(name: &Option<String>) -> bool {
    matches!(name, Some(name) if !name.trim().is_empty())
}

impl MetadataFields {
    fn slots(&self) -> [&Option<String>; 12] {
        [
            &self.file_name,
            &self.sheet_name,
            &self.sheet_row_number,
            &self.row_number,
            &self.short_file_name,
            &self.extension,
            &self.path,
            &self.size,
            &self.hidden,
            &self.last_modified,
            &self.uri,
            &self.root_uri,
        ]
    }

    /// Output names of the enabled columns, in emission order.
    pub fn column_names(&self) -> Vec<&str> {
        self.slots()
            .into_iter()
            .filter(|name| enabled(name))
            .filter_map(|name| name.as_deref())
            .collect()
    }

    /// Number of enabled metadata columns.
    pub fn column_count(&self) -> usize {
        self.slots().into_iter().filter(|name| enabled(name)).count()
    }
}

/// Per-file attributes captured at open time, restricted to what the
/// enabled columns need.
#[derive(Clone, Debug)]
pub(crate) struct FileMetadata {
    file_name: String,
    short_name: Option<String>,
    extension: Option<String>,
    parent: Option<String>,
    size: Option<u64>,
    hidden: Option<bool>,
    last_modified: Option<NaiveDateTime>,
    uri: Option<String>,
    root_uri: Option<String>,
}

impl FileMetadata {
    /// Captures the requested attributes for a file. Attributes whose
    /// columns are disabled are never computed.
    pub(crate) fn capture(path: &Path, fields: &MetadataFields) -> std::io::Result<Self> {
        let short_name = enabled(&fields.short_file_name).then(|| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        let extension = enabled(&fields.extension).then(|| {
            path.extension()
                .map(|extension| extension.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        let parent = enabled(&fields.path).then(|| {
            path.parent()
                .map(|parent| parent.display().to_string())
                .unwrap_or_default()
        });
        let hidden = enabled(&fields.hidden).then(|| {
            path.file_name()
                .map(|name| name.to_string_lossy().starts_with('.'))
                .unwrap_or(false)
        });

        let mut size = None;
        let mut last_modified = None;
        if enabled(&fields.size) || enabled(&fields.last_modified) {
            let attributes = fs::metadata(path)?;
            if enabled(&fields.size) {
                size = Some(attributes.len());
            }
            if enabled(&fields.last_modified) {
                let modified = attributes.modified()?;
                last_modified = Some(DateTime::<Local>::from(modified).naive_local());
            }
        }

        let mut uri = None;
        let mut root_uri = None;
        if enabled(&fields.uri) || enabled(&fields.root_uri) {
            let absolute = fs::canonicalize(path)?;
            if let Ok(url) = Url::from_file_path(&absolute) {
                if enabled(&fields.uri) {
                    uri = Some(url.to_string());
                }
                if enabled(&fields.root_uri) {
                    let mut root = url.to_owned();
                    root.set_path("/");
                    root_uri = Some(root.to_string());
                }
            }
        }

        Ok(FileMetadata {
            file_name: path.display().to_string(),
            short_name,
            extension,
            parent,
            size,
            hidden,
            last_modified,
            uri,
            root_uri,
        })
    }

    /// Appends the enabled metadata columns to an assembled record, in the
    /// fixed declared order.
    pub(crate) fn append(
        &self,
        fields: &MetadataFields,
        record: &mut Vec<Option<Value>>,
        sheet_name: &str,
        sheet_row: usize,
        global_row: u64,
    ) {
        if enabled(&fields.file_name) {
            record.push(Some(Value::String(self.file_name.to_owned())));
        }
        if enabled(&fields.sheet_name) {
            record.push(Some(Value::String(sheet_name.to_owned())));
        }
        if enabled(&fields.sheet_row_number) {
            record.push(Some(Value::Integer(sheet_row as i64)));
        }
        if enabled(&fields.row_number) {
            record.push(Some(Value::Integer(global_row as i64)));
        }
        if enabled(&fields.short_file_name) {
            record.push(self.short_name.to_owned().map(Value::String));
        }
        if enabled(&fields.extension) {
            record.push(self.extension.to_owned().map(Value::String));
        }
        if enabled(&fields.path) {
            record.push(self.parent.to_owned().map(Value::String));
        }
        if enabled(&fields.size) {
            record.push(self.size.map(|size| Value::Integer(size as i64)));
        }
        if enabled(&fields.hidden) {
            record.push(self.hidden.map(Value::Boolean));
        }
        if enabled(&fields.last_modified) {
            record.push(self.last_modified.map(Value::Date));
        }
        if enabled(&fields.uri) {
            record.push(self.uri.to_owned().map(Value::String));
        }
        if enabled(&fields.root_uri) {
            record.push(self.root_uri.to_owned().map(Value::String));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn blank_names_disable_columns() {
        let fields = MetadataFields {
            file_name: Some("source".to_owned()),
            sheet_name: Some("  ".to_owned()),
            row_number: Some(String::new()),
            ..MetadataFields::default()
        };
        assert_eq!(fields.column_count(), 1);
        assert_eq!(fields.column_names(), vec!["source"]);
    }

    #[test]
    fn capture_skips_unrequested_io() {
        // A path that does not exist: capture must still succeed because
        // no size/modified/uri column asks for filesystem metadata.
        let fields = MetadataFields {
            short_file_name: Some("short".to_owned()),
            extension: Some("ext".to_owned()),
            ..MetadataFields::default()
        };
        let metadata = FileMetadata::capture(Path::new("/nowhere/book.xlsx"), &fields).unwrap();
        assert_eq!(metadata.short_name.as_deref(), Some("book.xlsx"));
        assert_eq!(metadata.extension.as_deref(), Some("xlsx"));
        assert!(metadata.size.is_none());
    }

    #[test]
    fn capture_reads_requested_attributes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        fs::write(&path, b"12345").unwrap();

        let fields = MetadataFields {
            size: Some("size".to_owned()),
            last_modified: Some("modified".to_owned()),
            uri: Some("uri".to_owned()),
            root_uri: Some("root".to_owned()),
            ..MetadataFields::default()
        };
        let metadata = FileMetadata::capture(&path, &fields).unwrap();
        assert_eq!(metadata.size, Some(5));
        assert!(metadata.last_modified.is_some());
        assert!(metadata.uri.as_deref().unwrap().starts_with("file://"));
        assert!(metadata.root_uri.as_deref().unwrap().ends_with('/'));
    }

    #[test]
    fn append_order_and_gating() {
        let fields = MetadataFields {
            sheet_name: Some("sheet".to_owned()),
            sheet_row_number: Some("line".to_owned()),
            ..MetadataFields::default()
        };
        let metadata = FileMetadata::capture(Path::new("book.xlsx"), &fields).unwrap();
        let mut record = vec![Some(Value::Integer(7))];
        metadata.append(&fields, &mut record, "data", 3, 42);
        assert_eq!(
            record,
            vec![
                Some(Value::Integer(7)),
                Some(Value::String("data".to_owned())),
                Some(Value::Integer(3)),
            ]
        );
    }
}
