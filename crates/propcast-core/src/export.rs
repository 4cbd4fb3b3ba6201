//! CSV export and workflow report
//!
//! Both writers overwrite their target and return I/O failures to the caller;
//! unlike the per-image stages nothing here is skipped.

use chrono::Local;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::activity::ActivityLog;
use crate::compose::{truncate_chars, PostSet, SocialPlatform};
use crate::model::PropertyRecord;

/// Characters of each post kept in the CSV preview columns
pub const POST_PREVIEW_CHARS: usize = 100;

pub const REPORT_TITLE: &str = "PROPERTY IMAGE AUTOMATION - WORKFLOW REPORT";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write csv {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },
}

/// One CSV row per described image. Field order is column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingRow {
    pub property_id: String,
    pub address: String,
    pub price: String,
    #[serde(rename = "type")]
    pub property_type: String,
    pub description: String,
    pub instagram_post: String,
    pub facebook_post: String,
    pub linkedin_post: String,
    pub processing_date: String,
}

impl ListingRow {
    pub fn new(property: &PropertyRecord, description: &str, posts: &PostSet) -> Self {
        let preview =
            |platform| truncate_chars(posts.get(platform), POST_PREVIEW_CHARS).to_string();

        Self {
            property_id: property.id.clone(),
            address: property.address_or_default().to_string(),
            price: property.price_or_default().to_string(),
            property_type: property.type_or_default().to_string(),
            description: description.to_string(),
            instagram_post: preview(SocialPlatform::Instagram),
            facebook_post: preview(SocialPlatform::Facebook),
            linkedin_post: preview(SocialPlatform::Linkedin),
            processing_date: Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        }
    }
}

fn ensure_parent(path: &Path) -> Result<(), ExportError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

/// Write `rows` as CSV (header first) to `path`, replacing any existing file
pub fn write_csv(rows: &[ListingRow], path: &Path) -> Result<(), ExportError> {
    ensure_parent(path)?;

    let csv_err = |source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    for row in rows {
        writer.serialize(row).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Report text for `log` as it stands now
pub fn render_report(log: &ActivityLog) -> String {
    let entries = log.entries();
    let heavy = "=".repeat(60);
    let light = "-".repeat(60);

    let mut out = String::new();
    out.push_str(REPORT_TITLE);
    out.push('\n');
    out.push_str(&format!(
        "Generated: {}\n",
        Local::now().format("%Y-%m-%dT%H:%M:%S%.6f")
    ));
    out.push_str(&heavy);
    out.push_str("\n\n");
    out.push_str("LOG ENTRIES:\n");
    out.push_str(&light);
    out.push('\n');
    for entry in &entries {
        out.push_str(&entry.to_string());
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&heavy);
    out.push('\n');
    out.push_str(&format!("Total Entries: {}\n", entries.len()));
    out
}

pub fn write_report(log: &ActivityLog, path: &Path) -> Result<(), ExportError> {
    ensure_parent(path)?;

    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::create(path).map_err(io_err)?;
    file.write_all(render_report(log).as_bytes()).map_err(io_err)?;
    file.flush().map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::compose_posts;
    use crate::model::sample_property;

    #[test]
    fn test_row_previews_are_truncated() {
        let property = sample_property();
        let description = "Spacious condo, \"renovated\" kitchen, and a view.".repeat(5);
        let posts = compose_posts(&description, &property);

        let row = ListingRow::new(&property, &description, &posts);

        assert_eq!(row.instagram_post.chars().count(), 100);
        assert_eq!(row.facebook_post.chars().count(), 100);
        assert_eq!(row.linkedin_post.chars().count(), 100);
        assert_eq!(row.description, description);
        assert_eq!(row.property_type, "2-Bedroom Condo");
    }

    #[test]
    fn test_csv_columns_and_quoting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/listings_export.csv");
        let property = sample_property();
        let description = "Line one, with comma\nline two";
        let posts = compose_posts(description, &property);
        let rows = vec![
            ListingRow::new(&property, description, &posts),
            ListingRow::new(&property, "Second", &compose_posts("Second", &property)),
        ];

        write_csv(&rows, &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(
            headers,
            vec![
                "property_id",
                "address",
                "price",
                "type",
                "description",
                "instagram_post",
                "facebook_post",
                "linkedin_post",
                "processing_date"
            ]
        );
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][4], description);
        assert_eq!(&records[1][2], "$450,000");
    }

    #[test]
    fn test_csv_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale contents that should disappear\n".repeat(50)).unwrap();

        write_csv(&[], &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_report_layout() {
        let log = ActivityLog::new();
        log.record("Starting");
        log.record("Downloaded image: a.jpg");
        log.error("downloading b: timeout");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workflow_report.txt");
        write_report(&log, &path).unwrap();
        let report = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], REPORT_TITLE);
        assert!(lines[1].starts_with("Generated: "));
        assert_eq!(lines[2], "=".repeat(60));
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "LOG ENTRIES:");
        assert_eq!(lines[5], "-".repeat(60));
        assert!(lines[6].ends_with("] Starting"));
        assert!(lines[7].ends_with("] Downloaded image: a.jpg"));
        assert!(lines[8].ends_with("] ERROR downloading b: timeout"));
        assert_eq!(lines[9], "");
        assert_eq!(lines[10], "=".repeat(60));
        assert_eq!(lines[11], "Total Entries: 3");
        assert_eq!(lines.len(), 12);
    }

    #[test]
    fn test_report_io_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should go
        let path = dir.path().join("report.txt");
        std::fs::create_dir(&path).unwrap();

        let result = write_report(&ActivityLog::new(), &path);
        assert!(matches!(result, Err(ExportError::Io { .. })));
    }
}
