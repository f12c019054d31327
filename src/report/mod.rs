//! Issue reporting with interchangeable output formats
//!
//! Reporters translate detection results into rendered text; the driver owns
//! actually printing it. Keeping reporters pure string producers makes the
//! de-duplication and header rules directly testable.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::domain::{DetectorError, DetectorResult, StatefulIssue};

/// Supported report output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable output grouped by file and field
    Default,
    /// De-duplicated CSV rows for spreadsheet or CI consumption
    Csv,
}

impl ReportFormat {
    /// Parse format from its command-line spelling
    pub fn from_str(value: &str) -> DetectorResult<Self> {
        match value.to_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "csv" => Ok(Self::Csv),
            other => Err(DetectorError::config(format!(
                "Unsupported report format: {other}. Supported formats: {}",
                Self::all_formats().join(", ")
            ))),
        }
    }

    /// Get all available format names
    pub fn all_formats() -> &'static [&'static str] {
        &["default", "csv"]
    }

    /// Create a fresh reporter for this format
    pub fn create_reporter(self) -> Box<dyn IssueReporter> {
        match self {
            Self::Default => Box::new(DefaultReporter::new()),
            Self::Csv => Box::new(CsvReporter::new()),
        }
    }
}

/// Strategy interface for rendering detection results.
///
/// Each method returns the text to emit; lifecycle hooks default to nothing
/// so simple renderers only implement `report_issues`.
pub trait IssueReporter {
    /// Called once before any file is processed (header emission).
    fn initialize(&mut self) -> String {
        String::new()
    }

    /// Render the issues found in one file.
    fn report_issues(&mut self, file_path: &Path, issues: &[StatefulIssue]) -> String;

    /// Called once after all processing completes (footer emission).
    fn finish(&mut self) -> String {
        String::new()
    }
}

/// Human-readable reporter: one file header per path, issues grouped by
/// field underneath.
pub struct DefaultReporter {
    reported_files: HashSet<String>,
}

impl DefaultReporter {
    pub fn new() -> Self {
        Self {
            reported_files: HashSet::new(),
        }
    }
}

impl Default for DefaultReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl IssueReporter for DefaultReporter {
    fn report_issues(&mut self, file_path: &Path, issues: &[StatefulIssue]) -> String {
        if issues.is_empty() {
            return String::new();
        }

        let mut output = String::new();

        // Header exactly once per file path within a run
        let file_key = file_path.display().to_string();
        if self.reported_files.insert(file_key.clone()) {
            output.push_str(&format!("Stateful code detected in: {file_key}\n"));
        }

        let mut by_field: BTreeMap<&str, Vec<&StatefulIssue>> = BTreeMap::new();
        for issue in issues {
            by_field.entry(&issue.field_name).or_default().push(issue);
        }

        for (field_name, field_issues) in by_field {
            output.push_str(&format!("  Field: {field_name}\n"));
            for issue in field_issues {
                output.push_str(&format!("    - {}\n", issue.message()));
            }
        }

        output
    }
}

/// CSV reporter: fixed five-column header once per run, one row per unique
/// (file, field, issue-kind, level) tuple.
pub struct CsvReporter {
    header_printed: bool,
    printed_records: HashSet<String>,
}

impl CsvReporter {
    pub fn new() -> Self {
        Self {
            header_printed: false,
            printed_records: HashSet::new(),
        }
    }
}

impl Default for CsvReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl IssueReporter for CsvReporter {
    fn initialize(&mut self) -> String {
        if self.header_printed {
            return String::new();
        }
        self.header_printed = true;
        "File,Field,Issue,Level,Method\n".to_string()
    }

    fn report_issues(&mut self, file_path: &Path, issues: &[StatefulIssue]) -> String {
        let mut output = String::new();

        for issue in issues {
            let file = file_path.display().to_string();
            let unique_key = format!(
                "{}|{}|{}|{}",
                file,
                issue.field_name,
                issue.kind.label(),
                issue.level
            );
            if !self.printed_records.insert(unique_key) {
                continue;
            }

            output.push_str(&format!(
                "{},{},{},{},{}\n",
                escape_csv(&file),
                escape_csv(&issue.field_name),
                escape_csv(issue.kind.label()),
                escape_csv(issue.level.as_str()),
                escape_csv(&issue.method_name),
            ));
        }

        output
    }
}

/// Wrap a value in quotes (doubling internal quotes) when it contains a
/// comma, quote, or newline.
fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
