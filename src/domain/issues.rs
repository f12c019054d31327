//! Core domain models for stateful-code issues and processing errors
//!
//! Issues are produced only at field-mutation sites, never for reads, and
//! carry enough structure for both reporters to render them without parsing
//! message text back apart.

use std::fmt;
use std::path::Path;

/// Severity levels for detected stateful-code issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IssueLevel {
    /// Mutations outside a sanctioned window
    Error,
    /// Advisory findings (mutable collection declarations and the like)
    Warning,
}

impl IssueLevel {
    /// Convert to the string used in report output
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
        }
    }
}

impl fmt::Display for IssueLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Syntactic form of the offending mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    /// Plain `field = value` assignment
    FieldAssignment,
    /// A mutating method call on a collection-typed field
    CollectionModification,
    /// `field++` / `++field`
    Increment,
    /// `field--` / `--field`
    Decrement,
    /// `field += value` and other compound operators
    CompoundAssignment,
}

impl IssueKind {
    /// Normalized label used by the CSV reporter and message rendering
    pub fn label(self) -> &'static str {
        match self {
            Self::FieldAssignment => "Field assignment",
            Self::CollectionModification => "Collection modification",
            Self::Increment => "Increment operation",
            Self::Decrement => "Decrement operation",
            Self::CompoundAssignment => "Compound assignment",
        }
    }
}

/// A stateful-code issue detected at a single mutation site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatefulIssue {
    /// Name of the mutated instance field
    pub field_name: String,
    /// Syntactic form of the mutation
    pub kind: IssueKind,
    /// Enclosing method at the moment the mutation was visited
    pub method_name: String,
    /// Severity of this issue
    pub level: IssueLevel,
    /// Mutating call name for collection modifications (`put`, `add`, ...)
    pub mutator: Option<String>,
}

impl StatefulIssue {
    /// Create a new issue for a mutation site
    pub fn new(
        field_name: impl Into<String>,
        kind: IssueKind,
        method_name: impl Into<String>,
        level: IssueLevel,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            kind,
            method_name: method_name.into(),
            level,
            mutator: None,
        }
    }

    /// Attach the mutating call name (collection modifications only)
    pub fn with_mutator(mut self, mutator: impl Into<String>) -> Self {
        self.mutator = Some(mutator.into());
        self
    }

    /// Render the human-readable message for this issue
    pub fn message(&self) -> String {
        match (&self.kind, &self.mutator) {
            (IssueKind::CollectionModification, Some(mutator)) => format!(
                "Collection modification '{}' to '{}' in method {}",
                mutator, self.field_name, self.method_name
            ),
            _ => format!(
                "{} to '{}' in method {}",
                self.kind.label(),
                self.field_name,
                self.method_name
            ),
        }
    }
}

/// Standard exit codes, following Unix sysexits conventions
pub mod exit_codes {
    /// Success - no errors occurred
    pub const SUCCESS: i32 = 0;
    /// General error - usage error, unreadable path, etc.
    pub const ERROR: i32 = 1;
    /// Stateful issues detected while --fail-on-detection is enabled
    /// (EX_DATAERR from BSD sysexits.h)
    pub const STATEFUL_ISSUES_DETECTED: i32 = 65;
}

/// Error types that can occur during detection and remediation
#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    /// File could not be read or written
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// The tree producer could not parse a source file
    #[error("Parse error in {file}: {message}")]
    Parse { file: String, message: String },

    /// Invalid configuration value (report format, workaround mode)
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl DetectorError {
    /// Create a parse error for a specific file
    pub fn parse(file: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.as_ref().display().to_string(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// Result type for detector operations
pub type DetectorResult<T> = Result<T, DetectorError>;
