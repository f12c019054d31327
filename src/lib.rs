//! Stateful-code detector for framework-managed Java beans
//!
//! Detects instance-state mutation inside Spring and EJB singleton beans by
//! walking each compilation unit's syntax tree, classifying field mutations
//! against a set of exemption rules (final fields, injected fields,
//! constructor and initializer windows, non-singleton scopes, thread-safe
//! collection types), and reporting what remains. An optional workaround
//! rewrites offending components with a `@Scope` annotation, either in place
//! or as a previewed unified diff.

pub mod analyzer;
pub mod domain;
pub mod report;
pub mod workaround;

pub use analyzer::FileProcessor;
pub use domain::{exit_codes, DetectorError, DetectorResult, IssueKind, IssueLevel, StatefulIssue};
pub use report::{IssueReporter, ReportFormat};
pub use workaround::{WorkaroundMode, WorkaroundSpec};
