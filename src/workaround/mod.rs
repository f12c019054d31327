//! Scope-annotation workaround for stateful beans
//!
//! Rewrites an offending Spring component so the framework stops sharing one
//! instance: inserts the `org.springframework.context.annotation` imports and
//! a `@Scope(scopeName = ..., proxyMode = ...)` line in front of the component
//! marker. Apply mode writes the file back; preview mode prints a unified
//! diff of what apply would do.

pub mod diff;

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::analyzer::exemptions::REMEDIABLE_MARKERS;
use crate::domain::{DetectorError, DetectorResult};

const SCOPE_IMPORT: &str = "import org.springframework.context.annotation.Scope;";
const PROXY_MODE_IMPORT: &str = "import org.springframework.context.annotation.ScopedProxyMode;";

/// How the rewritten source is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkaroundMode {
    /// Write the rewritten source back to the file.
    Apply,
    /// Print a unified diff without touching the file.
    Preview,
}

impl WorkaroundMode {
    /// Parse mode from its command-line spelling.
    pub fn from_str(value: &str) -> DetectorResult<Self> {
        match value.to_lowercase().as_str() {
            "apply" => Ok(Self::Apply),
            "preview" => Ok(Self::Preview),
            other => Err(DetectorError::config(format!(
                "Invalid workaround mode: {other}. Valid values are: apply, preview"
            ))),
        }
    }
}

/// Parameters of one workaround run.
#[derive(Debug, Clone)]
pub struct WorkaroundSpec {
    pub scope_name: String,
    pub proxy_mode: String,
    pub mode: WorkaroundMode,
}

impl WorkaroundSpec {
    pub fn new(scope_name: impl Into<String>, proxy_mode: impl Into<String>, mode: WorkaroundMode) -> Self {
        Self {
            scope_name: scope_name.into(),
            proxy_mode: proxy_mode.into(),
            mode,
        }
    }
}

impl Default for WorkaroundSpec {
    fn default() -> Self {
        Self {
            scope_name: "prototype".to_string(),
            proxy_mode: "TARGET_CLASS".to_string(),
            mode: WorkaroundMode::Preview,
        }
    }
}

/// Apply the workaround to one file according to the spec's mode. Returns
/// the text printed to stdout (empty when nothing changed).
pub fn run_workaround(file_path: &Path, spec: &WorkaroundSpec) -> DetectorResult<String> {
    let original = fs::read_to_string(file_path)?;
    let transformed = rewrite_source(&original, spec);

    if transformed == original {
        debug!(file = %file_path.display(), "workaround not applicable, source unchanged");
        return Ok(String::new());
    }

    match spec.mode {
        WorkaroundMode::Apply => {
            fs::write(file_path, &transformed)?;
            Ok(format!("Applied workaround to: {}\n", file_path.display()))
        }
        WorkaroundMode::Preview => Ok(diff::unified_diff(
            &original,
            &transformed,
            &file_path.display().to_string(),
        )),
    }
}

/// Rewrite one compilation unit, inserting the scope annotation and its
/// imports. Returns the source unchanged when the file already carries a
/// `@Scope` (whatever its value) or has no remediable component marker.
pub fn rewrite_source(source: &str, spec: &WorkaroundSpec) -> String {
    if source.contains("@Scope") || !has_remediable_marker(source) {
        return source.to_string();
    }

    let lines: Vec<&str> = {
        let mut lines: Vec<&str> = source.split('\n').collect();
        while lines.last() == Some(&"") {
            lines.pop();
        }
        lines
    };

    let mut output: Vec<String> = Vec::with_capacity(lines.len() + 3);
    let mut imports_inserted = false;
    let mut annotation_inserted = false;

    for (index, line) in lines.iter().enumerate() {
        let trimmed = line.trim_start();

        // Imports go in front of the first import run
        if !imports_inserted && trimmed.starts_with("import ") {
            let previous_is_import = index
                .checked_sub(1)
                .map(|prev| lines[prev].trim_start().starts_with("import "))
                .unwrap_or(false);
            if !previous_is_import {
                output.push(SCOPE_IMPORT.to_string());
                output.push(PROXY_MODE_IMPORT.to_string());
                imports_inserted = true;
            }
        }

        if !annotation_inserted && starts_with_remediable_marker(trimmed) {
            let indent = &line[..line.len() - trimmed.len()];
            output.push(format!(
                "{indent}@Scope(scopeName = \"{}\", proxyMode = ScopedProxyMode.{})",
                spec.scope_name, spec.proxy_mode
            ));
            annotation_inserted = true;
        }

        output.push((*line).to_string());
    }

    let mut result = output.join("\n");
    result.push('\n');
    result
}

fn has_remediable_marker(source: &str) -> bool {
    REMEDIABLE_MARKERS
        .iter()
        .any(|marker| source.contains(&format!("@{marker}")))
}

fn starts_with_remediable_marker(trimmed_line: &str) -> bool {
    trimmed_line
        .strip_prefix('@')
        .is_some_and(|rest| REMEDIABLE_MARKERS.iter().any(|marker| rest.starts_with(marker)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    const SERVICE: &str = "package com.example;\n\n\
        import org.springframework.stereotype.Service;\n\
        import java.util.List;\n\n\
        @Service\n\
        public class OrderService {\n\
        }\n";

    fn spec() -> WorkaroundSpec {
        WorkaroundSpec::default()
    }

    #[test]
    fn test_inserts_imports_before_first_import_run() {
        let result = rewrite_source(SERVICE, &spec());
        let lines: Vec<&str> = result.lines().collect();

        assert_eq!(lines[2], SCOPE_IMPORT);
        assert_eq!(lines[3], PROXY_MODE_IMPORT);
        assert_eq!(lines[4], "import org.springframework.stereotype.Service;");
    }

    #[test]
    fn test_inserts_scope_annotation_before_marker() {
        let result = rewrite_source(SERVICE, &spec());
        let lines: Vec<&str> = result.lines().collect();

        let marker_at = lines.iter().position(|l| *l == "@Service").unwrap();
        assert_eq!(
            lines[marker_at - 1],
            "@Scope(scopeName = \"prototype\", proxyMode = ScopedProxyMode.TARGET_CLASS)"
        );
    }

    #[test]
    fn test_copies_marker_indentation() {
        let nested = "public class Outer {\n    @Component\n    static class Inner { }\n}\n";
        let result = rewrite_source(nested, &spec());

        assert!(result.contains(
            "    @Scope(scopeName = \"prototype\", proxyMode = ScopedProxyMode.TARGET_CLASS)\n    @Component\n"
        ));
    }

    #[test]
    fn test_custom_scope_and_proxy_mode() {
        let custom = WorkaroundSpec::new("request", "INTERFACES", WorkaroundMode::Preview);
        let result = rewrite_source(SERVICE, &custom);

        assert!(result.contains(
            "@Scope(scopeName = \"request\", proxyMode = ScopedProxyMode.INTERFACES)"
        ));
    }

    #[test]
    fn test_only_first_marker_annotated() {
        let two = "@Service\nclass A { }\n@Component\nclass B { }\n";
        let result = rewrite_source(two, &spec());

        assert_eq!(result.matches("@Scope(").count(), 1);
        assert!(result.starts_with("@Scope("));
    }

    #[test]
    fn test_existing_scope_leaves_source_alone() {
        let scoped = "@Service\n@Scope(\"singleton\")\nclass A { }\n";
        assert_eq!(rewrite_source(scoped, &spec()), scoped);
    }

    #[test]
    fn test_session_bean_is_not_remediable() {
        let ejb = "import javax.ejb.Stateless;\n\n@Stateless\nclass A { }\n";
        assert_eq!(rewrite_source(ejb, &spec()), ejb);
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let once = rewrite_source(SERVICE, &spec());
        let twice = rewrite_source(&once, &spec());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(WorkaroundMode::from_str("apply").unwrap(), WorkaroundMode::Apply);
        assert_eq!(WorkaroundMode::from_str("PREVIEW").unwrap(), WorkaroundMode::Preview);
        assert!(WorkaroundMode::from_str("dry-run").is_err());
    }

    #[test]
    fn test_apply_writes_file_and_reports() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SERVICE.as_bytes()).unwrap();
        file.flush().unwrap();

        let apply = WorkaroundSpec::new("prototype", "TARGET_CLASS", WorkaroundMode::Apply);
        let output = run_workaround(file.path(), &apply).unwrap();

        assert!(output.starts_with("Applied workaround to: "));
        let written = std::fs::read_to_string(file.path()).unwrap();
        assert!(written.contains("@Scope(scopeName = \"prototype\""));
    }

    #[test]
    fn test_preview_prints_diff_without_writing() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SERVICE.as_bytes()).unwrap();
        file.flush().unwrap();

        let output = run_workaround(file.path(), &spec()).unwrap();

        assert!(output.contains("+@Scope(scopeName = \"prototype\""));
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), SERVICE);
    }

    #[test]
    fn test_unchanged_source_produces_no_output() {
        let mut file = NamedTempFile::new().unwrap();
        let ejb = "@Stateless\nclass A { }\n";
        file.write_all(ejb.as_bytes()).unwrap();
        file.flush().unwrap();

        let apply = WorkaroundSpec::new("prototype", "TARGET_CLASS", WorkaroundMode::Apply);
        assert_eq!(run_workaround(file.path(), &apply).unwrap(), "");
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), ejb);
    }
}
