//! Static analysis of Java sources for singleton-state mutation
//!
//! `FileProcessor` is the sequential driver: it walks the input, parses each
//! `.java` compilation unit, runs the detector over it, and routes findings
//! to the configured reporter or to the scope workaround. Files are processed
//! one at a time; detector instances never outlive a single file.

pub mod detector;
pub mod exemptions;
pub mod java;

use std::fs;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::domain::{exit_codes, DetectorError, DetectorResult};
use crate::report::IssueReporter;
use crate::workaround::{run_workaround, WorkaroundSpec};

use detector::StatefulCodeDetector;
use java::JavaParser;

/// Sequential driver over files and directories.
pub struct FileProcessor {
    parser: JavaParser,
    reporter: Box<dyn IssueReporter>,
    workaround: Option<WorkaroundSpec>,
    allowed_scopes: Vec<String>,
    fail_on_detection: bool,
}

impl FileProcessor {
    pub fn new(
        reporter: Box<dyn IssueReporter>,
        workaround: Option<WorkaroundSpec>,
        allowed_scopes: Vec<String>,
        fail_on_detection: bool,
    ) -> DetectorResult<Self> {
        Ok(Self {
            parser: JavaParser::new()?,
            reporter,
            workaround,
            allowed_scopes,
            fail_on_detection,
        })
    }

    /// Process a single file. Non-Java files are skipped silently.
    pub fn process_file(&mut self, file_path: &Path) -> DetectorResult<i32> {
        if !is_java_file(file_path) {
            debug!(file = %file_path.display(), "skipping non-Java file");
            return Ok(exit_codes::SUCCESS);
        }

        print!("{}", self.reporter.initialize());
        let found = self.analyze_one(file_path)?;
        print!("{}", self.reporter.finish());

        Ok(self.exit_code(found))
    }

    /// Process every `.java` file under a directory, strictly sequentially
    /// in sorted path order. Per-file failures are reported to stderr and do
    /// not stop the walk.
    pub fn process_directory(&mut self, dir_path: &Path) -> DetectorResult<i32> {
        print!("{}", self.reporter.initialize());

        let mut paths: Vec<_> = WalkDir::new(dir_path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file() && is_java_file(entry.path()))
            .map(|entry| entry.into_path())
            .collect();
        paths.sort();

        let mut found_any = false;
        for path in &paths {
            match self.analyze_one(path) {
                Ok(found) => found_any |= found,
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "file skipped");
                    eprintln!("Error processing file {}: {err}", path.display());
                }
            }
        }

        print!("{}", self.reporter.finish());
        Ok(self.exit_code(found_any))
    }

    /// Parse and detect on one file; returns whether issues were found.
    fn analyze_one(&mut self, file_path: &Path) -> DetectorResult<bool> {
        let source = fs::read_to_string(file_path)?;
        let tree = self
            .parser
            .parse(&source)
            .ok_or_else(|| DetectorError::parse(file_path, "parser produced no tree"))?;

        let mut detector = StatefulCodeDetector::new(&source, &self.allowed_scopes);
        detector.visit_unit(tree.root_node());

        if !detector.has_issues() {
            return Ok(false);
        }

        let issues = detector.into_issues();
        debug!(file = %file_path.display(), count = issues.len(), "stateful issues detected");

        match &self.workaround {
            Some(spec) => print!("{}", run_workaround(file_path, spec)?),
            None => print!("{}", self.reporter.report_issues(file_path, &issues)),
        }

        Ok(true)
    }

    fn exit_code(&self, found_issues: bool) -> i32 {
        if found_issues && self.fail_on_detection {
            exit_codes::STATEFUL_ISSUES_DETECTED
        } else {
            exit_codes::SUCCESS
        }
    }
}

fn is_java_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "java")
}
