//! Domain layer for Stateful Detector
//!
//! Pure models for stateful-code detection: issue kinds and severities,
//! process exit codes, and the error taxonomy shared by the analyzer,
//! reporters, and workaround transformer. Independent of file-system and
//! parser concerns.

pub mod issues;

// Re-export main domain types for convenience
pub use issues::*;
