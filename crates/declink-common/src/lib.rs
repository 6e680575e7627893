//! Common types and utilities for the declink lowering workspace.
//!
//! This crate provides foundational types used across all declink crates:
//! - String interning (`Atom`, `Interner`)
//! - Diagnostic records and message templates
//! - Centralized limits and thresholds

// String interning for declaration names
pub mod interner;
pub use interner::{Atom, Interner};

// Diagnostic records forwarded to the diagnostics collaborator
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticMessage};

// Centralized limits and thresholds
pub mod limits;
