//! Shared primitives for the workman front-end analysis core.
//!
//! This crate provides foundational types used across every layer of the
//! pipeline:
//! - `NodeId` — stable AST node identity (assigned by the external parser)
//! - `Span` — byte-offset source ranges
//! - `Diagnostic` — structured, node-anchored analysis results
//! - `limits` — recursion/iteration guards shared by the solver and coverage analyzer
//! - `options` — pipeline-wide configuration

pub mod diagnostic;
pub mod limits;
pub mod node_id;
pub mod options;
pub mod span;

pub use diagnostic::{Diagnostic, DiagnosticReason};
pub use node_id::NodeId;
pub use options::{HoleMode, PipelineOptions};
pub use span::Span;
