//! Structured diagnostics (spec §3, §7).
//!
//! A `Diagnostic` is always anchored to a `NodeId`/`Span` and never aborts
//! the pipeline — see §7's propagation policy. `DiagnosticReason` is the
//! fixed, closed set of reasons the tests key off of.

use crate::{NodeId, Span};
use serde::{Deserialize, Serialize};

/// The fixed reason taxonomy from spec §3.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticReason {
    NotFunction,
    NotBoolean,
    NotNumeric,
    NotRecord,
    MissingField,
    DuplicateRecordField,
    BranchMismatch,
    TypeMismatch,
    ArityMismatch,
    OccursCycle,
    NonExhaustiveMatch,
    FreeVariable,
    InfectiousCallResultMismatch,
    DuplicateVariable,
}

impl DiagnosticReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            DiagnosticReason::NotFunction => "not_function",
            DiagnosticReason::NotBoolean => "not_boolean",
            DiagnosticReason::NotNumeric => "not_numeric",
            DiagnosticReason::NotRecord => "not_record",
            DiagnosticReason::MissingField => "missing_field",
            DiagnosticReason::DuplicateRecordField => "duplicate_record_field",
            DiagnosticReason::BranchMismatch => "branch_mismatch",
            DiagnosticReason::TypeMismatch => "type_mismatch",
            DiagnosticReason::ArityMismatch => "arity_mismatch",
            DiagnosticReason::OccursCycle => "occurs_cycle",
            DiagnosticReason::NonExhaustiveMatch => "non_exhaustive_match",
            DiagnosticReason::FreeVariable => "free_variable",
            DiagnosticReason::InfectiousCallResultMismatch => "infectious_call_result_mismatch",
            DiagnosticReason::DuplicateVariable => "duplicate_variable",
        }
    }
}

/// Additional structured context for a diagnostic. Kept as a small closed
/// set of shapes rather than a free-form string bag, so presentation (C5)
/// can render each reason consistently.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticDetails {
    pub expected: Option<String>,
    pub found: Option<String>,
    pub field: Option<String>,
    pub names: Vec<String>,
    pub related: Vec<(NodeId, Span, String)>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub reason: DiagnosticReason,
    pub node: NodeId,
    pub span: Span,
    pub details: DiagnosticDetails,
}

impl Diagnostic {
    #[must_use]
    pub fn new(reason: DiagnosticReason, node: NodeId, span: Span) -> Self {
        Diagnostic { reason, node, span, details: DiagnosticDetails::default() }
    }

    #[must_use]
    pub fn with_expected_found(mut self, expected: impl Into<String>, found: impl Into<String>) -> Self {
        self.details.expected = Some(expected.into());
        self.details.found = Some(found.into());
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.details.field = Some(field.into());
        self
    }

    #[must_use]
    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.details.names = names;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_strings_match_the_fixed_taxonomy() {
        assert_eq!(DiagnosticReason::NotFunction.as_str(), "not_function");
        assert_eq!(
            DiagnosticReason::InfectiousCallResultMismatch.as_str(),
            "infectious_call_result_mismatch"
        );
    }
}
