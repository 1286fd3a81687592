//! Unification failure modes (spec §4.1).

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnifyError {
    OccursCycle,
    ArityMismatch { expected: usize, found: usize },
    MissingField { field: String },
    TypeMismatch,
}
