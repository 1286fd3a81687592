//! The coverage report shape (spec §4.2).

/// Result of analyzing a scrutinee type against a non-empty arm list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CoverageReport {
    /// Constructor names (or the literal `_`) that would make the match
    /// exhaustive.
    pub missing_constructors: Vec<String>,
    /// Indices into the arm list of arms subsumed by an earlier arm.
    pub redundant_arms: Vec<usize>,
    /// Labels explicitly matched by some arm.
    pub covered_constructors: Vec<String>,
    /// Whether a wildcard or variable pattern appears anywhere in the arm
    /// list.
    pub covers_tail: bool,
    /// Only set for `EffectRow` scrutinees: whether the match discharges the
    /// effect entirely (spec §4.6's discharge rule), and what remains if
    /// not.
    pub row_discharge: Option<RowDischarge>,
}

impl CoverageReport {
    #[must_use]
    pub fn is_exhaustive(&self) -> bool {
        self.covers_tail || self.missing_constructors.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RowDischarge {
    pub discharges_result: bool,
    /// Row labels still live after discharge (empty when fully discharged).
    pub remaining_labels: Vec<String>,
}
