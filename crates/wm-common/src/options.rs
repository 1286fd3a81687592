//! Pipeline-wide configuration, threaded through all three layers and the
//! loader. The analogue of `tsz-common::checker_options::CheckerOptions`.

/// How the infection registry (C6) treats unfilled holes reaching a function
/// boundary in the `hole` domain (spec §4.6).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HoleMode {
    /// Unfilled holes at a boundary are allowed; no diagnostic.
    #[default]
    Permissive,
    /// Unfilled holes at a boundary are reported.
    Strict,
}

/// Options controlling the behavior of the three-layer pipeline.
///
/// Construct via `PipelineOptions::default()` and override fields with the
/// `with_*` builders; this mirrors `CheckerOptions`'s plain-struct-plus-flags
/// shape rather than a typestate builder, since every field is independently
/// togglable and has a sensible default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineOptions {
    /// When true (the default), a module's parsed `core` flag is the sole
    /// source of truth for whether the prelude's operator table is merged
    /// in. This resolves the Open Question in spec §9 about path-based
    /// heuristics: this implementation never falls back to one.
    pub core_flag_is_authoritative: bool,
    /// How the infection registry treats unresolved holes at a boundary.
    pub hole_mode: HoleMode,
    /// When true, Layer-1 raises the legacy-throw `InferError` path instead
    /// of collecting diagnostics (spec §7's fail-fast opt-in).
    pub fail_fast: bool,
    /// When true, parser-level tolerant mode is assumed even for inputs
    /// this crate cannot itself verify came from a tolerant parse; when
    /// false, a hard parse failure upstream is treated as fatal by the
    /// loader rather than silently continuing.
    pub tolerant: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            core_flag_is_authoritative: true,
            hole_mode: HoleMode::Permissive,
            fail_fast: false,
            tolerant: true,
        }
    }
}

impl PipelineOptions {
    #[must_use]
    pub fn with_hole_mode(mut self, mode: HoleMode) -> Self {
        self.hole_mode = mode;
        self
    }

    #[must_use]
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    #[must_use]
    pub fn with_tolerant(mut self, tolerant: bool) -> Self {
        self.tolerant = tolerant;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_reference_decisions() {
        let opts = PipelineOptions::default();
        assert!(opts.core_flag_is_authoritative);
        assert_eq!(opts.hole_mode, HoleMode::Permissive);
        assert!(!opts.fail_fast);
    }
}
