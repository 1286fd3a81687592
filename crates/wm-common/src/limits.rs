//! Centralized recursion/iteration limits for the analysis pipeline.
//!
//! Centralizing these values documents the rationale for each one and keeps
//! the solver, coverage analyzer, and inferencer from drifting out of sync.

/// Maximum depth for recursive descent while unifying two types (`unify`,
/// C1). Row types and nested `Constructor` applications can recurse
/// arbitrarily deep on adversarial input; beyond this depth `unify` reports
/// `occurs_cycle` rather than overflowing the stack.
pub const MAX_UNIFY_DEPTH: u32 = 512;

/// Maximum depth of the pattern matrix built by the coverage analyzer (C2)
/// when specializing nested constructor patterns (e.g. `Some(Some(Some(_)))`).
pub const MAX_PATTERN_MATRIX_DEPTH: u32 = 256;

/// Upper bound on Layer-2 (C4) fixpoint iterations. Per spec §5 this is
/// `O(n)` in the number of unification variables; this constant is a hard
/// backstop against a non-terminating fixpoint caused by an internal bug,
/// not a value callers should expect to hit.
pub const MAX_SOLVER_PASSES: u32 = 100_000;

/// Maximum number of modules considered while walking the dependency graph
/// in the loader (C7), guarding against unbounded memory use on a
/// pathological import graph.
pub const MAX_MODULES_PER_PROGRAM: u32 = 100_000;
