//! Layer-2 constraint solving (spec §2's C4, §4.4): runs a fixpoint over the
//! constraint stubs Layer-1 (`wm-infer`) deferred, classifies every hole,
//! dedupes diagnostics, and hands a fully-substituted node-type map to
//! Layer-3 (`wm-presenter`).

mod classify;
mod resolve;

pub use classify::HoleState;

use rustc_hash::{FxHashMap, FxHashSet};
use wm_common::{limits::MAX_SOLVER_PASSES, Diagnostic, DiagnosticReason, NodeId, PipelineOptions, Span};
use wm_infection::InfectionRegistry;
use wm_infer::{ConstraintStub, HoleCategory, Layer1Output, MarkedProgram, UnknownInfo};
use wm_types::{HoleId, Scheme, TypeArena, TypeEnv, TypeId, ValueEnv};

/// The complete result of running Layer-2 over one module's [`Layer1Output`]
/// (spec §4.4's bullet list).
pub struct Layer2Output {
    pub arena: TypeArena,
    pub marked: MarkedProgram,
    /// Every node Layer-1 recorded a provisional type for, substituted under
    /// the final solution.
    pub node_type_by_id: FxHashMap<NodeId, TypeId>,
    pub node_spans: FxHashMap<NodeId, Span>,
    pub holes: FxHashMap<HoleId, UnknownInfo>,
    pub hole_solutions: FxHashMap<HoleId, HoleState>,
    pub summaries: Vec<(String, Scheme)>,
    pub value_env: ValueEnv,
    pub type_env: TypeEnv,
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs Layer-2 to a fixpoint over `layer1`'s constraint stubs (spec §4.4:
/// "the solver repeats its pass over the stub list until a pass makes no
/// further unification progress, or the pass budget is exhausted").
#[tracing::instrument(skip_all)]
pub fn solve(layer1: Layer1Output, infection: &InfectionRegistry, options: &PipelineOptions) -> Layer2Output {
    let Layer1Output {
        mut arena,
        marked,
        constraint_stubs,
        holes,
        node_type_by_id,
        node_spans,
        summaries,
        value_env,
        type_env,
        mut diagnostics,
    } = layer1;

    run_fixpoint(&mut arena, infection, options, &constraint_stubs, &mut diagnostics);

    let hole_ids: Vec<HoleId> = holes.keys().copied().collect();
    let hole_solutions = classify::classify_holes(&mut arena, &hole_ids);
    emit_strict_unsolved_hole_diagnostics(&holes, &hole_solutions, options, &mut diagnostics);

    let resolved_node_types: FxHashMap<NodeId, TypeId> =
        node_type_by_id.into_iter().map(|(node, ty)| (node, arena.substitute(ty))).collect();

    dedup_diagnostics(&mut diagnostics);

    Layer2Output {
        arena,
        marked,
        node_type_by_id: resolved_node_types,
        node_spans,
        holes,
        hole_solutions,
        summaries,
        value_env,
        type_env,
        diagnostics,
    }
}

/// Re-scans every stub each pass (spec §4.4 doesn't require a dependency
/// graph, just convergence) until a pass binds no further unification
/// variable, or the pass budget runs out (`MAX_SOLVER_PASSES`, spec §5's
/// recursion-guard policy).
///
/// Convergence is judged by [`TypeArena::change_count`], not by diagnostic
/// counts: two passes can produce the same number of diagnostics while
/// still unifying different operands (a later pass fixes one mismatch but
/// surfaces a different one elsewhere), so counting diagnostics would stop
/// the loop before the arena is actually stable.
///
/// `diagnostics` arrives pre-seeded with Layer-1's own diagnostics (spec
/// §5: "diagnostics emitted by Layer-1 precede those emitted by Layer-2").
/// Each pass fully re-derives the solver's own diagnostics from scratch, so
/// only the final pass's solver diagnostics are appended — Layer-1's are
/// never touched.
fn run_fixpoint(
    arena: &mut TypeArena,
    infection: &InfectionRegistry,
    options: &PipelineOptions,
    stubs: &[ConstraintStub],
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut previous_changes = arena.change_count();
    let mut solver_diagnostics = Vec::new();
    for _pass in 0..MAX_SOLVER_PASSES {
        solver_diagnostics.clear();
        for stub in stubs {
            resolve::resolve_stub(arena, infection, options, stub, &mut solver_diagnostics);
        }
        let changes_now = arena.change_count();
        let made_progress = changes_now != previous_changes;
        previous_changes = changes_now;
        if !made_progress {
            break;
        }
    }
    diagnostics.extend(solver_diagnostics);
}

/// A hole left wholly unconstrained (`Unsolved`) is only itself a reportable
/// problem under strict hole mode (spec §4.6's hole-mode boundary rule,
/// generalized here to bare holes outside a boundary check) — permissive
/// mode treats an unconstrained hole as silently `Unknown`, the same
/// tolerance `PipelineOptions::default` documents for the rest of the
/// pipeline.
fn emit_strict_unsolved_hole_diagnostics(
    holes: &FxHashMap<HoleId, UnknownInfo>,
    solutions: &FxHashMap<HoleId, HoleState>,
    options: &PipelineOptions,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if options.hole_mode != wm_common::HoleMode::Strict {
        return;
    }
    for (id, info) in holes {
        if info.category == HoleCategory::ExprHole || info.category == HoleCategory::UserHole {
            continue;
        }
        if matches!(solutions.get(id), Some(HoleState::Unsolved) | None) {
            diagnostics.push(Diagnostic::new(DiagnosticReason::FreeVariable, info.origin_node, info.origin_span));
        }
    }
}

/// Drops later duplicates of a `(node, reason)` pair (spec's supplemented
/// "diagnostic dedup", grounded on `tsz-checker`'s
/// `has_more_specific_diagnostic_at_span`): a node can fail several stubs
/// for the same underlying reason across passes, and only the first is
/// worth surfacing.
fn dedup_diagnostics(diagnostics: &mut Vec<Diagnostic>) {
    let mut seen: FxHashSet<(NodeId, DiagnosticReason)> = FxHashSet::default();
    diagnostics.retain(|d| seen.insert((d.node, d.reason)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use wm_common::Span;

    fn empty_layer1(arena: TypeArena, stubs: Vec<ConstraintStub>) -> Layer1Output {
        Layer1Output {
            arena,
            marked: MarkedProgram::default(),
            constraint_stubs: stubs,
            holes: FxHashMap::default(),
            node_type_by_id: FxHashMap::default(),
            node_spans: FxHashMap::default(),
            summaries: Vec::new(),
            value_env: ValueEnv::new(),
            type_env: TypeEnv::new(),
            diagnostics: Vec::new(),
        }
    }

    #[test]
    fn a_call_stub_against_a_matching_function_type_produces_no_diagnostic() {
        let mut arena = TypeArena::new();
        let int_ty = arena.int();
        let callee = arena.func(int_ty, int_ty);
        let result = arena.fresh_var();
        let stub = ConstraintStub::Call {
            origin: NodeId(1),
            span: Span::new(0, 1),
            callee,
            argument: int_ty,
            result,
            argument_error_row: None,
        };
        let layer1 = empty_layer1(arena, vec![stub]);
        let out = solve(layer1, &InfectionRegistry::with_prelude(), &PipelineOptions::default());
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn a_call_stub_against_a_non_function_callee_reports_not_function() {
        let mut arena = TypeArena::new();
        let int_ty = arena.int();
        let result = arena.fresh_var();
        let stub = ConstraintStub::Call {
            origin: NodeId(7),
            span: Span::new(0, 1),
            callee: int_ty,
            argument: int_ty,
            result,
            argument_error_row: None,
        };
        let layer1 = empty_layer1(arena, vec![stub]);
        let out = solve(layer1, &InfectionRegistry::with_prelude(), &PipelineOptions::default());
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].reason, DiagnosticReason::NotFunction);
    }

    #[test]
    fn duplicate_diagnostics_on_the_same_node_and_reason_collapse_to_one() {
        let mut diagnostics = vec![
            Diagnostic::new(DiagnosticReason::NotFunction, NodeId(1), Span::new(0, 1)),
            Diagnostic::new(DiagnosticReason::NotFunction, NodeId(1), Span::new(0, 1)),
            Diagnostic::new(DiagnosticReason::TypeMismatch, NodeId(1), Span::new(0, 1)),
        ];
        dedup_diagnostics(&mut diagnostics);
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn a_constraint_flow_with_no_remaining_labels_is_silent() {
        let mut arena = TypeArena::new();
        let unit = arena.unit();
        let stub = ConstraintStub::ConstraintFlow {
            origin: NodeId(3),
            span: Span::new(0, 1),
            domain: wm_infection::InfectionDomain::Error,
            declared_return: unit,
            remaining_labels: Vec::new(),
        };
        let layer1 = empty_layer1(arena, vec![stub]);
        let out = solve(layer1, &InfectionRegistry::with_prelude(), &PipelineOptions::default());
        assert!(out.diagnostics.is_empty());
    }
}
