//! Layer-3 presentation (spec §2's C5, §4.5): turns a [`wm_solver::Layer2Output`]
//! into the emitter-boundary shape described in spec §6 — `nodeViews`,
//! rendered `summaries`, a three-way diagnostics split, and `holeSolutions`.

mod render;

pub use render::{render_scheme, render_type};

use rustc_hash::FxHashMap;
use wm_common::{Diagnostic, DiagnosticReason, NodeId, Span};
use wm_infection::InfectionRegistry;
use wm_solver::{HoleState, Layer2Output};
use wm_types::{HoleId, HoleProvenance};

/// A resolved node's final type, distinguishing a fully concrete result from
/// one still carrying hole residue (spec §6's `PartialType`).
#[derive(Clone, Debug, PartialEq)]
pub enum PartialType {
    Concrete(String),
    Unknown { ty: Option<String>, partial: Option<String>, conflicts: Vec<String> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeView {
    pub final_type: PartialType,
    pub source_span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolutionState {
    Solved,
    Partial,
    Conflicted,
    Unsolved,
}

/// A hole's classification rendered for display (spec §6's `Solution`).
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    pub state: SolutionState,
    pub rendered_type: Option<String>,
    pub partial: Option<String>,
    pub conflicts: Vec<String>,
    pub provenance: Option<HoleProvenance>,
}

/// A hole whose observed constraints could not be reconciled (spec §6's `C`
/// in `diagnostics.conflicts`) — distinct from [`Diagnostic`] since it names
/// a hole rather than a single fixed reason.
#[derive(Clone, Debug, PartialEq)]
pub struct HoleConflict {
    pub hole: HoleId,
    pub node: NodeId,
    pub span: Span,
    pub types: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layer3Diagnostics {
    pub solver: Vec<Diagnostic>,
    pub conflicts: Vec<HoleConflict>,
    pub flow: Vec<Diagnostic>,
}

pub struct Layer3Result {
    pub node_views: FxHashMap<NodeId, NodeView>,
    pub summaries: Vec<(String, String)>,
    pub diagnostics: Layer3Diagnostics,
    pub hole_solutions: FxHashMap<HoleId, Solution>,
}

/// Runs Layer-3 over Layer-2's output (spec §4.5's bullet list). Takes
/// `layer2` by value since the arena it owns is mutated in place while
/// rendering substitutes and formats types.
#[tracing::instrument(skip_all)]
pub fn present(layer2: Layer2Output, infection: &InfectionRegistry) -> Layer3Result {
    let Layer2Output { mut arena, node_type_by_id, node_spans, holes, hole_solutions, summaries, diagnostics, .. } = layer2;

    let node_views = node_type_by_id
        .into_iter()
        .map(|(node, ty)| {
            let resolved = arena.substitute(ty);
            let rendered = render::render_type(&mut arena, infection, resolved);
            let span = node_spans.get(&node).copied().unwrap_or_default();
            let view = NodeView { final_type: render_partial(&arena, resolved, rendered), source_span: span };
            (node, view)
        })
        .collect();

    let rendered_summaries = summaries
        .iter()
        .map(|(name, scheme)| (name.clone(), render::render_scheme(&mut arena, infection, scheme)))
        .collect();

    let rendered_hole_solutions = render_hole_solutions(&mut arena, infection, &hole_solutions);

    let (flow, solver) = diagnostics
        .into_iter()
        .partition::<Vec<_>, _>(|d| d.reason == DiagnosticReason::InfectiousCallResultMismatch);
    let conflicts = hole_conflicts(&mut arena, infection, &holes, &hole_solutions);

    Layer3Result {
        node_views,
        summaries: rendered_summaries,
        diagnostics: Layer3Diagnostics { solver, conflicts, flow },
        hole_solutions: rendered_hole_solutions,
    }
}

/// A node whose resolved type is itself an unfilled hole gets the `Unknown`
/// variant of [`PartialType`] rather than a rendered `"?"` string — callers
/// that want the hole's classification look it up in `hole_solutions` by
/// its [`HoleId`], carried inside the `Unknown` node's `TypeData`.
fn render_partial(arena: &wm_types::TypeArena, ty: wm_types::TypeId, rendered: String) -> PartialType {
    match arena.get(ty) {
        wm_types::TypeData::Unknown { .. } => {
            PartialType::Unknown { ty: None, partial: None, conflicts: Vec::new() }
        }
        _ => PartialType::Concrete(rendered),
    }
}

/// `provenance` is left `None` here — the arena doesn't expose a
/// `HoleId -> TypeData::Unknown` reverse lookup, only the forward
/// `TypeId -> TypeData` one, so it isn't wired up (see `DESIGN.md`).
fn render_hole_solutions(
    arena: &mut wm_types::TypeArena,
    infection: &InfectionRegistry,
    solutions: &FxHashMap<HoleId, HoleState>,
) -> FxHashMap<HoleId, Solution> {
    solutions
        .iter()
        .map(|(&id, state)| {
            let solution = match state {
                HoleState::Solved(ty) => Solution {
                    state: SolutionState::Solved,
                    rendered_type: Some(render::render_type(arena, infection, *ty)),
                    partial: None,
                    conflicts: Vec::new(),
                    provenance: None,
                },
                HoleState::Partial(ty) => Solution {
                    state: SolutionState::Partial,
                    rendered_type: None,
                    partial: Some(render::render_type(arena, infection, *ty)),
                    conflicts: Vec::new(),
                    provenance: None,
                },
                HoleState::Conflicted(tys) => Solution {
                    state: SolutionState::Conflicted,
                    rendered_type: None,
                    partial: None,
                    conflicts: tys.iter().map(|&t| render::render_type(arena, infection, t)).collect(),
                    provenance: None,
                },
                HoleState::Unsolved => Solution {
                    state: SolutionState::Unsolved,
                    rendered_type: None,
                    partial: None,
                    conflicts: Vec::new(),
                    provenance: None,
                },
            };
            (id, solution)
        })
        .collect()
}

fn hole_conflicts(
    arena: &mut wm_types::TypeArena,
    infection: &InfectionRegistry,
    holes: &FxHashMap<HoleId, wm_infer::UnknownInfo>,
    solutions: &FxHashMap<HoleId, HoleState>,
) -> Vec<HoleConflict> {
    let mut out = Vec::new();
    for (id, state) in solutions {
        if let HoleState::Conflicted(tys) = state {
            let Some(info) = holes.get(id) else { continue };
            out.push(HoleConflict {
                hole: *id,
                node: info.origin_node,
                span: info.origin_span,
                types: tys.iter().map(|&t| render::render_type(arena, infection, t)).collect(),
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use wm_types::TypeArena;

    #[test]
    fn a_plain_two_arg_constructor_with_no_infection_registration_renders_structurally() {
        let mut arena = TypeArena::new();
        let int_ty = arena.int();
        let string_ty = arena.string();
        let pair = arena.constructor("Pair", vec![int_ty, string_ty]);
        let rendered = render::render_type(&mut arena, &InfectionRegistry::with_prelude(), pair);
        assert_eq!(rendered, "Pair<Int, String>");
    }

    #[test]
    fn a_result_carrier_with_a_non_trivial_row_renders_with_the_infection_sigil() {
        let mut arena = TypeArena::new();
        let int_ty = arena.int();
        let mut cases = indexmap::IndexMap::new();
        cases.insert("Missing".to_string(), None);
        let row = arena.effect_row(cases, None, false);
        let result_ty = arena.constructor("Result", vec![int_ty, row]);
        let rendered = render::render_type(&mut arena, &InfectionRegistry::with_prelude(), result_ty);
        assert!(rendered.starts_with('\u{26a1}'), "expected infection sigil, got {rendered}");
        assert!(rendered.contains("Missing"));
    }

    #[test]
    fn a_hole_typed_node_view_reports_as_unknown_not_a_rendered_question_mark() {
        let mut arena = TypeArena::new();
        let hole = arena.fresh_hole(wm_types::HoleProvenance::ExplicitHole);
        let view = render_partial(&arena, hole, "?".to_string());
        assert!(matches!(view, PartialType::Unknown { .. }));
    }
}
