//! Per-stub-kind resolution (spec §4.4's constraint-stub table): each
//! [`ConstraintStub`] variant becomes one or more `arena.unify` calls plus,
//! on failure, a [`Diagnostic`] keyed to the stub's own origin/span.

use wm_common::{Diagnostic, DiagnosticReason, PipelineOptions};
use wm_infection::{check_function_boundary, BoundaryVerdict, InfectionRegistry};
use wm_infer::ConstraintStub;
use wm_types::{TypeArena, TypeData};

/// Resolves one stub against the arena, pushing any diagnostic it produces
/// into `diagnostics`. Returns `true` if the stub performed a unification
/// that could plausibly still be re-checked on a later pass (used by the
/// caller only for bookkeeping; every stub here is idempotent to re-run).
pub fn resolve_stub(
    arena: &mut TypeArena,
    infection: &InfectionRegistry,
    options: &PipelineOptions,
    stub: &ConstraintStub,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match stub {
        ConstraintStub::Call { origin, span, callee, argument, result, argument_error_row } => {
            resolve_call(arena, infection, *origin, *span, *callee, *argument, *result, *argument_error_row, diagnostics);
        }
        ConstraintStub::Annotation { origin, span, annotation, value } => {
            resolve_annotation(arena, infection, options, *origin, *span, *annotation, *value, diagnostics);
        }
        ConstraintStub::BranchJoin { origin, span, branches } => {
            resolve_branch_join(arena, *origin, *span, branches, diagnostics);
        }
        ConstraintStub::HasField { origin, span, target, field, result } => {
            resolve_has_field(arena, *origin, *span, *target, field, *result, diagnostics);
        }
        ConstraintStub::Numeric { origin, span, operands, result } => {
            resolve_scalar_class(arena, *origin, *span, operands, *result, DiagnosticReason::NotNumeric, arena_int, diagnostics);
        }
        ConstraintStub::Boolean { origin, span, operands, result } => {
            resolve_scalar_class(arena, *origin, *span, operands, *result, DiagnosticReason::NotBoolean, arena_bool, diagnostics);
        }
        ConstraintStub::ConstraintRewrite { .. } => {
            // Purely informational for `ConstraintFlow`'s aggregation in
            // Layer-1; nothing left to unify once the row discharge itself
            // was computed by `wm_coverage`.
        }
        ConstraintStub::ConstraintFlow { origin, span, domain, declared_return, remaining_labels } => {
            resolve_constraint_flow(arena, infection, options, *origin, *span, *domain, *declared_return, remaining_labels, diagnostics);
        }
    }
}

fn arena_int(arena: &mut TypeArena) -> wm_types::TypeId {
    arena.int()
}

fn arena_bool(arena: &mut TypeArena) -> wm_types::TypeId {
    arena.bool()
}

#[allow(clippy::too_many_arguments)]
fn resolve_call(
    arena: &mut TypeArena,
    infection: &InfectionRegistry,
    origin: wm_common::NodeId,
    span: wm_common::Span,
    callee: wm_types::TypeId,
    argument: wm_types::TypeId,
    result: wm_types::TypeId,
    argument_error_row: Option<wm_types::TypeId>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let resolved_callee = arena.resolve_shallow(callee);
    match arena.get(resolved_callee).clone() {
        TypeData::Func { from, to } => {
            if arena.unify(from, argument).is_err() {
                diagnostics.push(mismatch(arena, DiagnosticReason::TypeMismatch, origin, span, from, argument));
            }
            if arena.unify(to, result).is_err() {
                diagnostics.push(mismatch(arena, DiagnosticReason::TypeMismatch, origin, span, to, result));
            }
        }
        TypeData::Unknown { .. } | TypeData::Var(_) => {
            // Still underdetermined; re-synthesize a function shape and
            // unify against it so a later pass can pick this back up once
            // `callee` narrows.
            let fresh_to = arena.fresh_var();
            let synthesized = arena.func(argument, fresh_to);
            if arena.unify(resolved_callee, synthesized).is_ok() {
                let _ = arena.unify(result, fresh_to);
            }
        }
        _ => diagnostics.push(Diagnostic::new(DiagnosticReason::NotFunction, origin, span)),
    }

    if let Some(row) = argument_error_row {
        fold_argument_error_row(arena, infection, origin, span, result, row, diagnostics);
    }
}

/// An infectious error row riding along the call's argument spreads into
/// the call's own result when that result is itself an infectious carrier
/// (spec §4.4's `Call` stub table: "fold `argumentErrorRow` into the
/// callee's result row — this is how infectious Results spread through
/// ordinary calls"), even when the callee's declared return type never
/// names that particular case on its own.
fn fold_argument_error_row(
    arena: &mut TypeArena,
    infection: &InfectionRegistry,
    origin: wm_common::NodeId,
    span: wm_common::Span,
    result: wm_types::TypeId,
    argument_row: wm_types::TypeId,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some((_, result_row)) = infectious_carrier_of(arena, infection, result) else { return };
    if arena.unify(result_row, argument_row).is_err() {
        diagnostics.push(mismatch(arena, DiagnosticReason::TypeMismatch, origin, span, result_row, argument_row));
    }
}

/// A `let name: T = value;` annotation is a boundary too (spec §4.6's
/// boundary rule generalizes beyond a function's own return position): if
/// the annotation and the value's inferred type genuinely don't unify, but
/// the value is an undischarged infectious carrier, the mismatch is reported
/// as `infectious_call_result_mismatch` rather than a plain `type_mismatch`
/// — exactly the "spread then annotation mismatch" scenario.
#[allow(clippy::too_many_arguments)]
fn resolve_annotation(
    arena: &mut TypeArena,
    infection: &InfectionRegistry,
    options: &PipelineOptions,
    origin: wm_common::NodeId,
    span: wm_common::Span,
    annotation: wm_types::TypeId,
    value: wm_types::TypeId,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let carrier = infectious_carrier_of(arena, infection, value);

    if arena.unify(annotation, value).is_ok() {
        return;
    }

    if let Some((domain, row)) = carrier {
        let remaining_labels = row_labels(arena, row);
        if !remaining_labels.is_empty() {
            let annotation_is_carrier = infectious_carrier_of(arena, infection, annotation).is_some();
            let verdict = check_function_boundary(domain, &remaining_labels, annotation_is_carrier, options.hole_mode, false);
            if let BoundaryVerdict::Violated = verdict {
                diagnostics.push(
                    Diagnostic::new(DiagnosticReason::InfectiousCallResultMismatch, origin, span)
                        .with_names(remaining_labels),
                );
                return;
            }
        }
    }

    diagnostics.push(mismatch(arena, DiagnosticReason::TypeMismatch, origin, span, annotation, value));
}

/// If `ty` resolves to a registered infectious carrier's two-argument
/// `Constructor`, its domain plus the row component (args[1]).
fn infectious_carrier_of(
    arena: &mut TypeArena,
    infection: &InfectionRegistry,
    ty: wm_types::TypeId,
) -> Option<(wm_infection::InfectionDomain, wm_types::TypeId)> {
    let resolved = arena.substitute(ty);
    match arena.get(resolved).clone() {
        TypeData::Constructor { name, args } if args.len() == 2 => {
            infection.lookup(&name).map(|info| (info.domain, args[1]))
        }
        _ => None,
    }
}

fn row_labels(arena: &mut TypeArena, row: wm_types::TypeId) -> Vec<String> {
    let resolved = arena.substitute(row);
    match arena.get(resolved).clone() {
        TypeData::EffectRow { cases, tail, has_tail_wildcard } => {
            let mut labels: Vec<String> = cases.keys().cloned().collect();
            if tail.is_some() || has_tail_wildcard {
                labels.push("..".to_string());
            }
            labels
        }
        _ => Vec::new(),
    }
}

fn resolve_branch_join(
    arena: &mut TypeArena,
    origin: wm_common::NodeId,
    span: wm_common::Span,
    branches: &[wm_types::TypeId],
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some((&first, rest)) = branches.split_first() else { return };
    for &other in rest {
        if arena.unify(first, other).is_err() {
            diagnostics.push(Diagnostic::new(DiagnosticReason::BranchMismatch, origin, span));
        }
    }
}

fn resolve_has_field(
    arena: &mut TypeArena,
    origin: wm_common::NodeId,
    span: wm_common::Span,
    target: wm_types::TypeId,
    field: &str,
    result: wm_types::TypeId,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let resolved = arena.resolve_shallow(target);
    match arena.get(resolved).clone() {
        TypeData::Record(fields) => match fields.get(field) {
            Some(&field_ty) => {
                if arena.unify(field_ty, result).is_err() {
                    diagnostics.push(mismatch(arena, DiagnosticReason::TypeMismatch, origin, span, field_ty, result));
                }
            }
            None => diagnostics.push(Diagnostic::new(DiagnosticReason::MissingField, origin, span).with_field(field)),
        },
        TypeData::Unknown { .. } | TypeData::Var(_) => {}
        _ => diagnostics.push(Diagnostic::new(DiagnosticReason::NotRecord, origin, span)),
    }
}

fn resolve_scalar_class(
    arena: &mut TypeArena,
    origin: wm_common::NodeId,
    span: wm_common::Span,
    operands: &[wm_types::TypeId],
    result: wm_types::TypeId,
    reason: DiagnosticReason,
    expected: fn(&mut TypeArena) -> wm_types::TypeId,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let expected_ty = expected(arena);
    let mut ok = true;
    for &operand in operands {
        if arena.unify(operand, expected_ty).is_err() {
            ok = false;
        }
    }
    if !ok {
        diagnostics.push(Diagnostic::new(reason, origin, span));
        return;
    }
    let _ = arena.unify(result, expected_ty);
}

fn resolve_constraint_flow(
    arena: &mut TypeArena,
    infection: &InfectionRegistry,
    options: &PipelineOptions,
    origin: wm_common::NodeId,
    span: wm_common::Span,
    domain: wm_infection::InfectionDomain,
    declared_return: wm_types::TypeId,
    remaining_labels: &[String],
    diagnostics: &mut Vec<Diagnostic>,
) {
    if remaining_labels.is_empty() {
        return;
    }
    let resolved = arena.substitute(declared_return);
    let is_carrier = matches!(
        arena.get(resolved),
        TypeData::Constructor { name, .. } if infection.is_carrier(domain, name)
    );
    let has_hole = matches!(arena.get(resolved), TypeData::Unknown { .. });

    let verdict = check_function_boundary(domain, remaining_labels, is_carrier, options.hole_mode, has_hole);
    if let BoundaryVerdict::Violated = verdict {
        diagnostics.push(
            Diagnostic::new(DiagnosticReason::InfectiousCallResultMismatch, origin, span)
                .with_names(remaining_labels.to_vec()),
        );
    }
}

fn mismatch(
    arena: &mut TypeArena,
    reason: DiagnosticReason,
    origin: wm_common::NodeId,
    span: wm_common::Span,
    expected: wm_types::TypeId,
    found: wm_types::TypeId,
) -> Diagnostic {
    let expected = describe_type(arena, expected);
    let found = describe_type(arena, found);
    Diagnostic::new(reason, origin, span).with_expected_found(expected, found)
}

/// A terse, provisional type rendering for diagnostic details. This is not
/// the user-facing renderer — Layer-3 owns that (its `Display`-based type
/// printer resolves infectious carriers, row sugar and hole provenance) —
/// it just keeps `TypeMismatch`-style diagnostics debuggable before a
/// presenter pass has run over them.
fn describe_type(arena: &mut TypeArena, id: wm_types::TypeId) -> String {
    let id = arena.substitute(id);
    match arena.get(id).clone() {
        TypeData::Unit => "unit".into(),
        TypeData::Int => "int".into(),
        TypeData::Bool => "bool".into(),
        TypeData::Char => "char".into(),
        TypeData::String => "string".into(),
        TypeData::Var(_) => "_".into(),
        TypeData::Unknown { .. } => "?".into(),
        TypeData::Func { from, to } => format!("{} -> {}", describe_type(arena, from), describe_type(arena, to)),
        TypeData::Tuple(elements) => {
            format!("({})", elements.iter().map(|e| describe_type(arena, *e)).collect::<Vec<_>>().join(", "))
        }
        TypeData::Record(fields) => {
            let rendered: Vec<String> =
                fields.iter().map(|(k, v)| format!("{k}: {}", describe_type(arena, *v))).collect();
            format!("{{ {} }}", rendered.join(", "))
        }
        TypeData::Constructor { name, args } if args.is_empty() => name,
        TypeData::Constructor { name, args } => {
            format!("{name}<{}>", args.iter().map(|a| describe_type(arena, *a)).collect::<Vec<_>>().join(", "))
        }
        TypeData::Array { length, element } => format!("[{}; {length}]", describe_type(arena, element)),
        TypeData::EffectRow { cases, .. } => format!("<{}>", cases.keys().cloned().collect::<Vec<_>>().join(" | ")),
    }
}
