//! `match` inference (spec §4.2's exhaustiveness/redundancy checks, §4.6's
//! effect-row discharge). Delegates the coverage algorithm itself to
//! `wm_coverage`; this module's job is wiring its report into diagnostics
//! and constraint stubs.
//!
//! A match over an infectious carrier (`Result<T, Row>`-shaped) is analyzed
//! against its row component directly — the one arm naming the carrier's own
//! value constructor (`Ok`) is swapped for a plain wildcard before handing
//! the arm list to `wm_coverage`, since accepting the non-erroring case
//! covers every row label without naming one (recorded in `DESIGN.md`).

use wm_ast::pattern::Pattern;
use wm_ast::{ExprNode, MatchArm};
use wm_common::{Diagnostic, DiagnosticReason};
use wm_types::{TypeData, TypeId};

use crate::context::InferContext;
use crate::stub::ConstraintStub;

pub fn infer_match(ctx: &mut InferContext, expr: &ExprNode, scrutinee: &ExprNode, arms: &[MatchArm]) -> TypeId {
    let scrutinee_ty = crate::expr::infer_expr(ctx, scrutinee);
    let carrier = infectious_carrier_of(ctx, scrutinee_ty);

    let analysis_scrutinee = match &carrier {
        Some((_, value_ty, row_ty)) => {
            let _ = value_ty; // analysis runs against the row, not the wrapper
            *row_ty
        }
        None => scrutinee_ty,
    };

    for diagnostic in wm_coverage::duplicate_variable_diagnostics(arms) {
        ctx.diagnostic(diagnostic);
    }

    let mut body_tys = Vec::with_capacity(arms.len());
    let mut coverage_arms = Vec::with_capacity(arms.len());
    for arm in arms {
        ctx.value_env.push_scope();
        match (&carrier, &arm.pattern.node) {
            (Some((info, value_ty, _)), Pattern::Constructor { name, args }) if *name == info.value_constructor => {
                if let Some(inner) = args.first() {
                    crate::pattern::infer_pattern(ctx, inner, *value_ty);
                }
                ctx.set_node_type(arm.pattern.id, arm.pattern.span, *value_ty);
                coverage_arms.push(MatchArm {
                    pattern: wm_ast::Spanned::new(arm.pattern.id, arm.pattern.span, Pattern::Wildcard),
                    body: arm.body.clone(),
                });
            }
            _ => {
                crate::pattern::infer_pattern(ctx, &arm.pattern, analysis_scrutinee);
                coverage_arms.push(arm.clone());
            }
        }
        let body_ty = crate::expr::infer_block(ctx, &arm.body);
        ctx.value_env.pop_scope();
        body_tys.push(body_ty);
    }

    let report = wm_coverage::analyze(&mut ctx.arena, &ctx.type_env, analysis_scrutinee, &coverage_arms);
    if !report.is_exhaustive() {
        ctx.diagnostic(
            Diagnostic::new(DiagnosticReason::NonExhaustiveMatch, expr.id, expr.span)
                .with_names(report.missing_constructors.clone()),
        );
    }

    let result = merge_branch_types(ctx, expr, &body_tys);
    ctx.push_stub(ConstraintStub::BranchJoin { origin: expr.id, span: expr.span, branches: body_tys });

    if let (Some((info, ..)), Some(discharge)) = (&carrier, &report.row_discharge) {
        if !discharge.discharges_result {
            ctx.push_stub(ConstraintStub::ConstraintRewrite {
                origin: expr.id,
                span: expr.span,
                domain: info.domain,
                remaining_labels: discharge.remaining_labels.clone(),
            });
        }
    }

    result
}

/// If `ty` resolves to a registered infectious carrier's two-argument
/// `Constructor`, returns its declaration plus the `(value, row)` components.
fn infectious_carrier_of(
    ctx: &mut InferContext,
    ty: TypeId,
) -> Option<(wm_infection::InfectiousTypeInfo, TypeId, TypeId)> {
    let resolved = ctx.arena.resolve_shallow(ty);
    match ctx.arena.get(resolved).clone() {
        TypeData::Constructor { name, args } if args.len() == 2 => {
            ctx.infection.lookup(&name).cloned().map(|info| (info, args[0], args[1]))
        }
        _ => None,
    }
}

/// Best-effort immediate join of every arm's body type (in addition to the
/// deferred `BranchJoin` stub, which a Layer-2 pass over the whole module
/// can resolve more thoroughly once forward references have been settled).
fn merge_branch_types(ctx: &mut InferContext, expr: &ExprNode, body_tys: &[TypeId]) -> TypeId {
    let Some((&first, rest)) = body_tys.split_first() else {
        return ctx.arena.unit();
    };
    for &other in rest {
        if ctx.arena.unify(first, other).is_err() {
            ctx.diagnostic(Diagnostic::new(DiagnosticReason::BranchMismatch, expr.id, expr.span));
            break;
        }
    }
    first
}
