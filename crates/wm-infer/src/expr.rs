//! Expression inference (spec §4.3's expression-kind table). Each arm either
//! resolves the node's type outright or defers to a [`crate::stub::ConstraintStub`]
//! for Layer-2 to settle once the rest of the module has been walked.

use indexmap::IndexMap;
use wm_ast::pattern::{Literal, LiteralValue};
use wm_ast::{BlockExpr, Expr, ExprNode, Statement};
use wm_common::{Diagnostic, DiagnosticReason};
use wm_types::{HoleProvenance, Scheme, TypeData, TypeId};

use crate::context::InferContext;
use crate::stub::{ConstraintStub, HoleCategory, Mark};

pub fn literal_type(ctx: &mut InferContext, lit: &LiteralValue) -> TypeId {
    match lit {
        LiteralValue::Scalar(Literal::Unit) => ctx.arena.unit(),
        LiteralValue::Scalar(Literal::Int(_)) => ctx.arena.int(),
        LiteralValue::Scalar(Literal::Bool(_)) => ctx.arena.bool(),
        LiteralValue::Scalar(Literal::Char(_)) => ctx.arena.char(),
        LiteralValue::Str(_) => ctx.arena.string(),
    }
}

/// Infers `expr`'s type, recording it in `ctx.node_type_by_id` and returning
/// it for the caller's own bookkeeping.
pub fn infer_expr(ctx: &mut InferContext, expr: &ExprNode) -> TypeId {
    let ty = infer_expr_inner(ctx, expr);
    ctx.set_node_type(expr.id, expr.span, ty);
    ty
}

fn infer_expr_inner(ctx: &mut InferContext, expr: &ExprNode) -> TypeId {
    match &expr.node {
        Expr::Identifier(name) => infer_identifier(ctx, expr, name),
        Expr::Literal(lit) => literal_type(ctx, lit),
        Expr::Tuple(elems) => {
            let elem_tys: Vec<TypeId> = elems.iter().map(|e| infer_expr(ctx, e)).collect();
            ctx.arena.tuple(elem_tys)
        }
        Expr::RecordLiteral { fields, .. } => infer_record_literal(ctx, expr, fields),
        Expr::RecordProjection { target, field } => infer_record_projection(ctx, expr, target, field),
        Expr::Constructor { name, args } => infer_constructor(ctx, expr, name, args),
        Expr::Call { callee, argument } => infer_call(ctx, expr, callee, argument),
        Expr::Arrow { parameters, body } => infer_arrow(ctx, parameters, body),
        Expr::Block(block) => infer_block(ctx, block),
        Expr::Match { scrutinee, arms } => crate::match_expr::infer_match(ctx, expr, scrutinee, arms),
        Expr::MatchFn { .. } | Expr::MatchBundleLiteral { .. } => {
            // The canonicalization pre-pass (`lowering.rs`) rewrites every
            // occurrence of these into `Expr::Arrow` before Layer-1 proper
            // runs; reaching one here means a caller skipped lowering.
            ctx.marked.mark(expr.id, Mark::UnsupportedExpr { expr_kind: "match_fn".into() });
            ctx.fresh_hole(HoleProvenance::PartialConflictFallback, HoleCategory::Incomplete, expr.id, expr.span)
        }
        Expr::Binary { op, left, right } => infer_binary(ctx, expr, op, left, right),
        Expr::Unary { op, operand } => infer_unary(ctx, expr, op, operand),
        Expr::Hole => ctx.fresh_hole(HoleProvenance::ExplicitHole, HoleCategory::ExprHole, expr.id, expr.span),
    }
}

fn infer_identifier(ctx: &mut InferContext, expr: &ExprNode, name: &str) -> TypeId {
    match ctx.value_env.lookup(name).cloned() {
        Some(scheme) => ctx.arena.instantiate(&scheme),
        None => {
            ctx.marked.mark(expr.id, Mark::FreeVar);
            ctx.diagnostic(
                Diagnostic::new(DiagnosticReason::FreeVariable, expr.id, expr.span).with_names(vec![name.to_string()]),
            );
            ctx.fresh_hole(HoleProvenance::MissingImport, HoleCategory::Unfilled, expr.id, expr.span)
        }
    }
}

fn infer_record_literal(ctx: &mut InferContext, expr: &ExprNode, fields: &[(String, ExprNode)]) -> TypeId {
    let mut map = IndexMap::new();
    let mut duplicates = Vec::new();
    for (name, value_expr) in fields {
        let value_ty = infer_expr(ctx, value_expr);
        if map.insert(name.clone(), value_ty).is_some() {
            duplicates.push(name.clone());
        }
    }
    if !duplicates.is_empty() {
        ctx.diagnostic(
            Diagnostic::new(DiagnosticReason::DuplicateRecordField, expr.id, expr.span).with_names(duplicates),
        );
    }
    ctx.arena.record(map)
}

fn infer_record_projection(ctx: &mut InferContext, expr: &ExprNode, target: &ExprNode, field: &str) -> TypeId {
    let target_ty = infer_expr(ctx, target);
    let result = ctx.arena.fresh_var();
    ctx.push_stub(ConstraintStub::HasField {
        origin: expr.id,
        span: expr.span,
        target: target_ty,
        field: field.to_string(),
        result,
    });
    result
}

/// A constructor call is either an ordinary ADT constructor or, when `name`
/// is registered in the infection registry, the value/effect constructor of
/// an infectious carrier (spec §4.6). Building the carrier's own
/// `Result<T, Row>`-shaped type from just a constructor name and an argument
/// type is a deliberate simplification of the row's full label-level
/// tracking (recorded in `DESIGN.md`): the row label used is the argument's
/// own head type name, or a fallback sentinel when the argument isn't
/// itself a named type.
fn infer_constructor(ctx: &mut InferContext, expr: &ExprNode, name: &str, args: &[ExprNode]) -> TypeId {
    if let Some(carrier) = ctx.infection.carrier_for_value_constructor(name).cloned() {
        let arg_ty = args.first().map(|a| infer_expr(ctx, a)).unwrap_or_else(|| ctx.arena.unit());
        let tail = ctx.arena.fresh_var();
        let row = ctx.arena.effect_row(IndexMap::new(), Some(tail), false);
        return ctx.arena.constructor(carrier.name, vec![arg_ty, row]);
    }
    if let Some(carrier) = ctx.infection.carrier_for_effect_constructor(name).cloned() {
        let arg_ty = args.first().map(|a| infer_expr(ctx, a)).unwrap_or_else(|| ctx.arena.unit());
        let label = effect_row_label_for(ctx, arg_ty);
        let value_ty = ctx.arena.fresh_var();
        let mut cases = IndexMap::new();
        cases.insert(label, Some(arg_ty));
        let row = ctx.arena.effect_row(cases, None, false);
        return ctx.arena.constructor(carrier.name, vec![value_ty, row]);
    }

    let found = ctx.type_env.iter().find_map(|(type_name, info)| match info {
        wm_types::TypeInfo::Adt { parameters, constructors } => constructors
            .iter()
            .find(|c| c.name == name)
            .map(|c| (type_name.to_string(), parameters.clone(), c.args.clone())),
        _ => None,
    });

    let Some((type_name, params, ctor_arg_types)) = found else {
        ctx.marked.mark(expr.id, Mark::FreeVar);
        ctx.diagnostic(
            Diagnostic::new(DiagnosticReason::FreeVariable, expr.id, expr.span).with_names(vec![name.to_string()]),
        );
        for a in args {
            infer_expr(ctx, a);
        }
        return ctx.fresh_hole(HoleProvenance::MissingImport, HoleCategory::Unfilled, expr.id, expr.span);
    };

    let fresh: Vec<TypeId> = params.iter().map(|_| ctx.arena.fresh_var()).collect();
    let mapping = params.iter().copied().zip(fresh.iter().copied()).collect();
    if args.len() != ctor_arg_types.len() {
        ctx.marked.mark(expr.id, Mark::Pattern { issue: "arity".into() });
        ctx.diagnostic(Diagnostic::new(DiagnosticReason::ArityMismatch, expr.id, expr.span));
    }
    for (i, arg) in args.iter().enumerate() {
        let arg_ty = infer_expr(ctx, arg);
        if let Some(expected) = ctor_arg_types.get(i) {
            let expected_ty = ctx.arena.instantiate_with_map(*expected, &mapping);
            let _ = ctx.arena.unify(expected_ty, arg_ty);
        }
    }
    ctx.arena.constructor(type_name, fresh)
}

fn effect_row_label_for(ctx: &mut InferContext, arg_ty: TypeId) -> String {
    let resolved = ctx.arena.resolve_shallow(arg_ty);
    match ctx.arena.get(resolved) {
        TypeData::Constructor { name, .. } => name.clone(),
        _ => "Effect".to_string(),
    }
}

/// `call(callee, argument)` always desugars to a `Call` stub: callee's
/// function-ness isn't known until Layer-2 resolves any hole/var it might
/// still be (spec §4.3, §4.4).
fn infer_call(ctx: &mut InferContext, expr: &ExprNode, callee: &ExprNode, argument: &ExprNode) -> TypeId {
    let callee_ty = infer_expr(ctx, callee);
    let argument_ty = infer_expr(ctx, argument);
    let result = ctx.arena.fresh_var();
    let argument_error_row = resolve_as_infectious_row(ctx, argument_ty);
    ctx.push_stub(ConstraintStub::Call {
        origin: expr.id,
        span: expr.span,
        callee: callee_ty,
        argument: argument_ty,
        result,
        argument_error_row,
    });
    result
}

/// If the argument's own type is already a resolved infectious carrier
/// (`Result<T, Row>`), surfaces its row component so Layer-2 can thread it
/// onward when the call result is itself used as a carrier (spec §4.6's
/// "infectious spread through ordinary calls").
fn resolve_as_infectious_row(ctx: &mut InferContext, ty: TypeId) -> Option<TypeId> {
    let resolved = ctx.arena.resolve_shallow(ty);
    match ctx.arena.get(resolved).clone() {
        TypeData::Constructor { name, args } if ctx.infection.lookup(&name).is_some() && args.len() == 2 => {
            Some(args[1])
        }
        _ => None,
    }
}

fn infer_arrow(ctx: &mut InferContext, parameters: &[wm_ast::PatternNode], body: &BlockExpr) -> TypeId {
    ctx.value_env.push_scope();
    let mut param_tys = Vec::with_capacity(parameters.len());
    for param in parameters {
        let var = ctx.arena.fresh_var();
        crate::pattern::infer_pattern(ctx, param, var);
        param_tys.push(var);
    }
    let body_ty = infer_block(ctx, body);
    ctx.value_env.pop_scope();
    param_tys.into_iter().rev().fold(body_ty, |acc, param_ty| ctx.arena.func(param_ty, acc))
}

pub fn infer_block(ctx: &mut InferContext, block: &BlockExpr) -> TypeId {
    for stmt in &block.statements {
        infer_statement(ctx, stmt);
    }
    match &block.result {
        Some(result) => infer_expr(ctx, result),
        None => ctx.arena.unit(),
    }
}

fn infer_statement(ctx: &mut InferContext, stmt: &Statement) {
    match stmt {
        Statement::Let(binding) => crate::decl::infer_let_binding(ctx, binding, false),
        Statement::Expr(expr) => {
            infer_expr(ctx, expr);
        }
    }
}

/// `+ - * /` and comparisons route through dedicated `Numeric`/`Boolean`
/// stubs so Layer-2 can report `not_numeric`/`not_boolean` directly;
/// equality is built in and polymorphic; every other symbol must have been
/// introduced by an `infix ... = f;` declaration, resolved lazily by
/// function name (spec §6's operator declarations, §4.3's operator
/// desugaring).
fn infer_binary(ctx: &mut InferContext, expr: &ExprNode, op: &str, left: &ExprNode, right: &ExprNode) -> TypeId {
    let left_ty = infer_expr(ctx, left);
    let right_ty = infer_expr(ctx, right);

    if op == "==" || op == "!=" {
        let _ = ctx.arena.unify(left_ty, right_ty);
        ctx.push_stub(ConstraintStub::BranchJoin { origin: expr.id, span: expr.span, branches: vec![left_ty, right_ty] });
        return ctx.arena.bool();
    }

    const NUMERIC_OPS: [&str; 8] = ["+", "-", "*", "/", "<", ">", "<=", ">="];
    const BOOLEAN_OPS: [&str; 2] = ["&&", "||"];

    if let Some(function_name) = ctx.infix_functions.get(op).cloned() {
        return desugar_operator_call(ctx, expr, &function_name, &[left_ty, right_ty]);
    }

    if NUMERIC_OPS.contains(&op) {
        let result = if matches!(op, "<" | ">" | "<=" | ">=") { ctx.arena.bool() } else { ctx.arena.int() };
        ctx.push_stub(ConstraintStub::Numeric { origin: expr.id, span: expr.span, operands: vec![left_ty, right_ty], result });
        return result;
    }
    if BOOLEAN_OPS.contains(&op) {
        let result = ctx.arena.bool();
        ctx.push_stub(ConstraintStub::Boolean { origin: expr.id, span: expr.span, operands: vec![left_ty, right_ty], result });
        return result;
    }

    ctx.marked.mark(expr.id, Mark::FreeVar);
    ctx.diagnostic(Diagnostic::new(DiagnosticReason::FreeVariable, expr.id, expr.span).with_names(vec![op.to_string()]));
    ctx.fresh_hole(HoleProvenance::MissingImport, HoleCategory::Unfilled, expr.id, expr.span)
}

fn infer_unary(ctx: &mut InferContext, expr: &ExprNode, op: &str, operand: &ExprNode) -> TypeId {
    let operand_ty = infer_expr(ctx, operand);
    if let Some(function_name) = ctx.prefix_functions.get(op).cloned() {
        return desugar_operator_call(ctx, expr, &function_name, &[operand_ty]);
    }
    if op == "!" {
        let result = ctx.arena.bool();
        ctx.push_stub(ConstraintStub::Boolean { origin: expr.id, span: expr.span, operands: vec![operand_ty], result });
        return result;
    }
    if op == "-" {
        let result = ctx.arena.int();
        ctx.push_stub(ConstraintStub::Numeric { origin: expr.id, span: expr.span, operands: vec![operand_ty], result });
        return result;
    }
    ctx.marked.mark(expr.id, Mark::FreeVar);
    ctx.diagnostic(Diagnostic::new(DiagnosticReason::FreeVariable, expr.id, expr.span).with_names(vec![op.to_string()]));
    ctx.fresh_hole(HoleProvenance::MissingImport, HoleCategory::Unfilled, expr.id, expr.span)
}

/// `left op right` where `op` is user-declared desugars to
/// `call(call(f, left), right)` (spec §4.3) — modeled here directly as two
/// chained `Call` stubs rather than constructing synthetic `Expr::Call`
/// nodes, since there is no source node to anchor them to.
fn desugar_operator_call(ctx: &mut InferContext, expr: &ExprNode, function_name: &str, operand_tys: &[TypeId]) -> TypeId {
    let scheme = ctx.value_env.lookup(function_name).cloned();
    let Some(scheme) = scheme else {
        ctx.marked.mark(expr.id, Mark::FreeVar);
        ctx.diagnostic(
            Diagnostic::new(DiagnosticReason::FreeVariable, expr.id, expr.span)
                .with_names(vec![function_name.to_string()]),
        );
        return ctx.fresh_hole(HoleProvenance::MissingImport, HoleCategory::Unfilled, expr.id, expr.span);
    };
    let mut callee_ty = ctx.arena.instantiate(&scheme);
    for operand_ty in operand_tys {
        let result = ctx.arena.fresh_var();
        ctx.push_stub(ConstraintStub::Call {
            origin: expr.id,
            span: expr.span,
            callee: callee_ty,
            argument: *operand_ty,
            result,
            argument_error_row: None,
        });
        callee_ty = result;
    }
    callee_ty
}

/// HM's value restriction (spec §4.3): only a syntactic value generalizes at
/// a `let`. Arrows are always values; everything else is a value only if
/// every immediate sub-expression is.
#[must_use]
pub fn is_syntactic_value(expr: &ExprNode) -> bool {
    match &expr.node {
        Expr::Arrow { .. } | Expr::Literal(_) | Expr::Identifier(_) | Expr::Hole => true,
        Expr::Tuple(elems) => elems.iter().all(is_syntactic_value),
        Expr::Constructor { args, .. } => args.iter().all(is_syntactic_value),
        Expr::RecordLiteral { fields, .. } => fields.iter().all(|(_, v)| is_syntactic_value(v)),
        Expr::MatchBundleLiteral { arms } => arms.iter().all(|arm| block_is_value(&arm.body)),
        Expr::MatchFn { .. } => true, // lowered to an Arrow before this runs
        Expr::RecordProjection { .. }
        | Expr::Call { .. }
        | Expr::Block(_)
        | Expr::Match { .. }
        | Expr::Binary { .. }
        | Expr::Unary { .. } => false,
    }
}

fn block_is_value(block: &BlockExpr) -> bool {
    block.statements.is_empty() && block.result.as_deref().is_some_and(is_syntactic_value)
}
