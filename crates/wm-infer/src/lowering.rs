//! Layer-1's two pre-passes (spec §4.3): canonicalizing `match(x) => {...}`
//! sugar into a lambda over an ordinary `match`, and lowering non-trivial
//! arrow parameters into a synthetic variable plus an internal `match`.
//!
//! Both passes run over an owned clone of the program and only ever
//! *synthesize* nodes via the caller's [`NodeIdAllocator`] (seeded from the
//! program's pre-existing maximum id) — every pre-existing [`NodeId`] is
//! carried through unchanged (spec §3's node-identity invariant).

use wm_ast::{BlockExpr, Declaration, Expr, ExprNode, LetBinding, MatchArm, Pattern, PatternNode, Program, Spanned, Statement};
use wm_common::node_id::NodeIdAllocator;
use wm_common::Span;

pub fn lower_program(program: Program, ids: &mut NodeIdAllocator) -> Program {
    let declarations = program.declarations.into_iter().map(|d| lower_declaration(d, ids)).collect();
    Program { declarations, ..program }
}

fn lower_declaration(decl: Declaration, ids: &mut NodeIdAllocator) -> Declaration {
    match decl {
        Declaration::Let(mut let_decl) => {
            let_decl.bindings = let_decl.bindings.into_iter().map(|b| lower_let_binding(b, ids)).collect();
            Declaration::Let(let_decl)
        }
        other => other,
    }
}

fn lower_let_binding(binding: LetBinding, ids: &mut NodeIdAllocator) -> LetBinding {
    let lowered_body = lower_block(binding.body, ids);
    let (parameters, body) = lower_parameters(binding.parameters, lowered_body, ids);
    LetBinding { parameters, body, ..binding }
}

fn lower_block(block: BlockExpr, ids: &mut NodeIdAllocator) -> BlockExpr {
    let statements = block
        .statements
        .into_iter()
        .map(|s| match s {
            Statement::Let(b) => Statement::Let(lower_let_binding(b, ids)),
            Statement::Expr(e) => Statement::Expr(lower_expr(e, ids)),
        })
        .collect();
    let result = block.result.map(|r| Box::new(lower_expr(*r, ids)));
    BlockExpr { statements, result }
}

fn lower_arm(arm: MatchArm, ids: &mut NodeIdAllocator) -> MatchArm {
    MatchArm { pattern: arm.pattern, body: lower_block(arm.body, ids) }
}

fn synthetic_identifier(ids: &mut NodeIdAllocator, name: String) -> ExprNode {
    Spanned::new(ids.fresh(), Span::synthetic(), Expr::Identifier(name))
}

fn synthetic_var_pattern(ids: &mut NodeIdAllocator, name: String) -> PatternNode {
    Spanned::new(ids.fresh(), Span::synthetic(), Pattern::Var(name))
}

/// `match(x) => { arms }` and first-class `match { arms }` both desugar to
/// `λp. match(p){arms}` over a synthesized parameter (spec §4.3's
/// canonicalization pre-pass). The two differ only in whether the result is
/// immediately called or left as a value, which is exactly what
/// `Expr::Arrow` already models either way.
fn lower_expr(expr: ExprNode, ids: &mut NodeIdAllocator) -> ExprNode {
    let Spanned { id, span, node } = expr;
    let node = match node {
        Expr::Identifier(_) | Expr::Literal(_) | Expr::Hole => node,
        Expr::Tuple(elems) => Expr::Tuple(elems.into_iter().map(|e| lower_expr(e, ids)).collect()),
        Expr::RecordLiteral { fields, multiline } => Expr::RecordLiteral {
            fields: fields.into_iter().map(|(name, e)| (name, lower_expr(e, ids))).collect(),
            multiline,
        },
        Expr::RecordProjection { target, field } => {
            Expr::RecordProjection { target: Box::new(lower_expr(*target, ids)), field }
        }
        Expr::Constructor { name, args } => {
            Expr::Constructor { name, args: args.into_iter().map(|a| lower_expr(a, ids)).collect() }
        }
        Expr::Call { callee, argument } => Expr::Call {
            callee: Box::new(lower_expr(*callee, ids)),
            argument: Box::new(lower_expr(*argument, ids)),
        },
        Expr::Arrow { parameters, body } => {
            let lowered_body = lower_block(*body, ids);
            let (parameters, body) = lower_parameters(parameters, lowered_body, ids);
            Expr::Arrow { parameters, body: Box::new(body) }
        }
        Expr::Block(block) => Expr::Block(lower_block(block, ids)),
        Expr::Match { scrutinee, arms } => Expr::Match {
            scrutinee: Box::new(lower_expr(*scrutinee, ids)),
            arms: arms.into_iter().map(|a| lower_arm(a, ids)).collect(),
        },
        Expr::MatchFn { arms } => {
            let arms: Vec<MatchArm> = arms.into_iter().map(|a| lower_arm(a, ids)).collect();
            return canonicalize_match_value(arms, ids, span);
        }
        Expr::MatchBundleLiteral { arms } => {
            let arms: Vec<MatchArm> = arms.into_iter().map(|a| lower_arm(a, ids)).collect();
            return canonicalize_match_value(arms, ids, span);
        }
        Expr::Binary { op, left, right } => {
            Expr::Binary { op, left: Box::new(lower_expr(*left, ids)), right: Box::new(lower_expr(*right, ids)) }
        }
        Expr::Unary { op, operand } => Expr::Unary { op, operand: Box::new(lower_expr(*operand, ids)) },
    };
    Spanned::new(id, span, node)
}

/// Builds `λp. match(p){arms}` for a synthesized `p`, used for both
/// `match(x) => {...}` and first-class `match {...}` bundles — both are
/// `T_scrut -> T_body`, the only difference being whether the caller applies
/// the resulting function immediately.
fn canonicalize_match_value(arms: Vec<MatchArm>, ids: &mut NodeIdAllocator, span: Span) -> ExprNode {
    let synth_name = format!("__match_arg{}", ids.fresh().0);
    let param = synthetic_var_pattern(ids, synth_name.clone());
    let scrutinee = Box::new(synthetic_identifier(ids, synth_name));
    let match_expr = Spanned::new(ids.fresh(), span, Expr::Match { scrutinee, arms });
    let body = BlockExpr { statements: Vec::new(), result: Some(Box::new(match_expr)) };
    Spanned::new(ids.fresh(), span, Expr::Arrow { parameters: vec![param], body: Box::new(body) })
}

/// Rewrites any non-`Var`/`Wildcard` parameter pattern into a synthesized
/// variable, pushing the original pattern into a `match` wrapped around the
/// (already-lowered) body (spec §4.3's "Tuple-parameter lowering pre-pass").
fn lower_parameters(
    parameters: Vec<PatternNode>,
    body: BlockExpr,
    ids: &mut NodeIdAllocator,
) -> (Vec<PatternNode>, BlockExpr) {
    let mut new_parameters = Vec::with_capacity(parameters.len());
    let mut body = body;
    for param in parameters {
        match &param.node {
            Pattern::Wildcard | Pattern::Var(_) => new_parameters.push(param),
            _ => {
                let synth_name = format!("__destructure{}", ids.fresh().0);
                let synth_param = synthetic_var_pattern(ids, synth_name.clone());
                let scrutinee = Box::new(synthetic_identifier(ids, synth_name));
                let arm = MatchArm { pattern: param, body };
                let match_expr =
                    Spanned::new(ids.fresh(), Span::synthetic(), Expr::Match { scrutinee, arms: vec![arm] });
                body = BlockExpr { statements: Vec::new(), result: Some(Box::new(match_expr)) };
                new_parameters.push(synth_param);
            }
        }
    }
    (new_parameters, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wm_ast::{Literal, LiteralValue};
    use wm_common::NodeId;

    fn id(n: u32) -> NodeId {
        NodeId(n)
    }

    #[test]
    fn tuple_parameter_lowers_to_a_synthetic_var_and_an_internal_match() {
        let mut ids = NodeIdAllocator::starting_after(id(10));
        let param = Spanned::new(
            id(1),
            Span::new(0, 1),
            Pattern::Tuple(vec![
                Spanned::new(id(2), Span::new(0, 0), Pattern::Var("a".into())),
                Spanned::new(id(3), Span::new(0, 0), Pattern::Var("b".into())),
            ]),
        );
        let body = BlockExpr {
            statements: Vec::new(),
            result: Some(Box::new(Spanned::new(
                id(4),
                Span::new(0, 0),
                Expr::Literal(LiteralValue::Scalar(Literal::Unit)),
            ))),
        };
        let (params, body) = lower_parameters(vec![param], body, &mut ids);
        assert_eq!(params.len(), 1);
        assert!(matches!(params[0].node, Pattern::Var(_)));
        assert!(body.result.is_some());
        assert!(matches!(body.result.unwrap().node, Expr::Match { .. }));
    }

    #[test]
    fn match_fn_canonicalizes_to_an_arrow_over_a_match() {
        let mut ids = NodeIdAllocator::starting_after(id(10));
        let arms = vec![MatchArm {
            pattern: Spanned::new(id(1), Span::new(0, 0), Pattern::Wildcard),
            body: BlockExpr {
                statements: Vec::new(),
                result: Some(Box::new(Spanned::new(
                    id(2),
                    Span::new(0, 0),
                    Expr::Literal(LiteralValue::Scalar(Literal::Unit)),
                ))),
            },
        }];
        let original = Spanned::new(id(3), Span::new(0, 0), Expr::MatchFn { arms });
        let lowered = lower_expr(original, &mut ids);
        assert!(matches!(lowered.node, Expr::Arrow { .. }));
    }
}
