//! Structural checks over one module's phase-2 `Program` that don't need a
//! full inference pass: duplicate top-level names (hard errors, spec §7)
//! and used-but-undeclared operator symbols (a diagnostic, spec §4.7's
//! supplemented "operator table validation").

use rustc_hash::FxHashSet;

use wm_ast::{BlockExpr, Declaration, Expr, ExprNode, OperatorTable, PrefixOperatorSet, Program, Statement};
use wm_common::{Diagnostic, DiagnosticReason};

use crate::error::HardError;

/// Every top-level `let` binding name must be unique within a module —
/// across separate `let` groups, not just within one recursive group — or
/// the second binding silently shadows the first with no diagnostic at all.
pub fn check_duplicate_bindings(module: &str, program: &Program) -> Result<(), HardError> {
    let mut seen = FxHashSet::default();
    for decl in &program.declarations {
        let Declaration::Let(let_decl) = decl else { continue };
        for binding in &let_decl.bindings {
            if !seen.insert(binding.name.clone()) {
                return Err(HardError::DuplicateBinding { module: module.to_string(), name: binding.name.clone() });
            }
        }
    }
    Ok(())
}

/// Every exported name (own `let export` bindings plus re-export targets)
/// must be unique, since two exports under the same name would make the
/// importer's binding ambiguous.
pub fn check_duplicate_exports(module: &str, program: &Program, reexport_names: &[String]) -> Result<(), HardError> {
    let mut seen = FxHashSet::default();
    for decl in &program.declarations {
        let Declaration::Let(let_decl) = decl else { continue };
        for binding in &let_decl.bindings {
            if binding.export && !seen.insert(binding.name.clone()) {
                return Err(HardError::DuplicateExport { module: module.to_string(), name: binding.name.clone() });
            }
        }
    }
    for name in reexport_names {
        if !seen.insert(name.clone()) {
            return Err(HardError::DuplicateExport { module: module.to_string(), name: name.clone() });
        }
    }
    Ok(())
}

/// A `binary`/`unary` node whose symbol isn't in the final merged operator
/// table desugars to a free identifier `__op_<sym>` rather than a hard
/// error — the same tolerance the rest of the pipeline gives an unresolved
/// name.
pub fn collect_operator_diagnostics(
    program: &Program,
    operators: &OperatorTable,
    prefix_operators: &PrefixOperatorSet,
) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for decl in &program.declarations {
        let Declaration::Let(let_decl) = decl else { continue };
        for binding in &let_decl.bindings {
            walk_block(&binding.body, operators, prefix_operators, &mut out);
        }
    }
    out
}

fn walk_block(block: &BlockExpr, operators: &OperatorTable, prefix_operators: &PrefixOperatorSet, out: &mut Vec<Diagnostic>) {
    for statement in &block.statements {
        match statement {
            Statement::Let(binding) => walk_block(&binding.body, operators, prefix_operators, out),
            Statement::Expr(expr) => walk_expr(expr, operators, prefix_operators, out),
        }
    }
    if let Some(result) = &block.result {
        walk_expr(result, operators, prefix_operators, out);
    }
}

fn walk_expr(expr: &ExprNode, operators: &OperatorTable, prefix_operators: &PrefixOperatorSet, out: &mut Vec<Diagnostic>) {
    match &expr.node {
        Expr::Identifier(_) | Expr::Literal(_) | Expr::Hole => {}
        Expr::Tuple(items) => items.iter().for_each(|e| walk_expr(e, operators, prefix_operators, out)),
        Expr::RecordLiteral { fields, .. } => fields.iter().for_each(|(_, e)| walk_expr(e, operators, prefix_operators, out)),
        Expr::RecordProjection { target, .. } => walk_expr(target, operators, prefix_operators, out),
        Expr::Constructor { args, .. } => args.iter().for_each(|e| walk_expr(e, operators, prefix_operators, out)),
        Expr::Call { callee, argument } => {
            walk_expr(callee, operators, prefix_operators, out);
            walk_expr(argument, operators, prefix_operators, out);
        }
        Expr::Arrow { body, .. } => walk_block(body, operators, prefix_operators, out),
        Expr::Block(block) => walk_block(block, operators, prefix_operators, out),
        Expr::Match { scrutinee, arms } => {
            walk_expr(scrutinee, operators, prefix_operators, out);
            arms.iter().for_each(|arm| walk_block(&arm.body, operators, prefix_operators, out));
        }
        Expr::MatchFn { arms } | Expr::MatchBundleLiteral { arms } => {
            arms.iter().for_each(|arm| walk_block(&arm.body, operators, prefix_operators, out));
        }
        Expr::Binary { op, left, right } => {
            walk_expr(left, operators, prefix_operators, out);
            walk_expr(right, operators, prefix_operators, out);
            if operators.get(op).is_none() {
                out.push(free_operator_diagnostic(expr, op));
            }
        }
        Expr::Unary { op, operand } => {
            walk_expr(operand, operators, prefix_operators, out);
            if !prefix_operators.contains(op) {
                out.push(free_operator_diagnostic(expr, op));
            }
        }
    }
}

fn free_operator_diagnostic(expr: &ExprNode, op: &str) -> Diagnostic {
    Diagnostic::new(DiagnosticReason::FreeVariable, expr.id, expr.span).with_names(vec![format!("__op_{op}")])
}

#[cfg(test)]
mod tests {
    use super::*;
    use wm_ast::{Associativity, LetBinding, LetDeclaration, OperatorInfo};
    use wm_common::{NodeId, Span};

    fn let_decl_with(body: BlockExpr, export: bool) -> Declaration {
        Declaration::Let(LetDeclaration {
            id: NodeId(0),
            span: Span::synthetic(),
            is_recursive: false,
            bindings: vec![LetBinding {
                id: NodeId(1),
                span: Span::synthetic(),
                name: "f".to_string(),
                parameters: Vec::new(),
                body,
                annotation: None,
                export,
                is_first_class_match: false,
                is_arrow_syntax: false,
            }],
        })
    }

    #[test]
    fn duplicate_top_level_bindings_are_rejected() {
        let mut program = Program::empty();
        program.declarations.push(let_decl_with(BlockExpr::empty(), false));
        program.declarations.push(let_decl_with(BlockExpr::empty(), false));
        let err = check_duplicate_bindings("m", &program).unwrap_err();
        assert!(matches!(err, HardError::DuplicateBinding { .. }));
    }

    #[test]
    fn a_single_export_is_accepted() {
        let mut program = Program::empty();
        program.declarations.push(let_decl_with(BlockExpr::empty(), true));
        assert!(check_duplicate_exports("m", &program, &[]).is_ok());
    }

    #[test]
    fn an_undeclared_binary_operator_is_reported_as_a_free_operator() {
        let left = ExprNode::new(NodeId(2), Span::new(0, 1), Expr::Literal(wm_ast::LiteralValue::Scalar(wm_ast::Literal::Int(1))));
        let right = left.clone();
        let binary = ExprNode::new(
            NodeId(3),
            Span::new(0, 3),
            Expr::Binary { op: "<>".to_string(), left: Box::new(left), right: Box::new(right) },
        );
        let mut body = BlockExpr::empty();
        body.result = Some(Box::new(binary));
        let mut program = Program::empty();
        program.declarations.push(let_decl_with(body, false));

        let diagnostics = collect_operator_diagnostics(&program, &OperatorTable::new(), &PrefixOperatorSet::new());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].reason, DiagnosticReason::FreeVariable);
        assert_eq!(diagnostics[0].details.names, vec!["__op_<>".to_string()]);
    }

    #[test]
    fn a_declared_operator_produces_no_diagnostic() {
        let left = ExprNode::new(NodeId(2), Span::new(0, 1), Expr::Literal(wm_ast::LiteralValue::Scalar(wm_ast::Literal::Int(1))));
        let right = left.clone();
        let binary = ExprNode::new(
            NodeId(3),
            Span::new(0, 3),
            Expr::Binary { op: "+".to_string(), left: Box::new(left), right: Box::new(right) },
        );
        let mut body = BlockExpr::empty();
        body.result = Some(Box::new(binary));
        let mut program = Program::empty();
        program.declarations.push(let_decl_with(body, false));

        let mut operators = OperatorTable::new();
        operators.insert("+", OperatorInfo { precedence: 6, associativity: Associativity::Left });
        let diagnostics = collect_operator_diagnostics(&program, &operators, &PrefixOperatorSet::new());
        assert!(diagnostics.is_empty());
    }
}
