//! End-to-end golden scenarios run through the whole facade: `check_program`
//! over a hand-built `Program` (there is no parser in this workspace — the
//! AST shapes themselves are the fixture), asserting on the diagnostics and
//! exported schemes the pipeline actually produces. Mirrors how `tsz`'s own
//! integration suite drives its checker directly off constructed ASTs
//! rather than source text.

use wm_ast::{
    Associativity, BlockExpr, Declaration, Expr, ExprNode, Literal, LiteralValue, LetBinding, LetDeclaration,
    MatchArm, OperatorDeclaration, Pattern, PatternNode, Program, Statement, TypeDeclaration, TypeExpr,
    TypeExprNode, TypeMember,
};
use wm_ast::{OperatorTable, PrefixOperatorSet};
use wm_common::{NodeId, PipelineOptions, Span};
use wm_loader::{ModuleProvider, ProviderError};

struct SingleModuleProvider {
    program: Program,
}

impl ModuleProvider for SingleModuleProvider {
    fn parse(&self, _path: &str, _operators: &OperatorTable, _prefix_operators: &PrefixOperatorSet) -> Result<Program, ProviderError> {
        Ok(self.program.clone())
    }
}

fn check(program: Program) -> workman::LoaderOutput {
    let provider = SingleModuleProvider { program };
    workman::check_program("root", &provider, &PipelineOptions::default()).unwrap()
}

fn node(id: u32) -> NodeId {
    NodeId(id)
}

fn span(id: u32) -> Span {
    Span::new(id, id + 1)
}

fn expr(id: u32, node_expr: Expr) -> ExprNode {
    ExprNode::new(node(id), span(id), node_expr)
}

fn pat(id: u32, pattern: Pattern) -> PatternNode {
    PatternNode::new(node(id), span(id), pattern)
}

fn type_expr(id: u32, ty: TypeExpr) -> TypeExprNode {
    TypeExprNode::new(node(id), span(id), ty)
}

fn block_returning(e: ExprNode) -> BlockExpr {
    BlockExpr { statements: Vec::new(), result: Some(Box::new(e)) }
}

// `is_first_class_match`/`is_arrow_syntax` only affect presentation, never
// inference; these fixtures don't exercise either.
fn let_binding(id: u32, name: &str, parameters: Vec<PatternNode>, body: BlockExpr, export: bool) -> LetBinding {
    LetBinding {
        id: node(id),
        span: span(id),
        name: name.to_string(),
        parameters,
        body,
        annotation: None,
        export,
        is_first_class_match: false,
        is_arrow_syntax: true,
    }
}

fn let_decl(id: u32, bindings: Vec<LetBinding>) -> Declaration {
    Declaration::Let(LetDeclaration { id: node(id), span: span(id), is_recursive: false, bindings })
}

/// Scenario 1 — Polymorphic identity: `let id = (x) => { x };` generalizes
/// to a single quantified type variable.
#[test]
fn polymorphic_identity_generalizes_over_one_quantifier() {
    let mut program = Program::empty();
    let body = block_returning(expr(2, Expr::Identifier("x".to_string())));
    let binding = let_binding(1, "id", vec![pat(3, Pattern::Var("x".to_string()))], body, true);
    program.declarations.push(let_decl(0, vec![binding]));

    let output = check(program);
    let root = output.modules.get("root").unwrap();
    assert!(workman::all_diagnostics(&output).is_empty());
    let (_, scheme) = root.summary.exports.iter().find(|(name, _)| name == "id").unwrap();
    assert_eq!(scheme.quantifiers.len(), 1);
}

fn option_type_decl() -> Declaration {
    Declaration::Type(TypeDeclaration {
        id: node(100),
        span: span(100),
        name: "Option".to_string(),
        export: false,
        parameters: vec!["T".to_string()],
        members: vec![
            TypeMember { name: "None".to_string(), args: Vec::new() },
            TypeMember { name: "Some".to_string(), args: vec![type_expr(101, TypeExpr::Parameter("T".to_string()))] },
        ],
        alias: None,
    })
}

/// Scenario 2 — Option mapping: a `match` over `Some`/`None` typechecks
/// cleanly and its exported scheme stays polymorphic over the option's
/// element type.
#[test]
fn option_mapping_over_both_arms_typechecks() {
    let mut program = Program::empty();
    program.declarations.push(option_type_decl());

    let scrutinee = expr(10, Expr::Identifier("opt".to_string()));
    let some_arm = MatchArm {
        pattern: pat(11, Pattern::Constructor { name: "Some".to_string(), args: vec![pat(12, Pattern::Var("x".to_string()))] }),
        body: block_returning(expr(13, Expr::Identifier("x".to_string()))),
    };
    let none_arm = MatchArm {
        pattern: pat(14, Pattern::Constructor { name: "None".to_string(), args: Vec::new() }),
        body: block_returning(expr(15, Expr::Literal(LiteralValue::Scalar(Literal::Int(0))))),
    };
    let match_expr = expr(16, Expr::Match { scrutinee: Box::new(scrutinee), arms: vec![some_arm, none_arm] });
    let body = block_returning(match_expr);
    let binding = let_binding(17, "unwrapOr0", vec![pat(18, Pattern::Var("opt".to_string()))], body, true);
    program.declarations.push(let_decl(9, vec![binding]));

    let output = check(program);
    assert!(workman::all_diagnostics(&output).is_empty());
    assert!(workman::is_emittable(&output));
}

/// Scenario 3 — Branch mismatch: `match(true) { true => {1}, false => {false} }`
/// joins an `Int` arm with a `Bool` arm.
#[test]
fn mismatched_branch_bodies_are_reported_once() {
    let mut program = Program::empty();
    let scrutinee = expr(20, Expr::Literal(LiteralValue::Scalar(Literal::Bool(true))));
    let true_arm = MatchArm {
        pattern: pat(21, Pattern::Literal(LiteralValue::Scalar(Literal::Bool(true)))),
        body: block_returning(expr(22, Expr::Literal(LiteralValue::Scalar(Literal::Int(1))))),
    };
    let false_arm = MatchArm {
        pattern: pat(23, Pattern::Literal(LiteralValue::Scalar(Literal::Bool(false)))),
        body: block_returning(expr(24, Expr::Literal(LiteralValue::Scalar(Literal::Bool(false))))),
    };
    let match_expr = expr(25, Expr::Match { scrutinee: Box::new(scrutinee), arms: vec![true_arm, false_arm] });
    let binding = let_binding(26, "bad", Vec::new(), block_returning(match_expr), false);
    program.declarations.push(let_decl(19, vec![binding]));

    let output = check(program);
    let diagnostics = workman::all_diagnostics(&output);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].reason, wm_common::DiagnosticReason::BranchMismatch);
}

/// Scenario 4 — Non-exhaustive match: only the `Some` arm is handled.
#[test]
fn a_match_missing_an_arm_is_non_exhaustive() {
    let mut program = Program::empty();
    program.declarations.push(option_type_decl());

    let scrutinee = expr(30, Expr::Identifier("opt".to_string()));
    let some_arm = MatchArm {
        pattern: pat(31, Pattern::Constructor { name: "Some".to_string(), args: vec![pat(32, Pattern::Wildcard)] }),
        body: block_returning(expr(33, Expr::Literal(LiteralValue::Scalar(Literal::Int(1))))),
    };
    let match_expr = expr(34, Expr::Match { scrutinee: Box::new(scrutinee), arms: vec![some_arm] });
    let body = block_returning(match_expr);
    let binding = let_binding(35, "bad", vec![pat(36, Pattern::Var("opt".to_string()))], body, true);
    program.declarations.push(let_decl(29, vec![binding]));

    let output = check(program);
    let diagnostics = workman::all_diagnostics(&output);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].reason, wm_common::DiagnosticReason::NonExhaustiveMatch);
}

/// Scenario 5 — Precedence evaluation: user-declared `+`/`*` operators
/// resolve to the declared functions and the already-precedence-shaped tree
/// `2 + (3 * 4)` typechecks as `Int`. Parsing precedence itself is an
/// external collaborator's job (spec §1); this exercises operator-table
/// resolution over an already-correctly-shaped tree.
#[test]
fn declared_operators_resolve_to_their_functions() {
    let mut program = Program::empty();
    program.declarations.push(Declaration::Infix(OperatorDeclaration {
        id: node(40),
        span: span(40),
        symbol: "+".to_string(),
        precedence: Some(6),
        associativity: Some(Associativity::Left),
        function_name: "add".to_string(),
    }));
    program.declarations.push(Declaration::Infix(OperatorDeclaration {
        id: node(41),
        span: span(41),
        symbol: "*".to_string(),
        precedence: Some(7),
        associativity: Some(Associativity::Left),
        function_name: "mul".to_string(),
    }));

    let two_params = |a: u32, b: u32| vec![pat(a, Pattern::Var("x".to_string())), pat(b, Pattern::Var("y".to_string()))];
    let add_body = block_returning(expr(44, Expr::Identifier("x".to_string())));
    let add = let_binding(43, "add", two_params(45, 46), add_body, false);
    let mul_body = block_returning(expr(48, Expr::Identifier("x".to_string())));
    let mul = let_binding(47, "mul", two_params(49, 50), mul_body, false);
    program.declarations.push(let_decl(42, vec![add]));
    program.declarations.push(let_decl(51, vec![mul]));

    let three_times_four = expr(
        52,
        Expr::Binary {
            op: "*".to_string(),
            left: Box::new(expr(53, Expr::Literal(LiteralValue::Scalar(Literal::Int(3))))),
            right: Box::new(expr(54, Expr::Literal(LiteralValue::Scalar(Literal::Int(4))))),
        },
    );
    let two_plus = expr(
        55,
        Expr::Binary {
            op: "+".to_string(),
            left: Box::new(expr(56, Expr::Literal(LiteralValue::Scalar(Literal::Int(2))))),
            right: Box::new(three_times_four),
        },
    );
    let r = let_binding(57, "r", Vec::new(), block_returning(two_plus), true);
    program.declarations.push(let_decl(58, vec![r]));

    let output = check(program);
    assert!(workman::all_diagnostics(&output).is_empty());
}

/// Scenario 6 — Infectious spread then annotation mismatch:
/// `parseMaybe` spreads `Result<_, ParseError>` through its two arms, and
/// forcing the call's result into `Int` is an infectious boundary
/// violation, not a plain type mismatch.
#[test]
fn an_unresolved_infectious_result_forced_into_a_concrete_annotation_is_flagged() {
    let mut program = Program::empty();
    program.declarations.push(Declaration::Type(TypeDeclaration {
        id: node(60),
        span: span(60),
        name: "ParseError".to_string(),
        export: false,
        parameters: Vec::new(),
        members: vec![TypeMember { name: "Missing".to_string(), args: Vec::new() }],
        alias: None,
    }));

    let ok_arm = MatchArm {
        pattern: pat(61, Pattern::Literal(LiteralValue::Scalar(Literal::Bool(true)))),
        body: block_returning(expr(
            62,
            Expr::Constructor { name: "Ok".to_string(), args: vec![expr(63, Expr::Literal(LiteralValue::Scalar(Literal::Int(1))))] },
        )),
    };
    let err_arm = MatchArm {
        pattern: pat(64, Pattern::Literal(LiteralValue::Scalar(Literal::Bool(false)))),
        body: block_returning(expr(
            65,
            Expr::Constructor { name: "Err".to_string(), args: vec![expr(66, Expr::Constructor { name: "Missing".to_string(), args: Vec::new() })] },
        )),
    };
    let match_fn = expr(67, Expr::MatchFn { arms: vec![ok_arm, err_arm] });
    let parse_maybe = let_binding(68, "parseMaybe", Vec::new(), block_returning(match_fn), false);
    program.declarations.push(let_decl(59, vec![parse_maybe]));

    let call = expr(
        70,
        Expr::Call {
            callee: Box::new(expr(71, Expr::Identifier("parseMaybe".to_string()))),
            argument: Box::new(expr(72, Expr::Literal(LiteralValue::Scalar(Literal::Bool(true))))),
        },
    );
    let mut forced = let_binding(73, "forced", Vec::new(), block_returning(call), false);
    forced.annotation = Some(type_expr(74, TypeExpr::Int));
    program.declarations.push(let_decl(69, vec![forced]));

    let output = check(program);
    let diagnostics = workman::all_diagnostics(&output);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].reason, wm_common::DiagnosticReason::InfectiousCallResultMismatch);
    assert!(!workman::is_emittable(&output));
}

#[test]
fn a_program_with_no_diagnostics_is_emittable() {
    let mut program = Program::empty();
    let body = block_returning(expr(2, Expr::Identifier("x".to_string())));
    let binding = let_binding(1, "id", vec![pat(3, Pattern::Var("x".to_string()))], body, true);
    program.declarations.push(let_decl(0, vec![binding]));

    let output = check(program);
    assert!(workman::is_emittable(&output));
}
