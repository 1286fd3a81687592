//! Expressions (spec §4.3's expression-kind table).

use crate::pattern::{LiteralValue, MatchArm, PatternNode};
use crate::type_expr::TypeExprNode;
use crate::Spanned;

pub type ExprNode = Spanned<Expr>;

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Identifier(String),
    Literal(LiteralValue),
    Tuple(Vec<ExprNode>),
    RecordLiteral {
        fields: Vec<(String, ExprNode)>,
        /// Recorded for the formatter only (spec §4.3); has no effect on inference.
        multiline: bool,
    },
    RecordProjection { target: Box<ExprNode>, field: String },
    Constructor { name: String, args: Vec<ExprNode> },
    Call { callee: Box<ExprNode>, argument: Box<ExprNode> },
    Arrow { parameters: Vec<PatternNode>, body: Box<BlockExpr> },
    Block(BlockExpr),
    Match { scrutinee: Box<ExprNode>, arms: Vec<MatchArm> },
    /// `match(x) => { arms }` — rewritten by the canonicalization pre-pass
    /// (§4.3) into `λp. match(p){arms}` before Layer-1 inference proper runs.
    MatchFn { arms: Vec<MatchArm> },
    /// A first-class `match { … }` value (a "bundle"): `T_scrut → T_body`.
    MatchBundleLiteral { arms: Vec<MatchArm> },
    Binary { op: String, left: Box<ExprNode>, right: Box<ExprNode> },
    Unary { op: String, operand: Box<ExprNode> },
    /// Explicit `?`.
    Hole,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Let(crate::declaration::LetBinding),
    Expr(ExprNode),
}

/// `{ statement* result? }`. The optional trailing `result` expression gives
/// the block's type; otherwise the block's type is `Unit` (spec §4.3).
#[derive(Clone, Debug, PartialEq)]
pub struct BlockExpr {
    pub statements: Vec<Statement>,
    pub result: Option<Box<ExprNode>>,
}

impl BlockExpr {
    #[must_use]
    pub fn empty() -> Self {
        BlockExpr { statements: Vec::new(), result: None }
    }
}
