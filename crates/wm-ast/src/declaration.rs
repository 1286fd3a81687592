//! Top-level declarations (spec §6's "Declaration shapes recognized").

use crate::expr::BlockExpr;
use crate::operator::OperatorDeclaration;
use crate::pattern::PatternNode;
use crate::type_expr::TypeExprNode;
use wm_common::{NodeId, Span};

/// One `name (params)? (: Type)? = body` clause of a (possibly mutually
/// recursive) `let` group.
#[derive(Clone, Debug, PartialEq)]
pub struct LetBinding {
    pub id: NodeId,
    pub span: Span,
    pub name: String,
    pub parameters: Vec<PatternNode>,
    pub body: BlockExpr,
    pub annotation: Option<TypeExprNode>,
    pub export: bool,
    /// Set by the canonicalization pre-pass when this binding's body was
    /// originally written as `match(x) => { … }` (spec §4.3).
    pub is_first_class_match: bool,
    pub is_arrow_syntax: bool,
}

/// `let [rec] name = expr [and name' = expr']*`. All names are introduced
/// with fresh variable schemes before any body is inferred when
/// `is_recursive` is set (spec §4.3).
#[derive(Clone, Debug, PartialEq)]
pub struct LetDeclaration {
    pub id: NodeId,
    pub span: Span,
    pub is_recursive: bool,
    pub bindings: Vec<LetBinding>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeMember {
    pub name: String,
    pub args: Vec<TypeExprNode>,
}

/// `type [export] N<α,…> = Member (| Member)*`, or a plain alias when
/// `alias` is set instead of `members`.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeDeclaration {
    pub id: NodeId,
    pub span: Span,
    pub name: String,
    pub export: bool,
    pub parameters: Vec<String>,
    pub members: Vec<TypeMember>,
    pub alias: Option<TypeExprNode>,
}

/// `record N<α,…> { field: T, … }`.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordDeclaration {
    pub id: NodeId,
    pub span: Span,
    pub name: String,
    pub export: bool,
    pub parameters: Vec<String>,
    pub fields: Vec<(String, TypeExprNode)>,
}

/// `infectious <domain> type N<V, S> = @value C<V> | @effect D<S>` (spec §4.6).
#[derive(Clone, Debug, PartialEq)]
pub struct InfectiousDeclaration {
    pub id: NodeId,
    pub span: Span,
    /// `error`, `taint`, `mem`, or `hole` (spec §4.6's per-domain boundary rules).
    pub domain: String,
    pub name: String,
    pub value_param: String,
    pub effect_param: String,
    pub value_constructor: (String, TypeExprNode),
    pub effect_constructor: (String, TypeExprNode),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Declaration {
    Let(LetDeclaration),
    Type(TypeDeclaration),
    Record(RecordDeclaration),
    Infix(OperatorDeclaration),
    Prefix(OperatorDeclaration),
    Infectious(InfectiousDeclaration),
}

impl Declaration {
    #[must_use]
    pub fn id(&self) -> NodeId {
        match self {
            Declaration::Let(d) => d.id,
            Declaration::Type(d) => d.id,
            Declaration::Record(d) => d.id,
            Declaration::Infix(d) => d.id,
            Declaration::Prefix(d) => d.id,
            Declaration::Infectious(d) => d.id,
        }
    }
}
