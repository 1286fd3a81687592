//! Patterns, including match arms (spec §3, §4.2, §4.3).

use crate::Spanned;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Literal {
    Unit,
    Int(i64),
    Bool(bool),
    Char(char),
}

/// String literals carry owned text, kept out of the `Copy` [`Literal`] enum
/// so it stays cheap to clone.
#[derive(Clone, Debug, PartialEq)]
pub enum LiteralValue {
    Scalar(Literal),
    Str(String),
}

pub type PatternNode = Spanned<Pattern>;

#[derive(Clone, Debug, PartialEq)]
pub enum Pattern {
    Wildcard,
    Var(String),
    Literal(LiteralValue),
    Tuple(Vec<PatternNode>),
    Record(Vec<(String, PatternNode)>),
    /// A nominal constructor pattern, e.g. `Some(x)`, or a row-label pattern
    /// over an `EffectRow` scrutinee, e.g. `Err(Missing)`.
    Constructor { name: String, args: Vec<PatternNode> },
}

impl Pattern {
    /// All variable names directly bound by this pattern (not recursing into
    /// a bound sub-pattern's own variables beyond one level is unnecessary —
    /// this does recurse fully, since every binder in a pattern row must be
    /// visible to the arm body).
    pub fn bound_names(&self, out: &mut Vec<String>) {
        match self {
            Pattern::Wildcard | Pattern::Literal(_) => {}
            Pattern::Var(name) => out.push(name.clone()),
            Pattern::Tuple(elems) => elems.iter().for_each(|e| e.node.bound_names(out)),
            Pattern::Record(fields) => fields.iter().for_each(|(_, p)| p.node.bound_names(out)),
            Pattern::Constructor { args, .. } => args.iter().for_each(|a| a.node.bound_names(out)),
        }
    }
}

/// One `pattern => body` clause of a `match`.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchArm {
    pub pattern: PatternNode,
    pub body: crate::expr::BlockExpr,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wm_common::{NodeId, Span};

    fn p(pat: Pattern) -> PatternNode {
        Spanned::new(NodeId(0), Span::new(0, 0), pat)
    }

    #[test]
    fn duplicate_variable_names_are_both_reported_by_bound_names() {
        let pat = Pattern::Tuple(vec![p(Pattern::Var("x".into())), p(Pattern::Var("x".into()))]);
        let mut out = Vec::new();
        pat.bound_names(&mut out);
        assert_eq!(out, vec!["x".to_string(), "x".to_string()]);
    }
}
