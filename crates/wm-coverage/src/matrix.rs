//! The exhaustiveness/redundancy algorithm itself (spec §4.2): a
//! decision-tree-over-pattern-matrix approach, specialized to the four
//! scrutinee shapes the language distinguishes (ADT/Bool, tuple/record,
//! infinite literal domains, and effect rows).

use rustc_hash::FxHashSet;
use wm_ast::pattern::{LiteralValue, Pattern, PatternNode};
use wm_ast::MatchArm;
use wm_common::{Diagnostic, DiagnosticReason};
use wm_types::{TypeArena, TypeData, TypeEnv, TypeId, TypeInfo};

use crate::report::{CoverageReport, RowDischarge};

/// The "head constructor" a single top-level pattern commits to, used to
/// compare against a scrutinee type's universe.
enum Head {
    /// `_` or a bare variable binding — matches anything.
    Tail,
    Bool(bool),
    Constructor(String),
    /// A tuple or record pattern — the type's only constructor, so any
    /// single arm of this shape is itself exhaustive for the shape.
    Shape,
    /// An `Int`/`Char`/`String` literal — part of an infinite domain.
    Literal(String),
}

fn head_of(pattern: &Pattern) -> Head {
    match pattern {
        Pattern::Wildcard | Pattern::Var(_) => Head::Tail,
        Pattern::Literal(LiteralValue::Scalar(wm_ast::pattern::Literal::Bool(b))) => Head::Bool(*b),
        Pattern::Literal(LiteralValue::Scalar(wm_ast::pattern::Literal::Unit)) => Head::Shape,
        Pattern::Literal(LiteralValue::Scalar(wm_ast::pattern::Literal::Int(n))) => {
            Head::Literal(n.to_string())
        }
        Pattern::Literal(LiteralValue::Scalar(wm_ast::pattern::Literal::Char(c))) => {
            Head::Literal(c.to_string())
        }
        Pattern::Literal(LiteralValue::Str(s)) => Head::Literal(s.clone()),
        Pattern::Tuple(_) | Pattern::Record(_) => Head::Shape,
        Pattern::Constructor { name, .. } => Head::Constructor(name.clone()),
    }
}

/// All names bound more than once within a single pattern row (spec §4.2's
/// `duplicate_variable`).
#[must_use]
pub fn duplicate_bound_names(pattern: &Pattern) -> Vec<String> {
    let mut names = Vec::new();
    pattern.bound_names(&mut names);
    let mut seen = FxHashSet::default();
    let mut dupes = Vec::new();
    for name in names {
        if !seen.insert(name.clone()) && !dupes.contains(&name) {
            dupes.push(name);
        }
    }
    dupes
}

/// The full set of constructor names (or, for an infinite domain, the
/// synthetic `_` sentinel) a scrutinee type requires coverage of.
enum Universe {
    Finite(Vec<String>),
    /// Tuples, records, and `Unit`: exactly one shape, trivially covered by
    /// a single arm of the right kind.
    SingleShape,
    /// `Int`/`Char`/`String`: a wildcard is always required.
    Infinite,
    /// An `EffectRow` scrutinee: covered via row discharge, not constructor
    /// enumeration.
    Row { labels: Vec<String>, has_tail: bool },
}

fn universe_of(arena: &mut TypeArena, type_env: &TypeEnv, scrutinee: TypeId) -> Universe {
    let resolved = arena.resolve_shallow(scrutinee);
    match arena.get(resolved).clone() {
        TypeData::Bool => Universe::Finite(vec!["true".to_string(), "false".to_string()]),
        TypeData::Unit | TypeData::Tuple(_) | TypeData::Record(_) => Universe::SingleShape,
        TypeData::Int | TypeData::Char | TypeData::String => Universe::Infinite,
        TypeData::EffectRow { cases, tail, has_tail_wildcard } => Universe::Row {
            labels: cases.keys().cloned().collect(),
            has_tail: tail.is_some() || has_tail_wildcard,
        },
        TypeData::Constructor { name, .. } => match type_env.lookup(&name) {
            Some(TypeInfo::Adt { constructors, .. }) => {
                Universe::Finite(constructors.iter().map(|c| c.name.clone()).collect())
            }
            _ => Universe::Infinite,
        },
        TypeData::Var(_) | TypeData::Unknown { .. } | TypeData::Func { .. } | TypeData::Array { .. } => {
            // Not a matchable shape; treat conservatively as requiring a
            // wildcard rather than claiming false exhaustiveness.
            Universe::Infinite
        }
    }
}

/// Analyze `arms` against `scrutinee`'s type (spec §4.2).
pub fn analyze(
    arena: &mut TypeArena,
    type_env: &TypeEnv,
    scrutinee: TypeId,
    arms: &[MatchArm],
) -> CoverageReport {
    let universe = universe_of(arena, type_env, scrutinee);

    let heads: Vec<Head> = arms.iter().map(|arm| head_of(&arm.pattern.node)).collect();
    let covers_tail = heads.iter().any(|h| matches!(h, Head::Tail));

    let mut covered_constructors = Vec::new();
    for head in &heads {
        let label = match head {
            Head::Bool(b) => Some(b.to_string()),
            Head::Constructor(name) => Some(name.clone()),
            Head::Literal(lit) => Some(lit.clone()),
            Head::Shape | Head::Tail => None,
        };
        if let Some(label) = label {
            if !covered_constructors.contains(&label) {
                covered_constructors.push(label);
            }
        }
    }

    let mut redundant_arms = Vec::new();
    let mut seen_tail = false;
    let mut seen_constructors: FxHashSet<String> = FxHashSet::default();
    let mut seen_shape = false;
    for (i, head) in heads.iter().enumerate() {
        if seen_tail {
            redundant_arms.push(i);
            continue;
        }
        match head {
            Head::Tail => seen_tail = true,
            Head::Shape => {
                if seen_shape {
                    redundant_arms.push(i);
                }
                seen_shape = true;
            }
            Head::Bool(b) => {
                if !seen_constructors.insert(b.to_string()) {
                    redundant_arms.push(i);
                }
            }
            Head::Constructor(name) => {
                if !seen_constructors.insert(name.clone()) {
                    redundant_arms.push(i);
                }
            }
            Head::Literal(lit) => {
                if !seen_constructors.insert(lit.clone()) {
                    redundant_arms.push(i);
                }
            }
        }
    }

    let (missing_constructors, row_discharge) = match universe {
        Universe::Finite(names) => {
            let missing = if covers_tail {
                Vec::new()
            } else {
                names.into_iter().filter(|n| !covered_constructors.contains(n)).collect()
            };
            (missing, None)
        }
        Universe::SingleShape => {
            let has_shape_arm = heads.iter().any(|h| matches!(h, Head::Shape));
            let missing = if covers_tail || has_shape_arm { Vec::new() } else { vec!["_".to_string()] };
            (missing, None)
        }
        Universe::Infinite => {
            let missing = if covers_tail { Vec::new() } else { vec!["_".to_string()] };
            (missing, None)
        }
        Universe::Row { labels, has_tail } => {
            let remaining: Vec<String> =
                labels.into_iter().filter(|l| !covered_constructors.contains(l)).collect();
            let discharges_result = covers_tail || (remaining.is_empty() && !has_tail);
            let missing = if discharges_result { Vec::new() } else { remaining.clone() };
            (missing, Some(RowDischarge { discharges_result, remaining_labels: remaining }))
        }
    };

    CoverageReport {
        missing_constructors,
        redundant_arms,
        covered_constructors,
        covers_tail,
        row_discharge,
    }
}

/// `duplicate_variable` diagnostics for every arm whose pattern row binds the
/// same name more than once (spec §4.2).
pub fn duplicate_variable_diagnostics(arms: &[MatchArm]) -> Vec<Diagnostic> {
    arms.iter()
        .filter_map(|arm| {
            let dupes = duplicate_bound_names(&arm.pattern.node);
            if dupes.is_empty() {
                None
            } else {
                Some(
                    Diagnostic::new(DiagnosticReason::DuplicateVariable, arm.pattern.id, arm.pattern.span)
                        .with_names(dupes),
                )
            }
        })
        .collect()
}

/// The offending pattern node for each arm with a duplicate binding, paired
/// with the names that repeat — used by callers that want the raw pattern
/// alongside the diagnostic (e.g. to recover into a narrower local scope).
pub fn duplicate_variable_patterns<'a>(
    arms: &'a [MatchArm],
) -> impl Iterator<Item = (&'a PatternNode, Vec<String>)> {
    arms.iter().filter_map(|arm| {
        let dupes = duplicate_bound_names(&arm.pattern.node);
        if dupes.is_empty() {
            None
        } else {
            Some((&arm.pattern, dupes))
        }
    })
}
