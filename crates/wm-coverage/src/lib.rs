//! Pattern coverage / exhaustiveness analysis for the workman front-end
//! (spec's C2). Used by the Layer-1 inferencer when checking a `match`
//! expression and by the infection registry when deciding whether a `match`
//! discharges an effect (spec §4.6).

pub mod matrix;
pub mod report;

pub use matrix::{analyze, duplicate_bound_names, duplicate_variable_diagnostics, duplicate_variable_patterns};
pub use report::{CoverageReport, RowDischarge};

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use wm_ast::pattern::{Literal, LiteralValue, Pattern};
    use wm_ast::{BlockExpr, MatchArm};
    use wm_common::{NodeId, Span};
    use wm_types::{ConstructorInfo, TypeArena, TypeEnv, TypeInfo};

    fn arm(pattern: Pattern) -> MatchArm {
        MatchArm {
            pattern: wm_ast::Spanned::new(NodeId(0), Span::new(0, 0), pattern),
            body: BlockExpr::empty(),
        }
    }

    #[test]
    fn bool_scrutinee_with_both_arms_is_exhaustive() {
        let mut arena = TypeArena::new();
        let env = TypeEnv::new();
        let scrutinee = arena.bool();
        let arms = vec![
            arm(Pattern::Literal(LiteralValue::Scalar(Literal::Bool(true)))),
            arm(Pattern::Literal(LiteralValue::Scalar(Literal::Bool(false)))),
        ];
        let report = analyze(&mut arena, &env, scrutinee, &arms);
        assert!(report.is_exhaustive());
        assert!(report.missing_constructors.is_empty());
    }

    #[test]
    fn bool_scrutinee_missing_a_case_reports_it() {
        let mut arena = TypeArena::new();
        let env = TypeEnv::new();
        let scrutinee = arena.bool();
        let arms = vec![arm(Pattern::Literal(LiteralValue::Scalar(Literal::Bool(true))))];
        let report = analyze(&mut arena, &env, scrutinee, &arms);
        assert_eq!(report.missing_constructors, vec!["false".to_string()]);
    }

    #[test]
    fn adt_scrutinee_checks_against_declared_constructors() {
        let mut arena = TypeArena::new();
        let mut env = TypeEnv::new();
        env.insert(
            "Option",
            TypeInfo::Adt {
                parameters: Vec::new(),
                constructors: vec![
                    ConstructorInfo { name: "Some".into(), args: vec![] },
                    ConstructorInfo { name: "None".into(), args: vec![] },
                ],
            },
        );
        let scrutinee = arena.constructor("Option", vec![]);
        let arms = vec![arm(Pattern::Constructor { name: "Some".into(), args: vec![] })];
        let report = analyze(&mut arena, &env, scrutinee, &arms);
        assert_eq!(report.missing_constructors, vec!["None".to_string()]);
    }

    #[test]
    fn a_wildcard_arm_after_full_coverage_is_redundant() {
        let mut arena = TypeArena::new();
        let env = TypeEnv::new();
        let scrutinee = arena.bool();
        let arms = vec![
            arm(Pattern::Literal(LiteralValue::Scalar(Literal::Bool(true)))),
            arm(Pattern::Literal(LiteralValue::Scalar(Literal::Bool(false)))),
            arm(Pattern::Wildcard),
        ];
        let report = analyze(&mut arena, &env, scrutinee, &arms);
        assert_eq!(report.redundant_arms, vec![2]);
    }

    #[test]
    fn numeric_scrutinee_always_requires_a_wildcard() {
        let mut arena = TypeArena::new();
        let env = TypeEnv::new();
        let scrutinee = arena.int();
        let arms = vec![arm(Pattern::Literal(LiteralValue::Scalar(Literal::Int(0))))];
        let report = analyze(&mut arena, &env, scrutinee, &arms);
        assert!(!report.is_exhaustive());
        assert_eq!(report.missing_constructors, vec!["_".to_string()]);
    }

    #[test]
    fn duplicate_variable_in_one_pattern_row_is_detected() {
        let pattern = Pattern::Tuple(vec![
            wm_ast::Spanned::new(NodeId(0), Span::new(0, 0), Pattern::Var("x".into())),
            wm_ast::Spanned::new(NodeId(0), Span::new(0, 0), Pattern::Var("x".into())),
        ]);
        assert_eq!(duplicate_bound_names(&pattern), vec!["x".to_string()]);
    }

    #[test]
    fn effect_row_scrutinee_without_a_tail_discharges_when_all_labels_are_matched() {
        let mut arena = TypeArena::new();
        let env = TypeEnv::new();
        let mut cases = IndexMap::new();
        cases.insert("Missing".to_string(), None);
        let scrutinee = arena.effect_row(cases, None, false);
        let arms = vec![arm(Pattern::Constructor { name: "Missing".into(), args: vec![] })];
        let report = analyze(&mut arena, &env, scrutinee, &arms);
        let discharge = report.row_discharge.unwrap();
        assert!(discharge.discharges_result);
        assert!(discharge.remaining_labels.is_empty());
    }

    #[test]
    fn effect_row_scrutinee_with_an_open_tail_needs_a_wildcard_to_discharge() {
        let mut arena = TypeArena::new();
        let env = TypeEnv::new();
        let mut cases = IndexMap::new();
        cases.insert("Missing".to_string(), None);
        let tail = arena.fresh_var();
        let scrutinee = arena.effect_row(cases, Some(tail), false);
        let arms = vec![arm(Pattern::Constructor { name: "Missing".into(), args: vec![] })];
        let report = analyze(&mut arena, &env, scrutinee, &arms);
        assert!(!report.row_discharge.unwrap().discharges_result);

        let arms_with_wildcard =
            vec![arm(Pattern::Constructor { name: "Missing".into(), args: vec![] }), arm(Pattern::Wildcard)];
        let report = analyze(&mut arena, &env, scrutinee, &arms_with_wildcard);
        assert!(report.row_discharge.unwrap().discharges_result);
    }
}
