//! Pattern inference: binds variables into the current [`wm_types::ValueEnv`]
//! scope and unifies each pattern shape against the scrutinee type (spec
//! §4.2, §4.3).

use indexmap::IndexMap;
use wm_ast::{Pattern, PatternNode};
use wm_types::{Scheme, TypeData, TypeId, TypeInfo};

use crate::context::InferContext;
use crate::stub::Mark;

/// Binds `pattern`'s variables against `scrutinee` and records the pattern
/// node's own type. Non-fatal shape mismatches are recorded as a
/// [`Mark::Pattern`] rather than aborting — the arm still gets a body type.
pub fn infer_pattern(ctx: &mut InferContext, pattern: &PatternNode, scrutinee: TypeId) {
    ctx.set_node_type(pattern.id, pattern.span, scrutinee);
    match &pattern.node {
        Pattern::Wildcard => {}
        Pattern::Var(name) => {
            ctx.value_env.bind(name.clone(), Scheme::monomorphic(scrutinee));
        }
        Pattern::Literal(lit) => {
            let lit_ty = crate::expr::literal_type(ctx, lit);
            if ctx.arena.unify(scrutinee, lit_ty).is_err() {
                ctx.marked.mark(pattern.id, Mark::Pattern { issue: "literal_mismatch".into() });
            }
        }
        Pattern::Tuple(elems) => {
            let elem_vars: Vec<TypeId> = elems.iter().map(|_| ctx.arena.fresh_var()).collect();
            let tuple_ty = ctx.arena.tuple(elem_vars.clone());
            if ctx.arena.unify(scrutinee, tuple_ty).is_err() {
                ctx.marked.mark(pattern.id, Mark::Pattern { issue: "tuple_mismatch".into() });
            }
            for (elem, var) in elems.iter().zip(elem_vars) {
                infer_pattern(ctx, elem, var);
            }
        }
        Pattern::Record(fields) => {
            let mut map = IndexMap::new();
            let mut field_vars = Vec::with_capacity(fields.len());
            for (name, _) in fields {
                let v = ctx.arena.fresh_var();
                map.insert(name.clone(), v);
                field_vars.push(v);
            }
            let record_ty = ctx.arena.record(map);
            if ctx.arena.unify(scrutinee, record_ty).is_err() {
                ctx.marked.mark(pattern.id, Mark::Pattern { issue: "record_mismatch".into() });
            }
            for ((_, pat), var) in fields.iter().zip(field_vars) {
                infer_pattern(ctx, pat, var);
            }
        }
        Pattern::Constructor { name, args } => infer_constructor_pattern(ctx, pattern, name, args, scrutinee),
    }
}

/// A constructor pattern is either a nominal ADT constructor (`Some(x)`) or,
/// over an `EffectRow` scrutinee, a row-label pattern (`Err(reason)`) — spec
/// §4.6's pattern-over-a-row case.
fn infer_constructor_pattern(
    ctx: &mut InferContext,
    pattern: &PatternNode,
    name: &str,
    args: &[PatternNode],
    scrutinee: TypeId,
) {
    let resolved = ctx.arena.resolve_shallow(scrutinee);
    if let TypeData::EffectRow { cases, .. } = ctx.arena.get(resolved).clone() {
        let payload = cases.get(name).copied().flatten();
        match (payload, args.first()) {
            (Some(payload_ty), Some(arg_pat)) => infer_pattern(ctx, arg_pat, payload_ty),
            (None, Some(arg_pat)) => {
                let v = ctx.arena.fresh_var();
                infer_pattern(ctx, arg_pat, v);
            }
            _ => {}
        }
        return;
    }

    let found = ctx
        .type_env
        .iter()
        .find_map(|(type_name, info)| match info {
            TypeInfo::Adt { parameters, constructors } => constructors
                .iter()
                .find(|c| c.name == name)
                .map(|c| (type_name.to_string(), parameters.clone(), c.args.clone())),
            _ => None,
        });

    let Some((type_name, params, ctor_arg_types)) = found else {
        ctx.marked.mark(pattern.id, Mark::Pattern { issue: "unknown_constructor".into() });
        for arg_pat in args {
            let v = ctx.arena.fresh_var();
            infer_pattern(ctx, arg_pat, v);
        }
        return;
    };

    let fresh: Vec<TypeId> = params.iter().map(|_| ctx.arena.fresh_var()).collect();
    let mapping = params.iter().copied().zip(fresh.iter().copied()).collect();
    let expected_ty = ctx.arena.constructor(type_name, fresh);
    if ctx.arena.unify(scrutinee, expected_ty).is_err() {
        ctx.marked.mark(pattern.id, Mark::Pattern { issue: "constructor_mismatch".into() });
    }
    if args.len() != ctor_arg_types.len() {
        ctx.marked.mark(pattern.id, Mark::Pattern { issue: "arity".into() });
    }
    for (i, arg_pat) in args.iter().enumerate() {
        let arg_ty = match ctor_arg_types.get(i) {
            Some(t) => ctx.arena.instantiate_with_map(*t, &mapping),
            None => ctx.arena.fresh_var(),
        };
        infer_pattern(ctx, arg_pat, arg_ty);
    }
}
