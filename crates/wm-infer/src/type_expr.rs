//! Resolving surface [`wm_ast::TypeExpr`] nodes (annotations, ADT member
//! arguments, record field types) into arena [`TypeId`]s (spec §6).

use rustc_hash::FxHashMap;
use wm_ast::{TypeExpr, TypeExprNode};
use wm_types::{HoleProvenance, TyVar, TypeId, TypeInfo};

use crate::context::InferContext;
use crate::stub::{HoleCategory, Mark};

/// `params` maps a declaration's own lowercase type-parameter names to the
/// fresh vars standing in for them in the current arena.
pub fn resolve_type_expr(
    ctx: &mut InferContext,
    texpr: &TypeExprNode,
    params: &FxHashMap<String, TypeId>,
) -> TypeId {
    match &texpr.node {
        TypeExpr::Unit => ctx.arena.unit(),
        TypeExpr::Int => ctx.arena.int(),
        TypeExpr::Bool => ctx.arena.bool(),
        TypeExpr::Char => ctx.arena.char(),
        TypeExpr::String => ctx.arena.string(),
        TypeExpr::Parameter(name) => match params.get(name) {
            Some(ty) => *ty,
            None => {
                ctx.marked.mark(texpr.id, Mark::TypeExprUnknown);
                ctx.fresh_hole(HoleProvenance::MissingImport, HoleCategory::Unfilled, texpr.id, texpr.span)
            }
        },
        TypeExpr::Named { name, args } => {
            let resolved_args: Vec<TypeId> =
                args.iter().map(|a| resolve_type_expr(ctx, a, params)).collect();
            if let Some(info) = ctx.type_env.lookup(name) {
                let expected = match info {
                    TypeInfo::Alias { parameters, .. }
                    | TypeInfo::Adt { parameters, .. }
                    | TypeInfo::Record { parameters, .. } => parameters.len(),
                };
                if expected != resolved_args.len() {
                    ctx.marked.mark(texpr.id, Mark::TypeExprArity);
                }
            }
            ctx.arena.constructor(name.clone(), resolved_args)
        }
        TypeExpr::Tuple(elems) => {
            let ids: Vec<TypeId> = elems.iter().map(|e| resolve_type_expr(ctx, e, params)).collect();
            ctx.arena.tuple(ids)
        }
        TypeExpr::Record(fields) => {
            let map = fields.iter().map(|(k, v)| (k.clone(), resolve_type_expr(ctx, v, params))).collect();
            ctx.arena.record(map)
        }
        TypeExpr::Func { from, to } => {
            let f = resolve_type_expr(ctx, from, params);
            let t = resolve_type_expr(ctx, to, params);
            ctx.arena.func(f, t)
        }
        TypeExpr::Array { length, element } => {
            let e = resolve_type_expr(ctx, element, params);
            ctx.arena.array(*length, e)
        }
        TypeExpr::EffectRow { cases, tail, has_tail_wildcard } => {
            let cases_map = cases
                .iter()
                .map(|(label, payload)| (label.clone(), payload.as_ref().map(|t| resolve_type_expr(ctx, t, params))))
                .collect();
            let tail_ty = tail.as_ref().map(|t| resolve_type_expr(ctx, t, params));
            ctx.arena.effect_row(cases_map, tail_ty, *has_tail_wildcard)
        }
        TypeExpr::Hole => ctx.fresh_hole(HoleProvenance::ExplicitHole, HoleCategory::ExprHole, texpr.id, texpr.span),
    }
}

/// Allocates one fresh unification variable per declared type-parameter name
/// and returns both the name->var map (for [`resolve_type_expr`]) and the
/// bare [`TyVar`] list a [`wm_types::TypeInfo`] stores.
pub fn fresh_params(ctx: &mut InferContext, names: &[String]) -> (FxHashMap<String, TypeId>, Vec<TyVar>) {
    let mut map = FxHashMap::default();
    let mut vars = Vec::with_capacity(names.len());
    for name in names {
        let ty = ctx.arena.fresh_var();
        if let wm_types::TypeData::Var(v) = ctx.arena.get(ty) {
            vars.push(*v);
        }
        map.insert(name.clone(), ty);
    }
    (map, vars)
}
