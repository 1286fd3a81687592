//! Copies a [`Scheme`] or [`TypeEnv`] from one module's arena into another's
//! (spec §5: "one arena per module... state does not outlive a module's
//! pass except through the merged exports the loader threads forward").
//!
//! A `TypeId` is only meaningful alongside the arena that allocated it, so a
//! module importing another module's exports can't just reuse its `TypeId`s
//! — it has to walk the exported `TypeData` and rebuild an equivalent shape
//! in its own arena.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use wm_types::{ConstructorInfo, Scheme, TyVar, TypeArena, TypeData, TypeEnv, TypeId, TypeInfo};

fn map_var(dst: &mut TypeArena, var_map: &mut FxHashMap<TyVar, TypeId>, v: TyVar) -> TyVar {
    let mapped = *var_map.entry(v).or_insert_with(|| dst.fresh_var());
    match dst.get(mapped) {
        TypeData::Var(fresh) => *fresh,
        _ => unreachable!("fresh_var always allocates a Var node"),
    }
}

fn import_type(dst: &mut TypeArena, src: &mut TypeArena, var_map: &mut FxHashMap<TyVar, TypeId>, id: TypeId) -> TypeId {
    let resolved = src.substitute(id);
    match src.get(resolved).clone() {
        TypeData::Unit => dst.unit(),
        TypeData::Int => dst.int(),
        TypeData::Bool => dst.bool(),
        TypeData::Char => dst.char(),
        TypeData::String => dst.string(),
        TypeData::Var(v) => *var_map.entry(v).or_insert_with(|| dst.fresh_var()),
        TypeData::Func { from, to } => {
            let from = import_type(dst, src, var_map, from);
            let to = import_type(dst, src, var_map, to);
            dst.func(from, to)
        }
        TypeData::Tuple(elements) => {
            let elements = elements.into_iter().map(|e| import_type(dst, src, var_map, e)).collect();
            dst.tuple(elements)
        }
        TypeData::Record(fields) => {
            let fields: IndexMap<String, TypeId> =
                fields.into_iter().map(|(name, ty)| (name, import_type(dst, src, var_map, ty))).collect();
            dst.record(fields)
        }
        TypeData::Constructor { name, args } => {
            let args = args.into_iter().map(|a| import_type(dst, src, var_map, a)).collect();
            dst.constructor(name, args)
        }
        TypeData::Array { length, element } => {
            let element = import_type(dst, src, var_map, element);
            dst.array(length, element)
        }
        TypeData::EffectRow { cases, tail, has_tail_wildcard } => {
            let cases: IndexMap<String, Option<TypeId>> = cases
                .into_iter()
                .map(|(label, payload)| (label, payload.map(|p| import_type(dst, src, var_map, p))))
                .collect();
            let tail = tail.map(|t| import_type(dst, src, var_map, t));
            dst.effect_row(cases, tail, has_tail_wildcard)
        }
        // The hole's own id is arena-local; a fresh hole in `dst` preserves
        // its provenance without trying to carry the id across.
        TypeData::Unknown { provenance, .. } => dst.fresh_hole(provenance),
    }
}

/// Copies one exported scheme, giving its quantifiers fresh `dst` variables
/// consistently (spec §3's "Schemes" — a scheme's bound variables are
/// meaningless outside the scheme itself, so each import gets its own
/// mapping rather than sharing one across unrelated exports).
pub fn import_scheme(dst: &mut TypeArena, src: &mut TypeArena, scheme: &Scheme) -> Scheme {
    let mut var_map = FxHashMap::default();
    let ty = import_type(dst, src, &mut var_map, scheme.ty);
    let quantifiers = scheme.quantifiers.iter().map(|v| map_var(dst, &mut var_map, *v)).collect();
    Scheme { quantifiers, ty }
}

/// Copies a whole exported type environment (spec §4.7's "TypeInfo" merge).
pub fn import_type_env(dst: &mut TypeArena, src: &mut TypeArena, env: &TypeEnv) -> TypeEnv {
    let mut out = TypeEnv::new();
    for (name, info) in env.iter() {
        let mut var_map = FxHashMap::default();
        let imported = match info {
            TypeInfo::Alias { parameters, target } => {
                let parameters = parameters.iter().map(|v| map_var(dst, &mut var_map, *v)).collect();
                let target = import_type(dst, src, &mut var_map, *target);
                TypeInfo::Alias { parameters, target }
            }
            TypeInfo::Adt { parameters, constructors } => {
                let parameters = parameters.iter().map(|v| map_var(dst, &mut var_map, *v)).collect();
                let constructors = constructors
                    .iter()
                    .map(|c| ConstructorInfo {
                        name: c.name.clone(),
                        args: c.args.iter().map(|&a| import_type(dst, src, &mut var_map, a)).collect(),
                    })
                    .collect();
                TypeInfo::Adt { parameters, constructors }
            }
            TypeInfo::Record { parameters, fields } => {
                let parameters = parameters.iter().map(|v| map_var(dst, &mut var_map, *v)).collect();
                let fields: IndexMap<String, TypeId> =
                    fields.iter().map(|(name, &ty)| (name.clone(), import_type(dst, src, &mut var_map, ty))).collect();
                TypeInfo::Record { parameters, fields }
            }
        };
        out.insert(name.to_string(), imported);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_monomorphic_scheme_copies_its_shape_into_the_destination_arena() {
        let mut src = TypeArena::new();
        let int_ty = src.int();
        let pair = src.constructor("Pair", vec![int_ty, int_ty]);
        let scheme = Scheme::monomorphic(pair);

        let mut dst = TypeArena::new();
        let imported = import_scheme(&mut dst, &mut src, &scheme);
        assert!(imported.is_monomorphic());
        match dst.get(imported.ty) {
            TypeData::Constructor { name, args } => {
                assert_eq!(name, "Pair");
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected Constructor, got {other:?}"),
        }
    }

    #[test]
    fn a_polymorphic_scheme_keeps_its_quantifier_reachable_through_the_body() {
        let mut src = TypeArena::new();
        let v = src.fresh_var();
        let list = src.constructor("List", vec![v]);
        let quantifier = match src.get(v) {
            TypeData::Var(tv) => *tv,
            _ => unreachable!(),
        };
        let scheme = Scheme { quantifiers: vec![quantifier], ty: list };

        let mut dst = TypeArena::new();
        let imported = import_scheme(&mut dst, &mut src, &scheme);
        assert_eq!(imported.quantifiers.len(), 1);
        match dst.get(imported.ty) {
            TypeData::Constructor { args, .. } => match dst.get(args[0]) {
                TypeData::Var(tv) => assert_eq!(*tv, imported.quantifiers[0]),
                other => panic!("expected Var, got {other:?}"),
            },
            other => panic!("expected Constructor, got {other:?}"),
        }
    }
}
