//! The type arena: allocation, unification, substitution and
//! generalization/instantiation (spec §3, §4.1).

use ena::unify::{InPlaceUnificationTable, UnificationTable};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;
use wm_common::limits::MAX_UNIFY_DEPTH;

use crate::data::{HoleProvenance, Scheme, TypeData};
use crate::error::UnifyError;
use crate::ids::{HoleId, TyVar, TypeId, VarValue};

/// Owns every `Type` node ever allocated during a module's inference pass,
/// plus the union-find table backing its unification variables. One arena
/// per module (spec §5: state does not outlive a module's pass except
/// through the merged exports the loader threads forward).
pub struct TypeArena {
    data: Vec<TypeData>,
    table: InPlaceUnificationTable<TyVar>,
    /// `TypeId` of the `TypeData::Var` node created alongside each `TyVar`,
    /// indexed by `TyVar`'s `index()`. Lets `resolve_shallow` turn an
    /// unbound variable's union-find root back into a concrete `TypeId`
    /// without allocating, the same pattern `mesh-typeck`'s `InferCtx`
    /// uses its `root -> representative` lookup for.
    var_type_ids: Vec<TypeId>,
    hole_constraints: FxHashMap<HoleId, Vec<TypeId>>,
    next_hole: u32,
    unit: Option<TypeId>,
    int: Option<TypeId>,
    bool_: Option<TypeId>,
    char_: Option<TypeId>,
    string: Option<TypeId>,
    /// Bumped every time [`Self::bind_var`] actually extends the
    /// substitution (not on the no-op `v == v2` case). The solver's
    /// fixpoint loop (`wm-solver`) compares this across passes to detect
    /// convergence — a more faithful "did the substitution change" test
    /// than diffing diagnostic counts, which two unrelated mismatches in
    /// successive passes could hold constant.
    changes: u64,
}

impl Default for TypeArena {
    fn default() -> Self {
        TypeArena::new()
    }
}

impl TypeArena {
    #[must_use]
    pub fn new() -> Self {
        TypeArena {
            data: Vec::new(),
            table: InPlaceUnificationTable::new(),
            var_type_ids: Vec::new(),
            hole_constraints: FxHashMap::default(),
            next_hole: 0,
            unit: None,
            int: None,
            bool_: None,
            char_: None,
            string: None,
            changes: 0,
        }
    }

    /// How many times a unification variable has been bound since this
    /// arena was created. Monotonically increasing; callers only ever
    /// compare two readings, never the absolute value.
    #[must_use]
    pub fn change_count(&self) -> u64 {
        self.changes
    }

    fn alloc(&mut self, data: TypeData) -> TypeId {
        self.data.push(data);
        TypeId((self.data.len() - 1) as u32)
    }

    #[must_use]
    pub fn get(&self, id: TypeId) -> &TypeData {
        &self.data[id.0 as usize]
    }

    pub fn unit(&mut self) -> TypeId {
        if let Some(id) = self.unit {
            return id;
        }
        let id = self.alloc(TypeData::Unit);
        self.unit = Some(id);
        id
    }

    pub fn int(&mut self) -> TypeId {
        if let Some(id) = self.int {
            return id;
        }
        let id = self.alloc(TypeData::Int);
        self.int = Some(id);
        id
    }

    pub fn bool(&mut self) -> TypeId {
        if let Some(id) = self.bool_ {
            return id;
        }
        let id = self.alloc(TypeData::Bool);
        self.bool_ = Some(id);
        id
    }

    pub fn char(&mut self) -> TypeId {
        if let Some(id) = self.char_ {
            return id;
        }
        let id = self.alloc(TypeData::Char);
        self.char_ = Some(id);
        id
    }

    pub fn string(&mut self) -> TypeId {
        if let Some(id) = self.string {
            return id;
        }
        let id = self.alloc(TypeData::String);
        self.string = Some(id);
        id
    }

    pub fn func(&mut self, from: TypeId, to: TypeId) -> TypeId {
        self.alloc(TypeData::Func { from, to })
    }

    pub fn tuple(&mut self, elements: Vec<TypeId>) -> TypeId {
        self.alloc(TypeData::Tuple(elements))
    }

    pub fn record(&mut self, fields: IndexMap<String, TypeId>) -> TypeId {
        self.alloc(TypeData::Record(fields))
    }

    pub fn constructor(&mut self, name: impl Into<String>, args: Vec<TypeId>) -> TypeId {
        self.alloc(TypeData::Constructor { name: name.into(), args })
    }

    pub fn array(&mut self, length: u32, element: TypeId) -> TypeId {
        self.alloc(TypeData::Array { length, element })
    }

    pub fn effect_row(
        &mut self,
        cases: IndexMap<String, Option<TypeId>>,
        tail: Option<TypeId>,
        has_tail_wildcard: bool,
    ) -> TypeId {
        self.alloc(TypeData::EffectRow { cases, tail, has_tail_wildcard })
    }

    /// A fresh unbound monotype variable.
    pub fn fresh_var(&mut self) -> TypeId {
        let key = self.table.new_key(VarValue(None));
        let id = self.alloc(TypeData::Var(key));
        debug_assert_eq!(key.0 as usize, self.var_type_ids.len());
        self.var_type_ids.push(id);
        id
    }

    /// A fresh hole of the given provenance (spec §3's "Holes").
    pub fn fresh_hole(&mut self, provenance: HoleProvenance) -> TypeId {
        let id = HoleId(self.next_hole);
        self.next_hole += 1;
        self.alloc(TypeData::Unknown { id, provenance })
    }

    /// Every concrete type a hole has been observed against during
    /// unification, in observation order — fed to the Layer-2 solver's
    /// hole-classification pass.
    #[must_use]
    pub fn hole_constraints(&self, hole: HoleId) -> &[TypeId] {
        self.hole_constraints.get(&hole).map_or(&[], Vec::as_slice)
    }

    fn record_hole_constraint(&mut self, hole: HoleId, other: TypeId) {
        self.hole_constraints.entry(hole).or_default().push(other);
    }

    /// Follows `Var` chains to the representative `TypeId` of their
    /// equivalence class. Does not descend into compound types — see
    /// [`Self::substitute`] for the deep form.
    pub fn resolve_shallow(&mut self, id: TypeId) -> TypeId {
        let TypeData::Var(v) = self.get(id) else { return id };
        let v = *v;
        match self.table.probe_value(v).0 {
            Some(bound) => {
                let resolved = self.resolve_shallow(bound);
                resolved
            }
            None => {
                let root = self.table.find(v);
                self.var_type_ids[root.0 as usize]
            }
        }
    }

    /// Deep, idempotent resolution: every reachable `Var` is replaced by
    /// whatever it was unified with (spec §8's "idempotent substitution"
    /// invariant). Unknown holes are left untouched — they are classified
    /// separately by the solver, never silently replaced.
    pub fn substitute(&mut self, id: TypeId) -> TypeId {
        self.substitute_at(id, 0)
    }

    fn substitute_at(&mut self, id: TypeId, depth: u32) -> TypeId {
        let id = self.resolve_shallow(id);
        if depth > MAX_UNIFY_DEPTH {
            return id;
        }
        match self.get(id).clone() {
            TypeData::Func { from, to } => {
                let from = self.substitute_at(from, depth + 1);
                let to = self.substitute_at(to, depth + 1);
                self.alloc(TypeData::Func { from, to })
            }
            TypeData::Tuple(elements) => {
                let elements: Vec<_> =
                    elements.iter().map(|e| self.substitute_at(*e, depth + 1)).collect();
                self.alloc(TypeData::Tuple(elements))
            }
            TypeData::Record(fields) => {
                let fields: IndexMap<_, _> = fields
                    .iter()
                    .map(|(k, v)| (k.clone(), self.substitute_at(*v, depth + 1)))
                    .collect();
                self.alloc(TypeData::Record(fields))
            }
            TypeData::Constructor { name, args } => {
                let args: Vec<_> = args.iter().map(|a| self.substitute_at(*a, depth + 1)).collect();
                self.alloc(TypeData::Constructor { name, args })
            }
            TypeData::Array { length, element } => {
                let element = self.substitute_at(element, depth + 1);
                self.alloc(TypeData::Array { length, element })
            }
            TypeData::EffectRow { cases, tail, has_tail_wildcard } => {
                let cases: IndexMap<_, _> = cases
                    .iter()
                    .map(|(k, v)| (k.clone(), v.map(|t| self.substitute_at(t, depth + 1))))
                    .collect();
                let tail = tail.map(|t| self.substitute_at(t, depth + 1));
                self.alloc(TypeData::EffectRow { cases, tail, has_tail_wildcard })
            }
            TypeData::Unit
            | TypeData::Int
            | TypeData::Bool
            | TypeData::Char
            | TypeData::String
            | TypeData::Var(_)
            | TypeData::Unknown { .. } => id,
        }
    }

    /// Free (unbound) type variables reachable from `id`, in first-encounter
    /// order — deterministic, unlike a hash-set traversal, which matters
    /// for generalization's quantifier ordering (spec §8, invariant 4).
    pub fn free_vars(&mut self, id: TypeId) -> IndexSet<TyVar> {
        let mut out = IndexSet::new();
        self.collect_free_vars(id, &mut out, 0);
        out
    }

    fn collect_free_vars(&mut self, id: TypeId, out: &mut IndexSet<TyVar>, depth: u32) {
        if depth > MAX_UNIFY_DEPTH {
            return;
        }
        let id = self.resolve_shallow(id);
        match self.get(id).clone() {
            TypeData::Var(v) => {
                out.insert(v);
            }
            TypeData::Func { from, to } => {
                self.collect_free_vars(from, out, depth + 1);
                self.collect_free_vars(to, out, depth + 1);
            }
            TypeData::Tuple(elements) => {
                for e in elements {
                    self.collect_free_vars(e, out, depth + 1);
                }
            }
            TypeData::Record(fields) => {
                for v in fields.values() {
                    self.collect_free_vars(*v, out, depth + 1);
                }
            }
            TypeData::Constructor { args, .. } => {
                for a in args {
                    self.collect_free_vars(a, out, depth + 1);
                }
            }
            TypeData::Array { element, .. } => {
                self.collect_free_vars(element, out, depth + 1);
            }
            TypeData::EffectRow { cases, tail, .. } => {
                for v in cases.values().flatten() {
                    self.collect_free_vars(*v, out, depth + 1);
                }
                if let Some(t) = tail {
                    self.collect_free_vars(t, out, depth + 1);
                }
            }
            TypeData::Unit
            | TypeData::Int
            | TypeData::Bool
            | TypeData::Char
            | TypeData::String
            | TypeData::Unknown { .. } => {}
        }
    }

    /// `forall`-generalize `id` over every variable free in it but not free
    /// in `env` (spec §3's generalization rule).
    pub fn generalize(&mut self, env: &crate::data::ValueEnv, id: TypeId) -> Scheme {
        let resolved = self.substitute(id);
        let ty_vars = self.free_vars(resolved);
        let mut env_vars = IndexSet::new();
        let scheme_bodies: Vec<(Vec<TyVar>, TypeId)> =
            env.schemes().map(|s| (s.quantifiers.clone(), s.ty)).collect();
        for (quantifiers, ty) in scheme_bodies {
            for v in self.free_vars(ty) {
                if !quantifiers.contains(&v) {
                    env_vars.insert(v);
                }
            }
        }
        let quantifiers: Vec<TyVar> = ty_vars.into_iter().filter(|v| !env_vars.contains(v)).collect();
        Scheme { quantifiers, ty: resolved }
    }

    /// Replace a scheme's quantifiers with fresh variables (spec §3's
    /// instantiation rule).
    pub fn instantiate(&mut self, scheme: &Scheme) -> TypeId {
        if scheme.quantifiers.is_empty() {
            return scheme.ty;
        }
        let mapping: FxHashMap<TyVar, TypeId> =
            scheme.quantifiers.iter().map(|q| (*q, self.fresh_var())).collect();
        self.instantiate_with(scheme.ty, &mapping, 0)
    }

    /// Like [`Self::instantiate`] but against a caller-supplied mapping
    /// rather than one freshly generated per call — used when several
    /// constructor argument positions must share the same substitution for
    /// the ADT's declared type parameters (spec §4.3's constructor pattern
    /// and constructor-expression inference).
    pub fn instantiate_with_map(&mut self, id: TypeId, mapping: &FxHashMap<TyVar, TypeId>) -> TypeId {
        self.instantiate_with(id, mapping, 0)
    }

    fn instantiate_with(&mut self, id: TypeId, mapping: &FxHashMap<TyVar, TypeId>, depth: u32) -> TypeId {
        let id = self.resolve_shallow(id);
        if depth > MAX_UNIFY_DEPTH {
            return id;
        }
        match self.get(id).clone() {
            TypeData::Var(v) => mapping.get(&v).copied().unwrap_or(id),
            TypeData::Func { from, to } => {
                let from = self.instantiate_with(from, mapping, depth + 1);
                let to = self.instantiate_with(to, mapping, depth + 1);
                self.alloc(TypeData::Func { from, to })
            }
            TypeData::Tuple(elements) => {
                let elements: Vec<_> =
                    elements.iter().map(|e| self.instantiate_with(*e, mapping, depth + 1)).collect();
                self.alloc(TypeData::Tuple(elements))
            }
            TypeData::Record(fields) => {
                let fields: IndexMap<_, _> = fields
                    .iter()
                    .map(|(k, v)| (k.clone(), self.instantiate_with(*v, mapping, depth + 1)))
                    .collect();
                self.alloc(TypeData::Record(fields))
            }
            TypeData::Constructor { name, args } => {
                let args: Vec<_> =
                    args.iter().map(|a| self.instantiate_with(*a, mapping, depth + 1)).collect();
                self.alloc(TypeData::Constructor { name, args })
            }
            TypeData::Array { length, element } => {
                let element = self.instantiate_with(element, mapping, depth + 1);
                self.alloc(TypeData::Array { length, element })
            }
            TypeData::EffectRow { cases, tail, has_tail_wildcard } => {
                let cases: IndexMap<_, _> = cases
                    .iter()
                    .map(|(k, v)| (k.clone(), v.map(|t| self.instantiate_with(t, mapping, depth + 1))))
                    .collect();
                let tail = tail.map(|t| self.instantiate_with(t, mapping, depth + 1));
                self.alloc(TypeData::EffectRow { cases, tail, has_tail_wildcard })
            }
            TypeData::Unit
            | TypeData::Int
            | TypeData::Bool
            | TypeData::Char
            | TypeData::String
            | TypeData::Unknown { .. } => id,
        }
    }

    /// Unify two types, mutating the arena's union-find state. Holes are
    /// permissive: unifying against one never fails, it only records an
    /// observation for the solver to classify later (spec §3's "Holes").
    pub fn unify(&mut self, a: TypeId, b: TypeId) -> Result<(), UnifyError> {
        stacker::maybe_grow(64 * 1024, 2 * 1024 * 1024, || self.unify_at(a, b, 0))
    }

    fn unify_at(&mut self, a: TypeId, b: TypeId, depth: u32) -> Result<(), UnifyError> {
        if depth > MAX_UNIFY_DEPTH {
            return Err(UnifyError::OccursCycle);
        }
        let a = self.resolve_shallow(a);
        let b = self.resolve_shallow(b);
        if a == b {
            return Ok(());
        }

        if let TypeData::Unknown { id, .. } = self.get(a).clone() {
            self.record_hole_constraint(id, b);
            if let TypeData::Unknown { id: idb, .. } = self.get(b).clone() {
                self.record_hole_constraint(idb, a);
            }
            return Ok(());
        }
        if let TypeData::Unknown { id, .. } = self.get(b).clone() {
            self.record_hole_constraint(id, a);
            return Ok(());
        }

        if let TypeData::Var(v) = self.get(a).clone() {
            return self.bind_var(v, b, depth);
        }
        if let TypeData::Var(v) = self.get(b).clone() {
            return self.bind_var(v, a, depth);
        }

        match (self.get(a).clone(), self.get(b).clone()) {
            (TypeData::Unit, TypeData::Unit)
            | (TypeData::Int, TypeData::Int)
            | (TypeData::Bool, TypeData::Bool)
            | (TypeData::Char, TypeData::Char)
            | (TypeData::String, TypeData::String) => Ok(()),
            (TypeData::Func { from: fa, to: ta }, TypeData::Func { from: fb, to: tb }) => {
                self.unify_at(fa, fb, depth + 1)?;
                self.unify_at(ta, tb, depth + 1)
            }
            (TypeData::Tuple(ea), TypeData::Tuple(eb)) => {
                if ea.len() != eb.len() {
                    return Err(UnifyError::ArityMismatch { expected: ea.len(), found: eb.len() });
                }
                for (x, y) in ea.iter().zip(eb.iter()) {
                    self.unify_at(*x, *y, depth + 1)?;
                }
                Ok(())
            }
            (TypeData::Constructor { name: na, args: aa }, TypeData::Constructor { name: nb, args: ab }) => {
                if na != nb || aa.len() != ab.len() {
                    return Err(UnifyError::ArityMismatch { expected: aa.len(), found: ab.len() });
                }
                for (x, y) in aa.iter().zip(ab.iter()) {
                    self.unify_at(*x, *y, depth + 1)?;
                }
                Ok(())
            }
            (TypeData::Record(fa), TypeData::Record(fb)) => self.unify_records(fa, fb, depth),
            (TypeData::Array { length: la, element: ea }, TypeData::Array { length: lb, element: eb }) => {
                if la != lb {
                    return Err(UnifyError::ArityMismatch { expected: la as usize, found: lb as usize });
                }
                self.unify_at(ea, eb, depth + 1)
            }
            (TypeData::EffectRow { .. }, TypeData::EffectRow { .. }) => self.unify_rows(a, b, depth),
            _ => Err(UnifyError::TypeMismatch),
        }
    }

    fn bind_var(&mut self, v: TyVar, other: TypeId, depth: u32) -> Result<(), UnifyError> {
        let other_resolved = self.resolve_shallow(other);
        if let TypeData::Var(v2) = self.get(other_resolved).clone() {
            if v == v2 {
                return Ok(());
            }
            self.table.unify_var_var(v, v2).expect("VarValue::unify_values is infallible");
            self.changes += 1;
            return Ok(());
        }
        if self.occurs(v, other_resolved, depth) {
            return Err(UnifyError::OccursCycle);
        }
        self.table
            .unify_var_value(v, VarValue(Some(other_resolved)))
            .expect("VarValue::unify_values is infallible");
        self.changes += 1;
        Ok(())
    }

    fn occurs(&mut self, v: TyVar, id: TypeId, depth: u32) -> bool {
        if depth > MAX_UNIFY_DEPTH {
            return true;
        }
        let id = self.resolve_shallow(id);
        match self.get(id).clone() {
            TypeData::Var(v2) => v == v2,
            TypeData::Func { from, to } => self.occurs(v, from, depth + 1) || self.occurs(v, to, depth + 1),
            TypeData::Tuple(elements) => elements.iter().any(|e| self.occurs(v, *e, depth + 1)),
            TypeData::Record(fields) => fields.values().any(|e| self.occurs(v, *e, depth + 1)),
            TypeData::Constructor { args, .. } => args.iter().any(|a| self.occurs(v, *a, depth + 1)),
            TypeData::Array { element, .. } => self.occurs(v, element, depth + 1),
            TypeData::EffectRow { cases, tail, .. } => {
                cases.values().flatten().any(|t| self.occurs(v, *t, depth + 1))
                    || tail.is_some_and(|t| self.occurs(v, t, depth + 1))
            }
            TypeData::Unit
            | TypeData::Int
            | TypeData::Bool
            | TypeData::Char
            | TypeData::String
            | TypeData::Unknown { .. } => false,
        }
    }

    fn unify_records(
        &mut self,
        fa: IndexMap<String, TypeId>,
        fb: IndexMap<String, TypeId>,
        depth: u32,
    ) -> Result<(), UnifyError> {
        for key in fa.keys() {
            if !fb.contains_key(key) {
                return Err(UnifyError::MissingField { field: key.clone() });
            }
        }
        for key in fb.keys() {
            if !fa.contains_key(key) {
                return Err(UnifyError::MissingField { field: key.clone() });
            }
        }
        for (k, ta) in &fa {
            let tb = fb[k];
            self.unify_at(*ta, tb, depth + 1)?;
        }
        Ok(())
    }

    fn unify_rows(&mut self, a: TypeId, b: TypeId, depth: u32) -> Result<(), UnifyError> {
        let (cases_a, tail_a, wild_a) = match self.get(a).clone() {
            TypeData::EffectRow { cases, tail, has_tail_wildcard } => (cases, tail, has_tail_wildcard),
            _ => unreachable!("unify_rows called on a non-row type"),
        };
        let (cases_b, tail_b, wild_b) = match self.get(b).clone() {
            TypeData::EffectRow { cases, tail, has_tail_wildcard } => (cases, tail, has_tail_wildcard),
            _ => unreachable!("unify_rows called on a non-row type"),
        };

        for (label, payload_a) in &cases_a {
            if let Some(payload_b) = cases_b.get(label) {
                match (payload_a, payload_b) {
                    (Some(pa), Some(pb)) => self.unify_at(*pa, *pb, depth + 1)?,
                    (None, None) => {}
                    _ => return Err(UnifyError::TypeMismatch),
                }
            }
        }

        let only_in_a: Vec<(String, Option<TypeId>)> = cases_a
            .iter()
            .filter(|(label, _)| !cases_b.contains_key(*label))
            .map(|(l, p)| (l.clone(), *p))
            .collect();
        let only_in_b: Vec<(String, Option<TypeId>)> = cases_b
            .iter()
            .filter(|(label, _)| !cases_a.contains_key(*label))
            .map(|(l, p)| (l.clone(), *p))
            .collect();

        if only_in_a.is_empty() && only_in_b.is_empty() {
            return self.unify_tails(tail_a, wild_a, tail_b, wild_b, depth);
        }
        if !only_in_a.is_empty() {
            self.absorb_into_tail(tail_b, wild_b, &only_in_a, depth)?;
        }
        if !only_in_b.is_empty() {
            self.absorb_into_tail(tail_a, wild_a, &only_in_b, depth)?;
        }
        Ok(())
    }

    /// Labels present on one side of a row but not the other must be
    /// absorbed by the other row's tail — either because that tail has a
    /// wildcard (absorbs anything, spec §9's discharge rule) or because it
    /// is itself a row variable that gets extended to also carry them.
    fn absorb_into_tail(
        &mut self,
        tail: Option<TypeId>,
        wildcard: bool,
        extra: &[(String, Option<TypeId>)],
        depth: u32,
    ) -> Result<(), UnifyError> {
        if wildcard {
            return Ok(());
        }
        match tail {
            Some(tail_id) => {
                let fresh_tail = self.fresh_var();
                let extended = self.alloc(TypeData::EffectRow {
                    cases: extra.iter().cloned().collect(),
                    tail: Some(fresh_tail),
                    has_tail_wildcard: false,
                });
                self.unify_at(tail_id, extended, depth + 1)
            }
            None => Err(UnifyError::TypeMismatch),
        }
    }

    fn unify_tails(
        &mut self,
        tail_a: Option<TypeId>,
        wild_a: bool,
        tail_b: Option<TypeId>,
        wild_b: bool,
        depth: u32,
    ) -> Result<(), UnifyError> {
        match (tail_a, tail_b) {
            (Some(ta), Some(tb)) => self.unify_at(ta, tb, depth + 1),
            (None, None) => {
                if wild_a == wild_b {
                    Ok(())
                } else {
                    Err(UnifyError::TypeMismatch)
                }
            }
            (Some(_), None) | (None, Some(_)) => {
                if wild_a || wild_b {
                    Ok(())
                } else {
                    Err(UnifyError::TypeMismatch)
                }
            }
        }
    }
}
