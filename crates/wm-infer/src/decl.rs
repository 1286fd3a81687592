//! Top-level declaration processing (spec §6's declaration shapes) and the
//! Layer-1 entry point. Declarations are processed strictly in source
//! order: each updates the environment the ones after it will see.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use wm_ast::{Declaration, LetBinding, LetDeclaration, OperatorDeclaration, Program, RecordDeclaration, TypeDeclaration};
use wm_common::{Diagnostic, DiagnosticReason};
use wm_infection::InfectionDomain;
use wm_types::{ConstructorInfo, Scheme, TypeData, TypeId, TypeInfo};

use crate::context::InferContext;
use crate::lowering;
use crate::stub::{ConstraintStub, Layer1Output, Mark};
use crate::type_expr::{fresh_params, resolve_type_expr};

/// Runs the two pre-passes, walks every declaration in order, and packages
/// the result for Layer-2 (spec §4.3's bullet list).
pub fn infer_module(program: Program, mut ctx: InferContext) -> Layer1Output {
    let lowered = lowering::lower_program(program, &mut ctx.ids);
    let mut summaries = Vec::new();

    for decl in &lowered.declarations {
        match decl {
            Declaration::Type(d) => process_type_declaration(&mut ctx, d),
            Declaration::Record(d) => process_record_declaration(&mut ctx, d),
            Declaration::Infix(d) => process_infix(&mut ctx, d),
            Declaration::Prefix(d) => process_prefix(&mut ctx, d),
            Declaration::Infectious(d) => ctx.infection.register(d),
            Declaration::Let(d) => summaries.extend(infer_let_declaration(&mut ctx, d, true)),
        }
    }

    Layer1Output {
        arena: ctx.arena,
        marked: ctx.marked,
        constraint_stubs: ctx.constraint_stubs,
        holes: ctx.holes,
        node_type_by_id: ctx.node_type_by_id,
        node_spans: ctx.node_spans,
        summaries,
        value_env: ctx.value_env,
        type_env: ctx.type_env,
        diagnostics: ctx.diagnostics,
    }
}

fn process_type_declaration(ctx: &mut InferContext, decl: &TypeDeclaration) {
    if ctx.type_env.lookup(&decl.name).is_some() {
        ctx.marked.mark(decl.id, Mark::TypeDeclDuplicate);
    }
    let (param_map, params) = fresh_params(ctx, &decl.parameters);

    if let Some(alias) = &decl.alias {
        let target = resolve_type_expr(ctx, alias, &param_map);
        ctx.type_env.insert(decl.name.clone(), TypeInfo::Alias { parameters: params, target });
        return;
    }

    let param_tys: Vec<TypeId> = decl.parameters.iter().map(|n| param_map[n]).collect();
    let mut constructors = Vec::with_capacity(decl.members.len());
    for member in &decl.members {
        if member.args.is_empty() && decl.members.iter().filter(|m| m.name == member.name).count() > 1 {
            ctx.marked.mark(decl.id, Mark::TypeDeclInvalidMember);
        }
        let args: Vec<TypeId> = member.args.iter().map(|a| resolve_type_expr(ctx, a, &param_map)).collect();
        let ctor_result = ctx.arena.constructor(decl.name.clone(), param_tys.clone());
        let ctor_ty = args.iter().rev().fold(ctor_result, |acc, a| ctx.arena.func(*a, acc));
        ctx.value_env.bind(member.name.clone(), Scheme { quantifiers: params.clone(), ty: ctor_ty });
        constructors.push(ConstructorInfo { name: member.name.clone(), args });
    }
    ctx.type_env.insert(decl.name.clone(), TypeInfo::Adt { parameters: params, constructors });
}

/// Record declarations only populate the type environment — record values
/// are matched structurally via `record_literal`'s own `Record` type rather
/// than through a nominal constructor function (a deliberate simplification
/// from full nominal/structural equivalence, recorded in `DESIGN.md`).
fn process_record_declaration(ctx: &mut InferContext, decl: &RecordDeclaration) {
    if ctx.type_env.lookup(&decl.name).is_some() {
        ctx.marked.mark(decl.id, Mark::TypeDeclDuplicate);
    }
    let (param_map, params) = fresh_params(ctx, &decl.parameters);
    let mut fields = IndexMap::new();
    for (name, texpr) in &decl.fields {
        fields.insert(name.clone(), resolve_type_expr(ctx, texpr, &param_map));
    }
    ctx.type_env.insert(decl.name.clone(), TypeInfo::Record { parameters: params, fields });
}

fn process_infix(ctx: &mut InferContext, decl: &OperatorDeclaration) {
    if let (Some(precedence), Some(associativity)) = (decl.precedence, decl.associativity) {
        ctx.operators.insert(decl.symbol.clone(), wm_ast::OperatorInfo { precedence, associativity });
    }
    ctx.infix_functions.insert(decl.symbol.clone(), decl.function_name.clone());
}

fn process_prefix(ctx: &mut InferContext, decl: &OperatorDeclaration) {
    ctx.prefix_operators.insert(decl.symbol.clone());
    ctx.prefix_functions.insert(decl.symbol.clone(), decl.function_name.clone());
}

/// Processes one (possibly mutually recursive) `let` group, returning the
/// `(name, scheme)` pairs to export when `top_level` and `export` are both
/// set (spec §4.7's module summary).
pub fn infer_let_declaration(ctx: &mut InferContext, decl: &LetDeclaration, top_level: bool) -> Vec<(String, Scheme)> {
    let mut exported = Vec::new();
    if decl.is_recursive {
        let prebound: Vec<TypeId> = decl.bindings.iter().map(|_| ctx.arena.fresh_var()).collect();
        for (binding, &var) in decl.bindings.iter().zip(&prebound) {
            ctx.value_env.bind(binding.name.clone(), Scheme::monomorphic(var));
        }
        let mut inferred = Vec::with_capacity(decl.bindings.len());
        for (binding, &prebound_var) in decl.bindings.iter().zip(&prebound) {
            let stub_start = ctx.constraint_stubs.len();
            let func_ty = infer_let_body(ctx, binding);
            if ctx.arena.unify(prebound_var, func_ty).is_err() {
                ctx.diagnostic(Diagnostic::new(DiagnosticReason::TypeMismatch, binding.id, binding.span));
            }
            emit_boundary_stub(ctx, binding, func_ty, stub_start);
            inferred.push((binding, prebound_var));
        }
        for (binding, ty) in inferred {
            let scheme = finalize_scheme(ctx, binding, ty);
            ctx.value_env.bind(binding.name.clone(), scheme.clone());
            if top_level && binding.export {
                exported.push((binding.name.clone(), scheme));
            }
        }
    } else {
        for binding in &decl.bindings {
            let stub_start = ctx.constraint_stubs.len();
            let func_ty = infer_let_body(ctx, binding);
            emit_boundary_stub(ctx, binding, func_ty, stub_start);
            let scheme = finalize_scheme(ctx, binding, func_ty);
            ctx.value_env.bind(binding.name.clone(), scheme.clone());
            if top_level && binding.export {
                exported.push((binding.name.clone(), scheme));
            }
        }
    }
    exported
}

pub fn infer_let_binding(ctx: &mut InferContext, binding: &LetBinding, top_level: bool) -> Scheme {
    let stub_start = ctx.constraint_stubs.len();
    let func_ty = infer_let_body(ctx, binding);
    emit_boundary_stub(ctx, binding, func_ty, stub_start);
    let scheme = finalize_scheme(ctx, binding, func_ty);
    ctx.value_env.bind(binding.name.clone(), scheme.clone());
    let _ = top_level;
    scheme
}

fn infer_let_body(ctx: &mut InferContext, binding: &LetBinding) -> TypeId {
    ctx.value_env.push_scope();
    let mut param_tys = Vec::with_capacity(binding.parameters.len());
    for param in &binding.parameters {
        let var = ctx.arena.fresh_var();
        crate::pattern::infer_pattern(ctx, param, var);
        param_tys.push(var);
    }
    let body_ty = crate::expr::infer_block(ctx, &binding.body);
    ctx.value_env.pop_scope();
    let func_ty = param_tys.into_iter().rev().fold(body_ty, |acc, param_ty| ctx.arena.func(param_ty, acc));

    if let Some(annotation) = &binding.annotation {
        let empty_params = FxHashMap::default();
        let annotation_ty = resolve_type_expr(ctx, annotation, &empty_params);
        ctx.push_stub(ConstraintStub::Annotation {
            origin: binding.id,
            span: binding.span,
            annotation: annotation_ty,
            value: func_ty,
        });
    }
    func_ty
}

/// Only a syntactic value generalizes (spec §4.3's value restriction). A
/// binding with parameters is sugar for an arrow and is always a value;
/// a parameterless binding generalizes only when its body is a bare
/// syntactic-value expression.
fn finalize_scheme(ctx: &mut InferContext, binding: &LetBinding, ty: TypeId) -> Scheme {
    let is_value = !binding.parameters.is_empty()
        || (binding.body.statements.is_empty()
            && binding.body.result.as_deref().is_some_and(crate::expr::is_syntactic_value));
    if is_value {
        ctx.arena.generalize(&ctx.value_env, ty)
    } else {
        Scheme::monomorphic(ctx.arena.substitute(ty))
    }
}

/// Collapses every `ConstraintRewrite` pushed while inferring `binding`'s
/// body into one `ConstraintFlow` obligation per domain observed — the
/// per-function boundary check Layer-2 runs once the row is resolved (spec
/// §4.6).
fn emit_boundary_stub(ctx: &mut InferContext, binding: &LetBinding, func_ty: TypeId, stub_start: usize) {
    let mut by_domain: FxHashMap<InfectionDomain, Vec<String>> = FxHashMap::default();
    for stub in &ctx.constraint_stubs[stub_start..] {
        if let ConstraintStub::ConstraintRewrite { domain, remaining_labels, .. } = stub {
            by_domain.entry(*domain).or_default().extend(remaining_labels.iter().cloned());
        }
    }
    if by_domain.is_empty() {
        return;
    }
    let declared_return = return_type_of(ctx, func_ty, binding.parameters.len());
    for (domain, mut labels) in by_domain {
        labels.sort();
        labels.dedup();
        ctx.push_stub(ConstraintStub::ConstraintFlow {
            origin: binding.id,
            span: binding.span,
            domain,
            declared_return,
            remaining_labels: labels,
        });
    }
}

fn return_type_of(ctx: &mut InferContext, func_ty: TypeId, arity: usize) -> TypeId {
    let mut ty = ctx.arena.resolve_shallow(func_ty);
    for _ in 0..arity {
        match ctx.arena.get(ty).clone() {
            TypeData::Func { to, .. } => ty = ctx.arena.resolve_shallow(to),
            _ => break,
        }
    }
    ty
}
