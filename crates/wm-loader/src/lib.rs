//! Module loader analysis path (spec §2's C7, §4.7): two-phase import
//! discovery, cycle detection, and per-module pipeline orchestration
//! (C3 -> C4 -> C5) in dependency order.

mod checks;
mod error;
mod graph;
mod import;
mod provider;
mod summary;

pub use error::HardError;
pub use provider::{ModuleProvider, ProviderError};
pub use summary::{ModuleResult, ModuleSummary};

use indexmap::IndexMap;

use wm_ast::{ImportBinding, OperatorTable, PrefixOperatorSet, Program};
use wm_common::node_id::NodeIdAllocator;
use wm_common::PipelineOptions;
use wm_infection::InfectionRegistry;
use wm_infer::InferContext;
use wm_types::{TypeArena, TypeEnv, ValueEnv};

/// Every module reached from `entry`, keyed by path in processing
/// (dependencies-first) order.
pub struct LoaderOutput {
    pub modules: IndexMap<String, ModuleResult>,
}

/// Loads and analyzes `entry` and everything it (transitively) imports or
/// re-exports (spec §4.7's bullet list).
#[tracing::instrument(skip_all)]
pub fn load(entry: &str, provider: &dyn ModuleProvider, options: &PipelineOptions) -> Result<LoaderOutput, HardError> {
    let (phase1, order) = graph::discover(entry, provider)?;
    let mut modules: IndexMap<String, ModuleResult> = IndexMap::new();

    for path in &order {
        let program1 = phase1.get(path).expect("discover() only orders paths it parsed");
        let module_result = load_one(path, program1, &mut modules, provider, options)?;
        modules.insert(path.clone(), module_result);
    }

    Ok(LoaderOutput { modules })
}

/// Whether re-exported bindings should also carry the infection/operator
/// prelude in, skipped for `core: true` modules (spec §9's resolved Open
/// Question: the parsed `core` flag is authoritative, never a path-based
/// heuristic).
fn should_merge_prelude(program: &Program, options: &PipelineOptions) -> bool {
    if options.core_flag_is_authoritative {
        !program.core
    } else {
        true
    }
}

#[tracing::instrument(skip(program1, modules, provider, options))]
fn load_one(
    path: &str,
    program1: &Program,
    modules: &mut IndexMap<String, ModuleResult>,
    provider: &dyn ModuleProvider,
    options: &PipelineOptions,
) -> Result<ModuleResult, HardError> {
    checks::check_duplicate_bindings(path, program1)?;

    let merge_prelude = should_merge_prelude(program1, options);
    let mut operators = OperatorTable::new();
    let mut prefix_operators = PrefixOperatorSet::new();
    let mut infection = if merge_prelude { InfectionRegistry::with_prelude() } else { InfectionRegistry::new() };

    for import_path in program1.imports.iter().map(|i| &i.path) {
        let dep = modules.get(import_path).ok_or_else(|| HardError::MissingModule { path: import_path.clone() })?;
        operators.merge(&dep.summary.operators);
        prefix_operators.merge(&dep.summary.prefix_operators);
        infection.merge(&dep.summary.infection);
    }
    collect_local_operator_declarations(program1, &mut operators, &mut prefix_operators);

    let reexport_names = reexport_export_names(program1);
    checks::check_duplicate_exports(path, program1, &reexport_names)?;

    // Re-parse with the fully merged table (spec §4.7's phase 2): the real
    // parse the pipeline runs over, now operator-aware.
    let program2 = provider
        .parse(path, &operators, &prefix_operators)
        .map_err(|err| error::provider_error_to_hard(path, err))?;

    let operator_diagnostics = checks::collect_operator_diagnostics(&program2, &operators, &prefix_operators);

    let ids = NodeIdAllocator::starting_after(program2.max_node_id());
    let mut ctx = InferContext::new(
        ValueEnv::new(),
        TypeEnv::new(),
        operators.clone(),
        prefix_operators.clone(),
        infection.clone(),
        *options,
        ids,
    );

    for import in &program1.imports {
        let dep = modules.get_mut(&import.path).expect("checked present above");
        bind_value_imports(&mut ctx.value_env, &mut ctx.arena, dep, &import.bindings);
        let imported_type_env = import::import_type_env(&mut ctx.arena, &mut dep.summary.arena, &dep.summary.type_env);
        ctx.type_env.merge(imported_type_env);
    }

    let layer1 = wm_infer::infer_module(program2, ctx);
    let mut layer2 = wm_solver::solve(layer1, &infection, options);

    let mut export_arena = TypeArena::new();
    let mut exports: Vec<(String, wm_types::Scheme)> = layer2
        .summaries
        .iter()
        .map(|(name, scheme)| (name.clone(), import::import_scheme(&mut export_arena, &mut layer2.arena, scheme)))
        .collect();
    let mut exported_type_env = import::import_type_env(&mut export_arena, &mut layer2.arena, &layer2.type_env);

    for reexport in &program1.reexports {
        let dep = modules.get_mut(&reexport.path).ok_or_else(|| HardError::MissingModule { path: reexport.path.clone() })?;
        for binding in &reexport.bindings {
            if let Some((_, scheme)) = dep.summary.exports.iter().find(|(name, _)| *name == binding.name).cloned() {
                let imported = import::import_scheme(&mut export_arena, &mut dep.summary.arena, &scheme);
                let exported_name = binding.alias.clone().unwrap_or_else(|| binding.name.clone());
                exports.push((exported_name, imported));
            }
        }
        let reexported_types = import::import_type_env(&mut export_arena, &mut dep.summary.arena, &dep.summary.type_env);
        exported_type_env.merge(reexported_types);
    }

    let mut layer3 = wm_presenter::present(layer2, &infection);
    layer3.diagnostics.solver.extend(operator_diagnostics);

    let summary = ModuleSummary {
        path: path.to_string(),
        arena: export_arena,
        exports,
        type_env: exported_type_env,
        operators,
        prefix_operators,
        infection,
    };

    Ok(ModuleResult { summary, layer3 })
}

/// Binds each requested name found in the dependency's exports into the
/// importing module's own (fresh) `ValueEnv`, copying its scheme into the
/// importing module's arena. `exports` is searched by cloning the matched
/// entry first, since copying needs `&mut dep.summary.arena` at the same
/// time a borrow over `dep.summary.exports` would otherwise be live.
fn bind_value_imports(value_env: &mut ValueEnv, dst_arena: &mut TypeArena, dep: &mut ModuleResult, bindings: &[ImportBinding]) {
    for binding in bindings {
        let found = dep.summary.exports.iter().find(|(name, _)| *name == binding.name).cloned();
        if let Some((_, scheme)) = found {
            let imported = import::import_scheme(dst_arena, &mut dep.summary.arena, &scheme);
            let local_name = binding.alias.clone().unwrap_or_else(|| binding.name.clone());
            value_env.bind(local_name, imported);
        }
        // A name the dependency doesn't export is left unbound: Layer-1's
        // identifier lookup turns the miss into a `MissingImport` hole
        // rather than this crate reporting it directly.
    }
}

fn reexport_export_names(program: &Program) -> Vec<String> {
    program
        .reexports
        .iter()
        .flat_map(|r| r.bindings.iter())
        .map(|b| b.alias.clone().unwrap_or_else(|| b.name.clone()))
        .collect()
}

/// Mirrors what `infer_module`'s own `Declaration::Infix`/`Declaration::Prefix`
/// handling records into its `InferContext`, run here ahead of time so the
/// operator-usage validation pass (spec's supplemented "operator table
/// validation") sees a module's own declarations, not just its imports'.
fn collect_local_operator_declarations(program: &Program, operators: &mut OperatorTable, prefix_operators: &mut PrefixOperatorSet) {
    for decl in &program.declarations {
        match decl {
            wm_ast::Declaration::Infix(op) => {
                if let (Some(precedence), Some(associativity)) = (op.precedence, op.associativity) {
                    operators.insert(op.symbol.clone(), wm_ast::OperatorInfo { precedence, associativity });
                }
            }
            wm_ast::Declaration::Prefix(op) => prefix_operators.insert(op.symbol.clone()),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wm_ast::Declaration;

    struct SingleModuleProvider {
        program: Program,
    }

    impl ModuleProvider for SingleModuleProvider {
        fn parse(&self, _path: &str, _operators: &OperatorTable, _prefix_operators: &PrefixOperatorSet) -> Result<Program, ProviderError> {
            Ok(self.program.clone())
        }
    }

    #[test]
    fn a_single_module_with_no_declarations_loads_cleanly() {
        let provider = SingleModuleProvider { program: Program::empty() };
        let output = load("root", &provider, &PipelineOptions::default()).unwrap();
        assert_eq!(output.modules.len(), 1);
        let root = output.modules.get("root").unwrap();
        assert!(root.layer3.diagnostics.solver.is_empty());
        assert!(root.summary.exports.is_empty());
    }

    #[test]
    fn a_duplicate_top_level_binding_is_a_hard_error_before_inference_runs() {
        let mut program = Program::empty();
        let binding = |id: u32| wm_ast::LetBinding {
            id: wm_common::NodeId(id),
            span: wm_common::Span::synthetic(),
            name: "f".to_string(),
            parameters: Vec::new(),
            body: wm_ast::BlockExpr::empty(),
            annotation: None,
            export: false,
            is_first_class_match: false,
            is_arrow_syntax: false,
        };
        program.declarations.push(Declaration::Let(wm_ast::LetDeclaration {
            id: wm_common::NodeId(1),
            span: wm_common::Span::synthetic(),
            is_recursive: false,
            bindings: vec![binding(2)],
        }));
        program.declarations.push(Declaration::Let(wm_ast::LetDeclaration {
            id: wm_common::NodeId(3),
            span: wm_common::Span::synthetic(),
            is_recursive: false,
            bindings: vec![binding(4)],
        }));

        let provider = SingleModuleProvider { program };
        let err = load("root", &provider, &PipelineOptions::default()).unwrap_err();
        assert!(matches!(err, HardError::DuplicateBinding { .. }));
    }
}
