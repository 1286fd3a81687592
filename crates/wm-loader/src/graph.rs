//! Phase 1 of module loading (spec §4.7): parse every reachable module with
//! empty operator tables — import/reexport paths never depend on operator
//! precedence — to discover the dependency graph, detect cycles, and
//! compute a dependencies-first processing order.

use rustc_hash::FxHashMap;

use wm_ast::{OperatorTable, PrefixOperatorSet, Program};
use wm_common::limits::MAX_MODULES_PER_PROGRAM;

use crate::error::{provider_error_to_hard, HardError};
use crate::provider::ModuleProvider;

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    InProgress,
    Done,
}

/// Returns every reachable module's phase-1 [`Program`] plus a processing
/// order where a module always comes after everything it imports or
/// re-exports — the natural post-order of a depth-first walk.
pub fn discover(
    entry: &str,
    provider: &dyn ModuleProvider,
) -> Result<(FxHashMap<String, Program>, Vec<String>), HardError> {
    let mut phase1 = FxHashMap::default();
    let mut order = Vec::new();
    let mut state: FxHashMap<String, VisitState> = FxHashMap::default();
    let mut stack = Vec::new();
    visit(entry, provider, &mut phase1, &mut order, &mut state, &mut stack)?;
    Ok((phase1, order))
}

/// Re-export arcs are folded in alongside import arcs (a supplemented
/// feature grounded on `state_lib_merge.rs`'s re-export resolution): a
/// module that re-exports from something that imports or re-exports it
/// back is just as circular as a plain import cycle, and gets the same
/// hard error.
fn dependencies_of(program: &Program) -> Vec<String> {
    let mut deps: Vec<String> = program.imports.iter().map(|i| i.path.clone()).collect();
    deps.extend(program.reexports.iter().map(|r| r.path.clone()));
    deps
}

#[allow(clippy::too_many_arguments)]
fn visit(
    path: &str,
    provider: &dyn ModuleProvider,
    phase1: &mut FxHashMap<String, Program>,
    order: &mut Vec<String>,
    state: &mut FxHashMap<String, VisitState>,
    stack: &mut Vec<String>,
) -> Result<(), HardError> {
    match state.get(path) {
        Some(VisitState::Done) => return Ok(()),
        Some(VisitState::InProgress) => {
            let start = stack.iter().position(|p| p == path).unwrap_or(0);
            let mut cycle = stack[start..].to_vec();
            cycle.push(path.to_string());
            return Err(HardError::CircularImport { cycle });
        }
        None => {}
    }
    if phase1.len() as u32 >= MAX_MODULES_PER_PROGRAM {
        return Err(HardError::TooManyModules { limit: MAX_MODULES_PER_PROGRAM });
    }

    state.insert(path.to_string(), VisitState::InProgress);
    stack.push(path.to_string());

    let program = provider
        .parse(path, &OperatorTable::new(), &PrefixOperatorSet::new())
        .map_err(|err| provider_error_to_hard(path, err))?;

    for dep in dependencies_of(&program) {
        visit(&dep, provider, phase1, order, state, stack)?;
    }

    phase1.insert(path.to_string(), program);
    order.push(path.to_string());
    stack.pop();
    state.insert(path.to_string(), VisitState::Done);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wm_ast::{ModuleImport, ModuleReexport};
    use wm_common::{NodeId, Span};

    struct FixtureProvider {
        modules: FxHashMap<String, Program>,
    }

    impl ModuleProvider for FixtureProvider {
        fn parse(
            &self,
            path: &str,
            _operators: &OperatorTable,
            _prefix_operators: &PrefixOperatorSet,
        ) -> Result<Program, crate::provider::ProviderError> {
            self.modules.get(path).cloned().ok_or(crate::provider::ProviderError::NotFound)
        }
    }

    fn program_importing(paths: &[&str]) -> Program {
        let mut program = Program::empty();
        program.imports = paths
            .iter()
            .map(|p| ModuleImport { id: NodeId(0), span: Span::synthetic(), path: p.to_string(), bindings: Vec::new() })
            .collect();
        program
    }

    #[test]
    fn a_diamond_import_graph_orders_dependencies_before_dependents() {
        let mut modules = FxHashMap::default();
        modules.insert("leaf".to_string(), Program::empty());
        modules.insert("left".to_string(), program_importing(&["leaf"]));
        modules.insert("right".to_string(), program_importing(&["leaf"]));
        modules.insert("top".to_string(), program_importing(&["left", "right"]));
        let provider = FixtureProvider { modules };

        let (_, order) = discover("top", &provider).unwrap();
        let pos = |name: &str| order.iter().position(|p| p == name).unwrap();
        assert!(pos("leaf") < pos("left"));
        assert!(pos("leaf") < pos("right"));
        assert!(pos("left") < pos("top"));
        assert!(pos("right") < pos("top"));
    }

    #[test]
    fn a_direct_import_cycle_is_a_hard_error() {
        let mut modules = FxHashMap::default();
        modules.insert("a".to_string(), program_importing(&["b"]));
        modules.insert("b".to_string(), program_importing(&["a"]));
        let provider = FixtureProvider { modules };

        let err = discover("a", &provider).unwrap_err();
        assert!(matches!(err, HardError::CircularImport { .. }));
    }

    #[test]
    fn a_reexport_arc_back_to_an_importer_is_also_circular() {
        let mut modules = FxHashMap::default();
        modules.insert("a".to_string(), program_importing(&["b"]));
        let mut b = Program::empty();
        b.reexports =
            vec![ModuleReexport { id: NodeId(0), span: Span::synthetic(), path: "a".to_string(), bindings: Vec::new() }];
        modules.insert("b".to_string(), b);
        let provider = FixtureProvider { modules };

        let err = discover("a", &provider).unwrap_err();
        assert!(matches!(err, HardError::CircularImport { .. }));
    }

    #[test]
    fn a_missing_module_surfaces_as_missing_module() {
        let mut modules = FxHashMap::default();
        modules.insert("a".to_string(), program_importing(&["ghost"]));
        let provider = FixtureProvider { modules };

        let err = discover("a", &provider).unwrap_err();
        assert_eq!(err, HardError::MissingModule { path: "ghost".to_string() });
    }
}
