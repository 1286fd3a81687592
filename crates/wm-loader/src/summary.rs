//! A module's finished analysis, folded forward into whatever imports it
//! (spec §4.7, §5's "state does not outlive a module's pass except through
//! the merged exports the loader threads forward").

use wm_ast::{OperatorTable, PrefixOperatorSet};
use wm_infection::InfectionRegistry;
use wm_types::{Scheme, TypeArena, TypeEnv};

/// Exported bindings and declarations, plus the standalone arena their
/// [`wm_types::TypeId`]s live in. This is a dedicated export-only arena
/// built by [`crate::import`] — not the module's working arena, which
/// `wm-presenter::present` consumes in full and which doesn't outlive the
/// module's own pass.
pub struct ModuleSummary {
    pub path: String,
    pub arena: TypeArena,
    pub exports: Vec<(String, Scheme)>,
    pub type_env: TypeEnv,
    pub operators: OperatorTable,
    pub prefix_operators: PrefixOperatorSet,
    pub infection: InfectionRegistry,
}

/// One module's complete result: its folded-forward [`ModuleSummary`] plus
/// the emitter-boundary shape Layer-3 produced for it (spec §6).
pub struct ModuleResult {
    pub summary: ModuleSummary,
    pub layer3: wm_presenter::Layer3Result,
}
