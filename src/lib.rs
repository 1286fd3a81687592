//! The `workman` front-end: wires the module loader (C7) over a single
//! entry point and exposes the shape a downstream emitter needs — per
//! module exports, Layer-3 presentation, and whether anything blocks
//! emission (spec §6's "no diagnostics across the whole program").
//!
//! This crate is a thin facade. All of the actual work lives in
//! `wm-loader`, which already orchestrates C3 -> C4 -> C5 per module in
//! dependency order; this just gives it a stable, documented surface and
//! turns its `HardError`s into `anyhow::Error` with module-path context,
//! matching `tsz`'s own top-level/driver-crate split between an inner
//! `Result<_, SpecificError>` core and an outer `anyhow`-based CLI shell.

pub use wm_ast::{OperatorTable, PrefixOperatorSet, Program};
pub use wm_common::{Diagnostic, DiagnosticReason, PipelineOptions};
pub use wm_infection::InfectionRegistry;
pub use wm_loader::{HardError, LoaderOutput, ModuleProvider, ModuleResult, ModuleSummary, ProviderError};
pub use wm_presenter::Layer3Result;

use anyhow::Context;

/// Runs the full pipeline over `entry` and everything it (transitively)
/// imports or re-exports. A cycle, a missing module, or a duplicate
/// top-level binding/export surfaces as an `Err` — everything else
/// (type mismatches, non-exhaustive matches, infectious-boundary
/// violations, ...) is a [`Diagnostic`] inside the returned [`LoaderOutput`]
/// and does not fail this call.
#[tracing::instrument(skip(provider, options))]
pub fn check_program(entry: &str, provider: &dyn ModuleProvider, options: &PipelineOptions) -> anyhow::Result<LoaderOutput> {
    wm_loader::load(entry, provider, options).with_context(|| format!("failed to load module `{entry}`"))
}

/// Whether the whole program is clean enough to hand to an emitter: no
/// module in `output` carries a solver, conflict, or control-flow
/// diagnostic. A caller that only wants "did it typecheck" collapses
/// [`LoaderOutput`] down to this one bool rather than walking every
/// module's [`Layer3Result`] itself.
pub fn is_emittable(output: &LoaderOutput) -> bool {
    output.modules.values().all(module_is_emittable)
}

fn module_is_emittable(module: &ModuleResult) -> bool {
    module.layer3.diagnostics.solver.is_empty()
        && module.layer3.diagnostics.conflicts.is_empty()
        && module.layer3.diagnostics.flow.is_empty()
}

/// Every diagnostic across every module, flattened in processing order —
/// the shape a CLI's `--json` diagnostics dump or a language-server
/// publish-diagnostics pass would iterate over.
pub fn all_diagnostics(output: &LoaderOutput) -> Vec<&Diagnostic> {
    output
        .modules
        .values()
        .flat_map(|module| {
            module
                .layer3
                .diagnostics
                .solver
                .iter()
                .chain(module.layer3.diagnostics.conflicts.iter())
                .chain(module.layer3.diagnostics.flow.iter())
        })
        .collect()
}
