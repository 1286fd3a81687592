//! The host-injected collaborator standing in for the external parser
//! (spec §1's "parser contract"): this crate only consumes [`Program`]s it
//! is handed, it never lexes or parses source text itself.

use wm_ast::{OperatorTable, PrefixOperatorSet, Program};

/// Why a parse attempt failed, distinguished only as far as the loader's
/// own hard-error tier cares (spec §7).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderError {
    /// No source exists at this path.
    NotFound,
    /// The parser ran but could not produce a `Program` (a non-tolerant
    /// hard parse failure).
    Parse(String),
}

/// Parses one module's source into a [`Program`]. Called twice per module
/// (spec §4.7's two-phase parsing): once with empty operator tables to
/// discover its imports, once with the merged table to produce the real
/// parse the pipeline runs over.
pub trait ModuleProvider {
    fn parse(
        &self,
        path: &str,
        operators: &OperatorTable,
        prefix_operators: &PrefixOperatorSet,
    ) -> Result<Program, ProviderError>;
}
