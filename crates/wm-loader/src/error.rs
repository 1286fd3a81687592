//! The loader's own hard-error tier (spec §7's tier 3: failures that abort
//! the whole program rather than surface as a [`wm_common::Diagnostic`]).
//!
//! Kept `anyhow`-free so a caller can match on a specific variant; `anyhow`
//! is reserved for the outermost `workman` facade, the same tiering
//! `tsz-checker`'s own error-reporter boundary uses between structured
//! diagnostics and a handful of truly fatal conditions.

use thiserror::Error;

use crate::provider::ProviderError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HardError {
    #[error("circular import: {}", .cycle.join(" -> "))]
    CircularImport { cycle: Vec<String> },

    #[error("missing module: {path}")]
    MissingModule { path: String },

    #[error("module {module} declares a duplicate export `{name}`")]
    DuplicateExport { module: String, name: String },

    #[error("module {module} declares a duplicate top-level binding `{name}`")]
    DuplicateBinding { module: String, name: String },

    #[error("failed to parse module {module}: {message}")]
    ParseFailure { module: String, message: String },

    #[error("program has more than {limit} modules")]
    TooManyModules { limit: u32 },
}

pub(crate) fn provider_error_to_hard(path: &str, err: ProviderError) -> HardError {
    match err {
        ProviderError::NotFound => HardError::MissingModule { path: path.to_string() },
        ProviderError::Parse(message) => HardError::ParseFailure { module: path.to_string(), message },
    }
}
