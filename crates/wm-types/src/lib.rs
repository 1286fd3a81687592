//! Type representation and unifier for the workman front-end (spec's C1).
//!
//! Every `Type`, whether a concrete shape or a unification variable, is a
//! node in a [`TypeArena`] addressed by [`TypeId`]. The arena owns an
//! `ena`-backed union-find table for its `Var` nodes; unification,
//! substitution, generalization and instantiation are all arena methods
//! rather than free functions over a structural tree.

pub mod arena;
pub mod data;
pub mod error;
pub mod ids;

pub use arena::TypeArena;
pub use data::{ConstructorInfo, HoleProvenance, Scheme, TypeData, TypeEnv, TypeInfo, ValueEnv};
pub use error::UnifyError;
pub use ids::{HoleId, TyVar, TypeId};
