//! Layer-1 inference (spec §2's C3, §4.3): walks a lowered [`wm_ast::Program`]
//! and produces marks, constraint stubs, holes and a provisional node-type
//! map for Layer-2 (`wm-solver`) to resolve.

mod context;
mod decl;
mod expr;
mod lowering;
mod match_expr;
mod pattern;
mod stub;
mod type_expr;

pub use context::InferContext;
pub use decl::infer_module;
pub use stub::{ConstraintStub, HoleCategory, Layer1Output, Mark, MarkedProgram, UnknownInfo};
