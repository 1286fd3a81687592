//! The surface-program data model the external parser produces (spec §6).
//!
//! This crate defines the *contract*, not the parser: lexing and parsing a
//! `.wm` source file into this shape is an external collaborator (spec §1).
//! Everything here is plain data — no tokenizing, no source-text handling.
//!
//! Every node carries a [`wm_common::NodeId`] and [`wm_common::Span`]
//! assigned by the parser. The core (Layer-1, §4.3) never invents or mutates
//! an existing id; synthesized nodes from lowering passes get ids strictly
//! above the program's pre-existing maximum, via [`wm_common::node_id::NodeIdAllocator`].

pub mod declaration;
pub mod expr;
pub mod operator;
pub mod pattern;
pub mod program;
pub mod type_expr;

pub use declaration::*;
pub use expr::*;
pub use operator::*;
pub use pattern::*;
pub use program::*;
pub use type_expr::*;

use wm_common::{NodeId, Span};

/// A node annotated with its parser-assigned identity and source span.
#[derive(Clone, Debug, PartialEq)]
pub struct Spanned<T> {
    pub id: NodeId,
    pub span: Span,
    pub node: T,
}

impl<T> Spanned<T> {
    #[must_use]
    pub fn new(id: NodeId, span: Span, node: T) -> Self {
        Spanned { id, span, node }
    }
}
