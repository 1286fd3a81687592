//! The shapes Layer-1 hands to Layer-2 (spec §4.3's "Constraint stub kinds"
//! and "markedProgram").

use rustc_hash::FxHashMap;
use wm_common::{NodeId, Span};
use wm_infection::InfectionDomain;
use wm_types::{HoleId, Scheme, TypeArena, TypeEnv, TypeId, ValueEnv};

/// A local, non-fatal analysis result attached to a node (spec §4.3's
/// `mark_*` tags). Kept as a `NodeId`-keyed side table — see
/// [`MarkedProgram`] — rather than a literal duplicate tree, since the
/// caller's AST is immutable external data and node identity already makes
/// the map behave as a mirror.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mark {
    NotFunction,
    Inconsistent,
    UnsupportedExpr { expr_kind: String },
    OccursCheck,
    FreeVar,
    Pattern { issue: String },
    TypeDeclDuplicate,
    TypeDeclInvalidMember,
    TypeExprArity,
    TypeExprUnknown,
}

/// The Layer-1 output's "mirror AST": every node that received a local mark,
/// keyed by [`NodeId`] (spec §3's "Node identity", §4.3).
#[derive(Clone, Debug, Default)]
pub struct MarkedProgram {
    pub marks: FxHashMap<NodeId, Mark>,
}

impl MarkedProgram {
    pub fn mark(&mut self, node: NodeId, mark: Mark) {
        self.marks.insert(node, mark);
    }
}

/// Why a [`wm_types::TypeData::Unknown`] hole exists, plus enough context for
/// Layer-3 to explain it (spec §3's "Holes").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoleCategory {
    LocalConflict,
    Unfilled,
    ExprHole,
    UserHole,
    Incomplete,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownInfo {
    pub id: HoleId,
    pub category: HoleCategory,
    pub related_nodes: Vec<NodeId>,
    pub origin_node: NodeId,
    pub origin_span: Span,
}

/// Deferred work for Layer-2 (spec §4.3's "Constraint stub kinds"). Operands
/// are captured as [`TypeId`]s allocated during the same Layer-1 walk rather
/// than indirected through `nodeTypeById` by [`NodeId`] — the two are
/// equivalent since every stub-bearing node's type is, by construction, one
/// of these `TypeId`s (see `DESIGN.md`).
#[derive(Clone, Debug)]
pub enum ConstraintStub {
    Call {
        origin: NodeId,
        span: Span,
        callee: TypeId,
        argument: TypeId,
        result: TypeId,
        argument_error_row: Option<TypeId>,
    },
    Annotation {
        origin: NodeId,
        span: Span,
        annotation: TypeId,
        value: TypeId,
    },
    BranchJoin {
        origin: NodeId,
        span: Span,
        branches: Vec<TypeId>,
    },
    HasField {
        origin: NodeId,
        span: Span,
        target: TypeId,
        field: String,
        result: TypeId,
    },
    Numeric {
        origin: NodeId,
        span: Span,
        operands: Vec<TypeId>,
        result: TypeId,
    },
    Boolean {
        origin: NodeId,
        span: Span,
        operands: Vec<TypeId>,
        result: TypeId,
    },
    /// A `match` over an infectious carrier's effect row that did not fully
    /// discharge: `remaining` labels flow into the boundary check owned by
    /// the nearest enclosing `let`-bound function (spec §4.6).
    ConstraintRewrite {
        origin: NodeId,
        span: Span,
        domain: InfectionDomain,
        remaining_labels: Vec<String>,
    },
    /// The per-function boundary obligation itself (spec §4.6's "Boundary
    /// rule (per-domain)"), one per `let`-bound function body.
    ConstraintFlow {
        origin: NodeId,
        span: Span,
        domain: InfectionDomain,
        declared_return: TypeId,
        remaining_labels: Vec<String>,
    },
}

impl ConstraintStub {
    #[must_use]
    pub fn origin(&self) -> NodeId {
        match self {
            ConstraintStub::Call { origin, .. }
            | ConstraintStub::Annotation { origin, .. }
            | ConstraintStub::BranchJoin { origin, .. }
            | ConstraintStub::HasField { origin, .. }
            | ConstraintStub::Numeric { origin, .. }
            | ConstraintStub::Boolean { origin, .. }
            | ConstraintStub::ConstraintRewrite { origin, .. }
            | ConstraintStub::ConstraintFlow { origin, .. } => *origin,
        }
    }

    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            ConstraintStub::Call { span, .. }
            | ConstraintStub::Annotation { span, .. }
            | ConstraintStub::BranchJoin { span, .. }
            | ConstraintStub::HasField { span, .. }
            | ConstraintStub::Numeric { span, .. }
            | ConstraintStub::Boolean { span, .. }
            | ConstraintStub::ConstraintRewrite { span, .. }
            | ConstraintStub::ConstraintFlow { span, .. } => *span,
        }
    }
}

/// The complete result of running Layer-1 over one module (spec §4.3's
/// bullet list, §2's C3 data-flow).
///
/// Carries the [`TypeArena`] the stubs' and node types' [`TypeId`]s were
/// allocated from — a `TypeId` is only meaningful alongside the arena that
/// produced it, so Layer-2 and Layer-3 both need this, not just Layer-1's
/// own maps.
pub struct Layer1Output {
    pub arena: TypeArena,
    pub marked: MarkedProgram,
    pub constraint_stubs: Vec<ConstraintStub>,
    pub holes: FxHashMap<HoleId, UnknownInfo>,
    pub node_type_by_id: FxHashMap<NodeId, TypeId>,
    pub node_spans: FxHashMap<NodeId, Span>,
    pub summaries: Vec<(String, Scheme)>,
    pub value_env: ValueEnv,
    pub type_env: TypeEnv,
    pub diagnostics: Vec<wm_common::Diagnostic>,
}
