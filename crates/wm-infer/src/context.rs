//! Per-module Layer-1 state (spec §5: "the `fresh_var` counter lives in a
//! per-pipeline context object, not in global state").

use rustc_hash::FxHashMap;
use wm_ast::{OperatorTable, PrefixOperatorSet};
use wm_common::node_id::NodeIdAllocator;
use wm_common::{Diagnostic, NodeId, PipelineOptions, Span};
use wm_infection::InfectionRegistry;
use wm_types::{HoleId, HoleProvenance, TypeArena, TypeEnv, TypeId, ValueEnv};

use crate::stub::{ConstraintStub, HoleCategory, MarkedProgram, UnknownInfo};

pub struct InferContext {
    pub arena: TypeArena,
    pub value_env: ValueEnv,
    pub type_env: TypeEnv,
    pub operators: OperatorTable,
    pub prefix_operators: PrefixOperatorSet,
    pub infection: InfectionRegistry,
    pub options: PipelineOptions,
    pub ids: NodeIdAllocator,

    pub marked: MarkedProgram,
    pub constraint_stubs: Vec<ConstraintStub>,
    pub holes: FxHashMap<HoleId, UnknownInfo>,
    pub node_type_by_id: FxHashMap<NodeId, TypeId>,
    pub node_spans: FxHashMap<NodeId, Span>,
    pub diagnostics: Vec<Diagnostic>,

    /// `infix`-declared symbol -> the function name it desugars to. Kept
    /// separate from [`wm_ast::OperatorTable`] (which only carries
    /// precedence/associativity for the parser) since resolving a `binary`
    /// node needs the function's scheme, looked up lazily by name so
    /// declaration order between `infix ... = f;` and `let f = ...;` doesn't
    /// matter (spec §6's concrete operator scenario declares the operator
    /// before the function it names).
    pub infix_functions: FxHashMap<String, String>,
    pub prefix_functions: FxHashMap<String, String>,
}

impl InferContext {
    #[must_use]
    pub fn new(
        value_env: ValueEnv,
        type_env: TypeEnv,
        operators: OperatorTable,
        prefix_operators: PrefixOperatorSet,
        infection: InfectionRegistry,
        options: PipelineOptions,
        ids: NodeIdAllocator,
    ) -> Self {
        InferContext {
            arena: TypeArena::new(),
            value_env,
            type_env,
            operators,
            prefix_operators,
            infection,
            options,
            ids,
            marked: MarkedProgram::default(),
            constraint_stubs: Vec::new(),
            holes: FxHashMap::default(),
            node_type_by_id: FxHashMap::default(),
            node_spans: FxHashMap::default(),
            diagnostics: Vec::new(),
            infix_functions: FxHashMap::default(),
            prefix_functions: FxHashMap::default(),
        }
    }

    /// Records the provisional type Layer-1 assigns to `node` (spec §3's
    /// node-identity invariant: "after Layer-1 runs, `nodeTypeById` has an
    /// entry").
    pub fn set_node_type(&mut self, node: NodeId, span: Span, ty: TypeId) {
        self.node_type_by_id.insert(node, ty);
        self.node_spans.insert(node, span);
    }

    #[must_use]
    pub fn node_type(&self, node: NodeId) -> Option<TypeId> {
        self.node_type_by_id.get(&node).copied()
    }

    pub fn push_stub(&mut self, stub: ConstraintStub) {
        self.constraint_stubs.push(stub);
    }

    /// Allocates a fresh hole of the given provenance/category and records
    /// its [`UnknownInfo`] (spec §3's "Holes" lifecycle: "created in
    /// Layer-1").
    pub fn fresh_hole(&mut self, provenance: HoleProvenance, category: HoleCategory, origin: NodeId, span: wm_common::Span) -> TypeId {
        let ty = self.arena.fresh_hole(provenance);
        let id = match self.arena.get(ty) {
            wm_types::TypeData::Unknown { id, .. } => *id,
            _ => unreachable!("fresh_hole always allocates an Unknown node"),
        };
        self.holes.insert(
            id,
            UnknownInfo { id, category, related_nodes: Vec::new(), origin_node: origin, origin_span: span },
        );
        ty
    }

    pub fn diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
