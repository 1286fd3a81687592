//! The top-level `Program` the parser hands to the pipeline (spec §6).

use crate::declaration::Declaration;
use wm_common::{NodeId, Span};

#[derive(Clone, Debug, PartialEq)]
pub struct ImportBinding {
    pub name: String,
    pub alias: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModuleImport {
    pub id: NodeId,
    pub span: Span,
    pub path: String,
    pub bindings: Vec<ImportBinding>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModuleReexport {
    pub id: NodeId,
    pub span: Span,
    pub path: String,
    pub bindings: Vec<ImportBinding>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgramMode {
    Raw,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub imports: Vec<ModuleImport>,
    pub reexports: Vec<ModuleReexport>,
    pub declarations: Vec<Declaration>,
    pub mode: Option<ProgramMode>,
    /// Std-core module flag: when true, the loader skips merging the
    /// infection/operator prelude (spec §9's resolved Open Question).
    pub core: bool,
}

impl Program {
    #[must_use]
    pub fn empty() -> Self {
        Program { imports: Vec::new(), reexports: Vec::new(), declarations: Vec::new(), mode: None, core: false }
    }

    /// The highest `NodeId` anywhere in the program, used to seed the
    /// lowering passes' [`wm_common::node_id::NodeIdAllocator`] (spec §3).
    #[must_use]
    pub fn max_node_id(&self) -> NodeId {
        let mut max = NodeId(0);
        for import in &self.imports {
            max = max.max(import.id);
        }
        for reexport in &self.reexports {
            max = max.max(reexport.id);
        }
        for decl in &self.declarations {
            max = max.max(decl.id());
        }
        max
    }
}
