//! Declared infectious types and their per-domain carrier sets (spec §4.6,
//! §4.7's "infection summary").

use rustc_hash::FxHashMap;
use wm_ast::InfectiousDeclaration;

/// One of the four domains a function boundary is checked against (spec
/// §4.6's "Boundary rule (per-domain)").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InfectionDomain {
    Error,
    Taint,
    Mem,
    Hole,
}

impl InfectionDomain {
    /// Parses the `domain` token written after `infectious` in source
    /// (`infectious error type ...`). Unknown domains are rejected by the
    /// parser before this crate ever sees them, so this is infallible for
    /// well-formed input but still returns `Option` defensively.
    #[must_use]
    pub fn parse(s: &str) -> Option<InfectionDomain> {
        match s {
            "error" => Some(InfectionDomain::Error),
            "taint" => Some(InfectionDomain::Taint),
            "mem" => Some(InfectionDomain::Mem),
            "hole" => Some(InfectionDomain::Hole),
            _ => None,
        }
    }
}

/// What a single `infectious` declaration introduces: the nominal carrier's
/// name, its two constructors, and which domain governs its boundary rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InfectiousTypeInfo {
    pub domain: InfectionDomain,
    pub name: String,
    pub value_param: String,
    pub effect_param: String,
    pub value_constructor: String,
    pub effect_constructor: String,
}

/// Name -> declaration map, seeded from the "infection prelude" and merged
/// across imports (spec §4.6's last paragraph, §4.7's re-export merge).
#[derive(Clone, Debug, Default)]
pub struct InfectionRegistry {
    by_name: FxHashMap<String, InfectiousTypeInfo>,
    by_value_ctor: FxHashMap<String, String>,
    by_effect_ctor: FxHashMap<String, String>,
}

impl InfectionRegistry {
    #[must_use]
    pub fn new() -> Self {
        InfectionRegistry::default()
    }

    /// The standard prelude: `Result<T, E>` (error domain) and `Tainted<T, E>`
    /// (taint domain), matching the two domains spec §6's concrete scenarios
    /// exercise. A `core: true` module skips merging this (spec §9's resolved
    /// Open Question), so callers seed it explicitly rather than `Default`
    /// always including it.
    #[must_use]
    pub fn with_prelude() -> Self {
        let mut reg = InfectionRegistry::new();
        reg.register(&InfectiousDeclaration {
            id: wm_common::NodeId(0),
            span: wm_common::Span::synthetic(),
            domain: "error".to_string(),
            name: "Result".to_string(),
            value_param: "T".to_string(),
            effect_param: "E".to_string(),
            value_constructor: ("Ok".to_string(), synthetic_type_expr()),
            effect_constructor: ("Err".to_string(), synthetic_type_expr()),
        });
        reg.register(&InfectiousDeclaration {
            id: wm_common::NodeId(0),
            span: wm_common::Span::synthetic(),
            domain: "taint".to_string(),
            name: "Tainted".to_string(),
            value_param: "T".to_string(),
            effect_param: "S".to_string(),
            value_constructor: ("Clean".to_string(), synthetic_type_expr()),
            effect_constructor: ("Dirty".to_string(), synthetic_type_expr()),
        });
        reg
    }

    /// Registers a user `infectious` declaration, or silently ignores one
    /// with an unrecognized domain token (a hard parse-level concern, not
    /// this crate's).
    pub fn register(&mut self, decl: &InfectiousDeclaration) {
        let Some(domain) = InfectionDomain::parse(&decl.domain) else { return };
        let info = InfectiousTypeInfo {
            domain,
            name: decl.name.clone(),
            value_param: decl.value_param.clone(),
            effect_param: decl.effect_param.clone(),
            value_constructor: decl.value_constructor.0.clone(),
            effect_constructor: decl.effect_constructor.0.clone(),
        };
        self.by_value_ctor.insert(info.value_constructor.clone(), info.name.clone());
        self.by_effect_ctor.insert(info.effect_constructor.clone(), info.name.clone());
        self.by_name.insert(info.name.clone(), info);
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&InfectiousTypeInfo> {
        self.by_name.get(name)
    }

    /// The infectious type a `@value` constructor belongs to (e.g. `Ok` -> `Result`).
    #[must_use]
    pub fn carrier_for_value_constructor(&self, ctor: &str) -> Option<&InfectiousTypeInfo> {
        self.by_value_ctor.get(ctor).and_then(|name| self.lookup(name))
    }

    /// The infectious type an `@effect` constructor belongs to (e.g. `Err` -> `Result`).
    #[must_use]
    pub fn carrier_for_effect_constructor(&self, ctor: &str) -> Option<&InfectiousTypeInfo> {
        self.by_effect_ctor.get(ctor).and_then(|name| self.lookup(name))
    }

    /// Whether `type_name` is a nominal carrier for `domain` (spec §4.6's
    /// boundary rule, e.g. "must be a carrier of the error domain").
    #[must_use]
    pub fn is_carrier(&self, domain: InfectionDomain, type_name: &str) -> bool {
        self.by_name.get(type_name).is_some_and(|info| info.domain == domain)
    }

    /// Merges another module's exported infection declarations into this
    /// one, incoming entries winning on name collision (mirrors
    /// [`wm_types::TypeEnv::merge`]'s convention).
    pub fn merge(&mut self, other: &InfectionRegistry) {
        for info in other.by_name.values() {
            self.by_value_ctor.insert(info.value_constructor.clone(), info.name.clone());
            self.by_effect_ctor.insert(info.effect_constructor.clone(), info.name.clone());
            self.by_name.insert(info.name.clone(), info.clone());
        }
    }
}

fn synthetic_type_expr() -> wm_ast::TypeExprNode {
    wm_ast::Spanned::new(wm_common::NodeId(0), wm_common::Span::synthetic(), wm_ast::TypeExpr::Hole)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prelude_registers_result_under_the_error_domain() {
        let reg = InfectionRegistry::with_prelude();
        assert!(reg.is_carrier(InfectionDomain::Error, "Result"));
        assert_eq!(reg.carrier_for_effect_constructor("Err").unwrap().name, "Result");
        assert_eq!(reg.carrier_for_value_constructor("Ok").unwrap().name, "Result");
    }

    #[test]
    fn merge_prefers_the_incoming_declaration_on_conflict() {
        let mut base = InfectionRegistry::with_prelude();
        let mut incoming = InfectionRegistry::new();
        incoming.register(&InfectiousDeclaration {
            id: wm_common::NodeId(1),
            span: wm_common::Span::synthetic(),
            domain: "mem".to_string(),
            name: "Result".to_string(),
            value_param: "T".to_string(),
            effect_param: "E".to_string(),
            value_constructor: ("Ok".to_string(), synthetic_type_expr()),
            effect_constructor: ("Err".to_string(), synthetic_type_expr()),
        });
        base.merge(&incoming);
        assert_eq!(base.lookup("Result").unwrap().domain, InfectionDomain::Mem);
    }
}
