//! User-definable infix/prefix operators (spec §3's `OperatorTable`, §6).

use rustc_hash::{FxHashMap, FxHashSet};
use wm_common::{NodeId, Span};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

/// `infix[l|r]? prec OP = fn;` or `prefix OP = fn;`.
#[derive(Clone, Debug, PartialEq)]
pub struct OperatorDeclaration {
    pub id: NodeId,
    pub span: Span,
    pub symbol: String,
    /// `None` for `prefix` declarations, which carry no precedence/associativity.
    pub precedence: Option<u8>,
    pub associativity: Option<Associativity>,
    pub function_name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperatorInfo {
    pub precedence: u8,
    pub associativity: Associativity,
}

/// `symbol → { precedence, associativity }`, threaded from the module loader
/// (C7) into the parser and read by Layer-1 when desugaring `binary`/`unary`
/// nodes (spec §3, §4.3).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OperatorTable {
    infix: FxHashMap<String, OperatorInfo>,
}

impl OperatorTable {
    #[must_use]
    pub fn new() -> Self {
        OperatorTable::default()
    }

    pub fn insert(&mut self, symbol: impl Into<String>, info: OperatorInfo) {
        self.infix.insert(symbol.into(), info);
    }

    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<OperatorInfo> {
        self.infix.get(symbol).copied()
    }

    /// Merge another table into this one; entries in `other` win on conflict,
    /// matching "union of operator tables from (prelude ∪ explicit imports)" (spec §4.7).
    pub fn merge(&mut self, other: &OperatorTable) {
        for (symbol, info) in &other.infix {
            self.infix.insert(symbol.clone(), *info);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, OperatorInfo)> {
        self.infix.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// The set of declared prefix operator symbols.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrefixOperatorSet {
    symbols: FxHashSet<String>,
}

impl PrefixOperatorSet {
    #[must_use]
    pub fn new() -> Self {
        PrefixOperatorSet::default()
    }

    pub fn insert(&mut self, symbol: impl Into<String>) {
        self.symbols.insert(symbol.into());
    }

    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn merge(&mut self, other: &PrefixOperatorSet) {
        self.symbols.extend(other.symbols.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_prefers_the_incoming_table_on_conflict() {
        let mut base = OperatorTable::new();
        base.insert("+", OperatorInfo { precedence: 6, associativity: Associativity::Left });
        let mut incoming = OperatorTable::new();
        incoming.insert("+", OperatorInfo { precedence: 9, associativity: Associativity::Right });
        base.merge(&incoming);
        assert_eq!(base.get("+").unwrap().precedence, 9);
    }
}
