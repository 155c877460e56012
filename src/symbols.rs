//! Symbol table and namespace resolution.
//!
//! One symbol per distinct `(scope, name)` pair; repeated definitions of a
//! name in one scope merge into that symbol as further occurrences. The
//! table holds back-references into the AST (it never owns declarations) in
//! a flat arena, so consistency checks iterate occurrences by index.
//!
//! Scopes come from `namespace` blocks (one per dotted segment) and from
//! PROTOCOL definition bodies. Re-opening a namespace re-enters the same
//! scope. Name lookup searches the enclosing scope chain outward and is
//! case-sensitive, with no fuzzy fallback.

use crate::ast::{Item, Schema, TypeDef, TypeKind};
use std::collections::HashMap;

pub type ScopeId = usize;
pub type SymbolId = usize;
pub type OccurrenceId = usize;

pub const ROOT_SCOPE: ScopeId = 0;

/// One `name => TYPE` definition linked to its symbol and scope.
#[derive(Debug)]
pub struct Occurrence<'a> {
    pub def: &'a TypeDef,
    pub scope: ScopeId,
    pub symbol: SymbolId,
}

/// Merged identity of all same-name definitions within one scope.
#[derive(Debug)]
pub struct Symbol {
    pub name: String,
    pub scope: ScopeId,
    pub occurrences: Vec<OccurrenceId>,
}

#[derive(Debug)]
struct Scope {
    parent: Option<ScopeId>,
    names: HashMap<String, SymbolId>,
    children: HashMap<String, ScopeId>,
}

#[derive(Debug)]
pub struct SymbolTable<'a> {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
    occurrences: Vec<Occurrence<'a>>,
}

impl<'a> SymbolTable<'a> {
    /// Collect all definitions of a schema. Occurrence order is source
    /// order (depth-first over namespaces and protocol bodies).
    pub fn build(schema: &'a Schema) -> Self {
        let mut table = SymbolTable {
            scopes: vec![Scope {
                parent: None,
                names: HashMap::new(),
                children: HashMap::new(),
            }],
            symbols: Vec::new(),
            occurrences: Vec::new(),
        };
        table.collect_items(&schema.items, ROOT_SCOPE);
        table
    }

    fn collect_items(&mut self, items: &'a [Item], scope: ScopeId) {
        for item in items {
            match item {
                Item::Namespace(ns) => {
                    let mut inner = scope;
                    for segment in &ns.segments {
                        inner = self.enter_scope(inner, segment);
                    }
                    self.collect_items(&ns.items, inner);
                }
                Item::TypeDef(def) => self.collect_def(def, scope),
            }
        }
    }

    fn collect_def(&mut self, def: &'a TypeDef, scope: ScopeId) {
        let symbol = self.intern(scope, &def.name);
        let occ = self.occurrences.len();
        self.occurrences.push(Occurrence { def, scope, symbol });
        self.symbols[symbol].occurrences.push(occ);
        // Definitions inside a PROTOCOL body live in a scope named by the
        // protocol itself.
        if let TypeKind::Protocol(defs) = &def.ty.kind {
            if !defs.is_empty() {
                let inner = self.enter_scope(scope, &def.name);
                for nested in defs {
                    self.collect_def(nested, inner);
                }
            }
        }
    }

    fn enter_scope(&mut self, parent: ScopeId, name: &str) -> ScopeId {
        if let Some(&existing) = self.scopes[parent].children.get(name) {
            return existing;
        }
        let id = self.scopes.len();
        self.scopes.push(Scope {
            parent: Some(parent),
            names: HashMap::new(),
            children: HashMap::new(),
        });
        self.scopes[parent].children.insert(name.to_string(), id);
        id
    }

    fn intern(&mut self, scope: ScopeId, name: &str) -> SymbolId {
        if let Some(&sym) = self.scopes[scope].names.get(name) {
            return sym;
        }
        let id = self.symbols.len();
        self.symbols.push(Symbol {
            name: name.to_string(),
            scope,
            occurrences: Vec::new(),
        });
        self.scopes[scope].names.insert(name.to_string(), id);
        id
    }

    /// Resolve a name from `scope`, searching enclosing scopes outward.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        let mut cursor = Some(scope);
        while let Some(s) = cursor {
            if let Some(&sym) = self.scopes[s].names.get(name) {
                return Some(&self.symbols[sym]);
            }
            cursor = self.scopes[s].parent;
        }
        None
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn occurrences(&self) -> &[Occurrence<'a>] {
        &self.occurrences
    }

    pub fn occurrence(&self, id: OccurrenceId) -> &Occurrence<'a> {
        &self.occurrences[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn same_name_same_scope_merges() {
        let schema = parse(
            "p => PROTOCOL [ id 1 ]\n\
             p => PROTOCOL [ id 1 ]\n",
        )
        .expect("parse");
        let table = SymbolTable::build(&schema);
        assert_eq!(table.symbols().len(), 1);
        assert_eq!(table.symbols()[0].occurrences.len(), 2);
        assert_eq!(table.occurrences().len(), 2);
    }

    #[test]
    fn namespaces_separate_symbols() {
        let schema = parse(
            "p => PROTOCOL [ id 1 ]\n\
             namespace ns1 { p => PROTOCOL [ id 2 ] }\n",
        )
        .expect("parse");
        let table = SymbolTable::build(&schema);
        assert_eq!(table.symbols().len(), 2);
    }

    #[test]
    fn reopened_namespace_is_same_scope() {
        let schema = parse(
            "namespace ns1 { p => PROTOCOL [ id 1 ] }\n\
             namespace ns1 { p => PROTOCOL [ id 1 ] }\n",
        )
        .expect("parse");
        let table = SymbolTable::build(&schema);
        assert_eq!(table.symbols().len(), 1);
        assert_eq!(table.symbols()[0].occurrences.len(), 2);
    }

    #[test]
    fn lookup_walks_outward_and_is_case_sensitive() {
        let schema = parse(
            "Acme => VENDOR [ id 1 ]\n\
             namespace ns1 { namespace ns2 { x => INTEGER } }\n",
        )
        .expect("parse");
        let table = SymbolTable::build(&schema);
        // locate the innermost scope via the nested definition
        let inner_scope = table
            .occurrences()
            .iter()
            .find(|o| o.def.name == "x")
            .map(|o| o.scope)
            .expect("nested occurrence");
        assert!(table.lookup(inner_scope, "Acme").is_some());
        assert!(table.lookup(inner_scope, "acme").is_none());
        assert!(table.lookup(ROOT_SCOPE, "x").is_none());
    }
}
