//! Shared symbol table
//!
//! [`SymbolTable`] is the only mutable state shared between recognizer
//! passes. All names live in a single flat namespace: a constant, typedef,
//! struct and function may never share a name. Registration is an atomic
//! check-and-insert on the name map; entity collections are append-only and
//! locked only for the push itself.
//!
//! Lock order is always `names` before any entity collection.

use super::types::*;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

/// Domain-specific type spellings (`GLenum`, `ALCint`, ...) mapped to scalars
pub type AliasMap = FxHashMap<String, Scalar>;

/// Resolved constants, typedefs, structs and functions for one parse
#[derive(Debug, Default)]
pub struct SymbolTable {
    aliases: AliasMap,
    names: Mutex<FxHashMap<String, SymbolKind>>,
    constants: Mutex<Vec<Constant>>,
    definitions: Mutex<Vec<Definition>>,
    structs: Mutex<Vec<Struct>>,
    functions: Mutex<Vec<Function>>,
    unknown_types: Mutex<FxHashSet<String>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_aliases(aliases: AliasMap) -> Self {
        SymbolTable {
            aliases,
            ..Self::default()
        }
    }

    pub fn aliases(&self) -> &AliasMap {
        &self.aliases
    }

    // ===== Name registration =====

    /// Record `name` under `kind`; returns false (and warns) if it is taken.
    pub fn register_if_unique(&self, name: &str, kind: SymbolKind) -> bool {
        let mut names = self.names.lock();
        Self::register_in(&mut names, name, kind)
    }

    /// Remove `name` from the namespace, returning the kind it had.
    pub fn unregister(&self, name: &str) -> Option<SymbolKind> {
        self.names.lock().remove(name)
    }

    pub fn kind_of(&self, name: &str) -> Option<SymbolKind> {
        self.names.lock().get(name).copied()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.names.lock().contains_key(name)
    }

    fn register_in(names: &mut FxHashMap<String, SymbolKind>, name: &str, kind: SymbolKind) -> bool {
        if let Some(existing) = names.get(name) {
            log::warn!("Duplicate symbol '{name}' ({kind:?}) ignored, already declared as {existing:?}");
            return false;
        }
        names.insert(name.to_string(), kind);
        true
    }

    // ===== Guarded insertion =====

    pub fn add_constant(&self, constant: Constant) -> bool {
        if !self.register_if_unique(&constant.name, SymbolKind::Constant) {
            return false;
        }
        self.constants.lock().push(constant);
        true
    }

    pub fn add_definition(&self, definition: Definition) -> bool {
        let kind = if definition.is_callback() {
            SymbolKind::Callback
        } else {
            SymbolKind::Opaque
        };
        if !self.register_if_unique(&definition.name, kind) {
            return false;
        }
        self.definitions.lock().push(definition);
        true
    }

    pub fn add_function(&self, function: Function) -> bool {
        if !self.register_if_unique(&function.name, SymbolKind::Function) {
            return false;
        }
        self.functions.lock().push(function);
        true
    }

    /// Provisionally register a struct name as an opaque definition.
    ///
    /// Used by the name-only pre-pass so later declarations can resolve the
    /// struct as a known type before its body is parsed. A name that is
    /// already registered (typically by `typedef struct Foo Foo;`) is left
    /// alone without a warning.
    pub fn reserve_struct_name(&self, name: &str) -> bool {
        let mut names = self.names.lock();
        if names.contains_key(name) {
            log::debug!("Struct name '{name}' already reserved");
            return false;
        }
        names.insert(name.to_string(), SymbolKind::Opaque);
        self.definitions.lock().push(Definition::opaque(name));
        true
    }

    /// Drop a provisional struct name whose body never parsed.
    ///
    /// Only an opaque registration is removed; anything else is left alone.
    pub fn release_struct_name(&self, name: &str) -> bool {
        let mut names = self.names.lock();
        if names.get(name) != Some(&SymbolKind::Opaque) {
            return false;
        }
        names.remove(name);
        self.definitions
            .lock()
            .retain(|d| d.name != name || d.is_callback());
        true
    }

    /// Add a parsed struct, promoting a provisional opaque definition.
    ///
    /// If `name` is currently an opaque definition, that definition is
    /// removed and the name is unregistered and re-registered as a struct in
    /// one critical section, so readers see either the opaque alias or the
    /// struct, never neither. Any other existing registration is a duplicate.
    pub fn add_struct(&self, s: Struct) -> bool {
        let mut names = self.names.lock();
        if names.get(&s.name) == Some(&SymbolKind::Opaque) {
            self.definitions
                .lock()
                .retain(|d| d.name != s.name || d.is_callback());
            names.remove(&s.name);
            log::debug!("Promoted opaque definition '{}' to struct", s.name);
        }
        if !Self::register_in(&mut names, &s.name, SymbolKind::Struct) {
            return false;
        }
        self.structs.lock().push(s);
        true
    }

    // ===== Diagnostics =====

    /// Remember an unresolvable raw type name; true only the first time.
    pub fn note_unknown_type(&self, raw: &str) -> bool {
        self.unknown_types.lock().insert(raw.to_string())
    }

    /// Unknown raw type names, sorted
    pub fn unknown_types(&self) -> Vec<String> {
        let mut unknown: Vec<String> = self.unknown_types.lock().iter().cloned().collect();
        unknown.sort();
        unknown
    }

    /// Empty the unknown-type set, returning what it held, sorted
    pub fn take_unknown_types(&self) -> Vec<String> {
        let mut unknown: Vec<String> = self.unknown_types.lock().drain().collect();
        unknown.sort();
        unknown
    }

    // ===== Read access =====

    pub fn constants(&self) -> Vec<Constant> {
        self.constants.lock().clone()
    }

    pub fn definitions(&self) -> Vec<Definition> {
        self.definitions.lock().clone()
    }

    pub fn structs(&self) -> Vec<Struct> {
        self.structs.lock().clone()
    }

    pub fn functions(&self) -> Vec<Function> {
        self.functions.lock().clone()
    }

    pub fn constant(&self, name: &str) -> Option<Constant> {
        self.constants.lock().iter().find(|c| c.name == name).cloned()
    }

    pub fn definition(&self, name: &str) -> Option<Definition> {
        self.definitions.lock().iter().find(|d| d.name == name).cloned()
    }

    pub fn struct_def(&self, name: &str) -> Option<Struct> {
        self.structs.lock().iter().find(|s| s.name == name).cloned()
    }

    pub fn function(&self, name: &str) -> Option<Function> {
        self.functions.lock().iter().find(|f| f.name == name).cloned()
    }

    /// Total number of entities across all categories
    pub fn len(&self) -> usize {
        self.constants.lock().len()
            + self.definitions.lock().len()
            + self.structs.lock().len()
            + self.functions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy the table out into plain data for code generation.
    pub fn snapshot(&self) -> SymbolSnapshot {
        SymbolSnapshot {
            constants: self.constants(),
            definitions: self.definitions(),
            structs: self.structs(),
            functions: self.functions(),
            unknown_types: self.unknown_types(),
        }
    }
}

/// Read-only, serializable copy of a [`SymbolTable`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct SymbolSnapshot {
    pub constants: Vec<Constant>,
    pub definitions: Vec<Definition>,
    pub structs: Vec<Struct>,
    pub functions: Vec<Function>,
    pub unknown_types: Vec<String>,
}
