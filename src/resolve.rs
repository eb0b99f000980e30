//! C type → canonical type conversion
//!
//! [`TypeResolver::convert`] takes a raw C type spelling plus an optional raw
//! declarator (`*name`, `name[4]`, `name[]`) and produces a
//! [`CanonicalType`] and the sanitized declarator name.
//!
//! # Resolution order
//!
//! 1. A name registered in the table as an opaque alias or callback
//!    (callbacks optionally decay to the pointer-sized scalar)
//! 2. A name registered as a struct
//! 3. The built-in C spelling table (which also accepts canonical spellings)
//! 4. The caller's alias map
//!
//! Anything else is an unknown type: it becomes the pointer-sized scalar with
//! pointer depth 0 and is reported once through the table's diagnostics.

use crate::symbols::{BaseType, CanonicalType, Scalar, SymbolKind, SymbolTable};

/// Keywords of the generated target language. A declarator with one of these
/// names is escaped with a leading `@`.
const RESERVED_NAMES: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// Words dropped from a raw type before lookup
const QUALIFIERS: &[&str] = &[
    "const", "volatile", "restrict", "__restrict", "struct", "union", "enum",
];

/// Escape a declarator name that collides with a target keyword.
pub fn sanitize_name(name: &str) -> String {
    let name = name.trim();
    if RESERVED_NAMES.contains(&name) {
        format!("@{name}")
    } else {
        name.to_string()
    }
}

/// Built-in C spellings, after qualifier removal and whitespace collapsing
fn primitive(spelling: &str) -> Option<Scalar> {
    let scalar = match spelling {
        "void" => Scalar::Void,
        "char" | "unsigned char" => Scalar::U8,
        "signed char" => Scalar::I8,
        "short" | "short int" | "signed short" | "signed short int" => Scalar::I16,
        "unsigned short" | "unsigned short int" => Scalar::U16,
        "int" | "signed" | "signed int" => Scalar::I32,
        "unsigned" | "unsigned int" => Scalar::U32,
        "long" | "long int" | "signed long" | "signed long int" => Scalar::Isize,
        "unsigned long" | "unsigned long int" => Scalar::Usize,
        "long long" | "long long int" | "signed long long" => Scalar::I64,
        "unsigned long long" | "unsigned long long int" => Scalar::U64,
        "float" => Scalar::F32,
        "double" => Scalar::F64,
        "_Bool" => Scalar::Bool,
        "size_t" | "uintptr_t" => Scalar::Usize,
        "ssize_t" | "ptrdiff_t" | "intptr_t" => Scalar::Isize,
        "int8_t" => Scalar::I8,
        "int16_t" => Scalar::I16,
        "int32_t" => Scalar::I32,
        "int64_t" => Scalar::I64,
        "uint8_t" => Scalar::U8,
        "uint16_t" => Scalar::U16,
        "uint32_t" => Scalar::U32,
        "uint64_t" => Scalar::U64,
        other => return Scalar::from_canonical(other),
    };
    Some(scalar)
}

/// Strip a trailing array suffix (`[]`, `[4]`, `[N][M]`) from a declarator.
///
/// Returns the bare name and whether any suffix was present. Any number of
/// dimensions counts as a single extra pointer level.
pub fn strip_array_suffix(declarator: &str) -> (&str, bool) {
    let mut name = declarator.trim_end();
    let mut found = false;
    while name.ends_with(']') {
        match name.rfind('[') {
            Some(open) => {
                name = name[..open].trim_end();
                found = true;
            }
            None => break,
        }
    }
    (name, found)
}

/// Converts raw C types against a [`SymbolTable`]
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'a> {
    table: &'a SymbolTable,
    decay_callbacks: bool,
}

impl<'a> TypeResolver<'a> {
    pub fn new(table: &'a SymbolTable) -> Self {
        TypeResolver {
            table,
            decay_callbacks: false,
        }
    }

    /// Resolve callback typedef names to the pointer-sized scalar.
    pub fn decaying_callbacks(mut self, decay: bool) -> Self {
        self.decay_callbacks = decay;
        self
    }

    /// Convert a raw type and optional raw declarator name.
    pub fn convert(&self, raw_type: &str, raw_name: Option<&str>) -> (CanonicalType, Option<String>) {
        let mut pointer_depth = raw_type.matches('*').count();
        let base = raw_type
            .replace('*', " ")
            .split_whitespace()
            .filter(|word| !QUALIFIERS.contains(word))
            .collect::<Vec<_>>()
            .join(" ");

        let name = raw_name.map(|raw| {
            let mut rest = raw.trim();
            loop {
                if let Some(stripped) = rest.strip_prefix('*') {
                    pointer_depth += 1;
                    rest = stripped.trim_start();
                } else if let Some(stripped) = rest.strip_prefix("const ") {
                    rest = stripped.trim_start();
                } else {
                    break;
                }
            }
            let (bare, is_array) = strip_array_suffix(rest);
            if is_array {
                pointer_depth += 1;
            }
            sanitize_name(bare)
        });

        let ty = match self.resolve_base(&base) {
            Some(base) => CanonicalType::new(base).with_pointer_depth(pointer_depth),
            None => {
                if self.table.note_unknown_type(&base) {
                    log::warn!("Unknown type: {base}");
                }
                CanonicalType::pointer_sized()
            }
        };

        (ty, name)
    }

    fn resolve_base(&self, base: &str) -> Option<BaseType> {
        match self.table.kind_of(base) {
            Some(SymbolKind::Callback) if self.decay_callbacks => {
                return Some(BaseType::Scalar(Scalar::POINTER_SIZED));
            }
            Some(SymbolKind::Opaque | SymbolKind::Callback | SymbolKind::Struct) => {
                return Some(BaseType::Named(base.to_string()));
            }
            _ => {}
        }

        primitive(base)
            .or_else(|| self.table.aliases().get(base).copied())
            .map(BaseType::Scalar)
    }
}
