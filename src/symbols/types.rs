//! Resolved symbol definitions
//!
//! Everything in this module is plain, serializable data: names,
//! [`CanonicalType`]s and ordered name → type lists. A user-defined type is
//! referenced by its name only ([`BaseType::Named`]), never by pointer, so
//! self-referential and mutually-referential structs and callbacks never form
//! a cyclic object graph.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed canonical scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scalar {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    Isize, // platform pointer width, signed
    Usize, // platform pointer width, unsigned
    F32,
    F64,
    Void,
    Bool,
}

impl Scalar {
    /// The type used for opaque handles, decayed callbacks and unknown types.
    pub const POINTER_SIZED: Scalar = Scalar::Isize;

    const ALL: [Scalar; 14] = [
        Scalar::I8,
        Scalar::U8,
        Scalar::I16,
        Scalar::U16,
        Scalar::I32,
        Scalar::U32,
        Scalar::I64,
        Scalar::U64,
        Scalar::Isize,
        Scalar::Usize,
        Scalar::F32,
        Scalar::F64,
        Scalar::Void,
        Scalar::Bool,
    ];

    /// Canonical spelling of the scalar
    pub fn name(self) -> &'static str {
        match self {
            Scalar::I8 => "i8",
            Scalar::U8 => "u8",
            Scalar::I16 => "i16",
            Scalar::U16 => "u16",
            Scalar::I32 => "i32",
            Scalar::U32 => "u32",
            Scalar::I64 => "i64",
            Scalar::U64 => "u64",
            Scalar::Isize => "isize",
            Scalar::Usize => "usize",
            Scalar::F32 => "f32",
            Scalar::F64 => "f64",
            Scalar::Void => "void",
            Scalar::Bool => "bool",
        }
    }

    /// Look up a scalar by its canonical spelling.
    pub fn from_canonical(name: &str) -> Option<Scalar> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Width in bits for the fixed-width integer kinds.
    pub fn integer_bits(self) -> Option<u32> {
        match self {
            Scalar::I8 | Scalar::U8 => Some(8),
            Scalar::I16 | Scalar::U16 => Some(16),
            Scalar::I32 | Scalar::U32 => Some(32),
            Scalar::I64 | Scalar::U64 => Some(64),
            _ => None,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, Scalar::F32 | Scalar::F64)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Base of a canonical type: a fixed scalar or a user type known by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum BaseType {
    Scalar(Scalar),
    Named(String), // struct, opaque alias or callback name
}

impl BaseType {
    pub fn name(&self) -> &str {
        match self {
            BaseType::Scalar(s) => s.name(),
            BaseType::Named(n) => n,
        }
    }
}

/// Target-agnostic type descriptor produced by the type resolver
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CanonicalType {
    pub base: BaseType,
    pub pointer_depth: usize, // 0 = not pointer, 1 = *, 2 = **, etc.
}

impl CanonicalType {
    pub fn new(base: BaseType) -> Self {
        CanonicalType {
            base,
            pointer_depth: 0,
        }
    }

    pub fn scalar(scalar: Scalar) -> Self {
        Self::new(BaseType::Scalar(scalar))
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::new(BaseType::Named(name.into()))
    }

    pub fn pointer_sized() -> Self {
        Self::scalar(Scalar::POINTER_SIZED)
    }

    pub fn with_pointer(mut self) -> Self {
        self.pointer_depth += 1;
        self
    }

    pub fn with_pointer_depth(mut self, depth: usize) -> Self {
        self.pointer_depth = depth;
        self
    }

    pub fn as_scalar(&self) -> Option<Scalar> {
        match self.base {
            BaseType::Scalar(s) => Some(s),
            BaseType::Named(_) => None,
        }
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base.name(), "*".repeat(self.pointer_depth))
    }
}

/// A `#define` or registry enumerant with a literal value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constant {
    pub name: String,
    /// Canonicalized literal text (hex re-rendered, float passed through)
    pub value: String,
    #[serde(rename = "type")]
    pub const_type: CanonicalType,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: CanonicalType,
}

/// Struct field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: CanonicalType,
}

/// Return type plus ordered, uniquely named parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionSignature {
    pub return_type: CanonicalType,
    pub params: Vec<Param>,
}

impl FunctionSignature {
    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }
}

/// A `typedef`: an opaque pointer-sized alias, or a callback when it has a signature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Definition {
    pub name: String,
    pub callback: Option<FunctionSignature>,
}

impl Definition {
    pub fn opaque(name: impl Into<String>) -> Self {
        Definition {
            name: name.into(),
            callback: None,
        }
    }

    pub fn is_callback(&self) -> bool {
        self.callback.is_some()
    }
}

/// Struct definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Struct {
    pub name: String,
    pub fields: Vec<Field>,
}

impl Struct {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Function prototype
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Function {
    pub name: String,
    pub signature: FunctionSignature,
}

/// Category a registered name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Constant,
    Opaque,
    Callback,
    Struct,
    Function,
}

impl SymbolKind {
    /// Whether a name of this kind can appear as a type
    pub fn is_type(self) -> bool {
        matches!(self, SymbolKind::Opaque | SymbolKind::Callback | SymbolKind::Struct)
    }
}

/// Make `name` unique among `taken`, appending a numeric suffix on collision.
///
/// Field and parameter lists keep every entry so that layouts and call
/// signatures stay intact; a repeated name gets `name1`, `name2`, ...
pub(crate) fn unique_member_name<'a>(
    taken: impl Iterator<Item = &'a str> + Clone,
    name: String,
) -> String {
    if !taken.clone().any(|t| t == name) {
        return name;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{name}{n}");
        if !taken.clone().any(|t| t == candidate) {
            log::warn!("Duplicate member name '{name}', renamed to '{candidate}'");
            return candidate;
        }
        n += 1;
    }
}
