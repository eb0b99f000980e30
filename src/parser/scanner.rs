//! Declaration scanner
//!
//! Runs every recognizer over a normalized header and writes the results
//! into a shared [`SymbolTable`]. Passes run in three stages:
//!
//! ```text
//! stage 1   constants   ||   opaque aliases -> struct-name pre-pass
//!           ---------------- barrier ----------------
//! stage 2   callbacks
//!           ---------------- barrier ----------------
//! stage 3   struct bodies   ||   function prototypes
//! ```
//!
//! Struct names must all be reserved before anything that can mention a
//! struct is resolved, and callbacks must be known before struct fields
//! decide whether to decay them. Constants depend on nothing.
//!
//! A line that no recognizer accepts is skipped. Lines inside a struct body
//! are only ever seen by the struct pass.

use crate::config::ScanConfig;
use crate::errors::ScanError;
use crate::literals;
use crate::parser::aggregates::{collect_spans, AggregateNames, AggregateSpan};
use crate::parser::declarations::{RawDeclarator, RawSignature};
use crate::parser::normalize::{normalize_source, SourceLine};
use crate::parser::parse::{LineParser, ParseError};
use crate::resolve::{sanitize_name, TypeResolver};
use crate::symbols::types::unique_member_name;
use crate::symbols::{
    CanonicalType, Constant, Definition, Field, Function, FunctionSignature, Param, Scalar,
    Struct, SymbolTable,
};
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use std::thread;

/// Switches that change how recognized declarations are turned into symbols
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    pub decay_callback_fields: bool,
    pub best_effort_macros: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            decay_callback_fields: true,
            best_effort_macros: false,
        }
    }
}

impl From<&ScanConfig> for ScanOptions {
    fn from(config: &ScanConfig) -> Self {
        ScanOptions {
            decay_callback_fields: config.decay_callback_fields,
            best_effort_macros: config.best_effort_macros,
        }
    }
}

pub struct Scanner<'t> {
    table: &'t SymbolTable,
    lines: Vec<SourceLine>,
    spans: Vec<AggregateSpan>,
    /// Per normalized line: whether it belongs to a struct body
    in_span: Vec<bool>,
    /// Names the pre-pass registered provisionally
    reserved: Mutex<FxHashSet<String>>,
    options: ScanOptions,
}

impl<'t> Scanner<'t> {
    /// Prepare a scan; fails if a struct body is never closed.
    pub fn new(
        table: &'t SymbolTable,
        lines: Vec<SourceLine>,
        options: ScanOptions,
    ) -> Result<Self, ScanError> {
        let spans = collect_spans(&lines)?;
        let mut in_span = vec![false; lines.len()];
        for span in &spans {
            in_span[span.lines.clone()].fill(true);
        }
        Ok(Scanner {
            table,
            lines,
            spans,
            in_span,
            reserved: Mutex::default(),
            options,
        })
    }

    /// Run all passes in their staged order.
    pub fn run(&self) {
        log::debug!(
            "Scanning {} lines, {} struct bodies",
            self.lines.len(),
            self.spans.len()
        );

        thread::scope(|s| {
            let constants = s.spawn(|| self.scan_constants());
            let opaque = self.scan_opaque_aliases();
            let reserved = self.reserve_struct_names();
            let constants = constants
                .join()
                .unwrap_or_else(|p| std::panic::resume_unwind(p));
            log::debug!(
                "Stage 1: {constants} constants, {opaque} opaque aliases, {reserved} struct names"
            );
        });

        let callbacks = self.scan_callbacks();
        log::debug!("Stage 2: {callbacks} callbacks");

        thread::scope(|s| {
            let structs = s.spawn(|| self.scan_structs());
            let functions = self.scan_functions();
            let structs = structs.join().unwrap_or_else(|p| std::panic::resume_unwind(p));
            log::debug!("Stage 3: {structs} structs, {functions} functions");
        });
    }

    /// Lines outside struct bodies, each with a fresh recognizer
    fn single_lines(&self) -> impl Iterator<Item = (&SourceLine, LineParser)> + '_ {
        self.lines
            .iter()
            .zip(&self.in_span)
            .filter(|(_, in_span)| !**in_span)
            .filter_map(|(line, _)| match LineParser::new(&line.text, line.number) {
                Ok(parser) => Some((line, parser)),
                Err(err) => {
                    log::trace!("{err}");
                    None
                }
            })
    }

    fn resolver(&self) -> TypeResolver<'t> {
        TypeResolver::new(self.table)
    }

    // ===== Passes =====

    pub fn scan_constants(&self) -> usize {
        let mut count = 0;
        for (line, mut parser) in self.single_lines() {
            let Ok(raw) = parser.parse_define() else {
                continue;
            };
            let constant = match literals::classify(&raw.value) {
                Some((const_type, value)) => Constant {
                    name: raw.name,
                    value,
                    const_type,
                },
                None if self.options.best_effort_macros
                    && literals::is_flag_expression(&raw.value) =>
                {
                    Constant {
                        name: raw.name,
                        value: raw.value,
                        const_type: CanonicalType::scalar(Scalar::I32),
                    }
                }
                None => {
                    log::trace!("Line {}: macro '{}' has no literal value", line.number, raw.name);
                    continue;
                }
            };
            if self.table.add_constant(constant) {
                count += 1;
            }
        }
        count
    }

    pub fn scan_opaque_aliases(&self) -> usize {
        self.single_lines()
            .filter_map(|(_, mut parser)| parser.parse_opaque_alias().ok())
            .filter(|name| self.table.add_definition(Definition::opaque(name.as_str())))
            .count()
    }

    /// Name-only pre-pass over struct bodies.
    ///
    /// A typedef alias that differs from the tag is reserved the same way and
    /// stays an opaque definition once the body is parsed.
    pub fn reserve_struct_names(&self) -> usize {
        let mut count = 0;
        for span in &self.spans {
            let names = match aggregate_names(span) {
                Ok(names) => names,
                Err(err) => {
                    log::trace!("{err}");
                    continue;
                }
            };
            for name in std::iter::once(names.name).chain(names.alias) {
                if self.table.reserve_struct_name(&name) {
                    self.reserved.lock().insert(name);
                    count += 1;
                }
            }
        }
        count
    }

    /// Undo the pre-pass reservations of a body that failed to parse.
    fn release_reserved_names(&self, span: &AggregateSpan) {
        let Ok(names) = aggregate_names(span) else {
            return;
        };
        let mut reserved = self.reserved.lock();
        for name in std::iter::once(names.name).chain(names.alias) {
            if reserved.remove(&name) && self.table.release_struct_name(&name) {
                log::debug!("Released provisional struct name '{name}'");
            }
        }
    }

    pub fn scan_callbacks(&self) -> usize {
        let mut count = 0;
        for (_, mut parser) in self.single_lines() {
            let Ok(raw) = parser.parse_callback_typedef() else {
                continue;
            };
            let definition = Definition {
                name: raw.name.clone(),
                callback: Some(self.signature(&raw)),
            };
            if self.table.add_definition(definition) {
                count += 1;
            }
        }
        count
    }

    pub fn scan_structs(&self) -> usize {
        let resolver = self.resolver().decaying_callbacks(self.options.decay_callback_fields);
        let mut count = 0;

        for span in &self.spans {
            let parsed = LineParser::new(&span.text, span.start_line)
                .and_then(|mut parser| parser.parse_aggregate());
            let (AggregateNames { name, .. }, members) = match parsed {
                Ok(parsed) => parsed,
                Err(err) => {
                    log::warn!("Struct body skipped: {err}");
                    self.release_reserved_names(span);
                    continue;
                }
            };

            let mut fields: Vec<Field> = Vec::with_capacity(members.len());
            for member in &members {
                let (field_type, field_name) = convert_declarator(&resolver, member);
                let Some(field_name) = field_name else {
                    log::trace!("Struct '{name}': unnamed member '{}' skipped", member.raw_type);
                    continue;
                };
                let field_name =
                    unique_member_name(fields.iter().map(|f| f.name.as_str()), field_name);
                fields.push(Field {
                    name: field_name,
                    field_type,
                });
            }

            if self.table.add_struct(Struct { name, fields }) {
                count += 1;
            }
        }
        count
    }

    pub fn scan_functions(&self) -> usize {
        let mut count = 0;
        for (_, mut parser) in self.single_lines() {
            let Ok(raw) = parser.parse_prototype() else {
                continue;
            };
            let function = Function {
                name: raw.name.clone(),
                signature: self.signature(&raw),
            };
            if self.table.add_function(function) {
                count += 1;
            }
        }
        count
    }

    fn signature(&self, raw: &RawSignature) -> FunctionSignature {
        build_signature(&self.resolver(), raw)
    }
}

fn aggregate_names(span: &AggregateSpan) -> Result<AggregateNames, ParseError> {
    LineParser::new(&span.text, span.start_line)
        .and_then(|mut parser| parser.parse_aggregate_names())
}

/// Resolve a raw signature; unnamed parameters become `arg0`, `arg1`, ...
pub(crate) fn build_signature(resolver: &TypeResolver, raw: &RawSignature) -> FunctionSignature {
    let (return_type, _) = resolver.convert(&raw.return_type, None);
    let mut params: Vec<Param> = Vec::with_capacity(raw.params.len());
    for (index, declarator) in raw.params.iter().enumerate() {
        let (param_type, name) = convert_declarator(resolver, declarator);
        let name = name.unwrap_or_else(|| format!("arg{index}"));
        let name = unique_member_name(params.iter().map(|p| p.name.as_str()), name);
        params.push(Param { name, param_type });
    }
    FunctionSignature {
        return_type,
        params,
    }
}

/// Function-pointer declarators are stored as plain pointer-sized values.
fn convert_declarator(
    resolver: &TypeResolver,
    declarator: &RawDeclarator,
) -> (CanonicalType, Option<String>) {
    if declarator.is_fn_pointer {
        let name = declarator.raw_name.as_deref().map(sanitize_name);
        return (CanonicalType::pointer_sized(), name);
    }
    resolver.convert(&declarator.raw_type, declarator.raw_name.as_deref())
}

/// Normalize and scan a whole header into a new table.
pub fn scan_header(source: &str, config: &ScanConfig) -> Result<SymbolTable, ScanError> {
    let table = SymbolTable::with_aliases(config.alias_map());
    let lines = normalize_source(source, &config.noise_tokens);
    Scanner::new(&table, lines, ScanOptions::from(config))?.run();
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolKind;

    fn scan(source: &str) -> SymbolTable {
        scan_header(source, &ScanConfig::default()).unwrap()
    }

    #[test]
    fn test_constants_pass() {
        let table = scan("#define A 0x1\n#define B -1\n#define C (A | B)\n#define D 1.5f");
        assert_eq!(table.constant("A").unwrap().value, "0x00000001");
        assert_eq!(table.constant("B").unwrap().value, "-1");
        assert!(table.constant("C").is_none());
        assert_eq!(
            table.constant("D").unwrap().const_type,
            CanonicalType::scalar(Scalar::F32)
        );
    }

    #[test]
    fn test_best_effort_macros() {
        let config = ScanConfig {
            best_effort_macros: true,
            ..ScanConfig::default()
        };
        let table = scan_header("#define C (A | B)\n#define E (A + 1)", &config).unwrap();
        let c = table.constant("C").unwrap();
        assert_eq!(c.value, "(A | B)");
        assert_eq!(c.const_type, CanonicalType::scalar(Scalar::I32));
        assert!(table.constant("E").is_none());
    }

    #[test]
    fn test_callback_and_unnamed_params() {
        let table = scan("typedef void (*PFNPROC)(int, const char*, int);");
        let def = table.definition("PFNPROC").unwrap();
        let sig = def.callback.unwrap();
        let names: Vec<_> = sig.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["arg0", "arg1", "arg2"]);
        assert_eq!(sig.return_type, CanonicalType::scalar(Scalar::Void));
    }

    #[test]
    fn test_struct_fields_decay_callbacks() {
        let table = scan(
            "typedef void (*freefun)(void* ptr);\nstruct Allocator {\n  freefun free;\n  void* (*allocate)(size_t size);\n  int x, x;\n};\nvoid use(freefun f, struct Allocator* a);",
        );
        let s = table.struct_def("Allocator").unwrap();
        assert_eq!(s.field("free").unwrap().field_type, CanonicalType::pointer_sized());
        assert_eq!(s.field("allocate").unwrap().field_type, CanonicalType::pointer_sized());
        assert!(s.field("x").is_some());
        assert!(s.field("x1").is_some());

        let f = table.function("use").unwrap();
        assert_eq!(f.signature.params[0].param_type, CanonicalType::named("freefun"));
        assert_eq!(
            f.signature.params[1].param_type,
            CanonicalType::named("Allocator").with_pointer()
        );
    }

    #[test]
    fn test_struct_lines_not_seen_by_line_passes() {
        let table = scan("struct Holder {\n  int (*make)(void);\n};");
        assert!(table.functions().is_empty());
        assert_eq!(table.kind_of("Holder"), Some(SymbolKind::Struct));
    }

    #[test]
    fn test_typedef_alias_of_tagged_struct_resolves() {
        let table =
            scan("typedef struct _Foo {\n  int x;\n} Foo;\nvoid use(Foo* foo, struct _Foo* raw);");
        assert_eq!(table.kind_of("_Foo"), Some(SymbolKind::Struct));
        assert_eq!(table.kind_of("Foo"), Some(SymbolKind::Opaque));

        let f = table.function("use").unwrap();
        assert_eq!(f.signature.params[0].param_type, CanonicalType::named("Foo").with_pointer());
        assert_eq!(f.signature.params[1].param_type, CanonicalType::named("_Foo").with_pointer());
        assert!(table.unknown_types().is_empty());
    }

    #[test]
    fn test_pointer_handles_and_variadics() {
        let table = scan(
            "typedef struct VkInstance_T* VkInstance;\nint logf(VkInstance instance, const char* fmt, ...);",
        );
        assert_eq!(table.kind_of("VkInstance"), Some(SymbolKind::Opaque));
        let logf = table.function("logf").unwrap();
        assert_eq!(logf.signature.params.len(), 2);
        assert_eq!(logf.signature.params[0].param_type, CanonicalType::named("VkInstance"));
        assert!(table.unknown_types().is_empty());
    }

    #[test]
    fn test_failed_body_drops_reserved_name() {
        let table = scan(
            "struct A { int a; }; struct B { int b; };\ntypedef struct C C;\nstruct C { int c; } extra junk;",
        );
        assert!(table.structs().is_empty());
        assert_eq!(table.kind_of("A"), None);
        assert!(table.definition("A").is_none());
        // Declared by its own opaque typedef, so it stays
        assert_eq!(table.kind_of("C"), Some(SymbolKind::Opaque));
    }

    #[test]
    fn test_unterminated_struct_is_fatal() {
        let result = scan_header("struct Foo {\n  int x;", &ScanConfig::default());
        assert!(matches!(
            result,
            Err(ScanError::UnterminatedAggregate { line: 1 })
        ));
    }
}
