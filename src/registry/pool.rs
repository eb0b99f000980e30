//! Global constant and command pool
//!
//! Every enumerant and command in the registry is resolved once, before any
//! feature is built. Commands go through the same prototype recognizer and
//! type resolver as header lines, by synthesizing a `RET NAME(ARGS);` line.
//! Enumerants and commands are independent, so the two halves are built on
//! separate threads.

use crate::literals;
use crate::parser::parse::LineParser;
use crate::parser::scanner::build_signature;
use crate::registry::document::{RawCommand, RawEnum, RegistryDocument};
use crate::resolve::TypeResolver;
use crate::symbols::{AliasMap, Constant, Function, SymbolTable};
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::thread;

#[derive(Debug, Default)]
pub struct GlobalPool {
    constants: FxHashMap<String, Constant>,
    functions: FxHashMap<String, Function>,
    /// Unknown raw type names per command, for commands that used any
    function_unknowns: FxHashMap<String, Vec<String>>,
    unknown_types: Vec<String>,
}

impl GlobalPool {
    pub fn build(doc: &RegistryDocument, aliases: &AliasMap) -> Self {
        let (constants, (functions, function_unknowns)) = thread::scope(|s| {
            let constants = s.spawn(|| resolve_enums(&doc.enums));
            let functions = resolve_commands(&doc.commands, aliases);
            let constants = constants
                .join()
                .unwrap_or_else(|p| std::panic::resume_unwind(p));
            (constants, functions)
        });

        let unknown_types = function_unknowns
            .values()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        log::debug!(
            "Pool: {} constants, {} functions",
            constants.len(),
            functions.len()
        );
        GlobalPool {
            constants,
            functions,
            function_unknowns,
            unknown_types,
        }
    }

    pub fn constant(&self, name: &str) -> Option<&Constant> {
        self.constants.get(name)
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn constant_count(&self) -> usize {
        self.constants.len()
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Raw type names the commands used that nothing resolved, sorted
    pub fn unknown_types(&self) -> &[String] {
        &self.unknown_types
    }

    /// Unknown raw type names in one command's signature, sorted
    pub fn function_unknown_types(&self, name: &str) -> &[String] {
        self.function_unknowns
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

fn resolve_enums(enums: &[RawEnum]) -> FxHashMap<String, Constant> {
    let mut constants = FxHashMap::default();
    for raw in enums {
        if constants.contains_key(&raw.name) {
            log::trace!("Enumerant '{}' listed again, keeping the first", raw.name);
            continue;
        }
        match literals::classify(&raw.value) {
            Some((const_type, value)) => {
                constants.insert(
                    raw.name.clone(),
                    Constant {
                        name: raw.name.clone(),
                        value,
                        const_type,
                    },
                );
            }
            None => log::trace!("Enumerant '{}' has no literal value", raw.name),
        }
    }
    constants
}

type ResolvedCommands = (FxHashMap<String, Function>, FxHashMap<String, Vec<String>>);

fn resolve_commands(commands: &[RawCommand], aliases: &AliasMap) -> ResolvedCommands {
    let table = SymbolTable::with_aliases(aliases.clone());
    let resolver = TypeResolver::new(&table);
    let mut functions = FxHashMap::default();
    let mut unknowns = FxHashMap::default();

    for command in commands {
        if functions.contains_key(&command.name) {
            log::trace!("Command '{}' listed again, keeping the first", command.name);
            continue;
        }
        let prototype = command.prototype();
        let raw = LineParser::new(&prototype, 1).and_then(|mut parser| parser.parse_prototype());
        match raw {
            Ok(raw) => {
                let signature = build_signature(&resolver, &raw);
                // Drained per command so each one keeps its own list
                let unknown = table.take_unknown_types();
                if !unknown.is_empty() {
                    unknowns.insert(raw.name.clone(), unknown);
                }
                functions.insert(
                    raw.name.clone(),
                    Function {
                        name: raw.name,
                        signature,
                    },
                );
            }
            Err(err) => log::warn!("Command '{}' not understood: {err}", command.name),
        }
    }

    (functions, unknowns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{CanonicalType, Scalar};

    fn command(ret: &str, name: &str, params: &[(&str, &str)]) -> RawCommand {
        RawCommand {
            name: name.to_string(),
            return_type: ret.to_string(),
            params: params
                .iter()
                .map(|(t, n)| (t.to_string(), n.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_pool_resolves_commands_with_aliases() {
        let doc = RegistryDocument {
            commands: vec![
                command("void", "glBindTexture", &[("GLenum", "target"), ("GLuint", "texture")]),
                command("const GLubyte *", "glGetString", &[("GLenum", "name")]),
                command("void", "glFrob", &[("Frobnicator", "f"), ("Frobnicator", "g")]),
            ],
            ..RegistryDocument::default()
        };
        let mut aliases = AliasMap::default();
        aliases.insert("GLenum".to_string(), Scalar::U32);
        aliases.insert("GLuint".to_string(), Scalar::U32);
        aliases.insert("GLubyte".to_string(), Scalar::U8);

        let pool = GlobalPool::build(&doc, &aliases);
        let bind = pool.function("glBindTexture").unwrap();
        assert_eq!(bind.signature.params[1].param_type, CanonicalType::scalar(Scalar::U32));
        let get = pool.function("glGetString").unwrap();
        assert_eq!(get.signature.return_type, CanonicalType::scalar(Scalar::U8).with_pointer());
        assert_eq!(pool.unknown_types(), ["Frobnicator".to_string()]);
        assert_eq!(pool.function_unknown_types("glFrob"), ["Frobnicator".to_string()]);
        assert!(pool.function_unknown_types("glBindTexture").is_empty());
    }

    #[test]
    fn test_shared_unknown_type_kept_per_command() {
        let doc = RegistryDocument {
            commands: vec![
                command("void", "glFrobA", &[("Frobnicator", "f")]),
                command("Widget *", "glFrobB", &[("Frobnicator", "f")]),
            ],
            ..RegistryDocument::default()
        };
        let pool = GlobalPool::build(&doc, &AliasMap::default());
        assert_eq!(pool.function_unknown_types("glFrobA"), ["Frobnicator".to_string()]);
        assert_eq!(
            pool.function_unknown_types("glFrobB"),
            ["Frobnicator".to_string(), "Widget".to_string()]
        );
        assert_eq!(
            pool.unknown_types(),
            ["Frobnicator".to_string(), "Widget".to_string()]
        );
    }

    #[test]
    fn test_duplicate_enumerants_first_wins() {
        let doc = RegistryDocument {
            enums: vec![
                RawEnum {
                    name: "GL_INVALID_INDEX".to_string(),
                    value: "0xFFFFFFFFu".to_string(),
                },
                RawEnum {
                    name: "GL_INVALID_INDEX".to_string(),
                    value: "1".to_string(),
                },
                RawEnum {
                    name: "GL_EXPR".to_string(),
                    value: "GL_A|GL_B".to_string(),
                },
            ],
            ..RegistryDocument::default()
        };
        let pool = GlobalPool::build(&doc, &AliasMap::default());
        let c = pool.constant("GL_INVALID_INDEX").unwrap();
        assert_eq!(c.value, "0xFFFFFFFF");
        assert_eq!(c.const_type, CanonicalType::scalar(Scalar::U32));
        assert!(pool.constant("GL_EXPR").is_none());
        assert_eq!(pool.constant_count(), 1);
    }
}
