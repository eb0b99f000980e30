//! Single-line declaration recognizers
//!
//! This module recognizes the one-line declaration shapes:
//!
//! - Macro constants: `#define NAME VALUE`
//! - Opaque aliases: `typedef struct TAG NAME;`
//! - Callback typedefs: `typedef RET (*NAME)(ARGS);`
//! - Function prototypes: `RET NAME(ARGS);`
//!
//! # Grammar
//!
//! ```text
//! define     ::= "#define" identifier value
//! opaque     ::= "typedef" "struct" identifier "*"* identifier ";"
//! callback   ::= "typedef" type "(" "*" identifier ")" "(" params ")" ";"
//! prototype  ::= storage* type identifier "(" params ")" ";"
//! params     ::= "void" | param ("," param)* ["," "..."]
//! param      ::= type [identifier array*] | type "(" "*" identifier ")" "(" ... ")"
//! ```
//!
//! Recognizers only extract raw text; type resolution happens in the scanner.

use crate::parser::lexer::Token;
use crate::parser::parse::{spell, LineParser, ParseError};

/// Storage-class words ignored in front of a prototype
const STORAGE_WORDS: &[&str] = &["extern", "static", "inline", "__inline"];

/// Words that only ever spell a type, never a declarator name
const TYPE_WORDS: &[&str] = &[
    "void", "char", "short", "int", "long", "float", "double", "signed", "unsigned", "_Bool",
    "bool",
];

/// A `#define` with a non-empty value
#[derive(Debug, Clone, PartialEq)]
pub struct RawMacro {
    pub name: String,
    pub value: String,
}

/// One parameter or field before type resolution
#[derive(Debug, Clone, PartialEq)]
pub struct RawDeclarator {
    pub raw_type: String,
    /// Declarator name with any array suffix, e.g. `name[4]`
    pub raw_name: Option<String>,
    /// Function-pointer declarator such as `void (*cb)(int)`
    pub is_fn_pointer: bool,
}

/// `RET NAME(ARGS)` shared by callbacks and prototypes
#[derive(Debug, Clone, PartialEq)]
pub struct RawSignature {
    pub name: String,
    pub return_type: String,
    pub params: Vec<RawDeclarator>,
}

impl LineParser {
    /// Parse `#define NAME VALUE`; function-like macros do not match.
    pub(crate) fn parse_define(&mut self) -> Result<RawMacro, ParseError> {
        match self.peek() {
            Token::Directive(d, _) if d == "define" => {
                self.advance();
            }
            _ => return self.mismatch("Expected '#define'"),
        }

        let name_loc = self.current_location();
        let name = self.expect_identifier()?;

        // `#define F(x)` has no space between the name and '('
        if let Token::LParen(loc) = self.peek() {
            if loc.line == name_loc.line && loc.column == name_loc.column + name.chars().count() {
                return self.mismatch("Function-like macro");
            }
        }

        if self.is_at_end() {
            return self.mismatch("Expected macro value");
        }

        let value = self.rest_of_line();
        Ok(RawMacro { name, value })
    }

    /// Parse `typedef struct TAG NAME;` or `typedef struct TAG* NAME;`, returning `NAME`.
    pub(crate) fn parse_opaque_alias(&mut self) -> Result<String, ParseError> {
        self.expect_token(&Token::Typedef(self.current_location()), "Expected 'typedef'")?;
        self.expect_token(&Token::Struct(self.current_location()), "Expected 'struct'")?;
        self.expect_identifier()?;
        while self.match_token(&Token::Star(self.current_location())) {}
        let name = self.expect_identifier()?;
        self.expect_semicolon("after opaque alias")?;
        self.expect_end("after opaque alias")?;
        Ok(name)
    }

    /// Parse `typedef RET (*NAME)(ARGS);`
    pub(crate) fn parse_callback_typedef(&mut self) -> Result<RawSignature, ParseError> {
        self.expect_token(&Token::Typedef(self.current_location()), "Expected 'typedef'")?;

        let ret = self.collect_until(&[Token::LParen(self.current_location())]);
        if !ret.iter().any(Token::is_word) {
            return self.mismatch("Expected callback return type");
        }

        self.expect_lparen("before callback name")?;
        self.expect_token(&Token::Star(self.current_location()), "Expected '*' in callback")?;
        let name = self.expect_identifier()?;
        self.expect_rparen("after callback name")?;

        self.expect_lparen("before callback parameters")?;
        let params = self.parse_parameter_list()?;
        self.expect_rparen("after callback parameters")?;
        self.expect_semicolon("after callback typedef")?;
        self.expect_end("after callback typedef")?;

        Ok(RawSignature {
            name,
            return_type: spell(&ret),
            params,
        })
    }

    /// Parse `RET NAME(ARGS);`
    pub(crate) fn parse_prototype(&mut self) -> Result<RawSignature, ParseError> {
        while matches!(self.peek(), Token::Ident(w, _) if STORAGE_WORDS.contains(&w.as_str())) {
            self.advance();
        }

        if !matches!(
            self.peek(),
            Token::Ident(_, _) | Token::Const(_) | Token::Volatile(_) | Token::Struct(_) | Token::Union(_)
        ) {
            return self.mismatch("Expected return type");
        }

        let mut head = self.collect_until(&[
            Token::LParen(self.current_location()),
            Token::Semicolon(self.current_location()),
        ]);
        let name = match head.pop() {
            Some(Token::Ident(name, _)) => name,
            _ => return self.mismatch("Expected function name"),
        };
        if head.iter().any(|t| !matches!(t, Token::Star(_)) && !t.is_word()) {
            return self.mismatch("Unexpected token in return type");
        }
        if !head.iter().any(Token::is_word) {
            return self.mismatch("Expected return type");
        }

        self.expect_lparen("after function name")?;
        let params = self.parse_parameter_list()?;
        self.expect_rparen("after parameters")?;
        self.expect_semicolon("after prototype")?;
        self.expect_end("after prototype")?;

        Ok(RawSignature {
            name,
            return_type: spell(&head),
            params,
        })
    }

    /// Parse parameter list contents up to (not including) the closing ')'.
    pub(crate) fn parse_parameter_list(&mut self) -> Result<Vec<RawDeclarator>, ParseError> {
        let mut params = Vec::new();

        if self.check(&Token::RParen(self.current_location())) {
            return Ok(params);
        }

        // Special case: (void) means no parameters in C
        if matches!(self.peek(), Token::Ident(s, _) if s == "void")
            && matches!(self.peek_ahead(1), Some(Token::RParen(_)))
        {
            self.advance();
            return Ok(params);
        }

        loop {
            // Variadic tail: the named parameters are kept
            if self.match_token(&Token::Ellipsis(self.current_location())) {
                break;
            }
            let group = self.collect_until(&[
                Token::Comma(self.current_location()),
                Token::RParen(self.current_location()),
            ]);
            match split_declarator(&group) {
                Some(param) => params.push(param),
                None => return self.mismatch("Expected parameter declaration"),
            }

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        Ok(params)
    }
}

/// Split a `TYPE NAME` token group into raw type and declarator text.
///
/// A group whose last word is a type keyword, or that ends in `*`, has no
/// declarator name (`int`, `const char*`). A nested parenthesized declarator
/// is a function pointer and only its name is kept.
pub(crate) fn split_declarator(group: &[Token]) -> Option<RawDeclarator> {
    if group.is_empty() {
        return None;
    }

    if let Some(open) = group.iter().position(|t| matches!(t, Token::LParen(_))) {
        let name = group[open..].iter().find_map(|t| match t {
            Token::Ident(name, _) => Some(name.clone()),
            _ => None,
        })?;
        return Some(RawDeclarator {
            raw_type: spell(&group[..open]),
            raw_name: Some(name),
            is_fn_pointer: true,
        });
    }

    // Peel array dimensions off the end: name[4][4]
    let mut end = group.len();
    while end > 0 && matches!(group[end - 1], Token::RBracket(_)) {
        let open = group[..end]
            .iter()
            .rposition(|t| matches!(t, Token::LBracket(_)))?;
        end = open;
    }
    let suffix = group[end..].iter().map(Token::lexeme).collect::<String>();

    if group[..end]
        .iter()
        .any(|t| !matches!(t, Token::Star(_)) && !t.is_word())
    {
        return None;
    }

    // Qualifiers are not counted: `const GLenum` is a type without a name
    let words = group[..end]
        .iter()
        .filter(|t| matches!(t, Token::Ident(_, _)))
        .count();
    let named = match group[..end].last() {
        Some(Token::Ident(last, _)) => words >= 2 && !TYPE_WORDS.contains(&last.as_str()),
        _ => false,
    };

    if named {
        let name = group[end - 1].lexeme();
        Some(RawDeclarator {
            raw_type: spell(&group[..end - 1]),
            raw_name: Some(format!("{name}{suffix}")),
            is_fn_pointer: false,
        })
    } else if suffix.is_empty() && words > 0 {
        Some(RawDeclarator {
            raw_type: spell(&group[..end]),
            raw_name: None,
            is_fn_pointer: false,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser(src: &str) -> LineParser {
        LineParser::new(src, 1).unwrap()
    }

    #[test]
    fn test_parse_define() {
        let m = parser("#define GLFW_VERSION_MAJOR 3").parse_define().unwrap();
        assert_eq!(m.name, "GLFW_VERSION_MAJOR");
        assert_eq!(m.value, "3");

        let m = parser("#define GL_ALL (GL_A | GL_B)").parse_define().unwrap();
        assert_eq!(m.value, "(GL_A | GL_B)");

        assert!(parser("#define GLFW_H").parse_define().is_err());
        assert!(parser("#define MAX(a, b) ((a) > (b))").parse_define().is_err());
        assert!(parser("#include <stdint.h>").parse_define().is_err());
    }

    #[test]
    fn test_parse_opaque_alias() {
        let name = parser("typedef struct GLFWmonitor GLFWmonitor;")
            .parse_opaque_alias()
            .unwrap();
        assert_eq!(name, "GLFWmonitor");
        assert!(parser("typedef struct GLFWimage").parse_opaque_alias().is_err());

        let name = parser("typedef struct VkInstance_T* VkInstance;")
            .parse_opaque_alias()
            .unwrap();
        assert_eq!(name, "VkInstance");
    }

    #[test]
    fn test_parse_callback() {
        let sig = parser("typedef void (* GLFWerrorfun)(int error_code, const char* description);")
            .parse_callback_typedef()
            .unwrap();
        assert_eq!(sig.name, "GLFWerrorfun");
        assert_eq!(sig.return_type, "void");
        assert_eq!(sig.params.len(), 2);
        assert_eq!(sig.params[1].raw_type, "const char *");
        assert_eq!(sig.params[1].raw_name.as_deref(), Some("description"));
    }

    #[test]
    fn test_parse_prototype() {
        let sig = parser("const char* glfwGetVersionString(void);")
            .parse_prototype()
            .unwrap();
        assert_eq!(sig.name, "glfwGetVersionString");
        assert_eq!(sig.return_type, "const char *");
        assert!(sig.params.is_empty());

        let sig = parser("extern void glfwSetGamma(GLFWmonitor* monitor, float gamma);")
            .parse_prototype()
            .unwrap();
        assert_eq!(sig.params.len(), 2);
        assert_eq!(sig.params[0].raw_type, "GLFWmonitor *");
    }

    #[test]
    fn test_variadic_prototype_keeps_named_params() {
        let sig = parser("int logf(const char* fmt, ...);").parse_prototype().unwrap();
        assert_eq!(sig.name, "logf");
        assert_eq!(sig.params.len(), 1);
        assert_eq!(sig.params[0].raw_name.as_deref(), Some("fmt"));

        let sig = parser("typedef void (*logfun)(int level, ...);")
            .parse_callback_typedef()
            .unwrap();
        assert_eq!(sig.params.len(), 1);
    }

    #[test]
    fn test_prototype_rejects_other_shapes() {
        assert!(parser("typedef void (*F)(int);").parse_prototype().is_err());
        assert!(parser("#define A 1").parse_prototype().is_err());
        assert!(parser("struct Foo {").parse_prototype().is_err());
        assert!(parser("int x = f(1);").parse_prototype().is_err());
        assert!(parser("glfwInit();").parse_prototype().is_err());
    }

    #[test]
    fn test_split_declarator_shapes() {
        let mut p = parser("unsigned int count, float m[4][4], char*, void (*cb)(int), const GLenum");
        let params = p.parse_parameter_list().unwrap();

        assert_eq!(params[0].raw_type, "unsigned int");
        assert_eq!(params[0].raw_name.as_deref(), Some("count"));
        assert_eq!(params[1].raw_name.as_deref(), Some("m[4][4]"));
        assert_eq!(params[2].raw_type, "char *");
        assert_eq!(params[2].raw_name, None);
        assert!(params[3].is_fn_pointer);
        assert_eq!(params[3].raw_name.as_deref(), Some("cb"));
        assert_eq!(params[4].raw_type, "const GLenum");
        assert_eq!(params[4].raw_name, None);
    }
}
