//! Registry XML reading
//!
//! Pulls the parts of an API registry the builder needs into owned data so
//! that nothing downstream borrows the XML tree:
//!
//! ```xml
//! <registry>
//!   <enums><enum name="GL_TRUE" value="1"/></enums>
//!   <commands>
//!     <command>
//!       <proto>void <name>glClear</name></proto>
//!       <param><ptype>GLbitfield</ptype> <name>mask</name></param>
//!     </command>
//!   </commands>
//!   <feature api="gl" name="GL_VERSION_1_0">
//!     <require><enum name="GL_TRUE"/><command name="glClear"/></require>
//!   </feature>
//!   <extensions>
//!     <extension name="GL_ARB_example" supported="gl|glcore">...</extension>
//!   </extensions>
//! </registry>
//! ```

use crate::errors::ScanError;
use roxmltree::{Document, Node};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct RawEnum {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawCommand {
    pub name: String,
    pub return_type: String,
    /// `(type text, name)` pairs in declaration order
    pub params: Vec<(String, String)>,
}

impl RawCommand {
    /// The command as a C prototype line, `RET NAME(TYPE NAME, ...);`
    pub fn prototype(&self) -> String {
        let params = self
            .params
            .iter()
            .map(|(ty, name)| format!("{ty} {name}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} {}({});", self.return_type, self.name, params)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Feature,
    Extension,
}

/// A `<feature>` or `<extension>` with the names its require blocks list
#[derive(Debug, Clone, PartialEq)]
pub struct RawFeature {
    pub name: String,
    pub kind: FeatureKind,
    /// Targets an embedded (ES) profile
    pub embedded: bool,
    pub enums: Vec<String>,
    pub commands: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RegistryDocument {
    pub enums: Vec<RawEnum>,
    pub commands: Vec<RawCommand>,
    /// Features and extensions in document order
    pub features: Vec<RawFeature>,
}

impl RegistryDocument {
    pub fn parse(xml: &str) -> Result<Self, ScanError> {
        let doc = Document::parse(xml)?;
        let mut registry = RegistryDocument::default();

        for node in doc.descendants().filter(Node::is_element) {
            match node.tag_name().name() {
                "enums" => registry.enums.extend(children(node, "enum").filter_map(read_enum)),
                "commands" => registry
                    .commands
                    .extend(children(node, "command").filter_map(read_command)),
                "feature" => registry.features.push(read_feature(node, FeatureKind::Feature)?),
                "extension" => registry
                    .features
                    .push(read_feature(node, FeatureKind::Extension)?),
                _ => {}
            }
        }

        log::debug!(
            "Registry: {} enums, {} commands, {} features",
            registry.enums.len(),
            registry.commands.len(),
            registry.features.len()
        );
        Ok(registry)
    }
}

fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && child.has_tag_name(tag))
}

fn attribute(node: Node, name: &str) -> Option<String> {
    node.attribute(name).map(|value| value.trim().to_string())
}

fn read_enum(node: Node) -> Option<RawEnum> {
    Some(RawEnum {
        name: attribute(node, "name")?,
        value: attribute(node, "value")?,
    })
}

fn read_command(node: Node) -> Option<RawCommand> {
    let proto = children(node, "proto").next()?;
    let name = name_text(proto)?;
    let params = children(node, "param")
        .filter_map(|param| Some((type_text(param), name_text(param)?)))
        .collect();
    Some(RawCommand {
        name,
        return_type: type_text(proto),
        params,
    })
}

fn name_text(node: Node) -> Option<String> {
    let name = children(node, "name").next()?;
    Some(all_text(name).trim().to_string())
}

/// All text of `node` except its `<name>` child, e.g. `const <ptype>GLubyte</ptype> *`
fn type_text(node: Node) -> String {
    node.children()
        .filter(|child| !child.has_tag_name("name"))
        .map(all_text)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Concatenated text nodes under `node`; element nodes carry no text of their own
fn all_text(node: Node) -> String {
    node.descendants()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect()
}

fn read_feature(node: Node, kind: FeatureKind) -> Result<RawFeature, ScanError> {
    let name = attribute(node, "name").ok_or_else(|| ScanError::MissingAttribute {
        element: node.tag_name().name().to_string(),
        attribute: "name",
    })?;

    let embedded = match kind {
        FeatureKind::Feature => node.attribute("api").is_some_and(|api| api.contains("gles")),
        FeatureKind::Extension => {
            let supported = node.attribute("supported").unwrap_or_default();
            !supported.split('|').any(|api| api == "gl" || api == "glcore")
        }
    };

    let mut enums = Vec::new();
    let mut commands = Vec::new();
    for require in children(node, "require") {
        enums.extend(children(require, "enum").filter_map(|n| attribute(n, "name")));
        commands.extend(children(require, "command").filter_map(|n| attribute(n, "name")));
    }

    Ok(RawFeature {
        name,
        kind,
        embedded,
        enums,
        commands,
    })
}
