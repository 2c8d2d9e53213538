//! Blueprint analysis using tree-sitter.
//!
//! A blueprint is a TypeScript module whose actions are object literals such
//! as:
//!
//! ```typescript
//! {
//!   type: BlueprintActionType.CREATE_FILE,
//!   path: 'src/lib/db.ts',
//!   template: 'templates/db.ts.tpl',
//! }
//! ```
//!
//! The analyzer visits every object literal in the file, classifies the ones
//! with a recognized `type`, and records every `template` reference it sees.
//! Nothing is evaluated, so conditional actions count as if they always ran.

use std::path::Path;
use tree_sitter::{Node, Parser};

use crate::diagnostic::{GeneratorError, Span};
use crate::ir::{ModuleArtifacts, TemplateRef};

/// Blueprint action kinds that produce artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionKind {
    CreateFile,
    EnhanceFile,
    InstallPackages,
    AddEnvVar,
}

impl ActionKind {
    fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().replace('-', "_").as_str() {
            "CREATE_FILE" => Some(Self::CreateFile),
            "ENHANCE_FILE" => Some(Self::EnhanceFile),
            "INSTALL_PACKAGES" => Some(Self::InstallPackages),
            "ADD_ENV_VAR" => Some(Self::AddEnvVar),
            _ => None,
        }
    }
}

/// Facts extracted from one blueprint file.
#[derive(Debug, Clone, Default)]
pub struct BlueprintFacts {
    pub artifacts: ModuleArtifacts,
    pub templates: Vec<TemplateRef>,
    pub has_syntax_errors: bool,
}

/// Blueprint parser.
pub struct BlueprintParser {
    parser: Parser,
}

impl BlueprintParser {
    /// Creates a new blueprint parser.
    pub fn new() -> Result<Self, GeneratorError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            .map_err(|_| GeneratorError::ParserInitFailed)?;
        Ok(Self { parser })
    }

    /// Reads and analyzes a blueprint file.
    pub fn parse_file(&mut self, path: &Path) -> Result<BlueprintFacts, GeneratorError> {
        let source = std::fs::read_to_string(path).map_err(|e| GeneratorError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        self.parse(&source, path)
    }

    /// Analyzes blueprint source.
    pub fn parse(&mut self, source: &str, path: &Path) -> Result<BlueprintFacts, GeneratorError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| GeneratorError::ParseFailed { path: path.to_path_buf() })?;

        let root = tree.root_node();
        let mut visitor = Visitor::new(source, path);
        visitor.visit_tree(root);

        Ok(BlueprintFacts {
            artifacts: visitor.artifacts,
            templates: visitor.templates,
            has_syntax_errors: root.has_error(),
        })
    }
}

/// Walks the syntax tree collecting action literals.
struct Visitor<'a> {
    source: &'a str,
    path: &'a Path,
    artifacts: ModuleArtifacts,
    templates: Vec<TemplateRef>,
}

impl<'a> Visitor<'a> {
    fn new(source: &'a str, path: &'a Path) -> Self {
        Self {
            source,
            path,
            artifacts: ModuleArtifacts::default(),
            templates: Vec::new(),
        }
    }

    fn span(&self, node: Node) -> Span {
        Span::new(
            self.path.to_path_buf(),
            node.start_position().row,
            node.start_position().column,
            node.end_position().row,
            node.end_position().column,
        )
    }

    fn node_text(&self, node: Node) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// Pre-order walk so artifacts keep source order.
    fn visit_tree(&mut self, root: Node) {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.kind() == "object" {
                self.visit_object(node);
            }
            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }

    fn visit_object(&mut self, node: Node) {
        let mut props: Vec<(String, Node)> = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() != "pair" {
                continue;
            }
            let (Some(key), Some(value)) = (
                child.child_by_field_name("key"),
                child.child_by_field_name("value"),
            ) else {
                continue;
            };
            if let Some(name) = self.property_key(key) {
                props.push((name, value));
            }
        }

        let get = |name: &str| props.iter().find(|(k, _)| k == name).map(|(_, v)| *v);

        if let Some(template) = get("template") {
            if let Some(value) = self.static_string(template) {
                let span = self.span(template);
                self.templates.push(TemplateRef { template: value, span });
            }
        }

        let Some(kind) = get("type").and_then(|v| self.action_kind(v)) else {
            return;
        };

        match kind {
            ActionKind::CreateFile => {
                if let Some(path) = get("path").and_then(|v| self.string_like(v)) {
                    self.artifacts.add_create(path);
                }
            }
            ActionKind::EnhanceFile => {
                if let Some(path) = get("path").and_then(|v| self.string_like(v)) {
                    let modifier = get("modifier").and_then(|v| self.string_like(v));
                    self.artifacts.add_enhance(path, modifier);
                }
            }
            ActionKind::InstallPackages => {
                let packages = get("packages").map(|v| self.string_list(v)).unwrap_or_default();
                let is_dev = get("isDev").map(|v| v.kind() == "true").unwrap_or(false);
                self.artifacts.add_install(packages, is_dev);
            }
            ActionKind::AddEnvVar => {
                if let Some(key) = get("key").and_then(|v| self.string_like(v)) {
                    let value = get("value")
                        .map(|v| self.string_like(v).unwrap_or_else(|| self.node_text(v).to_string()))
                        .unwrap_or_default();
                    let description = get("description").and_then(|v| self.string_like(v));
                    self.artifacts.add_env_var(key, value, description);
                }
            }
        }
    }

    fn property_key(&self, node: Node) -> Option<String> {
        match node.kind() {
            "property_identifier" => Some(self.node_text(node).to_string()),
            "string" => Some(unquote(self.node_text(node))),
            _ => None,
        }
    }

    /// `BlueprintActionType.CREATE_FILE` or `'CREATE_FILE'`.
    fn action_kind(&self, node: Node) -> Option<ActionKind> {
        let name = match node.kind() {
            "member_expression" => node
                .child_by_field_name("property")
                .map(|p| self.node_text(p).to_string())?,
            "string" => unquote(self.node_text(node)),
            _ => return None,
        };
        ActionKind::parse(&name)
    }

    /// A plain string, or a template string kept verbatim (substitutions included).
    fn string_like(&self, node: Node) -> Option<String> {
        match node.kind() {
            "string" => Some(unquote(self.node_text(node))),
            "template_string" => Some(strip_delimiters(self.node_text(node)).to_string()),
            _ => None,
        }
    }

    /// A string whose value is known without evaluation.
    fn static_string(&self, node: Node) -> Option<String> {
        match node.kind() {
            "string" => Some(unquote(self.node_text(node))),
            "template_string" => {
                let mut cursor = node.walk();
                let dynamic = node
                    .named_children(&mut cursor)
                    .any(|c| c.kind() == "template_substitution");
                if dynamic {
                    None
                } else {
                    Some(strip_delimiters(self.node_text(node)).to_string())
                }
            }
            _ => None,
        }
    }

    fn string_list(&self, node: Node) -> Vec<String> {
        if node.kind() != "array" {
            return self.string_like(node).into_iter().collect();
        }
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter_map(|item| self.string_like(item))
            .collect()
    }
}

fn strip_delimiters(text: &str) -> &str {
    if text.len() >= 2 {
        &text[1..text.len() - 1]
    } else {
        ""
    }
}

/// Strips quotes from a string literal and resolves simple escapes.
fn unquote(text: &str) -> String {
    let inner = strip_delimiters(text);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
