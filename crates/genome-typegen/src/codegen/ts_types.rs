//! TypeScript declaration model and its renderer.
//!
//! Generators build [`TsType`]/[`TsInterface`] values and hand them to the
//! `render_*` functions here; this is the only place that decides quoting,
//! indentation and punctuation.

/// Indentation unit for generated code.
const INDENT: &str = "  ";

/// A TypeScript type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    String,
    Number,
    Boolean,
    Any,
    Never,
    /// `'value'`
    StringLiteral(String),
    /// A literal already in TypeScript syntax (`42`, `true`, `null`).
    RawLiteral(String),
    /// `A | B`
    Union(Vec<TsType>),
    /// `T[]`
    Array(Box<TsType>),
    /// `Array<T>`
    GenericArray(Box<TsType>),
    /// `readonly [A, B]`
    ReadonlyTuple(Vec<TsType>),
    /// `Record<string, T>`
    Record(Box<TsType>),
    /// `{ a: T; b?: U }`
    Object(Vec<TsProperty>),
    /// A named type.
    Reference(String),
}

/// A property of an object type or interface.
#[derive(Debug, Clone, PartialEq)]
pub struct TsProperty {
    pub name: String,
    pub ty: TsType,
    pub optional: bool,
    pub readonly: bool,
    pub doc: Option<String>,
}

impl TsProperty {
    pub fn new(name: impl Into<String>, ty: TsType) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            readonly: false,
            doc: None,
        }
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn doc(mut self, doc: Option<String>) -> Self {
        self.doc = doc;
        self
    }
}

/// An exported interface declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct TsInterface {
    pub name: String,
    pub properties: Vec<TsProperty>,
    pub doc: Option<String>,
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum TsDecl {
    Interface(TsInterface),
    /// `export type Name = T;`
    TypeAlias { name: String, ty: TsType, doc: Option<String> },
    /// `export declare const Name: T;`
    DeclareConst { name: String, ty: TsType },
}

/// A `import type { ... } from '...'` line.
#[derive(Debug, Clone, PartialEq)]
pub struct TsImport {
    pub names: Vec<String>,
    pub from: String,
}

/// Renders a type at the given nesting depth.
pub fn render_type(ty: &TsType, depth: usize) -> String {
    match ty {
        TsType::String => "string".to_string(),
        TsType::Number => "number".to_string(),
        TsType::Boolean => "boolean".to_string(),
        TsType::Any => "any".to_string(),
        TsType::Never => "never".to_string(),
        TsType::StringLiteral(value) => quote_string(value),
        TsType::RawLiteral(value) => value.clone(),
        TsType::Union(variants) => match variants.len() {
            0 => "never".to_string(),
            _ => variants
                .iter()
                .map(|v| render_type(v, depth))
                .collect::<Vec<_>>()
                .join(" | "),
        },
        TsType::Array(inner) => match inner.as_ref() {
            TsType::Union(variants) if variants.len() > 1 => {
                format!("({})[]", render_type(inner, depth))
            }
            _ => format!("{}[]", render_type(inner, depth)),
        },
        TsType::GenericArray(inner) => format!("Array<{}>", render_type(inner, depth)),
        TsType::ReadonlyTuple(items) => render_tuple(items, depth),
        TsType::Record(inner) => format!("Record<string, {}>", render_type(inner, depth)),
        TsType::Object(properties) => render_object(properties, depth),
        TsType::Reference(name) => name.clone(),
    }
}

fn render_tuple(items: &[TsType], depth: usize) -> String {
    if items.is_empty() {
        return "readonly []".to_string();
    }
    let multiline = items.iter().any(|i| matches!(i, TsType::Object(p) if !p.is_empty()));
    if !multiline {
        let inner: Vec<String> = items.iter().map(|i| render_type(i, depth)).collect();
        return format!("readonly [{}]", inner.join(", "));
    }

    let pad = INDENT.repeat(depth + 1);
    let mut out = String::from("readonly [\n");
    for item in items {
        out.push_str(&format!("{}{},\n", pad, render_type(item, depth + 1)));
    }
    out.push_str(&INDENT.repeat(depth));
    out.push(']');
    out
}

fn render_object(properties: &[TsProperty], depth: usize) -> String {
    if properties.is_empty() {
        return "{}".to_string();
    }
    let mut out = String::from("{\n");
    for property in properties {
        out.push_str(&render_property(property, depth + 1));
    }
    out.push_str(&INDENT.repeat(depth));
    out.push('}');
    out
}

/// Renders one property line (with its doc comment) at the given depth.
pub fn render_property(property: &TsProperty, depth: usize) -> String {
    let pad = INDENT.repeat(depth);
    let mut out = String::new();
    if let Some(doc) = &property.doc {
        out.push_str(&format!("{}{}\n", pad, doc_comment(doc)));
    }
    out.push_str(&format!(
        "{}{}{}{}: {};\n",
        pad,
        if property.readonly { "readonly " } else { "" },
        property_name(&property.name),
        if property.optional { "?" } else { "" },
        render_type(&property.ty, depth)
    ));
    out
}

/// Renders an exported interface. Empty interfaces render as `{}`.
pub fn render_interface(interface: &TsInterface) -> String {
    let mut out = String::new();
    if let Some(doc) = &interface.doc {
        out.push_str(&doc_comment(doc));
        out.push('\n');
    }
    if interface.properties.is_empty() {
        out.push_str(&format!("export interface {} {{}}\n", interface.name));
        return out;
    }
    out.push_str(&format!("export interface {} {{\n", interface.name));
    for property in &interface.properties {
        out.push_str(&render_property(property, 1));
    }
    out.push_str("}\n");
    out
}

/// Renders a top-level declaration.
pub fn render_decl(decl: &TsDecl) -> String {
    match decl {
        TsDecl::Interface(interface) => render_interface(interface),
        TsDecl::TypeAlias { name, ty, doc } => {
            let mut out = String::new();
            if let Some(doc) = doc {
                out.push_str(&doc_comment(doc));
                out.push('\n');
            }
            out.push_str(&format!("export type {} ={};\n", name, render_union_alias(ty)));
            out
        }
        TsDecl::DeclareConst { name, ty } => {
            format!("export declare const {}: {};\n", name, render_type(ty, 0))
        }
    }
}

/// Long unions in aliases get one variant per line.
fn render_union_alias(ty: &TsType) -> String {
    match ty {
        TsType::Union(variants) if variants.len() > 1 => {
            let mut out = String::new();
            for variant in variants {
                out.push_str(&format!("\n{}| {}", INDENT, render_type(variant, 1)));
            }
            out
        }
        other => format!(" {}", render_type(other, 0)),
    }
}

/// Renders a block of import lines.
pub fn render_imports(imports: &[TsImport]) -> String {
    let mut out = String::new();
    for import in imports.iter().filter(|i| !i.names.is_empty()) {
        out.push_str(&format!(
            "import type {{ {} }} from {};\n",
            import.names.join(", "),
            quote_string(&import.from)
        ));
    }
    out
}

/// Quotes a string as a single-quoted TypeScript literal.
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

/// A property name, quoted unless it is a plain identifier.
pub fn property_name(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        quote_string(name)
    }
}

/// Whether `name` can be used unquoted as a property name.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn doc_comment(text: &str) -> String {
    let cleaned = text.replace("*/", "*\\/");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    format!("/** {} */", cleaned)
}

/// Converts a module ID or other separated name to PascalCase.
///
/// Every non-alphanumeric character separates words:
/// `features/auth-ui/shadcn` becomes `FeaturesAuthUiShadcn`.
pub fn to_pascal_case(s: &str) -> String {
    let pascal: String = s
        .split(|c: char| !c.is_ascii_alphanumeric())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect();

    if pascal.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", pascal)
    } else {
        pascal
    }
}
