//! `StructSchema` → Go source text.
//!
//! The only place type names exist as strings. Output is tab-indented the
//! way gofmt would print it, so it reads fine even without a format pass.
use crate::error::{Error, Result};
use crate::inference::name::exported_name;
use crate::ir::{FieldType, StructSchema};

pub const DEFAULT_PACKAGE: &str = "main";

const STRING: &str = "string";
const INT: &str = "int";
const FLOAT: &str = "float64";
const BOOL: &str = "bool";
const ARRAY: &str = "[]interface{}";
const OBJECT: &str = "interface{}";

pub struct Codegen {
    package: String,
    out: String,
}

impl Codegen {
    pub fn new(package: &str) -> Self {
        Self { package: package.to_string(), out: String::new() }
    }

    /// Append `type <Name> struct { … }`; only named schemas can be emitted.
    pub fn emit(&mut self, schema: &StructSchema) -> Result<()> {
        let name = schema.name.as_deref().ok_or(Error::UnnamedSchema)?;
        let body = struct_text(schema, 0)?;
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        self.out.push_str(&format!("type {name} {body}\n"));
        Ok(())
    }

    pub fn into_string(self) -> String {
        format!("package {}\n\n{}", self.package, self.out)
    }
}

/// Whole file for one schema.
pub fn render_file(schema: &StructSchema, package: &str) -> Result<String> {
    let mut cg = Codegen::new(package);
    cg.emit(schema)?;
    Ok(cg.into_string())
}

pub fn type_text(ty: &FieldType, depth: usize) -> Result<String> {
    let text = match ty {
        FieldType::String => STRING,
        FieldType::Integer => INT,
        FieldType::Float => FLOAT,
        FieldType::Boolean => BOOL,
        FieldType::ArrayOfAny => ARRAY,
        FieldType::ObjectAny => OBJECT,
        FieldType::NestedStruct(schema) => return struct_text(schema, depth),
    };
    Ok(text.to_string())
}

/// Struct literal whose closing brace sits at `depth` tabs.
pub fn struct_text(schema: &StructSchema, depth: usize) -> Result<String> {
    if schema.fields.is_empty() {
        return Ok("struct{}".to_string());
    }
    let mut res = String::from("struct {\n");
    for field in &schema.fields {
        let ty = type_text(&field.ty, depth + 1)?;
        push_indent(&mut res, depth + 1);
        res.push_str(&nv_pair(&field.name, &field.key, &ty)?);
        res.push('\n');
    }
    push_indent(&mut res, depth);
    res.push('}');
    Ok(res)
}

/// Field line straight from a JSON key: sanitize, then pair.
pub fn build_nv_pair(key: &str, type_text: &str) -> Result<String> {
    nv_pair(&exported_name(key)?, key, type_text)
}

/// `<name> <type> <tag>` where the tag carries the original key.
pub fn nv_pair(name: &str, key: &str, type_text: &str) -> Result<String> {
    if name.is_empty() {
        return Err(Error::EmptyFieldName);
    }
    if type_text.is_empty() {
        return Err(Error::EmptyFieldType { name: name.to_string() });
    }
    Ok(format!("{name} {type_text} {}", json_tag(key)))
}

/// Go struct tag for `key`. Raw string literal unless the key has a backtick.
pub fn json_tag(key: &str) -> String {
    let tag = format!("json:\"{}\"", escape_quoted(key));
    if tag.contains('`') {
        format!("\"{}\"", escape_quoted(&tag))
    } else {
        format!("`{tag}`")
    }
}

fn escape_quoted(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}
