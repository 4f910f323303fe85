// Strongly-typed IR for codegen. No serde_json::Value and no type text here.
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    ArrayOfAny,              // element types are never inspected
    ObjectAny,               // opaque value (null under `null_as_any`)
    NestedStruct(StructSchema),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDecl {
    pub name: String,        // exported identifier
    pub ty: FieldType,
    pub key: String,         // original JSON key, verbatim
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StructSchema {
    /// Only the top-level schema is named; nested ones are anonymous.
    pub name: Option<String>,
    pub fields: Vec<FieldDecl>,
}

#[cfg(test)]
impl StructSchema {
    pub fn field(&self, key: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn nested(&self, key: &str) -> Option<&StructSchema> {
        match self.field(key).map(|f| &f.ty) {
            Some(FieldType::NestedStruct(s)) => Some(s),
            _ => None,
        }
    }
}
