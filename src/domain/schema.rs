//! JSON-Schema-like type declarations used by response contents, parameters and
//! headers.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Primitive type names accepted in a schema `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
    /// Any type name this crate does not know about.
    #[serde(other)]
    Unknown,
}

/// The `type` field: either a single name or an ordered union such as
/// `["number", "null"]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeDecl {
    Single(SchemaType),
    Union(Vec<SchemaType>),
}

impl TypeDecl {
    pub fn contains(&self, ty: SchemaType) -> bool {
        match self {
            TypeDecl::Single(t) => *t == ty,
            TypeDecl::Union(types) => types.contains(&ty),
        }
    }

    /// First declared type that is not `null`.
    pub fn primary(&self) -> Option<SchemaType> {
        match self {
            TypeDecl::Single(SchemaType::Null) => None,
            TypeDecl::Single(t) => Some(*t),
            TypeDecl::Union(types) => types.iter().copied().find(|t| *t != SchemaType::Null),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNode {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<TypeDecl>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, SchemaNode>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,

    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Value>,

    /// OpenAPI 3.0 single `example`. Only consulted when `examples` is empty.
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub example: Option<Value>,

    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<SchemaNode>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaNode>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaNode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,

    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(alias = "$defs", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub definitions: BTreeMap<String, SchemaNode>,

    /// Validation keywords with no effect on synthesis (`maximum`,
    /// `minLength`, `pattern`, ...), kept for request and response checks.
    #[serde(flatten)]
    pub keywords: BTreeMap<String, Value>,
}

/// Keeps an explicit JSON `null` as `Some(Value::Null)` so that `default: null`
/// is distinguishable from a missing `default`.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// What a schema node resolves to when an example must be produced from it.
///
/// Variants are listed in precedence order; [`SchemaNode::kind`] returns the
/// first one that applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaKind<'a> {
    /// `default`, the first of `examples`, or the first of `enum`.
    Literal(&'a Value),
    /// A local `$ref` pointer.
    Reference(&'a str),
    /// First branch of the first non-empty `anyOf` / `oneOf` / `allOf`.
    Combinator(&'a SchemaNode),
    /// `type` is or contains `null`, or `nullable` is set.
    Nullable,
    Typed(SchemaType),
    /// No usable `type`.
    Untyped,
}

impl SchemaNode {
    pub fn of_type(ty: SchemaType) -> Self {
        Self {
            schema_type: Some(TypeDecl::Single(ty)),
            ..Default::default()
        }
    }

    /// The literal value this node declares, if any.
    ///
    /// `default` outranks `examples` whenever both are present, while `examples`
    /// alone outranks `enum`.
    pub fn literal(&self) -> Option<&Value> {
        self.default
            .as_ref()
            .or_else(|| self.examples.first())
            .or(self.example.as_ref())
            .or_else(|| self.enum_values.first())
    }

    pub fn first_combinator_branch(&self) -> Option<&SchemaNode> {
        [&self.any_of, &self.one_of, &self.all_of]
            .into_iter()
            .find_map(|branches| branches.first())
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
            || self
                .schema_type
                .as_ref()
                .is_some_and(|t| t.contains(SchemaType::Null))
    }

    pub fn kind(&self) -> SchemaKind<'_> {
        if let Some(value) = self.literal() {
            return SchemaKind::Literal(value);
        }
        if let Some(pointer) = self.reference.as_deref() {
            return SchemaKind::Reference(pointer);
        }
        if let Some(branch) = self.first_combinator_branch() {
            return SchemaKind::Combinator(branch);
        }
        if self.is_nullable() {
            return SchemaKind::Nullable;
        }
        match self.schema_type.as_ref().and_then(TypeDecl::primary) {
            Some(SchemaType::Unknown) | None => SchemaKind::Untyped,
            Some(ty) => SchemaKind::Typed(ty),
        }
    }

    /// Resolves a local JSON pointer (`#`, `#/definitions/Name`, `#/$defs/Name`,
    /// or a nested `#/properties/a/items`) against this node as the root.
    pub fn resolve_pointer(&self, pointer: &str) -> Option<&SchemaNode> {
        let path = pointer.strip_prefix('#')?;
        let mut current = self;
        let mut segments = path.split('/').filter(|s| !s.is_empty()).map(unescape_pointer);

        while let Some(segment) = segments.next() {
            current = match segment.as_str() {
                "definitions" | "$defs" => current.definitions.get(&segments.next()?)?,
                "properties" => current.properties.get(&segments.next()?)?,
                "items" => current.items.as_deref()?,
                "anyOf" => nth(&current.any_of, segments.next()?)?,
                "oneOf" => nth(&current.one_of, segments.next()?)?,
                "allOf" => nth(&current.all_of, segments.next()?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

fn nth(branches: &[SchemaNode], index: String) -> Option<&SchemaNode> {
    branches.get(index.parse::<usize>().ok()?)
}

fn unescape_pointer(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}
