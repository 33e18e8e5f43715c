#![deny(missing_docs)]

//! # Type Schemas
//!
//! Turns a raw schema subtree into a fully resolved `TypeSchema` tree.
//!
//! Resolution is eager and bottom-up: every composition child (`allOf`, `oneOf`,
//! `anyOf`, `not`, `items`, `additionalProperties` and each `properties` entry) is
//! itself a resolved `TypeSchema`, never a reference.
//!
//! Two cycle guards apply:
//! - pointer level, inside [`RefResolver`] (a reference chain revisits a pointer),
//! - composition level, here (the resolved fragment is already an ancestor in the
//!   current resolution chain). Ancestry is compared by fragment identity, not by
//!   value, since distinct fragments may be structurally equal.

use crate::error::{AppError, AppResult};
use crate::pointer::child_location;
use crate::resolver::RefResolver;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// The primitive kind declared by a schema's `type` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// `null`
    Null,
    /// `array`
    Array,
    /// `object`
    Object,
    /// `string`
    String,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `integer`
    Integer,
}

impl SchemaType {
    /// The keyword as written in the document.
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Null => "null",
            SchemaType::Array => "array",
            SchemaType::Object => "object",
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Boolean => "boolean",
            SchemaType::Integer => "integer",
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An exclusive bound: a flag modifying `minimum`/`maximum` (3.0 style) or a limit
/// of its own (3.1 style).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExclusiveBound {
    /// `exclusiveMinimum: true`
    Flag(bool),
    /// `exclusiveMinimum: 5`
    Limit(f64),
}

/// The resolved form of `additionalProperties`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// `additionalProperties: true|false`
    Allowed(bool),
    /// `additionalProperties: { ...schema }`
    Schema(Box<TypeSchema>),
}

/// A recursive, fully resolved type description.
///
/// Scalar descriptors are read through serde with the absent-value defaults applied
/// in one place: booleans default to `false`, the numeric minimums (`minLength`,
/// `minItems`, `minProperties`) to `0`, and `required`/`enum` to empty lists.
/// Child nodes are never deserialized directly; they are filled in by the resolver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeSchema {
    /// Declared primitive kind, if any.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    /// Format hint (`int64`, `date-time`, `uuid`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Short title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Example value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// Whether `null` is accepted in addition to `type`.
    #[serde(default)]
    pub nullable: bool,
    /// Whether the schema is deprecated.
    #[serde(default)]
    pub deprecated: bool,
    /// Only meaningful in responses.
    #[serde(default)]
    pub read_only: bool,
    /// Only meaningful in requests.
    #[serde(default)]
    pub write_only: bool,
    /// Allowed values; empty when unrestricted.
    #[serde(rename = "enum", default)]
    pub enum_values: Vec<Value>,

    /// Numeric: value must be a multiple of this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,
    /// Numeric upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Numeric exclusive upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<ExclusiveBound>,
    /// Numeric lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Numeric exclusive lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<ExclusiveBound>,

    /// String: maximum length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    /// String: minimum length.
    #[serde(default)]
    pub min_length: u64,
    /// String: regular expression the value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Array: maximum item count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    /// Array: minimum item count.
    #[serde(default)]
    pub min_items: u64,
    /// Array: items must be distinct.
    #[serde(default)]
    pub unique_items: bool,

    /// Object: maximum property count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,
    /// Object: minimum property count.
    #[serde(default)]
    pub min_properties: u64,
    /// Object: names of required properties.
    #[serde(default)]
    pub required: Vec<String>,

    /// Resolved `allOf` members, in declaration order. Members are not merged.
    #[serde(skip_deserializing, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<TypeSchema>,
    /// Resolved `oneOf` members.
    #[serde(skip_deserializing, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<TypeSchema>,
    /// Resolved `anyOf` members.
    #[serde(skip_deserializing, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<TypeSchema>,
    /// Resolved `not` schema.
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<TypeSchema>>,
    /// Resolved array item schema.
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<TypeSchema>>,
    /// Resolved property schemas.
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, TypeSchema>>,
    /// Resolved `additionalProperties`.
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,
}

impl TypeSchema {
    /// Returns true if `name` is listed in `required`.
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Returns true if the schema declares a composition keyword.
    pub fn is_composite(&self) -> bool {
        !self.all_of.is_empty()
            || !self.one_of.is_empty()
            || !self.any_of.is_empty()
            || self.not.is_some()
    }

    /// A short, human readable label (`string`, `array<integer>`, `allOf(2)`, ...).
    pub fn summary(&self) -> String {
        match (self.schema_type, &self.items) {
            (Some(SchemaType::Array), Some(items)) => format!("array<{}>", items.summary()),
            (Some(ty), _) => match &self.format {
                Some(format) => format!("{}({})", ty, format),
                None => ty.to_string(),
            },
            (None, _) if !self.all_of.is_empty() => format!("allOf({})", self.all_of.len()),
            (None, _) if !self.one_of.is_empty() => format!("oneOf({})", self.one_of.len()),
            (None, _) if !self.any_of.is_empty() => format!("anyOf({})", self.any_of.len()),
            (None, _) if self.not.is_some() => "not".to_string(),
            (None, _) => "any".to_string(),
        }
    }
}

/// Resolves raw schema subtrees into `TypeSchema` trees.
pub struct SchemaResolver<'r, 'a> {
    refs: &'r RefResolver<'a>,
}

impl<'r, 'a> SchemaResolver<'r, 'a> {
    /// Creates a schema resolver backed by a reference resolver.
    pub fn new(refs: &'r RefResolver<'a>) -> Self {
        Self { refs }
    }

    /// Resolves `raw` (which may be, or contain, reference tokens) completely.
    ///
    /// `location` names the schema position in error messages.
    ///
    /// # Errors
    ///
    /// * `UndefinedSchema` if the position resolves to something other than an object.
    /// * `CyclicReference` on pointer cycles or composition cycles.
    /// * `DanglingReference` on unwalkable pointers.
    /// * `InvalidInput` if a scalar descriptor has the wrong shape.
    pub fn resolve(&self, raw: &'a Value, location: &str) -> AppResult<TypeSchema> {
        let mut ancestors = Vec::new();
        self.resolve_in(raw, location, &mut ancestors)
    }

    fn resolve_in(
        &self,
        raw: &'a Value,
        location: &str,
        ancestors: &mut Vec<&'a Value>,
    ) -> AppResult<TypeSchema> {
        let node = self.refs.resolve(raw)?;
        let map = match node {
            Value::Object(map) => map,
            _ => return Err(AppError::UndefinedSchema(location.to_string())),
        };

        if ancestors.iter().any(|seen| std::ptr::eq(*seen, node)) {
            return Err(AppError::CyclicReference(location.to_string()));
        }

        ancestors.push(node);
        let result = self.build(node, map, location, ancestors);
        ancestors.pop();
        result
    }

    fn build(
        &self,
        node: &'a Value,
        map: &'a Map<String, Value>,
        location: &str,
        ancestors: &mut Vec<&'a Value>,
    ) -> AppResult<TypeSchema> {
        let mut schema = TypeSchema::deserialize(node)
            .map_err(|e| AppError::InvalidInput(format!("{}: {}", location, e)))?;

        schema.all_of = self.resolve_members(map.get("allOf"), location, "allOf", ancestors)?;
        schema.one_of = self.resolve_members(map.get("oneOf"), location, "oneOf", ancestors)?;
        schema.any_of = self.resolve_members(map.get("anyOf"), location, "anyOf", ancestors)?;
        schema.not = self.resolve_child(map.get("not"), location, "not", ancestors)?;
        schema.items = self.resolve_child(map.get("items"), location, "items", ancestors)?;

        if let Some(raw_props) = map.get("properties") {
            let props_location = child_location(location, "properties");
            let raw_props = raw_props
                .as_object()
                .ok_or_else(|| AppError::InvalidInput(format!("{}: expected object", props_location)))?;
            let mut properties = IndexMap::with_capacity(raw_props.len());
            for (name, raw_prop) in raw_props {
                let prop_location = child_location(&props_location, name);
                properties.insert(
                    name.clone(),
                    self.resolve_in(raw_prop, &prop_location, ancestors)?,
                );
            }
            schema.properties = Some(properties);
        }

        schema.additional_properties = match map.get("additionalProperties") {
            None => None,
            Some(Value::Bool(allowed)) => Some(AdditionalProperties::Allowed(*allowed)),
            Some(raw) => {
                let child = child_location(location, "additionalProperties");
                Some(AdditionalProperties::Schema(Box::new(
                    self.resolve_in(raw, &child, ancestors)?,
                )))
            }
        };

        Ok(schema)
    }

    fn resolve_child(
        &self,
        raw: Option<&'a Value>,
        location: &str,
        keyword: &str,
        ancestors: &mut Vec<&'a Value>,
    ) -> AppResult<Option<Box<TypeSchema>>> {
        raw.map(|raw| {
            let child = child_location(location, keyword);
            self.resolve_in(raw, &child, ancestors).map(Box::new)
        })
        .transpose()
    }

    /// Composition members are a list; a lone schema is accepted as a one-element list.
    fn resolve_members(
        &self,
        raw: Option<&'a Value>,
        location: &str,
        keyword: &str,
        ancestors: &mut Vec<&'a Value>,
    ) -> AppResult<Vec<TypeSchema>> {
        let base = child_location(location, keyword);
        match raw {
            None => Ok(Vec::new()),
            Some(Value::Array(members)) => members
                .iter()
                .enumerate()
                .map(|(idx, member)| {
                    self.resolve_in(member, &child_location(&base, &idx.to_string()), ancestors)
                })
                .collect(),
            Some(single) => Ok(vec![self.resolve_in(single, &base, ancestors)?]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve(root: &Value, raw: &Value) -> AppResult<TypeSchema> {
        let refs = RefResolver::new(root);
        SchemaResolver::new(&refs).resolve(raw, "#/test")
    }

    #[test]
    fn test_defaults_are_applied() {
        let root = json!({});
        let schema = resolve(&root, &json!({"type": "string"})).unwrap();
        assert_eq!(schema.schema_type, Some(SchemaType::String));
        assert!(!schema.nullable);
        assert!(!schema.deprecated);
        assert!(!schema.unique_items);
        assert_eq!(schema.min_length, 0);
        assert_eq!(schema.min_items, 0);
        assert_eq!(schema.min_properties, 0);
        assert!(schema.required.is_empty());
        assert!(schema.enum_values.is_empty());
        assert!(schema.properties.is_none());
    }

    #[test]
    fn test_scalars_are_copied() {
        let root = json!({});
        let raw = json!({
            "type": "integer",
            "format": "int64",
            "minimum": 1,
            "maximum": 10,
            "exclusiveMaximum": true,
            "nullable": true,
            "enum": [1, 2, 3],
            "default": 2,
            "description": "Count"
        });
        let schema = resolve(&root, &raw).unwrap();
        assert_eq!(schema.format.as_deref(), Some("int64"));
        assert_eq!(schema.minimum, Some(1.0));
        assert_eq!(schema.maximum, Some(10.0));
        assert_eq!(schema.exclusive_maximum, Some(ExclusiveBound::Flag(true)));
        assert!(schema.nullable);
        assert_eq!(schema.enum_values, vec![json!(1), json!(2), json!(3)]);
        assert_eq!(schema.default, Some(json!(2)));
        assert_eq!(schema.summary(), "integer(int64)");
    }

    #[test]
    fn test_nested_references_are_resolved() {
        let root = json!({
            "components": {"schemas": {
                "Tag": {"type": "string"},
                "Pet": {
                    "type": "object",
                    "required": ["tags"],
                    "properties": {
                        "tags": {"type": "array", "items": {"$ref": "#/components/schemas/Tag"}}
                    }
                }
            }}
        });
        let schema = resolve(&root, &json!({"$ref": "#/components/schemas/Pet"})).unwrap();
        let props = schema.properties.as_ref().unwrap();
        let tags = &props["tags"];
        assert_eq!(tags.summary(), "array<string>");
        assert!(schema.is_required("tags"));
    }

    #[test]
    fn test_all_of_members_are_not_merged() {
        let root = json!({});
        let raw = json!({"allOf": [
            {"type": "object", "properties": {"a": {"type": "string"}}},
            {"type": "object", "properties": {"b": {"type": "number"}}}
        ]});
        let schema = resolve(&root, &raw).unwrap();
        assert_eq!(schema.all_of.len(), 2);
        assert!(schema.properties.is_none());
        let first = schema.all_of[0].properties.as_ref().unwrap();
        let second = schema.all_of[1].properties.as_ref().unwrap();
        assert_eq!(first.keys().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(second.keys().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(schema.summary(), "allOf(2)");
    }

    #[test]
    fn test_property_pointing_to_ancestor_is_cyclic() {
        let root = json!({"components": {"schemas": {
            "Node": {
                "type": "object",
                "properties": {"self": {"$ref": "#/components/schemas/Node"}}
            }
        }}});
        let err = resolve(&root, &json!({"$ref": "#/components/schemas/Node"})).unwrap_err();
        assert_eq!(
            err,
            AppError::CyclicReference("#/test/properties/self".into())
        );
    }

    #[test]
    fn test_cycle_through_all_of_hop() {
        let root = json!({"components": {"schemas": {
            "Base": {
                "type": "object",
                "properties": {"parent": {"$ref": "#/components/schemas/Derived"}}
            },
            "Derived": {"allOf": [{"$ref": "#/components/schemas/Base"}]}
        }}});
        let err = resolve(&root, &json!({"$ref": "#/components/schemas/Derived"})).unwrap_err();
        assert!(matches!(err, AppError::CyclicReference(_)));
    }

    #[test]
    fn test_shared_sibling_is_not_a_cycle() {
        let root = json!({"components": {"schemas": {
            "Id": {"type": "string", "format": "uuid"},
            "Pair": {
                "type": "object",
                "properties": {
                    "left": {"$ref": "#/components/schemas/Id"},
                    "right": {"$ref": "#/components/schemas/Id"}
                }
            }
        }}});
        let schema = resolve(&root, &json!({"$ref": "#/components/schemas/Pair"})).unwrap();
        let props = schema.properties.unwrap();
        assert_eq!(props["left"], props["right"]);
    }

    #[test]
    fn test_structurally_equal_siblings_are_distinct() {
        let root = json!({});
        let raw = json!({"anyOf": [{"type": "string"}, {"type": "string"}]});
        let schema = resolve(&root, &raw).unwrap();
        assert_eq!(schema.any_of.len(), 2);
    }

    #[test]
    fn test_non_object_is_undefined() {
        let root = json!({"components": {"schemas": {"Nothing": null}}});
        let err = resolve(&root, &json!({"$ref": "#/components/schemas/Nothing"})).unwrap_err();
        assert_eq!(err, AppError::UndefinedSchema("#/test".into()));
    }

    #[test]
    fn test_additional_properties() {
        let root = json!({});
        let open = resolve(&root, &json!({"type": "object", "additionalProperties": true})).unwrap();
        assert_eq!(
            open.additional_properties,
            Some(AdditionalProperties::Allowed(true))
        );
        let map = resolve(
            &root,
            &json!({"type": "object", "additionalProperties": {"type": "integer"}}),
        )
        .unwrap();
        match map.additional_properties {
            Some(AdditionalProperties::Schema(inner)) => {
                assert_eq!(inner.schema_type, Some(SchemaType::Integer))
            }
            other => panic!("unexpected additionalProperties: {:?}", other),
        }
    }

    #[test]
    fn test_bad_descriptor_shape() {
        let root = json!({});
        let err = resolve(&root, &json!({"type": "widget"})).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
