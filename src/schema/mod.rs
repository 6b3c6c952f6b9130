//! Provider schema model.
//!
//! Provider schemas describe the shape of each resource type: a tree of
//! blocks, block types with nesting modes, and attributes that are either
//! plainly typed or carry a nested object type of their own. The differ
//! walks values and schemas side by side, so this module is the single
//! source of truth for what shapes exist.

use std::collections::{BTreeMap, HashMap};

use anyhow::{bail, Result};
use serde::Deserialize;
use serde_json::Value as Json;

/// Schemas for a single provider, keyed by resource type.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Provider {
    #[serde(default)]
    pub resource_schemas: HashMap<String, ResourceSchema>,
}

/// The schema of one resource type.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceSchema {
    pub block: Block,
}

/// A block: named attributes plus named sub-block types.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub attributes: HashMap<String, Attribute>,
    #[serde(default)]
    pub block_types: HashMap<String, BlockType>,
}

/// A sub-block declaration: how instances are keyed, and their shape.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockType {
    pub nesting_mode: NestingMode,
    pub block: Block,
}

/// How instances of a block or nested type are keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NestingMode {
    Single,
    Group,
    List,
    Set,
    Map,
}

/// One attribute: either a plainly typed value or a nested object type.
#[derive(Debug, Clone, Deserialize)]
pub struct Attribute {
    #[serde(rename = "type", default)]
    pub attribute_type: Option<AttributeType>,
    #[serde(default)]
    pub nested_type: Option<NestedType>,
}

/// A nested object type carried by an attribute.
#[derive(Debug, Clone, Deserialize)]
pub struct NestedType {
    #[serde(default)]
    pub attributes: HashMap<String, Attribute>,
    pub nesting_mode: NestingMode,
}

/// The type of a plainly typed attribute.
///
/// The wire encoding is the usual type-constraint JSON: a bare string for
/// primitives, or a two-element array like `["list", T]`,
/// `["object", {"name": T}]`, `["tuple", [T, ...]]` for composites.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    Bool,
    Number,
    String,
    /// Any type; values are interpreted purely by their JSON shape. Also
    /// the sentinel schema for output changes.
    Dynamic,
    List(Box<AttributeType>),
    Set(Box<AttributeType>),
    Map(Box<AttributeType>),
    Tuple(Vec<AttributeType>),
    Object(BTreeMap<String, AttributeType>),
}

impl AttributeType {
    fn from_wire(raw: &Json) -> Result<AttributeType> {
        match raw {
            Json::String(name) => match name.as_str() {
                "bool" => Ok(AttributeType::Bool),
                "number" => Ok(AttributeType::Number),
                "string" => Ok(AttributeType::String),
                "dynamic" => Ok(AttributeType::Dynamic),
                other => bail!("unrecognized attribute type: {:?}", other),
            },
            Json::Array(parts) => {
                let [kind, argument] = parts.as_slice() else {
                    bail!("malformed attribute type: {}", raw);
                };
                let Json::String(kind) = kind else {
                    bail!("malformed attribute type kind: {}", kind);
                };
                match kind.as_str() {
                    "list" => Ok(AttributeType::List(Box::new(Self::from_wire(argument)?))),
                    "set" => Ok(AttributeType::Set(Box::new(Self::from_wire(argument)?))),
                    "map" => Ok(AttributeType::Map(Box::new(Self::from_wire(argument)?))),
                    "tuple" => {
                        let Json::Array(elements) = argument else {
                            bail!("malformed tuple type: {}", argument);
                        };
                        let types = elements
                            .iter()
                            .map(Self::from_wire)
                            .collect::<Result<Vec<_>>>()?;
                        Ok(AttributeType::Tuple(types))
                    }
                    "object" => {
                        let Json::Object(entries) = argument else {
                            bail!("malformed object type: {}", argument);
                        };
                        let mut types = BTreeMap::new();
                        for (name, entry) in entries {
                            types.insert(name.clone(), Self::from_wire(entry)?);
                        }
                        Ok(AttributeType::Object(types))
                    }
                    other => bail!("unrecognized attribute type kind: {:?}", other),
                }
            }
            other => bail!("malformed attribute type: {}", other),
        }
    }

    /// Whether values of this type are objects, which lets the sequence
    /// differ pair up similar elements as in-place updates.
    pub fn is_object(&self) -> bool {
        matches!(self, AttributeType::Object(_))
    }
}

impl<'de> Deserialize<'de> for AttributeType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = Json::deserialize(deserializer)?;
        AttributeType::from_wire(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(raw: Json) -> Result<AttributeType> {
        AttributeType::from_wire(&raw)
    }

    #[test]
    fn test_primitive_types() {
        assert_eq!(parse(json!("bool")).unwrap(), AttributeType::Bool);
        assert_eq!(parse(json!("number")).unwrap(), AttributeType::Number);
        assert_eq!(parse(json!("string")).unwrap(), AttributeType::String);
        assert_eq!(parse(json!("dynamic")).unwrap(), AttributeType::Dynamic);
    }

    #[test]
    fn test_collection_types() {
        assert_eq!(
            parse(json!(["list", "string"])).unwrap(),
            AttributeType::List(Box::new(AttributeType::String))
        );
        assert_eq!(
            parse(json!(["set", ["map", "number"]])).unwrap(),
            AttributeType::Set(Box::new(AttributeType::Map(Box::new(
                AttributeType::Number
            ))))
        );
    }

    #[test]
    fn test_object_and_tuple_types() {
        let object = parse(json!(["object", {"id": "string", "count": "number"}])).unwrap();
        let AttributeType::Object(types) = &object else {
            panic!("expected an object type");
        };
        assert_eq!(types.get("id"), Some(&AttributeType::String));
        assert_eq!(types.get("count"), Some(&AttributeType::Number));
        assert!(object.is_object());

        assert_eq!(
            parse(json!(["tuple", ["string", "bool"]])).unwrap(),
            AttributeType::Tuple(vec![AttributeType::String, AttributeType::Bool])
        );
    }

    #[test]
    fn test_unrecognized_types_fail() {
        assert!(parse(json!("quaternion")).is_err());
        assert!(parse(json!(["matrix", "number"])).is_err());
        assert!(parse(json!(42)).is_err());
        assert!(parse(json!(["list"])).is_err());
    }

    #[test]
    fn test_block_deserializes_from_provider_schema() {
        let block: Block = serde_json::from_value(json!({
            "attributes": {
                "id": {"type": "string"},
                "rule": {
                    "nested_type": {
                        "attributes": {"port": {"type": "number"}},
                        "nesting_mode": "list"
                    }
                }
            },
            "block_types": {
                "timeouts": {
                    "nesting_mode": "single",
                    "block": {"attributes": {"create": {"type": "string"}}}
                }
            }
        }))
        .unwrap();

        assert_eq!(
            block.attributes["id"].attribute_type,
            Some(AttributeType::String)
        );
        let nested = block.attributes["rule"].nested_type.as_ref().unwrap();
        assert_eq!(nested.nesting_mode, NestingMode::List);
        assert_eq!(
            block.block_types["timeouts"].nesting_mode,
            NestingMode::Single
        );
    }

    #[test]
    fn test_unknown_nesting_mode_fails() {
        let result: Result<BlockType, _> = serde_json::from_value(json!({
            "nesting_mode": "spiral",
            "block": {}
        }));
        assert!(result.is_err());
    }
}
