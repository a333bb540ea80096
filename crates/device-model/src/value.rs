use crate::{DeviceModel, ModelError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Typed view of a single `Value` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValueDescriptor {
    Bit(BitValue),
    Enum(EnumValue),
    Range(RangeValue),
    Reference(ReferenceValue),
    StringComment(StringCommentValue),
}

/// Label sets keyed by start-bit offset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct BitValue {
    pub options: IndexMap<String, Value>,
}

/// Raw code -> label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct EnumValue {
    pub options: IndexMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct RangeValue {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl RangeValue {
    pub fn contains(&self, x: f64) -> bool {
        self.min <= x && x <= self.max
    }
}

/// A value whose options live in another top-level section of the document.
/// `reference` holds that section, already looked up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ReferenceValue {
    pub reference: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct StringCommentValue {
    pub comment: String,
}

/// The closed set of type tags a value definition may carry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueType {
    Bit,
    Enum,
    Range,
    Reference,
    String,
}

impl ValueType {
    /// Case-insensitive parse of a raw `type` / `data_type` tag.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "bit" => Ok(Self::Bit),
            "enum" => Ok(Self::Enum),
            "range" => Ok(Self::Range),
            "reference" => Ok(Self::Reference),
            "string" => Ok(Self::String),
            _ => Err(ModelError::UnsupportedValueType { raw: raw.into() }),
        }
    }
}

impl ValueDescriptor {
    /// Normalize one raw definition, whichever naming dialect it uses.
    ///
    /// `Ok(None)` means the definition exists but carries nothing usable: no
    /// type tag, a `string` without `_comment`, or a `reference` to a section
    /// the document does not have.
    pub fn from_definition(def: &Value, model: &DeviceModel) -> Result<Option<Self>> {
        let Some(def) = def.as_object() else {
            return Ok(None);
        };
        let ty = match first_field(def, &["type", "data_type"]) {
            Some(Value::String(raw)) => ValueType::parse(raw)?,
            Some(other) => {
                return Err(ModelError::UnsupportedValueType {
                    raw: other.to_string(),
                })
            }
            None => return Ok(None),
        };

        let desc = match ty {
            ValueType::Enum => Self::Enum(EnumValue {
                options: first_field(def, &["option", "value_mapping"])
                    .and_then(Value::as_object)
                    .map(enum_options)
                    .unwrap_or_default(),
            }),
            ValueType::Range => {
                let bounds = first_field(def, &["option", "value_validation"])
                    .and_then(Value::as_object);
                let num = |key: &str| bounds.and_then(|b| b.get(key)).and_then(as_number);
                Self::Range(RangeValue {
                    min: num("min").unwrap_or_default(),
                    max: num("max").unwrap_or_default(),
                    step: num("step").unwrap_or(1.0),
                })
            }
            ValueType::Bit => Self::Bit(BitValue {
                options: def.get("option").map(bit_options).unwrap_or_default(),
            }),
            ValueType::Reference => {
                let section = match def.get("option") {
                    Some(Value::Array(items)) => items.first().and_then(Value::as_str),
                    Some(Value::String(name)) => Some(name.as_str()),
                    _ => None,
                };
                let Some(section) = section else {
                    return Ok(None);
                };
                match model.section(section) {
                    Some(reference) => Self::Reference(ReferenceValue {
                        reference: reference.into_owned(),
                    }),
                    None => {
                        debug!(section, "reference to missing section");
                        return Ok(None);
                    }
                }
            }
            ValueType::String => match def.get("_comment").and_then(Value::as_str) {
                Some(comment) => Self::StringComment(StringCommentValue {
                    comment: comment.to_string(),
                }),
                None => return Ok(None),
            },
        };
        Ok(Some(desc))
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Bit(_) => ValueType::Bit,
            Self::Enum(_) => ValueType::Enum,
            Self::Range(_) => ValueType::Range,
            Self::Reference(_) => ValueType::Reference,
            Self::StringComment(_) => ValueType::String,
        }
    }
}

fn first_field<'a>(def: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .find_map(|name| def.get(*name).filter(|v| !v.is_null()))
}

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn scalar_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn enum_options(raw: &Map<String, Value>) -> IndexMap<String, String> {
    raw.iter()
        .filter_map(|(code, label)| Some((code.clone(), scalar_string(label)?)))
        .collect()
}

// Colliding `startbit` keys: the later entry wins.
fn bit_options(raw: &Value) -> IndexMap<String, Value> {
    let entries: Box<dyn Iterator<Item = &Value> + '_> = match raw {
        Value::Array(items) => Box::new(items.iter()),
        Value::Object(map) => Box::new(map.values()),
        _ => return IndexMap::new(),
    };
    let mut out = IndexMap::new();
    for entry in entries {
        let Some(start) = entry.get("startbit").and_then(scalar_string) else {
            continue;
        };
        let values = entry.get("values").cloned().unwrap_or(Value::Null);
        out.insert(start, values);
    }
    out
}
