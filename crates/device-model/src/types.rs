use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// A vendor device-model document.
///
/// The well-known sections are typed; every other top-level section is kept
/// verbatim so that `reference` values can be resolved against it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceModel {
    #[serde(rename = "Info", default, skip_serializing_if = "Option::is_none")]
    pub(crate) info: Option<Value>,
    #[serde(rename = "Value", default, skip_serializing_if = "Option::is_none")]
    pub(crate) values: Option<Map<String, Value>>,
    #[serde(
        rename = "MonitoringValue",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) monitoring_value: Option<Map<String, Value>>,
    #[serde(rename = "Monitoring", default, skip_serializing_if = "Option::is_none")]
    pub(crate) monitoring: Option<Monitoring>,
    #[serde(flatten)]
    pub(crate) sections: Map<String, Value>,
}

impl DeviceModel {
    /// Product metadata, passed through untouched.
    pub fn info(&self) -> Option<&Value> {
        self.info.as_ref()
    }

    /// Raw `Value` section, if the document has one.
    pub fn values(&self) -> Option<&Map<String, Value>> {
        self.values.as_ref()
    }

    pub fn has_value_section(&self) -> bool {
        self.values.is_some()
    }

    /// Legacy `MonitoringValue` section.
    pub fn monitoring_values(&self) -> Option<&Map<String, Value>> {
        self.monitoring_value.as_ref()
    }

    pub fn monitoring(&self) -> Option<&Monitoring> {
        self.monitoring.as_ref()
    }

    pub fn monitoring_kind(&self) -> Option<&MonitoringKind> {
        self.monitoring.as_ref().map(|m| &m.kind)
    }

    /// Look up a top-level section by name, as targeted by `reference` values.
    ///
    /// Typed sections are rebuilt as JSON on demand; the others are borrowed.
    pub fn section(&self, name: &str) -> Option<Cow<'_, Value>> {
        match name {
            "Info" => self.info.as_ref().map(Cow::Borrowed),
            "Value" => self
                .values
                .as_ref()
                .map(|m| Cow::Owned(Value::Object(m.clone()))),
            "MonitoringValue" => self
                .monitoring_value
                .as_ref()
                .map(|m| Cow::Owned(Value::Object(m.clone()))),
            "Monitoring" => self
                .monitoring
                .as_ref()
                .and_then(|m| serde_json::to_value(m).ok())
                .map(Cow::Owned),
            _ => self.sections.get(name).map(Cow::Borrowed),
        }
    }
}

/// Telemetry encoding declared under `Monitoring.type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<Value>", into = "String")]
pub enum MonitoringKind {
    ThinQ2,
    /// `BINARY(BYTE)`: one byte per shift step.
    BinaryByte,
    /// `BINARY(HEX)`: nibble pairs, 16 bits per shift step.
    BinaryHex,
    /// Any other declaration; telemetry is treated as JSON text.
    Other(String),
}

impl MonitoringKind {
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::BinaryByte | Self::BinaryHex)
    }
}

impl Default for MonitoringKind {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for MonitoringKind {
    fn from(raw: String) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "THINQ2" => Self::ThinQ2,
            "BINARY(BYTE)" => Self::BinaryByte,
            "BINARY(HEX)" => Self::BinaryHex,
            _ => Self::Other(raw),
        }
    }
}

// Non-string tags (null, numbers) load as `Other` so the document stays usable.
impl From<Option<Value>> for MonitoringKind {
    fn from(raw: Option<Value>) -> Self {
        match raw {
            Some(Value::String(raw)) => Self::from(raw),
            None | Some(Value::Null) => Self::default(),
            Some(other) => Self::Other(other.to_string()),
        }
    }
}

impl From<MonitoringKind> for String {
    fn from(kind: MonitoringKind) -> Self {
        match kind {
            MonitoringKind::ThinQ2 => "THINQ2".into(),
            MonitoringKind::BinaryByte => "BINARY(BYTE)".into(),
            MonitoringKind::BinaryHex => "BINARY(HEX)".into(),
            MonitoringKind::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Monitoring {
    #[serde(rename = "type", default)]
    pub kind: MonitoringKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,
}

/// `Monitoring.protocol`: an alias table for THINQ2 models, or a field list
/// (superSet aliases or binary byte layouts).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Protocol {
    Fields(Vec<ProtocolField>),
    Table(Map<String, Value>),
    /// Anything else is carried but never interpreted.
    Opaque(Value),
}

impl Protocol {
    /// Raw `Value` key that a logical property name is aliased to.
    pub fn alias_for(&self, name: &str) -> Option<&str> {
        match self {
            Self::Table(table) => table.get(name).and_then(Value::as_str),
            Self::Fields(fields) => fields
                .iter()
                .find(|f| f.super_set.as_deref() == Some(name))
                .and_then(|f| f.value.as_deref()),
            Self::Opaque(_) => None,
        }
    }

    /// Field list, if the protocol has that shape.
    pub fn fields(&self) -> &[ProtocolField] {
        match self {
            Self::Fields(fields) => fields,
            _ => &[],
        }
    }
}

/// One entry of a protocol list.
///
/// Entries are read leniently: a key that is missing or of the wrong shape is
/// `None` for this entry alone, so one bad entry never hides its neighbours.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Value")]
pub struct ProtocolField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_byte: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
}

impl From<Value> for ProtocolField {
    fn from(entry: Value) -> Self {
        let text = |key: &str| entry.get(key).and_then(Value::as_str).map(str::to_string);
        let index = |key: &str| {
            entry
                .get(key)
                .and_then(Value::as_u64)
                .and_then(|n| usize::try_from(n).ok())
        };
        Self {
            value: text("value"),
            super_set: text("superSet"),
            start_byte: index("startByte"),
            length: index("length"),
        }
    }
}
