use crate::{DeviceModel, MonitoringKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

/// Shift per step for `BINARY(BYTE)` telemetry.
pub const BYTE_SHIFT: u32 = 8;
/// Shift per step for `BINARY(HEX)` telemetry.
pub const HEX_SHIFT: u32 = 16;

/// Decoded telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(untagged)]
pub enum MonitorData {
    /// Binary fields in protocol order; `None` marks a field that could not
    /// be read.
    Fields(IndexMap<String, Option<String>>),
    Json(Value),
    /// Payload that was neither binary nor valid JSON, returned untouched.
    Raw(Vec<u8>),
}

impl MonitorData {
    /// Value of a named field, as a string for binary data or as JSON.
    pub fn get(&self, field: &str) -> Option<Value> {
        match self {
            Self::Fields(fields) => fields
                .get(field)
                .map(|v| v.clone().map_or(Value::Null, Value::String)),
            Self::Json(v) => v.get(field).cloned(),
            Self::Raw(_) => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}

impl DeviceModel {
    /// Decode one telemetry payload according to `Monitoring.type`.
    pub fn decode_monitor(&self, raw: impl AsRef<[u8]>) -> MonitorData {
        let raw = raw.as_ref();
        match self.monitoring_kind() {
            Some(MonitoringKind::BinaryByte) => {
                MonitorData::Fields(self.decode_monitor_binary(raw, BYTE_SHIFT))
            }
            Some(MonitoringKind::BinaryHex) => {
                MonitorData::Fields(self.decode_monitor_binary(raw, HEX_SHIFT))
            }
            _ => match serde_json::from_slice::<Value>(raw) {
                Ok(v) => MonitorData::Json(v),
                Err(err) => {
                    debug!(%err, len = raw.len(), "telemetry is not JSON, passing through");
                    MonitorData::Raw(raw.to_vec())
                }
            },
        }
    }

    /// Decode every byte-layout field of `Monitoring.protocol` as a
    /// big-endian integer, `shift` bits per byte.
    pub fn decode_monitor_binary(
        &self,
        raw: &[u8],
        shift: u32,
    ) -> IndexMap<String, Option<String>> {
        let fields = self
            .monitoring
            .as_ref()
            .and_then(|m| m.protocol.as_ref())
            .map(|p| p.fields())
            .unwrap_or_default();

        let mut out = IndexMap::with_capacity(fields.len());
        for field in fields {
            let Some(name) = field.value.as_deref() else {
                debug!(?field, "skipping protocol entry without a field name");
                continue;
            };
            let decoded = match (field.start_byte, field.length) {
                (Some(start), Some(len)) => accumulate(raw, start, len, shift),
                _ => None,
            };
            trace!(field = name, ?decoded, "binary field");
            out.insert(name.to_string(), decoded.map(|n| n.to_string()));
        }
        out
    }
}

// None when the range is empty, runs past the payload, or the value overflows.
fn accumulate(raw: &[u8], start: usize, len: usize, shift: u32) -> Option<u64> {
    if len == 0 {
        return None;
    }
    let end = start.checked_add(len)?;
    let bytes = raw.get(start..end)?;
    let step = 1u64.checked_shl(shift)?;
    bytes
        .iter()
        .try_fold(0u64, |acc, &b| acc.checked_mul(step)?.checked_add(u64::from(b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn binary(kind: &str) -> DeviceModel {
        DeviceModel::from_value(json!({
            "Monitoring": {
                "type": kind,
                "protocol": [
                    {"value": "Temp", "startByte": 0, "length": 2},
                    {"value": "State", "startByte": 2, "length": 1},
                    {"value": "Tail", "startByte": 3, "length": 4},
                    {"value": "NoLayout"}
                ]
            }
        }))
        .unwrap()
    }

    #[test]
    fn binary_byte_big_endian() {
        let model = binary("BINARY(BYTE)");
        let MonitorData::Fields(fields) = model.decode_monitor([0x01u8, 0x2C, 0x05]) else {
            panic!("expected fields");
        };
        assert_eq!(fields["Temp"].as_deref(), Some("300"));
        assert_eq!(fields["State"].as_deref(), Some("5"));
        assert_eq!(fields["Tail"], None);
        assert_eq!(fields["NoLayout"], None);
        let order: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(order, ["Temp", "State", "Tail", "NoLayout"]);
    }

    #[test]
    fn binary_hex_uses_sixteen_bit_steps() {
        let model = binary("BINARY(HEX)");
        let data = model.decode_monitor([0x01u8, 0x02, 0x03, 0, 0, 0, 1]);
        assert_eq!(data.get("Temp"), Some(json!(((1u64 << 16) + 2).to_string())));
        assert_eq!(data.get("State"), Some(json!("3")));
        assert_eq!(data.get("Tail"), Some(json!("1")));
        assert_eq!(data.get("NoLayout"), Some(Value::Null));
    }

    #[test]
    fn binary_overflow_is_missing() {
        let model = DeviceModel::from_value(json!({
            "Monitoring": {
                "type": "BINARY(HEX)",
                "protocol": [
                    {"value": "Wide", "startByte": 0, "length": 5},
                    {"value": "Narrow", "startByte": 0, "length": 1}
                ]
            }
        }))
        .unwrap();
        let fields = model.decode_monitor_binary(&[0xFF; 5], HEX_SHIFT);
        assert_eq!(fields["Wide"], None);
        assert_eq!(fields["Narrow"].as_deref(), Some("255"));
    }

    #[test]
    fn malformed_binary_field_degrades_alone() {
        let model = DeviceModel::from_value(json!({
            "Monitoring": {
                "type": "BINARY(BYTE)",
                "protocol": [
                    {"value": "Temp", "startByte": 0, "length": 2},
                    {"value": "Bad", "startByte": "2", "length": 1},
                    {"value": "Negative", "startByte": -1, "length": 1},
                    {"value": "Empty", "startByte": 2, "length": 0},
                    {"startByte": 2, "length": 1},
                    {"value": "State", "startByte": 2, "length": 1}
                ]
            }
        }))
        .unwrap();
        let MonitorData::Fields(fields) = model.decode_monitor([0x01u8, 0x2C, 0x05]) else {
            panic!("expected fields");
        };
        let order: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(order, ["Temp", "Bad", "Negative", "Empty", "State"]);
        assert_eq!(fields["Temp"].as_deref(), Some("300"));
        assert_eq!(fields["Bad"], None);
        assert_eq!(fields["Negative"], None);
        assert_eq!(fields["Empty"], None);
        assert_eq!(fields["State"].as_deref(), Some("5"));
    }

    #[test]
    fn null_monitoring_type_falls_back_to_json() {
        let model = DeviceModel::from_value(json!({
            "Monitoring": {"type": null, "protocol": []},
            "Value": {}
        }))
        .unwrap();
        assert_eq!(model.decode_monitor(r#"{"a":1}"#), MonitorData::Json(json!({"a": 1})));
    }

    #[test]
    fn binary_without_field_list_is_empty() {
        let model = DeviceModel::from_value(json!({
            "Monitoring": {"type": "BINARY(BYTE)", "protocol": {"a": "b"}}
        }))
        .unwrap();
        assert_eq!(model.decode_monitor([1u8]), MonitorData::Fields(IndexMap::new()));
    }

    #[test]
    fn json_telemetry() {
        let model = DeviceModel::from_value(json!({
            "Monitoring": {"type": "THINQ2", "protocol": {}}
        }))
        .unwrap();
        assert_eq!(model.decode_monitor(r#"{"a":1}"#), MonitorData::Json(json!({"a": 1})));
        assert_eq!(model.decode_monitor(r#"{"a":1}"#).get("a"), Some(json!(1)));
    }

    #[test]
    fn non_json_passes_through() {
        let model = DeviceModel::default();
        let data = model.decode_monitor("not json");
        assert!(data.is_raw());
        assert_eq!(data, MonitorData::Raw(b"not json".to_vec()));
        assert_eq!(data.get("a"), None);
        assert!(model.decode_monitor([0xFFu8, 0xFE]).is_raw());
    }
}
