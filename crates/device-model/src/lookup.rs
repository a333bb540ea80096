//! Label/code translation on top of [`DeviceModel::resolve`].
//!
//! None of these fail: misses and unresolvable definitions come back as `None`.

use crate::{DeviceModel, RangeValue, ValueDescriptor};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::warn;

impl DeviceModel {
    /// The `default` field of `Value[name]`, with no alias handling.
    pub fn default_value(&self, name: &str) -> Option<&Value> {
        self.values.as_ref()?.get(name)?.get("default")
    }

    fn resolve_lenient(&self, key: &str) -> Option<ValueDescriptor> {
        match self.resolve(key) {
            Ok(desc) => desc,
            Err(err) => {
                warn!(key, %err, "treating unresolvable value as absent");
                None
            }
        }
    }

    pub fn enum_options(&self, key: &str) -> Option<IndexMap<String, String>> {
        match self.resolve_lenient(key)? {
            ValueDescriptor::Enum(e) => Some(e.options),
            _ => None,
        }
    }

    pub fn range(&self, key: &str) -> Option<RangeValue> {
        match self.resolve_lenient(key)? {
            ValueDescriptor::Range(r) => Some(r),
            _ => None,
        }
    }

    pub fn bit_options(&self, key: &str) -> Option<IndexMap<String, Value>> {
        match self.resolve_lenient(key)? {
            ValueDescriptor::Bit(b) => Some(b.options),
            _ => None,
        }
    }

    /// Label set declared for `start_bit` of a bit-field value.
    pub fn bit_name(&self, key: &str, start_bit: &str) -> Option<Value> {
        self.bit_options(key)?.swap_remove(start_bit)
    }

    /// Raw code for an enum label. Labels shared by several codes map to the
    /// last such code.
    pub fn enum_value(&self, key: &str, label: &str) -> Option<String> {
        let options = self.enum_options(key)?;
        let by_label: HashMap<&str, &str> = options
            .iter()
            .map(|(code, label)| (label.as_str(), code.as_str()))
            .collect();
        by_label.get(label).map(|code| code.to_string())
    }

    /// Label for an enum raw code.
    pub fn enum_name(&self, key: &str, code: &str) -> Option<String> {
        self.enum_options(key)?.swap_remove(code)
    }

    /// Display name of `code` inside a referenced section: its `_comment`,
    /// falling back to `label`.
    pub fn reference_name(&self, key: &str, code: &str) -> Option<String> {
        let ValueDescriptor::Reference(r) = self.resolve_lenient(key)? else {
            return None;
        };
        let entry = r.reference.get(code)?;
        ["_comment", "label"]
            .iter()
            .find_map(|field| entry.get(*field).and_then(Value::as_str))
            .map(str::to_string)
    }

    /// Code -> label table for a monitored field. Enum options from `Value`
    /// win; the legacy `MonitoringValue[key].valueMapping` is the fallback.
    /// Legacy entries are reduced to their `label`; entries without one are
    /// left out.
    pub fn monitoring_value_mapping(&self, key: &str) -> Option<IndexMap<String, String>> {
        if self.values.is_some() {
            if let Some(options) = self.enum_options(key) {
                return Some(options);
            }
        }
        let legacy = self.legacy_mapping(key)?;
        Some(
            legacy
                .iter()
                .filter_map(|(code, entry)| Some((code.clone(), legacy_label(entry)?.to_string())))
                .collect(),
        )
    }

    /// Label of a monitored raw code, or `default` when a legacy model has no
    /// label for it.
    pub fn lookup_monitor_value(
        &self,
        key: &str,
        code: &str,
        default: Option<&str>,
    ) -> Option<String> {
        if self.values.is_some() {
            return self.enum_name(key, code);
        }
        self.legacy_mapping(key)
            .and_then(|m| m.get(code))
            .and_then(legacy_label)
            .or(default)
            .map(str::to_string)
    }

    /// Raw code whose label is `label`; inverse of
    /// [`lookup_monitor_value`](Self::lookup_monitor_value).
    pub fn lookup_monitor_name(&self, key: &str, label: &str) -> Option<String> {
        if self.values.is_some() {
            return self.enum_value(key, label);
        }
        self.legacy_mapping(key)?
            .iter()
            .find(|(_, entry)| legacy_label(entry) == Some(label))
            .map(|(code, _)| code.clone())
    }

    fn legacy_mapping(&self, key: &str) -> Option<&Map<String, Value>> {
        self.monitoring_value
            .as_ref()?
            .get(key)?
            .get("valueMapping")?
            .as_object()
    }
}

fn legacy_label(entry: &Value) -> Option<&str> {
    entry.get("label").and_then(Value::as_str)
}
