use crate::{DeviceModel, Result};
use serde_json::Value;
use std::str::FromStr;

impl DeviceModel {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_json_slice(raw: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(raw)?)
    }

    /// Build a model from an already parsed document.
    pub fn from_value(doc: Value) -> Result<Self> {
        Ok(serde_json::from_value(doc)?)
    }
}

impl FromStr for DeviceModel {
    type Err = crate::ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_json_str(s)
    }
}
