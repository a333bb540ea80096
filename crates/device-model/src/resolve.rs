use crate::{DeviceModel, MonitoringKind, Result, ValueDescriptor};
use serde_json::Value;
use tracing::debug;

impl DeviceModel {
    /// Resolve a property name to its typed descriptor.
    ///
    /// Names missing from `Value` are retried through the `Monitoring.protocol`
    /// alias table when the model declares `THINQ2` monitoring. A name that
    /// resolves to nothing is `Ok(None)`; an unknown type tag is an error.
    pub fn resolve(&self, name: &str) -> Result<Option<ValueDescriptor>> {
        match self.definition(name) {
            Some(def) => ValueDescriptor::from_definition(def, self),
            None => Ok(None),
        }
    }

    /// Raw `Value` entry for `name`, following THINQ2 aliases.
    pub fn definition(&self, name: &str) -> Option<&Value> {
        let values = self.values.as_ref()?;
        if let Some(def) = values.get(name) {
            return Some(def);
        }
        let monitoring = self.monitoring.as_ref()?;
        if monitoring.kind != MonitoringKind::ThinQ2 {
            return None;
        }
        let target = monitoring.protocol.as_ref()?.alias_for(name)?;
        debug!(name, target, "following monitoring protocol alias");
        values.get(target)
    }
}
