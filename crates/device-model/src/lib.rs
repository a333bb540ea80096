//! device-model: vendor appliance model documents and telemetry decoding
//!
//! A [`DeviceModel`] wraps the JSON model document an appliance vendor ships
//! for each product. It resolves property names to typed [`ValueDescriptor`]s
//! across the several schema dialects in the wild, translates enum labels and
//! raw codes in both directions, and decodes raw monitoring payloads (JSON or
//! binary byte layouts) into named values.
//!
//! Everything is computed on demand from the immutable document; a model can
//! be shared freely between threads.

mod error;
pub use error::{ModelError, Result};

mod types;
pub use types::{DeviceModel, Monitoring, MonitoringKind, Protocol, ProtocolField};

mod value;
pub use value::{
    BitValue, EnumValue, RangeValue, ReferenceValue, StringCommentValue, ValueDescriptor,
    ValueType,
};

mod loader;

mod resolve;

mod lookup;

mod decode;
pub use decode::{MonitorData, BYTE_SHIFT, HEX_SHIFT};
