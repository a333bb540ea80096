use thiserror::Error;

pub type Result<T, E = ModelError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ModelError {
    /// A value definition carries a type tag outside the five known kinds.
    #[error("unsupported value type: {raw:?}")]
    UnsupportedValueType { raw: String },
    #[error("invalid device model document: {0}")]
    Parse(#[from] serde_json::Error),
}
