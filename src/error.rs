use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolrmapError {
    #[error("Format error: field '{field}' cannot read '{text}' as {target}")]
    Format { field: String, target: String, text: String },
    #[error("Overflow: field '{field}' value '{text}' is out of range for {target}")]
    Overflow { field: String, target: String, text: String },
    #[error("Invalid enum value: field '{field}' value '{text}' is not a member of {target}")]
    InvalidEnumValue { field: String, target: String, text: String },
    #[error("Unsupported type: field '{field}' has no parser or serializer for {target}")]
    UnsupportedType { field: String, target: String },
    #[error("Unsupported element type: field '{field}' cannot hold {element} elements in {target}")]
    UnsupportedElementType { field: String, target: String, element: String },
    #[error("Value mismatch: field '{field}' expected {expected}, found {found}")]
    ValueMismatch { field: String, expected: String, found: String },
    #[error("Missing field name")]
    MissingField,
    #[error("Invalid field name: '{0}'")]
    InvalidFieldName(String),
    #[error("Invalid distance: {0} (must be finite and non-negative)")]
    InvalidDistance(f64),
    #[error("Invalid point: {latitude},{longitude} (coordinates must be finite)")]
    InvalidPoint { latitude: f64, longitude: f64 },
    #[error("Invalid dynamic field pattern: '{0}'")]
    InvalidPattern(String),
    #[error("Schema error: {0}")]
    Schema(String),
    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SolrmapError>;

// Helper conversions
impl From<config::ConfigError> for SolrmapError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
impl From<serde_json::Error> for SolrmapError {
    fn from(e: serde_json::Error) -> Self { Self::Schema(e.to_string()) }
}

impl SolrmapError {
    /// Names the field of a failure raised on an unnamed node, such as an
    /// element inside a multi-valued field.
    pub fn within(self, field: &str) -> Self {
        let rename = |f: String| if f == "?" { field.to_string() } else { f };
        match self {
            Self::Format { field, target, text } => Self::Format { field: rename(field), target, text },
            Self::Overflow { field, target, text } => Self::Overflow { field: rename(field), target, text },
            Self::InvalidEnumValue { field, target, text } => Self::InvalidEnumValue { field: rename(field), target, text },
            Self::UnsupportedType { field, target } => Self::UnsupportedType { field: rename(field), target },
            Self::UnsupportedElementType { field, target, element } => Self::UnsupportedElementType { field: rename(field), target, element },
            Self::ValueMismatch { field, expected, found } => Self::ValueMismatch { field: rename(field), expected, found },
            other => other,
        }
    }
}
