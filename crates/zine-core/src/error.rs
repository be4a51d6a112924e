//! Error types for zine

use thiserror::Error;

/// The main error type for zine operations
///
/// Only configuration handling and image export can fail. The animation
/// engine itself degrades silently instead of returning errors.
#[derive(Debug, Error)]
pub enum ZineError {
    #[error("Config parse error: {0}")]
    ConfigParse(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("Invalid enum value: {value} is not one of {allowed:?}")]
    InvalidEnumValue {
        value: String,
        allowed: Vec<String>,
    },

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("Surface too large: {width}x{height} exceeds {max} pixels per side")]
    SurfaceTooLarge { width: u32, height: u32, max: u32 },
}

/// Result type alias for zine operations
pub type Result<T> = std::result::Result<T, ZineError>;

impl From<toml::de::Error> for ZineError {
    fn from(err: toml::de::Error) -> Self {
        ZineError::ConfigParse(err.to_string())
    }
}

impl From<toml::ser::Error> for ZineError {
    fn from(err: toml::ser::Error) -> Self {
        ZineError::TomlSerError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_message_names_field() {
        let err = ZineError::ValueOutOfRange {
            field: "ease_factor".into(),
            min: 0.0,
            max: 1.0,
            value: 3.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("ease_factor"));
        assert!(msg.contains('3'));
    }

    #[test]
    fn toml_errors_convert_to_config_parse() {
        let bad: std::result::Result<toml::Value, _> = toml::from_str("key = [");
        let err: ZineError = bad.unwrap_err().into();
        assert!(matches!(err, ZineError::ConfigParse(_)));
    }
}
