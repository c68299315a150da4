use thiserror::Error;

/// Key conversion errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyCodecError {
    #[error("invalid base58 encoding: {0}")]
    InvalidEncoding(String),

    #[error("invalid byte array: {0}")]
    InvalidByteArray(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_encoding() {
        let err = KeyCodecError::InvalidEncoding("character '0' at index 0".into());
        assert_eq!(
            err.to_string(),
            "invalid base58 encoding: character '0' at index 0"
        );
    }

    #[test]
    fn display_invalid_byte_array() {
        let err = KeyCodecError::InvalidByteArray("empty byte list".into());
        assert_eq!(err.to_string(), "invalid byte array: empty byte list");
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> =
            Box::new(KeyCodecError::InvalidEncoding("test".into()));
        assert!(err.to_string().contains("test"));
    }
}
