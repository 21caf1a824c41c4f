use base64::{DecodeError, Engine, engine::general_purpose};

/// Base64 encode data using the STANDARD engine
pub(crate) fn base64_encode_standard(data: &[u8]) -> String {
    general_purpose::STANDARD.encode(data)
}

/// Base64 decode data using the STANDARD engine
pub(crate) fn base64_decode_standard(data: &str) -> Result<Vec<u8>, DecodeError> {
    general_purpose::STANDARD.decode(data)
}

#[cfg(test)]
mod tests {
    use super::{base64_decode_standard, base64_encode_standard};

    #[test]
    fn test_base64_encode_standard() {
        let result = base64_encode_standard(b"Look at all the samples");
        assert_eq!(result, "TG9vayBhdCBhbGwgdGhlIHNhbXBsZXM=")
    }

    #[test]
    fn test_base64_decode_standard() {
        let result = base64_decode_standard("TG9vayBhdCBhbGwgdGhlIHNhbXBsZXM=").unwrap();
        assert_eq!(result, b"Look at all the samples")
    }
}
