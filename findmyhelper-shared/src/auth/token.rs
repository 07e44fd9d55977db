/// Opaque token generation
///
/// Session cookies and email-verification links both carry opaque random
/// tokens: 32 bytes from the OS RNG, hex-encoded to 64 characters. Tokens are
/// bearer secrets; they are stored server-side and compared by equality.
use rand::RngCore;

/// Hex length of a generated token (32 random bytes)
pub const TOKEN_LEN: usize = 64;

/// Generates a new opaque token
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
    }
}
