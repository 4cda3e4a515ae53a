//! Base58 encoding utilities (Bitcoin alphabet, no checksum, as Solana uses)

/// Base58 encode (Solana style, no checksum)
pub fn base58_encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_zero_bytes() {
        assert_eq!(base58_encode(&[0, 0, 1]), "112");
    }

    #[test]
    fn test_system_program_id() {
        // All-zero pubkey is the Solana system program
        assert_eq!(base58_encode(&[0u8; 32]), "11111111111111111111111111111111");
    }

    #[test]
    fn test_output_avoids_excluded_chars() {
        let encoded = base58_encode(&[0xffu8; 64]);
        assert!(!encoded.contains(['0', 'O', 'I', 'l']));
    }
}
