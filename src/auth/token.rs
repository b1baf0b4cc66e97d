use rand::RngCore;

/// Admin tokens are 20 random bytes rendered as lowercase hex
pub const TOKEN_HEX_LEN: usize = 40;

/// Generates a cryptographically secure admin token
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_HEX_LEN / 2];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Checks the canonical token shape before hitting the database
pub fn is_valid_token_format(token: &str) -> bool {
    token.len() == TOKEN_HEX_LEN
        && token
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
