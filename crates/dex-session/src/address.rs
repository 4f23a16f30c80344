use alloy_primitives::Address;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,
    #[error("`{0}` is not a 20-byte hex address")]
    Malformed(String),
    #[error("`{0}` has an invalid EIP-55 checksum")]
    BadChecksum(String),
}

/// Accepts an optionally `0x`-prefixed 40-digit hex address. Single-case input
/// is taken as-is; mixed-case input must carry a valid EIP-55 checksum.
pub fn parse_token_address(raw: &str) -> Result<Address, AddressError> {
    let input = raw.trim();
    if input.is_empty() {
        return Err(AddressError::Empty);
    }

    let hex = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    if hex.len() != 40 || !hex.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return Err(AddressError::Malformed(input.to_owned()));
    }

    let address = format!("0x{hex}")
        .parse::<Address>()
        .map_err(|_| AddressError::Malformed(input.to_owned()))?;

    let has_lower = hex.bytes().any(|byte| byte.is_ascii_lowercase());
    let has_upper = hex.bytes().any(|byte| byte.is_ascii_uppercase());
    if has_lower && has_upper && address.to_checksum(None) != format!("0x{hex}") {
        return Err(AddressError::BadChecksum(input.to_owned()));
    }

    Ok(address)
}
