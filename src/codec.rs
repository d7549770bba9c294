use thiserror::Error;

/// The base-62 digit alphabet: uppercase block, lowercase block, digits.
///
/// The ordering is part of the wire contract — previously issued codes
/// decode against exactly this sequence, so it must never be reordered.
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const BASE: i64 = 62;

/// A short code that cannot be decoded into an identifier.
///
/// Both variants are surfaced to external callers as "not found" so that
/// well-formed and malformed codes are indistinguishable from outside.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("invalid character '{ch}' in short code at position {pos}")]
    InvalidChar { ch: char, pos: usize },
    #[error("short code does not fit in a 64-bit identifier")]
    Overflow,
}

/// Encode an identifier as a base-62 short code.
///
/// Repeated division collects remainders least-significant-first; the digit
/// sequence is then reversed and mapped through [`ALPHABET`]. Identifier `0`
/// encodes to the empty string (the digit loop never runs), and the leading
/// digit is never the alphabet's zero character. Identifiers are assigned
/// starting at 1, so the empty code is never issued in practice.
pub fn encode(mut id: i64) -> String {
    let mut digits = Vec::new();
    while id > 0 {
        digits.push((id % BASE) as usize);
        id /= BASE;
    }

    let mut code = String::with_capacity(digits.len());
    for &digit in digits.iter().rev() {
        code.push(ALPHABET[digit] as char);
    }
    code
}

/// Decode a base-62 short code back into an identifier.
///
/// Reads most-significant digit first, accumulating `id = id * 62 + digit`.
/// Any character outside the alphabet is an error; so is a code whose value
/// exceeds `i64::MAX` (checked arithmetic — the value never silently wraps).
///
/// Non-canonical codes that `encode` can never produce (a leading `'A'`
/// digit, the empty string) still decode arithmetically; only re-encoding
/// them is not guaranteed to round-trip.
pub fn decode(code: &str) -> Result<i64, CodecError> {
    let mut id: i64 = 0;
    for (pos, ch) in code.chars().enumerate() {
        let digit = ALPHABET
            .iter()
            .position(|&a| a as char == ch)
            .ok_or(CodecError::InvalidChar { ch, pos })? as i64;

        id = id
            .checked_mul(BASE)
            .and_then(|v| v.checked_add(digit))
            .ok_or(CodecError::Overflow)?;
    }
    Ok(id)
}
