/// Checks whether a decrypted byte is plausible plaintext.
///
/// Allowed bytes are printable ASCII (32-126) plus tab, newline and
/// carriage return. Everything else disqualifies a candidate key
/// fragment.
#[inline]
pub fn is_allowed_byte(b: u8) -> bool {
    (32..=126).contains(&b) || b == b'\t' || b == b'\n' || b == b'\r'
}

/// Slice form of [`is_allowed_byte`]. Short-circuits on the first
/// disallowed byte.
#[inline]
pub fn is_allowed_slice(data: &[u8]) -> bool {
    data.iter().all(|&b| is_allowed_byte(b))
}
