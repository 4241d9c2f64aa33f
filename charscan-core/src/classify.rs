//! Code point predicates for encoding-suspicious text.
//!
//! Values are classified after decoding as UTF-8. Bytes that do not decode
//! become U+FFFD, which lies above 255 and therefore always classifies as
//! offending.

use std::borrow::Cow;

/// Highest code point representable in a single Latin-1 byte.
const LATIN1_MAX: u32 = 255;

/// C1 control block, inclusive.
const C1_CONTROLS: std::ops::RangeInclusive<u32> = 128..=159;

/// Positions left undefined by Windows-1252.
const CP1252_UNDEFINED: [u32; 5] = [129, 141, 143, 144, 157];

/// Returns true if any code point is above 255 or inside the C1 control range.
pub fn is_unusual_latin1(value: &str) -> bool {
    value.chars().map(u32::from).any(|cp| cp > LATIN1_MAX || C1_CONTROLS.contains(&cp))
}

/// Returns true if any code point is above 255 or is one of the five
/// positions Windows-1252 leaves undefined.
pub fn is_unusual_cp1252(value: &str) -> bool {
    value
        .chars()
        .map(u32::from)
        .any(|cp| cp > LATIN1_MAX || CP1252_UNDEFINED.contains(&cp))
}

/// A value is offending when either predicate flags it.
pub fn is_offending(value: &str) -> bool {
    is_unusual_latin1(value) || is_unusual_cp1252(value)
}

/// Decodes raw column bytes, substituting U+FFFD for invalid sequences.
pub fn decode_value(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

/// Classifies raw column bytes.
pub fn is_offending_bytes(bytes: &[u8]) -> bool {
    is_offending(&decode_value(bytes))
}
