// Licensed under the Apache-2.0 license

//! Scalar parsing helpers for descriptor attributes.
//!
//! Every helper returns a human-readable reason on failure; the caller wraps
//! it into a [`crate::DescriptorError::MalformedDescriptor`] together with the
//! element and attribute it came from.

/// Parses a base-16 integer, with or without a `0x`/`0X` prefix.
///
/// # Examples
/// ```
/// use xo_descriptor::util::parse_hex;
/// assert_eq!(parse_hex("0x10"), Ok(16));
/// assert_eq!(parse_hex("FFFFFFFFFFFFFFFF"), Ok(u64::MAX));
/// assert!(parse_hex("0x").is_err());
/// ```
pub fn parse_hex(value: &str) -> Result<u64, String> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("is not a hexadecimal integer: {value:?}"));
    }
    u64::from_str_radix(digits, 16)
        .map_err(|err| format!("is not a hexadecimal integer: {value:?} ({err})"))
}

/// Parses a decimal integer.
pub fn parse_decimal(value: &str) -> Result<u32, String> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|err| format!("is not a decimal integer: {value:?} ({err})"))
}

/// Parses a `"true"`/`"false"` flag. Nothing else is accepted.
pub fn parse_bool(value: &str) -> Result<bool, String> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(format!("must be \"true\" or \"false\", found {value:?}")),
    }
}

/// Formats an integer the way descriptor documents write hex fields.
pub fn hex(value: u64) -> String {
    format!("{value:#x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_prefixes() {
        assert_eq!(parse_hex("0x0"), Ok(0));
        assert_eq!(parse_hex("0X1000"), Ok(0x1000));
        assert_eq!(parse_hex("1c"), Ok(0x1c));
        assert_eq!(parse_hex(" 0x8 "), Ok(8));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("").is_err());
        assert!(parse_hex("0xg0").is_err());
        assert!(parse_hex("-0x4").is_err());
        assert!(parse_hex("0x+10").is_err());
        assert!(parse_hex("+4").is_err());
        assert!(parse_hex("0x 10").is_err());
        // Wider than 64 bits.
        assert!(parse_hex("0x10000000000000000").is_err());
    }

    #[test]
    fn test_hex_reformats_parsed_values() {
        for text in ["0x0", "0x10", "0x1000", "0xffffffffffffffff"] {
            assert_eq!(hex(parse_hex(text).unwrap()), text);
        }
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Ok(true));
        assert_eq!(parse_bool("false"), Ok(false));
        assert!(parse_bool("1").is_err());
        assert!(parse_bool("True").is_err());
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("512"), Ok(512));
        assert!(parse_decimal("0x20").is_err());
    }
}
