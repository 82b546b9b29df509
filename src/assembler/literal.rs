//! Numeric literals and fixed-width bit formatting.
//!
//! Literals are either signed decimal (`-12`, `+3`, `42`) or hexadecimal
//! with a `0x` prefix (`0x1F`). Every field written to the image is masked
//! to its width, so out-of-range values wrap instead of failing.
use once_cell::sync::Lazy;
use regex::Regex;

use super::error::Error;

static DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?[0-9]+$").unwrap());
static HEXADECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0[xX]([0-9a-fA-F]+)$").unwrap());

/// Parses a decimal or `0x` hexadecimal literal.
pub fn parse_integer(text: &str) -> Result<i64, Error> {
    let invalid = || Error::InvalidLiteral { text: text.to_owned() };

    if let Some(caps) = HEXADECIMAL.captures(text) {
        i64::from_str_radix(&caps[1], 16).map_err(|_| invalid())
    } else if DECIMAL.is_match(text) {
        text.parse::<i64>().map_err(|_| invalid())
    } else {
        Err(invalid())
    }
}

/// Masks `n` to its low `width` bits, two's-complement for negatives.
pub fn mask(n: i64, width: u32) -> u16 {
    debug_assert!(width <= 16);
    let bits = if width == 16 { 0xFFFF } else { (1i64 << width) - 1 };
    (n & bits) as u16
}

/// Formats `n` as a zero-padded bit string of exactly `width` characters.
pub fn to_fixed_width(n: i64, width: u32) -> String {
    format!("{:0width$b}", mask(n, width), width = width as usize)
}

/// Formats `n` as a 16-bit two's-complement word.
pub fn to_signed_word16(n: i64) -> String {
    let n = if n < 0 { n + 65536 } else { n };
    to_fixed_width(n, 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("0").ok(), Some(0));
        assert_eq!(parse_integer("42").ok(), Some(42));
        assert_eq!(parse_integer("-42").ok(), Some(-42));
        assert_eq!(parse_integer("+7").ok(), Some(7));
        assert_eq!(parse_integer("0x1F").ok(), Some(31));
        assert_eq!(parse_integer("0XfF").ok(), Some(255));

        assert!(parse_integer("?").is_err());
        assert!(parse_integer("0x").is_err());
        assert!(parse_integer("1.5").is_err());
        assert!(parse_integer("loop").is_err());
        assert!(parse_integer("-0x5").is_err());
        assert!(parse_integer("99999999999999999999").is_err());
    }

    #[test]
    fn test_parse_integer_error_names_text() {
        match parse_integer("12abc") {
            Err(Error::InvalidLiteral { text }) => assert_eq!(text, "12abc"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_to_signed_word16() {
        assert_eq!(to_signed_word16(-1), "1111111111111111");
        assert_eq!(to_signed_word16(0), "0000000000000000");
        assert_eq!(to_signed_word16(65536), to_signed_word16(0));
        assert_eq!(to_signed_word16(5), "0000000000000101");
        assert_eq!(to_signed_word16(-32768), "1000000000000000");
    }

    #[test]
    fn test_to_fixed_width() {
        assert_eq!(to_fixed_width(3, 4), "0011");
        assert_eq!(to_fixed_width(17, 4), "0001");
        assert_eq!(to_fixed_width(2048, 12), "100000000000");
        assert_eq!(to_fixed_width(-1, 12), "111111111111");
        assert_eq!(to_fixed_width(0b1111_0000, 8), "11110000");
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask(-1, 16), 0xFFFF);
        assert_eq!(mask(0x1_2345, 16), 0x2345);
        assert_eq!(mask(4095, 12), 0x0FFF);
        assert_eq!(mask(4096, 12), 0);
    }
}
