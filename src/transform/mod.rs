//! Deterministic value transforms reachable through `$name(...)` calls.
//!
//! A transform is a pure function of already generated text, so it never
//! contributes entropy of its own.

mod romaji;

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use itertools::Itertools;
use thiserror::Error;

pub use romaji::to_romaji;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("empty hex string")]
    EmptyHex,
    #[error("invalid hex string: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("invalid mnemonic entropy: {0}")]
    Mnemonic(#[from] bip39::Error),
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// An encoder applied to the output of its argument sub-pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    /// Lowercase hex of the UTF-8 bytes.
    Hex,
    /// Uppercase hex of the UTF-8 bytes.
    HexUpper,
    /// Hex-decode, then standard padded base64.
    Base64,
    /// Hex-decode, then URL-safe padded base64.
    Base64Url,
    /// Hex-decode, then lowercase unpadded base32.
    Base32,
    /// Hex-decode, then uppercase unpadded base32.
    Base32Upper,
    /// Hex-decode, then uppercase padded base32 (RFC 4648).
    Base32Std,
    /// Hex string to decimal string.
    Hex2Dec,
    /// Hex string to a `b'\x..'` byte literal.
    PyHex,
    /// ASCII-only string-literal escaping.
    Escape,
    /// JSON string body escaping.
    Json,
    /// Interleave characters with a separator.
    Expand(String),
    /// Hex entropy to a BIP-39 English mnemonic.
    Bip39Encode,
    /// Kana to Hepburn-style romaji.
    Romaji,
}

impl Transform {
    /// Name of the function that applies this transform.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hex => "hex",
            Self::HexUpper => "HEX",
            Self::Base64 => "base64",
            Self::Base64Url => "base64url",
            Self::Base32 => "base32",
            Self::Base32Upper => "BASE32",
            Self::Base32Std => "base32std",
            Self::Hex2Dec => "hex2dec",
            Self::PyHex => "pyhex",
            Self::Escape => "escape",
            Self::Json => "json",
            Self::Expand(sep) if sep == " " => "space",
            Self::Expand(_) => "expand",
            Self::Bip39Encode => "bip39encode",
            Self::Romaji => "romaji",
        }
    }

    pub fn apply(&self, input: &str) -> Result<String, TransformError> {
        match self {
            Self::Hex => Ok(hex::encode(input)),
            Self::HexUpper => Ok(hex::encode_upper(input)),
            Self::Base64 => Ok(STANDARD.encode(hex::decode(input)?)),
            Self::Base64Url => Ok(URL_SAFE.encode(hex::decode(input)?)),
            Self::Base32 => Ok(base32(&hex::decode(input)?, false).to_ascii_lowercase()),
            Self::Base32Upper => Ok(base32(&hex::decode(input)?, false)),
            Self::Base32Std => Ok(base32(&hex::decode(input)?, true)),
            Self::Hex2Dec => hex_to_decimal(input),
            Self::PyHex => Ok(format!(
                "b'{}'",
                hex::decode(input)?
                    .iter()
                    .map(|b| format!("\\x{b:02x}"))
                    .join("")
            )),
            Self::Escape => Ok(escape_ascii(input)),
            Self::Json => {
                let quoted = serde_json::to_string(input)?;
                Ok(quoted[1..quoted.len() - 1].to_string())
            }
            Self::Expand(sep) => Ok(input.chars().join(sep)),
            Self::Bip39Encode => {
                let mnemonic = bip39::Mnemonic::from_entropy(&hex::decode(input)?)?;
                Ok(mnemonic.words().join(" "))
            }
            Self::Romaji => Ok(to_romaji(input)),
        }
    }
}

const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

fn base32(bytes: &[u8], pad: bool) -> String {
    let mut out = String::with_capacity(bytes.len().div_ceil(5) * 8);
    for chunk in bytes.chunks(5) {
        let mut block = [0u8; 5];
        block[..chunk.len()].copy_from_slice(chunk);
        let bits = block.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
        let used = (chunk.len() * 8).div_ceil(5);
        for i in 0..8 {
            if i < used {
                let idx = (bits >> (35 - 5 * i)) & 0x1f;
                out.push(BASE32_ALPHABET[idx as usize] as char);
            } else if pad {
                out.push('=');
            }
        }
    }
    out
}

/// Arbitrary-length hex to decimal conversion.
fn hex_to_decimal(input: &str) -> Result<String, TransformError> {
    const LIMB: u64 = 1_000_000_000;
    if input.is_empty() {
        return Err(TransformError::EmptyHex);
    }
    // Little-endian base 10^9 limbs.
    let mut limbs: Vec<u64> = vec![0];
    for (index, c) in input.chars().enumerate() {
        let nibble = c
            .to_digit(16)
            .ok_or(hex::FromHexError::InvalidHexCharacter { c, index })?;
        let mut carry = u64::from(nibble);
        for limb in limbs.iter_mut() {
            let v = *limb * 16 + carry;
            *limb = v % LIMB;
            carry = v / LIMB;
        }
        if carry > 0 {
            limbs.push(carry);
        }
    }
    let mut out = String::new();
    let mut iter = limbs.iter().rev();
    if let Some(top) = iter.next() {
        out.push_str(&top.to_string());
    }
    for limb in iter {
        out.push_str(&format!("{limb:09}"));
    }
    Ok(out)
}

fn escape_ascii(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ' '..='~' => out.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{unit:04x}"));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(t: Transform, s: &str) -> String {
        t.apply(s).expect("transform should succeed")
    }

    #[test]
    fn hex_encodes_utf8() {
        assert_eq!(apply(Transform::Hex, "abc"), "616263");
        assert_eq!(apply(Transform::HexUpper, "\u{ff}"), "C3BF");
    }

    #[test]
    fn base64_variants() {
        assert_eq!(apply(Transform::Base64, "616263"), "YWJj");
        assert_eq!(apply(Transform::Base64, "fbff"), "+/8=");
        assert_eq!(apply(Transform::Base64Url, "fbff"), "-_8=");
    }

    #[test]
    fn base32_variants() {
        assert_eq!(apply(Transform::Base32Std, "616263"), "MFRGG===");
        assert_eq!(apply(Transform::Base32Upper, "616263"), "MFRGG");
        assert_eq!(apply(Transform::Base32, "616263"), "mfrgg");
        assert_eq!(apply(Transform::Base32Std, "666f6f626172"), "MZXW6YTBOI======");
        assert_eq!(apply(Transform::Base32Std, ""), "");
    }

    #[test]
    fn base64_rejects_bad_hex() {
        let err = Transform::Base64.apply("abc").unwrap_err();
        assert!(matches!(err, TransformError::Hex(_)));
        assert!(err.to_string().starts_with("invalid hex string"), "got: {err}");
    }

    #[test]
    fn hex_to_decimal_small_and_large() {
        assert_eq!(apply(Transform::Hex2Dec, "ff"), "255");
        assert_eq!(apply(Transform::Hex2Dec, "0100"), "256");
        assert_eq!(apply(Transform::Hex2Dec, "0"), "0");
        assert_eq!(
            apply(Transform::Hex2Dec, "ffffffffffffffffffffffffffffffff"),
            "340282366920938463463374607431768211455"
        );
        assert_eq!(apply(Transform::Hex2Dec, "3B9ACA00"), "1000000000");
    }

    #[test]
    fn hex_to_decimal_rejects_empty_input() {
        assert!(matches!(
            Transform::Hex2Dec.apply(""),
            Err(TransformError::EmptyHex)
        ));
        assert_eq!(apply(Transform::Hex, ""), "");
    }

    #[test]
    fn hex_to_decimal_rejects_non_hex() {
        let err = Transform::Hex2Dec.apply("12g4").unwrap_err();
        assert!(
            matches!(
                err,
                TransformError::Hex(hex::FromHexError::InvalidHexCharacter { c: 'g', index: 2 })
            ),
            "got: {err:?}"
        );
    }

    #[test]
    fn pyhex_byte_literal() {
        assert_eq!(apply(Transform::PyHex, "00ff41"), "b'\\x00\\xff\\x41'");
    }

    #[test]
    fn escape_is_ascii_only() {
        assert_eq!(apply(Transform::Escape, "a\"b\\c\n"), "a\\\"b\\\\c\\n");
        assert_eq!(apply(Transform::Escape, "\u{3042}"), "\\u3042");
        assert_eq!(apply(Transform::Escape, "\u{1f600}"), "\\ud83d\\ude00");
    }

    #[test]
    fn json_keeps_unicode() {
        assert_eq!(apply(Transform::Json, "a\"\u{3042}\n"), "a\\\"\u{3042}\\n");
    }

    #[test]
    fn expand_interleaves() {
        assert_eq!(apply(Transform::Expand(" ".into()), "abc"), "a b c");
        assert_eq!(apply(Transform::Expand("--".into()), "ab"), "a--b");
        assert_eq!(apply(Transform::Expand("-".into()), ""), "");
    }

    #[test]
    fn bip39_zero_entropy() {
        let words = apply(Transform::Bip39Encode, &"00".repeat(16));
        assert_eq!(
            words,
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about"
        );
    }

    #[test]
    fn bip39_rejects_short_entropy() {
        let err = Transform::Bip39Encode.apply("00ff").unwrap_err();
        assert!(matches!(err, TransformError::Mnemonic(_)));
    }
}
