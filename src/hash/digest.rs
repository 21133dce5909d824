//! Digest values and their textual renderings
//!
//! Hex is the default rendering. The other alphabets treat the digest bytes
//! as one big-endian unsigned integer and write it out in base 10, 26 or 36,
//! most significant digit first, which gives shorter names for the same
//! digest (handy for cache keys and file names).

use crate::config::HashAlgorithm;
use crate::error::HashBenchError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Output alphabet for rendering a digest as text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Alphabet {
    /// Base 16, `0-9a-f`
    #[default]
    Hex,
    /// Base 10, `0-9`
    #[serde(rename = "dec")]
    Decimal,
    /// Base 26, `a-z`
    #[serde(rename = "abc")]
    Alpha,
    /// Base 36, `0-9a-z`
    AlphaNum,
}

impl Alphabet {
    /// Digits of this alphabet, lowest value first
    pub fn symbols(&self) -> &'static [u8] {
        match self {
            Self::Hex => b"0123456789abcdef",
            Self::Decimal => b"0123456789",
            Self::Alpha => b"abcdefghijklmnopqrstuvwxyz",
            Self::AlphaNum => b"0123456789abcdefghijklmnopqrstuvwxyz",
        }
    }

    /// Numeric base
    pub fn base(&self) -> u32 {
        self.symbols().len() as u32
    }

    /// Canonical name, as accepted by [`FromStr`]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hex => "hex",
            Self::Decimal => "dec",
            Self::Alpha => "abc",
            Self::AlphaNum => "alphanum",
        }
    }
}

impl FromStr for Alphabet {
    type Err = HashBenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hex" | "16" | "base16" => Ok(Self::Hex),
            "dec" | "10" | "base10" => Ok(Self::Decimal),
            "abc" | "alpha" | "26" | "base26" => Ok(Self::Alpha),
            "alphanum" | "36" | "base36" => Ok(Self::AlphaNum),
            _ => Err(HashBenchError::UnsupportedAlphabet(s.to_string())),
        }
    }
}

impl std::fmt::Display for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Finalized digest bytes tagged with the algorithm that produced them
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest {
    algorithm: HashAlgorithm,
    bytes: Vec<u8>,
}

impl Digest {
    /// Wrap raw digest bytes
    pub fn new(algorithm: HashAlgorithm, bytes: Vec<u8>) -> Self {
        Self { algorithm, bytes }
    }

    /// Algorithm that produced this digest
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercase hex rendering
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Render in the given alphabet
    pub fn encode(&self, alphabet: Alphabet) -> String {
        match alphabet {
            Alphabet::Hex => self.to_hex(),
            other => encode_base(&self.bytes, other),
        }
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Big-endian bytes to base-N digits by repeated long division.
fn encode_base(bytes: &[u8], alphabet: Alphabet) -> String {
    let symbols = alphabet.symbols();
    let base = alphabet.base();

    let mut number: Vec<u8> = bytes.iter().copied().skip_while(|&b| b == 0).collect();
    if number.is_empty() {
        return (symbols[0] as char).to_string();
    }

    let mut digits = Vec::new();
    while !number.is_empty() {
        let mut remainder = 0u32;
        let mut quotient = Vec::with_capacity(number.len());
        for &byte in &number {
            let acc = (remainder << 8) | byte as u32;
            let q = acc / base;
            remainder = acc % base;
            if !(quotient.is_empty() && q == 0) {
                quotient.push(q as u8);
            }
        }
        digits.push(symbols[remainder as usize]);
        number = quotient;
    }

    digits.iter().rev().map(|&d| d as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest(bytes: &[u8]) -> Digest {
        Digest::new(HashAlgorithm::Sha256, bytes.to_vec())
    }

    #[test]
    fn test_hex_encoding() {
        assert_eq!(digest(&[0x00, 0xab, 0xff]).to_hex(), "00abff");
        assert_eq!(digest(&[0x00, 0xab, 0xff]).encode(Alphabet::Hex), "00abff");
    }

    #[test]
    fn test_decimal_encoding() {
        assert_eq!(digest(&[0x01, 0x00]).encode(Alphabet::Decimal), "256");
        assert_eq!(digest(&[0xff, 0xff, 0xff, 0xff]).encode(Alphabet::Decimal), "4294967295");
    }

    #[test]
    fn test_alpha_encoding() {
        // 26 = "ba", 27 = "bb" with a=0
        assert_eq!(digest(&[26]).encode(Alphabet::Alpha), "ba");
        assert_eq!(digest(&[27]).encode(Alphabet::Alpha), "bb");
        assert_eq!(digest(&[25]).encode(Alphabet::Alpha), "z");
    }

    #[test]
    fn test_alphanum_encoding() {
        assert_eq!(digest(&[35]).encode(Alphabet::AlphaNum), "z");
        assert_eq!(digest(&[36]).encode(Alphabet::AlphaNum), "10");
        assert_eq!(digest(&[0x00, 0x00, 0x01, 0x00]).encode(Alphabet::AlphaNum), "74");
    }

    #[test]
    fn test_zero_digest_renders_zero_digit() {
        assert_eq!(digest(&[0, 0, 0]).encode(Alphabet::Decimal), "0");
        assert_eq!(digest(&[0, 0]).encode(Alphabet::Alpha), "a");
        assert_eq!(digest(&[]).encode(Alphabet::AlphaNum), "0");
    }

    #[test]
    fn test_matches_u128_formatting() {
        let value: u128 = 0x99aa06d3014798d86001c324468d497f;
        let d = digest(&value.to_be_bytes());
        assert_eq!(d.encode(Alphabet::Decimal), value.to_string());
    }

    #[test]
    fn test_alphabet_from_str() {
        assert_eq!("hex".parse::<Alphabet>().unwrap(), Alphabet::Hex);
        assert_eq!("ABC".parse::<Alphabet>().unwrap(), Alphabet::Alpha);
        assert_eq!("36".parse::<Alphabet>().unwrap(), Alphabet::AlphaNum);
        let err = "base64".parse::<Alphabet>().unwrap_err();
        assert!(matches!(err, HashBenchError::UnsupportedAlphabet(_)));
    }
}
