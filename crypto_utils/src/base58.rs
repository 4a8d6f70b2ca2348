//! Base58check codec with the Bitcoin alphabet.
//!
//! The checksum is the first four bytes of [`sha256d`](crate::hash::sha256d)
//! over the payload, appended before encoding and stripped after decoding.

use thiserror::Error;

/// Number of checksum bytes appended by base58check.
pub const CHECKSUM_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Base58Error {
    #[error("invalid base58 character {character:?} at index {index}")]
    InvalidCharacter { character: char, index: usize },
    #[error("non-ascii character at index {index}")]
    NonAsciiCharacter { index: usize },
    #[error("base58check checksum mismatch")]
    InvalidChecksum,
    #[error("decoded data is shorter than the 4-byte checksum")]
    MissingChecksum,
    #[error("base58 decoding failed: {0}")]
    Other(String),
}

impl From<bs58::decode::Error> for Base58Error {
    fn from(err: bs58::decode::Error) -> Self {
        match err {
            bs58::decode::Error::InvalidCharacter { character, index } => {
                Base58Error::InvalidCharacter { character, index }
            }
            bs58::decode::Error::NonAsciiCharacter { index } => {
                Base58Error::NonAsciiCharacter { index }
            }
            bs58::decode::Error::InvalidChecksum { .. } => Base58Error::InvalidChecksum,
            bs58::decode::Error::NoChecksum => Base58Error::MissingChecksum,
            other => Base58Error::Other(other.to_string()),
        }
    }
}

/// Plain base58 without a checksum.
pub fn base58_encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

pub fn base58_decode(s: &str) -> Result<Vec<u8>, Base58Error> {
    Ok(bs58::decode(s).into_vec()?)
}

/// Append the 4-byte double-SHA256 checksum and base58-encode.
pub fn base58_check_encode(payload: &[u8]) -> String {
    bs58::encode(payload).with_check().into_string()
}

/// Decode, verify and strip the checksum. Returns only the payload.
pub fn base58_check_decode(s: &str) -> Result<Vec<u8>, Base58Error> {
    Ok(bs58::decode(s).with_check(None).into_vec()?)
}
