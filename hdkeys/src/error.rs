use crypto_utils::base58::Base58Error;
use thiserror::Error;

/// Failures of key derivation, path parsing and extended key decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Bip32Error {
    #[error("seed must be 16 to 64 bytes long, got {0}")]
    InvalidSeedLength(usize),
    #[error("seed does not produce a valid master key")]
    InvalidSeed,
    #[error("cannot derive hardened child {index:#010x} from a public key")]
    Protocol { index: u32 },
    #[error("child {index:#010x} is not a valid key for this parent")]
    DerivationOverflow { index: u32 },
    #[error("maximum depth of 255 reached")]
    DepthOverflow,
    #[error("malformed extended key: {0}")]
    MalformedEncoding(#[from] DecodeError),
    #[error("base58check checksum mismatch")]
    ChecksumMismatch,
    #[error("invalid derivation path segment {segment:?}")]
    InvalidPath { segment: String },
}

/// The layout invariant an extended key encoding violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("expected 78 bytes, got {0}")]
    InvalidLength(usize),
    #[error("unknown version bytes {}", hex::encode(.0))]
    UnknownVersion([u8; 4]),
    #[error("key data is not a valid compressed point")]
    InvalidPoint,
    #[error("private key data must start with 0x00, found {0:#04x}")]
    PrivateKeyMarker(u8),
    #[error("private key is zero or not below the curve order")]
    InvalidPrivateKey,
    #[error("depth 0 with non-zero parent fingerprint")]
    ZeroDepthFingerprint,
    #[error("depth 0 with non-zero child index")]
    ZeroDepthIndex,
    #[error("too short to hold a base58check checksum")]
    MissingChecksum,
    #[error("{0}")]
    InvalidBase58(Base58Error),
}

impl From<Base58Error> for Bip32Error {
    fn from(err: Base58Error) -> Self {
        match err {
            Base58Error::InvalidChecksum => Bip32Error::ChecksumMismatch,
            Base58Error::MissingChecksum => DecodeError::MissingChecksum.into(),
            other => DecodeError::InvalidBase58(other).into(),
        }
    }
}
