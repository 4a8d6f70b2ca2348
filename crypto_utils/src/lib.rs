//! Hash, MAC and base58check primitives consumed by the `hdkeys` engine.

pub mod base58;
pub mod hash;
pub mod hmac;
