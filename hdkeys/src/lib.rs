//! BIP32 hierarchical deterministic key derivation over secp256k1.
//!
//! A root [`HDNode`] comes from seed bytes or from a serialized `xprv`/`xpub`
//! string. Children are derived with [`HDNode::derive_child`] or along a
//! [`DerivationPath`] such as `44H/0H/0H/0/3`.

pub mod derivation;
pub mod error;
pub mod extended_key;
pub mod network;
pub mod node;

pub use derivation::{DerivationPath, derive_path};
pub use error::{Bip32Error, DecodeError};
pub use extended_key::{
    ExtendedKey, HARDENED_OFFSET, PrivateExtendedKey, PublicExtendedKey, is_hardened,
};
pub use network::{KeyKind, Network, NetworkParams};
pub use node::HDNode;
