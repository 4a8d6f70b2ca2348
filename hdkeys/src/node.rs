//! Extended keys annotated with their position in the key tree, and the
//! BIP32 serialization format.
//!
//! Layout of a serialized node (78 bytes, before base58check):
//!
//! ```text
//! version(4) | depth(1) | parent fingerprint(4) | child index(4, BE) | chain code(32) | key data(33)
//! ```

use crate::derivation::DerivationPath;
use crate::error::{Bip32Error, DecodeError};
use crate::extended_key::{
    ExtendedKey, KEY_DATA_LEN, PrivateExtendedKey, PublicExtendedKey, is_hardened,
};
use crate::network::{KeyKind, Network};
use crypto_utils::{
    base58::{base58_check_decode, base58_check_encode},
    hash::HASH160_LEN,
};
use secp256k1::{All, PublicKey, Secp256k1, SecretKey};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use tracing::debug;

/// Length of a serialized extended key, without the base58check checksum.
pub const SERIALIZED_LEN: usize = 78;

/// An [`ExtendedKey`] plus depth, parent fingerprint and child index.
///
/// Nodes hold no reference to their parent. Derivation always returns a new
/// value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HDNode {
    key: ExtendedKey,
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_index: u32,
}

fn check_position(
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_index: u32,
) -> Result<(), DecodeError> {
    if depth == 0 && parent_fingerprint != [0u8; 4] {
        return Err(DecodeError::ZeroDepthFingerprint);
    }
    if depth == 0 && child_index != 0 {
        return Err(DecodeError::ZeroDepthIndex);
    }
    Ok(())
}

impl HDNode {
    /// Build a node from its parts. A depth 0 node must have a zero parent
    /// fingerprint and child index.
    ///
    /// A violation is reported as [`Bip32Error::MalformedEncoding`] carrying
    /// [`DecodeError::ZeroDepthFingerprint`] or [`DecodeError::ZeroDepthIndex`],
    /// the same error `deserialize` gives for those fields, so a node that
    /// `new` refuses is exactly one that could never be decoded.
    pub fn new(
        key: ExtendedKey,
        depth: u8,
        parent_fingerprint: [u8; 4],
        child_index: u32,
    ) -> Result<Self, Bip32Error> {
        check_position(depth, parent_fingerprint, child_index)?;
        Ok(HDNode {
            key,
            depth,
            parent_fingerprint,
            child_index,
        })
    }

    /// A tree root at depth 0.
    pub fn root(key: ExtendedKey) -> Self {
        HDNode {
            key,
            depth: 0,
            parent_fingerprint: [0u8; 4],
            child_index: 0,
        }
    }

    /// Master node from seed bytes.
    pub fn root_from_seed(seed: &[u8]) -> Result<Self, Bip32Error> {
        let key = PrivateExtendedKey::from_seed(seed)?;
        debug!(seed_len = seed.len(), "created master key");
        Ok(HDNode::root(key.into()))
    }

    pub fn key(&self) -> &ExtendedKey {
        &self.key
    }

    pub fn kind(&self) -> KeyKind {
        self.key.kind()
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.parent_fingerprint
    }

    pub fn child_index(&self) -> u32 {
        self.child_index
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        self.key.chain_code()
    }

    pub fn is_hardened(&self) -> bool {
        is_hardened(self.child_index)
    }

    pub fn public_key(&self, secp: &Secp256k1<All>) -> PublicKey {
        self.key.public_key(secp)
    }

    /// The private scalar, or `None` for a public node.
    pub fn secret_key(&self) -> Option<&SecretKey> {
        match &self.key {
            ExtendedKey::Private(key) => Some(key.secret_key()),
            ExtendedKey::Public(_) => None,
        }
    }

    pub fn id(&self, secp: &Secp256k1<All>) -> [u8; HASH160_LEN] {
        self.key.id(secp)
    }

    /// This node's own fingerprint, which its children record as their parent.
    pub fn fingerprint(&self, secp: &Secp256k1<All>) -> [u8; 4] {
        self.key.fingerprint(secp)
    }

    /// Derive child `index`. Private nodes give private children, public nodes
    /// public ones.
    pub fn derive_child(&self, secp: &Secp256k1<All>, index: u32) -> Result<Self, Bip32Error> {
        // A hardened request on a public node is a protocol error at any depth.
        let key = self.key.ckd(secp, index)?;
        let depth = self.depth.checked_add(1).ok_or(Bip32Error::DepthOverflow)?;
        Ok(HDNode {
            key,
            depth,
            parent_fingerprint: self.fingerprint(secp),
            child_index: index,
        })
    }

    /// Derive every child whose index is in `indices`, stopping at the first
    /// failure.
    pub fn derive_children(
        &self,
        secp: &Secp256k1<All>,
        indices: Range<u32>,
    ) -> Result<Vec<Self>, Bip32Error> {
        indices.map(|index| self.derive_child(secp, index)).collect()
    }

    /// Parse `path` and derive along it. See [`DerivationPath`] for the syntax.
    pub fn derive_path(&self, secp: &Secp256k1<All>, path: &str) -> Result<Self, Bip32Error> {
        path.parse::<DerivationPath>()?.derive(secp, self)
    }

    /// The public counterpart of this node, at the same tree position.
    pub fn to_public(&self, secp: &Secp256k1<All>) -> Self {
        HDNode {
            key: ExtendedKey::Public(self.key.to_public(secp)),
            ..self.clone()
        }
    }

    /// 78-byte BIP32 serialization using `network`'s version bytes.
    pub fn serialize(&self, network: Network) -> [u8; SERIALIZED_LEN] {
        let mut data = [0u8; SERIALIZED_LEN];
        data[0..4].copy_from_slice(&network.version(self.kind()));
        data[4] = self.depth;
        data[5..9].copy_from_slice(&self.parent_fingerprint);
        data[9..13].copy_from_slice(&self.child_index.to_be_bytes());
        data[13..45].copy_from_slice(self.chain_code());
        data[45..78].copy_from_slice(&self.key.key_data());
        data
    }

    /// Parse a 78-byte serialization whose version belongs to `network`.
    pub fn deserialize(data: &[u8], network: Network) -> Result<Self, Bip32Error> {
        let result = read_version(data).and_then(|version| {
            let kind = network
                .kind_of(version)
                .ok_or(DecodeError::UnknownVersion(version))?;
            decode_fields(data, kind)
        });
        result
            .map_err(Bip32Error::from)
            .inspect_err(|err| debug!(%network, error = %err, "rejected extended key"))
    }

    /// Base58check text form (`xprv…`/`xpub…` on Bitcoin).
    pub fn to_text(&self, network: Network) -> String {
        base58_check_encode(&self.serialize(network))
    }

    /// Parse the base58check text form, expecting `network`'s versions.
    pub fn from_text(s: &str, network: Network) -> Result<Self, Bip32Error> {
        let data = base58_check_decode(s)?;
        HDNode::deserialize(&data, network)
    }

    /// Text form of the private key, `None` for a public node.
    pub fn xprv(&self, network: Network) -> Option<String> {
        match self.kind() {
            KeyKind::Private => Some(self.to_text(network)),
            KeyKind::Public => None,
        }
    }

    /// Text form of the public key, projecting private nodes first.
    pub fn xpub(&self, secp: &Secp256k1<All>, network: Network) -> String {
        match self.kind() {
            KeyKind::Public => self.to_text(network),
            KeyKind::Private => self.to_public(secp).to_text(network),
        }
    }

    /// Compressed-key WIF: `version_byte || scalar || 0x01`, base58check encoded.
    pub fn wif(&self, version_byte: u8) -> Option<String> {
        let secret_key = self.secret_key()?;
        let mut payload = Vec::with_capacity(34);
        payload.push(version_byte);
        payload.extend_from_slice(&secret_key.secret_bytes());
        payload.push(0x01);
        Some(base58_check_encode(&payload))
    }

    pub fn wif_for(&self, network: Network) -> Option<String> {
        self.wif(network.params().wif_prefix)
    }

    /// Base58check of `version_byte || id`.
    pub fn address(&self, secp: &Secp256k1<All>, version_byte: u8) -> String {
        let mut payload = Vec::with_capacity(1 + HASH160_LEN);
        payload.push(version_byte);
        payload.extend_from_slice(&self.id(secp));
        base58_check_encode(&payload)
    }

    /// Legacy pay-to-pubkey-hash address on `network`.
    pub fn p2pkh_address(&self, secp: &Secp256k1<All>, network: Network) -> String {
        self.address(secp, network.params().p2pkh_prefix)
    }
}

fn read_version(data: &[u8]) -> Result<[u8; 4], DecodeError> {
    if data.len() != SERIALIZED_LEN {
        return Err(DecodeError::InvalidLength(data.len()));
    }
    let mut version = [0u8; 4];
    version.copy_from_slice(&data[0..4]);
    Ok(version)
}

/// Positional parse of a length-checked serialization.
fn decode_fields(data: &[u8], kind: KeyKind) -> Result<HDNode, DecodeError> {
    let depth = data[4];
    let mut parent_fingerprint = [0u8; 4];
    parent_fingerprint.copy_from_slice(&data[5..9]);
    let mut index_bytes = [0u8; 4];
    index_bytes.copy_from_slice(&data[9..13]);
    let child_index = u32::from_be_bytes(index_bytes);
    check_position(depth, parent_fingerprint, child_index)?;

    let mut chain_code = [0u8; 32];
    chain_code.copy_from_slice(&data[13..45]);
    let key_data = &data[45..45 + KEY_DATA_LEN];

    let key = match kind {
        KeyKind::Private => {
            if key_data[0] != 0 {
                return Err(DecodeError::PrivateKeyMarker(key_data[0]));
            }
            let secret_key = SecretKey::from_slice(&key_data[1..])
                .map_err(|_| DecodeError::InvalidPrivateKey)?;
            ExtendedKey::Private(PrivateExtendedKey::new(secret_key, chain_code))
        }
        KeyKind::Public => {
            let public_key =
                PublicKey::from_slice(key_data).map_err(|_| DecodeError::InvalidPoint)?;
            ExtendedKey::Public(PublicExtendedKey::new(public_key, chain_code))
        }
    };

    Ok(HDNode {
        key,
        depth,
        parent_fingerprint,
        child_index,
    })
}

impl FromStr for HDNode {
    type Err = Bip32Error;

    /// Parse a text-form key, detecting the network from its version bytes.
    fn from_str(s: &str) -> Result<Self, Bip32Error> {
        let data = base58_check_decode(s)?;
        let version = read_version(&data)?;
        let (network, _) =
            Network::detect(version).ok_or(DecodeError::UnknownVersion(version))?;
        HDNode::deserialize(&data, network)
    }
}

impl fmt::Display for HDNode {
    /// Bitcoin mainnet text form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text(Network::Bitcoin))
    }
}
