use crate::error::Bip32Error;
use crate::network::KeyKind;
use crypto_utils::{
    hash::{HASH160_LEN, hash160},
    hmac::{hmac_sha512, split_halves},
};
use secp256k1::{All, PublicKey, Scalar, Secp256k1, SecretKey};
use std::fmt;
use std::sync::OnceLock;
use tracing::trace;

/// Index offset for hardened children (index >= 0x80000000) i.e., 0x80000000 = 2³¹
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// HMAC key used to turn a seed into the master key.
const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

/// Serialized key data is always 33 bytes: `0x00 || scalar` or a compressed point.
pub const KEY_DATA_LEN: usize = 33;

pub fn is_hardened(index: u32) -> bool {
    index >= HARDENED_OFFSET
}

/// A public key paired with its chain code. Derives non-hardened children only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicExtendedKey {
    public_key: PublicKey,
    chain_code: [u8; 32],
}

/// A private scalar paired with its chain code.
///
/// The matching public point is computed on first use and cached. The cache
/// never takes part in equality or serialization.
#[derive(Clone)]
pub struct PrivateExtendedKey {
    secret_key: SecretKey,
    chain_code: [u8; 32],
    public_key: OnceLock<PublicKey>,
}

/// Either half of an extended key pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtendedKey {
    Public(PublicExtendedKey),
    Private(PrivateExtendedKey),
}

impl PublicExtendedKey {
    pub fn new(public_key: PublicKey, chain_code: [u8; 32]) -> Self {
        PublicExtendedKey {
            public_key,
            chain_code,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// Compressed SEC1 encoding of the point.
    pub fn key_data(&self) -> [u8; KEY_DATA_LEN] {
        self.public_key.serialize()
    }

    /// Child key derivation for public keys (CKDpub).
    ///
    /// Hardened indices need the parent scalar and fail with
    /// [`Bip32Error::Protocol`].
    pub fn ckd(&self, secp: &Secp256k1<All>, index: u32) -> Result<Self, Bip32Error> {
        if is_hardened(index) {
            return Err(Bip32Error::Protocol { index });
        }
        trace!(index, "deriving public child");

        // Non-hardened: 33-byte compressed pubkey + 4-byte index
        let mut data = Vec::with_capacity(KEY_DATA_LEN + 4);
        data.extend_from_slice(&self.public_key.serialize());
        data.extend_from_slice(&index.to_be_bytes());

        let (il, chain_code) = split_halves(&hmac_sha512(&self.chain_code, &data));
        let public_key = tweak_point(secp, &self.public_key, il, index)?;
        Ok(PublicExtendedKey {
            public_key,
            chain_code,
        })
    }
}

impl PrivateExtendedKey {
    pub fn new(secret_key: SecretKey, chain_code: [u8; 32]) -> Self {
        PrivateExtendedKey {
            secret_key,
            chain_code,
            public_key: OnceLock::new(),
        }
    }

    /// Master key from seed bytes: `HMAC-SHA512("Bitcoin seed", seed)`.
    pub fn from_seed(seed: &[u8]) -> Result<Self, Bip32Error> {
        if !(16..=64).contains(&seed.len()) {
            return Err(Bip32Error::InvalidSeedLength(seed.len()));
        }
        let (il, chain_code) = split_halves(&hmac_sha512(MASTER_HMAC_KEY, seed));
        let secret_key = SecretKey::from_slice(&il).map_err(|_| Bip32Error::InvalidSeed)?;
        Ok(PrivateExtendedKey::new(secret_key, chain_code))
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// The public point `scalar · G`, computed at most once per key.
    pub fn public_key(&self, secp: &Secp256k1<All>) -> PublicKey {
        *self
            .public_key
            .get_or_init(|| PublicKey::from_secret_key(secp, &self.secret_key))
    }

    /// Drop the scalar, keeping the point and chain code.
    pub fn to_public(&self, secp: &Secp256k1<All>) -> PublicExtendedKey {
        PublicExtendedKey::new(self.public_key(secp), self.chain_code)
    }

    /// `0x00` followed by the 32-byte big-endian scalar.
    pub fn key_data(&self) -> [u8; KEY_DATA_LEN] {
        let mut data = [0u8; KEY_DATA_LEN];
        data[1..].copy_from_slice(&self.secret_key.secret_bytes());
        data
    }

    /// Child key derivation for private keys (CKDpriv).
    pub fn ckd(&self, secp: &Secp256k1<All>, index: u32) -> Result<Self, Bip32Error> {
        let hardened = is_hardened(index);
        trace!(index, hardened, "deriving private child");

        // Hardened: 0x00 + 32-byte scalar + index, otherwise compressed pubkey + index
        let mut data = Vec::with_capacity(KEY_DATA_LEN + 4);
        if hardened {
            data.extend_from_slice(&self.key_data());
        } else {
            data.extend_from_slice(&self.public_key(secp).serialize());
        }
        data.extend_from_slice(&index.to_be_bytes());

        let (il, chain_code) = split_halves(&hmac_sha512(&self.chain_code, &data));
        let secret_key = tweak_secret(&self.secret_key, il, index)?;
        Ok(PrivateExtendedKey::new(secret_key, chain_code))
    }
}

impl PartialEq for PrivateExtendedKey {
    fn eq(&self, other: &Self) -> bool {
        self.secret_key == other.secret_key && self.chain_code == other.chain_code
    }
}

impl Eq for PrivateExtendedKey {}

impl fmt::Debug for PrivateExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateExtendedKey")
            .field("secret_key", &self.secret_key)
            .field("chain_code", &hex::encode(self.chain_code))
            .finish()
    }
}

impl ExtendedKey {
    pub fn kind(&self) -> KeyKind {
        match self {
            ExtendedKey::Public(_) => KeyKind::Public,
            ExtendedKey::Private(_) => KeyKind::Private,
        }
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        match self {
            ExtendedKey::Public(key) => key.chain_code(),
            ExtendedKey::Private(key) => key.chain_code(),
        }
    }

    pub fn public_key(&self, secp: &Secp256k1<All>) -> PublicKey {
        match self {
            ExtendedKey::Public(key) => key.public_key(),
            ExtendedKey::Private(key) => key.public_key(secp),
        }
    }

    pub fn key_data(&self) -> [u8; KEY_DATA_LEN] {
        match self {
            ExtendedKey::Public(key) => key.key_data(),
            ExtendedKey::Private(key) => key.key_data(),
        }
    }

    /// HASH160 of the compressed public key.
    pub fn id(&self, secp: &Secp256k1<All>) -> [u8; HASH160_LEN] {
        hash160(&self.public_key(secp).serialize())
    }

    /// First four bytes of [`ExtendedKey::id`].
    pub fn fingerprint(&self, secp: &Secp256k1<All>) -> [u8; 4] {
        let mut fp = [0u8; 4];
        fp.copy_from_slice(&self.id(secp)[..4]);
        fp
    }

    pub fn to_public(&self, secp: &Secp256k1<All>) -> PublicExtendedKey {
        match self {
            ExtendedKey::Public(key) => key.clone(),
            ExtendedKey::Private(key) => key.to_public(secp),
        }
    }

    /// Derive child `index`, keeping the variant of `self`.
    pub fn ckd(&self, secp: &Secp256k1<All>, index: u32) -> Result<Self, Bip32Error> {
        match self {
            ExtendedKey::Public(key) => key.ckd(secp, index).map(ExtendedKey::Public),
            ExtendedKey::Private(key) => key.ckd(secp, index).map(ExtendedKey::Private),
        }
    }
}

impl From<PublicExtendedKey> for ExtendedKey {
    fn from(key: PublicExtendedKey) -> Self {
        ExtendedKey::Public(key)
    }
}

impl From<PrivateExtendedKey> for ExtendedKey {
    fn from(key: PrivateExtendedKey) -> Self {
        ExtendedKey::Private(key)
    }
}

/// `(IL + parent) mod N`, rejecting `IL >= N` and a zero result.
fn tweak_secret(parent: &SecretKey, il: [u8; 32], index: u32) -> Result<SecretKey, Bip32Error> {
    let tweak = Scalar::from_be_bytes(il).map_err(|_| Bip32Error::DerivationOverflow { index })?;
    parent
        .add_tweak(&tweak)
        .map_err(|_| Bip32Error::DerivationOverflow { index })
}

/// `IL · G + parent`, rejecting `IL >= N` and the point at infinity.
fn tweak_point(
    secp: &Secp256k1<All>,
    parent: &PublicKey,
    il: [u8; 32],
    index: u32,
) -> Result<PublicKey, Bip32Error> {
    let tweak = Scalar::from_be_bytes(il).map_err(|_| Bip32Error::DerivationOverflow { index })?;
    parent
        .add_exp_tweak(secp, &tweak)
        .map_err(|_| Bip32Error::DerivationOverflow { index })
}
