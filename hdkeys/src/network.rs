use std::fmt;
use std::str::FromStr;

/// Which half of a key pair an extended key carries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Private,
    Public,
}

/// Version and prefix bytes for one chain.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NetworkParams {
    /// Version of serialized private extended keys (`xprv`).
    pub xprv_version: [u8; 4],
    /// Version of serialized public extended keys (`xpub`).
    pub xpub_version: [u8; 4],
    /// P2PKH address version byte.
    pub p2pkh_prefix: u8,
    /// WIF private key version byte.
    pub wif_prefix: u8,
}

const BITCOIN: NetworkParams = NetworkParams {
    xprv_version: [0x04, 0x88, 0xAD, 0xE4],
    xpub_version: [0x04, 0x88, 0xB2, 0x1E],
    p2pkh_prefix: 0x00,
    wif_prefix: 0x80,
};

const TESTNET: NetworkParams = NetworkParams {
    xprv_version: [0x04, 0x35, 0x83, 0x94],
    xpub_version: [0x04, 0x35, 0x87, 0xCF],
    p2pkh_prefix: 0x6F,
    wif_prefix: 0xEF,
};

// Litecoin wallets commonly keep the Bitcoin BIP32 versions.
const LITECOIN: NetworkParams = NetworkParams {
    p2pkh_prefix: 0x30,
    wif_prefix: 0xB0,
    ..BITCOIN
};

/// Chain whose version bytes are used for serialization.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Network {
    #[default]
    Bitcoin,
    Testnet,
    Litecoin,
    BitcoinCash,
    Custom(NetworkParams),
}

impl Network {
    pub const BUILT_IN: [Network; 4] = [
        Network::Bitcoin,
        Network::Testnet,
        Network::Litecoin,
        Network::BitcoinCash,
    ];

    /// Built-in networks with distinct version bytes. Litecoin and Bitcoin Cash
    /// share Bitcoin's versions, so a key carrying them detects as Bitcoin.
    const DETECTABLE: [Network; 2] = [Network::Bitcoin, Network::Testnet];

    pub fn params(&self) -> NetworkParams {
        match self {
            Network::Bitcoin | Network::BitcoinCash => BITCOIN,
            Network::Testnet => TESTNET,
            Network::Litecoin => LITECOIN,
            Network::Custom(params) => *params,
        }
    }

    /// Extended key version bytes for `kind`.
    pub fn version(&self, kind: KeyKind) -> [u8; 4] {
        let params = self.params();
        match kind {
            KeyKind::Private => params.xprv_version,
            KeyKind::Public => params.xpub_version,
        }
    }

    /// Key kind announced by `version` on this network, if it is one of ours.
    pub fn kind_of(&self, version: [u8; 4]) -> Option<KeyKind> {
        let params = self.params();
        if version == params.xprv_version {
            Some(KeyKind::Private)
        } else if version == params.xpub_version {
            Some(KeyKind::Public)
        } else {
            None
        }
    }

    /// Built-in network that recognizes `version`. Bitcoin versions always
    /// report [`Network::Bitcoin`]; pass the chain to
    /// [`HDNode::from_text`](crate::HDNode::from_text) to pick Litecoin or
    /// Bitcoin Cash.
    pub fn detect(version: [u8; 4]) -> Option<(Network, KeyKind)> {
        Self::DETECTABLE
            .iter()
            .find_map(|network| network.kind_of(version).map(|kind| (*network, kind)))
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Bitcoin => write!(f, "bitcoin"),
            Network::Testnet => write!(f, "testnet"),
            Network::Litecoin => write!(f, "litecoin"),
            Network::BitcoinCash => write!(f, "bitcoincash"),
            Network::Custom(params) => write!(
                f,
                "custom({}/{})",
                hex::encode(params.xprv_version),
                hex::encode(params.xpub_version)
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown network {0:?}")]
pub struct UnknownNetwork(pub String);

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "btc" | "bitcoin" | "mainnet" => Ok(Network::Bitcoin),
            "tbtc" | "testnet" => Ok(Network::Testnet),
            "ltc" | "litecoin" => Ok(Network::Litecoin),
            "bch" | "bitcoincash" => Ok(Network::BitcoinCash),
            _ => Err(UnknownNetwork(s.to_string())),
        }
    }
}
