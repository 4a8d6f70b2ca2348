use crate::{
    Bip32Error,
    extended_key::{HARDENED_OFFSET, is_hardened},
    node::HDNode,
};
use secp256k1::{All, Secp256k1};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// A sequence of child indices, e.g. `44H/0H/0H/0/3`.
///
/// Segments are decimal digits with an optional upper-case `H` marking a
/// hardened index. The empty path selects the starting node itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath(Vec<u32>);

fn parse_segment(segment: &str) -> Result<u32, Bip32Error> {
    let invalid = || Bip32Error::InvalidPath {
        segment: segment.to_string(),
    };
    let (digits, hardened) = match segment.strip_suffix('H') {
        Some(digits) => (digits, true),
        None => (segment, false),
    };
    // `u32::from_str` also accepts a leading '+', which the grammar does not.
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let value: u32 = digits.parse().map_err(|_| invalid())?;
    if value >= HARDENED_OFFSET {
        return Err(invalid());
    }
    Ok(if hardened { value + HARDENED_OFFSET } else { value })
}

impl FromStr for DerivationPath {
    type Err = Bip32Error;

    fn from_str(s: &str) -> Result<Self, Bip32Error> {
        if s.is_empty() {
            return Ok(DerivationPath::default());
        }
        s.split('/')
            .map(parse_segment)
            .collect::<Result<Vec<_>, _>>()
            .map(DerivationPath)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, &index) in self.0.iter().enumerate() {
            if position > 0 {
                f.write_str("/")?;
            }
            if is_hardened(index) {
                write!(f, "{}H", index - HARDENED_OFFSET)?;
            } else {
                write!(f, "{}", index)?;
            }
        }
        Ok(())
    }
}

impl From<Vec<u32>> for DerivationPath {
    fn from(indices: Vec<u32>) -> Self {
        DerivationPath(indices)
    }
}

impl AsRef<[u32]> for DerivationPath {
    fn as_ref(&self) -> &[u32] {
        &self.0
    }
}

impl DerivationPath {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    /// Derive from `root` along this path, left to right.
    ///
    /// Fails at the first index that cannot be derived; no intermediate node
    /// is returned. Public roots can follow non-hardened paths only.
    pub fn derive(&self, secp: &Secp256k1<All>, root: &HDNode) -> Result<HDNode, Bip32Error> {
        debug!(path = %self, depth = root.depth(), "deriving path");
        let node = self
            .iter()
            .try_fold(root.clone(), |node, index| node.derive_child(secp, index))?;
        debug!(
            path = %self,
            parent_fingerprint = %hex::encode(node.parent_fingerprint()),
            "derived path"
        );
        Ok(node)
    }
}

/// Parse `path` and derive it from `root`.
pub fn derive_path(secp: &Secp256k1<All>, root: &HDNode, path: &str) -> Result<HDNode, Bip32Error> {
    path.parse::<DerivationPath>()?.derive(secp, root)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid(segment: &str) -> Bip32Error {
        Bip32Error::InvalidPath {
            segment: segment.to_string(),
        }
    }

    #[test]
    fn parses_bip44_path() {
        let path: DerivationPath = "44H/0H/0H/0/0".parse().unwrap();
        assert_eq!(
            path.as_ref(),
            &[0x8000_002C_u32, 0x8000_0000, 0x8000_0000, 0, 0]
        );
        assert_eq!(path.to_string(), "44H/0H/0H/0/0");
    }

    #[test]
    fn empty_path_is_root() {
        let path: DerivationPath = "".parse().unwrap();
        assert!(path.is_empty());
        assert_eq!(path.to_string(), "");

        let secp = Secp256k1::new();
        let root = HDNode::root_from_seed(&[1u8; 16]).unwrap();
        assert_eq!(derive_path(&secp, &root, "").unwrap(), root);
    }

    #[test]
    fn rejects_malformed_segments() {
        assert_eq!("1H2".parse::<DerivationPath>(), Err(invalid("1H2")));
        assert_eq!("0/".parse::<DerivationPath>(), Err(invalid("")));
        assert_eq!("/0".parse::<DerivationPath>(), Err(invalid("")));
        assert_eq!("1h".parse::<DerivationPath>(), Err(invalid("1h")));
        assert_eq!("1'".parse::<DerivationPath>(), Err(invalid("1'")));
        assert_eq!("m/1".parse::<DerivationPath>(), Err(invalid("m")));
        assert_eq!("+1".parse::<DerivationPath>(), Err(invalid("+1")));
        assert_eq!("2HH".parse::<DerivationPath>(), Err(invalid("2HH")));
        assert_eq!("H".parse::<DerivationPath>(), Err(invalid("H")));
        assert_eq!("0/ 1".parse::<DerivationPath>(), Err(invalid(" 1")));
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(
            "2147483647H".parse::<DerivationPath>().unwrap().as_ref(),
            &[u32::MAX]
        );
        assert_eq!(
            "2147483648H".parse::<DerivationPath>(),
            Err(invalid("2147483648H"))
        );
        assert_eq!(
            "2147483648".parse::<DerivationPath>(),
            Err(invalid("2147483648"))
        );
        assert_eq!(
            "99999999999".parse::<DerivationPath>(),
            Err(invalid("99999999999"))
        );
    }

    #[test]
    fn display_round_trips() {
        let path = DerivationPath::from(vec![HARDENED_OFFSET, 1, HARDENED_OFFSET + 2, 2, 1_000_000_000]);
        assert_eq!(path.to_string(), "0H/1/2H/2/1000000000");
        assert_eq!(path.to_string().parse::<DerivationPath>().unwrap(), path);
        assert_eq!(path.len(), 5);
    }

    #[test]
    fn derivation_fails_atomically() {
        let secp = Secp256k1::new();
        let root = HDNode::root_from_seed(&[2u8; 32]).unwrap();
        let public = root.to_public(&secp);
        assert_eq!(
            derive_path(&secp, &public, "0/1/2H/3"),
            Err(Bip32Error::Protocol {
                index: HARDENED_OFFSET + 2
            })
        );
        assert_eq!(
            derive_path(&secp, &root, "0/1/x/3"),
            Err(invalid("x"))
        );
    }

    #[test]
    fn path_equals_repeated_children() {
        let secp = Secp256k1::new();
        let root = HDNode::root_from_seed(&[4u8; 32]).unwrap();
        let by_path = derive_path(&secp, &root, "44H/0H/0H/0/3").unwrap();
        let by_steps = [HARDENED_OFFSET + 44, HARDENED_OFFSET, HARDENED_OFFSET, 0, 3]
            .into_iter()
            .try_fold(root, |node, index| node.derive_child(&secp, index))
            .unwrap();
        assert_eq!(by_path, by_steps);
        assert_eq!(by_path.depth(), 5);
        assert_eq!(by_path.child_index(), 3);
    }
}
