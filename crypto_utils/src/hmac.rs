use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// HMAC-SHA512 over `data`, keyed by `key`. Returns the full 64-byte tag.
pub fn hmac_sha512(key: &[u8], data: &[u8]) -> [u8; 64] {
    // HMAC pads or hashes the key, so every key length is accepted.
    let mut mac = HmacSha512::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Split an HMAC-SHA512 tag into its left and right 32-byte halves.
pub fn split_halves(tag: &[u8; 64]) -> ([u8; 32], [u8; 32]) {
    let mut left = [0u8; 32];
    let mut right = [0u8; 32];
    left.copy_from_slice(&tag[..32]);
    right.copy_from_slice(&tag[32..]);
    (left, right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    /// Test case from RFC 4231
    #[test]
    fn hmac_sha512_rfc_case_1() {
        let key = [0x0b; 20];
        let expected = hex!(
            "87aa7cdea5ef619d4ff0b4241a1d6cb02379f4e2ce4ec2787ad0b30545e17cde"
            "daa833b7d6b8a702038b274eaea3f4e4be9d914eeb61f1702e696c203a126854"
        );
        assert_eq!(hmac_sha512(&key, b"Hi There"), expected);
    }

    /// Test case from RFC 4231
    #[test]
    fn hmac_sha512_rfc_case_2() {
        let expected = hex!(
            "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea250554"
            "9758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737"
        );
        assert_eq!(hmac_sha512(b"Jefe", b"what do ya want for nothing?"), expected);
    }

    #[test]
    fn empty_key_is_accepted() {
        let tag = hmac_sha512(b"", b"data");
        assert_eq!(tag.len(), 64);
    }

    #[test]
    fn halves_cover_the_whole_tag() {
        let tag = hmac_sha512(b"key", b"");
        let (left, right) = split_halves(&tag);
        assert_eq!(&tag[..32], &left);
        assert_eq!(&tag[32..], &right);
    }
}
