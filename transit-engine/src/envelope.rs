use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use secrets_core::error::{CoreError, CoreResult};

use crypto::aead::NONCE_LEN;

/// Wire format: `"<version>:<base64(nonce ‖ ciphertext_with_tag)>"`. Version
/// is ASCII decimal (design spec §4.8).
pub fn format(version: i64, nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> String {
    let mut payload = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    payload.extend_from_slice(nonce);
    payload.extend_from_slice(ciphertext);
    format!("{version}:{}", BASE64.encode(payload))
}

/// Parses an envelope into `(version, nonce, ciphertext)`. Rejects on
/// malformed format, missing colon, undecodable base64, or a nonce whose
/// length is not exactly 12 bytes.
pub fn parse(envelope: &str) -> CoreResult<(i64, [u8; NONCE_LEN], Vec<u8>)> {
    let (version_str, payload_b64) = envelope
        .split_once(':')
        .ok_or_else(|| CoreError::invalid_input("malformed envelope: missing ':'"))?;

    let version: i64 = version_str
        .parse()
        .map_err(|_| CoreError::invalid_input("malformed envelope: non-numeric version"))?;

    let payload = BASE64
        .decode(payload_b64)
        .map_err(|_| CoreError::invalid_input("malformed envelope: invalid base64"))?;

    if payload.len() < NONCE_LEN {
        return Err(CoreError::invalid_input(format!(
            "malformed envelope: nonce length must be {NONCE_LEN}"
        )));
    }

    let (nonce_bytes, ciphertext) = payload.split_at(NONCE_LEN);
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(nonce_bytes);

    Ok((version, nonce, ciphertext.to_vec()))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn roundtrips_through_format_and_parse() {
        let nonce = [7u8; NONCE_LEN];
        let ciphertext = b"ciphertext-and-tag".to_vec();
        let envelope = format(3, &nonce, &ciphertext);
        assert!(envelope.starts_with("3:"));

        let (version, parsed_nonce, parsed_ct) = parse(&envelope).unwrap();
        assert_eq!(version, 3);
        assert_eq!(parsed_nonce, nonce);
        assert_eq!(parsed_ct, ciphertext);
    }

    #[test]
    fn rejects_missing_colon() {
        assert!(parse("not-an-envelope").is_err());
    }

    #[test]
    fn rejects_non_numeric_version() {
        assert!(parse("abc:AAAA").is_err());
    }

    #[test]
    fn rejects_bad_base64() {
        assert!(parse("1:not valid base64!!").is_err());
    }

    #[test]
    fn rejects_short_payload() {
        let short = BASE64.encode([0u8; 4]);
        assert!(parse(&format!("1:{short}")).is_err());
    }

    proptest! {
        #[test]
        fn format_then_parse_roundtrips(
            version in 0i64..1000,
            nonce_bytes in proptest::collection::vec(any::<u8>(), NONCE_LEN..=NONCE_LEN),
            ciphertext in proptest::collection::vec(any::<u8>(), 0..64),
        ) {
            let mut nonce = [0u8; NONCE_LEN];
            nonce.copy_from_slice(&nonce_bytes);

            let envelope = format(version, &nonce, &ciphertext);
            let (parsed_version, parsed_nonce, parsed_ciphertext) = parse(&envelope).unwrap();

            prop_assert_eq!(parsed_version, version);
            prop_assert_eq!(parsed_nonce, nonce);
            prop_assert_eq!(parsed_ciphertext, ciphertext);
        }
    }
}
