use secrets_core::error::{CoreError, CoreResult};

use crate::model::TokenFormat;

const ALPHANUMERIC_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const NUMERIC_ALPHABET: &[u8] = b"0123456789";

const ALPHANUMERIC_LENGTH: usize = 24;
const NUMERIC_LENGTH: usize = 19;

/// An expandable, seed-derived byte source used both for deterministic
/// tokens (seeded with the SIV) and random tokens (seeded with fresh OS
/// randomness), so both paths share one rejection-sampling implementation.
/// Expansion is `HMAC-SHA-256(seed, counter)`, chained like an HKDF-Expand.
pub struct SeededStream {
    seed: [u8; 32],
    counter: u64,
    buffer: Vec<u8>,
    pos: usize,
}

impl SeededStream {
    pub fn new(seed: [u8; 32]) -> Self {
        Self {
            seed,
            counter: 0,
            buffer: Vec::new(),
            pos: 0,
        }
    }

    fn next_byte(&mut self) -> CoreResult<u8> {
        if self.pos >= self.buffer.len() {
            self.buffer = crypto::kdf::Kdf::hmac_sha256(&self.seed, &self.counter.to_be_bytes())
                .map_err(|e| CoreError::internal(e.to_string()))?
                .to_vec();
            self.counter += 1;
            self.pos = 0;
        }
        let byte = self.buffer[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    /// Rejection-sample one symbol from `alphabet` out of the stream,
    /// discarding bytes that would bias the modulo toward the low symbols.
    fn next_symbol(&mut self, alphabet: &[u8]) -> CoreResult<u8> {
        let len = alphabet.len() as u16;
        // Largest multiple of `len` that still fits in a byte; bytes at or
        // above it are discarded so every symbol has equal probability.
        let threshold = (256 / len * len) as u16;
        loop {
            let byte = self.next_byte()?;
            if (byte as u16) < threshold {
                let idx = (byte as usize) % alphabet.len();
                return Ok(alphabet[idx]);
            }
        }
    }
}

/// Renders a token in `format`'s alphabet, consuming bytes from `stream`.
pub fn render_token(format: TokenFormat, stream: &mut SeededStream) -> CoreResult<String> {
    match format {
        TokenFormat::Uuid => {
            let mut bytes = [0u8; 16];
            for byte in &mut bytes {
                *byte = stream.next_byte()?;
            }
            Ok(format_as_uuid_shape(&bytes))
        }
        TokenFormat::Alphanumeric => render_alphabet(stream, ALPHANUMERIC_ALPHABET, ALPHANUMERIC_LENGTH),
        TokenFormat::Numeric => render_alphabet(stream, NUMERIC_ALPHABET, NUMERIC_LENGTH),
    }
}

fn render_alphabet(stream: &mut SeededStream, alphabet: &[u8], length: usize) -> CoreResult<String> {
    let mut out = Vec::with_capacity(length);
    for _ in 0..length {
        out.push(stream.next_symbol(alphabet)?);
    }
    Ok(String::from_utf8(out).unwrap_or_default())
}

/// Stamps the RFC 4122 version (4) and variant (`10xx`) nibbles onto the
/// stream bytes before formatting, so the result is a real UUIDv4 rather
/// than just UUID-shaped.
fn format_as_uuid_shape(bytes: &[u8; 16]) -> String {
    let mut bytes = *bytes;
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    let hex = hex::encode(bytes);
    let (a, rest) = hex.split_at(8);
    let (b, rest) = rest.split_at(4);
    let (c, rest) = rest.split_at(4);
    let (d, e) = rest.split_at(4);
    format!("{a}-{b}-{c}-{d}-{e}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_yields_same_token() {
        let mut a = SeededStream::new([1u8; 32]);
        let mut b = SeededStream::new([1u8; 32]);
        assert_eq!(
            render_token(TokenFormat::Alphanumeric, &mut a).unwrap(),
            render_token(TokenFormat::Alphanumeric, &mut b).unwrap()
        );
    }

    #[test]
    fn different_seeds_yield_different_tokens() {
        let mut a = SeededStream::new([1u8; 32]);
        let mut b = SeededStream::new([2u8; 32]);
        assert_ne!(
            render_token(TokenFormat::Alphanumeric, &mut a).unwrap(),
            render_token(TokenFormat::Alphanumeric, &mut b).unwrap()
        );
    }

    #[test]
    fn numeric_format_is_digits_only() {
        let mut stream = SeededStream::new([9u8; 32]);
        let token = render_token(TokenFormat::Numeric, &mut stream).unwrap();
        assert_eq!(token.len(), NUMERIC_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn alphanumeric_format_is_alphanumeric_only() {
        let mut stream = SeededStream::new([3u8; 32]);
        let token = render_token(TokenFormat::Alphanumeric, &mut stream).unwrap();
        assert_eq!(token.len(), ALPHANUMERIC_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn uuid_format_has_uuid_shape() {
        let mut stream = SeededStream::new([5u8; 32]);
        let token = render_token(TokenFormat::Uuid, &mut stream).unwrap();
        assert_eq!(token.len(), 36);
        assert_eq!(token.matches('-').count(), 4);
    }

    #[test]
    fn uuid_format_has_version_and_variant_nibbles() {
        let mut stream = SeededStream::new([5u8; 32]);
        let token = render_token(TokenFormat::Uuid, &mut stream).unwrap();
        let groups: Vec<&str> = token.split('-').collect();
        assert_eq!(groups[2].chars().next(), Some('4'));
        assert!(matches!(groups[3].chars().next(), Some('8') | Some('9') | Some('a') | Some('b')));
    }
}
