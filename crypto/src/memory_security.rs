use zeroize::ZeroizeOnDrop;

/// An owning handle over secret byte material that zeroes itself on
/// destruction and is never cloned implicitly (design spec §9: "Represent
/// master-key and KEK plaintext as owning handles that zero memory on
/// destruction ... rather than GC-managed byte arrays").
///
/// This is deliberately a thin wrapper over `Vec<u8>` plus `ZeroizeOnDrop` —
/// no `mlock`/`mprotect`/guard pages. Locking pages against swap is a
/// deployment-level concern (the same tradeoff a containerized workload
/// makes for any secret-bearing process), not something this crate can
/// guarantee portably without `unsafe` platform code this workspace avoids.
#[derive(ZeroizeOnDrop)]
pub struct SecureBytes(Vec<u8>);

impl SecureBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for SecureBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SecureBytes").field(&"<redacted>").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposes_the_underlying_bytes() {
        let bytes = SecureBytes::new(vec![1, 2, 3]);
        assert_eq!(bytes.as_slice(), &[1, 2, 3]);
        assert_eq!(bytes.len(), 3);
    }

    #[test]
    fn debug_never_prints_the_plaintext() {
        let bytes = SecureBytes::new(vec![0xde, 0xad, 0xbe, 0xef]);
        let rendered = format!("{bytes:?}");
        assert!(!rendered.contains("222"));
        assert!(rendered.contains("redacted"));
    }

    #[test]
    fn zeroizes_on_drop_without_panicking() {
        let bytes = SecureBytes::new(vec![9u8; 32]);
        drop(bytes);
    }
}
