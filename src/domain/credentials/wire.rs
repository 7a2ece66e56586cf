//! SSH wire encoding (RFC 4251 §5)

use zeroize::Zeroizing;

/// Append-only buffer for SSH wire-format values
///
/// The buffer is zeroized on drop since it may hold private key material.
#[derive(Default)]
pub struct SshWriter {
    buf: Zeroizing<Vec<u8>>,
}

impl SshWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Big-endian `uint32`
    pub fn put_u32(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// Length-prefixed byte string
    pub fn put_string(&mut self, value: &[u8]) -> &mut Self {
        self.put_u32(value.len() as u32);
        self.buf.extend_from_slice(value);
        self
    }

    /// Raw bytes with no length prefix
    pub fn put_raw(&mut self, value: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(value);
        self
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Zeroizing<Vec<u8>> {
        self.buf
    }
}
