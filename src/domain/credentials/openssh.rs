//! OpenSSH key serialization
//!
//! Private keys use the unencrypted `openssh-key-v1` container (see
//! PROTOCOL.key in the OpenSSH sources); public keys use the
//! `authorized_keys` line format.

use base64::{
    Engine,
    engine::general_purpose::{STANDARD, STANDARD_NO_PAD},
};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::wire::SshWriter;

pub const KEY_TYPE_ED25519: &str = "ssh-ed25519";

/// Container magic, including the trailing NUL
pub const AUTH_MAGIC: &[u8] = b"openssh-key-v1\0";

pub const PEM_LABEL: &str = "OPENSSH PRIVATE KEY";

/// Line width `ssh-keygen` wraps the PEM body at
pub const PEM_LINE_WIDTH: usize = 70;

/// Cipher block size for `none`; the private section is padded to it
pub const UNENCRYPTED_BLOCK_SIZE: usize = 8;

pub const ED25519_PUBLIC_KEY_LEN: usize = 32;

/// Seed followed by the public key, as OpenSSH stores it
pub const ED25519_KEYPAIR_LEN: usize = 64;

/// Encoded public key blob: key type then raw key
pub fn public_key_blob(public: &[u8; ED25519_PUBLIC_KEY_LEN]) -> Vec<u8> {
    let mut w = SshWriter::new();
    w.put_string(KEY_TYPE_ED25519.as_bytes()).put_string(public);
    w.as_bytes().to_vec()
}

/// Binary `openssh-key-v1` container holding one unencrypted Ed25519 key
///
/// `check` fills both check integers of the private section; with no cipher
/// they only need to match.
pub fn encode_ed25519_private_key(
    public: &[u8; ED25519_PUBLIC_KEY_LEN],
    keypair: &[u8; ED25519_KEYPAIR_LEN],
    check: u32,
    comment: &str,
) -> Zeroizing<Vec<u8>> {
    let mut private = SshWriter::new();
    private
        .put_u32(check)
        .put_u32(check)
        .put_string(KEY_TYPE_ED25519.as_bytes())
        .put_string(public)
        .put_string(keypair)
        .put_string(comment.as_bytes());

    let pad_len = (UNENCRYPTED_BLOCK_SIZE - private.len() % UNENCRYPTED_BLOCK_SIZE) % UNENCRYPTED_BLOCK_SIZE;
    let padding: Vec<u8> = (1..=pad_len as u8).collect();
    private.put_raw(&padding);

    let mut container = SshWriter::new();
    container
        .put_raw(AUTH_MAGIC)
        .put_string(b"none")
        .put_string(b"none")
        .put_string(b"")
        .put_u32(1)
        .put_string(&public_key_blob(public))
        .put_string(private.as_bytes());

    container.into_bytes()
}

/// PEM-armour a binary container the way `ssh-keygen` writes it
pub fn pem_encode(label: &str, data: &[u8]) -> Zeroizing<String> {
    let body = Zeroizing::new(STANDARD.encode(data));
    let mut pem = String::with_capacity(body.len() + body.len() / PEM_LINE_WIDTH + 2 * label.len() + 40);

    pem.push_str("-----BEGIN ");
    pem.push_str(label);
    pem.push_str("-----\n");

    for line in body.as_bytes().chunks(PEM_LINE_WIDTH) {
        // base64 output is ASCII, so every chunk boundary is a char boundary
        pem.push_str(std::str::from_utf8(line).unwrap_or_default());
        pem.push('\n');
    }

    pem.push_str("-----END ");
    pem.push_str(label);
    pem.push_str("-----\n");

    Zeroizing::new(pem)
}

/// `ssh-ed25519 AAAA...` line for `authorized_keys`
pub fn authorized_key(public: &[u8; ED25519_PUBLIC_KEY_LEN]) -> String {
    format!("{} {}", KEY_TYPE_ED25519, STANDARD.encode(public_key_blob(public)))
}

/// `SHA256:...` fingerprint as printed by `ssh-keygen -l`
pub fn fingerprint(public: &[u8; ED25519_PUBLIC_KEY_LEN]) -> String {
    let digest = Sha256::digest(public_key_blob(public));
    format!("SHA256:{}", STANDARD_NO_PAD.encode(digest))
}
