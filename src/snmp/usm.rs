// SPDX-License-Identifier: MIT

//! RFC 3414 User-based Security Model key localization, message
//! authentication, and RFC 3414/3826 privacy (DES-CBC / AES-CFB).
//!
//! This is the SNMPv3 half of the {noAuthNoPriv, authNoPriv, authPriv} ×
//! {MD5,SHA} × {DES,AES} matrix from §4.1; v2c talks over community auth
//! only and never touches this module.

use aes::Aes128;
use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};
use cfb_mode::{Decryptor as CfbDecryptor, Encryptor as CfbEncryptor};
use des::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit as BlockKeyIvInit};
use des::Des;
use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;

use super::credentials::{AuthProtocol, PrivProtocol};

const ONE_MEGABYTE: usize = 1_048_576;

fn expand_password(passphrase: &[u8]) -> Vec<u8> {
    let mut expanded = Vec::with_capacity(ONE_MEGABYTE);
    while expanded.len() < ONE_MEGABYTE {
        let remaining = ONE_MEGABYTE - expanded.len();
        let take = remaining.min(passphrase.len());
        expanded.extend_from_slice(&passphrase[..take]);
    }
    expanded
}

/// RFC 3414 §A.2: password-to-key, hashing a 1MB expansion of the
/// passphrase.
pub fn password_to_key(proto: AuthProtocol, passphrase: &str) -> Vec<u8> {
    let expanded = expand_password(passphrase.as_bytes());
    match proto {
        AuthProtocol::Md5 => {
            use md5::Digest;
            let mut hasher = Md5::new();
            hasher.update(&expanded);
            hasher.finalize().to_vec()
        }
        AuthProtocol::Sha => {
            use sha1::Digest;
            let mut hasher = Sha1::new();
            hasher.update(&expanded);
            hasher.finalize().to_vec()
        }
    }
}

/// RFC 3414 §A.2: localizes a password-derived key to a specific SNMP
/// engine: `Ku = H(key || engineID || key)`.
pub fn localize_key(proto: AuthProtocol, key: &[u8], engine_id: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(key.len() * 2 + engine_id.len());
    buf.extend_from_slice(key);
    buf.extend_from_slice(engine_id);
    buf.extend_from_slice(key);
    match proto {
        AuthProtocol::Md5 => {
            use md5::Digest;
            let mut hasher = Md5::new();
            hasher.update(&buf);
            hasher.finalize().to_vec()
        }
        AuthProtocol::Sha => {
            use sha1::Digest;
            let mut hasher = Sha1::new();
            hasher.update(&buf);
            hasher.finalize().to_vec()
        }
    }
}

/// HMAC-MD5-96 / HMAC-SHA1-96 over the whole message, authParams zeroed.
pub fn authenticate(proto: AuthProtocol, localized_key: &[u8], message: &[u8]) -> [u8; 12] {
    let digest = match proto {
        AuthProtocol::Md5 => {
            let mut mac = Hmac::<Md5>::new_from_slice(localized_key).expect("any key length valid");
            mac.update(message);
            mac.finalize().into_bytes().to_vec()
        }
        AuthProtocol::Sha => {
            let mut mac = Hmac::<Sha1>::new_from_slice(localized_key).expect("any key length valid");
            mac.update(message);
            mac.finalize().into_bytes().to_vec()
        }
    };
    let mut truncated = [0u8; 12];
    truncated.copy_from_slice(&digest[..12]);
    truncated
}

pub fn verify(proto: AuthProtocol, localized_key: &[u8], message_with_zeroed_auth: &[u8], received: &[u8; 12]) -> bool {
    authenticate(proto, localized_key, message_with_zeroed_auth) == *received
}

/// DES-CBC privacy per RFC 3414 §8.1.1. `salt` is the 8-byte
/// `msgPrivacyParameters` counter.
pub fn des_encrypt(localized_priv_key: &[u8], salt: [u8; 8], plaintext: &[u8]) -> Vec<u8> {
    let des_key: [u8; 8] = localized_priv_key[..8].try_into().expect("localized key >= 16 bytes");
    let pre_iv: [u8; 8] = localized_priv_key[8..16].try_into().expect("localized key >= 16 bytes");
    let mut iv = [0u8; 8];
    for i in 0..8 {
        iv[i] = pre_iv[i] ^ salt[i];
    }

    let mut padded = plaintext.to_vec();
    let pad_len = (8 - padded.len() % 8) % 8;
    padded.extend(std::iter::repeat(0u8).take(pad_len));

    let mut encryptor = cbc::Encryptor::<Des>::new(&des_key.into(), &iv.into());
    let mut buf = padded;
    let blocks = buf.len() / 8;
    for i in 0..blocks {
        let mut block = des::cipher::generic_array::GenericArray::clone_from_slice(&buf[i * 8..i * 8 + 8]);
        encryptor.encrypt_block_mut(&mut block);
        buf[i * 8..i * 8 + 8].copy_from_slice(&block);
    }
    buf
}

/// AES-CFB privacy per RFC 3826. `salt` is the 8-byte local counter;
/// the 16-byte IV is `engine_boots || engine_time || salt`.
pub fn aes_encrypt(localized_priv_key: &[u8], engine_boots: u32, engine_time: u32, salt: [u8; 8], plaintext: &[u8]) -> Vec<u8> {
    let key: [u8; 16] = localized_priv_key[..16].try_into().expect("localized key >= 16 bytes");
    let mut iv = [0u8; 16];
    iv[0..4].copy_from_slice(&engine_boots.to_be_bytes());
    iv[4..8].copy_from_slice(&engine_time.to_be_bytes());
    iv[8..16].copy_from_slice(&salt);

    let mut buf = plaintext.to_vec();
    let cipher = CfbEncryptor::<Aes128>::new(&key.into(), &iv.into());
    cipher.encrypt(&mut buf);
    buf
}

/// Reverses `des_encrypt` given the same localized key and salt the
/// sender used (carried in the message's `msgPrivacyParameters`).
pub fn des_decrypt(localized_priv_key: &[u8], salt: [u8; 8], ciphertext: &[u8]) -> Vec<u8> {
    let des_key: [u8; 8] = localized_priv_key[..8].try_into().expect("localized key >= 16 bytes");
    let pre_iv: [u8; 8] = localized_priv_key[8..16].try_into().expect("localized key >= 16 bytes");
    let mut iv = [0u8; 8];
    for i in 0..8 {
        iv[i] = pre_iv[i] ^ salt[i];
    }

    let mut decryptor = cbc::Decryptor::<Des>::new(&des_key.into(), &iv.into());
    let mut buf = ciphertext.to_vec();
    let blocks = buf.len() / 8;
    for i in 0..blocks {
        let mut block = des::cipher::generic_array::GenericArray::clone_from_slice(&buf[i * 8..i * 8 + 8]);
        decryptor.decrypt_block_mut(&mut block);
        buf[i * 8..i * 8 + 8].copy_from_slice(&block);
    }
    buf
}

/// Reverses `aes_encrypt` given the same localized key, boots/time, and
/// salt the sender used.
pub fn aes_decrypt(localized_priv_key: &[u8], engine_boots: u32, engine_time: u32, salt: [u8; 8], ciphertext: &[u8]) -> Vec<u8> {
    let key: [u8; 16] = localized_priv_key[..16].try_into().expect("localized key >= 16 bytes");
    let mut iv = [0u8; 16];
    iv[0..4].copy_from_slice(&engine_boots.to_be_bytes());
    iv[4..8].copy_from_slice(&engine_time.to_be_bytes());
    iv[8..16].copy_from_slice(&salt);

    let mut buf = ciphertext.to_vec();
    let cipher = CfbDecryptor::<Aes128>::new(&key.into(), &iv.into());
    cipher.decrypt(&mut buf);
    buf
}

pub fn protocol_key_len(proto: PrivProtocol) -> usize {
    match proto {
        PrivProtocol::Des => 16,
        PrivProtocol::Aes => 16,
    }
}
