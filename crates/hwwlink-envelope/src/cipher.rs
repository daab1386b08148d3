use aes::Aes256;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256, Sha512};
use tracing::trace;
use zeroize::Zeroizing;

use crate::error::{CryptoError, DecryptFailure, Result};
use crate::secret::Secret;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// AES-CBC initialization vector length.
pub const IV_SIZE: usize = 16;

/// HMAC-SHA256 tag length.
pub const MAC_SIZE: usize = 32;

const BLOCK_SIZE: usize = 16;

/// Encryption and authentication keys split from `SHA-512(secret)`.
struct Keys {
    material: Zeroizing<[u8; 64]>,
}

impl Keys {
    fn derive(secret: &Secret) -> Self {
        let mut material = Zeroizing::new([0u8; 64]);
        material.copy_from_slice(&Sha512::digest(secret.as_bytes()));
        Self { material }
    }

    fn encryption(&self) -> &[u8] {
        &self.material[..32]
    }

    fn authentication(&self) -> &[u8] {
        &self.material[32..]
    }
}

/// Encrypt then MAC.
///
/// Layout:
/// ```text
/// ┌──────────┬───────────────────────────────┬───────────────────────────┐
/// │ IV (16B) │ AES-256-CBC, PKCS#7 (n × 16B) │ HMAC-SHA256(IV ‖ ct) (32B)│
/// └──────────┴───────────────────────────────┴───────────────────────────┘
/// ```
pub fn encrypt(plaintext: &[u8], secret: &Secret) -> Result<Vec<u8>> {
    let mut iv = [0u8; IV_SIZE];
    OsRng
        .try_fill_bytes(&mut iv)
        .map_err(|err| CryptoError::EncryptFailed(format!("no randomness for IV: {err}")))?;
    encrypt_with_iv(plaintext, secret, &iv)
}

fn encrypt_with_iv(plaintext: &[u8], secret: &Secret, iv: &[u8; IV_SIZE]) -> Result<Vec<u8>> {
    let keys = Keys::derive(secret);
    let cipher = Aes256CbcEnc::new_from_slices(keys.encryption(), iv)
        .map_err(|err| CryptoError::EncryptFailed(err.to_string()))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut out = Vec::with_capacity(IV_SIZE + ciphertext.len() + MAC_SIZE);
    out.extend_from_slice(iv);
    out.extend_from_slice(&ciphertext);

    let mut mac = <HmacSha256 as Mac>::new_from_slice(keys.authentication())
        .map_err(|err| CryptoError::EncryptFailed(err.to_string()))?;
    mac.update(&out);
    out.extend_from_slice(&mac.finalize().into_bytes());

    trace!(plaintext_len = plaintext.len(), sealed_len = out.len(), "sealed envelope");
    Ok(out)
}

/// Verify the MAC, then decrypt.
///
/// Wrong passwords and tampered or garbage input fail at the MAC check before
/// any decryption happens.
pub fn decrypt(sealed: &[u8], secret: &Secret) -> Result<Vec<u8>> {
    let len = sealed.len();
    if len < IV_SIZE + BLOCK_SIZE + MAC_SIZE || (len - IV_SIZE - MAC_SIZE) % BLOCK_SIZE != 0 {
        return Err(DecryptFailure::InvalidLength(len).into());
    }

    let keys = Keys::derive(secret);
    let (body, tag) = sealed.split_at(len - MAC_SIZE);

    let mut mac = <HmacSha256 as Mac>::new_from_slice(keys.authentication())
        .map_err(|_| DecryptFailure::MacMismatch)?;
    mac.update(body);
    mac.verify_slice(tag)
        .map_err(|_| DecryptFailure::MacMismatch)?;

    let (iv, ciphertext) = body.split_at(IV_SIZE);
    let cipher = Aes256CbcDec::new_from_slices(keys.encryption(), iv)
        .map_err(|_| DecryptFailure::InvalidLength(len))?;
    let plaintext = cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| DecryptFailure::BadPadding)?;

    Ok(plaintext)
}

/// [`encrypt`] and encode with the standard base64 alphabet.
pub fn encrypt_base64(plaintext: &[u8], secret: &Secret) -> Result<String> {
    Ok(STANDARD.encode(encrypt(plaintext, secret)?))
}

/// Decode standard base64, then [`decrypt`].
pub fn decrypt_base64(text: &str, secret: &Secret) -> Result<Vec<u8>> {
    let sealed = STANDARD
        .decode(text)
        .map_err(|_| DecryptFailure::InvalidBase64)?;
    decrypt(&sealed, secret)
}
