use std::fmt;

use sha2::{Digest, Sha256};
use zeroize::{Zeroize, Zeroizing};

/// Length of a derived secret in bytes.
pub const SECRET_SIZE: usize = 32;

/// Symmetric secret shared with the device.
///
/// Derived as `SHA-256(SHA-256(password))`. Held only for the duration of one
/// call and wiped on drop.
#[derive(Clone)]
pub struct Secret(Zeroizing<[u8; SECRET_SIZE]>);

impl Secret {
    /// Derive the secret from a UTF-8 password.
    pub fn derive(password: &str) -> Self {
        let mut first = Sha256::digest(password.as_bytes());
        let mut second = Sha256::digest(first.as_slice());
        first.as_mut_slice().zeroize();

        let mut bytes = Zeroizing::new([0u8; SECRET_SIZE]);
        bytes.copy_from_slice(&second);
        second.as_mut_slice().zeroize();
        Self(bytes)
    }

    /// Wrap raw secret bytes.
    pub fn from_bytes(bytes: [u8; SECRET_SIZE]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Borrow the raw secret bytes.
    pub fn as_bytes(&self) -> &[u8; SECRET_SIZE] {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Secret")
            .field(&format_args!("<redacted:{SECRET_SIZE} bytes>"))
            .finish()
    }
}
