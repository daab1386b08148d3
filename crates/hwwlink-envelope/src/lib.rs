//! Password-derived encryption envelope for hardware wallet commands.
//!
//! Commands sent to a paired device are wrapped as
//! `base64(IV ‖ AES-256-CBC(plaintext) ‖ HMAC-SHA256)` under a key derived
//! from the user's password. Replies come back the same way.
//!
//! This crate only does the cryptography. Sending and receiving live in
//! `hwwlink-device`.

pub mod cipher;
pub mod error;
pub mod secret;

pub use cipher::{decrypt, decrypt_base64, encrypt, encrypt_base64, IV_SIZE, MAC_SIZE};
pub use error::{CryptoError, DecryptFailure, Result};
pub use secret::{Secret, SECRET_SIZE};
