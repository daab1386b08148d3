/// Errors that can occur while sealing or opening an envelope.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// The command could not be encrypted.
    #[error("failed to encrypt command: {0}")]
    EncryptFailed(String),

    /// The reply could not be decoded, authenticated or decrypted.
    #[error("failed to decrypt reply: {0}")]
    DecryptFailed(#[from] DecryptFailure),
}

/// Why a reply failed to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecryptFailure {
    /// The ciphertext field is not valid base64.
    #[error("ciphertext is not valid base64")]
    InvalidBase64,

    /// Too short to hold IV, one block and MAC, or not block aligned.
    #[error("invalid ciphertext length ({0} bytes)")]
    InvalidLength(usize),

    /// The authentication tag does not match (tampered or wrong password).
    #[error("authentication tag mismatch")]
    MacMismatch,

    /// The decrypted plaintext has invalid PKCS#7 padding.
    #[error("invalid padding")]
    BadPadding,
}

pub type Result<T> = std::result::Result<T, CryptoError>;
