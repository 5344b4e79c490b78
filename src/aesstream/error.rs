use thiserror::Error;
use rand::rand_core;

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the streaming AES engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Attempted to instantiate an AES key with an input size that is not 128, 192, or 256 bits.
    #[error("invalid key length: {len} bytes (expected 16, 24, or 32)")]
    InvalidKeyLength { len: usize },

    /// Attempted to construct a cipher method with an IV that is not exactly 16 bytes.
    #[error("invalid IV length: {len} bytes (expected 16)")]
    InvalidIvLength { len: usize },

    /// A `seek` call was made that the cipher method or transformer does not support.
    ///
    /// Covers CBC's single-reset seek contract, non-block-aligned or negative CTR `Current`
    /// seeks, and any `End`-relative seek.
    #[error("unsupported seek: {detail}")]
    UnsupportedSeek { detail: &'static str },

    /// Block encryption failed. Carries the zero-based index of the offending block.
    #[error("block {index}: encryption failed: {reason}")]
    EncryptionFailed { index: u64, reason: String },

    /// Block decryption failed, most commonly a PKCS#7 padding check on the final block.
    /// Carries the zero-based index of the offending block.
    #[error("block {index}: decryption failed: {reason}")]
    DecryptionFailed { index: u64, reason: String },

    /// OS RNG failed during random key or IV generation.
    #[error("OS RNG failed in random generation")]
    Rng(#[from] rand_core::OsError),

    /// Propagated unchanged from the underlying byte-stream source.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
