//! Streaming AES transformers over a byte-stream abstraction.
//!
//! The three transformers in this crate wrap any [`ByteStream`] source and expose the
//! same trait back out, so they can be nested:
//! - [`Encryptor`] reads plaintext lazily and emits ciphertext.
//! - [`Decryptor`] reads ciphertext lazily and emits plaintext, stripping PKCS#7 padding
//!   on finalization.
//! - [`HashingStream`] passes bytes through unchanged while accumulating a digest.
//!
//! Two modes of operation are supported via [`CipherMethod`]:
//! - **CBC**, which chains each ciphertext block into the next block's IV and requires
//!   PKCS#7 padding.
//! - **CTR**, which XORs plaintext with an encrypted, incrementing 16-byte counter and
//!   needs no padding — the ciphertext is exactly as long as the plaintext and is
//!   randomly addressable at block granularity.
//!
//! Unlike a one-shot `encrypt(all_bytes)` call, these transformers never hold more than
//! a couple of cipher blocks in memory, so encrypting a multi-gigabyte file costs O(1)
//! memory.
//!
//! ## Example
//! ```
//! use std::io::Cursor;
//! use aesstream::{CipherMethod, Encryptor, Decryptor, Key, ByteStream, IoStream};
//!
//! # fn main() -> aesstream::Result<()> {
//! let key = Key::rand_key_256()?;
//! let iv = [0x11u8; 16];
//!
//! let plaintext = b"Hello, World! This message spans more than one AES block.".to_vec();
//! let source = IoStream::new(Cursor::new(plaintext.clone()));
//! let method = CipherMethod::new_ctr(&iv)?;
//! let mut encryptor = Encryptor::new(source, key.clone(), method);
//! let ciphertext = encryptor.get_contents()?;
//!
//! let method = CipherMethod::new_ctr(&iv)?;
//! let mut decryptor = Decryptor::new(IoStream::new(Cursor::new(ciphertext)), key, method);
//! let recovered = decryptor.get_contents()?;
//!
//! assert_eq!(recovered, plaintext);
//! # Ok(())
//! # }
//! ```

mod aesstream;

pub use aesstream::{
    ByteStream, CipherMethod, Decryptor, Encryptor, Error, HashAlgorithm, HashingStream, IoStream,
    Key, NonSeekableStream, Result,
};
pub use std::io::SeekFrom;
