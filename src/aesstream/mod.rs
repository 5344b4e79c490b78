mod cipher_method;
mod core;
mod decryptor;
mod encryptor;
mod error;
mod hashing;
mod key;
mod stream;
mod util;

pub use cipher_method::CipherMethod;
pub use decryptor::Decryptor;
pub use encryptor::Encryptor;
pub use error::{Error, Result};
pub use hashing::{HashAlgorithm, HashingStream};
pub use key::Key;
pub use stream::{ByteStream, IoStream, NonSeekableStream};
