//! [`Encryptor`] wraps a plaintext [`ByteStream`] and emits ciphertext, one AES block at a
//! time, using a [`CipherMethod`] to chain blocks together.

use std::io::SeekFrom;

use crate::aesstream::cipher_method::CipherMethod;
use crate::aesstream::core::round_keys;
use crate::aesstream::error::{Error, Result};
use crate::aesstream::key::Key;
use crate::aesstream::stream::ByteStream;
use crate::aesstream::util::pad_tail;

/// Encrypts a plaintext [`ByteStream`] lazily: reading from an `Encryptor` never pulls more
/// than one plaintext block ahead of what it has already emitted, so memory use is
/// independent of the source's size.
pub struct Encryptor<S> {
    source: S,
    round_keys: Vec<[u8; 16]>,
    method: CipherMethod,
    key_bits: u32,
    block_index: u64,
    position: u64,
    out_buf: Vec<u8>,
    out_pos: usize,
    finished: bool,
}

impl<S: ByteStream> Encryptor<S> {
    /// Wrap `source`, encrypting with `key` under `method`.
    pub fn new(source: S, key: Key, method: CipherMethod) -> Self {
        Self {
            source,
            key_bits: key.bits(),
            round_keys: round_keys(&key),
            method,
            block_index: 0,
            position: 0,
            out_buf: Vec::with_capacity(16),
            out_pos: 0,
            finished: false,
        }
    }

    /// `openssl`-style cipher name, e.g. `"aes-256-cbc"`.
    pub fn openssl_name(&self) -> String {
        self.method.openssl_name(self.key_bits)
    }

    /// Unwrap back to the underlying source, discarding any buffered ciphertext.
    pub fn into_inner(self) -> S {
        self.source
    }

    fn buffered(&self) -> &[u8] {
        &self.out_buf[self.out_pos..]
    }

    /// Pull the next ciphertext block(s) from the source into `out_buf`, or mark
    /// `finished` if there is nothing left to encrypt. No-op if already finished or if
    /// unread ciphertext remains buffered.
    fn fill_buffer(&mut self) -> Result<()> {
        if self.finished || !self.buffered().is_empty() {
            return Ok(());
        }

        let mut tmp = [0u8; 16];
        let mut read = 0;
        while read < 16 {
            let n = self.source.read(&mut tmp[read..])?;
            if n == 0 {
                break;
            }
            read += n;
        }

        self.out_buf.clear();
        self.out_pos = 0;

        if read == 16 {
            let block = self
                .method
                .encrypt_block(&tmp, &self.round_keys);
            self.out_buf.extend_from_slice(&block);
            self.block_index += 1;
        } else if self.method.requires_padding() {
            let padded = pad_tail(&tmp[..read]);
            let block = self
                .method
                .encrypt_block(&padded, &self.round_keys)
                .to_vec();
            self.out_buf = block;
            self.block_index += 1;
            self.finished = true;
        } else if read > 0 {
            let block = self.method.encrypt_block(&tmp, &self.round_keys);
            self.out_buf.extend_from_slice(&block[..read]);
            self.block_index += 1;
            self.finished = true;
        } else {
            self.finished = true;
        }

        Ok(())
    }
}

impl<S: ByteStream> ByteStream for Encryptor<S> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.fill_buffer()?;
        let available = self.buffered();
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.out_pos += n;
        self.position += n as u64;
        Ok(n)
    }

    fn eof(&mut self) -> Result<bool> {
        self.fill_buffer()?;
        Ok(self.buffered().is_empty() && self.finished)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let target = match pos {
            SeekFrom::Start(off) => off,
            SeekFrom::Current(delta) => {
                let signed = self.position as i64 + delta;
                if signed < 0 {
                    return Err(Error::UnsupportedSeek {
                        detail: "seek before start of stream",
                    });
                }
                signed as u64
            }
            SeekFrom::End(_) => {
                return Err(Error::UnsupportedSeek {
                    detail: "end-relative seeks are not supported",
                });
            }
        };

        if !self.method.is_block_addressable() {
            if target != 0 {
                return Err(Error::UnsupportedSeek {
                    detail: "CBC only supports seeking to the start of the stream",
                });
            }
            self.source.rewind()?;
            self.method.reset();
            self.block_index = 0;
            self.position = 0;
            self.out_buf.clear();
            self.out_pos = 0;
            self.finished = false;
            return Ok(0);
        }

        let block_index = target / 16;
        let fraction = (target % 16) as usize;

        self.source.seek(SeekFrom::Start(block_index * 16))?;
        self.method.reset();
        self.method.seek_to_block(block_index)?;
        self.block_index = block_index;
        self.position = block_index * 16;
        self.out_buf.clear();
        self.out_pos = 0;
        self.finished = false;

        if fraction > 0 {
            self.fill_buffer()?;
            self.out_pos = fraction.min(self.out_buf.len());
            self.position += self.out_pos as u64;
        }

        Ok(self.position)
    }

    fn tell(&mut self) -> Result<u64> {
        Ok(self.position)
    }

    fn size(&mut self) -> Result<Option<u64>> {
        let plaintext_len = match self.source.size()? {
            Some(len) => len,
            None => return Ok(None),
        };
        if self.method.requires_padding() {
            Ok(Some(plaintext_len - plaintext_len % 16 + 16))
        } else {
            Ok(Some(plaintext_len))
        }
    }

    fn is_seekable(&self) -> bool {
        self.source.is_seekable()
    }
}
