//! [`Decryptor`] wraps a ciphertext [`ByteStream`] and emits plaintext. It keeps a
//! one-block lookahead so it can recognise the final block before handing it back:
//! that's the block CBC strips PKCS#7 padding from.

use std::io::SeekFrom;

use crate::aesstream::cipher_method::CipherMethod;
use crate::aesstream::core::round_keys;
use crate::aesstream::error::{Error, Result};
use crate::aesstream::key::Key;
use crate::aesstream::stream::ByteStream;
use crate::aesstream::util::unpad_block;

pub struct Decryptor<S> {
    source: S,
    round_keys: Vec<[u8; 16]>,
    method: CipherMethod,
    key_bits: u32,
    block_index: u64,
    position: u64,
    out_buf: Vec<u8>,
    out_pos: usize,
    lookahead: Option<([u8; 16], usize)>,
    finished: bool,
}

impl<S: ByteStream> Decryptor<S> {
    /// Wrap `source`, decrypting with `key` under `method`.
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
            lookahead: None,
            finished: false,
        }
    }

    /// `openssl`-style cipher name, e.g. `"aes-256-cbc"`.
    pub fn openssl_name(&self) -> String {
        self.method.openssl_name(self.key_bits)
    }

    /// Unwrap back to the underlying source, discarding any buffered plaintext.
    pub fn into_inner(self) -> S {
        self.source
    }

    fn buffered(&self) -> &[u8] {
        &self.out_buf[self.out_pos..]
    }

    fn read_raw_block(&mut self) -> Result<([u8; 16], usize)> {
        let mut buf = [0u8; 16];
        let mut read = 0;
        while read < 16 {
            let n = self.source.read(&mut buf[read..])?;
            if n == 0 {
                break;
            }
            read += n;
        }
        Ok((buf, read))
    }

    fn fill_buffer(&mut self) -> Result<()> {
        if self.finished || !self.buffered().is_empty() {
            return Ok(());
        }

        let (current, current_len) = match self.lookahead.take() {
            Some(block) => block,
            None => {
                let (buf, n) = self.read_raw_block()?;
                if n == 0 {
                    self.finished = true;
                    return Ok(());
                }
                (buf, n)
            }
        };

        if current_len < 16 {
            if self.method.requires_padding() {
                return Err(Error::DecryptionFailed {
                    index: self.block_index,
                    reason: "ciphertext length is not a multiple of the block size".to_string(),
                });
            }
            let decrypted = self.method.decrypt_block(&current, &self.round_keys);
            self.out_buf = decrypted[..current_len].to_vec();
            self.out_pos = 0;
            self.block_index += 1;
            self.finished = true;
            return Ok(());
        }

        let (next, next_len) = self.read_raw_block()?;
        let is_final = next_len == 0;
        if !is_final {
            self.lookahead = Some((next, next_len));
        }

        let decrypted = self.method.decrypt_block(&current, &self.round_keys);

        if is_final && self.method.requires_padding() {
            let unpadded = unpad_block(&decrypted).map_err(|reason| Error::DecryptionFailed {
                index: self.block_index,
                reason: reason.to_string(),
            })?;
            self.out_buf = unpadded.to_vec();
        } else {
            self.out_buf = decrypted.to_vec();
        }
        self.out_pos = 0;
        self.block_index += 1;
        if is_final {
            self.finished = true;
        }

        Ok(())
    }
}

impl<S: ByteStream> ByteStream for Decryptor<S> {
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

        if target != 0 {
            return Err(Error::UnsupportedSeek {
                detail: "Decryptor only supports seeking to the start of the stream; \
                         wrap it in an external bounded/positional stream for arbitrary positioning",
            });
        }
        self.source.rewind()?;
        self.method.reset();
        self.block_index = 0;
        self.position = 0;
        self.out_buf.clear();
        self.out_pos = 0;
        self.lookahead = None;
        self.finished = false;
        Ok(0)
    }

    fn tell(&mut self) -> Result<u64> {
        Ok(self.position)
    }

    fn size(&mut self) -> Result<Option<u64>> {
        if self.method.requires_padding() {
            return Ok(None);
        }
        self.source.size()
    }

    fn is_seekable(&self) -> bool {
        self.source.is_seekable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aesstream::stream::IoStream;
    use std::io::Cursor;

    fn key() -> Key {
        Key::try_from_slice(&[0x5Au8; 32]).unwrap()
    }

    #[test]
    fn cbc_roundtrip_strips_padding_exactly() {
        let plaintext = b"not a multiple of sixteen".to_vec();
        let ciphertext = {
            let source = IoStream::new(Cursor::new(plaintext.clone()));
            let method = CipherMethod::new_cbc(&[4u8; 16]).unwrap();
            super::super::encryptor::Encryptor::new(source, key(), method)
                .get_contents()
                .unwrap()
        };
        let source = IoStream::new(Cursor::new(ciphertext));
        let method = CipherMethod::new_cbc(&[4u8; 16]).unwrap();
        let mut dec = Decryptor::new(source, key(), method);
        let recovered = dec.get_contents().unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn ctr_roundtrip_non_block_aligned() {
        let plaintext = b"seventeen letters".to_vec();
        let ciphertext = {
            let source = IoStream::new(Cursor::new(plaintext.clone()));
            let method = CipherMethod::new_ctr(&[9u8; 16]).unwrap();
            super::super::encryptor::Encryptor::new(source, key(), method)
                .get_contents()
                .unwrap()
        };
        assert_eq!(ciphertext.len(), plaintext.len());
        let source = IoStream::new(Cursor::new(ciphertext));
        let method = CipherMethod::new_ctr(&[9u8; 16]).unwrap();
        let mut dec = Decryptor::new(source, key(), method);
        assert_eq!(dec.get_contents().unwrap(), plaintext);
    }

    #[test]
    fn cbc_rejects_truncated_ciphertext() {
        let source = IoStream::new(Cursor::new(vec![0u8; 20]));
        let method = CipherMethod::new_cbc(&[0u8; 16]).unwrap();
        let mut dec = Decryptor::new(source, key(), method);
        assert!(dec.get_contents().is_err());
    }

    #[test]
    fn cbc_rejects_corrupted_padding() {
        let mut ciphertext = {
            let source = IoStream::new(Cursor::new(b"round trip me".to_vec()));
            let method = CipherMethod::new_cbc(&[0u8; 16]).unwrap();
            super::super::encryptor::Encryptor::new(source, key(), method)
                .get_contents()
                .unwrap()
        };
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0xff;
        let source = IoStream::new(Cursor::new(ciphertext));
        let method = CipherMethod::new_cbc(&[0u8; 16]).unwrap();
        let mut dec = Decryptor::new(source, key(), method);
        assert!(dec.get_contents().is_err());
    }

    #[test]
    fn ctr_decryptor_rejects_arbitrary_seek() {
        let plaintext: Vec<u8> = (0..64u8).collect();
        let ciphertext = {
            let source = IoStream::new(Cursor::new(plaintext));
            let method = CipherMethod::new_ctr(&[6u8; 16]).unwrap();
            super::super::encryptor::Encryptor::new(source, key(), method)
                .get_contents()
                .unwrap()
        };
        let source = IoStream::new(Cursor::new(ciphertext));
        let method = CipherMethod::new_ctr(&[6u8; 16]).unwrap();
        let mut dec = Decryptor::new(source, key(), method);
        assert!(dec.seek(SeekFrom::Start(48)).is_err());
        // Start(0) remains the one seek the decryptor supports.
        assert!(dec.seek(SeekFrom::Start(0)).is_ok());
    }

    #[test]
    fn cbc_size_is_unknown() {
        let source = IoStream::new(Cursor::new(vec![0u8; 32]));
        let method = CipherMethod::new_cbc(&[0u8; 16]).unwrap();
        let mut dec = Decryptor::new(source, key(), method);
        assert_eq!(dec.size().unwrap(), None);
    }

    /// A ciphertext source that generates bytes on demand instead of holding them in
    /// memory. Feeding arbitrary bytes through CTR is still a well-defined decrypt (no
    /// padding to validate), so this doesn't need to be real ciphertext.
    struct Generated(u64);

    impl ByteStream for Generated {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
            let n = self.0.min(buf.len() as u64) as usize;
            buf[..n].fill(0);
            self.0 -= n as u64;
            Ok(n)
        }
        fn eof(&mut self) -> Result<bool> {
            Ok(self.0 == 0)
        }
        fn seek(&mut self, _pos: SeekFrom) -> Result<u64> {
            Err(Error::UnsupportedSeek {
                detail: "generated source is not seekable",
            })
        }
        fn tell(&mut self) -> Result<u64> {
            Err(Error::UnsupportedSeek {
                detail: "generated source is not seekable",
            })
        }
        fn size(&mut self) -> Result<Option<u64>> {
            Ok(Some(self.0))
        }
        fn is_seekable(&self) -> bool {
            false
        }
    }

    #[test]
    fn internal_buffer_stays_bounded_over_a_large_stream() {
        // Scaled down from the spec's illustrative 124 MB/1 MB figures to keep this test
        // fast; the property under test (bounded buffer regardless of total length) does
        // not depend on the absolute size.
        const TOTAL: u64 = 16 * 1024 * 1024;
        const WINDOW: usize = 1024 * 1024;

        let method = CipherMethod::new_ctr(&[0u8; 16]).unwrap();
        let mut dec = Decryptor::new(Generated(TOTAL), key(), method);
        let mut buf = vec![0u8; WINDOW];
        let mut total_read = 0u64;
        loop {
            let n = dec.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            assert!(
                dec.out_buf.len() <= 16,
                "decryptor buffered {} bytes, expected at most one block",
                dec.out_buf.len()
            );
            total_read += n as u64;
        }
        assert_eq!(total_read, TOTAL);
    }
}
