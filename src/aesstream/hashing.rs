//! [`HashingStream`] passes bytes through a [`ByteStream`] unchanged while accumulating a
//! digest over everything read, finalizing once the source is exhausted.

use std::io::SeekFrom;

use hmac::{Hmac, KeyInit, Mac};
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::aesstream::error::{Error, Result};
use crate::aesstream::stream::ByteStream;

/// Digest algorithm for a [`HashingStream`], optionally keyed for HMAC.
pub enum HashAlgorithm {
    Sha256,
    Sha1,
    Md5,
    HmacSha256(Vec<u8>),
    HmacSha1(Vec<u8>),
    HmacMd5(Vec<u8>),
}

enum Hasher {
    Sha256(Sha256),
    Sha1(Sha1),
    Md5(Md5),
    HmacSha256(Hmac<Sha256>),
    HmacSha1(Hmac<Sha1>),
    HmacMd5(Hmac<Md5>),
}

impl HashAlgorithm {
    fn build(&self) -> Hasher {
        match self {
            HashAlgorithm::Sha256 => Hasher::Sha256(Sha256::new()),
            HashAlgorithm::Sha1 => Hasher::Sha1(Sha1::new()),
            HashAlgorithm::Md5 => Hasher::Md5(Md5::new()),
            // HMAC accepts any key length, so this only fails on an allocator error.
            HashAlgorithm::HmacSha256(k) => {
                Hasher::HmacSha256(Hmac::new_from_slice(k).expect("HMAC accepts any key length"))
            }
            HashAlgorithm::HmacSha1(k) => {
                Hasher::HmacSha1(Hmac::new_from_slice(k).expect("HMAC accepts any key length"))
            }
            HashAlgorithm::HmacMd5(k) => {
                Hasher::HmacMd5(Hmac::new_from_slice(k).expect("HMAC accepts any key length"))
            }
        }
    }
}

impl Hasher {
    fn update(&mut self, data: &[u8]) {
        match self {
            Hasher::Sha256(h) => Digest::update(h, data),
            Hasher::Sha1(h) => Digest::update(h, data),
            Hasher::Md5(h) => Digest::update(h, data),
            Hasher::HmacSha256(h) => Mac::update(h, data),
            Hasher::HmacSha1(h) => Mac::update(h, data),
            Hasher::HmacMd5(h) => Mac::update(h, data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Hasher::Sha256(h) => h.finalize().to_vec(),
            Hasher::Sha1(h) => h.finalize().to_vec(),
            Hasher::Md5(h) => h.finalize().to_vec(),
            Hasher::HmacSha256(h) => h.finalize().into_bytes().to_vec(),
            Hasher::HmacSha1(h) => h.finalize().into_bytes().to_vec(),
            Hasher::HmacMd5(h) => h.finalize().into_bytes().to_vec(),
        }
    }
}

type CompletionCallback = Box<dyn FnMut(&[u8]) + Send>;

/// Wraps a [`ByteStream`], passing its bytes through unmodified while accumulating a
/// digest. The digest becomes available from [`HashingStream::digest`] once the source
/// reports EOF; an optional completion callback fires at the same moment.
pub struct HashingStream<S> {
    source: S,
    algorithm: HashAlgorithm,
    hasher: Hasher,
    digest: Option<Vec<u8>>,
    on_complete: Option<CompletionCallback>,
}

impl<S: ByteStream> HashingStream<S> {
    pub fn new(source: S, algorithm: HashAlgorithm) -> Self {
        let hasher = algorithm.build();
        Self {
            source,
            algorithm,
            hasher,
            digest: None,
            on_complete: None,
        }
    }

    /// Register a callback invoked exactly once, with the finalized digest, the moment
    /// the source is exhausted.
    pub fn on_complete(mut self, callback: impl FnMut(&[u8]) + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// The finalized digest, or `None` until the source has been read to completion.
    pub fn digest(&self) -> Option<&[u8]> {
        self.digest.as_deref()
    }

    /// Unwrap back to the underlying source.
    pub fn into_inner(self) -> S {
        self.source
    }

    fn finalize_if_done(&mut self) {
        if self.digest.is_some() {
            return;
        }
        let finished = self.algorithm.build();
        let hasher = std::mem::replace(&mut self.hasher, finished);
        let digest = hasher.finalize();
        if let Some(cb) = self.on_complete.as_mut() {
            cb(&digest);
        }
        self.digest = Some(digest);
    }
}

impl<S: ByteStream> ByteStream for HashingStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = self.source.read(buf)?;
        if n > 0 {
            self.hasher.update(&buf[..n]);
        } else {
            self.finalize_if_done();
        }
        Ok(n)
    }

    fn eof(&mut self) -> Result<bool> {
        let at_eof = self.source.eof()?;
        if at_eof {
            self.finalize_if_done();
        }
        Ok(at_eof)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        if pos == SeekFrom::Start(0) {
            self.source.rewind()?;
            self.hasher = self.algorithm.build();
            self.digest = None;
            return Ok(0);
        }
        Err(Error::UnsupportedSeek {
            detail: "HashingStream only supports rewinding to the start",
        })
    }

    fn tell(&mut self) -> Result<u64> {
        self.source.tell()
    }

    fn size(&mut self) -> Result<Option<u64>> {
        self.source.size()
    }

    fn is_seekable(&self) -> bool {
        self.source.is_seekable()
    }
}
