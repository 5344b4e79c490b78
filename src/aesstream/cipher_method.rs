//! [`CipherMethod`] captures the chaining strategy (CBC or CTR) as a tagged enum rather
//! than a trait object: there are exactly two modes, their state shapes differ (a running
//! IV chain vs. an incrementing counter), and callers branch on the concrete mode anyway
//! when deciding whether a seek is even possible.

use crate::aesstream::core::{decrypt_block, encrypt_block};
use crate::aesstream::error::{Error, Result};
use crate::aesstream::util::xor_block;

/// Opaque CBC chaining state; only constructible via [`CipherMethod::new_cbc`].
#[derive(Clone)]
pub struct CbcState {
    iv: [u8; 16],
    chain: [u8; 16],
}

/// Opaque CTR counter state; only constructible via [`CipherMethod::new_ctr`].
#[derive(Clone)]
pub struct CtrState {
    iv: [u8; 16],
    counter: [u8; 16],
}

/// The block-chaining strategy used by [`Encryptor`](crate::Encryptor) and
/// [`Decryptor`](crate::Decryptor). Carries its own IV/counter state; the AES round keys
/// live with the transformer and are passed into each call.
#[derive(Clone)]
pub enum CipherMethod {
    /// Cipher Block Chaining: each ciphertext block is folded into the next block's IV.
    /// Requires PKCS#7 padding and only supports resetting to the start, not arbitrary seeks.
    Cbc(CbcState),
    /// Counter mode: plaintext is XORed with an encrypted, incrementing 16-byte counter.
    /// No padding; block-addressable, so arbitrary seeks are supported.
    Ctr(CtrState),
}

fn require_iv16(iv: &[u8]) -> Result<[u8; 16]> {
    iv.try_into()
        .map_err(|_| Error::InvalidIvLength { len: iv.len() })
}

impl CipherMethod {
    /// Build a CBC cipher method from a 16-byte IV.
    pub fn new_cbc(iv: &[u8]) -> Result<Self> {
        let iv = require_iv16(iv)?;
        Ok(CipherMethod::Cbc(CbcState { iv, chain: iv }))
    }

    /// Build a CTR cipher method from a 16-byte initial counter value.
    pub fn new_ctr(iv: &[u8]) -> Result<Self> {
        let iv = require_iv16(iv)?;
        Ok(CipherMethod::Ctr(CtrState { iv, counter: iv }))
    }

    /// The IV/initial-counter this method was constructed with (not the current chain state).
    pub fn initial_iv(&self) -> [u8; 16] {
        match self {
            CipherMethod::Cbc(s) => s.iv,
            CipherMethod::Ctr(s) => s.iv,
        }
    }

    /// Whether ciphertext produced by this method must be padded to a block boundary.
    pub fn requires_padding(&self) -> bool {
        matches!(self, CipherMethod::Cbc(_))
    }

    /// Whether this method supports seeking to an arbitrary block index.
    pub fn is_block_addressable(&self) -> bool {
        matches!(self, CipherMethod::Ctr(_))
    }

    /// `openssl`-style cipher name, e.g. `"aes-256-ctr"`.
    pub fn openssl_name(&self, key_bits: u32) -> String {
        let mode = match self {
            CipherMethod::Cbc(_) => "cbc",
            CipherMethod::Ctr(_) => "ctr",
        };
        format!("aes-{key_bits}-{mode}")
    }

    /// Encrypt one plaintext block, advancing the chaining state.
    pub(crate) fn encrypt_block(&mut self, block: &[u8; 16], round_keys: &[[u8; 16]]) -> [u8; 16] {
        match self {
            CipherMethod::Cbc(s) => {
                let input = xor_block(block, &s.chain);
                let out = encrypt_block(&input, round_keys);
                s.chain = out;
                out
            }
            CipherMethod::Ctr(s) => {
                let keystream = encrypt_block(&s.counter, round_keys);
                let out = xor_block(block, &keystream);
                s.counter = increment_counter(s.counter, 1);
                out
            }
        }
    }

    /// Decrypt one ciphertext block, advancing the chaining state.
    pub(crate) fn decrypt_block(&mut self, block: &[u8; 16], round_keys: &[[u8; 16]]) -> [u8; 16] {
        match self {
            CipherMethod::Cbc(s) => {
                let decrypted = decrypt_block(block, round_keys);
                let out = xor_block(&decrypted, &s.chain);
                s.chain = *block;
                out
            }
            CipherMethod::Ctr(s) => {
                let keystream = encrypt_block(&s.counter, round_keys);
                let out = xor_block(block, &keystream);
                s.counter = increment_counter(s.counter, 1);
                out
            }
        }
    }

    /// Reset chaining state back to the IV/initial counter this method was built with.
    pub(crate) fn reset(&mut self) {
        match self {
            CipherMethod::Cbc(s) => s.chain = s.iv,
            CipherMethod::Ctr(s) => s.counter = s.iv,
        }
    }

    /// Reposition to the start of block `block_index`. Only CTR supports this; CBC can
    /// only be reset to block 0.
    pub(crate) fn seek_to_block(&mut self, block_index: u64) -> Result<()> {
        match self {
            CipherMethod::Cbc(s) => {
                if block_index == 0 {
                    s.chain = s.iv;
                    Ok(())
                } else {
                    Err(Error::UnsupportedSeek {
                        detail: "CBC only supports seeking to the start of the stream",
                    })
                }
            }
            CipherMethod::Ctr(s) => {
                s.counter = increment_counter(s.iv, block_index);
                Ok(())
            }
        }
    }
}

/// Add `n` to a 128-bit big-endian counter, wrapping on overflow.
fn increment_counter(counter: [u8; 16], n: u64) -> [u8; 16] {
    let value = u128::from_be_bytes(counter).wrapping_add(n as u128);
    value.to_be_bytes()
}
