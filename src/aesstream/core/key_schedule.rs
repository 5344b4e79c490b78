//! AES key schedule (FIPS-197 `KeyExpansion`). Produces one 16-byte round key per round,
//! `Nr + 1` of them, from a 128/192/256-bit key.

use super::constants::{RCON, SBOX};
use crate::aesstream::util::xor_words;
use crate::aesstream::Key;

fn sub_word(word: [u8; 4]) -> [u8; 4] {
    [
        SBOX[word[0] as usize],
        SBOX[word[1] as usize],
        SBOX[word[2] as usize],
        SBOX[word[3] as usize],
    ]
}

fn rot_word(word: [u8; 4]) -> [u8; 4] {
    [word[1], word[2], word[3], word[0]]
}

/// Expand `key` into its full set of round keys, one 16-byte block per round.
pub fn round_keys(key: &Key) -> Vec<[u8; 16]> {
    let key_bytes = key.as_bytes();
    let nk = key_bytes.len() / 4;
    let nr = nk + 6;
    let total_words = 4 * (nr + 1);

    let mut words: Vec<[u8; 4]> = Vec::with_capacity(total_words);
    for chunk in key_bytes.chunks_exact(4) {
        words.push([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    for i in nk..total_words {
        let mut temp = words[i - 1];
        if i % nk == 0 {
            temp = xor_words(&sub_word(rot_word(temp)), &[RCON[i / nk], 0, 0, 0]);
        } else if nk > 6 && i % nk == 4 {
            temp = sub_word(temp);
        }
        words.push(xor_words(&words[i - nk], &temp));
    }

    words
        .chunks_exact(4)
        .map(|round| {
            let mut block = [0u8; 16];
            for (w, word) in round.iter().enumerate() {
                block[w * 4..w * 4 + 4].copy_from_slice(word);
            }
            block
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aes128_produces_eleven_round_keys() {
        let key = Key::try_from_slice(&[0u8; 16]).unwrap();
        assert_eq!(round_keys(&key).len(), 11);
    }

    #[test]
    fn aes192_produces_thirteen_round_keys() {
        let key = Key::try_from_slice(&[0u8; 24]).unwrap();
        assert_eq!(round_keys(&key).len(), 13);
    }

    #[test]
    fn aes256_produces_fifteen_round_keys() {
        let key = Key::try_from_slice(&[0u8; 32]).unwrap();
        assert_eq!(round_keys(&key).len(), 15);
    }

    #[test]
    fn fips197_aes128_first_round_key_matches_key() {
        let key_bytes: [u8; 16] = [
            0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf,
            0x4f, 0x3c,
        ];
        let key = Key::try_from_slice(&key_bytes).unwrap();
        let keys = round_keys(&key);
        assert_eq!(keys[0], key_bytes);
        // FIPS-197 Appendix A.1, round key 1 (words w4..w7)
        assert_eq!(
            keys[1],
            [
                0xa0, 0xfa, 0xfe, 0x17, 0x88, 0x54, 0x2c, 0xb1, 0x23, 0xa3, 0x39, 0x39, 0x2a,
                0x6c, 0x76, 0x05
            ]
        );
    }
}
