//! AES-256 in ECB or CBC with PKCS#7 padding.
//!
//! `transform` always pads on encrypt and validates/strips on decrypt.
//! `EcbBlock` is the unpadded single-block primitive handed to the parallel
//! scheduler.

use crate::error::{CipherError, Result};
use crate::mode::{Mode, Operation};
use crate::pipeline::kdf::{Iv, Key};
use crate::pipeline::schedule::BlockProcessor;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes256, Block};
use subtle::ConstantTimeEq;

pub const BLOCK_SIZE: usize = 16;

/// Apply the cipher to a whole buffer, with padding
///
/// Encrypt output is `padded_len(data.len())` bytes. Decrypt input must be a
/// positive multiple of `BLOCK_SIZE`; bad padding yields `PaddingOrKey`.
/// `iv` is ignored in ECB mode.
pub fn transform(
    data: &[u8],
    key: &Key,
    iv: &Iv,
    mode: Mode,
    operation: Operation,
) -> Result<Vec<u8>> {
    let cipher = Aes256::new(GenericArray::from_slice(key));

    match operation {
        Operation::Encrypt => {
            let mut buf = pad(data);
            match mode {
                Mode::Ecb => ecb_encrypt(&cipher, &mut buf),
                Mode::Cbc => cbc_encrypt(&cipher, iv, &mut buf),
            }
            Ok(buf)
        }
        Operation::Decrypt => {
            check_alignment(data.len())?;
            let mut buf = data.to_vec();
            match mode {
                Mode::Ecb => ecb_decrypt(&cipher, &mut buf),
                Mode::Cbc => cbc_decrypt(&cipher, iv, &mut buf),
            }
            let plain_len = unpad(&buf)?.len();
            buf.truncate(plain_len);
            Ok(buf)
        }
    }
}

/// Ciphertext length for a plaintext of `len` bytes
pub fn padded_len(len: usize) -> usize {
    (len / BLOCK_SIZE + 1) * BLOCK_SIZE
}

/// PKCS#7: append 1..=16 bytes, each equal to the pad length
pub fn pad(data: &[u8]) -> Vec<u8> {
    let pad_len = BLOCK_SIZE - data.len() % BLOCK_SIZE;
    let total = padded_len(data.len());
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(data);
    out.resize(total, pad_len as u8);
    out
}

/// Validate and strip PKCS#7 padding
pub fn unpad(data: &[u8]) -> Result<&[u8]> {
    let last = *data.last().ok_or(CipherError::PaddingOrKey)?;
    let pad_len = last as usize;
    if pad_len == 0 || pad_len > BLOCK_SIZE || pad_len > data.len() {
        return Err(CipherError::PaddingOrKey);
    }

    let split = data.len() - pad_len;
    let expected = [last; BLOCK_SIZE];
    if !bool::from(data[split..].ct_eq(&expected[..pad_len])) {
        return Err(CipherError::PaddingOrKey);
    }
    Ok(&data[..split])
}

pub fn check_alignment(len: usize) -> Result<()> {
    if len == 0 || len % BLOCK_SIZE != 0 {
        return Err(CipherError::BlockAlignment {
            len,
            block_size: BLOCK_SIZE,
        });
    }
    Ok(())
}

fn xor_in_place(block: &mut [u8], mask: &[u8; BLOCK_SIZE]) {
    for (b, m) in block.iter_mut().zip(mask.iter()) {
        *b ^= m;
    }
}

fn ecb_encrypt(cipher: &Aes256, buf: &mut [u8]) {
    for chunk in buf.chunks_exact_mut(BLOCK_SIZE) {
        cipher.encrypt_block(Block::from_mut_slice(chunk));
    }
}

fn ecb_decrypt(cipher: &Aes256, buf: &mut [u8]) {
    for chunk in buf.chunks_exact_mut(BLOCK_SIZE) {
        cipher.decrypt_block(Block::from_mut_slice(chunk));
    }
}

// Each plaintext block is XORed with the previous ciphertext block (IV first)
fn cbc_encrypt(cipher: &Aes256, iv: &Iv, buf: &mut [u8]) {
    let mut prev = *iv;
    for chunk in buf.chunks_exact_mut(BLOCK_SIZE) {
        xor_in_place(chunk, &prev);
        cipher.encrypt_block(Block::from_mut_slice(chunk));
        prev.copy_from_slice(chunk);
    }
}

fn cbc_decrypt(cipher: &Aes256, iv: &Iv, buf: &mut [u8]) {
    let mut prev = *iv;
    let mut current = [0u8; BLOCK_SIZE];
    for chunk in buf.chunks_exact_mut(BLOCK_SIZE) {
        current.copy_from_slice(chunk);
        cipher.decrypt_block(Block::from_mut_slice(chunk));
        xor_in_place(chunk, &prev);
        prev = current;
    }
}

/// Single-block ECB primitive, no padding
pub struct EcbBlock {
    cipher: Aes256,
    operation: Operation,
}

impl EcbBlock {
    pub fn new(key: &Key, operation: Operation) -> Self {
        Self {
            cipher: Aes256::new(GenericArray::from_slice(key)),
            operation,
        }
    }
}

impl BlockProcessor for EcbBlock {
    fn process(&self, index: usize, block: &mut [u8]) -> Result<()> {
        if block.len() != BLOCK_SIZE {
            return Err(CipherError::BlockFailure {
                index,
                failed: 1,
                reason: format!("expected {} bytes, got {}", BLOCK_SIZE, block.len()),
            });
        }
        let block = Block::from_mut_slice(block);
        match self.operation {
            Operation::Encrypt => self.cipher.encrypt_block(block),
            Operation::Decrypt => self.cipher.decrypt_block(block),
        }
        Ok(())
    }
}
