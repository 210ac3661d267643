mod common;

use bmpcipher::header::{split, BMP_HEADER_SIZE};
use bmpcipher::pipeline::{
    derive, run_ecb, transform, BlockProcessor, EcbBlock, KeyMaterial, BLOCK_SIZE,
};
use bmpcipher::{
    process, CipherConfig, CipherContext, CipherError, Mode, Operation, PayloadLayout,
    ProcessOptions, SaltPolicy,
};
use common::build_bitmap;
use proptest::prelude::*;
use rayon::ThreadPoolBuilder;
use std::error::Error;

const SALT: &[u8] = b"OpenMP_AES_Salt";

fn context() -> CipherContext {
    CipherContext::new(CipherConfig {
        threads: Some(4),
        ..Default::default()
    })
    .unwrap()
}

fn raw(operation: Operation, mode: Mode) -> ProcessOptions {
    ProcessOptions {
        operation,
        mode,
        layout: PayloadLayout::Raw,
        salt: SaltPolicy::Fixed,
    }
}

fn fixed_keys() -> KeyMaterial {
    let mut key = [0u8; 32];
    let mut iv = [0u8; 16];
    for (i, b) in key.iter_mut().enumerate() {
        *b = (i * 7 + 1) as u8;
    }
    for (i, b) in iv.iter_mut().enumerate() {
        *b = (i * 13 + 5) as u8;
    }
    KeyMaterial::from_parts(key, iv)
}

fn blocks(data: &[u8]) -> Vec<&[u8]> {
    data.chunks(BLOCK_SIZE).collect()
}

#[test]
fn hello_world_cbc_scenario() -> Result<(), Box<dyn Error>> {
    let ctx = context();
    let plaintext = b"HELLO WORLD!!!!!";

    let first = process(&ctx, plaintext, b"secret", &raw(Operation::Encrypt, Mode::Cbc))?;
    let second = process(&ctx, plaintext, b"secret", &raw(Operation::Encrypt, Mode::Cbc))?;
    assert_eq!(first.bytes.len(), 32, "16 bytes of data plus a full padding block");
    assert_eq!(first.bytes, second.bytes, "fixed salt makes encryption deterministic");

    // Known answer, cross-checked with `openssl enc -aes-256-cbc` under the
    // PBKDF2-derived key and IV
    assert_eq!(
        hex::encode(&first.bytes),
        "4ce02f476521709a36fd8a130a6248b3fbbf3152d96d3bbae67a961c21ef0355"
    );

    let decrypted = process(&ctx, &first.bytes, b"secret", &raw(Operation::Decrypt, Mode::Cbc))?;
    assert_eq!(decrypted.bytes, plaintext);
    Ok(())
}

#[test]
fn pipeline_roundtrip_all_modes_and_layouts() -> Result<(), Box<dyn Error>> {
    let ctx = context();
    let pixels: Vec<u8> = (0..301u32).map(|i| (i * 17 % 256) as u8).collect();
    let bmp = build_bitmap(10, 10, &pixels);

    for mode in [Mode::Ecb, Mode::Cbc] {
        for layout in [PayloadLayout::Bitmap, PayloadLayout::Raw] {
            let enc_opts = ProcessOptions {
                operation: Operation::Encrypt,
                mode,
                layout,
                salt: SaltPolicy::Fixed,
            };
            let dec_opts = ProcessOptions {
                operation: Operation::Decrypt,
                ..enc_opts
            };
            let enc = process(&ctx, &bmp, b"correct horse", &enc_opts)?;
            assert_ne!(enc.bytes, bmp);
            let dec = process(&ctx, &enc.bytes, b"correct horse", &dec_opts)?;
            assert_eq!(dec.bytes, bmp, "{} {}", mode, layout);
        }
    }
    Ok(())
}

#[test]
fn header_is_preserved_byte_for_byte() -> Result<(), Box<dyn Error>> {
    let ctx = context();
    let bmp = build_bitmap(8, 2, &[0xC3; 48]);
    let header = split(&bmp, PayloadLayout::Bitmap)?.header.to_vec();
    assert_eq!(header.len(), BMP_HEADER_SIZE);

    for mode in [Mode::Ecb, Mode::Cbc] {
        let opts = ProcessOptions {
            operation: Operation::Encrypt,
            mode,
            ..Default::default()
        };
        let enc = process(&ctx, &bmp, b"pw", &opts)?;
        assert_eq!(&enc.bytes[..BMP_HEADER_SIZE], header.as_slice());

        let dec = process(
            &ctx,
            &enc.bytes,
            b"pw",
            &ProcessOptions {
                operation: Operation::Decrypt,
                ..opts
            },
        )?;
        assert_eq!(&dec.bytes[..BMP_HEADER_SIZE], header.as_slice());
    }
    Ok(())
}

#[test]
fn ecb_remainder_goes_through_padded_tail() -> Result<(), Box<dyn Error>> {
    let ctx = context();
    // 7 full blocks plus 9 trailing bytes
    let body = vec![0x61u8; BLOCK_SIZE * 7 + 9];
    let enc = process(&ctx, &body, b"pw", &raw(Operation::Encrypt, Mode::Ecb))?;
    assert_eq!(enc.bytes.len(), BLOCK_SIZE * 8);
    assert_eq!(enc.report.parallel_blocks, 7);

    let dec = process(&ctx, &enc.bytes, b"pw", &raw(Operation::Decrypt, Mode::Ecb))?;
    assert_eq!(dec.bytes, body);
    Ok(())
}

#[test]
fn ecb_decrypt_rejects_misaligned_body() {
    let ctx = context();
    let result = process(&ctx, &[0u8; 40], b"pw", &raw(Operation::Decrypt, Mode::Ecb));
    assert!(matches!(
        result,
        Err(CipherError::BlockAlignment { len: 40, block_size: 16 })
    ));
}

#[test]
fn cbc_bit_flip_corrupts_block_and_next_only() {
    let keys = fixed_keys();
    let plaintext: Vec<u8> = (0..BLOCK_SIZE * 4).map(|i| i as u8).collect();
    let mut ct =
        transform(&plaintext, &keys.key, &keys.iv, Mode::Cbc, Operation::Encrypt).unwrap();
    assert_eq!(ct.len(), BLOCK_SIZE * 5);

    // Flip byte 3 of ciphertext block 1
    ct[BLOCK_SIZE + 3] ^= 0x80;
    let pt = transform(&ct, &keys.key, &keys.iv, Mode::Cbc, Operation::Decrypt).unwrap();
    let got = blocks(&pt);
    let want = blocks(&plaintext);

    assert_eq!(got[0], want[0], "earlier blocks stay intact");
    assert_ne!(got[1], want[1], "the flipped block decrypts to garbage");
    // The next block sees exactly the same bit flipped
    let mut expected_next = want[2].to_vec();
    expected_next[3] ^= 0x80;
    assert_eq!(got[2], expected_next.as_slice());
    assert_eq!(got[3], want[3], "the chain recovers after one block");
}

#[test]
fn ecb_bit_flip_stays_in_its_block() {
    let keys = fixed_keys();
    let pool = ThreadPoolBuilder::new().num_threads(3).build().unwrap();
    let plaintext: Vec<u8> = (0..BLOCK_SIZE * 6).map(|i| (i * 3) as u8).collect();
    let mut ct = run_ecb(&pool, &plaintext, &keys.key, Operation::Encrypt).unwrap().bytes;

    ct[BLOCK_SIZE * 2 + 10] ^= 0x01;
    let pt = run_ecb(&pool, &ct, &keys.key, Operation::Decrypt).unwrap().bytes;
    let got = blocks(&pt);
    let want = blocks(&plaintext);

    for i in 0..6 {
        if i == 2 {
            assert_ne!(got[i], want[i]);
        } else {
            assert_eq!(got[i], want[i], "block {} should be untouched", i);
        }
    }
}

#[test]
fn inconsistent_padding_is_rejected() {
    let keys = fixed_keys();
    // Last byte claims three bytes of padding, but the tail is 02 03 03
    let mut crafted = [0x41u8; BLOCK_SIZE * 2];
    crafted[BLOCK_SIZE * 2 - 3] = 0x02;
    crafted[BLOCK_SIZE * 2 - 2] = 0x03;
    crafted[BLOCK_SIZE * 2 - 1] = 0x03;

    let ecb = EcbBlock::new(&keys.key, Operation::Encrypt);
    for (i, block) in crafted.chunks_exact_mut(BLOCK_SIZE).enumerate() {
        ecb.process(i, block).unwrap();
    }

    let result = transform(&crafted, &keys.key, &keys.iv, Mode::Ecb, Operation::Decrypt);
    assert!(matches!(result, Err(CipherError::PaddingOrKey)));

    let pool = ThreadPoolBuilder::new().num_threads(2).build().unwrap();
    let result = run_ecb(&pool, &crafted, &keys.key, Operation::Decrypt);
    assert!(matches!(result, Err(CipherError::PaddingOrKey)));
}

#[test]
fn key_derivation_is_deterministic_and_suffix_only_moves_iv() -> Result<(), Box<dyn Error>> {
    let a = derive(b"secret", SALT, b"IV", 10_000)?;
    let b = derive(b"secret", SALT, b"IV", 10_000)?;
    let c = derive(b"secret", SALT, b"iv", 10_000)?;
    assert_eq!(a, b);
    assert_eq!(a.key, c.key);
    assert_ne!(a.iv, c.iv);
    Ok(())
}

#[test]
fn configured_salt_changes_ciphertext() -> Result<(), Box<dyn Error>> {
    let default_ctx = context();
    let other_ctx = CipherContext::new(CipherConfig {
        salt: "UltraSimpleSalt!".into(),
        ..Default::default()
    })?;
    let opts = raw(Operation::Encrypt, Mode::Cbc);
    let a = process(&default_ctx, b"payload", b"pw", &opts)?;
    let b = process(&other_ctx, b"payload", b"pw", &opts)?;
    assert_ne!(a.bytes, b.bytes);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_cipher_roundtrip(
        data in proptest::collection::vec(any::<u8>(), 0..400),
        cbc in any::<bool>(),
    ) {
        let keys = fixed_keys();
        let mode = if cbc { Mode::Cbc } else { Mode::Ecb };
        let ct = transform(&data, &keys.key, &keys.iv, mode, Operation::Encrypt).unwrap();
        prop_assert_eq!(ct.len(), (data.len() / BLOCK_SIZE + 1) * BLOCK_SIZE);
        let pt = transform(&ct, &keys.key, &keys.iv, mode, Operation::Decrypt).unwrap();
        prop_assert_eq!(pt, data);
    }

    #[test]
    fn prop_scheduler_matches_serial_ecb(
        data in proptest::collection::vec(any::<u8>(), 0..600),
        threads in 1usize..6,
    ) {
        let keys = fixed_keys();
        let pool = ThreadPoolBuilder::new().num_threads(threads).build().unwrap();
        let serial = transform(&data, &keys.key, &keys.iv, Mode::Ecb, Operation::Encrypt).unwrap();
        let parallel = run_ecb(&pool, &data, &keys.key, Operation::Encrypt).unwrap();
        prop_assert_eq!(&parallel.bytes, &serial);
        let back = run_ecb(&pool, &parallel.bytes, &keys.key, Operation::Decrypt).unwrap();
        prop_assert_eq!(back.bytes, data);
    }
}

proptest! {
    // Each case runs four PBKDF2 derivations
    #![proptest_config(ProptestConfig::with_cases(6))]

    #[test]
    fn prop_pipeline_roundtrip(
        data in proptest::collection::vec(any::<u8>(), 0..200),
        cbc in any::<bool>(),
    ) {
        let ctx = context();
        let mode = if cbc { Mode::Cbc } else { Mode::Ecb };
        let enc = process(&ctx, &data, b"prop-pass", &raw(Operation::Encrypt, mode)).unwrap();
        let dec = process(&ctx, &enc.bytes, b"prop-pass", &raw(Operation::Decrypt, mode)).unwrap();
        prop_assert_eq!(dec.bytes, data);
    }
}
