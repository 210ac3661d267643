use crate::context::CipherContext;
use crate::error::{CipherError, Result};
use crate::header::{join, split, BitmapSummary};
use crate::mode::{Mode, Operation, PayloadLayout, SaltPolicy};
use crate::pipeline::{derive_with_config, run_ecb, transform, IV_LEN};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;
use std::fmt;
use std::time::Instant;

/// Length of the random salt stored after the header with `SaltPolicy::Embedded`
pub const EMBEDDED_SALT_LEN: usize = 16;

/// Per-invocation choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessOptions {
    pub operation: Operation,
    pub mode: Mode,
    pub layout: PayloadLayout,
    pub salt: SaltPolicy,
}

/// What a single run did, for logs and `--json` output
#[derive(Debug, Clone, Serialize)]
pub struct ProcessReport {
    pub operation: Operation,
    pub mode: Mode,
    pub layout: PayloadLayout,
    pub salt: SaltPolicy,
    pub header_bytes: usize,
    pub body_in_bytes: usize,
    pub body_out_bytes: usize,
    pub parallel_blocks: usize,
    pub workers: usize,
    pub elapsed_ms: u64,
}

impl fmt::Display for ProcessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}): header {} bytes, body {} -> {} bytes",
            self.operation,
            self.mode,
            self.layout,
            self.header_bytes,
            self.body_in_bytes,
            self.body_out_bytes
        )?;
        if self.parallel_blocks > 0 {
            write!(
                f,
                ", {} blocks on {} workers",
                self.parallel_blocks, self.workers
            )?;
        }
        write!(f, " in {} ms", self.elapsed_ms)
    }
}

pub struct Processed {
    pub bytes: Vec<u8>,
    pub report: ProcessReport,
}

/// Generate a random salt using system CSPRNG
pub fn generate_salt() -> [u8; EMBEDDED_SALT_LEN] {
    let mut salt = [0u8; EMBEDDED_SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Encrypt or decrypt a payload
///
/// Split → derive → cipher (serial CBC, or ECB through the block scheduler)
/// → join. The header region is copied verbatim. Any failure aborts the run
/// and no bytes are returned.
pub fn process(
    ctx: &CipherContext,
    payload: &[u8],
    passphrase: &[u8],
    options: &ProcessOptions,
) -> Result<Processed> {
    let start = Instant::now();

    let parts = split(payload, options.layout)?;
    if options.layout == PayloadLayout::Bitmap {
        if let Ok(summary) = BitmapSummary::parse(payload) {
            if !summary.has_bm_signature() {
                log::warn!("payload does not start with a BM signature");
            }
            log::debug!("bitmap {}", summary);
        }
        if options.operation == Operation::Encrypt && parts.body.is_empty() {
            return Err(CipherError::MalformedHeader("no pixel data to encrypt".into()));
        }
    }
    log::info!(
        "header {} bytes, body {} bytes",
        parts.header.len(),
        parts.body.len()
    );

    // Salt selection. Embedded salts sit between the header and the ciphertext.
    let mut header = parts.header.to_vec();
    let (salt, body) = match (options.salt, options.operation) {
        (SaltPolicy::Fixed, _) => (ctx.config().salt.as_bytes().to_vec(), parts.body),
        (SaltPolicy::Embedded, Operation::Encrypt) => {
            let salt = generate_salt();
            header.extend_from_slice(&salt);
            (salt.to_vec(), parts.body)
        }
        (SaltPolicy::Embedded, Operation::Decrypt) => {
            if parts.body.len() < EMBEDDED_SALT_LEN {
                return Err(CipherError::MalformedHeader(format!(
                    "body of {} bytes cannot hold a {}-byte embedded salt",
                    parts.body.len(),
                    EMBEDDED_SALT_LEN
                )));
            }
            let (salt, body) = parts.body.split_at(EMBEDDED_SALT_LEN);
            (salt.to_vec(), body)
        }
    };

    let keys = derive_with_config(passphrase, &salt, ctx.config())?;
    log::debug!("derived key and IV ({} salt)", options.salt);

    let (out_body, parallel_blocks) = if options.mode.is_parallel() {
        let scheduled = run_ecb(ctx.pool(), body, &keys.key, options.operation)?;
        (scheduled.bytes, scheduled.parallel_blocks)
    } else {
        let unused_iv = [0u8; IV_LEN];
        let iv = if options.mode.uses_iv() {
            &keys.iv
        } else {
            &unused_iv
        };
        let out = transform(body, &keys.key, iv, options.mode, options.operation)?;
        (out, 0)
    };

    let report = ProcessReport {
        operation: options.operation,
        mode: options.mode,
        layout: options.layout,
        salt: options.salt,
        header_bytes: parts.header.len(),
        body_in_bytes: body.len(),
        body_out_bytes: out_body.len(),
        parallel_blocks,
        workers: ctx.worker_count(),
        elapsed_ms: start.elapsed().as_millis() as u64,
    };
    log::info!("{}", report);

    Ok(Processed {
        bytes: join(&header, &out_body),
        report,
    })
}
