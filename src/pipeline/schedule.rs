//! Parallel independent-block processing.
//!
//! Whole 16-byte blocks are processed in place on the context's worker pool;
//! each worker owns a disjoint output slot, so block `i` of the output always
//! comes from block `i` of the input regardless of completion order. A shared
//! atomic flag stops remaining blocks once any worker fails.
//!
//! Remainder policy for ECB bodies (padded tail):
//! - encrypt: full blocks in parallel without padding, the trailing
//!   `len % 16` bytes (possibly none) through one padded pass, appended.
//!   The result equals a whole-body ECB/PKCS#7 encryption.
//! - decrypt: body must be a positive multiple of 16. All blocks but the last
//!   in parallel, the last through a padded pass that validates and strips
//!   the padding.

use crate::error::{CipherError, Result};
use crate::mode::{Mode, Operation};
use crate::pipeline::cipher::{check_alignment, transform, EcbBlock, BLOCK_SIZE};
use crate::pipeline::kdf::{Key, IV_LEN};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Transforms exactly one block in place
pub trait BlockProcessor: Sync {
    fn process(&self, index: usize, block: &mut [u8]) -> Result<()>;
}

/// Output of an ECB run through the scheduler
#[derive(Debug, Clone)]
pub struct Scheduled {
    pub bytes: Vec<u8>,
    /// Blocks handed to the worker pool
    pub parallel_blocks: usize,
    /// Input bytes that went through the padded fallback pass
    pub tail_bytes: usize,
}

/// Run `processor` over every full block of `body` on `pool`
///
/// Returns `floor(len / 16) * 16` bytes; trailing partial bytes are not
/// touched and must be handled by the caller. On failure nothing is returned
/// but an aggregate `BlockFailure` naming the lowest failing block index.
pub fn process_blocks<P: BlockProcessor>(
    pool: &ThreadPool,
    body: &[u8],
    processor: &P,
) -> Result<Vec<u8>> {
    let full_blocks = body.len() / BLOCK_SIZE;
    let mut out = body[..full_blocks * BLOCK_SIZE].to_vec();

    let failed = AtomicBool::new(false);
    let failures = AtomicUsize::new(0);
    let first_failure: Mutex<Option<(usize, String)>> = Mutex::new(None);

    pool.install(|| {
        out.par_chunks_exact_mut(BLOCK_SIZE)
            .enumerate()
            .for_each(|(index, block)| {
                if failed.load(Ordering::Acquire) {
                    return;
                }
                if let Err(e) = processor.process(index, block) {
                    failed.store(true, Ordering::Release);
                    failures.fetch_add(1, Ordering::AcqRel);
                    let reason = match e {
                        CipherError::BlockFailure { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    let mut slot = first_failure.lock().unwrap_or_else(PoisonError::into_inner);
                    if slot.as_ref().map_or(true, |(i, _)| index < *i) {
                        *slot = Some((index, reason));
                    }
                }
            });
    });

    let first = first_failure
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some((index, reason)) = first {
        let failed_count = failures.load(Ordering::Acquire);
        log::warn!("{} block(s) failed, first at index {}", failed_count, index);
        return Err(CipherError::BlockFailure {
            index,
            failed: failed_count,
            reason,
        });
    }

    log::debug!(
        "processed {} block(s) on {} worker(s)",
        full_blocks,
        pool.current_num_threads()
    );
    Ok(out)
}

/// ECB over a whole body using the padded-tail remainder policy
pub fn run_ecb(
    pool: &ThreadPool,
    body: &[u8],
    key: &Key,
    operation: Operation,
) -> Result<Scheduled> {
    let processor = EcbBlock::new(key, operation);
    let unused_iv = [0u8; IV_LEN];

    match operation {
        Operation::Encrypt => {
            let full = body.len() - body.len() % BLOCK_SIZE;
            let (head, tail) = body.split_at(full);
            if !tail.is_empty() {
                log::info!(
                    "padding {} trailing byte(s) past the last full block in a serial pass",
                    tail.len()
                );
            }

            let mut bytes = process_blocks(pool, head, &processor)?;
            let padded_tail = transform(tail, key, &unused_iv, Mode::Ecb, Operation::Encrypt)?;
            bytes.extend_from_slice(&padded_tail);

            Ok(Scheduled {
                bytes,
                parallel_blocks: head.len() / BLOCK_SIZE,
                tail_bytes: tail.len(),
            })
        }
        Operation::Decrypt => {
            check_alignment(body.len())?;
            let (head, last) = body.split_at(body.len() - BLOCK_SIZE);

            let mut bytes = process_blocks(pool, head, &processor)?;
            let plain_tail = transform(last, key, &unused_iv, Mode::Ecb, Operation::Decrypt)?;
            bytes.extend_from_slice(&plain_tail);

            Ok(Scheduled {
                bytes,
                parallel_blocks: head.len() / BLOCK_SIZE,
                tail_bytes: last.len(),
            })
        }
    }
}
