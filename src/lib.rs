//! bmpcipher - passphrase-keyed AES-256 for bitmaps and raw payloads
//!
//! Encrypts or decrypts a payload with AES-256 in ECB or CBC mode, keyed by
//! PBKDF2-HMAC-SHA256 from a passphrase. For bitmap files the header (up to
//! the pixel data offset) is copied verbatim so the output is still a
//! viewable image.
//!
//! ## Transform Pipeline
//!
//! ```text
//! Input → Split → Derive → Cipher → Join → Output
//!                            │
//!                            ├─ CBC: one serial pass over the body
//!                            └─ ECB: block scheduler on the worker pool
//! ```
//!
//! - **Split**: header region / body region (`header`)
//! - **Derive**: key and IV from passphrase + salt (`pipeline::kdf`)
//! - **Cipher**: AES-256 with PKCS#7 padding (`pipeline::cipher`)
//! - **Schedule**: parallel independent blocks for ECB (`pipeline::schedule`)
//! - **Join**: header bytes followed by the transformed body
//!
//! No integrity protection is provided: neither mode detects tampering
//! beyond incidental padding failures.
//!
//! ## Example
//!
//! ```no_run
//! use bmpcipher::{process, CipherConfig, CipherContext, Mode, Operation, ProcessOptions};
//!
//! let ctx = CipherContext::new(CipherConfig::default()).unwrap();
//! let image = std::fs::read("picture.bmp").unwrap();
//! let options = ProcessOptions {
//!     operation: Operation::Encrypt,
//!     mode: Mode::Cbc,
//!     ..Default::default()
//! };
//! let encrypted = process(&ctx, &image, b"passphrase", &options).unwrap();
//! std::fs::write("picture.enc.bmp", &encrypted.bytes).unwrap();
//! ```

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod header;
pub mod mode;
pub mod pipeline;
pub mod transform;

pub use config::CipherConfig;
pub use context::CipherContext;
pub use error::{CipherError, Result};
pub use mode::{Mode, Operation, PayloadLayout, SaltPolicy};
pub use transform::{process, ProcessOptions, ProcessReport, Processed};
