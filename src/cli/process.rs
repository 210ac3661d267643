use crate::context::CipherContext;
use crate::error::{CipherError, Result};
use crate::transform::{process, ProcessOptions, ProcessReport};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use zeroize::Zeroizing;

/// Options for a file-to-file run
#[derive(Clone, Default)]
pub struct FileOptions {
    /// Opaque passphrase bytes, not necessarily UTF-8
    pub passphrase: Zeroizing<Vec<u8>>,
    pub process: ProcessOptions,
}

impl std::fmt::Debug for FileOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileOptions")
            .field("passphrase", &"..")
            .field("process", &self.process)
            .finish()
    }
}

/// Read `input_path`, transform it and write the result to `output_path`
///
/// The output is staged in a temporary file next to the destination and only
/// moved into place once everything succeeded, so a failed run leaves the
/// destination untouched.
pub fn process_file(
    ctx: &CipherContext,
    input_path: &Path,
    output_path: &Path,
    options: &FileOptions,
) -> Result<ProcessReport> {
    let input_data = std::fs::read(input_path).map_err(|source| CipherError::InputIo {
        path: input_path.to_path_buf(),
        source,
    })?;

    let processed = process(ctx, &input_data, &options.passphrase, &options.process)?;

    write_output(output_path, &processed.bytes)?;
    Ok(processed.report)
}

fn write_output(path: &Path, data: &[u8]) -> Result<()> {
    let output_err = |source: std::io::Error| CipherError::OutputIo {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir).map_err(output_err)?;
    staged.write_all(data).map_err(output_err)?;
    staged.as_file().sync_all().map_err(output_err)?;
    staged.persist(path).map_err(|e| output_err(e.error))?;
    Ok(())
}
