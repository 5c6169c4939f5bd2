pub mod asm_writer;

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::CompileError;

pub use asm_writer::AsmWriter;

/// Writes the finished program to `path`.
/// The text goes to a uniquely named temporary file in the same directory
/// and is persisted over `path` once complete, so a failed write never
/// leaves a truncated artifact behind.
pub fn write_output(path: &Path, text: &str) -> Result<(), CompileError> {
    let io_err = |source: io::Error| CompileError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    // Dropping the temporary file on an early return deletes it
    let mut file = NamedTempFile::new_in(dir).map_err(io_err)?;
    file.write_all(text.as_bytes()).map_err(io_err)?;
    file.as_file().sync_all().map_err(io_err)?;
    file.persist(path).map_err(|err| io_err(err.error))?;

    debug!(path = %path.display(), bytes = text.len(), "wrote assembly");
    Ok(())
}

pub fn emit(text: &str, mut writer: impl Write) -> io::Result<()> {
    writer.write_all(text.as_bytes())?;
    writer.flush()
}
