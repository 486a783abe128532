//! Append-mode writer for a download side-file.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// An open side-file. Writes are buffered in `chunk_size` pieces and always
/// land at the end of the file, so reopening after a crash continues where
/// the previous process stopped.
pub struct PartFile {
    writer: BufWriter<File>,
    path: PathBuf,
    len: u64,
}

impl PartFile {
    /// Open (or create) `path` for appending. The current length is the resume offset.
    pub fn open_append(path: &Path, chunk_size: usize) -> io::Result<Self> {
        let file = File::options().create(true).append(true).open(path)?;
        let len = file.metadata()?.len();
        Ok(PartFile {
            writer: BufWriter::with_capacity(chunk_size.max(1), file),
            path: path.to_path_buf(),
            len,
        })
    }

    /// Bytes in the side-file, including buffered but unflushed data.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.writer.write_all(data)?;
        self.len += data.len() as u64;
        Ok(())
    }

    /// Drop everything written so far. Used when the server ignores a Range request.
    pub fn restart(&mut self) -> io::Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().set_len(0)?;
        self.len = 0;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Flush buffered data and fsync the side-file.
    pub fn sync(&mut self) -> io::Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()
    }

    /// Atomically rename the side-file to `final_path`. Consumes and closes the file.
    /// Call `sync` first for durability. Fails if `final_path` is on a different filesystem.
    pub fn finalize(self, final_path: &Path) -> io::Result<()> {
        let PartFile { writer, path, .. } = self;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        drop(file);
        std::fs::rename(&path, final_path)
    }
}
