use crate::error::{RecoveryError, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// One loaded ciphertext file.
#[derive(Debug, Clone)]
pub struct CorpusFile {
    pub name: String,
    pub data: Vec<u8>,
}

/// An in-memory collection of ciphertext files, scoped to one recovery
/// invocation.
///
/// Loading happens fully up front; any I/O failure aborts before
/// computation starts, and the loaded data is read-only afterwards so
/// the parallel phase needs no locking.
#[derive(Debug, Clone, Default)]
pub struct FileCorpus {
    files: Vec<CorpusFile>,
}

impl FileCorpus {
    /// Recursively load every regular file under `folder`. Files are
    /// loaded in path order so corpus contents are reproducible.
    pub fn load_folder<P: AsRef<Path>>(folder: P) -> Result<Self> {
        let folder_str = folder.as_ref().display().to_string();
        let mut files = Vec::new();

        for entry in WalkDir::new(folder.as_ref()).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let io = e
                    .into_io_error()
                    .unwrap_or_else(|| {
                        std::io::Error::new(std::io::ErrorKind::Other, "walkdir loop detected")
                    });
                RecoveryError::Io(io)
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let data = fs::read(entry.path())?;
            files.push(CorpusFile {
                name: entry.path().display().to_string(),
                data,
            });
        }

        if files.is_empty() {
            return Err(RecoveryError::EmptyCorpus { folder: folder_str });
        }

        Ok(Self { files })
    }

    /// Build a corpus from in-memory buffers. Used by tests and by
    /// callers that already hold the ciphertexts.
    pub fn from_buffers(buffers: Vec<(String, Vec<u8>)>) -> Self {
        let files = buffers
            .into_iter()
            .map(|(name, data)| CorpusFile { name, data })
            .collect();
        Self { files }
    }

    pub fn files(&self) -> &[CorpusFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(|f| f.data.len()).sum()
    }
}
