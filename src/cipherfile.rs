use crate::error::{RecoveryError, Result};
use crate::types::HEADER_LEN;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Zero-copy memory-mapped view of one encrypted file.
///
/// Recovery only ever reads, so the map is shared and immutable.
#[derive(Clone)]
pub struct CipherFile {
    mmap: Arc<Mmap>,
    path: String,
}

impl CipherFile {
    /// Open and memory-map an encrypted file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let path_str = path_ref.display().to_string();

        let file = File::open(path_ref)?;
        let mmap = unsafe {
            Mmap::map(&file)
                .map_err(|e| RecoveryError::Mmap(format!("{}: {}", path_str, e)))?
        };

        Ok(Self {
            mmap: Arc::new(mmap),
            path: path_str,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.len() == 0
    }

    /// The complete file contents, header block included.
    pub fn bytes(&self) -> &[u8] {
        &self.mmap[..]
    }

    /// The encrypted body: everything after the 512-byte header block.
    /// Fails if the file is too short to contain a header at all.
    pub fn body(&self) -> Result<&[u8]> {
        if self.mmap.len() < HEADER_LEN {
            return Err(RecoveryError::Container {
                file: self.path.clone(),
                reason: format!(
                    "file is {} bytes, shorter than the {}-byte header block",
                    self.mmap.len(),
                    HEADER_LEN
                ),
            });
        }
        Ok(&self.mmap[HEADER_LEN..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, data: &[u8]) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join("xor_recovery_cipherfile_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(data).unwrap();
        path
    }

    #[test]
    fn test_open_and_body() {
        let mut data = vec![0u8; HEADER_LEN];
        data.extend_from_slice(b"body bytes");
        let path = write_temp("with_body.bin", &data);

        let cf = CipherFile::open(&path).unwrap();
        assert_eq!(cf.len(), data.len());
        assert_eq!(cf.body().unwrap(), b"body bytes");
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_short_file_has_no_body() {
        let path = write_temp("short.bin", b"only a few bytes");
        let cf = CipherFile::open(&path).unwrap();
        assert!(matches!(
            cf.body(),
            Err(RecoveryError::Container { .. })
        ));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file() {
        let result = CipherFile::open("/nonexistent/path/file.bin");
        assert!(matches!(result, Err(RecoveryError::Io(_))));
    }
}
