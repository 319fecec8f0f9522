/// Length of the repeating XOR key, in bytes.
pub const KEY_LEN: usize = 512;

/// Length of the container header block. The first `HEADER_LEN` bytes of
/// every file hold the compressed header and are excluded from body
/// analysis.
pub const HEADER_LEN: usize = 512;

/// Minimum amount of known plaintext the exact attack needs: one header
/// block, one key-derivation window, one witness window.
pub const MIN_PLAINTEXT_LEN: usize = 3 * KEY_LEN;

/// Minimum common-prefix length for two block suffixes to count as
/// structural evidence. Shorter coincidences are too likely on random
/// ciphertext.
pub const MIN_LCP: usize = 16;

/// Configuration for keyword-anchored text recovery.
#[derive(Debug, Clone)]
pub struct TextRecoveryConfig {
    /// Number of worker threads for per-keyword tasks.
    pub workers: usize,
}

impl Default for TextRecoveryConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

impl TextRecoveryConfig {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }
}

/// Progress update sent over the optional channel during text recovery.
#[derive(Debug, Clone)]
pub enum RecoveryProgress {
    /// A keyword task has been picked up by a worker.
    KeywordStarted(String),
    /// A keyword task finished; carries the number of validated fragments
    /// that cast votes.
    KeywordFinished { keyword: String, fragments: usize },
}
