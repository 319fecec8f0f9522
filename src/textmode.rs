//! Keyword-anchored recovery for text files.
//!
//! Every keyword is probed at every body position of every corpus file.
//! XORing the keyword against the ciphertext yields a candidate key
//! fragment, which is accepted only if replaying it at every other
//! 512-aligned position in the same file decrypts to allowed plaintext
//! bytes. Accepted fragments vote per key slot; the per-keyword vote
//! tables merge additively, so the result does not depend on worker
//! interleaving.

use crate::corpus::FileCorpus;
use crate::error::{RecoveryError, Result};
use crate::key::Key;
use crate::types::{RecoveryProgress, TextRecoveryConfig, HEADER_LEN, KEY_LEN};
use crate::validate::is_allowed_byte;
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tokio::sync::mpsc::Sender;

/// Flat per-slot histogram of candidate key byte values.
///
/// Index-addressed (512 slots x 256 byte values) so iteration order,
/// and therefore tie-breaking, is fully deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteTable {
    slots: Vec<[u32; 256]>,
}

impl Default for VoteTable {
    fn default() -> Self {
        Self::new()
    }
}

impl VoteTable {
    pub fn new() -> Self {
        Self {
            slots: vec![[0u32; 256]; KEY_LEN],
        }
    }

    pub fn add_vote(&mut self, slot: usize, value: u8) {
        self.slots[slot % KEY_LEN][value as usize] += 1;
    }

    pub fn votes(&self, slot: usize, value: u8) -> u32 {
        self.slots[slot % KEY_LEN][value as usize]
    }

    /// Additive merge. Commutative and associative, so the final table
    /// is independent of task completion order.
    pub fn merge(&mut self, other: &VoteTable) {
        for (mine, theirs) in self.slots.iter_mut().zip(other.slots.iter()) {
            for (m, t) in mine.iter_mut().zip(theirs.iter()) {
                *m += *t;
            }
        }
    }

    /// Highest-voted value for a slot, lowest byte value winning ties.
    /// A slot with zero votes stays unresolved.
    pub fn best(&self, slot: usize) -> Option<u8> {
        let histogram = &self.slots[slot % KEY_LEN];
        let mut winner = None;
        let mut max = 0u32;
        for (value, &count) in histogram.iter().enumerate() {
            if count > max {
                max = count;
                winner = Some(value as u8);
            }
        }
        winner
    }

    pub fn assemble(&self) -> Key {
        let mut key = Key::empty();
        for slot in 0..KEY_LEN {
            if let Some(value) = self.best(slot) {
                key.resolve(slot, value);
            }
        }
        key
    }
}

/// Run all keyword tasks on a fixed-width worker pool, merge their vote
/// tables, and assemble the key.
///
/// Any failing task aborts the whole recovery; completed tables are
/// discarded rather than merged, so a partial result can never
/// masquerade as a full one.
pub fn recover_text_key(
    corpus: &FileCorpus,
    keywords: &[&str],
    config: &TextRecoveryConfig,
) -> Result<Key> {
    recover_text_key_streaming(corpus, keywords, config, None)
}

/// [`recover_text_key`] with optional progress updates, sent from the
/// workers over a tokio channel.
pub fn recover_text_key_streaming(
    corpus: &FileCorpus,
    keywords: &[&str],
    config: &TextRecoveryConfig,
    progress: Option<Sender<RecoveryProgress>>,
) -> Result<Key> {
    if corpus.is_empty() {
        return Err(RecoveryError::EmptyCorpus {
            folder: "<in-memory corpus>".to_string(),
        });
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .build()
        .map_err(|e| RecoveryError::WorkerFailure {
            keyword: "<pool setup>".to_string(),
            reason: e.to_string(),
        })?;

    let tables: Vec<VoteTable> = pool.install(|| {
        keywords
            .par_iter()
            .map(|&keyword| {
                if let Some(ref s) = progress {
                    let _ = s.blocking_send(RecoveryProgress::KeywordStarted(keyword.to_string()));
                }

                // Isolate panics so a bad task reports as WorkerFailure
                // instead of tearing down the pool.
                let outcome = catch_unwind(AssertUnwindSafe(|| keyword_votes(corpus, keyword)));
                let (table, fragments) = match outcome {
                    Ok(result) => result?,
                    Err(_) => {
                        return Err(RecoveryError::WorkerFailure {
                            keyword: keyword.to_string(),
                            reason: "panic in keyword task".to_string(),
                        })
                    }
                };

                if let Some(ref s) = progress {
                    let _ = s.blocking_send(RecoveryProgress::KeywordFinished {
                        keyword: keyword.to_string(),
                        fragments,
                    });
                }
                Ok(table)
            })
            .collect::<Result<Vec<VoteTable>>>()
    })?;

    // Join barrier passed: every task completed. Merge and assemble.
    let mut merged = VoteTable::new();
    for table in &tables {
        merged.merge(table);
    }
    Ok(merged.assemble())
}

/// The per-keyword unit of parallel work: a pure function of
/// (corpus, keyword) to a private vote table plus the number of
/// fragments that survived validation.
fn keyword_votes(corpus: &FileCorpus, keyword: &str) -> Result<(VoteTable, usize)> {
    if keyword.is_empty() {
        return Err(RecoveryError::WorkerFailure {
            keyword: String::new(),
            reason: "empty keyword".to_string(),
        });
    }

    let kw = keyword.as_bytes();
    let mut table = VoteTable::new();
    let mut accepted = 0usize;

    for file in corpus.files() {
        let data = &file.data;
        if data.len() < HEADER_LEN + kw.len() {
            continue;
        }

        let mut fragment = vec![0u8; kw.len()];
        for i in HEADER_LEN..=(data.len() - kw.len()) {
            for (j, f) in fragment.iter_mut().enumerate() {
                *f = kw[j] ^ data[i + j];
            }

            if validate_fragment(&fragment, data, i) {
                for (j, &f) in fragment.iter().enumerate() {
                    table.add_vote((i + j) % KEY_LEN, f);
                }
                accepted += 1;
            }
        }
    }

    Ok((table, accepted))
}

/// Replay `fragment` at every other 512-aligned body position of the
/// same file and require every decrypted byte to be allowed plaintext.
/// Rejects on the first failing block.
fn validate_fragment(fragment: &[u8], data: &[u8], origin: usize) -> bool {
    let offset = origin % KEY_LEN;
    let mut pos = offset + HEADER_LEN;
    while pos + fragment.len() <= data.len() {
        if pos != origin {
            let ok = fragment
                .iter()
                .zip(&data[pos..pos + fragment.len()])
                .all(|(&f, &c)| is_allowed_byte(f ^ c));
            if !ok {
                return false;
            }
        }
        pos += KEY_LEN;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_key() -> Key {
        let mut bytes = [0u8; KEY_LEN];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = (i % 256) as u8;
        }
        Key::from_bytes(&bytes)
    }

    /// Plaintext whose blocks all start with `keyword` and are padded
    /// with bytes that can never decrypt as allowed plaintext when a
    /// fragment from an even block is replayed against an odd block:
    /// filler is 0x00 in even blocks and 0x80 in odd ones, so any
    /// fragment touching filler fails validation across the parity
    /// boundary. Only fragments exactly on the keyword survive.
    fn anchored_plaintext(keyword: &[u8], blocks: usize) -> Vec<u8> {
        let mut plain = Vec::with_capacity(blocks * KEY_LEN);
        for b in 0..blocks {
            let filler = if b % 2 == 0 { 0x00 } else { 0x80 };
            plain.extend_from_slice(keyword);
            plain.extend(std::iter::repeat(filler).take(KEY_LEN - keyword.len()));
        }
        plain
    }

    fn encrypted_corpus(keyword: &[u8], blocks: usize) -> FileCorpus {
        let key = counting_key();
        let body = anchored_plaintext(keyword, blocks);
        // Header block contents never produce candidates; zeros will do.
        let mut file = vec![0u8; HEADER_LEN];
        file.extend(key.xor_cycle(&body, 0));
        FileCorpus::from_buffers(vec![("synthetic".to_string(), file)])
    }

    #[test]
    fn test_recovers_keyword_anchored_slots() {
        let keyword = "#include ";
        let corpus = encrypted_corpus(keyword.as_bytes(), 4);
        let config = TextRecoveryConfig::new(2);

        let found = recover_text_key(&corpus, &[keyword], &config).unwrap();
        let key = counting_key();

        assert_eq!(found.resolved_count(), keyword.len());
        for slot in 0..keyword.len() {
            assert_eq!(found.get(slot), key.get(slot), "slot {}", slot);
        }
        assert_eq!(found.get(keyword.len()), None);
    }

    #[test]
    fn test_no_occurrences_yields_unresolved_key() {
        // Alternating-parity filler with no keyword anywhere: every
        // candidate fragment hits the 0x00/0x80 wall during validation.
        let key = counting_key();
        let mut body = Vec::new();
        for b in 0..4 {
            let filler = if b % 2 == 0 { 0x00 } else { 0x80 };
            body.extend(std::iter::repeat(filler).take(KEY_LEN));
        }
        let mut file = vec![0u8; HEADER_LEN];
        file.extend(key.xor_cycle(&body, 0));
        let corpus = FileCorpus::from_buffers(vec![("empty".to_string(), file)]);

        let found =
            recover_text_key(&corpus, &["return "], &TextRecoveryConfig::default()).unwrap();
        assert_eq!(found.resolved_count(), 0);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let keywords = ["#include ", "return ", "struct"];
        let corpus = encrypted_corpus(b"#include ", 4);

        let mut forward = VoteTable::new();
        for kw in keywords {
            let (table, _) = keyword_votes(&corpus, kw).unwrap();
            forward.merge(&table);
        }

        let mut reverse = VoteTable::new();
        for kw in keywords.iter().rev() {
            let (table, _) = keyword_votes(&corpus, kw).unwrap();
            reverse.merge(&table);
        }

        assert_eq!(forward, reverse);
        assert_eq!(forward.assemble(), reverse.assemble());
    }

    #[test]
    fn test_tie_breaks_to_lowest_value() {
        let mut table = VoteTable::new();
        table.add_vote(9, 0x41);
        table.add_vote(9, 0x30);
        table.add_vote(9, 0x7A);
        assert_eq!(table.best(9), Some(0x30));
        assert_eq!(table.best(10), None);
    }

    #[test]
    fn test_empty_corpus_is_an_error() {
        let corpus = FileCorpus::from_buffers(Vec::new());
        assert!(matches!(
            recover_text_key(&corpus, &["return "], &TextRecoveryConfig::default()),
            Err(RecoveryError::EmptyCorpus { .. })
        ));
    }

    #[test]
    fn test_worker_failure_aborts_recovery() {
        let corpus = encrypted_corpus(b"#include ", 4);
        let result = recover_text_key(
            &corpus,
            &["#include ", ""],
            &TextRecoveryConfig::default(),
        );
        assert!(matches!(
            result,
            Err(RecoveryError::WorkerFailure { .. })
        ));
    }

    #[test]
    fn test_progress_events_are_emitted() {
        let corpus = encrypted_corpus(b"#include ", 4);
        let (tx, mut rx) = tokio::sync::mpsc::channel(64);

        let found = recover_text_key_streaming(
            &corpus,
            &["#include "],
            &TextRecoveryConfig::new(1),
            Some(tx),
        )
        .unwrap();
        assert!(found.resolved_count() > 0);

        let mut started = 0;
        let mut finished = 0;
        while let Ok(event) = rx.try_recv() {
            match event {
                RecoveryProgress::KeywordStarted(_) => started += 1,
                RecoveryProgress::KeywordFinished { fragments, .. } => {
                    assert!(fragments > 0);
                    finished += 1;
                }
            }
        }
        assert_eq!(started, 1);
        assert_eq!(finished, 1);
    }
}
