//! Ciphertext-only recovery for binary files.
//!
//! Two 512-byte-aligned blocks that share a long ciphertext run at the
//! same intra-block offset almost certainly encrypt identical plaintext
//! there, so the shared run is direct evidence for that key segment.
//! Repeats are found per offset by sorting block suffixes and scanning
//! adjacent pairs for long common prefixes, which keeps the work at
//! O(n log n) comparisons per offset instead of comparing all block
//! pairs.

use crate::key::Key;
use crate::search::{common_prefix_len, contains_pattern};
use crate::types::{HEADER_LEN, KEY_LEN, MIN_LCP};
use std::collections::BTreeMap;

/// Accumulated structural evidence: per intra-block offset, candidate
/// key runs with vote counts.
///
/// The table is subsumption-pruned on insert so it only ever holds
/// maximal fragments: a fragment contained in longer stored evidence is
/// dropped, and inserting a fragment evicts everything it strictly
/// contains. BTreeMap keeps iteration deterministic for reproducible
/// assembly.
#[derive(Debug)]
pub struct PrefixTable {
    slots: Vec<BTreeMap<Vec<u8>, u32>>,
}

impl Default for PrefixTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PrefixTable {
    pub fn new() -> Self {
        Self {
            slots: vec![BTreeMap::new(); KEY_LEN],
        }
    }

    /// Record a candidate fragment observed at `offset`.
    pub fn insert(&mut self, offset: usize, fragment: &[u8]) {
        debug_assert!(offset + fragment.len() <= KEY_LEN);

        // The same run seen again at the same offset is another vote,
        // not redundant evidence.
        if let Some(count) = self.slots[offset].get_mut(fragment) {
            *count += 1;
            return;
        }

        for slot in &self.slots {
            for stored in slot.keys() {
                if contains_pattern(stored, fragment) {
                    return;
                }
            }
        }

        for slot in &mut self.slots {
            slot.retain(|stored, _| {
                !(stored.len() < fragment.len() && contains_pattern(fragment, stored))
            });
        }
        self.slots[offset].insert(fragment.to_vec(), 1);
    }

    pub fn fragment_count(&self) -> usize {
        self.slots.iter().map(|s| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.fragment_count() == 0
    }

    /// Write all surviving fragments into a key. Fragments are applied
    /// in ascending (length, offset, bytes) order with last-write-wins,
    /// so longer evidence always lands on top of shorter evidence and
    /// equal-length conflicts resolve deterministically.
    pub fn assemble(&self) -> Key {
        let mut fragments: Vec<(usize, usize, &[u8])> = Vec::new();
        for (offset, slot) in self.slots.iter().enumerate() {
            for fragment in slot.keys() {
                fragments.push((fragment.len(), offset, fragment));
            }
        }
        fragments.sort_unstable();

        let mut key = Key::empty();
        for (_, offset, fragment) in fragments {
            for (j, &b) in fragment.iter().enumerate() {
                key.resolve(offset + j, b);
            }
        }
        key
    }
}

/// Recover key bytes from a single ciphertext file by structural
/// redundancy alone. Unresolved slots are a normal outcome when the
/// file simply has no repeated plaintext at that offset.
pub fn find_binary_key(ciphertext: &[u8]) -> Key {
    let body = if ciphertext.len() > HEADER_LEN {
        &ciphertext[HEADER_LEN..]
    } else {
        &[][..]
    };

    // A trailing partial block cannot pair up at every offset, drop it.
    let blocks: Vec<&[u8]> = body.chunks_exact(KEY_LEN).collect();

    let mut table = PrefixTable::new();
    if blocks.len() >= 2 {
        for offset in 0..KEY_LEN {
            let mut suffixes: Vec<&[u8]> = blocks.iter().map(|b| &b[offset..]).collect();
            suffixes.sort_unstable();

            for pair in suffixes.windows(2) {
                let lcp = common_prefix_len(pair[0], pair[1]);
                if lcp > MIN_LCP {
                    table.insert(offset, &pair[0][..lcp]);
                }
            }
        }
    }

    table.assemble()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Ciphertext with a header block and `fills.len()` body blocks,
    /// each filled with a constant byte.
    fn constant_blocks(fills: &[u8]) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_LEN];
        for &fill in fills {
            data.extend(std::iter::repeat(fill).take(KEY_LEN));
        }
        data
    }

    #[test]
    fn test_no_structure_yields_unresolved_key() {
        let cipher = constant_blocks(&[0x11, 0x22, 0x33, 0x44]);
        let key = find_binary_key(&cipher);
        assert_eq!(key.resolved_count(), 0);
    }

    #[test]
    fn test_too_little_data_yields_unresolved_key() {
        assert_eq!(find_binary_key(&[]).resolved_count(), 0);
        assert_eq!(find_binary_key(&vec![7u8; HEADER_LEN + 100]).resolved_count(), 0);
        // One full block has no partner to repeat against.
        assert_eq!(
            find_binary_key(&constant_blocks(&[0x11])).resolved_count(),
            0
        );
    }

    #[test]
    fn test_injected_repeat_recovers_exact_span() {
        let run = b"SHARED-RUN-012345678"; // 20 bytes
        assert_eq!(run.len(), 20);
        let offset = 100;

        let mut cipher = constant_blocks(&[0x11, 0x22, 0x33, 0x44]);
        for block in [0, 2] {
            let at = HEADER_LEN + block * KEY_LEN + offset;
            cipher[at..at + run.len()].copy_from_slice(run);
        }

        let key = find_binary_key(&cipher);
        assert_eq!(key.resolved_count(), run.len());
        for (j, &b) in run.iter().enumerate() {
            assert_eq!(key.get(offset + j), Some(b));
        }
        assert_eq!(key.get(offset - 1), None);
        assert_eq!(key.get(offset + run.len()), None);
    }

    #[test]
    fn test_repeat_in_partial_final_block_is_ignored() {
        let run = b"SHARED-RUN-012345678";
        let offset = 10;

        let mut cipher = constant_blocks(&[0x11, 0x22]);
        // Partial third block carrying one copy of the run.
        cipher.extend(std::iter::repeat(0x55).take(200));

        let first = HEADER_LEN + offset;
        let partial = HEADER_LEN + 2 * KEY_LEN + offset;
        cipher[first..first + run.len()].copy_from_slice(run);
        cipher[partial..partial + run.len()].copy_from_slice(run);

        assert_eq!(find_binary_key(&cipher).resolved_count(), 0);
    }

    #[test]
    fn test_subsumption_pruning() {
        let mut table = PrefixTable::new();
        table.insert(40, b"the longer stored evidence run");
        // Contained in the stored run: rejected, at any offset.
        table.insert(44, b"longer stored evidence");
        assert_eq!(table.fragment_count(), 1);

        // A strictly containing run evicts the stored one.
        table.insert(38, b"xed toothe longer stored evidence run and more");
        assert_eq!(table.fragment_count(), 1);

        // Re-seeing an identical run at the same offset only bumps its vote.
        table.insert(38, b"x ed tothe longer stored evidence run and more");
        table.insert(38, b"x ed tothe longer stored evidence run and more");
        assert_eq!(table.fragment_count(), 2);
    }

    #[test]
    fn test_assembly_longest_wins_on_overlap() {
        let mut table = PrefixTable::new();
        table.insert(10, b"aaaaaaaaaaaaaaaaaaaa"); // 20 bytes at [10, 30)
        table.insert(5, b"bbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"); // 30 bytes at [5, 35)
        let key = table.assemble();

        // The longer fragment owns the whole overlap.
        for slot in 5..35 {
            assert_eq!(key.get(slot), Some(b'b'), "slot {}", slot);
        }
        assert_eq!(key.get(4), None);
        assert_eq!(key.get(35), None);
    }

    #[test]
    fn test_assembly_equal_length_tie_is_deterministic() {
        let mut a = PrefixTable::new();
        a.insert(20, b"aaaaaaaaaaaaaaaaaaaa");
        a.insert(20, b"cccccccccccccccccccc");
        let mut b = PrefixTable::new();
        b.insert(20, b"cccccccccccccccccccc");
        b.insert(20, b"aaaaaaaaaaaaaaaaaaaa");
        assert_eq!(a.assemble(), b.assemble());
    }
}
