//! Exact known-plaintext attack.
//!
//! Given a ciphertext and the matching plaintext, slide the plaintext's
//! key-derivation window across the ciphertext until a second,
//! independent plaintext window confirms the alignment, then read the
//! key off directly.

use crate::error::{RecoveryError, Result};
use crate::key::Key;
use crate::search::contains_pattern;
use crate::types::{KEY_LEN, MIN_PLAINTEXT_LEN};

/// Recover the full key from a matched plaintext/ciphertext pair.
///
/// The plaintext must be at least 1536 bytes: the first 512 bytes are
/// unusable (they are compressed inside the container header), the
/// second 512 derive the candidate key, and the third 512 act as the
/// independent witness window. The first ciphertext offset whose
/// candidate key makes the witness appear in the decrypted remainder
/// wins.
pub fn find_key(ciphertext: &[u8], known_plaintext: &[u8]) -> Result<Key> {
    if known_plaintext.len() < MIN_PLAINTEXT_LEN {
        return Err(RecoveryError::InsufficientPlaintext {
            len: known_plaintext.len(),
            required: MIN_PLAINTEXT_LEN,
        });
    }

    let anchor = &known_plaintext[KEY_LEN..2 * KEY_LEN];
    let witness = &known_plaintext[2 * KEY_LEN..3 * KEY_LEN];

    let mut offsets_tried = 0;
    let mut start = 0;
    while start + KEY_LEN <= ciphertext.len() {
        offsets_tried += 1;

        let mut candidate = [0u8; KEY_LEN];
        for (j, slot) in candidate.iter_mut().enumerate() {
            *slot = anchor[j] ^ ciphertext[start + j];
        }

        let decrypted: Vec<u8> = ciphertext[start + KEY_LEN..]
            .iter()
            .enumerate()
            .map(|(t, &b)| b ^ candidate[t % KEY_LEN])
            .collect();

        if contains_pattern(&decrypted, witness) {
            // The cipher always applies the key from slot 0 at the start
            // of the file, so rotate the candidate back to that frame.
            return Ok(Key::from_bytes(&candidate).normalized(start));
        }

        start += 1;
    }

    Err(RecoveryError::KeyNotFound { offsets_tried })
}
