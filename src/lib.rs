//! Key recovery suite for a weak file-obfuscation format built on a
//! 512-byte repeating XOR key.
//!
//! Three independent strategies share one data model (a partially-known
//! 512-slot key) and one validation primitive (byte printability):
//! - Exact known-plaintext attack via alignment search (`alignment`)
//! - Ciphertext-only structural redundancy recovery (`structural`)
//! - Parallel keyword-anchored statistical recovery (`textmode`)
//!
//! The container format, its header codec, key storage and the batch
//! encrypt/decrypt paths live alongside as thin glue (`container`,
//! `codec`, `key`).

pub mod alignment;
pub mod cipherfile;
pub mod cli;
pub mod codec;
pub mod container;
pub mod corpus;
pub mod error;
pub mod key;
pub mod keywords;
pub mod search;
pub mod structural;
pub mod textmode;
pub mod types;
pub mod validate;

// Re-export commonly used types
pub use cipherfile::CipherFile;
pub use corpus::{CorpusFile, FileCorpus};
pub use error::{RecoveryError, Result};
pub use key::Key;
pub use keywords::Language;
pub use structural::{find_binary_key, PrefixTable};
pub use textmode::{recover_text_key, recover_text_key_streaming, VoteTable};
pub use types::{RecoveryProgress, TextRecoveryConfig, HEADER_LEN, KEY_LEN};
pub use validate::{is_allowed_byte, is_allowed_slice};
