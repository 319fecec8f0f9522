use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// XOR key recovery suite for the 512-byte repeating-key container
/// format: encrypt/decrypt with a known key, or recover an unknown key
/// from plaintext pairs, structural redundancy, or keyword statistics.
#[derive(Parser, Debug)]
#[command(name = "xor-recovery")]
#[command(version = "0.1.0")]
#[command(about = "512-byte repeating-XOR key recovery suite", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a random 512-byte key
    Keygen {
        /// Key file to write
        #[arg(short = 'o', long = "out", value_name = "KEYFILE")]
        out: PathBuf,
    },

    /// Encrypt a single file
    Encrypt {
        /// Plaintext input file
        #[arg(long = "in", value_name = "FILE")]
        input: PathBuf,
        /// Key file
        #[arg(long, value_name = "KEYFILE")]
        key: PathBuf,
        /// Encrypted output file
        #[arg(short = 'o', long = "out", value_name = "FILE")]
        out: PathBuf,
    },

    /// Decrypt a single file
    Decrypt {
        /// Encrypted input file
        #[arg(long = "in", value_name = "FILE")]
        input: PathBuf,
        /// Key file
        #[arg(long, value_name = "KEYFILE")]
        key: PathBuf,
        /// Plaintext output file
        #[arg(short = 'o', long = "out", value_name = "FILE")]
        out: PathBuf,
    },

    /// Encrypt every file under a folder into a mirrored tree
    EncryptFolder {
        /// Source folder
        #[arg(long = "in", value_name = "FOLDER")]
        input: PathBuf,
        /// Key file
        #[arg(long, value_name = "KEYFILE")]
        key: PathBuf,
        /// Destination folder
        #[arg(short = 'o', long = "out", value_name = "FOLDER")]
        out: PathBuf,
    },

    /// Decrypt every file under a folder into a mirrored tree
    DecryptFolder {
        /// Source folder
        #[arg(long = "in", value_name = "FOLDER")]
        input: PathBuf,
        /// Key file
        #[arg(long, value_name = "KEYFILE")]
        key: PathBuf,
        /// Destination folder
        #[arg(short = 'o', long = "out", value_name = "FOLDER")]
        out: PathBuf,
    },

    /// Exact known-plaintext attack against one encrypted file
    FindKey {
        /// Encrypted input file
        #[arg(long = "in", value_name = "FILE")]
        input: PathBuf,
        /// Matching plaintext file (at least 1536 bytes)
        #[arg(long = "plain", value_name = "FILE")]
        plain: PathBuf,
        /// Key file to write
        #[arg(short = 'o', long = "out", value_name = "KEYFILE")]
        out: PathBuf,
    },

    /// Ciphertext-only structural attack against one binary file
    PatternBinary {
        /// Encrypted input file
        #[arg(long = "in", value_name = "FILE")]
        input: PathBuf,
        /// Key file to write
        #[arg(short = 'o', long = "out", value_name = "KEYFILE")]
        out: PathBuf,
    },

    /// Keyword-anchored statistical attack against a folder of
    /// same-language text files
    PatternText {
        /// Folder of encrypted files
        #[arg(long = "in", value_name = "FOLDER")]
        input: PathBuf,
        /// Source language of the plaintexts (C, PHP or CS)
        #[arg(long, value_name = "LANG")]
        language: String,
        /// Key file to write
        #[arg(short = 'o', long = "out", value_name = "KEYFILE")]
        out: PathBuf,
        /// Worker pool width for keyword tasks
        #[arg(long, default_value_t = 4)]
        workers: usize,
    },
}
