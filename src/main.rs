use anyhow::Context;
use clap::Parser;
use sha2::{Digest, Sha256};
use std::path::Path;

use xor_recovery::cli::{Args, Command};
use xor_recovery::codec::DeflateCodec;
use xor_recovery::{
    alignment, container, textmode, CipherFile, FileCorpus, Key, Language, RecoveryProgress,
    TextRecoveryConfig,
};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    let codec = DeflateCodec;

    match args.command {
        Command::Keygen { out } => {
            let key = Key::random();
            write_key(&key, &out)?;
        }

        Command::Encrypt { input, key, out } => {
            let key = Key::load(&key).context("loading key")?;
            let plain = std::fs::read(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let cipher =
                container::encrypt_file(&input.display().to_string(), &plain, &key, &codec)?;
            std::fs::write(&out, &cipher)
                .with_context(|| format!("writing {}", out.display()))?;
            println!("Encryption: {} bytes written to {}", cipher.len(), out.display());
        }

        Command::Decrypt { input, key, out } => {
            let key = Key::load(&key).context("loading key")?;
            let cipher = CipherFile::open(&input)?;
            let plain =
                container::decrypt_file(cipher.path(), cipher.bytes(), &key, &codec)?;
            std::fs::write(&out, &plain)
                .with_context(|| format!("writing {}", out.display()))?;
            println!("Decryption: {} bytes written to {}", plain.len(), out.display());
        }

        Command::EncryptFolder { input, key, out } => {
            let key = Key::load(&key).context("loading key")?;
            let written = container::encrypt_folder(&input, &out, &key, &codec)?;
            println!("Folder encryption: {} files written to {}", written, out.display());
        }

        Command::DecryptFolder { input, key, out } => {
            let key = Key::load(&key).context("loading key")?;
            let written = container::decrypt_folder(&input, &out, &key, &codec)?;
            println!("Folder decryption: {} files written to {}", written, out.display());
        }

        Command::FindKey { input, plain, out } => {
            let cipher = CipherFile::open(&input)?;
            let plaintext = std::fs::read(&plain)
                .with_context(|| format!("reading {}", plain.display()))?;
            println!(
                "Exact attack: {} bytes of ciphertext, {} bytes of known plaintext",
                cipher.len(),
                plaintext.len()
            );

            let key = alignment::find_key(cipher.bytes(), &plaintext)?;
            write_key(&key, &out)?;
        }

        Command::PatternBinary { input, out } => {
            let cipher = CipherFile::open(&input)?;
            println!("Structural attack: scanning {} bytes", cipher.len());

            let key = xor_recovery::find_binary_key(cipher.bytes());
            write_key(&key, &out)?;
        }

        Command::PatternText {
            input,
            language,
            out,
            workers,
        } => {
            let language: Language = language.parse()?;
            let corpus = FileCorpus::load_folder(&input)?;
            println!(
                "Keyword attack: {} files ({} bytes) loaded, language {}, {} workers",
                corpus.len(),
                corpus.total_bytes(),
                language,
                workers
            );

            let config = TextRecoveryConfig::new(workers);
            let (tx, mut rx) = tokio::sync::mpsc::channel(64);
            let printer = std::thread::spawn(move || {
                while let Some(event) = rx.blocking_recv() {
                    match event {
                        RecoveryProgress::KeywordStarted(kw) => {
                            println!("  probing keyword {:?}", kw);
                        }
                        RecoveryProgress::KeywordFinished { keyword, fragments } => {
                            println!("  keyword {:?}: {} validated fragments", keyword, fragments);
                        }
                    }
                }
            });

            let result = textmode::recover_text_key_streaming(
                &corpus,
                language.keywords(),
                &config,
                Some(tx),
            );
            let _ = printer.join();
            let key = result?;
            write_key(&key, &out)?;
        }
    }

    Ok(())
}

/// Store a key and report where it went, how complete it is, and a
/// fingerprint of the stored bytes for later comparison.
fn write_key(key: &Key, path: &Path) -> anyhow::Result<()> {
    key.store(path)
        .with_context(|| format!("writing key to {}", path.display()))?;

    let bytes = key.to_storage_bytes()?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);

    println!(
        "Key written to {} ({}/512 slots resolved)",
        path.display(),
        key.resolved_count()
    );
    println!("  SHA-256: {:x}", hasher.finalize());
    Ok(())
}
