//! The container file format around the cipher.
//!
//! Layout: a 4-byte magic, a little-endian u16 header length at byte 4,
//! a little-endian u16 compressed length at byte 6, a u32 checksum at
//! byte 8, a vendor tag, then zero padding up to the header length. The
//! compressed first 512 plaintext bytes sit XOR-encrypted in
//! `[header_len, 512)`, and the rest of the plaintext follows as the
//! XOR-encrypted body. Both encrypted regions start the key cycle at
//! slot 0.

use crate::codec::Codec;
use crate::error::{RecoveryError, Result};
use crate::key::Key;
use crate::types::HEADER_LEN;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

pub const MAGIC: [u8; 4] = [b'b', 0x14, b'#', b'e'];
pub const TAG: &[u8; 16] = b"E-SafeNet\0\0\0LOCK";

/// Fixed fields before the zero padding: magic, two u16 lengths, the
/// checksum and the 16-byte tag.
const FIXED_FIELDS: usize = 28;

/// Parsed container header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Where the compressed header block starts; equals the amount of
    /// plain (non-encrypted) header bytes at the front of the file.
    pub header_len: u16,
    pub compressed_len: u16,
    /// Sum of plaintext bytes 512..1024, with bit 24 always set.
    pub checksum: u32,
}

/// Parse and sanity-check the fixed header fields of `data`.
pub fn parse_header(name: &str, data: &[u8]) -> Result<Header> {
    let fail = |reason: String| RecoveryError::Container {
        file: name.to_string(),
        reason,
    };

    if data.len() < HEADER_LEN {
        return Err(fail(format!(
            "file is {} bytes, shorter than the {}-byte header block",
            data.len(),
            HEADER_LEN
        )));
    }
    if data[..4] != MAGIC {
        return Err(fail("bad magic".to_string()));
    }

    let header_len = u16::from_le_bytes([data[4], data[5]]);
    let compressed_len = u16::from_le_bytes([data[6], data[7]]);
    let checksum = u32::from_le_bytes([data[8], data[9], data[10], data[11]]);

    if (header_len as usize) < FIXED_FIELDS || (header_len as usize) > HEADER_LEN {
        return Err(fail(format!("implausible header length {}", header_len)));
    }
    if header_len as usize + compressed_len as usize != HEADER_LEN {
        return Err(fail(format!(
            "header length {} and compressed length {} do not fill the header block",
            header_len, compressed_len
        )));
    }

    Ok(Header {
        header_len,
        compressed_len,
        checksum,
    })
}

/// Encrypt one plaintext file into the container format.
pub fn encrypt_file(name: &str, plain: &[u8], key: &Key, codec: &dyn Codec) -> Result<Vec<u8>> {
    let head_plain = &plain[..plain.len().min(HEADER_LEN)];
    let compressed = codec.compress(head_plain)?;

    if compressed.len() + FIXED_FIELDS > HEADER_LEN {
        return Err(RecoveryError::Container {
            file: name.to_string(),
            reason: format!(
                "compressed header block is {} bytes and does not fit the {}-byte header",
                compressed.len(),
                HEADER_LEN
            ),
        });
    }
    let header_len = HEADER_LEN - compressed.len();

    let body = if plain.len() > HEADER_LEN {
        &plain[HEADER_LEN..]
    } else {
        &[][..]
    };
    let checksum_window = &body[..body.len().min(HEADER_LEN)];
    let checksum: u32 =
        checksum_window.iter().map(|&b| b as u32).sum::<u32>() | 1 << 24;

    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&(header_len as u16).to_le_bytes());
    out.extend_from_slice(&(compressed.len() as u16).to_le_bytes());
    out.extend_from_slice(&checksum.to_le_bytes());
    out.extend_from_slice(TAG);
    out.resize(header_len, 0);
    out.extend_from_slice(&key.xor_cycle(&compressed, 0));
    out.extend_from_slice(&key.xor_cycle(body, 0));
    Ok(out)
}

/// Decrypt one container file back to plaintext.
///
/// The stored checksum is parsed but not verified; recovery tooling has
/// to cope with files written by buggy encryptors.
pub fn decrypt_file(name: &str, data: &[u8], key: &Key, codec: &dyn Codec) -> Result<Vec<u8>> {
    let header = parse_header(name, data)?;

    let compressed = key.xor_cycle(&data[header.header_len as usize..HEADER_LEN], 0);
    let head_plain = codec.decompress(&compressed)?;
    let body = key.xor_cycle(&data[HEADER_LEN..], 0);

    let mut out = head_plain;
    out.extend_from_slice(&body);
    Ok(out)
}

/// Encrypt every file under `src` into a mirrored tree under `dst`.
/// Returns the number of files written.
pub fn encrypt_folder<P: AsRef<Path>, Q: AsRef<Path>>(
    src: P,
    dst: Q,
    key: &Key,
    codec: &dyn Codec,
) -> Result<usize> {
    transform_folder(src.as_ref(), dst.as_ref(), &|name, data| {
        encrypt_file(name, data, key, codec)
    })
}

/// Decrypt every file under `src` into a mirrored tree under `dst`.
/// Returns the number of files written.
pub fn decrypt_folder<P: AsRef<Path>, Q: AsRef<Path>>(
    src: P,
    dst: Q,
    key: &Key,
    codec: &dyn Codec,
) -> Result<usize> {
    transform_folder(src.as_ref(), dst.as_ref(), &|name, data| {
        decrypt_file(name, data, key, codec)
    })
}

fn transform_folder(
    src: &Path,
    dst: &Path,
    transform: &dyn Fn(&str, &[u8]) -> Result<Vec<u8>>,
) -> Result<usize> {
    let mut written = 0usize;

    for entry in WalkDir::new(src).sort_by_file_name() {
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

        let rel = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dst.join(rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = fs::read(entry.path())?;
        let name = entry.path().display().to_string();
        let out = transform(&name, &data)?;
        fs::write(&target, out)?;
        written += 1;
    }

    Ok(written)
}
