//! Tar archive reader.
//!
//! Parses an already-decompressed tar stream held entirely in memory. Entries
//! borrow their data from the input buffer; nothing is copied.
//!
//! The reader is tolerant by default: header checksums are ignored and an
//! unparsable size field reads as zero. Set [`TarOptions::strict_checksum`]
//! to reject headers whose checksum does not match.

use std::collections::BTreeMap;

use crate::util::{Error, Result};

/// Size of a tar header and of the data block alignment.
pub const BLOCK_SIZE: usize = 512;

const NAME: std::ops::Range<usize> = 0..100;
const SIZE: std::ops::Range<usize> = 124..136;
const CHECKSUM: std::ops::Range<usize> = 148..156;
const TYPE_FLAG: usize = 156;
const MAGIC: std::ops::Range<usize> = 257..263;
const PREFIX: std::ops::Range<usize> = 345..500;

/// POSIX ustar magic. Old GNU archives use `"ustar  \0"` and reuse the prefix
/// area for timestamps, so only the POSIX form enables prefix handling.
const USTAR_MAGIC: &[u8; 6] = b"ustar\0";

/// Reader configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarOptions {
    /// Validate each header's checksum and fail on mismatch.
    pub strict_checksum: bool,
}

/// One regular file extracted from a tar stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry<'a> {
    pub name: String,
    pub data: &'a [u8],
}

impl ArchiveEntry<'_> {
    /// Final path component of the entry name.
    pub fn file_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// Regular-file entries of a tar stream, in archive order.
#[derive(Debug, Clone, Default)]
pub struct TarArchive<'a> {
    entries: Vec<ArchiveEntry<'a>>,
}

impl<'a> TarArchive<'a> {
    /// Number of regular-file entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in archive order.
    pub fn entries(&self) -> &[ArchiveEntry<'a>] {
        &self.entries
    }

    /// Data of the entry with exactly this name.
    ///
    /// When a name occurs more than once the last occurrence wins, as it
    /// would when extracting to disk.
    pub fn get(&self, name: &str) -> Option<&'a [u8]> {
        self.entries.iter().rev().find(|e| e.name == name).map(|e| e.data)
    }

    /// Last entry whose final path component is `file_name`,
    /// regardless of the directory it sits in.
    pub fn find_file(&self, file_name: &str) -> Option<&ArchiveEntry<'a>> {
        self.entries.iter().rev().find(|e| e.file_name() == file_name)
    }

    /// Name → data mapping.
    pub fn into_map(self) -> BTreeMap<String, &'a [u8]> {
        self.entries.into_iter().map(|e| (e.name, e.data)).collect()
    }
}

/// Parse a tar stream with default (tolerant) options.
pub fn untar(data: &[u8]) -> Result<TarArchive<'_>> {
    untar_with(data, TarOptions::default())
}

/// Parse a tar stream.
///
/// Scanning stops at the first header with an empty name (the end-of-archive
/// marker) or when less than one block remains. Only regular files (type
/// flag `'0'` or NUL) are returned; every other entry is skipped together
/// with its padded data region.
#[tracing::instrument(skip_all, fields(len = data.len()))]
pub fn untar_with(data: &[u8], options: TarOptions) -> Result<TarArchive<'_>> {
    let mut entries = Vec::new();
    let mut offset = 0usize;

    while offset + BLOCK_SIZE <= data.len() {
        let header = &data[offset..offset + BLOCK_SIZE];

        let name = entry_name(header);
        if name.is_empty() {
            break;
        }

        if options.strict_checksum {
            verify_checksum(header, &name)?;
        }

        let size = parse_octal(&header[SIZE])
            .and_then(|s| usize::try_from(s).ok())
            .unwrap_or(0);
        let type_flag = header[TYPE_FLAG];

        let start = offset + BLOCK_SIZE;
        let end = match start.checked_add(size) {
            Some(end) if end <= data.len() => end,
            _ => {
                return Err(Error::ArchiveOverrun {
                    name,
                    end: start.saturating_add(size),
                    len: data.len(),
                })
            }
        };

        if type_flag == b'0' || type_flag == 0 {
            tracing::trace!(%name, size, "tar entry");
            entries.push(ArchiveEntry { name, data: &data[start..end] });
        } else {
            tracing::trace!(%name, size, type_flag = %(type_flag as char), "skipping tar entry");
        }

        // Padded data length; cannot overflow since end <= data.len()
        offset = start + size.div_ceil(BLOCK_SIZE) * BLOCK_SIZE;
    }

    tracing::debug!(entries = entries.len(), "untar");
    Ok(TarArchive { entries })
}

/// Entry name: NUL-terminated name field, joined with the ustar prefix
/// when one is present.
fn entry_name(header: &[u8]) -> String {
    let name = field_str(&header[NAME]);
    if name.is_empty() {
        return name;
    }

    if &header[MAGIC] == USTAR_MAGIC {
        let prefix = field_str(&header[PREFIX]);
        if !prefix.is_empty() {
            return format!("{}/{}", prefix.trim_end_matches('/'), name);
        }
    }
    name
}

fn field_str(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).trim().to_string()
}

/// Parse an octal ASCII numeric field, ignoring NUL and space padding.
fn parse_octal(field: &[u8]) -> Option<u64> {
    let text = std::str::from_utf8(field).ok()?;
    let text = text.trim_matches(|c: char| c == '\0' || c == ' ');
    if text.is_empty() {
        return None;
    }
    u64::from_str_radix(text, 8).ok()
}

/// Header checksum: unsigned byte sum with the checksum field itself
/// counted as eight spaces.
fn header_checksum(header: &[u8]) -> u32 {
    header
        .iter()
        .enumerate()
        .map(|(i, &b)| if CHECKSUM.contains(&i) { b' ' as u32 } else { b as u32 })
        .sum()
}

fn verify_checksum(header: &[u8], name: &str) -> Result<()> {
    let stored = parse_octal(&header[CHECKSUM]).unwrap_or(0) as u32;
    let computed = header_checksum(header);
    if stored != computed {
        return Err(Error::TarChecksum {
            name: name.to_string(),
            stored,
            computed,
        });
    }
    Ok(())
}
