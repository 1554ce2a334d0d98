//! Minimal PNG writer: 8-bit truecolor, no filtering, no interlace.
//!
//! Stream layout:
//!
//! ```text
//! 89 50 4E 47 0D 0A 1A 0A            signature
//! [len BE][IHDR][13 bytes][crc BE]   header
//! [len BE][IDAT][zlib data][crc BE]  image data
//! [len BE][IEND][][crc BE]           trailer
//! ```
//!
//! The chunk CRC covers the type and payload, not the length.

use std::io::Write;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::PixelSource;
use crate::util::{Error, Result};

/// PNG file signature.
pub const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// zlib level used for IDAT.
pub const COMPRESSION_LEVEL: u32 = 6;

pub const IHDR: &[u8; 4] = b"IHDR";
pub const IDAT: &[u8; 4] = b"IDAT";
pub const IEND: &[u8; 4] = b"IEND";

const BIT_DEPTH: u8 = 8;
const COLOR_TYPE_RGB: u8 = 2;
const FILTER_NONE: u8 = 0;

/// Encode a pixel source as a PNG byte stream.
pub fn encode_png<S: PixelSource + ?Sized>(source: &S) -> Result<Vec<u8>> {
    let (width, height) = (source.width(), source.height());
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions { width, height });
    }

    let raw = scanlines(source);
    let idat = deflate(&raw)?;

    let mut out = Vec::with_capacity(SIGNATURE.len() + 3 * 12 + 13 + idat.len());
    out.extend_from_slice(&SIGNATURE);
    write_chunk(&mut out, IHDR, &header(width, height));
    write_chunk(&mut out, IDAT, &idat);
    write_chunk(&mut out, IEND, &[]);
    Ok(out)
}

/// Encode a `width x height` image whose pixels come from `f(x, y)`.
pub fn encode_png_rgb<F>(width: u32, height: u32, f: F) -> Result<Vec<u8>>
where
    F: Fn(u32, u32) -> [u8; 3],
{
    encode_png(&super::FnSource::new(width, height, f))
}

/// Unfiltered scanlines: each row is a filter byte followed by RGB triples.
fn scanlines<S: PixelSource + ?Sized>(source: &S) -> Vec<u8> {
    let (width, height) = (source.width(), source.height());
    let stride = 1 + width as usize * 3;
    let mut raw = Vec::with_capacity(height as usize * stride);

    for y in 0..height {
        raw.push(FILTER_NONE);
        for x in 0..width {
            raw.extend_from_slice(&source.pixel(x, y));
        }
    }
    raw
}

fn deflate(raw: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(COMPRESSION_LEVEL));
    encoder.write_all(raw)?;
    Ok(encoder.finish()?)
}

/// IHDR payload.
fn header(width: u32, height: u32) -> [u8; 13] {
    let mut ihdr = [0u8; 13];
    ihdr[0..4].copy_from_slice(&width.to_be_bytes());
    ihdr[4..8].copy_from_slice(&height.to_be_bytes());
    ihdr[8] = BIT_DEPTH;
    ihdr[9] = COLOR_TYPE_RGB;
    // compression, filter method, interlace all 0
    ihdr
}

/// Append one length-type-payload-CRC chunk.
fn write_chunk(out: &mut Vec<u8>, kind: &[u8; 4], payload: &[u8]) {
    let mut crc = crc32::Hasher::new();
    crc.update(kind);
    crc.update(payload);

    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(payload);
    out.extend_from_slice(&crc.finalize().to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    /// Split a PNG stream into (type, payload, stored crc) after the signature.
    fn chunks(png: &[u8]) -> Vec<([u8; 4], Vec<u8>, u32)> {
        let mut out = Vec::new();
        let mut pos = SIGNATURE.len();
        while pos < png.len() {
            let len = u32::from_be_bytes(png[pos..pos + 4].try_into().unwrap()) as usize;
            let kind: [u8; 4] = png[pos + 4..pos + 8].try_into().unwrap();
            let payload = png[pos + 8..pos + 8 + len].to_vec();
            let crc = u32::from_be_bytes(png[pos + 8 + len..pos + 12 + len].try_into().unwrap());
            out.push((kind, payload, crc));
            pos += 12 + len;
        }
        out
    }

    #[test]
    fn test_solid_red_structure() {
        let png = encode_png_rgb(2, 2, |_, _| [255, 0, 0]).unwrap();
        assert_eq!(&png[..8], &SIGNATURE);

        let parsed = chunks(&png);
        let kinds: Vec<&[u8; 4]> = parsed.iter().map(|(k, _, _)| k).collect();
        assert_eq!(kinds, [IHDR, IDAT, IEND]);

        let (_, ihdr, _) = &parsed[0];
        assert_eq!(ihdr, &[0, 0, 0, 2, 0, 0, 0, 2, 8, 2, 0, 0, 0]);

        let (_, idat, _) = &parsed[1];
        let mut raw = Vec::new();
        ZlibDecoder::new(&idat[..]).read_to_end(&mut raw).unwrap();
        assert_eq!(raw, [0, 255, 0, 0, 255, 0, 0, 0, 255, 0, 0, 255, 0, 0]);

        let (_, iend, _) = &parsed[2];
        assert!(iend.is_empty());
        // IEND is always the same 12 bytes
        assert_eq!(&png[png.len() - 12..], &[0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82]);
    }

    #[test]
    fn test_chunk_crcs() {
        let png = encode_png_rgb(7, 3, |x, y| [x as u8 * 30, y as u8 * 80, 7]).unwrap();
        for (kind, payload, stored) in chunks(&png) {
            let mut covered = kind.to_vec();
            covered.extend_from_slice(&payload);
            assert_eq!(stored, crc32::checksum(&covered), "chunk {:?}", kind);
        }
    }

    #[test]
    fn test_scanline_length() {
        for (w, h) in [(1u32, 1u32), (3, 5), (32, 32), (31, 2)] {
            let src = super::super::FnSource::new(w, h, |_, _| [1, 2, 3]);
            let raw = scanlines(&src);
            assert_eq!(raw.len(), h as usize * (1 + w as usize * 3));
        }
    }

    #[test]
    fn test_ihdr_large_dims() {
        let h = header(0x0102_0304, 0x0A0B_0C0D);
        assert_eq!(&h[0..8], &[1, 2, 3, 4, 0x0A, 0x0B, 0x0C, 0x0D]);
        assert_eq!(&h[8..], &[8, 2, 0, 0, 0]);
    }

    #[test]
    fn test_zero_dimensions() {
        let err = encode_png_rgb(0, 4, |_, _| [0, 0, 0]).unwrap_err();
        assert!(matches!(err, Error::InvalidDimensions { width: 0, height: 4 }));
        assert!(encode_png_rgb(4, 0, |_, _| [0, 0, 0]).is_err());
    }

    #[test]
    fn test_deterministic() {
        let a = encode_png_rgb(9, 9, |x, y| [(x * y) as u8, x as u8, y as u8]).unwrap();
        let b = encode_png_rgb(9, 9, |x, y| [(x * y) as u8, x as u8, y as u8]).unwrap();
        assert_eq!(a, b);
    }
}
