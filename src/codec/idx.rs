//! IDX format parsing (MNIST).
//!
//! Layout, all integers big-endian u32:
//!
//! ```text
//! images: magic=2051 | count | rows | cols | count*rows*cols pixel bytes
//! labels: magic=2049 | count | count label bytes
//! ```
//!
//! The parsers do not check that an image file and a label file agree on
//! `count`; that is a pipeline-level invariant, see [`ensure_paired`].

use byteorder::{BigEndian, ByteOrder};

use crate::util::{Error, Result};

/// Magic number of an IDX image file (unsigned byte, 3 dimensions).
pub const IMAGE_MAGIC: u32 = 2051;

/// Magic number of an IDX label file (unsigned byte, 1 dimension).
pub const LABEL_MAGIC: u32 = 2049;

const IMAGE_HEADER_SIZE: usize = 16;
const LABEL_HEADER_SIZE: usize = 8;

/// Decoded image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdxImageBlock<'a> {
    pub count: usize,
    pub rows: usize,
    pub cols: usize,
    /// Exactly `count * rows * cols` bytes, image after image, row-major.
    pub data: &'a [u8],
}

impl<'a> IdxImageBlock<'a> {
    /// Bytes per image.
    #[inline]
    pub fn image_len(&self) -> usize {
        self.rows * self.cols
    }

    /// Pixels of image `index`, or `None` past the end.
    pub fn image(&self, index: usize) -> Option<&'a [u8]> {
        if index >= self.count {
            return None;
        }
        let len = self.image_len();
        Some(&self.data[index * len..(index + 1) * len])
    }

    /// Iterate over all images in file order.
    pub fn images(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        (0..self.count).filter_map(move |i| self.image(i))
    }
}

/// Decoded label file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdxLabelBlock<'a> {
    pub count: usize,
    /// One byte per label.
    pub data: &'a [u8],
}

fn read_magic(buf: &[u8], expected: u32) -> Result<()> {
    if buf.len() < 4 {
        return Err(Error::truncated("IDX header", 4, buf.len()));
    }
    let got = BigEndian::read_u32(&buf[0..4]);
    if got != expected {
        return Err(Error::BadMagic { expected, got });
    }
    Ok(())
}

fn read_dim(buf: &[u8], pos: usize) -> usize {
    BigEndian::read_u32(&buf[pos..pos + 4]) as usize
}

/// Parse an IDX image file.
pub fn parse_idx_images(buf: &[u8]) -> Result<IdxImageBlock<'_>> {
    read_magic(buf, IMAGE_MAGIC)?;
    if buf.len() < IMAGE_HEADER_SIZE {
        return Err(Error::truncated("IDX image header", IMAGE_HEADER_SIZE, buf.len()));
    }

    let count = read_dim(buf, 4);
    let rows = read_dim(buf, 8);
    let cols = read_dim(buf, 12);

    let payload = &buf[IMAGE_HEADER_SIZE..];
    let needed = count
        .checked_mul(rows)
        .and_then(|n| n.checked_mul(cols))
        .ok_or(Error::DimensionOverflow { count, rows, cols })?;
    if payload.len() < needed {
        return Err(Error::truncated("IDX image payload", needed, payload.len()));
    }

    Ok(IdxImageBlock {
        count,
        rows,
        cols,
        data: &payload[..needed],
    })
}

/// Parse an IDX label file.
pub fn parse_idx_labels(buf: &[u8]) -> Result<IdxLabelBlock<'_>> {
    read_magic(buf, LABEL_MAGIC)?;
    if buf.len() < LABEL_HEADER_SIZE {
        return Err(Error::truncated("IDX label header", LABEL_HEADER_SIZE, buf.len()));
    }

    let count = read_dim(buf, 4);
    let payload = &buf[LABEL_HEADER_SIZE..];
    if payload.len() < count {
        return Err(Error::truncated("IDX label payload", count, payload.len()));
    }

    Ok(IdxLabelBlock {
        count,
        data: &payload[..count],
    })
}

/// Check that an image file and its label file describe the same items.
pub fn ensure_paired(images: &IdxImageBlock<'_>, labels: &IdxLabelBlock<'_>) -> Result<()> {
    if images.count != labels.count {
        return Err(Error::CountMismatch {
            images: images.count,
            labels: labels.count,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::ErrorCategory;

    fn label_file(labels: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&LABEL_MAGIC.to_be_bytes());
        buf.extend_from_slice(&(labels.len() as u32).to_be_bytes());
        buf.extend_from_slice(labels);
        buf
    }

    #[test]
    fn test_parse_images() {
        let buf = [
            0, 0, 8, 3, 0, 0, 0, 2, 0, 0, 0, 2, 0, 0, 0, 2, 0, 1, 2, 3, 4, 5, 6, 7,
        ];
        let block = parse_idx_images(&buf).unwrap();
        assert_eq!(block.count, 2);
        assert_eq!(block.rows, 2);
        assert_eq!(block.cols, 2);
        assert_eq!(block.data, &[0, 1, 2, 3, 4, 5, 6, 7]);

        assert_eq!(block.image(0), Some(&[0u8, 1, 2, 3][..]));
        assert_eq!(block.image(1), Some(&[4u8, 5, 6, 7][..]));
        assert_eq!(block.image(2), None);
        assert_eq!(block.images().count(), 2);
    }

    #[test]
    fn test_parse_labels() {
        let buf = label_file(&[3, 1, 4, 1, 5]);
        let block = parse_idx_labels(&buf).unwrap();
        assert_eq!(block.count, 5);
        assert_eq!(block.data, &[3, 1, 4, 1, 5]);
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut buf = label_file(&[9, 8]);
        buf.extend_from_slice(&[0xFF; 3]);
        let block = parse_idx_labels(&buf).unwrap();
        assert_eq!(block.data, &[9, 8]);
    }

    #[test]
    fn test_wrong_magic() {
        let labels = label_file(&[1, 2]);
        let err = parse_idx_images(&labels).unwrap_err();
        assert!(matches!(err, Error::BadMagic { expected: IMAGE_MAGIC, got: LABEL_MAGIC }));
        assert_eq!(err.category(), ErrorCategory::Format);

        let err = parse_idx_labels(&[0, 0, 8, 3, 0, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, Error::BadMagic { expected: LABEL_MAGIC, got: 2051 }));
    }

    #[test]
    fn test_truncated() {
        assert!(matches!(parse_idx_images(&[0, 0]), Err(Error::Truncated { .. })));
        assert!(matches!(
            parse_idx_images(&[0, 0, 8, 3, 0, 0, 0, 1]),
            Err(Error::Truncated { .. })
        ));

        // Declares one 2x2 image but carries only 3 pixels
        let buf = [0, 0, 8, 3, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 2, 1, 2, 3];
        let err = parse_idx_images(&buf).unwrap_err();
        assert!(matches!(err, Error::Truncated { needed: 4, available: 3, .. }));
    }

    #[test]
    fn test_dimension_overflow() {
        let mut buf = vec![0, 0, 8, 3];
        buf.extend_from_slice(&[0xFF; 12]);
        let err = parse_idx_images(&buf).unwrap_err();
        assert!(matches!(err, Error::DimensionOverflow { .. }));
        assert_eq!(err.category(), ErrorCategory::Format);
    }

    #[test]
    fn test_count_mismatch() {
        let images_buf = [
            0, 0, 8, 3, 0, 0, 0, 2, 0, 0, 0, 1, 0, 0, 0, 1, 10, 20,
        ];
        let labels_buf = label_file(&[1, 2, 3]);
        let images = parse_idx_images(&images_buf).unwrap();
        let labels = parse_idx_labels(&labels_buf).unwrap();

        let err = ensure_paired(&images, &labels).unwrap_err();
        assert!(matches!(err, Error::CountMismatch { images: 2, labels: 3 }));
        assert_eq!(err.category(), ErrorCategory::Consistency);

        let labels_buf = label_file(&[1, 2]);
        let labels = parse_idx_labels(&labels_buf).unwrap();
        ensure_paired(&images, &labels).unwrap();
    }
}
