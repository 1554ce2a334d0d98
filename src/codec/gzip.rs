//! Gzip decompression.
//!
//! MNIST ships every IDX file gzip-wrapped and CIFAR-10 ships a `.tar.gz`,
//! so this is the first decode stage for both.

use std::io::Read;
use flate2::read::MultiGzDecoder;

use crate::util::{Error, Result};

/// Inflate a gzip-framed buffer to raw bytes.
///
/// Concatenated gzip members are decoded back to back. Any malformed header,
/// corrupt deflate stream or truncated input fails with [`Error::Decode`].
pub fn gunzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = MultiGzDecoder::new(data);
    // Typical ratio for these corpora is well above 2x
    let mut out = Vec::with_capacity(data.len().saturating_mul(2));

    decoder
        .read_to_end(&mut out)
        .map_err(|e| Error::Decode(format!("gzip: {e}")))?;

    tracing::debug!(compressed = data.len(), raw = out.len(), "gunzip");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_gunzip() {
        let original = b"IDX payloads compress rather well. ".repeat(64);
        let packed = gzip(&original);
        assert!(packed.len() < original.len());

        assert_eq!(gunzip(&packed).unwrap(), original);
    }

    #[test]
    fn test_gunzip_empty_payload() {
        let packed = gzip(b"");
        assert!(gunzip(&packed).unwrap().is_empty());
    }

    #[test]
    fn test_gunzip_multi_member() {
        let mut packed = gzip(b"first,");
        packed.extend_from_slice(&gzip(b"second"));

        assert_eq!(gunzip(&packed).unwrap(), b"first,second");
    }

    #[test]
    fn test_not_gzip() {
        let err = gunzip(b"definitely not a gzip stream").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_truncated() {
        let packed = gzip(&b"some data that will be cut short".repeat(10));
        let err = gunzip(&packed[..packed.len() / 2]).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
