//! CIFAR-10 binary batch parsing.
//!
//! A batch file is a flat sequence of 3073-byte records:
//!
//! ```text
//! [label: u8][red: 1024][green: 1024][blue: 1024]
//! ```
//!
//! Each plane is a 32x32 image in row-major order.

use crate::png::RgbPlanes;

/// Image side length.
pub const SIDE: usize = 32;

/// Bytes per color plane.
pub const PLANE_SIZE: usize = SIDE * SIDE;

/// Bytes per record (label + three planes).
pub const RECORD_SIZE: usize = 1 + 3 * PLANE_SIZE;

/// CIFAR-10 class names, indexed by label.
pub const CLASS_NAMES: [&str; 10] = [
    "airplane",
    "automobile",
    "bird",
    "cat",
    "deer",
    "dog",
    "frog",
    "horse",
    "ship",
    "truck",
];

/// View over one 3073-byte record.
#[derive(Debug, Clone, Copy)]
pub struct Cifar10Record<'a> {
    raw: &'a [u8],
}

impl<'a> Cifar10Record<'a> {
    #[inline]
    pub fn label(&self) -> u8 {
        self.raw[0]
    }

    #[inline]
    pub fn red(&self) -> &'a [u8] {
        &self.raw[1..1 + PLANE_SIZE]
    }

    #[inline]
    pub fn green(&self) -> &'a [u8] {
        &self.raw[1 + PLANE_SIZE..1 + 2 * PLANE_SIZE]
    }

    #[inline]
    pub fn blue(&self) -> &'a [u8] {
        &self.raw[1 + 2 * PLANE_SIZE..RECORD_SIZE]
    }

    /// Class name for this record's label, if the label is in range.
    pub fn class_name(&self) -> Option<&'static str> {
        CLASS_NAMES.get(self.label() as usize).copied()
    }

    /// The record as a pixel source for the PNG encoder.
    pub fn pixels(&self) -> RgbPlanes<'a> {
        RgbPlanes::new(SIDE as u32, SIDE as u32, self.red(), self.green(), self.blue())
    }
}

/// A decoded batch file.
#[derive(Debug, Clone, Copy)]
pub struct Cifar10Batch<'a> {
    data: &'a [u8],
}

impl<'a> Cifar10Batch<'a> {
    /// Wrap a batch buffer. Trailing bytes that do not form a whole record
    /// are ignored.
    pub fn new(data: &'a [u8]) -> Self {
        let whole = data.len() / RECORD_SIZE * RECORD_SIZE;
        if whole != data.len() {
            tracing::debug!(
                trailing = data.len() - whole,
                "ignoring partial CIFAR-10 record"
            );
        }
        Self { data: &data[..whole] }
    }

    /// Number of whole records.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() / RECORD_SIZE
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Record at `index`.
    pub fn record(&self, index: usize) -> Option<Cifar10Record<'a>> {
        let start = index.checked_mul(RECORD_SIZE)?;
        let end = start.checked_add(RECORD_SIZE)?;
        let raw = self.data.get(start..end)?;
        Some(Cifar10Record { raw })
    }

    /// Records front to back.
    pub fn records(&self) -> impl Iterator<Item = Cifar10Record<'a>> {
        self.data
            .chunks_exact(RECORD_SIZE)
            .map(|raw| Cifar10Record { raw })
    }
}
