//! Dataset container formats.
//!
//! - [`gzip`] - gzip inflate
//! - [`tar`] - in-memory tar reader
//! - [`idx`] - MNIST IDX images / labels
//! - [`cifar`] - CIFAR-10 binary batches

pub mod gzip;
pub mod tar;
pub mod idx;
pub mod cifar;

pub use gzip::gunzip;
pub use tar::{untar, untar_with, ArchiveEntry, TarArchive, TarOptions};
pub use idx::{ensure_paired, parse_idx_images, parse_idx_labels, IdxImageBlock, IdxLabelBlock};
pub use cifar::{Cifar10Batch, Cifar10Record};
