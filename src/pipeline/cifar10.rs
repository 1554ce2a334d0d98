//! CIFAR-10: one `.tar.gz` of binary batches → PNG archive.

use crate::codec::cifar::CLASS_NAMES;
use crate::codec::{gunzip, untar_with, Cifar10Batch, TarArchive, TarOptions};
use crate::net::Downloader;
use crate::util::{Error, Result};

use super::{Assembler, OutputArchive, Summary};

/// Canonical binary distribution.
pub const CIFAR10_URL: &str = "https://www.cs.toronto.edu/~kriz/cifar-10-binary.tar.gz";

/// Train batches, processed in this order.
pub const TRAIN_BATCHES: [&str; 5] = [
    "data_batch_1.bin",
    "data_batch_2.bin",
    "data_batch_3.bin",
    "data_batch_4.bin",
    "data_batch_5.bin",
];

pub const TEST_BATCH: &str = "test_batch.bin";

/// CIFAR-10 run options.
#[derive(Debug, Clone)]
pub struct Cifar10Options {
    /// Per-class cap, 0 = unlimited.
    pub max_per_class: usize,
    /// Also process `test_batch.bin` after the train batches.
    pub include_test: bool,
    pub url: String,
    pub tar: TarOptions,
}

impl Default for Cifar10Options {
    fn default() -> Self {
        Self {
            max_per_class: 1000,
            include_test: true,
            url: CIFAR10_URL.to_string(),
            tar: TarOptions::default(),
        }
    }
}

/// Download, decode and assemble CIFAR-10.
pub async fn run(downloader: &Downloader, options: &Cifar10Options) -> Result<(OutputArchive, Summary)> {
    tracing::info!(url = %options.url, "downloading CIFAR-10");
    let gz = downloader.fetch(&options.url).await?;
    let tar = gunzip(&gz)?;
    assemble(&tar, options)
}

/// Assemble CIFAR-10 from an already-decompressed tar stream.
///
/// Batch files are located by file name anywhere in the archive. All of them
/// must be present before any record is encoded.
#[tracing::instrument(skip_all, fields(max_per_class = options.max_per_class))]
pub fn assemble(tar: &[u8], options: &Cifar10Options) -> Result<(OutputArchive, Summary)> {
    let archive = untar_with(tar, options.tar)?;

    let mut splits: Vec<(&str, Vec<&[u8]>)> = Vec::new();
    let train = TRAIN_BATCHES
        .iter()
        .map(|name| find_batch(&archive, name))
        .collect::<Result<Vec<_>>>()?;
    splits.push(("train", train));
    if options.include_test {
        splits.push(("test", vec![find_batch(&archive, TEST_BATCH)?]));
    }

    let mut assembler = Assembler::new(options.max_per_class);
    for (split, batches) in splits {
        // Index runs across all batch files of a split
        let mut index = 0usize;
        for data in batches {
            let batch = Cifar10Batch::new(data);
            tracing::debug!(split, records = batch.len(), "CIFAR-10 batch");

            for record in batch.records() {
                let class_name = record.class_name().ok_or(Error::LabelOutOfRange {
                    label: record.label(),
                    classes: CLASS_NAMES.len(),
                })?;
                assembler.offer(record.label(), class_name, split, index, &record.pixels())?;
                index += 1;
            }
        }
    }

    let detail = if options.include_test { "cifar10 train+test" } else { "cifar10 train" };
    let (out, summary) = assembler.finish(detail);
    tracing::info!(added = summary.added_total, classes = summary.classes, "CIFAR-10 assembled");
    Ok((out, summary))
}

fn find_batch<'a>(archive: &TarArchive<'a>, name: &str) -> Result<&'a [u8]> {
    archive
        .find_file(name)
        .map(|entry| entry.data)
        .ok_or_else(|| Error::MissingEntry(name.to_string()))
}
