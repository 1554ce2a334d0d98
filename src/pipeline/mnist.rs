//! MNIST: four gzip-wrapped IDX files → PNG archive.

use crate::codec::{ensure_paired, gunzip, parse_idx_images, parse_idx_labels};
use crate::net::Downloader;
use crate::png::GrayPlane;
use crate::util::{Error, Result};

use super::{Assembler, OutputArchive, Summary};

/// Mirror hosting the gzip-wrapped IDX files.
pub const MNIST_BASE_URL: &str = "https://ossci-datasets.s3.amazonaws.com/mnist/";

pub const TRAIN_IMAGES: &str = "train-images-idx3-ubyte.gz";
pub const TRAIN_LABELS: &str = "train-labels-idx1-ubyte.gz";
pub const TEST_IMAGES: &str = "t10k-images-idx3-ubyte.gz";
pub const TEST_LABELS: &str = "t10k-labels-idx1-ubyte.gz";

/// Number of digit classes.
pub const NUM_CLASSES: usize = 10;

/// MNIST run options.
#[derive(Debug, Clone)]
pub struct MnistOptions {
    /// Per-class cap, 0 = unlimited.
    pub max_per_class: usize,
    /// Also process the t10k split after the train split.
    pub include_test: bool,
    /// Base URL the four file names are appended to.
    pub base_url: String,
}

impl Default for MnistOptions {
    fn default() -> Self {
        Self {
            max_per_class: 600,
            include_test: true,
            base_url: MNIST_BASE_URL.to_string(),
        }
    }
}

/// Decompressed IDX buffers of one split.
#[derive(Debug, Clone, Copy)]
pub struct MnistSplit<'a> {
    pub images: &'a [u8],
    pub labels: &'a [u8],
}

/// Download, decode and assemble MNIST.
///
/// All required files are downloaded concurrently; decoding starts once
/// every download has finished.
pub async fn run(downloader: &Downloader, options: &MnistOptions) -> Result<(OutputArchive, Summary)> {
    let mut files = vec![TRAIN_IMAGES, TRAIN_LABELS];
    if options.include_test {
        files.extend([TEST_IMAGES, TEST_LABELS]);
    }
    let urls: Vec<String> = files
        .iter()
        .map(|name| format!("{}{}", options.base_url, name))
        .collect();
    let url_refs: Vec<&str> = urls.iter().map(String::as_str).collect();

    tracing::info!(files = urls.len(), "downloading MNIST");
    let bodies = downloader.fetch_all(&url_refs).await?;

    let raw = bodies
        .iter()
        .map(|gz| gunzip(gz))
        .collect::<Result<Vec<_>>>()?;

    let train = MnistSplit {
        images: &raw[0],
        labels: &raw[1],
    };
    let test = options.include_test.then(|| MnistSplit {
        images: &raw[2],
        labels: &raw[3],
    });

    assemble(train, test, options.max_per_class)
}

/// Assemble MNIST from already-decompressed IDX buffers.
///
/// The train split is processed in full, then the test split if given.
#[tracing::instrument(skip_all, fields(max_per_class = max_per_class))]
pub fn assemble(
    train: MnistSplit<'_>,
    test: Option<MnistSplit<'_>>,
    max_per_class: usize,
) -> Result<(OutputArchive, Summary)> {
    let mut assembler = Assembler::new(max_per_class);

    add_split(&mut assembler, "train", train)?;
    if let Some(test) = test {
        add_split(&mut assembler, "test", test)?;
    }

    let detail = if test.is_some() { "mnist train+test" } else { "mnist train" };
    let (archive, summary) = assembler.finish(detail);
    tracing::info!(added = summary.added_total, classes = summary.classes, "MNIST assembled");
    Ok((archive, summary))
}

fn add_split(assembler: &mut Assembler, split: &str, data: MnistSplit<'_>) -> Result<()> {
    let images = parse_idx_images(data.images)?;
    let labels = parse_idx_labels(data.labels)?;
    ensure_paired(&images, &labels)?;

    tracing::debug!(split, count = images.count, rows = images.rows, cols = images.cols, "IDX split");

    let (width, height) = (images.cols as u32, images.rows as u32);
    for (index, (pixels, &label)) in images.images().zip(labels.data).enumerate() {
        if label as usize >= NUM_CLASSES {
            return Err(Error::LabelOutOfRange {
                label,
                classes: NUM_CLASSES,
            });
        }
        let class_name = label.to_string();
        assembler.offer(label, &class_name, split, index, &GrayPlane::new(width, height, pixels))?;
    }
    Ok(())
}
