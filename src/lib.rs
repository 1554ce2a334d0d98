//! # imgpack
//!
//! Downloads public image-classification datasets, decodes their binary
//! layouts and repackages them as a ZIP of per-class PNG files.
//!
//! ## Modules
//!
//! - [`util`] - Error type and result alias
//! - [`net`] - HTTP download with bounded redirects
//! - [`codec`] - gzip, tar, IDX and CIFAR-10 decoders
//! - [`png`] - PNG encoder and pixel sources
//! - [`pipeline`] - Per-class sampling, ZIP assembly and dataset drivers
//!
//! ## Example
//!
//! ```no_run
//! use imgpack::pipeline::{synthetic, SyntheticOptions};
//!
//! let (archive, summary) = synthetic::assemble(&SyntheticOptions::default())?;
//! archive.write_zip("out/synthetic.zip")?;
//! println!("{summary}");
//! # Ok::<(), imgpack::Error>(())
//! ```

pub mod util;
pub mod net;
pub mod codec;
pub mod png;
pub mod pipeline;

// Re-export commonly used types
pub use util::{Error, ErrorCategory, Result};
pub use net::{DownloadConfig, Downloader};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, ErrorCategory, Result};
    pub use crate::net::{DownloadConfig, Downloader};
    pub use crate::png::{encode_png, encode_png_rgb, PixelSource};
    pub use crate::pipeline::{
        Assembler, Cifar10Options, MnistOptions, OutputArchive, Summary, SyntheticOptions,
    };
}
