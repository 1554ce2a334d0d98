//! Dataset drivers and the shared sampling/assembly stage.
//!
//! - [`mnist`] - gzip-wrapped IDX image/label pairs
//! - [`cifar10`] - tar.gz of fixed-width binary batches
//! - [`synthetic`] - seeded generator, no network

mod assemble;
pub mod cifar10;
pub mod mnist;
pub mod synthetic;

pub use assemble::{entry_path, Assembler, ClassBudget, Label, OutputArchive, Summary};
pub use cifar10::Cifar10Options;
pub use mnist::{MnistOptions, MnistSplit};
pub use synthetic::{Lcg, SyntheticOptions};
