//! Utility types shared across the pipeline.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - [`ErrorCategory`] - Coarse error taxonomy

mod error;

pub use error::*;
