//! IRefKG Common Library
//!
//! Shared plumbing for the IRefKG workspace members:
//!
//! - **Error Handling**: [`CommonError`] and the [`Result`] alias
//! - **Logging**: `tracing` subscriber setup driven by `LOG_*` variables
//! - **Settings files**: YAML settings and `.env` loading
//!
//! # Example
//!
//! ```no_run
//! use irefkg_common::settings::load_yaml;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Run {
//!     taxon: String,
//! }
//!
//! fn main() -> irefkg_common::Result<()> {
//!     let run: Run = load_yaml("config/irefindex.yaml")?;
//!     println!("taxon = {}", run.taxon);
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod error;
pub mod logging;
pub mod settings;

pub use error::{CommonError, Result};
