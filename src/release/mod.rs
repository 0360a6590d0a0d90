//! Release publishing
//!
//! The pipeline in [`pipeline`] coordinates the leaf stages:
//!
//! - **version**: resolve the release version from an exact string or a bump
//! - **build**: clean, build every architecture, strip, test once
//! - **archive**: tar + SHA-256 each binary next to where it was built
//! - **upload**: one `gh release create` with every archive, URLs matched by file name
//! - **formula**: render the Homebrew formula from whatever assets came back
//!
//! External tools are reached only through the collaborator traits
//! ([`toolchain::Toolchain`], [`upload::ReleaseHost`], and those in
//! [`crate::core`]), so every stage can run against fakes.

pub mod arch;
pub mod archive;
pub mod build;
pub mod formula;
pub mod pipeline;
pub mod toolchain;
pub mod upload;
pub mod version;

pub use pipeline::{FormulaMetadata, PublishPipeline, PublishReport, PublishRequest};
