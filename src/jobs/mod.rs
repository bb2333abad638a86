//! Job types and how to build them.
//!
//! The catalog is built once from configuration with [`build_catalog`] and
//! handed to a [`JobDefinitionResolver`], which maps a test case's job type
//! and the requested [`BuildMode`] to a [`BuildDefinition`].

mod catalog;
mod definition;
mod resolver;

pub use catalog::{build_catalog, JobCatalog, JobCatalogConfig};
pub use definition::{BuildDefinition, Category};
pub use resolver::{binary_source, BinarySource, BuildMode, JobDefinitionResolver};
