//! API registry scanning
//!
//! The registry path has three steps:
//! - [`document`]: read enumerants, commands, features and extensions from XML
//! - [`pool`]: resolve every enumerant and command once into a [`GlobalPool`]
//! - [`features`]: give each selected feature its own table drawn from the pool
//!
//! [`filter`] decides which features and extensions are selected.

pub mod document;
pub mod features;
pub mod filter;
pub mod pool;

pub use document::{FeatureKind, RegistryDocument};
pub use features::{Feature, FeatureSnapshot};
pub use filter::FeatureFilter;
pub use pool::GlobalPool;

use crate::config::ScanConfig;
use crate::errors::ScanError;

/// A scanned registry: the shared pool and the selected features
#[derive(Debug)]
pub struct Registry {
    pub pool: GlobalPool,
    pub features: Vec<Feature>,
}

/// Parse registry XML and build the features `config` selects.
pub fn parse_registry(xml: &str, config: &ScanConfig) -> Result<Registry, ScanError> {
    let doc = RegistryDocument::parse(xml)?;
    let aliases = config.alias_map();
    let pool = GlobalPool::build(&doc, &aliases);
    let filter = FeatureFilter::from_config(config);
    let features = features::build_features(&doc, &pool, &filter, &aliases);
    Ok(Registry { pool, features })
}
