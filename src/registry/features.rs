//! Per-feature symbol tables
//!
//! Each selected feature or extension gets its own [`SymbolTable`] holding
//! only the pool members its require blocks name. Registration happens in
//! the feature-local namespace, so two features may both carry `glClear`.
//! A required name the pool does not have is left out without an error.

use crate::registry::document::{FeatureKind, RawFeature, RegistryDocument};
use crate::registry::filter::FeatureFilter;
use crate::registry::pool::GlobalPool;
use crate::symbols::{AliasMap, SymbolSnapshot, SymbolTable};
use serde::Serialize;
use std::thread;

#[derive(Debug)]
pub struct Feature {
    pub name: String,
    pub kind: FeatureKind,
    pub embedded: bool,
    pub symbols: SymbolTable,
}

#[derive(Debug, Serialize)]
pub struct FeatureSnapshot {
    pub name: String,
    pub kind: FeatureKind,
    pub embedded: bool,
    #[serde(flatten)]
    pub symbols: SymbolSnapshot,
}

impl Feature {
    pub fn snapshot(&self) -> FeatureSnapshot {
        FeatureSnapshot {
            name: self.name.clone(),
            kind: self.kind,
            embedded: self.embedded,
            symbols: self.symbols.snapshot(),
        }
    }
}

/// Build one feature's table from the pool.
pub fn build_feature(raw: &RawFeature, pool: &GlobalPool, aliases: &AliasMap) -> Feature {
    let symbols = SymbolTable::with_aliases(aliases.clone());

    for name in &raw.enums {
        match pool.constant(name) {
            Some(constant) => {
                symbols.add_constant(constant.clone());
            }
            None => log::trace!("{}: enum '{name}' not in pool", raw.name),
        }
    }
    for name in &raw.commands {
        match pool.function(name) {
            Some(function) => {
                if symbols.add_function(function.clone()) {
                    for unknown in pool.function_unknown_types(name) {
                        symbols.note_unknown_type(unknown);
                    }
                }
            }
            None => log::trace!("{}: command '{name}' not in pool", raw.name),
        }
    }

    Feature {
        name: raw.name.clone(),
        kind: raw.kind,
        embedded: raw.embedded,
        symbols,
    }
}

/// Build every feature the filter selects, in parallel, in document order.
pub fn build_features(
    doc: &RegistryDocument,
    pool: &GlobalPool,
    filter: &FeatureFilter,
    aliases: &AliasMap,
) -> Vec<Feature> {
    let selected: Vec<&RawFeature> = doc.features.iter().filter(|f| filter.allows(f)).collect();
    if selected.is_empty() {
        return Vec::new();
    }

    let workers = thread::available_parallelism().map_or(4, |n| n.get());
    let chunk_size = selected.len().div_ceil(workers);

    let features: Vec<Feature> = thread::scope(|s| {
        let handles: Vec<_> = selected
            .chunks(chunk_size)
            .map(|chunk| {
                s.spawn(move || {
                    chunk
                        .iter()
                        .map(|raw| build_feature(raw, pool, aliases))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap_or_else(|p| std::panic::resume_unwind(p)))
            .collect()
    });

    log::debug!(
        "Built {} of {} features",
        features.len(),
        doc.features.len()
    );
    features
}
