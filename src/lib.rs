use std::sync::Arc;
use std::time::Instant;

pub mod catalog;
pub mod category_index;
pub mod config;
pub mod context_store;
pub mod error;
mod feature;
pub mod feature_context;
pub mod feature_extractor;
pub mod file_utils;
pub mod purchase_aggregator;
pub mod recommend;
pub mod scaler;
pub mod vector_db;
pub mod worker;

pub use catalog::{CatalogProvider, JsonFileCatalog, Product, Purchase, StaticCatalog, User};
pub use config::{EngineConfig, FeatureWeights, DEFAULT_FEATURE_WEIGHTS};
pub use context_store::{ContextStore, PublishedContext};
pub use error::{Error, Result};
pub use feature::ProductVector;
pub use feature_context::FeatureContext;
pub use feature_extractor::{encode, RunMode};
pub use recommend::{recommend, Recommendation};
pub use scaler::normalize;
pub use worker::{Command, Worker, WorkerEvent, WorkerHandle};

/// Builds a context from `catalog` and `users` and attaches a vector for every
/// product. Nothing is returned unless every product encoded successfully.
pub fn train(
    catalog: &[Product],
    users: &[User],
    config: &EngineConfig,
    progress_callback: impl Fn(f32),
) -> Result<FeatureContext> {
    let start_time = Instant::now();
    let context = Arc::new(FeatureContext::build_with_weights(
        catalog,
        users,
        config.weights,
    )?);

    let features = feature_extractor::extract_features(
        config.run_mode,
        Arc::clone(&context),
        catalog.into(),
        progress_callback,
    )?;
    log::info!(
        "Took {:.1?} to encode {} products into {} dimensions",
        start_time.elapsed(),
        features.len(),
        context.dimensions()
    );

    // Pool jobs may still hold a clone for a moment after sending their result
    let mut context = Arc::try_unwrap(context).unwrap_or_else(|shared| (*shared).clone());
    context.attach_product_vectors(features)?;
    Ok(context)
}
